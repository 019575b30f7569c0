use crate::Value;
use std::{
    borrow::Cow,
    fmt::{self, Display},
    slice,
};

/// Ordered parameter bindings, one per `@name` placeholder.
///
/// Binding a name twice replaces the value and keeps the original position.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ParameterSet {
    entries: Vec<(Cow<'static, str>, Value)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Builder form of [`ParameterSet::add`].
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.add(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(n, v)| if n == name { Some(v) } else { None })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_ref())
    }

    pub fn iter(&self) -> slice::Iter<'_, (Cow<'static, str>, Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a (Cow<'static, str>, Value);
    type IntoIter = slice::Iter<'a, (Cow<'static, str>, Value)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for ParameterSet {
    type Item = (Cow<'static, str>, Value);
    type IntoIter = std::vec::IntoIter<(Cow<'static, str>, Value)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<N, V> FromIterator<(N, V)> for ParameterSet
where
    N: Into<Cow<'static, str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut result = ParameterSet::new();
        for (name, value) in iter {
            result.add(name, value);
        }
        result
    }
}

impl Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        f.write_str("}")
    }
}

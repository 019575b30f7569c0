use std::{
    cmp::min,
    fmt::{self, Display},
};

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Case insensitive comparison of SQL identifiers.
pub fn same_identifier(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Displays at most 497 bytes of a query, followed by `...` when cut.
pub struct Truncated<'a>(pub &'a str);

impl Display for Truncated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut end = min(self.0.len(), 497);
        while !self.0.is_char_boundary(end) {
            end -= 1;
        }
        f.write_str(self.0[..end].trim_end())?;
        if self.0.len() > 497 {
            f.write_str("...")?;
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        $crate::Truncated(::std::convert::AsRef::<str>::as_ref(&$query))
    };
}

use crate::{Error, FromRow, Result, RowLabeled, RowNames, same_identifier};
use std::sync::Arc;

/// Cuts a joined row into consecutive sub-rows, one per joined shape.
///
/// `split_on` is a comma separated list of column names, the i-th one marks where the
/// (i+1)-th part starts. When fewer markers than boundaries are given, the last one is
/// reused. Every boundary is the first column after the previous boundary whose label
/// matches (ignoring case), column 0 never is a boundary.
#[derive(Debug)]
pub struct RowSplitter {
    markers: Vec<String>,
    parts: usize,
    layout: Option<Layout>,
}

#[derive(Debug)]
struct Layout {
    source: RowNames,
    starts: Vec<usize>,
    labels: Vec<RowNames>,
}

impl RowSplitter {
    pub fn new(split_on: &str, parts: usize) -> Result<Self> {
        let markers: Vec<String> = split_on
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(Into::into)
            .collect();
        if markers.is_empty() {
            return Err(Error::msg(format!(
                "The split columns `{}` do not name any column",
                split_on
            )));
        }
        if parts < 2 {
            return Err(Error::msg(format!(
                "A joined row must be split in at least 2 parts, {} requested",
                parts
            )));
        }
        Ok(Self {
            markers,
            parts,
            layout: None,
        })
    }

    /// Column index where each part starts, the first one is always 0.
    pub fn boundaries(&self, labels: &[String]) -> Result<Vec<usize>> {
        let mut starts = Vec::with_capacity(self.parts);
        starts.push(0);
        let mut previous = 0;
        for i in 0..self.parts - 1 {
            let marker = self
                .markers
                .get(i)
                .or(self.markers.last())
                .map(String::as_str)
                .unwrap_or_default();
            let Some(position) = labels
                .iter()
                .enumerate()
                .skip(previous + 1)
                .find_map(|(j, v)| same_identifier(v, marker).then_some(j))
            else {
                return Err(Error::msg(format!(
                    "Could not find the split column `{}` after column {} (columns: {})",
                    marker,
                    previous,
                    labels.join(", ")
                )));
            };
            starts.push(position);
            previous = position;
        }
        Ok(starts)
    }

    fn layout(&self, source: RowNames) -> Result<Layout> {
        let starts = self.boundaries(&source)?;
        let labels = starts
            .iter()
            .enumerate()
            .map(|(i, start)| {
                let end = starts.get(i + 1).copied().unwrap_or(source.len());
                source[*start..end].iter().cloned().collect::<RowNames>()
            })
            .collect();
        Ok(Layout {
            source,
            starts,
            labels,
        })
    }

    /// Split `row` into the configured number of parts.
    ///
    /// Rows of the same result share their labels, the boundaries are computed once.
    pub fn split(&mut self, row: RowLabeled) -> Result<Vec<RowLabeled>> {
        if row.labels.len() != row.values.len() {
            return Err(Error::msg(format!(
                "The row has {} labels but {} values",
                row.labels.len(),
                row.values.len()
            )));
        }
        let layout = match self.layout.take() {
            Some(layout) if Arc::ptr_eq(&layout.source, &row.labels) => layout,
            _ => self.layout(row.labels.clone())?,
        };
        let mut values = row.values.into_vec();
        let mut result = Vec::with_capacity(self.parts);
        for (start, labels) in layout.starts.iter().zip(layout.labels.iter()).rev() {
            let tail = values.split_off(*start);
            result.push(RowLabeled::new(labels.clone(), tail.into_boxed_slice()));
        }
        result.reverse();
        self.layout = Some(layout);
        Ok(result)
    }
}

/// Mapping function of a joined query: receives one materialized value per part.
///
/// Implemented for closures taking 2 to 4 [`FromRow`] arguments.
pub trait JoinMap<Args, R>: Send + Sync {
    /// Number of parts each row is split in.
    const PARTS: usize;

    fn map_row(&self, parts: Vec<RowLabeled>) -> Result<R>;
}

macro_rules! impl_join_map {
    ($parts:literal; $($t:ident $v:ident),+) => {
        impl<F, R, $($t),+> JoinMap<($($t,)+), R> for F
        where
            F: Fn($($t),+) -> R + Send + Sync,
            $($t: FromRow,)+
        {
            const PARTS: usize = $parts;

            fn map_row(&self, parts: Vec<RowLabeled>) -> Result<R> {
                let found = parts.len();
                let mut parts = parts.into_iter();
                $(
                    let $v = $t::from_row(parts.next().ok_or_else(|| {
                        Error::msg(format!(
                            "Expected {} parts of the joined row, found {}",
                            $parts, found
                        ))
                    })?)?;
                )+
                Ok(self($($v),+))
            }
        }
    };
}

impl_join_map!(2; T1 v1, T2 v2);
impl_join_map!(3; T1 v1, T2 v2, T3 v3);
impl_join_map!(4; T1 v1, T2 v2, T3 v3, T4 v4);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn row(labels: &[&str], values: Vec<i64>) -> RowLabeled {
        RowLabeled::new(
            labels.iter().map(|v| v.to_string()).collect(),
            values.into_iter().map(|v| Value::Int64(Some(v))).collect(),
        )
    }

    #[test]
    fn repeated_marker() {
        let splitter = RowSplitter::new("id", 3).unwrap();
        let labels: Vec<String> = ["id", "name", "ID", "total", "Id", "sku"]
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(splitter.boundaries(&labels).unwrap(), [0, 2, 4]);
    }

    #[test]
    fn distinct_markers() {
        let splitter = RowSplitter::new("order_id, product_id", 3).unwrap();
        let labels: Vec<String> = ["order_id", "user", "order_id", "product_id", "name"]
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(splitter.boundaries(&labels).unwrap(), [0, 2, 3]);
    }

    #[test]
    fn missing_marker() {
        let splitter = RowSplitter::new("code", 2).unwrap();
        let labels = vec!["id".to_string(), "name".to_string()];
        let error = splitter.boundaries(&labels).unwrap_err();
        assert!(error.to_string().contains("`code`"), "{}", error);
        assert!(RowSplitter::new(" , ", 2).is_err());
        assert!(RowSplitter::new("id", 1).is_err());
    }

    #[test]
    fn split_shares_labels() {
        let mut splitter = RowSplitter::new("id", 2).unwrap();
        let first = row(&["id", "a", "id", "b"], vec![1, 2, 3, 4]);
        let second = RowLabeled::new(
            first.labels.clone(),
            vec![Value::Int64(Some(5)), Value::Null, Value::Null, Value::Null].into(),
        );
        let parts = splitter.split(first).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].names(), ["id", "a"]);
        assert_eq!(parts[1].names(), ["id", "b"]);
        assert_eq!(parts[1].values(), [Value::Int64(Some(3)), Value::Int64(Some(4))]);
        let again = splitter.split(second).unwrap();
        assert!(Arc::ptr_eq(&parts[1].labels, &again[1].labels));
        assert_eq!(again[0].values(), [Value::Int64(Some(5)), Value::Null]);
    }

    #[test]
    fn map_closure() {
        let map = |a: RowLabeled, b: RowLabeled| (a.len(), b.len());
        let mut splitter = RowSplitter::new("x", 2).unwrap();
        let parts = splitter
            .split(row(&["id", "v", "x", "y", "z"], vec![1, 2, 3, 4, 5]))
            .unwrap();
        assert_eq!(map.map_row(parts).unwrap(), (2, 3));
        assert_eq!(parts_of(&map), 2);
    }

    fn parts_of<A, R, M: JoinMap<A, R>>(_: &M) -> usize {
        M::PARTS
    }
}

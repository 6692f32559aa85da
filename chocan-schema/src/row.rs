use crate::value::Value;

/// One record, as ordered `(column, value)` pairs.
///
/// Rows returned by the record store follow the table's declared column
/// order. Rows built by callers may use any order; validation only compares
/// the set of column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Row::set`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set `column` to `value`, replacing an existing entry in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_existing_column() {
        let mut row = Row::new().with("ID", 1).with("value", 1.1);
        row.set("value", 2.3);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("value"), Some(&Value::Float(2.3)));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["ID", "value"]);
    }

    #[test]
    fn collects_from_pairs() {
        let row: Row = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(row.get("b"), Some(&Value::Integer(2)));
        assert!(row.get("c").is_none());
    }
}

use std::fmt;

use uuid::Uuid;

/// One component of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Str(String),
    Int(i64),
    Id(Uuid),
    Bool(bool),
    Null,
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for KeyPart {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<i64> for KeyPart {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<usize> for KeyPart {
    fn from(n: usize) -> Self {
        Self::Int(n as i64)
    }
}

impl From<Uuid> for KeyPart {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<bool> for KeyPart {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<KeyPart>> From<Option<T>> for KeyPart {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Int(n) => write!(f, "{}", n),
            Self::Id(id) => write!(f, "{}", id),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => f.write_str("null"),
        }
    }
}

/// Ordered tuple identifying one cached read. Route and filter parameters are
/// part of the key, so changing a filter changes the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new(root: impl Into<KeyPart>) -> Self {
        Self(vec![root.into()])
    }

    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// Prefix match, used by invalidation: `["companies"]` covers
    /// `["companies", id, "events"]`.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", part)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matching() {
        let id = Uuid::new_v4();
        let events = QueryKey::new("companies").with(id).with("events");
        assert!(events.starts_with(&QueryKey::new("companies")));
        assert!(events.starts_with(&QueryKey::new("companies").with(id)));
        assert!(!events.starts_with(&QueryKey::new("companies").with(Uuid::new_v4())));
        assert!(!QueryKey::new("companies").starts_with(&events));
    }

    #[test]
    fn display_is_tuple_like() {
        let key = QueryKey::new("campaigns").with("search").with(None::<String>).with(12usize);
        assert_eq!(key.to_string(), r#"["campaigns", "search", null, 12]"#);
    }
}

//! Query keys: ordered tuples of primitive values.

use std::fmt;

/// One element of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<&String> for KeyPart {
    fn from(value: &String) -> Self {
        KeyPart::Str(value.clone())
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Bool(value)
    }
}

macro_rules! int_key_part {
    ($($t:ty),*) => {
        $(
            impl From<$t> for KeyPart {
                fn from(value: $t) -> Self {
                    KeyPart::Int(value as i64)
                }
            }
        )*
    };
}

int_key_part!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for KeyPart {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(KeyPart::Int)
            .unwrap_or_else(|_| KeyPart::Str(value.to_string()))
    }
}

impl From<usize> for KeyPart {
    fn from(value: usize) -> Self {
        KeyPart::from(value as u64)
    }
}

impl<T: Into<KeyPart>> From<Option<T>> for KeyPart {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(KeyPart::None)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::None => write!(f, "null"),
            KeyPart::Bool(b) => write!(f, "{b}"),
            KeyPart::Int(i) => write!(f, "{i}"),
            KeyPart::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Identity of a cached read, e.g. `["note", "n1"]` or `["sales", 1, 10]`.
///
/// Keys compare element-wise; [`QueryKey::starts_with`] drives invalidation,
/// so a short key like `["notes"]` addresses every notes query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn from_parts(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    /// Append one more element.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `prefix` matches the leading elements of this key.
    /// The empty key is a prefix of everything.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, "]")
    }
}

/// Build a [`QueryKey`] from heterogeneous primitives.
///
/// ```rust
/// use notemarket::query_key;
///
/// let key = query_key!["sales", 2u32, 10u32];
/// assert_eq!(key.to_string(), r#"["sales", 2, 10]"#);
/// assert!(key.starts_with(&query_key!["sales"]));
/// ```
#[macro_export]
macro_rules! query_key {
    () => {
        $crate::cache::QueryKey::from_parts(Vec::new())
    };
    ($($part:expr),+ $(,)?) => {
        $crate::cache::QueryKey::from_parts(vec![$($crate::cache::KeyPart::from($part)),+])
    };
}

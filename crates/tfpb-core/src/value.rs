//! Three-state attribute values.
//!
//! The host hands the provider plan and state values that are either absent
//! (`Null`), not yet computable during planning (`Unknown`), or set.

use serde::{Deserialize, Serialize};

/// An attribute value as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value<T> {
    Null,
    Unknown,
    Known(T),
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Value::Null
    }
}

impl<T> Value<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// The value when it is set, `None` for null and unknown.
    pub fn known(&self) -> Option<&T> {
        match self {
            Value::Known(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_known(self) -> Option<T> {
        match self {
            Value::Known(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Value::Known(v),
            None => Value::Null,
        }
    }
}

impl Value<String> {
    /// Shorthand for a set string value.
    pub fn string(v: impl Into<String>) -> Self {
        Value::Known(v.into())
    }

    /// The string, or `""` for null and unknown.
    pub fn value_str(&self) -> &str {
        self.known().map(String::as_str).unwrap_or("")
    }
}

impl Value<bool> {
    /// The flag, or `false` for null and unknown.
    pub fn value_bool(&self) -> bool {
        self.known().copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_unknown_read_as_empty() {
        assert_eq!(Value::<String>::Null.value_str(), "");
        assert_eq!(Value::<String>::Unknown.value_str(), "");
        assert_eq!(Value::string("x").value_str(), "x");
    }

    #[test]
    fn known_only_for_set_values() {
        assert!(Value::<bool>::Unknown.known().is_none());
        assert_eq!(Value::Known(true).known(), Some(&true));
        assert!(!Value::<bool>::Null.value_bool());
    }

    #[test]
    fn from_option() {
        assert_eq!(Value::from(Some(3)), Value::Known(3));
        assert_eq!(Value::<i32>::from(None), Value::Null);
    }

    #[test]
    fn default_is_null() {
        let v: Value<String> = Value::default();
        assert!(v.is_null());
    }
}

use std::fmt;

use serde_json::Value;

/// A JSON document returned by the tracker's REST API.
///
/// Ontrack resources expose their links as `_`-prefixed string fields
/// (`_self`, `_builds`...).
#[derive(Debug, Clone, PartialEq)]
pub struct Resource(Value);

impl Resource {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// JSON pointer lookup, e.g. `/project/name`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        self.str("name")
    }

    /// URL of the named link, without its `_` prefix.
    pub fn link(&self, name: &str) -> Option<&str> {
        self.str(&format!("_{}", name.trim_start_matches('_')))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Resource {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

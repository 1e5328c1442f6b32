//! Dynamic values passed through stand-in members.
//!
//! Arguments, results and instance properties are all [`Value`]s. Instance
//! state lives in [`Slot`]s so that a handle obtained from a stand-in keeps
//! aliasing the stand-in's own storage.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Dynamic value for member arguments and results.
///
/// Wraps serde_json::Value so records can be compared, printed and
/// serialized without any knowledge of the stood-in type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(pub JsonValue);

impl Value {
    /// Create a null value.
    pub fn null() -> Self {
        Self(JsonValue::Null)
    }

    /// Create a boolean value.
    pub fn bool(v: bool) -> Self {
        Self(JsonValue::Bool(v))
    }

    /// Create an integer value.
    pub fn int(v: i64) -> Self {
        Self(JsonValue::Number(v.into()))
    }

    /// Create a string value.
    pub fn string(v: impl Into<String>) -> Self {
        Self(JsonValue::String(v.into()))
    }

    /// Create an array value from a list of values.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self(JsonValue::Array(
            items.into_iter().map(Value::into_inner).collect(),
        ))
    }

    /// Create an empty object value.
    pub fn object() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Check if the value is a boolean.
    pub fn is_bool(&self) -> bool {
        self.0.is_boolean()
    }

    /// Check if the value is a string.
    pub fn is_string(&self) -> bool {
        self.0.is_string()
    }

    /// Check if the value is an array.
    pub fn is_array(&self) -> bool {
        self.0.is_array()
    }

    /// Number of elements for arrays and objects, characters for strings.
    ///
    /// Scalars report zero.
    pub fn len(&self) -> usize {
        match &self.0 {
            JsonValue::Array(items) => items.len(),
            JsonValue::Object(map) => map.len(),
            JsonValue::String(s) => s.chars().count(),
            _ => 0,
        }
    }

    /// Check if [`Value::len`] is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append to an array value. A null value becomes a one-element array.
    ///
    /// Returns false when the value is neither null nor an array.
    pub fn push(&mut self, item: Value) -> bool {
        if self.0.is_null() {
            self.0 = JsonValue::Array(Vec::new());
        }
        match &mut self.0 {
            JsonValue::Array(items) => {
                items.push(item.into_inner());
                true
            }
            _ => false,
        }
    }

    /// Get an array element or object field.
    pub fn get(&self, key: impl ValueIndex) -> Option<Value> {
        key.index_into(&self.0).cloned().map(Value)
    }

    /// Convert to string if possible.
    pub fn as_string(&self) -> Option<String> {
        match &self.0 {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            JsonValue::Null => None,
            _ => Some(self.0.to_string()),
        }
    }

    /// Borrow the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Convert to bool if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        self.0.as_bool()
    }

    /// Access the array elements, if this is an array.
    pub fn as_array(&self) -> Option<Vec<Value>> {
        self.0
            .as_array()
            .map(|items| items.iter().cloned().map(Value).collect())
    }

    /// Convert into the inner serde_json::Value.
    pub fn into_inner(self) -> JsonValue {
        self.0
    }
}

/// Index types accepted by [`Value::get`].
pub trait ValueIndex {
    /// Look the index up in a JSON value.
    fn index_into<'v>(&self, value: &'v JsonValue) -> Option<&'v JsonValue>;
}

impl ValueIndex for usize {
    fn index_into<'v>(&self, value: &'v JsonValue) -> Option<&'v JsonValue> {
        value.get(*self)
    }
}

impl ValueIndex for &str {
    fn index_into<'v>(&self, value: &'v JsonValue) -> Option<&'v JsonValue> {
        value.get(*self)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Self(v)
    }
}

impl From<Value> for JsonValue {
    fn from(v: Value) -> Self {
        v.0
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::string(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::bool(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::array(items)
    }
}

/// Shared, mutable storage for one instance property.
///
/// Cloning a slot clones the handle, not the value: every clone reads and
/// writes the same cell.
#[derive(Debug, Clone, Default)]
pub struct Slot(Arc<RwLock<Value>>);

impl Slot {
    /// Create a slot holding `value`.
    pub fn new(value: Value) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Copy the current value out.
    pub fn get(&self) -> Value {
        self.0.read().clone()
    }

    /// Replace the current value.
    pub fn set(&self, value: impl Into<Value>) {
        *self.0.write() = value.into();
    }

    /// Borrow the value for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.0.read()
    }

    /// Borrow the value for in-place mutation.
    pub fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.0.write()
    }

    /// Check whether two handles alias the same cell.
    pub fn ptr_eq(&self, other: &Slot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_field_access() {
        let value = Value(json!({"name": "test", "tags": ["a", "b"]}));
        assert_eq!(value.get("name"), Some(Value::string("test")));
        assert_eq!(value.get("tags").map(|tags| tags.len()), Some(2));
        assert_eq!(value.len(), 2);
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn push_turns_null_into_array() {
        let mut value = Value::null();
        assert!(value.push(Value::string("Content-type: text/html")));
        assert!(value.push(Value::int(2)));
        assert_eq!(value, Value(json!(["Content-type: text/html", 2])));

        let mut scalar = Value::int(1);
        assert!(!scalar.push(Value::int(2)));
    }

    #[test]
    fn array_index_access() {
        let value = Value::array(vec![Value::string("foo"), Value::bool(false)]);
        assert_eq!(value.get(0usize), Some(Value::string("foo")));
        assert_eq!(value.get(1usize).and_then(|v| v.as_bool()), Some(false));
        assert!(value.get(2usize).is_none());
    }

    #[test]
    fn len_of_scalars_is_zero() {
        assert_eq!(Value::bool(true).len(), 0);
        assert!(Value::null().is_empty());
        assert_eq!(Value::string("abc").len(), 3);
    }

    #[test]
    fn slot_clones_alias_the_same_cell() {
        let slot = Slot::new(Value::string("foo"));
        let alias = slot.clone();

        alias.set("bar");
        assert_eq!(slot.get(), Value::string("bar"));
        assert!(slot.ptr_eq(&alias));

        assert!(!slot.ptr_eq(&Slot::new(Value::string("bar"))));
    }
}

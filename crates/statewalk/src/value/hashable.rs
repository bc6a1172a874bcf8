//! Hashable wrapper for Value to enable use as dictionary keys and set elements

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::Value;

/// A wrapper for Value that implements Hash and Eq.
///
/// Value-like data hashes by content (floats by bit pattern, so `NaN` keys
/// are usable). Heap instances hash by identity, matching their `PartialEq`.
#[derive(Debug, Clone)]
pub struct HashableValue(pub Value);

impl HashableValue {
    /// The wrapped value
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwrap
    pub fn into_inner(self) -> Value {
        self.0
    }
}

fn identity<T: ?Sized>(ptr: &Arc<T>) -> usize {
    Arc::as_ptr(ptr) as *const () as usize
}

impl Hash for HashableValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash the discriminant first
        std::mem::discriminant(&self.0).hash(state);

        match &self.0 {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Char(c) => c.hash(state),
            Value::I8(n) => n.hash(state),
            Value::I16(n) => n.hash(state),
            Value::I32(n) => n.hash(state),
            Value::I64(n) => n.hash(state),
            Value::U8(n) => n.hash(state),
            Value::U16(n) => n.hash(state),
            Value::U32(n) => n.hash(state),
            Value::U64(n) => n.hash(state),
            Value::F32(n) => n.to_bits().hash(state),
            Value::F64(n) => n.to_bits().hash(state),
            Value::Handle(h) => h.hash(state),
            Value::String(s) => s.hash(state),
            Value::Enum(e) => e.hash(state),
            Value::Unused(m) => m.hash(state),
            Value::Type(t) => t.hash(state),
            Value::Member(m) => m.hash(state),
            Value::Array(a) | Value::Enumerable(a) => identity(a).hash(state),
            Value::Collection(c) => identity(c).hash(state),
            Value::Object(o) => identity(o).hash(state),
            Value::Delegate(d) => identity(d).hash(state),
        }
    }
}

impl PartialEq for HashableValue {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            // Delegate to Value's PartialEq
            (a, b) => a == b,
        }
    }
}

impl Eq for HashableValue {}

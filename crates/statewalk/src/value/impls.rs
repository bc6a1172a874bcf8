//! Value trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use super::*;
use crate::types::names;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create an enum value
    pub fn enumeration(type_name: TypeName, variant: impl Into<String>) -> Self {
        Value::Enum(EnumValue::new(type_name, variant))
    }

    /// Wrap a new object instance
    pub fn object(object: ObjectValue) -> Self {
        Value::Object(Arc::new(RwLock::new(object)))
    }

    /// Wrap a new fixed-size array
    pub fn array(element_type: TypeName, items: Vec<Value>) -> Self {
        Value::Array(Arc::new(RwLock::new(SequenceValue::new(element_type, items))))
    }

    /// Wrap a new non-generic enumerable
    pub fn enumerable(element_type: TypeName, items: Vec<Value>) -> Self {
        Value::Enumerable(Arc::new(RwLock::new(SequenceValue::new(element_type, items))))
    }

    /// Wrap a new generic container
    pub fn collection(collection: CollectionValue) -> Self {
        Value::Collection(Arc::new(RwLock::new(collection)))
    }

    /// Wrap a new delegate
    pub fn delegate(delegate: DelegateValue) -> Self {
        Value::Delegate(Arc::new(RwLock::new(delegate)))
    }

    /// Wrap a member descriptor
    pub fn member(member: MemberInfo) -> Self {
        Value::Member(Arc::new(member))
    }

    /// The uninitialized value of a slot of the given declared type
    pub fn zeroed(ty: &TypeName) -> Self {
        if ty.is_generic() {
            return Value::Null;
        }
        match ty.name() {
            names::BOOL => Value::Bool(false),
            names::CHAR => Value::Char('\0'),
            names::I8 => Value::I8(0),
            names::I16 => Value::I16(0),
            names::I32 => Value::I32(0),
            names::I64 => Value::I64(0),
            names::U8 => Value::U8(0),
            names::U16 => Value::U16(0),
            names::U32 => Value::U32(0),
            names::U64 => Value::U64(0),
            names::F32 => Value::F32(0.0),
            names::F64 => Value::F64(0.0),
            _ => Value::Null,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is an inline primitive
    pub fn is_primitive(&self) -> bool {
        self.primitive_type().is_some()
    }

    /// Check if value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check if value is an object instance
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Check if value is a delegate
    pub fn is_delegate(&self) -> bool {
        matches!(self, Value::Delegate(_))
    }

    /// Check if value is a shared heap instance
    pub fn is_heap(&self) -> bool {
        matches!(
            self,
            Value::Array(_)
                | Value::Enumerable(_)
                | Value::Collection(_)
                | Value::Object(_)
                | Value::Delegate(_)
        )
    }

    /// Name of the primitive type of an inline primitive
    pub fn primitive_type(&self) -> Option<&'static str> {
        Some(match self {
            Value::Bool(_) => names::BOOL,
            Value::Char(_) => names::CHAR,
            Value::I8(_) => names::I8,
            Value::I16(_) => names::I16,
            Value::I32(_) => names::I32,
            Value::I64(_) => names::I64,
            Value::U8(_) => names::U8,
            Value::U16(_) => names::U16,
            Value::U32(_) => names::U32,
            Value::U64(_) => names::U64,
            Value::F32(_) => names::F32,
            Value::F64(_) => names::F64,
            _ => return None,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as i64 (converts from smaller integer types)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(n) => Some(*n as i64),
            Value::I16(n) => Some(*n as i64),
            Value::I32(n) => Some(*n as i64),
            Value::I64(n) => Some(*n),
            // Unsigned that fit
            Value::U8(n) => Some(*n as i64),
            Value::U16(n) => Some(*n as i64),
            Value::U32(n) => Some(*n as i64),
            Value::U64(n) => (*n).try_into().ok(),
            _ => None,
        }
    }

    /// Extract as f64 (converts from f32)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(n) => Some(*n as f64),
            Value::F64(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract object instance
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Extract array or enumerable elements
    pub fn as_sequence(&self) -> Option<&SequenceRef> {
        match self {
            Value::Array(s) | Value::Enumerable(s) => Some(s),
            _ => None,
        }
    }

    /// Extract generic container
    pub fn as_collection(&self) -> Option<&CollectionRef> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Extract delegate
    pub fn as_delegate(&self) -> Option<&DelegateRef> {
        match self {
            Value::Delegate(d) => Some(d),
            _ => None,
        }
    }

    /// Read a field of an object value
    pub fn field(&self, name: &str) -> Option<Value> {
        self.as_object()
            .and_then(|object| object.read().get(name).cloned())
    }

    /// Whether two values are the same heap instance
    pub fn same_instance(&self, other: &Value) -> bool {
        self.is_heap() && self == other
    }

    // ═══════════════════════════════════════════════════════════════════
    // Structural Equality
    // ═══════════════════════════════════════════════════════════════════

    /// Deep comparison that looks through heap identity.
    ///
    /// Two graphs are structurally equal when they have the same shape and
    /// equal leaves. Cycles are handled by assuming a pair of instances that
    /// is already being compared is equal.
    pub fn structural_eq(&self, other: &Value) -> bool {
        let mut visiting = HashSet::new();
        structural_eq(self, other, &mut visiting)
    }
}

type Visiting = HashSet<(usize, usize)>;

fn pair<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> (usize, usize) {
    (
        Arc::as_ptr(a) as *const () as usize,
        Arc::as_ptr(b) as *const () as usize,
    )
}

fn structural_eq(a: &Value, b: &Value, visiting: &mut Visiting) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) | (Value::Enumerable(x), Value::Enumerable(y)) => {
            if Arc::ptr_eq(x, y) || !visiting.insert(pair(x, y)) {
                return true;
            }
            let (x, y) = (x.read().clone(), y.read().clone());
            x.element_type == y.element_type && all_eq(&x.items, &y.items, visiting)
        }

        (Value::Object(x), Value::Object(y)) => {
            if Arc::ptr_eq(x, y) || !visiting.insert(pair(x, y)) {
                return true;
            }
            let (x, y) = (x.read().clone(), y.read().clone());
            x.type_name == y.type_name
                && x.fields.len() == y.fields.len()
                && x.fields.iter().all(|(name, xv)| {
                    y.fields
                        .get(name)
                        .is_some_and(|yv| structural_eq(xv, yv, visiting))
                })
                && x.events.len() == y.events.len()
                && x.events.iter().all(|(name, xs)| {
                    y.events.get(name).is_some_and(|ys| {
                        xs.len() == ys.len()
                            && xs.iter().zip(ys).all(|(xd, yd)| {
                                structural_eq(
                                    &Value::Delegate(xd.clone()),
                                    &Value::Delegate(yd.clone()),
                                    visiting,
                                )
                            })
                    })
                })
        }

        (Value::Collection(x), Value::Collection(y)) => {
            if Arc::ptr_eq(x, y) || !visiting.insert(pair(x, y)) {
                return true;
            }
            let (x, y) = (x.read().clone(), y.read().clone());
            if x.type_name != y.type_name || x.len() != y.len() {
                return false;
            }
            match (&x.items, &y.items) {
                (CollectionItems::List(xs), CollectionItems::List(ys)) => all_eq(xs, ys, visiting),
                (CollectionItems::Map(xs), CollectionItems::Map(ys)) => xs.iter().all(|(xk, xv)| {
                    ys.iter()
                        .any(|(yk, yv)| trial(visiting, |v| {
                            structural_eq(&xk.0, &yk.0, v) && structural_eq(xv, yv, v)
                        }))
                }),
                (CollectionItems::Set(xs), CollectionItems::Set(ys)) => xs.iter().all(|xk| {
                    ys.iter()
                        .any(|yk| trial(visiting, |v| structural_eq(&xk.0, &yk.0, v)))
                }),
                _ => false,
            }
        }

        (Value::Delegate(x), Value::Delegate(y)) => {
            if Arc::ptr_eq(x, y) || !visiting.insert(pair(x, y)) {
                return true;
            }
            let (x, y) = (x.read().clone(), y.read().clone());
            x.delegate_type == y.delegate_type
                && x.method == y.method
                && match (&x.target, &y.target) {
                    (None, None) => true,
                    (Some(xt), Some(yt)) => structural_eq(xt, yt, visiting),
                    _ => false,
                }
        }

        _ => a == b,
    }
}

fn all_eq(xs: &[Value], ys: &[Value], visiting: &mut Visiting) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| structural_eq(x, y, visiting))
}

/// Run a comparison that may fail without leaking its cycle assumptions.
fn trial(visiting: &mut Visiting, compare: impl FnOnce(&mut Visiting) -> bool) -> bool {
    let mut attempt = visiting.clone();
    let equal = compare(&mut attempt);
    if equal {
        *visiting = attempt;
    }
    equal
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,

            // Primitives
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,

            // Value-like data
            (Value::Handle(a), Value::Handle(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Unused(a), Value::Unused(b)) => a == b,

            // Heap instances are equal only if they're the same Arc
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Enumerable(a), Value::Enumerable(b)) => Arc::ptr_eq(a, b),
            (Value::Collection(a), Value::Collection(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Delegate(a), Value::Delegate(b)) => Arc::ptr_eq(a, b),

            // Descriptors are canonical, so compare by value
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Member(a), Value::Member(b)) => a == b,

            // Different types are never equal
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::$variant(n)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    NativeHandle => Handle,
    UnusedMarker => Unused,
    EnumValue => Enum,
    TypeName => Type,
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

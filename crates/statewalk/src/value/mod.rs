//! Value representation for script runtime state

mod callable;
mod compound;
mod display;
mod hashable;
mod impls;
mod marker;

pub use callable::{DelegateValue, MemberInfo, MemberKind, MethodFn};
pub use compound::{CollectionItems, CollectionValue, EnumValue, ObjectValue, SequenceValue};
pub use hashable::HashableValue;
pub use marker::UnusedMarker;

use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::TypeName;

/// Shared, mutable object instance
pub type ObjectRef = Arc<RwLock<ObjectValue>>;

/// Shared, mutable array or non-generic enumerable
pub type SequenceRef = Arc<RwLock<SequenceValue>>;

/// Shared, mutable generic container
pub type CollectionRef = Arc<RwLock<CollectionValue>>;

/// Shared delegate
pub type DelegateRef = Arc<RwLock<DelegateValue>>;

/// An opaque native pointer. Never dereferenced, only carried as 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

/// Runtime value of a script slot.
///
/// Values are organized into three tiers:
/// - Tier 1: Inline primitives and value-like data (copied on every edge)
/// - Tier 2: Shared heap instances (`Arc`-wrapped, compared by identity)
/// - Tier 3: Reflective descriptors (types and members, compared by value)
#[derive(Clone, Default)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: Inline Primitives and Value-Like Data
    // ═══════════════════════════════════════════════════════════════════
    /// Empty slot
    #[default]
    Null,

    /// Boolean
    Bool(bool),

    /// Unicode scalar value
    Char(char),

    /// 8-bit signed integer
    I8(i8),
    /// 16-bit signed integer
    I16(i16),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),

    /// 8-bit unsigned integer
    U8(u8),
    /// 16-bit unsigned integer
    U16(u16),
    /// 32-bit unsigned integer
    U32(u32),
    /// 64-bit unsigned integer
    U64(u64),

    /// 32-bit floating point
    F32(f32),
    /// 64-bit floating point
    F64(f64),

    /// Opaque native handle
    Handle(NativeHandle),

    /// Immutable text
    String(Arc<String>),

    /// Named enum constant
    Enum(EnumValue),

    /// "Intentionally left unset" sentinel
    Unused(UnusedMarker),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Shared Heap Instances
    // ═══════════════════════════════════════════════════════════════════
    /// Fixed-size array
    Array(SequenceRef),

    /// Non-generic enumerable
    Enumerable(SequenceRef),

    /// Generic container: list, dictionary or set
    Collection(CollectionRef),

    /// Class instance
    Object(ObjectRef),

    /// Bound or static method reference
    Delegate(DelegateRef),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 3: Reflective Descriptors
    // ═══════════════════════════════════════════════════════════════════
    /// A type, as a value
    Type(TypeName),

    /// A field, property or method, as a value
    Member(Arc<MemberInfo>),
}

//! Shape tags and the classifier that assigns them

use std::fmt;

use crate::value::Value;

/// The closed set of record shapes a node can be written as.
///
/// Variant order matters: every tag from [`ShapeTag::Array`] on is
/// reference-eligible, everything before it is value-like and always
/// re-encoded in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeTag {
    /// Empty slot
    Null,
    /// Back-reference to an earlier record
    Reference,
    /// Enum constant
    Enum,
    /// Boxed primitive
    Any,
    /// Text
    String,
    /// Opaque native handle
    Handle,
    /// Typed "unset" sentinel
    UnusedMarker,

    // Reference-eligible from here on
    /// Fixed-size array
    Array,
    /// Non-generic enumerable
    Enumerable,
    /// Generic list, dictionary or set
    GenericEnumerable,
    /// Object walked field by field (or self-describing)
    Object,
    /// Field, property or method descriptor
    MemberInfo,
    /// Delegate
    Delegate,
    /// Type descriptor
    Type,
}

impl ShapeTag {
    /// Every tag, in stream order
    pub const ALL: [ShapeTag; 14] = [
        ShapeTag::Null,
        ShapeTag::Reference,
        ShapeTag::Enum,
        ShapeTag::Any,
        ShapeTag::String,
        ShapeTag::Handle,
        ShapeTag::UnusedMarker,
        ShapeTag::Array,
        ShapeTag::Enumerable,
        ShapeTag::GenericEnumerable,
        ShapeTag::Object,
        ShapeTag::MemberInfo,
        ShapeTag::Delegate,
        ShapeTag::Type,
    ];

    /// Whether aliasing of values with this shape is preserved
    pub fn is_reference_eligible(self) -> bool {
        self >= ShapeTag::Array
    }

    /// Stream spelling
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeTag::Null => "Null",
            ShapeTag::Reference => "Reference",
            ShapeTag::Enum => "Enum",
            ShapeTag::Any => "Any",
            ShapeTag::String => "String",
            ShapeTag::Handle => "Handle",
            ShapeTag::UnusedMarker => "UnusedMarker",
            ShapeTag::Array => "Array",
            ShapeTag::Enumerable => "Enumerable",
            ShapeTag::GenericEnumerable => "GenericEnumerable",
            ShapeTag::Object => "Object",
            ShapeTag::MemberInfo => "MemberInfo",
            ShapeTag::Delegate => "Delegate",
            ShapeTag::Type => "Type",
        }
    }

    /// Parse the stream spelling
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

impl fmt::Display for ShapeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide which shape a value is written as.
///
/// The value model is a closed enum, so each variant maps to exactly one
/// shape; overlapping runtime categories (an array is also enumerable, an
/// enum is also value-like) were already separated when the value was built.
/// The arms below follow the priority order of those categories.
pub fn classify(value: &Value) -> ShapeTag {
    match value {
        Value::Null => ShapeTag::Null,
        Value::Handle(_) => ShapeTag::Handle,
        Value::Enum(_) => ShapeTag::Enum,
        Value::Bool(_)
        | Value::Char(_)
        | Value::I8(_)
        | Value::I16(_)
        | Value::I32(_)
        | Value::I64(_)
        | Value::U8(_)
        | Value::U16(_)
        | Value::U32(_)
        | Value::U64(_)
        | Value::F32(_)
        | Value::F64(_) => ShapeTag::Any,
        Value::String(_) => ShapeTag::String,
        Value::Unused(_) => ShapeTag::UnusedMarker,
        Value::Array(_) => ShapeTag::Array,
        Value::Enumerable(_) => ShapeTag::Enumerable,
        Value::Collection(_) => ShapeTag::GenericEnumerable,
        Value::Type(_) => ShapeTag::Type,
        Value::Delegate(_) => ShapeTag::Delegate,
        Value::Member(_) => ShapeTag::MemberInfo,
        Value::Object(_) => ShapeTag::Object,
    }
}

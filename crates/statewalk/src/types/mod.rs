//! Runtime type metadata: names, definitions and the registry

mod def;
mod name;
mod registry;

pub use def::{
    CollectionContracts, EventDef, FieldDef, MethodDef, PropertyDef, TypeDef, TypeKind,
};
pub use name::TypeName;
pub use registry::TypeRegistry;

/// Names of the builtin types every [`TypeRegistry::new`] starts with.
pub mod names {
    /// `bool`
    pub const BOOL: &str = "bool";
    /// `char`
    pub const CHAR: &str = "char";
    /// `i8`
    pub const I8: &str = "i8";
    /// `i16`
    pub const I16: &str = "i16";
    /// `i32`
    pub const I32: &str = "i32";
    /// `i64`
    pub const I64: &str = "i64";
    /// `u8`
    pub const U8: &str = "u8";
    /// `u16`
    pub const U16: &str = "u16";
    /// `u32`
    pub const U32: &str = "u32";
    /// `u64`
    pub const U64: &str = "u64";
    /// `f32`
    pub const F32: &str = "f32";
    /// `f64`
    pub const F64: &str = "f64";

    /// All primitive type names
    pub const PRIMITIVES: [&str; 12] = [BOOL, CHAR, I8, I16, I32, I64, U8, U16, U32, U64, F32, F64];

    /// Text
    pub const STRING: &str = "String";
    /// Root class with no fields
    pub const OBJECT: &str = "Object";
    /// Engine vector `{ x, y, z: f32 }`
    pub const VEC3: &str = "Vec3";
    /// `List<T>`
    pub const LIST: &str = "List";
    /// `Dictionary<K, V>`
    pub const DICTIONARY: &str = "Dictionary";
    /// `HashSet<T>`
    pub const HASH_SET: &str = "HashSet";
    /// Parameterless callback delegate
    pub const ACTION: &str = "Action";
    /// Event handler delegate
    pub const EVENT_HANDLER: &str = "EventHandler";
}

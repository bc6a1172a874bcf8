//! # Statewalk
//!
//! An object-graph serializer for live script state.
//!
//! Statewalk snapshots an arbitrary runtime graph (objects, arrays,
//! generic containers, delegates, type and member descriptors) to a
//! line-oriented text stream and rebuilds an equivalent live graph from it,
//! for example across a script reload. No schema is known in advance: types
//! are described by a reflective [`TypeRegistry`] and every record carries
//! enough type information to be rebuilt on its own.
//!
//! ## Architecture
//!
//! - **Values**: dynamic [`Value`] graph with shared, lockable heap instances
//! - **Types**: [`TypeRegistry`] of classes, enums, delegates and containers
//! - **Serializer**: depth-first [`Serializer::write`] and [`Serializer::read`]
//!   with back-references for shared instances and cycles
//! - **Archive**: escape hatch for types that encode themselves
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use statewalk::{ObjectValue, Serializer, TypeDef, TypeName, TypeRegistry, Value};
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry
//!     .register(TypeDef::class("Node").with_field("Next", TypeName::new("Node")))
//!     .unwrap();
//!
//! // A node that points at itself
//! let node = Value::object(ObjectValue::new(TypeName::new("Node")));
//! node.as_object().unwrap().write().set("Next", node.clone());
//!
//! let mut serializer = Serializer::new(registry);
//! let text = serializer.serialize_to_string(&node).unwrap();
//! let back = serializer.deserialize_from_string(&text).unwrap();
//! assert!(back.field("Next").unwrap().same_instance(&back));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod serialize;
pub mod types;
pub mod value;

// Re-export main types
pub use config::{SerializationTarget, SerializerConfig, DEFAULT_MAX_DEPTH};
pub use error::{RegistryError, Result, SerializeError};
pub use serialize::{
    classify, Archive, ObjectReference, Serializable, Serializer, ShapeTag, FORMAT_HEADER,
};
pub use types::{
    names, CollectionContracts, EventDef, FieldDef, MethodDef, PropertyDef, TypeDef, TypeKind,
    TypeName, TypeRegistry,
};
pub use value::{
    CollectionItems, CollectionRef, CollectionValue, DelegateRef, DelegateValue, EnumValue,
    HashableValue, MemberInfo, MemberKind, MethodFn, NativeHandle, ObjectRef, ObjectValue,
    SequenceRef, SequenceValue, UnusedMarker, Value,
};

/// Statewalk version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Object-graph serializer
//!
//! Writes a live [`Value`] graph to a line-oriented text stream and rebuilds
//! an equivalent graph from it. Shared instances and cycles survive the round
//! trip: the second time a reference-eligible value is met, only the position
//! of its first record is written.

mod archive;
mod codec;
mod reader;
mod refs;
mod shape;
mod writer;

pub use archive::{Archive, Serializable};
pub use codec::FORMAT_HEADER;
pub use shape::{classify, ShapeTag};

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::config::SerializerConfig;
use crate::error::Result;
use crate::types::TypeRegistry;
use crate::value::Value;
use reader::GraphReader;
use writer::GraphWriter;

/// Delegate record marker: a target node follows
pub(crate) const TARGET: &str = "target";

/// Delegate record marker: static method, no target
pub(crate) const NULL_TARGET: &str = "null_target";

/// A named slot in the graph: the unit the writer emits and the reader
/// returns.
#[derive(Debug, Clone)]
pub struct ObjectReference {
    /// Field name, element index or `key_i`/`value_i`
    pub name: String,

    /// How the value is encoded
    pub shape: ShapeTag,

    /// The slot's contents
    pub value: Value,

    /// Whether the slot may legitimately be `Null`
    pub allow_null: bool,
}

impl ObjectReference {
    /// A non-nullable slot
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            shape: classify(&value),
            value,
            allow_null: false,
        }
    }

    /// A slot that may hold `Null`
    pub fn nullable(name: impl Into<String>, value: Value) -> Self {
        Self {
            allow_null: true,
            ..Self::new(name, value)
        }
    }
}

/// Reads and writes object graphs against one type registry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use statewalk::{ObjectValue, Serializer, TypeName, TypeRegistry, Value};
///
/// let registry = Arc::new(TypeRegistry::new());
/// let mut serializer = Serializer::new(registry);
///
/// let point = Value::object(
///     ObjectValue::new(TypeName::new("Vec3"))
///         .with_field("x", Value::F32(1.0))
///         .with_field("y", Value::F32(2.0))
///         .with_field("z", Value::F32(3.0)),
/// );
/// let text = serializer.serialize_to_string(&point).unwrap();
/// let back = serializer.deserialize_from_string(&text).unwrap();
/// assert!(back.structural_eq(&point));
/// ```
#[derive(Debug, Clone)]
pub struct Serializer {
    registry: Arc<TypeRegistry>,
    config: SerializerConfig,
    partial_read: bool,
}

impl Serializer {
    /// Create a non-strict serializer.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, SerializerConfig::default())
    }

    /// Create a serializer with explicit settings.
    pub fn with_config(registry: Arc<TypeRegistry>, config: SerializerConfig) -> Self {
        Self {
            registry,
            config,
            partial_read: false,
        }
    }

    /// The registry types are resolved against
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The settings this serializer was built with
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Whether the last `read` restored only part of some self-describing
    /// type's state.
    pub fn partial_read(&self) -> bool {
        self.partial_read
    }

    /// Write the graph rooted at `root` to `stream`.
    ///
    /// Fails with [`EmptyGraph`](crate::SerializeError::EmptyGraph) for a
    /// `Null` root. On error the stream may hold a partial record sequence.
    pub fn write<W: Write>(&self, root: &ObjectReference, stream: W) -> Result<()> {
        GraphWriter::new(stream, &self.registry, &self.config).write(root)
    }

    /// Rebuild one graph from `stream`.
    ///
    /// All-or-nothing: on error no partial graph is returned.
    pub fn read<R: BufRead>(&mut self, stream: R) -> Result<ObjectReference> {
        self.partial_read = false;
        let (root, partial_read) = GraphReader::new(stream, &self.registry, &self.config).read()?;
        self.partial_read = partial_read;
        Ok(root)
    }

    /// Write a graph into a fresh string.
    pub fn serialize_to_string(&self, graph: &Value) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(&ObjectReference::new("root", graph.clone()), &mut buffer)?;
        let text = String::from_utf8(buffer)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        Ok(text)
    }

    /// Rebuild a graph from a string produced by [`serialize_to_string`](Self::serialize_to_string).
    pub fn deserialize_from_string(&mut self, text: &str) -> Result<Value> {
        Ok(self.read(text.as_bytes())?.value)
    }
}

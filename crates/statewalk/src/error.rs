//! Error types for graph serialization

use thiserror::Error;

/// Errors raised while building or querying a [`TypeRegistry`](crate::TypeRegistry).
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A type with the same definition key is already registered
    #[error("Type already registered: {0}")]
    DuplicateType(String),

    /// No type with this name (and arity) is registered
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// A type name could not be parsed
    #[error("Invalid type name `{name}`: {message}")]
    InvalidTypeName {
        /// The offending text
        name: String,
        /// Parser diagnostic
        message: String,
    },

    /// No member with this name (and overload) exists on the type
    #[error("Unknown member `{member}` on `{type_name}`")]
    UnknownMember {
        /// Declaring type
        type_name: String,
        /// Member name
        member: String,
    },

    /// The type has no uninitialized-instance form (primitives, enums, delegates)
    #[error("Type `{0}` cannot be instantiated")]
    NotInstantiable(String),

    /// A field name appears twice along one inheritance chain
    #[error("Field `{field}` of `{type_name}` shadows a field of the same name in a base type")]
    DuplicateField {
        /// The type declaring the shadowing field
        type_name: String,
        /// The field name
        field: String,
    },
}

/// Main error type for serializer operations.
///
/// Every variant is fatal: the in-flight `write`/`read` call is aborted and no
/// partial graph is returned.
#[derive(Error, Debug)]
pub enum SerializeError {
    /// `write` was handed a `Null` root
    #[error("Cannot serialize an empty graph")]
    EmptyGraph,

    /// `read` was handed a stream with no records
    #[error("Cannot deserialize from an empty stream")]
    EmptyStream,

    /// The underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was not produced by a compatible writer
    #[error("Unsupported stream format: {found:?}")]
    UnsupportedFormat {
        /// The header line that was found
        found: String,
    },

    /// The stream ended in the middle of a record
    #[error("Unexpected end of stream at line {position}")]
    UnexpectedEof {
        /// Line index where a record was expected
        position: usize,
    },

    /// A line could not be decoded as the expected field
    #[error("Malformed record at line {position}: {message}")]
    Malformed {
        /// Line index of the bad record
        position: usize,
        /// What was expected
        message: String,
    },

    /// A back-reference points at a position that was never registered
    #[error("Unresolved back-reference to line {target} (at line {position})")]
    UnresolvedReference {
        /// Line index of the reference record
        position: usize,
        /// Position the record points to
        target: usize,
    },

    /// A type name in the stream is not registered
    #[error("Unknown type `{name}` at line {position}")]
    TypeNotFound {
        /// The type name as written
        name: String,
        /// Line index of the type record
        position: usize,
    },

    /// A member descriptor or delegate names a member that does not exist
    #[error("Member `{member}` not found on `{type_name}` (line {position})")]
    MemberNotFound {
        /// Declaring type
        type_name: String,
        /// Member name
        member: String,
        /// Line index of the member record
        position: usize,
    },

    /// Strict mode: a field in the stream no longer exists on the type
    #[error("Field `{field}` no longer exists on `{type_name}` (line {position})")]
    UnknownField {
        /// Type being populated
        type_name: String,
        /// Field name found in the stream
        field: String,
        /// Line index of the field node
        position: usize,
    },

    /// Strict mode: an event in the stream no longer exists on the type
    #[error("Event `{event}` no longer exists on `{type_name}` (line {position})")]
    UnknownEvent {
        /// Type being populated
        type_name: String,
        /// Event name found in the stream
        event: String,
        /// Line index of the event record
        position: usize,
    },

    /// Strict mode: a generic container has no dictionary, list or collection contract
    #[error("Unsupported collection shape `{type_name}`")]
    UnsupportedShape {
        /// The container type
        type_name: String,
    },

    /// A container's storage cannot be encoded under its type's contracts,
    /// e.g. list storage for a dictionary type
    #[error("Collection `{type_name}` cannot be written from {storage} storage")]
    StorageMismatch {
        /// The container type
        type_name: String,
        /// Storage kind the value holds
        storage: String,
    },

    /// A value could not be decoded from its textual form
    #[error("Invalid {kind} value {text:?} at line {position}")]
    InvalidValue {
        /// What was being decoded
        kind: String,
        /// The offending text
        text: String,
        /// Line index of the value
        position: usize,
    },

    /// A non-nullable node decoded to `Null`
    #[error("Unexpected null for `{name}` at line {position}")]
    UnexpectedNull {
        /// Node name
        name: String,
        /// Line index of the node
        position: usize,
    },

    /// A value's shape does not match the tag it was read under
    #[error("Shape mismatch for `{name}`: stream says {expected}, decoded {got}")]
    ShapeMismatch {
        /// Node name
        name: String,
        /// Tag from the stream
        expected: String,
        /// Tag of the decoded value
        got: String,
    },

    /// The graph nests deeper than the configured limit
    #[error("Graph depth limit exceeded: {limit}")]
    DepthExceeded {
        /// Configured maximum depth
        limit: usize,
    },

    /// A self-describing type's own serializer failed
    #[error("Serializer for `{type_name}` failed: {source}")]
    Custom {
        /// Type whose serializer failed
        type_name: String,
        /// Underlying failure
        #[source]
        source: anyhow::Error,
    },

    /// Registry lookup failed outside of stream decoding
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl SerializeError {
    /// Whether this error means the stream itself is damaged or incompatible.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            SerializeError::UnsupportedFormat { .. }
                | SerializeError::UnexpectedEof { .. }
                | SerializeError::Malformed { .. }
                | SerializeError::UnresolvedReference { .. }
                | SerializeError::TypeNotFound { .. }
                | SerializeError::MemberNotFound { .. }
                | SerializeError::InvalidValue { .. }
                | SerializeError::ShapeMismatch { .. }
                | SerializeError::UnexpectedNull { .. }
        )
    }
}

/// Result type alias for serializer operations
pub type Result<T> = std::result::Result<T, SerializeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_classification() {
        assert!(SerializeError::UnresolvedReference {
            position: 4,
            target: 2
        }
        .is_corruption());
        assert!(!SerializeError::EmptyGraph.is_corruption());
        assert!(!SerializeError::UnsupportedShape {
            type_name: "Queue<i32>".into()
        }
        .is_corruption());
    }

    #[test]
    fn test_error_messages_name_position() {
        let err = SerializeError::TypeNotFound {
            name: "Gone".into(),
            position: 12,
        };
        assert_eq!(err.to_string(), "Unknown type `Gone` at line 12");
    }
}

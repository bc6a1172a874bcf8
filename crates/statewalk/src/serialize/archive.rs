//! The self-describing serialization contract

use crate::config::SerializationTarget;
use crate::error::{Result, SerializeError};
use crate::types::TypeName;
use crate::value::{EnumValue, ObjectRef, Value};

/// Primitive operations a self-describing type uses to encode itself.
///
/// The same calls run in both directions: when writing, `value` records the
/// slot's current contents; when reading, it overwrites the slot with what
/// the stream holds. A type's `serialize` is therefore usually one straight
/// sequence of calls that works for both.
pub trait Archive {
    /// Whether the archive is decoding a stream
    fn is_reading(&self) -> bool;

    /// Whether the archive is producing a stream
    fn is_writing(&self) -> bool {
        !self.is_reading()
    }

    /// What the stream is for
    fn target(&self) -> SerializationTarget;

    /// Open a named group. Reading fails if the stream holds another name.
    fn begin_group(&mut self, name: &str) -> Result<()>;

    /// Close the innermost open group.
    fn end_group(&mut self) -> Result<()>;

    /// Encode or decode one named slot as a full graph node.
    fn value(&mut self, name: &str, value: &mut Value) -> Result<()>;

    /// Encode or decode one named enum constant.
    fn enum_value(&mut self, name: &str, value: &mut EnumValue) -> Result<()>;

    /// Record that the type could only restore part of its state.
    fn flag_partial_read(&mut self);
}

/// A type that takes over its own field-level serialization.
///
/// Registered on a [`TypeDef`](crate::TypeDef) with `with_serializer`; it then
/// applies to that type and every type deriving from it.
pub trait Serializable: Send + Sync {
    /// Write or read `object` through `archive`.
    fn serialize(&self, object: &ObjectRef, archive: &mut dyn Archive) -> anyhow::Result<()>;
}

impl<F> Serializable for F
where
    F: Fn(&ObjectRef, &mut dyn Archive) -> anyhow::Result<()> + Send + Sync,
{
    fn serialize(&self, object: &ObjectRef, archive: &mut dyn Archive) -> anyhow::Result<()> {
        self(object, archive)
    }
}

/// Errors raised by the archive pass through; anything else is attributed
/// to the type's serializer.
pub(crate) fn custom_error(type_name: &TypeName, err: anyhow::Error) -> SerializeError {
    match err.downcast::<SerializeError>() {
        Ok(err) => err,
        Err(source) => SerializeError::Custom {
            type_name: type_name.to_string(),
            source,
        },
    }
}

/// Closing line of a group
pub(crate) fn group_end(name: &str) -> String {
    format!("/{}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_errors_pass_through() {
        let ty = TypeName::new("Inventory");
        let err = custom_error(&ty, SerializeError::EmptyStream.into());
        assert!(matches!(err, SerializeError::EmptyStream));

        let err = custom_error(&ty, anyhow::anyhow!("bad slot count"));
        match err {
            SerializeError::Custom { type_name, source } => {
                assert_eq!(type_name, "Inventory");
                assert_eq!(source.to_string(), "bad slot count");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

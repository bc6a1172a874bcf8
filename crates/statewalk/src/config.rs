//! Serializer configuration

/// What a stream is being produced for. Self-describing types may branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SerializationTarget {
    /// Snapshot of live state across a script reload
    #[default]
    Reload,

    /// Persistent save data
    SaveGame,
}

/// Default nesting limit. Every level costs a few recursive frames on both
/// write and read; this keeps a full-depth graph inside a 2 MB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for a [`Serializer`](crate::Serializer).
///
/// Fixed at construction time; the same settings apply to every `write` and
/// `read` the serializer performs.
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Schema drift (fields, events or collection shapes that no longer
    /// exist) is fatal instead of being skipped
    pub strict: bool,

    /// Maximum node nesting, also applied to nested generic type records.
    /// Raise it only for threads with a larger stack.
    pub max_depth: usize,

    /// Target reported to self-describing types
    pub target: SerializationTarget,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            target: SerializationTarget::Reload,
        }
    }
}

impl SerializerConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// The strict/debug preset: every schema drift aborts the read.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    /// Set a custom nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the serialization target.
    pub fn with_target(mut self, target: SerializationTarget) -> Self {
        self.target = target;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let config = SerializerConfig::new();
        assert!(!config.strict);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.target, SerializationTarget::Reload);

        let config = SerializerConfig::strict()
            .with_max_depth(16)
            .with_target(SerializationTarget::SaveGame);
        assert!(config.strict);
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.target, SerializationTarget::SaveGame);
    }
}

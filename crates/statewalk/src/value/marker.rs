//! "Unused" sentinels: typed markers for parameters intentionally left unset

use crate::types::names;

/// A typed sentinel meaning "this slot was intentionally left unset".
///
/// Each marker is a singleton of its declared type and must come back from a
/// round trip as the same marker, never as an ordinary value of that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnusedMarker {
    /// Unset integer
    Int,
    /// Unset float
    Float,
    /// Unset vector
    Vec3,
}

impl UnusedMarker {
    /// Every marker
    pub const ALL: [UnusedMarker; 3] = [UnusedMarker::Int, UnusedMarker::Float, UnusedMarker::Vec3];

    /// The declared type this marker stands in for
    pub fn type_name(self) -> &'static str {
        match self {
            UnusedMarker::Int => names::I32,
            UnusedMarker::Float => names::F32,
            UnusedMarker::Vec3 => names::VEC3,
        }
    }

    /// The marker for a declared type
    pub fn for_type(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.type_name() == name)
    }
}

//! Per-session table of reference-eligible values

use std::collections::HashMap;

use super::ShapeTag;
use crate::value::Value;

/// What a back-reference resolves to.
#[derive(Debug, Clone)]
pub(crate) struct Referent {
    pub(crate) shape: ShapeTag,
    pub(crate) value: Value,
    pub(crate) allow_null: bool,
}

/// Maps stream positions to the values first recorded there.
///
/// Identity lookups scan in insertion order using `Value` equality: heap
/// instances match only themselves, descriptors match by value. Cleared at
/// the start of every write and read.
#[derive(Debug, Default)]
pub(crate) struct ReferenceTable {
    entries: Vec<(usize, Referent)>,
    by_position: HashMap<usize, usize>,
}

impl ReferenceTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, position: usize, referent: Referent) {
        self.by_position.insert(position, self.entries.len());
        self.entries.push((position, referent));
    }

    pub(crate) fn resolve(&self, position: usize) -> Option<&Referent> {
        self.by_position
            .get(&position)
            .map(|&index| &self.entries[index].1)
    }

    /// Position of the record that first wrote this value, if any
    pub(crate) fn find_existing(&self, value: &Value) -> Option<usize> {
        self.entries
            .iter()
            .find(|(_, referent)| referent.value == *value)
            .map(|(position, _)| *position)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.by_position.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

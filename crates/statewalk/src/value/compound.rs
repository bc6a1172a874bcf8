//! Compound value types: enums, objects, sequences and containers

use indexmap::{IndexMap, IndexSet};

use super::{DelegateRef, HashableValue, Value};
use crate::types::TypeName;

/// An enum constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// The enum's type
    pub type_name: TypeName,

    /// The variant name (e.g., "Value2")
    pub variant: String,
}

impl EnumValue {
    /// Create an enum constant
    pub fn new(type_name: TypeName, variant: impl Into<String>) -> Self {
        Self {
            type_name,
            variant: variant.into(),
        }
    }
}

/// A class instance.
///
/// Fields are keyed by name across the whole inheritance chain; the registry
/// rejects types that would shadow a base field.
#[derive(Debug, Clone)]
pub struct ObjectValue {
    /// The runtime type
    pub type_name: TypeName,

    /// Field values in declaration order
    pub fields: IndexMap<String, Value>,

    /// Invocation list of each event with at least one subscriber
    pub events: IndexMap<String, Vec<DelegateRef>>,
}

impl ObjectValue {
    /// Create an instance with no fields set
    pub fn new(type_name: TypeName) -> Self {
        Self {
            type_name,
            fields: IndexMap::new(),
            events: IndexMap::new(),
        }
    }

    /// Set a field (builder pattern)
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    /// Append a handler to an event's invocation list
    pub fn subscribe(&mut self, event: impl Into<String>, handler: DelegateRef) {
        self.events.entry(event.into()).or_default().push(handler);
    }

    /// The invocation list of an event
    pub fn handlers(&self, event: &str) -> &[DelegateRef] {
        self.events.get(event).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Elements of an array or non-generic enumerable.
#[derive(Debug, Clone)]
pub struct SequenceValue {
    /// Declared element type
    pub element_type: TypeName,

    /// The elements
    pub items: Vec<Value>,
}

impl SequenceValue {
    /// Create a sequence
    pub fn new(element_type: TypeName, items: Vec<Value>) -> Self {
        Self {
            element_type,
            items,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an element by index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }
}

/// Storage of a generic container, chosen by its strongest contract.
#[derive(Debug, Clone)]
pub enum CollectionItems {
    /// Dictionary contract: keyed entries
    Map(IndexMap<HashableValue, Value>),

    /// List contract: ordered elements
    List(Vec<Value>),

    /// Collection contract: `Add`-only, duplicates collapse
    Set(IndexSet<HashableValue>),
}

impl CollectionItems {
    /// Storage kind: `map`, `list` or `set`
    pub fn kind(&self) -> &'static str {
        match self {
            CollectionItems::Map(_) => "map",
            CollectionItems::List(_) => "list",
            CollectionItems::Set(_) => "set",
        }
    }
}

/// A generic container instance, e.g. `Dictionary<String, i32>`.
#[derive(Debug, Clone)]
pub struct CollectionValue {
    /// The closed generic type
    pub type_name: TypeName,

    /// The contents
    pub items: CollectionItems,
}

impl CollectionValue {
    /// Create a container
    pub fn new(type_name: TypeName, items: CollectionItems) -> Self {
        Self { type_name, items }
    }

    /// A `List<T>` with the given elements
    pub fn list(element_type: TypeName, items: Vec<Value>) -> Self {
        Self::new(
            TypeName::generic(crate::types::names::LIST, vec![element_type]),
            CollectionItems::List(items),
        )
    }

    /// A `Dictionary<K, V>` with the given entries
    pub fn dictionary<I>(key_type: TypeName, value_type: TypeName, entries: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (HashableValue(k), v))
            .collect();
        Self::new(
            TypeName::generic(crate::types::names::DICTIONARY, vec![key_type, value_type]),
            CollectionItems::Map(map),
        )
    }

    /// A `HashSet<T>` with the given elements
    pub fn hash_set<I>(element_type: TypeName, items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let set = items.into_iter().map(HashableValue).collect();
        Self::new(
            TypeName::generic(crate::types::names::HASH_SET, vec![element_type]),
            CollectionItems::Set(set),
        )
    }

    /// Number of elements (entries for dictionaries)
    pub fn len(&self) -> usize {
        match &self.items {
            CollectionItems::Map(map) => map.len(),
            CollectionItems::List(list) => list.len(),
            CollectionItems::Set(set) => set.len(),
        }
    }

    /// Whether the container is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a dictionary entry. Returns `false` if this is not a dictionary.
    pub fn insert(&mut self, key: Value, value: Value) -> bool {
        match &mut self.items {
            CollectionItems::Map(map) => {
                map.insert(HashableValue(key), value);
                true
            }
            _ => false,
        }
    }

    /// Append to a list or add to a set. Returns `false` for dictionaries.
    pub fn add(&mut self, value: Value) -> bool {
        match &mut self.items {
            CollectionItems::List(list) => {
                list.push(value);
                true
            }
            CollectionItems::Set(set) => {
                set.insert(HashableValue(value));
                true
            }
            CollectionItems::Map(_) => false,
        }
    }

    /// Look up a dictionary value by key
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match &self.items {
            CollectionItems::Map(map) => map.get(&HashableValue(key.clone())),
            _ => None,
        }
    }

    /// Elements of a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match &self.items {
            CollectionItems::List(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    /// Whether a set or list contains the value
    pub fn contains(&self, value: &Value) -> bool {
        match &self.items {
            CollectionItems::Set(set) => set.contains(&HashableValue(value.clone())),
            CollectionItems::List(list) => list.contains(value),
            CollectionItems::Map(map) => map.contains_key(&HashableValue(value.clone())),
        }
    }
}

//! Type definitions: the reflective metadata the serializer walks

use std::fmt;
use std::sync::Arc;

use super::TypeName;
use crate::serialize::Serializable;
use crate::value::{MethodFn, Value};

/// A declared instance field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name
    pub name: String,

    /// Declared field type
    pub ty: TypeName,
}

/// A declared property. Properties are never walked, only resolved by member descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Property name
    pub name: String,

    /// Declared property type
    pub ty: TypeName,
}

/// A declared event and the delegate type of its handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDef {
    /// Event name
    pub name: String,

    /// Handler delegate type
    pub handler: TypeName,
}

/// A declared method with a native body.
#[derive(Clone)]
pub struct MethodDef {
    /// Method name
    pub name: String,

    /// Ordered parameter types (identify the overload)
    pub params: Vec<TypeName>,

    /// Static methods receive no target
    pub is_static: bool,

    /// The implementation
    pub body: MethodFn,
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// Container capabilities probed when rebuilding a generic collection.
///
/// When several are present, dictionary wins over list, and list over collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionContracts {
    /// Keyed insert (`Insert(key, value)`)
    pub dictionary: bool,

    /// Ordered append
    pub list: bool,

    /// An `Add`-shaped method
    pub collection: bool,
}

impl CollectionContracts {
    /// No contract at all; such containers cannot be rebuilt.
    pub const NONE: Self = Self {
        dictionary: false,
        list: false,
        collection: false,
    };

    /// Dictionary contract only
    pub const DICTIONARY: Self = Self {
        dictionary: true,
        list: false,
        collection: false,
    };

    /// List contract only
    pub const LIST: Self = Self {
        dictionary: false,
        list: true,
        collection: false,
    };

    /// Collection (`Add`) contract only
    pub const COLLECTION: Self = Self {
        dictionary: false,
        list: false,
        collection: true,
    };

    /// Union of two contract sets.
    pub fn union(self, other: Self) -> Self {
        Self {
            dictionary: self.dictionary || other.dictionary,
            list: self.list || other.list,
            collection: self.collection || other.collection,
        }
    }

    /// Whether any contract is present.
    pub fn is_supported(&self) -> bool {
        self.dictionary || self.list || self.collection
    }
}

/// The broad kind of a registered type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Inline primitive (`i32`, `f32`, `bool`, ...)
    Primitive,

    /// Text
    String,

    /// Reference type with fields, events and methods
    Class,

    /// Named constants
    Enum {
        /// Declared variant names
        variants: Vec<String>,
    },

    /// Delegate type
    Delegate,

    /// Generic (or non-generic) container
    Collection(CollectionContracts),
}

/// A registered type.
///
/// Built with the constructor for its kind and then the chained `with_*`
/// methods, e.g.
///
/// ```
/// use statewalk::{TypeDef, TypeName};
///
/// let player = TypeDef::class("Player")
///     .with_base(TypeName::new("Entity"))
///     .with_field("Name", TypeName::new("String"))
///     .with_event("Died", TypeName::new("Action"));
/// assert_eq!(player.fields().len(), 1);
/// ```
#[derive(Clone)]
pub struct TypeDef {
    name: String,
    arity: usize,
    kind: TypeKind,
    base: Option<TypeName>,
    fields: Vec<FieldDef>,
    properties: Vec<PropertyDef>,
    events: Vec<EventDef>,
    methods: Vec<MethodDef>,
    serializer: Option<Arc<dyn Serializable>>,
}

impl TypeDef {
    fn new(name: impl Into<String>, arity: usize, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            arity,
            kind,
            base: None,
            fields: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            methods: Vec::new(),
            serializer: None,
        }
    }

    /// A reference type walked field by field.
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, 0, TypeKind::Class)
    }

    /// An enum with the given variant names.
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variants = variants.into_iter().map(Into::into).collect();
        Self::new(name, 0, TypeKind::Enum { variants })
    }

    /// A delegate type.
    pub fn delegate(name: impl Into<String>) -> Self {
        Self::new(name, 0, TypeKind::Delegate)
    }

    /// A container definition with `arity` type parameters.
    pub fn collection(
        name: impl Into<String>,
        arity: usize,
        contracts: CollectionContracts,
    ) -> Self {
        Self::new(name, arity, TypeKind::Collection(contracts))
    }

    pub(crate) fn primitive(name: &str) -> Self {
        Self::new(name, 0, TypeKind::Primitive)
    }

    pub(crate) fn string(name: &str) -> Self {
        Self::new(name, 0, TypeKind::String)
    }

    /// Set the base type.
    pub fn with_base(mut self, base: TypeName) -> Self {
        self.base = Some(base);
        self
    }

    /// Declare an instance field.
    pub fn with_field(mut self, name: impl Into<String>, ty: TypeName) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
        });
        self
    }

    /// Declare a property.
    pub fn with_property(mut self, name: impl Into<String>, ty: TypeName) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            ty,
        });
        self
    }

    /// Declare an event.
    pub fn with_event(mut self, name: impl Into<String>, handler: TypeName) -> Self {
        self.events.push(EventDef {
            name: name.into(),
            handler,
        });
        self
    }

    /// Declare an instance method.
    pub fn with_method<F>(mut self, name: impl Into<String>, params: Vec<TypeName>, body: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.methods.push(MethodDef {
            name: name.into(),
            params,
            is_static: false,
            body: Arc::new(body),
        });
        self
    }

    /// Declare a static method.
    pub fn with_static_method<F>(
        mut self,
        name: impl Into<String>,
        params: Vec<TypeName>,
        body: F,
    ) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.methods.push(MethodDef {
            name: name.into(),
            params,
            is_static: true,
            body: Arc::new(body),
        });
        self
    }

    /// Opt out of the reflective field walk.
    pub fn with_serializer(mut self, serializer: impl Serializable + 'static) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    /// Definition name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of generic parameters
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Registry key
    pub fn key(&self) -> String {
        super::name::definition_key(&self.name, self.arity)
    }

    /// Kind of type
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Base type, if any
    pub fn base(&self) -> Option<&TypeName> {
        self.base.as_ref()
    }

    /// Fields declared on this type only
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Properties declared on this type only
    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    /// Events declared on this type only
    pub fn events(&self) -> &[EventDef] {
        &self.events
    }

    /// Methods declared on this type only
    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    /// The self-describing serializer, if this type declares one
    pub fn serializer(&self) -> Option<&Arc<dyn Serializable>> {
        self.serializer.as_ref()
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a declared event.
    pub fn event(&self, name: &str) -> Option<&EventDef> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Look up a declared method by exact overload.
    pub fn method(&self, name: &str, params: &[TypeName]) -> Option<&MethodDef> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.params == params)
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("kind", &self.kind)
            .field("base", &self.base)
            .field("fields", &self.fields)
            .field("events", &self.events)
            .field("methods", &self.methods)
            .field("self_describing", &self.serializer.is_some())
            .finish()
    }
}

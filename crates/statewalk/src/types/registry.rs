//! The type registry: every type a stream may name must be registered here

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indexmap::{IndexMap, IndexSet};

use super::{
    names, CollectionContracts, EventDef, FieldDef, MethodDef, TypeDef, TypeKind, TypeName,
};
use crate::error::RegistryError;
use crate::serialize::Serializable;
use crate::value::{CollectionItems, CollectionValue, MemberInfo, MemberKind, ObjectValue, Value};

/// Registry of known types, keyed by definition key (`name` or ``name`arity``).
///
/// Registration takes `&self`, so one registry can be shared (behind an `Arc`)
/// between the code that defines script types and the serializer.
///
/// # Example
///
/// ```
/// use statewalk::{TypeDef, TypeName, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// registry
///     .register(TypeDef::class("Player").with_field("Health", TypeName::new("i32")))
///     .unwrap();
///
/// let player = registry.instantiate(&TypeName::new("Player")).unwrap();
/// assert!(player.is_object());
/// ```
#[derive(Debug)]
pub struct TypeRegistry {
    types: DashMap<String, Arc<TypeDef>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry with the builtin types registered.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register_builtins();
        registry
    }

    /// Create a registry with no types at all.
    pub fn empty() -> Self {
        Self {
            types: DashMap::new(),
        }
    }

    fn register_builtins(&self) {
        let f32_ty = TypeName::new(names::F32);
        let builtins = names::PRIMITIVES
            .iter()
            .map(|name| TypeDef::primitive(name))
            .chain([
                TypeDef::string(names::STRING),
                TypeDef::class(names::OBJECT),
                TypeDef::class(names::VEC3)
                    .with_field("x", f32_ty.clone())
                    .with_field("y", f32_ty.clone())
                    .with_field("z", f32_ty),
                TypeDef::collection(names::LIST, 1, CollectionContracts::LIST),
                TypeDef::collection(names::DICTIONARY, 2, CollectionContracts::DICTIONARY),
                TypeDef::collection(names::HASH_SET, 1, CollectionContracts::COLLECTION),
                TypeDef::delegate(names::ACTION),
                TypeDef::delegate(names::EVENT_HANDLER),
            ]);

        for def in builtins {
            self.types.insert(def.key(), Arc::new(def));
        }
    }

    /// Register a type. Its base type, if any, must already be registered.
    pub fn register(&self, def: TypeDef) -> Result<Arc<TypeDef>, RegistryError> {
        if let Some(base) = def.base() {
            let chain = self.chain(base)?;
            for field in def.fields() {
                if chain.iter().any(|ancestor| ancestor.field(&field.name).is_some()) {
                    return Err(RegistryError::DuplicateField {
                        type_name: def.name().to_string(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        match self.types.entry(def.key()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateType(entry.key().clone())),
            Entry::Vacant(entry) => {
                let def = Arc::new(def);
                entry.insert(def.clone());
                Ok(def)
            }
        }
    }

    /// Look up the definition of a (possibly closed generic) type.
    pub fn get(&self, ty: &TypeName) -> Option<Arc<TypeDef>> {
        self.types
            .get(&ty.definition_key())
            .map(|entry| entry.value().clone())
    }

    /// Whether the definition of this type is registered.
    pub fn contains(&self, ty: &TypeName) -> bool {
        self.types.contains_key(&ty.definition_key())
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Look up a type, requiring every generic argument to be registered too.
    pub fn resolve(&self, ty: &TypeName) -> Result<Arc<TypeDef>, RegistryError> {
        let def = self
            .get(ty)
            .ok_or_else(|| RegistryError::UnknownType(ty.to_string()))?;
        for arg in ty.args() {
            self.resolve(arg)?;
        }
        Ok(def)
    }

    /// The type followed by each of its base types, most derived first.
    pub fn chain(&self, ty: &TypeName) -> Result<Vec<Arc<TypeDef>>, RegistryError> {
        let mut chain = vec![self.resolve(ty)?];
        while let Some(base) = chain.last().and_then(|def| def.base().cloned()) {
            chain.push(self.resolve(&base)?);
        }
        Ok(chain)
    }

    /// Container contracts of the type and all of its bases combined.
    pub fn contracts(&self, ty: &TypeName) -> Result<CollectionContracts, RegistryError> {
        let contracts = self
            .chain(ty)?
            .iter()
            .filter_map(|def| match def.kind() {
                TypeKind::Collection(contracts) => Some(*contracts),
                _ => None,
            })
            .fold(CollectionContracts::NONE, CollectionContracts::union);
        Ok(contracts)
    }

    /// The self-describing serializer declared by the type or one of its bases.
    pub fn serializer_for(
        &self,
        ty: &TypeName,
    ) -> Result<Option<Arc<dyn Serializable>>, RegistryError> {
        Ok(self
            .chain(ty)?
            .iter()
            .find_map(|def| def.serializer().cloned()))
    }

    /// Allocate an uninitialized instance: no constructor runs.
    ///
    /// Classes get every declared field along the chain set to its zero value;
    /// containers start empty, shaped by their strongest contract.
    pub fn instantiate(&self, ty: &TypeName) -> Result<Value, RegistryError> {
        let chain = self.chain(ty)?;
        match chain[0].kind() {
            TypeKind::Class => {
                let mut object = ObjectValue::new(ty.clone());
                for def in &chain {
                    for field in def.fields() {
                        object.set(field.name.clone(), Value::zeroed(&field.ty));
                    }
                }
                Ok(Value::object(object))
            }
            TypeKind::Collection(_) => {
                let contracts = self.contracts(ty)?;
                let items = if contracts.dictionary {
                    CollectionItems::Map(IndexMap::new())
                } else if contracts.list {
                    CollectionItems::List(Vec::new())
                } else if contracts.collection {
                    CollectionItems::Set(IndexSet::new())
                } else {
                    return Err(RegistryError::NotInstantiable(ty.to_string()));
                };
                Ok(Value::collection(CollectionValue::new(ty.clone(), items)))
            }
            _ => Err(RegistryError::NotInstantiable(ty.to_string())),
        }
    }

    /// Find a field declared by the type or any of its bases.
    pub fn find_field(&self, ty: &TypeName, name: &str) -> Result<Option<FieldDef>, RegistryError> {
        Ok(self
            .chain(ty)?
            .iter()
            .find_map(|def| def.field(name).cloned()))
    }

    /// Find an event declared by the type or any of its bases.
    pub fn find_event(&self, ty: &TypeName, name: &str) -> Result<Option<EventDef>, RegistryError> {
        Ok(self
            .chain(ty)?
            .iter()
            .find_map(|def| def.event(name).cloned()))
    }

    /// Resolve a member descriptor, failing if the member does not exist.
    pub fn find_member(&self, member: &MemberInfo) -> Result<(), RegistryError> {
        if self.has_member(member)? {
            Ok(())
        } else {
            Err(RegistryError::UnknownMember {
                type_name: member.declaring_type.to_string(),
                member: member.name.clone(),
            })
        }
    }

    /// Whether the member a descriptor names exists on its declaring type.
    pub fn has_member(&self, member: &MemberInfo) -> Result<bool, RegistryError> {
        let def = self.resolve(&member.declaring_type)?;
        Ok(match member.kind {
            MemberKind::Field => def.field(&member.name).is_some(),
            MemberKind::Property => def.properties().iter().any(|p| p.name == member.name),
            MemberKind::Method => def.method(&member.name, &member.params).is_some(),
        })
    }

    /// Resolve the exact method overload a descriptor names.
    pub fn find_method(&self, member: &MemberInfo) -> Result<MethodDef, RegistryError> {
        let def = self.resolve(&member.declaring_type)?;
        def.method(&member.name, &member.params)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownMember {
                type_name: member.declaring_type.to_string(),
                member: member.name.clone(),
            })
    }
}

//! Graph writer: walks a live graph depth-first and emits records

use std::io::Write;
use std::sync::Arc;

use log::trace;

use super::archive::{custom_error, group_end, Archive, Serializable};
use super::codec::{primitive_record, LineWriter, FORMAT_HEADER};
use super::refs::{ReferenceTable, Referent};
use super::{classify, ObjectReference, ShapeTag, NULL_TARGET, TARGET};
use crate::config::{SerializationTarget, SerializerConfig};
use crate::error::{Result, SerializeError};
use crate::types::{TypeName, TypeRegistry};
use crate::value::{
    CollectionItems, CollectionRef, DelegateRef, EnumValue, MemberInfo, MemberKind, ObjectRef,
    SequenceRef, Value,
};

/// One write session. Owns the reference table for the duration of a single
/// `write`.
pub(crate) struct GraphWriter<'a, W: Write> {
    out: LineWriter<W>,
    refs: ReferenceTable,
    registry: &'a TypeRegistry,
    config: &'a SerializerConfig,
    depth: usize,
    groups: Vec<String>,
}

impl<'a, W: Write> GraphWriter<'a, W> {
    pub(crate) fn new(out: W, registry: &'a TypeRegistry, config: &'a SerializerConfig) -> Self {
        Self {
            out: LineWriter::new(out),
            refs: ReferenceTable::new(),
            registry,
            config,
            depth: 0,
            groups: Vec::new(),
        }
    }

    pub(crate) fn write(mut self, root: &ObjectReference) -> Result<()> {
        if root.value.is_null() {
            return Err(SerializeError::EmptyGraph);
        }
        self.refs.clear();
        self.out.write_line(FORMAT_HEADER)?;
        self.write_node(root)?;
        self.out.flush()?;
        trace!(
            "wrote {} lines, {} shared values",
            self.out.position(),
            self.refs.len()
        );
        Ok(())
    }

    fn write_node(&mut self, node: &ObjectReference) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(SerializeError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        let result = self.write_node_inner(node);
        self.depth -= 1;
        result
    }

    fn write_node_inner(&mut self, node: &ObjectReference) -> Result<()> {
        self.out.write_line(&node.name)?;
        let position = self.out.position();
        let shape = classify(&node.value);

        if shape.is_reference_eligible() {
            if let Some(target) = self.refs.find_existing(&node.value) {
                trace!("`{}` at line {} refers to line {}", node.name, position, target);
                self.out.write_tag(ShapeTag::Reference)?;
                return self.out.write_usize(target);
            }
            self.refs.register(
                position,
                Referent {
                    shape,
                    value: node.value.clone(),
                    allow_null: node.allow_null,
                },
            );
        }

        trace!("write {} `{}` at line {}", shape, node.name, position);
        self.out.write_tag(shape)?;

        match &node.value {
            Value::Null => Ok(()),
            Value::Handle(handle) => self.out.write_u64(handle.0),
            Value::Enum(e) => self.write_enum(e),
            Value::String(s) => self.out.write_line(s),
            Value::Unused(marker) => self.out.write_type(&TypeName::new(marker.type_name())),
            Value::Array(seq) | Value::Enumerable(seq) => self.write_sequence(seq),
            Value::Collection(collection) => self.write_collection(collection),
            Value::Object(object) => self.write_object(object),
            Value::Delegate(delegate) => self.write_delegate(delegate),
            Value::Member(member) => self.write_member(member),
            Value::Type(ty) => self.out.write_type(ty),
            Value::Bool(_)
            | Value::Char(_)
            | Value::I8(_)
            | Value::I16(_)
            | Value::I32(_)
            | Value::I64(_)
            | Value::U8(_)
            | Value::U16(_)
            | Value::U32(_)
            | Value::U64(_)
            | Value::F32(_)
            | Value::F64(_) => self.write_primitive(node),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Value-Like Payloads
    // ═══════════════════════════════════════════════════════════════════

    fn write_primitive(&mut self, node: &ObjectReference) -> Result<()> {
        let (ty, text) =
            primitive_record(&node.value).ok_or_else(|| SerializeError::ShapeMismatch {
                name: node.name.clone(),
                expected: ShapeTag::Any.to_string(),
                got: classify(&node.value).to_string(),
            })?;
        self.out.write_type(&TypeName::new(ty))?;
        self.out.write_line(&text)
    }

    fn write_enum(&mut self, value: &EnumValue) -> Result<()> {
        self.out.write_type(&value.type_name)?;
        self.out.write_line(&value.variant)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Containers
    // ═══════════════════════════════════════════════════════════════════

    fn write_sequence(&mut self, seq: &SequenceRef) -> Result<()> {
        let (element_type, items) = {
            let seq = seq.read();
            (seq.element_type.clone(), seq.items.clone())
        };
        self.out.write_usize(items.len())?;
        self.out.write_type(&element_type)?;
        for (i, item) in items.into_iter().enumerate() {
            self.write_node(&ObjectReference::nullable(i.to_string(), item))?;
        }
        Ok(())
    }

    /// Types with a dictionary contract alternate `key_i` / `value_i` nodes;
    /// everything else is written in iteration order as indexed nodes, the
    /// way the reader rebuilds it.
    fn write_collection(&mut self, collection: &CollectionRef) -> Result<()> {
        let (type_name, items) = {
            let collection = collection.read();
            (collection.type_name.clone(), collection.items.clone())
        };
        let contracts = self.registry.contracts(&type_name)?;

        match (contracts.dictionary, items) {
            (true, CollectionItems::Map(map)) => {
                self.out.write_usize(map.len())?;
                self.out.write_type(&type_name)?;
                for (i, (key, value)) in map.into_iter().enumerate() {
                    self.write_node(&ObjectReference::new(format!("key_{}", i), key.into_inner()))?;
                    self.write_node(&ObjectReference::nullable(format!("value_{}", i), value))?;
                }
            }
            (false, CollectionItems::List(list)) => {
                self.out.write_usize(list.len())?;
                self.out.write_type(&type_name)?;
                for (i, item) in list.into_iter().enumerate() {
                    self.write_node(&ObjectReference::nullable(i.to_string(), item))?;
                }
            }
            (false, CollectionItems::Set(set)) => {
                self.out.write_usize(set.len())?;
                self.out.write_type(&type_name)?;
                for (i, item) in set.into_iter().enumerate() {
                    self.write_node(&ObjectReference::nullable(i.to_string(), item.into_inner()))?;
                }
            }
            (_, items) => {
                return Err(SerializeError::StorageMismatch {
                    type_name: type_name.to_string(),
                    storage: items.kind().to_string(),
                })
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Objects
    // ═══════════════════════════════════════════════════════════════════

    fn write_object(&mut self, object: &ObjectRef) -> Result<()> {
        let type_name = object.read().type_name.clone();
        self.out.write_type(&type_name)?;

        if let Some(custom) = self.registry.serializer_for(&type_name)? {
            return self.write_custom(&type_name, custom, object);
        }

        for def in self.registry.chain(&type_name)? {
            let (fields, events) = {
                let object = object.read();
                let fields: Vec<(String, Value)> = def
                    .fields()
                    .iter()
                    .map(|field| {
                        let value = object
                            .get(&field.name)
                            .cloned()
                            .unwrap_or_else(|| Value::zeroed(&field.ty));
                        (field.name.clone(), value)
                    })
                    .collect();
                let events: Vec<(String, TypeName, Vec<DelegateRef>)> = def
                    .events()
                    .iter()
                    .map(|event| {
                        (
                            event.name.clone(),
                            event.handler.clone(),
                            object.handlers(&event.name).to_vec(),
                        )
                    })
                    .collect();
                (fields, events)
            };

            self.out.write_usize(fields.len())?;
            for (name, value) in fields {
                self.write_node(&ObjectReference::nullable(name, value))?;
            }

            self.out.write_usize(events.len())?;
            for (name, handler, delegates) in events {
                self.out.write_line(&name)?;
                self.out.write_type(&handler)?;
                self.out.write_usize(delegates.len())?;
                for (i, delegate) in delegates.into_iter().enumerate() {
                    self.write_node(&ObjectReference::new(
                        i.to_string(),
                        Value::Delegate(delegate),
                    ))?;
                }
            }
        }
        Ok(())
    }

    fn write_custom(
        &mut self,
        type_name: &TypeName,
        custom: Arc<dyn Serializable>,
        object: &ObjectRef,
    ) -> Result<()> {
        trace!("`{}` serializes itself", type_name);
        let open = self.groups.len();
        custom
            .serialize(object, self)
            .map_err(|err| custom_error(type_name, err))?;
        if self.groups.len() > open {
            let unclosed = self.groups.split_off(open);
            return Err(SerializeError::Malformed {
                position: self.out.position(),
                message: format!("serializer for `{}` left {:?} open", type_name, unclosed),
            });
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Delegates and Descriptors
    // ═══════════════════════════════════════════════════════════════════

    fn write_delegate(&mut self, delegate: &DelegateRef) -> Result<()> {
        let (delegate_type, method, target) = {
            let delegate = delegate.read();
            (
                delegate.delegate_type.clone(),
                delegate.method.clone(),
                delegate.target.clone(),
            )
        };
        self.out.write_type(&delegate_type)?;
        self.write_node(&ObjectReference::new("method", Value::Member(method)))?;
        match target {
            Some(target) => {
                self.out.write_line(TARGET)?;
                self.write_node(&ObjectReference::nullable("target", target))
            }
            None => self.out.write_line(NULL_TARGET),
        }
    }

    fn write_member(&mut self, member: &MemberInfo) -> Result<()> {
        self.out.write_type(&member.declaring_type)?;
        self.out.write_line(member.kind.as_str())?;
        self.out.write_line(&member.name)?;
        if member.kind == MemberKind::Method {
            self.out.write_usize(member.params.len())?;
            for param in &member.params {
                self.out.write_type(param)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Archive for GraphWriter<'_, W> {
    fn is_reading(&self) -> bool {
        false
    }

    fn target(&self) -> SerializationTarget {
        self.config.target
    }

    fn begin_group(&mut self, name: &str) -> Result<()> {
        self.out.write_line(name)?;
        self.groups.push(name.to_string());
        Ok(())
    }

    fn end_group(&mut self) -> Result<()> {
        let name = self.groups.pop().ok_or_else(|| SerializeError::Malformed {
            position: self.out.position(),
            message: "end_group without an open group".to_string(),
        })?;
        self.out.write_line(&group_end(&name))
    }

    fn value(&mut self, name: &str, value: &mut Value) -> Result<()> {
        self.write_node(&ObjectReference::nullable(name, value.clone()))
    }

    fn enum_value(&mut self, name: &str, value: &mut EnumValue) -> Result<()> {
        self.out.write_line(name)?;
        self.write_enum(value)
    }

    fn flag_partial_read(&mut self) {}
}

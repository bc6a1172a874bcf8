//! Graph reader: rebuilds a live graph from records
//!
//! Every reference-eligible value is registered at its record position
//! before any nested node is read, so back-references from inside its own
//! payload (cycles) resolve to the instance under construction.

use std::io::BufRead;
use std::sync::Arc;

use log::{debug, trace, warn};

use super::archive::{custom_error, group_end, Archive, Serializable};
use super::codec::{parse_primitive, LineReader, FORMAT_HEADER};
use super::refs::{ReferenceTable, Referent};
use super::{classify, ObjectReference, ShapeTag, NULL_TARGET, TARGET};
use crate::config::{SerializationTarget, SerializerConfig};
use crate::error::{Result, SerializeError};
use crate::types::{TypeDef, TypeKind, TypeName, TypeRegistry};
use crate::value::{
    CollectionItems, CollectionValue, DelegateValue, EnumValue, MemberInfo, MemberKind,
    NativeHandle, ObjectRef, UnusedMarker, Value,
};

/// One read session.
pub(crate) struct GraphReader<'a, R: BufRead> {
    input: LineReader<R>,
    refs: ReferenceTable,
    registry: &'a TypeRegistry,
    config: &'a SerializerConfig,
    depth: usize,
    groups: Vec<String>,
    partial_read: bool,
}

impl<'a, R: BufRead> GraphReader<'a, R> {
    pub(crate) fn new(input: R, registry: &'a TypeRegistry, config: &'a SerializerConfig) -> Self {
        Self {
            input: LineReader::new(input),
            refs: ReferenceTable::new(),
            registry,
            config,
            depth: 0,
            groups: Vec::new(),
            partial_read: false,
        }
    }

    /// Decode the root node. Also reports whether any self-describing type
    /// flagged a partial read.
    pub(crate) fn read(mut self) -> Result<(ObjectReference, bool)> {
        self.refs.clear();
        let header = match self.input.read_line() {
            Err(SerializeError::UnexpectedEof { position: 0 }) => {
                return Err(SerializeError::EmptyStream)
            }
            other => other?,
        };
        if header != FORMAT_HEADER {
            return Err(SerializeError::UnsupportedFormat { found: header });
        }

        let root = self.read_node()?;
        trace!(
            "read {} lines, {} shared values",
            self.input.position(),
            self.refs.len()
        );
        Ok((root, self.partial_read))
    }

    fn read_node(&mut self) -> Result<ObjectReference> {
        if self.depth >= self.config.max_depth {
            return Err(SerializeError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        let result = self.read_node_inner();
        self.depth -= 1;
        result
    }

    fn read_node_inner(&mut self) -> Result<ObjectReference> {
        let name = self.input.read_line()?;
        let position = self.input.position();
        let tag = self.input.read_tag()?;
        trace!("read {} `{}` at line {}", tag, name, position);

        let value = match tag {
            ShapeTag::Reference => return self.read_reference(name, position),
            ShapeTag::Null => Value::Null,
            ShapeTag::Handle => Value::Handle(NativeHandle(self.input.read_u64()?)),
            ShapeTag::Any => self.read_primitive()?,
            ShapeTag::Enum => Value::Enum(self.read_enum()?),
            ShapeTag::String => Value::string(self.input.read_line()?),
            ShapeTag::UnusedMarker => self.read_unused()?,
            ShapeTag::Array | ShapeTag::Enumerable => self.read_sequence(tag, position)?,
            ShapeTag::GenericEnumerable => self.read_collection(position)?,
            ShapeTag::Object => self.read_object(position)?,
            ShapeTag::Delegate => self.read_delegate(position)?,
            ShapeTag::MemberInfo => {
                let value = Value::member(self.read_member()?);
                self.register(position, tag, &value);
                value
            }
            ShapeTag::Type => {
                let (ty, _) = self.read_known_type()?;
                let value = Value::Type(ty);
                self.register(position, tag, &value);
                value
            }
        };

        let node = ObjectReference {
            name,
            shape: tag,
            value,
            allow_null: tag == ShapeTag::Null,
        };
        if !node.allow_null && node.value.is_null() {
            return Err(SerializeError::UnexpectedNull {
                name: node.name,
                position,
            });
        }
        let got = classify(&node.value);
        if got != tag {
            return Err(SerializeError::ShapeMismatch {
                name: node.name,
                expected: tag.to_string(),
                got: got.to_string(),
            });
        }
        Ok(node)
    }

    fn read_reference(&mut self, name: String, position: usize) -> Result<ObjectReference> {
        let target = self.input.read_usize()?;
        let referent = self
            .refs
            .resolve(target)
            .ok_or(SerializeError::UnresolvedReference { position, target })?;
        trace!("`{}` at line {} refers to line {}", name, position, target);
        Ok(ObjectReference {
            name,
            shape: referent.shape,
            value: referent.value.clone(),
            allow_null: referent.allow_null,
        })
    }

    fn register(&mut self, position: usize, shape: ShapeTag, value: &Value) {
        self.refs.register(
            position,
            Referent {
                shape,
                value: value.clone(),
                allow_null: false,
            },
        );
    }

    /// Decode a type record and check it against the registry.
    fn read_known_type(&mut self) -> Result<(TypeName, Arc<TypeDef>)> {
        let position = self.input.position();
        let ty = self.input.read_type(self.config.max_depth)?;
        let def = self
            .registry
            .resolve(&ty)
            .map_err(|_| SerializeError::TypeNotFound {
                name: ty.to_string(),
                position,
            })?;
        Ok((ty, def))
    }

    fn malformed(&self, position: usize, message: impl Into<String>) -> SerializeError {
        SerializeError::Malformed {
            position,
            message: message.into(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Value-Like Payloads
    // ═══════════════════════════════════════════════════════════════════

    fn read_primitive(&mut self) -> Result<Value> {
        let (ty, _) = self.read_known_type()?;
        let position = self.input.position();
        let text = self.input.read_line()?;
        parse_primitive(ty.name(), &text).ok_or_else(|| SerializeError::InvalidValue {
            kind: ty.to_string(),
            text,
            position,
        })
    }

    fn read_enum(&mut self) -> Result<EnumValue> {
        let position = self.input.position();
        let (ty, def) = self.read_known_type()?;
        let TypeKind::Enum { variants } = def.kind() else {
            return Err(self.malformed(position, format!("`{}` is not an enum", ty)));
        };

        let position = self.input.position();
        let variant = self.input.read_line()?;
        if !variants.contains(&variant) {
            return Err(SerializeError::InvalidValue {
                kind: ty.to_string(),
                text: variant,
                position,
            });
        }
        Ok(EnumValue::new(ty, variant))
    }

    fn read_unused(&mut self) -> Result<Value> {
        let position = self.input.position();
        let ty = self.input.read_type(self.config.max_depth)?;
        UnusedMarker::for_type(&ty.to_string())
            .map(Value::Unused)
            .ok_or_else(|| SerializeError::InvalidValue {
                kind: "unused marker".to_string(),
                text: ty.to_string(),
                position,
            })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Containers
    // ═══════════════════════════════════════════════════════════════════

    fn read_sequence(&mut self, tag: ShapeTag, position: usize) -> Result<Value> {
        let count = self.input.read_usize()?;
        let (element_type, _) = self.read_known_type()?;
        let value = if tag == ShapeTag::Array {
            Value::array(element_type, Vec::new())
        } else {
            Value::enumerable(element_type, Vec::new())
        };
        self.register(position, tag, &value);

        if let Some(seq) = value.as_sequence() {
            for _ in 0..count {
                let item = self.read_node()?.value;
                seq.write().items.push(item);
            }
        }
        Ok(value)
    }

    /// Rebuild through the strongest contract the type offers: dictionary,
    /// then list, then collection.
    fn read_collection(&mut self, position: usize) -> Result<Value> {
        let count = self.input.read_usize()?;
        let (type_name, _) = self.read_known_type()?;
        let contracts = self.registry.contracts(&type_name)?;

        let supported = contracts.is_supported();
        let value = if supported {
            self.registry.instantiate(&type_name)?
        } else if self.config.strict {
            return Err(SerializeError::UnsupportedShape {
                type_name: type_name.to_string(),
            });
        } else {
            warn!(
                "`{}` has no dictionary, list or collection contract; skipping {} elements",
                type_name, count
            );
            Value::collection(CollectionValue::new(
                type_name.clone(),
                CollectionItems::List(Vec::new()),
            ))
        };
        self.register(position, ShapeTag::GenericEnumerable, &value);

        let Some(collection) = value.as_collection().cloned() else {
            return Err(self.malformed(position, format!("`{}` is not a collection", type_name)));
        };
        for _ in 0..count {
            if contracts.dictionary {
                let key = self.read_node()?.value;
                let item = self.read_node()?.value;
                collection.write().insert(key, item);
            } else {
                let item = self.read_node()?.value;
                if supported {
                    collection.write().add(item);
                }
            }
        }
        Ok(value)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Objects
    // ═══════════════════════════════════════════════════════════════════

    fn read_object(&mut self, position: usize) -> Result<Value> {
        let (type_name, def) = self.read_known_type()?;
        if !matches!(def.kind(), TypeKind::Class) {
            return Err(self.malformed(position, format!("`{}` is not a class", type_name)));
        }
        let value = self.registry.instantiate(&type_name)?;
        self.register(position, ShapeTag::Object, &value);
        let Some(object) = value.as_object().cloned() else {
            return Err(self.malformed(position, format!("`{}` is not a class", type_name)));
        };

        if let Some(custom) = self.registry.serializer_for(&type_name)? {
            self.read_custom(&type_name, custom, &object)?;
            return Ok(value);
        }

        for def in self.registry.chain(&type_name)? {
            let field_count = self.input.read_usize()?;
            for _ in 0..field_count {
                let at = self.input.position();
                let field = self.read_node()?;
                if def.field(&field.name).is_some() {
                    object.write().set(field.name, field.value);
                } else if self.config.strict {
                    return Err(SerializeError::UnknownField {
                        type_name: def.name().to_string(),
                        field: field.name,
                        position: at,
                    });
                } else {
                    debug!(
                        "dropping field `{}` no longer declared on `{}` (line {})",
                        field.name,
                        def.name(),
                        at
                    );
                }
            }

            let event_count = self.input.read_usize()?;
            for _ in 0..event_count {
                let at = self.input.position();
                let event = self.input.read_line()?;
                self.read_known_type()?;
                let known = def.event(&event).is_some();
                if !known && self.config.strict {
                    return Err(SerializeError::UnknownEvent {
                        type_name: def.name().to_string(),
                        event,
                        position: at,
                    });
                }

                let handler_count = self.input.read_usize()?;
                for _ in 0..handler_count {
                    let handler_at = self.input.position();
                    let handler = self.read_node()?;
                    let Value::Delegate(delegate) = handler.value else {
                        return Err(self.malformed(handler_at, "event handler is not a delegate"));
                    };
                    if known {
                        object.write().subscribe(event.clone(), delegate);
                    }
                }
                if !known {
                    debug!(
                        "dropping {} handlers of event `{}` no longer declared on `{}` (line {})",
                        handler_count,
                        event,
                        def.name(),
                        at
                    );
                }
            }
        }
        Ok(value)
    }

    fn read_custom(
        &mut self,
        type_name: &TypeName,
        custom: Arc<dyn Serializable>,
        object: &ObjectRef,
    ) -> Result<()> {
        trace!("`{}` deserializes itself", type_name);
        let open = self.groups.len();
        custom
            .serialize(object, self)
            .map_err(|err| custom_error(type_name, err))?;
        if self.groups.len() > open {
            let unclosed = self.groups.split_off(open);
            return Err(self.malformed(
                self.input.position(),
                format!("serializer for `{}` left {:?} open", type_name, unclosed),
            ));
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Delegates and Descriptors
    // ═══════════════════════════════════════════════════════════════════

    fn read_delegate(&mut self, position: usize) -> Result<Value> {
        let (delegate_type, def) = self.read_known_type()?;
        if !matches!(def.kind(), TypeKind::Delegate) {
            return Err(self.malformed(position, format!("`{}` is not a delegate type", delegate_type)));
        }

        let method_at = self.input.position();
        let Value::Member(method) = self.read_node()?.value else {
            return Err(self.malformed(method_at, "delegate method is not a member descriptor"));
        };

        let value = Value::delegate(DelegateValue {
            delegate_type,
            method,
            target: None,
        });
        self.register(position, ShapeTag::Delegate, &value);

        let marker_at = self.input.position();
        match self.input.read_line()?.as_str() {
            TARGET => {
                let target = self.read_node()?.value;
                if let Some(delegate) = value.as_delegate() {
                    delegate.write().target = Some(target);
                }
            }
            NULL_TARGET => {}
            other => {
                return Err(self.malformed(
                    marker_at,
                    format!("expected a delegate target marker, found {:?}", other),
                ))
            }
        }
        Ok(value)
    }

    fn read_member(&mut self) -> Result<MemberInfo> {
        let position = self.input.position();
        let (declaring_type, _) = self.read_known_type()?;

        let kind_at = self.input.position();
        let kind_name = self.input.read_line()?;
        let kind = MemberKind::from_name(&kind_name)
            .ok_or_else(|| self.malformed(kind_at, format!("unknown member kind {:?}", kind_name)))?;
        let name = self.input.read_line()?;

        let mut params = Vec::new();
        if kind == MemberKind::Method {
            let count = self.input.read_usize()?;
            for _ in 0..count {
                params.push(self.read_known_type()?.0);
            }
        }

        let member = MemberInfo::new(declaring_type, kind, name, params);
        if !self.registry.has_member(&member)? {
            return Err(SerializeError::MemberNotFound {
                type_name: member.declaring_type.to_string(),
                member: member.to_string(),
                position,
            });
        }
        Ok(member)
    }
}

impl<R: BufRead> Archive for GraphReader<'_, R> {
    fn is_reading(&self) -> bool {
        true
    }

    fn target(&self) -> SerializationTarget {
        self.config.target
    }

    fn begin_group(&mut self, name: &str) -> Result<()> {
        let position = self.input.position();
        let found = self.input.read_line()?;
        if found != name {
            return Err(self.malformed(
                position,
                format!("expected group `{}`, found {:?}", name, found),
            ));
        }
        self.groups.push(name.to_string());
        Ok(())
    }

    fn end_group(&mut self) -> Result<()> {
        let position = self.input.position();
        let name = self
            .groups
            .pop()
            .ok_or_else(|| self.malformed(position, "end_group without an open group"))?;
        let expected = group_end(&name);
        let found = self.input.read_line()?;
        if found != expected {
            return Err(self.malformed(
                position,
                format!("expected end of group `{}`, found {:?}", name, found),
            ));
        }
        Ok(())
    }

    fn value(&mut self, name: &str, value: &mut Value) -> Result<()> {
        let position = self.input.position();
        let node = self.read_node()?;
        if node.name != name {
            return Err(self.malformed(
                position,
                format!("expected `{}`, found `{}`", name, node.name),
            ));
        }
        *value = node.value;
        Ok(())
    }

    fn enum_value(&mut self, name: &str, value: &mut EnumValue) -> Result<()> {
        let position = self.input.position();
        let found = self.input.read_line()?;
        if found != name {
            return Err(self.malformed(
                position,
                format!("expected `{}`, found `{}`", name, found),
            ));
        }
        *value = self.read_enum()?;
        Ok(())
    }

    fn flag_partial_read(&mut self) {
        self.partial_read = true;
    }
}

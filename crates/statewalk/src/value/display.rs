//! Display and Debug implementations for Value
//!
//! Heap instances print as a one-level summary: graphs may be cyclic, and a
//! value may be printed while its own lock is held.

use std::fmt;

use super::*;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "'{}'", c),

            Value::I8(n) => write!(f, "{}i8", n),
            Value::I16(n) => write!(f, "{}i16", n),
            Value::I32(n) => write!(f, "{}", n), // Default integer type
            Value::I64(n) => write!(f, "{}i64", n),

            Value::U8(n) => write!(f, "{}u8", n),
            Value::U16(n) => write!(f, "{}u16", n),
            Value::U32(n) => write!(f, "{}u32", n),
            Value::U64(n) => write!(f, "{}u64", n),

            Value::F32(n) => write!(f, "{}f32", n),
            Value::F64(n) => write!(f, "{}", n), // Default float type

            Value::Handle(h) => write!(f, "<handle {:#x}>", h.0),
            Value::String(s) => write!(f, "{:?}", s.as_ref()),
            Value::Enum(e) => write!(f, "{}::{}", e.type_name, e.variant),
            Value::Unused(m) => write!(f, "<unused {}>", m.type_name()),

            Value::Array(items) => {
                let Some(items) = items.try_read() else {
                    return write!(f, "<locked>");
                };
                write!(f, "<[{}; {}]>", items.element_type, items.len())
            }
            Value::Enumerable(items) => {
                let Some(items) = items.try_read() else {
                    return write!(f, "<locked>");
                };
                write!(f, "<enumerable {}; {}>", items.element_type, items.len())
            }
            Value::Collection(c) => {
                let Some(c) = c.try_read() else {
                    return write!(f, "<locked>");
                };
                write!(f, "<{}; {}>", c.type_name, c.len())
            }
            Value::Object(o) => {
                let Some(o) = o.try_read() else {
                    return write!(f, "<locked>");
                };
                write!(f, "{} {{ ", o.type_name)?;
                for (i, name) in o.fields.keys().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", name)?;
                }
                write!(f, " }}")
            }
            Value::Delegate(d) => {
                let Some(d) = d.try_read() else {
                    return write!(f, "<locked>");
                };
                write!(f, "<{} -> {}>", d.delegate_type, d.method)
            }

            Value::Type(t) => write!(f, "typeof({})", t),
            Value::Member(m) => write!(f, "<member {}>", m),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display is more user-friendly, Debug is more detailed
        match self {
            Value::String(s) => write!(f, "{}", s.as_ref()), // No quotes for Display
            Value::Char(c) => write!(f, "{}", c),            // No quotes for Display
            _ => fmt::Debug::fmt(self, f),
        }
    }
}

//! Line-oriented record codec
//!
//! A stream is a sequence of text lines; the index of a line is its stream
//! position. Each primitive field of a record occupies exactly one line, so
//! text is escaped to keep embedded newlines from splitting a field.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use super::ShapeTag;
use crate::error::{Result, SerializeError};
use crate::types::{names, TypeName};
use crate::value::Value;

/// First line of every stream
pub const FORMAT_HEADER: &str = "statewalk 1";

// ═══════════════════════════════════════════════════════════════════════
// Escaping
// ═══════════════════════════════════════════════════════════════════════

pub(crate) fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['\\', '\n', '\r']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

pub(crate) fn unescape(line: &str) -> Option<String> {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}

// ═══════════════════════════════════════════════════════════════════════
// Primitive Text Forms
// ═══════════════════════════════════════════════════════════════════════

/// Declared type name and invariant text form of a primitive.
///
/// Floats use the shortest representation that parses back to the same bits.
pub(crate) fn primitive_record(value: &Value) -> Option<(&'static str, String)> {
    let ty = value.primitive_type()?;
    let text = match value {
        Value::Bool(b) => b.to_string(),
        Value::Char(c) => c.to_string(),
        Value::I8(n) => n.to_string(),
        Value::I16(n) => n.to_string(),
        Value::I32(n) => n.to_string(),
        Value::I64(n) => n.to_string(),
        Value::U8(n) => n.to_string(),
        Value::U16(n) => n.to_string(),
        Value::U32(n) => n.to_string(),
        Value::U64(n) => n.to_string(),
        Value::F32(n) => n.to_string(),
        Value::F64(n) => n.to_string(),
        _ => return None,
    };
    Some((ty, text))
}

/// Parse the text form of a primitive of the named type.
pub(crate) fn parse_primitive(ty: &str, text: &str) -> Option<Value> {
    let value = match ty {
        names::BOOL => Value::Bool(text.parse().ok()?),
        names::CHAR => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return None,
            }
        }
        names::I8 => Value::I8(text.parse().ok()?),
        names::I16 => Value::I16(text.parse().ok()?),
        names::I32 => Value::I32(text.parse().ok()?),
        names::I64 => Value::I64(text.parse().ok()?),
        names::U8 => Value::U8(text.parse().ok()?),
        names::U16 => Value::U16(text.parse().ok()?),
        names::U32 => Value::U32(text.parse().ok()?),
        names::U64 => Value::U64(text.parse().ok()?),
        names::F32 => Value::F32(text.parse().ok()?),
        names::F64 => Value::F64(text.parse().ok()?),
        _ => return None,
    };
    Some(value)
}

// ═══════════════════════════════════════════════════════════════════════
// Writing
// ═══════════════════════════════════════════════════════════════════════

/// Writes record fields one per line, counting positions.
#[derive(Debug)]
pub(crate) struct LineWriter<W: Write> {
    out: W,
    position: usize,
}

impl<W: Write> LineWriter<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out, position: 0 }
    }

    /// Position of the next line to be written
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn write_line(&mut self, text: &str) -> Result<()> {
        self.out.write_all(escape(text).as_bytes())?;
        self.out.write_all(b"\n")?;
        self.position += 1;
        Ok(())
    }

    pub(crate) fn write_usize(&mut self, n: usize) -> Result<()> {
        self.write_line(&n.to_string())
    }

    pub(crate) fn write_u64(&mut self, n: u64) -> Result<()> {
        self.write_line(&n.to_string())
    }

    pub(crate) fn write_bool(&mut self, b: bool) -> Result<()> {
        self.write_line(if b { "true" } else { "false" })
    }

    pub(crate) fn write_tag(&mut self, tag: ShapeTag) -> Result<()> {
        self.write_line(tag.as_str())
    }

    /// Generic flag, then either the bare name or the definition name,
    /// arity and each argument in turn.
    pub(crate) fn write_type(&mut self, ty: &TypeName) -> Result<()> {
        self.write_bool(ty.is_generic())?;
        self.write_line(ty.name())?;
        if ty.is_generic() {
            self.write_usize(ty.arity())?;
            for arg in ty.args() {
                self.write_type(arg)?;
            }
        }
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Reading
// ═══════════════════════════════════════════════════════════════════════

/// Reads record fields one per line, counting positions.
#[derive(Debug)]
pub(crate) struct LineReader<R: BufRead> {
    input: R,
    position: usize,
    buf: String,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(input: R) -> Self {
        Self {
            input,
            position: 0,
            buf: String::new(),
        }
    }

    /// Position of the next line to be read
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    fn malformed(&self, position: usize, message: impl Into<String>) -> SerializeError {
        SerializeError::Malformed {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn read_line(&mut self) -> Result<String> {
        let position = self.position;
        self.buf.clear();
        if self.input.read_line(&mut self.buf)? == 0 {
            return Err(SerializeError::UnexpectedEof { position });
        }
        self.position += 1;

        let line = self.buf.strip_suffix('\n').unwrap_or(&self.buf);
        let line = line.strip_suffix('\r').unwrap_or(line);
        unescape(line).ok_or_else(|| self.malformed(position, "bad escape sequence"))
    }

    pub(crate) fn read_usize(&mut self) -> Result<usize> {
        let position = self.position;
        let line = self.read_line()?;
        line.parse()
            .map_err(|_| self.malformed(position, format!("expected a count, found {:?}", line)))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        let position = self.position;
        let line = self.read_line()?;
        line.parse().map_err(|_| SerializeError::InvalidValue {
            kind: "handle".to_string(),
            text: line.clone(),
            position,
        })
    }

    pub(crate) fn read_bool(&mut self) -> Result<bool> {
        let position = self.position;
        match self.read_line()?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(self.malformed(position, format!("expected a flag, found {:?}", other))),
        }
    }

    pub(crate) fn read_tag(&mut self) -> Result<ShapeTag> {
        let position = self.position;
        let line = self.read_line()?;
        ShapeTag::from_name(&line)
            .ok_or_else(|| self.malformed(position, format!("unknown shape tag {:?}", line)))
    }

    /// Decode a type record nested at most `max_depth` generic levels deep.
    /// Registration is not checked here.
    pub(crate) fn read_type(&mut self, max_depth: usize) -> Result<TypeName> {
        self.read_type_within(max_depth, max_depth)
    }

    fn read_type_within(&mut self, budget: usize, limit: usize) -> Result<TypeName> {
        if budget == 0 {
            return Err(SerializeError::DepthExceeded { limit });
        }
        let generic = self.read_bool()?;
        let name = self.read_line()?;
        if !generic {
            return Ok(TypeName::new(name));
        }
        let arity = self.read_usize()?;
        let args = (0..arity)
            .map(|_| self.read_type_within(budget - 1, limit))
            .collect::<Result<Vec<_>>>()?;
        Ok(TypeName::generic(name, args))
    }
}

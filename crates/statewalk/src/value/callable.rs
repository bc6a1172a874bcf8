//! Callable value types: delegates and reflective member descriptors

use std::fmt;
use std::sync::Arc;

use super::Value;
use crate::types::{TypeName, TypeRegistry};

/// Type alias for native method bodies: `(target, args) -> result`
pub type MethodFn = Arc<dyn Fn(Option<&Value>, &[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Which kind of member a [`MemberInfo`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Instance field
    Field,
    /// Property
    Property,
    /// Method (overload identified by parameter types)
    Method,
}

impl MemberKind {
    /// Stream spelling
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Field => "Field",
            MemberKind::Property => "Property",
            MemberKind::Method => "Method",
        }
    }

    /// Parse the stream spelling
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Field" => Some(MemberKind::Field),
            "Property" => Some(MemberKind::Property),
            "Method" => Some(MemberKind::Method),
            _ => None,
        }
    }
}

/// A reflective reference to one member of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberInfo {
    /// The type declaring the member
    pub declaring_type: TypeName,

    /// Field, property or method
    pub kind: MemberKind,

    /// Member name
    pub name: String,

    /// Parameter types (methods only; empty otherwise)
    pub params: Vec<TypeName>,
}

impl MemberInfo {
    /// Create a member descriptor
    pub fn new(
        declaring_type: TypeName,
        kind: MemberKind,
        name: impl Into<String>,
        params: Vec<TypeName>,
    ) -> Self {
        Self {
            declaring_type,
            kind,
            name: name.into(),
            params,
        }
    }

    /// Descriptor of a method overload
    pub fn method(declaring_type: TypeName, name: impl Into<String>, params: Vec<TypeName>) -> Self {
        Self::new(declaring_type, MemberKind::Method, name, params)
    }
}

impl fmt::Display for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.name)?;
        if self.kind == MemberKind::Method {
            write!(f, "(")?;
            for (i, param) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", param)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// A method bound to an optional target instance.
#[derive(Debug, Clone)]
pub struct DelegateValue {
    /// The delegate type (e.g. `Action`)
    pub delegate_type: TypeName,

    /// The bound method
    pub method: Arc<MemberInfo>,

    /// The instance the method runs on; `None` for static methods
    pub target: Option<Value>,
}

impl DelegateValue {
    /// Delegate bound to an instance method
    pub fn bound(delegate_type: TypeName, method: MemberInfo, target: Value) -> Self {
        Self {
            delegate_type,
            method: Arc::new(method),
            target: Some(target),
        }
    }

    /// Delegate to a static method
    pub fn unbound(delegate_type: TypeName, method: MemberInfo) -> Self {
        Self {
            delegate_type,
            method: Arc::new(method),
            target: None,
        }
    }
}

impl Value {
    /// Invoke a delegate value through the registry.
    ///
    /// The delegate lock is released before the method body runs.
    pub fn invoke(&self, registry: &TypeRegistry, args: &[Value]) -> anyhow::Result<Value> {
        let Value::Delegate(delegate) = self else {
            anyhow::bail!("cannot invoke {:?}: not a delegate", self);
        };

        let (method, target) = {
            let delegate = delegate.read();
            (delegate.method.clone(), delegate.target.clone())
        };

        let def = registry.find_method(&method)?;
        if !def.is_static && target.is_none() {
            anyhow::bail!("instance method {} invoked without a target", method);
        }
        (def.body)(target.as_ref(), args)
    }
}

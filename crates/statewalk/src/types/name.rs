//! Closed generic type names

use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// A fully closed type name such as `Player` or `Dictionary<String, i32>`.
///
/// Non-generic names carry no arguments. Generic names carry one argument per
/// type parameter of their definition, each itself a closed `TypeName`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    name: String,
    args: Vec<TypeName>,
}

impl TypeName {
    /// Create a non-generic type name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a closed generic type name.
    pub fn generic(name: impl Into<String>, args: Vec<TypeName>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Parse Rust-style type syntax, e.g. `List<game::Item>`.
    pub fn parse(text: &str) -> Result<Self, RegistryError> {
        let invalid = |message: String| RegistryError::InvalidTypeName {
            name: text.to_string(),
            message,
        };
        let ty: syn::Type = syn::parse_str(text).map_err(|e| invalid(e.to_string()))?;
        from_syn(&ty).map_err(invalid)
    }

    /// The definition name, without generic arguments.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generic arguments (empty for non-generic types).
    pub fn args(&self) -> &[TypeName] {
        &self.args
    }

    /// Whether this name closes a generic definition.
    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    /// Number of generic arguments.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Registry key of the open definition: `name` or ``name`arity``.
    pub fn definition_key(&self) -> String {
        definition_key(&self.name, self.arity())
    }
}

/// Registry key for a definition with the given arity.
pub(crate) fn definition_key(name: &str, arity: usize) -> String {
    if arity == 0 {
        name.to_string()
    } else {
        format!("{}`{}", name, arity)
    }
}

fn from_syn(ty: &syn::Type) -> Result<TypeName, String> {
    match ty {
        syn::Type::Path(type_path) if type_path.qself.is_none() => {
            let path = &type_path.path;
            if path.leading_colon.is_some() {
                return Err("leading `::` is not supported".to_string());
            }

            let mut segments = Vec::with_capacity(path.segments.len());
            let mut args = Vec::new();
            let last = path.segments.len().saturating_sub(1);

            for (i, segment) in path.segments.iter().enumerate() {
                segments.push(segment.ident.to_string());
                match &segment.arguments {
                    syn::PathArguments::None => {}
                    syn::PathArguments::AngleBracketed(generic) if i == last => {
                        for arg in &generic.args {
                            match arg {
                                syn::GenericArgument::Type(inner) => args.push(from_syn(inner)?),
                                _ => return Err("only type arguments are supported".to_string()),
                            }
                        }
                    }
                    _ => {
                        return Err(format!(
                            "unexpected arguments on path segment `{}`",
                            segment.ident
                        ))
                    }
                }
            }

            Ok(TypeName::generic(segments.join("::"), args))
        }
        syn::Type::Group(group) => from_syn(&group.elem),
        syn::Type::Paren(paren) => from_syn(&paren.elem),
        _ => Err("expected a type path".to_string()),
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl FromStr for TypeName {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeName::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let ty = TypeName::parse("Player").unwrap();
        assert_eq!(ty.name(), "Player");
        assert!(!ty.is_generic());
        assert_eq!(ty.definition_key(), "Player");
    }

    #[test]
    fn test_parse_nested_generic() {
        let ty = TypeName::parse("Dictionary<String, List<game::Item>>").unwrap();
        assert_eq!(ty.name(), "Dictionary");
        assert_eq!(ty.arity(), 2);
        assert_eq!(ty.args()[1].args()[0].name(), "game::Item");
        assert_eq!(ty.definition_key(), "Dictionary`2");
        assert_eq!(ty.to_string(), "Dictionary<String, List<game::Item>>");
    }

    #[test]
    fn test_parse_rejects_non_paths() {
        assert!(TypeName::parse("&str").is_err());
        assert!(TypeName::parse("[i32; 4]").is_err());
        assert!(TypeName::parse("List<'a>").is_err());
        assert!(TypeName::parse("not a type").is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let ty = TypeName::generic(
            "Dictionary",
            vec![TypeName::new("String"), TypeName::new("i32")],
        );
        assert_eq!(ty.to_string().parse::<TypeName>().unwrap(), ty);
    }
}

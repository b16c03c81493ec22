use regex::Regex;

use crate::config::ConfigError;
use crate::definition::{
    Argument, DefaultValue, Definition, ExtendedAttribute, ExtendedAttributeValue, Member,
    TypeDescriptor,
};

/// A `(pattern, replacement)` pair applied to every name-bearing string of a
/// definition tree. Matching is unanchored, so substrings of longer
/// identifiers are rewritten too.
#[derive(Debug, Clone)]
pub struct RenameRule {
    pub pattern: Regex,
    pub replacement: String,
}

impl RenameRule {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, ConfigError> {
        let compiled = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: compiled,
            replacement: replacement.to_string(),
        })
    }

    /// Substitute every match in `value`
    pub fn apply(&self, value: &str) -> String {
        self.pattern.replace_all(value, self.replacement.as_str()).into_owned()
    }
}

/// Recursive name substitution over the definition grammar.
///
/// Implementations destructure their node exhaustively, so adding a field to
/// the data model fails to compile until the traversal handles it.
pub trait Rename: Sized {
    fn rename(self, rule: &RenameRule) -> Self;
}

impl Rename for String {
    fn rename(self, rule: &RenameRule) -> Self {
        rule.apply(&self)
    }
}

impl<T: Rename> Rename for Option<T> {
    fn rename(self, rule: &RenameRule) -> Self {
        self.map(|value| value.rename(rule))
    }
}

impl<T: Rename> Rename for Vec<T> {
    fn rename(self, rule: &RenameRule) -> Self {
        self.into_iter().map(|value| value.rename(rule)).collect()
    }
}

impl<T: Rename> Rename for Box<T> {
    fn rename(self, rule: &RenameRule) -> Self {
        Box::new((*self).rename(rule))
    }
}

impl Rename for Definition {
    fn rename(self, rule: &RenameRule) -> Self {
        let Definition {
            kind,
            name,
            partial,
            inheritance,
            implements,
            members,
            values,
            ext_attrs,
            idl_type,
            arguments,
        } = self;

        Definition {
            kind,
            name: name.rename(rule),
            partial,
            inheritance: inheritance.rename(rule),
            implements: implements.rename(rule),
            members: members.rename(rule),
            // Enum values are literals, not names
            values,
            ext_attrs: ext_attrs.rename(rule),
            idl_type: idl_type.rename(rule),
            arguments: arguments.rename(rule),
        }
    }
}

impl Rename for Member {
    fn rename(self, rule: &RenameRule) -> Self {
        let Member {
            kind,
            name,
            idl_type,
            key_type,
            required,
            readonly,
            is_static,
            specials,
            default,
            arguments,
            ext_attrs,
        } = self;

        Member {
            kind,
            name: name.rename(rule),
            idl_type: idl_type.rename(rule),
            key_type: key_type.rename(rule),
            required,
            readonly,
            is_static,
            specials,
            default: default.rename(rule),
            arguments: arguments.rename(rule),
            ext_attrs: ext_attrs.rename(rule),
        }
    }
}

impl Rename for Argument {
    fn rename(self, rule: &RenameRule) -> Self {
        let Argument {
            name,
            idl_type,
            optional,
            variadic,
            default,
            ext_attrs,
        } = self;

        Argument {
            name: name.rename(rule),
            idl_type: idl_type.rename(rule),
            optional,
            variadic,
            default: default.rename(rule),
            ext_attrs: ext_attrs.rename(rule),
        }
    }
}

impl Rename for TypeDescriptor {
    fn rename(self, rule: &RenameRule) -> Self {
        match self {
            TypeDescriptor::Named(name) => TypeDescriptor::Named(name.rename(rule)),
            TypeDescriptor::Sequence(inner) => TypeDescriptor::Sequence(inner.rename(rule)),
            TypeDescriptor::Nullable(inner) => TypeDescriptor::Nullable(inner.rename(rule)),
            TypeDescriptor::Union(members) => TypeDescriptor::Union(members.rename(rule)),
            TypeDescriptor::Generic { generic, arguments } => TypeDescriptor::Generic {
                generic: generic.rename(rule),
                arguments: arguments.rename(rule),
            },
        }
    }
}

impl Rename for DefaultValue {
    fn rename(self, _rule: &RenameRule) -> Self {
        // Default values carry no identifiers; string defaults must keep
        // matching the enum values they name.
        let DefaultValue { kind, value } = self;
        DefaultValue { kind, value }
    }
}

impl Rename for ExtendedAttribute {
    fn rename(self, rule: &RenameRule) -> Self {
        let ExtendedAttribute { name, rhs, arguments } = self;
        ExtendedAttribute {
            name: name.rename(rule),
            rhs: rhs.rename(rule),
            arguments: arguments.rename(rule),
        }
    }
}

impl Rename for ExtendedAttributeValue {
    fn rename(self, rule: &RenameRule) -> Self {
        match self {
            ExtendedAttributeValue::Identifier(value) => {
                ExtendedAttributeValue::Identifier(value.rename(rule))
            }
            ExtendedAttributeValue::IdentifierList(values) => {
                ExtendedAttributeValue::IdentifierList(values.rename(rule))
            }
            literal @ (ExtendedAttributeValue::String(_) | ExtendedAttributeValue::Number(_)) => literal,
        }
    }
}

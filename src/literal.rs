use crate::definition::{Argument, DefaultKind, DefaultValue, Member, TypeDescriptor};
use crate::error::MappingError;
use crate::registry::DefinitionIndex;

/// How a backend spells a member of an enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumLiteralStyle {
    /// `namespace::Enum::kValueName`
    ScopedConstant,
    /// The value itself as a string literal
    StringLiteral,
}

/// Table-driven literal syntax of one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralSyntax {
    pub true_literal: &'static str,
    pub false_literal: &'static str,
    pub quote: char,
    pub enum_style: EnumLiteralStyle,
    pub null_literal: Option<&'static str>,
    pub empty_sequence: Option<&'static str>,
    pub empty_dictionary: Option<&'static str>,
}

pub static CPP_LITERALS: LiteralSyntax = LiteralSyntax {
    true_literal: "true",
    false_literal: "false",
    quote: '"',
    enum_style: EnumLiteralStyle::ScopedConstant,
    null_literal: Some("std::nullopt"),
    empty_sequence: Some("{}"),
    empty_dictionary: Some("{}"),
};

pub static SCRIPT_LITERALS: LiteralSyntax = LiteralSyntax {
    true_literal: "true",
    false_literal: "false",
    quote: '\'',
    enum_style: EnumLiteralStyle::StringLiteral,
    null_literal: Some("null"),
    empty_sequence: Some("[]"),
    empty_dictionary: Some("{}"),
};

pub static IDL_LITERALS: LiteralSyntax = LiteralSyntax {
    true_literal: "true",
    false_literal: "false",
    quote: '"',
    enum_style: EnumLiteralStyle::StringLiteral,
    null_literal: Some("null"),
    empty_sequence: Some("[]"),
    empty_dictionary: Some("{}"),
};

/// Resolves defaults and enum values to backend literals, validating enum
/// values against the canonical definitions.
pub struct LiteralResolver<'a> {
    syntax: &'static LiteralSyntax,
    index: &'a DefinitionIndex,
    namespace: Option<&'a str>,
}

impl<'a> LiteralResolver<'a> {
    pub fn new(syntax: &'static LiteralSyntax, index: &'a DefinitionIndex) -> Self {
        Self {
            syntax,
            index,
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: &'a str) -> Self {
        if !namespace.is_empty() {
            self.namespace = Some(namespace);
        }
        self
    }

    pub fn is_enum(&self, type_name: &str) -> bool {
        self.index.is_enum(type_name)
    }

    /// Literal for a member's default, if it has one
    pub fn resolve_default(&self, member: &Member) -> Result<Option<String>, MappingError> {
        member
            .default
            .as_ref()
            .map(|default| self.resolve_value(&member.idl_type, default))
            .transpose()
    }

    pub fn resolve_argument_default(&self, argument: &Argument) -> Result<Option<String>, MappingError> {
        argument
            .default
            .as_ref()
            .map(|default| self.resolve_value(&argument.idl_type, default))
            .transpose()
    }

    pub fn resolve_value(&self, idl_type: &TypeDescriptor, default: &DefaultValue) -> Result<String, MappingError> {
        let type_name = idl_type.base_name().unwrap_or_default();
        match default.kind {
            DefaultKind::Number => Ok(default.value.clone()),
            DefaultKind::Boolean => Ok(self.boolean_literal(&default.value)),
            DefaultKind::String if self.is_enum(type_name) => {
                self.resolve_enum_literal(type_name, &default.value)
            }
            DefaultKind::String => Ok(self.string_literal(&default.value)),
            _ => self.to_literal(type_name, default),
        }
    }

    /// Literal for `value` as a member of `enum_name`
    pub fn resolve_enum_literal(&self, enum_name: &str, value: &str) -> Result<String, MappingError> {
        let values = self
            .index
            .enum_values(enum_name)
            .ok_or_else(|| MappingError::UnknownTypeOrValue {
                type_name: enum_name.to_string(),
                value: value.to_string(),
            })?;
        if !values.iter().any(|declared| declared == value) {
            return Err(MappingError::InvalidEnumValue {
                enum_name: enum_name.to_string(),
                value: value.to_string(),
            });
        }

        Ok(match self.syntax.enum_style {
            EnumLiteralStyle::StringLiteral => self.string_literal(value),
            EnumLiteralStyle::ScopedConstant => {
                let constant = format!("{}::{}", enum_name, enum_constant_name(value));
                match self.namespace {
                    Some(namespace) => format!("{}::{}", namespace, constant),
                    None => constant,
                }
            }
        })
    }

    /// Generic path for defaults that are neither numbers, booleans nor strings.
    /// `null`, `[]` and `{}` keep their own spelling even on an enum type.
    pub fn to_literal(&self, type_name: &str, default: &DefaultValue) -> Result<String, MappingError> {
        let known = match default.kind {
            DefaultKind::Null => self.syntax.null_literal,
            DefaultKind::Sequence => self.syntax.empty_sequence,
            DefaultKind::Dictionary => self.syntax.empty_dictionary,
            DefaultKind::Number | DefaultKind::Boolean | DefaultKind::String => None,
        };
        if let Some(literal) = known {
            return Ok(literal.to_string());
        }
        if default.kind == DefaultKind::String && self.is_enum(type_name) {
            return self.resolve_enum_literal(type_name, &default.value);
        }
        Err(MappingError::UnknownTypeOrValue {
            type_name: type_name.to_string(),
            value: default.value.clone(),
        })
    }

    pub fn boolean_literal(&self, value: &str) -> String {
        if value == "true" {
            self.syntax.true_literal.to_string()
        } else {
            self.syntax.false_literal.to_string()
        }
    }

    pub fn string_literal(&self, value: &str) -> String {
        let quote = self.syntax.quote;
        let mut literal = String::with_capacity(value.len() + 2);
        literal.push(quote);
        for c in value.chars() {
            if c == quote || c == '\\' {
                literal.push('\\');
            }
            literal.push(c);
        }
        literal.push(quote);
        literal
    }
}

/// `k` followed by the PascalCase form of an enum value: `"no-repeat"` becomes
/// `kNoRepeat`
pub fn enum_constant_name(value: &str) -> String {
    let words: String = value
        .split(|c: char| c == ' ' || c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();
    format!("k{}", capitalize(&words))
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of top-level schema declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefinitionKind {
    Interface,
    Dictionary,
    Enum,
    Callback,
    CallbackInterface,
    Typedef,
}

impl DefinitionKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            DefinitionKind::Interface => "interface",
            DefinitionKind::Dictionary => "dictionary",
            DefinitionKind::Enum => "enum",
            DefinitionKind::Callback => "callback",
            DefinitionKind::CallbackInterface => "callback interface",
            DefinitionKind::Typedef => "typedef",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One named schema declaration. Before merging, each parsed occurrence is a
/// fragment; after merging there is exactly one canonical definition per name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    pub partial: bool,
    pub inheritance: Option<String>,
    pub implements: Option<String>,
    pub members: Vec<Member>,
    pub values: Vec<String>,
    pub ext_attrs: Vec<ExtendedAttribute>,
    /// Aliased type of a typedef, or return type of a callback
    pub idl_type: Option<TypeDescriptor>,
    /// Callback arguments
    pub arguments: Vec<Argument>,
}

impl Definition {
    pub fn new(kind: DefinitionKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            partial: false,
            inheritance: None,
            implements: None,
            members: Vec::new(),
            values: Vec::new(),
            ext_attrs: Vec::new(),
            idl_type: None,
            arguments: Vec::new(),
        }
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.values = values;
        self
    }

    pub fn with_inheritance(mut self, parent: impl Into<String>) -> Self {
        self.inheritance = Some(parent.into());
        self
    }

    pub fn as_partial(mut self) -> Self {
        self.partial = true;
        self
    }

    /// Lower-cased name used as the stem of every generated file
    pub fn file_stem(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberKind {
    /// Dictionary member
    Field,
    Attribute,
    Operation,
    Constructor,
    Const,
    Iterable,
    Maplike,
    Setlike,
    Stringifier,
}

/// A member of an interface or dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub kind: MemberKind,
    pub name: String,
    pub idl_type: TypeDescriptor,
    /// Key type of `iterable<K, V>` and `maplike<K, V>`
    pub key_type: Option<TypeDescriptor>,
    pub required: bool,
    pub readonly: bool,
    pub is_static: bool,
    pub specials: Vec<String>,
    pub default: Option<DefaultValue>,
    pub arguments: Vec<Argument>,
    pub ext_attrs: Vec<ExtendedAttribute>,
}

impl Member {
    pub fn new(kind: MemberKind, name: impl Into<String>, idl_type: TypeDescriptor) -> Self {
        Self {
            kind,
            name: name.into(),
            idl_type,
            key_type: None,
            // Only dictionary members can be omitted
            required: kind != MemberKind::Field,
            readonly: false,
            is_static: false,
            specials: Vec::new(),
            default: None,
            arguments: Vec::new(),
            ext_attrs: Vec::new(),
        }
    }

    /// Dictionary member shorthand
    pub fn field(name: impl Into<String>, idl_type: TypeDescriptor) -> Self {
        Self::new(MemberKind::Field, name, idl_type)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub idl_type: TypeDescriptor,
    pub optional: bool,
    pub variadic: bool,
    pub default: Option<DefaultValue>,
    pub ext_attrs: Vec<ExtendedAttribute>,
}

impl Argument {
    pub fn new(name: impl Into<String>, idl_type: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            idl_type,
            optional: false,
            variadic: false,
            default: None,
            ext_attrs: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Recursive description of a schema type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeDescriptor {
    Named(String),
    Sequence(Box<TypeDescriptor>),
    Nullable(Box<TypeDescriptor>),
    /// Parsed with any arity; only binary unions can be mapped to a backend
    Union(Vec<TypeDescriptor>),
    Generic {
        generic: String,
        arguments: Vec<TypeDescriptor>,
    },
}

/// Generics that denote an ordered sequence in every backend
pub const ARRAY_GENERICS: &[&str] = &["FrozenArray", "ObservableArray", "Array"];

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        TypeDescriptor::Named(name.into())
    }

    pub fn sequence(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Sequence(Box::new(inner))
    }

    pub fn nullable(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Nullable(Box::new(inner))
    }

    pub fn union(a: TypeDescriptor, b: TypeDescriptor) -> Self {
        TypeDescriptor::Union(vec![a, b])
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeDescriptor::Nullable(_))
    }

    /// True for `sequence<T>` and the array-like generics
    pub fn is_sequence_like(&self) -> bool {
        match self {
            TypeDescriptor::Sequence(_) => true,
            TypeDescriptor::Generic { generic, arguments } => {
                arguments.len() == 1 && ARRAY_GENERICS.contains(&generic.as_str())
            }
            _ => false,
        }
    }

    /// Identifier of a named type, looking through nullability
    pub fn base_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Named(name) => Some(name),
            TypeDescriptor::Nullable(inner) => inner.base_name(),
            _ => None,
        }
    }

    /// Every identifier referenced anywhere inside the type
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeDescriptor::Named(name) => names.push(name),
            TypeDescriptor::Sequence(inner) | TypeDescriptor::Nullable(inner) => {
                inner.collect_names(names)
            }
            TypeDescriptor::Union(members) => {
                for member in members {
                    member.collect_names(names);
                }
            }
            TypeDescriptor::Generic { arguments, .. } => {
                for argument in arguments {
                    argument.collect_names(names);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultKind {
    Number,
    Boolean,
    String,
    Null,
    Sequence,
    Dictionary,
}

/// Default value of a dictionary member or optional argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultValue {
    pub kind: DefaultKind,
    pub value: String,
}

impl DefaultValue {
    pub fn number(value: impl Into<String>) -> Self {
        Self { kind: DefaultKind::Number, value: value.into() }
    }

    pub fn boolean(value: bool) -> Self {
        Self { kind: DefaultKind::Boolean, value: value.to_string() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self { kind: DefaultKind::String, value: value.into() }
    }

    pub fn null() -> Self {
        Self { kind: DefaultKind::Null, value: "null".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtendedAttributeValue {
    Identifier(String),
    IdentifierList(Vec<String>),
    String(String),
    Number(String),
}

/// `[Name]`, `[Name=Value]`, `[Name(args)]` or `[Name=Value(args)]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedAttribute {
    pub name: String,
    pub rhs: Option<ExtendedAttributeValue>,
    pub arguments: Option<Vec<Argument>>,
}

impl ExtendedAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), rhs: None, arguments: None }
    }
}

// IDL serialisation, used by the `extract` backend to write canonical definitions

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Named(name) => f.write_str(name),
            TypeDescriptor::Sequence(inner) => write!(f, "sequence<{}>", inner),
            TypeDescriptor::Nullable(inner) => write!(f, "{}?", inner),
            TypeDescriptor::Union(members) => {
                write!(f, "({})", join(members, " or "))
            }
            TypeDescriptor::Generic { generic, arguments } => {
                write!(f, "{}<{}>", generic, join(arguments, ", "))
            }
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DefaultKind::String => write!(f, "\"{}\"", self.value),
            DefaultKind::Sequence => f.write_str("[]"),
            DefaultKind::Dictionary => f.write_str("{}"),
            DefaultKind::Null => f.write_str("null"),
            DefaultKind::Number | DefaultKind::Boolean => f.write_str(&self.value),
        }
    }
}

impl fmt::Display for ExtendedAttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtendedAttributeValue::Identifier(value) | ExtendedAttributeValue::Number(value) => {
                f.write_str(value)
            }
            ExtendedAttributeValue::IdentifierList(values) => write!(f, "({})", values.join(", ")),
            ExtendedAttributeValue::String(value) => write!(f, "\"{}\"", value),
        }
    }
}

impl fmt::Display for ExtendedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(rhs) = &self.rhs {
            write!(f, "={}", rhs)?;
        }
        if let Some(arguments) = &self.arguments {
            write!(f, "({})", join(arguments, ", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ext_attrs(f, &self.ext_attrs, " ")?;
        if self.optional {
            f.write_str("optional ")?;
        }
        write!(f, "{}", self.idl_type)?;
        if self.variadic {
            f.write_str("...")?;
        }
        write!(f, " {}", self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ext_attrs(f, &self.ext_attrs, " ")?;
        if self.is_static {
            f.write_str("static ")?;
        }
        match self.kind {
            MemberKind::Field => {
                if self.required {
                    f.write_str("required ")?;
                }
                write!(f, "{} {}", self.idl_type, self.name)?;
                if let Some(default) = &self.default {
                    write!(f, " = {}", default)?;
                }
            }
            MemberKind::Attribute => {
                if self.readonly {
                    f.write_str("readonly ")?;
                }
                write!(f, "attribute {} {}", self.idl_type, self.name)?;
            }
            MemberKind::Operation => {
                for special in &self.specials {
                    write!(f, "{} ", special)?;
                }
                write!(f, "{}", self.idl_type)?;
                if !self.name.is_empty() {
                    write!(f, " {}", self.name)?;
                }
                write!(f, "({})", join(&self.arguments, ", "))?;
            }
            MemberKind::Constructor => write!(f, "constructor({})", join(&self.arguments, ", "))?,
            MemberKind::Const => {
                write!(f, "const {} {}", self.idl_type, self.name)?;
                if let Some(default) = &self.default {
                    write!(f, " = {}", default)?;
                }
            }
            MemberKind::Iterable | MemberKind::Maplike | MemberKind::Setlike => {
                if self.readonly {
                    f.write_str("readonly ")?;
                }
                let keyword = match self.kind {
                    MemberKind::Iterable => "iterable",
                    MemberKind::Maplike => "maplike",
                    _ => "setlike",
                };
                match &self.key_type {
                    Some(key) => write!(f, "{}<{}, {}>", keyword, key, self.idl_type)?,
                    None => write!(f, "{}<{}>", keyword, self.idl_type)?,
                }
            }
            MemberKind::Stringifier => f.write_str("stringifier")?,
        }
        f.write_str(";")
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ext_attrs(f, &self.ext_attrs, "\n")?;
        if self.partial {
            f.write_str("partial ")?;
        }
        match self.kind {
            DefinitionKind::Enum => {
                writeln!(f, "enum {} {{", self.name)?;
                let values: Vec<String> =
                    self.values.iter().map(|value| format!("  \"{}\"", value)).collect();
                if !values.is_empty() {
                    writeln!(f, "{}", values.join(",\n"))?;
                }
                f.write_str("};")?;
            }
            DefinitionKind::Typedef => {
                let aliased = self.idl_type.clone().unwrap_or_else(|| TypeDescriptor::named("any"));
                write!(f, "typedef {} {};", aliased, self.name)?;
            }
            DefinitionKind::Callback => {
                let returned = self.idl_type.clone().unwrap_or_else(|| TypeDescriptor::named("undefined"));
                write!(f, "callback {} = {} ({});", self.name, returned, join(&self.arguments, ", "))?;
            }
            DefinitionKind::Interface | DefinitionKind::Dictionary | DefinitionKind::CallbackInterface => {
                write!(f, "{} {}", self.kind, self.name)?;
                if let Some(parent) = &self.inheritance {
                    write!(f, " : {}", parent)?;
                }
                f.write_str(" {\n")?;
                for member in &self.members {
                    writeln!(f, "  {}", member)?;
                }
                f.write_str("};")?;
            }
        }
        if let Some(implemented) = &self.implements {
            write!(f, "\n\n{} implements {};", self.name, implemented)?;
        }
        Ok(())
    }
}

fn write_ext_attrs(
    f: &mut fmt::Formatter<'_>,
    ext_attrs: &[ExtendedAttribute],
    trailer: &str,
) -> fmt::Result {
    if ext_attrs.is_empty() {
        return Ok(());
    }
    write!(f, "[{}]{}", join(ext_attrs, ", "), trailer)
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items.iter().map(|item| item.to_string()).collect::<Vec<_>>().join(separator)
}

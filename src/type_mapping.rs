//! Mapping of schema types to backend type expressions.
//!
//! Every backend shares one algorithm ([`TypeMapping::map_type`]); what
//! differs is a table of primitive spellings and the wrapper syntax for
//! nullable values, sequences, binary unions and omittable arguments.

use crate::definition::{Argument, Member, TypeDescriptor, ARRAY_GENERICS};
use crate::error::MappingError;

/// `prefix` + inner + `suffix`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapper {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl Wrapper {
    pub fn wrap(&self, inner: &str) -> String {
        format!("{}{}{}", self.prefix, inner, self.suffix)
    }
}

/// `prefix` + items joined by `separator` + `suffix`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSyntax {
    pub prefix: &'static str,
    pub separator: &'static str,
    pub suffix: &'static str,
}

impl ListSyntax {
    pub fn wrap(&self, items: &[String]) -> String {
        format!("{}{}{}", self.prefix, items.join(self.separator), self.suffix)
    }
}

/// Table-driven type syntax of one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSyntax {
    pub primitives: &'static [(&'static str, &'static str)],
    pub nullable: Wrapper,
    pub sequence: Wrapper,
    pub union: ListSyntax,
    pub omittable: Wrapper,
    /// Arguments of a non-array generic such as `Promise<T>`
    pub generic: ListSyntax,
}

/// Backend-polymorphic mapping from a type descriptor to a type expression.
pub trait TypeMapping {
    /// Builtin spelling of a primitive, `None` for user-defined types
    fn primitive(&self, name: &str) -> Option<&str>;
    fn wrap_nullable(&self, inner: &str) -> String;
    fn wrap_sequence(&self, inner: &str) -> String;
    fn wrap_union(&self, first: &str, second: &str) -> String;
    fn wrap_omittable(&self, inner: &str) -> String;
    fn wrap_generic(&self, generic: &str, arguments: &[String]) -> String;

    fn map_type(&self, idl_type: &TypeDescriptor) -> Result<String, MappingError> {
        match idl_type {
            TypeDescriptor::Nullable(inner) => Ok(self.wrap_nullable(&self.map_type(inner)?)),
            TypeDescriptor::Sequence(inner) => Ok(self.wrap_sequence(&self.map_type(inner)?)),
            TypeDescriptor::Generic { generic, arguments }
                if arguments.len() == 1 && ARRAY_GENERICS.contains(&generic.as_str()) =>
            {
                Ok(self.wrap_sequence(&self.map_type(&arguments[0])?))
            }
            TypeDescriptor::Generic { generic, arguments } => {
                let mapped = arguments
                    .iter()
                    .map(|argument| self.map_type(argument))
                    .collect::<Result<Vec<_>, _>>()?;
                let name = self.primitive(generic).unwrap_or(generic);
                Ok(self.wrap_generic(name, &mapped))
            }
            TypeDescriptor::Union(members) => match members.as_slice() {
                [first, second] => Ok(self.wrap_union(&self.map_type(first)?, &self.map_type(second)?)),
                _ => Err(MappingError::UnsupportedUnionArity { arity: members.len() }),
            },
            TypeDescriptor::Named(name) => Ok(self.primitive(name).unwrap_or(name).to_string()),
        }
    }

    /// Type of a value that may also be omitted entirely. Omission is
    /// independent of nullability: only a non-required value that is neither
    /// nullable nor a sequence gets the omittable wrapper.
    fn map_optional_type(&self, idl_type: &TypeDescriptor, required: bool) -> Result<String, MappingError> {
        let mapped = self.map_type(idl_type)?;
        if needs_omittable_wrapper(idl_type, required) {
            return Ok(self.wrap_omittable(&mapped));
        }
        Ok(mapped)
    }

    fn map_member_type(&self, member: &Member) -> Result<String, MappingError> {
        self.map_optional_type(&member.idl_type, member.required)
    }

    fn map_argument_type(&self, argument: &Argument) -> Result<String, MappingError> {
        self.map_optional_type(&argument.idl_type, !argument.optional)
    }
}

pub fn needs_omittable_wrapper(idl_type: &TypeDescriptor, required: bool) -> bool {
    !required && !idl_type.is_nullable() && !idl_type.is_sequence_like()
}

impl TypeMapping for TypeSyntax {
    fn primitive(&self, name: &str) -> Option<&str> {
        self.primitives
            .iter()
            .find(|(idl, _)| *idl == name)
            .map(|(_, mapped)| *mapped)
    }

    fn wrap_nullable(&self, inner: &str) -> String {
        self.nullable.wrap(inner)
    }

    fn wrap_sequence(&self, inner: &str) -> String {
        self.sequence.wrap(inner)
    }

    fn wrap_union(&self, first: &str, second: &str) -> String {
        self.union.wrap(&[first.to_string(), second.to_string()])
    }

    fn wrap_omittable(&self, inner: &str) -> String {
        self.omittable.wrap(inner)
    }

    fn wrap_generic(&self, generic: &str, arguments: &[String]) -> String {
        format!("{}{}", generic, self.generic.wrap(arguments))
    }
}

pub static CPP_TYPES: TypeSyntax = TypeSyntax {
    primitives: &[
        ("boolean", "bool"),
        ("byte", "int8_t"),
        ("octet", "uint8_t"),
        ("short", "int16_t"),
        ("unsigned short", "uint16_t"),
        ("long", "int32_t"),
        ("unsigned long", "uint32_t"),
        ("long long", "int64_t"),
        ("unsigned long long", "uint64_t"),
        ("float", "float"),
        ("unrestricted float", "float"),
        ("double", "double"),
        ("unrestricted double", "double"),
        ("DOMString", "std::string"),
        ("USVString", "std::string"),
        ("ByteString", "std::string"),
        ("DOMTimeStamp", "uint64_t"),
        ("DOMHighResTimeStamp", "double"),
        ("void", "void"),
        ("undefined", "void"),
    ],
    nullable: Wrapper { prefix: "std::optional<", suffix: ">" },
    sequence: Wrapper { prefix: "std::vector<", suffix: ">" },
    union: ListSyntax { prefix: "Either<", separator: ", ", suffix: ">" },
    omittable: Wrapper { prefix: "Optional<", suffix: ">" },
    generic: ListSyntax { prefix: "<", separator: ", ", suffix: ">" },
};

const SCRIPT_PRIMITIVES: &[(&str, &str)] = &[
    ("boolean", "boolean"),
    ("byte", "number"),
    ("octet", "number"),
    ("short", "number"),
    ("unsigned short", "number"),
    ("long", "number"),
    ("unsigned long", "number"),
    ("long long", "number"),
    ("unsigned long long", "number"),
    ("float", "number"),
    ("unrestricted float", "number"),
    ("double", "number"),
    ("unrestricted double", "number"),
    ("DOMString", "string"),
    ("USVString", "string"),
    ("ByteString", "string"),
    ("DOMTimeStamp", "number"),
    ("DOMHighResTimeStamp", "number"),
    ("DOMException", "Error"),
    ("object", "Object"),
    ("void", "void"),
    ("undefined", "void"),
];

pub static FLOW_TYPES: TypeSyntax = TypeSyntax {
    primitives: SCRIPT_PRIMITIVES,
    nullable: Wrapper { prefix: "?", suffix: "" },
    sequence: Wrapper { prefix: "Array<", suffix: ">" },
    union: ListSyntax { prefix: "(", separator: " | ", suffix: ")" },
    omittable: Wrapper { prefix: "void | ", suffix: "" },
    generic: ListSyntax { prefix: "<", separator: ", ", suffix: ">" },
};

/// JSDoc type expressions
pub static JAVASCRIPT_TYPES: TypeSyntax = TypeSyntax {
    primitives: SCRIPT_PRIMITIVES,
    nullable: Wrapper { prefix: "?", suffix: "" },
    sequence: Wrapper { prefix: "Array<", suffix: ">" },
    union: ListSyntax { prefix: "(", separator: "|", suffix: ")" },
    omittable: Wrapper { prefix: "", suffix: "=" },
    generic: ListSyntax { prefix: "<", separator: ", ", suffix: ">" },
};

/// Types written back as IDL
pub static IDL_TYPES: TypeSyntax = TypeSyntax {
    primitives: &[],
    nullable: Wrapper { prefix: "", suffix: "?" },
    sequence: Wrapper { prefix: "sequence<", suffix: ">" },
    union: ListSyntax { prefix: "(", separator: " or ", suffix: ")" },
    omittable: Wrapper { prefix: "optional ", suffix: "" },
    generic: ListSyntax { prefix: "<", separator: ", ", suffix: ">" },
};

use std::fmt;
use thiserror::Error;

use crate::definition::{
    Argument, DefaultKind, DefaultValue, Definition, DefinitionKind, ExtendedAttribute,
    ExtendedAttributeValue, Member, MemberKind, TypeDescriptor,
};

/// Parse failure with the 1-based position of the offending token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse every definition in an IDL document.
pub fn parse(text: &str) -> Result<Vec<Definition>, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_definitions()
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    String(String),
    Number(String),
    Punct(char),
    Ellipsis,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(value) | Token::Number(value) => write!(f, "`{}`", value),
            Token::String(value) => write!(f, "\"{}\"", value),
            Token::Punct(c) => write!(f, "`{}`", c),
            Token::Ellipsis => f.write_str("`...`"),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
    column: usize,
}

const PUNCTUATION: &[char] = &['{', '}', '(', ')', '[', ']', '<', '>', ',', ';', ':', '=', '?'];

fn tokenize(text: &str) -> Result<Vec<Spanned>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let (mut i, mut line, mut column) = (0, 1, 1);

    // Advances over `n` chars keeping line/column in sync
    let advance = |i: &mut usize, line: &mut usize, column: &mut usize, n: usize| {
        for _ in 0..n {
            if chars.get(*i) == Some(&'\n') {
                *line += 1;
                *column = 1;
            } else {
                *column += 1;
            }
            *i += 1;
        }
    };

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let (start_line, start_column) = (line, column);

        if c.is_whitespace() {
            advance(&mut i, &mut line, &mut column, 1);
        } else if c == '/' && next == Some('/') {
            while i < chars.len() && chars[i] != '\n' {
                advance(&mut i, &mut line, &mut column, 1);
            }
        } else if c == '/' && next == Some('*') {
            advance(&mut i, &mut line, &mut column, 2);
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                advance(&mut i, &mut line, &mut column, 1);
            }
            if i >= chars.len() {
                return Err(ParseError {
                    line: start_line,
                    column: start_column,
                    message: "unterminated comment".to_string(),
                });
            }
            advance(&mut i, &mut line, &mut column, 2);
        } else if c == '"' {
            let mut value = String::new();
            advance(&mut i, &mut line, &mut column, 1);
            while i < chars.len() && chars[i] != '"' {
                value.push(chars[i]);
                advance(&mut i, &mut line, &mut column, 1);
            }
            if i >= chars.len() {
                return Err(ParseError {
                    line: start_line,
                    column: start_column,
                    message: "unterminated string".to_string(),
                });
            }
            advance(&mut i, &mut line, &mut column, 1);
            tokens.push(Spanned { token: Token::String(value), line: start_line, column: start_column });
        } else if c == '.' && next == Some('.') && chars.get(i + 2) == Some(&'.') {
            advance(&mut i, &mut line, &mut column, 3);
            tokens.push(Spanned { token: Token::Ellipsis, line: start_line, column: start_column });
        } else if c.is_ascii_digit()
            || (c == '-' && next.map_or(false, |n| n.is_ascii_digit() || n == '.'))
            || (c == '.' && next.map_or(false, |n| n.is_ascii_digit()))
        {
            let mut value = String::from(c);
            advance(&mut i, &mut line, &mut column, 1);
            while let Some(&n) = chars.get(i) {
                let exponent_sign = (n == '+' || n == '-')
                    && value.ends_with(|c: char| c == 'e' || c == 'E')
                    && !value.starts_with("0x")
                    && !value.starts_with("0X");
                if !(n.is_ascii_alphanumeric() || n == '.' || exponent_sign) {
                    break;
                }
                value.push(n);
                advance(&mut i, &mut line, &mut column, 1);
            }
            tokens.push(Spanned { token: Token::Number(value), line: start_line, column: start_column });
        } else if c.is_alphabetic() || c == '_' || (c == '-' && next.map_or(false, char::is_alphabetic)) {
            let mut value = String::from(c);
            advance(&mut i, &mut line, &mut column, 1);
            while let Some(&n) = chars.get(i) {
                if !(n.is_alphanumeric() || n == '_' || n == '-') {
                    break;
                }
                value.push(n);
                advance(&mut i, &mut line, &mut column, 1);
            }
            tokens.push(Spanned { token: Token::Identifier(value), line: start_line, column: start_column });
        } else if PUNCTUATION.contains(&c) {
            advance(&mut i, &mut line, &mut column, 1);
            tokens.push(Spanned { token: Token::Punct(c), line: start_line, column: start_column });
        } else {
            return Err(ParseError {
                line,
                column,
                message: format!("unexpected character `{}`", c),
            });
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn parse_definitions(&mut self) -> Result<Vec<Definition>, ParseError> {
        let mut definitions = Vec::new();
        while self.pos < self.tokens.len() {
            let ext_attrs = self.parse_ext_attrs()?;
            let mut definition = self.parse_definition()?;
            definition.ext_attrs = ext_attrs;
            definitions.push(definition);
        }
        Ok(definitions)
    }

    fn parse_definition(&mut self) -> Result<Definition, ParseError> {
        if self.eat_keyword("partial") {
            let kind = if self.eat_keyword("interface") {
                self.eat_mixin();
                DefinitionKind::Interface
            } else if self.eat_keyword("dictionary") {
                DefinitionKind::Dictionary
            } else {
                return Err(self.error("expected `interface` or `dictionary` after `partial`"));
            };
            let mut definition = self.parse_body(kind)?;
            definition.partial = true;
            return Ok(definition);
        }

        if self.eat_keyword("callback") {
            if self.eat_keyword("interface") {
                return self.parse_body(DefinitionKind::CallbackInterface);
            }
            let name = self.identifier()?;
            self.expect_punct('=')?;
            let returned = self.parse_type()?;
            let arguments = self.parse_argument_list()?;
            self.expect_punct(';')?;
            let mut definition = Definition::new(DefinitionKind::Callback, name);
            definition.idl_type = Some(returned);
            definition.arguments = arguments;
            return Ok(definition);
        }

        if self.eat_keyword("interface") {
            self.eat_mixin();
            return self.parse_body(DefinitionKind::Interface);
        }

        if self.eat_keyword("dictionary") {
            return self.parse_body(DefinitionKind::Dictionary);
        }

        if self.eat_keyword("enum") {
            return self.parse_enum();
        }

        if self.eat_keyword("typedef") {
            // Attributes on the aliased type are not preserved
            self.parse_ext_attrs()?;
            let aliased = self.parse_type()?;
            let name = self.identifier()?;
            self.expect_punct(';')?;
            let mut definition = Definition::new(DefinitionKind::Typedef, name);
            definition.idl_type = Some(aliased);
            return Ok(definition);
        }

        if let Some(Token::Identifier(_)) = self.peek_at(0) {
            if self.keyword_at(1, "implements") || self.keyword_at(1, "includes") {
                let name = self.identifier()?;
                self.pos += 1;
                let implemented = self.identifier()?;
                self.expect_punct(';')?;
                let mut definition = Definition::new(DefinitionKind::Interface, name).as_partial();
                definition.implements = Some(implemented);
                return Ok(definition);
            }
        }

        Err(self.error("expected a definition"))
    }

    fn eat_mixin(&mut self) {
        if self.keyword_at(0, "mixin") && matches!(self.peek_at(1), Some(Token::Identifier(_))) {
            self.pos += 1;
        }
    }

    fn parse_body(&mut self, kind: DefinitionKind) -> Result<Definition, ParseError> {
        let name = self.identifier()?;
        let mut definition = Definition::new(kind, name);
        if self.eat_punct(':') {
            definition.inheritance = Some(self.identifier()?);
        }
        self.expect_punct('{')?;
        while !self.eat_punct('}') {
            let ext_attrs = self.parse_ext_attrs()?;
            let mut member = if kind == DefinitionKind::Dictionary {
                self.parse_dictionary_member()?
            } else {
                self.parse_interface_member(&definition.name)?
            };
            member.ext_attrs.splice(0..0, ext_attrs);
            definition.members.push(member);
        }
        self.expect_punct(';')?;
        Ok(definition)
    }

    fn parse_enum(&mut self) -> Result<Definition, ParseError> {
        let name = self.identifier()?;
        self.expect_punct('{')?;
        let mut values = Vec::new();
        while !self.eat_punct('}') {
            match self.next() {
                Some(Token::String(value)) => values.push(value),
                _ => return Err(self.error_before("expected a string enum value")),
            }
            if !self.eat_punct(',') {
                self.expect_punct('}')?;
                break;
            }
        }
        self.expect_punct(';')?;
        Ok(Definition::new(DefinitionKind::Enum, name).with_values(values))
    }

    fn parse_dictionary_member(&mut self) -> Result<Member, ParseError> {
        let required = self.eat_keyword("required");
        let ext_attrs = self.parse_ext_attrs()?;
        let idl_type = self.parse_type()?;
        let name = self.identifier()?;
        let mut member = Member::field(name, idl_type);
        member.required = required;
        member.ext_attrs = ext_attrs;
        if self.eat_punct('=') {
            member.default = Some(self.parse_default()?);
        }
        self.expect_punct(';')?;
        Ok(member)
    }

    fn parse_interface_member(&mut self, interface: &str) -> Result<Member, ParseError> {
        if self.eat_keyword("const") {
            let idl_type = self.parse_type()?;
            let name = self.identifier()?;
            self.expect_punct('=')?;
            let value = self.parse_default()?;
            self.expect_punct(';')?;
            return Ok(Member::new(MemberKind::Const, name, idl_type).with_default(value));
        }

        if self.keyword_at(0, "constructor") && self.punct_at(1, '(') {
            self.pos += 1;
            let arguments = self.parse_argument_list()?;
            self.expect_punct(';')?;
            return Ok(Member::new(MemberKind::Constructor, "constructor", TypeDescriptor::named(interface))
                .with_arguments(arguments));
        }

        if self.keyword_at(0, "stringifier") && self.punct_at(1, ';') {
            self.pos += 2;
            return Ok(Member::new(MemberKind::Stringifier, "", TypeDescriptor::named("DOMString")));
        }

        let mut specials = Vec::new();
        let (mut readonly, mut is_static) = (false, false);
        loop {
            if self.eat_keyword("static") {
                is_static = true;
            } else if self.eat_keyword("readonly") {
                readonly = true;
            } else if self.eat_keyword("inherit") {
                continue;
            } else if let Some(special) = ["getter", "setter", "deleter", "stringifier"]
                .into_iter()
                .find(|special| self.keyword_at(0, special))
            {
                self.pos += 1;
                specials.push(special.to_string());
            } else {
                break;
            }
        }

        if self.eat_keyword("attribute") {
            let idl_type = self.parse_type()?;
            let name = self.identifier()?;
            self.expect_punct(';')?;
            let mut member = Member::new(MemberKind::Attribute, name, idl_type);
            member.readonly = readonly;
            member.is_static = is_static;
            member.specials = specials;
            return Ok(member);
        }

        for (keyword, kind) in [
            ("iterable", MemberKind::Iterable),
            ("maplike", MemberKind::Maplike),
            ("setlike", MemberKind::Setlike),
        ] {
            if self.keyword_at(0, keyword) && self.punct_at(1, '<') {
                self.pos += 2;
                let first = self.parse_type()?;
                let second = if self.eat_punct(',') { Some(self.parse_type()?) } else { None };
                self.expect_punct('>')?;
                self.expect_punct(';')?;
                let mut member = match second {
                    Some(value) => {
                        let mut member = Member::new(kind, keyword, value);
                        member.key_type = Some(first);
                        member
                    }
                    None => Member::new(kind, keyword, first),
                };
                member.readonly = readonly;
                return Ok(member);
            }
        }

        let returned = self.parse_type()?;
        let name = match self.peek_at(0) {
            Some(Token::Identifier(_)) => self.identifier()?,
            _ => String::new(),
        };
        let arguments = self.parse_argument_list()?;
        self.expect_punct(';')?;
        let mut member = Member::new(MemberKind::Operation, name, returned).with_arguments(arguments);
        member.is_static = is_static;
        member.specials = specials;
        Ok(member)
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Argument>, ParseError> {
        self.expect_punct('(')?;
        let mut arguments = Vec::new();
        while !self.eat_punct(')') {
            let ext_attrs = self.parse_ext_attrs()?;
            let optional = self.eat_keyword("optional");
            let idl_type = self.parse_type()?;
            let variadic = self.eat(&Token::Ellipsis);
            let name = self.identifier()?;
            let mut argument = Argument::new(name, idl_type);
            argument.optional = optional;
            argument.variadic = variadic;
            argument.ext_attrs = ext_attrs;
            if self.eat_punct('=') {
                argument.default = Some(self.parse_default()?);
            }
            arguments.push(argument);
            if !self.eat_punct(',') {
                self.expect_punct(')')?;
                break;
            }
        }
        Ok(arguments)
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, ParseError> {
        let base = if self.eat_punct('(') {
            let mut members = vec![self.parse_type()?];
            while self.eat_keyword("or") {
                members.push(self.parse_type()?);
            }
            self.expect_punct(')')?;
            TypeDescriptor::Union(members)
        } else {
            // Attributes such as [EnforceRange] or [Clamp] do not affect mapping
            self.parse_ext_attrs()?;
            self.parse_single_type()?
        };

        if self.eat_punct('?') {
            return Ok(TypeDescriptor::nullable(base));
        }
        Ok(base)
    }

    fn parse_single_type(&mut self) -> Result<TypeDescriptor, ParseError> {
        let first = self.identifier()?;
        let name = match first.as_str() {
            "unsigned" => {
                if self.eat_keyword("short") {
                    "unsigned short".to_string()
                } else if self.eat_keyword("long") {
                    if self.eat_keyword("long") {
                        "unsigned long long".to_string()
                    } else {
                        "unsigned long".to_string()
                    }
                } else {
                    return Err(self.error("expected `short` or `long` after `unsigned`"));
                }
            }
            "long" if self.eat_keyword("long") => "long long".to_string(),
            "unrestricted" => {
                if self.eat_keyword("float") {
                    "unrestricted float".to_string()
                } else if self.eat_keyword("double") {
                    "unrestricted double".to_string()
                } else {
                    return Err(self.error("expected `float` or `double` after `unrestricted`"));
                }
            }
            _ => first,
        };

        if !self.eat_punct('<') {
            return Ok(TypeDescriptor::Named(name));
        }
        let mut arguments = vec![self.parse_type()?];
        while self.eat_punct(',') {
            arguments.push(self.parse_type()?);
        }
        self.expect_punct('>')?;

        if name == "sequence" {
            if arguments.len() != 1 {
                return Err(self.error_before("sequence takes exactly one type argument"));
            }
            return Ok(TypeDescriptor::Sequence(Box::new(arguments.remove(0))));
        }
        Ok(TypeDescriptor::Generic { generic: name, arguments })
    }

    fn parse_default(&mut self) -> Result<DefaultValue, ParseError> {
        match self.next() {
            Some(Token::String(value)) => Ok(DefaultValue::string(value)),
            Some(Token::Number(value)) => Ok(DefaultValue::number(value)),
            Some(Token::Identifier(value)) => match value.as_str() {
                "true" => Ok(DefaultValue::boolean(true)),
                "false" => Ok(DefaultValue::boolean(false)),
                "null" => Ok(DefaultValue::null()),
                "Infinity" | "-Infinity" | "NaN" => Ok(DefaultValue::number(value)),
                _ => Err(self.error_before("expected a default value")),
            },
            Some(Token::Punct('[')) => {
                self.expect_punct(']')?;
                Ok(DefaultValue { kind: DefaultKind::Sequence, value: "[]".to_string() })
            }
            Some(Token::Punct('{')) => {
                self.expect_punct('}')?;
                Ok(DefaultValue { kind: DefaultKind::Dictionary, value: "{}".to_string() })
            }
            _ => Err(self.error_before("expected a default value")),
        }
    }

    fn parse_ext_attrs(&mut self) -> Result<Vec<ExtendedAttribute>, ParseError> {
        let mut ext_attrs = Vec::new();
        if !self.eat_punct('[') {
            return Ok(ext_attrs);
        }
        loop {
            let mut ext_attr = ExtendedAttribute::new(self.identifier()?);
            if self.eat_punct('=') {
                ext_attr.rhs = Some(if self.eat_punct('(') {
                    let mut identifiers = vec![self.identifier()?];
                    while self.eat_punct(',') {
                        identifiers.push(self.identifier()?);
                    }
                    self.expect_punct(')')?;
                    ExtendedAttributeValue::IdentifierList(identifiers)
                } else {
                    match self.next() {
                        Some(Token::Identifier(value)) => ExtendedAttributeValue::Identifier(value),
                        Some(Token::String(value)) => ExtendedAttributeValue::String(value),
                        Some(Token::Number(value)) => ExtendedAttributeValue::Number(value),
                        _ => return Err(self.error_before("expected an extended attribute value")),
                    }
                });
            }
            if self.punct_at(0, '(') {
                ext_attr.arguments = Some(self.parse_argument_list()?);
            }
            ext_attrs.push(ext_attr);
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(']')?;
        Ok(ext_attrs)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|spanned| &spanned.token)
    }

    fn keyword_at(&self, offset: usize, keyword: &str) -> bool {
        matches!(self.peek_at(offset), Some(Token::Identifier(value)) if value == keyword)
    }

    fn punct_at(&self, offset: usize, c: char) -> bool {
        self.peek_at(offset) == Some(&Token::Punct(c))
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|spanned| spanned.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek_at(0) == Some(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn eat_punct(&mut self, c: char) -> bool {
        self.eat(&Token::Punct(c))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.keyword_at(0, keyword) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ParseError> {
        if self.eat_punct(c) {
            return Ok(());
        }
        Err(self.error(&format!("expected `{}`", c)))
    }

    fn identifier(&mut self) -> Result<String, ParseError> {
        match self.peek_at(0) {
            Some(Token::Identifier(value)) => {
                let value = value.clone();
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.error("expected an identifier")),
        }
    }

    /// Error positioned at the current token
    fn error(&self, message: &str) -> ParseError {
        self.error_at(self.pos, message)
    }

    /// Error positioned at the token that was just consumed
    fn error_before(&self, message: &str) -> ParseError {
        self.error_at(self.pos.saturating_sub(1), message)
    }

    fn error_at(&self, index: usize, message: &str) -> ParseError {
        match self.tokens.get(index) {
            Some(spanned) => ParseError {
                line: spanned.line,
                column: spanned.column,
                message: format!("{}, found {}", message, spanned.token),
            },
            None => {
                let (line, column) = self
                    .tokens
                    .last()
                    .map(|spanned| (spanned.line, spanned.column))
                    .unwrap_or((1, 1));
                ParseError {
                    line,
                    column,
                    message: format!("{}, found end of input", message),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dictionary_with_defaults() {
        let definitions = parse(
            r#"
            dictionary WidgetInit : BaseInit {
              required long count;
              DOMString label = "none";
              boolean visible = true;
              double? ratio = null;
            };
            "#,
        )
        .unwrap();

        assert_eq!(definitions.len(), 1);
        let widget = &definitions[0];
        assert_eq!(widget.kind, DefinitionKind::Dictionary);
        assert_eq!(widget.inheritance.as_deref(), Some("BaseInit"));
        assert_eq!(widget.members.len(), 4);
        assert!(widget.members[0].required);
        assert_eq!(widget.members[0].idl_type, TypeDescriptor::named("long"));
        assert!(!widget.members[1].required);
        assert_eq!(widget.members[1].default, Some(DefaultValue::string("none")));
        assert_eq!(widget.members[2].default, Some(DefaultValue::boolean(true)));
        assert_eq!(
            widget.members[3].idl_type,
            TypeDescriptor::nullable(TypeDescriptor::named("double"))
        );
        assert_eq!(widget.members[3].default, Some(DefaultValue::null()));
    }

    #[test]
    fn test_parse_interface_members() {
        let definitions = parse(
            r#"
            [Exposed=(Window,Worker), Constructor(optional WidgetInit init)]
            interface Widget : EventTarget {
              const unsigned short MAX = 0x10;
              readonly attribute unsigned long long size;
              attribute sequence<DOMString>? tags;
              static Promise<void> load(DOMString url, long... extra);
              getter DOMString (unsigned long index);
              iterable<DOMString, Widget>;
              stringifier;
            };
            "#,
        )
        .unwrap();

        let widget = &definitions[0];
        assert_eq!(widget.ext_attrs.len(), 2);
        assert_eq!(
            widget.ext_attrs[0].rhs,
            Some(ExtendedAttributeValue::IdentifierList(vec!["Window".to_string(), "Worker".to_string()]))
        );
        assert_eq!(widget.ext_attrs[1].arguments.as_ref().map(Vec::len), Some(1));

        let kinds: Vec<MemberKind> = widget.members.iter().map(|member| member.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MemberKind::Const,
                MemberKind::Attribute,
                MemberKind::Attribute,
                MemberKind::Operation,
                MemberKind::Operation,
                MemberKind::Iterable,
                MemberKind::Stringifier,
            ]
        );
        assert_eq!(widget.members[0].default, Some(DefaultValue::number("0x10")));
        assert!(widget.members[1].readonly);
        assert_eq!(widget.members[1].idl_type, TypeDescriptor::named("unsigned long long"));
        assert_eq!(
            widget.members[2].idl_type,
            TypeDescriptor::nullable(TypeDescriptor::sequence(TypeDescriptor::named("DOMString")))
        );

        let load = &widget.members[3];
        assert!(load.is_static);
        assert!(load.arguments[1].variadic);
        assert_eq!(
            load.idl_type,
            TypeDescriptor::Generic {
                generic: "Promise".to_string(),
                arguments: vec![TypeDescriptor::named("void")],
            }
        );

        let getter = &widget.members[4];
        assert_eq!(getter.name, "");
        assert_eq!(getter.specials, vec!["getter".to_string()]);
        assert_eq!(widget.members[5].key_type, Some(TypeDescriptor::named("DOMString")));
    }

    #[test]
    fn test_parse_enum_callback_typedef() {
        let definitions = parse(
            r#"
            enum Color { "red", "green", };
            callback WidgetCallback = void (Widget widget, optional boolean force = false);
            typedef (long or DOMString or Color) Key;
            callback interface Listener { void handle(Event event); };
            "#,
        )
        .unwrap();

        assert_eq!(definitions.len(), 4);
        assert_eq!(definitions[0].values, vec!["red".to_string(), "green".to_string()]);

        let callback = &definitions[1];
        assert_eq!(callback.kind, DefinitionKind::Callback);
        assert_eq!(callback.arguments.len(), 2);
        assert!(callback.arguments[1].optional);
        assert_eq!(callback.arguments[1].default, Some(DefaultValue::boolean(false)));

        match &definitions[2].idl_type {
            Some(TypeDescriptor::Union(members)) => assert_eq!(members.len(), 3),
            other => panic!("expected a union, got {:?}", other),
        }
        assert_eq!(definitions[3].kind, DefinitionKind::CallbackInterface);
    }

    #[test]
    fn test_parse_partial_and_implements() {
        let definitions = parse(
            r#"
            partial interface Widget { attribute DOMString label; };
            Widget implements Labelled;
            "#,
        )
        .unwrap();

        assert!(definitions[0].partial);
        assert_eq!(definitions[1].name, "Widget");
        assert_eq!(definitions[1].implements.as_deref(), Some("Labelled"));
        assert!(definitions[1].members.is_empty());
    }

    #[test]
    fn test_parse_skips_comments() {
        let definitions = parse(
            "// leading\n/* block\ncomment */ enum Mode { \"a\" }; // trailing",
        )
        .unwrap();
        assert_eq!(definitions[0].name, "Mode");
    }

    #[test]
    fn test_parse_error_position() {
        let error = parse("dictionary Widget {\n  long count\n};").unwrap_err();
        assert_eq!(error.line, 3);
        assert_eq!(error.column, 1);
        assert!(error.message.contains("expected `;`"));

        let error = parse("interface Widget {").unwrap_err();
        assert!(error.message.contains("end of input"));
    }

    #[test]
    fn test_parse_rejects_unknown_definition() {
        assert!(parse("namespace Console {};").is_err());
        assert!(parse("enum Color { red };").is_err());
    }
}

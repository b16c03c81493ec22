//! A single JavaScript module documenting every definition with JSDoc.

use tracing::debug;

use super::{GeneratedFile, RenderContext, Renderer};
use crate::definition::{Argument, Definition, DefinitionKind, Member, MemberKind};
use crate::error::MappingError;
use crate::literal::enum_constant_name;

pub struct JavaScriptRenderer;

impl Renderer for JavaScriptRenderer {
    fn render(&self, context: &RenderContext<'_>) -> Result<Vec<GeneratedFile>, MappingError> {
        debug!("Generating JavaScript");
        let mut output = String::from("'use strict';\n");
        let mut exports = Vec::new();

        for definition in context.definitions {
            output.push('\n');
            let block = match definition.kind {
                DefinitionKind::Enum => {
                    exports.push(definition.name.as_str());
                    enum_object(context, definition)
                }
                DefinitionKind::Typedef => {
                    let aliased = match &definition.idl_type {
                        Some(idl_type) => context.map_type(idl_type)?,
                        None => "*".to_string(),
                    };
                    doc_comment(&[format!("@typedef {{{}}} {}", aliased, definition.name)])
                }
                DefinitionKind::Callback => callback(context, definition)?,
                DefinitionKind::Dictionary => dictionary(context, definition)?,
                DefinitionKind::Interface | DefinitionKind::CallbackInterface => interface(context, definition)?,
            };
            output.push_str(&block);
        }

        if !exports.is_empty() {
            output.push('\n');
            for name in exports {
                output.push_str(&format!("exports.{} = {};\n", name, name));
            }
        }
        Ok(vec![GeneratedFile::new(&context.options.bundle, output)])
    }
}

fn doc_comment(lines: &[String]) -> String {
    let mut output = String::from("/**\n");
    for line in lines {
        output.push_str(&format!(" * {}\n", line));
    }
    output.push_str(" */\n");
    output
}

fn enum_object(context: &RenderContext<'_>, definition: &Definition) -> String {
    let mut output = doc_comment(&["@enum {string}".to_string()]);
    output.push_str(&format!("const {} = Object.freeze({{\n", definition.name));
    for value in &definition.values {
        output.push_str(&format!(
            "  {}: {},\n",
            enum_constant_name(value),
            context.literals().string_literal(value)
        ));
    }
    output.push_str("});\n");
    output
}

/// `function(A, B=, ...C): R`
fn function_type(context: &RenderContext<'_>, arguments: &[Argument], returned: &str) -> Result<String, MappingError> {
    let parameters = arguments
        .iter()
        .map(|argument| {
            context.resolve_argument_default(argument)?;
            let mapped = context.map_argument_type(argument)?;
            Ok(if argument.variadic { format!("...{}", mapped) } else { mapped })
        })
        .collect::<Result<Vec<_>, MappingError>>()?;
    Ok(format!("function({}): {}", parameters.join(", "), returned))
}

fn callback(context: &RenderContext<'_>, definition: &Definition) -> Result<String, MappingError> {
    let mut lines = vec![format!("@callback {}", definition.name)];
    for argument in &definition.arguments {
        context.resolve_argument_default(argument)?;
        lines.push(format!("@param {{{}}} {}", context.map_argument_type(argument)?, argument.name));
    }
    if let Some(returned) = &definition.idl_type {
        lines.push(format!("@returns {{{}}}", context.map_type(returned)?));
    }
    Ok(doc_comment(&lines))
}

fn property(context: &RenderContext<'_>, member: &Member) -> Result<String, MappingError> {
    let mut line = format!("@property {{{}}} {}", context.map_member_type(member)?, member.name);
    if let Some(default) = context.resolve_default(member)? {
        line.push_str(&format!(" - Defaults to {}", default));
    }
    Ok(line)
}

fn dictionary(context: &RenderContext<'_>, definition: &Definition) -> Result<String, MappingError> {
    let base = definition.inheritance.as_deref().unwrap_or("object");
    let mut lines = vec![format!("@typedef {{{}}} {}", base, definition.name)];
    for member in &definition.members {
        lines.push(property(context, member)?);
    }
    Ok(doc_comment(&lines))
}

fn interface(context: &RenderContext<'_>, definition: &Definition) -> Result<String, MappingError> {
    let mut lines = vec![format!("@interface {}", definition.name)];
    for parent in definition.inheritance.iter().chain(definition.implements.iter()) {
        lines.push(format!("@extends {}", parent));
    }

    for member in &definition.members {
        match member.kind {
            MemberKind::Attribute | MemberKind::Const => {
                let mut line = property(context, member)?;
                if member.readonly || member.kind == MemberKind::Const {
                    line.push_str(" - Read-only");
                }
                lines.push(line);
            }
            MemberKind::Operation if !member.name.is_empty() => {
                let returned = context.map_type(&member.idl_type)?;
                lines.push(format!(
                    "@property {{{}}} {}",
                    function_type(context, &member.arguments, &returned)?,
                    member.name
                ));
            }
            _ => {
                context.map_type(&member.idl_type)?;
                if let Some(key_type) = &member.key_type {
                    context.map_type(key_type)?;
                }
                function_type(context, &member.arguments, "void")?;
            }
        }
    }
    Ok(doc_comment(&lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, RenderOptions};
    use crate::parser::parse;

    fn render(idl: &str) -> String {
        let mut files = Backend::JavaScript.render(&parse(idl).unwrap(), &RenderOptions::new()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path.to_str(), Some("bindings.js"));
        files.remove(0).contents
    }

    #[test]
    fn test_enum_is_frozen_and_exported() {
        let output = render("enum Color { \"red\", \"dark-blue\" };");
        assert_eq!(
            output,
            "'use strict';\n\n/**\n * @enum {string}\n */\nconst Color = Object.freeze({\n  kRed: 'red',\n  kDarkBlue: 'dark-blue',\n});\n\nexports.Color = Color;\n"
        );
    }

    #[test]
    fn test_dictionary_typedef() {
        let output = render(
            r#"
            enum Color { "red" };
            dictionary Paint {
              required double opacity;
              Color color = "red";
              sequence<DOMString> tags;
            };
            "#,
        );
        assert!(output.contains(" * @typedef {object} Paint\n"));
        assert!(output.contains(" * @property {number} opacity\n"));
        assert!(output.contains(" * @property {Color=} color - Defaults to 'red'\n"));
        assert!(output.contains(" * @property {Array<string>} tags\n"));
    }

    #[test]
    fn test_interface_and_callback() {
        let output = render(
            r#"
            callback Done = void (DOMString message);
            interface Widget : Base {
              readonly attribute DOMString label;
              void draw(optional boolean force, long... layers);
            };
            "#,
        );
        assert!(output.contains(" * @callback Done\n * @param {string} message\n * @returns {void}\n"));
        assert!(output.contains(" * @interface Widget\n * @extends Base\n"));
        assert!(output.contains(" * @property {string} label - Read-only\n"));
        assert!(output.contains(" * @property {function(boolean=, ...number): void} draw\n"));
        assert!(!output.contains("exports."));
    }

    #[test]
    fn test_custom_bundle_name() {
        let options = RenderOptions {
            bundle: "webrtc.js".to_string(),
            ..RenderOptions::new()
        };
        let files = Backend::JavaScript.render(&parse("typedef long Id;").unwrap(), &options).unwrap();
        assert_eq!(files[0].path.to_str(), Some("webrtc.js"));
        assert!(files[0].contents.contains(" * @typedef {number} Id\n"));
    }
}

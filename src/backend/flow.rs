//! Flow type declarations, one module per definition.

use tracing::debug;

use super::{GeneratedFile, RenderContext, Renderer};
use crate::definition::{Argument, Definition, DefinitionKind, MemberKind};
use crate::error::MappingError;

pub struct FlowRenderer;

impl Renderer for FlowRenderer {
    fn render(&self, context: &RenderContext<'_>) -> Result<Vec<GeneratedFile>, MappingError> {
        context
            .definitions
            .iter()
            .map(|definition| {
                debug!("Generating Flow type declaration for {}", definition.name);
                let path = format!("{}.js", definition.file_stem());
                Ok(GeneratedFile::new(path, render_declaration(context, definition)?))
            })
            .collect()
    }
}

fn render_declaration(context: &RenderContext<'_>, definition: &Definition) -> Result<String, MappingError> {
    let mut output = String::from("// @flow\n\n");
    let imports = context.user_types(definition);
    for name in &imports {
        output.push_str(&format!("import type {{ {} }} from './{}';\n", name, name.to_lowercase()));
    }
    if !imports.is_empty() {
        output.push('\n');
    }

    match definition.kind {
        DefinitionKind::Enum => {
            let values: Vec<String> = definition
                .values
                .iter()
                .map(|value| context.literals().string_literal(value))
                .collect();
            output.push_str(&format!("export type {} = {};\n", definition.name, values.join(" | ")));
        }
        DefinitionKind::Typedef => {
            let aliased = match &definition.idl_type {
                Some(idl_type) => context.map_type(idl_type)?,
                None => "mixed".to_string(),
            };
            output.push_str(&format!("export type {} = {};\n", definition.name, aliased));
        }
        DefinitionKind::Callback => {
            let returned = match &definition.idl_type {
                Some(idl_type) => context.map_type(idl_type)?,
                None => "void".to_string(),
            };
            output.push_str(&format!(
                "export type {} = ({}) => {};\n",
                definition.name,
                parameters(context, &definition.arguments)?,
                returned
            ));
        }
        DefinitionKind::Dictionary => {
            output.push_str(&format!("export type {} = {{\n", definition.name));
            if let Some(parent) = &definition.inheritance {
                output.push_str(&format!("  ...{},\n", parent));
            }
            for member in &definition.members {
                context.resolve_default(member)?;
                output.push_str(&format!("  {}: {},\n", member.name, context.map_member_type(member)?));
            }
            output.push_str("};\n");
        }
        DefinitionKind::Interface | DefinitionKind::CallbackInterface => {
            let parents: Vec<&str> = definition
                .inheritance
                .iter()
                .chain(definition.implements.iter())
                .map(String::as_str)
                .collect();
            output.push_str(&format!("export interface {}", definition.name));
            if !parents.is_empty() {
                output.push_str(&format!(" extends {}", parents.join(", ")));
            }
            output.push_str(" {\n");
            for member in &definition.members {
                let line = match member.kind {
                    MemberKind::Attribute | MemberKind::Const => {
                        context.resolve_default(member)?;
                        let variance = if member.readonly || member.kind == MemberKind::Const { "+" } else { "" };
                        let prefix = if member.is_static { "static " } else { "" };
                        format!("  {}{}{}: {};", prefix, variance, member.name, context.map_member_type(member)?)
                    }
                    MemberKind::Operation if !member.name.is_empty() => {
                        let prefix = if member.is_static { "static " } else { "" };
                        format!(
                            "  {}{}({}): {};",
                            prefix,
                            member.name,
                            parameters(context, &member.arguments)?,
                            context.map_type(&member.idl_type)?
                        )
                    }
                    MemberKind::Constructor => {
                        format!("  constructor({}): void;", parameters(context, &member.arguments)?)
                    }
                    MemberKind::Stringifier => "  toString(): string;".to_string(),
                    _ => {
                        context.map_type(&member.idl_type)?;
                        if let Some(key_type) = &member.key_type {
                            context.map_type(key_type)?;
                        }
                        context.map_parameters(&member.arguments)?;
                        continue;
                    }
                };
                output.push_str(&line);
                output.push('\n');
            }
            output.push_str("}\n");
        }
    }
    Ok(output)
}

fn parameters(context: &RenderContext<'_>, arguments: &[Argument]) -> Result<String, MappingError> {
    let mapped = context.map_parameters(arguments)?;
    let parameters: Vec<String> = arguments
        .iter()
        .zip(mapped)
        .map(|(argument, (parameter_type, name))| {
            let spread = if argument.variadic { "..." } else { "" };
            format!("{}{}: {}", spread, name, parameter_type)
        })
        .collect();
    Ok(parameters.join(", "))
}

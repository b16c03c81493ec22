//! C++ header/source pairs.

use tracing::debug;

use super::{GeneratedFile, RenderContext, Renderer};
use crate::definition::{Definition, DefinitionKind, Member, MemberKind};
use crate::error::MappingError;
use crate::literal::enum_constant_name;
use crate::type_mapping::needs_omittable_wrapper;

const SYSTEM_HEADERS: &[&str] = &["cstdint", "functional", "optional", "string", "vector"];

pub struct CppRenderer;

impl Renderer for CppRenderer {
    fn render(&self, context: &RenderContext<'_>) -> Result<Vec<GeneratedFile>, MappingError> {
        let mut files = Vec::new();
        for definition in context.definitions {
            let header_name = header_name(definition);
            debug!("Generating {}", header_name);
            files.push(GeneratedFile::new(&header_name, render_header(context, definition)?));

            let source_name = format!("{}.{}", definition.file_stem(), context.options.suffix);
            debug!("Generating {}", source_name);
            files.push(GeneratedFile::new(source_name, render_source(context, definition)?));
        }
        Ok(files)
    }
}

pub fn header_name(definition: &Definition) -> String {
    format!("{}.h", definition.file_stem())
}

pub fn header_guard(definition: &Definition) -> String {
    format!("{}_H_", definition.name.to_uppercase())
}

/// `#include` lines for the user-defined types a definition refers to
fn user_headers(context: &RenderContext<'_>, definition: &Definition) -> Vec<String> {
    context
        .user_types(definition)
        .into_iter()
        .map(|name| format!("#include \"{}.h\"", name.to_lowercase()))
        .collect()
}

fn render_header(context: &RenderContext<'_>, definition: &Definition) -> Result<String, MappingError> {
    let guard = header_guard(definition);
    let mut output = String::new();
    output.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
    for header in SYSTEM_HEADERS {
        output.push_str(&format!("#include <{}>\n", header));
    }
    output.push('\n');
    output.push_str("#include \"convert.h\"\n");
    for include in user_headers(context, definition) {
        output.push_str(&include);
        output.push('\n');
    }
    output.push_str(&format!("\nnamespace {} {{\n\n", context.options.namespace));

    match definition.kind {
        DefinitionKind::Enum => {
            output.push_str(&format!("enum class {} {{\n", definition.name));
            for value in &definition.values {
                output.push_str(&format!("  {},\n", enum_constant_name(value)));
            }
            output.push_str("};\n");
        }
        DefinitionKind::Typedef => {
            let aliased = match &definition.idl_type {
                Some(idl_type) => context.map_type(idl_type)?,
                None => "void".to_string(),
            };
            output.push_str(&format!("using {} = {};\n", definition.name, aliased));
        }
        DefinitionKind::Callback => {
            let returned = match &definition.idl_type {
                Some(idl_type) => context.map_type(idl_type)?,
                None => "void".to_string(),
            };
            let parameters: Vec<String> = context
                .map_parameters(&definition.arguments)?
                .into_iter()
                .map(|(parameter_type, _)| parameter_type)
                .collect();
            output.push_str(&format!(
                "using {} = std::function<{}({})>;\n",
                definition.name,
                returned,
                parameters.join(", ")
            ));
        }
        DefinitionKind::Dictionary => output.push_str(&dictionary_declaration(context, definition)?),
        DefinitionKind::Interface | DefinitionKind::CallbackInterface => {
            output.push_str(&interface_declaration(context, definition)?)
        }
    }

    output.push_str(&format!("\n}}  // namespace {}\n\n#endif  // {}\n", context.options.namespace, guard));
    Ok(output)
}

fn base_classes(definition: &Definition) -> String {
    let bases: Vec<String> = definition
        .inheritance
        .iter()
        .chain(definition.implements.iter())
        .map(|base| format!("public {}", base))
        .collect();
    if bases.is_empty() {
        String::new()
    } else {
        format!(" : {}", bases.join(", "))
    }
}

/// Declared type of a dictionary member once its default, if any, is applied
fn stored_type(context: &RenderContext<'_>, member: &Member) -> Result<String, MappingError> {
    if member.default.is_some() {
        return context.map_type(&member.idl_type);
    }
    context.map_member_type(member)
}

fn constructor_parameters(context: &RenderContext<'_>, definition: &Definition) -> Result<String, MappingError> {
    let parameters = definition
        .members
        .iter()
        .map(|member| Ok(format!("{} {}", context.map_member_type(member)?, member.name)))
        .collect::<Result<Vec<_>, MappingError>>()?;
    Ok(parameters.join(", "))
}

fn dictionary_declaration(context: &RenderContext<'_>, definition: &Definition) -> Result<String, MappingError> {
    let mut output = String::new();
    output.push_str(&format!("class {}{} {{\n public:\n", definition.name, base_classes(definition)));
    output.push_str(&format!(
        "  {}({});\n",
        definition.name,
        constructor_parameters(context, definition)?
    ));

    if !definition.members.is_empty() {
        output.push('\n');
    }
    for member in &definition.members {
        output.push_str(&format!("  {} {}() const;\n", stored_type(context, member)?, member.name));
    }

    if !definition.members.is_empty() {
        output.push_str("\n private:\n");
    }
    for member in &definition.members {
        output.push_str(&format!("  {} _{};\n", stored_type(context, member)?, member.name));
    }
    output.push_str("};\n");
    Ok(output)
}

fn interface_declaration(context: &RenderContext<'_>, definition: &Definition) -> Result<String, MappingError> {
    let mut output = String::new();
    output.push_str(&format!("class {}{} {{\n public:\n", definition.name, base_classes(definition)));
    output.push_str(&format!("  virtual ~{}() = default;\n", definition.name));

    for member in &definition.members {
        let line = match member.kind {
            MemberKind::Const => {
                let value = context.resolve_default(member)?.unwrap_or_default();
                format!("  static constexpr {} {} = {};", context.map_type(&member.idl_type)?, member.name, value)
            }
            MemberKind::Attribute => {
                let mapped = context.map_member_type(member)?;
                let qualifier = if member.is_static { "static" } else { "virtual" };
                let pure = if member.is_static { "" } else { " = 0" };
                let mut line = format!("  {} {} {}() const{};", qualifier, mapped, member.name, pure);
                if !member.readonly {
                    line.push_str(&format!(
                        "\n  {} void set_{}({} {}){};",
                        qualifier, member.name, mapped, member.name, pure
                    ));
                }
                line
            }
            MemberKind::Operation if !member.name.is_empty() => {
                let returned = context.map_type(&member.idl_type)?;
                let parameters: Vec<String> = context
                    .map_parameters(&member.arguments)?
                    .into_iter()
                    .map(|(parameter_type, name)| format!("{} {}", parameter_type, name))
                    .collect();
                if member.is_static {
                    format!("  static {} {}({});", returned, member.name, parameters.join(", "))
                } else {
                    format!("  virtual {} {}({}) = 0;", returned, member.name, parameters.join(", "))
                }
            }
            MemberKind::Constructor => {
                let parameters: Vec<String> = context
                    .map_parameters(&member.arguments)?
                    .into_iter()
                    .map(|(parameter_type, name)| format!("{} {}", parameter_type, name))
                    .collect();
                format!("  static {} Create({});", definition.name, parameters.join(", "))
            }
            // Anonymous specials, stringifiers and iteration declarations have
            // no native counterpart; their types are still checked.
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
    output.push_str("};\n");
    Ok(output)
}

/// Constructor argument as stored: omittable members with a default fall back
/// to it.
fn initializer(context: &RenderContext<'_>, member: &Member) -> Result<String, MappingError> {
    match context.resolve_default(member)? {
        Some(default) if needs_omittable_wrapper(&member.idl_type, member.required) => {
            Ok(format!("{}.value_or({})", member.name, default))
        }
        _ => Ok(member.name.clone()),
    }
}

fn render_source(context: &RenderContext<'_>, definition: &Definition) -> Result<String, MappingError> {
    let mut output = format!("#include \"{}\"\n\nnamespace {} {{\n", header_name(definition), context.options.namespace);

    if definition.kind == DefinitionKind::Dictionary {
        output.push_str(&format!(
            "\n{}::{}({})",
            definition.name,
            definition.name,
            constructor_parameters(context, definition)?
        ));
        let initializers = definition
            .members
            .iter()
            .map(|member| Ok(format!("_{}({})", member.name, initializer(context, member)?)))
            .collect::<Result<Vec<_>, MappingError>>()?;
        if initializers.is_empty() {
            output.push_str(" {}\n");
        } else {
            output.push_str(&format!("\n  : {} {{}}\n", initializers.join(",\n    ")));
        }

        for member in &definition.members {
            output.push_str(&format!(
                "\n{} {}::{}() const {{\n  return _{};\n}}\n",
                stored_type(context, member)?,
                definition.name,
                member.name,
                member.name
            ));
        }
    }

    output.push_str(&format!("\n}}  // namespace {}\n", context.options.namespace));
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, RenderOptions};
    use crate::parser::parse;

    fn render(idl: &str) -> Vec<GeneratedFile> {
        Backend::Cpp.render(&parse(idl).unwrap(), &RenderOptions::new()).unwrap()
    }

    fn contents<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
        files
            .iter()
            .find(|file| file.path.to_str() == Some(path))
            .map(|file| file.contents.as_str())
            .unwrap_or_else(|| panic!("{} was not generated", path))
    }

    #[test]
    fn test_header_and_source_per_definition() {
        let files = render("enum Color { \"red\", \"dark-blue\" }; interface Widget {};");
        let paths: Vec<_> = files.iter().map(|file| file.path.to_string_lossy().to_string()).collect();
        assert_eq!(paths, vec!["color.h", "color.cc", "widget.h", "widget.cc"]);

        let header = contents(&files, "color.h");
        assert!(header.starts_with("#ifndef COLOR_H_\n#define COLOR_H_\n"));
        assert!(header.contains("namespace idl {"));
        assert!(header.contains("enum class Color {\n  kRed,\n  kDarkBlue,\n};"));
        assert!(header.ends_with("#endif  // COLOR_H_\n"));
    }

    #[test]
    fn test_dictionary_class() {
        let files = render(
            r#"
            enum Color { "red", "green" };
            dictionary Paint {
              required double opacity;
              Color color = "green";
              DOMString? label;
              sequence<long> stops;
            };
            "#,
        );
        let header = contents(&files, "paint.h");
        assert!(header.contains("#include \"color.h\""));
        assert!(header.contains(
            "  Paint(double opacity, Optional<Color> color, std::optional<std::string> label, std::vector<int32_t> stops);"
        ));
        assert!(header.contains("  Color color() const;"));
        assert!(header.contains("  std::optional<std::string> _label;"));

        let source = contents(&files, "paint.cc");
        assert!(source.starts_with("#include \"paint.h\""));
        assert!(source.contains("_color(color.value_or(idl::Color::kGreen))"));
        assert!(source.contains("_opacity(opacity)"));
        assert!(source.contains("Color Paint::color() const {\n  return _color;\n}"));
    }

    #[test]
    fn test_interface_class() {
        let files = render(
            r#"
            interface Widget : Base {
              const long MAX_COUNT = 8;
              readonly attribute DOMString label;
              attribute boolean visible;
              void draw(optional boolean force, long... layers);
              static Widget create();
              iterable<DOMString>;
            };
            interface Base {};
            "#,
        );
        let header = contents(&files, "widget.h");
        assert!(header.contains("#include \"base.h\""));
        assert!(header.contains("class Widget : public Base {"));
        assert!(header.contains("  static constexpr int32_t MAX_COUNT = 8;"));
        assert!(header.contains("  virtual std::string label() const = 0;\n  virtual bool visible() const = 0;"));
        assert!(header.contains("  virtual void set_visible(bool visible) = 0;"));
        assert!(header.contains("  virtual void draw(Optional<bool> force, std::vector<int32_t> layers) = 0;"));
        assert!(header.contains("  static Widget create();"));
    }

    #[test]
    fn test_operation_with_empty_dictionary_default() {
        let files = render(
            r#"
            dictionary OfferOptions { boolean ice; };
            interface Peer { Promise<void> createOffer(optional OfferOptions options = {}); };
            "#,
        );
        let header = contents(&files, "peer.h");
        assert!(header.contains("#include \"offeroptions.h\""));
        assert!(header.contains("  virtual Promise<void> createOffer(Optional<OfferOptions> options) = 0;"));
    }

    #[test]
    fn test_implements_in_later_fragment_is_not_merged() {
        let definitions = crate::merge::merge_definitions(
            parse("interface Widget : Base {}; interface Mixin {}; Widget implements Mixin;")
                .unwrap()
                .into_iter()
                .collect(),
            true,
        )
        .unwrap();
        let files = Backend::Cpp.render(&definitions, &RenderOptions::new()).unwrap();
        let header = contents(&files, "widget.h");
        assert!(header.contains("class Widget : public Base {"));
        assert!(!header.contains("mixin.h"));
    }

    #[test]
    fn test_callback_and_typedef() {
        let files = render("callback Done = void (DOMString message, optional long code); typedef sequence<octet> Bytes;");
        assert!(contents(&files, "done.h").contains("using Done = std::function<void(std::string, Optional<int32_t>)>;"));
        assert!(contents(&files, "bytes.h").contains("using Bytes = std::vector<uint8_t>;"));
    }

    #[test]
    fn test_custom_namespace_and_suffix() {
        let options = RenderOptions {
            namespace: "webrtc".to_string(),
            suffix: "cpp".to_string(),
            bundle: "bindings.js".to_string(),
        };
        let files = Backend::Cpp
            .render(&parse("enum Color { \"red\" }; dictionary Paint { Color color = \"red\"; };").unwrap(), &options)
            .unwrap();
        assert!(contents(&files, "paint.cpp").contains("color.value_or(webrtc::Color::kRed)"));
        assert!(contents(&files, "paint.h").contains("namespace webrtc {"));
    }
}

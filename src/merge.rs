use tracing::debug;

use crate::definition::Definition;
use crate::error::GeneratorError;
use crate::registry::DefinitionsByName;

/// Fold every group of fragments into one canonical definition per name.
///
/// With merging disabled, any name carrying more than one fragment fails the
/// whole call before a single definition is produced.
pub fn merge_definitions(
    definitions_by_name: DefinitionsByName,
    merge_enabled: bool,
) -> Result<Vec<Definition>, GeneratorError> {
    if !merge_enabled {
        if let Some((name, fragments)) = definitions_by_name.duplicates().next() {
            return Err(GeneratorError::UnmergeableDuplicate {
                name: name.to_string(),
                fragments,
            });
        }
    }

    Ok(definitions_by_name
        .into_groups()
        .into_iter()
        .filter_map(|(_, fragments)| merge_fragments(fragments))
        .collect())
}

/// Left fold: members and enum values concatenate in fragment order, scalar
/// attributes (kind, inheritance, implements, extended attributes) come from
/// the first fragment and are never overwritten. Later fragments that
/// disagree on a scalar are not reported.
pub fn merge_fragments(fragments: Vec<Definition>) -> Option<Definition> {
    let mut fragments = fragments.into_iter();
    let first = fragments.next()?;
    let rest: Vec<Definition> = fragments.collect();
    if rest.is_empty() {
        return Some(first);
    }

    debug!("Merging {} fragments of {}", rest.len() + 1, first.name);
    Some(rest.into_iter().fold(first, |mut canonical, fragment| {
        // Complete as soon as any fragment is not a partial
        canonical.partial &= fragment.partial;
        canonical.members.extend(fragment.members);
        canonical.values.extend(fragment.values);
        canonical
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{DefinitionKind, ExtendedAttribute, Member, TypeDescriptor};
    use crate::parser::parse;

    fn fragments(idl: &str) -> DefinitionsByName {
        parse(idl).unwrap().into_iter().collect()
    }

    #[test]
    fn test_single_fragment_is_identity() {
        let by_name = fragments("[Exposed=Window] partial interface Widget { attribute long count; };");
        let original = by_name.get("Widget").unwrap()[0].clone();

        let merged = merge_definitions(by_name, true).unwrap();
        assert_eq!(merged, vec![original]);
    }

    #[test]
    fn test_partial_members_concatenate_in_order() {
        let by_name = fragments(
            r#"
            dictionary Widget { long count; };
            partial dictionary Widget { DOMString label; };
            "#,
        );

        let merged = merge_definitions(by_name, true).unwrap();
        assert_eq!(merged.len(), 1);
        let widget = &merged[0];
        let names: Vec<&str> = widget.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["count", "label"]);
        assert_eq!(widget.members[0].idl_type, TypeDescriptor::named("long"));
        assert_eq!(widget.members[1].idl_type, TypeDescriptor::named("DOMString"));
        assert!(!widget.partial);
    }

    #[test]
    fn test_enum_values_concatenate() {
        let by_name = fragments(r#"enum Color { "red" }; enum Color { "green", "blue" };"#);
        let merged = merge_definitions(by_name, true).unwrap();
        assert_eq!(merged[0].values, vec!["red", "green", "blue"]);
    }

    #[test]
    fn test_scalars_come_from_first_fragment() {
        let mut first = Definition::new(DefinitionKind::Interface, "Widget").with_inheritance("Base");
        first.ext_attrs = vec![ExtendedAttribute::new("Exposed")];
        let mut second = Definition::new(DefinitionKind::Dictionary, "Widget")
            .with_inheritance("Other")
            .with_members(vec![Member::field("x", TypeDescriptor::named("long"))]);
        second.implements = Some("Mixin".to_string());
        second.ext_attrs = vec![ExtendedAttribute::new("SecureContext")];

        let merged = merge_fragments(vec![first, second]).unwrap();
        assert_eq!(merged.kind, DefinitionKind::Interface);
        assert_eq!(merged.inheritance.as_deref(), Some("Base"));
        assert_eq!(merged.implements, None);
        assert_eq!(merged.ext_attrs, vec![ExtendedAttribute::new("Exposed")]);
        assert_eq!(merged.members.len(), 1);
    }

    #[test]
    fn test_duplicates_fail_when_merge_disabled() {
        let by_name = fragments(
            r#"
            interface Gadget {};
            dictionary Widget { long count; };
            partial dictionary Widget { DOMString label; };
            "#,
        );

        match merge_definitions(by_name, false) {
            Err(GeneratorError::UnmergeableDuplicate { name, fragments }) => {
                assert_eq!(name, "Widget");
                assert_eq!(fragments, 2);
            }
            other => panic!("expected UnmergeableDuplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_unique_names_pass_when_merge_disabled() {
        let by_name = fragments("interface Gadget {}; interface Widget {};");
        assert_eq!(merge_definitions(by_name, false).unwrap().len(), 2);
    }
}

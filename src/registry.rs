use std::collections::{HashMap, HashSet};

use crate::definition::{Definition, DefinitionKind};

/// Fragments grouped by definition name, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct DefinitionsByName {
    order: Vec<String>,
    fragments: HashMap<String, Vec<Definition>>,
}

impl DefinitionsByName {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment to the group for its name
    pub fn insert(&mut self, definition: Definition) {
        if !self.fragments.contains_key(&definition.name) {
            self.order.push(definition.name.clone());
        }
        self.fragments
            .entry(definition.name.clone())
            .or_default()
            .push(definition);
    }

    /// Append every group of `other`, keeping fragment order within each name
    pub fn extend(&mut self, other: DefinitionsByName) {
        for (_, fragments) in other.into_groups() {
            for fragment in fragments {
                self.insert(fragment);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Definition]> {
        self.fragments.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Groups with more than one fragment
    pub fn duplicates(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.order.iter().filter_map(|name| {
            let count = self.fragments.get(name).map_or(0, Vec::len);
            (count > 1).then_some((name.as_str(), count))
        })
    }

    pub fn fragment_counts(&self) -> Vec<(String, usize)> {
        self.order
            .iter()
            .map(|name| (name.clone(), self.fragments.get(name).map_or(0, Vec::len)))
            .collect()
    }

    pub fn into_groups(mut self) -> Vec<(String, Vec<Definition>)> {
        self.order
            .into_iter()
            .map(|name| {
                let fragments = self.fragments.remove(&name).unwrap_or_default();
                (name, fragments)
            })
            .collect()
    }
}

impl FromIterator<Definition> for DefinitionsByName {
    fn from_iter<I: IntoIterator<Item = Definition>>(iter: I) -> Self {
        let mut by_name = DefinitionsByName::new();
        for definition in iter {
            by_name.insert(definition);
        }
        by_name
    }
}

/// Immutable lookup tables over the canonical definitions, rebuilt at the
/// start of each backend pass.
#[derive(Debug, Clone, Default)]
pub struct DefinitionIndex {
    enums: HashMap<String, Vec<String>>,
    names: HashSet<String>,
}

impl DefinitionIndex {
    pub fn new(definitions: &[Definition]) -> Self {
        let mut index = DefinitionIndex::default();
        for definition in definitions {
            index.names.insert(definition.name.clone());
            if definition.kind == DefinitionKind::Enum {
                index.enums.insert(definition.name.clone(), definition.values.clone());
            }
        }
        index
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enums.get(name).map(Vec::as_slice)
    }

    /// True for any user-defined type in the canonical set
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Member, TypeDescriptor};

    fn dictionary(name: &str, member: &str) -> Definition {
        Definition::new(DefinitionKind::Dictionary, name)
            .with_members(vec![Member::field(member, TypeDescriptor::named("long"))])
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let by_name: DefinitionsByName = vec![
            dictionary("Zeta", "a"),
            dictionary("Alpha", "b"),
            dictionary("Zeta", "c"),
        ]
        .into_iter()
        .collect();

        assert_eq!(by_name.names(), &["Zeta".to_string(), "Alpha".to_string()]);
        assert_eq!(by_name.get("Zeta").map(|fragments| fragments.len()), Some(2));
        assert_eq!(by_name.duplicates().collect::<Vec<_>>(), vec![("Zeta", 2)]);
    }

    #[test]
    fn test_extend_concatenates_groups() {
        let mut first: DefinitionsByName = vec![dictionary("Widget", "a")].into_iter().collect();
        let second: DefinitionsByName =
            vec![dictionary("Gadget", "b"), dictionary("Widget", "c")].into_iter().collect();
        first.extend(second);

        let groups = first.into_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Widget");
        let members: Vec<&str> = groups[0].1.iter().map(|d| d.members[0].name.as_str()).collect();
        assert_eq!(members, vec!["a", "c"]);
    }

    #[test]
    fn test_definition_index() {
        let definitions = vec![
            Definition::new(DefinitionKind::Enum, "Color")
                .with_values(vec!["red".to_string(), "green".to_string()]),
            dictionary("WidgetInit", "count"),
            Definition::new(DefinitionKind::Interface, "Widget"),
        ];
        let index = DefinitionIndex::new(&definitions);

        assert!(index.is_enum("Color"));
        assert!(!index.is_enum("Widget"));
        assert_eq!(index.enum_values("Color").map(|values| values.len()), Some(2));
        assert!(index.contains("WidgetInit"));
        assert!(index.contains("Widget"));
        assert!(!index.contains("DOMString"));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Browsable category tree over a registry's node types.
//!
//! The tree has two levels: categories at the root and node types below
//! them. It is stored flat. Every entry lives in a [`Slot`] and each
//! category's children occupy the slots right after it, so parent, child
//! and row queries are table reads or one addition. Nothing is rebuilt or
//! re-sorted after construction.
//!
//! Slots handed to the query methods must come from the same catalog.
//! Passing any other slot is a caller bug and panics.

use crate::node::{NodeType, NodeTypeId};
use crate::registry::TypeRegistry;
use indexmap::IndexMap;
use regex::Regex;

/// Position of an entry in a [`Catalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(pub usize);

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogItem {
    /// A category heading
    Category {
        /// Category name
        name: String,
    },
    /// A node type that can be dragged into a scene
    NodeType {
        /// Node type ID
        id: NodeTypeId,
        /// Display name
        name: String,
    },
}

impl CatalogItem {
    /// Display name
    pub fn name(&self) -> &str {
        match self {
            Self::Category { name } | Self::NodeType { name, .. } => name,
        }
    }
}

/// What a view may do with an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFlags {
    /// Entry is shown as active
    pub enabled: bool,
    /// Entry can be selected
    pub selectable: bool,
    /// Entry can be dragged into a scene
    pub draggable: bool,
}

/// Data carried by a catalog drag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    /// Plain-text form: the node type's name
    pub text: String,
    /// The node type id, see [`NodeTypeId::to_payload`]
    pub node_type: [u8; NodeTypeId::PAYLOAD_LEN],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexData {
    row: usize,
    row_count: usize,
    parent: Option<Slot>,
}

/// Two-level category tree
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index_map: Vec<IndexData>,
    root_slots: Vec<Slot>,
}

impl Catalog {
    /// Build the tree from a registry.
    ///
    /// Node types are ordered by category, then name, comparing bytes
    /// (case-sensitive, not locale-aware). Ties keep registry order.
    pub fn new(registry: &TypeRegistry) -> Self {
        let mut sorted: Vec<&NodeType> = registry.node_types.iter().collect();
        sorted.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));

        let mut groups: IndexMap<&str, Vec<&NodeType>> = IndexMap::new();
        for node_type in sorted {
            groups.entry(node_type.category.as_str()).or_default().push(node_type);
        }

        let mut catalog = Self::default();
        for (category_row, (category, members)) in groups.into_iter().enumerate() {
            let category_slot = Slot(catalog.items.len());
            catalog.root_slots.push(category_slot);
            catalog.items.push(CatalogItem::Category {
                name: category.to_owned(),
            });
            catalog.index_map.push(IndexData {
                row: category_row,
                row_count: members.len(),
                parent: None,
            });

            for (row, node_type) in members.into_iter().enumerate() {
                catalog.items.push(CatalogItem::NodeType {
                    id: node_type.id,
                    name: node_type.name.clone(),
                });
                catalog.index_map.push(IndexData {
                    row,
                    row_count: 0,
                    parent: Some(category_slot),
                });
            }
        }

        tracing::debug!(
            categories = catalog.root_slots.len(),
            entries = catalog.items.len(),
            "Built catalog"
        );
        catalog
    }

    /// Number of entries, categories included
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The entry at `row` below `parent`, or at the root when `parent` is `None`.
    ///
    /// Returns `None` when `row` is past the end.
    pub fn child(&self, parent: Option<Slot>, row: usize) -> Option<Slot> {
        match parent {
            None => self.root_slots.get(row).copied(),
            Some(p) if row < self.index_map[p.0].row_count => {
                let slot = Slot(p.0 + 1 + row);
                debug_assert_eq!(self.index_map[slot.0].row, row);
                Some(slot)
            }
            Some(_) => None,
        }
    }

    /// The category above an entry, `None` for categories
    pub fn parent(&self, slot: Slot) -> Option<Slot> {
        self.index_map[slot.0].parent
    }

    /// Row of an entry within its parent
    pub fn row(&self, slot: Slot) -> usize {
        self.index_map[slot.0].row
    }

    /// Number of entries below `parent`, or of categories when `None`
    pub fn row_count(&self, parent: Option<Slot>) -> usize {
        match parent {
            None => self.root_slots.len(),
            Some(p) => self.index_map[p.0].row_count,
        }
    }

    /// The entry in a slot
    ///
    /// # Panics
    ///
    /// Panics if `slot` did not come from this catalog. The same holds for
    /// every other method taking a slot.
    pub fn item(&self, slot: Slot) -> &CatalogItem {
        &self.items[slot.0]
    }

    /// Display name of an entry
    pub fn name(&self, slot: Slot) -> &str {
        self.item(slot).name()
    }

    /// Interaction flags of an entry
    pub fn flags(&self, slot: Slot) -> ItemFlags {
        match self.item(slot) {
            CatalogItem::Category { .. } => ItemFlags {
                enabled: true,
                selectable: false,
                draggable: false,
            },
            CatalogItem::NodeType { .. } => ItemFlags {
                enabled: true,
                selectable: true,
                draggable: true,
            },
        }
    }

    /// Drag data for a selection.
    ///
    /// Only a selection of exactly one node type produces a payload.
    pub fn drag_payload(&self, selection: &[Slot]) -> Option<DragPayload> {
        let [slot] = selection else {
            return None;
        };
        match self.item(*slot) {
            CatalogItem::NodeType { id, name } => Some(DragPayload {
                text: name.clone(),
                node_type: id.to_payload(),
            }),
            CatalogItem::Category { .. } => None,
        }
    }

    /// Filter node types by a wildcard pattern.
    ///
    /// `*` matches any run of characters, `?` any single character and
    /// `[...]` one character from a set (`[a-c]`, `[!x]`). An unclosed `[`
    /// is literal. The match is case-sensitive and may occur anywhere in
    /// the name. A category stays visible while any of its node types does.
    ///
    /// Fails only for a set the regex engine rejects, such as `[z-a]`.
    pub fn filter(&self, pattern: &str) -> Result<CatalogFilter, regex::Error> {
        let matcher = wildcard_regex(pattern)?;
        let mut visible = vec![false; self.items.len()];

        for &category in &self.root_slots {
            let mut any = false;
            for row in 0..self.row_count(Some(category)) {
                let slot = Slot(category.0 + 1 + row);
                let shown = matcher.is_match(self.name(slot));
                visible[slot.0] = shown;
                any |= shown;
            }
            visible[category.0] = any;
        }

        Ok(CatalogFilter { visible })
    }
}

fn wildcard_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut source = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            '[' => {
                if let Some(len) = push_char_set(&mut source, &chars[i + 1..]) {
                    i += len + 2;
                    continue;
                }
                push_literal(&mut source, '[');
            }
            c => push_literal(&mut source, c),
        }
        i += 1;
    }
    Regex::new(&source)
}

/// Translate the body of a `[...]` set that follows an opening bracket.
///
/// Returns the body length, or `None` when the set is never closed. A
/// leading `!` or `^` negates the set, a `]` right after the opening (or
/// the negation) is a member, and `-` between two members is a range.
fn push_char_set(source: &mut String, rest: &[char]) -> Option<usize> {
    let negated = matches!(rest.first(), Some('!' | '^'));
    let start = usize::from(negated);
    let close = rest
        .iter()
        .skip(start + 1)
        .position(|&c| c == ']')
        .map(|p| p + start + 1)?;
    let members = &rest[start..close];

    source.push('[');
    if negated {
        source.push('^');
    }
    for (k, &c) in members.iter().enumerate() {
        if c == '-' && k > 0 && k + 1 < members.len() {
            source.push('-');
        } else {
            push_literal(source, c);
        }
    }
    source.push(']');
    Some(close)
}

fn push_literal(source: &mut String, c: char) {
    source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
}

/// Visibility of catalog entries under a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    visible: Vec<bool>,
}

impl CatalogFilter {
    /// Check if an entry passes the filter
    pub fn is_visible(&self, slot: Slot) -> bool {
        self.visible[slot.0]
    }

    /// Visible entries below `parent`, or visible categories when `None`
    pub fn visible_children(&self, catalog: &Catalog, parent: Option<Slot>) -> Vec<Slot> {
        (0..catalog.row_count(parent))
            .filter_map(|row| catalog.child(parent, row))
            .filter(|slot| self.is_visible(*slot))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with_node_type(NodeType::new(1, "x", "B"))
            .with_node_type(NodeType::new(2, "z", "A"))
            .with_node_type(NodeType::new(3, "y", "A"))
    }

    fn names(catalog: &Catalog, parent: Option<Slot>) -> Vec<String> {
        (0..catalog.row_count(parent))
            .map(|row| catalog.name(catalog.child(parent, row).unwrap()).to_owned())
            .collect()
    }

    #[test]
    fn test_grouped_and_sorted() {
        let catalog = Catalog::new(&registry());
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.row_count(None), 2);
        assert_eq!(names(&catalog, None), vec!["A", "B"]);

        let a = catalog.child(None, 0).unwrap();
        let b = catalog.child(None, 1).unwrap();
        assert_eq!(catalog.row_count(Some(a)), 2);
        assert_eq!(catalog.row_count(Some(b)), 1);
        assert_eq!(names(&catalog, Some(a)), vec!["y", "z"]);
        assert_eq!(names(&catalog, Some(b)), vec!["x"]);
    }

    #[test]
    fn test_navigation_is_consistent() {
        let catalog = Catalog::new(&registry());
        for row in 0..catalog.row_count(None) {
            let category = catalog.child(None, row).unwrap();
            assert_eq!(catalog.parent(category), None);
            assert_eq!(catalog.row(category), row);
            for child_row in 0..catalog.row_count(Some(category)) {
                let child = catalog.child(Some(category), child_row).unwrap();
                assert_eq!(catalog.parent(child), Some(category));
                assert_eq!(catalog.row(child), child_row);
                assert_eq!(catalog.row_count(Some(child)), 0);
            }
        }
    }

    #[test]
    fn test_child_out_of_range() {
        let catalog = Catalog::new(&registry());
        assert_eq!(catalog.child(None, 2), None);
        let b = catalog.child(None, 1).unwrap();
        assert_eq!(catalog.child(Some(b), 1), None);
    }

    #[test]
    #[should_panic]
    fn test_foreign_slot_panics() {
        let catalog = Catalog::new(&registry());
        catalog.parent(Slot(99));
    }

    #[test]
    fn test_sort_is_case_sensitive() {
        let registry = TypeRegistry::new()
            .with_node_type(NodeType::new(1, "b", "math"))
            .with_node_type(NodeType::new(2, "a", "Math"))
            .with_node_type(NodeType::new(3, "Z", "Math"));
        let catalog = Catalog::new(&registry);
        assert_eq!(names(&catalog, None), vec!["Math", "math"]);
        let upper = catalog.child(None, 0).unwrap();
        assert_eq!(names(&catalog, Some(upper)), vec!["Z", "a"]);
    }

    #[test]
    fn test_empty_registry() {
        let catalog = Catalog::new(&TypeRegistry::new());
        assert!(catalog.is_empty());
        assert_eq!(catalog.row_count(None), 0);
        assert_eq!(catalog.child(None, 0), None);
    }

    #[test]
    fn test_flags_and_payload() {
        let catalog = Catalog::new(&registry());
        let a = catalog.child(None, 0).unwrap();
        let y = catalog.child(Some(a), 0).unwrap();

        assert!(!catalog.flags(a).draggable);
        assert!(catalog.flags(y).draggable && catalog.flags(y).selectable);

        let payload = catalog.drag_payload(&[y]).unwrap();
        assert_eq!(payload.text, "y");
        assert_eq!(NodeTypeId::from_payload(&payload.node_type), Some(NodeTypeId(3)));

        assert!(catalog.drag_payload(&[a]).is_none());
        assert!(catalog.drag_payload(&[]).is_none());
        assert!(catalog.drag_payload(&[y, y]).is_none());
    }

    #[test]
    fn test_filter() {
        let registry = TypeRegistry::new()
            .with_node_type(NodeType::new(1, "Add", "Math"))
            .with_node_type(NodeType::new(2, "Multiply", "Math"))
            .with_node_type(NodeType::new(3, "Noise", "Texture"))
            .with_node_type(NodeType::new(4, "a.b", "Misc"));
        let catalog = Catalog::new(&registry);

        let filter = catalog.filter("d").unwrap();
        let visible: Vec<_> = filter
            .visible_children(&catalog, None)
            .into_iter()
            .map(|s| catalog.name(s).to_owned())
            .collect();
        assert_eq!(visible, vec!["Math"]);
        let math = catalog.child(None, 0).unwrap();
        let children = filter.visible_children(&catalog, Some(math));
        assert_eq!(children.len(), 1);
        assert_eq!(catalog.name(children[0]), "Add");

        // case-sensitive
        assert!(catalog.filter("add").unwrap().visible_children(&catalog, None).is_empty());

        let filter = catalog.filter("N*e").unwrap();
        let texture = catalog.child(None, 2).unwrap();
        assert_eq!(catalog.name(texture), "Texture");
        assert!(filter.is_visible(texture));

        // literal dot
        let filter = catalog.filter("a.b").unwrap();
        assert_eq!(filter.visible_children(&catalog, None).len(), 1);
        assert!(catalog.filter("a?b").unwrap().is_visible(catalog.child(None, 1).unwrap()));
        assert!(!catalog.filter("x.y").unwrap().is_visible(catalog.child(None, 1).unwrap()));

        assert_eq!(catalog.filter("").unwrap().visible_children(&catalog, None).len(), 3);
    }

    #[test]
    fn test_filter_character_sets() {
        let registry = TypeRegistry::new()
            .with_node_type(NodeType::new(1, "Add", "Math"))
            .with_node_type(NodeType::new(2, "Multiply", "Math"))
            .with_node_type(NodeType::new(3, "Noise", "Texture"))
            .with_node_type(NodeType::new(4, "a.b", "Misc"));
        let catalog = Catalog::new(&registry);
        let shown = |pattern: &str| -> Vec<String> {
            let filter = catalog.filter(pattern).unwrap();
            filter
                .visible_children(&catalog, None)
                .into_iter()
                .flat_map(|c| filter.visible_children(&catalog, Some(c)))
                .map(|s| catalog.name(s).to_owned())
                .collect()
        };

        assert_eq!(shown("[AN]*"), vec!["Add", "Noise"]);
        assert_eq!(shown("[A-C]dd"), vec!["Add"]);
        assert!(shown("[!A]dd").is_empty());
        assert_eq!(shown("M[^x]l"), vec!["Multiply"]);
        assert_eq!(shown("[.]"), vec!["a.b"]);
        assert_eq!(shown("[]]"), Vec::<String>::new());
        // unclosed set is plain text
        assert!(shown("[Ad").is_empty());
        assert!(catalog.filter("[z-a]").is_err());
    }
}

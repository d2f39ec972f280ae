//src/aggregate/hierarchy.rs

use indexmap::IndexMap;

use crate::types::{AggregateRow, HierarchyNode};

/// Picks the grouping name of an item at one tree level.
pub type KeySelector<'s, T> = Box<dyn Fn(&T) -> &str + 's>;

pub fn key_selector<'s, T, F>(select: F) -> KeySelector<'s, T>
where
    F: Fn(&T) -> &str + 's,
{
    Box::new(select)
}

/// Read count and share carried by a leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LeafValue {
    pub value: u64,
    pub percentage: f64,
}

/// Builds a tree under a `root` node with one level per selector.
///
/// Children keep the first-seen order of their key. Items sharing the full key
/// path are merged into one leaf whose value and percentage are summed. An
/// inner node's percentage is the running sum of its children's percentages,
/// added in child order.
pub fn build_tree<T, L>(items: &[T], selectors: &[KeySelector<'_, T>], leaf: L) -> HierarchyNode
where
    L: Fn(&T) -> LeafValue,
{
    let mut root = HierarchyNode::root();
    root.children = grow(items.iter().collect(), selectors, &leaf);
    root
}

fn grow<T, L>(items: Vec<&T>, selectors: &[KeySelector<'_, T>], leaf: &L) -> Vec<HierarchyNode>
where
    L: Fn(&T) -> LeafValue,
{
    let Some((select, deeper)) = selectors.split_first() else {
        return Vec::new();
    };

    let mut groups: IndexMap<&str, Vec<&T>> = IndexMap::new();
    for item in items {
        groups.entry(select(item)).or_default().push(item);
    }

    groups
        .into_iter()
        .map(|(name, members)| {
            let mut node = HierarchyNode::branch(name);
            if deeper.is_empty() {
                let total = members.iter().fold(LeafValue::default(), |acc, item| {
                    let v = leaf(*item);
                    LeafValue {
                        value: acc.value + v.value,
                        percentage: acc.percentage + v.percentage,
                    }
                });
                node.value = Some(total.value);
                node.percentage = Some(total.percentage);
            } else {
                node.children = grow(members, deeper, leaf);
                let mut percentage = 0.0;
                for child in &node.children {
                    percentage += child.percentage.unwrap_or(0.0);
                }
                node.percentage = Some(percentage);
            }
            node
        })
        .collect()
}

/// Sunburst tree over aggregate rows: one level per key column, rows as leaves.
pub fn build_hierarchy(rows: &[AggregateRow]) -> HierarchyNode {
    let depth = rows.first().map_or(0, |row| row.key.len());
    let selectors: Vec<KeySelector<'_, AggregateRow>> = (0..depth)
        .map(|level| key_selector(move |row: &AggregateRow| row.key[level].as_str()))
        .collect();

    build_tree(rows, &selectors, |row| LeafValue {
        value: row.count,
        percentage: row.percentage,
    })
}

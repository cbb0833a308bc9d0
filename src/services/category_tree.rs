use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{dto::categories::CategoryNavNode, models::Category};

/// Parent → children adjacency of the category table.
#[derive(Debug, Default)]
pub struct CategoryTree {
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl CategoryTree {
    pub fn from_edges(edges: impl IntoIterator<Item = (Uuid, Option<Uuid>)>) -> Self {
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (id, parent_id) in edges {
            if let Some(parent_id) = parent_id {
                children.entry(parent_id).or_default().push(id);
            }
        }
        Self { children }
    }

    /// Every category below `root`, found depth-first. Each node is visited once,
    /// so a pre-existing loop in stored data cannot make the walk spin.
    pub fn descendants(&self, root: Uuid) -> HashSet<Uuid> {
        let mut seen = HashSet::new();
        let mut stack: Vec<Uuid> = self.children.get(&root).cloned().unwrap_or_default();
        while let Some(id) = stack.pop() {
            if id == root || !seen.insert(id) {
                continue;
            }
            if let Some(kids) = self.children.get(&id) {
                stack.extend(kids.iter().copied());
            }
        }
        seen
    }

    /// True if hanging `category_id` under `new_parent` would close a loop.
    pub fn would_create_cycle(&self, category_id: Uuid, new_parent: Uuid) -> bool {
        category_id == new_parent || self.descendants(category_id).contains(&new_parent)
    }
}

/// Builds the navigation forest from active categories already ordered by name.
/// Roots are categories without a parent; `depth` counts the root level.
pub fn build_navigation(categories: Vec<Category>, depth: usize) -> Vec<CategoryNavNode> {
    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();
    for category in categories {
        by_parent.entry(category.parent_id).or_default().push(category);
    }
    attach(&mut by_parent, None, depth)
}

fn attach(
    by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>,
    parent: Option<Uuid>,
    depth: usize,
) -> Vec<CategoryNavNode> {
    if depth == 0 {
        return Vec::new();
    }
    let level = by_parent.remove(&parent).unwrap_or_default();
    level
        .into_iter()
        .map(|category| {
            let children = attach(by_parent, Some(category.id), depth - 1);
            CategoryNavNode { category, children }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name: &str, id: Uuid, parent_id: Option<Uuid>) -> Category {
        let now = Utc::now();
        Category {
            id,
            name: name.into(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: None,
            image: None,
            is_active: true,
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn collects_all_levels_below_root() {
        let (gift, psn, psn_plus, xbox, other) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let tree = CategoryTree::from_edges([
            (gift, None),
            (psn, Some(gift)),
            (psn_plus, Some(psn)),
            (xbox, Some(gift)),
            (other, None),
        ]);

        let below = tree.descendants(gift);
        assert_eq!(below, HashSet::from([psn, psn_plus, xbox]));
        assert!(tree.descendants(psn_plus).is_empty());
    }

    #[test]
    fn detects_cycles_through_self_and_descendants() {
        let (gift, psn, psn_plus, steam) =
            (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let tree = CategoryTree::from_edges([
            (gift, None),
            (psn, Some(gift)),
            (psn_plus, Some(psn)),
            (steam, None),
        ]);

        assert!(tree.would_create_cycle(gift, gift));
        assert!(tree.would_create_cycle(gift, psn));
        assert!(tree.would_create_cycle(gift, psn_plus));
        assert!(!tree.would_create_cycle(gift, steam));
        assert!(!tree.would_create_cycle(psn_plus, gift));
    }

    #[test]
    fn corrupted_loop_terminates() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let tree = CategoryTree::from_edges([(a, Some(b)), (b, Some(a))]);
        assert_eq!(tree.descendants(a), HashSet::from([b]));
    }

    #[test]
    fn navigation_stops_at_three_levels() {
        let (gift, psn, psn_plus, deep) =
            (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let nav = build_navigation(
            vec![
                category("Gift Cards", gift, None),
                category("PlayStation", psn, Some(gift)),
                category("PS Plus", psn_plus, Some(psn)),
                category("Too Deep", deep, Some(psn_plus)),
                category("Subscriptions", Uuid::new_v4(), None),
            ],
            3,
        );

        assert_eq!(nav.len(), 2);
        assert_eq!(nav[0].category.name, "Gift Cards");
        let level2 = &nav[0].children[0];
        assert_eq!(level2.category.id, psn);
        let level3 = &level2.children[0];
        assert_eq!(level3.category.id, psn_plus);
        assert!(level3.children.is_empty());
    }

    #[test]
    fn orphans_of_inactive_parents_are_hidden() {
        let hidden_parent = Uuid::new_v4();
        let nav = build_navigation(
            vec![category("Orphan", Uuid::new_v4(), Some(hidden_parent))],
            3,
        );
        assert!(nav.is_empty());
    }
}

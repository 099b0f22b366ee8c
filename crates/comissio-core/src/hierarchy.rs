//! # Hierarchy Module
//!
//! Position tree building and cycle checks.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  positions (flat, parent_position_id)      build_hierarchy()            │
//! │                                                                         │
//! │  Diretor   (parent: -)                     Diretor                      │
//! │  Gerente   (parent: Diretor)      ──►      └── Gerente                  │
//! │  Vendedor  (parent: Gerente)                   └── Vendedor             │
//! │  Loja 2    (parent: -)                     Loja 2                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A position whose parent is not in the input set is treated as a root, so
//! a partial listing still renders.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Position;

/// A position with its direct reports nested below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PositionNode {
    pub position: Position,
    pub children: Vec<PositionNode>,
}

impl PositionNode {
    /// Number of positions in this subtree, including the root.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(PositionNode::size).sum::<usize>()
    }
}

/// Builds the position forest.
///
/// Roots and siblings keep the order of the input slice. Positions caught
/// in a cycle (which the write path prevents) are never reached from a
/// root and are left out.
pub fn build_hierarchy(positions: &[Position]) -> Vec<PositionNode> {
    let known: HashSet<&str> = positions.iter().map(|p| p.id.as_str()).collect();

    let mut children: HashMap<&str, Vec<&Position>> = HashMap::new();
    let mut roots = Vec::new();

    for position in positions {
        match position.parent_position_id.as_deref() {
            Some(parent) if known.contains(parent) && parent != position.id => {
                children.entry(parent).or_default().push(position);
            }
            _ => roots.push(position),
        }
    }

    let mut visited = HashSet::new();
    roots
        .into_iter()
        .filter_map(|root| build_node(root, &children, &mut visited))
        .collect()
}

fn build_node<'a>(
    position: &'a Position,
    children: &HashMap<&str, Vec<&'a Position>>,
    visited: &mut HashSet<&'a str>,
) -> Option<PositionNode> {
    if !visited.insert(position.id.as_str()) {
        return None;
    }

    let nested = children
        .get(position.id.as_str())
        .map(|list| {
            list.iter()
                .filter_map(|child| build_node(child, children, visited))
                .collect()
        })
        .unwrap_or_default();

    Some(PositionNode {
        position: position.clone(),
        children: nested,
    })
}

/// Returns the ids of every ancestor of `position_id`, nearest first.
///
/// Stops at a root, at a parent missing from the slice, or when an id
/// repeats.
pub fn ancestors(positions: &[Position], position_id: &str) -> Vec<String> {
    let by_id: HashMap<&str, &Position> = positions.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut chain = Vec::new();
    let mut seen: HashSet<&str> = HashSet::from([position_id]);
    let mut current = by_id.get(position_id).and_then(|p| p.parent_position_id.as_deref());

    while let Some(parent_id) = current {
        if !seen.insert(parent_id) {
            break;
        }
        chain.push(parent_id.to_string());
        current = by_id.get(parent_id).and_then(|p| p.parent_position_id.as_deref());
    }

    chain
}

/// Whether making `new_parent_id` the parent of `position_id` would close a
/// loop.
///
/// True when the new parent is the position itself or one of its
/// descendants (that is, `position_id` appears among the new parent's
/// ancestors).
pub fn would_create_cycle(positions: &[Position], position_id: &str, new_parent_id: &str) -> bool {
    if position_id == new_parent_id {
        return true;
    }

    ancestors(positions, new_parent_id)
        .iter()
        .any(|id| id == position_id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn position(id: &str, parent: Option<&str>) -> Position {
        let now = Utc::now();
        Position {
            id: id.to_string(),
            name: id.to_string(),
            parent_position_id: parent.map(str::to_string),
            company_id: "c1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn org_chart() -> Vec<Position> {
        vec![
            position("diretor", None),
            position("gerente", Some("diretor")),
            position("vendedor", Some("gerente")),
            position("vendedor-2", Some("gerente")),
            position("loja-2", None),
        ]
    }

    #[test]
    fn test_build_hierarchy() {
        let forest = build_hierarchy(&org_chart());

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].position.id, "diretor");
        assert_eq!(forest[0].size(), 4);
        assert_eq!(forest[1].position.id, "loja-2");
        assert!(forest[1].children.is_empty());

        let gerente = &forest[0].children[0];
        let ids: Vec<_> = gerente.children.iter().map(|n| n.position.id.as_str()).collect();
        assert_eq!(ids, vec!["vendedor", "vendedor-2"]);
    }

    #[test]
    fn test_orphan_becomes_root() {
        let positions = vec![position("gerente", Some("not-loaded"))];
        let forest = build_hierarchy(&positions);
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn test_cycle_members_are_left_out() {
        let positions = vec![
            position("root", None),
            position("a", Some("b")),
            position("b", Some("a")),
        ];
        let forest = build_hierarchy(&positions);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].size(), 1);
    }

    #[test]
    fn test_ancestors() {
        let positions = org_chart();
        assert_eq!(ancestors(&positions, "vendedor"), vec!["gerente", "diretor"]);
        assert!(ancestors(&positions, "diretor").is_empty());
        assert!(ancestors(&positions, "unknown").is_empty());
    }

    #[test]
    fn test_would_create_cycle() {
        let positions = org_chart();

        assert!(would_create_cycle(&positions, "diretor", "vendedor"));
        assert!(would_create_cycle(&positions, "gerente", "gerente"));
        assert!(!would_create_cycle(&positions, "vendedor", "loja-2"));
        assert!(!would_create_cycle(&positions, "loja-2", "vendedor"));
    }
}

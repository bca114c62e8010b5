//! Recipe-graph cycle detection.
//!
//! `would_create_cycle` validates that attaching a set of candidate
//! sub-recipes to a recipe would not introduce a self-reference or a
//! cycle. It must run, and pass, before any sub-recipe edges are
//! persisted - it is a write-time invariant.
//!
//! The check preloads the reachable portion of the graph breadth-first
//! into a cache that lives only for the duration of the call, then runs
//! a depth-first search with an explicit backtracking path. The preload
//! is capped so an already-corrupt stored graph cannot make a single
//! check unbounded.

use crate::Dataset;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Hard bound on distinct recipe ids loaded per check
const PRELOAD_CAP: usize = 100;

/// Check if adding `candidate_ids` as sub-recipes of `recipe_id` would
/// create a cycle or self-reference.
pub fn would_create_cycle(data: &Dataset, recipe_id: Uuid, candidate_ids: &[Uuid]) -> bool {
    // Self-reference needs no traversal
    if candidate_ids.contains(&recipe_id) {
        return true;
    }

    let check = CycleCheck::preload(data, recipe_id, candidate_ids);

    let mut visited = Vec::new();
    for &candidate in candidate_ids {
        if check.has_cyclic_dependency(candidate, recipe_id, &mut visited) {
            return true;
        }
    }

    false
}

/// Inverse of `would_create_cycle`: true when the candidate edges are
/// safe to persist.
pub fn validate_sub_recipes(data: &Dataset, recipe_id: Uuid, candidate_ids: &[Uuid]) -> bool {
    !would_create_cycle(data, recipe_id, candidate_ids)
}

/// Call-scoped adjacency cache for one cycle check.
///
/// Built fresh per call and dropped when the check returns, so
/// concurrent checks never observe each other's data.
struct CycleCheck {
    edges: HashMap<Uuid, Vec<Uuid>>,
}

impl CycleCheck {
    /// Bulk-preload the sub-recipe adjacency reachable from the target
    /// recipe and the candidates, breadth-first, capped at
    /// `PRELOAD_CAP` distinct ids.
    fn preload(data: &Dataset, recipe_id: Uuid, candidate_ids: &[Uuid]) -> Self {
        let mut edges: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut queue: VecDeque<Uuid> = std::iter::once(recipe_id)
            .chain(candidate_ids.iter().copied())
            .collect();

        while let Some(id) = queue.pop_front() {
            if edges.contains_key(&id) {
                continue;
            }
            if edges.len() >= PRELOAD_CAP {
                tracing::warn!(
                    "Cycle check preload hit cap of {} recipes; graph may be corrupt",
                    PRELOAD_CAP
                );
                break;
            }

            let children: Vec<Uuid> = data
                .recipes
                .get(&id)
                .map(|r| r.sub_recipes.iter().map(|e| e.child_id).collect())
                .unwrap_or_default();

            for &child in &children {
                if !edges.contains_key(&child) {
                    queue.push_back(child);
                }
            }
            edges.insert(id, children);
        }

        CycleCheck { edges }
    }

    /// Depth-first search for a path from `current` back to `target`,
    /// or for a repeat of any node already on the current path.
    fn has_cyclic_dependency(&self, current: Uuid, target: Uuid, visited: &mut Vec<Uuid>) -> bool {
        if visited.contains(&current) {
            return true;
        }
        if current == target {
            return true;
        }

        visited.push(current);

        if let Some(children) = self.edges.get(&current) {
            for &child in children {
                if self.has_cyclic_dependency(child, target, visited) {
                    return true;
                }
            }
        }

        visited.pop();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Recipe, SubRecipeEdge};
    use rust_decimal_macros::dec;

    fn recipe(name: &str, sub_recipes: Vec<Uuid>) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            name: name.into(),
            instructions: None,
            thumbnail: None,
            ingredients: vec![],
            sub_recipes: sub_recipes
                .into_iter()
                .map(|child_id| SubRecipeEdge {
                    child_id,
                    quantity: dec!(1),
                })
                .collect(),
        }
    }

    fn dataset(recipes: Vec<Recipe>) -> Dataset {
        let mut data = Dataset::default();
        for r in recipes {
            data.recipes.insert(r.id, r);
        }
        data
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let r = recipe("stock", vec![]);
        let id = r.id;
        let data = dataset(vec![r]);

        assert!(would_create_cycle(&data, id, &[id]));
    }

    #[test]
    fn test_closing_a_chain_is_a_cycle() {
        // R -> A -> B; attaching R under B would close the loop
        let b = recipe("b", vec![]);
        let a = recipe("a", vec![b.id]);
        let r = recipe("r", vec![a.id]);
        let (r_id, b_id) = (r.id, b.id);
        let data = dataset(vec![r, a, b]);

        assert!(would_create_cycle(&data, b_id, &[r_id]));
    }

    #[test]
    fn test_unrelated_recipe_is_not_a_cycle() {
        let b = recipe("b", vec![]);
        let a = recipe("a", vec![b.id]);
        let r = recipe("r", vec![a.id]);
        let c = recipe("c", vec![]);
        let (r_id, c_id) = (r.id, c.id);
        let data = dataset(vec![r, a, b, c]);

        assert!(!would_create_cycle(&data, r_id, &[c_id]));
        assert!(validate_sub_recipes(&data, r_id, &[c_id]));
    }

    #[test]
    fn test_deep_chain_reaching_target() {
        // target <- none yet; candidate d -> c -> b -> a -> target
        let target = recipe("target", vec![]);
        let a = recipe("a", vec![target.id]);
        let b = recipe("b", vec![a.id]);
        let c = recipe("c", vec![b.id]);
        let d = recipe("d", vec![c.id]);
        let (target_id, d_id) = (target.id, d.id);
        let data = dataset(vec![target, a, b, c, d]);

        assert!(would_create_cycle(&data, target_id, &[d_id]));
    }

    #[test]
    fn test_preexisting_cycle_among_candidates_terminates() {
        // a <-> b already cyclic in stored data; the check must still
        // terminate and report a cycle on the path
        let a_id = Uuid::new_v4();
        let b_id = Uuid::new_v4();
        let mut a = recipe("a", vec![b_id]);
        a.id = a_id;
        let mut b = recipe("b", vec![a_id]);
        b.id = b_id;
        let r = recipe("r", vec![]);
        let r_id = r.id;
        let data = dataset(vec![a, b, r]);

        assert!(would_create_cycle(&data, r_id, &[a_id]));
    }

    #[test]
    fn test_deep_chain_within_cap_is_detected() {
        // 50-link chain, comfortably inside the preload cap
        let target = recipe("target", vec![]);
        let target_id = target.id;
        let mut recipes = vec![target];
        let mut next = target_id;
        for i in 0..50 {
            let link = recipe(&format!("link{}", i), vec![next]);
            next = link.id;
            recipes.push(link);
        }
        let head = next;
        let data = dataset(recipes);

        assert!(would_create_cycle(&data, target_id, &[head]));
    }

    #[test]
    fn test_recipes_past_preload_cap_are_treated_as_leaves() {
        // 120-link chain: the edge back to the target sits past the
        // 100-id preload cap. The traversal bottoms out on an unloaded
        // id, terminates, and reports no cycle.
        let target = recipe("target", vec![]);
        let target_id = target.id;
        let mut recipes = vec![target];
        let mut next = target_id;
        for i in 0..120 {
            let link = recipe(&format!("link{}", i), vec![next]);
            next = link.id;
            recipes.push(link);
        }
        let head = next;
        let data = dataset(recipes);

        assert!(!would_create_cycle(&data, target_id, &[head]));
    }

    #[test]
    fn test_missing_candidate_is_treated_as_leaf() {
        let r = recipe("r", vec![]);
        let r_id = r.id;
        let data = dataset(vec![r]);

        // Candidate not present in the dataset: nothing to traverse
        assert!(!would_create_cycle(&data, r_id, &[Uuid::new_v4()]));
    }
}

//! Distance estimates used to order the informed frontiers

use super::graph::{GridNode, NavigationGraph};
use crate::terrain::constants::{
    REWARD_PROXIMITY_DISCOUNT, REWARD_PROXIMITY_RADIUS, TERRAIN_FACTOR_SPREAD,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};

pub fn manhattan_distance(a: GridNode, b: GridNode) -> u32 {
    a.manhattan_distance(&b)
}

/// Manhattan distance scaled by the cheapest step cost anywhere in the graph.
/// Never exceeds the true remaining cost.
pub fn terrain_heuristic(node: GridNode, goal: GridNode, graph: &NavigationGraph) -> f64 {
    f64::from(manhattan_distance(node, goal)) * f64::from(graph.min_terrain_cost())
}

/// Local roughness around `node`: 1.0 when the node and its neighbours are as
/// cheap as the cheapest cell in the graph, growing with their mean cost.
/// Only the neighbourhood of `node` matters, so the goal is not taken.
pub fn terrain_factor(node: GridNode, graph: &NavigationGraph) -> f64 {
    let costs: Vec<u32> = graph
        .node(node)
        .map(|data| data.cost())
        .into_iter()
        .chain(graph.neighbors(node).iter().map(|edge| edge.cost))
        .collect();
    if costs.is_empty() {
        return 1.0;
    }

    let mean = costs.iter().copied().map(f64::from).sum::<f64>() / costs.len() as f64;
    let above_min = (mean - f64::from(graph.min_terrain_cost())).max(0.0);
    1.0 + above_min / TERRAIN_FACTOR_SPREAD
}

/// Flat discount when any reward sits within the proximity radius
pub fn reward_proximity_bonus(node: GridNode, graph: &NavigationGraph) -> f64 {
    let radius = REWARD_PROXIMITY_RADIUS as i32;
    for dy in -radius..=radius {
        let span = radius - dy.abs();
        for dx in -span..=span {
            if node
                .step(dx, dy)
                .is_some_and(|cell| graph.has_reward(cell))
            {
                return REWARD_PROXIMITY_DISCOUNT;
            }
        }
    }
    0.0
}

/// Terrain-aware, reward-seeking estimate: Manhattan distance stretched by the
/// local terrain factor, minus the reward bonus. Clamped at zero; may
/// overestimate, so it is only fit for greedy ordering.
pub fn combined_heuristic(node: GridNode, goal: GridNode, graph: &NavigationGraph) -> f64 {
    let estimate = f64::from(manhattan_distance(node, goal)) * terrain_factor(node, graph);
    (estimate - reward_proximity_bonus(node, graph)).max(0.0)
}

/// Selectable heuristic for the informed searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Heuristic {
    #[display("manhattan")]
    Manhattan,
    #[display("terrain")]
    Terrain,
    #[display("combined")]
    Combined,
}

impl Heuristic {
    pub fn estimate(&self, node: GridNode, goal: GridNode, graph: &NavigationGraph) -> f64 {
        match self {
            Heuristic::Manhattan => f64::from(manhattan_distance(node, goal)),
            Heuristic::Terrain => terrain_heuristic(node, goal, graph),
            Heuristic::Combined => combined_heuristic(node, goal, graph),
        }
    }

    /// Whether the estimate is a lower bound on the true remaining cost.
    ///
    /// Manhattan qualifies because every step costs at least 1.
    pub fn is_admissible(&self) -> bool {
        matches!(self, Heuristic::Manhattan | Heuristic::Terrain)
    }
}

//! Objective and reward placement over a finished navigation graph

use crate::errors::{MazeError, MazeResult};
use crate::pathfinding::{GridNode, NavigationGraph};
use crate::terrain::constants::{
    PLACEMENT_SEED_OFFSET, REWARD_DENSITY_DIVISOR, REWARD_MAX_PATH_DISTANCE,
};
use ::pathfinding::prelude::bfs;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Start, goal and reward cells chosen for one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub start: GridNode,
    pub goal: GridNode,
    /// Fewest-step route from start to goal; rewards are seeded along it
    pub guaranteed_path: Vec<GridNode>,
    /// Reward cells in row-major order
    pub rewards: Vec<GridNode>,
}

/// Number of rewards to place: the configured minimum or one per
/// `REWARD_DENSITY_DIVISOR` nodes, whichever is larger, never touching
/// start or goal
pub fn reward_target(node_count: usize, min_rewards: usize) -> usize {
    min_rewards
        .max(node_count / REWARD_DENSITY_DIVISOR)
        .min(node_count.saturating_sub(2))
}

/// Cell with the largest Manhattan distance from `start`; the first in
/// `cells` order wins ties
pub fn farthest_from(start: GridNode, cells: &[GridNode]) -> Option<GridNode> {
    let mut best: Option<(u32, GridNode)> = None;
    for &cell in cells {
        let distance = start.manhattan_distance(&cell);
        if best.is_none_or(|(d, _)| distance > d) {
            best = Some((distance, cell));
        }
    }
    best.map(|(_, cell)| cell)
}

/// Fewest-step path through the graph
pub fn guaranteed_path(
    graph: &NavigationGraph,
    start: GridNode,
    goal: GridNode,
) -> MazeResult<Vec<GridNode>> {
    bfs(
        &start,
        |node| {
            graph
                .neighbors(*node)
                .iter()
                .map(|edge| edge.to)
                .collect::<Vec<_>>()
        },
        |node| *node == goal,
    )
    .ok_or_else(|| MazeError::invariant(format!("no route from {start} to {goal}")))
}

pub struct PlacementGenerator {
    rng: Pcg64,
    min_rewards: usize,
}

impl PlacementGenerator {
    pub fn new(seed: u32, min_rewards: usize) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed.wrapping_add(PLACEMENT_SEED_OFFSET) as u64),
            min_rewards,
        }
    }

    /// Choose start and goal, then mark reward cells on `graph`
    pub fn place(&mut self, graph: &mut NavigationGraph) -> MazeResult<Placement> {
        let cells: Vec<GridNode> = graph.nodes().map(|(cell, _)| cell).collect();
        if cells.len() < 2 + self.min_rewards {
            return Err(MazeError::GenerationFailure {
                attempts: 1,
                reason: format!(
                    "{} passable cells cannot hold start, goal and {} rewards",
                    cells.len(),
                    self.min_rewards
                ),
            });
        }

        let start = cells[self.rng.gen_range(0..cells.len())];
        let goal = farthest_from(start, &cells)
            .ok_or_else(|| MazeError::invariant("graph has no cells"))?;
        let path = guaranteed_path(graph, start, goal)?;

        let target = reward_target(cells.len(), self.min_rewards);
        let mut rewards = self.choose_rewards(&cells, &path, target);
        rewards.sort();

        for &cell in &rewards {
            graph.set_reward(cell, true)?;
        }

        tracing::info!(
            "Placed start {} and goal {} ({} steps apart), {} rewards",
            start,
            goal,
            path.len().saturating_sub(1),
            rewards.len()
        );

        Ok(Placement {
            start,
            goal,
            guaranteed_path: path,
            rewards,
        })
    }

    fn choose_rewards(
        &mut self,
        cells: &[GridNode],
        path: &[GridNode],
        target: usize,
    ) -> Vec<GridNode> {
        let interior: &[GridNode] = if path.len() > 2 {
            &path[1..path.len() - 1]
        } else {
            &[]
        };

        let on_path_count = (target / 2).max(1).min(target).min(interior.len());
        let mut chosen: Vec<GridNode> = (1..=on_path_count)
            .map(|i| interior[i * interior.len() / (on_path_count + 1)])
            .collect();

        let path_cells: HashSet<GridNode> = path.iter().copied().collect();
        let mut taken: HashSet<GridNode> = chosen.iter().copied().collect();

        // Off-path cells near the route, nearest first; shuffled so ties vary with the seed
        let mut nearby: Vec<(u32, GridNode)> = cells
            .iter()
            .filter(|cell| !path_cells.contains(cell))
            .filter_map(|&cell| {
                distance_to_path(cell, &path_cells).map(|distance| (distance, cell))
            })
            .collect();
        nearby.shuffle(&mut self.rng);
        nearby.sort_by_key(|(distance, _)| *distance);

        for (_, cell) in nearby {
            if chosen.len() >= target {
                break;
            }
            if taken.insert(cell) {
                chosen.push(cell);
            }
        }

        if chosen.len() < target {
            let mut remaining: Vec<GridNode> = cells
                .iter()
                .copied()
                .filter(|cell| !path_cells.contains(cell) && !taken.contains(cell))
                .collect();
            remaining.shuffle(&mut self.rng);
            let shortfall = target - chosen.len();
            chosen.extend(remaining.into_iter().take(shortfall));
        }

        // Tiny mazes: the only cells left may be on the route itself
        if chosen.len() < target {
            let spare: Vec<GridNode> = interior
                .iter()
                .copied()
                .filter(|cell| !chosen.contains(cell))
                .collect();
            let shortfall = target - chosen.len();
            chosen.extend(spare.into_iter().take(shortfall));
        }

        chosen
    }
}

/// Manhattan distance to the nearest path cell, if within the placement radius
fn distance_to_path(cell: GridNode, path_cells: &HashSet<GridNode>) -> Option<u32> {
    let radius = REWARD_MAX_PATH_DISTANCE as i32;
    (1..=radius).find_map(|distance| {
        (-distance..=distance)
            .flat_map(|dx| {
                let dy = distance - dx.abs();
                [(dx, dy), (dx, -dy)]
            })
            .filter_map(|(dx, dy)| cell.step(dx, dy))
            .any(|candidate| path_cells.contains(&candidate))
            .then_some(distance as u32)
    })
}

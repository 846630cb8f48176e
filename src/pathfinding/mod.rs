use ::pathfinding::prelude::dijkstra;

pub mod frontier;
pub mod graph;
pub mod heuristics;
pub mod search;

pub use frontier::{
    BoxedFrontier, FifoFrontier, Frontier, FrontierEntry, LifoFrontier, PriorityFrontier,
};
pub use graph::{Edge, GridNode, NavigationGraph, NodeData};
pub use heuristics::{
    Heuristic, combined_heuristic, manhattan_distance, reward_proximity_bonus, terrain_factor,
    terrain_heuristic,
};
pub use search::{SearchAlgorithm, SearchEngine, SearchLimits, SearchResult, Termination};

/// True minimum path cost from `start` to `goal`, independent of the search
/// engine. `None` when the goal is unreachable or either cell is unknown.
pub fn optimal_cost(graph: &NavigationGraph, start: GridNode, goal: GridNode) -> Option<u32> {
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    dijkstra(
        &start,
        |node| {
            graph
                .neighbors(*node)
                .iter()
                .map(|edge| (edge.to, edge.cost))
                .collect::<Vec<_>>()
        },
        |node| *node == goal,
    )
    .map(|(_, cost)| cost)
}

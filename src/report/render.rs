//! Plain-text map rendering

use crate::map::Environment;
use crate::pathfinding::GridNode;
use crate::terrain::TerrainType;
use crate::terrain::symbols::*;
use std::collections::HashSet;

/// Render the environment, optionally overlaying a walked path.
///
/// Rewards on the path show as collected. Start and goal always win over
/// other overlays.
pub fn render_map(environment: &Environment, path: Option<&[GridNode]>) -> String {
    render_frame(environment, path.unwrap_or_default(), None)
}

/// One frame of a traversal: the path walked up to `step` with the agent
/// standing on it
pub fn render_step(environment: &Environment, path: &[GridNode], step: usize) -> String {
    let step = step.min(path.len().saturating_sub(1));
    let walked = if path.is_empty() { path } else { &path[..=step] };
    render_frame(environment, walked, walked.last().copied())
}

fn render_frame(environment: &Environment, walked: &[GridNode], agent: Option<GridNode>) -> String {
    let on_path: HashSet<GridNode> = walked.iter().copied().collect();
    let maze = &environment.maze;
    let mut out = String::with_capacity(((maze.width + 1) * maze.height) as usize);

    for y in 0..maze.height {
        for x in 0..maze.width {
            let cell = GridNode::new(x, y);
            out.push(cell_symbol(environment, cell, &on_path, agent));
        }
        out.push('\n');
    }
    out
}

fn cell_symbol(
    environment: &Environment,
    cell: GridNode,
    on_path: &HashSet<GridNode>,
    agent: Option<GridNode>,
) -> char {
    let Some(data) = environment.graph.node(cell) else {
        return WALL;
    };

    if agent == Some(cell) {
        AGENT
    } else if cell == environment.start() {
        START
    } else if cell == environment.goal() {
        GOAL
    } else if data.has_reward {
        if on_path.contains(&cell) {
            REWARD_COLLECTED
        } else {
            REWARD_AVAILABLE
        }
    } else if on_path.contains(&cell) {
        TRAVERSED_PATH
    } else {
        data.terrain.symbol()
    }
}

/// Symbol key printed under rendered maps
pub fn legend() -> String {
    let terrain: Vec<String> = TerrainType::ALL
        .iter()
        .map(|t| format!("{} {} (cost {})", t.symbol(), t, t.cost()))
        .collect();
    format!(
        "Terrain: {}\nOverlay: {START} start, {GOAL} goal, {AGENT} agent, {REWARD_AVAILABLE} reward, \
         {REWARD_COLLECTED} collected, {TRAVERSED_PATH} path, {WALL} wall\n",
        terrain.join(", ")
    )
}

use super::frontier::{BoxedFrontier, FifoFrontier, FrontierEntry, LifoFrontier, PriorityFrontier};
use super::graph::{Edge, GridNode, NavigationGraph};
use super::heuristics::Heuristic;
use crate::config::SearchConfig;
use crate::errors::{MazeError, MazeResult};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// The four search strategies; informed ones carry their heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchAlgorithm {
    BreadthFirst,
    DepthFirst,
    Greedy(Heuristic),
    AStar(Heuristic),
}

impl SearchAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            SearchAlgorithm::BreadthFirst => "BFS",
            SearchAlgorithm::DepthFirst => "DFS",
            SearchAlgorithm::Greedy(_) => "Greedy",
            SearchAlgorithm::AStar(_) => "A*",
        }
    }

    /// BFS, DFS, reward-seeking Greedy and terrain-aware A*
    pub fn default_suite() -> [SearchAlgorithm; 4] {
        [
            SearchAlgorithm::BreadthFirst,
            SearchAlgorithm::DepthFirst,
            SearchAlgorithm::Greedy(Heuristic::Combined),
            SearchAlgorithm::AStar(Heuristic::Terrain),
        ]
    }

    pub fn heuristic(&self) -> Option<Heuristic> {
        match self {
            SearchAlgorithm::Greedy(h) | SearchAlgorithm::AStar(h) => Some(*h),
            _ => None,
        }
    }

    fn frontier(&self) -> BoxedFrontier {
        match self {
            SearchAlgorithm::BreadthFirst => Box::new(FifoFrontier::default()),
            SearchAlgorithm::DepthFirst => Box::new(LifoFrontier::default()),
            SearchAlgorithm::Greedy(_) | SearchAlgorithm::AStar(_) => {
                Box::new(PriorityFrontier::default())
            }
        }
    }

    /// A* keeps the best known g per node and re-opens on improvement;
    /// the others visit each node at most once
    fn reopens(&self) -> bool {
        matches!(self, SearchAlgorithm::AStar(_))
    }

    fn priority(&self, g: u32, node: GridNode, goal: GridNode, graph: &NavigationGraph) -> f64 {
        match self {
            SearchAlgorithm::BreadthFirst | SearchAlgorithm::DepthFirst => 0.0,
            SearchAlgorithm::Greedy(h) => h.estimate(node, goal, graph),
            SearchAlgorithm::AStar(h) => f64::from(g) + h.estimate(node, goal, graph),
        }
    }
}

impl std::fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.heuristic() {
            Some(h) => write!(f, "{} ({h})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Why a search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Termination {
    #[display("goal reached")]
    GoalReached,
    #[display("frontier exhausted")]
    FrontierExhausted,
    #[display("expansion limit")]
    ExpansionLimit,
    #[display("time limit")]
    TimeLimit,
}

/// Ceilings that keep degenerate searches bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_expansions: usize,
    pub time_limit: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchConfig::default().into()
    }
}

impl From<&SearchConfig> for SearchLimits {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_expansions: config.max_expansions.get(),
            time_limit: config.time_limit(),
        }
    }
}

impl From<SearchConfig> for SearchLimits {
    fn from(config: SearchConfig) -> Self {
        Self::from(&config)
    }
}

/// Outcome of one algorithm run; immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub algorithm: SearchAlgorithm,
    pub success: bool,
    pub termination: Termination,
    /// Start to goal inclusive; empty on failure
    pub path: Vec<GridNode>,
    pub total_cost: u32,
    pub nodes_expanded: usize,
    pub elapsed: Duration,
    /// Reward cells on the path, in path order
    pub rewards_collected: Vec<GridNode>,
}

impl SearchResult {
    /// Number of moves along the path
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn reward_count(&self) -> usize {
        self.rewards_collected.len()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Node in the search tree. `parent` indexes the same arena.
#[derive(Debug, Clone, Copy)]
struct SearchState {
    node: GridNode,
    g: u32,
    parent: Option<usize>,
}

/// Runs any of the strategies over one read-only graph
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'g> {
    graph: &'g NavigationGraph,
    limits: SearchLimits,
}

impl<'g> SearchEngine<'g> {
    pub fn new(graph: &'g NavigationGraph) -> Self {
        Self {
            graph,
            limits: SearchLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    /// Search from `start` to `goal`.
    ///
    /// Not finding the goal is reported through `SearchResult::success`;
    /// errors are reserved for unknown cells and an inadmissible A*.
    pub fn run(
        &self,
        algorithm: SearchAlgorithm,
        start: GridNode,
        goal: GridNode,
    ) -> MazeResult<SearchResult> {
        for cell in [start, goal] {
            if !self.graph.contains(cell) {
                return Err(MazeError::UnknownCell {
                    x: cell.x,
                    y: cell.y,
                });
            }
        }
        if let SearchAlgorithm::AStar(heuristic) = algorithm {
            if !heuristic.is_admissible() {
                return Err(MazeError::invalid_config(format!(
                    "A* requires an admissible heuristic, got {heuristic}"
                )));
            }
        }

        let started = Instant::now();
        if start == goal {
            return Ok(self.finish(algorithm, Termination::GoalReached, vec![start], 0, 0, started));
        }

        let graph = self.graph;
        let reopens = algorithm.reopens();

        let mut states = vec![SearchState {
            node: start,
            g: 0,
            parent: None,
        }];
        let mut frontier = algorithm.frontier();
        frontier.push(FrontierEntry {
            state: 0,
            priority: algorithm.priority(0, start, goal, graph),
        });
        let mut discovered: HashSet<GridNode> = HashSet::from([start]);
        let mut best_g: HashMap<GridNode, u32> = HashMap::from([(start, 0)]);
        let mut expanded = 0usize;

        let termination = loop {
            if expanded >= self.limits.max_expansions {
                break Termination::ExpansionLimit;
            }
            if self
                .limits
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                break Termination::TimeLimit;
            }
            let Some(entry) = frontier.pop() else {
                break Termination::FrontierExhausted;
            };

            let SearchState { node, g, .. } = states[entry.state];
            if reopens && best_g.get(&node).is_some_and(|&best| g > best) {
                continue;
            }

            expanded += 1;
            if node == goal {
                let path = reconstruct_path(&states, entry.state);
                return Ok(self.finish(algorithm, Termination::GoalReached, path, g, expanded, started));
            }

            let edges = graph.neighbors(node);
            // LIFO pops the last push first, so reverse to expand in N, E, S, W order
            let ordered: Vec<&Edge> = match algorithm {
                SearchAlgorithm::DepthFirst => edges.iter().rev().collect(),
                _ => edges.iter().collect(),
            };

            for edge in ordered {
                let next_g = g + edge.cost;
                if reopens {
                    if best_g.get(&edge.to).is_some_and(|&best| next_g >= best) {
                        continue;
                    }
                    best_g.insert(edge.to, next_g);
                } else if !discovered.insert(edge.to) {
                    continue;
                }

                states.push(SearchState {
                    node: edge.to,
                    g: next_g,
                    parent: Some(entry.state),
                });
                frontier.push(FrontierEntry {
                    state: states.len() - 1,
                    priority: algorithm.priority(next_g, edge.to, goal, graph),
                });
            }
        };

        if termination != Termination::FrontierExhausted {
            tracing::warn!(
                "{algorithm} stopped early ({termination}) after {expanded} expansions"
            );
        }
        Ok(self.finish(algorithm, termination, Vec::new(), 0, expanded, started))
    }

    /// Run every algorithm back to back against the same graph
    pub fn run_all(
        &self,
        algorithms: &[SearchAlgorithm],
        start: GridNode,
        goal: GridNode,
    ) -> MazeResult<Vec<SearchResult>> {
        algorithms
            .iter()
            .map(|&algorithm| {
                let result = self.run(algorithm, start, goal)?;
                tracing::info!(
                    "{}: {} | cost {} | expanded {} | {:.3} ms | rewards {}",
                    algorithm,
                    if result.success { "success" } else { "failed" },
                    result.total_cost,
                    result.nodes_expanded,
                    result.elapsed_ms(),
                    result.reward_count()
                );
                Ok::<_, MazeError>(result)
            })
            .collect()
    }

    fn finish(
        &self,
        algorithm: SearchAlgorithm,
        termination: Termination,
        path: Vec<GridNode>,
        total_cost: u32,
        nodes_expanded: usize,
        started: Instant,
    ) -> SearchResult {
        let rewards_collected = path
            .iter()
            .copied()
            .filter(|&cell| self.graph.has_reward(cell))
            .collect();
        let result = SearchResult {
            algorithm,
            success: termination == Termination::GoalReached,
            termination,
            path,
            total_cost,
            nodes_expanded,
            elapsed: started.elapsed(),
            rewards_collected,
        };
        tracing::debug!(
            "{algorithm} finished: {termination}, {} steps, cost {}",
            result.steps(),
            result.total_cost
        );
        result
    }
}

fn reconstruct_path(states: &[SearchState], goal_state: usize) -> Vec<GridNode> {
    let mut path = Vec::new();
    let mut current = Some(goal_state);
    while let Some(index) = current {
        path.push(states[index].node);
        current = states[index].parent;
    }
    path.reverse();
    path
}

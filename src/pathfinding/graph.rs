use crate::errors::{MazeError, MazeResult};
use crate::maze::{CARDINAL_STEPS, MazeGrid};
use crate::terrain::{TerrainMap, TerrainStatistics, TerrainType};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A single cell of the navigation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("({x}, {y})")]
pub struct GridNode {
    pub x: u32,
    pub y: u32,
}

impl GridNode {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Calculate Manhattan distance to another node
    pub fn manhattan_distance(&self, other: &GridNode) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Node reached by a unit step, if the coordinates stay non-negative
    pub fn step(&self, dx: i32, dy: i32) -> Option<GridNode> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(GridNode::new(x, y))
    }

    /// The four cardinal neighbors in N, E, S, W order
    pub fn cardinal_neighbors(&self) -> impl Iterator<Item = GridNode> + '_ {
        CARDINAL_STEPS
            .iter()
            .filter_map(|&(dx, dy)| self.step(dx, dy))
    }
}

// Row-major: y first, then x
impl Ord for GridNode {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for GridNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(u32, u32)> for GridNode {
    fn from((x, y): (u32, u32)) -> Self {
        GridNode::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub terrain: TerrainType,
    pub has_reward: bool,
}

impl NodeData {
    pub fn cost(&self) -> u32 {
        self.terrain.cost()
    }
}

/// Directed edge; the cost is the movement cost of the destination cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub to: GridNode,
    pub cost: u32,
}

/// Weighted directed graph over passable cells with 4-connectivity.
///
/// Nodes and adjacency lists are kept in row-major order so that every
/// traversal over the graph is reproducible.
#[derive(Debug, Clone, Default)]
pub struct NavigationGraph {
    nodes: BTreeMap<GridNode, NodeData>,
    adjacency: BTreeMap<GridNode, Vec<Edge>>,
    min_cost: Option<u32>,
}

impl NavigationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for every passage of `maze`, weighted by `terrain`.
    ///
    /// Fails with `InternalInvariantViolation` when the inputs disagree on
    /// dimensions or the finished graph is not connected.
    pub fn from_maze(maze: &MazeGrid, terrain: &TerrainMap) -> MazeResult<Self> {
        if maze.width != terrain.width || maze.height != terrain.height {
            return Err(MazeError::invariant(format!(
                "maze is {}x{} but terrain is {}x{}",
                maze.width, maze.height, terrain.width, terrain.height
            )));
        }

        let mut graph = NavigationGraph::new();
        let cells = maze.passage_cells();
        for &(x, y) in &cells {
            let kind = terrain.get(x, y).ok_or_else(|| {
                MazeError::invariant(format!("no terrain for passage ({x}, {y})"))
            })?;
            graph.add_node(GridNode::new(x, y), kind);
        }

        for &(x, y) in &cells {
            let node = GridNode::new(x, y);
            for neighbor in node.cardinal_neighbors() {
                if let Some(data) = graph.node(neighbor) {
                    let cost = data.cost();
                    graph.connect(node, neighbor, cost)?;
                }
            }
        }

        if !graph.is_connected() {
            return Err(MazeError::invariant(format!(
                "navigation graph with {} nodes is not connected",
                graph.node_count()
            )));
        }

        tracing::info!(
            "Navigation graph: {} nodes, {} directed edges, min step cost {}",
            graph.node_count(),
            graph.edge_count(),
            graph.min_terrain_cost()
        );
        Ok(graph)
    }

    /// Insert a node, or change the terrain of an existing one.
    ///
    /// Re-adding a cell keeps its reward and reprices every edge into it.
    pub fn add_node(&mut self, cell: GridNode, terrain: TerrainType) {
        let has_reward = self.has_reward(cell);
        let replaced = self.nodes.insert(
            cell,
            NodeData {
                terrain,
                has_reward,
            },
        );
        self.adjacency.entry(cell).or_default();

        if replaced.is_none() {
            self.min_cost = Some(self.min_cost.map_or(terrain.cost(), |m| m.min(terrain.cost())));
            return;
        }

        let cost = terrain.cost();
        for edge in self.adjacency.values_mut().flatten() {
            if edge.to == cell {
                edge.cost = cost;
            }
        }
        self.min_cost = self.nodes.values().map(NodeData::cost).min();
    }

    /// Add a directed edge between two 4-adjacent nodes. Adding an existing
    /// edge again is a no-op.
    pub fn connect(&mut self, from: GridNode, to: GridNode, cost: u32) -> MazeResult<()> {
        if !self.contains(from) || !self.contains(to) {
            return Err(MazeError::invariant(format!(
                "cannot connect {from} -> {to}: endpoint missing"
            )));
        }
        if from.manhattan_distance(&to) != 1 {
            return Err(MazeError::invariant(format!(
                "cannot connect {from} -> {to}: cells are not 4-adjacent"
            )));
        }

        let edges = self.adjacency.entry(from).or_default();
        if !edges.iter().any(|edge| edge.to == to) {
            edges.push(Edge { to, cost });
        }
        Ok(())
    }

    /// Outgoing edges in insertion order (N, E, S, W for built graphs)
    pub fn neighbors(&self, cell: GridNode) -> &[Edge] {
        self.adjacency
            .get(&cell)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Flood-fill check that every node is reachable from the first one
    pub fn is_connected(&self) -> bool {
        let Some(&first) = self.nodes.keys().next() else {
            return false;
        };

        let mut visited = BTreeSet::from([first]);
        let mut queue = VecDeque::from([first]);
        while let Some(current) = queue.pop_front() {
            for edge in self.neighbors(current) {
                if visited.insert(edge.to) {
                    queue.push_back(edge.to);
                }
            }
        }
        visited.len() == self.nodes.len()
    }

    pub fn contains(&self, cell: GridNode) -> bool {
        self.nodes.contains_key(&cell)
    }

    pub fn node(&self, cell: GridNode) -> Option<&NodeData> {
        self.nodes.get(&cell)
    }

    /// Nodes in row-major order
    pub fn nodes(&self) -> impl Iterator<Item = (GridNode, &NodeData)> {
        self.nodes.iter().map(|(cell, data)| (*cell, data))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn edge_cost(&self, from: GridNode, to: GridNode) -> Option<u32> {
        self.neighbors(from)
            .iter()
            .find(|edge| edge.to == to)
            .map(|edge| edge.cost)
    }

    /// Total cost of walking `path`, or `None` if two consecutive cells are
    /// not joined by an edge
    pub fn path_cost(&self, path: &[GridNode]) -> Option<u32> {
        path.windows(2)
            .map(|pair| self.edge_cost(pair[0], pair[1]))
            .sum()
    }

    /// Cheapest movement cost of any node in the graph; defaults to the
    /// cheapest terrain when the graph is empty
    pub fn min_terrain_cost(&self) -> u32 {
        self.min_cost.unwrap_or(TerrainType::Solid.cost())
    }

    pub fn set_reward(&mut self, cell: GridNode, has_reward: bool) -> MazeResult<()> {
        let data = self
            .nodes
            .get_mut(&cell)
            .ok_or(MazeError::UnknownCell {
                x: cell.x,
                y: cell.y,
            })?;
        data.has_reward = has_reward;
        Ok(())
    }

    pub fn has_reward(&self, cell: GridNode) -> bool {
        self.node(cell).is_some_and(|data| data.has_reward)
    }

    /// Reward-bearing cells in row-major order
    pub fn reward_cells(&self) -> Vec<GridNode> {
        self.nodes()
            .filter(|(_, data)| data.has_reward)
            .map(|(cell, _)| cell)
            .collect()
    }

    pub fn reward_count(&self) -> usize {
        self.nodes.values().filter(|data| data.has_reward).count()
    }

    /// Terrain distribution over passable cells only
    pub fn terrain_statistics(&self) -> TerrainStatistics {
        TerrainStatistics::from_cells(self.nodes.values().map(|data| data.terrain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_graph(width: u32, height: u32) -> NavigationGraph {
        NavigationGraph::from_maze(
            &MazeGrid::open(width, height),
            &TerrainMap::uniform(width, height, TerrainType::Solid),
        )
        .expect("Open grid should build a connected graph")
    }

    #[test]
    fn test_grid_node_neighbors_order() {
        let node = GridNode::new(3, 3);
        let neighbors: Vec<_> = node.cardinal_neighbors().collect();
        assert_eq!(
            neighbors,
            vec![
                GridNode::new(3, 2),
                GridNode::new(4, 3),
                GridNode::new(3, 4),
                GridNode::new(2, 3)
            ]
        );

        // Corner nodes drop the out-of-range neighbors
        let corner: Vec<_> = GridNode::new(0, 0).cardinal_neighbors().collect();
        assert_eq!(corner, vec![GridNode::new(1, 0), GridNode::new(0, 1)]);
    }

    #[test]
    fn test_grid_node_ordering_is_row_major() {
        let mut cells = vec![
            GridNode::new(2, 1),
            GridNode::new(0, 2),
            GridNode::new(5, 0),
            GridNode::new(1, 1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                GridNode::new(5, 0),
                GridNode::new(1, 1),
                GridNode::new(2, 1),
                GridNode::new(0, 2)
            ]
        );
        assert_eq!(GridNode::new(1, 1).manhattan_distance(&GridNode::new(4, 5)), 7);
        assert_eq!(GridNode::new(4, 5).to_string(), "(4, 5)");
    }

    #[test]
    fn test_edges_are_weighted_by_destination() {
        let mut terrain = TerrainMap::uniform(3, 1, TerrainType::Solid);
        terrain.set(1, 0, TerrainType::Swamp);
        let graph = NavigationGraph::from_maze(&MazeGrid::open(3, 1), &terrain)
            .expect("Corridor should build");

        let a = GridNode::new(0, 0);
        let b = GridNode::new(1, 0);
        assert_eq!(graph.edge_cost(a, b), Some(20));
        assert_eq!(graph.edge_cost(b, a), Some(1));
        assert_eq!(graph.edge_cost(a, GridNode::new(2, 0)), None);
        assert_eq!(graph.min_terrain_cost(), 1);
    }

    #[test]
    fn test_open_graph_structure() {
        let graph = open_graph(5, 5);
        assert_eq!(graph.node_count(), 25);
        // 2 * (4 * 5 + 5 * 4) directed edges
        assert_eq!(graph.edge_count(), 80);
        assert!(graph.is_connected());

        let center: Vec<_> = graph
            .neighbors(GridNode::new(2, 2))
            .iter()
            .map(|edge| edge.to)
            .collect();
        assert_eq!(center, GridNode::new(2, 2).cardinal_neighbors().collect::<Vec<_>>());
        assert!(graph.neighbors(GridNode::new(9, 9)).is_empty());
    }

    #[test]
    fn test_connect_validates_endpoints() {
        let mut graph = NavigationGraph::new();
        graph.add_node(GridNode::new(0, 0), TerrainType::Solid);
        graph.add_node(GridNode::new(2, 0), TerrainType::Solid);
        graph.add_node(GridNode::new(1, 0), TerrainType::Rocky);

        assert!(graph.connect(GridNode::new(0, 0), GridNode::new(2, 0), 1).is_err());
        assert!(graph.connect(GridNode::new(0, 0), GridNode::new(0, 1), 1).is_err());
        graph
            .connect(GridNode::new(0, 0), GridNode::new(1, 0), 10)
            .expect("Adjacent nodes should connect");
        graph
            .connect(GridNode::new(0, 0), GridNode::new(1, 0), 10)
            .expect("Duplicate connect is a no-op");
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_disconnected_graph_is_detected() {
        let mut graph = NavigationGraph::new();
        assert!(!graph.is_connected());

        graph.add_node(GridNode::new(0, 0), TerrainType::Solid);
        graph.add_node(GridNode::new(1, 0), TerrainType::Solid);
        assert!(!graph.is_connected());
        graph.connect(GridNode::new(0, 0), GridNode::new(1, 0), 1).unwrap();
        graph.connect(GridNode::new(1, 0), GridNode::new(0, 0), 1).unwrap();
        assert!(graph.is_connected());
    }

    #[test]
    fn test_from_maze_rejects_disconnected_maze() {
        let maze = MazeGrid::from_rows(&[".#."]).unwrap();
        let result = NavigationGraph::from_maze(&maze, &TerrainMap::uniform(3, 1, TerrainType::Solid));
        assert!(matches!(
            result,
            Err(MazeError::InternalInvariantViolation { .. })
        ));
    }

    #[test]
    fn test_from_maze_rejects_mismatched_terrain() {
        let result = NavigationGraph::from_maze(
            &MazeGrid::open(4, 4),
            &TerrainMap::uniform(5, 4, TerrainType::Solid),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_path_cost_and_rewards() {
        let mut graph = open_graph(3, 3);
        let path = [
            GridNode::new(0, 0),
            GridNode::new(1, 0),
            GridNode::new(1, 1),
        ];
        assert_eq!(graph.path_cost(&path), Some(2));
        assert_eq!(graph.path_cost(&[GridNode::new(0, 0)]), Some(0));
        assert_eq!(
            graph.path_cost(&[GridNode::new(0, 0), GridNode::new(2, 2)]),
            None
        );

        graph.set_reward(GridNode::new(1, 1), true).unwrap();
        graph.set_reward(GridNode::new(0, 2), true).unwrap();
        assert!(graph.set_reward(GridNode::new(7, 7), true).is_err());
        assert_eq!(
            graph.reward_cells(),
            vec![GridNode::new(1, 1), GridNode::new(0, 2)]
        );
        assert_eq!(graph.reward_count(), 2);
        assert!(graph.has_reward(GridNode::new(1, 1)));
    }

    #[test]
    fn test_min_cost_tracks_replaced_terrain() {
        let mut graph = NavigationGraph::new();
        graph.add_node(GridNode::new(0, 0), TerrainType::Sandy);
        graph.add_node(GridNode::new(1, 0), TerrainType::Rocky);
        assert_eq!(graph.min_terrain_cost(), 4);

        graph.add_node(GridNode::new(0, 0), TerrainType::Swamp);
        assert_eq!(graph.min_terrain_cost(), 10);
        assert_eq!(graph.terrain_statistics().count(TerrainType::Swamp), 1);
    }

    #[test]
    fn test_retyped_node_reprices_incoming_edges() {
        let mut graph = open_graph(3, 1);
        let (a, b, c) = (GridNode::new(0, 0), GridNode::new(1, 0), GridNode::new(2, 0));
        graph.set_reward(b, true).unwrap();

        graph.add_node(b, TerrainType::Swamp);

        assert_eq!(graph.edge_cost(a, b), Some(20));
        assert_eq!(graph.edge_cost(c, b), Some(20));
        assert_eq!(graph.edge_cost(b, a), Some(1));
        assert!(graph.has_reward(b));
        assert_eq!(graph.min_terrain_cost(), 1);
        for (cell, _) in graph.nodes() {
            for edge in graph.neighbors(cell) {
                assert_eq!(Some(edge.cost), graph.node(edge.to).map(NodeData::cost));
            }
        }
    }
}

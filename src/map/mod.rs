use crate::config::GenerationConfig;
use crate::errors::{MazeError, MazeResult};
use crate::maze::{MazeGenerator, MazeGrid};
use crate::pathfinding::{GridNode, NavigationGraph};
use crate::terrain::constants::TERRAIN_SEED_OFFSET;
use crate::terrain::{TerrainMap, TerrainStatistics};
use crate::terrain_generation::{TerrainAlgorithm, TerrainGenerator};
use serde::{Deserialize, Serialize};

pub mod placement;

pub use placement::{Placement, PlacementGenerator};

/// Descriptive facts about an environment, fixed at generation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentMetadata {
    pub width: u32,
    pub height: u32,
    /// Seed actually used, also when none was configured
    pub seed: u32,
    pub start: GridNode,
    pub goal: GridNode,
    pub node_count: usize,
    pub reward_count: usize,
    /// Terrain mix over passable cells
    pub terrain: TerrainStatistics,
}

/// A fully built environment: structure, terrain, graph and objectives
#[derive(Debug, Clone)]
pub struct Environment {
    pub maze: MazeGrid,
    pub terrain: TerrainMap,
    pub graph: NavigationGraph,
    pub placement: Placement,
    pub metadata: EnvironmentMetadata,
}

impl Environment {
    pub fn start(&self) -> GridNode {
        self.placement.start
    }

    pub fn goal(&self) -> GridNode {
        self.placement.goal
    }
}

/// Runs the generation pipeline: carve, classify terrain, build the graph,
/// then place objectives
#[derive(Debug, Clone)]
pub struct EnvironmentGenerator {
    config: GenerationConfig,
    terrain_algorithm: Option<TerrainAlgorithm>,
}

impl EnvironmentGenerator {
    pub fn new(config: GenerationConfig) -> MazeResult<Self> {
        config.check()?;
        Ok(Self {
            config,
            terrain_algorithm: None,
        })
    }

    /// Override the noise terrain, e.g. with a uniform map
    pub fn with_terrain_algorithm(mut self, algorithm: TerrainAlgorithm) -> Self {
        self.terrain_algorithm = Some(algorithm);
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate with the configured seed, or a fresh random one
    pub fn generate(&self) -> MazeResult<Environment> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.generate_with_seed(seed)
    }

    pub fn generate_with_seed(&self, seed: u32) -> MazeResult<Environment> {
        let GenerationConfig {
            width,
            height,
            noise_scale,
            noise_octaves,
            min_nodes,
            min_rewards,
            max_attempts,
            ..
        } = self.config.clone();

        tracing::info!("Generating {width}x{height} environment with seed {seed}");

        let maze = MazeGenerator::new(width, height)
            .min_passages(min_nodes as usize)
            .max_attempts(max_attempts)
            .generate(seed)?;

        let algorithm = self.terrain_algorithm.unwrap_or(TerrainAlgorithm::Gradient {
            octaves: noise_octaves,
        });
        let terrain = TerrainGenerator::new(
            seed.wrapping_add(TERRAIN_SEED_OFFSET),
            noise_scale.get(),
            algorithm,
        )
        .generate(width, height)?;

        let mut graph = NavigationGraph::from_maze(&maze, &terrain)?;
        if graph.node_count() < min_nodes as usize {
            return Err(MazeError::GenerationFailure {
                attempts: max_attempts,
                reason: format!(
                    "{} passable cells, {} required",
                    graph.node_count(),
                    min_nodes
                ),
            });
        }

        let placement = PlacementGenerator::new(seed, min_rewards as usize).place(&mut graph)?;

        let metadata = EnvironmentMetadata {
            width,
            height,
            seed,
            start: placement.start,
            goal: placement.goal,
            node_count: graph.node_count(),
            reward_count: graph.reward_count(),
            terrain: graph.terrain_statistics(),
        };

        Ok(Environment {
            maze,
            terrain,
            graph,
            placement,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainType;

    fn config(width: u32, height: u32, seed: u32) -> GenerationConfig {
        GenerationConfig {
            width,
            height,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_environment_meets_minimums() {
        let generator = EnvironmentGenerator::new(config(30, 20, 12345)).unwrap();
        let environment = generator.generate().expect("Environment should generate");

        assert!(environment.metadata.node_count >= 30);
        assert!(environment.metadata.reward_count >= 5);
        assert_eq!(environment.metadata.seed, 12345);
        assert_eq!(environment.metadata.width, 30);
        assert!(environment.graph.is_connected());
        assert_eq!(
            environment.maze.passage_count(),
            environment.metadata.node_count
        );
    }

    #[test]
    fn test_same_seed_reproduces_environment() {
        let generator = EnvironmentGenerator::new(config(30, 20, 12345)).unwrap();
        let first = generator.generate().unwrap();
        let second = generator.generate().unwrap();

        assert_eq!(first.maze, second.maze);
        assert_eq!(first.terrain, second.terrain);
        assert_eq!(first.metadata, second.metadata);
        assert_eq!(first.graph.reward_cells(), second.graph.reward_cells());
    }

    #[test]
    fn test_different_seeds_differ() {
        let generator = EnvironmentGenerator::new(config(30, 20, 0)).unwrap();
        let a = generator.generate_with_seed(1).unwrap();
        let b = generator.generate_with_seed(2).unwrap();
        assert_ne!(a.maze, b.maze);
    }

    #[test]
    fn test_every_passage_is_a_node() {
        let generator = EnvironmentGenerator::new(config(21, 13, 8)).unwrap();
        let environment = generator.generate().unwrap();
        for (x, y) in environment.maze.passage_cells() {
            assert!(environment.graph.contains(GridNode::new(x, y)));
        }
        assert!(environment.maze.is_connected());
    }

    #[test]
    fn test_uniform_terrain_override() {
        let generator = EnvironmentGenerator::new(config(15, 11, 3))
            .unwrap()
            .with_terrain_algorithm(TerrainAlgorithm::Uniform(TerrainType::Rocky));
        let environment = generator.generate().unwrap();
        assert_eq!(environment.graph.min_terrain_cost(), 10);
        assert_eq!(
            environment.metadata.terrain.count(TerrainType::Rocky),
            environment.metadata.node_count
        );
    }

    #[test]
    fn test_too_small_for_min_nodes() {
        // A 5x5 grid carves at most 7 passages
        let generator = EnvironmentGenerator::new(config(5, 5, 1)).unwrap();
        let result = generator.generate();
        assert!(matches!(result, Err(MazeError::GenerationFailure { .. })));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = EnvironmentGenerator::new(GenerationConfig {
            noise_octaves: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(MazeError::InvalidConfiguration { .. })));
    }
}

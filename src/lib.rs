pub mod config;
pub mod errors;
pub mod map;
pub mod maze;
pub mod pathfinding;
pub mod report;
pub mod terrain;
pub mod terrain_generation;

// Selective re-exports for external consumers

// Errors - every fallible operation returns these
pub use errors::{MazeError, MazeResult};

// Pipeline entry points
pub use map::{Environment, EnvironmentGenerator, EnvironmentMetadata};

// Search - the binary runs the default suite through the engine
pub use pathfinding::{SearchAlgorithm, SearchEngine, SearchLimits, SearchResult};

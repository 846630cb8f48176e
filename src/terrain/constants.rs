/// Constants for terrain and maze generation

/// Noise thresholds separating terrain categories, in ascending order
pub const SWAMP_UPPER_BOUND: f64 = -0.3;
pub const ROCKY_UPPER_BOUND: f64 = 0.0;
pub const SANDY_UPPER_BOUND: f64 = 0.4;

/// Movement costs per terrain category
pub const SOLID_COST: u32 = 1;
pub const SANDY_COST: u32 = 4;
pub const ROCKY_COST: u32 = 10;
pub const SWAMP_COST: u32 = 20;

/// Octave sampling parameters
pub const NOISE_PERSISTENCE: f64 = 0.5;
pub const NOISE_LACUNARITY: f64 = 2.0;

/// Seed offsets so each generation stage draws from its own stream
pub const TERRAIN_SEED_OFFSET: u32 = 1337;
pub const PLACEMENT_SEED_OFFSET: u32 = 42;
pub const RETRY_SEED_STRIDE: u32 = 0x9E37_79B9;

/// Reward placement
pub const REWARD_DENSITY_DIVISOR: usize = 8;
pub const REWARD_MAX_PATH_DISTANCE: u32 = 5;

/// Greedy heuristic tuning
pub const REWARD_PROXIMITY_RADIUS: u32 = 3;
pub const REWARD_PROXIMITY_DISCOUNT: f64 = 5.0;
/// Local mean cost above the map minimum is divided by this for the terrain factor
pub const TERRAIN_FACTOR_SPREAD: f64 = 20.0;

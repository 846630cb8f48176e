//! Overlay symbols used when a map is rendered as text. Terrain symbols live
//! on [`TerrainType::symbol`](super::TerrainType::symbol).

pub const START: char = 'S';
pub const GOAL: char = 'G';
pub const AGENT: char = 'A';
pub const REWARD_AVAILABLE: char = '$';
pub const REWARD_COLLECTED: char = '*';
pub const WALL: char = '#';
pub const TRAVERSED_PATH: char = '·';

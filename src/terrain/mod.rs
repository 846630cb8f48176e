use crate::errors::{MazeError, MazeResult};
use derive_more::Display;
use serde::{Deserialize, Serialize};

pub mod constants;
pub mod symbols;

use constants::*;

/// Terrain categories, declared in ascending movement cost
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
pub enum TerrainType {
    Solid,
    Sandy,
    Rocky,
    Swamp,
}

impl TerrainType {
    pub const ALL: [TerrainType; 4] = [
        TerrainType::Solid,
        TerrainType::Sandy,
        TerrainType::Rocky,
        TerrainType::Swamp,
    ];

    /// Cost of stepping onto a cell of this terrain
    pub fn cost(self) -> u32 {
        match self {
            TerrainType::Solid => SOLID_COST,
            TerrainType::Sandy => SANDY_COST,
            TerrainType::Rocky => ROCKY_COST,
            TerrainType::Swamp => SWAMP_COST,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            TerrainType::Solid => '.',
            TerrainType::Sandy => '~',
            TerrainType::Rocky => '^',
            TerrainType::Swamp => '&',
        }
    }

    /// Map a noise sample in [-1, 1] to a terrain category.
    /// Values outside the range fall into the nearest end category.
    pub fn classify(noise_value: f64) -> Self {
        if noise_value < SWAMP_UPPER_BOUND {
            TerrainType::Swamp
        } else if noise_value < ROCKY_UPPER_BOUND {
            TerrainType::Rocky
        } else if noise_value < SANDY_UPPER_BOUND {
            TerrainType::Sandy
        } else {
            TerrainType::Solid
        }
    }

    fn index(self) -> usize {
        match self {
            TerrainType::Solid => 0,
            TerrainType::Sandy => 1,
            TerrainType::Rocky => 2,
            TerrainType::Swamp => 3,
        }
    }
}

/// Per-cell terrain assignment over the whole rectangular grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainMap {
    pub width: u32,
    pub height: u32,
    cells: Vec<TerrainType>, // Flattened 2D array (row-major)
}

/// Distribution of terrain categories over a map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainStatistics {
    pub counts: [usize; 4],
    pub total: usize,
}

impl TerrainMap {
    pub fn new(width: u32, height: u32, cells: Vec<TerrainType>) -> MazeResult<Self> {
        let expected_size = (width as usize) * (height as usize);
        if cells.len() != expected_size {
            return Err(MazeError::invariant(format!(
                "Terrain cell count {} does not match dimensions {}x{} (expected {})",
                cells.len(),
                width,
                height,
                expected_size
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Create a map covered by a single terrain type
    pub fn uniform(width: u32, height: u32, terrain: TerrainType) -> Self {
        Self {
            width,
            height,
            cells: vec![terrain; (width as usize) * (height as usize)],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<TerrainType> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get((y * self.width + x) as usize).copied()
    }

    pub fn set(&mut self, x: u32, y: u32, terrain: TerrainType) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y * self.width + x) as usize;
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = terrain;
        }
    }

    pub fn statistics(&self) -> TerrainStatistics {
        TerrainStatistics::from_cells(self.cells.iter().copied())
    }
}

impl TerrainStatistics {
    pub fn from_cells(cells: impl IntoIterator<Item = TerrainType>) -> Self {
        let mut counts = [0usize; 4];
        let mut total = 0;
        for terrain in cells {
            counts[terrain.index()] += 1;
            total += 1;
        }
        Self { counts, total }
    }

    pub fn count(&self, terrain: TerrainType) -> usize {
        self.counts[terrain.index()]
    }

    pub fn percentage(&self, terrain: TerrainType) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(terrain) as f64 / self.total as f64 * 100.0
    }

    /// Cheapest terrain present, if any cell was counted
    pub fn cheapest(&self) -> Option<TerrainType> {
        TerrainType::ALL
            .into_iter()
            .find(|terrain| self.count(*terrain) > 0)
    }
}

//! Structure generation: randomized depth-first carving of a perfect maze,
//! followed by a flood-fill connectivity check and repair pass.

use crate::errors::{MazeError, MazeResult};
use crate::terrain::constants::RETRY_SEED_STRIDE;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Cardinal unit steps in expansion order: North, East, South, West
pub const CARDINAL_STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Wall/passage grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeGrid {
    pub width: u32,
    pub height: u32,
    walls: Vec<bool>, // Flattened 2D array (row-major), true = wall
}

impl MazeGrid {
    pub fn fully_walled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            walls: vec![true; (width as usize) * (height as usize)],
        }
    }

    /// Grid with no walls at all
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            walls: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Build a grid from text rows, `#` marking walls
    pub fn from_rows(rows: &[&str]) -> MazeResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0) as u32;
        let mut walls = Vec::with_capacity((width * height) as usize);
        for row in rows {
            if row.chars().count() as u32 != width {
                return Err(MazeError::invalid_config("maze rows must share one width"));
            }
            walls.extend(row.chars().map(|c| c == '#'));
        }
        Ok(Self {
            width,
            height,
            walls,
        })
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn is_passage(&self, x: u32, y: u32) -> bool {
        self.index(x, y)
            .and_then(|i| self.walls.get(i))
            .is_some_and(|wall| !wall)
    }

    pub fn set_passage(&mut self, x: u32, y: u32) {
        if let Some(i) = self.index(x, y) {
            self.walls[i] = false;
        }
    }

    /// Passage cells in row-major order
    pub fn passage_cells(&self) -> Vec<(u32, u32)> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_passage(x, y) {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    pub fn passage_count(&self) -> usize {
        self.walls.iter().filter(|&&wall| !wall).count()
    }

    fn offset(&self, x: u32, y: u32, dx: i32, dy: i32) -> Option<(u32, u32)> {
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return None;
        }
        Some((nx as u32, ny as u32))
    }

    /// Breadth-first flood over 4-adjacent passages; returns the visited mask
    pub fn flood_fill(&self, start: (u32, u32)) -> Vec<bool> {
        let mut visited = vec![false; self.walls.len()];
        self.flood_into(start, &mut visited);
        visited
    }

    fn flood_into(&self, start: (u32, u32), visited: &mut [bool]) -> usize {
        let Some(start_index) = self.index(start.0, start.1) else {
            return 0;
        };
        if self.walls[start_index] || visited[start_index] {
            return 0;
        }

        let mut reached = 1;
        visited[start_index] = true;
        let mut queue = VecDeque::from([start]);

        while let Some((x, y)) = queue.pop_front() {
            for (dx, dy) in CARDINAL_STEPS {
                let Some((nx, ny)) = self.offset(x, y, dx, dy) else {
                    continue;
                };
                let ni = (ny * self.width + nx) as usize;
                if !self.walls[ni] && !visited[ni] {
                    visited[ni] = true;
                    reached += 1;
                    queue.push_back((nx, ny));
                }
            }
        }
        reached
    }

    /// True when every passage cell is reachable from every other one
    pub fn is_connected(&self) -> bool {
        let cells = self.passage_cells();
        let Some(&first) = cells.first() else {
            return false;
        };
        let mut visited = vec![false; self.walls.len()];
        self.flood_into(first, &mut visited) == cells.len()
    }

    /// Join every isolated passage component to the main one by clearing the
    /// shortest straight wall segment towards it. Returns the number of
    /// segments cleared.
    pub fn repair_connectivity(&mut self) -> usize {
        let cells = self.passage_cells();
        let Some(&first) = cells.first() else {
            return 0;
        };

        let mut visited = vec![false; self.walls.len()];
        self.flood_into(first, &mut visited);
        let mut repairs = 0;

        for (x, y) in cells {
            let index = (y * self.width + x) as usize;
            if visited[index] {
                continue;
            }

            let Some((dx, dy, distance)) = self.nearest_connected(x, y, &visited) else {
                tracing::debug!("No straight connection from isolated cell ({x}, {y})");
                continue;
            };

            for step in 1..distance {
                let cx = (x as i64 + (dx * step) as i64) as u32;
                let cy = (y as i64 + (dy * step) as i64) as u32;
                self.set_passage(cx, cy);
            }
            repairs += 1;

            // The newly cleared segment touches the main component, so flooding
            // from the isolated cell absorbs its whole component.
            self.absorb_component((x, y), &mut visited);
        }

        repairs
    }

    fn absorb_component(&self, start: (u32, u32), visited: &mut [bool]) {
        // Walks through already-marked cells too, since the cleared segment
        // merged this component with the main one
        let mut seen = vec![false; visited.len()];
        let start_index = (start.1 * self.width + start.0) as usize;
        seen[start_index] = true;
        visited[start_index] = true;
        let mut queue = VecDeque::from([start]);

        while let Some((x, y)) = queue.pop_front() {
            for (dx, dy) in CARDINAL_STEPS {
                let Some((nx, ny)) = self.offset(x, y, dx, dy) else {
                    continue;
                };
                let ni = (ny * self.width + nx) as usize;
                if !self.walls[ni] && !seen[ni] {
                    seen[ni] = true;
                    visited[ni] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    /// Direction and distance of the closest visited passage along a straight
    /// line, preferring N, E, S, W on ties
    fn nearest_connected(&self, x: u32, y: u32, visited: &[bool]) -> Option<(i32, i32, i32)> {
        let max_distance = self.width.max(self.height) as i32;
        let mut best: Option<(i32, i32, i32)> = None;

        for (dx, dy) in CARDINAL_STEPS {
            for distance in 1..max_distance {
                let Some((nx, ny)) = self.offset(x, y, dx * distance, dy * distance) else {
                    break;
                };
                let ni = (ny * self.width + nx) as usize;
                if !self.walls[ni] && visited[ni] {
                    if best.is_none_or(|(_, _, d)| distance < d) {
                        best = Some((dx, dy, distance));
                    }
                    break;
                }
            }
        }
        best
    }
}

/// Number of passages a perfect maze carved on this grid will contain
pub fn perfect_maze_passages(width: u32, height: u32) -> usize {
    let rooms = (width.saturating_sub(1) / 2) as usize * (height.saturating_sub(1) / 2) as usize;
    (2 * rooms).saturating_sub(1)
}

/// One pending step of the carving walk
struct CarveFrame {
    x: u32,
    y: u32,
    directions: [(i32, i32); 4],
    next: usize,
}

impl CarveFrame {
    fn new<R: Rng + ?Sized>(x: u32, y: u32, rng: &mut R) -> Self {
        let mut directions = [(0, -2), (2, 0), (0, 2), (-2, 0)];
        directions.shuffle(rng);
        Self {
            x,
            y,
            directions,
            next: 0,
        }
    }
}

/// Carve a perfect maze with randomized depth-first search.
///
/// Uses an explicit stack of frames; each frame shuffles its directions when
/// created, which visits cells in the same order as the recursive formulation.
pub fn carve_maze<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> MazeGrid {
    let mut grid = MazeGrid::fully_walled(width, height);
    if width < 3 || height < 3 {
        return grid;
    }

    grid.set_passage(1, 1);
    let mut stack = vec![CarveFrame::new(1, 1, rng)];

    while let Some(frame) = stack.last_mut() {
        if frame.next >= frame.directions.len() {
            stack.pop();
            continue;
        }
        let (dx, dy) = frame.directions[frame.next];
        frame.next += 1;
        let (x, y) = (frame.x as i64, frame.y as i64);

        let nx = x + dx as i64;
        let ny = y + dy as i64;
        let inside = nx > 0 && ny > 0 && nx < width as i64 - 1 && ny < height as i64 - 1;
        if !inside || grid.is_passage(nx as u32, ny as u32) {
            continue;
        }

        grid.set_passage((x + dx as i64 / 2) as u32, (y + dy as i64 / 2) as u32);
        grid.set_passage(nx as u32, ny as u32);
        stack.push(CarveFrame::new(nx as u32, ny as u32, rng));
    }

    grid
}

/// Builds connected maze grids with a bounded number of attempts
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    pub width: u32,
    pub height: u32,
    pub min_passages: usize,
    pub max_attempts: u32,
}

impl MazeGenerator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            min_passages: 1,
            max_attempts: 5,
        }
    }

    pub fn min_passages(mut self, min_passages: usize) -> Self {
        self.min_passages = min_passages;
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Seed used for a given attempt; attempt 0 uses the base seed
    pub fn attempt_seed(seed: u32, attempt: u32) -> u32 {
        seed.wrapping_add(attempt.wrapping_mul(RETRY_SEED_STRIDE))
    }

    pub fn generate(&self, seed: u32) -> MazeResult<MazeGrid> {
        if self.width < 3 || self.height < 3 {
            return Err(MazeError::invalid_config(format!(
                "maze dimensions must be at least 3x3, got {}x{}",
                self.width, self.height
            )));
        }

        let capacity = perfect_maze_passages(self.width, self.height);
        if capacity < self.min_passages {
            return Err(MazeError::GenerationFailure {
                attempts: 0,
                reason: format!(
                    "a {}x{} grid holds at most {} passages, {} required",
                    self.width, self.height, capacity, self.min_passages
                ),
            });
        }

        let attempts = self.max_attempts.max(1);
        for attempt in 0..attempts {
            let attempt_seed = Self::attempt_seed(seed, attempt);
            let mut rng = Pcg64::seed_from_u64(attempt_seed as u64);
            let mut grid = carve_maze(self.width, self.height, &mut rng);

            if !grid.is_connected() {
                let repairs = grid.repair_connectivity();
                tracing::debug!("Attempt {attempt}: cleared {repairs} wall segment(s)");
            }

            if grid.is_connected() && grid.passage_count() >= self.min_passages {
                tracing::info!(
                    "Carved {}x{} maze with {} passages (seed {}, attempt {})",
                    self.width,
                    self.height,
                    grid.passage_count(),
                    attempt_seed,
                    attempt + 1
                );
                return Ok(grid);
            }

            tracing::warn!(
                "Maze attempt {} with seed {} was rejected, retrying",
                attempt + 1,
                attempt_seed
            );
        }

        Err(MazeError::GenerationFailure {
            attempts,
            reason: "could not produce a single connected passage region".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(grid: &MazeGrid) -> Vec<String> {
        (0..grid.height)
            .map(|y| {
                (0..grid.width)
                    .map(|x| if grid.is_passage(x, y) { '.' } else { '#' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_carved_maze_is_perfect_and_connected() {
        let mut rng = Pcg64::seed_from_u64(42);
        let grid = carve_maze(15, 11, &mut rng);

        assert!(grid.is_connected());
        // 7 x 5 rooms, joined by a spanning tree of 34 corridors
        assert_eq!(grid.passage_count(), perfect_maze_passages(15, 11));
        assert_eq!(grid.passage_count(), 69);
    }

    #[test]
    fn test_carving_leaves_border_walled() {
        let mut rng = Pcg64::seed_from_u64(3);
        let grid = carve_maze(12, 10, &mut rng);
        for x in 0..grid.width {
            assert!(!grid.is_passage(x, 0));
            assert!(!grid.is_passage(x, grid.height - 1));
        }
        for y in 0..grid.height {
            assert!(!grid.is_passage(0, y));
            assert!(!grid.is_passage(grid.width - 1, y));
        }
        // Even width leaves the column before the border walled too
        assert!((0..grid.height).all(|y| !grid.is_passage(10, y)));
    }

    #[test]
    fn test_corridors_are_sparse() {
        let mut rng = Pcg64::seed_from_u64(8);
        let grid = carve_maze(21, 21, &mut rng);
        // Cells with both coordinates even are never carved, so no 2x2 rooms
        for y in (0..21).step_by(2) {
            for x in (0..21).step_by(2) {
                assert!(!grid.is_passage(x, y));
            }
        }
    }

    #[test]
    fn test_carving_is_deterministic() {
        let a = carve_maze(31, 21, &mut Pcg64::seed_from_u64(12345));
        let b = carve_maze(31, 21, &mut Pcg64::seed_from_u64(12345));
        let c = carve_maze(31, 21, &mut Pcg64::seed_from_u64(54321));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_large_grid_does_not_overflow_stack() {
        let mut rng = Pcg64::seed_from_u64(1);
        let grid = carve_maze(801, 801, &mut rng);
        assert!(grid.is_connected());
    }

    #[test]
    fn test_repair_joins_isolated_components() {
        let mut grid = MazeGrid::from_rows(&[
            "#######", //
            "#...#.#", //
            "#####.#", //
            "#.#####", //
            "#######", //
        ])
        .expect("Rows should parse");
        assert!(!grid.is_connected());

        let repairs = grid.repair_connectivity();
        assert!(repairs >= 1);
        assert!(grid.is_connected());
        // (5,1)-(5,2) joins via the wall at (4,1); (1,3) joins upward via (1,2)
        assert_eq!(
            render(&grid),
            vec!["#######", "#.....#", "#.###.#", "#.#####", "#######"]
        );
    }

    #[test]
    fn test_repair_on_connected_grid_is_noop() {
        let mut grid = carve_maze(9, 9, &mut Pcg64::seed_from_u64(77));
        let before = grid.clone();
        assert_eq!(grid.repair_connectivity(), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_flood_fill_counts_component() {
        let grid = MazeGrid::from_rows(&["...#..", "#..#.."]).expect("Rows should parse");
        let visited = grid.flood_fill((0, 0));
        assert_eq!(visited.iter().filter(|&&v| v).count(), 5);
        assert!(!grid.is_connected());
        assert!(MazeGrid::open(4, 4).is_connected());
        assert!(!MazeGrid::fully_walled(4, 4).is_connected());
    }

    #[test]
    fn test_generator_rejects_tiny_grids() {
        let err = MazeGenerator::new(2, 9).generate(1).unwrap_err();
        assert!(matches!(err, MazeError::InvalidConfiguration { .. }));

        let err = MazeGenerator::new(5, 5)
            .min_passages(30)
            .generate(1)
            .unwrap_err();
        assert!(matches!(err, MazeError::GenerationFailure { .. }));
    }

    #[test]
    fn test_generator_output_is_reproducible() {
        let generator = MazeGenerator::new(30, 20).min_passages(30).max_attempts(3);
        let first = generator.generate(12345).expect("30x20 maze should generate");
        let second = generator.generate(12345).expect("30x20 maze should generate");
        assert_eq!(first, second);
        assert!(first.passage_count() >= 30);
        assert!(first.is_connected());
    }

    #[test]
    fn test_attempt_seed_derivation() {
        assert_eq!(MazeGenerator::attempt_seed(10, 0), 10);
        assert_ne!(MazeGenerator::attempt_seed(10, 1), 10);
        assert_eq!(
            MazeGenerator::attempt_seed(u32::MAX, 1),
            u32::MAX.wrapping_add(RETRY_SEED_STRIDE)
        );
    }
}

use crate::errors::MazeResult;
use crate::terrain::constants::{NOISE_LACUNARITY, NOISE_PERSISTENCE};
use crate::terrain::{TerrainMap, TerrainType};
use noise::{NoiseFn, Perlin, Seedable};
use std::f64::consts::{SQRT_2, TAU};

/// Classic 2D gradient noise.
///
/// Every integer lattice point owns a unit gradient whose angle is hashed from
/// the lattice coordinates and the seed, so nothing is stored and any region of
/// the plane can be sampled in any order with identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GradientNoise {
    seed: u32,
}

impl GradientNoise {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Sample the field at a point. Output lies in [-1, 1] and is 0 at every
    /// lattice point.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (ix, iy) = (x0 as i64, y0 as i64);

        let n00 = self.corner_dot(ix, iy, fx, fy);
        let n10 = self.corner_dot(ix + 1, iy, fx - 1.0, fy);
        let n01 = self.corner_dot(ix, iy + 1, fx, fy - 1.0);
        let n11 = self.corner_dot(ix + 1, iy + 1, fx - 1.0, fy - 1.0);

        let u = fade(fx);
        let v = fade(fy);
        let value = lerp(lerp(n00, n10, u), lerp(n01, n11, u), v);

        // Unit gradients peak at sqrt(2)/2
        (value * SQRT_2).clamp(-1.0, 1.0)
    }

    fn corner_dot(&self, ix: i64, iy: i64, dx: f64, dy: f64) -> f64 {
        let (gx, gy) = self.gradient(ix, iy);
        gx * dx + gy * dy
    }

    fn gradient(&self, ix: i64, iy: i64) -> (f64, f64) {
        let hash = lattice_hash(ix, iy, self.seed);
        // Top 53 bits give a uniform fraction in [0, 1)
        let angle = (hash >> 11) as f64 / (1u64 << 53) as f64 * TAU;
        (angle.cos(), angle.sin())
    }
}

impl NoiseFn<f64, 2> for GradientNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}

impl Seedable for GradientNoise {
    fn set_seed(self, seed: u32) -> Self {
        Self { seed }
    }

    fn seed(&self) -> u32 {
        self.seed
    }
}

/// Quintic smoothstep 6t^5 - 15t^4 + 10t^3
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

fn lattice_hash(ix: i64, iy: i64, seed: u32) -> u64 {
    let mut h = (ix as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (iy as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (seed as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    // splitmix64 finalizer
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

/// Sum octaves of any 2D noise function at `(x * scale, y * scale)`,
/// normalised by the amplitude total so the result stays in [-1, 1]
pub fn octave_sample<N: NoiseFn<f64, 2>>(
    noise: &N,
    x: f64,
    y: f64,
    scale: f64,
    octaves: u32,
) -> f64 {
    let mut noise_value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = scale;
    let mut max_amplitude = 0.0;

    for _ in 0..octaves.max(1) {
        noise_value += noise.get([x * frequency, y * frequency]) * amplitude;
        max_amplitude += amplitude;
        amplitude *= NOISE_PERSISTENCE;
        frequency *= NOISE_LACUNARITY;
    }

    (noise_value / max_amplitude).clamp(-1.0, 1.0)
}

/// Terrain generation algorithms
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerrainAlgorithm {
    /// Every cell gets the same terrain
    Uniform(TerrainType),
    /// Hashed-gradient noise
    Gradient { octaves: u32 },
    /// The `noise` crate's permutation-table Perlin
    Perlin { octaves: u32 },
}

/// Main terrain generator struct
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    pub seed: u32,
    pub scale: f64,
    pub algorithm: TerrainAlgorithm,
}

impl TerrainGenerator {
    pub fn new(seed: u32, scale: f64, algorithm: TerrainAlgorithm) -> Self {
        Self {
            seed,
            scale,
            algorithm,
        }
    }

    /// Raw noise samples for every cell in row-major order
    pub fn sample_field(&self, width: u32, height: u32) -> Vec<f64> {
        let total_points = (width as usize) * (height as usize);
        let mut samples = Vec::with_capacity(total_points);

        match self.algorithm {
            TerrainAlgorithm::Uniform(_) => samples.resize(total_points, 0.0),
            TerrainAlgorithm::Gradient { octaves } => {
                let noise = GradientNoise::new(self.seed);
                Self::fill_octaves(&noise, width, height, self.scale, octaves, &mut samples);
            }
            TerrainAlgorithm::Perlin { octaves } => {
                let noise = Perlin::new(self.seed);
                Self::fill_octaves(&noise, width, height, self.scale, octaves, &mut samples);
            }
        }

        samples
    }

    fn fill_octaves<N: NoiseFn<f64, 2>>(
        noise: &N,
        width: u32,
        height: u32,
        scale: f64,
        octaves: u32,
        samples: &mut Vec<f64>,
    ) {
        for y in 0..height {
            for x in 0..width {
                samples.push(octave_sample(noise, x as f64, y as f64, scale, octaves));
            }
        }
    }

    /// Generate a classified terrain map using the configured algorithm
    pub fn generate(&self, width: u32, height: u32) -> MazeResult<TerrainMap> {
        let cells = match self.algorithm {
            TerrainAlgorithm::Uniform(terrain) => {
                vec![terrain; (width as usize) * (height as usize)]
            }
            _ => self
                .sample_field(width, height)
                .into_iter()
                .map(TerrainType::classify)
                .collect(),
        };

        let terrain = TerrainMap::new(width, height, cells)?;
        let stats = terrain.statistics();
        tracing::info!(
            "Terrain {}x{} (seed {}): solid {:.1}%, sandy {:.1}%, rocky {:.1}%, swamp {:.1}%",
            width,
            height,
            self.seed,
            stats.percentage(TerrainType::Solid),
            stats.percentage(TerrainType::Sandy),
            stats.percentage(TerrainType::Rocky),
            stats.percentage(TerrainType::Swamp)
        );
        Ok(terrain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_noise_is_zero_on_lattice() {
        let noise = GradientNoise::new(99);
        for (x, y) in [(0.0, 0.0), (3.0, -2.0), (-5.0, 7.0), (12.0, 12.0)] {
            assert!(noise.sample(x, y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_gradient_noise_range() {
        let noise = GradientNoise::new(12345);
        let mut has_positive = false;
        let mut has_negative = false;
        for i in 0..60 {
            for j in 0..60 {
                let value = noise.sample(i as f64 * 0.173, j as f64 * 0.219 - 4.0);
                assert!((-1.0..=1.0).contains(&value), "value {value} out of range");
                has_positive |= value > 0.05;
                has_negative |= value < -0.05;
            }
        }
        assert!(has_positive && has_negative, "noise should vary in sign");
    }

    #[test]
    fn test_gradient_noise_is_continuous_across_cell_edges() {
        let noise = GradientNoise::new(7);
        let eps = 1e-7;
        for k in -3..4 {
            let edge = k as f64;
            for y in [0.25, 1.5, -2.75] {
                let left = noise.sample(edge - eps, y);
                let right = noise.sample(edge + eps, y);
                assert!((left - right).abs() < 1e-5, "jump at x={edge}, y={y}");

                let below = noise.sample(y, edge - eps);
                let above = noise.sample(y, edge + eps);
                assert!((below - above).abs() < 1e-5, "jump at y={edge}, x={y}");
            }
        }
    }

    #[test]
    fn test_gradient_noise_is_deterministic_per_seed() {
        let a = GradientNoise::new(42);
        let b = GradientNoise::default().set_seed(42);
        let c = GradientNoise::new(43);
        assert_eq!(b.seed(), 42);

        let mut differs = false;
        for i in 0..50 {
            let point = [i as f64 * 0.37, i as f64 * 0.11 + 0.5];
            assert_eq!(a.get(point), b.get(point));
            differs |= (a.get(point) - c.get(point)).abs() > 1e-9;
        }
        assert!(differs, "different seeds should give different fields");
    }

    #[test]
    fn test_octave_sample_stays_in_range() {
        let noise = GradientNoise::new(5);
        for octaves in 1..=6 {
            for i in 0..40 {
                let value = octave_sample(&noise, i as f64, (i * 3) as f64, 0.08, octaves);
                assert!((-1.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn test_uniform_terrain_generation() {
        let generator =
            TerrainGenerator::new(1, 0.08, TerrainAlgorithm::Uniform(TerrainType::Sandy));
        let terrain = generator
            .generate(6, 4)
            .expect("Uniform terrain should always generate");
        assert_eq!(terrain.statistics().count(TerrainType::Sandy), 24);
    }

    #[test]
    fn test_gradient_terrain_generation_is_reproducible() {
        let generator =
            TerrainGenerator::new(12345, 0.08, TerrainAlgorithm::Gradient { octaves: 3 });
        let first = generator.generate(30, 20).expect("Terrain should generate");
        let second = generator.generate(30, 20).expect("Terrain should generate");
        assert_eq!(first, second);
        assert_eq!(
            generator.sample_field(30, 20),
            generator.sample_field(30, 20)
        );
        assert_eq!(first.statistics().total, 600);
    }

    #[test]
    fn test_perlin_terrain_generation() {
        let generator = TerrainGenerator::new(9, 0.1, TerrainAlgorithm::Perlin { octaves: 2 });
        let samples = generator.sample_field(16, 16);
        assert_eq!(samples.len(), 256);
        assert!(samples.iter().all(|v| (-1.0..=1.0).contains(v)));
        let first = samples[1];
        assert!(
            samples.iter().any(|v| (v - first).abs() > 1e-6),
            "Perlin noise should vary across the map"
        );
    }
}

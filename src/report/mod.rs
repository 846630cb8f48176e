//! Flat text reports comparing search runs on one environment

use crate::errors::MazeResult;
use crate::map::{Environment, EnvironmentMetadata};
use crate::pathfinding::{SearchAlgorithm, SearchResult, optimal_cost};
use crate::terrain::TerrainType;
use std::fmt;
use std::path::Path;

pub mod render;

/// Weights for the best-algorithm score; lower scores are better
const COST_WEIGHT: f64 = 0.5;
const TIME_WEIGHT: f64 = 0.2;
const EXPANSION_WEIGHT: f64 = 0.2;
const REWARD_CREDIT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgorithmScore {
    pub algorithm: SearchAlgorithm,
    pub score: f64,
}

/// Results of every algorithm on one environment, ready to print or save
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub metadata: EnvironmentMetadata,
    pub results: Vec<SearchResult>,
    /// Reference minimum cost between start and goal
    pub optimal_cost: Option<u32>,
}

impl ComparisonReport {
    pub fn new(environment: &Environment, results: Vec<SearchResult>) -> Self {
        Self {
            metadata: environment.metadata.clone(),
            optimal_cost: optimal_cost(&environment.graph, environment.start(), environment.goal()),
            results,
        }
    }

    pub fn successful(&self) -> impl Iterator<Item = &SearchResult> {
        self.results.iter().filter(|result| result.success)
    }

    /// Weighted score per successful run. Cost, time and expansions are each
    /// normalised by their maximum over the successful runs; every collected
    /// reward earns a flat credit.
    pub fn scores(&self) -> Vec<AlgorithmScore> {
        let successful: Vec<&SearchResult> = self.successful().collect();
        let max_cost = successful.iter().map(|r| r.total_cost).max().unwrap_or(0);
        let max_time = successful
            .iter()
            .map(|r| r.elapsed.as_secs_f64())
            .fold(0.0, f64::max);
        let max_expanded = successful.iter().map(|r| r.nodes_expanded).max().unwrap_or(0);

        successful
            .iter()
            .map(|result| {
                let score = COST_WEIGHT * normalise(f64::from(result.total_cost), f64::from(max_cost))
                    + TIME_WEIGHT * normalise(result.elapsed.as_secs_f64(), max_time)
                    + EXPANSION_WEIGHT
                        * normalise(result.nodes_expanded as f64, max_expanded as f64)
                    - REWARD_CREDIT * result.reward_count() as f64;
                AlgorithmScore {
                    algorithm: result.algorithm,
                    score,
                }
            })
            .collect()
    }

    /// Lowest score wins; the earlier run wins ties
    pub fn best_algorithm(&self) -> Option<AlgorithmScore> {
        self.scores()
            .into_iter()
            .reduce(|best, next| if next.score < best.score { next } else { best })
    }

    /// One row per run, with the gap to the reference optimum
    pub fn comparison_table(&self) -> ComparisonTable<'_> {
        ComparisonTable(self)
    }

    /// Ranking, failures and per-metric winners
    pub fn detailed_analysis(&self) -> DetailedAnalysis<'_> {
        DetailedAnalysis(self)
    }

    fn write_table(&self, f: &mut impl fmt::Write) -> fmt::Result {
        writeln!(
            f,
            "{:<16} {:>7} {:>6} {:>5} {:>9} {:>10} {:>8} {:>6}",
            "Algorithm", "Success", "Cost", "Gap", "Expanded", "Time (ms)", "Rewards", "Steps"
        )?;
        writeln!(f, "{}", "-".repeat(74))?;

        for result in &self.results {
            let (cost, gap, steps) = if result.success {
                let gap = self
                    .optimal_cost
                    .map(|optimum| result.total_cost.saturating_sub(optimum).to_string())
                    .unwrap_or_else(|| "?".to_string());
                (result.total_cost.to_string(), gap, result.steps().to_string())
            } else {
                ("-".to_string(), "-".to_string(), "-".to_string())
            };
            writeln!(
                f,
                "{:<16} {:>7} {:>6} {:>5} {:>9} {:>10.3} {:>8} {:>6}",
                result.algorithm.to_string(),
                if result.success { "yes" } else { "no" },
                cost,
                gap,
                result.nodes_expanded,
                result.elapsed_ms(),
                result.reward_count(),
                steps
            )?;
        }
        Ok(())
    }

    fn write_analysis(&self, f: &mut impl fmt::Write) -> fmt::Result {
        let mut ranked: Vec<&SearchResult> = self.successful().collect();
        ranked.sort_by_key(|result| result.total_cost);

        if ranked.is_empty() {
            writeln!(f, "No algorithm reached the goal.")?;
        } else {
            writeln!(f, "Ranking by path cost:")?;
            for (rank, result) in ranked.iter().enumerate() {
                writeln!(
                    f,
                    "  {}. {} - cost {}, {} steps, {} expanded",
                    rank + 1,
                    result.algorithm,
                    result.total_cost,
                    result.steps(),
                    result.nodes_expanded
                )?;
            }
        }

        for result in self.results.iter().filter(|result| !result.success) {
            writeln!(
                f,
                "  {} failed: {} after {} expansions",
                result.algorithm, result.termination, result.nodes_expanded
            )?;
        }

        if let Some(best) = ranked.first() {
            writeln!(f, "Lowest cost: {} ({})", best.algorithm, best.total_cost)?;
        }
        if let Some(fastest) = ranked.iter().min_by_key(|result| result.elapsed) {
            writeln!(
                f,
                "Fastest: {} ({:.3} ms)",
                fastest.algorithm,
                fastest.elapsed_ms()
            )?;
        }
        if let Some(leanest) = ranked.iter().min_by_key(|result| result.nodes_expanded) {
            writeln!(
                f,
                "Fewest expansions: {} ({})",
                leanest.algorithm, leanest.nodes_expanded
            )?;
        }
        if let Some(collector) = ranked.iter().max_by_key(|result| result.reward_count()) {
            writeln!(
                f,
                "Most rewards: {} ({} of {})",
                collector.algorithm,
                collector.reward_count(),
                self.metadata.reward_count
            )?;
        }
        if let Some(best) = self.best_algorithm() {
            writeln!(f, "Best overall: {} (score {:.3})", best.algorithm, best.score)?;
        }
        Ok(())
    }

    fn environment_summary(&self) -> String {
        let meta = &self.metadata;
        let terrain: Vec<String> = TerrainType::ALL
            .iter()
            .map(|t| format!("{t} {:.1}%", meta.terrain.percentage(*t)))
            .collect();
        let optimum = self
            .optimal_cost
            .map_or_else(|| "unreachable".to_string(), |cost| cost.to_string());
        format!(
            "Environment: {}x{}, seed {}, {} nodes, {} rewards\nStart {} -> Goal {}, optimal cost {}\nTerrain: {}\n",
            meta.width,
            meta.height,
            meta.seed,
            meta.node_count,
            meta.reward_count,
            meta.start,
            meta.goal,
            optimum,
            terrain.join(", ")
        )
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> MazeResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_string())?;
        tracing::info!("Report saved to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Search Algorithm Comparison ===")?;
        writeln!(f, "{}", self.environment_summary())?;
        self.write_table(f)?;
        writeln!(f)?;
        self.write_analysis(f)
    }
}

pub struct ComparisonTable<'a>(&'a ComparisonReport);

impl fmt::Display for ComparisonTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_table(f)
    }
}

pub struct DetailedAnalysis<'a>(&'a ComparisonReport);

impl fmt::Display for DetailedAnalysis<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_analysis(f)
    }
}

fn normalise(value: f64, max: f64) -> f64 {
    if max > 0.0 { value / max } else { 0.0 }
}

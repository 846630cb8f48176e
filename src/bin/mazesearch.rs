use clap::Parser;
use std::path::PathBuf;
use terramaze::config::range_types::ExpansionLimit;
use terramaze::config::{self, AppConfig};
use terramaze::errors::MazeResult;
use terramaze::map::{Environment, EnvironmentGenerator};
use terramaze::pathfinding::{SearchAlgorithm, SearchEngine, SearchLimits, SearchResult};
use terramaze::report::ComparisonReport;
use terramaze::report::render::{legend, render_map};
use tracing_subscriber::EnvFilter;

mod mazesearch {
    pub mod cli_utils;
}

use mazesearch::cli_utils::*;

#[derive(Parser, Clone, Debug)]
#[command(name = "mazesearch")]
#[command(about = "Generate a terrain maze and compare BFS, DFS, Greedy and A* on it")]
struct Args {
    /// Grid size in cells (format: WIDTHxHEIGHT)
    #[arg(long)]
    size: Option<String>,

    /// Random seed for reproducible generation (decimal or 0x hex)
    #[arg(long)]
    seed: Option<String>,

    /// Noise scale; smaller values give larger terrain regions
    #[arg(long)]
    scale: Option<f64>,

    /// Number of noise octaves
    #[arg(long)]
    octaves: Option<u32>,

    /// Minimum number of passable cells
    #[arg(long)]
    min_nodes: Option<u32>,

    /// Minimum number of reward cells
    #[arg(long)]
    min_rewards: Option<u32>,

    /// Expansion ceiling per search run
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Wall-clock ceiling per search run, in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Print the map with each algorithm's path
    #[arg(long)]
    show_map: bool,

    /// Save the comparison report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Read settings from this TOML file instead of the user config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings back to the user config
    #[arg(long)]
    save_config: bool,
}

/// Command-line values win over the loaded config
fn apply_overrides(mut config: AppConfig, args: &Args) -> MazeResult<AppConfig> {
    let generation = &mut config.generation;
    if let Some(size) = &args.size {
        let (width, height) = parse_size(size)?;
        generation.width = width;
        generation.height = height;
    }
    if let Some(seed) = &args.seed {
        generation.seed = Some(parse_seed(seed)?);
    }
    if let Some(scale) = args.scale {
        generation.noise_scale = parse_scale(scale)?;
    }
    if let Some(octaves) = args.octaves {
        generation.noise_octaves = octaves;
    }
    if let Some(min_nodes) = args.min_nodes {
        generation.min_nodes = min_nodes;
    }
    if let Some(min_rewards) = args.min_rewards {
        generation.min_rewards = min_rewards;
    }
    if let Some(max_expansions) = args.max_expansions {
        config.search.max_expansions = ExpansionLimit::new(max_expansions);
    }
    if let Some(time_limit_ms) = args.time_limit_ms {
        config.search.time_limit_ms = Some(time_limit_ms);
    }

    config.generation.check()?;
    Ok(config)
}

fn main() -> MazeResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let loaded = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config(),
    };
    let app_config = apply_overrides(loaded, &args)?;
    if args.save_config {
        config::save_config(&app_config)?;
    }

    let environment = EnvironmentGenerator::new(app_config.generation.clone())?.generate()?;
    print_environment_summary(&environment);

    let engine =
        SearchEngine::new(&environment.graph).with_limits(SearchLimits::from(&app_config.search));
    let results = engine.run_all(
        &SearchAlgorithm::default_suite(),
        environment.start(),
        environment.goal(),
    )?;

    if args.show_map {
        print_maps(&environment, &results);
    }

    let report = ComparisonReport::new(&environment, results);
    println!("{report}");

    if let Some(path) = &args.report {
        report.save_to_file(path)?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_environment_summary(environment: &Environment) {
    let meta = &environment.metadata;
    println!("Environment summary:");
    println!("  Size: {}x{} (seed {})", meta.width, meta.height, meta.seed);
    println!("  Nodes: {}", meta.node_count);
    println!("  Rewards: {}", meta.reward_count);
    println!("  Start: {}  Goal: {}", meta.start, meta.goal);
    println!();
}

fn print_maps(environment: &Environment, results: &[SearchResult]) {
    println!("{}", render_map(environment, None));
    for result in results.iter().filter(|result| result.success) {
        println!("{} path:", result.algorithm);
        println!("{}", render_map(environment, Some(result.path.as_slice())));
    }
    println!("{}", legend());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("mazesearch").chain(args.iter().copied()))
            .expect("Arguments should parse")
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let args = parse(&[
            "--size",
            "31x21",
            "--seed",
            "12345",
            "--scale",
            "0.12",
            "--octaves",
            "2",
            "--min-rewards",
            "7",
            "--max-expansions",
            "500",
            "--show-map",
        ]);
        assert!(args.show_map);

        let config = apply_overrides(AppConfig::default(), &args).unwrap();
        assert_eq!(config.generation.width, 31);
        assert_eq!(config.generation.height, 21);
        assert_eq!(config.generation.seed, Some(12345));
        assert_eq!(config.generation.noise_scale.get(), 0.12);
        assert_eq!(config.generation.noise_octaves, 2);
        assert_eq!(config.generation.min_rewards, 7);
        assert_eq!(config.generation.min_nodes, 30);
        assert_eq!(config.search.max_expansions.get(), 500);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let config = apply_overrides(AppConfig::default(), &parse(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(apply_overrides(AppConfig::default(), &parse(&["--size", "2x2"])).is_err());
        assert!(apply_overrides(AppConfig::default(), &parse(&["--seed", "nope"])).is_err());
        assert!(apply_overrides(AppConfig::default(), &parse(&["--scale=-0.5"])).is_err());
        assert!(apply_overrides(AppConfig::default(), &parse(&["--octaves", "0"])).is_err());
    }

    #[test]
    fn test_end_to_end_run() {
        let args = parse(&["--size", "25x15", "--seed", "7"]);
        let config = apply_overrides(AppConfig::default(), &args).unwrap();
        let environment = EnvironmentGenerator::new(config.generation)
            .unwrap()
            .generate()
            .unwrap();
        let results = SearchEngine::new(&environment.graph)
            .with_limits(SearchLimits::from(&config.search))
            .run_all(
                &SearchAlgorithm::default_suite(),
                environment.start(),
                environment.goal(),
            )
            .unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|result| result.success));
    }
}

//! Command-line front end.
//!
//! Usage:
//!   # GA over the built-in 14-city layout
//!   u-tsp ga --seed 42 --generations 300
//!
//!   # ACO over cities read from a `{ "A": [x, y], ... }` file
//!   u-tsp aco --cities cities.json --ants 30 --iterations 200
//!
//!   # Add random cities to the layout and keep it for later runs
//!   u-tsp ga --random-cities 6 --save cities.json
//!
//! The report is printed to stdout as JSON. Set `RUST_LOG=debug` for
//! per-step logs on stderr.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use u_tsp::aco::AcoConfig;
use u_tsp::controller::{Algorithm, RunController, RunDetail, RunOutcome};
use u_tsp::ga::GaConfig;
use u_tsp::geometry::{CityMap, Point};
use u_tsp::random::{create_rng, entropy_rng};
use u_tsp::sa::SaConfig;
use u_tsp::tour::Tour;

#[derive(Parser, Debug)]
#[command(name = "u-tsp")]
#[command(about = "Heuristic TSP solver (GA with 2-opt + SA refinement, or ACO)")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// City file as JSON `{ "id": [x, y] }`. Defaults to the demo layout.
    #[arg(long, global = true)]
    cities: Option<PathBuf>,

    /// Add this many randomly placed cities before solving
    #[arg(long, global = true, default_value_t = 0)]
    random_cities: usize,

    /// Seed for every random decision
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Write the city layout used for the run to this file
    #[arg(long, global = true)]
    save: Option<PathBuf>,

    /// Log progress every N steps
    #[arg(long, global = true, default_value_t = 10)]
    log_every: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Genetic Algorithm, refined by 2-opt and Simulated Annealing
    Ga(GaArgs),
    /// Ant Colony Optimization
    Aco(AcoArgs),
}

#[derive(Args, Debug)]
struct GaArgs {
    #[arg(long, default_value_t = 100)]
    population: usize,

    #[arg(long, default_value_t = 150)]
    generations: usize,

    #[arg(long, default_value_t = 0.2)]
    mutation_rate: f64,

    /// Initial SA temperature
    #[arg(long, default_value_t = 100.0)]
    temperature: f64,

    /// SA cooling factor
    #[arg(long, default_value_t = 0.95)]
    cooling: f64,

    /// SA iteration budget
    #[arg(long, default_value_t = 100)]
    sa_iterations: usize,
}

#[derive(Args, Debug)]
struct AcoArgs {
    #[arg(long, default_value_t = 50)]
    ants: usize,

    #[arg(long, default_value_t = 100)]
    iterations: usize,

    #[arg(long, default_value_t = 0.1)]
    pheromone_init: f64,

    #[arg(long, default_value_t = 0.1)]
    evaporation_rate: f64,

    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    #[arg(long, default_value_t = 2.0)]
    beta: f64,

    /// Upper bound on pheromone levels
    #[arg(long)]
    pheromone_max: Option<f64>,
}

impl Command {
    fn algorithm(&self) -> Algorithm {
        match self {
            Command::Ga(args) => Algorithm::Genetic(
                GaConfig::default()
                    .with_population_size(args.population)
                    .with_generations(args.generations)
                    .with_mutation_rate(args.mutation_rate)
                    .with_annealing(
                        SaConfig::default()
                            .with_initial_temperature(args.temperature)
                            .with_temperature_reduction_rate(args.cooling)
                            .with_max_iterations(args.sa_iterations),
                    ),
            ),
            Command::Aco(args) => {
                let mut config = AcoConfig::default()
                    .with_num_ants(args.ants)
                    .with_iterations(args.iterations)
                    .with_pheromone_init(args.pheromone_init)
                    .with_evaporation_rate(args.evaporation_rate)
                    .with_alpha(args.alpha)
                    .with_beta(args.beta);
                config.pheromone_max = args.pheromone_max;
                Algorithm::AntColony(config)
            }
        }
    }
}

/// Tour as city names plus its length.
#[derive(Serialize)]
struct NamedTour<'a> {
    distance: f64,
    cities: Vec<&'a str>,
}

impl<'a> NamedTour<'a> {
    fn new(tour: &Tour, cities: &'a CityMap) -> Self {
        Self {
            distance: tour.distance(),
            cities: tour.names(cities),
        }
    }
}

#[derive(Serialize)]
struct GaStages<'a> {
    initial: NamedTour<'a>,
    raw: NamedTour<'a>,
    two_opt: Option<NamedTour<'a>>,
    refined: Option<NamedTour<'a>>,
}

#[derive(Serialize)]
struct Report<'a> {
    algorithm: String,
    state: String,
    steps: usize,
    best: Option<NamedTour<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stages: Option<GaStages<'a>>,
    series: &'a [f64],
}

impl<'a> Report<'a> {
    fn new(outcome: &'a RunOutcome, cities: &'a CityMap) -> Self {
        let stages = match &outcome.detail {
            RunDetail::Genetic(result) => Some(GaStages {
                initial: NamedTour::new(&result.initial_best, cities),
                raw: NamedTour::new(&result.raw_best, cities),
                two_opt: result.two_opt.as_ref().map(|t| NamedTour::new(t, cities)),
                refined: result.refined.as_ref().map(|t| NamedTour::new(t, cities)),
            }),
            RunDetail::AntColony(_) => None,
        };
        Self {
            algorithm: outcome.algorithm.to_string(),
            state: format!("{:?}", outcome.state).to_lowercase(),
            steps: outcome.steps,
            best: outcome.best.as_ref().map(|t| NamedTour::new(t, cities)),
            stages,
            series: &outcome.series,
        }
    }
}

fn load_cities(args: &CommonArgs) -> Result<CityMap, Box<dyn Error>> {
    let mut cities = match &args.cities {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => CityMap::demo(),
    };

    if args.random_cities > 0 {
        let mut rng = match args.seed {
            Some(seed) => create_rng(seed.wrapping_add(1)),
            None => entropy_rng(),
        };
        for _ in 0..args.random_cities {
            let id = cities.add_random_city(
                Point::new(0.0, 0.0),
                Point::new(1000.0, 1000.0),
                &mut rng,
            )?;
            info!(%id, "added random city");
        }
    }

    if let Some(path) = &args.save {
        fs::write(path, serde_json::to_string_pretty(&cities)?)?;
        info!(path = %path.display(), cities = cities.len(), "saved city layout");
    }
    Ok(cities)
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cities = load_cities(&cli.common)?;

    let mut controller = match cli.common.seed {
        Some(seed) => RunController::seeded(seed),
        None => RunController::new(),
    };
    controller.start(cli.command.algorithm(), &cities)?;

    let log_every = cli.common.log_every.max(1);
    let outcome = controller.run_to_end(|p| {
        if (p.step + 1) % log_every == 0 || p.step + 1 == p.total_steps {
            info!(
                step = p.step + 1,
                total = p.total_steps,
                current = p.current_best.distance(),
                best = p.best.distance(),
                "progress"
            );
        }
    })?;

    println!("{}", serde_json::to_string_pretty(&Report::new(&outcome, &cities))?);
    Ok(())
}

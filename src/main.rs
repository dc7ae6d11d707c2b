//! httpsample
//!
//! Runs the timeout scenarios against a loopback fixture and prints how the
//! client stack classified each outcome.
//!
//! ```text
//!   ┌──────────────┐   GET (bounded)    ┌─────────────────────┐
//!   │    Probe     │ ─────────────────▶ │   FixtureServer     │
//!   │ reqwest +    │                    │ sleep → headers →   │
//!   │ deadline     │ ◀───────────────── │ 123 → sleep → 45    │
//!   └──────┬───────┘   trickled body    └─────────────────────┘
//!          │
//!          ▼
//!   classify → ScenarioReport
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use httpsample::config::{load_config, ObservabilityConfig, SampleConfig};
use httpsample::observability::init_logging;
use httpsample::Scenario;

#[derive(Parser)]
#[command(name = "httpsample")]
#[command(about = "Observe how an HTTP client reports timeouts", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios (all when none are named)
    Run {
        scenarios: Vec<Scenario>,

        /// Runs per scenario, each with a fresh fixture and client
        #[arg(short, long, default_value_t = 1)]
        repeat: usize,

        /// Print one JSON report per line
        #[arg(long)]
        json: bool,
    },
    /// List scenarios with their timings
    List,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let logging = init_logging(&ObservabilityConfig::default())?;
    let config = match &cli.config {
        Some(path) => {
            let config = load_config(path)?;
            logging.apply(&config.observability)?;
            tracing::debug!(path = %path.display(), "Configuration loaded");
            config
        }
        None => SampleConfig::default(),
    };

    match cli.command {
        Commands::List => {
            for scenario in Scenario::ALL {
                let client = scenario.client_config(&config.timing);
                let plan = scenario.plan(&config.timing);
                println!(
                    "{:<24} head_delay={:?} split_at={:?} tail_delay={:?} timeout={:?} deadline={:?} expect={}",
                    scenario.name(),
                    plan.head_delay,
                    plan.split_at,
                    plan.tail_delay,
                    client.timeout,
                    client.deadline,
                    scenario.expected(),
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { scenarios, repeat, json } => {
            let scenarios = if scenarios.is_empty() {
                Scenario::ALL.to_vec()
            } else {
                scenarios
            };

            tracing::info!(scenarios = scenarios.len(), repeat, "Running scenarios");

            let mut mismatches = 0;
            for scenario in scenarios {
                for report in scenario.repeat(repeat, &config).await? {
                    if !report.matches_expectation() {
                        mismatches += 1;
                    }
                    if json {
                        println!("{}", serde_json::to_string(&report)?);
                    } else {
                        println!("{report}");
                    }
                }
            }

            if mismatches > 0 {
                tracing::warn!(mismatches, "Observed classifications differ from expectations");
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

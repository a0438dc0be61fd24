use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use heapimp::config::{load_config, EngineConfig};
use heapimp::{logging, scenarios, AllocPolicy, Machine};

#[derive(Parser)]
#[command(name = "heapimp")]
#[command(about = "Big-step and small-step evaluation of a heap language", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true, default_value = "heapimp.toml")]
    config: PathBuf,

    /// Allocation policy (overrides config file)
    #[arg(long, global = true, value_enum)]
    allocator: Option<AllocPolicy>,

    /// Step budget for each evaluator (overrides config file)
    #[arg(long, global = true)]
    fuel: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in scenarios
    List,

    /// Run a scenario through both evaluators
    Run {
        /// Scenario name
        name: String,
    },

    /// Print every small-step configuration of a scenario
    Trace {
        /// Scenario name
        name: String,
    },
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(allocator) = cli.allocator {
        config.allocator = allocator;
    }
    if let Some(fuel) = cli.fuel {
        config.big_step_fuel = fuel;
        config.small_step_fuel = fuel;
    }
    config.validate()?;

    match cli.command {
        Commands::List => {
            for scenario in scenarios::all() {
                println!("{:<20} {}", scenario.name, scenario.description);
            }
        }
        Commands::Run { name } => println!("{}", find(&name)?.report(&config)),
        Commands::Trace { name } => trace(find(&name)?, &config),
    }
    Ok(())
}

fn find(name: &str) -> Result<&'static scenarios::Scenario> {
    scenarios::find(name).ok_or_else(|| anyhow!("unknown scenario '{name}' (see `heapimp list`)"))
}

fn trace(scenario: &scenarios::Scenario, config: &EngineConfig) {
    let mut machine = Machine::new(scenario.command.clone(), scenario.state.clone(), config.allocator);
    println!("{:>5}  {}", machine.steps(), machine.config());
    while machine.steps() < config.small_step_fuel && machine.step() {
        println!("{:>5}  {}", machine.steps(), machine.config());
    }
    if !machine.is_terminal() {
        println!("stopped after {} steps", machine.steps());
    }
}

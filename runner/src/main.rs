//! `agilemind` CLI: run the waterfall agent pipeline on a software demand.

use std::path::{Path, PathBuf};

use agilemind::core::trace::TraceEntry;
use agilemind::dev::dev;
use agilemind::exit_codes;
use agilemind::io::collaborator::CommandCollaborator;
use agilemind::io::config::{DEFAULT_CONFIG_PATH, RunnerConfig, load_config, write_config};
use agilemind::io::output::OUTPUT_FILE_NAME;
use agilemind::logging;
use agilemind::pipeline::waterfall;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "agilemind",
    version,
    about = "Develop software from a demand with a pipeline of handoff agents"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline on a demand and write `output.txt` to the output directory.
    Dev {
        /// What the software should do. Passed to the first agent verbatim.
        #[arg(short, long)]
        demand: String,
        /// Directory to write the run output into (created if missing).
        #[arg(short, long)]
        output: PathBuf,
        /// Override `max_iterations` from the config.
        #[arg(long)]
        max_iterations: Option<u32>,
    },
    /// Print the pipeline's agents and their handoffs as JSON.
    Agents,
    /// Write a default config file.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Serialize)]
struct AgentSummary<'a> {
    name: &'a str,
    purpose: &'a str,
    handoffs: &'a [String],
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Dev {
            demand,
            output,
            max_iterations,
        } => cmd_dev(&cli.config, &demand, &output, max_iterations),
        Command::Agents => cmd_agents(),
        Command::Init { force } => cmd_init(&cli.config, force),
    }
}

fn cmd_dev(
    config_path: &Path,
    demand: &str,
    output: &Path,
    max_iterations: Option<u32>,
) -> Result<i32> {
    let mut cfg = load_config(config_path)?;
    if let Some(max_iterations) = max_iterations {
        cfg.max_iterations = max_iterations;
    }
    let collaborator = CommandCollaborator::from_config(&cfg)?;

    let mut turn = 0u32;
    let result = dev(demand, output, &collaborator, &cfg, |entry| {
        turn += 1;
        eprintln!("[turn {turn}] {}: {}", entry.agent, describe_turn(entry));
    })?;

    println!("{}", result.response);
    eprintln!("wrote {}", output.join(OUTPUT_FILE_NAME).display());
    if result.is_exhausted() {
        return Ok(exit_codes::EXHAUSTED);
    }
    Ok(exit_codes::OK)
}

fn describe_turn(entry: &TraceEntry) -> String {
    if let Some(target) = &entry.output.handoff {
        return format!("handoff -> {target}");
    }
    if !entry.output.tool_calls.is_empty() {
        return format!("{} tool call(s)", entry.output.tool_calls.len());
    }
    "final content".to_string()
}

fn cmd_agents() -> Result<i32> {
    let graph = waterfall()?;
    let summaries: Vec<AgentSummary<'_>> = graph
        .agents()
        .iter()
        .map(|agent| AgentSummary {
            name: agent.name(),
            purpose: agent.purpose(),
            handoffs: agent.handoffs(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&summaries).context("serialize agents")?;
    println!("{json}");
    Ok(exit_codes::OK)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if !force && config_path.exists() {
        eprintln!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
        return Ok(exit_codes::OK);
    }
    write_config(config_path, &RunnerConfig::default())?;
    eprintln!("wrote {}", config_path.display());
    Ok(exit_codes::OK)
}

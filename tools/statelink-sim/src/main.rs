// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! StateLink simulator CLI
//!
//! # Usage
//!
//! ```bash
//! # Run the built-in button round trip
//! statelink-sim run
//!
//! # Run a scenario file with protocol traces
//! statelink-sim --log-level trace run --config scenario.toml
//!
//! # Write an example scenario
//! statelink-sim gen-config --output scenario.toml
//!
//! # Check a scenario without running it
//! statelink-sim validate --config scenario.toml
//! ```

use clap::{Parser, Subcommand};
use statelink_sim::{run, ScenarioConfig, ScenarioReport};
use std::path::PathBuf;

/// StateLink simulator
#[derive(Parser, Debug)]
#[command(name = "statelink-sim")]
#[command(about = "StateLink simulator - actuator and gate nodes over an in-memory link")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario
    Run {
        /// Scenario file (built-in example when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate example scenario file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "scenario.toml")]
        output: PathBuf,
    },

    /// Validate a scenario file
    Validate {
        /// Scenario file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG still wins when set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .format_target(false)
        .init();

    match args.command {
        Commands::Run { config } => cmd_run(config),
        Commands::GenConfig { output } => cmd_gen_config(output),
        Commands::Validate { config } => cmd_validate(config),
    }
}

fn cmd_run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => ScenarioConfig::from_file(path)?,
        None => ScenarioConfig::example(),
    };

    println!("StateLink Simulator v{}", env!("CARGO_PKG_VERSION"));
    println!("=====================================");
    println!("Scenario: {} ({} steps)", config.name, config.steps.len());
    println!();

    let report = run(&config)?;
    print_report(&report);
    Ok(())
}

fn cmd_gen_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let toml_str = toml::to_string_pretty(&ScenarioConfig::example())?;

    // Add comments
    let content = format!(
        r#"# StateLink Simulator Scenario
# Generated by statelink-sim gen-config
#
# Actions: connect, disconnect, discover, press, release, expect_led
# Nodes:   actuator (responder), gate (initiator)

{}
"#,
        toml_str
    );

    std::fs::write(&output, content)?;
    println!("Generated scenario file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match ScenarioConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Scenario valid!");
            println!();
            println!("Scenario: {}", config.name);
            println!(
                "Link: first handle {}, {} namespace slot(s)",
                config.link.first_handle, config.link.namespace_capacity
            );
            println!("Steps: {}", config.steps.len());
            for (i, step) in config.steps.iter().enumerate() {
                println!("  [{}] {:?}", i, step);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Scenario invalid: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &ScenarioReport) {
    println!("--- Scenario Report ---");
    println!("  Steps:          {}", report.steps);
    println!("  Events:         {}", report.events);
    println!(
        "  Button events:  {} issued, {} skipped, {} ignored",
        report.issued, report.skipped, report.ignored
    );
    println!("  Actuator LED:   {}", if report.actuator_led { "on" } else { "off" });
    println!("  Gate LED:       {}", if report.gate_led { "on" } else { "off" });
}

//! NetLogo MCP Binary
//!
//! Serves the NetLogo workspace over stdio, or validates configuration and
//! lists models.

use anyhow::Context;
use clap::Parser;
use netlogo_mcp::logging::init_logging;
use netlogo_mcp::tooling::cli::{Cli, CliContext, Commands};
use std::process;

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = cli.load_config().context("Failed to load configuration")?;
    let context = CliContext::new(config, cli.config.clone());

    match cli.command() {
        Commands::Check => {
            let report = context.check();
            println!("{}", report.render());
            Ok(report.is_valid())
        }
        Commands::Models => {
            println!("{}", context.models().context("Failed to list models")?);
            Ok(true)
        }
        Commands::Serve => {
            init_logging(Some(&context.config().logging)).context("Failed to initialize logging")?;
            context
                .serve()
                .context("NetLogo MCP server stopped with an error")?;
            Ok(true)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

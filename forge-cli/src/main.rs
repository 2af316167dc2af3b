//! Forge CLI - Command line interface for the forge project generator
//!
//! Turns a one-line request into a generated project on disk.

mod commands;

use clap::{Parser, Subcommand};
use forge_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{RunArgs, TreeArgs};

/// Forge: plan, architect and code a project from a prompt
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model to use (overrides config and env)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Chat-completions base URL (overrides config and env)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Generate a project from a prompt
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Show the file tree of a generated project
    Tree(TreeArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let overrides = CliOverrides {
        model: cli.model.clone(),
        base_url: cli.base_url.clone(),
        ..Default::default()
    };

    match cli.command {
        Some(Commands::Version) => {
            println!("forge {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run(args)) => {
            args.execute(overrides).await?;
        }
        Some(Commands::Tree(args)) => {
            let config = Config::load_with_overrides(overrides)?;
            args.execute(&config)?;
        }
        Some(Commands::Config) => {
            let config = Config::load_with_overrides(overrides)?;
            print_config(&config);
        }
        None => {
            println!("Forge - generate a project from a prompt");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("Forge Configuration");
    println!("===================");
    println!();
    println!("LLM Settings:");
    println!("  base_url: {}", config.llm.base_url);
    println!("  model: {}", config.llm.model);
    println!("  api_key_env: {}", config.llm.api_key_env);
    println!(
        "  api_key: {}",
        if config.llm.resolve_api_key().is_ok() {
            "(set)"
        } else {
            "(missing)"
        }
    );
    println!(
        "  temperature: {}",
        config
            .llm
            .temperature
            .map(|t| t.to_string())
            .unwrap_or_else(|| "(default)".to_string())
    );
    println!("  timeout: {:?}", config.llm.timeout);
    println!("  max_tool_rounds: {}", config.llm.max_tool_rounds);
    println!(
        "  retry: {} (max {})",
        if config.llm.retry.enabled { "on" } else { "off" },
        config.llm.retry.max_retries
    );
    println!();
    println!("Pipeline Settings:");
    println!("  output_dir: {}", config.pipeline.output_dir.display());
    println!("  step_limit: {}", config.pipeline.step_limit);
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_flags() {
        let cli = Cli::parse_from([
            "forge",
            "--model",
            "m",
            "run",
            "a todo app",
            "--step-limit",
            "7",
            "--json",
        ]);
        assert_eq!(cli.model.as_deref(), Some("m"));
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.prompt, "a todo app");
                assert_eq!(args.step_limit, Some(7));
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

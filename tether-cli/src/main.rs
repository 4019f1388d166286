use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod ollama;

use commands::{run_ask, run_chat, run_clear};
use config::{CliConfig, CliConfigBuilder};
use error::{CliError, CliResult};

#[derive(Parser, Debug)]
#[command(name = "tether", version)]
#[command(about = "Chat with an agent that uses tools served over MCP")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Clear conversation history before starting
        #[arg(short, long)]
        clear: bool,
    },
    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,
    },
    /// Clear conversation history
    Clear,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let env_filter = if verbose {
        match "debug".parse() {
            Ok(directive) => env_filter.add_directive(directive),
            Err(_) => env_filter,
        }
    } else {
        env_filter
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

async fn run(cli: Cli, config: CliConfig) -> CliResult<()> {
    match cli.command {
        Commands::Chat { clear } => run_chat(&config, clear).await,
        Commands::Ask { question } => run_ask(&config, &question).await,
        Commands::Clear => run_clear(&config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = CliConfigBuilder::from_env().and_then(CliConfigBuilder::build);
    init_tracing(
        cli.verbose,
        config.as_ref().is_ok_and(|config| config.log_json),
    );

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(CliError::from(e)),
    };

    if let Err(e) = result {
        tracing::error!(code = e.exit_code(), error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["tether", "chat", "--clear"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { clear: true }));

        let cli = Cli::try_parse_from(["tether", "--verbose", "ask", "show all expenses"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Ask { ref question } if question == "show all expenses"));

        let cli = Cli::try_parse_from(["tether", "clear"]).unwrap();
        assert!(matches!(cli.command, Commands::Clear));

        assert!(Cli::try_parse_from(["tether", "ask"]).is_err());
    }
}

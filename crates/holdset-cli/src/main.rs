use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "holdset-cli", version, about = "Holdset CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session in the terminal
    Run,
    /// Replay a session on a virtual clock and print transition events
    Simulate {
        /// Measured hold length in seconds
        #[arg(long)]
        hold: i64,
        /// Skip work repetition REP at elapsed SECS, e.g. --skip 1:10 (repeatable)
        #[arg(long, value_parser = commands::simulate::parse_skip)]
        skip: Vec<commands::simulate::SkipSpec>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("holdset_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run => commands::run::run().await,
        Commands::Simulate { hold, skip } => commands::simulate::run(hold, &skip),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

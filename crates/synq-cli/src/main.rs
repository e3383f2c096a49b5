//! Synq Command-Line Interface
//!
//! The main entry point for the Synq quantum circuit transpiler.

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{compile, devices, version};

/// Synq - hardware-aware quantum circuit transpilation
#[derive(Parser)]
#[command(name = "synq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a quantum circuit for a target device
    Compile {
        /// Input file (SYNQASM or JSON)
        #[arg(short, long)]
        input: String,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,

        /// Target device profile (run `synq devices` to list them)
        #[arg(short, long, default_value = "simulator")]
        target: String,

        /// Layout strategy: trivial, dense, calibration
        #[arg(long, default_value = "trivial")]
        layout_strategy: String,

        /// Routing strategy: naive, basic, lookahead, sabre
        #[arg(long, default_value = "naive")]
        routing_strategy: String,

        /// Skip the post-routing unitary-equivalence check
        #[arg(long)]
        no_equivalence_check: bool,
    },

    /// List built-in device profiles
    Devices,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            target,
            layout_strategy,
            routing_strategy,
            no_equivalence_check,
        } => {
            compile::execute(
                &input,
                output.as_deref(),
                &target,
                &layout_strategy,
                &routing_strategy,
                !no_equivalence_check,
            )
            .await
        }

        Commands::Devices => devices::execute().await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

mod keystream;
mod stats;

use clap::{Parser, Subcommand};
use keystream::{analyze_keystream, KeystreamOptions};
use stats::{run as run_stats, StatsOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codebreaker")]
#[command(about = "Statistical analysis toolkit for ChaosVault keystreams and envelopes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the chaos keystream a password produces
    Keystream {
        /// Password whose seed drives the stream
        #[arg(long, env = "CHAOSVAULT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Number of keystream bytes to sample
        #[arg(long, default_value_t = 65536)]
        count: usize,
    },

    /// Run statistics on an envelope's ciphertext or a raw file
    Stats {
        /// File to analyze (envelope by default)
        file: PathBuf,

        /// Treat input as raw bytes instead of an envelope
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Keystream { password, count } => {
            let options = KeystreamOptions { password, count };
            let report = analyze_keystream(&options)?;
            print!("{}", report);
        }
        Commands::Stats { file, raw } => {
            let options = StatsOptions { raw };
            let report = run_stats(&file, &options)?;
            print!("{}", report);
        }
    }

    Ok(())
}

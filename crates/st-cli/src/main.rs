//! CLI frontend for the Spieltisch virtual tabletop.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "spieltisch",
    about = "Spieltisch: dice and shared session state for tabletop play",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll one group of command sets (e.g. 1d20 1d6 4dF coin)
    Roll {
        /// Command set ids, rolled in order
        #[arg(required = true)]
        ids: Vec<String>,

        /// Flat modifier added to the group
        #[arg(short, long, allow_hyphen_values = true)]
        modifier: Option<i32>,

        /// Label shown above the result
        #[arg(short, long)]
        label: Option<String>,

        /// Show values individually instead of a sum
        #[arg(long)]
        list: bool,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// List the registered command sets
    Dice,

    /// Simulate a table of players rolling through a few rounds
    Table {
        /// Number of players joining
        #[arg(short, long, default_value = "3")]
        players: usize,

        /// Number of NPCs the GM adds
        #[arg(short, long, default_value = "1")]
        npcs: usize,

        /// Number of rounds to play
        #[arg(short, long, default_value = "3")]
        rounds: u32,

        /// RNG seed for deterministic play
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Write the final session snapshot to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Display a saved session snapshot
    Show {
        /// Snapshot file (JSON)
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Roll {
            ids,
            modifier,
            label,
            list,
            seed,
        } => commands::roll::run(&ids, modifier, label.as_deref(), list, seed),
        Commands::Dice => commands::dice::run(),
        Commands::Table {
            players,
            npcs,
            rounds,
            seed,
            out,
        } => commands::table::run(players, npcs, rounds, seed, out.as_deref()),
        Commands::Show { file } => commands::show::run(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

//! Michi-Rust: A minimalistic Go engine.
//!
//! This is a Rust reimplementation of Michi, originally written in Python
//! and later ported to C.
//!
//! ## Usage
//!
//! - `michi-rust` - Run the MCTS demo
//! - `michi-rust gtp` - Start GTP server for GUI integration
//! - `michi-rust demo` - Run the MCTS demo

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use michi_rust::gtp::{EngineConfig, GtpEngine};
use michi_rust::mcts::TreeNode;
use michi_rust::position::{Position, str_coord};

/// Michi-Rust: A minimalistic Go MCTS engine
#[derive(Parser)]
#[command(name = "michi-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// PRNG seed. 0 seeds from system entropy.
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,

    /// Number of MCTS simulations per move.
    #[arg(long, global = true)]
    n_sims: Option<usize>,

    /// Path to the large-pattern probability file.
    #[arg(long, global = true)]
    patterns_prob: Option<PathBuf>,

    /// Path to the large-pattern spatial file.
    #[arg(long, global = true)]
    patterns_spat: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Run a simple demo of the engine
    Demo,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            seed: self.seed,
            ..EngineConfig::default()
        };
        if let Some(n_sims) = self.n_sims {
            config.n_sims = n_sims;
        }
        if let (Some(prob), Some(spat)) = (&self.patterns_prob, &self.patterns_spat) {
            config.pattern_files = Some((prob.clone(), spat.clone()));
        }
        config
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.engine_config();

    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::with_config(config);
            engine.run();
        }
        Some(Commands::Demo) | None => {
            run_demo(config);
        }
    }
}

fn run_demo(config: EngineConfig) {
    michi_rust::rng::seed(config.seed);

    println!("Michi-Rust: Minimalistic Go MCTS Engine\n");
    println!("Running {} MCTS simulations...", config.n_sims);

    let pos = Position::new();
    let mut root = TreeNode::new(&pos);
    let best_move = michi_rust::mcts::tree_search(&mut root, config.n_sims);
    println!("Best move: {}", str_coord(best_move));
    println!("Root winrate: {:.1}%", root.winrate() * 100.0);
}

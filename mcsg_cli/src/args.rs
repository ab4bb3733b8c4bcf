use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mcsg_common::Config;

/// Maximum-valuation common subgraph finder
#[derive(Parser, Debug)]
#[command(name = "mcsg")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the first graph (JSON document)
    #[arg(required_unless_present = "demo")]
    pub graph_g: Option<PathBuf>,
    /// Path to the second graph (JSON document)
    #[arg(required_unless_present = "demo")]
    pub graph_h: Option<PathBuf>,

    /// Generate a random demo pair with this many vertices instead of
    /// loading files
    #[arg(long, conflicts_with_all = ["graph_g", "graph_h"])]
    pub demo: Option<usize>,
    /// Edge probability for the demo pair
    #[arg(long, default_value_t = 0.5)]
    pub demo_density: f64,

    /// Scoring expression over `vertices` and `edges`
    #[arg(short = 's', long, default_value = "vertices + edges")]
    pub score: String,
    /// Search mode
    #[arg(short = 'm', long, value_enum, default_value = "exact")]
    pub mode: ModeArg,

    /// Also match leftover disconnected components
    #[arg(long, default_value_t = false)]
    pub analyze_disconnected: bool,
    /// Require every vertex of the first graph to be mapped
    #[arg(long, default_value_t = false)]
    pub find_exact_embedding: bool,

    /// Number of randomized trials (approximate mode)
    #[arg(short = 't', long, default_value_t = 1024)]
    pub trials: usize,
    /// Wall-clock budget in milliseconds (approximate mode)
    #[arg(long)]
    pub time_budget_ms: Option<u64>,
    /// Lookahead step budget for grouped trials (approximate mode)
    #[arg(long)]
    pub lookahead: Option<u32>,
    /// Base RNG seed for randomized trials
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

impl Args {
    /// Convert command-line arguments into internal configuration
    pub fn to_config(&self) -> Config {
        let mut builder = Config::builder()
            .analyze_disconnected(self.analyze_disconnected)
            .find_exact_embedding(self.find_exact_embedding)
            .trials(self.trials)
            .seed(self.seed);
        if let Some(ms) = self.time_budget_ms {
            builder = builder.time_budget(Duration::from_millis(ms));
        }
        if let Some(steps) = self.lookahead {
            builder = builder.lookahead(steps);
        }
        builder.build()
    }
}

/// Command-line selector for the search orchestrator
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ModeArg {
    /// Exhaustive parallel search over all seed pairs
    #[value(name = "exact")]
    Exact,
    /// Randomized greedy trials
    #[value(name = "approximate")]
    Approximate,
}

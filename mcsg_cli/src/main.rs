//! Maximum-valuation common subgraph CLI
//!
//! Loads two graph documents, parses the scoring expression, and runs the
//! selected search orchestrator, printing the best mapping found.

#[global_allocator]
/// Global allocator using jemalloc for better performance in parallel workloads.
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod args;

use std::fs;
use std::path::Path;

use clap::Parser;
use mcsg_common::{Graph, GraphDoc, ScoreExpr, generate};
use mcsg_search::McsFinder;
use tracing::info;

use args::{Args, ModeArg};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let (g, h) = input_graphs(&args)?;
    let valuation: ScoreExpr = args.score.parse()?;
    let config = args.to_config();

    info!(
        g_vertices = g.vertex_count(),
        g_edges = g.edge_count(),
        h_vertices = h.vertex_count(),
        h_edges = h.edge_count(),
        "graphs loaded"
    );

    let solution = match args.mode {
        ModeArg::Exact => McsFinder::search_exact(&g, &h, &valuation, &config)?,
        ModeArg::Approximate => McsFinder::search_approximate(&g, &h, &valuation, &config)?,
    };

    if solution.is_empty() {
        println!("no common subgraph found");
        return Ok(());
    }

    println!("score: {}", solution.score);
    println!("matched vertices: {}", solution.len());
    println!("matched edges: {}", solution.matched_edges);
    for (gv, hv) in &solution.forward {
        println!("  {gv} -> {hv}");
    }

    Ok(())
}

fn input_graphs(args: &Args) -> Result<(Graph, Graph), Box<dyn std::error::Error>> {
    if let Some(n) = args.demo {
        let g = generate::gnp(n, args.demo_density, args.seed);
        let h = generate::gnp(n, args.demo_density, args.seed.wrapping_add(1));
        return Ok((g, h));
    }
    let path_g = args.graph_g.as_deref().ok_or("missing first graph path")?;
    let path_h = args.graph_h.as_deref().ok_or("missing second graph path")?;
    Ok((load_graph(path_g)?, load_graph(path_h)?))
}

fn load_graph(path: &Path) -> Result<Graph, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let doc: GraphDoc = serde_json::from_str(&text)?;
    Ok(doc.into_graph()?)
}

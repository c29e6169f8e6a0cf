use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use deskroute_cli::batch::{load_queries, run_batch};
use deskroute_cli::report::path_label;
use deskroute_cli::{init_tracing, App, AppOptions};

#[derive(Parser)]
#[command(name = "deskroute-batch")]
#[command(about = "Run a routing regression over a JSON query file", long_about = None)]
struct Args {
    /// Query file (`{"test_queries": [{"query", "expected_intent"}]}`)
    #[arg(default_value = "tests/test_queries.json")]
    queries: PathBuf,

    /// Never call a model
    #[arg(long)]
    offline: bool,

    /// Score every answer with the configured evaluator
    #[arg(long)]
    evaluate: bool,

    /// Write misrouted queries to this JSON file
    #[arg(long, value_name = "PATH")]
    misclassifications: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let queries = load_queries(&args.queries)?;
    if queries.is_empty() { bail!("no test queries found in {}", args.queries.display()); }
    let app = App::load(&AppOptions { offline: args.offline, no_evaluate: !args.evaluate, ..AppOptions::default() })?;
    if args.evaluate && !app.has_evaluator() {
        warn!("--evaluate given but no evaluator is available; answers will not be scored");
    }
    let report = run_batch(&app, &queries);

    if let Some(path) = &args.misclassifications {
        let written = report.write_misclassifications(path)?;
        info!(path = %path.display(), misclassified = written, "wrote misclassifications");
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let total = report.total();
    let rule = "=".repeat(80);
    for (i, outcome) in report.outcomes.iter().enumerate() {
        println!("\n{}\n[{}/{}] Query: {}", rule, i + 1, total, outcome.query);
        if let Some(err) = &outcome.error {
            println!("  Error: {}", err);
            continue;
        }
        println!("  Intent: {}", outcome.reported.as_deref().unwrap_or("-"));
        let paths: Vec<&str> = outcome.paths.iter().map(|p| path_label(*p)).collect();
        println!("  Path:   {}", if paths.is_empty() { "-".to_string() } else { paths.join(", ") });
        if let (Some(expected), Some(matched)) = (&outcome.expected, outcome.matched) {
            println!("  Expected: {} -> Match: {}", expected, matched);
        }
        if args.evaluate {
            match &outcome.evaluation {
                Some(e) => {
                    println!("  Evaluation:");
                    println!("    Overall: {:.1}/10", e.overall_score);
                    println!("    Relevance: {:.0}/10", e.relevance);
                    println!("    Completeness: {:.0}/10", e.completeness);
                    println!("    Accuracy: {:.0}/10", e.accuracy);
                }
                None => println!("  Evaluation: (skipped or unavailable)"),
            }
        }
    }
    println!("\n{}\nTotal: {}, Matches: {}, Accuracy: {:.1}%", rule, total, report.matches(), report.accuracy());
    Ok(())
}

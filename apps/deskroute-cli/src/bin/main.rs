use anyhow::Result;
use clap::{Parser, Subcommand};

use deskroute_cli::report::{render_answer, render_info, AskOutput};
use deskroute_cli::{init_tracing, App, AppOptions};

#[derive(Parser)]
#[command(name = "deskroute")]
#[command(about = "Route HR / Tech / Finance questions to the right documentation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one query
    Ask {
        /// The query string
        query: String,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,

        /// Never call a model; use structured extraction only
        #[arg(long)]
        offline: bool,

        /// Passages retrieved per domain
        #[arg(long)]
        top_k: Option<usize>,

        /// Skip answer evaluation
        #[arg(long)]
        no_evaluate: bool,
    },
    /// Show loaded corpora and effective settings
    Info {
        /// Report without constructing model collaborators
        #[arg(long)]
        offline: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask { query, json, offline, top_k, no_evaluate } => {
            let app = App::load(&AppOptions { offline, top_k, no_evaluate })?;
            let response = app.orchestrator.answer(&query)?;
            let evaluation = app.evaluate(&response);
            if json {
                let output = AskOutput { response: &response, evaluation: evaluation.as_ref() };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{}", render_answer(&response, evaluation.as_ref()));
            }
        }
        Commands::Info { offline } => {
            let app = App::load(&AppOptions { offline, ..AppOptions::default() })?;
            print!("{}", render_info(&app));
        }
    }

    Ok(())
}

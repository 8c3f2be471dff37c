//! verdict CLI: reconcile predictions with expectations over a knowledge graph.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use verdict::config::ReasonerConfig;
use verdict::export::{self, ReasonerExport, RelationExport};
use verdict::ingest::GraphDocument;
use verdict::logic::{Conclusion, Truth};
use verdict::mode::Variant;
use verdict::reasoner::Reasoner;
use verdict::store;

#[derive(Parser)]
#[command(name = "verdict", version, about = "Evidence reconciliation over knowledge hierarchies")]
struct Cli {
    /// Reasoner configuration (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a graph document, reason over it and print the conclusions.
    Reason {
        /// Path to the JSON graph document.
        #[arg(long)]
        graph: PathBuf,

        /// Extra variant to enable (dispensable, specific). Repeatable.
        #[arg(long = "variant")]
        variants: Vec<String>,

        /// Save the reasoned state to this file.
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print the full state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the conclusions of a saved state.
    Report {
        /// State file written by `reason --save`.
        #[arg(long)]
        state: PathBuf,

        /// Print the full state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the graph of a saved state as a JSON graph document.
    Document {
        /// State file written by `reason --save`.
        #[arg(long)]
        state: PathBuf,
    },

    /// Print every relation feeding evidence into a concept.
    Subgraph {
        /// Path to the JSON graph document.
        #[arg(long)]
        graph: PathBuf,

        /// Concept name.
        #[arg(long)]
        concept: String,
    },

    /// Print the expectation x prediction conclusion table.
    Table,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ReasonerConfig::load(path)?,
        None => ReasonerConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.verbosity.filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Reason {
            graph,
            variants,
            save,
            json,
        } => {
            let mut reasoner = load_graph(&graph, &config)?;
            let variants = variants
                .iter()
                .map(|v| v.parse::<Variant>())
                .collect::<Result<Vec<_>, _>>()?;
            reasoner.add_variants(variants);

            let report = reasoner.reasoning();
            if let Some(path) = save {
                store::save(&reasoner, &path)?;
            }
            print_state(&export::export(&reasoner, Some(report)), json)?;
        }

        Commands::Report { state, json } => {
            let reasoner = store::load(&state)?;
            print_state(&export::export(&reasoner, None), json)?;
        }

        Commands::Document { state } => {
            let reasoner = store::load(&state)?;
            println!("{}", GraphDocument::from_reasoner(&reasoner).to_json()?);
        }

        Commands::Subgraph { graph, concept } => {
            let reasoner = load_graph(&graph, &config)?;
            let root = reasoner.id_of(&concept)?;
            let sub = reasoner.sub_graph(root)?;
            println!(
                "{concept}: {} contributors, {} relations, depth {}",
                sub.contributors(root).len(),
                sub.relations.len(),
                sub.depth_reached
            );
            for relation in &sub.relations {
                println!("  {}", RelationExport::resolve(&reasoner, relation));
            }
        }

        Commands::Table => print_table(),
    }

    Ok(())
}

fn load_graph(path: &Path, config: &ReasonerConfig) -> Result<Reasoner> {
    let document = GraphDocument::load(path)?;
    let mut reasoner = Reasoner::with_config(config);
    document.load_into(&mut reasoner)?;
    Ok(reasoner)
}

fn print_state(state: &ReasonerExport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state).into_diagnostic()?);
        return Ok(());
    }

    println!("mode: {}", state.mode);
    if let Some(report) = &state.report {
        println!(
            "prediction: {} visits over {} levels; expectation: {} visits over {} levels",
            report.prediction.visits,
            report.prediction.levels,
            report.expectation.visits,
            report.expectation.levels
        );
    }
    if state.prior_knowledges.is_empty() {
        println!("No prior knowledge.");
        return Ok(());
    }

    let width = state
        .prior_knowledges
        .iter()
        .map(|pk| pk.name.len())
        .max()
        .unwrap_or(0);
    println!();
    println!("{:<width$}  pred  exp   conclusion", "item");
    for pk in &state.prior_knowledges {
        println!(
            "{:<width$}  {:<4}  {:<4}  {}",
            pk.name, pk.prediction, pk.expectation, pk.label
        );
    }

    println!();
    for (conclusion, count) in &state.summary {
        println!("  {:<26} {count}", conclusion.label());
    }
    Ok(())
}

fn print_table() {
    println!("{:<10}{:<26}{:<26}{:<26}{}", "exp\\pred", "t", "f", "b", "n");
    for expectation in Truth::ALL {
        let row: Vec<String> = Truth::ALL
            .iter()
            .map(|prediction| format!("{:<26}", Conclusion::evaluate(expectation, *prediction).label()))
            .collect();
        println!("{:<10}{}", expectation.to_string(), row.concat().trim_end());
    }
}

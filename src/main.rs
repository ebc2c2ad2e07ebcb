use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docgraph::config::Config;
use docgraph::controller::Layout;
use docgraph::corpus::{self, Corpus};
use docgraph::graph::{Comparison, GraphBuilder};
use docgraph::io::ReaderRegistry;
use docgraph::keywords::{cluster_keywords, merge_counts};
use docgraph::{SimulationController, server};

/// Visualize document relationships as a force-directed keyword graph.
#[derive(Parser)]
#[command(name = "docgraph")]
#[command(version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Viewport overrides shared by layout commands
#[derive(Args, Debug, Clone, Default)]
struct ViewportArgs {
    /// Viewport width
    #[arg(long)]
    width: Option<f64>,

    /// Viewport height
    #[arg(long)]
    height: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top keywords of a document
    Keywords {
        /// Document to analyze
        input: PathBuf,

        /// Number of keywords to keep
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// Print keyword frequencies summed over all documents
    Frequencies {
        /// Documents or directories of documents
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Only print the most frequent keywords
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// Group similar keywords across all documents
    Clusters {
        /// Documents or directories of documents
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// List the keyword edges between documents
    Edges {
        /// Documents or directories of documents
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Run the layout and print node positions as JSON
    Layout {
        /// Documents or directories of documents
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Simulation ticks to run
        #[arg(short, long, default_value = "600")]
        steps: usize,

        #[command(flatten)]
        viewport: ViewportArgs,

        /// Print JSON on one line
        #[arg(long)]
        compact: bool,
    },
    /// Compare the keyword overlap of two documents
    Compare { a: PathBuf, b: PathBuf },
    /// Serve the live layout over HTTP, rebuilding when documents change
    Serve {
        /// Documents or directories of documents
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Port to run the server on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        #[command(flatten)]
        viewport: ViewportArgs,
    },
}

fn load_config(path: Option<&Path>, viewport: &ViewportArgs) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(width) = viewport.width {
        config.viewport.width = width;
    }
    if let Some(height) = viewport.height {
        config.viewport.height = height;
    }
    config.validate()?;
    Ok(config)
}

fn load_corpus(inputs: &[PathBuf], config: &Config) -> anyhow::Result<Corpus> {
    let registry = ReaderRegistry::with_defaults();
    let corpus = corpus::load_inputs(inputs, &registry, &config.keywords)?;
    for failure in &corpus.failures {
        eprintln!("skipped {}: {}", failure.path.display(), failure.error);
    }
    if corpus.is_empty() {
        tracing::warn!("no readable documents in input");
    }
    Ok(corpus)
}

fn keywords(input: &Path, top: Option<usize>, config: &Config) -> anyhow::Result<()> {
    let mut options = config.keywords.clone();
    if let Some(top) = top {
        options.top_n = top;
    }
    let text = ReaderRegistry::with_defaults()
        .read_text(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    for (keyword, count) in options.extract(&text) {
        println!("{count:>6}  {keyword}");
    }
    Ok(())
}

fn frequencies(inputs: &[PathBuf], top: Option<usize>, config: &Config) -> anyhow::Result<()> {
    let corpus = load_corpus(inputs, config)?;
    let totals = merge_counts(&corpus.profiles);
    for (keyword, count) in totals.iter().take(top.unwrap_or(usize::MAX)) {
        println!("{count:>6}  {keyword}");
    }
    Ok(())
}

fn clusters(inputs: &[PathBuf], config: &Config) -> anyhow::Result<()> {
    let corpus = load_corpus(inputs, config)?;
    for (key, members) in cluster_keywords(&merge_counts(&corpus.profiles)) {
        println!("{key}: {}", members.join(", "));
    }
    Ok(())
}

fn edges(inputs: &[PathBuf], config: &Config) -> anyhow::Result<()> {
    let corpus = load_corpus(inputs, config)?;
    let graph = GraphBuilder::new(config.simulation.edge_params()).build(&corpus.profiles);
    print!("{graph}");
    Ok(())
}

fn layout(inputs: &[PathBuf], steps: usize, compact: bool, config: &Config) -> anyhow::Result<()> {
    let corpus = load_corpus(inputs, config)?;

    let mut controller = SimulationController::new(config.layout_settings())
        .with_enabled(config.layout.simulation_enabled);
    controller.rebuild(&corpus.profiles);
    let ran = controller.run_ticks(steps);
    if let Layout::Force(sim) = controller.layout() {
        tracing::debug!(
            requested = steps,
            ran,
            energy = sim.kinetic_energy(),
            "layout finished"
        );
    }

    let snapshot = controller.snapshot();
    let json = if compact {
        serde_json::to_string(&snapshot)?
    } else {
        serde_json::to_string_pretty(&snapshot)?
    };
    println!("{json}");
    Ok(())
}

fn compare(a: &Path, b: &Path, config: &Config) -> anyhow::Result<()> {
    let corpus = load_corpus(&[a.to_path_buf(), b.to_path_buf()], config)?;
    let profile = |path: &Path| {
        let id = corpus::document_id(path);
        corpus
            .profile(&id)
            .with_context(|| format!("could not profile {}", path.display()))
    };
    let (first, second) = (profile(a)?, profile(b)?);
    if first.id == second.id {
        anyhow::bail!("compare needs two documents with distinct file names");
    }

    let comparison = Comparison::between(first, second);
    println!("{} <-> {}", comparison.a, comparison.b);
    println!("Similarity: {:.2}%", comparison.similarity);
    println!("Shared keywords: {}", comparison.shared_keywords.join(", "));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docgraph=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Keywords { input, top } => {
            let config = load_config(config_path, &ViewportArgs::default())?;
            keywords(&input, top, &config)?;
        }
        Commands::Frequencies { inputs, top } => {
            let config = load_config(config_path, &ViewportArgs::default())?;
            frequencies(&inputs, top, &config)?;
        }
        Commands::Clusters { inputs } => {
            let config = load_config(config_path, &ViewportArgs::default())?;
            clusters(&inputs, &config)?;
        }
        Commands::Edges { inputs } => {
            let config = load_config(config_path, &ViewportArgs::default())?;
            edges(&inputs, &config)?;
        }
        Commands::Layout {
            inputs,
            steps,
            viewport,
            compact,
        } => {
            let config = load_config(config_path, &viewport)?;
            layout(&inputs, steps, compact, &config)?;
        }
        Commands::Compare { a, b } => {
            let config = load_config(config_path, &ViewportArgs::default())?;
            compare(&a, &b, &config)?;
        }
        Commands::Serve {
            inputs,
            port,
            viewport,
        } => {
            let config = load_config(config_path, &viewport)?;
            server::serve(inputs, config, port).await?;
        }
    }

    Ok(())
}

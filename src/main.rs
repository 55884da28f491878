use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rag_significance::comparison::MergePolicy;
use rag_significance::embedding::{EmbeddingService, HashingEncoder};
use rag_significance::rendering::ReportFormat;
use rag_significance::stats::VarianceAssumption;
use rag_significance::{ReportConfig, ReportPipeline};
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "rag-significance")]
#[command(about = "Pairwise significance tests across RAG experiment configurations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and export the merged comparison report
    Compare {
        /// Configuration file path (overrides --preset)
        #[arg(short, long, env = "RAGSIG_CONFIG")]
        config: Option<PathBuf>,

        /// Built-in report preset
        #[arg(long, value_enum, default_value = "ragas")]
        preset: Preset,

        /// Observation table (CSV)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Print the report to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Policy when metrics disagree on comparison keys
        #[arg(long, value_enum)]
        policy: Option<MergePolicy>,

        /// Variance assumption of the two-group t-test
        #[arg(long, value_enum)]
        variance: Option<VarianceAssumption>,
    },

    /// Write a report configuration file
    Init {
        /// Output configuration file path
        #[arg(short, long, default_value = "report.toml")]
        output: PathBuf,

        /// Preset to start from
        #[arg(long, value_enum, default_value = "ragas")]
        preset: Preset,
    },

    /// Answer an embedding request read from a file or stdin
    Embed {
        /// Request JSON file; stdin when absent
        input: Option<PathBuf>,

        /// Vector dimension of the hashing encoder
        #[arg(short, long, default_value = "384")]
        dimension: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Ragas,
    Rouge,
}

impl Preset {
    fn config(self) -> ReportConfig {
        match self {
            Preset::Ragas => ReportConfig::ragas(),
            Preset::Rouge => ReportConfig::rouge(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    if cli.json_logs {
        rag_significance::utils::logging::init_json_logging(log_level)?;
    } else {
        rag_significance::init_with_logging(log_level)?;
    }

    match cli.command {
        Commands::Compare {
            config,
            preset,
            input,
            output,
            stdout,
            format,
            policy,
            variance,
        } => {
            let mut config = match config {
                Some(path) => ReportConfig::from_file(path)?,
                None => preset.config(),
            };

            // Override config with CLI arguments
            if let Some(input) = input {
                config = config.with_input(input);
            }
            if let Some(output) = output {
                config.output.path = Some(output);
            }
            if stdout {
                config.output.path = None;
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            if let Some(policy) = policy {
                config = config.with_merge_policy(policy);
            }
            if let Some(variance) = variance {
                config.analysis.variance = variance;
            }

            run_compare(config)?;
        }
        Commands::Init { output, preset } => {
            run_init(output, preset)?;
        }
        Commands::Embed { input, dimension } => {
            run_embed(input, dimension).await?;
        }
    }

    Ok(())
}

fn run_compare(config: ReportConfig) -> anyhow::Result<()> {
    let pipeline = ReportPipeline::new(config)?;
    let outcome = pipeline.run()?;

    if let Some(path) = &outcome.output {
        println!(
            "{} {} comparisons over {} metrics from {} rows written to {}",
            "✓".green(),
            outcome.report.len(),
            outcome.report.metrics.len(),
            outcome.rows_loaded,
            path.display()
        );
    }

    Ok(())
}

fn run_init(output: PathBuf, preset: Preset) -> anyhow::Result<()> {
    let config = preset.config();
    config.save_to_file(&output)?;

    println!("Created configuration file: {}", output.display());
    println!("Edit the input path, metrics and categories to match your experiment table.");

    Ok(())
}

async fn run_embed(input: Option<PathBuf>, dimension: usize) -> anyhow::Result<()> {
    let raw = match input {
        Some(path) => tokio::fs::read_to_string(&path).await?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let service = EmbeddingService::init(HashingEncoder::new(dimension)?).await?;
    let response = service.handle(&raw).await;
    if response.get("error").is_none() {
        info!("Embedding request handled");
    }
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

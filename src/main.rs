use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use answer_refine::llm::MAX_FORMATTING_EXAMPLES;
use answer_refine::{
    load_formatting_examples, AnswerReport, AnthropicClient, AnthropicConfig, HumanReport,
    Pipeline, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "answer-refine")]
#[command(author, version, about = "Grammar, adequacy and formatting pipeline for support answers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a proposed answer through the full pipeline
    Process {
        /// The user's original question
        #[arg(short, long)]
        query: String,

        #[command(flatten)]
        answer: AnswerSource,

        /// CSV file of formatting examples
        #[arg(short, long)]
        examples: PathBuf,

        /// Output file for the machine-readable report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for the human-readable report (text); printed to stdout if omitted
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Model to use (overrides ANTHROPIC_MODEL)
        #[arg(long)]
        model: Option<String>,

        /// Timeout for each model request, in seconds
        #[arg(long, default_value = "60")]
        timeout_secs: u64,

        /// Retries for each model request after a transient failure
        #[arg(long, default_value = "2")]
        max_retries: u32,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Load and list the formatting examples without calling the model
    Examples {
        /// CSV file of formatting examples
        #[arg(short, long)]
        examples: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct AnswerSource {
    /// The proposed answer text
    #[arg(short, long)]
    answer: Option<String>,

    /// File containing the proposed answer
    #[arg(long)]
    answer_file: Option<PathBuf>,
}

impl AnswerSource {
    fn read(self) -> Result<String> {
        match (self.answer, self.answer_file) {
            (Some(answer), _) => Ok(answer),
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read answer file: {:?}", path)),
            (None, None) => anyhow::bail!("either --answer or --answer-file is required"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            query,
            answer,
            examples,
            output,
            human_readable,
            model,
            timeout_secs,
            max_retries,
            verbose,
        } => {
            setup_logging(verbose);
            let mut config = AnthropicConfig::from_env()?
                .with_timeout(Duration::from_secs(timeout_secs))
                .with_max_retries(max_retries);
            if let Some(model) = model {
                config.model = model;
            }
            process(
                config,
                query,
                answer.read()?,
                examples,
                output,
                human_readable,
            )
            .await
        }
        Commands::Examples { examples, verbose } => {
            setup_logging(verbose);
            list_examples(examples)
        }
    }
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn process(
    config: AnthropicConfig,
    query: String,
    proposed_answer: String,
    examples_path: PathBuf,
    output: Option<PathBuf>,
    human_readable: Option<PathBuf>,
) -> Result<()> {
    info!("Loading formatting examples from {:?}", examples_path);
    let examples = load_formatting_examples(&examples_path)?;
    info!("Loaded {} formatting examples", examples.len());

    let client = AnthropicClient::new(config);
    let pipeline = Pipeline::new(Arc::new(client), examples, PipelineConfig::default());

    let run_id = Uuid::new_v4();
    let result = pipeline
        .run_with_id(run_id, &query, &proposed_answer)
        .await
        .context("Pipeline failed")?;

    if let Some(path) = &output {
        AnswerReport::new(run_id, pipeline.model_name(), &result).write_json(path)?;
        info!("Report written to {:?}", path);
    }

    let human = HumanReport::new(&result);
    match &human_readable {
        Some(path) => {
            human.write_file(path)?;
            info!("Human-readable report written to {:?}", path);
        }
        None => print!("{}", human.format()),
    }

    Ok(())
}

fn list_examples(path: PathBuf) -> Result<()> {
    info!("Loading formatting examples from {:?}", path);
    let examples = load_formatting_examples(&path)?;

    println!("Formatting Examples");
    println!("===================");
    println!("Total examples: {}", examples.len());
    println!(
        "Used as few-shot guidance: {}",
        examples.len().min(MAX_FORMATTING_EXAMPLES)
    );
    println!();

    for (i, example) in examples.iter().enumerate() {
        let marker = if i < MAX_FORMATTING_EXAMPLES { "*" } else { " " };
        println!("{} {}. {}", marker, i + 1, example.task);
        for line in example.explanation.lines() {
            println!("      {}", line);
        }
    }

    Ok(())
}

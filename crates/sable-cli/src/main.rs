//! sable - autonomous software-engineering agent CLI

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use sable_agent::{AgentConfig, Environment, GraphAgent, LinearAgent, LocalEnvironment};
use sable_ai::{ModelClient, OpenAiClient};

/// Which execution engine drives the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    /// Plain iteration loop (legacy behavior)
    Linear,
    /// Node-based workflow graph
    Graph,
}

/// sable - autonomous software-engineering agent
#[derive(Parser, Debug)]
#[command(name = "sable")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The task to solve
    task: String,

    /// Model to use
    #[arg(short, long, default_value = "gpt-4-turbo-preview")]
    model: String,

    /// API key (defaults to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL for an OpenAI-compatible endpoint (e.g. a LiteLLM proxy)
    #[arg(long)]
    base_url: Option<String>,

    /// Maximum iterations
    #[arg(long, default_value_t = 30)]
    max_iterations: u32,

    /// Working directory for tool execution
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Execution engine
    #[arg(long, value_enum, default_value_t = Engine::Graph)]
    engine: Engine,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    tracing::info!(engine = ?args.engine, model = %args.model, "starting sable");

    let api_key = match args.api_key {
        Some(key) => key,
        None => match std::env::var("OPENAI_API_KEY") {
            Ok(key) => key,
            Err(_) => bail!("API key is required. Set OPENAI_API_KEY or use --api-key"),
        },
    };

    let mut client = OpenAiClient::new(api_key, &args.model);
    if let Some(base_url) = args.base_url {
        client = client.with_base_url(base_url);
    }
    let client: Arc<dyn ModelClient> = Arc::new(client);

    let working_dir = match args.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to determine working directory")?,
    };
    let environment: Arc<dyn Environment> = Arc::new(LocalEnvironment::new(working_dir));

    let config = AgentConfig {
        max_iterations: args.max_iterations,
    };

    match args.engine {
        Engine::Linear => {
            let mut agent = LinearAgent::new(client, environment, config);
            agent.run(&args.task).await;
        }
        Engine::Graph => {
            let agent = GraphAgent::new(client, environment, config);
            let state = agent.run(&args.task).await;

            if state.is_complete {
                println!("Task completed successfully");
            } else if let Some(error) = state.error {
                bail!("Task failed: {}", error);
            } else {
                println!(
                    "Stopped after {} iteration(s) without completion",
                    state.iterations
                );
            }
        }
    }

    Ok(())
}

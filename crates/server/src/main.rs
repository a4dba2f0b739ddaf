//! weave-server: entity store, projects and Node2Vec over HTTP.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use weave_compute::{train, Node2VecParams};
use weave_core::Entity;
use weave_graph::example::example_graph;
use weave_graph::EntityStore;
use weave_server::AppState;

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "weave-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// Overrides HOST.
        #[arg(long)]
        host: Option<String>,
        /// Overrides PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Embed the built-in example graph and print the vectors.
    EmbedExample {
        #[arg(long, default_value_t = 4)]
        dimensions: usize,
        #[arg(long, default_value_t = 10)]
        walk_length: usize,
        #[arg(long, default_value_t = 5)]
        context_size: usize,
        #[arg(long, default_value_t = 10)]
        walks_per_node: usize,
        #[arg(long, default_value_t = 20)]
        iterations: usize,
        #[arg(long, env = "NODE2VEC_SEED")]
        seed: Option<u64>,
    },
}

fn load_config() -> weave_core::Config {
    weave_core::config::load_dotenv();
    weave_core::Config::from_env()
}

async fn serve(
    config: &weave_core::Config,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    std::fs::create_dir_all(&config.storage.unordered_data_dir).with_context(|| {
        format!(
            "failed to create {}",
            config.storage.unordered_data_dir.display()
        )
    })?;

    let state = Arc::new(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    weave_server::serve(listener, state, &config.server.cors_origin).await
}

fn embed_example(params: &Node2VecParams) -> anyhow::Result<()> {
    let mut store = EntityStore::new();
    let project = example_graph(&mut store);
    let num_nodes = project.vertex_count(&store)?;
    let edges = project.edges(&store)?;

    let outcome = train(num_nodes, &edges, params)?;
    if let Some(loss) = outcome.epoch_losses.last() {
        info!("final loss {:.6}", loss);
    }

    let names = match project
        .vertex_attributes
        .get("name")
        .map(|guid| store.get(guid))
        .transpose()?
    {
        Some(Entity::StringAttribute(attr)) => attr.values.clone(),
        _ => (0..num_nodes).map(|i| i.to_string()).collect(),
    };
    for (name, row) in names.iter().zip(&outcome.embedding) {
        let formatted: Vec<String> = row.iter().map(|x| format!("{:.4}", x)).collect();
        println!("{}\t[{}]", name, formatted.join(", "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = load_config();
    config.log_summary();

    match Cli::parse().command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => serve(&config, host, port).await,
        Command::EmbedExample {
            dimensions,
            walk_length,
            context_size,
            walks_per_node,
            iterations,
            seed,
        } => {
            let mut params = Node2VecParams::new(
                dimensions,
                walk_length,
                context_size,
                walks_per_node,
                iterations,
            );
            params.seed = seed;
            tokio::task::spawn_blocking(move || embed_example(&params)).await?
        }
    }
}

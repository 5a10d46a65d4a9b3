use clap::Parser;
use mockbird_server::admin_api::{AdminApiServer, AdminState};
use mockbird_server::config::Config;
use mockbird_server::repository::MockRepository;
use mockbird_server::resolver::MockResolver;
use mockbird_server::store::DefinitionStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Mockbird HTTP mock server
#[derive(Parser, Debug)]
#[command(name = "mockbird-server")]
#[command(author, version, about = "HTTP mock server answering registered request shapes")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "MOCKBIRD_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the definition data file
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Answer unknown mock requests with an auto-generated 200 definition
    #[arg(long)]
    auto_generate: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match args.config {
        Some(ref path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    if let Some(host) = args.host {
        config.listen.host = host;
    }
    if let Some(data_file) = args.data_file {
        config.data_file = data_file;
    }
    if args.auto_generate {
        config.auto_generate_unknown = true;
    }

    let store = DefinitionStore::open(&config.data_file)?;
    let repository = Arc::new(MockRepository::new(store));
    let resolver = MockResolver::new(
        Arc::clone(&repository),
        &config.mockup_path_prefix,
        config.auto_generate_unknown,
    );

    let addr: SocketAddr = format!("{}:{}", config.listen.host, config.listen.port).parse()?;
    let state = Arc::new(AdminState {
        repository,
        resolver,
    });
    let server = AdminApiServer::bind(addr, state).await?;
    server.run().await
}

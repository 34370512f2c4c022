//! polycrud server binary.

use std::sync::Arc;

use clap::Parser;
use polycrud_exec::{DriverConnector, Pipeline};
use polycrud_server::http::serve;
use polycrud_server::Cli;
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let dialect = cli.dialect()?;
    let catalog = cli.load_catalog()?;
    let pipeline = Arc::new(Pipeline::new(
        dialect,
        catalog,
        cli.connection_config(),
        Arc::new(DriverConnector::new()),
    ));

    let addr = cli.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, dialect = %dialect, "Server is running");

    serve(listener, pipeline, cli.max_body_bytes).await?;
    Ok(())
}

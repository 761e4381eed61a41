use std::{future::Future, io, net::SocketAddr, time::Duration};

use clap::Parser;
use protocol::{
    connection::Connection,
    processor::{Processor, SharedRegistry},
};
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::EnvFilter;

mod model;
mod protocol;
mod repository;

// pause before accepting again after a failure, e.g. when out of file descriptors
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Record management server for crew members, passengers and aircraft
#[derive(Parser, Debug)]
#[command(name = "aviation-crud")]
struct Args {
    /// Address the server listens on
    #[arg(short, long, env = "AVIATION_ADDR", default_value = "0.0.0.0:8080")]
    addr: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    // lives as long as the server, shared by every connection
    let registry = SharedRegistry::default();
    let processor = Processor::new(registry.clone());

    let listener = TcpListener::bind(&args.addr).await?;
    tracing::info!("server is listening on: {}", listener.local_addr()?);

    serve(listener, processor, tokio::signal::ctrl_c()).await?;

    tracing::info!("server stopped, final statistics: {}", registry.statistics());

    Ok(())
}

// accepts connections until the shutdown future resolves
async fn serve(
    listener: TcpListener,
    processor: Processor,
    shutdown: impl Future<Output = io::Result<()>>,
) -> io::Result<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((conn, addr)) => {
                    tokio::spawn(handle_connection(conn, addr, processor.clone()));
                }
                Err(err) => {
                    tracing::warn!("failed to accept a connection: {}", err);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
            },
            result = &mut shutdown => return result,
        }
    }
}

async fn handle_connection(stream: TcpStream, addr: SocketAddr, processor: Processor) {
    tracing::info!("client connected: {}", addr);

    if let Err(err) = Connection::new(stream).serve(&processor).await {
        tracing::warn!("connection with {} failed: {}", addr, err);
    }

    tracing::info!("client disconnected: {}", addr);
}

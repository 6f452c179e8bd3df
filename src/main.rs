use anyhow::{Context, Result};
use pdfdigest::{api, config, logging, processing::SummaryService};
use std::{io, net::Ipv4Addr, ops::RangeInclusive, sync::Arc};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();
    let config = config::load_config().context("failed to load configuration")?;
    let service = SummaryService::new(&config).context("failed to initialize summary service")?;
    let app = api::create_router(Arc::new(service));

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind HTTP listener")?;
    tracing::info!(port, "Serving upload page at http://0.0.0.0:{port}/");
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}

const FALLBACK_PORTS: RangeInclusive<u16> = 4100..=4199;

/// Bind the configured port, or the first free port of the fallback range.
async fn bind_listener(port: Option<u16>) -> io::Result<(TcpListener, u16)> {
    let candidates = match port {
        Some(port) => port..=port,
        None => FALLBACK_PORTS,
    };
    let scanning = port.is_none();

    for candidate in candidates {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, candidate)).await {
            Ok(listener) => return Ok((listener, candidate)),
            Err(err) if scanning && err.kind() == io::ErrorKind::AddrInUse => {
                tracing::debug!(port = candidate, "Port busy, trying the next one");
            }
            Err(err) => return Err(err),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AddrNotAvailable,
        format!(
            "no free port between {} and {}",
            FALLBACK_PORTS.start(),
            FALLBACK_PORTS.end()
        ),
    ))
}

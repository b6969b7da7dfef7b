use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use prometheus::Registry;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::telemetry::handle_metrics;

/// Serves the Prometheus `/metrics` endpoint on a dedicated port, until
/// `shutdown` is signalled.
pub async fn start_metrics_server(
    port: u16,
    registry: Registry,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let registry = Arc::new(registry);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(?addr, "metrics server listening");

    loop {
        tokio::select! {
            res = shutdown.changed() => {
                if res.is_ok() && *shutdown.borrow() {
                    info!("metrics server: shutdown signal received");
                    break;
                }
            }
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "metrics server: accept error");
                        continue;
                    }
                };

                let registry = registry.clone();
                tokio::spawn(async move {
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let registry = registry.clone();
                        async move {
                            if req.uri().path() == "/metrics" {
                                match handle_metrics(&registry) {
                                    Ok(resp) => Ok::<_, hyper::Error>(resp),
                                    Err(_) => Ok(not_found_like(hyper::StatusCode::INTERNAL_SERVER_ERROR)),
                                }
                            } else {
                                Ok(not_found_like(hyper::StatusCode::NOT_FOUND))
                            }
                        }
                    });

                    let builder = ConnBuilder::new(TokioExecutor::new());
                    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                        warn!(?peer, error = %e, "metrics server: serve_connection error");
                    }
                });
            }
        }
    }

    info!("metrics server stopped");
    Ok(())
}

fn not_found_like(
    status: hyper::StatusCode,
) -> hyper::Response<http_body_util::combinators::BoxBody<Bytes, hyper::Error>> {
    let body = Full::new(Bytes::from(status.to_string())).map_err(|never| match never {}).boxed();
    let mut resp = hyper::Response::new(body);
    *resp.status_mut() = status;
    resp
}

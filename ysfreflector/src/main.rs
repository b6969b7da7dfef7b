#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use ysfreflector_core::bridge::CallsignLookup;
use ysfreflector_core::config::load_from_path;
use ysfreflector_core::telemetry::{init_metrics, init_tracing, run_metrics_sink, start_metrics_server};
use ysfreflector_core::{Blocklist, PeerRegistry, Reflector, UdpServer};

#[derive(Parser, Debug)]
#[command(author, version, about = "YSF digital-voice UDP reflector")]
struct Cli {
    /// Path to configuration TOML file
    #[arg(short, long, value_name = "FILE", default_value = "config/reflector.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match load_from_path(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            // tracing isn't initialized yet; a config load failure has no level to log at.
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing(&cfg.logging.level, cfg.logging.show_target) {
        eprintln!("failed to initialize tracing: {err}");
        std::process::exit(1);
    }

    info!(?cli.config, server = %cfg.server.name, port = cfg.server.port, "configuration loaded");

    let blocklist =
        Arc::new(Blocklist::from_callsigns(ysfreflector_core::config::canonical_blocklist(&cfg)));

    let bind_addr = match format!("{}:{}", cfg.server.host, cfg.server.port).parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(%err, "invalid server.host/server.port");
            std::process::exit(1);
        }
    };
    let server = match UdpServer::bind(bind_addr).await {
        Ok(server) => Arc::new(server),
        Err(err) => {
            error!(%err, "failed to bind udp socket");
            std::process::exit(1);
        }
    };

    let (registry, events) = PeerRegistry::new(&cfg.server, blocklist);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let metrics = if cfg.telemetry.metrics_enabled {
        match init_metrics() {
            Ok((metrics, prom_registry)) => {
                tokio::spawn(run_metrics_sink(
                    metrics.clone(),
                    server.clone(),
                    events,
                    shutdown_rx.clone(),
                ));
                tokio::spawn(start_metrics_server(
                    cfg.telemetry.metrics_port,
                    prom_registry,
                    shutdown_rx.clone(),
                ));
                Some(metrics)
            }
            Err(err) => {
                error!(%err, "failed to initialize metrics, continuing without them");
                None
            }
        }
    } else {
        drop(events);
        None
    };

    if cfg.bridge.enabled {
        warn!(
            "bridge.enabled is set, but this binary ships no DmrNetwork implementation \
             (the DMR network-login handshake is out of scope); running reflector-only"
        );
    }
    // Constructed eagerly even without a wired bridge so that a future `DmrNetwork`
    // adapter can be dropped in without touching this file's config handling.
    let _lookup = cfg
        .bridge
        .lookup_file_path
        .as_ref()
        .map(|path| Arc::new(CallsignLookup::from_file(path)));

    let mut reflector = Reflector::new(
        server.clone(),
        registry.clone(),
        None,
        cfg.server.name.clone(),
        cfg.server.description.clone(),
    );
    if let Some(metrics) = &metrics {
        reflector = reflector.with_metrics(metrics.clone());
    }
    let reflector = Arc::new(reflector);

    tokio::spawn(registry.clone().start_cleanup(shutdown_rx.clone()));
    tokio::spawn(reflector.clone().start_stats_logger(shutdown_rx.clone()));

    let server_task = tokio::spawn({
        let server = server.clone();
        let reflector = reflector.clone() as Arc<dyn ysfreflector_core::PacketHandler>;
        let shutdown_rx = shutdown_rx.clone();
        async move {
            if let Err(err) = server.run(reflector, shutdown_rx).await {
                error!(%err, "udp server exited with error");
            }
        }
    });

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => error!(%err, "failed to listen for shutdown signal"),
    }
    let _ = shutdown_tx.send(true);
    let _ = server_task.await;

    ysfreflector_core::telemetry::shutdown_tracing();
}

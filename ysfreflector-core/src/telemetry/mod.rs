mod metrics;
mod metrics_handler;
mod metrics_sink;
mod server;
mod tracing;

pub use metrics::{init_metrics, Metrics};
pub use metrics_handler::handle_metrics;
pub use metrics_sink::run_metrics_sink;
pub use server::start_metrics_server;
pub use tracing::{init_tracing, shutdown_tracing};

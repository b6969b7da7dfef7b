use std::sync::Arc;

use opentelemetry::global;
use opentelemetry::metrics::{Counter, Meter, UpDownCounter};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;

/// Process-wide counters and gauges,
/// grounded on the teacher's `telemetry::metrics::Metrics`.
#[derive(Clone)]
pub struct Metrics {
    pub packets_received_total: Counter<u64>,
    pub packets_transmitted_total: Counter<u64>,
    pub bytes_received_total: Counter<u64>,
    pub bytes_transmitted_total: Counter<u64>,

    pub peers_active: UpDownCounter<i64>,
    pub peers_rejected_total: Counter<u64>,
    pub peers_blocked_total: Counter<u64>,

    pub talk_starts_total: Counter<u64>,
    pub talk_ends_total: Counter<u64>,
    pub events_dropped_total: Counter<u64>,

    pub bridge_calls_total: Counter<u64>,
    pub bridge_frames_dropped_total: Counter<u64>,
}

impl Metrics {
    fn new(meter: Meter) -> Self {
        Self {
            packets_received_total: meter
                .u64_counter("ysfreflector_packets_received_total")
                .with_description("Total number of UDP packets received, by type")
                .build(),
            packets_transmitted_total: meter
                .u64_counter("ysfreflector_packets_transmitted_total")
                .with_description("Total number of UDP packets transmitted, by type")
                .build(),
            bytes_received_total: meter
                .u64_counter("ysfreflector_bytes_received_total")
                .with_description("Total bytes received")
                .build(),
            bytes_transmitted_total: meter
                .u64_counter("ysfreflector_bytes_transmitted_total")
                .with_description("Total bytes transmitted")
                .build(),
            peers_active: meter
                .i64_up_down_counter("ysfreflector_peers_active")
                .with_description("Number of currently registered peers")
                .build(),
            peers_rejected_total: meter
                .u64_counter("ysfreflector_peers_rejected_total")
                .with_description("Total number of peer registrations rejected (capacity)")
                .build(),
            peers_blocked_total: meter
                .u64_counter("ysfreflector_peers_blocked_total")
                .with_description("Total number of peer registrations rejected (blocklist)")
                .build(),
            talk_starts_total: meter
                .u64_counter("ysfreflector_talk_starts_total")
                .with_description("Total number of talk-start transitions")
                .build(),
            talk_ends_total: meter
                .u64_counter("ysfreflector_talk_ends_total")
                .with_description("Total number of talk-end transitions")
                .build(),
            events_dropped_total: meter
                .u64_counter("ysfreflector_events_dropped_total")
                .with_description("Total number of events dropped due to channel overflow")
                .build(),
            bridge_calls_total: meter
                .u64_counter("ysfreflector_bridge_calls_total")
                .with_description("Total number of cross-mode bridge calls started")
                .build(),
            bridge_frames_dropped_total: meter
                .u64_counter("ysfreflector_bridge_frames_dropped_total")
                .with_description("Total number of bridge frames dropped on transcode error")
                .build(),
        }
    }
}

pub fn init_metrics() -> Result<(Arc<Metrics>, Registry), Box<dyn std::error::Error + Send + Sync>>
{
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter().with_registry(registry.clone()).build()?;

    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();

    global::set_meter_provider(meter_provider);

    let meter = global::meter("ysfreflector");
    let metrics = Arc::new(Metrics::new(meter));

    Ok((metrics, registry))
}

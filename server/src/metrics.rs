use crate::errors::Result;
use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref TICKS_TOTAL: IntCounter = IntCounter::with_opts(Opts::new(
        "dcim_ticks_total",
        "Total simulation ticks applied"
    ))
    .expect("valid metric definition");
    pub static ref TICK_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "dcim_tick_duration_seconds",
            "Time taken to mutate state and publish one tick"
        )
        .buckets(vec![
            0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25
        ])
    )
    .expect("valid metric definition");
    pub static ref VIEWERS_CONNECTED: Gauge = Gauge::with_opts(Opts::new(
        "dcim_viewers_connected",
        "Viewer sessions currently attached"
    ))
    .expect("valid metric definition");
    pub static ref VIEWER_JOINS_TOTAL: IntCounter = IntCounter::with_opts(Opts::new(
        "dcim_viewer_joins_total",
        "Total viewer sessions attached since startup"
    ))
    .expect("valid metric definition");
    pub static ref SNAPSHOTS_SENT_TOTAL: Counter = Counter::with_opts(Opts::new(
        "dcim_snapshots_sent_total",
        "Snapshots written to viewer sockets"
    ))
    .expect("valid metric definition");
    pub static ref SNAPSHOTS_DROPPED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "dcim_snapshots_dropped_total",
        "Tick snapshots skipped for a viewer whose queue was full"
    ))
    .expect("valid metric definition");
    pub static ref INVARIANT_VIOLATIONS_TOTAL: IntCounter = IntCounter::with_opts(Opts::new(
        "dcim_invariant_violations_total",
        "Ticks whose snapshot failed validation"
    ))
    .expect("valid metric definition");
}

pub fn init_metrics() -> Result<()> {
    REGISTRY.register(Box::new(TICKS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(TICK_DURATION_SECONDS.clone()))?;
    REGISTRY.register(Box::new(VIEWERS_CONNECTED.clone()))?;
    REGISTRY.register(Box::new(VIEWER_JOINS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SNAPSHOTS_SENT_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SNAPSHOTS_DROPPED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INVARIANT_VIOLATIONS_TOTAL.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

use shared::metrics_defs::{MetricDef, MetricType};

pub const RESPONSES_GENERATED: MetricDef = MetricDef {
    name: "responses.generated",
    metric_type: MetricType::Counter,
    description: "Responses sent. Tagged with endpoint, status_class.",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with endpoint.",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Number of requests currently being processed",
};

pub const ALL_METRICS: &[MetricDef] = &[RESPONSES_GENERATED, REQUEST_DURATION, REQUESTS_INFLIGHT];

#[derive(Debug, Clone)]
pub struct Metrics {
    upstream_fetches: prometheus::IntCounterVec,
    cache_requests: prometheus::IntCounterVec,
    last_update: prometheus::Gauge,
}

impl Metrics {
    pub fn new(registry: &prometheus::Registry) -> Result<Self, prometheus::Error> {
        let upstream_fetches = prometheus::IntCounterVec::new(
            prometheus::Opts::new(
                "upstream_fetches_total",
                "The number of requests made to the upstream stock endpoint",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(upstream_fetches.clone()))?;

        let cache_requests = prometheus::IntCounterVec::new(
            prometheus::Opts::new(
                "cache_requests_total",
                "The number of stock lookups, by whether they were served from the cache",
            ),
            &["result"],
        )?;
        registry.register(Box::new(cache_requests.clone()))?;

        let last_update =
            prometheus::Gauge::new("last_updated", "The Unix Timestamp of the last update")?;
        registry.register(Box::new(last_update.clone()))?;

        Ok(Self {
            upstream_fetches,
            cache_requests,
            last_update,
        })
    }

    pub fn record_fetch(&self, outcome: &str) {
        self.upstream_fetches.with_label_values(&[outcome]).inc();
    }

    pub fn record_cache(&self, result: &str) {
        self.cache_requests.with_label_values(&[result]).inc();
    }

    pub fn set_last_update(&self, unix_timestamp: i64) {
        self.last_update.set(unix_timestamp as f64);
    }

    pub fn fetches(&self, outcome: &str) -> u64 {
        self.upstream_fetches.with_label_values(&[outcome]).get()
    }

    pub fn cache_requests(&self, result: &str) -> u64 {
        self.cache_requests.with_label_values(&[result]).get()
    }
}

#[tracing::instrument(skip(registry))]
pub fn encode(registry: &prometheus::Registry) -> String {
    tracing::trace!("Getting metrics");

    let encoder = prometheus::TextEncoder::new();
    let metrics_families = registry.gather();
    match encoder.encode_to_string(&metrics_families) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Encoding Metrics {:?}", e);

            String::new()
        }
    }
}

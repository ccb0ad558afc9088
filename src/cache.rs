//! Single slot cache in front of the upstream fetch and normalization.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use arc_swap::ArcSwapOption;

use crate::{
    metrics::Metrics,
    stock::{self, seen::format_instant, FormatError, StockReport},
    upstream::{Fetch, FetchError},
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl RefreshError {
    pub fn code(&self) -> u16 {
        match self {
            Self::Fetch(e) => e.code(),
            Self::Format(e) => e.code(),
        }
    }

    /// Client facing text. Upstream status failures pass on upstream's own (truncated) body.
    pub fn message(&self) -> String {
        match self {
            Self::Fetch(FetchError::Status { message, .. }) => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    report: Arc<StockReport>,
    fetched: Instant,
}

pub struct StockCache<F> {
    fetcher: F,
    ttl: Duration,
    slot: ArcSwapOption<Entry>,
    /// Held while refreshing, so callers in the same window share one upstream fetch.
    refresh: tokio::sync::Mutex<()>,
    metrics: Metrics,
}

impl<F> StockCache<F>
where
    F: Fetch,
{
    pub fn new(fetcher: F, ttl: Duration, metrics: Metrics) -> Self {
        Self {
            fetcher,
            ttl,
            slot: ArcSwapOption::empty(),
            refresh: tokio::sync::Mutex::new(()),
            metrics,
        }
    }

    /// Returns the cached report if it is at most `ttl` old at `now`, otherwise fetches and
    /// normalizes a new one. A failed refresh leaves the current slot as it was.
    #[tracing::instrument(skip(self, now))]
    pub async fn get_or_refresh(&self, now: Instant) -> Result<Arc<StockReport>, RefreshError> {
        if let Some(report) = self.fresh(now) {
            tracing::debug!("Serving cached stocks");
            self.metrics.record_cache("hit");
            return Ok(report);
        }

        let _refreshing = self.refresh.lock().await;

        // Someone else may have refreshed while we were waiting
        if let Some(report) = self.fresh(now) {
            tracing::debug!("Serving stocks refreshed by concurrent request");
            self.metrics.record_cache("hit");
            return Ok(report);
        }

        match self.refresh_slot(now).await {
            Ok(report) => {
                self.metrics.record_cache("refresh");
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Refreshing stocks {:?}", e);
                self.metrics.record_cache("failed");
                Err(e)
            }
        }
    }

    async fn refresh_slot(&self, now: Instant) -> Result<Arc<StockReport>, RefreshError> {
        tracing::info!("Loading Data");

        let raw = self.fetcher.fetch().await.map_err(|e| {
            self.metrics.record_fetch(e.outcome());
            e
        })?;
        self.metrics.record_fetch("ok");

        let mut report = stock::normalize(&raw)?;

        let fetched_at = chrono::Utc::now();
        report.fetched_at = Some(format_instant(fetched_at));

        let report = Arc::new(report);
        self.slot.store(Some(Arc::new(Entry {
            report: report.clone(),
            fetched: now,
        })));
        self.metrics.set_last_update(fetched_at.timestamp());

        Ok(report)
    }

    fn fresh(&self, now: Instant) -> Option<Arc<StockReport>> {
        let entry = self.slot.load_full()?;
        if now.saturating_duration_since(entry.fetched) > self.ttl {
            return None;
        }

        Some(entry.report.clone())
    }
}

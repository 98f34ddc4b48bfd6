use crate::core::config::AppConfig;
use crate::core::payload::{FedSection, Meta, SCHEMA_VERSION, TSP_NOTE, TspSection};
use crate::core::{Fetcher, Payload};
use crate::providers::{FredProvider, HttpFetcher, MonthYear, TspProvider};
use crate::store::{PersistOutcome, SnapshotStore};
use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Sequential fetch, parse, match and persist for one run.
pub struct Pipeline {
    tsp: TspProvider,
    fred: FredProvider,
    store: SnapshotStore,
    producer: String,
}

impl Pipeline {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let fetcher =
            Arc::new(HttpFetcher::new(&config.http).context("Failed to build HTTP client")?);
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: &AppConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        Ok(Pipeline {
            tsp: TspProvider::new(config.tsp_base_url(), Arc::clone(&fetcher)),
            fred: FredProvider::new(config.fred_base_url(), fetcher),
            store: SnapshotStore::new(config.data_dir()?),
            producer: config.producer.clone(),
        })
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Builds the payload for `now`. With `period` set, only that month's
    /// page is consulted.
    pub async fn build_payload(
        &self,
        now: DateTime<Utc>,
        period: Option<MonthYear>,
    ) -> Result<Payload> {
        let quote = match period {
            Some(period) => self.tsp.parse_month(period).await?,
            None => self.tsp.parse_latest(now).await?,
        };
        info!(trade_date = %quote.trade_date, "Resolved TSP trade date");

        let rates = self
            .fred
            .rates_for_date(quote.trade_date)
            .await
            .with_context(|| format!("Failed to fetch Fed rates for {}", quote.trade_date))?;

        Ok(Payload {
            schema_version: Some(SCHEMA_VERSION.to_string()),
            as_of_utc: now.trunc_subsecs(0),
            trade_date: quote.trade_date,
            fed: FedSection {
                rates,
                source: self.fred.source_urls(),
            },
            tsp: TspSection {
                funds: quote.funds,
                source: self.tsp.source_url(),
                note: TSP_NOTE.to_string(),
            },
            meta: Some(Meta {
                producer: self.producer.clone(),
            }),
        })
    }

    /// Runs the whole pipeline. Nothing is written unless the payload was
    /// built completely.
    pub async fn run(&self, now: DateTime<Utc>, period: Option<MonthYear>) -> Result<PersistOutcome> {
        self.store.ensure_layout()?;
        let payload = self.build_payload(now, period).await?;
        debug!(?payload, "Built payload");
        let outcome = self.store.persist(&payload)?;
        info!(%outcome, "Persisted payload");
        Ok(outcome)
    }
}

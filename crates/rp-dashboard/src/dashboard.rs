//! Dashboard state: filter discovery, panel snapshots and the refresh loop

use crate::cache::QueryCache;
use crate::error::DashboardResult;
use crate::filters::{DateRange, FilterOptions, Filters};
use crate::panels::Panel;
use chrono::{DateTime, NaiveDate, Utc};
use rp_core::SchemaConfig;
use rp_db::{Database, QueryResult};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;

/// Rows behind one panel
#[derive(Debug, Clone, Serialize)]
pub struct PanelData {
    #[serde(rename = "id")]
    pub panel: Panel,
    pub title: &'static str,
    #[serde(serialize_with = "serialize_result")]
    pub result: Arc<QueryResult>,
}

fn serialize_result<S: Serializer>(result: &Arc<QueryResult>, s: S) -> Result<S::Ok, S::Error> {
    result.as_ref().serialize(s)
}

/// Every panel evaluated for one filter selection
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub filters: Filters,
    pub panels: Vec<PanelData>,
}

impl DashboardSnapshot {
    pub fn panel(&self, panel: Panel) -> Option<&PanelData> {
        self.panels.iter().find(|p| p.panel == panel)
    }
}

/// Dashboard over the mart layer's fact table
pub struct Dashboard<'a> {
    db: &'a dyn Database,
    cache: QueryCache,
    fact_relation: String,
}

impl<'a> Dashboard<'a> {
    /// Dashboard reading `<analytics>.fact_sales`
    pub fn new(db: &'a dyn Database, schemas: &SchemaConfig, cache: QueryCache) -> Self {
        Self {
            db,
            cache,
            fact_relation: format!("{}.fact_sales", schemas.analytics),
        }
    }

    pub fn fact_relation(&self) -> &str {
        &self.fact_relation
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Latest transaction date with sales, if any
    pub async fn latest_sale_date(&self) -> Option<NaiveDate> {
        let sql = format!(
            "SELECT MAX(transaction_date) AS latest FROM {}",
            self.fact_relation
        );
        let result = self.cache.query(self.db, &sql).await;
        result
            .get(0, "latest")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<NaiveDate>().ok())
    }

    /// Filters with the default window ending at the latest sale (or `today`
    /// when there are none) and nothing else selected
    pub async fn default_filters(&self, today: NaiveDate) -> Filters {
        let end = self.latest_sale_date().await.unwrap_or(today);
        Filters::new(DateRange::ending_at(end))
    }

    /// Distinct values for each multi-select filter
    pub async fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            store_types: self.distinct("store_type").await,
            categories: self.distinct("category").await,
            customer_segments: self.distinct("customer_segment").await,
        }
    }

    async fn distinct(&self, column: &str) -> Vec<String> {
        let sql = FilterOptions::distinct_sql(&self.fact_relation, column);
        let result = self.cache.query(self.db, &sql).await;
        result
            .column_values(column)
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    /// Run (or read from cache) every panel query
    pub async fn snapshot(&self, filters: &Filters) -> DashboardSnapshot {
        let mut panels = Vec::with_capacity(Panel::ALL.len());
        for panel in Panel::ALL {
            let sql = panel.sql(&self.fact_relation, filters);
            let result = self.cache.query(self.db, &sql).await;
            panels.push(PanelData {
                panel,
                title: panel.title(),
                result,
            });
        }
        DashboardSnapshot {
            generated_at: Utc::now(),
            filters: filters.clone(),
            panels,
        }
    }

    /// Re-render every `every` until Ctrl-C
    pub async fn watch<F>(&self, filters: &Filters, every: Duration, mut render: F) -> DashboardResult<()>
    where
        F: FnMut(&DashboardSnapshot) -> DashboardResult<()>,
    {
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = self.snapshot(filters).await;
                    render(&snapshot)?;
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Stopping dashboard refresh");
                    return Ok(());
                }
            }
        }
    }
}

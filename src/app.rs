use log::{info, warn};
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::labels::{DIET_CODES, diet_label};
use crate::loader::{self, DataLoadError};
use crate::observation::{Metric, Scenario};
use crate::query::{AggregateTable, query};
use crate::saving;
use crate::session::SessionResults;
use crate::table::UnifiedTable;
use crate::treemap::{Treemap, TreemapOptions, build_treemap};

/// Current state of the four dashboard inputs
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub scenario: Scenario,
    pub size_metric: Metric,
    pub color_metric: Metric,
    pub keyword: Option<String>,
}

impl Selection {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Selection {
            scenario: config.scenario,
            size_metric: config.size_metric,
            color_metric: config.color_metric,
            keyword: None,
        }
    }
}

/// Log diet codes the chart cannot label and labelled codes absent from the
/// data. Returns the unlabelled codes.
pub fn check_diet_codes(table: &UnifiedTable) -> Vec<&str> {
    let present = table.diet_groups();
    let unknown: Vec<&str> = present
        .iter()
        .copied()
        .filter(|code| diet_label(code).is_none())
        .collect();
    if !unknown.is_empty() {
        warn!("diet codes without a display label: {}", unknown.join(", "));
    }
    for code in DIET_CODES {
        if !present.contains(&code) {
            info!("no rows for diet code '{}'", code);
        }
    }
    unknown
}

/// The loaded dataset plus the per-session latest results
pub struct Dashboard {
    table: Arc<UnifiedTable>,
    results: SessionResults,
    options: TreemapOptions,
}

impl Dashboard {
    pub fn new(table: Arc<UnifiedTable>) -> Self {
        Dashboard {
            table,
            results: SessionResults::new(),
            options: TreemapOptions::default(),
        }
    }

    /// Load the dataset once for the lifetime of the process.
    ///
    /// With a snapshot configured, a readable snapshot is used instead of the
    /// CSV files, and a fresh CSV load refreshes it. Snapshot problems are
    /// logged and never fatal; CSV problems are.
    pub fn startup(config: &DashboardConfig) -> Result<Self, DataLoadError> {
        if let Some(path) = &config.snapshot {
            if path.exists() {
                match saving::load_table(path) {
                    Ok(table) => {
                        check_diet_codes(&table);
                        return Ok(Dashboard::new(Arc::new(table)));
                    }
                    Err(e) => warn!("ignoring snapshot {}: {}", path.display(), e),
                }
            }
        }

        let table = loader::load_dir(&config.data_dir)?;
        info!(
            "dataset ready: {} rows ({} per 1000 kcal, {} per capita)",
            table.len(),
            table.count(Scenario::Per1000Kcal),
            table.count(Scenario::PerCapita)
        );
        check_diet_codes(&table);

        if let Some(path) = &config.snapshot {
            if let Err(e) = saving::save_table(&table, path) {
                warn!("could not write snapshot {}: {}", path.display(), e);
            }
        }

        Ok(Dashboard::new(Arc::new(table)))
    }

    pub fn table(&self) -> &Arc<UnifiedTable> {
        &self.table
    }

    pub fn options(&self) -> &TreemapOptions {
        &self.options
    }

    pub fn query(&self, selection: &Selection) -> AggregateTable {
        query(
            &self.table,
            selection.scenario,
            selection.size_metric,
            selection.color_metric,
            selection.keyword.as_deref(),
        )
    }

    /// Run a query for `session` and record it as that session's latest
    /// result, unless a newer query has already published.
    pub fn refresh(&self, session: &str, selection: &Selection) -> Option<Arc<AggregateTable>> {
        let ticket = self.results.begin(session);
        let result = self.query(selection);
        self.results.publish(&ticket, result);
        self.results.latest(session)
    }

    /// Treemap for the latest result of `session`
    pub fn chart(&self, session: &str) -> Option<Treemap> {
        self.results
            .latest(session)
            .map(|result| build_treemap(&result, &self.options))
    }

    pub fn end_session(&self, session: &str) {
        self.results.forget(session);
    }
}

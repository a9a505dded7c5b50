use crate::labels::diet_label;
use crate::observation::{METRIC_COUNT, Metric, Observation, Scenario};
use crate::table::UnifiedTable;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

/// Mean-reduced summary over one (diet, age, sex) group.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AggregateRow {
    pub diet_group: String,
    pub age_group: String,
    pub sex: String,
    /// `None` when the diet code has no display label
    pub diet_label: Option<&'static str>,
    pub metrics: [f64; METRIC_COUNT],
    /// Number of observations averaged into this row
    pub count: usize,
}

impl AggregateRow {
    pub fn value(&self, metric: Metric) -> f64 {
        self.metrics[metric.index()]
    }

    /// Display label, blank for unmapped diet codes
    pub fn label(&self) -> &str {
        self.diet_label.unwrap_or("")
    }
}

/// Result of one query, together with the selections that produced it.
///
/// Rows are sorted by (diet_group, age_group, sex) and unique on that key.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AggregateTable {
    pub scenario: Scenario,
    pub size_metric: Metric,
    pub color_metric: Metric,
    pub keyword: Option<String>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Observed (min, max) of the color metric over the result rows.
    /// `None` when there are no rows.
    pub fn color_range(&self) -> Option<(f64, f64)> {
        let metric = self.color_metric;
        self.rows.iter().map(|r| r.value(metric)).fold(None, |acc, v| {
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            })
        })
    }
}

/// Invalid selector names reaching the query boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    UnknownScenario(String),
    UnknownMetric(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::UnknownScenario(s) => write!(f, "unknown scenario '{}'", s),
            QueryError::UnknownMetric(m) => write!(f, "unknown metric '{}'", m),
        }
    }
}

impl Error for QueryError {}

#[derive(Default)]
struct Accumulator {
    sums: [f64; METRIC_COUNT],
    count: usize,
}

impl Accumulator {
    fn add(&mut self, row: &Observation) {
        for (sum, v) in self.sums.iter_mut().zip(row.metrics.iter()) {
            *sum += v;
        }
        self.count += 1;
    }

    fn means(&self) -> [f64; METRIC_COUNT] {
        let n = self.count as f64;
        self.sums.map(|s| s / n)
    }
}

/// Normalize the search box content. Empty and whitespace-only input means
/// "no filter"; anything else is lowercased as typed, spaces included.
pub fn normalize_keyword(keyword: Option<&str>) -> Option<String> {
    keyword
        .filter(|k| !k.trim().is_empty())
        .map(str::to_lowercase)
}

/// Rows of `scenario` that pass the keyword filter, before aggregation.
pub fn filter_rows<'a>(
    table: &'a UnifiedTable,
    scenario: Scenario,
    keyword: Option<&str>,
) -> Vec<&'a Observation> {
    let needle = normalize_keyword(keyword);
    select_rows(table, scenario, needle.as_deref())
}

// `needle` is already normalized
fn select_rows<'a>(
    table: &'a UnifiedTable,
    scenario: Scenario,
    needle: Option<&str>,
) -> Vec<&'a Observation> {
    table
        .scenario_rows(scenario)
        .filter(|row| needle.is_none_or(|n| row.matches_keyword(n)))
        .collect()
}

/// Filter the base table and reduce it to one mean row per
/// (diet_group, age_group, sex).
///
/// # Arguments
/// * `table` - The merged dataset
/// * `scenario` - Only rows tagged with this scenario are considered
/// * `size_metric` - Metric the chart sizes cells by
/// * `color_metric` - Metric the chart colors cells by; its range is exposed
///   through [`AggregateTable::color_range`]
/// * `keyword` - Optional case-insensitive substring matched against diet,
///   age and sex; a row is kept if any of the three contains it
///
/// # Examples
/// ```
/// use footprint::observation::{Metric, Scenario};
/// use footprint::query::query;
/// use footprint::table::UnifiedTable;
///
/// let table = UnifiedTable::default();
/// let result = query(&table, Scenario::PerCapita, Metric::Ghgs, Metric::Land, None);
/// assert!(result.is_empty());
/// assert_eq!(result.color_range(), None);
/// ```
pub fn query(
    table: &UnifiedTable,
    scenario: Scenario,
    size_metric: Metric,
    color_metric: Metric,
    keyword: Option<&str>,
) -> AggregateTable {
    let keyword = normalize_keyword(keyword);
    let filtered = select_rows(table, scenario, keyword.as_deref());

    let mut groups: BTreeMap<(String, String, String), Accumulator> = BTreeMap::new();
    for row in &filtered {
        groups.entry(row.group_key()).or_default().add(row);
    }

    let rows: Vec<AggregateRow> = groups
        .into_iter()
        .map(|((diet_group, age_group, sex), acc)| {
            let label = diet_label(&diet_group);
            if label.is_none() {
                warn!("no display label for diet code '{}'", diet_group);
            }
            AggregateRow {
                diet_label: label,
                metrics: acc.means(),
                count: acc.count,
                diet_group,
                age_group,
                sex,
            }
        })
        .collect();

    debug!(
        "query scenario='{}' keyword={:?}: {} rows -> {} groups",
        scenario,
        keyword,
        filtered.len(),
        rows.len()
    );

    AggregateTable {
        scenario,
        size_metric,
        color_metric,
        keyword,
        rows,
    }
}

/// [`query`] with selectors given by name, as they arrive from a UI.
/// Unknown names are rejected rather than defaulted.
pub fn query_named(
    table: &UnifiedTable,
    scenario: &str,
    size_metric: &str,
    color_metric: &str,
    keyword: Option<&str>,
) -> Result<AggregateTable, QueryError> {
    let scenario = Scenario::from_label(scenario)
        .ok_or_else(|| QueryError::UnknownScenario(scenario.to_string()))?;
    let size = Metric::from_column(size_metric)
        .ok_or_else(|| QueryError::UnknownMetric(size_metric.to_string()))?;
    let color = Metric::from_column(color_metric)
        .ok_or_else(|| QueryError::UnknownMetric(color_metric.to_string()))?;
    Ok(query(table, scenario, size, color, keyword))
}

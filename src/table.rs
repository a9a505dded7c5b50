use crate::observation::{Observation, Scenario};
use serde::{Deserialize, Serialize};

/// The merged dataset: every row of both input files, each tagged with its
/// scenario. Built once at startup and only ever read afterwards; share it
/// behind an `Arc` rather than cloning.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct UnifiedTable {
    rows: Vec<Observation>,
}

impl UnifiedTable {
    pub fn new(rows: Vec<Observation>) -> Self {
        UnifiedTable { rows }
    }

    /// Concatenate row sets in the order given. Nothing is deduplicated.
    pub fn concat(parts: Vec<Vec<Observation>>) -> Self {
        let total = parts.iter().map(Vec::len).sum();
        let mut rows = Vec::with_capacity(total);
        for part in parts {
            rows.extend(part);
        }
        UnifiedTable { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn scenario_rows(&self, scenario: Scenario) -> impl Iterator<Item = &Observation> {
        self.rows.iter().filter(move |r| r.scenario == scenario)
    }

    pub fn count(&self, scenario: Scenario) -> usize {
        self.scenario_rows(scenario).count()
    }

    /// Distinct diet codes in first-seen order
    pub fn diet_groups(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.diet_group.as_str()) {
                seen.push(&row.diet_group);
            }
        }
        seen
    }
}

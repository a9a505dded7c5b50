use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement normalization a row belongs to.
///
/// Each of the two input files carries one scenario; the tag is assigned at load
/// time and never changes afterwards.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scenario {
    /// Results adjusted to 1000 kcal of intake
    #[serde(rename = "Per 1000 kcal")]
    Per1000Kcal,
    /// Results per person, without the kcal adjustment
    #[serde(rename = "Per capita")]
    PerCapita,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Per1000Kcal, Scenario::PerCapita];

    /// Label shown in the scenario selector and used as the row tag
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Per1000Kcal => "Per 1000 kcal",
            Scenario::PerCapita => "Per capita",
        }
    }

    /// Parse a selector label. Matching is exact apart from surrounding whitespace
    /// and letter case.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Scenario::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the nine environmental-impact measures present in both datasets.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    #[serde(rename = "mean_ghgs")]
    Ghgs,
    #[serde(rename = "mean_land")]
    Land,
    #[serde(rename = "mean_watscar")]
    WatScar,
    #[serde(rename = "mean_eut")]
    Eut,
    #[serde(rename = "mean_ghgs_ch4")]
    GhgsCh4,
    #[serde(rename = "mean_ghgs_n2o")]
    GhgsN2o,
    #[serde(rename = "mean_bio")]
    Bio,
    #[serde(rename = "mean_watuse")]
    WatUse,
    #[serde(rename = "mean_acid")]
    Acid,
}

pub const METRIC_COUNT: usize = 9;

impl Metric {
    /// All metrics, in column order of the input files.
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::Ghgs,
        Metric::Land,
        Metric::WatScar,
        Metric::Eut,
        Metric::GhgsCh4,
        Metric::GhgsN2o,
        Metric::Bio,
        Metric::WatUse,
        Metric::Acid,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// CSV column name
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Ghgs => "mean_ghgs",
            Metric::Land => "mean_land",
            Metric::WatScar => "mean_watscar",
            Metric::Eut => "mean_eut",
            Metric::GhgsCh4 => "mean_ghgs_ch4",
            Metric::GhgsN2o => "mean_ghgs_n2o",
            Metric::Bio => "mean_bio",
            Metric::WatUse => "mean_watuse",
            Metric::Acid => "mean_acid",
        }
    }

    /// Human-readable name with units
    pub fn display(&self) -> &'static str {
        match self {
            Metric::Ghgs => "GHG emissions (kg CO₂-eq)",
            Metric::Land => "Agricultural land use (m²)",
            Metric::WatScar => "Water scarcity index",
            Metric::Eut => "Eutrophication (g PO₄-eq)",
            Metric::GhgsCh4 => "CH₄ from livestock (kg)",
            Metric::GhgsN2o => "N₂O from fertiliser (kg)",
            Metric::Bio => "Biodiversity loss (species⋅day)",
            Metric::WatUse => "Irrigation water use (m³)",
            Metric::Acid => "Acidification potential",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Metric::ALL.into_iter().find(|m| m.column() == wanted)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A single loaded row. Metric values are indexed by [`Metric::index`].
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Observation {
    pub diet_group: String,
    pub age_group: String,
    pub sex: String,
    pub metrics: [f64; METRIC_COUNT],
    pub scenario: Scenario,
}

impl Observation {
    pub fn value(&self, metric: Metric) -> f64 {
        self.metrics[metric.index()]
    }

    /// Case-insensitive substring match against the three categorical fields.
    /// `needle` must already be lowercase.
    pub fn matches_keyword(&self, needle: &str) -> bool {
        [&self.diet_group, &self.age_group, &self.sex]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    pub fn group_key(&self) -> (String, String, String) {
        (
            self.diet_group.clone(),
            self.age_group.clone(),
            self.sex.clone(),
        )
    }
}

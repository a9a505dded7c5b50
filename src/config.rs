use crate::observation::{Metric, Scenario};
use std::env;
use std::path::PathBuf;

/// Environment variable naming the directory holding the two result files
pub const DATA_DIR_VAR: &str = "FOOTPRINT_DATA_DIR";
/// Environment variable naming an optional table snapshot
pub const SNAPSHOT_VAR: &str = "FOOTPRINT_SNAPSHOT";

/// Startup settings and the initial widget selections.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub snapshot: Option<PathBuf>,
    pub scenario: Scenario,
    pub size_metric: Metric,
    pub color_metric: Metric,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            snapshot: None,
            scenario: Scenario::Per1000Kcal,
            size_metric: Metric::Ghgs,
            color_metric: Metric::Land,
        }
    }
}

impl DashboardConfig {
    /// Resolve settings from command-line arguments and the environment.
    ///
    /// The first argument after the program name, if any, is the data
    /// directory; otherwise `FOOTPRINT_DATA_DIR`, otherwise the current
    /// directory. `FOOTPRINT_SNAPSHOT` enables the table snapshot.
    pub fn from_args(args: &[String]) -> Self {
        Self::resolve(
            args.get(1).cloned(),
            env::var(DATA_DIR_VAR).ok(),
            env::var(SNAPSHOT_VAR).ok(),
        )
    }

    fn resolve(arg: Option<String>, data_dir: Option<String>, snapshot: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = arg.or(data_dir).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        config.snapshot = snapshot
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        config
    }
}

/*!
# Diet footprint treemap

Data backend for an interactive treemap of environmental-footprint results by
diet group, age group and sex (Scarborough et al. 2023).

## Overview

Two CSV files with the same columns are loaded once at startup: one with results
per capita, one adjusted to 1000 kcal. Each row is tagged with its scenario and
the two sets are merged into one read-only table. Every user interaction then
runs a query over that table and hands the result to the chart.

## Pipeline

1. **Load** - parse both files, tag rows with "Per capita" / "Per 1000 kcal", concatenate
2. **Filter** - keep one scenario, then rows whose diet, age or sex contains the
   search keyword (case-insensitive, any field)
3. **Aggregate** - one row per (diet, age, sex) with the mean of all nine metrics
4. **Label** - attach the display name of each diet code
5. **Chart** - build the diet → age → sex hierarchy with size, color, a fixed color
   range and hover text

## Modules

- **observation**: Row type, scenarios and the nine metrics
- **labels**: Diet code display names
- **table**: The merged, immutable dataset
- **loader**: CSV parsing and merging
- **query**: Filtering and group-by mean
- **treemap**: Hierarchical chart description
- **downloader**: CSV and JSON export
- **saving**: Compressed snapshot of the loaded table
- **session**: Latest result per session, stale results dropped
- **config**: Startup settings
- **app**: Ties the above together for a front end
*/

pub mod app;
pub mod config;
pub mod downloader;
pub mod labels;
pub mod loader;
pub mod observation;
pub mod query;
pub mod saving;
pub mod session;
pub mod table;
pub mod treemap;

pub use app::*;
pub use loader::DataLoadError;
pub use observation::*;
pub use query::*;
pub use table::*;
pub use treemap::*;

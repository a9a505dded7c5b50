use crate::observation::{METRIC_COUNT, Metric, Observation, Scenario};
use crate::table::UnifiedTable;
use log::info;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// File holding the per-capita results (no kcal adjustment)
pub const CAPITA_FILE: &str = "Results_21MAR2022_nokcaladjust.csv";
/// File holding the results adjusted to 1000 kcal
pub const KCAL_FILE: &str = "Results_21Mar2022.csv";

/// Categorical columns every source must provide
pub const KEY_COLUMNS: [&str; 3] = ["diet_group", "age_group", "sex"];

/// Reasons the dataset could not be loaded. All of them are fatal at startup.
#[derive(Debug)]
pub enum DataLoadError {
    /// The file is missing or could not be read
    Io { path: PathBuf, source: io::Error },
    /// The source has no header line
    Empty { source: String },
    /// A required column is absent from the header
    MissingColumn { source: String, column: String },
    /// A data line could not be split into the expected fields
    Malformed {
        source: String,
        line: usize,
        reason: String,
    },
    /// A metric cell does not hold a number
    InvalidNumber {
        source: String,
        line: usize,
        column: &'static str,
        value: String,
    },
}

impl fmt::Display for DataLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataLoadError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            DataLoadError::Empty { source } => write!(f, "{}: no header line", source),
            DataLoadError::MissingColumn { source, column } => {
                write!(f, "{}: missing column '{}'", source, column)
            }
            DataLoadError::Malformed {
                source,
                line,
                reason,
            } => write!(f, "{}:{}: {}", source, line, reason),
            DataLoadError::InvalidNumber {
                source,
                line,
                column,
                value,
            } => write!(
                f,
                "{}:{}: column '{}' is not a non-negative number: '{}'",
                source, line, column, value
            ),
        }
    }
}

impl Error for DataLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataLoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Column positions resolved from a header line
struct ColumnMap {
    keys: [usize; 3],
    metrics: [usize; METRIC_COUNT],
    width: usize,
}

impl ColumnMap {
    fn from_header(header: &[String], source: &str) -> Result<Self, DataLoadError> {
        let find = |name: &str| -> Result<usize, DataLoadError> {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DataLoadError::MissingColumn {
                    source: source.to_string(),
                    column: name.to_string(),
                })
        };

        let mut keys = [0; 3];
        for (slot, name) in keys.iter_mut().zip(KEY_COLUMNS) {
            *slot = find(name)?;
        }
        let mut metrics = [0; METRIC_COUNT];
        for metric in Metric::ALL {
            metrics[metric.index()] = find(metric.column())?;
        }

        let width = keys.iter().chain(metrics.iter()).max().map_or(0, |m| m + 1);
        Ok(ColumnMap {
            keys,
            metrics,
            width,
        })
    }
}

/// Parse one CSV source and tag each row with `scenario`.
///
/// The header decides column positions, so column order is free and extra
/// columns (such as a leading pandas index) are ignored. Blank lines are skipped.
///
/// # Arguments
/// * `reader` - Buffered CSV text
/// * `scenario` - Tag applied to every row
/// * `source` - Name used in error messages
pub fn from_csv_reader<R: BufRead>(
    reader: R,
    scenario: Scenario,
    source: &str,
) -> Result<Vec<Observation>, DataLoadError> {
    let mut lines = reader.lines().enumerate().filter_map(|(n, line)| match line {
        Ok(line) => {
            let line = line.trim_end_matches('\r').to_string();
            (!line.trim().is_empty()).then_some(Ok((n + 1, line)))
        }
        Err(e) => Some(Err(DataLoadError::Io {
            path: PathBuf::from(source),
            source: e,
        })),
    });

    let split = |line_no: usize, line: &str| {
        parse_csv_row(line).map_err(|reason| DataLoadError::Malformed {
            source: source.to_string(),
            line: line_no,
            reason,
        })
    };

    let map = match lines.next() {
        Some(first) => {
            let (line_no, line) = first?;
            let header: Vec<String> = split(line_no, &line)?
                .into_iter()
                .map(|h| h.trim_start_matches('\u{feff}').to_string())
                .collect();
            ColumnMap::from_header(&header, source)?
        }
        None => {
            return Err(DataLoadError::Empty {
                source: source.to_string(),
            });
        }
    };

    let mut rows = Vec::new();
    for next in lines {
        let (line_no, line) = next?;
        let fields = split(line_no, &line)?;

        if fields.len() < map.width {
            return Err(DataLoadError::Malformed {
                source: source.to_string(),
                line: line_no,
                reason: format!("expected {} fields, found {}", map.width, fields.len()),
            });
        }

        let mut metrics = [0.0; METRIC_COUNT];
        for metric in Metric::ALL {
            let raw = fields[map.metrics[metric.index()]].trim();
            // footprints are finite and never negative
            metrics[metric.index()] = match raw.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => v,
                _ => {
                    return Err(DataLoadError::InvalidNumber {
                        source: source.to_string(),
                        line: line_no,
                        column: metric.column(),
                        value: raw.to_string(),
                    });
                }
            };
        }

        rows.push(Observation {
            diet_group: fields[map.keys[0]].trim().to_string(),
            age_group: fields[map.keys[1]].trim().to_string(),
            sex: fields[map.keys[2]].trim().to_string(),
            metrics,
            scenario,
        });
    }

    Ok(rows)
}

/// Load one CSV file from disk.
pub fn from_csv(
    filepath: impl AsRef<Path>,
    scenario: Scenario,
) -> Result<Vec<Observation>, DataLoadError> {
    let path = filepath.as_ref();
    let file = File::open(path).map_err(|e| DataLoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rows = from_csv_reader(BufReader::new(file), scenario, &path.display().to_string())?;
    info!(
        "loaded {} rows from {} as '{}'",
        rows.len(),
        path.display(),
        scenario
    );
    Ok(rows)
}

/// Load both sources and merge them into one table.
///
/// Rows of `source_kcal` are tagged "Per 1000 kcal", rows of `source_capita`
/// "Per capita". The kcal rows come first; row order carries no meaning.
///
/// # Examples
/// ```no_run
/// use footprint::loader::load;
///
/// match load("Results_21MAR2022_nokcaladjust.csv", "Results_21Mar2022.csv") {
///     Ok(table) => println!("{} rows", table.len()),
///     Err(e) => eprintln!("cannot start: {}", e),
/// }
/// ```
pub fn load(
    source_capita: impl AsRef<Path>,
    source_kcal: impl AsRef<Path>,
) -> Result<UnifiedTable, DataLoadError> {
    let kcal = from_csv(source_kcal, Scenario::Per1000Kcal)?;
    let capita = from_csv(source_capita, Scenario::PerCapita)?;
    Ok(UnifiedTable::concat(vec![kcal, capita]))
}

/// Same as [`load`] for in-memory sources.
pub fn load_from_readers<C: BufRead, K: BufRead>(
    source_capita: C,
    source_kcal: K,
) -> Result<UnifiedTable, DataLoadError> {
    let kcal = from_csv_reader(source_kcal, Scenario::Per1000Kcal, "kcal")?;
    let capita = from_csv_reader(source_capita, Scenario::PerCapita, "capita")?;
    Ok(UnifiedTable::concat(vec![kcal, capita]))
}

/// Load the two files by their fixed names from `dir`.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<UnifiedTable, DataLoadError> {
    let dir = dir.as_ref();
    load(dir.join(CAPITA_FILE), dir.join(KCAL_FILE))
}

// Parse a CSV row into a vector of strings
fn parse_csv_row(line: &str) -> Result<Vec<String>, String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(current_field);
                current_field = String::new();
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }

    // Add the last field
    result.push(current_field);

    Ok(result)
}

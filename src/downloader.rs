use crate::observation::Metric;
use crate::query::AggregateTable;
use crate::treemap::Treemap;

/// Convert an aggregate result to CSV format
///
/// The header is `diet_group,age_group,sex,diet_label` followed by the nine
/// metric columns. Unmapped diet labels are written as empty fields. Fields
/// containing commas, quotes or newlines are quoted.
///
/// # Examples
/// ```
/// use footprint::downloader::to_csv;
/// use footprint::observation::{Metric, Scenario};
/// use footprint::query::query;
/// use footprint::table::UnifiedTable;
///
/// let result = query(&UnifiedTable::default(), Scenario::PerCapita, Metric::Ghgs, Metric::Land, None);
/// let csv = to_csv(&result);
/// assert!(csv.starts_with("diet_group,age_group,sex,diet_label,mean_ghgs"));
/// assert_eq!(csv.lines().count(), 1);
/// ```
pub fn to_csv(result: &AggregateTable) -> String {
    let mut csv_content = String::from("diet_group,age_group,sex,diet_label");
    for metric in Metric::ALL {
        csv_content.push(',');
        csv_content.push_str(metric.column());
    }
    csv_content.push('\n');

    for row in &result.rows {
        let fields = [
            row.diet_group.as_str(),
            row.age_group.as_str(),
            row.sex.as_str(),
            row.label(),
        ];
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                csv_content.push(',');
            }
            csv_content.push_str(&escape_field(field));
        }
        for value in row.metrics {
            csv_content.push(',');
            csv_content.push_str(&value.to_string());
        }
        csv_content.push('\n');
    }

    csv_content
}

/// Serialize a treemap description for the renderer
pub fn to_json(chart: &Treemap) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(chart)
}

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

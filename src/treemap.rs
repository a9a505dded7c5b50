use crate::observation::Metric;
use crate::query::{AggregateRow, AggregateTable};
use serde::Serialize;

/// Presentation options passed through to the renderer
///
/// Defaults reproduce the dashboard: a 650 px tall chart on the "Reds" scale
/// with light cell borders.
#[derive(Clone, Debug, Serialize)]
pub struct TreemapOptions {
    /// Title displayed above the chart
    pub title: String,

    /// Height of the chart in pixels
    pub height: u32,

    /// Name of the continuous color scale
    pub color_scale: String,

    /// Cell border color
    pub border_color: String,
}

impl Default for TreemapOptions {
    fn default() -> Self {
        Self {
            title: "Environmental Footprint Treemap (Scarborough et al 2023)".to_string(),
            height: 650,
            color_scale: "Reds".to_string(),
            border_color: "#eceff5".to_string(),
        }
    }
}

/// One rectangle of the treemap. Top-level nodes have an empty `parent`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TreemapNode {
    pub id: String,
    pub label: String,
    pub parent: String,
    pub value: f64,
    pub color: f64,
    pub hover: String,
}

/// Everything the renderer needs to draw the drill-down chart
#[derive(Clone, Debug, Serialize)]
pub struct Treemap {
    pub options: TreemapOptions,
    pub size_metric: Metric,
    pub color_metric: Metric,
    pub size_label: &'static str,
    pub color_label: &'static str,
    /// Fixed color-scale range; `None` for an empty result
    pub color_range: Option<(f64, f64)>,
    pub nodes: Vec<TreemapNode>,
}

impl Treemap {
    pub fn leaves(&self) -> impl Iterator<Item = &TreemapNode> {
        self.nodes
            .iter()
            .filter(move |n| !self.nodes.iter().any(|c| c.parent == n.id))
    }

    pub fn node(&self, id: &str) -> Option<&TreemapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

// Running totals for a diet or age node
#[derive(Default)]
struct Branch {
    id: String,
    label: String,
    parent: String,
    size: f64,
    weighted_color: f64,
    plain_color: f64,
    leaves: usize,
}

impl Branch {
    fn add(&mut self, size: f64, color: f64) {
        self.size += size;
        self.weighted_color += size * color;
        self.plain_color += color;
        self.leaves += 1;
    }

    fn color(&self) -> f64 {
        if self.size != 0.0 {
            self.weighted_color / self.size
        } else {
            self.plain_color / self.leaves as f64
        }
    }
}

/// Hover text for one cell, values to 4 decimal places
pub fn hover_text(
    label: &str,
    size_metric: Metric,
    size: f64,
    color_metric: Metric,
    color: f64,
) -> String {
    format!(
        "<b>{}</b><br>{}: {:.4}<br>{}: {:.4}",
        label,
        size_metric.display(),
        size,
        color_metric.display(),
        color
    )
}

/// Build the hierarchy diet_label → age_group → sex from an aggregate result.
///
/// Node ids are slash-joined diet code, age group and sex, so they are unique
/// per aggregate row even when diet codes have no display label.
///
/// Leaves carry the aggregate values directly. A branch takes the sum of its
/// children's sizes and the size-weighted mean of their colors (plain mean if
/// the sizes sum to zero). Nodes appear parents first, in the sorted order of
/// the aggregate rows.
///
/// # Examples
/// ```
/// use footprint::observation::{Metric, Scenario};
/// use footprint::query::query;
/// use footprint::table::UnifiedTable;
/// use footprint::treemap::{build_treemap, TreemapOptions};
///
/// let table = UnifiedTable::default();
/// let result = query(&table, Scenario::PerCapita, Metric::Ghgs, Metric::Land, None);
/// let chart = build_treemap(&result, &TreemapOptions::default());
/// assert!(chart.nodes.is_empty());
/// assert_eq!(chart.color_range, None);
/// ```
pub fn build_treemap(result: &AggregateTable, options: &TreemapOptions) -> Treemap {
    let size_metric = result.size_metric;
    let color_metric = result.color_metric;

    // Ids follow the diet code so unmapped codes stay distinct; labels use the
    // display name.
    let path = |row: &AggregateRow| {
        [
            row.diet_group.clone(),
            row.age_group.clone(),
            row.sex.clone(),
        ]
    };

    let mut branches: Vec<Branch> = Vec::new();
    let mut leaves: Vec<TreemapNode> = Vec::with_capacity(result.rows.len());

    for row in &result.rows {
        let parts = path(row);
        let labels = [row.label(), row.age_group.as_str(), row.sex.as_str()];
        let size = row.value(size_metric);
        let color = row.value(color_metric);

        let mut parent = String::new();
        for depth in 0..2 {
            let id = parts[..=depth].join("/");
            match branches.iter_mut().find(|b| b.id == id) {
                Some(b) => b.add(size, color),
                None => {
                    let mut b = Branch {
                        id: id.clone(),
                        label: labels[depth].to_string(),
                        parent: parent.clone(),
                        ..Branch::default()
                    };
                    b.add(size, color);
                    branches.push(b);
                }
            }
            parent = id;
        }

        leaves.push(TreemapNode {
            id: parts.join("/"),
            label: labels[2].to_string(),
            parent,
            value: size,
            color,
            hover: hover_text(labels[2], size_metric, size, color_metric, color),
        });
    }

    let mut nodes: Vec<TreemapNode> = branches
        .into_iter()
        .map(|b| {
            let color = b.color();
            TreemapNode {
                hover: hover_text(&b.label, size_metric, b.size, color_metric, color),
                id: b.id,
                label: b.label,
                parent: b.parent,
                value: b.size,
                color,
            }
        })
        .collect();
    nodes.extend(leaves);

    Treemap {
        options: options.clone(),
        size_metric,
        color_metric,
        size_label: size_metric.display(),
        color_label: color_metric.display(),
        color_range: result.color_range(),
        nodes,
    }
}

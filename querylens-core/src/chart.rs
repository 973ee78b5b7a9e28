//! Chart configuration from tabular results.
//!
//! [`build`] turns a [`TabularResult`] and a [`ChartSuggestion`] into a
//! renderer-agnostic [`ChartConfiguration`]. It never fails: suggestions come
//! from an external collaborator and may name columns that do not exist, so
//! every lookup goes through [`resolve_column`] and every value through
//! [`coerce_number`].
//!
//! # Column Resolution
//!
//! | Role              | Named column found | Named column missing                 |
//! |-------------------|--------------------|--------------------------------------|
//! | [`AxisRole::Label`] | its index        | `0`                                  |
//! | [`AxisRole::Value`] | its index        | `1` if more than one column, else `0` |
//!
//! A value column may resolve to the same index as the label column; that
//! degenerate chart is returned as is.

use crate::format::display_scalar;
use crate::models::TabularResult;
use crate::{Result, error::QueryLensError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};
use std::str::FromStr;

/// Fill colors, indexed by dataset (or by data point for pie/doughnut).
///
/// Both lookups wrap modulo the palette length, so a pie with more than ten
/// slices repeats colors instead of leaving the extra slices uncolored.
pub const CHART_COLORS: [&str; 10] = [
    "rgba(99, 102, 241, 0.7)",
    "rgba(16, 185, 129, 0.7)",
    "rgba(245, 158, 11, 0.7)",
    "rgba(239, 68, 68, 0.7)",
    "rgba(139, 92, 246, 0.7)",
    "rgba(6, 182, 212, 0.7)",
    "rgba(236, 72, 153, 0.7)",
    "rgba(132, 204, 22, 0.7)",
    "rgba(249, 115, 22, 0.7)",
    "rgba(100, 116, 139, 0.7)",
];

/// Border colors, parallel to [`CHART_COLORS`].
pub const CHART_BORDER_COLORS: [&str; 10] = [
    "rgb(99, 102, 241)",
    "rgb(16, 185, 129)",
    "rgb(245, 158, 11)",
    "rgb(239, 68, 68)",
    "rgb(139, 92, 246)",
    "rgb(6, 182, 212)",
    "rgb(236, 72, 153)",
    "rgb(132, 204, 22)",
    "rgb(249, 115, 22)",
    "rgb(100, 116, 139)",
];

const BORDER_WIDTH: u32 = 2;
const LINE_TENSION: f64 = 0.4;
const LINE_POINT_RADIUS: u32 = 4;

/// Chart types a suggestion may ask for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Doughnut,
    Scatter,
    HorizontalBar,
}

impl ChartType {
    pub const ALL: [ChartType; 6] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::Scatter,
        ChartType::HorizontalBar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::Scatter => "scatter",
            ChartType::HorizontalBar => "horizontalBar",
        }
    }

    /// Renderer kind; horizontal bars are bars with the index axis flipped.
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartType::Bar | ChartType::HorizontalBar => ChartKind::Bar,
            ChartType::Line => ChartKind::Line,
            ChartType::Pie => ChartKind::Pie,
            ChartType::Doughnut => ChartKind::Doughnut,
            ChartType::Scatter => ChartKind::Scatter,
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = QueryLensError;

    /// Case-insensitive; `horizontal_bar` and `horizontal-bar` are accepted too.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        ChartType::ALL
            .into_iter()
            .find(|t| t.as_str().to_lowercase() == normalized)
            .ok_or_else(|| {
                QueryLensError::configuration(format!(
                    "Unknown chart type '{}'. Supported: bar, line, pie, doughnut, scatter, horizontalBar",
                    s.trim()
                ))
            })
    }
}

/// The four primitive kinds a renderer has to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Doughnut,
    Scatter,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Scatter => "scatter",
        }
    }

    /// Pie and doughnut charts: per-point colors, no Cartesian axes.
    pub fn is_radial(&self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Doughnut)
    }
}

/// A hint of how to plot a result, produced outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSuggestion {
    pub chart_type: ChartType,
    pub x_column: String,
    pub y_columns: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Wire shape accepted by [`ChartSuggestion::parse_lenient`]; every field optional.
#[derive(Debug, Default, Deserialize)]
struct RawSuggestion {
    chart_type: Option<String>,
    x_column: Option<String>,
    y_columns: Option<Vec<String>>,
    title: Option<String>,
    reasoning: Option<String>,
}

fn default_x_column(columns: &[String]) -> String {
    columns
        .first()
        .cloned()
        .unwrap_or_else(|| "label".to_string())
}

fn default_y_columns(columns: &[String]) -> Vec<String> {
    match columns {
        [] => Vec::new(),
        [only] => vec![only.clone()],
        [_, second, ..] => vec![second.clone()],
    }
}

fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.split_once('\n').map_or(rest, |(_, body)| body);
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

impl ChartSuggestion {
    /// Bar chart of the second column against the first.
    pub fn fallback(columns: &[String], title: impl Into<String>) -> Self {
        Self {
            chart_type: ChartType::Bar,
            x_column: default_x_column(columns),
            y_columns: default_y_columns(columns),
            title: title.into(),
            reasoning: Some("Default fallback to bar chart.".to_string()),
        }
    }

    /// The fallback column choice with an explicit chart type.
    pub fn with_chart_type(
        columns: &[String],
        chart_type: ChartType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            chart_type,
            reasoning: None,
            ..Self::fallback(columns, title)
        }
    }

    /// Parses a suggestion returned as JSON text.
    ///
    /// Surrounding Markdown code fences are stripped. Text that is not a
    /// JSON object yields [`ChartSuggestion::fallback`] titled `title`. In a
    /// parsed object, a missing or unknown `chart_type` becomes `bar`, a
    /// missing `x_column` the first column, missing `y_columns` the second
    /// column, and a missing `title` the empty string.
    pub fn parse_lenient(text: &str, columns: &[String], title: &str) -> Self {
        let raw: RawSuggestion = match serde_json::from_str(strip_code_fences(text)) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("Unparsable chart suggestion, using fallback: {}", e);
                return Self::fallback(columns, title);
            }
        };

        let chart_type = raw
            .chart_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or_default();

        Self {
            chart_type,
            x_column: raw.x_column.unwrap_or_else(|| default_x_column(columns)),
            y_columns: raw.y_columns.unwrap_or_else(|| default_y_columns(columns)),
            title: raw.title.unwrap_or_default(),
            reasoning: raw.reasoning,
        }
    }
}

/// Whether a column is being looked up for labels or for values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRole {
    Label,
    Value,
}

impl AxisRole {
    /// Index used when the named column is not in the result.
    pub fn default_index(self, column_count: usize) -> usize {
        match self {
            AxisRole::Label => 0,
            AxisRole::Value if column_count > 1 => 1,
            AxisRole::Value => 0,
        }
    }
}

/// Resolves a column name to an index, falling back per [`AxisRole`].
pub fn resolve_column(columns: &[String], name: &str, role: AxisRole) -> usize {
    columns
        .iter()
        .position(|c| c == name)
        .unwrap_or_else(|| role.default_index(columns.len()))
}

/// Coerces a scalar to a finite number; anything else becomes `0.0`.
///
/// Numeric text is parsed after trimming, booleans count as `1`/`0`.
pub fn coerce_number(value: &JsonValue) -> f64 {
    let number = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    number.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// One color for the whole dataset, or one per data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Colors {
    Single(String),
    PerPoint(Vec<String>),
}

impl Colors {
    fn to_json(&self) -> JsonValue {
        match self {
            Colors::Single(color) => json!(color),
            Colors::PerPoint(colors) => json!(colors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStyle {
    pub background: Colors,
    pub border: Colors,
    pub border_width: u32,
    /// Filled area under a line
    pub fill: bool,
    /// Curve smoothing; set for line charts only
    pub tension: Option<f64>,
    pub point_radius: Option<u32>,
}

impl DatasetStyle {
    fn for_dataset(kind: ChartKind, dataset_index: usize, point_count: usize) -> Self {
        let (background, border) = if kind.is_radial() {
            let cycle = |palette: &[&str]| {
                Colors::PerPoint(
                    (0..point_count)
                        .map(|i| palette[i % palette.len()].to_string())
                        .collect(),
                )
            };
            (cycle(&CHART_COLORS), cycle(&CHART_BORDER_COLORS))
        } else {
            let color_index = dataset_index % CHART_COLORS.len();
            (
                Colors::Single(CHART_COLORS[color_index].to_string()),
                Colors::Single(CHART_BORDER_COLORS[color_index].to_string()),
            )
        };

        let line = kind == ChartKind::Line;
        Self {
            background,
            border,
            border_width: BORDER_WIDTH,
            fill: line,
            tension: line.then_some(LINE_TENSION),
            point_radius: line.then_some(LINE_POINT_RADIUS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<f64>,
    pub style: DatasetStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisOptions {
    pub begin_at_zero: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub show_legend: bool,
    /// `None` for charts without Cartesian axes
    pub axes: Option<AxisOptions>,
    /// Categories on the vertical axis (horizontal bars)
    pub horizontal: bool,
}

/// Renderer-agnostic chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfiguration {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: DisplayOptions,
}

/// Builds a chart configuration. Never fails.
///
/// # Example
///
/// ```rust
/// use querylens_core::chart::{ChartSuggestion, ChartType, build};
/// use querylens_core::models::TabularResult;
/// use serde_json::json;
///
/// let result = TabularResult::from_rows(
///     vec!["region".to_string(), "total".to_string()],
///     vec![vec![json!("east"), json!(10)], vec![json!("west"), json!("bad")]],
///     1000,
/// );
/// let suggestion = ChartSuggestion {
///     chart_type: ChartType::Bar,
///     x_column: "region".to_string(),
///     y_columns: vec!["total".to_string()],
///     ..Default::default()
/// };
///
/// let chart = build(&result, &suggestion);
/// assert_eq!(chart.labels, vec!["east", "west"]);
/// assert_eq!(chart.datasets[0].values, vec![10.0, 0.0]);
/// ```
pub fn build(result: &TabularResult, suggestion: &ChartSuggestion) -> ChartConfiguration {
    let kind = suggestion.chart_type.kind();
    let x_index = resolve_column(&result.columns, &suggestion.x_column, AxisRole::Label);

    let labels: Vec<String> = result
        .rows
        .iter()
        .map(|row| row.get(x_index).map_or_else(|| "NULL".to_string(), display_scalar))
        .collect();

    let datasets: Vec<Dataset> = suggestion
        .y_columns
        .iter()
        .enumerate()
        .map(|(dataset_index, y_column)| {
            let y_index = resolve_column(&result.columns, y_column, AxisRole::Value);
            let values: Vec<f64> = result
                .rows
                .iter()
                .map(|row| row.get(y_index).map_or(0.0, coerce_number))
                .collect();
            let style = DatasetStyle::for_dataset(kind, dataset_index, values.len());

            Dataset {
                label: y_column.clone(),
                values,
                style,
            }
        })
        .collect();

    let options = DisplayOptions {
        show_legend: datasets.len() > 1 || kind.is_radial(),
        axes: (!kind.is_radial()).then_some(AxisOptions {
            begin_at_zero: true,
        }),
        horizontal: suggestion.chart_type == ChartType::HorizontalBar,
    };

    tracing::debug!(
        "Built {} chart: {} labels, {} datasets (x index {})",
        suggestion.chart_type,
        labels.len(),
        datasets.len(),
        x_index
    );

    ChartConfiguration {
        kind,
        title: suggestion.title.clone(),
        labels,
        datasets,
        options,
    }
}

/// A result is worth charting when it has rows and at least two columns.
pub fn is_chartable(result: &TabularResult) -> bool {
    !result.rows.is_empty() && result.columns.len() >= 2
}

impl ChartConfiguration {
    /// Renders the configuration as a Chart.js config object.
    pub fn to_chartjs(&self) -> JsonValue {
        let datasets: Vec<JsonValue> = self
            .datasets
            .iter()
            .map(|dataset| {
                let mut entry = Map::new();
                entry.insert("label".to_string(), json!(dataset.label));
                entry.insert("data".to_string(), json!(dataset.values));
                entry.insert(
                    "backgroundColor".to_string(),
                    dataset.style.background.to_json(),
                );
                entry.insert("borderColor".to_string(), dataset.style.border.to_json());
                entry.insert("borderWidth".to_string(), json!(dataset.style.border_width));
                if dataset.style.fill {
                    entry.insert("fill".to_string(), json!(true));
                }
                if let Some(tension) = dataset.style.tension {
                    entry.insert("tension".to_string(), json!(tension));
                }
                if let Some(radius) = dataset.style.point_radius {
                    entry.insert("pointRadius".to_string(), json!(radius));
                }
                JsonValue::Object(entry)
            })
            .collect();

        let mut plugins = Map::new();
        plugins.insert(
            "legend".to_string(),
            json!({ "display": self.options.show_legend }),
        );
        if !self.title.is_empty() {
            plugins.insert(
                "title".to_string(),
                json!({ "display": true, "text": self.title }),
            );
        }

        let mut options = Map::new();
        options.insert("responsive".to_string(), json!(true));
        options.insert("maintainAspectRatio".to_string(), json!(false));
        options.insert("plugins".to_string(), JsonValue::Object(plugins));
        if let Some(axes) = &self.options.axes {
            options.insert(
                "scales".to_string(),
                json!({
                    "x": { "display": true },
                    "y": { "display": true, "beginAtZero": axes.begin_at_zero },
                }),
            );
        }
        if self.options.horizontal {
            options.insert("indexAxis".to_string(), json!("y"));
        }

        json!({
            "type": self.kind.as_str(),
            "data": { "labels": self.labels, "datasets": datasets },
            "options": options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn region_totals() -> TabularResult {
        TabularResult::from_rows(
            columns(&["region", "total"]),
            vec![
                vec![json!("east"), json!(10)],
                vec![json!("west"), json!("bad")],
            ],
            1000,
        )
    }

    fn suggestion(chart_type: ChartType, x: &str, ys: &[&str]) -> ChartSuggestion {
        ChartSuggestion {
            chart_type,
            x_column: x.to_string(),
            y_columns: columns(ys),
            title: "Totals".to_string(),
            reasoning: None,
        }
    }

    #[test]
    fn test_non_numeric_values_become_zero() {
        let chart = build(
            &region_totals(),
            &suggestion(ChartType::Bar, "region", &["total"]),
        );

        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.labels, vec!["east", "west"]);
        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].label, "total");
        assert_eq!(chart.datasets[0].values, vec![10.0, 0.0]);
        assert!(!chart.options.show_legend);
        assert!(chart.options.axes.is_some());
    }

    #[test]
    fn test_missing_x_column_falls_back_to_first() {
        let chart = build(
            &region_totals(),
            &suggestion(ChartType::Bar, "country", &["total"]),
        );
        assert_eq!(chart.labels, vec!["east", "west"]);
    }

    #[test]
    fn test_resolution_table() {
        let two = columns(&["a", "b"]);
        let one = columns(&["a"]);

        assert_eq!(resolve_column(&two, "b", AxisRole::Label), 1);
        assert_eq!(resolve_column(&two, "zzz", AxisRole::Label), 0);
        assert_eq!(resolve_column(&two, "a", AxisRole::Value), 0);
        assert_eq!(resolve_column(&two, "zzz", AxisRole::Value), 1);
        assert_eq!(resolve_column(&one, "zzz", AxisRole::Value), 0);
        assert_eq!(resolve_column(&[], "zzz", AxisRole::Value), 0);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(3)), 3.0);
        assert_eq!(coerce_number(&json!(" 4.5 ")), 4.5);
        assert_eq!(coerce_number(&json!(true)), 1.0);
        assert_eq!(coerce_number(&JsonValue::Null), 0.0);
        assert_eq!(coerce_number(&json!("n/a")), 0.0);
        assert_eq!(coerce_number(&json!("inf")), 0.0);
        assert_eq!(coerce_number(&json!([1])), 0.0);
    }

    #[test]
    fn test_palette_cycles_per_dataset() {
        let names: Vec<String> = (0..12).map(|i| format!("y{}", i)).collect();
        let result = TabularResult::from_rows(
            std::iter::once("x".to_string()).chain(names.clone()).collect(),
            vec![std::iter::once(json!("a")).chain((0..12).map(|i| json!(i))).collect()],
            1000,
        );
        let ys: Vec<&str> = names.iter().map(String::as_str).collect();
        let chart = build(&result, &suggestion(ChartType::Line, "x", &ys));

        assert_eq!(chart.datasets.len(), 12);
        assert_eq!(
            chart.datasets[10].style.background,
            Colors::Single(CHART_COLORS[0].to_string())
        );
        assert_eq!(
            chart.datasets[11].style.border,
            Colors::Single(CHART_BORDER_COLORS[1].to_string())
        );
        assert_eq!(chart.datasets[11].values, vec![11.0]);
        assert!(chart.options.show_legend);
    }

    #[test]
    fn test_line_styling() {
        let chart = build(
            &region_totals(),
            &suggestion(ChartType::Line, "region", &["total"]),
        );
        let style = &chart.datasets[0].style;
        assert!(style.fill);
        assert_eq!(style.tension, Some(0.4));
        assert_eq!(style.point_radius, Some(4));
        assert_eq!(style.border_width, 2);
    }

    #[test]
    fn test_pie_gets_point_colors_legend_and_no_axes() {
        for chart_type in [ChartType::Pie, ChartType::Doughnut] {
            let chart = build(
                &region_totals(),
                &suggestion(chart_type, "region", &["total"]),
            );
            assert_eq!(
                chart.datasets[0].style.background,
                Colors::PerPoint(vec![
                    CHART_COLORS[0].to_string(),
                    CHART_COLORS[1].to_string()
                ])
            );
            assert!(chart.options.show_legend);
            assert!(chart.options.axes.is_none());
            assert!(!chart.datasets[0].style.fill);
        }
    }

    #[test]
    fn test_pie_colors_wrap_past_palette() {
        let rows = (0..12)
            .map(|i| vec![json!(format!("slice {}", i)), json!(i)])
            .collect();
        let result = TabularResult::from_rows(columns(&["slice", "share"]), rows, 1000);
        let chart = build(&result, &suggestion(ChartType::Pie, "slice", &["share"]));

        let Colors::PerPoint(colors) = &chart.datasets[0].style.background else {
            panic!("expected per-point colors");
        };
        assert_eq!(colors.len(), 12);
        assert_eq!(colors[10], CHART_COLORS[0]);
        assert_eq!(colors[11], CHART_COLORS[1]);
    }

    #[test]
    fn test_horizontal_bar_is_flipped_bar() {
        let chart = build(
            &region_totals(),
            &suggestion(ChartType::HorizontalBar, "region", &["total"]),
        );
        assert_eq!(chart.kind, ChartKind::Bar);
        assert!(chart.options.horizontal);

        let config = chart.to_chartjs();
        assert_eq!(config["type"], "bar");
        assert_eq!(config["options"]["indexAxis"], "y");
    }

    #[test]
    fn test_empty_inputs_never_fail() {
        let chart = build(&TabularResult::default(), &ChartSuggestion::default());
        assert!(chart.labels.is_empty());
        assert!(chart.datasets.is_empty());

        let ragged = TabularResult {
            columns: columns(&["a", "b"]),
            rows: vec![vec![json!("only")]],
            row_count: 1,
            truncated: false,
        };
        let chart = build(&ragged, &suggestion(ChartType::Bar, "a", &["b"]));
        assert_eq!(chart.labels, vec!["only"]);
        assert_eq!(chart.datasets[0].values, vec![0.0]);
    }

    #[test]
    fn test_to_chartjs_shape() {
        let chart = build(
            &region_totals(),
            &suggestion(ChartType::Line, "region", &["total"]),
        );
        let config = chart.to_chartjs();

        assert_eq!(config["type"], "line");
        assert_eq!(config["data"]["labels"], json!(["east", "west"]));
        assert_eq!(config["data"]["datasets"][0]["data"], json!([10.0, 0.0]));
        assert_eq!(config["data"]["datasets"][0]["tension"], json!(0.4));
        assert_eq!(config["options"]["plugins"]["legend"]["display"], false);
        assert_eq!(config["options"]["plugins"]["title"]["text"], "Totals");
        assert_eq!(config["options"]["scales"]["y"]["beginAtZero"], true);
        assert!(config["options"].get("indexAxis").is_none());

        let pie = build(
            &region_totals(),
            &suggestion(ChartType::Pie, "region", &["total"]),
        )
        .to_chartjs();
        assert!(pie["options"].get("scales").is_none());
    }

    #[test]
    fn test_chart_type_parsing() {
        assert_eq!("horizontalBar".parse::<ChartType>().unwrap(), ChartType::HorizontalBar);
        assert_eq!("horizontal_bar".parse::<ChartType>().unwrap(), ChartType::HorizontalBar);
        assert_eq!(" PIE ".parse::<ChartType>().unwrap(), ChartType::Pie);
        assert!("radar".parse::<ChartType>().is_err());

        let parsed: ChartType = serde_json::from_str("\"horizontalBar\"").unwrap();
        assert_eq!(parsed, ChartType::HorizontalBar);
    }

    #[test]
    fn test_fallback_suggestion() {
        let s = ChartSuggestion::fallback(&columns(&["month", "revenue", "cost"]), "Q");
        assert_eq!(s.chart_type, ChartType::Bar);
        assert_eq!(s.x_column, "month");
        assert_eq!(s.y_columns, vec!["revenue"]);
        assert_eq!(s.title, "Q");

        let s = ChartSuggestion::fallback(&columns(&["n"]), "");
        assert_eq!(s.y_columns, vec!["n"]);

        let s = ChartSuggestion::with_chart_type(&columns(&["a", "b"]), ChartType::Pie, "t");
        assert_eq!(s.chart_type, ChartType::Pie);
        assert_eq!(s.y_columns, vec!["b"]);
    }

    #[test]
    fn test_parse_lenient() {
        let cols = columns(&["month", "revenue"]);

        let fenced = "```json\n{\"chart_type\": \"line\", \"x_column\": \"month\", \
                      \"y_columns\": [\"revenue\"], \"title\": \"Revenue\"}\n```";
        let s = ChartSuggestion::parse_lenient(fenced, &cols, "question");
        assert_eq!(s.chart_type, ChartType::Line);
        assert_eq!(s.title, "Revenue");

        let s = ChartSuggestion::parse_lenient("not json at all", &cols, "question");
        assert_eq!(s, ChartSuggestion::fallback(&cols, "question"));

        let s = ChartSuggestion::parse_lenient("{\"chart_type\": \"radar\"}", &cols, "q");
        assert_eq!(s.chart_type, ChartType::Bar);
        assert_eq!(s.x_column, "month");
        assert_eq!(s.y_columns, vec!["revenue"]);
        assert_eq!(s.title, "");
    }

    #[test]
    fn test_is_chartable() {
        assert!(is_chartable(&region_totals()));
        assert!(!is_chartable(&TabularResult::from_rows(
            columns(&["a", "b"]),
            vec![],
            10
        )));
        assert!(!is_chartable(&TabularResult::from_rows(
            columns(&["a"]),
            vec![vec![json!(1)]],
            10
        )));
    }
}

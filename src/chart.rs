//! Shapes filtered rows or a summary table into plot-ready structures.
//!
//! Nothing here draws: `ui::plot` turns a [`ChartData`] into egui_plot items.

use std::collections::HashMap;
use std::fmt;

use crate::data::aggregate::{
    aggregate, Accumulator, AggregationMethod, AggregationSpec, SummaryTable,
};
use crate::data::error::DataError;
use crate::data::model::{Dataset, Metric};
use crate::data::stats::{quantile, sample_std};

// ---------------------------------------------------------------------------
// Chart selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Scatter,
    Radar,
    Box,
    Violin,
    Heatmap,
    ParallelCoordinates,
    ScatterMatrix,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Radar,
        ChartKind::Box,
        ChartKind::Violin,
        ChartKind::Heatmap,
        ChartKind::ParallelCoordinates,
    ];

    /// Kinds offered on the comparison page, drawn from a [`SummaryTable`].
    pub const SUMMARY: [ChartKind; 5] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::ScatterMatrix,
        ChartKind::Radar,
        ChartKind::Heatmap,
    ];

    /// Kinds that plot a list of metrics instead of a primary metric.
    pub fn is_multi_metric(self) -> bool {
        matches!(
            self,
            ChartKind::Radar | ChartKind::Heatmap | ChartKind::ParallelCoordinates
        )
    }

    pub fn needs_secondary(self) -> bool {
        self == ChartKind::Scatter
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Radar => "Radar Chart",
            ChartKind::Box => "Box Plot",
            ChartKind::Violin => "Violin Plot",
            ChartKind::Heatmap => "Heatmap",
            ChartKind::ParallelCoordinates => "Parallel Coordinates",
            ChartKind::ScatterMatrix => "Scatter Matrix",
        })
    }
}

/// What to plot from the filtered rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub primary: String,
    pub secondary: Option<String>,
    /// Axes for the multi-metric kinds.
    pub metrics: Vec<String>,
    /// Sample count of violin density curves.
    pub density_points: usize,
}

// ---------------------------------------------------------------------------
// Shaped output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    /// Marker size in `0..=1` per point; empty when all markers match.
    pub sizes: Vec<f64>,
}

impl Series {
    fn new(name: String, points: Vec<[f64; 2]>) -> Self {
        Series {
            name,
            points,
            sizes: Vec::new(),
        }
    }
}

/// Bars of one colour, aligned with the chart's categories.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Values in `0..=1`, one per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl ScaledSeries {
    /// Closed polygon for a radar chart, axis `i` at angle `i / n` turns
    /// starting at 12 o'clock. Missing values sit at the centre.
    pub fn radar_polygon(&self) -> Vec<[f64; 2]> {
        let n = self.values.len();
        if n == 0 {
            return Vec::new();
        }
        let mut pts: Vec<[f64; 2]> = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let r = v.unwrap_or(0.0);
                let turn = std::f64::consts::TAU * i as f64 / n as f64;
                let theta = std::f64::consts::FRAC_PI_2 - turn;
                [r * theta.cos(), r * theta.sin()]
            })
            .collect();
        pts.push(pts[0]);
        pts
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    pub lower: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub name: String,
    pub spread: FiveNumber,
    /// `(value, density)` samples; empty for box plots.
    pub density: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
    /// `values` min–max scaled per column, for colouring.
    pub scaled: Vec<Vec<Option<f64>>>,
}

/// Pairwise scatter panels over `dimensions`, one point per player.
/// Panel `(row, col)` plots dimension `col` on x against `row` on y.
#[derive(Debug, Clone, PartialEq)]
pub struct PairGrid {
    pub dimensions: Vec<String>,
    pub players: Vec<String>,
    /// Row per player, aligned with `dimensions`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl PairGrid {
    /// Points of one panel, one series per player with both values present.
    pub fn panel(&self, row: usize, col: usize) -> Vec<Series> {
        self.players
            .iter()
            .zip(&self.values)
            .filter_map(|(player, v)| {
                let point = [(*v.get(col)?)?, (*v.get(row)?)?];
                Some(Series::new(player.clone(), vec![point]))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// No rows for the current filter.
    Empty,
    Bars {
        y_label: String,
        categories: Vec<String>,
        groups: Vec<BarGroup>,
    },
    Lines {
        x_label: String,
        y_label: String,
        series: Vec<Series>,
    },
    Points {
        x_label: String,
        y_label: String,
        /// Column driving [`Series::sizes`], if any.
        size_label: Option<String>,
        series: Vec<Series>,
    },
    Radar {
        axes: Vec<String>,
        series: Vec<ScaledSeries>,
    },
    Distributions {
        y_label: String,
        violin: bool,
        groups: Vec<Distribution>,
    },
    Heatmap(Matrix),
    Parallel {
        axes: Vec<String>,
        lines: Vec<ScaledSeries>,
    },
    ScatterMatrix(PairGrid),
}

// ---------------------------------------------------------------------------
// Shaping from filtered rows
// ---------------------------------------------------------------------------

/// Validate every referenced column, then reshape `dataset` for `req.kind`.
pub fn shape(dataset: &Dataset, req: &ChartRequest) -> Result<ChartData, DataError> {
    // Pair grids only come from a summary table.
    if req.kind == ChartKind::ScatterMatrix {
        return Err(DataError::UnsupportedChart(req.kind.to_string()));
    }
    if req.kind.is_multi_metric() {
        if req.metrics.is_empty() {
            return Err(DataError::NoMetrics);
        }
        for m in &req.metrics {
            dataset.require_metric(m)?;
        }
    } else {
        dataset.require_metric(&req.primary)?;
    }
    let secondary = if req.kind.needs_secondary() {
        let s = req
            .secondary
            .as_deref()
            .ok_or_else(|| DataError::MissingSecondaryMetric(req.kind.to_string()))?;
        dataset.require_metric(s)?;
        Some(s)
    } else {
        None
    };

    if dataset.is_empty() {
        return Ok(ChartData::Empty);
    }

    let data = match req.kind {
        ChartKind::Bar => bars_by_year(dataset, &req.primary),
        ChartKind::Line => ChartData::Lines {
            x_label: "Year".into(),
            y_label: req.primary.clone(),
            series: trend_series(dataset, &req.primary),
        },
        ChartKind::Scatter => {
            let y = secondary.unwrap_or_default();
            let size = Metric::MatchesPlayed.column();
            let size = dataset.schema().has_column(size).then_some(size);
            ChartData::Points {
                x_label: req.primary.clone(),
                y_label: y.to_string(),
                size_label: size.map(str::to_string),
                series: scatter_series(dataset, &req.primary, y, size),
            }
        }
        ChartKind::Radar => {
            let spec = AggregationSpec::new(req.metrics.clone(), AggregationMethod::Mean)?;
            radar(&aggregate(dataset, &spec)?)
        }
        ChartKind::Box | ChartKind::Violin => {
            let violin = req.kind == ChartKind::Violin;
            let density_points = violin.then_some(req.density_points);
            ChartData::Distributions {
                y_label: req.primary.clone(),
                violin,
                groups: distributions(dataset, &req.primary, density_points),
            }
        }
        ChartKind::Heatmap => {
            let spec = AggregationSpec::new(req.metrics.clone(), AggregationMethod::Mean)?;
            ChartData::Heatmap(matrix(&aggregate(dataset, &spec)?))
        }
        ChartKind::ParallelCoordinates => parallel(dataset, &req.metrics),
        ChartKind::ScatterMatrix => {
            return Err(DataError::UnsupportedChart(req.kind.to_string()));
        }
    };
    Ok(data)
}

/// Players in order of first appearance.
fn player_order(dataset: &Dataset) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for r in dataset.records() {
        if !out.contains(&r.player) {
            out.push(r.player.clone());
        }
    }
    out
}

/// One category per player, one bar group per year; duplicate player-years
/// are averaged.
fn bars_by_year(dataset: &Dataset, metric: &str) -> ChartData {
    let categories = player_order(dataset);
    let col_of: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, p)| (p.as_str(), i))
        .collect();

    let groups = dataset
        .years()
        .iter()
        .map(|&year| {
            let mut accs = vec![Accumulator::default(); categories.len()];
            for r in dataset.records().iter().filter(|r| r.year == year) {
                if let (Some(&i), Some(v)) = (col_of.get(r.player.as_str()), r.numeric(metric)) {
                    accs[i].push(v);
                }
            }
            BarGroup {
                name: year.to_string(),
                values: accs.iter().map(|a| a.finish(AggregationMethod::Mean)).collect(),
            }
        })
        .collect();

    ChartData::Bars {
        y_label: metric.to_string(),
        categories,
        groups,
    }
}

fn trend_series(dataset: &Dataset, metric: &str) -> Vec<Series> {
    player_order(dataset)
        .into_iter()
        .map(|player| {
            let mut points: Vec<[f64; 2]> = dataset
                .records()
                .iter()
                .filter(|r| r.player == player)
                .filter_map(|r| Some([r.year as f64, r.numeric(metric)?]))
                .collect();
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            Series::new(player, points)
        })
        .collect()
}

/// One series per player. With a `size` column each marker is sized by its
/// value, min–max scaled across all plotted points; a missing size is the
/// smallest marker.
fn scatter_series(dataset: &Dataset, x: &str, y: &str, size: Option<&str>) -> Vec<Series> {
    let raw: Vec<(String, Vec<[f64; 2]>, Vec<Option<f64>>)> = player_order(dataset)
        .into_iter()
        .map(|player| {
            let (points, sizes): (Vec<[f64; 2]>, Vec<Option<f64>>) = dataset
                .records()
                .iter()
                .filter(|r| r.player == player)
                .filter_map(|r| {
                    let point = [r.numeric(x)?, r.numeric(y)?];
                    Some((point, size.and_then(|s| r.numeric(s))))
                })
                .unzip();
            (player, points, sizes)
        })
        .collect();

    if size.is_none() {
        return raw
            .into_iter()
            .map(|(player, points, _)| Series::new(player, points))
            .collect();
    }
    let all: Vec<Option<f64>> = raw.iter().flat_map(|(_, _, s)| s.iter().copied()).collect();
    let mut scaled = min_max_scale(&all).into_iter();
    raw.into_iter()
        .map(|(name, points, sizes)| Series {
            sizes: scaled
                .by_ref()
                .take(sizes.len())
                .map(|t| t.unwrap_or(0.0))
                .collect(),
            name,
            points,
        })
        .collect()
}

fn distributions(
    dataset: &Dataset,
    metric: &str,
    density_points: Option<usize>,
) -> Vec<Distribution> {
    player_order(dataset)
        .into_iter()
        .filter_map(|player| {
            let mut values: Vec<f64> = dataset
                .records()
                .iter()
                .filter(|r| r.player == player)
                .filter_map(|r| r.numeric(metric))
                .collect();
            values.sort_by(f64::total_cmp);
            let spread = five_number(&values)?;
            let density = density_points
                .map(|n| kernel_density(&values, n))
                .unwrap_or_default();
            Some(Distribution {
                name: player,
                spread,
                density,
            })
        })
        .collect()
}

/// Whiskers at the data extremes; `None` for an empty slice.
pub fn five_number(sorted: &[f64]) -> Option<FiveNumber> {
    Some(FiveNumber {
        lower: *sorted.first()?,
        q1: quantile(sorted, 0.25)?,
        median: quantile(sorted, 0.5)?,
        q3: quantile(sorted, 0.75)?,
        upper: *sorted.last()?,
    })
}

/// Gaussian kernel density estimate with Silverman's bandwidth, sampled at
/// `points` evenly spaced values spanning the data plus three bandwidths.
pub fn kernel_density(sorted: &[f64], points: usize) -> Vec<[f64; 2]> {
    let (Some(&lo), Some(&hi)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if points < 2 {
        return Vec::new();
    }
    let n = sorted.len() as f64;
    let bandwidth = match sample_std(sorted) {
        Some(s) if s > f64::EPSILON => 1.06 * s * n.powf(-0.2),
        _ => (lo.abs() * 0.1).max(1.0),
    };
    let start = lo - 3.0 * bandwidth;
    let step = (hi - lo + 6.0 * bandwidth) / (points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (std::f64::consts::TAU).sqrt());

    (0..points)
        .map(|i| {
            let x = start + step * i as f64;
            let d: f64 = sorted
                .iter()
                .map(|xi| (-0.5 * ((x - xi) / bandwidth).powi(2)).exp())
                .sum();
            [x, d * norm]
        })
        .collect()
}

fn parallel(dataset: &Dataset, axes: &[String]) -> ChartData {
    let raw: Vec<Vec<Option<f64>>> = axes
        .iter()
        .map(|axis| dataset.records().iter().map(|r| r.numeric(axis)).collect())
        .collect();
    let scaled: Vec<Vec<Option<f64>>> = raw.iter().map(|col| min_max_scale(col)).collect();

    let lines = dataset
        .records()
        .iter()
        .enumerate()
        .map(|(row, r)| ScaledSeries {
            name: r.player.clone(),
            values: scaled.iter().map(|col| col[row]).collect(),
        })
        .collect();

    ChartData::Parallel {
        axes: axes.to_vec(),
        lines,
    }
}

// ---------------------------------------------------------------------------
// Shaping from a summary table
// ---------------------------------------------------------------------------

/// Reshape an aggregated comparison for one of [`ChartKind::SUMMARY`].
pub fn shape_summary(table: &SummaryTable, kind: ChartKind) -> Result<ChartData, DataError> {
    if table.is_empty() {
        return Ok(ChartData::Empty);
    }
    let data = match kind {
        ChartKind::Bar => ChartData::Bars {
            y_label: table.method.to_string(),
            categories: table.players().map(str::to_string).collect(),
            groups: table
                .metrics
                .iter()
                .enumerate()
                .map(|(i, m)| BarGroup {
                    name: m.clone(),
                    values: table.rows.iter().map(|r| r.values[i]).collect(),
                })
                .collect(),
        },
        ChartKind::Line => ChartData::Lines {
            x_label: "Metric".into(),
            y_label: table.method.to_string(),
            series: table
                .rows
                .iter()
                .map(|r| {
                    let points = r
                        .values
                        .iter()
                        .enumerate()
                        .filter_map(|(i, v)| Some([i as f64, (*v)?]))
                        .collect();
                    Series::new(r.player.clone(), points)
                })
                .collect(),
        },
        ChartKind::ScatterMatrix => ChartData::ScatterMatrix(PairGrid {
            dimensions: table.metrics.clone(),
            players: table.players().map(str::to_string).collect(),
            values: table.rows.iter().map(|r| r.values.clone()).collect(),
        }),
        ChartKind::Radar => radar(table),
        ChartKind::Heatmap => ChartData::Heatmap(matrix(table)),
        other => return Err(DataError::UnsupportedChart(other.to_string())),
    };
    Ok(data)
}

fn radar(table: &SummaryTable) -> ChartData {
    let scaled = scale_columns(table);
    ChartData::Radar {
        axes: table.metrics.clone(),
        series: table
            .rows
            .iter()
            .zip(scaled)
            .map(|(r, values)| ScaledSeries {
                name: r.player.clone(),
                values,
            })
            .collect(),
    }
}

fn matrix(table: &SummaryTable) -> Matrix {
    Matrix {
        rows: table.players().map(str::to_string).collect(),
        columns: table.metrics.clone(),
        values: table.rows.iter().map(|r| r.values.clone()).collect(),
        scaled: scale_columns(table),
    }
}

/// Min–max scale each metric column across the table's rows; returns rows.
fn scale_columns(table: &SummaryTable) -> Vec<Vec<Option<f64>>> {
    let columns: Vec<Vec<Option<f64>>> = (0..table.metrics.len())
        .map(|i| min_max_scale(&table.rows.iter().map(|r| r.values[i]).collect::<Vec<_>>()))
        .collect();
    (0..table.rows.len())
        .map(|row| columns.iter().map(|col| col[row]).collect())
        .collect()
}

/// Scale present values to `0..=1`. A constant column maps to 0.
pub fn min_max_scale(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present = values.iter().flatten();
    let min = present.clone().copied().fold(f64::INFINITY, f64::min);
    let max = present.copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    values
        .iter()
        .map(|v| {
            v.map(|v| {
                if range.abs() < f64::EPSILON {
                    0.0
                } else {
                    (v - min) / range
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSpec};
    use crate::data::loader::load_csv;

    const CSV: &str = "\
Player_Name,Year,Runs_Scored,Wickets_Taken,Matches_Played
A,2020,500,3,10
B,2020,600,,12
A,2021,700,5,11
B,2021,100,1,9
";

    fn dataset() -> Dataset {
        load_csv(CSV.as_bytes()).unwrap()
    }

    fn request(kind: ChartKind) -> ChartRequest {
        ChartRequest {
            kind,
            primary: "Runs_Scored".into(),
            secondary: None,
            metrics: vec!["Runs_Scored".into(), "Wickets_Taken".into()],
            density_points: 16,
        }
    }

    #[test]
    fn bars_group_by_year() {
        let data = shape(&dataset(), &request(ChartKind::Bar)).unwrap();
        let ChartData::Bars { categories, groups, .. } = data else {
            panic!("expected bars");
        };
        assert_eq!(categories, vec!["A", "B"]);
        assert_eq!(groups[0].name, "2020");
        assert_eq!(groups[0].values, vec![Some(500.0), Some(600.0)]);
        assert_eq!(groups[1].values, vec![Some(700.0), Some(100.0)]);
    }

    #[test]
    fn lines_are_sorted_by_year() {
        let csv = "Player_Name,Year,Runs_Scored\nA,2022,3\nA,2020,1\nA,2021,\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        let ChartData::Lines { series, .. } = shape(&ds, &request(ChartKind::Line)).unwrap() else {
            panic!("expected lines");
        };
        assert_eq!(series[0].points, vec![[2020.0, 1.0], [2022.0, 3.0]]);
    }

    #[test]
    fn scatter_needs_a_secondary_metric() {
        let ds = dataset();
        assert_eq!(
            shape(&ds, &request(ChartKind::Scatter)),
            Err(DataError::MissingSecondaryMetric("Scatter Plot".into()))
        );
        let mut req = request(ChartKind::Scatter);
        req.secondary = Some("Wickets_Taken".into());
        let ChartData::Points {
            size_label, series, ..
        } = shape(&ds, &req).unwrap()
        else {
            panic!("expected points");
        };
        // B's 2020 row has no wickets and is skipped
        assert_eq!(series[1].points, vec![[100.0, 1.0]]);
        // marker size follows matches played, 9..=11 across plotted points
        assert_eq!(size_label.as_deref(), Some("Matches_Played"));
        assert_eq!(series[0].sizes, vec![0.5, 1.0]);
        assert_eq!(series[1].sizes, vec![0.0]);
    }

    #[test]
    fn scatter_markers_are_uniform_without_matches_played() {
        let csv = "Player_Name,Year,Runs_Scored,Wickets_Taken\nA,2020,5,1\nA,2021,7,2\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        let mut req = request(ChartKind::Scatter);
        req.secondary = Some("Wickets_Taken".into());
        let ChartData::Points {
            size_label, series, ..
        } = shape(&ds, &req).unwrap()
        else {
            panic!("expected points");
        };
        assert_eq!(size_label, None);
        assert_eq!(series[0].points, vec![[5.0, 1.0], [7.0, 2.0]]);
        assert!(series[0].sizes.is_empty());
    }

    #[test]
    fn radar_scales_each_metric_across_players() {
        let data = shape(&dataset(), &request(ChartKind::Radar)).unwrap();
        let ChartData::Radar { axes, series } = data else {
            panic!("expected radar");
        };
        assert_eq!(axes, vec!["Runs_Scored", "Wickets_Taken"]);
        // means: A runs 600 wk 4, B runs 350 wk 1
        assert_eq!(series[0].values, vec![Some(1.0), Some(1.0)]);
        assert_eq!(series[1].values, vec![Some(0.0), Some(0.0)]);
        let poly = series[0].radar_polygon();
        assert_eq!(poly.len(), 3);
        assert!((poly[0][1] - 1.0).abs() < 1e-12);
        assert_eq!(poly[0], poly[2]);
    }

    #[test]
    fn radar_recomputes_scale_for_the_filtered_players() {
        let ds = dataset();
        let only_2021 = filter(&ds, &FilterSpec::all(&ds).with_years(2021, 2021));
        let ChartData::Radar { series, .. } = shape(&only_2021, &request(ChartKind::Radar)).unwrap()
        else {
            panic!("expected radar");
        };
        assert_eq!(series[0].values, vec![Some(1.0), Some(1.0)]);
        assert_eq!(series[1].values, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn box_and_violin_summaries() {
        let ds = dataset();
        let data = shape(&ds, &request(ChartKind::Box)).unwrap();
        let ChartData::Distributions { violin, groups, .. } = data else {
            panic!("expected distributions");
        };
        assert!(!violin);
        assert_eq!(
            groups[0].spread,
            FiveNumber {
                lower: 500.0,
                q1: 550.0,
                median: 600.0,
                q3: 650.0,
                upper: 700.0
            }
        );
        assert!(groups[0].density.is_empty());

        let data = shape(&ds, &request(ChartKind::Violin)).unwrap();
        let ChartData::Distributions { groups, .. } = data else {
            panic!("expected distributions");
        };
        assert_eq!(groups[0].density.len(), 16);
    }

    #[test]
    fn kernel_density_integrates_to_about_one() {
        let values = [1.0, 2.0, 2.5, 4.0];
        let d = kernel_density(&values, 400);
        let step = d[1][0] - d[0][0];
        let area: f64 = d.iter().map(|p| p[1] * step).sum();
        assert!((area - 1.0).abs() < 0.02, "area was {area}");
        assert!(kernel_density(&[], 10).is_empty());
        assert_eq!(kernel_density(&[5.0], 10).len(), 10);
    }

    #[test]
    fn heatmap_keeps_raw_and_scaled_values() {
        let ChartData::Heatmap(m) = shape(&dataset(), &request(ChartKind::Heatmap)).unwrap() else {
            panic!("expected heatmap");
        };
        assert_eq!(m.rows, vec!["A", "B"]);
        assert_eq!(m.values[1], vec![Some(350.0), Some(1.0)]);
        assert_eq!(m.scaled[1], vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn parallel_coordinates_scale_per_axis() {
        let ChartData::Parallel { lines, .. } =
            shape(&dataset(), &request(ChartKind::ParallelCoordinates)).unwrap()
        else {
            panic!("expected parallel");
        };
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].name, "B");
        assert_eq!(lines[1].values, vec![Some(500.0 / 600.0), None]);
        assert_eq!(lines[3].values, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn absent_columns_are_rejected_before_shaping() {
        let mut req = request(ChartKind::Heatmap);
        req.metrics.push("Economy_Rate".into());
        assert_eq!(
            shape(&dataset(), &req),
            Err(DataError::Column("Economy_Rate".into()))
        );
        let mut req = request(ChartKind::Line);
        req.primary = "Nope".into();
        assert_eq!(shape(&dataset(), &req), Err(DataError::Column("Nope".into())));
    }

    #[test]
    fn empty_view_renders_as_empty() {
        let ds = dataset();
        let none = filter(&ds, &FilterSpec::all(&ds).with_years(1900, 1901));
        for kind in ChartKind::ALL {
            let mut req = request(kind);
            req.secondary = Some("Wickets_Taken".into());
            assert_eq!(shape(&none, &req), Ok(ChartData::Empty), "{kind}");
        }
    }

    #[test]
    fn summary_shapes() {
        let metrics = ["Runs_Scored", "Matches_Played"];
        let spec = AggregationSpec::new(metrics, AggregationMethod::Sum).unwrap();
        let table = aggregate(&dataset(), &spec).unwrap();

        let data = shape_summary(&table, ChartKind::Bar).unwrap();
        let ChartData::Bars { categories, groups, .. } = data else {
            panic!("expected bars");
        };
        assert_eq!(categories, vec!["A", "B"]);
        assert_eq!(groups[1].name, "Matches_Played");
        assert_eq!(groups[1].values, vec![Some(21.0), Some(21.0)]);

        let ChartData::Lines { series, .. } = shape_summary(&table, ChartKind::Line).unwrap() else {
            panic!("expected lines");
        };
        assert_eq!(series[0].points, vec![[0.0, 1200.0], [1.0, 21.0]]);

        assert_eq!(
            shape_summary(&table, ChartKind::Violin),
            Err(DataError::UnsupportedChart("Violin Plot".into()))
        );
    }

    #[test]
    fn scatter_matrix_pairs_every_dimension() {
        let metrics = ["Runs_Scored", "Wickets_Taken"];
        let spec = AggregationSpec::new(metrics, AggregationMethod::Max).unwrap();
        let table = aggregate(&dataset(), &spec).unwrap();
        let ChartData::ScatterMatrix(grid) =
            shape_summary(&table, ChartKind::ScatterMatrix).unwrap()
        else {
            panic!("expected scatter matrix");
        };
        assert_eq!(grid.dimensions, vec!["Runs_Scored", "Wickets_Taken"]);
        assert_eq!(grid.players, vec!["A", "B"]);

        // runs on x, wickets on y
        let panel = grid.panel(1, 0);
        assert_eq!(panel.len(), 2);
        assert_eq!(panel[0].name, "A");
        assert_eq!(panel[0].points, vec![[700.0, 5.0]]);
        assert_eq!(panel[1].points, vec![[600.0, 1.0]]);

        let diagonal = grid.panel(0, 0);
        assert_eq!(diagonal[1].points, vec![[600.0, 600.0]]);
        assert!(grid.panel(2, 0).is_empty());
    }

    #[test]
    fn scatter_matrix_skips_players_missing_a_value() {
        let csv = "Player_Name,Year,Runs_Scored,Wickets_Taken\nA,2020,5,\nB,2020,7,2\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        let metrics = ["Runs_Scored", "Wickets_Taken"];
        let spec = AggregationSpec::new(metrics, AggregationMethod::Mean).unwrap();
        let table = aggregate(&ds, &spec).unwrap();
        let ChartData::ScatterMatrix(grid) =
            shape_summary(&table, ChartKind::ScatterMatrix).unwrap()
        else {
            panic!("expected scatter matrix");
        };
        let names: Vec<String> = grid.panel(0, 1).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["B"]);
        assert_eq!(grid.panel(0, 0).len(), 2);
    }

    #[test]
    fn scatter_matrix_is_summary_only() {
        assert_eq!(
            shape(&dataset(), &request(ChartKind::ScatterMatrix)),
            Err(DataError::UnsupportedChart("Scatter Matrix".into()))
        );
    }

    #[test]
    fn constant_columns_scale_to_zero() {
        assert_eq!(
            min_max_scale(&[Some(2.0), None, Some(2.0)]),
            vec![Some(0.0), None, Some(0.0)]
        );
        assert_eq!(min_max_scale(&[]), Vec::<Option<f64>>::new());
    }
}

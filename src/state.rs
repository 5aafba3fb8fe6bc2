use std::path::Path;
use std::sync::Arc;

use crate::chart::{self, ChartData, ChartKind, ChartRequest};
use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::aggregate::{aggregate, AggregationMethod, AggregationSpec, SummaryTable};
use crate::data::error::{DataError, LoadError};
use crate::data::filter::{filter, FilterSpec};
use crate::data::loader;
use crate::data::model::{Dataset, Metric};

// ---------------------------------------------------------------------------
// User selections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Explorer,
    Analysis,
    Comparison,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Explorer, Page::Analysis, Page::Comparison];

    pub fn label(self) -> &'static str {
        match self {
            Page::Explorer => "📊 Data Explorer",
            Page::Analysis => "📈 Performance Analysis",
            Page::Comparison => "🔍 Advanced Comparisons",
        }
    }
}

/// Everything the user chose. A recomputation is a pure function of a
/// dataset snapshot and this value.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub filter: FilterSpec,
    pub chart: ChartRequest,
    pub comparison_metrics: Vec<String>,
    pub comparison_method: AggregationMethod,
    pub comparison_chart: ChartKind,
}

impl Controls {
    /// Defaults for a freshly loaded dataset: everything visible, runs as the
    /// primary metric when present.
    pub fn for_dataset(dataset: &Dataset, config: &AppConfig) -> Self {
        let columns = dataset.analysis_columns();
        let primary = columns
            .iter()
            .find(|c| c.as_str() == Metric::RunsScored.column())
            .or_else(|| columns.first())
            .cloned()
            .unwrap_or_default();
        Controls {
            filter: FilterSpec::all(dataset),
            chart: ChartRequest {
                kind: ChartKind::default(),
                primary,
                secondary: None,
                metrics: columns.iter().take(config.default_chart_metrics).cloned().collect(),
                density_points: config.density_points,
            },
            comparison_metrics: columns
                .iter()
                .take(config.default_comparison_metrics)
                .cloned()
                .collect(),
            comparison_method: AggregationMethod::default(),
            comparison_chart: ChartKind::Bar,
        }
    }
}

// ---------------------------------------------------------------------------
// Recomputation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub table: SummaryTable,
    pub chart: ChartData,
}

/// Output of one Filter → Aggregate → Chart pass.
#[derive(Debug, Clone)]
pub struct Recomputed {
    pub filtered: Arc<Dataset>,
    pub chart: Result<ChartData, DataError>,
    pub comparison: Result<Comparison, DataError>,
}

pub fn recompute(dataset: &Dataset, controls: &Controls) -> Recomputed {
    let filtered = filter(dataset, &controls.filter);

    let chart = if controls.chart.primary.is_empty() && !controls.chart.kind.is_multi_metric() {
        Err(DataError::NoMetrics)
    } else {
        chart::shape(&filtered, &controls.chart)
    };

    let comparison = AggregationSpec::new(
        controls.comparison_metrics.iter().cloned(),
        controls.comparison_method,
    )
    .and_then(|spec| aggregate(&filtered, &spec))
    .and_then(|table| {
        let chart = chart::shape_summary(&table, controls.comparison_chart)?;
        Ok(Comparison { table, chart })
    });

    log::debug!(
        "recomputed: {} of {} rows, chart ok: {}, comparison rows: {:?}",
        filtered.len(),
        dataset.len(),
        chart.is_ok(),
        comparison.as_ref().map(|c| c.table.len()).ok()
    );

    Recomputed {
        filtered: Arc::new(filtered),
        chart,
        comparison,
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One loaded file. Replaced wholesale on the next successful load.
pub struct Session {
    pub dataset: Arc<Dataset>,
    /// File name the dataset came from.
    pub source: String,
    /// Player colours, fixed for the session.
    pub colors: ColorMap,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded dataset (None until user loads a file).
    pub session: Option<Session>,

    pub controls: Controls,
    pub page: Page,

    /// Rows passing the current filter.
    pub filtered: Option<Arc<Dataset>>,

    /// Last successfully shaped chart and the error of the latest attempt.
    pub chart: Option<ChartData>,
    pub chart_error: Option<String>,

    /// Last successful comparison and the error of the latest attempt.
    pub comparison: Option<Comparison>,
    pub comparison_error: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: None,
            controls: Controls {
                filter: FilterSpec::default(),
                chart: ChartRequest {
                    kind: ChartKind::default(),
                    primary: String::new(),
                    secondary: None,
                    metrics: Vec::new(),
                    density_points: 0,
                },
                comparison_metrics: Vec::new(),
                comparison_method: AggregationMethod::default(),
                comparison_chart: ChartKind::Bar,
            },
            page: Page::default(),
            filtered: None,
            chart: None,
            chart_error: None,
            comparison: None,
            comparison_error: None,
            status_message: None,
        }
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.session.as_ref().map(|s| &s.dataset)
    }

    /// Ingest a newly loaded dataset and reset every control to its default.
    pub fn set_dataset(&mut self, dataset: Dataset, source: impl Into<String>) {
        let source = source.into();
        self.status_message = match dataset.type_errors().len() {
            0 => None,
            n => Some(format!("{n} cells in {source} could not be read and were left empty")),
        };
        self.controls = Controls::for_dataset(&dataset, &self.config);
        self.session = Some(Session {
            colors: ColorMap::new(dataset.players()),
            dataset: Arc::new(dataset),
            source,
        });
        self.chart = None;
        self.comparison = None;
        self.refresh();
    }

    /// Load a file from disk. On failure the previous dataset stays active.
    pub fn load_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.finish_load(loader::load_file(path), name);
    }

    /// Load uploaded bytes (drag-and-drop).
    pub fn load_bytes(&mut self, bytes: &[u8], name: &str) {
        self.finish_load(loader::load_bytes(bytes, name), name.to_string());
    }

    fn finish_load(&mut self, result: Result<Dataset, LoadError>, name: String) {
        match result {
            Ok(dataset) => self.set_dataset(dataset, name),
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                self.status_message = Some(format!("Error loading {name}: {e}"));
            }
        }
    }

    /// Re-run the pipeline for the current controls. Failed steps keep the
    /// last successful output on screen.
    pub fn refresh(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let out = recompute(&session.dataset, &self.controls);
        self.filtered = Some(out.filtered);

        match out.chart {
            Ok(chart) => {
                self.chart = Some(chart);
                self.chart_error = None;
            }
            Err(e) => self.chart_error = Some(e.to_string()),
        }
        match out.comparison {
            Ok(cmp) => {
                self.comparison = Some(cmp);
                self.comparison_error = None;
            }
            Err(e) => self.comparison_error = Some(e.to_string()),
        }
    }

    /// Toggle a player in the selection. Returns `false` when adding would
    /// exceed the configured cap.
    pub fn toggle_player(&mut self, player: &str) -> bool {
        let selected = &mut self.controls.filter.players;
        if !selected.remove(player) {
            if selected.len() >= self.config.max_selected_players {
                return false;
            }
            selected.insert(player.to_string());
        }
        true
    }

    /// Number of distinct players in the current filtered view.
    pub fn visible_players(&self) -> usize {
        self.filtered.as_ref().map_or(0, |f| f.players().len())
    }
}

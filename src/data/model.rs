use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::error::{CellTypeError, DataError, SchemaError};
use super::stats::{describe_column, ColumnStats};

/// Identifying column holding the player name.
pub const PLAYER_COLUMN: &str = "Player_Name";
/// Identifying column holding the season year.
pub const YEAR_COLUMN: &str = "Year";

// ---------------------------------------------------------------------------
// Metric – the recognised numeric performance columns
// ---------------------------------------------------------------------------

/// The performance metrics the dashboard knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    MatchesPlayed,
    RunsScored,
    BattingAverage,
    BattingStrikeRate,
    Centuries,
    HalfCenturies,
    WicketsTaken,
    BowlingAverage,
    EconomyRate,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::MatchesPlayed,
        Metric::RunsScored,
        Metric::BattingAverage,
        Metric::BattingStrikeRate,
        Metric::Centuries,
        Metric::HalfCenturies,
        Metric::WicketsTaken,
        Metric::BowlingAverage,
        Metric::EconomyRate,
    ];

    /// Header name of the metric in the input file.
    pub fn column(self) -> &'static str {
        match self {
            Metric::MatchesPlayed => "Matches_Played",
            Metric::RunsScored => "Runs_Scored",
            Metric::BattingAverage => "Batting_Average",
            Metric::BattingStrikeRate => "Batting_Strike_Rate",
            Metric::Centuries => "Centuries",
            Metric::HalfCenturies => "Half_Centuries",
            Metric::WicketsTaken => "Wickets_Taken",
            Metric::BowlingAverage => "Bowling_Average",
            Metric::EconomyRate => "Economy_Rate",
        }
    }

    pub fn from_column(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.column() == name)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common CSV/Parquet dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Absent or uncoercible cell; excluded from every aggregate.
    Missing,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Missing => write!(f, "–"),
        }
    }
}

impl Value {
    /// Infer the narrowest type for a raw text cell.
    pub fn guess(s: &str) -> Value {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
            return Value::Missing;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        if s == "true" || s == "false" {
            return Value::Bool(s == "true");
        }
        Value::Text(s.to_string())
    }

    /// Interpret the value as an `f64` for aggregation and plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

// ---------------------------------------------------------------------------
// Record – one player-season row
// ---------------------------------------------------------------------------

/// One row of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub player: String,
    pub year: i32,
    /// Every other column of the row: column_name → value.
    pub cells: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(player: impl Into<String>, year: i32) -> Self {
        Record {
            player: player.into(),
            year,
            cells: BTreeMap::new(),
        }
    }

    /// Builder-style helper, mostly for constructing fixtures.
    pub fn with(mut self, column: &str, value: Value) -> Self {
        self.cells.insert(column.to_string(), value);
        self
    }

    /// Numeric value of `column` for this row, `None` when missing or non-numeric.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        if column == YEAR_COLUMN {
            return Some(self.year as f64);
        }
        self.cells.get(column).and_then(Value::as_f64)
    }

    /// The cell of `column` as a [`Value`], including the identifying columns.
    pub fn value(&self, column: &str) -> Value {
        match column {
            PLAYER_COLUMN => Value::Text(self.player.clone()),
            YEAR_COLUMN => Value::Integer(self.year as i64),
            _ => self.cells.get(column).cloned().unwrap_or(Value::Missing),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema – which columns the file declared
// ---------------------------------------------------------------------------

/// The explicit set of present columns, checked before any metric access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// All header names in file order.
    columns: Vec<String>,
    /// Recognised metric columns that are present, in file order.
    metrics: Vec<Metric>,
}

/// Header text as the schema sees it: byte-order mark and surrounding
/// whitespace removed.
pub fn normalize_header(raw: &str) -> &str {
    raw.trim().trim_start_matches('\u{feff}').trim()
}

impl Schema {
    /// Validate a header row. `Player_Name` and `Year` are required.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, SchemaError> {
        let mut columns: Vec<String> = Vec::with_capacity(headers.len());
        for h in headers {
            let h = normalize_header(h.as_ref());
            if !h.is_empty() && !columns.iter().any(|c| c == h) {
                columns.push(h.to_string());
            }
        }
        if columns.is_empty() {
            return Err(SchemaError::NoHeader);
        }
        for required in [PLAYER_COLUMN, YEAR_COLUMN] {
            if !columns.iter().any(|c| c == required) {
                return Err(SchemaError::MissingRequiredColumn(required.to_string()));
            }
        }
        let metrics = columns
            .iter()
            .filter_map(|c| Metric::from_column(c))
            .collect();
        Ok(Schema { columns, metrics })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Columns that are neither identifying nor recognised metrics.
    pub fn extras(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| {
                *c != PLAYER_COLUMN && *c != YEAR_COLUMN && Metric::from_column(c).is_none()
            })
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An immutable table of records plus indices derived once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
    type_errors: Vec<CellTypeError>,
    years: BTreeSet<i32>,
    players: BTreeSet<String>,
    stats: Vec<ColumnStats>,
}

impl Dataset {
    /// Build derived indices and column statistics from loaded records.
    pub fn new(schema: Schema, records: Vec<Record>, type_errors: Vec<CellTypeError>) -> Self {
        let years = records.iter().map(|r| r.year).collect();
        let players = records.iter().map(|r| r.player.clone()).collect();
        let stats = schema
            .columns()
            .iter()
            .map(|col| describe_column(col, records.iter().map(|r| r.value(col))))
            .collect();
        Dataset {
            schema,
            records,
            type_errors,
            years,
            players,
            stats,
        }
    }

    /// A view over a subset of rows sharing this dataset's schema.
    pub fn with_records(&self, records: Vec<Record>) -> Dataset {
        Dataset::new(self.schema.clone(), records, Vec::new())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cells that failed numeric coercion during load.
    pub fn type_errors(&self) -> &[CellTypeError] {
        &self.type_errors
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Distinct player names, sorted.
    pub fn players(&self) -> &BTreeSet<String> {
        &self.players
    }

    /// Observed inclusive `(min, max)` year, `None` for an empty dataset.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    /// Per-column summary statistics, in header order.
    pub fn stats(&self) -> &[ColumnStats] {
        &self.stats
    }

    pub fn column_stats(&self, column: &str) -> Option<&ColumnStats> {
        self.stats.iter().find(|s| s.column == column)
    }

    /// Reject any column that is absent or is the grouping key.
    pub fn require_metric(&self, column: &str) -> Result<(), DataError> {
        if column == PLAYER_COLUMN || !self.schema.has_column(column) {
            return Err(DataError::Column(column.to_string()));
        }
        Ok(())
    }

    /// Columns offered for analysis: recognised metrics first, then extra
    /// columns that hold numbers and no text.
    pub fn analysis_columns(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .schema
            .metrics()
            .iter()
            .map(|m| m.column().to_string())
            .collect();
        for extra in self.schema.extras() {
            let numeric_only = self.records.iter().all(|r| {
                r.cells
                    .get(extra)
                    .map_or(true, |v| v.is_missing() || v.is_numeric())
            });
            let any_numeric = self.records.iter().any(|r| r.numeric(extra).is_some());
            if numeric_only && any_numeric {
                out.push(extra.to_string());
            }
        }
        out
    }
}

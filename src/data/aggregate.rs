use std::collections::HashMap;
use std::fmt;

use super::error::DataError;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Aggregation method
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AggregationMethod {
    #[default]
    Mean,
    Sum,
    Max,
    Min,
}

impl AggregationMethod {
    pub const ALL: [AggregationMethod; 4] = [
        AggregationMethod::Mean,
        AggregationMethod::Sum,
        AggregationMethod::Max,
        AggregationMethod::Min,
    ];
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AggregationMethod::Mean => "Mean",
            AggregationMethod::Sum => "Sum",
            AggregationMethod::Max => "Max",
            AggregationMethod::Min => "Min",
        })
    }
}

/// Running state for one (player, metric) cell. Missing values never reach it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    pub fn push(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    /// `sum` of an all-missing group is 0.0; the other methods report missing.
    pub fn finish(&self, method: AggregationMethod) -> Option<f64> {
        match method {
            AggregationMethod::Mean => (self.count > 0).then(|| self.sum / self.count as f64),
            AggregationMethod::Sum => Some(self.sum),
            AggregationMethod::Max => self.max,
            AggregationMethod::Min => self.min,
        }
    }
}

// ---------------------------------------------------------------------------
// AggregationSpec / SummaryTable
// ---------------------------------------------------------------------------

/// Metrics to summarise per player and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSpec {
    metrics: Vec<String>,
    pub method: AggregationMethod,
}

impl AggregationSpec {
    /// Duplicate metric names are collapsed; an empty list is rejected.
    pub fn new<I, S>(metrics: I, method: AggregationMethod) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for m in metrics {
            let m = m.into();
            if !unique.contains(&m) {
                unique.push(m);
            }
        }
        if unique.is_empty() {
            return Err(DataError::NoMetrics);
        }
        Ok(Self {
            metrics: unique,
            method,
        })
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub player: String,
    /// One entry per metric of the table; `None` is the missing marker.
    pub values: Vec<Option<f64>>,
}

/// One row per player, one column per selected metric.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub metrics: Vec<String>,
    pub method: AggregationMethod,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.player.as_str())
    }

    pub fn metric_index(&self, metric: &str) -> Option<usize> {
        self.metrics.iter().position(|m| m == metric)
    }

    pub fn get(&self, player: &str, metric: &str) -> Option<f64> {
        let col = self.metric_index(metric)?;
        self.rows
            .iter()
            .find(|r| r.player == player)
            .and_then(|r| r.values[col])
    }

    /// All values of one metric, in row order.
    pub fn column(&self, metric: &str) -> Option<Vec<Option<f64>>> {
        let col = self.metric_index(metric)?;
        Some(self.rows.iter().map(|r| r.values[col]).collect())
    }
}

/// Group records by player (first appearance order) and summarise each
/// selected metric. Every metric is validated before any work is done.
pub fn aggregate(dataset: &Dataset, spec: &AggregationSpec) -> Result<SummaryTable, DataError> {
    for metric in spec.metrics() {
        dataset.require_metric(metric)?;
    }

    let n_metrics = spec.metrics().len();
    let mut order: Vec<(String, Vec<Accumulator>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in dataset.records() {
        let slot = *index.entry(record.player.as_str()).or_insert_with(|| {
            order.push((record.player.clone(), vec![Accumulator::default(); n_metrics]));
            order.len() - 1
        });
        let accs = &mut order[slot].1;
        for (acc, metric) in accs.iter_mut().zip(spec.metrics()) {
            if let Some(v) = record.numeric(metric) {
                acc.push(v);
            }
        }
    }

    let rows = order
        .into_iter()
        .map(|(player, accs)| SummaryRow {
            player,
            values: accs.iter().map(|a| a.finish(spec.method)).collect(),
        })
        .collect();

    Ok(SummaryTable {
        metrics: spec.metrics().to_vec(),
        method: spec.method,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSpec};
    use crate::data::loader::load_csv;

    fn sample() -> Dataset {
        let csv = "\
Player_Name,Year,Runs_Scored,Wickets_Taken
A,2020,500,3
B,2020,600,bad
A,2021,700,
";
        load_csv(csv.as_bytes()).unwrap()
    }

    fn runs(method: AggregationMethod) -> AggregationSpec {
        AggregationSpec::new(["Runs_Scored"], method).unwrap()
    }

    #[test]
    fn mean_of_a_single_year() {
        let ds = sample();
        let filtered = filter(&ds, &FilterSpec::all(&ds).with_years(2020, 2020));
        let table = aggregate(&filtered, &runs(AggregationMethod::Mean)).unwrap();
        assert_eq!(table.players().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(table.get("A", "Runs_Scored"), Some(500.0));
        assert_eq!(table.get("B", "Runs_Scored"), Some(600.0));
    }

    #[test]
    fn rows_follow_first_appearance() {
        let csv = "Player_Name,Year,Runs_Scored\nZed,2020,1\nAmy,2020,2\nZed,2021,3\n";
        let ds = load_csv(csv.as_bytes()).unwrap();
        let table = aggregate(&ds, &runs(AggregationMethod::Sum)).unwrap();
        assert_eq!(table.players().collect::<Vec<_>>(), vec!["Zed", "Amy"]);
        assert_eq!(table.len(), ds.players().len());
        assert_eq!(table.column("Runs_Scored"), Some(vec![Some(4.0), Some(2.0)]));
    }

    #[test]
    fn each_method_over_multiple_rows() {
        let ds = sample();
        let get = |m| aggregate(&ds, &runs(m)).unwrap().get("A", "Runs_Scored");
        assert_eq!(get(AggregationMethod::Mean), Some(600.0));
        assert_eq!(get(AggregationMethod::Sum), Some(1200.0));
        assert_eq!(get(AggregationMethod::Max), Some(700.0));
        assert_eq!(get(AggregationMethod::Min), Some(500.0));
    }

    #[test]
    fn sum_of_single_rows_is_identity() {
        let ds = sample();
        let filtered = filter(&ds, &FilterSpec::all(&ds).with_years(2020, 2020));
        let table = aggregate(&filtered, &runs(AggregationMethod::Sum)).unwrap();
        for r in filtered.records() {
            assert_eq!(table.get(&r.player, "Runs_Scored"), r.numeric("Runs_Scored"));
        }
    }

    #[test]
    fn missing_cells_are_excluded() {
        let ds = sample();
        let spec = |m| AggregationSpec::new(["Wickets_Taken"], m).unwrap();

        // A has 3 and a blank: mean uses only the present value.
        let mean = aggregate(&ds, &spec(AggregationMethod::Mean)).unwrap();
        assert_eq!(mean.get("A", "Wickets_Taken"), Some(3.0));
        // B's only value was unparsable.
        assert_eq!(mean.get("B", "Wickets_Taken"), None);

        let sum = aggregate(&ds, &spec(AggregationMethod::Sum)).unwrap();
        assert_eq!(sum.get("A", "Wickets_Taken"), Some(3.0));
        assert_eq!(sum.get("B", "Wickets_Taken"), Some(0.0));

        let max = aggregate(&ds, &spec(AggregationMethod::Max)).unwrap();
        assert_eq!(max.get("B", "Wickets_Taken"), None);
        let min = aggregate(&ds, &spec(AggregationMethod::Min)).unwrap();
        assert_eq!(min.get("B", "Wickets_Taken"), None);
    }

    #[test]
    fn empty_filter_gives_empty_table() {
        let ds = sample();
        let filtered = filter(&ds, &FilterSpec::all(&ds).with_years(1900, 1901));
        let table = aggregate(&filtered, &runs(AggregationMethod::Mean)).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.metrics, vec!["Runs_Scored".to_string()]);
    }

    #[test]
    fn absent_column_fails_before_computing() {
        let ds = sample();
        let spec =
            AggregationSpec::new(["Runs_Scored", "Economy_Rate"], AggregationMethod::Mean).unwrap();
        assert_eq!(
            aggregate(&ds, &spec),
            Err(DataError::Column("Economy_Rate".into()))
        );
    }

    #[test]
    fn aggregation_spec_requires_metrics_and_dedups() {
        assert_eq!(
            AggregationSpec::new(Vec::<String>::new(), AggregationMethod::Sum),
            Err(DataError::NoMetrics)
        );
        let spec = AggregationSpec::new(["a", "b", "a"], AggregationMethod::Max).unwrap();
        assert_eq!(spec.metrics(), &["a".to_string(), "b".to_string()]);
    }
}

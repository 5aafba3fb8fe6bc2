use super::model::Value;

/// Summary of one column, the equivalent of a `describe()` row plus the
/// missing-value count.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    /// Non-missing cells.
    pub count: usize,
    pub missing: usize,
    /// Numeric summaries; `None` when the column holds no numbers.
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    pub fn is_numeric(&self) -> bool {
        self.mean.is_some()
    }
}

/// Compute [`ColumnStats`] for a column's cells.
pub fn describe_column(column: &str, cells: impl Iterator<Item = Value>) -> ColumnStats {
    let mut count = 0;
    let mut missing = 0;
    let mut numbers = Vec::new();
    for cell in cells {
        if cell.is_missing() {
            missing += 1;
            continue;
        }
        count += 1;
        if let Some(v) = cell.as_f64() {
            numbers.push(v);
        }
    }
    numbers.sort_by(f64::total_cmp);

    ColumnStats {
        column: column.to_string(),
        count,
        missing,
        mean: mean(&numbers),
        std: sample_std(&numbers),
        min: numbers.first().copied(),
        q1: quantile(&numbers, 0.25),
        median: quantile(&numbers, 0.5),
        q3: quantile(&numbers, 0.75),
        max: numbers.last().copied(),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert_eq!(quantile(&v, 0.25), Some(1.75));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn describe_counts_missing_and_text() {
        let cells = vec![
            Value::Integer(2),
            Value::Missing,
            Value::Float(4.0),
            Value::Text("n/a".into()),
        ];
        let s = describe_column("x", cells.into_iter());
        assert_eq!(s.count, 3);
        assert_eq!(s.missing, 1);
        assert_eq!(s.mean, Some(3.0));
        assert_eq!(s.min, Some(2.0));
        assert_eq!(s.max, Some(4.0));
        assert!((s.std.unwrap() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn describe_text_column_has_no_numeric_summary() {
        let s = describe_column("name", vec![Value::Text("a".into())].into_iter());
        assert_eq!(s.count, 1);
        assert!(!s.is_numeric());
        assert_eq!(s.std, None);
    }
}

use std::collections::BTreeSet;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter predicate: year range + player subset
// ---------------------------------------------------------------------------

/// User-chosen row predicate.
///
/// An empty `players` set means "no player filter": every player passes.
/// The year range is always intersected with the dataset's observed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub year_min: i32,
    pub year_max: i32,
    pub players: BTreeSet<String>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            year_min: i32::MIN,
            year_max: i32::MAX,
            players: BTreeSet::new(),
        }
    }
}

impl FilterSpec {
    /// The full observed range with no player restriction (show everything).
    pub fn all(dataset: &Dataset) -> Self {
        let (year_min, year_max) = dataset.year_range().unwrap_or((i32::MIN, i32::MAX));
        Self {
            year_min,
            year_max,
            players: BTreeSet::new(),
        }
    }

    pub fn with_years(mut self, year_min: i32, year_max: i32) -> Self {
        self.year_min = year_min;
        self.year_max = year_max;
        self
    }

    pub fn with_players<I, S>(mut self, players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.players = players.into_iter().map(Into::into).collect();
        self
    }

    /// The requested year range clipped to what the dataset contains.
    /// `None` when the two do not overlap or the dataset is empty.
    pub fn effective_years(&self, dataset: &Dataset) -> Option<(i32, i32)> {
        let (lo, hi) = dataset.year_range()?;
        let lo = lo.max(self.year_min);
        let hi = hi.min(self.year_max);
        (lo <= hi).then_some((lo, hi))
    }

    fn admits_player(&self, record: &Record) -> bool {
        self.players.is_empty() || self.players.contains(&record.player)
    }
}

/// Return indices of records that pass the filter, in dataset order.
pub fn filtered_indices(dataset: &Dataset, spec: &FilterSpec) -> Vec<usize> {
    let Some((lo, hi)) = spec.effective_years(dataset) else {
        return Vec::new();
    };
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| (lo..=hi).contains(&r.year) && spec.admits_player(r))
        .map(|(i, _)| i)
        .collect()
}

/// Stable filter producing a new dataset; the input is never modified.
pub fn filter(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    let records = filtered_indices(dataset, spec)
        .into_iter()
        .map(|i| dataset.records()[i].clone())
        .collect();
    dataset.with_records(records)
}

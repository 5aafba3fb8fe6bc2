/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / dropped bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + coerce cells → Dataset (schema, records, stats)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range ∩ observed range, player subset → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  group by player, mean/sum/max/min → SummaryTable
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;

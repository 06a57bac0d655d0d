/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate file → SensorDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ SensorDataset │  Vec<SensorRecord>, detid index, label set
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  typed predicates → row indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

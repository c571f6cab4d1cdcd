/// Data layer: trip types, loading, and filtering.
///
/// Architecture:
/// ```text
///  chicago.csv / *.json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → RawTable, drop rows without timestamps,
///   └──────────┘  parse → TripDataset
///        │
///        ▼
///   ┌─────────────┐
///   │ TripDataset  │  column names, Vec<TripRecord>
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  month / day predicates, applied in place
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

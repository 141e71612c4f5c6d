/// Data layer: core types, loading, filtering and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → FlightTable (timestamps resolved per column)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  store    │  owns the base table: load once, reload, invalidate
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  airlines, then date range → filtered copy
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  filtered copy → CSV
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod store;
pub mod timestamp;

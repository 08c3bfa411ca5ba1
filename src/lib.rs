//! Budget rollups for village development plans.
//!
//! A unit-cost master (thematic area, plan column, work, unit, cost) is joined
//! against per-village planned quantities to produce a flat fact table, which
//! is then grouped by village, panchayath, mandal, thematic area or work.
//! Thematic profile views summarize the village profile and plan sheets.
pub mod aggregate;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod rollup;
pub mod select;
pub mod thematic;
pub mod types;
pub mod util;

pub use aggregate::{aggregate, AggregateSpec, AggregateTable, Dimension, FactFilter};
pub use error::{DashboardError, DashboardResult};
pub use loader::{load_unit_costs, load_workbook, CsvWorkbook, DataSource, MemoryWorkbook};
pub use rollup::{plan_for, rollup, total_budget};
pub use types::{BudgetFact, LineItem, Record, Table, UnitCostRow, VillageKey};

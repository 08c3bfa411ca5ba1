use crate::error::{DashboardError, DashboardResult};
use crate::types::{Record, Table, UnitCostRow};
use crate::util::parse_f64_safe;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const COL_THEMATIC: &str = "Thematic";
pub const COL_SOURCE_COLUMN: &str = "Source Column";
pub const COL_WORK_NAME: &str = "Name of the work";
pub const COL_UNIT: &str = "Unit";
pub const COL_UNIT_COST: &str = "Unit Cost (Rs)";
const COL_UNIT_COST_FALLBACK: &str = "Unit Cost";

/// Supplies named worksheets as record sets. The core never talks to a data
/// source directly; callers fetch tables and hand them over.
pub trait DataSource {
    fn get_worksheet(&self, name: &str) -> DashboardResult<Table>;
}

/// A directory of CSV exports, one file per worksheet (`<dir>/<name>.csv`).
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", name))
    }
}

impl DataSource for CsvWorkbook {
    fn get_worksheet(&self, name: &str) -> DashboardResult<Table> {
        let path = self.sheet_path(name);
        if !path.is_file() {
            return Err(DashboardError::MissingWorksheet(format!(
                "{} ({})",
                name,
                path.display()
            )));
        }
        let (table, report) = read_table_from_path(&path)?;
        info!(
            worksheet = name,
            rows = report.total_rows,
            skipped = report.parse_errors,
            "worksheet loaded"
        );
        Ok(table)
    }
}

/// In-memory worksheets, for tests and for embedding the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: HashMap<String, Table>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, table: Table) -> Self {
        self.sheets.insert(name.into(), table);
        self
    }
}

impl DataSource for MemoryWorkbook {
    fn get_worksheet(&self, name: &str) -> DashboardResult<Table> {
        self.sheets
            .get(name)
            .cloned()
            .ok_or_else(|| DashboardError::MissingWorksheet(name.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    pub coerced_costs: usize,
}

pub fn read_table_from_path(path: &Path) -> DashboardResult<(Table, LoadReport)> {
    let file = std::fs::File::open(path)?;
    read_table(file)
}

/// Read a CSV worksheet. Headers are kept verbatim; short rows are padded
/// with empty cells and rows the reader cannot decode are skipped.
pub fn read_table<R: Read>(reader: R) -> DashboardResult<(Table, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(headers.iter().cloned());
    let mut report = LoadReport::default();

    for result in rdr.records() {
        report.total_rows += 1;
        let rec = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = report.total_rows, error = %e, "skipping unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };
        let record = Record::from_pairs(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), rec.get(i).unwrap_or_default().to_string())),
        );
        table.push(record);
    }
    Ok((table, report))
}

/// Map the budget reference sheet onto unit-cost rows, in sheet order.
///
/// Nothing is validated: zero or negative costs pass through, duplicates are
/// kept, and a cost cell that does not parse counts as 0.
pub fn load_unit_costs(table: &Table) -> (Vec<UnitCostRow>, LoadReport) {
    let cost_col = if table.has_column(COL_UNIT_COST) {
        COL_UNIT_COST
    } else {
        COL_UNIT_COST_FALLBACK
    };
    let mut report = LoadReport::default();
    let mut rows = Vec::with_capacity(table.len());

    for r in &table.rows {
        report.total_rows += 1;
        let unit_cost = match parse_f64_safe(r.get(cost_col)) {
            Some(v) => v,
            None => {
                report.coerced_costs += 1;
                0.0
            }
        };
        rows.push(UnitCostRow {
            thematic: r.get(COL_THEMATIC).unwrap_or_default().trim().to_string(),
            source_column: r.get(COL_SOURCE_COLUMN).unwrap_or_default().to_string(),
            work_name: r.get(COL_WORK_NAME).unwrap_or_default().trim().to_string(),
            unit: r.get(COL_UNIT).unwrap_or_default().trim().to_string(),
            unit_cost,
        });
    }
    debug!(
        rows = rows.len(),
        coerced = report.coerced_costs,
        "unit-cost master parsed"
    );
    (rows, report)
}

/// Everything one session works on, fetched once from a data source.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub profile: Table,
    pub plan: Table,
    pub epra: Table,
    pub unit_costs: Vec<UnitCostRow>,
    pub master_report: LoadReport,
}

#[derive(Debug, Clone)]
pub struct SheetNames {
    pub profile: String,
    pub plan: String,
    pub epra: String,
    pub budget: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            profile: "village profile".to_string(),
            plan: "village plan".to_string(),
            epra: "epra".to_string(),
            budget: "budget".to_string(),
        }
    }
}

/// Fetch the four worksheets. Plan and budget are required; profile and epra
/// only feed the thematic views, so a missing one loads as an empty table.
pub fn load_workbook<D: DataSource + ?Sized>(
    source: &D,
    names: &SheetNames,
) -> DashboardResult<Workbook> {
    let plan = source.get_worksheet(&names.plan)?;
    let budget = source.get_worksheet(&names.budget)?;
    let profile = optional_sheet(source, &names.profile)?;
    let epra = optional_sheet(source, &names.epra)?;
    let (unit_costs, master_report) = load_unit_costs(&budget);
    Ok(Workbook {
        profile,
        plan,
        epra,
        unit_costs,
        master_report,
    })
}

fn optional_sheet<D: DataSource + ?Sized>(source: &D, name: &str) -> DashboardResult<Table> {
    match source.get_worksheet(name) {
        Ok(t) => Ok(t),
        Err(DashboardError::MissingWorksheet(_)) => {
            warn!(worksheet = name, "worksheet missing, using an empty table");
            Ok(Table::default())
        }
        Err(e) => Err(e),
    }
}

use crate::aggregate::AggregateTable;
use crate::error::DashboardResult;
use crate::thematic::SummaryTable;
use crate::types::Table as SheetTable;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Something with a header row and string cells, exportable and previewable
/// without a fixed schema.
pub trait Grid {
    fn headers(&self) -> Vec<String>;
    fn cells(&self) -> Vec<Vec<String>>;
}

impl Grid for AggregateTable {
    fn headers(&self) -> Vec<String> {
        AggregateTable::headers(self)
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.to_string_rows()
    }
}

impl Grid for SummaryTable {
    fn headers(&self) -> Vec<String> {
        self.headers.clone()
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.rows.clone()
    }
}

impl Grid for SheetTable {
    fn headers(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.to_string_rows()
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> DashboardResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_grid_csv<G: Grid>(path: &Path, grid: &G) -> DashboardResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(grid.headers())?;
    for row in grid.cells() {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> DashboardResult<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn render_grid<G: Grid>(grid: &G, max_rows: usize) -> Option<String> {
    let cells = grid.cells();
    if cells.is_empty() {
        return None;
    }
    let mut builder = Builder::default();
    builder.push_record(grid.headers());
    for row in cells.into_iter().take(max_rows) {
        builder.push_record(row);
    }
    Some(builder.build().with(Style::markdown()).to_string())
}

pub fn preview_grid<G: Grid>(grid: &G, max_rows: usize) {
    match render_grid(grid, max_rows) {
        Some(s) => println!("{}\n", s),
        None => println!("(no rows)\n"),
    }
}

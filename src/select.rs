// Selection helpers behind the mandal / panchayath / village pickers.
use crate::types::{Table, MANDAL, PANCHAYATH, VILLAGE};
use std::collections::BTreeSet;

pub const ALL: &str = "All";

// Values are kept byte-for-byte so a picked option compares equal to the cell.
fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// "All" followed by the sorted distinct mandals of the table.
pub fn mandal_options(table: &Table) -> Vec<String> {
    let mut out = vec![ALL.to_string()];
    out.extend(distinct_sorted(table.rows.iter().filter_map(|r| r.get(MANDAL))));
    out
}

pub fn panchayaths_in(table: &Table, mandal: &str) -> Vec<String> {
    distinct_sorted(
        table
            .rows
            .iter()
            .filter(|r| r.get(MANDAL) == Some(mandal))
            .filter_map(|r| r.get(PANCHAYATH)),
    )
}

pub fn villages_in(table: &Table, mandal: &str, panchayath: &str) -> Vec<String> {
    distinct_sorted(
        table
            .rows
            .iter()
            .filter(|r| r.get(MANDAL) == Some(mandal) && r.get(PANCHAYATH) == Some(panchayath))
            .filter_map(|r| r.get(VILLAGE)),
    )
}

/// Rows whose `column` equals `value`; `None` or "All" keeps every row.
pub fn filter_by_column(table: &Table, column: &str, value: Option<&str>) -> Table {
    match value {
        None | Some(ALL) => table.clone(),
        Some(v) => Table {
            columns: table.columns.clone(),
            rows: table
                .rows
                .iter()
                .filter(|r| r.get(column) == Some(v))
                .cloned()
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        Table::from_rows(
            &["mandal", "panchayath", "village"],
            &[
                vec!["Paderu", "P2", "V3"],
                vec!["Araku", "P1", "V1"],
                vec!["Araku", "P1", "V2"],
                vec!["Araku", "P1", "V1"],
                vec!["", "P9", "V9"],
            ],
        )
    }

    #[test]
    fn mandal_options_start_with_all() {
        assert_eq!(mandal_options(&table()), vec!["All", "Araku", "Paderu"]);
    }

    #[test]
    fn cascades_are_sorted_and_distinct() {
        assert_eq!(panchayaths_in(&table(), "Araku"), vec!["P1"]);
        assert_eq!(villages_in(&table(), "Araku", "P1"), vec!["V1", "V2"]);
        assert!(villages_in(&table(), "Paderu", "P1").is_empty());
    }

    #[test]
    fn padded_cells_stay_selectable() {
        let t = Table::from_rows(
            &["mandal", "panchayath", "village"],
            &[vec!["Araku ", "P1", " V1"], vec!["Araku", "P2", "V2"]],
        );
        let options = mandal_options(&t);
        assert_eq!(options, vec!["All", "Araku", "Araku "]);
        assert_eq!(panchayaths_in(&t, &options[2]), vec!["P1"]);
        assert_eq!(villages_in(&t, &options[2], "P1"), vec![" V1"]);
        assert_eq!(filter_by_column(&t, "mandal", Some(options[2].as_str())).len(), 1);
    }

    #[test]
    fn filter_all_keeps_everything() {
        assert_eq!(filter_by_column(&table(), "mandal", Some("All")).len(), 5);
        assert_eq!(filter_by_column(&table(), "mandal", None).len(), 5);
        assert_eq!(filter_by_column(&table(), "mandal", Some("Araku")).len(), 3);
        assert!(filter_by_column(&table(), "mandal", Some("Nowhere")).is_empty());
    }
}

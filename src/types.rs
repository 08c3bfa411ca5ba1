use serde::Serialize;
use std::collections::HashMap;
use tabled::Tabled;

pub const MANDAL: &str = "mandal";
pub const PANCHAYATH: &str = "panchayath";
pub const VILLAGE: &str = "village";

/// One worksheet row: field name to raw cell text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn key(&self) -> VillageKey {
        VillageKey {
            mandal: self.get(MANDAL).unwrap_or_default().to_string(),
            panchayath: self.get(PANCHAYATH).unwrap_or_default().to_string(),
            village: self.get(VILLAGE).unwrap_or_default().to_string(),
        }
    }

    fn rename_fields(&mut self, f: impl Fn(&str) -> String) {
        self.fields = std::mem::take(&mut self.fields)
            .into_iter()
            .map(|(k, v)| (f(&k), v))
            .collect();
    }
}

/// A worksheet snapshot. The header decides which columns exist; a row may
/// lack a cell for a header column, which reads as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from literal rows, in header order.
    pub fn from_rows<S: AsRef<str>>(columns: &[S], rows: &[Vec<S>]) -> Self {
        let mut table = Table::new(columns.iter().map(|c| c.as_ref().to_string()));
        for row in rows {
            table.push(Record::from_pairs(
                columns
                    .iter()
                    .zip(row.iter())
                    .map(|(c, v)| (c.as_ref().to_string(), v.as_ref().to_string())),
            ));
        }
        table
    }

    pub fn push(&mut self, record: Record) {
        self.rows.push(record);
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn add_column(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.has_column(&name) {
            self.columns.push(name);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Strip surrounding whitespace from every header name (and the matching
    /// record keys). Exported sheets often carry stray spaces in headers.
    pub fn trim_headers(mut self) -> Self {
        for c in &mut self.columns {
            *c = c.trim().to_string();
        }
        for r in &mut self.rows {
            r.rename_fields(|k| k.trim().to_string());
        }
        self
    }

    /// Rows as cell vectors in header order, missing cells as "".
    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                self.columns
                    .iter()
                    .map(|c| r.get(c).unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }
}

/// (mandal, panchayath, village): identifies one village.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VillageKey {
    pub mandal: String,
    pub panchayath: String,
    pub village: String,
}

impl VillageKey {
    pub fn new(mandal: &str, panchayath: &str, village: &str) -> Self {
        Self {
            mandal: mandal.to_string(),
            panchayath: panchayath.to_string(),
            village: village.to_string(),
        }
    }
}

/// One line of the unit-cost master.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitCostRow {
    pub thematic: String,
    pub source_column: String,
    pub work_name: String,
    pub unit: String,
    pub unit_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct BudgetFact {
    #[serde(rename = "mandal")]
    #[tabled(rename = "mandal")]
    pub mandal: String,
    #[serde(rename = "panchayath")]
    #[tabled(rename = "panchayath")]
    pub panchayath: String,
    #[serde(rename = "village")]
    #[tabled(rename = "village")]
    pub village: String,
    #[serde(rename = "Work")]
    #[tabled(rename = "Work")]
    pub work_name: String,
    #[serde(rename = "Thematic")]
    #[tabled(rename = "Thematic")]
    pub thematic: String,
    #[serde(rename = "Units")]
    #[tabled(rename = "Units")]
    pub units: f64,
    #[serde(rename = "Total Cost")]
    #[tabled(rename = "Total Cost")]
    pub total_cost: f64,
}

/// A costed item of a single village's plan for one thematic area (DPR line).
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct LineItem {
    #[serde(rename = "Work")]
    #[tabled(rename = "Work")]
    pub work_name: String,
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Quantity")]
    #[tabled(rename = "Quantity")]
    pub quantity: f64,
    #[serde(rename = "Unit Cost")]
    #[tabled(rename = "Unit Cost")]
    pub unit_cost: f64,
    #[serde(rename = "Total Cost")]
    #[tabled(rename = "Total Cost")]
    pub total_cost: f64,
}

#[derive(Debug, Serialize)]
pub struct BudgetSummary {
    pub generated_at: chrono::NaiveDateTime,
    pub total_facts: usize,
    pub total_villages: usize,
    pub total_units: f64,
    pub total_cost: f64,
    pub total_cost_rupees: i64,
    pub thematic_areas: Vec<String>,
}

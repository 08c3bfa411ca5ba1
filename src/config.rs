use crate::loader::SheetNames;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "rlv_budget")]
#[command(about = "Village plan budget rollups and thematic summaries")]
#[command(version)]
pub struct Config {
    /// Directory holding one CSV export per worksheet
    #[arg(long, env = "RLV_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Where report CSV/JSON files are written
    #[arg(long, env = "RLV_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    #[arg(long, default_value = "village profile")]
    pub profile_sheet: String,

    #[arg(long, default_value = "village plan")]
    pub plan_sheet: String,

    #[arg(long, default_value = "epra")]
    pub epra_sheet: String,

    /// Unit-cost master worksheet
    #[arg(long, default_value = "budget")]
    pub budget_sheet: String,

    /// Rows shown in console previews
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,

    /// Works listed in the top-works report
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

impl Config {
    pub fn sheet_names(&self) -> SheetNames {
        SheetNames {
            profile: self.profile_sheet.clone(),
            plan: self.plan_sheet.clone(),
            epra: self.epra_sheet.clone(),
            budget: self.budget_sheet.clone(),
        }
    }

    pub fn out_path(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shared_workbook() {
        let cfg = Config::try_parse_from(["rlv_budget"]).unwrap();
        assert_eq!(cfg.plan_sheet, "village plan");
        assert_eq!(cfg.budget_sheet, "budget");
        assert_eq!(cfg.top, 10);
        assert_eq!(cfg.sheet_names().profile, "village profile");
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "rlv_budget",
            "--out-dir",
            "reports",
            "--budget-sheet",
            "unit costs",
            "--top",
            "3",
        ])
        .unwrap();
        assert_eq!(cfg.out_path("a.csv"), PathBuf::from("reports").join("a.csv"));
        assert_eq!(cfg.sheet_names().budget, "unit costs");
        assert_eq!(cfg.top, 3);
    }
}

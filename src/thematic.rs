// Per-thematic profile views: village profile merged with the plan (and the
// epra sheet where an area needs it), then summarized by panchayath and by
// mandal. Column sets come from the catalog below rather than being coded
// per area.
use crate::select::filter_by_column;
use crate::types::{Record, Table, VillageKey, MANDAL, PANCHAYATH, VILLAGE};
use crate::util::{coerce_number, parse_yes};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

const IDENTITY: [&str; 3] = [MANDAL, PANCHAYATH, VILLAGE];

#[derive(Debug, Clone)]
pub struct ThematicArea {
    pub name: &'static str,
    pub profile_columns: &'static [&'static str],
    pub plan_columns: &'static [&'static str],
    pub epra_columns: &'static [&'static str],
    /// (source column, derived 0/1 column)
    pub yes_flags: &'static [(&'static str, &'static str)],
    pub gp_sum_columns: &'static [&'static str],
    /// Falls back to `gp_sum_columns` when `None`.
    pub mandal_sum_columns: Option<&'static [&'static str]>,
}

impl ThematicArea {
    pub fn mandal_columns(&self) -> &'static [&'static str] {
        self.mandal_sum_columns.unwrap_or(self.gp_sum_columns)
    }
}

pub fn catalog() -> &'static [ThematicArea] {
    &CATALOG
}

pub fn find_area(name: &str) -> Option<&'static ThematicArea> {
    CATALOG.iter().find(|a| a.name.eq_ignore_ascii_case(name.trim()))
}

static CATALOG: [ThematicArea; 9] = [
    ThematicArea {
        name: "Large Ruminants",
        profile_columns: &[
            "Total HHs",
            "population",
            "Total animals immunized",
            "Mortality",
            "no of cattle sheds",
            "no of sheds rennovated",
        ],
        plan_columns: &["no of sheds to be rennovated", "Animals to be immunized"],
        epra_columns: &[],
        yes_flags: &[],
        gp_sum_columns: &[
            "Total HHs",
            "population",
            "Total animals immunized",
            "Animals to be immunized",
            "Mortality",
            "no of cattle sheds",
            "no of sheds rennovated",
            "no of sheds to be rennovated",
        ],
        mandal_sum_columns: None,
    },
    ThematicArea {
        name: "Small Ruminants",
        profile_columns: &[
            "Total HHs",
            "population",
            "SR immunized",
            "SR Mortality",
            "no of sheep / goat sheds",
            "no of elevated sheds",
        ],
        plan_columns: &["SR to be immunized", "no of sheds to be elevated"],
        epra_columns: &[],
        yes_flags: &[],
        gp_sum_columns: &[
            "Total HHs",
            "population",
            "SR immunized",
            "SR to be immunized",
            "SR Mortality",
            "no of sheep / goat sheds",
            "no of elevated sheds",
            "no of sheds to be elevated",
        ],
        mandal_sum_columns: None,
    },
    ThematicArea {
        name: "Desi Poultry",
        profile_columns: &[
            "Total HHs",
            "no of BYP HHs",
            "Total Birds",
            "Total birds immunized",
            "birds mortality",
            "poultry service provider",
        ],
        plan_columns: &[
            "Birds to be immunized",
            "No of women are willing to establish breedfarms",
        ],
        epra_columns: &["No of breedfarms exists"],
        yes_flags: &[("poultry service provider", "service_provider_yes")],
        gp_sum_columns: &[
            "Total HHs",
            "no of BYP HHs",
            "Total Birds",
            "Total birds immunized",
            "Birds to be immunized",
            "birds mortality",
            "No of breedfarms exists",
            "No of women are willing to establish breedfarms",
            "service_provider_yes",
        ],
        mandal_sum_columns: None,
    },
    ThematicArea {
        name: "Crop Systems",
        profile_columns: &[],
        plan_columns: &[],
        epra_columns: &[],
        yes_flags: &[],
        gp_sum_columns: &[],
        mandal_sum_columns: None,
    },
    ThematicArea {
        name: "Natural Farming",
        profile_columns: &[
            "Total HHs",
            "Total land in the village_acre",
            "Total HH practicing NF",
            "Total land under NF practice_acre",
            "Is business plan developed",
            "Name of the BRC entrepreneur",
            "No of farmers accessing NF inputs",
            "Extent covered under BRC_acres",
            "No of villages accessing NF inputs",
        ],
        plan_columns: &[],
        epra_columns: &[],
        yes_flags: &[("Is business plan developed", "business_plan_yes")],
        gp_sum_columns: &[
            "Total HHs",
            "Total land in the village_acre",
            "Total HH practicing NF",
            "Total land under NF practice_acre",
            "No of villages accessing NF inputs",
            "No of farmers accessing NF inputs",
            "Extent covered under BRC_acres",
            "business_plan_yes",
        ],
        mandal_sum_columns: None,
    },
    ThematicArea {
        name: "Fisheries",
        profile_columns: &[
            "Total HHs",
            "HHs owning ponds",
            "No of community ponds",
            "No of ponds under fisheries",
            "How many ponds converted in to eco farmponds",
            "Total water spread are of the ponds_acr",
        ],
        plan_columns: &[
            "New farmponds proposed 10x10m (nos)",
            "New farmponds proposed 15x15m (nos)",
            "New farmponds proposed 20x20m (nos)",
            "New farmponds proposed 40x40m (nos)",
        ],
        epra_columns: &[],
        yes_flags: &[],
        gp_sum_columns: &[
            "Total HHs",
            "HHs owning ponds",
            "No of community ponds",
            "No of ponds under fisheries",
            "How many ponds converted in to eco farmponds",
            "Total water spread are of the ponds_acr",
            "New farmponds proposed 10x10m (nos)",
            "New farmponds proposed 15x15m (nos)",
            "New farmponds proposed 20x20m (nos)",
            "New farmponds proposed 40x40m (nos)",
        ],
        mandal_sum_columns: None,
    },
    ThematicArea {
        name: "Land Development",
        profile_columns: &[
            "mettu_total_land_acr",
            "coffee_cashew_land_acr",
            "podu_total_land_acr",
        ],
        plan_columns: &[
            "mettu_earthen_bunds_cum",
            "mettu_stone_bunding_cum",
            "mettu_wat_cum",
            "mettu_land_leveling_cum",
            "coffee_trench_cum",
            "coffee_stone_bunding_cum",
            "coffee_bench_terracing_cum",
            "podu_sgt_cum",
            "podu_cct_cum",
            "podu_pebble_bunding_cum",
            "podu_plantation_acr",
            "pasture_land_development_acr",
            "plans_submitted_mgnrega",
        ],
        epra_columns: &[],
        yes_flags: &[("plans_submitted_mgnrega", "mgnrega_yes")],
        gp_sum_columns: &[
            "mettu_total_land_acr",
            "mettu_earthen_bunds_cum",
            "mettu_stone_bunding_cum",
            "mettu_wat_cum",
            "mettu_land_leveling_cum",
            "coffee_cashew_land_acr",
            "coffee_trench_cum",
            "coffee_stone_bunding_cum",
            "coffee_bench_terracing_cum",
            "podu_total_land_acr",
            "podu_sgt_cum",
            "podu_cct_cum",
            "podu_pebble_bunding_cum",
            "podu_plantation_acr",
            "pasture_land_development_acr",
            "mgnrega_yes",
        ],
        mandal_sum_columns: Some(&[
            "mettu_total_land_acr",
            "coffee_cashew_land_acr",
            "podu_total_land_acr",
            "pasture_land_development_acr",
            "mettu_earthen_bunds_cum",
            "coffee_trench_cum",
            "podu_sgt_cum",
            "mgnrega_yes",
        ]),
    },
    ThematicArea {
        name: "Migration",
        profile_columns: &[
            "Total HHs",
            "Total no of land less HHs",
            "No of HHs not having Job cards",
            "HHs going for seasonal migraion",
            "Average no of days in a year going for migraion",
            "Type of work during the migration",
            "Average earning per annum per family",
        ],
        plan_columns: &[],
        epra_columns: &[],
        yes_flags: &[],
        gp_sum_columns: &[
            "Total HHs",
            "Total no of land less HHs",
            "No of HHs not having Job cards",
            "HHs going for seasonal migraion",
            "Average no of days in a year going for migraion",
            "Average earning per annum per family",
        ],
        mandal_sum_columns: None,
    },
    ThematicArea {
        name: "Farm mechanization",
        profile_columns: &[
            "farmeasy_Power_weeder_available",
            "farmeasy_Power_weeder_users",
            "farmeasy_Cycle_weeder_available",
            "farmeasy_Cycle_weeder_users",
            "farmeasy_Plastic_drums_available",
            "farmeasy_Plastic_drums_users",
            "farmeasy_Cono_Weeder_available",
            "farmeasy_Cono_Weeder_users",
            "farmeasy_Sprayers_available",
            "farmeasy_Sprayers_users",
            "farmeasy_Power_sprayers_available",
            "farmeasy_Power_sprayers_users",
            "farmeasy_Taurpalin_available",
            "farmeasy_Taurpalin_users",
            "farmeasy_Graders_available",
            "farmeasy_Graders_users",
            "farmeasy_Power_tiller_available",
            "farmeasy_Power_tiller_users",
            "farmeasy_Tractor_available",
            "farmeasy_Tractor_users",
            "farmeasy_Coffee_pulper_available",
            "farmeasy_Coffee_pulper_users",
            "farmeasy_Pepper_thresher_available",
            "farmeasy_Pepper_thresher_users",
            "farmeasy_Multigrain_thresher_available",
            "farmeasy_Multigrain_thresher_users",
            "farmeasy_Turmeric_polisher_available",
            "farmeasy_Turmeric_polisher_users",
            "farmeasy_Turmeric_boiler_available",
            "farmeasy_Turmeric_boiler_users",
            "farmeasy_asc_businessplan",
            "farmeasy_asc",
        ],
        plan_columns: &[
            "farmeasy_Power_weeder_required",
            "farmeasy_Cycle_weeder_required",
            "farmeasy_Plastic_drums_required",
            "farmeasy_Cono_Weeder_required",
            "farmeasy_Sprayers_required",
            "farmeasy_Power_sprayers_required",
            "farmeasy_Taurpalin_required",
            "farmeasy_Graders_required",
            "farmeasy_Power_tiller_required",
            "farmeasy_Tractor_required",
            "farmeasy_Coffee_pulper_required",
            "farmeasy_Pepper_thresher_required",
            "farmeasy_Multigrain_thresher_required",
            "farmeasy_Turmeric_polisher_required",
            "farmeasy_Turmeric_boiler_required",
        ],
        epra_columns: &[],
        yes_flags: &[
            ("farmeasy_asc_businessplan", "asc_businessplan_yes"),
            ("farmeasy_asc", "asc_yes"),
        ],
        gp_sum_columns: &[
            "farmeasy_Power_weeder_available",
            "farmeasy_Power_weeder_users",
            "farmeasy_Power_weeder_required",
            "farmeasy_Tractor_available",
            "farmeasy_Tractor_users",
            "farmeasy_Tractor_required",
            "asc_businessplan_yes",
            "asc_yes",
        ],
        mandal_sum_columns: None,
    },
];

/// Project `table` onto the identity columns plus `columns`. Columns the
/// sheet lacks are added empty, so they read as 0 downstream.
pub fn select_columns(table: &Table, columns: &[&str]) -> Table {
    let wanted: Vec<&str> = IDENTITY.iter().chain(columns.iter()).copied().collect();
    for c in &wanted {
        if !table.has_column(c) {
            debug!(column = *c, "column missing from sheet, filling empty");
        }
    }
    let mut out = Table::new(wanted.iter().copied());
    for r in &table.rows {
        out.push(Record::from_pairs(
            wanted
                .iter()
                .map(|c| (*c, r.get(c).unwrap_or_default())),
        ));
    }
    out
}

/// Left join on (mandal, panchayath, village). A left row matching several
/// right rows is repeated once per match; an unmatched one gets empty right
/// cells.
pub fn merge_left(left: &Table, right: &Table) -> Table {
    let right_only: Vec<&String> = right
        .columns
        .iter()
        .filter(|c| !IDENTITY.contains(&c.as_str()) && !left.has_column(c))
        .collect();

    let mut by_key: HashMap<VillageKey, Vec<&Record>> = HashMap::new();
    for r in &right.rows {
        by_key.entry(r.key()).or_default().push(r);
    }

    let mut out = Table::new(left.columns.iter().cloned());
    for c in &right_only {
        out.add_column(c.as_str());
    }

    for l in &left.rows {
        match by_key.get(&l.key()) {
            Some(matches) => {
                for m in matches {
                    let mut row = l.clone();
                    for c in &right_only {
                        row.set(c.as_str(), m.get(c).unwrap_or_default());
                    }
                    out.push(row);
                }
            }
            None => {
                let mut row = l.clone();
                for c in &right_only {
                    row.set(c.as_str(), "");
                }
                out.push(row);
            }
        }
    }
    out
}

/// Append `target` as a 0/1 column derived from `source` via `parse_yes`.
pub fn add_yes_flag(mut table: Table, source: &str, target: &str) -> Table {
    for r in &mut table.rows {
        let flag = parse_yes(r.get(source));
        r.set(target, flag.to_string());
    }
    table.add_column(target);
    table
}

/// Column-wise summary: group header, distinct counts, then sums.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Group `table` by `group_col`, count distinct values of each
/// `distinct_cols` entry and sum (coerced) each `sum_cols` entry. Groups come
/// out sorted by key.
pub fn summarize(
    table: &Table,
    group_col: &str,
    distinct_cols: &[&str],
    sum_cols: &[&str],
) -> SummaryTable {
    struct Acc {
        seen: Vec<HashSet<String>>,
        sums: Vec<f64>,
    }

    let mut groups: BTreeMap<String, Acc> = BTreeMap::new();
    for r in &table.rows {
        let key = r.get(group_col).unwrap_or_default().to_string();
        let acc = groups.entry(key).or_insert_with(|| Acc {
            seen: vec![HashSet::new(); distinct_cols.len()],
            sums: vec![0.0; sum_cols.len()],
        });
        for (set, c) in acc.seen.iter_mut().zip(distinct_cols) {
            if let Some(v) = r.get(c).filter(|v| !v.is_empty()) {
                set.insert(v.to_string());
            }
        }
        for (sum, c) in acc.sums.iter_mut().zip(sum_cols) {
            *sum += coerce_number(r.get(c));
        }
    }

    let headers = std::iter::once(group_col)
        .chain(distinct_cols.iter().copied())
        .chain(sum_cols.iter().copied())
        .map(str::to_string)
        .collect();
    let rows = groups
        .into_iter()
        .map(|(key, acc)| {
            std::iter::once(key)
                .chain(acc.seen.iter().map(|s| s.len().to_string()))
                .chain(acc.sums.iter().map(|v| v.to_string()))
                .collect()
        })
        .collect();
    SummaryTable { headers, rows }
}

pub struct SourceTables<'a> {
    pub profile: &'a Table,
    pub plan: &'a Table,
    pub epra: &'a Table,
}

#[derive(Debug, Clone)]
pub struct ThematicView {
    pub area: &'static str,
    pub villages: Table,
    pub gp_summary: SummaryTable,
    pub mandal_summary: SummaryTable,
}

/// Village-wise table plus panchayath and mandal summaries for one area,
/// optionally restricted to one mandal ("All" or `None` for every mandal).
pub fn thematic_view(
    sources: &SourceTables<'_>,
    area: &'static ThematicArea,
    mandal: Option<&str>,
) -> ThematicView {
    let profile = select_columns(&sources.profile.clone().trim_headers(), area.profile_columns);
    let mut merged = profile;
    if !area.plan_columns.is_empty() {
        let plan = select_columns(&sources.plan.clone().trim_headers(), area.plan_columns);
        merged = merge_left(&merged, &plan);
    }
    if !area.epra_columns.is_empty() {
        let epra = select_columns(&sources.epra.clone().trim_headers(), area.epra_columns);
        merged = merge_left(&merged, &epra);
    }
    for (source, target) in area.yes_flags {
        merged = add_yes_flag(merged, source, target);
    }

    let villages = filter_by_column(&merged, MANDAL, mandal);
    let gp_summary = summarize(&villages, PANCHAYATH, &[VILLAGE], area.gp_sum_columns);
    let mandal_summary = summarize(
        &villages,
        MANDAL,
        &[PANCHAYATH, VILLAGE],
        area.mandal_columns(),
    );
    debug!(area = area.name, villages = villages.len(), "thematic view built");
    ThematicView {
        area: area.name,
        villages,
        gp_summary,
        mandal_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile() -> Table {
        Table::from_rows(
            &["mandal", "panchayath", "village", "Total HHs ", "poultry service provider"],
            &[
                vec!["A", "P1", "V1", "10", " Yes"],
                vec!["A", "P1", "V2", "20", "no"],
                vec!["B", "P2", "V3", "x", "YES"],
            ],
        )
    }

    fn plan() -> Table {
        Table::from_rows(
            &["mandal", "panchayath", "village", "Birds to be immunized"],
            &[
                vec!["A", "P1", "V1", "5"],
                vec!["A", "P1", "V1", "7"],
                vec!["B", "P2", "V3", "1"],
            ],
        )
    }

    #[test]
    fn merge_left_repeats_and_fills() {
        let merged = merge_left(&profile(), &plan());
        assert_eq!(merged.len(), 4);
        assert!(merged.has_column("Birds to be immunized"));
        let v2 = merged.rows.iter().find(|r| r.get("village") == Some("V2")).unwrap();
        assert_eq!(v2.get("Birds to be immunized"), Some(""));
    }

    #[test]
    fn select_tolerates_missing_columns() {
        let t = select_columns(&profile(), &["nope"]);
        assert_eq!(t.columns, vec!["mandal", "panchayath", "village", "nope"]);
        assert_eq!(t.rows[0].get("nope"), Some(""));
    }

    #[test]
    fn yes_flag_column_is_appended() {
        let t = add_yes_flag(profile(), "poultry service provider", "sp_yes");
        let flags: Vec<_> = t.rows.iter().map(|r| r.get("sp_yes").unwrap()).collect();
        assert_eq!(flags, vec!["1", "0", "1"]);
        assert_eq!(t.columns.last().map(String::as_str), Some("sp_yes"));
    }

    #[test]
    fn summarize_counts_distinct_and_sums() {
        let t = profile().trim_headers();
        let s = summarize(&t, "mandal", &["panchayath", "village"], &["Total HHs"]);
        assert_eq!(s.headers, vec!["mandal", "panchayath", "village", "Total HHs"]);
        assert_eq!(
            s.rows,
            vec![
                vec!["A", "1", "2", "30"],
                vec!["B", "1", "1", "0"],
            ]
        );
    }

    #[test]
    fn summary_rows_are_sorted_by_group() {
        let t = Table::from_rows(
            &["mandal", "panchayath", "village", "Total HHs"],
            &[
                vec!["Paderu", "P3", "V5", "4"],
                vec!["Araku", "P1", "V1", "1"],
                vec!["Paderu", "P2", "V3", "2"],
            ],
        );
        let s = summarize(&t, "panchayath", &["village"], &["Total HHs"]);
        let keys: Vec<_> = s.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(keys, vec!["P1", "P2", "P3"]);
        let m = summarize(&t, "mandal", &["panchayath", "village"], &["Total HHs"]);
        assert_eq!(m.rows[0], vec!["Araku", "1", "1", "1"]);
        assert_eq!(m.rows[1], vec!["Paderu", "2", "2", "6"]);
    }

    #[test]
    fn poultry_view_merges_three_sheets() {
        let epra = Table::from_rows(
            &["mandal", "panchayath", "village", "No of breedfarms exists"],
            &[vec!["A", "P1", "V2", "2"]],
        );
        let area = find_area("desi poultry").unwrap();
        let view = thematic_view(
            &SourceTables { profile: &profile(), plan: &plan(), epra: &epra },
            area,
            Some("A"),
        );
        assert_eq!(view.villages.len(), 3);
        let gp = &view.gp_summary;
        let col = |name: &str| gp.headers.iter().position(|h| h == name).unwrap();
        assert_eq!(gp.rows.len(), 1);
        assert_eq!(gp.rows[0][col("village")], "2");
        assert_eq!(gp.rows[0][col("Total HHs")], "40");
        assert_eq!(gp.rows[0][col("Birds to be immunized")], "12");
        assert_eq!(gp.rows[0][col("No of breedfarms exists")], "2");
        assert_eq!(gp.rows[0][col("service_provider_yes")], "2");
    }

    #[test]
    fn catalog_lookup_is_case_insensitive() {
        assert!(find_area("FISHERIES").is_some());
        assert!(find_area("Space").is_none());
        assert_eq!(catalog().len(), 9);
        let land = find_area("Land Development").unwrap();
        assert_eq!(land.mandal_columns().len(), 8);
    }
}

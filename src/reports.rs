use crate::aggregate::{aggregate, AggregateSpec, AggregateTable, Dimension, FactFilter};
use crate::types::{BudgetFact, BudgetSummary, VillageKey};
use crate::util::rupees;
use std::collections::HashSet;

/// The budget tables shown and exported after a rollup.
#[derive(Debug, Clone)]
pub struct BudgetReports {
    pub gp_wise: AggregateTable,
    pub mandal_wise: AggregateTable,
    pub thematic_wise: AggregateTable,
    pub top_works: AggregateTable,
}

/// GP-, mandal-, thematic- and work-wise rollups of `facts`, optionally
/// restricted by `filter` (e.g. one mandal). `top` bounds the works table.
pub fn build_budget_reports(
    facts: &[BudgetFact],
    filter: Option<FactFilter>,
    top: usize,
) -> BudgetReports {
    let gp_wise = aggregate(
        facts,
        &AggregateSpec::group_by(&[Dimension::Mandal, Dimension::Panchayath])
            .count_distinct(&[Dimension::Village])
            .filter(filter.clone()),
    );
    let mandal_wise = aggregate(
        facts,
        &AggregateSpec::group_by(&[Dimension::Mandal])
            .count_distinct(&[Dimension::Panchayath, Dimension::Village])
            .filter(filter.clone()),
    );
    let thematic_wise = aggregate(
        facts,
        &AggregateSpec::group_by(&[Dimension::Thematic])
            .count_distinct(&[Dimension::Village])
            .filter(filter.clone()),
    );
    let top_works = aggregate(
        facts,
        &AggregateSpec::group_by(&[Dimension::Work, Dimension::Thematic]).filter(filter),
    )
    .top_n(top);

    BudgetReports {
        gp_wise,
        mandal_wise,
        thematic_wise,
        top_works,
    }
}

pub fn generate_summary(facts: &[BudgetFact]) -> BudgetSummary {
    let villages: HashSet<VillageKey> = facts
        .iter()
        .map(|f| VillageKey::new(&f.mandal, &f.panchayath, &f.village))
        .collect();
    let mut thematic_areas: Vec<String> = Vec::new();
    for f in facts {
        if !thematic_areas.contains(&f.thematic) {
            thematic_areas.push(f.thematic.clone());
        }
    }
    let total_cost: f64 = facts.iter().map(|f| f.total_cost).sum();
    BudgetSummary {
        generated_at: chrono::Local::now().naive_local(),
        total_facts: facts.len(),
        total_villages: villages.len(),
        total_units: facts.iter().map(|f| f.units).sum(),
        total_cost,
        total_cost_rupees: rupees(total_cost),
        thematic_areas,
    }
}

// Budget rollup: joins the unit-cost master against village plan quantities.
//
// Two views disagree on zero quantities and both are kept:
// - `rollup` emits a fact for every (master row, plan row) pair, zeros included,
//   so "villages covered" counts see every village.
// - `plan_for` builds one village's itemized plan and drops items whose summed
//   quantity is not positive.
use crate::types::{BudgetFact, LineItem, Table, UnitCostRow, VillageKey};
use crate::util::coerce_number;
use tracing::debug;

/// Cross every unit-cost row whose source column exists in the plan schema
/// with every plan row.
///
/// Output order is master declaration order, then plan row order.
/// `facts.len() == plan.len() * (master rows with a present source column)`.
pub fn rollup(plan: &Table, unit_costs: &[UnitCostRow]) -> Vec<BudgetFact> {
    let mut facts = Vec::new();
    for cost in unit_costs {
        if !plan.has_column(&cost.source_column) {
            debug!(
                thematic = %cost.thematic,
                source_column = %cost.source_column,
                "source column not in plan, skipping"
            );
            continue;
        }
        facts.reserve(plan.len());
        for row in &plan.rows {
            let units = coerce_number(row.get(&cost.source_column));
            let key = row.key();
            facts.push(BudgetFact {
                mandal: key.mandal,
                panchayath: key.panchayath,
                village: key.village,
                work_name: cost.work_name.clone(),
                thematic: cost.thematic.clone(),
                units,
                total_cost: units * cost.unit_cost,
            });
        }
    }
    debug!(facts = facts.len(), "rollup complete");
    facts
}

/// Itemized plan for one village and one thematic area.
///
/// Duplicate plan rows for the village have their quantities summed before
/// costing. Only items with a positive quantity are returned; a key that
/// matches nothing (including a village that is not under the given
/// panchayath) yields an empty plan.
pub fn plan_for(
    plan: &Table,
    unit_costs: &[UnitCostRow],
    village: &VillageKey,
    thematic: &str,
) -> Vec<LineItem> {
    let rows: Vec<_> = plan.rows.iter().filter(|r| &r.key() == village).collect();
    if rows.is_empty() {
        return Vec::new();
    }

    unit_costs
        .iter()
        .filter(|c| c.thematic == thematic && plan.has_column(&c.source_column))
        .filter_map(|c| {
            let quantity: f64 = rows
                .iter()
                .map(|r| coerce_number(r.get(&c.source_column)))
                .sum();
            (quantity > 0.0).then(|| LineItem {
                work_name: c.work_name.clone(),
                unit: c.unit.clone(),
                quantity,
                unit_cost: c.unit_cost,
                total_cost: quantity * c.unit_cost,
            })
        })
        .collect()
}

pub fn total_budget(items: &[LineItem]) -> f64 {
    items.iter().map(|i| i.total_cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cost(thematic: &str, col: &str, work: &str, unit_cost: f64) -> UnitCostRow {
        UnitCostRow {
            thematic: thematic.to_string(),
            source_column: col.to_string(),
            work_name: work.to_string(),
            unit: "no".to_string(),
            unit_cost,
        }
    }

    fn plan() -> Table {
        Table::from_rows(
            &["mandal", "panchayath", "village", "sheds", "ponds"],
            &[
                vec!["A", "P1", "V1", "3", "abc"],
                vec!["A", "P1", "V2", "0", ""],
                vec!["B", "P2", "V3", "2", "4"],
            ],
        )
    }

    #[test]
    fn fact_count_is_rows_times_present_columns() {
        let master = vec![
            cost("Large Ruminants", "sheds", "Shed", 5000.0),
            cost("Fisheries", "ponds", "Pond", 100.0),
            cost("Fisheries", "nonexistent", "Ghost", 1.0),
        ];
        let facts = rollup(&plan(), &master);
        assert_eq!(facts.len(), 3 * 2);
        assert!(facts.iter().all(|f| f.work_name != "Ghost"));
    }

    #[test]
    fn emission_order_follows_master_then_plan() {
        let master = vec![
            cost("Fisheries", "ponds", "Pond", 100.0),
            cost("Large Ruminants", "sheds", "Shed", 5000.0),
        ];
        let facts = rollup(&plan(), &master);
        let order: Vec<(&str, &str)> = facts
            .iter()
            .map(|f| (f.work_name.as_str(), f.village.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Pond", "V1"),
                ("Pond", "V2"),
                ("Pond", "V3"),
                ("Shed", "V1"),
                ("Shed", "V2"),
                ("Shed", "V3"),
            ]
        );
    }

    #[test]
    fn non_numeric_cells_become_zero_units() {
        let facts = rollup(&plan(), &[cost("Fisheries", "ponds", "Pond", 100.0)]);
        assert_eq!(facts[0].units, 0.0);
        assert_eq!(facts[1].units, 0.0);
        assert_eq!(facts[2].units, 4.0);
        assert_eq!(facts[2].total_cost, 400.0);
    }

    #[test]
    fn zero_unit_facts_are_kept() {
        let facts = rollup(&plan(), &[cost("Large Ruminants", "sheds", "Shed", 5000.0)]);
        assert_eq!(facts[1].village, "V2");
        assert_eq!(facts[1].total_cost, 0.0);
    }

    #[test]
    fn duplicate_master_rows_are_additive() {
        let master = vec![
            cost("Large Ruminants", "sheds", "Shed", 5000.0),
            cost("Large Ruminants", "sheds", "Shed", 5000.0),
        ];
        let facts = rollup(&plan(), &master);
        assert_eq!(facts.len(), 6);
        let total: f64 = facts.iter().map(|f| f.total_cost).sum();
        assert_eq!(total, 2.0 * 5000.0 * 5.0);
    }

    #[test]
    fn empty_master_or_plan_gives_no_facts() {
        assert!(rollup(&plan(), &[]).is_empty());
        let empty = Table::new(["mandal", "panchayath", "village", "sheds"]);
        assert!(rollup(&empty, &[cost("X", "sheds", "Shed", 1.0)]).is_empty());
    }

    #[test]
    fn inputs_are_left_untouched() {
        let p = plan();
        let master = vec![cost("Large Ruminants", "sheds", "Shed", 5000.0)];
        let before = (p.clone(), master.clone());
        let _ = rollup(&p, &master);
        let _ = plan_for(&p, &master, &VillageKey::new("A", "P1", "V1"), "Large Ruminants");
        assert_eq!((p, master), before);
    }

    #[test]
    fn plan_for_filters_thematic_and_zero_quantities() {
        let master = vec![
            cost("Large Ruminants", "sheds", "Shed", 5000.0),
            cost("Fisheries", "ponds", "Pond", 100.0),
        ];
        let items = plan_for(&plan(), &master, &VillageKey::new("B", "P2", "V3"), "Fisheries");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].work_name, "Pond");
        assert_eq!(items[0].total_cost, 400.0);

        let none = plan_for(&plan(), &master, &VillageKey::new("A", "P1", "V1"), "Fisheries");
        assert!(none.is_empty());
    }

    #[test]
    fn plan_for_inconsistent_selection_is_empty() {
        let master = vec![cost("Large Ruminants", "sheds", "Shed", 5000.0)];
        let items = plan_for(&plan(), &master, &VillageKey::new("A", "P2", "V1"), "Large Ruminants");
        assert!(items.is_empty());
    }

    #[test]
    fn plan_for_sums_duplicate_village_rows() {
        let p = Table::from_rows(
            &["mandal", "panchayath", "village", "sheds"],
            &[vec!["A", "P1", "V1", "2"], vec!["A", "P1", "V1", "1.5"]],
        );
        let master = vec![cost("Large Ruminants", "sheds", "Shed", 1000.0)];
        let items = plan_for(&p, &master, &VillageKey::new("A", "P1", "V1"), "Large Ruminants");
        assert_eq!(items[0].quantity, 3.5);
        assert_eq!(total_budget(&items), 3500.0);
    }
}

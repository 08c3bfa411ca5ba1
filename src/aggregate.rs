use crate::types::BudgetFact;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// A fact-table column that facts can be grouped, filtered or counted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Mandal,
    Panchayath,
    Village,
    Work,
    Thematic,
}

impl Dimension {
    pub fn value<'a>(&self, fact: &'a BudgetFact) -> &'a str {
        match self {
            Dimension::Mandal => &fact.mandal,
            Dimension::Panchayath => &fact.panchayath,
            Dimension::Village => &fact.village,
            Dimension::Work => &fact.work_name,
            Dimension::Thematic => &fact.thematic,
        }
    }

    /// Column name used when the dimension is a group key.
    pub fn header(&self) -> &'static str {
        match self {
            Dimension::Mandal => "mandal",
            Dimension::Panchayath => "panchayath",
            Dimension::Village => "village",
            Dimension::Work => "Work",
            Dimension::Thematic => "Thematic",
        }
    }

    /// Column name used when the dimension is distinct-counted.
    pub fn count_header(&self) -> &'static str {
        match self {
            Dimension::Mandal => "Mandals",
            Dimension::Panchayath => "Panchayaths",
            Dimension::Village => "Villages",
            Dimension::Work => "Works",
            Dimension::Thematic => "Thematics",
        }
    }
}

/// Keep only facts whose `dimension` equals `value` (a WHERE before GROUP BY).
#[derive(Debug, Clone, PartialEq)]
pub struct FactFilter {
    pub dimension: Dimension,
    pub value: String,
}

impl FactFilter {
    pub fn new(dimension: Dimension, value: impl Into<String>) -> Self {
        Self {
            dimension,
            value: value.into(),
        }
    }

    /// A selector value of "All" (or nothing) means no filter.
    pub fn from_selection(dimension: Dimension, selection: Option<&str>) -> Option<Self> {
        match selection {
            None | Some("All") => None,
            Some(v) => Some(Self::new(dimension, v)),
        }
    }

    pub fn matches(&self, fact: &BudgetFact) -> bool {
        self.dimension.value(fact) == self.value
    }
}

/// Group-by request: `units` and `total_cost` are always summed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateSpec {
    pub group_by: Vec<Dimension>,
    pub count_distinct: Vec<Dimension>,
    pub filter: Option<FactFilter>,
}

impl AggregateSpec {
    pub fn group_by(dims: &[Dimension]) -> Self {
        Self {
            group_by: dims.to_vec(),
            ..Self::default()
        }
    }

    pub fn count_distinct(mut self, dims: &[Dimension]) -> Self {
        self.count_distinct = dims.to_vec();
        self
    }

    pub fn filter(mut self, filter: Option<FactFilter>) -> Self {
        self.filter = filter;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub keys: Vec<String>,
    pub units: f64,
    pub total_cost: f64,
    pub distinct: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    pub group_by: Vec<Dimension>,
    pub count_distinct: Vec<Dimension>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn headers(&self) -> Vec<String> {
        self.group_by
            .iter()
            .map(|d| d.header().to_string())
            .chain(["Units".to_string(), "Total_Cost".to_string()])
            .chain(self.count_distinct.iter().map(|d| d.count_header().to_string()))
            .collect()
    }

    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                r.keys
                    .iter()
                    .cloned()
                    .chain([r.units.to_string(), r.total_cost.to_string()])
                    .chain(r.distinct.iter().map(|n| n.to_string()))
                    .collect()
            })
            .collect()
    }

    pub fn total_cost(&self) -> f64 {
        self.rows.iter().map(|r| r.total_cost).sum()
    }

    /// Sort by total cost, largest first, and keep `n` rows. Equal totals
    /// keep their group order.
    pub fn top_n(mut self, n: usize) -> Self {
        self.rows.sort_by(|a, b| {
            b.total_cost
                .partial_cmp(&a.total_cost)
                .unwrap_or(Ordering::Equal)
        });
        self.rows.truncate(n);
        self
    }
}

/// Group facts by `spec.group_by`, summing units and cost and counting
/// distinct values of `spec.count_distinct`. Groups come out in the order
/// their first fact appears.
pub fn aggregate(facts: &[BudgetFact], spec: &AggregateSpec) -> AggregateTable {
    struct Acc {
        keys: Vec<String>,
        units: f64,
        total_cost: f64,
        seen: Vec<HashSet<String>>,
    }

    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<Acc> = Vec::new();

    let selected = facts
        .iter()
        .filter(|f| spec.filter.as_ref().map_or(true, |flt| flt.matches(f)));
    for f in selected {
        let keys: Vec<String> = spec
            .group_by
            .iter()
            .map(|d| d.value(f).to_string())
            .collect();
        let slot = *index.entry(keys.clone()).or_insert_with(|| {
            groups.push(Acc {
                keys,
                units: 0.0,
                total_cost: 0.0,
                seen: vec![HashSet::new(); spec.count_distinct.len()],
            });
            groups.len() - 1
        });
        let acc = &mut groups[slot];
        acc.units += f.units;
        acc.total_cost += f.total_cost;
        for (set, d) in acc.seen.iter_mut().zip(&spec.count_distinct) {
            set.insert(d.value(f).to_string());
        }
    }

    AggregateTable {
        group_by: spec.group_by.clone(),
        count_distinct: spec.count_distinct.clone(),
        rows: groups
            .into_iter()
            .map(|acc| AggregateRow {
                keys: acc.keys,
                units: acc.units,
                total_cost: acc.total_cost,
                distinct: acc.seen.iter().map(HashSet::len).collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fact(m: &str, p: &str, v: &str, work: &str, thematic: &str, units: f64, cost: f64) -> BudgetFact {
        BudgetFact {
            mandal: m.to_string(),
            panchayath: p.to_string(),
            village: v.to_string(),
            work_name: work.to_string(),
            thematic: thematic.to_string(),
            units,
            total_cost: units * cost,
        }
    }

    fn facts() -> Vec<BudgetFact> {
        vec![
            fact("A", "P1", "V1", "Shed", "Large Ruminants", 3.0, 5000.0),
            fact("A", "P1", "V2", "Shed", "Large Ruminants", 0.0, 5000.0),
            fact("A", "P2", "V3", "Pond", "Fisheries", 2.0, 700.0),
            fact("B", "P3", "V4", "Shed", "Large Ruminants", 1.0, 5000.0),
            fact("B", "P3", "V4", "Pond", "Fisheries", 5.0, 700.0),
        ]
    }

    #[test]
    fn groups_in_first_seen_order_with_sums() {
        let t = aggregate(&facts(), &AggregateSpec::group_by(&[Dimension::Mandal]));
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].keys, vec!["A"]);
        assert_eq!(t.rows[0].units, 5.0);
        assert_eq!(t.rows[0].total_cost, 15000.0 + 1400.0);
        assert_eq!(t.rows[1].keys, vec!["B"]);
        assert_eq!(t.rows[1].total_cost, 5000.0 + 3500.0);
    }

    #[test]
    fn grouping_preserves_grand_total() {
        let all: f64 = facts().iter().map(|f| f.total_cost).sum();
        for dims in [
            vec![Dimension::Panchayath],
            vec![Dimension::Mandal, Dimension::Panchayath],
            vec![Dimension::Thematic],
            vec![Dimension::Work, Dimension::Village],
        ] {
            let t = aggregate(&facts(), &AggregateSpec::group_by(&dims));
            assert_eq!(t.total_cost(), all);
        }
    }

    #[test]
    fn count_distinct_counts_values_not_rows() {
        let spec = AggregateSpec::group_by(&[Dimension::Mandal])
            .count_distinct(&[Dimension::Panchayath, Dimension::Village]);
        let t = aggregate(&facts(), &spec);
        assert_eq!(t.rows[0].distinct, vec![2, 3]);
        assert_eq!(t.rows[1].distinct, vec![1, 1]);
        assert_eq!(
            t.headers(),
            vec!["mandal", "Units", "Total_Cost", "Panchayaths", "Villages"]
        );
    }

    #[test]
    fn zero_unit_facts_still_count_as_covered_villages() {
        let spec = AggregateSpec::group_by(&[Dimension::Thematic]).count_distinct(&[Dimension::Village]);
        let t = aggregate(&facts(), &spec);
        assert_eq!(t.rows[0].keys, vec!["Large Ruminants"]);
        assert_eq!(t.rows[0].distinct, vec![3]);
    }

    #[test]
    fn filter_applies_before_grouping() {
        let spec = AggregateSpec::group_by(&[Dimension::Panchayath])
            .filter(Some(FactFilter::new(Dimension::Thematic, "Fisheries")));
        let t = aggregate(&facts(), &spec);
        let keys: Vec<_> = t.rows.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(keys, vec!["P2", "P3"]);
        assert_eq!(t.total_cost(), 7.0 * 700.0);
    }

    #[test]
    fn all_selection_means_no_filter() {
        assert_eq!(FactFilter::from_selection(Dimension::Mandal, Some("All")), None);
        assert_eq!(FactFilter::from_selection(Dimension::Mandal, None), None);
        let b = FactFilter::from_selection(Dimension::Mandal, Some("B")).unwrap();
        assert_eq!(facts().iter().filter(|f| b.matches(f)).count(), 2);
    }

    #[test]
    fn top_n_is_descending_and_stable() {
        let f = vec![
            fact("A", "P1", "V1", "Fence", "Land", 1.0, 100.0),
            fact("A", "P1", "V1", "Shed", "LR", 1.0, 500.0),
            fact("A", "P1", "V1", "Bund", "Land", 1.0, 100.0),
            fact("A", "P1", "V1", "Pond", "Fish", 1.0, 50.0),
        ];
        let t = aggregate(&f, &AggregateSpec::group_by(&[Dimension::Work])).top_n(3);
        let keys: Vec<_> = t.rows.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(keys, vec!["Shed", "Fence", "Bund"]);
    }

    #[test]
    fn empty_facts_give_empty_table() {
        let t = aggregate(&[], &AggregateSpec::group_by(&[Dimension::Mandal]));
        assert!(t.rows.is_empty());
        assert_eq!(t.total_cost(), 0.0);
    }
}

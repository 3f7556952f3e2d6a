use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::engine::project;
use super::expenses::{EmergencyExpenses, ExpenseError};
use super::input::{Scenario, parse_expense_entry};
use super::types::{CRORE, ScenarioParameters, ScenarioProjection, YearResult};

/// Real-value thresholds compared across scenarios, in crores.
pub const MILESTONE_CRORES: [f64; 4] = [5.0, 10.0, 20.0, 50.0];

const CHART_HEADROOM: f64 = 1.1;
const BAR_HEADROOM: f64 = 1.2;
const TICK_EVERY_YEARS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScenarioSetError {
    #[error("unknown scenario index {0}")]
    UnknownScenario(usize),
    #[error(transparent)]
    Expense(#[from] ExpenseError),
}

#[derive(Debug, Clone)]
struct ScenarioEntry {
    scenario: Scenario,
    results: Vec<YearResult>,
}

impl ScenarioEntry {
    fn new(scenario: Scenario) -> Self {
        let results = project(&scenario.params, &scenario.expenses);
        Self { scenario, results }
    }

    fn reproject(&mut self) {
        self.results = project(&self.scenario.params, &self.scenario.expenses);
        debug!(
            scenario = %self.scenario.name,
            years = self.results.len(),
            expenses = self.scenario.expenses.len(),
            "re-projected scenario"
        );
    }

    fn projection(&self) -> ScenarioProjection {
        ScenarioProjection {
            name: self.scenario.name.clone(),
            num_years: self.scenario.params.horizon(),
            results: self.results.clone(),
        }
    }
}

/// Independent scenarios, each holding the results of its latest projection.
///
/// Every mutation re-runs the engine for the touched scenario only.
#[derive(Debug, Clone, Default)]
pub struct ScenarioSet {
    entries: Vec<ScenarioEntry>,
}

impl ScenarioSet {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self {
            entries: scenarios.into_iter().map(ScenarioEntry::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn scenario(&self, index: usize) -> Option<&Scenario> {
        self.entries.get(index).map(|entry| &entry.scenario)
    }

    pub fn results(&self, index: usize) -> Option<&[YearResult]> {
        self.entries.get(index).map(|entry| entry.results.as_slice())
    }

    pub fn add_expense(
        &mut self,
        index: usize,
        year: u32,
        amount: f64,
    ) -> Result<Option<f64>, ScenarioSetError> {
        let entry = self.entry_mut(index)?;
        let previous = entry.scenario.expenses.insert(year, amount)?;
        entry.reproject();
        Ok(previous)
    }

    /// Adds an expense typed into the form; rejected input leaves the
    /// scenario untouched.
    pub fn add_expense_raw(
        &mut self,
        index: usize,
        raw_year: &str,
        raw_amount: &str,
    ) -> Result<Option<f64>, ScenarioSetError> {
        self.entry_mut(index)?;
        let (year, amount) = parse_expense_entry(raw_year, raw_amount)?;
        self.add_expense(index, year, amount)
    }

    pub fn remove_expense(
        &mut self,
        index: usize,
        year: u32,
    ) -> Result<Option<f64>, ScenarioSetError> {
        let entry = self.entry_mut(index)?;
        let removed = entry.scenario.expenses.remove(year);
        entry.reproject();
        Ok(removed)
    }

    pub fn set_parameters(
        &mut self,
        index: usize,
        params: ScenarioParameters,
    ) -> Result<(), ScenarioSetError> {
        let entry = self.entry_mut(index)?;
        entry.scenario.params = params;
        entry.reproject();
        Ok(())
    }

    pub fn projections(&self) -> Vec<ScenarioProjection> {
        self.entries.iter().map(ScenarioEntry::projection).collect()
    }

    pub fn compare(&self) -> Comparison {
        compare_projections(self.projections())
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut ScenarioEntry, ScenarioSetError> {
        self.entries
            .get_mut(index)
            .ok_or(ScenarioSetError::UnknownScenario(index))
    }
}

/// The three scenarios the calculator opens with.
pub fn default_scenarios() -> Vec<Scenario> {
    let base = ScenarioParameters {
        initial_capital: CRORE,
        returns: 12.0,
        inflation: 6.0,
        sip: 600_000.0,
        sip_step_up: 10.0,
        sip_duration: 15.0,
        swp: 0.0,
        swp_step_up: 0.0,
        home_loan_emi: 0.0,
        home_loan_tenure: 0.0,
        num_years: 30,
    };
    vec![
        Scenario {
            name: "Equity Heavy".to_string(),
            params: base,
            expenses: EmergencyExpenses::reference_schedule(),
        },
        Scenario {
            name: "Balanced + Home Loan".to_string(),
            params: ScenarioParameters {
                returns: 10.0,
                sip_step_up: 5.0,
                sip_duration: 20.0,
                home_loan_emi: 300_000.0,
                home_loan_tenure: 15.0,
                ..base
            },
            expenses: EmergencyExpenses::reference_schedule(),
        },
        Scenario {
            name: "Early Withdrawal".to_string(),
            params: ScenarioParameters {
                returns: 9.0,
                sip: 0.0,
                sip_step_up: 0.0,
                sip_duration: 0.0,
                swp: 600_000.0,
                swp_step_up: 6.0,
                ..base
            },
            expenses: EmergencyExpenses::reference_schedule(),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRange {
    pub max_value: f64,
    pub min_value: f64,
    pub span: f64,
    pub year_ticks: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    pub scale: f64,
    pub bars: Vec<FinalValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub best: FinalValue,
    pub worst: FinalValue,
    pub difference: f64,
    /// Not finite when the worst final value is exactly zero.
    pub percent_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneReach {
    pub name: String,
    pub year: Option<u32>,
}

impl MilestoneReach {
    pub fn describe(&self) -> String {
        match self.year {
            Some(year) => format!("Year {year}"),
            None => "Not reached".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRow {
    pub threshold: f64,
    pub reached: Vec<MilestoneReach>,
    /// Latest reaching year across scenarios, never below 1.
    pub longest_year: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub year: u32,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub scenarios: Vec<ScenarioProjection>,
    pub max_years: u32,
    pub chart: Option<ChartRange>,
    pub bar_chart: Option<BarChart>,
    pub summary: Option<Summary>,
    pub milestones: Vec<MilestoneRow>,
    pub table: Vec<TableRow>,
}

pub fn compare_projections(scenarios: Vec<ScenarioProjection>) -> Comparison {
    let max_years = scenarios.iter().map(|s| s.num_years).max().unwrap_or(0);
    let finals = final_values(&scenarios);

    Comparison {
        max_years,
        chart: chart_range(&scenarios, max_years),
        bar_chart: bar_chart(&finals),
        summary: summarize(&finals),
        milestones: MILESTONE_CRORES
            .iter()
            .map(|&crores| milestone_row(&scenarios, crores * CRORE))
            .collect(),
        table: year_table(&scenarios, max_years),
        scenarios,
    }
}

fn final_values(scenarios: &[ScenarioProjection]) -> Vec<FinalValue> {
    scenarios
        .iter()
        .filter_map(|s| {
            s.final_real().map(|value| FinalValue {
                name: s.name.clone(),
                value,
            })
        })
        .collect()
}

fn chart_range(scenarios: &[ScenarioProjection], max_years: u32) -> Option<ChartRange> {
    let mut values = scenarios.iter().flat_map(|s| s.results.iter().map(|r| r.real));
    let first = values.next()?;
    let (lowest, highest) = values.fold((first, first), |(lo, hi), v| {
        (nan_aware_min(lo, v), nan_aware_max(hi, v))
    });

    let max_value = highest * CHART_HEADROOM;
    let min_value = nan_aware_min(lowest * CHART_HEADROOM, 0.0);
    Some(ChartRange {
        max_value,
        min_value,
        span: max_value - min_value,
        year_ticks: (TICK_EVERY_YEARS..=max_years)
            .step_by(TICK_EVERY_YEARS as usize)
            .collect(),
    })
}

// Unlike `f64::min`/`f64::max`, a NaN operand yields NaN.
fn nan_aware_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn nan_aware_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn bar_chart(finals: &[FinalValue]) -> Option<BarChart> {
    let largest = finals
        .iter()
        .map(|f| f.value.abs())
        .reduce(nan_aware_max)?;
    Some(BarChart {
        scale: largest * BAR_HEADROOM,
        bars: finals.to_vec(),
    })
}

fn summarize(finals: &[FinalValue]) -> Option<Summary> {
    let mut ranked = finals.to_vec();
    // Stable, so equal values keep scenario order.
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    let best = ranked.first()?.clone();
    let worst = ranked.last()?.clone();
    let difference = best.value - worst.value;
    Some(Summary {
        percent_difference: difference / worst.value.abs() * 100.0,
        difference,
        best,
        worst,
    })
}

fn milestone_row(scenarios: &[ScenarioProjection], threshold: f64) -> MilestoneRow {
    let reached = scenarios
        .iter()
        .map(|s| MilestoneReach {
            name: s.name.clone(),
            year: s
                .results
                .iter()
                .find(|r| r.real >= threshold)
                .map(|r| r.year),
        })
        .collect::<Vec<_>>();
    let longest_year = reached
        .iter()
        .filter_map(|r| r.year)
        .max()
        .unwrap_or(1)
        .max(1);
    MilestoneRow {
        threshold,
        reached,
        longest_year,
    }
}

fn year_table(scenarios: &[ScenarioProjection], max_years: u32) -> Vec<TableRow> {
    (1..=max_years)
        .map(|year| TableRow {
            year,
            values: scenarios
                .iter()
                .map(|s| s.results.get(year as usize - 1).map(|r| r.real))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn projection(name: &str, reals: &[f64]) -> ScenarioProjection {
        ScenarioProjection {
            name: name.to_string(),
            num_years: reals.len() as u32,
            results: reals
                .iter()
                .enumerate()
                .map(|(idx, &real)| YearResult {
                    year: idx as u32 + 1,
                    nominal: real,
                    real,
                })
                .collect(),
        }
    }

    /// Real value crosses `threshold` exactly at `year`, or never.
    fn ramp(name: &str, years: u32, cross_at: Option<u32>, threshold: f64) -> ScenarioProjection {
        let reals = (1..=years)
            .map(|y| match cross_at {
                Some(at) if y >= at => threshold + f64::from(y - at),
                _ => threshold * 0.5,
            })
            .collect::<Vec<_>>();
        projection(name, &reals)
    }

    fn flat_scenario(name: &str, capital: f64, years: u32) -> Scenario {
        Scenario {
            name: name.to_string(),
            params: ScenarioParameters {
                initial_capital: capital,
                inflation: 6.0,
                num_years: years,
                ..ScenarioParameters::default()
            },
            expenses: EmergencyExpenses::new(),
        }
    }

    #[test]
    fn milestone_years_report_first_crossing_or_not_reached() {
        let five_crore = 5.0 * CRORE;
        let comparison = compare_projections(vec![
            ramp("A", 20, Some(8), five_crore),
            ramp("B", 20, Some(12), five_crore),
            ramp("C", 20, None, five_crore),
        ]);
        let row = &comparison.milestones[0];
        assert_approx(row.threshold, five_crore);
        let described = row
            .reached
            .iter()
            .map(MilestoneReach::describe)
            .collect::<Vec<_>>();
        assert_eq!(described, vec!["Year 8", "Year 12", "Not reached"]);
        assert_eq!(row.longest_year, 12);
    }

    #[test]
    fn milestone_longest_year_defaults_to_one() {
        let comparison = compare_projections(vec![projection("Low", &[1.0, 2.0])]);
        for row in &comparison.milestones {
            assert_eq!(row.reached[0].year, None);
            assert_eq!(row.longest_year, 1);
        }
    }

    #[test]
    fn summary_ranks_final_real_values() {
        let comparison = compare_projections(vec![
            projection("Mid", &[1.0, 200.0]),
            projection("Top", &[1.0, 500.0]),
            projection("Low", &[1.0, -100.0]),
        ]);
        let summary = comparison.summary.expect("summary present");
        assert_eq!(summary.best.name, "Top");
        assert_eq!(summary.worst.name, "Low");
        assert_approx(summary.difference, 600.0);
        assert_approx(summary.percent_difference, 600.0);
    }

    #[test]
    fn summary_ties_keep_scenario_order() {
        let comparison = compare_projections(vec![
            projection("First", &[10.0]),
            projection("Second", &[10.0]),
        ]);
        let summary = comparison.summary.expect("summary present");
        assert_eq!(summary.best.name, "First");
        assert_eq!(summary.worst.name, "Second");
        assert_eq!(summary.difference, 0.0);
        assert_eq!(summary.percent_difference, 0.0);
    }

    #[test]
    fn zero_worst_value_gives_non_finite_percentage() {
        let comparison =
            compare_projections(vec![projection("Up", &[50.0]), projection("Zero", &[0.0])]);
        let summary = comparison.summary.expect("summary present");
        assert!(summary.percent_difference.is_infinite());
        let json = serde_json::to_string(&summary).expect("summary should serialize");
        assert!(json.contains("\"percentDifference\":null"));
    }

    #[test]
    fn chart_range_adds_headroom_and_keeps_zero_in_view() {
        let comparison = compare_projections(vec![
            projection("A", &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]),
            projection("B", &[5.0, 6.0]),
        ]);
        let chart = comparison.chart.expect("chart present");
        assert_approx(chart.max_value, 66.0);
        assert_eq!(chart.min_value, 0.0);
        assert_approx(chart.span, 66.0);
        assert_eq!(chart.year_ticks, vec![5]);

        let negative = compare_projections(vec![projection("Debt", &[-10.0, 20.0])]);
        let chart = negative.chart.expect("chart present");
        assert_approx(chart.min_value, -11.0);
        assert_approx(chart.span, 33.0);
    }

    #[test]
    fn nan_real_values_propagate_into_chart_scales() {
        let comparison = compare_projections(vec![
            projection("Fine", &[10.0, 20.0]),
            projection("Degenerate", &[f64::NAN]),
        ]);
        let chart = comparison.chart.expect("chart present");
        assert!(chart.max_value.is_nan());
        assert!(chart.min_value.is_nan());
        assert!(chart.span.is_nan());
        assert!(comparison.bar_chart.expect("bars present").scale.is_nan());

        let leading = compare_projections(vec![projection("Degenerate", &[f64::NAN, 5.0])]);
        assert!(leading.chart.expect("chart present").max_value.is_nan());
    }

    #[test]
    fn table_pads_shorter_scenarios() {
        let comparison = compare_projections(vec![
            projection("Long", &[1.0, 2.0, 3.0]),
            projection("Short", &[4.0]),
        ]);
        assert_eq!(comparison.max_years, 3);
        assert_eq!(comparison.table.len(), 3);
        assert_eq!(comparison.table[0].values, vec![Some(1.0), Some(4.0)]);
        assert_eq!(comparison.table[2].year, 3);
        assert_eq!(comparison.table[2].values, vec![Some(3.0), None]);
    }

    #[test]
    fn bar_chart_scales_by_largest_magnitude() {
        let comparison = compare_projections(vec![
            projection("A", &[10.0]),
            projection("B", &[-50.0]),
        ]);
        let bars = comparison.bar_chart.expect("bars present");
        assert_approx(bars.scale, 60.0);
        assert_eq!(bars.bars.len(), 2);
    }

    #[test]
    fn empty_horizons_are_left_out_of_finals() {
        let comparison = compare_projections(vec![
            projection("Empty", &[]),
            projection("Some", &[7.0]),
        ]);
        let summary = comparison.summary.expect("summary present");
        assert_eq!(summary.best.name, "Some");
        assert_eq!(summary.worst.name, "Some");
        assert_eq!(comparison.bar_chart.expect("bars present").bars.len(), 1);

        let nothing = compare_projections(vec![projection("Empty", &[])]);
        assert!(nothing.summary.is_none());
        assert!(nothing.chart.is_none());
        assert!(nothing.bar_chart.is_none());
        assert!(nothing.table.is_empty());
    }

    #[test]
    fn adding_expense_reprojects_only_that_scenario() {
        let mut set = ScenarioSet::new(vec![
            flat_scenario("A", 1_000_000.0, 10),
            flat_scenario("B", 1_000_000.0, 10),
        ]);
        let untouched = set.results(1).expect("scenario B").to_vec();

        set.add_expense(0, 4, 10_000.0).expect("valid expense");
        let changed = set.results(0).expect("scenario A");
        assert_approx(
            untouched[3].nominal - changed[3].nominal,
            10_000.0 * 1.06_f64.powf(4.0),
        );
        assert_eq!(set.results(1).expect("scenario B"), untouched.as_slice());
    }

    #[test]
    fn removing_expense_restores_original_results() {
        let mut set = ScenarioSet::new(vec![flat_scenario("A", 2_000_000.0, 12)]);
        let before = set.results(0).expect("scenario A").to_vec();

        set.add_expense(0, 6, 75_000.0).expect("valid expense");
        assert_ne!(set.results(0).expect("scenario A"), before.as_slice());

        assert_eq!(set.remove_expense(0, 6), Ok(Some(75_000.0)));
        let after = set.results(0).expect("scenario A");
        for (a, b) in before.iter().zip(after) {
            assert_eq!(a.nominal.to_bits(), b.nominal.to_bits());
            assert_eq!(a.real.to_bits(), b.real.to_bits());
        }
    }

    #[test]
    fn rejected_raw_expense_leaves_scenario_untouched() {
        let mut set = ScenarioSet::new(vec![flat_scenario("A", 1_000.0, 3)]);
        let before = set.results(0).expect("scenario A").to_vec();

        assert_eq!(
            set.add_expense_raw(0, "51", "100"),
            Err(ScenarioSetError::Expense(ExpenseError::InvalidYear))
        );
        assert_eq!(
            set.add_expense_raw(0, "2", "abc"),
            Err(ScenarioSetError::Expense(ExpenseError::InvalidAmount))
        );
        assert!(set.scenario(0).expect("scenario A").expenses.is_empty());
        assert_eq!(set.results(0).expect("scenario A"), before.as_slice());

        assert_eq!(set.add_expense_raw(0, "2", "100"), Ok(None));
        assert_eq!(set.scenario(0).expect("scenario A").expenses.amount_for(2), 100.0);
    }

    #[test]
    fn unknown_scenario_is_reported() {
        let mut set = ScenarioSet::new(vec![flat_scenario("A", 1_000.0, 3)]);
        assert_eq!(
            set.add_expense(3, 1, 1.0),
            Err(ScenarioSetError::UnknownScenario(3))
        );
        assert_eq!(
            set.remove_expense(9, 1),
            Err(ScenarioSetError::UnknownScenario(9))
        );
    }

    #[test]
    fn parameter_change_replaces_results_wholesale() {
        let mut set = ScenarioSet::new(vec![flat_scenario("A", 1_000.0, 3)]);
        let mut params = set.scenario(0).expect("scenario A").params;
        params.num_years = 7;
        set.set_parameters(0, params).expect("known scenario");
        let results = set.results(0).expect("scenario A");
        assert_eq!(results.len(), 7);
        assert_eq!(results[6].year, 7);
    }

    #[test]
    fn default_scenarios_share_horizon_and_expenses() {
        let set = ScenarioSet::new(default_scenarios());
        assert_eq!(set.len(), 3);
        let comparison = set.compare();
        assert_eq!(comparison.max_years, 30);
        assert_eq!(comparison.table.len(), 30);
        assert_eq!(comparison.milestones.len(), MILESTONE_CRORES.len());
        for scenario in &comparison.scenarios {
            assert_eq!(scenario.results.len(), 30);
        }
        assert!(comparison.summary.is_some());
    }
}

mod compare;
mod engine;
mod expenses;
mod format;
mod input;
mod types;

pub use compare::{
    BarChart, ChartRange, Comparison, FinalValue, MILESTONE_CRORES, MilestoneReach, MilestoneRow,
    ScenarioSet, ScenarioSetError, Summary, TableRow, compare_projections, default_scenarios,
};
pub use engine::project;
pub use expenses::{EmergencyExpenses, ExpenseError, MAX_EXPENSE_YEAR, MIN_EXPENSE_YEAR};
pub use format::{format_amount, format_crores, format_grouped, milestone_label, to_fixed};
pub use input::{
    RawField, RawScenario, RawScenarioParameters, Scenario, ScenarioInputError, coerce_number,
    parse_expense_entry,
};
pub use types::{
    CRORE, LAKH, MAX_PROJECTION_YEARS, ScenarioParameters, ScenarioProjection, YearResult,
};

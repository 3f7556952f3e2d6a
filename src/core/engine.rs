use super::expenses::EmergencyExpenses;
use super::types::{ScenarioParameters, YearResult};

#[derive(Debug, Clone, Copy)]
struct FlowState {
    capital: f64,
    sip_amount: f64,
    swp_amount: f64,
}

impl FlowState {
    fn opening(params: &ScenarioParameters) -> Self {
        Self {
            capital: params.initial_capital,
            sip_amount: params.sip,
            swp_amount: params.swp,
        }
    }
}

/// Runs the year-by-year projection for one scenario.
///
/// Cash flows for a year are settled before that year's return is applied, so
/// money added or taken out mid-year earns nothing until the following year.
pub fn project(params: &ScenarioParameters, expenses: &EmergencyExpenses) -> Vec<YearResult> {
    let mut state = FlowState::opening(params);
    let horizon = params.horizon();
    let mut results = Vec::with_capacity(horizon as usize);
    for year in 1..=horizon {
        results.push(step_year(params, expenses, &mut state, year));
    }
    results
}

fn step_year(
    params: &ScenarioParameters,
    expenses: &EmergencyExpenses,
    state: &mut FlowState,
    year: u32,
) -> YearResult {
    apply_contribution(params, state, year);
    apply_withdrawal(params, state);
    apply_loan_payment(params, state, year);
    apply_emergency_expense(params, expenses, state, year);
    state.capital *= growth_factor(params.returns);

    YearResult {
        year,
        nominal: state.capital,
        real: state.capital / inflation_index(params.inflation, year),
    }
}

fn apply_contribution(params: &ScenarioParameters, state: &mut FlowState, year: u32) {
    if f64::from(year) <= params.sip_duration {
        state.capital += state.sip_amount;
        state.sip_amount *= growth_factor(params.sip_step_up);
    }
}

fn apply_withdrawal(params: &ScenarioParameters, state: &mut FlowState) {
    state.capital -= state.swp_amount;
    state.swp_amount *= growth_factor(params.swp_step_up);
}

fn apply_loan_payment(params: &ScenarioParameters, state: &mut FlowState, year: u32) {
    if f64::from(year) <= params.home_loan_tenure {
        state.capital -= params.home_loan_emi;
    }
}

fn apply_emergency_expense(
    params: &ScenarioParameters,
    expenses: &EmergencyExpenses,
    state: &mut FlowState,
    year: u32,
) {
    state.capital -= expenses.amount_for(year) * inflation_index(params.inflation, year);
}

fn growth_factor(rate_pct: f64) -> f64 {
    1.0 + rate_pct / 100.0
}

/// Cumulative price level at the end of `year`, relative to year 0.
pub(crate) fn inflation_index(inflation_pct: f64, year: u32) -> f64 {
    growth_factor(inflation_pct).powf(f64::from(year))
}

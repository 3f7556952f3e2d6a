use serde::Serialize;

pub const CRORE: f64 = 10_000_000.0;
pub const LAKH: f64 = 100_000.0;
/// Longest horizon the engine will simulate.
pub const MAX_PROJECTION_YEARS: u32 = 50;

/// Inputs for a single scenario. Rates are annual percentages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScenarioParameters {
    pub initial_capital: f64,
    pub returns: f64,
    pub inflation: f64,
    pub sip: f64,
    pub sip_step_up: f64,
    pub sip_duration: f64,
    pub swp: f64,
    pub swp_step_up: f64,
    pub home_loan_emi: f64,
    pub home_loan_tenure: f64,
    pub num_years: u32,
}

impl ScenarioParameters {
    /// Number of years actually simulated.
    pub fn horizon(&self) -> u32 {
        self.num_years.min(MAX_PROJECTION_YEARS)
    }
}

/// End-of-year capital. Both values are in raw currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearResult {
    pub year: u32,
    pub nominal: f64,
    pub real: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProjection {
    pub name: String,
    pub num_years: u32,
    pub results: Vec<YearResult>,
}

impl ScenarioProjection {
    pub fn final_real(&self) -> Option<f64> {
        self.results.last().map(|r| r.real)
    }
}

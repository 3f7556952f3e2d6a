use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::expenses::{EmergencyExpenses, ExpenseError, MAX_EXPENSE_YEAR, MIN_EXPENSE_YEAR};
use super::types::{MAX_PROJECTION_YEARS, ScenarioParameters};

/// A form value as it arrives from the outside: a number, a string, or junk.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RawField(Value);

impl RawField {
    pub fn coerce(&self) -> f64 {
        match &self.0 {
            Value::Number(n) => zero_if_falsy(n.as_f64()),
            Value::String(s) => coerce_number(s),
            _ => 0.0,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match &self.0 {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        Self(serde_json::json!(value))
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawScenarioParameters {
    pub initial_capital: RawField,
    pub returns: RawField,
    pub inflation: RawField,
    pub sip: RawField,
    pub sip_step_up: RawField,
    pub sip_duration: RawField,
    pub swp: RawField,
    pub swp_step_up: RawField,
    pub home_loan_emi: RawField,
    pub home_loan_tenure: RawField,
    pub num_years: RawField,
}

impl From<&RawScenarioParameters> for ScenarioParameters {
    fn from(raw: &RawScenarioParameters) -> Self {
        Self {
            initial_capital: raw.initial_capital.coerce(),
            returns: raw.returns.coerce(),
            inflation: raw.inflation.coerce(),
            sip: raw.sip.coerce(),
            sip_step_up: raw.sip_step_up.coerce(),
            sip_duration: raw.sip_duration.coerce(),
            swp: raw.swp.coerce(),
            swp_step_up: raw.swp_step_up.coerce(),
            home_loan_emi: raw.home_loan_emi.coerce(),
            home_loan_tenure: raw.home_loan_tenure.coerce(),
            num_years: whole_years(raw.num_years.coerce()),
        }
    }
}

impl From<&ScenarioParameters> for RawScenarioParameters {
    fn from(params: &ScenarioParameters) -> Self {
        Self {
            initial_capital: params.initial_capital.into(),
            returns: params.returns.into(),
            inflation: params.inflation.into(),
            sip: params.sip.into(),
            sip_step_up: params.sip_step_up.into(),
            sip_duration: params.sip_duration.into(),
            swp: params.swp.into(),
            swp_step_up: params.swp_step_up.into(),
            home_loan_emi: params.home_loan_emi.into(),
            home_loan_tenure: params.home_loan_tenure.into(),
            num_years: f64::from(params.num_years).into(),
        }
    }
}

/// A named scenario as submitted by a client or read from a file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawScenario {
    pub name: Option<String>,
    pub params: RawScenarioParameters,
    pub expenses: BTreeMap<String, RawField>,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{scenario}: {source}")]
pub struct ScenarioInputError {
    pub scenario: String,
    #[source]
    pub source: ExpenseError,
}

/// Validated scenario ready for projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub params: ScenarioParameters,
    pub expenses: EmergencyExpenses,
}

impl RawScenario {
    /// `position` is zero-based and only used to name unnamed scenarios.
    pub fn into_scenario(self, position: usize) -> Result<Scenario, ScenarioInputError> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => format!("Scenario {}", position + 1),
        };
        let params = ScenarioParameters::from(&self.params);

        let mut expenses = EmergencyExpenses::new();
        for (raw_year, raw_amount) in &self.expenses {
            let amount_text = raw_amount.as_text().unwrap_or_default();
            let (year, amount) =
                parse_expense_entry(raw_year, &amount_text).map_err(|source| {
                    ScenarioInputError {
                        scenario: name.clone(),
                        source,
                    }
                })?;
            expenses
                .insert(year, amount)
                .map_err(|source| ScenarioInputError {
                    scenario: name.clone(),
                    source,
                })?;
        }

        Ok(Scenario {
            name,
            params,
            expenses,
        })
    }
}

impl From<&Scenario> for RawScenario {
    fn from(scenario: &Scenario) -> Self {
        Self {
            name: Some(scenario.name.clone()),
            params: RawScenarioParameters::from(&scenario.params),
            expenses: scenario
                .expenses
                .iter()
                .map(|(year, amount)| (year.to_string(), amount.into()))
                .collect(),
        }
    }
}

/// Validates a year/amount pair typed into the expense form.
pub fn parse_expense_entry(raw_year: &str, raw_amount: &str) -> Result<(u32, f64), ExpenseError> {
    let year = parse_int_prefix(raw_year)
        .filter(|&y| (i64::from(MIN_EXPENSE_YEAR)..=i64::from(MAX_EXPENSE_YEAR)).contains(&y))
        .ok_or(ExpenseError::InvalidYear)?;
    let amount = parse_float_prefix(raw_amount)
        .filter(|&a| a > 0.0)
        .ok_or(ExpenseError::InvalidAmount)?;
    Ok((year as u32, amount))
}

/// Reads the leading number of `text`; unparsable, NaN, or zero input is `0`.
pub fn coerce_number(text: &str) -> f64 {
    zero_if_falsy(parse_float_prefix(text))
}

fn zero_if_falsy(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() && v != 0.0 => v,
        _ => 0.0,
    }
}

fn whole_years(value: f64) -> u32 {
    if value >= 1.0 {
        value.floor().min(f64::from(MAX_PROJECTION_YEARS)) as u32
    } else {
        0
    }
}

/// Longest decimal-literal prefix after leading whitespace, like `parseFloat`.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if trimmed[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    trimmed[..end].parse::<f64>().ok()
}

/// Leading base-10 integer of `text`, like `parseInt(text)`.
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    match trimmed[..end].parse::<i64>() {
        Ok(v) => Some(v),
        // Too many digits to fit is still "a number", just far out of range.
        Err(_) if bytes.first() == Some(&b'-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

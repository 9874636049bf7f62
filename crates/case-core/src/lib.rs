#![deny(warnings)]

//! Core domain models and invariants for the negotiation case.
//!
//! This crate defines the serializable inputs of a scenario, the typed
//! partial update used by named scenarios, the immutable case configuration,
//! and validation helpers that guard the evaluator's documented domain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Months covered by the projected accruals (rent, interest, loan principal).
pub const PROJECTION_MONTHS: u32 = 12;

/// Whether Sandy keeps renting the workshop from Viking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentRelationship {
    /// Sandy stays on as Viking's tenant.
    Stays,
    /// Sandy moves out; no future rent flows to Viking.
    Leaves,
}

impl RentRelationship {
    /// True when future rent keeps flowing from Sandy to Viking.
    pub fn stays(self) -> bool {
        matches!(self, RentRelationship::Stays)
    }
}

impl fmt::Display for RentRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RentRelationship::Stays => f.write_str("stays"),
            RentRelationship::Leaves => f.write_str("leaves"),
        }
    }
}

impl FromStr for RentRelationship {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stays" => Ok(RentRelationship::Stays),
            "leaves" => Ok(RentRelationship::Leaves),
            other => Err(ValidationError::UnknownRentRelationship(other.to_string())),
        }
    }
}

/// Complete input record for one evaluation.
///
/// Facts of the case (debts, house, unit economics) and negotiated levers
/// live side by side; the evaluator does not distinguish between them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInputs {
    /// Units delivered to Viking (>= 0).
    pub units: Decimal,
    /// Invoiced price per unit. Reference only.
    pub invoice_per_unit: Decimal,
    /// Original contract price per unit, the baseline for Viking's extra cash out.
    pub contract_base_per_unit: Decimal,
    /// Sandy's starting cash.
    pub cash_on_hand: Decimal,
    /// Outstanding bill for oak already purchased and installed.
    pub oak_bill: Decimal,
    /// Rent Sandy owes Viking for past months.
    pub past_due_rent: Decimal,
    /// Principal of Viking's recallable loan to Sandy.
    pub loan_callable_amount: Decimal,
    /// Market value of Sandy's house.
    pub house_market_value: Decimal,
    /// Mortgage balance on the house.
    pub house_mortgage: Decimal,
    /// Book value of the house, used on the balance sheet only.
    pub house_book_value: Decimal,
    /// Viking's sale price per finished unit.
    pub viking_sale_price: Decimal,
    /// Viking's per-unit costs other than the payment to Sandy.
    pub viking_other_costs_per_unit: Decimal,
    /// Negotiated price Viking pays Sandy per unit.
    pub payment_per_unit: Decimal,
    /// Negotiated monthly rent Sandy owes Viking.
    pub rent_per_month: Decimal,
    /// Whether Viking calls the loan due immediately.
    pub loan_recalled: bool,
    /// Whether Sandy sells the house voluntarily.
    pub sell_house_now: bool,
    /// Whether Sandy keeps renting from Viking.
    pub rent_relationship: RentRelationship,
    /// Annual interest on the loan, in percent (0..=100).
    pub loan_interest_rate_percent: Decimal,
    /// Share of principal Viking recovers if Sandy ends insolvent, in percent (0..=100).
    pub loan_recovery_rate_percent: Decimal,
}

impl Default for ScenarioInputs {
    /// The case as documented: 100 units at the 7,000 contract price, rent
    /// continuing at 5,000 a month, loan left outstanding at 10%.
    fn default() -> Self {
        Self {
            units: Decimal::new(100, 0),
            invoice_per_unit: Decimal::new(9_500, 0),
            contract_base_per_unit: Decimal::new(7_000, 0),
            cash_on_hand: Decimal::new(10_000, 0),
            oak_bill: Decimal::new(700_000, 0),
            past_due_rent: Decimal::new(10_000, 0),
            loan_callable_amount: Decimal::new(200_000, 0),
            house_market_value: Decimal::new(800_000, 0),
            house_mortgage: Decimal::new(375_000, 0),
            house_book_value: Decimal::new(1_100_000, 0),
            viking_sale_price: Decimal::new(175_000, 0),
            // keeps Viking's base margin near 20,000 per unit at the contract price
            viking_other_costs_per_unit: Decimal::new(133_000, 0),
            payment_per_unit: Decimal::new(7_000, 0),
            rent_per_month: Decimal::new(5_000, 0),
            loan_recalled: false,
            sell_house_now: false,
            rent_relationship: RentRelationship::Stays,
            loan_interest_rate_percent: Decimal::new(10, 0),
            loan_recovery_rate_percent: Decimal::new(25, 0),
        }
    }
}

/// Typed partial update over [`ScenarioInputs`]. Unset fields keep the base value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_per_unit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_base_per_unit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_on_hand: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oak_bill: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_due_rent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_callable_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_market_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_mortgage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_book_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viking_sale_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viking_other_costs_per_unit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_per_unit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_per_month: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_recalled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_house_now: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_relationship: Option<RentRelationship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_interest_rate_percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_recovery_rate_percent: Option<Decimal>,
}

impl ScenarioOverrides {
    /// Produce a full input record: `base` with every set field replaced.
    pub fn apply_to(&self, base: &ScenarioInputs) -> ScenarioInputs {
        ScenarioInputs {
            units: self.units.unwrap_or(base.units),
            invoice_per_unit: self.invoice_per_unit.unwrap_or(base.invoice_per_unit),
            contract_base_per_unit: self
                .contract_base_per_unit
                .unwrap_or(base.contract_base_per_unit),
            cash_on_hand: self.cash_on_hand.unwrap_or(base.cash_on_hand),
            oak_bill: self.oak_bill.unwrap_or(base.oak_bill),
            past_due_rent: self.past_due_rent.unwrap_or(base.past_due_rent),
            loan_callable_amount: self
                .loan_callable_amount
                .unwrap_or(base.loan_callable_amount),
            house_market_value: self.house_market_value.unwrap_or(base.house_market_value),
            house_mortgage: self.house_mortgage.unwrap_or(base.house_mortgage),
            house_book_value: self.house_book_value.unwrap_or(base.house_book_value),
            viking_sale_price: self.viking_sale_price.unwrap_or(base.viking_sale_price),
            viking_other_costs_per_unit: self
                .viking_other_costs_per_unit
                .unwrap_or(base.viking_other_costs_per_unit),
            payment_per_unit: self.payment_per_unit.unwrap_or(base.payment_per_unit),
            rent_per_month: self.rent_per_month.unwrap_or(base.rent_per_month),
            loan_recalled: self.loan_recalled.unwrap_or(base.loan_recalled),
            sell_house_now: self.sell_house_now.unwrap_or(base.sell_house_now),
            rent_relationship: self.rent_relationship.unwrap_or(base.rent_relationship),
            loan_interest_rate_percent: self
                .loan_interest_rate_percent
                .unwrap_or(base.loan_interest_rate_percent),
            loan_recovery_rate_percent: self
                .loan_recovery_rate_percent
                .unwrap_or(base.loan_recovery_rate_percent),
        }
    }

    /// Layer `top` over `self`; fields set in `top` win.
    pub fn layered(&self, top: &ScenarioOverrides) -> ScenarioOverrides {
        ScenarioOverrides {
            units: top.units.or(self.units),
            invoice_per_unit: top.invoice_per_unit.or(self.invoice_per_unit),
            contract_base_per_unit: top.contract_base_per_unit.or(self.contract_base_per_unit),
            cash_on_hand: top.cash_on_hand.or(self.cash_on_hand),
            oak_bill: top.oak_bill.or(self.oak_bill),
            past_due_rent: top.past_due_rent.or(self.past_due_rent),
            loan_callable_amount: top.loan_callable_amount.or(self.loan_callable_amount),
            house_market_value: top.house_market_value.or(self.house_market_value),
            house_mortgage: top.house_mortgage.or(self.house_mortgage),
            house_book_value: top.house_book_value.or(self.house_book_value),
            viking_sale_price: top.viking_sale_price.or(self.viking_sale_price),
            viking_other_costs_per_unit: top
                .viking_other_costs_per_unit
                .or(self.viking_other_costs_per_unit),
            payment_per_unit: top.payment_per_unit.or(self.payment_per_unit),
            rent_per_month: top.rent_per_month.or(self.rent_per_month),
            loan_recalled: top.loan_recalled.or(self.loan_recalled),
            sell_house_now: top.sell_house_now.or(self.sell_house_now),
            rent_relationship: top.rent_relationship.or(self.rent_relationship),
            loan_interest_rate_percent: top
                .loan_interest_rate_percent
                .or(self.loan_interest_rate_percent),
            loan_recovery_rate_percent: top
                .loan_recovery_rate_percent
                .or(self.loan_recovery_rate_percent),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ScenarioOverrides::default()
    }
}

/// Immutable case configuration: the defaults every scenario is merged onto.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseConfig {
    /// Fact and lever defaults.
    pub defaults: ScenarioInputs,
}

impl CaseConfig {
    pub fn new(defaults: ScenarioInputs) -> Self {
        Self { defaults }
    }

    /// Merge `overrides` onto the defaults and validate the result.
    pub fn inputs_for(
        &self,
        overrides: &ScenarioOverrides,
    ) -> Result<ScenarioInputs, ValidationError> {
        let inputs = overrides.apply_to(&self.defaults);
        validate_inputs(&inputs)?;
        Ok(inputs)
    }
}

/// A named scenario: an id, a display label and a partial override map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub values: ScenarioOverrides,
}

/// The negotiated levers of a scenario, the only values an export carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeverValues {
    pub payment_per_unit: Decimal,
    pub rent_per_month: Decimal,
    pub loan_recalled: bool,
    pub sell_house_now: bool,
    pub loan_interest_rate_percent: Decimal,
    pub rent_relationship: RentRelationship,
    pub viking_sale_price: Decimal,
    pub viking_other_costs_per_unit: Decimal,
}

impl LeverValues {
    pub fn from_inputs(inputs: &ScenarioInputs) -> Self {
        Self {
            payment_per_unit: inputs.payment_per_unit,
            rent_per_month: inputs.rent_per_month,
            loan_recalled: inputs.loan_recalled,
            sell_house_now: inputs.sell_house_now,
            loan_interest_rate_percent: inputs.loan_interest_rate_percent,
            rent_relationship: inputs.rent_relationship,
            viking_sale_price: inputs.viking_sale_price,
            viking_other_costs_per_unit: inputs.viking_other_costs_per_unit,
        }
    }

    /// Overrides touching exactly the lever fields.
    pub fn to_overrides(&self) -> ScenarioOverrides {
        ScenarioOverrides {
            payment_per_unit: Some(self.payment_per_unit),
            rent_per_month: Some(self.rent_per_month),
            loan_recalled: Some(self.loan_recalled),
            sell_house_now: Some(self.sell_house_now),
            loan_interest_rate_percent: Some(self.loan_interest_rate_percent),
            rent_relationship: Some(self.rent_relationship),
            viking_sale_price: Some(self.viking_sale_price),
            viking_other_costs_per_unit: Some(self.viking_other_costs_per_unit),
            ..ScenarioOverrides::default()
        }
    }
}

/// Placeholder id written into exported scenarios.
pub const EXPORT_PLACEHOLDER_ID: &str = "your_id_here";

/// A single scenario in export form. Facts of the case are never exported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedScenario {
    pub id: String,
    pub label: String,
    pub values: LeverValues,
}

impl ExportedScenario {
    /// Export the levers of `inputs` with the placeholder id and a generated label.
    pub fn from_inputs(inputs: &ScenarioInputs) -> Self {
        Self {
            id: EXPORT_PLACEHOLDER_ID.to_string(),
            label: lever_label(inputs),
            values: LeverValues::from_inputs(inputs),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn into_scenario(self) -> Scenario {
        Scenario {
            id: self.id,
            label: self.label,
            values: self.values.to_overrides(),
        }
    }
}

/// "$7,000 per unit, $5,000 rent, 10% interest"
pub fn lever_label(inputs: &ScenarioInputs) -> String {
    format!(
        "${} per unit, ${} rent, {}% interest",
        group_thousands(inputs.payment_per_unit),
        group_thousands(inputs.rent_per_month),
        inputs.loan_interest_rate_percent.normalize()
    )
}

/// Render a decimal with comma thousands separators, keeping any fraction digits.
///
/// Example:
/// assert_eq!(group_thousands(Decimal::new(-1234567, 1)), "-123,456.7");
pub fn group_thousands(value: Decimal) -> String {
    let text = value.normalize().abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(text.len() + digits.len() / 3 + 1);
    if value.is_sign_negative() && !value.is_zero() {
        grouped.push('-');
    }
    for (idx, d) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d as char);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Validation errors for scenario inputs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Units transacted must be non-negative.
    #[error("units must be >= 0, got {0}")]
    NegativeUnits(Decimal),
    /// Monetary values must be non-negative.
    #[error("negative monetary value in {0}")]
    NegativeMoney(&'static str),
    /// Percent fields are expressed in [0, 100].
    #[error("{0} must be within [0, 100]")]
    PercentOutOfRange(&'static str),
    /// Units and monetary values are capped at [`MAX_MAGNITUDE`].
    #[error("{0} exceeds {max}", max = MAX_MAGNITUDE)]
    OutOfRange(&'static str),
    /// Rent relationship is either "stays" or "leaves".
    #[error("unknown rent relationship: {0:?}")]
    UnknownRentRelationship(String),
}

/// Ceiling for units and every monetary field (one trillion). Products of two
/// capped values and the few-term sums built from them stay well inside
/// `Decimal`'s 96-bit mantissa, so evaluation cannot overflow.
pub const MAX_MAGNITUDE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Validate an input record against the evaluator's domain.
pub fn validate_inputs(i: &ScenarioInputs) -> Result<(), ValidationError> {
    let result = check_inputs(i);
    if let Err(err) = &result {
        debug!(%err, "scenario inputs rejected");
    }
    result
}

fn check_inputs(i: &ScenarioInputs) -> Result<(), ValidationError> {
    if i.units < Decimal::ZERO {
        return Err(ValidationError::NegativeUnits(i.units));
    }
    if i.units > MAX_MAGNITUDE {
        return Err(ValidationError::OutOfRange("units"));
    }
    let money = [
        ("invoice_per_unit", i.invoice_per_unit),
        ("contract_base_per_unit", i.contract_base_per_unit),
        ("cash_on_hand", i.cash_on_hand),
        ("oak_bill", i.oak_bill),
        ("past_due_rent", i.past_due_rent),
        ("loan_callable_amount", i.loan_callable_amount),
        ("house_market_value", i.house_market_value),
        ("house_mortgage", i.house_mortgage),
        ("house_book_value", i.house_book_value),
        ("viking_sale_price", i.viking_sale_price),
        ("viking_other_costs_per_unit", i.viking_other_costs_per_unit),
        ("payment_per_unit", i.payment_per_unit),
        ("rent_per_month", i.rent_per_month),
    ];
    if let Some((field, _)) = money.into_iter().find(|(_, v)| *v < Decimal::ZERO) {
        return Err(ValidationError::NegativeMoney(field));
    }
    if let Some((field, _)) = money.into_iter().find(|(_, v)| *v > MAX_MAGNITUDE) {
        return Err(ValidationError::OutOfRange(field));
    }
    let hundred = Decimal::ONE_HUNDRED;
    for (field, pct) in [
        ("loan_interest_rate_percent", i.loan_interest_rate_percent),
        ("loan_recovery_rate_percent", i.loan_recovery_rate_percent),
    ] {
        if pct < Decimal::ZERO || pct > hundred {
            return Err(ValidationError::PercentOutOfRange(field));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_are_valid() {
        validate_inputs(&ScenarioInputs::default()).unwrap();
        let cfg = CaseConfig::default();
        assert_eq!(cfg.defaults.units, Decimal::new(100, 0));
        assert_eq!(cfg.defaults.rent_relationship, RentRelationship::Stays);
    }

    #[test]
    fn overrides_parse_from_scenario_json() {
        let text = r#"{
            "id": "recall",
            "label": "Loan recalled",
            "values": { "loan_recalled": true, "payment_per_unit": 7500, "rent_relationship": "leaves" }
        }"#;
        let s: Scenario = serde_json::from_str(text).unwrap();
        assert_eq!(s.id, "recall");
        let inputs = s.values.apply_to(&ScenarioInputs::default());
        assert!(inputs.loan_recalled);
        assert_eq!(inputs.payment_per_unit, Decimal::new(7_500, 0));
        assert_eq!(inputs.rent_relationship, RentRelationship::Leaves);
        // untouched facts come from the base
        assert_eq!(inputs.oak_bill, Decimal::new(700_000, 0));
    }

    #[test]
    fn scenario_without_values_is_defaults() {
        let s: Scenario = serde_json::from_str(r#"{"id":"base","label":"Base"}"#).unwrap();
        assert!(s.values.is_empty());
        assert_eq!(
            s.values.apply_to(&ScenarioInputs::default()),
            ScenarioInputs::default()
        );
    }

    #[test]
    fn unknown_rent_relationship_is_rejected() {
        let text = r#"{"rent_relationship": "maybe"}"#;
        assert!(serde_json::from_str::<ScenarioOverrides>(text).is_err());
        assert_eq!(
            "maybe".parse::<RentRelationship>(),
            Err(ValidationError::UnknownRentRelationship("maybe".to_string()))
        );
        assert_eq!("stays".parse::<RentRelationship>(), Ok(RentRelationship::Stays));
    }

    #[test]
    fn validation_rejects_bad_inputs() {
        let mut i = ScenarioInputs::default();
        i.units = Decimal::new(-1, 0);
        assert_eq!(
            validate_inputs(&i),
            Err(ValidationError::NegativeUnits(Decimal::new(-1, 0)))
        );

        let mut i = ScenarioInputs::default();
        i.house_mortgage = Decimal::new(-5, 0);
        assert_eq!(
            validate_inputs(&i),
            Err(ValidationError::NegativeMoney("house_mortgage"))
        );

        let mut i = ScenarioInputs::default();
        i.loan_recovery_rate_percent = Decimal::new(101, 0);
        assert_eq!(
            validate_inputs(&i),
            Err(ValidationError::PercentOutOfRange("loan_recovery_rate_percent"))
        );
    }

    #[test]
    fn magnitude_ceiling() {
        assert_eq!(MAX_MAGNITUDE, Decimal::new(1_000_000_000_000, 0));

        let mut i = ScenarioInputs::default();
        i.payment_per_unit = "10000000000000000000000000000".parse().unwrap();
        assert_eq!(
            validate_inputs(&i),
            Err(ValidationError::OutOfRange("payment_per_unit"))
        );

        let mut i = ScenarioInputs::default();
        i.units = MAX_MAGNITUDE + Decimal::ONE;
        assert_eq!(validate_inputs(&i), Err(ValidationError::OutOfRange("units")));

        let mut i = ScenarioInputs::default();
        i.units = MAX_MAGNITUDE;
        i.house_book_value = MAX_MAGNITUDE;
        assert!(validate_inputs(&i).is_ok());
    }

    #[test]
    fn config_rejects_invalid_merge() {
        let cfg = CaseConfig::default();
        let o = ScenarioOverrides {
            loan_interest_rate_percent: Some(Decimal::new(-1, 0)),
            ..ScenarioOverrides::default()
        };
        assert!(cfg.inputs_for(&o).is_err());
    }

    #[test]
    fn layered_overrides_prefer_top() {
        let bottom = ScenarioOverrides {
            payment_per_unit: Some(Decimal::new(8_000, 0)),
            loan_recalled: Some(true),
            ..ScenarioOverrides::default()
        };
        let top = ScenarioOverrides {
            payment_per_unit: Some(Decimal::new(9_000, 0)),
            ..ScenarioOverrides::default()
        };
        let merged = bottom.layered(&top);
        assert_eq!(merged.payment_per_unit, Some(Decimal::new(9_000, 0)));
        assert_eq!(merged.loan_recalled, Some(true));
    }

    #[test]
    fn export_carries_only_levers() {
        let inputs = ScenarioInputs::default();
        let exported = ExportedScenario::from_inputs(&inputs);
        assert_eq!(exported.id, EXPORT_PLACEHOLDER_ID);
        assert_eq!(exported.label, "$7,000 per unit, $5,000 rent, 10% interest");

        let json = serde_json::to_value(&exported).unwrap();
        let values = json["values"].as_object().unwrap();
        assert_eq!(values.len(), 8);
        assert!(values.contains_key("viking_other_costs_per_unit"));
        assert!(!values.contains_key("oak_bill"));
        assert_eq!(values["rent_relationship"], "stays");
        assert!(values["payment_per_unit"].is_number());

        let back = exported.into_scenario();
        assert_eq!(back.values.payment_per_unit, Some(Decimal::new(7_000, 0)));
        assert_eq!(back.values.units, None);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(Decimal::new(7_000, 0)), "7,000");
        assert_eq!(group_thousands(Decimal::new(999, 0)), "999");
        assert_eq!(group_thousands(Decimal::new(1_234_567, 0)), "1,234,567");
        assert_eq!(group_thousands(Decimal::new(-1_234_567, 1)), "-123,456.7");
        assert_eq!(group_thousands(Decimal::ZERO), "0");
    }

    proptest! {
        #[test]
        fn empty_overrides_are_identity(units in 0i64..10_000, pay in 0i64..1_000_000, recalled in any::<bool>()) {
            let base = ScenarioInputs {
                units: Decimal::new(units, 0),
                payment_per_unit: Decimal::new(pay, 0),
                loan_recalled: recalled,
                ..ScenarioInputs::default()
            };
            prop_assert_eq!(ScenarioOverrides::default().apply_to(&base), base);
        }

        #[test]
        fn percents_in_range_validate(rate in 0i64..=100, recovery in 0i64..=100) {
            let i = ScenarioInputs {
                loan_interest_rate_percent: Decimal::new(rate, 0),
                loan_recovery_rate_percent: Decimal::new(recovery, 0),
                ..ScenarioInputs::default()
            };
            prop_assert!(validate_inputs(&i).is_ok());
        }

        #[test]
        fn grouping_drops_only_commas(v in -10_000_000_000i64..10_000_000_000) {
            let d = Decimal::new(v, 0);
            prop_assert_eq!(group_thousands(d).replace(',', ""), v.to_string());
        }
    }
}

#![deny(warnings)]

//! Scenario evaluator for the negotiation case.
//!
//! [`evaluate`] maps one [`ScenarioInputs`] record to one [`ScenarioResults`]
//! record. It is a single pass with no state between calls:
//! - Sandy's immediate obligations, project inflow and pre-house cash
//! - the forced house sale when Sandy would otherwise end negative
//! - 12-month projected accruals, gated on post-sale solvency
//! - Viking's cash, receipts and benefit
//! - period-end balance sheets for both parties

use case_core::{
    CaseConfig, ScenarioInputs, ScenarioOverrides, ValidationError, PROJECTION_MONTHS,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sandy's sunk cost per unit: 7,000 lumber + 1,340 labour + 500 other.
/// Already paid before the period, so it is reported but never enters cash.
pub const SANDY_UNIT_COST: Decimal = Decimal::from_parts(8_840, 0, 0, false, 0);

/// Derived results of one evaluation. Flat on purpose: presenters look fields
/// up by name and decide visibility and sign themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResults {
    // echoed levers
    pub payment_per_unit: Decimal,
    pub rent_per_month: Decimal,
    pub loan_recalled: bool,
    pub sell_house_now: bool,
    pub house_book_value: Decimal,

    /// The house goes on sale, either by choice or forced by insolvency.
    pub house_sale_occurs: bool,
    /// The sale produced cash for Sandy (net proceeds > 0).
    pub house_sold: bool,
    /// Sandy would be negative before the house, so the sale was forced.
    pub house_sale_forced: bool,
    /// End balance after the house decision is non-negative.
    pub sandy_solvent: bool,
    /// Months in the projection window.
    pub projection_horizon: u32,

    // Sandy cash flow
    pub sandy_inflow_project: Decimal,
    pub sandy_project_cost: Decimal,
    pub sandy_oak_bill: Decimal,
    pub sandy_rent_debt: Decimal,
    pub sandy_loan_repayment_now: Decimal,
    pub sandy_net_before_house: Decimal,
    pub sandy_house_gross: Decimal,
    pub sandy_house_mortgage: Decimal,
    pub sandy_house_proceeds: Decimal,
    pub sandy_start_balance: Decimal,
    pub sandy_end_balance: Decimal,
    /// Gap left after the house sale. Reported only; nothing downstream uses it.
    pub sandy_shortfall_if_any: Decimal,
    pub sandy_rent_12m: Decimal,
    pub sandy_interest_12m: Decimal,
    pub sandy_loan_principal_12m: Decimal,

    // Viking cash flow and benefit
    pub viking_extra_cash_out_vs_base: Decimal,
    pub viking_loan_loss_avoided: Decimal,
    pub viking_revenue_uplift_vs_base: Decimal,
    pub viking_delta_score: Decimal,
    pub viking_sales_revenue: Decimal,
    pub viking_payment_to_sandy: Decimal,
    pub viking_other_costs_total: Decimal,
    /// Revenue less payment to Sandy less other costs, before any receipts.
    pub viking_net_cash: Decimal,
    pub viking_start_balance: Decimal,
    pub viking_end_balance: Decimal,
    pub viking_rent_receipts_12m: Decimal,
    pub viking_repaid_rent_debt: Decimal,
    pub viking_loan_principal_repaid_now: Decimal,
    pub viking_interest_12m: Decimal,
    pub viking_total_benefit: Decimal,

    // Sandy balance sheet (period end)
    pub sandy_bs_cash: Decimal,
    pub sandy_bs_house_book: Decimal,
    pub sandy_bs_loan_payable: Decimal,
    pub sandy_bs_interest_payable: Decimal,
    pub sandy_bs_rent_payable: Decimal,
    pub sandy_bs_equity: Decimal,

    // Viking balance sheet (period end)
    pub viking_bs_cash: Decimal,
    pub viking_bs_loan_receivable: Decimal,
    pub viking_bs_rent_receivable: Decimal,
    pub viking_bs_liabilities: Decimal,
    pub viking_bs_equity: Decimal,
}

impl ScenarioResults {
    /// Sandy's equity equals cash + house - loan - interest - rent payable.
    pub fn sandy_equity_identity_holds(&self) -> bool {
        self.sandy_bs_cash + self.sandy_bs_house_book
            - self.sandy_bs_loan_payable
            - self.sandy_bs_interest_payable
            - self.sandy_bs_rent_payable
            == self.sandy_bs_equity
    }

    /// Viking's equity equals its assets less its liabilities.
    pub fn viking_equity_identity_holds(&self) -> bool {
        self.viking_bs_cash + self.viking_bs_loan_receivable + self.viking_bs_rent_receivable
            - self.viking_bs_liabilities
            == self.viking_bs_equity
    }

    /// Combined period-end equity of both parties.
    pub fn total_equity(&self) -> Decimal {
        self.sandy_bs_equity + self.viking_bs_equity
    }
}

/// `pct` percent of `amount`, with `pct` expressed in [0, 100].
fn percent_of(amount: Decimal, pct: Decimal) -> Decimal {
    amount * pct * Decimal::new(1, 2)
}

fn when(cond: bool, value: Decimal) -> Decimal {
    if cond {
        value
    } else {
        Decimal::ZERO
    }
}

/// Evaluate one scenario.
///
/// Assumes `inputs` passed [`case_core::validate_inputs`]; never fails and
/// never divides.
///
/// Example:
/// let r = evaluate(&ScenarioInputs::default());
/// assert!(r.sandy_solvent && !r.house_sold);
pub fn evaluate(i: &ScenarioInputs) -> ScenarioResults {
    let months = Decimal::from(PROJECTION_MONTHS);

    // Sandy before the house
    let loan_due_now = when(i.loan_recalled, i.loan_callable_amount);
    let immediate_obligations = i.oak_bill + i.past_due_rent + loan_due_now;
    let sandy_inflow = i.units * i.payment_per_unit;
    let net_before_house = i.cash_on_hand + sandy_inflow - immediate_obligations;

    // An insolvent Sandy cannot keep the house.
    let house_sale_forced = net_before_house < Decimal::ZERO;
    let house_sale_occurs = i.sell_house_now || house_sale_forced;
    let house_net = (i.house_market_value - i.house_mortgage).max(Decimal::ZERO);
    let house_inflow = when(house_sale_occurs, house_net);
    let house_sold = house_inflow > Decimal::ZERO;

    let end_balance = net_before_house + house_inflow;
    let avoids_insolvency = end_balance >= Decimal::ZERO;
    let shortfall = (-end_balance).max(Decimal::ZERO);

    // Projection: loan terms only run on while the loan stays out and Sandy survives.
    let loan_accrues = !i.loan_recalled && avoids_insolvency;
    let rent_continues = i.rent_relationship.stays() && avoids_insolvency;
    let interest_12m = when(
        loan_accrues,
        percent_of(i.loan_callable_amount, i.loan_interest_rate_percent),
    );
    let loan_outstanding = when(loan_accrues, i.loan_callable_amount);
    let rent_12m = i.rent_per_month * months;
    let sandy_rent_accrued = when(avoids_insolvency, rent_12m);

    // Viking
    let viking_sales_revenue = i.units * i.viking_sale_price;
    let viking_payment_to_sandy = sandy_inflow;
    let viking_other_costs_total = i.units * i.viking_other_costs_per_unit;
    let viking_net_cash = viking_sales_revenue - viking_payment_to_sandy - viking_other_costs_total;
    let viking_extra_cash_out = i.units * (i.payment_per_unit - i.contract_base_per_unit);
    let viking_rent_receipts = when(rent_continues, rent_12m);
    let viking_repaid_rent_debt = when(avoids_insolvency, i.past_due_rent);
    let viking_principal_now = if avoids_insolvency {
        loan_due_now
    } else {
        percent_of(i.loan_callable_amount, i.loan_recovery_rate_percent)
    };
    let viking_end_balance = viking_net_cash
        + viking_rent_receipts
        + viking_repaid_rent_debt
        + interest_12m
        + viking_principal_now;

    // Balance sheets
    let sandy_bs_house = if house_sold {
        Decimal::ZERO
    } else {
        i.house_book_value
    };
    let sandy_bs_equity =
        end_balance + sandy_bs_house - loan_outstanding - interest_12m - sandy_rent_accrued;
    let viking_bs_equity = viking_end_balance + loan_outstanding + viking_rent_receipts;

    debug!(
        forced = house_sale_forced,
        solvent = avoids_insolvency,
        %end_balance,
        %viking_end_balance,
        "scenario evaluated"
    );

    ScenarioResults {
        payment_per_unit: i.payment_per_unit,
        rent_per_month: i.rent_per_month,
        loan_recalled: i.loan_recalled,
        sell_house_now: i.sell_house_now,
        house_book_value: i.house_book_value,

        house_sale_occurs,
        house_sold,
        house_sale_forced,
        sandy_solvent: avoids_insolvency,
        projection_horizon: PROJECTION_MONTHS,

        sandy_inflow_project: sandy_inflow,
        sandy_project_cost: i.units * SANDY_UNIT_COST,
        sandy_oak_bill: i.oak_bill,
        sandy_rent_debt: i.past_due_rent,
        sandy_loan_repayment_now: loan_due_now,
        sandy_net_before_house: net_before_house,
        sandy_house_gross: when(house_sale_occurs, i.house_market_value),
        sandy_house_mortgage: when(house_sale_occurs, i.house_mortgage),
        sandy_house_proceeds: house_inflow,
        sandy_start_balance: i.cash_on_hand,
        sandy_end_balance: end_balance,
        sandy_shortfall_if_any: shortfall,
        sandy_rent_12m: sandy_rent_accrued,
        sandy_interest_12m: interest_12m,
        sandy_loan_principal_12m: loan_outstanding,

        viking_extra_cash_out_vs_base: viking_extra_cash_out,
        viking_loan_loss_avoided: when(avoids_insolvency, i.loan_callable_amount),
        viking_revenue_uplift_vs_base: Decimal::ZERO,
        viking_delta_score: -viking_extra_cash_out - viking_other_costs_total,
        viking_sales_revenue,
        viking_payment_to_sandy,
        viking_other_costs_total,
        viking_net_cash,
        viking_start_balance: Decimal::ZERO,
        viking_end_balance,
        viking_rent_receipts_12m: viking_rent_receipts,
        viking_repaid_rent_debt,
        viking_loan_principal_repaid_now: viking_principal_now,
        viking_interest_12m: interest_12m,
        viking_total_benefit: viking_end_balance,

        sandy_bs_cash: end_balance,
        sandy_bs_house_book: sandy_bs_house,
        sandy_bs_loan_payable: loan_outstanding,
        sandy_bs_interest_payable: interest_12m,
        sandy_bs_rent_payable: sandy_rent_accrued,
        sandy_bs_equity,

        viking_bs_cash: viking_end_balance,
        viking_bs_loan_receivable: loan_outstanding,
        viking_bs_rent_receivable: viking_rent_receipts,
        viking_bs_liabilities: Decimal::ZERO,
        viking_bs_equity,
    }
}

/// Merge `overrides` onto the config defaults, validate, and evaluate.
pub fn evaluate_scenario(
    config: &CaseConfig,
    overrides: &ScenarioOverrides,
) -> Result<ScenarioResults, ValidationError> {
    let inputs = config.inputs_for(overrides)?;
    Ok(evaluate(&inputs))
}

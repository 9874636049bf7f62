//! Terminal presentation of evaluation results.
//!
//! The evaluator exposes every figure; this module decides what is shown,
//! which rows are outflows (rendered negative), and how currency looks.

use case_core::group_thousands;
use case_econ::ScenarioResults;
use case_scenarios::EquityComparison;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

/// Whole-unit currency; negatives in parentheses.
///
/// Example:
/// assert_eq!(format_currency(Decimal::new(-1234567, 0)), "(1,234,567)");
pub fn format_currency(value: Decimal) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let text = group_thousands(rounded);
    if value < Decimal::ZERO {
        format!("({text})")
    } else {
        text
    }
}

/// Headline state of Sandy's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SandyStatus {
    Solvent,
    Insolvent,
    SoldHouse,
}

impl SandyStatus {
    pub fn of(r: &ScenarioResults) -> Self {
        if r.house_sold && r.sandy_solvent {
            SandyStatus::SoldHouse
        } else if r.sandy_solvent {
            SandyStatus::Solvent
        } else {
            SandyStatus::Insolvent
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SandyStatus::Solvent => "solvent",
            SandyStatus::Insolvent => "insolvent",
            SandyStatus::SoldHouse => "sold-house",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Visibility {
    /// Hidden when zero.
    NonZero,
    Always,
    /// Only when the house was actually sold for cash.
    HouseSold,
}

#[derive(Clone, Copy, Debug)]
struct Line {
    label: &'static str,
    value: Decimal,
    outflow: bool,
    visibility: Visibility,
}

impl Line {
    fn amount(label: &'static str, value: Decimal) -> Self {
        Self {
            label,
            value,
            outflow: false,
            visibility: Visibility::NonZero,
        }
    }

    fn outflow(label: &'static str, value: Decimal) -> Self {
        Self {
            outflow: true,
            ..Self::amount(label, value)
        }
    }

    fn always(mut self) -> Self {
        self.visibility = Visibility::Always;
        self
    }

    fn house(mut self) -> Self {
        self.visibility = Visibility::HouseSold;
        self
    }

    fn visible(&self, r: &ScenarioResults) -> bool {
        match self.visibility {
            Visibility::Always => true,
            Visibility::NonZero => !self.value.is_zero(),
            Visibility::HouseSold => r.house_sold && self.value > Decimal::ZERO,
        }
    }

    fn display_value(&self) -> Decimal {
        if self.outflow {
            -self.value
        } else {
            self.value
        }
    }
}

fn sandy_cash_flow(r: &ScenarioResults) -> Vec<Line> {
    vec![
        Line::amount("Start balance", r.sandy_start_balance).always(),
        Line::amount("Project inflow", r.sandy_inflow_project),
        Line::outflow("Oak bill", r.sandy_oak_bill),
        Line::outflow("Past-due rent", r.sandy_rent_debt),
        Line::outflow("Loan repayment (recalled)", r.sandy_loan_repayment_now),
        Line::amount("House sale proceeds (gross)", r.sandy_house_gross).house(),
        Line::amount("Mortgage payoff", r.sandy_house_mortgage),
        Line::amount("House sale proceeds (net)", r.sandy_house_proceeds).house(),
        Line::amount("End balance", r.sandy_end_balance).always(),
        Line::amount("Shortfall", r.sandy_shortfall_if_any),
        Line::outflow("Rent, next 12 months", r.sandy_rent_12m),
        Line::outflow("Interest, next 12 months", r.sandy_interest_12m),
        Line::outflow("Loan principal due", r.sandy_loan_principal_12m),
    ]
}

fn sandy_balance_sheet(r: &ScenarioResults) -> Vec<Line> {
    vec![
        Line::amount("Cash", r.sandy_bs_cash).always(),
        Line::amount("House (book value)", r.sandy_bs_house_book),
        Line::outflow("Loan payable", r.sandy_bs_loan_payable),
        Line::outflow("Interest payable", r.sandy_bs_interest_payable),
        Line::outflow("Rent payable", r.sandy_bs_rent_payable),
        Line::amount("Equity", r.sandy_bs_equity),
    ]
}

fn viking_cash_flow(r: &ScenarioResults) -> Vec<Line> {
    vec![
        Line::amount("Start balance", r.viking_start_balance).always(),
        Line::amount("Sales revenue", r.viking_sales_revenue),
        Line::outflow("Payment to Sandy", r.viking_payment_to_sandy),
        Line::outflow("Other costs", r.viking_other_costs_total),
        Line::amount("Rent receipts, next 12 months", r.viking_rent_receipts_12m),
        Line::amount("Past-due rent repaid", r.viking_repaid_rent_debt),
        Line::amount("Interest, next 12 months", r.viking_interest_12m),
        Line::amount("Loan principal received", r.viking_loan_principal_repaid_now),
        Line::amount("End balance", r.viking_end_balance).always(),
        Line::amount("Total benefit", r.viking_total_benefit),
    ]
}

fn viking_balance_sheet(r: &ScenarioResults) -> Vec<Line> {
    vec![
        Line::amount("Cash", r.viking_bs_cash).always(),
        Line::amount("Loan receivable", r.viking_bs_loan_receivable).always(),
        Line::amount("Rent receivable", r.viking_bs_rent_receivable).always(),
        Line::amount("Liabilities", r.viking_bs_liabilities).always(),
        Line::amount("Equity", r.viking_bs_equity).always(),
    ]
}

const LABEL_WIDTH: usize = 32;
const VALUE_WIDTH: usize = 16;

fn write_section(out: &mut String, title: &str, lines: &[Line], r: &ScenarioResults) {
    let _ = writeln!(out, "{title}");
    for line in lines.iter().filter(|l| l.visible(r)) {
        let _ = writeln!(
            out,
            "  {:<LABEL_WIDTH$}{:>VALUE_WIDTH$}",
            line.label,
            format_currency(line.display_value())
        );
    }
    let _ = writeln!(out);
}

/// Full report for one scenario: both parties' cash flow and balance sheet.
pub fn render_results(title: &str, r: &ScenarioResults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {title}");
    let _ = writeln!(
        out,
        "Sandy: {} | projection horizon: {} months",
        SandyStatus::of(r).as_str(),
        r.projection_horizon
    );
    if r.house_sale_forced {
        let _ = writeln!(out, "Note: house sale forced by insolvency (sell-house lever overridden)");
    }
    let _ = writeln!(out);
    write_section(&mut out, "Sandy cash flow", &sandy_cash_flow(r), r);
    write_section(&mut out, "Sandy balance sheet (period end)", &sandy_balance_sheet(r), r);
    write_section(&mut out, "Viking cash flow", &viking_cash_flow(r), r);
    write_section(&mut out, "Viking balance sheet (period end)", &viking_balance_sheet(r), r);
    out
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "Yes"
    } else {
        "No"
    }
}

fn marked(value: Decimal, best: bool) -> String {
    let text = format_currency(value);
    if best {
        format!("*{text}")
    } else {
        text
    }
}

/// Side-by-side equity table; `*` marks the best value in each equity column.
pub fn render_equity_table(cmp: &EquityComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Equity test (period end)");
    let _ = writeln!(
        out,
        "{:<44}{:>8}{:>12}{:>14}{:>14}{:>14}{:>14}{:>14}",
        "Scenario",
        "Solvent",
        "House sold",
        "Sandy End",
        "Sandy Equity",
        "Viking End",
        "Viking Equity",
        "Total Equity"
    );
    for row in &cmp.rows {
        let _ = writeln!(
            out,
            "{:<44}{:>8}{:>12}{:>14}{:>14}{:>14}{:>14}{:>14}",
            row.display_label(),
            yes_no(row.solvent),
            yes_no(row.house_sold),
            format_currency(row.end_balance),
            marked(row.equity, cmp.is_best_sandy(row)),
            format_currency(row.viking_end_balance),
            marked(row.viking_equity, cmp.is_best_viking(row)),
            marked(row.total_equity, cmp.is_best_total(row)),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_core::{CaseConfig, ScenarioInputs};
    use case_scenarios::{compare_scenarios, ScenarioSet};

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(Decimal::new(1_234_567, 0)), "1,234,567");
        assert_eq!(format_currency(Decimal::new(-1_234_567, 0)), "(1,234,567)");
        assert_eq!(format_currency(Decimal::new(12_345, 1)), "1,235");
        assert_eq!(format_currency(Decimal::new(-5, 1)), "(1)");
        assert_eq!(format_currency(Decimal::ZERO), "0");
    }

    #[test]
    fn outflows_render_negative_and_zero_rows_hide() {
        let r = case_econ::evaluate(&ScenarioInputs::default());
        let text = render_results("baseline", &r);
        assert!(text.contains("Sandy: solvent"));
        assert!(text.contains("(700,000)"));
        // loan not recalled, no house sale
        assert!(!text.contains("Loan repayment (recalled)"));
        assert!(!text.contains("House sale proceeds"));
        assert!(!text.contains("Note: house sale forced"));
        // always shown even at zero
        assert!(text.contains("Start balance"));
        assert!(text.contains("Liabilities"));
    }

    #[test]
    fn forced_sale_is_reported() {
        let i = ScenarioInputs {
            loan_recalled: true,
            ..ScenarioInputs::default()
        };
        let r = case_econ::evaluate(&i);
        assert_eq!(SandyStatus::of(&r), SandyStatus::SoldHouse);
        let text = render_results("recall", &r);
        assert!(text.contains("Note: house sale forced"));
        assert!(text.contains("House sale proceeds (gross)"));
        assert!(text.contains("425,000"));
        assert!(!text.contains("House (book value)"));
    }

    #[test]
    fn insolvent_status() {
        let i = ScenarioInputs {
            loan_recalled: true,
            house_market_value: Decimal::new(300_000, 0),
            ..ScenarioInputs::default()
        };
        let r = case_econ::evaluate(&i);
        assert_eq!(SandyStatus::of(&r), SandyStatus::Insolvent);
        // underwater sale yields no cash, so the proceeds rows stay hidden
        assert!(!render_results("x", &r).contains("House sale proceeds"));
    }

    #[test]
    fn balance_sheet_rows_follow_results() {
        let mut r = case_econ::evaluate(&ScenarioInputs::default());
        let rows = sandy_balance_sheet(&r);
        assert_eq!(rows[0].value, r.sandy_bs_cash);
        assert_eq!(rows[1].value, Decimal::new(1_100_000, 0));

        r.sandy_bs_house_book = Decimal::new(42, 0);
        let rows = sandy_balance_sheet(&r);
        assert_eq!(rows[1].value, Decimal::new(42, 0));

        let sold = case_econ::evaluate(&ScenarioInputs {
            sell_house_now: true,
            ..ScenarioInputs::default()
        });
        assert_eq!(sandy_balance_sheet(&sold)[1].value, Decimal::ZERO);
    }

    #[test]
    fn equity_table_marks_best() {
        let set = ScenarioSet::from_json_str(
            r#"[{"id":"a","label":"Base"},{"id":"b","label":"","values":{"payment_per_unit":8000}}]"#,
        )
        .unwrap();
        let cmp = compare_scenarios(&CaseConfig::default(), &set).unwrap();
        let text = render_equity_table(&cmp);
        assert!(text.contains("Base"));
        // blank label falls back to the id
        assert!(text.lines().any(|l| l.starts_with("b ")));
        assert!(text.contains('*'));
    }
}

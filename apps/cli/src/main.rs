#![deny(warnings)]

//! Headless CLI: evaluate the negotiation case under a scenario and levers.

mod report;

use anyhow::{anyhow, bail, Context, Result};
use case_core::{CaseConfig, ExportedScenario, ScenarioOverrides};
use case_scenarios::{compare_scenarios, export_json, load_config, ScenarioSet};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SCENARIOS: &str = "data/scenarios.json";

const USAGE: &str = "usage: case [--config FILE] [--scenarios FILE] [--scenario ID]
            [--payment-per-unit N] [--rent-per-month N] [--interest-rate PCT]
            [--viking-sale-price N] [--viking-other-costs N]
            [--loan-recalled | --no-loan-recalled] [--sell-house | --no-sell-house]
            [--rent-relationship stays|leaves]
            [--equity-test] [--export] [--json] [--version]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    scenarios: Option<PathBuf>,
    scenario: Option<String>,
    levers: ScenarioOverrides,
    equity_test: bool,
    export: bool,
    json: bool,
    version: bool,
}

fn value_arg(flag: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| anyhow!("{flag} needs a value"))
}

fn decimal_arg(flag: &str, value: Option<String>) -> Result<Decimal> {
    let value = value_arg(flag, value)?;
    value
        .parse::<Decimal>()
        .with_context(|| format!("{flag}: not a number: {value}"))
}

fn parse_args<I: Iterator<Item = String>>(mut it: I) -> Result<Args> {
    let mut args = Args::default();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(value_arg(&arg, it.next())?.into()),
            "--scenarios" => args.scenarios = Some(value_arg(&arg, it.next())?.into()),
            "--scenario" => args.scenario = Some(value_arg(&arg, it.next())?),
            "--payment-per-unit" => {
                args.levers.payment_per_unit = Some(decimal_arg(&arg, it.next())?)
            }
            "--rent-per-month" => args.levers.rent_per_month = Some(decimal_arg(&arg, it.next())?),
            "--interest-rate" => {
                args.levers.loan_interest_rate_percent = Some(decimal_arg(&arg, it.next())?)
            }
            "--viking-sale-price" => {
                args.levers.viking_sale_price = Some(decimal_arg(&arg, it.next())?)
            }
            "--viking-other-costs" => {
                args.levers.viking_other_costs_per_unit = Some(decimal_arg(&arg, it.next())?)
            }
            "--loan-recalled" => args.levers.loan_recalled = Some(true),
            "--no-loan-recalled" => args.levers.loan_recalled = Some(false),
            "--sell-house" => args.levers.sell_house_now = Some(true),
            "--no-sell-house" => args.levers.sell_house_now = Some(false),
            "--rent-relationship" => {
                args.levers.rent_relationship = Some(value_arg(&arg, it.next())?.parse()?);
            }
            "--equity-test" => args.equity_test = true,
            "--export" => args.export = true,
            "--json" => args.json = true,
            "--version" => args.version = true,
            "-h" | "--help" => bail!("{USAGE}"),
            other => bail!("unknown argument: {other}\n{USAGE}"),
        }
    }
    Ok(args)
}

/// Scenario overrides selected by `--scenario`, with lever flags on top.
///
/// An unknown id or an unreadable scenario file is a notice, not an error:
/// the levers are still evaluated against the defaults.
fn selected_overrides(args: &Args, set: &ScenarioSet) -> (Option<String>, ScenarioOverrides) {
    let Some(id) = args.scenario.as_deref() else {
        return (None, args.levers.clone());
    };
    match set.get(id) {
        Ok(s) => (Some(s.id.clone()), s.values.layered(&args.levers)),
        Err(err) => {
            warn!(%err, "falling back to defaults");
            (None, args.levers.clone())
        }
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!(
            "case {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(
        git_sha = env!("GIT_SHA"),
        config = ?args.config,
        scenario = ?args.scenario,
        "starting CLI"
    );

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CaseConfig::default(),
    };

    let needs_scenarios = args.scenario.is_some() || args.equity_test;
    let set = if needs_scenarios {
        let path = args
            .scenarios
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENARIOS));
        ScenarioSet::load_or_empty(path)
    } else {
        ScenarioSet::default()
    };

    if args.equity_test {
        if set.is_empty() {
            warn!("no scenarios to compare");
        } else {
            let cmp = compare_scenarios(&config, &set)?;
            print!("{}", report::render_equity_table(&cmp));
        }
        return Ok(());
    }

    let (scenario_id, overrides) = selected_overrides(&args, &set);
    let inputs = config.inputs_for(&overrides)?;

    if args.export {
        let mut exported = ExportedScenario::from_inputs(&inputs);
        if let Some(id) = scenario_id {
            exported = exported.with_id(id);
        }
        println!("{}", export_json(&exported)?);
        return Ok(());
    }

    let results = case_econ::evaluate(&inputs);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        let title = case_core::lever_label(&inputs);
        print!("{}", report::render_results(&title, &results));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_core::RentRelationship;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_levers() {
        let a = args(&[
            "--payment-per-unit",
            "7500",
            "--loan-recalled",
            "--rent-relationship",
            "leaves",
            "--interest-rate",
            "8.5",
        ])
        .unwrap();
        assert_eq!(a.levers.payment_per_unit, Some(Decimal::new(7_500, 0)));
        assert_eq!(a.levers.loan_recalled, Some(true));
        assert_eq!(a.levers.rent_relationship, Some(RentRelationship::Leaves));
        assert_eq!(a.levers.loan_interest_rate_percent, Some(Decimal::new(85, 1)));
        assert_eq!(a.levers.sell_house_now, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(args(&["--payment-per-unit", "lots"]).is_err());
        assert!(args(&["--payment-per-unit"]).is_err());
        assert!(args(&["--rent-relationship", "maybe"]).is_err());
        assert!(args(&["--frobnicate"]).is_err());
        assert!(args(&["--viking-sale-price"]).is_err());
    }

    #[test]
    fn path_and_id_flags_need_values() {
        for flag in ["--config", "--scenarios", "--scenario"] {
            let err = args(&[flag]).unwrap_err();
            assert_eq!(err.to_string(), format!("{flag} needs a value"));
        }
        let a = args(&["--config", "case.yaml", "--scenario", "baseline"]).unwrap();
        assert_eq!(a.config, Some(PathBuf::from("case.yaml")));
        assert_eq!(a.scenario.as_deref(), Some("baseline"));
    }

    #[test]
    fn negated_flags_clear_scenario_levers() {
        let set = ScenarioSet::from_json_str(
            r#"[{"id":"recall","label":"Recall","values":{"loan_recalled":true,"sell_house_now":true}}]"#,
        )
        .unwrap();
        let a = args(&[
            "--scenario",
            "recall",
            "--no-loan-recalled",
            "--no-sell-house",
            "--viking-sale-price",
            "11000",
            "--viking-other-costs",
            "250",
        ])
        .unwrap();
        let (_, o) = selected_overrides(&a, &set);
        assert_eq!(o.loan_recalled, Some(false));
        assert_eq!(o.sell_house_now, Some(false));
        assert_eq!(o.viking_sale_price, Some(Decimal::new(11_000, 0)));
        assert_eq!(o.viking_other_costs_per_unit, Some(Decimal::new(250, 0)));
    }

    #[test]
    fn levers_layer_over_selected_scenario() {
        let set = ScenarioSet::from_json_str(
            r#"[{"id":"recall","label":"Recall","values":{"loan_recalled":true,"payment_per_unit":6500}}]"#,
        )
        .unwrap();
        let a = args(&["--scenario", "recall", "--payment-per-unit", "9000"]).unwrap();
        let (id, o) = selected_overrides(&a, &set);
        assert_eq!(id.as_deref(), Some("recall"));
        assert_eq!(o.loan_recalled, Some(true));
        assert_eq!(o.payment_per_unit, Some(Decimal::new(9_000, 0)));

        let missing = args(&["--scenario", "nope", "--sell-house"]).unwrap();
        let (id, o) = selected_overrides(&missing, &set);
        assert_eq!(id, None);
        assert_eq!(o.sell_house_now, Some(true));
        assert_eq!(o.loan_recalled, None);
    }
}

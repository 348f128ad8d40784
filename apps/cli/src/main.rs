#![deny(warnings)]

//! Headless CLI: compute ROI results and the scenario forecast for a set of inputs.

use anyhow::{bail, Context, Result};
use roi_core::{load_config, CalculatorConfig, CurvePolicy, FunnelInputs, Period, ValueMode};
use roi_econ::sync::{apply_edit, FunnelEdit};
use roi_forecast::ForecastEngine;
use roi_report::{clipboard_text, ResultsReport};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: roi-cli [--config FILE] [--share QUERY] [--sessions N] [--cr PCT] \
[--sales N] [--revenue N] [--lift PCT] [--margin PCT] [--cac N] [--investment N] \
[--yearly] [--curve discrete|linear] [--mode profit|revenue] [--json] [--copy] [--link BASE_URL] [--version]";

/// Direct (non-synced) field overrides.
#[derive(Debug, Default, PartialEq)]
struct Overrides {
    lift: Option<Decimal>,
    margin: Option<Decimal>,
    cac: Option<Decimal>,
    investment: Option<Decimal>,
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<String>,
    share: Option<String>,
    /// Funnel edits in the order given; each one goes through the sync rules.
    edits: Vec<FunnelEdit>,
    overrides: Overrides,
    yearly: bool,
    curve: Option<CurvePolicy>,
    mode: Option<ValueMode>,
    json: bool,
    copy: bool,
    link: Option<String>,
    version: bool,
}

fn value(it: &mut impl Iterator<Item = String>, name: &str) -> Result<String> {
    it.next().with_context(|| format!("{name} needs a value"))
}

fn number(it: &mut impl Iterator<Item = String>, name: &str) -> Result<Decimal> {
    let raw = value(it, name)?;
    Decimal::from_str(&raw).with_context(|| format!("{name}: `{raw}` is not a number"))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => out.config = Some(value(&mut it, "--config")?),
            "--share" => out.share = Some(value(&mut it, "--share")?),
            "--sessions" => out.edits.push(FunnelEdit::Sessions(number(&mut it, "--sessions")?)),
            "--cr" => out.edits.push(FunnelEdit::ConversionRate(number(&mut it, "--cr")?)),
            "--sales" => out.edits.push(FunnelEdit::Sales(number(&mut it, "--sales")?)),
            "--revenue" => out.edits.push(FunnelEdit::Revenue(number(&mut it, "--revenue")?)),
            "--lift" => out.overrides.lift = Some(number(&mut it, "--lift")?),
            "--margin" => out.overrides.margin = Some(number(&mut it, "--margin")?),
            "--cac" => out.overrides.cac = Some(number(&mut it, "--cac")?),
            "--investment" => out.overrides.investment = Some(number(&mut it, "--investment")?),
            "--yearly" => out.yearly = true,
            "--curve" => {
                out.curve = Some(match value(&mut it, "--curve")?.as_str() {
                    "discrete" => CurvePolicy::Discrete,
                    "linear" => CurvePolicy::Linear,
                    other => bail!("unknown curve `{other}`"),
                })
            }
            "--mode" => {
                out.mode = Some(match value(&mut it, "--mode")?.as_str() {
                    "profit" => ValueMode::Profit,
                    "revenue" => ValueMode::Revenue,
                    other => bail!("unknown value mode `{other}`"),
                })
            }
            "--json" => out.json = true,
            "--copy" => out.copy = true,
            "--link" => out.link = Some(value(&mut it, "--link")?),
            "--version" => out.version = true,
            "-h" | "--help" => bail!("{USAGE}"),
            other => bail!("unknown argument `{other}`\n{USAGE}"),
        }
    }
    Ok(out)
}

/// Config defaults, then the share link, then edits and overrides from flags.
fn resolve(args: &Args, mut cfg: CalculatorConfig) -> Result<CalculatorConfig> {
    if let Some(query) = &args.share {
        cfg.inputs = roi_share::from_query(query, &cfg.inputs).context("loading share link")?;
    }
    let mut inputs: FunnelInputs = args
        .edits
        .iter()
        .fold(cfg.inputs.clone(), |f, e| apply_edit(&f, *e));
    let o = &args.overrides;
    inputs.lift_percent = o.lift.unwrap_or(inputs.lift_percent);
    inputs.margin_percent = o.margin.unwrap_or(inputs.margin_percent);
    inputs.cac = o.cac.unwrap_or(inputs.cac);
    inputs.investment = o.investment.unwrap_or(inputs.investment);
    roi_core::validate_funnel(&inputs)?;
    cfg.inputs = inputs;
    if args.yearly {
        cfg.period = Period::Yearly;
    }
    cfg.curve = args.curve.unwrap_or(cfg.curve);
    cfg.value_mode = args.mode.unwrap_or(cfg.value_mode);
    Ok(cfg)
}

/// `RUST_LOG` directives, or `info` when unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    // Logging setup
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!(
            "roi-cli {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(config = ?args.config, share = args.share.is_some(), edits = args.edits.len(), "starting CLI");

    let cfg = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("reading config {path}"))?,
        None => CalculatorConfig::default(),
    };
    let cfg = resolve(&args, cfg)?;
    let engine = ForecastEngine::from_config(&cfg)?;
    let report = ResultsReport::build(
        &cfg.inputs,
        cfg.period,
        &engine,
        &cfg.scenarios,
        cfg.horizon_months,
        cfg.value_mode,
        chrono::Local::now().date_naive(),
    )?;
    info!(
        curve = engine.curve().name(),
        scenarios = report.forecasts.len(),
        "report ready"
    );

    if args.json {
        println!("{}", report.to_json()?);
    } else if args.copy {
        println!("{}", clipboard_text(&report.summary));
    } else {
        print!("{}", report.render_text());
    }
    if let Some(base) = &args.link {
        println!("{}", roi_share::share_url(base, &cfg.inputs));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_flags_in_order() {
        let a = args(&["--sessions", "400000", "--cr", "2.5", "--investment", "5000", "--curve", "linear", "--yearly"]).unwrap();
        assert_eq!(
            a.edits,
            vec![
                FunnelEdit::Sessions(Decimal::from(400_000)),
                FunnelEdit::ConversionRate(Decimal::new(25, 1)),
            ]
        );
        assert_eq!(a.overrides.investment, Some(Decimal::from(5_000)));
        assert_eq!(a.curve, Some(CurvePolicy::Linear));
        assert!(a.yearly);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(args(&["--lift"]).is_err());
        assert!(args(&["--lift", "much"]).is_err());
        assert!(args(&["--curve", "cubic"]).is_err());
        assert!(args(&["--frobnicate"]).is_err());
    }

    #[test]
    fn flags_override_share_link_and_config() {
        let a = args(&["--share", "investment=1000&margin=30", "--sessions", "400000", "--margin", "50", "--mode", "revenue"]).unwrap();
        let cfg = resolve(&a, CalculatorConfig::default()).unwrap();
        assert_eq!(cfg.inputs.investment, Decimal::from(1_000));
        assert_eq!(cfg.inputs.margin_percent, Decimal::from(50));
        assert_eq!(cfg.inputs.sales, Decimal::from(8_000));
        assert_eq!(cfg.inputs.revenue, Decimal::from(480_000));
        assert_eq!(cfg.value_mode, ValueMode::Revenue);
        assert_eq!(cfg.period, Period::Monthly);
    }

    #[test]
    fn log_level_comes_from_directives() {
        let shown = |d: Option<&str>| log_filter(d).to_string().to_lowercase();
        assert_eq!(shown(None), "info");
        assert_eq!(shown(Some("warn")), "warn");
        assert_eq!(shown(Some("roi_forecast=debug")), "roi_forecast=debug");
    }

    #[test]
    fn negative_override_is_rejected() {
        let a = args(&["--investment", "-1"]).unwrap();
        assert!(resolve(&a, CalculatorConfig::default()).is_err());
    }
}

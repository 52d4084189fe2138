#![deny(warnings)]

//! Headless ROI simulator: projects a matchday from the venue config and
//! optionally asks the hosted model for strategy insights and reports.

use anyhow::{anyhow, bail, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use venue_advisor::{
    request_advisory, Advisory, AdvisoryRequest, AssistantQuery, CallSite, GenerationError,
    HealthStatus, HostedModelClient, IrrigationPlan, MediaBriefing, MediaPeriod, ReadinessAudit,
    TextGenerator, ZoneTelemetry,
};
use venue_core::config::DEFAULT_CONFIG_PATH;
use venue_core::{ProjectionInput, ProjectionResult, Scenario, VenueConfig};
use venue_econ::{project_with, EngineParams};
use venue_runtime::{InsightState, SessionSnapshot, SimulatorSession};

const DEFAULT_MATCH: &str = "Global Derby: Kings vs Titans";

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<String>,
    capacity: Option<i64>,
    scenario: Option<String>,
    insights: bool,
    compare: bool,
    json: bool,
    version: bool,
    audit: bool,
    briefing: Option<String>,
    match_name: Option<String>,
    ask: Option<String>,
    zone: Option<String>,
    irrigation: Option<String>,
    moisture: Vec<Decimal>,
}

impl Args {
    /// Whether any flag needs the hosted model.
    fn wants_model(&self) -> bool {
        self.insights || self.wants_reports()
    }

    fn wants_reports(&self) -> bool {
        self.audit
            || self.briefing.is_some()
            || self.ask.is_some()
            || self.zone.is_some()
            || self.irrigation.is_some()
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Args {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => out.config = it.next(),
            "--capacity" => out.capacity = it.next().and_then(|s| s.parse().ok()),
            "--scenario" => out.scenario = it.next(),
            "--insights" => out.insights = true,
            "--compare" => out.compare = true,
            "--json" => out.json = true,
            "--version" => out.version = true,
            "--audit" => out.audit = true,
            "--briefing" => out.briefing = it.next(),
            "--match" => out.match_name = it.next(),
            "--ask" => out.ask = it.next(),
            "--zone" => out.zone = it.next(),
            "--irrigation" => out.irrigation = it.next(),
            "--moisture" => {
                out.moisture = it
                    .next()
                    .map(|s| {
                        s.split(',')
                            .filter_map(|v| v.trim().parse().ok())
                            .collect()
                    })
                    .unwrap_or_default()
            }
            _ => {}
        }
    }
    out
}

/// `RUST_LOG`-style directive, or `info` when unset, blank or unparsable.
fn log_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn version_line() -> String {
    format!("stadium-roi {}", env!("CARGO_PKG_VERSION"))
}

fn load_config(path: Option<&str>) -> Result<VenueConfig> {
    match path {
        Some(p) => Ok(VenueConfig::load(p)?),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Ok(VenueConfig::load(DEFAULT_CONFIG_PATH)?)
        }
        None => {
            info!("no config file found, using built-in defaults");
            Ok(VenueConfig::default())
        }
    }
}

/// "$2.40M"-style display of a currency amount, rounded half away from zero.
fn millions(v: Decimal) -> String {
    let m = (v / Decimal::from(1_000_000))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${:.2}M", m)
}

fn percent(ratio: Decimal) -> String {
    let p = (ratio * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.0}%", p)
}

fn print_projection(capacity: i64, scenario: Scenario, r: &ProjectionResult) {
    println!(
        "Projection | scenario: {} | capacity: {} | attendance: {}",
        scenario, capacity, r.effective_attendance
    );
    for t in &r.per_tier {
        println!(
            "  {:<16} attendees: {:>7} | revenue: ${}",
            t.name, t.attendees, t.revenue
        );
    }
    println!(
        "KPI | gross revenue: {} | costs: {} | profit: {} | margin: {}",
        millions(r.total_revenue),
        millions(r.operating_cost),
        millions(r.margin),
        percent(r.margin_ratio)
    );
}

#[derive(Debug, Serialize)]
struct ComparisonRow {
    scenario: Scenario,
    projection: ProjectionResult,
}

fn comparison_rows(cfg: &VenueConfig, capacity: i64) -> Result<Vec<ComparisonRow>> {
    let params = EngineParams::from(cfg);
    Scenario::ALL
        .into_iter()
        .map(|scenario| {
            let input = ProjectionInput::new(capacity, scenario, cfg.tiers.clone());
            Ok(ComparisonRow {
                scenario,
                projection: project_with(&input, &params)?,
            })
        })
        .collect()
}

fn print_comparison(capacity: i64, rows: &[ComparisonRow]) {
    println!("Scenario comparison at {} seats", capacity);
    for row in rows {
        let r = &row.projection;
        println!(
            "  {:<8} attendance: {:>6} | revenue: {} | costs: {} | profit: {} ({})",
            row.scenario.as_str(),
            r.effective_attendance,
            millions(r.total_revenue),
            millions(r.operating_cost),
            millions(r.margin),
            percent(r.margin_ratio)
        );
    }
}

/// Figures the operations dashboard shows next to the simulator.
struct SiteFigures {
    turf_health: Decimal,
    infra_score: Decimal,
    safety_score: Decimal,
    readiness: Decimal,
    compliance: Decimal,
    active_alerts: u32,
    distribution: Vec<(HealthStatus, u32)>,
}

impl Default for SiteFigures {
    fn default() -> Self {
        Self {
            turf_health: Decimal::new(982, 1),
            infra_score: Decimal::new(89, 0),
            safety_score: Decimal::new(94, 0),
            readiness: Decimal::new(94, 0),
            compliance: Decimal::new(942, 1),
            active_alerts: 3,
            distribution: vec![(HealthStatus::Excellent, 260)],
        }
    }
}

/// `id:moisture:density:temperature:status`, e.g. `Z-45:18.2:71:23.5:critical`.
fn parse_zone(spec: &str) -> Result<ZoneTelemetry> {
    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    let [id, moisture, density, temperature, status] = parts.as_slice() else {
        bail!("zone must be id:moisture:density:temperature:status, got {spec:?}");
    };
    if id.is_empty() {
        bail!("zone id must not be blank");
    }
    Ok(ZoneTelemetry {
        id: id.to_string(),
        moisture: moisture.parse::<Decimal>()?,
        density: density.parse::<Decimal>()?,
        temperature: temperature.parse::<Decimal>()?,
        status: status.parse::<HealthStatus>().map_err(|e| anyhow!(e))?,
    })
}

/// Report requests selected on the command line, in a fixed order.
fn report_requests(
    args: &Args,
    site: &SiteFigures,
    projection: &ProjectionResult,
) -> Result<Vec<AdvisoryRequest>> {
    let mut out = Vec::new();
    if let Some(query) = &args.ask {
        let q = AssistantQuery {
            query: query.clone(),
            readiness_score: site.readiness,
            turf_health: site.turf_health,
            active_alerts: site.active_alerts,
            distribution: site.distribution.clone(),
        };
        out.push(q.to_request());
    }
    if args.audit {
        let audit = ReadinessAudit::with_projection(
            site.turf_health,
            site.infra_score,
            site.safety_score,
            projection,
        );
        out.push(audit.to_request());
    }
    if let Some(period) = &args.briefing {
        let period: MediaPeriod = period.parse().map_err(|e: String| anyhow!(e))?;
        let name = args.match_name.as_deref().unwrap_or(DEFAULT_MATCH);
        let brief = MediaBriefing::new(
            period,
            name,
            site.compliance,
            site.turf_health,
            projection,
        );
        out.push(brief.to_request());
    } else if args.match_name.is_some() {
        warn!("--match has no effect without --briefing");
    }
    if let Some(zone) = &args.zone {
        out.push(parse_zone(zone)?.to_request());
    }
    if let Some(forecast) = &args.irrigation {
        out.push(IrrigationPlan::new(args.moisture.clone(), forecast.as_str()).to_request());
    }
    Ok(out)
}

fn title(site: CallSite) -> &'static str {
    match site {
        CallSite::FinancialStrategy => "Fiscal advisory",
        CallSite::ReadinessAudit => "Readiness audit",
        CallSite::MediaBriefing => "Media briefing",
        CallSite::OpsAssistant => "Operations assistant",
        CallSite::ZoneRemediation => "Zone remediation",
        CallSite::Irrigation => "Irrigation plan",
    }
}

#[derive(Debug, PartialEq, Serialize)]
struct Report {
    title: &'static str,
    fallback: bool,
    text: String,
}

impl Report {
    fn new(site: CallSite, advisory: Advisory) -> Self {
        Self {
            title: title(site),
            fallback: advisory.is_fallback(),
            text: advisory.text().to_string(),
        }
    }
}

/// Used when no API key is configured so the fallback path still runs.
struct Unconfigured;

impl TextGenerator for Unconfigured {
    async fn generate(&self, _prompt: &str, _model: Option<&str>) -> Result<String, GenerationError> {
        Err(GenerationError::MissingApiKey)
    }
}

/// Settle the session's insight request (when asked) and run every report
/// request against one generator. Failures come back as fallback text.
async fn run_advisories<G: TextGenerator>(
    generator: &G,
    session: &mut SimulatorSession,
    insights: bool,
    requests: &[AdvisoryRequest],
) -> Result<Vec<Report>> {
    if insights {
        session.synthesize_insights(generator).await?;
    }
    let model = session.config().model.clone();
    let mut reports = Vec::with_capacity(requests.len());
    for request in requests {
        let advisory = request_advisory(generator, request, Some(&model)).await;
        reports.push(Report::new(request.site, advisory));
    }
    Ok(reports)
}

#[derive(Serialize)]
struct JsonOutput {
    #[serde(flatten)]
    snapshot: SessionSnapshot,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reports: Vec<Report>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directive.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1));
    if args.version {
        println!("{}", version_line());
        return Ok(());
    }
    info!(?args, "starting CLI");

    let cfg = load_config(args.config.as_deref())?;
    let mut session = SimulatorSession::new(cfg)?;
    if let Some(c) = args.capacity {
        let applied = session.set_capacity(c);
        if applied != c {
            warn!(requested = c, applied, "capacity clamped to slider range");
        }
    }
    if let Some(s) = &args.scenario {
        session.set_scenario(s.parse()?);
    }

    if args.compare {
        if args.wants_model() {
            warn!("advisory flags are ignored with --compare");
        }
        let rows = comparison_rows(session.config(), session.capacity())?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            print_comparison(session.capacity(), &rows);
        }
        return Ok(());
    }

    let requests = report_requests(&args, &SiteFigures::default(), &session.projection()?)?;
    let reports = if args.wants_model() {
        let model = Some(session.config().model.clone());
        match HostedModelClient::from_env(model) {
            Ok(client) => run_advisories(&client, &mut session, args.insights, &requests).await?,
            Err(e) => {
                warn!(error = %e, "hosted model unavailable");
                run_advisories(&Unconfigured, &mut session, args.insights, &requests).await?
            }
        }
    } else {
        Vec::new()
    };

    if args.json {
        let out = JsonOutput {
            snapshot: session.snapshot()?,
            reports,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let r = session.projection()?;
    print_projection(session.capacity(), session.scenario(), &r);
    match session.insights() {
        InsightState::Completed(text) => println!("\nFiscal advisory:\n{}", text),
        InsightState::Failed(text) => println!("\nFiscal advisory: {}", text),
        InsightState::Idle | InsightState::Pending => {}
    }
    for report in &reports {
        if report.fallback {
            println!("\n{}: {}", report.title, report.text);
        } else {
            println!("\n{}:\n{}", report.title, report.text);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    fn args(s: &str) -> Args {
        parse_args(s.split_whitespace().map(str::to_string))
    }

    fn nominal() -> ProjectionResult {
        SimulatorSession::new(VenueConfig::default())
            .unwrap()
            .projection()
            .unwrap()
    }

    #[test]
    fn parses_flags() {
        let a = args("--capacity 72000 --scenario derby --insights --json");
        assert_eq!(a.capacity, Some(72_000));
        assert_eq!(a.scenario.as_deref(), Some("derby"));
        assert!(a.insights && a.json);
        assert!(!a.compare);
    }

    #[test]
    fn parses_report_flags() {
        let a = args(
            "--audit --briefing monthly --match Cup --zone Z-45:18.2:71:23.5:critical \
             --irrigation dry --moisture 30,31,x,33 --ask cover?",
        );
        assert!(a.audit);
        assert_eq!(a.briefing.as_deref(), Some("monthly"));
        assert_eq!(a.match_name.as_deref(), Some("Cup"));
        assert_eq!(a.ask.as_deref(), Some("cover?"));
        assert_eq!(
            a.moisture,
            vec![Decimal::new(30, 0), Decimal::new(31, 0), Decimal::new(33, 0)]
        );
        assert!(a.wants_model() && a.wants_reports());
        assert!(!args("--json").wants_model());
    }

    #[test]
    fn ignores_unknown_and_bad_values() {
        let a = args("--capacity lots --frobnicate");
        assert_eq!(a, Args::default());
    }

    #[test]
    fn log_filter_honours_directive() {
        assert_eq!(log_filter(Some("error")).max_level_hint(), Some(LevelFilter::ERROR));
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn version_is_package_version() {
        assert_eq!(
            version_line(),
            format!("stadium-roi {}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn display_formatting() {
        assert_eq!(millions(Decimal::new(396_462_625, 2)), "$3.96M");
        assert_eq!(millions(Decimal::new(2_400_000, 0)), "$2.40M");
        assert_eq!(percent(Decimal::new(59, 2)), "59%");
    }

    #[test]
    fn display_rounds_instead_of_truncating() {
        // Derby at 65k seats.
        assert_eq!(millions(Decimal::new(42_176_875, 1)), "$4.22M");
        assert_eq!(millions(Decimal::new(2_125_000, 0)), "$2.13M");
        assert_eq!(millions(Decimal::new(-2_125_000, 0)), "$-2.13M");
        assert_eq!(percent(Decimal::new(5_962, 4)), "60%");
        assert_eq!(percent(Decimal::new(5_949, 4)), "59%");
    }

    #[test]
    fn builtin_defaults_when_no_file() {
        let cfg = load_config(None).unwrap();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn comparison_covers_every_scenario() {
        let rows = comparison_rows(&VenueConfig::default(), 65_000).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.scenario).collect();
        assert_eq!(names, Scenario::ALL.to_vec());
        let v = serde_json::to_value(&rows).unwrap();
        assert_eq!(v[1]["scenario"], "derby");
        assert_eq!(v[1]["projection"]["effective_attendance"], 65_000);
        assert_eq!(v[0]["projection"]["effective_attendance"], 61_100);
    }

    #[test]
    fn no_report_flags_no_requests() {
        let reqs = report_requests(&args("--json"), &SiteFigures::default(), &nominal()).unwrap();
        assert!(reqs.is_empty());
    }

    #[test]
    fn report_requests_follow_flags() {
        let a = args("--ask status --audit --briefing weekly --zone Z1:20:70:22:warning --irrigation dry");
        let reqs = report_requests(&a, &SiteFigures::default(), &nominal()).unwrap();
        let sites: Vec<_> = reqs.iter().map(|r| r.site).collect();
        assert_eq!(
            sites,
            vec![
                CallSite::OpsAssistant,
                CallSite::ReadinessAudit,
                CallSite::MediaBriefing,
                CallSite::ZoneRemediation,
                CallSite::Irrigation,
            ]
        );
        assert!(reqs[2].prompt.contains(&format!("Match: {}", DEFAULT_MATCH)));
        assert!(reqs[2].prompt.contains("Expected Attendance: 61100"));
        assert!(reqs[4].prompt.contains("no sensor readings available"));
    }

    #[test]
    fn bad_report_arguments_are_errors() {
        let site = SiteFigures::default();
        assert!(report_requests(&args("--briefing daily"), &site, &nominal()).is_err());
        assert!(report_requests(&args("--zone Z1:20:70"), &site, &nominal()).is_err());
        assert!(report_requests(&args("--zone Z1:wet:70:22:good"), &site, &nominal()).is_err());
        assert!(report_requests(&args("--zone Z1:20:70:22:soggy"), &site, &nominal()).is_err());
    }

    #[tokio::test]
    async fn unconfigured_generator_yields_fallback() {
        let mut session = SimulatorSession::new(VenueConfig::default()).unwrap();
        session.synthesize_insights(&Unconfigured).await.unwrap();
        assert_eq!(
            session.insights(),
            &InsightState::Failed("Financial strategy unavailable.".into())
        );
    }

    #[tokio::test]
    async fn reports_fall_back_per_site() {
        let mut session = SimulatorSession::new(VenueConfig::default()).unwrap();
        let a = args("--audit --briefing monthly --irrigation dry");
        let reqs = report_requests(&a, &SiteFigures::default(), &nominal()).unwrap();
        let reports = run_advisories(&Unconfigured, &mut session, false, &reqs)
            .await
            .unwrap();
        assert_eq!(
            reports,
            vec![
                Report {
                    title: "Readiness audit",
                    fallback: true,
                    text: "Report generation timed out.".into(),
                },
                Report {
                    title: "Media briefing",
                    fallback: true,
                    text: "Media report generation failed.".into(),
                },
                Report {
                    title: "Irrigation plan",
                    fallback: true,
                    text: "Hydraulic analysis failed.".into(),
                },
            ]
        );
        // Insights were not requested.
        assert_eq!(session.insights(), &InsightState::Idle);
    }

    #[test]
    fn json_output_flattens_snapshot() {
        let session = SimulatorSession::new(VenueConfig::default()).unwrap();
        let out = JsonOutput {
            snapshot: session.snapshot().unwrap(),
            reports: vec![],
        };
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["capacity"], 65_000);
        assert!(v.get("reports").is_none());
    }
}

//! Report prompts that reuse projection figures.

use crate::{AdvisoryRequest, CallSite};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use venue_core::ProjectionResult;

/// Compliance audit inputs. Scores are percentages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadinessAudit {
    pub turf_health: Decimal,
    pub infra_score: Decimal,
    pub safety_score: Decimal,
    /// Profit margin as a percentage of total revenue.
    pub margin_pct: Decimal,
}

impl ReadinessAudit {
    /// Take the financial margin from a projection instead of a fixed figure.
    pub fn with_projection(
        turf_health: Decimal,
        infra_score: Decimal,
        safety_score: Decimal,
        result: &ProjectionResult,
    ) -> Self {
        Self {
            turf_health,
            infra_score,
            safety_score,
            margin_pct: result.margin_ratio * Decimal::ONE_HUNDRED,
        }
    }

    pub fn to_request(&self) -> AdvisoryRequest {
        AdvisoryRequest {
            site: CallSite::ReadinessAudit,
            prompt: format!(
                "Produce a formal stadium compliance audit for FIFA/UEFA standards.\n\
                 - Pitch Quality: {}%\n\
                 - Lighting/Infrastructure: {}%\n\
                 - Safety Compliance: {}%\n\
                 - Financial Margin: {}%\n\
                 Cover certification level, critical remediation items and broadcast \
                 readiness. Use Markdown.",
                self.turf_health, self.infra_score, self.safety_score, self.margin_pct
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPeriod {
    Weekly,
    Monthly,
}

impl FromStr for MediaPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(MediaPeriod::Weekly),
            "monthly" => Ok(MediaPeriod::Monthly),
            other => Err(format!("unknown media period {other:?}, expected weekly or monthly")),
        }
    }
}

impl fmt::Display for MediaPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaPeriod::Weekly => "weekly",
            MediaPeriod::Monthly => "monthly",
        })
    }
}

/// Pre-match briefing for broadcasters and press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaBriefing {
    pub period: MediaPeriod,
    pub match_name: String,
    pub compliance: Decimal,
    pub turf: Decimal,
    pub expected_attendance: u64,
}

impl MediaBriefing {
    /// Expected attendance is the projection's effective attendance.
    pub fn new(
        period: MediaPeriod,
        match_name: impl Into<String>,
        compliance: Decimal,
        turf: Decimal,
        result: &ProjectionResult,
    ) -> Self {
        Self {
            period,
            match_name: match_name.into(),
            compliance,
            turf,
            expected_attendance: result.effective_attendance,
        }
    }

    pub fn to_request(&self) -> AdvisoryRequest {
        AdvisoryRequest {
            site: CallSite::MediaBriefing,
            prompt: format!(
                "Write a {} pre-match media briefing for broadcasters and digital media.\n\
                 Match: {}\n\
                 - Stadium Compliance: {}%\n\
                 - Turf Surface Health: {}%\n\
                 - Expected Attendance: {}\n\
                 Cover pitch analysis, facility readiness, media logistics and the \
                 matchday forecast. Use Markdown.",
                self.period, self.match_name, self.compliance, self.turf, self.expected_attendance
            ),
        }
    }
}

/// Turf condition bucket reported per pitch zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Excellent => "excellent",
            HealthStatus::Good => "good",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Ok(HealthStatus::Excellent),
            "good" => Ok(HealthStatus::Good),
            "warning" => Ok(HealthStatus::Warning),
            "critical" => Ok(HealthStatus::Critical),
            other => Err(format!("unknown health status {other:?}")),
        }
    }
}

/// Free-form operator question answered against the current stadium state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantQuery {
    pub query: String,
    pub readiness_score: Decimal,
    pub turf_health: Decimal,
    pub active_alerts: u32,
    /// Zone counts per health bucket.
    pub distribution: Vec<(HealthStatus, u32)>,
}

impl AssistantQuery {
    pub fn to_request(&self) -> AdvisoryRequest {
        let distribution = if self.distribution.is_empty() {
            "none reported".to_string()
        } else {
            self.distribution
                .iter()
                .map(|(status, count)| format!("{}: {}", status, count))
                .collect::<Vec<_>>()
                .join(", ")
        };
        AdvisoryRequest {
            site: CallSite::OpsAssistant,
            prompt: format!(
                "You are an operations assistant for a FIFA-grade stadium.\n\
                 Current stadium context:\n\
                 - Readiness Score: {}%\n\
                 - Turf Health Avg: {}%\n\
                 - Active Alerts: {}\n\
                 - Pitch Zones: {}\n\
                 Operator question: {}\n\
                 Give concise, actionable advice grounded in FIFA/UEFA standards. \
                 Use Markdown.",
                self.readiness_score,
                self.turf_health,
                self.active_alerts,
                distribution,
                self.query.trim()
            ),
        }
    }
}

/// Telemetry for one pitch zone, used to ask for a remediation protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneTelemetry {
    pub id: String,
    /// Percent.
    pub moisture: Decimal,
    /// Percent.
    pub density: Decimal,
    /// Degrees Celsius.
    pub temperature: Decimal,
    pub status: HealthStatus,
}

impl ZoneTelemetry {
    pub fn to_request(&self) -> AdvisoryRequest {
        AdvisoryRequest {
            site: CallSite::ZoneRemediation,
            prompt: format!(
                "Act as a turf consultant for pitch zone {}.\n\
                 - Moisture: {}%\n\
                 - Density: {}%\n\
                 - Temperature: {}\u{b0}C\n\
                 - Health Status: {}\n\
                 Give a short remediation protocol for this 5x5m area covering soil \
                 aeration, N-P-K adjustment and the expected recovery time, following \
                 UEFA pitch quality guidelines.",
                self.id, self.moisture, self.density, self.temperature, self.status
            ),
        }
    }
}

/// Moisture readings and a weather forecast for irrigation planning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrrigationPlan {
    /// Per-zone moisture percentages.
    pub readings: Vec<Decimal>,
    pub forecast: String,
}

impl IrrigationPlan {
    pub fn new(readings: Vec<Decimal>, forecast: impl Into<String>) -> Self {
        Self {
            readings,
            forecast: forecast.into(),
        }
    }

    /// Mean moisture to one decimal place. `None` when there are no readings
    /// or the sum does not fit a `Decimal`.
    pub fn average_moisture(&self) -> Option<Decimal> {
        if self.readings.is_empty() {
            return None;
        }
        let sum = self
            .readings
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(*r))?;
        let avg = sum.checked_div(Decimal::from(self.readings.len()))?;
        Some(avg.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn to_request(&self) -> AdvisoryRequest {
        let moisture = match self.average_moisture() {
            Some(avg) => format!("{}%", avg),
            None => "no sensor readings available".to_string(),
        };
        AdvisoryRequest {
            site: CallSite::Irrigation,
            prompt: format!(
                "Assess irrigation needs for a professional soccer pitch.\n\
                 - Average Moisture: {}\n\
                 - Forecast: {}\n\
                 Propose a 24h watering cycle for match playability with timing, \
                 volume and evapotranspiration factors.",
                moisture,
                self.forecast.trim()
            ),
        }
    }
}

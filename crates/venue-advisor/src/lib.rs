#![deny(warnings)]

//! Advisory text for the operations dashboard.
//!
//! Builds prompts from computed figures, hands them to a hosted text
//! generator and substitutes a fixed fallback string whenever generation
//! fails. Advisory text is supplementary, so failures never propagate past
//! [`request_advisory`].

use thiserror::Error;
use tracing::{debug, warn};

pub mod client;
pub mod prompts;
pub mod summary;

pub use client::HostedModelClient;
pub use prompts::{
    AssistantQuery, HealthStatus, IrrigationPlan, MediaBriefing, MediaPeriod, ReadinessAudit,
    ZoneTelemetry,
};
pub use summary::AdvisorySummary;

/// Failures reported by a text generator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("API key is not configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(String),
    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("model returned no text")]
    Empty,
}

/// Asynchronous text generation: one prompt in, one string out.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    /// Generate text for `prompt`, optionally overriding the model id.
    async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, GenerationError>;
}

/// Dashboard features that request advisory text. Each one has its own
/// fallback message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallSite {
    /// ROI simulator "synthesize insights".
    FinancialStrategy,
    /// Compliance audit report.
    ReadinessAudit,
    /// Pre-match media briefing.
    MediaBriefing,
    /// Operations assistant chat.
    OpsAssistant,
    /// Per-zone turf remediation protocol.
    ZoneRemediation,
    /// 24h irrigation cycle.
    Irrigation,
}

impl CallSite {
    pub const ALL: [CallSite; 6] = [
        CallSite::FinancialStrategy,
        CallSite::ReadinessAudit,
        CallSite::MediaBriefing,
        CallSite::OpsAssistant,
        CallSite::ZoneRemediation,
        CallSite::Irrigation,
    ];

    pub fn fallback(self) -> &'static str {
        match self {
            CallSite::FinancialStrategy => "Financial strategy unavailable.",
            CallSite::ReadinessAudit => "Report generation timed out.",
            CallSite::MediaBriefing => "Media report generation failed.",
            CallSite::OpsAssistant => "Error generating AI insights.",
            CallSite::ZoneRemediation => "Remediation intelligence offline.",
            CallSite::Irrigation => "Hydraulic analysis failed.",
        }
    }
}

/// A prompt bound to the call site that issued it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvisoryRequest {
    pub site: CallSite,
    pub prompt: String,
}

/// Text shown to the user: either model output or the call site's fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advisory {
    Generated(String),
    Fallback(&'static str),
}

impl Advisory {
    pub fn text(&self) -> &str {
        match self {
            Advisory::Generated(s) => s.as_str(),
            Advisory::Fallback(s) => *s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Advisory::Fallback(_))
    }
}

/// Issue one generation request. Errors are logged and replaced with the
/// call site's fallback text. No retry.
pub async fn request_advisory<G: TextGenerator>(
    generator: &G,
    request: &AdvisoryRequest,
    model: Option<&str>,
) -> Advisory {
    match generator.generate(&request.prompt, model).await {
        Ok(text) => {
            debug!(site = ?request.site, chars = text.len(), "advisory generated");
            Advisory::Generated(text)
        }
        Err(e) => {
            warn!(site = ?request.site, error = %e, "advisory generation failed");
            Advisory::Fallback(request.site.fallback())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::CannedGenerator;
    use super::*;

    fn request(site: CallSite) -> AdvisoryRequest {
        AdvisoryRequest {
            site,
            prompt: "hello".into(),
        }
    }

    #[tokio::test]
    async fn passes_generated_text_through() {
        let gen = CannedGenerator::ok("  three ideas  ");
        let out = request_advisory(&gen, &request(CallSite::FinancialStrategy), Some("m1")).await;
        assert_eq!(out, Advisory::Generated("  three ideas  ".into()));
        assert!(!out.is_fallback());
        let seen = gen.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], ("hello".to_string(), Some("m1".to_string())));
    }

    #[tokio::test]
    async fn failure_becomes_site_fallback() {
        let gen = CannedGenerator::failing(GenerationError::Request("offline".into()));
        for site in CallSite::ALL {
            let out = request_advisory(&gen, &request(site), None).await;
            assert!(out.is_fallback());
            assert_eq!(out.text(), site.fallback());
        }
        // One call per request, no retries.
        assert_eq!(gen.seen.borrow().len(), CallSite::ALL.len());
    }

    #[test]
    fn fallbacks_are_distinct() {
        let texts: std::collections::HashSet<_> =
            CallSite::ALL.iter().map(|s| s.fallback()).collect();
        assert_eq!(texts.len(), CallSite::ALL.len());
        assert_eq!(CallSite::Irrigation.fallback(), "Hydraulic analysis failed.");
        assert_eq!(CallSite::ZoneRemediation.fallback(), "Remediation intelligence offline.");
        assert_eq!(CallSite::OpsAssistant.fallback(), "Error generating AI insights.");
    }
}

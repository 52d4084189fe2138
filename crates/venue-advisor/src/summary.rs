//! Plain-language summary of a projection, handed to the text generator.
//!
//! Figures are copied verbatim from the [`ProjectionResult`]; nothing here
//! rounds or reformats them, so the prompt always matches what the
//! dashboard displays.

use crate::{AdvisoryRequest, CallSite};
use rust_decimal::Decimal;
use std::fmt;
use venue_core::{ProjectionResult, Scenario};

/// Figures forwarded to the financial-strategy call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvisorySummary {
    pub scenario: Scenario,
    pub capacity: i64,
    pub attendance: u64,
    pub revenue: Decimal,
    pub costs: Decimal,
    pub margin: Decimal,
}

impl AdvisorySummary {
    pub fn new(capacity: i64, scenario: Scenario, result: &ProjectionResult) -> Self {
        Self {
            scenario,
            capacity,
            attendance: result.effective_attendance,
            revenue: result.total_revenue,
            costs: result.operating_cost,
            margin: result.margin,
        }
    }

    /// Prompt for the ROI simulator's strategy insights.
    pub fn to_request(&self) -> AdvisoryRequest {
        AdvisoryRequest {
            site: CallSite::FinancialStrategy,
            prompt: format!(
                "Analyze matchday ROI for a stadium operator.\n\
                 {}\n\
                 Name three high-impact cost reduction areas and outline a \
                 premium seat upselling strategy.",
                self
            ),
        }
    }
}

impl fmt::Display for AdvisorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- Scenario: {}", self.scenario)?;
        writeln!(f, "- Capacity: {} seats", self.capacity)?;
        writeln!(f, "- Attendance: {}", self.attendance)?;
        writeln!(f, "- Revenue: ${}", self.revenue)?;
        writeln!(f, "- Operational Costs: ${}", self.costs)?;
        write!(f, "- Margin: ${}", self.margin)
    }
}

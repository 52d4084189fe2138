#![deny(warnings)]

//! ROI simulator session: slider and scenario state, per-change projection
//! and the insight request lifecycle.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use venue_advisor::{request_advisory, Advisory, AdvisoryRequest, AdvisorySummary, TextGenerator};
use venue_core::{
    ConfigError, InvalidInputError, ProjectionInput, ProjectionResult, Scenario, VenueConfig,
};
use venue_econ::{project_with, EngineParams};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("an insight request is already in flight")]
    InFlight,
    #[error("no insight request is pending")]
    NotPending,
    #[error(transparent)]
    Projection(#[from] InvalidInputError),
}

/// Where the advisory text for the current view stands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "lowercase")]
pub enum InsightState {
    #[default]
    Idle,
    Pending,
    /// Model output.
    Completed(String),
    /// Call-site fallback text.
    Failed(String),
}

/// Two-step request lifecycle: `Idle -> Pending -> Completed | Failed`.
/// A new request may start from any state except `Pending`.
#[derive(Clone, Debug, Default)]
pub struct InsightLifecycle {
    state: InsightState,
}

impl InsightLifecycle {
    pub fn state(&self) -> &InsightState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == InsightState::Pending
    }

    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.is_in_flight() {
            return Err(SessionError::InFlight);
        }
        self.state = InsightState::Pending;
        debug!("insight request pending");
        Ok(())
    }

    pub fn finish(&mut self, advisory: Advisory) -> Result<(), SessionError> {
        if !self.is_in_flight() {
            return Err(SessionError::NotPending);
        }
        self.state = match advisory {
            Advisory::Generated(text) => InsightState::Completed(text),
            Advisory::Fallback(text) => InsightState::Failed(text.to_string()),
        };
        debug!(state = ?self.state, "insight request settled");
        Ok(())
    }

    /// Drop a settled result. A pending request is left to complete.
    pub fn clear(&mut self) {
        if !self.is_in_flight() {
            self.state = InsightState::Idle;
        }
    }
}

/// Serializable view of the session for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub capacity: i64,
    pub scenario: Scenario,
    pub projection: ProjectionResult,
    pub insights: InsightState,
}

/// State behind the ROI simulator view.
#[derive(Clone, Debug)]
pub struct SimulatorSession {
    config: VenueConfig,
    params: EngineParams,
    capacity: i64,
    scenario: Scenario,
    insights: InsightLifecycle,
}

impl SimulatorSession {
    pub fn new(config: VenueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            params: EngineParams::from(&config),
            capacity: config.default_capacity,
            scenario: Scenario::Nominal,
            insights: InsightLifecycle::default(),
            config,
        })
    }

    pub fn config(&self) -> &VenueConfig {
        &self.config
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn insights(&self) -> &InsightState {
        self.insights.state()
    }

    /// Move the capacity slider. Returns the clamped value actually applied.
    pub fn set_capacity(&mut self, requested: i64) -> i64 {
        self.capacity = self.config.clamp_capacity(requested);
        debug!(requested, applied = self.capacity, "capacity changed");
        self.capacity
    }

    /// Switch scenario; a settled insight no longer matches and is cleared.
    pub fn set_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
        self.insights.clear();
        debug!(%scenario, "scenario changed");
    }

    /// Fresh input built from the current state.
    pub fn input(&self) -> ProjectionInput {
        ProjectionInput::new(self.capacity, self.scenario, self.config.tiers.clone())
    }

    pub fn projection(&self) -> Result<ProjectionResult, InvalidInputError> {
        project_with(&self.input(), &self.params)
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, InvalidInputError> {
        Ok(SessionSnapshot {
            capacity: self.capacity,
            scenario: self.scenario,
            projection: self.projection()?,
            insights: self.insights.state().clone(),
        })
    }

    /// Start an insight request for the current projection. Fails while
    /// another request is pending.
    pub fn begin_insights(&mut self) -> Result<AdvisoryRequest, SessionError> {
        if self.insights.is_in_flight() {
            return Err(SessionError::InFlight);
        }
        let result = self.projection()?;
        let request = AdvisorySummary::new(self.capacity, self.scenario, &result).to_request();
        self.insights.begin()?;
        Ok(request)
    }

    pub fn finish_insights(&mut self, advisory: Advisory) -> Result<(), SessionError> {
        self.insights.finish(advisory)
    }

    /// Run a full request against `generator` and settle the lifecycle.
    pub async fn synthesize_insights<G: TextGenerator>(
        &mut self,
        generator: &G,
    ) -> Result<&InsightState, SessionError> {
        let request = self.begin_insights()?;
        let model = self.config.model.clone();
        let advisory = request_advisory(generator, &request, Some(&model)).await;
        self.finish_insights(advisory)?;
        Ok(self.insights.state())
    }
}

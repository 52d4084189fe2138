#![deny(warnings)]

//! Core domain models and invariants for matchday financial projections.
//!
//! This crate defines the serializable value types shared by the projection
//! engine, the advisory formatter and the simulator session, together with
//! validation helpers that guard every invariant the engine relies on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod config;

pub use config::{ConfigError, VenueConfig};

/// Maximum allowed distance between the sum of tier shares and 1.
pub const SHARE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// One class of stadium seating.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatTier {
    /// Display name, e.g. "VVIP Boxes". Unique within a tier table.
    pub name: String,
    /// Ticket price per attendee per match (>= 0).
    pub price: Decimal,
    /// Fraction of attendance allocated to this tier, in [0,1].
    pub share: Decimal,
}

impl SeatTier {
    pub fn new(name: impl Into<String>, price: Decimal, share: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            share,
        }
    }
}

/// The stock four-tier pricing table used by the ROI simulator.
pub fn default_tiers() -> Vec<SeatTier> {
    vec![
        SeatTier::new("VVIP Boxes", Decimal::new(100, 0), Decimal::new(5, 2)),
        SeatTier::new("Club Seats", Decimal::new(75, 0), Decimal::new(15, 2)),
        SeatTier::new("Main Stand", Decimal::new(45, 0), Decimal::new(50, 2)),
        SeatTier::new("Supporters End", Decimal::new(20, 0), Decimal::new(30, 2)),
    ]
}

/// Named operating condition affecting attendance and cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Regular league fixture.
    Nominal,
    /// Sold-out high-risk match with extra security.
    Derby,
    /// Bad weather keeps part of the crowd at home.
    Rainy,
}

/// Attendance and cost effects attached to a [`Scenario`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioProfile {
    /// Fraction of capacity expected to attend, in (0,1].
    pub attendance_rate: Decimal,
    /// Fixed operating cost added on top of the per-seat cost.
    pub surcharge: Decimal,
}

impl Scenario {
    /// Every scenario, in the order the simulator presents them.
    pub const ALL: [Scenario; 3] = [Scenario::Nominal, Scenario::Derby, Scenario::Rainy];

    pub fn profile(self) -> ScenarioProfile {
        match self {
            Scenario::Nominal => ScenarioProfile {
                attendance_rate: Decimal::new(94, 2),
                surcharge: Decimal::ZERO,
            },
            Scenario::Derby => ScenarioProfile {
                attendance_rate: Decimal::ONE,
                surcharge: Decimal::new(500_000, 0),
            },
            Scenario::Rainy => ScenarioProfile {
                attendance_rate: Decimal::new(72, 2),
                surcharge: Decimal::ZERO,
            },
        }
    }

    pub fn attendance_rate(self) -> Decimal {
        self.profile().attendance_rate
    }

    pub fn surcharge(self) -> Decimal {
        self.profile().surcharge
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Nominal => "nominal",
            Scenario::Derby => "derby",
            Scenario::Rainy => "rainy",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.as_str() == s)
            .ok_or_else(|| InvalidInputError::UnknownScenario(s.to_string()))
    }
}

/// A single projection request, built fresh from the current UI state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionInput {
    /// Total sellable seats; must be > 0.
    pub capacity: i64,
    pub scenario: Scenario,
    /// Seat tiers in display order.
    pub tiers: Vec<SeatTier>,
}

impl ProjectionInput {
    pub fn new(capacity: i64, scenario: Scenario, tiers: Vec<SeatTier>) -> Self {
        Self {
            capacity,
            scenario,
            tiers,
        }
    }

    /// Build an input from a loosely typed scenario key.
    pub fn parse(
        capacity: i64,
        scenario: &str,
        tiers: Vec<SeatTier>,
    ) -> Result<Self, InvalidInputError> {
        Ok(Self::new(capacity, scenario.parse()?, tiers))
    }
}

/// Attendance and ticket revenue attributed to one tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAllocation {
    pub name: String,
    pub attendees: u64,
    pub revenue: Decimal,
}

/// Output of the projection engine. Raw numbers only; formatting is left to
/// the display layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// round(capacity * attendance rate).
    pub effective_attendance: u64,
    /// Per-tier allocation, in input order.
    pub per_tier: Vec<TierAllocation>,
    pub ticket_revenue: Decimal,
    /// Ticket revenue including ancillary spend.
    pub total_revenue: Decimal,
    pub operating_cost: Decimal,
    pub margin: Decimal,
    /// margin / total revenue, or 0 when there is no revenue.
    pub margin_ratio: Decimal,
}

impl ProjectionResult {
    /// Attendee count for a tier by name.
    pub fn attendance_for(&self, name: &str) -> Option<u64> {
        self.per_tier
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.attendees)
    }

    /// Sum of per-tier attendees. May differ from `effective_attendance` by
    /// the per-tier rounding residual.
    pub fn allocated_attendance(&self) -> u64 {
        self.per_tier.iter().map(|t| t.attendees).sum()
    }
}

/// Malformed projection input. The only error the engine produces.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    #[error("capacity must be > 0, got {0}")]
    NonPositiveCapacity(i64),
    #[error("unknown scenario: {0:?}")]
    UnknownScenario(String),
    #[error("tier table is empty")]
    NoTiers,
    #[error("tier name must not be blank")]
    BlankTierName,
    #[error("duplicate tier name: {0}")]
    DuplicateTier(String),
    #[error("tier {tier}: price must be >= 0, got {price}")]
    NegativePrice { tier: String, price: Decimal },
    #[error("tier {tier}: share must be within [0,1], got {share}")]
    ShareOutOfRange { tier: String, share: Decimal },
    #[error("tier shares sum to {0}, expected 1")]
    ShareSumMismatch(Decimal),
    #[error("projection exceeds the representable numeric range")]
    Overflow,
}

/// Validate that capacity is strictly positive.
pub fn validate_capacity(capacity: i64) -> Result<(), InvalidInputError> {
    if capacity <= 0 {
        return Err(InvalidInputError::NonPositiveCapacity(capacity));
    }
    Ok(())
}

/// Validate a tier table: non-empty, unique non-blank names, non-negative
/// prices, shares in [0,1] summing to 1 within [`SHARE_TOLERANCE`].
pub fn validate_tiers(tiers: &[SeatTier]) -> Result<(), InvalidInputError> {
    if tiers.is_empty() {
        return Err(InvalidInputError::NoTiers);
    }
    let mut names: BTreeSet<&str> = BTreeSet::new();
    let mut sum = Decimal::ZERO;
    for t in tiers {
        if t.name.trim().is_empty() {
            return Err(InvalidInputError::BlankTierName);
        }
        if !names.insert(t.name.as_str()) {
            return Err(InvalidInputError::DuplicateTier(t.name.clone()));
        }
        if t.price < Decimal::ZERO {
            return Err(InvalidInputError::NegativePrice {
                tier: t.name.clone(),
                price: t.price,
            });
        }
        if t.share < Decimal::ZERO || t.share > Decimal::ONE {
            return Err(InvalidInputError::ShareOutOfRange {
                tier: t.name.clone(),
                share: t.share,
            });
        }
        sum += t.share;
    }
    if (sum - Decimal::ONE).abs() > SHARE_TOLERANCE {
        return Err(InvalidInputError::ShareSumMismatch(sum));
    }
    Ok(())
}

/// Validate a full projection request.
pub fn validate_input(input: &ProjectionInput) -> Result<(), InvalidInputError> {
    validate_capacity(input.capacity)?;
    validate_tiers(&input.tiers)
}

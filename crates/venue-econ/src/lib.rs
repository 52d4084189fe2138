#![deny(warnings)]

//! Matchday financial projection engine.
//!
//! Turns a venue capacity, an operating scenario and a seat-tier pricing
//! table into attendance, revenue, cost and margin figures:
//! - Effective attendance from the scenario's attendance rate
//! - Per-tier attendance, rounded independently (round-half-up)
//! - Ticket revenue, ancillary-inflated total revenue, operating cost, margin
//!
//! The engine is pure: no I/O, no logging, no shared state.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use venue_core::{
    validate_input, InvalidInputError, ProjectionInput, ProjectionResult, TierAllocation,
    VenueConfig,
};

/// Cost-model constants applied on top of the projection input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineParams {
    /// Ticket revenue to total revenue factor (concessions, parking, merch).
    pub ancillary_multiplier: Decimal,
    /// Operating cost per seat of capacity, per match.
    pub per_seat_cost: Decimal,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            ancillary_multiplier: Decimal::new(145, 2),
            per_seat_cost: Decimal::new(25, 0),
        }
    }
}

impl From<&VenueConfig> for EngineParams {
    fn from(cfg: &VenueConfig) -> Self {
        Self {
            ancillary_multiplier: cfg.ancillary_multiplier,
            per_seat_cost: cfg.per_seat_cost,
        }
    }
}

/// Round to the nearest integer, halves away from zero. All engine
/// quantities are non-negative, so this is round-half-up.
///
/// Example:
/// assert_eq!(round_half_up(Decimal::new(235, 1)), Decimal::new(24, 0));
pub fn round_half_up(x: Decimal) -> Decimal {
    x.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Project with the default cost model (multiplier 1.45, 25 per seat).
pub fn project(input: &ProjectionInput) -> Result<ProjectionResult, InvalidInputError> {
    project_with(input, &EngineParams::default())
}

/// Project with an explicit cost model.
///
/// Per-tier attendance is rounded independently, so the allocated total may
/// differ from `effective_attendance` by up to half the number of tiers. The
/// residual is left as is.
///
/// Example:
/// let input = ProjectionInput::new(65_000, Scenario::Nominal, default_tiers());
/// let r = project_with(&input, &EngineParams::default()).unwrap();
/// assert_eq!(r.effective_attendance, 61_100);
pub fn project_with(
    input: &ProjectionInput,
    params: &EngineParams,
) -> Result<ProjectionResult, InvalidInputError> {
    validate_input(input)?;
    let profile = input.scenario.profile();
    let capacity = Decimal::from(input.capacity);

    let effective = round_half_up(checked(capacity.checked_mul(profile.attendance_rate))?);
    let effective_attendance = checked(effective.to_u64())?;

    let mut per_tier = Vec::with_capacity(input.tiers.len());
    let mut ticket_revenue = Decimal::ZERO;
    for tier in &input.tiers {
        let attendees = round_half_up(checked(effective.checked_mul(tier.share))?);
        let revenue = checked(attendees.checked_mul(tier.price))?;
        ticket_revenue = checked(ticket_revenue.checked_add(revenue))?;
        per_tier.push(TierAllocation {
            name: tier.name.clone(),
            attendees: checked(attendees.to_u64())?,
            revenue,
        });
    }

    let total_revenue = checked(ticket_revenue.checked_mul(params.ancillary_multiplier))?;
    let operating_cost = checked(
        capacity
            .checked_mul(params.per_seat_cost)
            .and_then(|c| c.checked_add(profile.surcharge)),
    )?;
    let margin = checked(total_revenue.checked_sub(operating_cost))?;
    let margin_ratio = if total_revenue > Decimal::ZERO {
        checked(margin.checked_div(total_revenue))?
    } else {
        Decimal::ZERO
    };

    Ok(ProjectionResult {
        effective_attendance,
        per_tier,
        ticket_revenue,
        total_revenue,
        operating_cost,
        margin,
        margin_ratio,
    })
}

fn checked<T>(v: Option<T>) -> Result<T, InvalidInputError> {
    v.ok_or(InvalidInputError::Overflow)
}

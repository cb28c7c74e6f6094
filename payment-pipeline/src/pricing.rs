//! Server-side price recomputation
//!
//! The expected total is always derived fresh from stored booking state
//! and hospital pricing. Client-submitted amounts are compared against it,
//! never trusted.

use crate::config::PipelineConfig;
use crate::eligibility::rapid_assistance_charge;
use crate::error::{PaymentError, Result};
use booking_core::currency::round;
use booking_core::{Booking, HospitalPricing, PricingQuote};
use rust_decimal::Decimal;

/// Recompute the expected total for one payment attempt
///
/// Base price comes from the hospital's flat or hourly rate; the service
/// charge is a configured percentage of the base, half-up rounded to the
/// paisa. The add-on charge is derived from the stored booking flag or the
/// validated request intent. A booking that already carries the add-on
/// keeps its stored charge and never accrues it twice.
pub fn compute_expected_total(
    booking: &Booking,
    pricing: &HospitalPricing,
    rapid_requested: bool,
    config: &PipelineConfig,
) -> Result<PricingQuote> {
    let base_price = round(pricing.base_price(booking.estimated_duration_hours));
    if base_price <= Decimal::ZERO {
        return Err(PaymentError::Unexpected(anyhow::anyhow!(
            "non-positive base price for booking {}",
            booking.id
        )));
    }

    let service_charge_amount =
        round(base_price * config.service_charge_percent / Decimal::from(100));

    let add_on_charge = if booking.rapid_assistance_enabled {
        booking.rapid_assistance_charge
    } else {
        rapid_assistance_charge(rapid_requested, config.rapid_assistance_fee)
    };

    let total_expected = round(base_price + service_charge_amount + add_on_charge);

    Ok(PricingQuote {
        base_price,
        service_charge_amount,
        add_on_charge,
        total_expected,
    })
}

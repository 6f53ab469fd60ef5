//! Distance-tiered delivery fees.
//!
//! A restaurant configures a list of [`DeliveryZone`]s. Together they form a
//! step function from distance to fee: the first zone (ascending by
//! `max_distance_km`) whose radius covers the distance sets the fee.
//!
//! Two "zero fee" outcomes mean very different things:
//!
//! - no zones configured: delivery is free and reaches everywhere
//! - no zone covers the distance: delivery is unavailable
//!
//! Callers must branch on [`FeeQuote::in_range`] before using the fee.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinates;

/// A distance threshold paired with a flat delivery fee.
///
/// Serialized as `{ "max_distance_km": 3, "fee": 5 }`, with the fee as a JSON
/// number, matching how zones are stored in `restaurant_settings.delivery_zones`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub max_distance_km: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
}

impl DeliveryZone {
    #[must_use]
    pub const fn new(max_distance_km: f64, fee: Decimal) -> Self {
        Self {
            max_distance_km,
            fee,
        }
    }

    /// Whether `distance_km` falls inside this zone (boundary inclusive).
    #[must_use]
    pub fn covers(&self, distance_km: f64) -> bool {
        distance_km <= self.max_distance_km
    }
}

/// Result of resolving a distance against the configured zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// Delivery fee. Zero both for free delivery and for out-of-range.
    pub fee: Decimal,
    /// `false` means delivery is unavailable and the order must be rejected.
    pub in_range: bool,
}

impl FeeQuote {
    /// Unconfigured delivery: free and reachable from anywhere.
    pub const FREE: Self = Self {
        fee: Decimal::ZERO,
        in_range: true,
    };

    /// Distance beyond every configured zone.
    pub const OUT_OF_RANGE: Self = Self {
        fee: Decimal::ZERO,
        in_range: false,
    };
}

/// Map a distance to a delivery fee.
///
/// Zones may be supplied in any order; they are sorted (stably) by
/// `max_distance_km` before the scan, so among zones with equal radius the
/// one listed first wins. Negative distances simply land in the first zone.
#[must_use]
pub fn resolve_fee(distance_km: f64, zones: &[DeliveryZone]) -> FeeQuote {
    if zones.is_empty() {
        return FeeQuote::FREE;
    }

    normalize_zones(zones)
        .iter()
        .find(|zone| zone.covers(distance_km))
        .map_or(FeeQuote::OUT_OF_RANGE, |zone| FeeQuote {
            fee: zone.fee,
            in_range: true,
        })
}

/// Return a copy of `zones` sorted ascending by `max_distance_km`.
///
/// The sort is stable, so zones with equal radius keep their relative order.
#[must_use]
pub fn normalize_zones(zones: &[DeliveryZone]) -> Vec<DeliveryZone> {
    let mut sorted = zones.to_vec();
    sorted.sort_by(|a, b| a.max_distance_km.total_cmp(&b.max_distance_km));
    sorted
}

/// Errors for zones entered by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    /// Radius is not a positive, finite number of kilometers.
    #[error("zone {index}: max distance must be a positive number of km")]
    InvalidDistance {
        /// Position of the offending zone in the submitted list.
        index: usize,
    },
    /// Fee is below zero.
    #[error("zone {index}: fee cannot be negative")]
    NegativeFee {
        /// Position of the offending zone in the submitted list.
        index: usize,
    },
    /// Fee has fractions of a cent.
    #[error("zone {index}: fee cannot have more than 2 decimal places")]
    FeePrecision {
        /// Position of the offending zone in the submitted list.
        index: usize,
    },
}

/// Validate zones submitted by an administrator and return them sorted.
///
/// # Errors
///
/// Returns the first [`ZoneError`] found, in submission order.
pub fn validate_zones(zones: &[DeliveryZone]) -> Result<Vec<DeliveryZone>, ZoneError> {
    for (index, zone) in zones.iter().enumerate() {
        if !zone.max_distance_km.is_finite() || zone.max_distance_km <= 0.0 {
            return Err(ZoneError::InvalidDistance { index });
        }
        if zone.fee.is_sign_negative() && !zone.fee.is_zero() {
            return Err(ZoneError::NegativeFee { index });
        }
        if zone.fee.normalize().scale() > 2 {
            return Err(ZoneError::FeePrecision { index });
        }
    }
    Ok(normalize_zones(zones))
}

/// A delivery price for a concrete destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryQuote {
    /// Distance from the restaurant, when the restaurant location is known.
    pub distance_km: Option<f64>,
    pub fee: Decimal,
    pub in_range: bool,
}

impl DeliveryQuote {
    /// Delivery without distance pricing: free, in range, no distance.
    pub const UNPRICED: Self = Self {
        distance_km: None,
        fee: Decimal::ZERO,
        in_range: true,
    };

    /// The fee/range verdict without the distance.
    #[must_use]
    pub const fn fee_quote(&self) -> FeeQuote {
        FeeQuote {
            fee: self.fee,
            in_range: self.in_range,
        }
    }
}

/// Price delivery from `origin` (the restaurant) to `destination`.
///
/// Without a restaurant location the distance is unknown; delivery is then
/// treated as unconfigured (free and in range), the same policy as an empty
/// zone list.
#[must_use]
pub fn quote_delivery(
    origin: Option<Coordinates>,
    destination: Coordinates,
    zones: &[DeliveryZone],
) -> DeliveryQuote {
    let Some(origin) = origin else {
        return DeliveryQuote::UNPRICED;
    };

    let distance_km = origin.distance_km(&destination);
    let FeeQuote { fee, in_range } = resolve_fee(distance_km, zones);

    DeliveryQuote {
        distance_km: Some(distance_km),
        fee,
        in_range,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn zone(max_distance_km: f64, fee: i64) -> DeliveryZone {
        DeliveryZone::new(max_distance_km, Decimal::from(fee))
    }

    fn unsorted_zones() -> Vec<DeliveryZone> {
        vec![zone(6.0, 8), zone(3.0, 5)]
    }

    #[test]
    fn test_unsorted_zones_resolve_by_ascending_radius() {
        let zones = unsorted_zones();
        assert_eq!(
            resolve_fee(2.0, &zones),
            FeeQuote {
                fee: Decimal::from(5),
                in_range: true
            }
        );
        assert_eq!(
            resolve_fee(5.0, &zones),
            FeeQuote {
                fee: Decimal::from(8),
                in_range: true
            }
        );
        assert_eq!(resolve_fee(10.0, &zones), FeeQuote::OUT_OF_RANGE);
    }

    #[test]
    fn test_empty_zones_are_free_everywhere() {
        for distance in [0.0, 2.5, 1_000.0, -4.0] {
            assert_eq!(resolve_fee(distance, &[]), FeeQuote::FREE);
        }
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let zones = unsorted_zones();
        assert_eq!(resolve_fee(3.0, &zones).fee, Decimal::from(5));
        assert_eq!(resolve_fee(6.0, &zones).fee, Decimal::from(8));
        assert!(!resolve_fee(6.000_001, &zones).in_range);
    }

    #[test]
    fn test_duplicate_radius_first_listed_wins() {
        let zones = vec![zone(5.0, 7), zone(2.0, 3), zone(5.0, 9)];
        assert_eq!(resolve_fee(4.0, &zones).fee, Decimal::from(7));
    }

    #[test]
    fn test_negative_distance_lands_in_first_zone() {
        let quote = resolve_fee(-1.0, &unsorted_zones());
        assert!(quote.in_range);
        assert_eq!(quote.fee, Decimal::from(5));
    }

    #[test]
    fn test_resolve_is_idempotent_and_does_not_reorder_input() {
        let zones = unsorted_zones();
        let first = resolve_fee(4.2, &zones);
        let second = resolve_fee(4.2, &zones);
        assert_eq!(first, second);
        assert_eq!(zones, unsorted_zones());
    }

    #[test]
    fn test_zone_json_uses_numbers() {
        let json = serde_json::to_value(zone(3.0, 5)).unwrap();
        assert_eq!(json, serde_json::json!({ "max_distance_km": 3.0, "fee": 5.0 }));

        let parsed: Vec<DeliveryZone> =
            serde_json::from_str(r#"[{"max_distance_km": 4.5, "fee": 6.5}]"#).unwrap();
        assert_eq!(parsed, vec![DeliveryZone::new(4.5, "6.5".parse().unwrap())]);
    }

    #[test]
    fn test_validate_zones_sorts_valid_input() {
        let sorted = validate_zones(&unsorted_zones()).unwrap();
        assert_eq!(sorted, vec![zone(3.0, 5), zone(6.0, 8)]);
    }

    #[test]
    fn test_validate_zones_rejects_bad_radius() {
        assert_eq!(
            validate_zones(&[zone(3.0, 5), zone(0.0, 1)]),
            Err(ZoneError::InvalidDistance { index: 1 })
        );
        assert_eq!(
            validate_zones(&[zone(f64::NAN, 1)]),
            Err(ZoneError::InvalidDistance { index: 0 })
        );
    }

    #[test]
    fn test_validate_zones_rejects_negative_fee() {
        assert_eq!(
            validate_zones(&[zone(3.0, -1)]),
            Err(ZoneError::NegativeFee { index: 0 })
        );
        assert!(validate_zones(&[zone(3.0, 0)]).is_ok());
    }

    #[test]
    fn test_validate_zones_rejects_fractional_cents() {
        let fee = |s: &str| DeliveryZone::new(3.0, s.parse().unwrap());
        assert_eq!(
            validate_zones(&[zone(6.0, 8), fee("4.999")]),
            Err(ZoneError::FeePrecision { index: 1 })
        );
        assert!(validate_zones(&[fee("4.99")]).is_ok());
        assert!(validate_zones(&[fee("4.500")]).is_ok());
    }

    #[test]
    fn test_quote_delivery_without_origin_is_free() {
        let quote = quote_delivery(None, Coordinates::new(1.0, 1.0), &unsorted_zones());
        assert_eq!(quote.distance_km, None);
        assert_eq!(quote.fee_quote(), FeeQuote::FREE);
    }

    #[test]
    fn test_quote_delivery_measures_from_origin() {
        let origin = Coordinates::new(-23.5505, -46.6333);
        // ~1.11 km due south
        let destination = Coordinates::new(-23.5605, -46.6333);
        let quote = quote_delivery(Some(origin), destination, &unsorted_zones());

        let distance = quote.distance_km.unwrap();
        assert!((distance - 1.112).abs() < 0.01, "got {distance}");
        assert!(quote.in_range);
        assert_eq!(quote.fee, Decimal::from(5));
    }

    #[test]
    fn test_quote_delivery_out_of_range() {
        let origin = Coordinates::new(-23.5505, -46.6333);
        let rio = Coordinates::new(-22.9068, -43.1729);
        let quote = quote_delivery(Some(origin), rio, &unsorted_zones());
        assert!(!quote.in_range);
        assert_eq!(quote.fee, Decimal::ZERO);
    }
}

//! Offline delivery quotes.
//!
//! Lets an operator check a zone table against real addresses before
//! saving it in the admin.

use core::fmt;

use forno_core::delivery::validate_zones;
use forno_core::{Coordinates, DeliveryQuote, DeliveryZone, Price, quote_delivery};

/// Zone table given on the command line, validated and sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTable(pub Vec<DeliveryZone>);

/// A priced destination, printable for the terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteReport {
    pub distance_km: f64,
    pub quote: DeliveryQuote,
}

impl QuoteReport {
    #[must_use]
    pub const fn in_range(&self) -> bool {
        self.quote.in_range
    }
}

impl fmt::Display for QuoteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "distance: {:.2} km", self.distance_km)?;
        if self.in_range() {
            write!(f, "fee: {}", Price::brl(self.quote.fee))
        } else {
            write!(f, "fee: out of range")
        }
    }
}

/// Price delivery from `from` to `to` with `zones`.
#[must_use]
pub fn quote(from: Coordinates, to: Coordinates, zones: &[DeliveryZone]) -> QuoteReport {
    let quote = quote_delivery(Some(from), to, zones);
    QuoteReport {
        distance_km: quote.distance_km.unwrap_or_default(),
        quote,
    }
}

/// Parse `LAT,LNG` in decimal degrees.
///
/// # Errors
///
/// Returns a message for clap when the value is malformed or out of range.
pub fn parse_coordinates(value: &str) -> Result<Coordinates, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got `{value}`"))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude `{}`", lat.trim()))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude `{}`", lng.trim()))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {lat} is outside -90..=90"));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(format!("longitude {lng} is outside -180..=180"));
    }

    Ok(Coordinates::new(lat, lng))
}

/// Parse and validate a JSON zone table, returning it sorted.
///
/// # Errors
///
/// Returns a message for clap when the JSON is malformed or a zone is invalid.
pub fn parse_zones(value: &str) -> Result<ZoneTable, String> {
    let zones: Vec<DeliveryZone> =
        serde_json::from_str(value).map_err(|e| format!("invalid zones JSON: {e}"))?;
    validate_zones(&zones)
        .map(ZoneTable)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const RESTAURANT: Coordinates = Coordinates::new(-23.5505, -46.6333);

    fn zones() -> Vec<DeliveryZone> {
        parse_zones(r#"[{"max_distance_km": 6, "fee": 8}, {"max_distance_km": 3, "fee": 5}]"#)
            .unwrap()
            .0
    }

    #[test]
    fn test_parse_coordinates() {
        let parsed = parse_coordinates("-23.5505, -46.6333").unwrap();
        assert_eq!(parsed, RESTAURANT);
    }

    #[test]
    fn test_parse_coordinates_rejects_malformed() {
        assert!(parse_coordinates("-23.5505").is_err());
        assert!(parse_coordinates("north,-46.6").is_err());
        assert!(parse_coordinates("91,0").is_err());
        assert!(parse_coordinates("0,181").is_err());
    }

    #[test]
    fn test_parse_zones_sorts() {
        assert_eq!(
            zones(),
            vec![
                DeliveryZone::new(3.0, Decimal::from(5)),
                DeliveryZone::new(6.0, Decimal::from(8)),
            ]
        );
    }

    #[test]
    fn test_parse_zones_rejects_negative_fee() {
        let err = parse_zones(r#"[{"max_distance_km": 3, "fee": -1}]"#).unwrap_err();
        assert_eq!(err, "zone 0: fee cannot be negative");
    }

    #[test]
    fn test_quote_inside_first_zone() {
        // roughly 2.5 km south-west of the restaurant
        let report = quote(RESTAURANT, Coordinates::new(-23.5614, -46.6559), &zones());
        assert!(report.in_range());
        assert_eq!(report.quote.fee, Decimal::from(5));
        assert_eq!(
            report.to_string(),
            format!("distance: {:.2} km\nfee: R$ 5,00", report.distance_km)
        );
    }

    #[test]
    fn test_quote_out_of_range() {
        let report = quote(RESTAURANT, Coordinates::new(-22.9068, -43.1729), &zones());
        assert!(!report.in_range());
        assert!(report.to_string().ends_with("fee: out of range"));
    }

    #[test]
    fn test_quote_without_zones_is_free() {
        let report = quote(RESTAURANT, Coordinates::new(-22.9068, -43.1729), &[]);
        assert!(report.in_range());
        assert_eq!(report.to_string().lines().last(), Some("fee: R$ 0,00"));
    }
}

//! Restaurant settings.
//!
//! The `restaurant_settings` row is loosely typed (nullable columns, JSON
//! blobs, free-form strings). [`RestaurantSettings::from_record`] is the single
//! place where that row becomes a fully-defaulted configuration; everything
//! downstream works with concrete values and never re-applies fallbacks.
//!
//! | Field                | Default                          |
//! |----------------------|----------------------------------|
//! | `payment_methods`    | `Dinheiro`, `Pix`, `Cartão`      |
//! | `pizza_price_method` | `highest` (also for unknown text)|
//! | `delivery_zones`     | empty (free delivery everywhere) |
//! | `opening_hours`      | empty                            |
//! | `pix_key`            | none when blank                  |
//! | `pix_key_type`       | `random`                         |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::delivery::{DeliveryQuote, DeliveryZone, ZoneError, quote_delivery, validate_zones};
use crate::geo::Coordinates;
use crate::pizza::PriceMethod;
use crate::types::SettingsId;

/// Payment methods offered when none are configured.
pub const DEFAULT_PAYMENT_METHODS: [&str; 3] = ["Dinheiro", "Pix", "Cartão"];

/// Pix key type assumed when none is configured.
pub const DEFAULT_PIX_KEY_TYPE: &str = "random";

/// Settings row as stored, before defaults are applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct SettingsRecord {
    pub id: SettingsId,
    pub name: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub is_open: bool,
    pub opening_hours: serde_json::Value,
    pub payment_methods: Vec<String>,
    pub pix_key: Option<String>,
    pub pix_key_type: Option<String>,
    pub pizza_price_method: Option<String>,
    pub base_address_lat: Option<f64>,
    pub base_address_lng: Option<f64>,
    pub delivery_zones: serde_json::Value,
}

/// Opening and closing time for one day, as `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open: String,
    pub close: String,
}

/// Fully-defaulted restaurant configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSettings {
    pub id: SettingsId,
    pub name: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub is_open: bool,
    /// Day name → hours; `None` marks a closed day.
    pub opening_hours: BTreeMap<String, Option<OpeningHours>>,
    pub payment_methods: Vec<String>,
    pub pix_key: Option<String>,
    pub pix_key_type: String,
    pub pizza_price_method: PriceMethod,
    pub base_address_lat: Option<f64>,
    pub base_address_lng: Option<f64>,
    pub delivery_zones: Vec<DeliveryZone>,
}

impl RestaurantSettings {
    /// Apply defaults to a stored settings row.
    #[must_use]
    pub fn from_record(record: SettingsRecord) -> Self {
        let payment_methods: Vec<String> = record
            .payment_methods
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        let payment_methods = if payment_methods.is_empty() {
            DEFAULT_PAYMENT_METHODS.iter().map(ToString::to_string).collect()
        } else {
            payment_methods
        };

        Self {
            id: record.id,
            name: record.name,
            logo: non_blank(record.logo),
            address: non_blank(record.address),
            phone: non_blank(record.phone),
            whatsapp: non_blank(record.whatsapp),
            is_open: record.is_open,
            opening_hours: serde_json::from_value(record.opening_hours).unwrap_or_default(),
            payment_methods,
            pix_key: non_blank(record.pix_key),
            pix_key_type: non_blank(record.pix_key_type)
                .unwrap_or_else(|| DEFAULT_PIX_KEY_TYPE.to_string()),
            pizza_price_method: PriceMethod::parse_or_default(record.pizza_price_method.as_deref()),
            base_address_lat: record.base_address_lat,
            base_address_lng: record.base_address_lng,
            delivery_zones: parse_zones(record.delivery_zones),
        }
    }

    /// Restaurant location, when both coordinates are set.
    #[must_use]
    pub fn base_coordinates(&self) -> Option<Coordinates> {
        match (self.base_address_lat, self.base_address_lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }

    /// Price delivery to `destination` using this restaurant's zones.
    #[must_use]
    pub fn quote_delivery(&self, destination: Coordinates) -> DeliveryQuote {
        quote_delivery(self.base_coordinates(), destination, &self.delivery_zones)
    }

    /// Delivery is priced by distance: zones and a restaurant location are set.
    ///
    /// When `false`, every address is free to deliver to and in range.
    #[must_use]
    pub fn delivery_zones_enabled(&self) -> bool {
        self.base_coordinates().is_some() && !self.delivery_zones.is_empty()
    }

    /// Whether a Pix key is configured.
    #[must_use]
    pub const fn pix_enabled(&self) -> bool {
        self.pix_key.is_some()
    }

    /// The configured payment method matching `method` (case-insensitive).
    #[must_use]
    pub fn find_payment_method(&self, method: &str) -> Option<&str> {
        let wanted = method.trim().to_lowercase();
        self.payment_methods
            .iter()
            .find(|m| m.to_lowercase() == wanted)
            .map(String::as_str)
    }
}

/// Settings safe to show to customers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicSettings {
    pub name: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub is_open: bool,
    pub opening_hours: BTreeMap<String, Option<OpeningHours>>,
    pub payment_methods: Vec<String>,
    pub pizza_price_method: PriceMethod,
    pub pix_enabled: bool,
    pub delivery_zones_enabled: bool,
}

impl From<&RestaurantSettings> for PublicSettings {
    fn from(settings: &RestaurantSettings) -> Self {
        Self {
            name: settings.name.clone(),
            logo: settings.logo.clone(),
            address: settings.address.clone(),
            phone: settings.phone.clone(),
            whatsapp: settings.whatsapp.clone(),
            is_open: settings.is_open,
            opening_hours: settings.opening_hours.clone(),
            payment_methods: settings.payment_methods.clone(),
            pizza_price_method: settings.pizza_price_method,
            pix_enabled: settings.pix_enabled(),
            delivery_zones_enabled: settings.delivery_zones_enabled(),
        }
    }
}

/// Errors in settings submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("restaurant name is required")]
    BlankName,
    #[error("at least one payment method is required")]
    NoPaymentMethods,
    /// Times must be `HH:MM` (24h).
    #[error("invalid opening hours for {0}")]
    InvalidOpeningHours(String),
    /// Only one of latitude/longitude was given, or a value is off the globe.
    #[error("restaurant location must have a valid latitude and longitude")]
    InvalidLocation,
    #[error(transparent)]
    Zone(#[from] ZoneError),
}

/// General settings as edited in the back office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub name: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub is_open: bool,
    #[serde(default)]
    pub opening_hours: BTreeMap<String, Option<OpeningHours>>,
    pub payment_methods: Vec<String>,
    pub pix_key: Option<String>,
    pub pix_key_type: Option<String>,
    pub pizza_price_method: PriceMethod,
}

impl GeneralSettings {
    /// Trim text fields and check required values.
    ///
    /// Payment methods are trimmed and de-duplicated (case-insensitive),
    /// keeping the first spelling.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] found.
    pub fn validate(self) -> Result<Self, SettingsError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(SettingsError::BlankName);
        }

        let mut payment_methods: Vec<String> = Vec::new();
        for method in &self.payment_methods {
            let method = method.trim();
            if !method.is_empty()
                && !payment_methods.iter().any(|m| m.eq_ignore_ascii_case(method))
            {
                payment_methods.push(method.to_string());
            }
        }
        if payment_methods.is_empty() {
            return Err(SettingsError::NoPaymentMethods);
        }

        for (day, hours) in &self.opening_hours {
            if let Some(hours) = hours
                && !(is_clock_time(&hours.open) && is_clock_time(&hours.close))
            {
                return Err(SettingsError::InvalidOpeningHours(day.clone()));
            }
        }

        Ok(Self {
            name,
            logo: trimmed(self.logo),
            address: trimmed(self.address),
            phone: trimmed(self.phone),
            whatsapp: trimmed(self.whatsapp),
            pix_key: trimmed(self.pix_key),
            pix_key_type: trimmed(self.pix_key_type),
            payment_methods,
            ..self
        })
    }
}

/// Restaurant location and delivery zones as edited in the back office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySettings {
    pub base_address_lat: Option<f64>,
    pub base_address_lng: Option<f64>,
    #[serde(default)]
    pub delivery_zones: Vec<DeliveryZone>,
}

impl DeliverySettings {
    /// Check the location and zones; zones come back sorted by distance.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidLocation`] for a half-set or
    /// out-of-range location, or [`SettingsError::Zone`] for a bad zone.
    pub fn validate(self) -> Result<Self, SettingsError> {
        match (self.base_address_lat, self.base_address_lng) {
            (Some(lat), Some(lng)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                    return Err(SettingsError::InvalidLocation);
                }
            }
            (None, None) => {}
            _ => return Err(SettingsError::InvalidLocation),
        }

        Ok(Self {
            delivery_zones: validate_zones(&self.delivery_zones)?,
            ..self
        })
    }
}

/// `HH:MM` on a 24-hour clock.
fn is_clock_time(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    hours.len() == 2
        && minutes.len() == 2
        && hours.parse::<u8>().is_ok_and(|h| h < 24)
        && minutes.parse::<u8>().is_ok_and(|m| m < 60)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the stored zone list; null or malformed JSON yields no zones.
#[must_use]
pub fn parse_zones(value: serde_json::Value) -> Vec<DeliveryZone> {
    serde_json::from_value(value).unwrap_or_default()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//! Customer checkout form validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::RestaurantSettings;

const NAME_LEN: (usize, usize) = (2, 100);
const PHONE_LEN: (usize, usize) = (10, 20);
const ADDRESS_LEN: (usize, usize) = (5, 200);

/// Errors in the customer-entered checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutFormError {
    /// A text field is shorter or longer than allowed (after trimming).
    #[error("{field} must be between {min} and {max} characters")]
    Length {
        /// Field name as submitted.
        field: &'static str,
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// No payment method was chosen.
    #[error("select a payment method")]
    MissingPaymentMethod,
    /// The chosen payment method is not offered by the restaurant.
    #[error("payment method not accepted: {0}")]
    UnsupportedPaymentMethod(String),
}

/// Customer details submitted at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub payment_method: String,
}

/// A checkout form that passed validation, trimmed and with the payment
/// method spelled as the restaurant configured it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub payment_method: String,
}

impl CheckoutForm {
    /// Validate against the restaurant's settings.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutFormError`] found, checking fields in form
    /// order.
    pub fn validate(&self, settings: &RestaurantSettings) -> Result<ValidCheckout, CheckoutFormError> {
        let name = bounded("name", &self.name, NAME_LEN)?;
        let phone = bounded("phone", &self.phone, PHONE_LEN)?;
        let address = bounded("address", &self.address, ADDRESS_LEN)?;

        let method = self.payment_method.trim();
        if method.is_empty() {
            return Err(CheckoutFormError::MissingPaymentMethod);
        }
        let payment_method = settings
            .find_payment_method(method)
            .ok_or_else(|| CheckoutFormError::UnsupportedPaymentMethod(method.to_string()))?
            .to_string();

        Ok(ValidCheckout {
            name,
            phone,
            address,
            payment_method,
        })
    }
}

fn bounded(
    field: &'static str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<String, CheckoutFormError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(CheckoutFormError::Length { field, min, max });
    }
    Ok(trimmed.to_string())
}

/// What the customer needs to pay an order by Pix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixInstructions {
    pub key: String,
    pub key_type: String,
    pub amount: Decimal,
}

impl PixInstructions {
    /// Instructions for `payment_method`, if it is Pix and a key is set up.
    #[must_use]
    pub fn for_payment(
        settings: &RestaurantSettings,
        payment_method: &str,
        amount: Decimal,
    ) -> Option<Self> {
        if !payment_method.trim().eq_ignore_ascii_case("pix") {
            return None;
        }
        settings.pix_key.as_ref().map(|key| Self {
            key: key.clone(),
            key_type: settings.pix_key_type.clone(),
            amount,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::settings::SettingsRecord;
    use crate::types::SettingsId;

    fn settings(pix_key: Option<&str>) -> RestaurantSettings {
        RestaurantSettings::from_record(SettingsRecord {
            id: SettingsId::generate(),
            name: "Forno".to_string(),
            is_open: true,
            pix_key: pix_key.map(String::from),
            ..SettingsRecord::default()
        })
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "  Ana Souza ".to_string(),
            phone: "(11) 98765-4321".to_string(),
            address: "Rua das Flores, 123".to_string(),
            payment_method: "pix".to_string(),
        }
    }

    #[test]
    fn test_valid_form_is_trimmed_and_canonical() {
        let valid = form().validate(&settings(None)).unwrap();
        assert_eq!(valid.name, "Ana Souza");
        assert_eq!(valid.payment_method, "Pix");
    }

    #[test]
    fn test_name_too_short() {
        let bad = CheckoutForm {
            name: " A ".to_string(),
            ..form()
        };
        assert_eq!(
            bad.validate(&settings(None)),
            Err(CheckoutFormError::Length {
                field: "name",
                min: 2,
                max: 100
            })
        );
    }

    #[test]
    fn test_phone_bounds() {
        let short = CheckoutForm {
            phone: "12345".to_string(),
            ..form()
        };
        assert!(matches!(
            short.validate(&settings(None)),
            Err(CheckoutFormError::Length { field: "phone", .. })
        ));

        let long = CheckoutForm {
            phone: "1".repeat(21),
            ..form()
        };
        assert!(long.validate(&settings(None)).is_err());
    }

    #[test]
    fn test_address_counts_characters_not_bytes() {
        let accented = CheckoutForm {
            address: "ÁÉÍÓÚ".to_string(),
            ..form()
        };
        assert!(accented.validate(&settings(None)).is_ok());
    }

    #[test]
    fn test_payment_method_required_and_known() {
        let missing = CheckoutForm {
            payment_method: "  ".to_string(),
            ..form()
        };
        assert_eq!(
            missing.validate(&settings(None)),
            Err(CheckoutFormError::MissingPaymentMethod)
        );

        let unknown = CheckoutForm {
            payment_method: "Cheque".to_string(),
            ..form()
        };
        assert_eq!(
            unknown.validate(&settings(None)),
            Err(CheckoutFormError::UnsupportedPaymentMethod("Cheque".to_string()))
        );
    }

    #[test]
    fn test_pix_instructions_require_key() {
        let amount = Decimal::from(42);
        assert_eq!(PixInstructions::for_payment(&settings(None), "Pix", amount), None);

        let with_key = settings(Some("chave-aleatoria"));
        let pix = PixInstructions::for_payment(&with_key, "PIX", amount).unwrap();
        assert_eq!(pix.key, "chave-aleatoria");
        assert_eq!(pix.key_type, "random");
        assert_eq!(pix.amount, amount);

        assert_eq!(PixInstructions::for_payment(&with_key, "Dinheiro", amount), None);
    }
}

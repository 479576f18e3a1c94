//! Shipping contact details captured on an order.

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;

/// Contact and delivery fields of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ShippingDetails {
    /// Recipient name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: String,
    /// Address line 1.
    pub address_line1: String,
    /// Address line 2 (apt, suite, etc.).
    #[serde(default)]
    pub address_line2: String,
    /// City.
    pub city: String,
    /// State/province.
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub postal_code: String,
    /// Country.
    pub country: String,
}

impl ShippingDetails {
    /// Check that the required fields are present.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let required = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("address_line1", &self.address_line1),
            ("city", &self.city),
            ("country", &self.country),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CommerceError::ValidationError(format!("{field} is required")));
            }
        }

        if !self.email.contains('@') {
            return Err(CommerceError::ValidationError(format!(
                "invalid email: {}",
                self.email
            )));
        }

        Ok(())
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        [
            self.address_line1.as_str(),
            self.address_line2.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.postal_code.as_str(),
            self.country.as_str(),
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[cfg(test)]
pub(crate) fn sample_details() -> ShippingDetails {
    ShippingDetails {
        full_name: "Ana Torres".to_string(),
        email: "ana@example.com".to_string(),
        phone: "+51999888777".to_string(),
        address_line1: "Av. Larco 123".to_string(),
        address_line2: String::new(),
        city: "Lima".to_string(),
        state: "Lima".to_string(),
        postal_code: "15074".to_string(),
        country: "Peru".to_string(),
    }
}

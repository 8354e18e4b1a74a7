//! Checkout detail form: email, shipping, payment method and the
//! conditionally required billing block, validated as one atomic unit.

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::order::PaymentMethod;
use crate::store::customers;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutDetailsForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, max = 150, message = "Required."))]
    pub recipient_name: String,
    #[validate(length(min = 1, max = 255, message = "Required."))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "Required."))]
    pub city: String,
    pub payment_method: String,
    /// When false, any submitted billing values are discarded, not
    /// persisted.
    #[serde(default)]
    pub requires_invoice: bool,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub business_line: Option<String>,
    #[serde(default)]
    pub billing_address: Option<String>,
    #[serde(default)]
    pub billing_city: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidDetails {
    pub email: String,
    pub method: PaymentMethod,
    pub shipping: ShippingInput,
    pub billing: Option<BillingInput>,
}

#[derive(Debug, Clone)]
pub struct ShippingInput {
    pub recipient_name: String,
    pub address: String,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct BillingInput {
    pub tax_id: String,
    pub legal_name: String,
    pub business_line: Option<String>,
    pub address: String,
    pub city: String,
}

impl CheckoutDetailsForm {
    /// Field-level validation; billing fields are only required (and only
    /// kept) when the invoice flag is set. Business line stays optional.
    pub fn validated(self) -> Result<ValidDetails, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        let method = PaymentMethod::parse(self.payment_method.trim());
        if method.is_none() {
            errors.add("payment_method", required("Select a payment method."));
        }

        let billing = if self.requires_invoice {
            let tax_id = non_blank(&self.tax_id);
            let legal_name = non_blank(&self.legal_name);
            let address = non_blank(&self.billing_address);
            let city = non_blank(&self.billing_city);
            for (field, value) in [
                ("tax_id", &tax_id),
                ("legal_name", &legal_name),
                ("billing_address", &address),
                ("billing_city", &city),
            ] {
                if value.is_none() {
                    errors.add(field, required("Required to issue an invoice."));
                }
            }
            match (tax_id, legal_name, address, city) {
                (Some(tax_id), Some(legal_name), Some(address), Some(city)) => Some(BillingInput {
                    tax_id,
                    legal_name,
                    business_line: non_blank(&self.business_line),
                    address,
                    city,
                }),
                _ => None,
            }
        } else {
            None
        };

        match (method, errors.errors().is_empty()) {
            (Some(method), true) => Ok(ValidDetails {
                email: customers::normalize_email(&self.email),
                method,
                shipping: ShippingInput {
                    recipient_name: self.recipient_name.trim().to_string(),
                    address: self.address.trim().to_string(),
                    city: self.city.trim().to_string(),
                },
                billing,
            }),
            _ => Err(errors),
        }
    }
}

fn required(message: &'static str) -> ValidationError {
    let mut e = ValidationError::new("required");
    e.message = Some(message.into());
    e
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_form() -> CheckoutDetailsForm {
        CheckoutDetailsForm {
            email: "Ana@Example.com".into(),
            recipient_name: "Ana Lopez".into(),
            address: "Av. Siempre Viva 742".into(),
            city: "Santiago".into(),
            payment_method: "webpay".into(),
            requires_invoice: false,
            tax_id: None,
            legal_name: None,
            business_line: None,
            billing_address: None,
            billing_city: None,
        }
    }

    #[test]
    fn test_valid_form_normalizes_email() {
        let details = base_form().validated().unwrap();
        assert_eq!(details.email, "ana@example.com");
        assert_eq!(details.method, PaymentMethod::Webpay);
        assert!(details.billing.is_none());
    }

    #[test]
    fn test_unknown_method_is_field_error() {
        let mut form = base_form();
        form.payment_method = "cash".into();
        let errors = form.validated().unwrap_err();
        assert!(errors.errors().contains_key("payment_method"));
    }

    #[test]
    fn test_billing_discarded_without_invoice_flag() {
        let mut form = base_form();
        form.tax_id = Some("76.123.456-0".into());
        form.legal_name = Some("Comercial Ana SpA".into());
        let details = form.validated().unwrap();
        assert!(details.billing.is_none());
    }

    #[test]
    fn test_invoice_flag_requires_billing_fields() {
        let mut form = base_form();
        form.requires_invoice = true;
        form.tax_id = Some("76.123.456-0".into());
        let errors = form.validated().unwrap_err();
        assert!(errors.errors().contains_key("legal_name"));
        assert!(errors.errors().contains_key("billing_address"));
        assert!(errors.errors().contains_key("billing_city"));
        assert!(!errors.errors().contains_key("tax_id"));
    }

    #[test]
    fn test_invoice_flag_with_full_billing() {
        let mut form = base_form();
        form.requires_invoice = true;
        form.tax_id = Some("76.123.456-0".into());
        form.legal_name = Some("Comercial Ana SpA".into());
        form.billing_address = Some("Moneda 1025".into());
        form.billing_city = Some("Santiago".into());
        let details = form.validated().unwrap();
        let billing = details.billing.unwrap();
        assert_eq!(billing.legal_name, "Comercial Ana SpA");
        assert!(billing.business_line.is_none());
    }

    #[test]
    fn test_bad_email_and_blank_city() {
        let mut form = base_form();
        form.email = "not-an-email".into();
        form.city = "".into();
        let errors = form.validated().unwrap_err();
        assert!(errors.errors().contains_key("email"));
        assert!(errors.errors().contains_key("city"));
    }
}

use crate::error::Res;
use crate::model::PricedLine;
use anyhow::bail;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Default validity printed on a new quotation.
pub const DEFAULT_VALIDITY: &str = "30 Days";

/// Date format used for `quotation_date`.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// The single quotation record being edited. Every field is text exactly as typed; numbers are
/// only interpreted when the line is priced.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuotationInput {
    pub quotation_no: String,
    pub quotation_date: String,
    pub validity: String,
    pub customer_name: String,
    pub company_name: String,
    pub phone: String,
    pub email: String,
    /// Free text, one address line per text line.
    pub billing_address: String,
    /// Free text. When blank the billing address is used.
    pub shipping_address: String,
    pub item_name: String,
    pub item_description: String,
    pub rate: String,
    pub qty: String,
    pub discount_perc: String,
}

impl QuotationInput {
    /// A fresh quotation as shown when the builder opens: dated today, a quantity of one and the
    /// default validity.
    pub fn new() -> Self {
        Self {
            quotation_date: Local::now().format(DATE_FORMAT).to_string(),
            validity: DEFAULT_VALIDITY.to_string(),
            qty: "1".to_string(),
            ..Self::default()
        }
    }

    /// Returns a new record equal to this one with `field` replaced by `value`.
    pub fn with_field(&self, field: QuotationField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        *next.field_mut(field) = value.into();
        next
    }

    /// Given the camelCase `name` of a field, returns a new record with it replaced by `value`.
    pub fn with_named_field(&self, name: &str, value: impl Into<String>) -> Res<Self> {
        let field = QuotationField::from_name(name)?;
        Ok(self.with_field(field, value))
    }

    pub fn get(&self, field: QuotationField) -> &str {
        match field {
            QuotationField::QuotationNo => &self.quotation_no,
            QuotationField::QuotationDate => &self.quotation_date,
            QuotationField::Validity => &self.validity,
            QuotationField::CustomerName => &self.customer_name,
            QuotationField::CompanyName => &self.company_name,
            QuotationField::Phone => &self.phone,
            QuotationField::Email => &self.email,
            QuotationField::BillingAddress => &self.billing_address,
            QuotationField::ShippingAddress => &self.shipping_address,
            QuotationField::ItemName => &self.item_name,
            QuotationField::ItemDescription => &self.item_description,
            QuotationField::Rate => &self.rate,
            QuotationField::Qty => &self.qty,
            QuotationField::DiscountPerc => &self.discount_perc,
        }
    }

    fn field_mut(&mut self, field: QuotationField) -> &mut String {
        match field {
            QuotationField::QuotationNo => &mut self.quotation_no,
            QuotationField::QuotationDate => &mut self.quotation_date,
            QuotationField::Validity => &mut self.validity,
            QuotationField::CustomerName => &mut self.customer_name,
            QuotationField::CompanyName => &mut self.company_name,
            QuotationField::Phone => &mut self.phone,
            QuotationField::Email => &mut self.email,
            QuotationField::BillingAddress => &mut self.billing_address,
            QuotationField::ShippingAddress => &mut self.shipping_address,
            QuotationField::ItemName => &mut self.item_name,
            QuotationField::ItemDescription => &mut self.item_description,
            QuotationField::Rate => &mut self.rate,
            QuotationField::Qty => &mut self.qty,
            QuotationField::DiscountPerc => &mut self.discount_perc,
        }
    }

    /// Prices the line item from the current text of `rate`, `qty` and `discount_perc`.
    pub fn priced_line(&self) -> PricedLine {
        PricedLine::from_text(&self.rate, &self.qty, &self.discount_perc)
    }

    /// The shipping address, or the billing address when no shipping address was entered.
    pub fn effective_shipping_address(&self) -> &str {
        if self.shipping_address.trim().is_empty() {
            &self.billing_address
        } else {
            &self.shipping_address
        }
    }
}

/// The editable fields of a `QuotationInput`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuotationField {
    QuotationNo,
    QuotationDate,
    Validity,
    CustomerName,
    CompanyName,
    Phone,
    Email,
    BillingAddress,
    ShippingAddress,
    ItemName,
    ItemDescription,
    Rate,
    Qty,
    DiscountPerc,
}

serde_plain::derive_display_from_serialize!(QuotationField);
serde_plain::derive_fromstr_from_deserialize!(QuotationField);

impl QuotationField {
    pub fn from_name(name: &str) -> Res<Self> {
        match name.parse::<QuotationField>() {
            Ok(field) => Ok(field),
            Err(_) => bail!("'{name}' is not a quotation field"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_defaults() {
        let q = QuotationInput::new();
        assert_eq!(q.validity, DEFAULT_VALIDITY);
        assert_eq!(q.qty, "1");
        assert_eq!(q.quotation_date.len(), 10);
        assert!(q.customer_name.is_empty());
    }

    #[test]
    fn test_with_field_replaces_whole_record() {
        let original = QuotationInput::default();
        let next = original.with_field(QuotationField::Rate, "250");
        assert!(original.rate.is_empty());
        assert_eq!(next.rate, "250");
        assert_eq!(next.get(QuotationField::Rate), "250");
    }

    #[test]
    fn test_with_named_field() {
        let q = QuotationInput::default()
            .with_named_field("discountPerc", "5")
            .unwrap();
        assert_eq!(q.discount_perc, "5");
        let err = QuotationInput::default()
            .with_named_field("colour", "blue")
            .unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_field_names_round_trip() {
        assert_eq!(QuotationField::BillingAddress.to_string(), "billingAddress");
        assert_eq!(
            "quotationNo".parse::<QuotationField>().unwrap(),
            QuotationField::QuotationNo
        );
    }

    #[test]
    fn test_effective_shipping_address() {
        let q = QuotationInput {
            billing_address: "12 MG Road\nPune".to_string(),
            shipping_address: "  ".to_string(),
            ..QuotationInput::default()
        };
        assert_eq!(q.effective_shipping_address(), "12 MG Road\nPune");
        let q = q.with_field(QuotationField::ShippingAddress, "Plot 4, MIDC");
        assert_eq!(q.effective_shipping_address(), "Plot 4, MIDC");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{ "customerName": "R. Iyer", "rate": "1000" }"#;
        let q: QuotationInput = serde_json::from_str(json).unwrap();
        assert_eq!(q.customer_name, "R. Iyer");
        assert_eq!(q.rate, "1000");
        assert!(q.qty.is_empty());
    }

    #[test]
    fn test_priced_line_uses_text_fields() {
        let q = QuotationInput::new()
            .with_field(QuotationField::Rate, "1000")
            .with_field(QuotationField::Qty, "2")
            .with_field(QuotationField::DiscountPerc, "10");
        assert_eq!(q.priced_line().rounded_rupees(), 2124);
    }
}

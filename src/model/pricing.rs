//! Prices the single line item of a quotation: discount, GST, rounding and round off.

use crate::model::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GST levied on the taxable value, in percent.
pub const GST_PERCENT: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The derived values for one priced line. Nothing here is stored; it is recomputed from the
/// quotation text fields whenever they change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub rate: Decimal,
    pub qty: Decimal,
    pub discount_perc: Decimal,
    /// `rate × qty`, before any discount.
    pub gross: Decimal,
    pub discounted_rate: Decimal,
    pub taxable_value: Decimal,
    pub gst: Decimal,
    /// `taxable_value + gst`, unrounded.
    pub raw_total: Decimal,
    /// `raw_total` rounded to the nearest whole rupee, halves rounding up.
    pub rounded_total: Decimal,
    /// `rounded_total - raw_total`; always less than one in magnitude.
    pub round_off: Decimal,
    pub total_discount: Decimal,
}

impl PricedLine {
    /// Prices a line. Arithmetic that would overflow a `Decimal` yields zero instead of panicking.
    pub fn compute(rate: Decimal, qty: Decimal, discount_perc: Decimal) -> Self {
        let gross = mul(rate, qty);
        let discount_factor = HUNDRED
            .checked_sub(discount_perc)
            .and_then(|d| d.checked_div(HUNDRED))
            .unwrap_or_default();
        let discounted_rate = mul(rate, discount_factor);
        let taxable_value = mul(discounted_rate, qty);
        let gst = mul(taxable_value, GST_PERCENT)
            .checked_div(HUNDRED)
            .unwrap_or_default();
        let raw_total = add(taxable_value, gst);
        let rounded_total = round_half_up(raw_total);
        let round_off = sub(rounded_total, raw_total);
        let total_discount = sub(gross, taxable_value);

        Self {
            rate,
            qty,
            discount_perc,
            gross,
            discounted_rate,
            taxable_value,
            gst,
            raw_total,
            rounded_total,
            round_off,
            total_discount,
        }
    }

    /// Prices a line from the text typed into the form. Text that does not parse counts as zero.
    pub fn from_text(rate: &str, qty: &str, discount_perc: &str) -> Self {
        Self::compute(
            Amount::parse_or_zero(rate).value(),
            Amount::parse_or_zero(qty).value(),
            Amount::parse_or_zero(discount_perc).value(),
        )
    }

    /// The rounded total as a whole number of rupees, saturating at the `i64` range.
    pub fn rounded_rupees(&self) -> i64 {
        use rust_decimal::prelude::ToPrimitive;
        self.rounded_total.to_i64().unwrap_or_else(|| {
            if self.rounded_total.is_sign_negative() {
                i64::MIN
            } else {
                i64::MAX
            }
        })
    }
}

fn mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or_default()
}

fn add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_default()
}

fn sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b).unwrap_or_default()
}

/// Rounds to the nearest integer with halves going toward positive infinity.
fn round_half_up(value: Decimal) -> Decimal {
    value
        .checked_add(Decimal::new(5, 1))
        .map(|v| v.floor())
        .unwrap_or_else(|| value.round())
}

//! Renders a quotation as a fixed A4 HTML document, ready to be handed to a print-to-PDF service.
//!
//! Rendering is a pure function of its inputs: the same quotation, image references and branch
//! label always produce byte-identical HTML.

use crate::model::{amount_in_words, Amount, PricedLine, QuotationInput, GST_PERCENT};
use rust_decimal::Decimal;

/// Builds the quotation document.
///
/// # Arguments
/// - `input` - The quotation as typed. Numbers that do not parse are priced as zero.
/// - `logo_ref` - URI of the company logo, embedded by reference.
/// - `signature_ref` - URI of the authorised signature, embedded by reference.
/// - `branch_label` - The issuing branch, printed in the header and above the signature.
pub fn assemble(
    input: &QuotationInput,
    logo_ref: &str,
    signature_ref: &str,
    branch_label: &str,
) -> String {
    let line = input.priced_line();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8"/>
<title>Quotation {quotation_no}</title>
<style>
@page {{ size: A4; margin: 12mm; }}
body {{ font-family: Arial, Helvetica, sans-serif; font-size: 11px; color: #222; margin: 0; }}
.header {{ display: flex; justify-content: space-between; align-items: center; border-bottom: 2px solid #1f3a68; padding-bottom: 8px; }}
.header img {{ max-height: 64px; }}
.header h1 {{ margin: 0; font-size: 20px; color: #1f3a68; text-align: right; }}
.branch {{ text-align: right; font-size: 12px; }}
.meta {{ display: flex; justify-content: space-between; margin: 10px 0; }}
.parties {{ display: flex; gap: 16px; margin-bottom: 12px; }}
.party {{ flex: 1; border: 1px solid #ccc; padding: 8px; }}
.party h3 {{ margin: 0 0 4px 0; font-size: 12px; text-transform: uppercase; color: #1f3a68; }}
table {{ width: 100%; border-collapse: collapse; }}
th, td {{ border: 1px solid #ccc; padding: 6px; }}
th {{ background: #e8edf5; text-align: left; }}
td.num, th.num {{ text-align: right; }}
.totals {{ width: 45%; margin-left: auto; margin-top: 8px; }}
.totals td {{ border: none; padding: 3px 6px; }}
.totals tr.grand td {{ border-top: 2px solid #1f3a68; font-weight: bold; font-size: 13px; }}
.words {{ margin-top: 10px; font-style: italic; }}
.signature {{ margin-top: 32px; text-align: right; }}
.signature img {{ max-height: 56px; }}
</style>
</head>
<body>
<div class="header">
<img src="{logo_ref}" alt="Logo"/>
<div><h1>QUOTATION</h1><div class="branch">{branch_label}</div></div>
</div>
<div class="meta">
<div><strong>Quotation No:</strong> {quotation_no}</div>
<div><strong>Date:</strong> {quotation_date}</div>
<div><strong>Valid For:</strong> {validity}</div>
</div>
<div class="parties">
<div class="party">
<h3>Bill To</h3>
<div><strong>{customer_name}</strong></div>
<div>{company_name}</div>
<div>{billing_address}</div>
<div>Phone: {phone}</div>
<div>Email: {email}</div>
</div>
<div class="party">
<h3>Ship To</h3>
<div><strong>{customer_name}</strong></div>
<div>{company_name}</div>
<div>{shipping_address}</div>
</div>
</div>
<table>
<tr><th>#</th><th>Item &amp; Description</th><th class="num">Rate</th><th class="num">Qty</th><th class="num">Disc %</th><th class="num">Taxable Value</th><th class="num">GST {gst_percent}%</th><th class="num">Amount</th></tr>
<tr><td>1</td><td><strong>{item_name}</strong><br/>{item_description}</td><td class="num">{rate}</td><td class="num">{qty}</td><td class="num">{discount_perc}</td><td class="num">{taxable_value}</td><td class="num">{gst}</td><td class="num">{raw_total}</td></tr>
</table>
<table class="totals">
<tr><td>Total Before Discount</td><td class="num">{gross}</td></tr>
<tr><td>Total Discount</td><td class="num">{total_discount}</td></tr>
<tr><td>Taxable Value</td><td class="num">{taxable_value}</td></tr>
<tr><td>GST @ {gst_percent}%</td><td class="num">{gst}</td></tr>
<tr><td>Round Off</td><td class="num">{round_off}</td></tr>
<tr class="grand"><td>Grand Total</td><td class="num">{rounded_total}</td></tr>
</table>
<div class="words">{words}</div>
<div class="signature">
<div>For {branch_label}</div>
<img src="{signature_ref}" alt="Signature"/>
<div>Authorised Signatory</div>
</div>
</body>
</html>
"#,
        quotation_no = esc(&input.quotation_no),
        quotation_date = esc(&input.quotation_date),
        validity = esc(&input.validity),
        logo_ref = esc(logo_ref),
        signature_ref = esc(signature_ref),
        branch_label = esc(branch_label),
        customer_name = esc(&input.customer_name),
        company_name = esc(&input.company_name),
        phone = esc(&input.phone),
        email = esc(&input.email),
        billing_address = multiline(&input.billing_address),
        shipping_address = multiline(input.effective_shipping_address()),
        item_name = esc(&input.item_name),
        item_description = multiline(&input.item_description),
        gst_percent = GST_PERCENT,
        rate = money(line.rate),
        qty = line.qty.normalize(),
        discount_perc = line.discount_perc.normalize(),
        taxable_value = money(line.taxable_value),
        gst = money(line.gst),
        raw_total = money(line.raw_total),
        gross = money(line.gross),
        total_discount = money(line.total_discount),
        round_off = money(line.round_off),
        rounded_total = money(line.rounded_total),
        words = esc(&amount_in_words(line.rounded_rupees())),
    )
}

/// Prices `input` and returns the line along with the document, for callers that show both.
pub fn assemble_priced(
    input: &QuotationInput,
    logo_ref: &str,
    signature_ref: &str,
    branch_label: &str,
) -> (PricedLine, String) {
    (
        input.priced_line(),
        assemble(input, logo_ref, signature_ref, branch_label),
    )
}

fn money(value: Decimal) -> String {
    Amount::new(value).to_string()
}

/// Escapes text for HTML and turns each line break into `<br/>`.
fn multiline(s: &str) -> String {
    s.trim()
        .lines()
        .map(esc)
        .collect::<Vec<_>>()
        .join("<br/>")
}

fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuotationField;

    const LOGO: &str = "file:///home/fs/assets/logo.png";
    const SIGNATURE: &str = "file:///home/fs/assets/signature.png";

    fn sample() -> QuotationInput {
        QuotationInput {
            quotation_no: "QT-0042".to_string(),
            quotation_date: "17-10-2026".to_string(),
            validity: "30 Days".to_string(),
            customer_name: "Anita Desai".to_string(),
            company_name: "Desai Cold Storage".to_string(),
            phone: "9800011122".to_string(),
            email: "anita@example.com".to_string(),
            billing_address: "14 Station Road\nNashik\n422001".to_string(),
            shipping_address: String::new(),
            item_name: "Scroll Compressor".to_string(),
            item_description: "5 TR, R407C".to_string(),
            rate: "150000".to_string(),
            qty: "1".to_string(),
            discount_perc: "10".to_string(),
        }
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let a = assemble(&sample(), LOGO, SIGNATURE, "Nashik Branch");
        let b = assemble(&sample(), LOGO, SIGNATURE, "Nashik Branch");
        assert_eq!(a, b);
    }

    #[test]
    fn test_assemble_contains_pricing() {
        let html = assemble(&sample(), LOGO, SIGNATURE, "Nashik Branch");
        // 150000 less 10% = 135000, GST 24300, total 159300
        assert!(html.contains("<td class=\"num\">135000.00</td>"));
        assert!(html.contains("<td class=\"num\">24300.00</td>"));
        assert!(html.contains("<td class=\"num\">15000.00</td>"));
        assert!(html.contains("Grand Total</td><td class=\"num\">159300.00</td>"));
        assert!(html.contains("Rupees One Lakh Fifty Nine Thousand Three Hundred Only"));
        assert!(html.contains("GST @ 18%"));
    }

    #[test]
    fn test_assemble_embeds_images_by_reference() {
        let html = assemble(&sample(), LOGO, SIGNATURE, "Nashik Branch");
        assert!(html.contains(&format!("<img src=\"{LOGO}\"")));
        assert!(html.contains(&format!("<img src=\"{SIGNATURE}\"")));
    }

    #[test]
    fn test_addresses_break_lines_and_default_shipping() {
        let html = assemble(&sample(), LOGO, SIGNATURE, "Nashik Branch");
        let billing = "14 Station Road<br/>Nashik<br/>422001";
        assert_eq!(html.matches(billing).count(), 2);

        let q = sample().with_field(QuotationField::ShippingAddress, "Gate 3\r\nMIDC Ambad");
        let html = assemble(&q, LOGO, SIGNATURE, "Nashik Branch");
        assert_eq!(html.matches(billing).count(), 1);
        assert!(html.contains("Gate 3<br/>MIDC Ambad"));
    }

    #[test]
    fn test_text_is_escaped() {
        let q = sample().with_field(QuotationField::CompanyName, "Shah & Sons <Pvt>");
        let html = assemble(&q, LOGO, SIGNATURE, "Nashik Branch");
        assert!(html.contains("Shah &amp; Sons &lt;Pvt&gt;"));
        assert!(!html.contains("<Pvt>"));
    }

    #[test]
    fn test_malformed_numbers_render_as_zero() {
        let q = sample()
            .with_field(QuotationField::Rate, "lots")
            .with_field(QuotationField::Qty, "");
        let html = assemble(&q, LOGO, SIGNATURE, "Nashik Branch");
        assert!(html.contains("Grand Total</td><td class=\"num\">0.00</td>"));
        assert!(html.contains("Rupees Zero Only"));
    }

    #[test]
    fn test_round_off_row() {
        let q = sample()
            .with_field(QuotationField::Rate, "99.99")
            .with_field(QuotationField::DiscountPerc, "0");
        let (line, html) = assemble_priced(&q, LOGO, SIGNATURE, "Nashik Branch");
        assert_eq!(line.rounded_rupees(), 118);
        assert!(html.contains("Round Off</td><td class=\"num\">0.01</td>"));
        assert!(html.contains("Grand Total</td><td class=\"num\">118.00</td>"));
    }
}

use crate::commands::Out;
use crate::model::{
    amount_in_words, number_to_words, Amount, AmountFormat, PricedLine, GST_PERCENT,
};
use rust_decimal::Decimal;

const RUPEES: AmountFormat = AmountFormat::new(true, true);

/// Prices a single line from the text given for rate, quantity and discount. Text that is not a
/// number counts as zero, so this never fails.
pub fn price(rate: &str, qty: &str, discount: &str) -> Out<PricedLine> {
    let line = PricedLine::from_text(rate, qty, discount);
    let message = format!(
        "Gross {}, discount {}, taxable value {}, GST @ {}% {}, round off {}, grand total {} ({})",
        rupees(line.gross),
        rupees(line.total_discount),
        rupees(line.taxable_value),
        GST_PERCENT,
        rupees(line.gst),
        rupees(line.round_off),
        rupees(line.rounded_total),
        amount_in_words(line.rounded_rupees()),
    );
    Out::new(message, line)
}

fn rupees(value: Decimal) -> Amount {
    Amount::new_with_format(value, RUPEES)
}

/// Spells out `number` using the Indian numbering scale.
pub fn words(number: u64) -> Out<String> {
    let words = number_to_words(number);
    Out::new(words.clone(), words)
}

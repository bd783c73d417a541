//! Spells out whole numbers in English using the Indian numbering scale (lakh and crore).

const ONES: [&str; 20] = [
    "",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const THOUSAND: u64 = 1_000;
const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// Converts `n` to words, e.g. `150000` -> `One Lakh Fifty Thousand`.
///
/// Amounts of a hundred crore and above keep counting in crore: `1_000_000_000` is
/// `One Hundred Crore`.
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    spell(n)
}

/// The phrase printed under the grand total of a quotation.
pub fn amount_in_words(rupees: i64) -> String {
    let words = number_to_words(rupees.unsigned_abs());
    if rupees < 0 {
        format!("Rupees Minus {words} Only")
    } else {
        format!("Rupees {words} Only")
    }
}

fn spell(n: u64) -> String {
    match n {
        0 => String::new(),
        1..=19 => ONES[n as usize].to_string(),
        20..=99 => join(TENS[(n / 10) as usize], spell(n % 10)),
        100..=999 => tier(n, 100, "Hundred"),
        1_000..=99_999 => tier(n, THOUSAND, "Thousand"),
        100_000..=9_999_999 => tier(n, LAKH, "Lakh"),
        _ => tier(n, CRORE, "Crore"),
    }
}

/// Renders `n / unit` followed by the unit name, then the remainder.
fn tier(n: u64, unit: u64, name: &str) -> String {
    let head = format!("{} {name}", spell(n / unit));
    join(&head, spell(n % unit))
}

fn join(head: &str, rest: String) -> String {
    if rest.is_empty() {
        head.to_string()
    } else {
        format!("{head} {rest}")
    }
}

//! Types that represent the core data model: the quotation and its priced line, and the
//! field-visit survey form.
mod amount;
mod field_visit;
mod pricing;
mod quotation;
mod words;

pub use amount::{Amount, AmountError, AmountFormat};
pub use field_visit::{
    Attachments, FieldVisitForm, FieldVisitRecord, FormField, Priority, Step, MAX_PHOTOS,
};
pub use pricing::{PricedLine, GST_PERCENT};
pub use quotation::{QuotationField, QuotationInput, DATE_FORMAT, DEFAULT_VALIDITY};
pub use words::{amount_in_words, number_to_words};

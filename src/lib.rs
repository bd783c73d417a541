pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod document;
mod error;
pub mod model;
mod utils;
pub mod wizard;

#[cfg(test)]
mod test;

pub use api::{FieldVisitService, Mode, Progress, SubmissionReceipt};
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use wizard::Wizard;

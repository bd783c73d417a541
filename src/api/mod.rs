//! The field-visit persistence service.
//!
//! The `FieldVisitService` trait is the seam between the wizard and whatever stores visits. The
//! production implementation talks HTTP to the configured service; the test implementation keeps
//! everything in memory so that the whole program can be exercised without a network.

mod http_service;
mod test_service;
mod token;

use crate::error::Res;
use crate::model::FieldVisitRecord;
use crate::Config;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

pub(crate) use http_service::HttpFieldVisitService;
pub use test_service::{TestFieldVisitService, TestServiceState};
pub(crate) use token::TokenFile;

/// Set this environment variable to a non-empty value to use the in-memory service.
pub const TEST_MODE_ENV: &str = "FIELDSALES_IN_TEST_MODE";

/// Stores a field visit and its photos.
#[async_trait::async_trait]
pub trait FieldVisitService {
    /// Creates the visit from `record`, uploads each of `photos`, and reports percentages through
    /// `progress` as the work completes. Resolves once everything is stored, or fails with the
    /// message the service gave.
    async fn create_field_visit(
        &mut self,
        record: &FieldVisitRecord,
        photos: &[String],
        progress: Progress,
    ) -> Res<SubmissionReceipt>;
}

/// What the service hands back for a stored visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// The identifier the service assigned to the visit.
    pub id: String,
    /// How many photos were stored with it.
    pub photos: usize,
}

/// Which `FieldVisitService` implementation to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Talk to the configured HTTP service.
    #[default]
    Remote,
    /// Use the in-memory service.
    Test,
}

impl Mode {
    /// `Mode::Test` when `FIELDSALES_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Remote`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Remote,
        }
    }
}

/// Creates the `FieldVisitService` for `mode`.
pub(crate) async fn service(config: &Config, mode: Mode) -> Res<Box<dyn FieldVisitService + Send>> {
    match mode {
        Mode::Test => {
            trace!("Using the in-memory field-visit service");
            Ok(Box::new(TestFieldVisitService::new(config.service_url())))
        }
        Mode::Remote => {
            let token = TokenFile::load_optional(config.token_path()).await?;
            let service = HttpFieldVisitService::new(
                config.service_url(),
                token.map(|t| t.token().to_string()),
            )?;
            Ok(Box::new(service))
        }
    }
}

/// Reports submission progress as whole percentages.
///
/// Percentages only ever go up: values above 100 are clamped and a value lower than one already
/// reported is dropped. Reporting never fails; if nobody is listening the value is discarded.
#[derive(Debug, Default)]
pub struct Progress {
    sender: Option<UnboundedSender<u8>>,
    last: Option<u8>,
}

impl Progress {
    pub fn new(sender: UnboundedSender<u8>) -> Self {
        Self {
            sender: Some(sender),
            last: None,
        }
    }

    /// A `Progress` that reports to nobody.
    pub fn discard() -> Self {
        Self::default()
    }

    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent < last) {
            return;
        }
        self.last = Some(percent);
        if let Some(sender) = &self.sender {
            let _ = sender.send(percent);
        }
    }

    /// Reports `done` of `total` steps.
    pub fn report_steps(&mut self, done: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            (done.min(total) * 100 / total) as u8
        };
        self.report(percent);
    }

    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

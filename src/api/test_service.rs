//! Implements the `FieldVisitService` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a field-visit service.

use crate::api::{FieldVisitService, Progress, SubmissionReceipt};
use crate::error::Res;
use crate::model::FieldVisitRecord;
use anyhow::bail;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

/// A visit held by the in-memory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVisit {
    pub id: String,
    pub record: FieldVisitRecord,
    pub photos: Vec<String>,
}

/// Everything the in-memory service knows for one service URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestServiceState {
    pub visits: Vec<StoredVisit>,
    /// When set, every submission is rejected with this message.
    pub reject_with: Option<String>,
}

/// State is process wide and keyed by service URL so that separate `TestFieldVisitService`
/// instances for the same URL see the same visits, like separate clients of one server would.
fn states() -> MutexGuard<'static, HashMap<String, TestServiceState>> {
    static STATES: OnceLock<Mutex<HashMap<String, TestServiceState>>> = OnceLock::new();
    STATES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An implementation of `FieldVisitService` that stores visits in memory.
#[derive(Debug, Clone)]
pub struct TestFieldVisitService {
    key: String,
}

impl TestFieldVisitService {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            key: service_url.into(),
        }
    }

    pub fn get_state(&self) -> TestServiceState {
        states().get(&self.key).cloned().unwrap_or_default()
    }

    pub fn set_state(&self, state: TestServiceState) {
        states().insert(self.key.clone(), state);
    }

    /// Makes every following submission fail with `message`, or succeed again with `None`.
    pub fn reject_with(&self, message: Option<&str>) {
        let mut state = self.get_state();
        state.reject_with = message.map(str::to_string);
        self.set_state(state);
    }
}

#[async_trait::async_trait]
impl FieldVisitService for TestFieldVisitService {
    async fn create_field_visit(
        &mut self,
        record: &FieldVisitRecord,
        photos: &[String],
        mut progress: Progress,
    ) -> Res<SubmissionReceipt> {
        let mut states = states();
        let state = states.entry(self.key.clone()).or_default();
        if let Some(message) = &state.reject_with {
            bail!("{message}");
        }

        let total = 1 + photos.len();
        progress.report(0);
        let id = Uuid::new_v4().to_string();
        progress.report_steps(1, total);
        for done in 0..photos.len() {
            progress.report_steps(done + 2, total);
        }

        state.visits.push(StoredVisit {
            id: id.clone(),
            record: record.clone(),
            photos: photos.to_vec(),
        });
        Ok(SubmissionReceipt {
            id,
            photos: photos.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldVisitForm;
    use tokio::sync::mpsc::unbounded_channel;

    fn unique_url() -> String {
        format!("https://test.invalid/{}", Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_stores_visit_and_reports_progress() {
        let mut service = TestFieldVisitService::new(unique_url());
        let (tx, mut rx) = unbounded_channel();
        let photos = vec!["a.jpg".to_string(), "b.jpg".to_string(), "c.jpg".to_string()];
        let receipt = service
            .create_field_visit(&FieldVisitForm::default().to_record(), &photos, Progress::new(tx))
            .await
            .unwrap();
        assert_eq!(receipt.photos, 3);

        let mut seen = Vec::new();
        while let Some(p) = rx.recv().await {
            seen.push(p);
        }
        assert_eq!(seen, vec![0, 25, 50, 75, 100]);

        let state = service.get_state();
        assert_eq!(state.visits.len(), 1);
        assert_eq!(state.visits[0].id, receipt.id);
        assert_eq!(state.visits[0].photos, photos);
    }

    #[tokio::test]
    async fn test_rejects_when_configured() {
        let mut service = TestFieldVisitService::new(unique_url());
        service.reject_with(Some("Service unavailable"));
        let err = service
            .create_field_visit(&FieldVisitForm::default().to_record(), &[], Progress::discard())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Service unavailable");
        assert!(service.get_state().visits.is_empty());
    }

    #[test]
    fn test_instances_share_state_by_url() {
        let url = unique_url();
        let a = TestFieldVisitService::new(&url);
        let b = TestFieldVisitService::new(&url);
        a.reject_with(Some("down"));
        assert_eq!(b.get_state().reject_with.as_deref(), Some("down"));
    }
}

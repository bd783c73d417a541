//! The three-step field-visit wizard: moving between steps, attaching photos, and submitting.

use crate::api::{FieldVisitService, Progress, SubmissionReceipt};
use crate::error::{ErrorType, IntoResult, Result};
use crate::model::{Attachments, FieldVisitForm, FormField, Step};
use tracing::{debug, info, warn};

/// Holds the form being filled in, the step on screen, the attached photos and whether a
/// submission is running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wizard {
    form: FieldVisitForm,
    step: Step,
    photos: Attachments,
    submitting: bool,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the wizard on step one with an already filled in `form`.
    pub fn with_form(form: FieldVisitForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn form(&self) -> &FieldVisitForm {
        &self.form
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn photos(&self) -> &Attachments {
        &self.photos
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Replaces the form with one where `field` holds `value`.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form = self.form.with_field(field, value);
    }

    /// Validates the current step and moves to the next one. On failure the step does not
    /// change. Advancing from the last step is a no-op once it validates.
    pub fn next(&mut self) -> Result<Step> {
        self.form.validate_step(self.step)?;
        if let Some(next) = self.step.next() {
            debug!("Advancing from step {} to step {}", self.step.number(), next.number());
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves to the previous step without validating.
    pub fn back(&mut self) -> Step {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// Attaches picked photos, truncating to the free slots. Returns how many were attached.
    pub fn add_photos<I, S>(&mut self, uris: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let added = self.photos.add(uris);
        debug!("Attached {added} photo(s), {} slot(s) left", self.photos.remaining());
        added
    }

    pub fn remove_photo(&mut self, index: usize) -> Option<String> {
        self.photos.remove(index)
    }

    /// Validates every step, then sends the visit and its photos to `service`.
    ///
    /// On success the wizard starts over with an empty form. On failure the form and photos are
    /// kept so the user can submit again; nothing is queued or retried automatically.
    pub async fn submit(
        &mut self,
        service: &mut (dyn FieldVisitService + Send),
        progress: Progress,
    ) -> Result<SubmissionReceipt> {
        self.form.validate()?;
        let record = self.form.to_record();

        self.submitting = true;
        let result = service
            .create_field_visit(&record, self.photos.uris(), progress)
            .await;
        self.submitting = false;

        match result {
            Ok(receipt) => {
                info!("Field visit submitted with id {}", receipt.id);
                *self = Self::new();
                Ok(receipt)
            }
            Err(e) => {
                warn!("Field visit submission failed: {e:#}");
                Err(e).pub_result(ErrorType::Submission)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestFieldVisitService;
    use crate::model::MAX_PHOTOS;
    use tokio::sync::mpsc::unbounded_channel;
    use uuid::Uuid;

    fn filled_wizard() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.set_field(FormField::ClientCompanyName, "Konkan Agro");
        wizard.set_field(FormField::SiteAddress, "NH66, Ratnagiri");
        wizard.set_field(FormField::ContactPersonName, "P. Naik");
        wizard.set_field(FormField::MobileNumber, "9923000000");
        wizard.set_field(FormField::RequirementDetails, "Cold room 20 MT");
        wizard.set_field(FormField::InterestLevel, "Hot");
        wizard.set_field(FormField::SiteAssessmentRating, "Good");
        wizard
    }

    fn service() -> TestFieldVisitService {
        TestFieldVisitService::new(format!("https://test.invalid/{}", Uuid::new_v4()))
    }

    #[test]
    fn test_next_blocked_on_empty_company_name() {
        let mut wizard = filled_wizard();
        wizard.set_field(FormField::ClientCompanyName, "");
        let err = wizard.next().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.message().contains("Client company name"));
        assert_eq!(wizard.step(), Step::ClientSite);
    }

    #[test]
    fn test_next_unblocked_once_required_fields_filled() {
        let mut wizard = Wizard::new();
        assert!(wizard.next().is_err());
        wizard.set_field(FormField::ClientCompanyName, "Konkan Agro");
        wizard.set_field(FormField::SiteAddress, "NH66, Ratnagiri");
        wizard.set_field(FormField::ContactPersonName, "P. Naik");
        assert!(wizard.next().is_err());
        wizard.set_field(FormField::MobileNumber, "9923000000");
        assert_eq!(wizard.next().unwrap(), Step::SiteAssessment);
    }

    #[test]
    fn test_walk_through_and_back() {
        let mut wizard = filled_wizard();
        assert_eq!(wizard.next().unwrap(), Step::SiteAssessment);
        assert_eq!(wizard.next().unwrap(), Step::FollowUp);
        assert_eq!(wizard.next().unwrap(), Step::FollowUp);
        assert_eq!(wizard.back(), Step::SiteAssessment);
        assert_eq!(wizard.back(), Step::ClientSite);
        assert_eq!(wizard.back(), Step::ClientSite);
    }

    #[test]
    fn test_add_photos_truncates() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.add_photos((0..5).map(|i| format!("{i}.jpg"))), 5);
        assert_eq!(wizard.add_photos((5..12).map(|i| format!("{i}.jpg"))), 3);
        assert_eq!(wizard.photos().len(), MAX_PHOTOS);
        assert_eq!(wizard.remove_photo(7).as_deref(), Some("7.jpg"));
    }

    #[tokio::test]
    async fn test_submit_success_resets_wizard() {
        let mut service = service();
        let mut wizard = filled_wizard();
        wizard.add_photos(["a.jpg", "b.jpg"]);
        let (tx, mut rx) = unbounded_channel();

        let receipt = wizard.submit(&mut service, Progress::new(tx)).await.unwrap();
        assert_eq!(receipt.photos, 2);
        assert_eq!(wizard, Wizard::new());

        let mut last = 0;
        while let Some(p) = rx.recv().await {
            assert!(p >= last);
            last = p;
        }
        assert_eq!(last, 100);

        let state = service.get_state();
        assert_eq!(state.visits.len(), 1);
        let record = &state.visits[0].record;
        assert_eq!(record.field("siteName"), Some("Konkan Agro"));
        assert_eq!(record.satisfaction, 4);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_form() {
        let mut service = service();
        service.reject_with(Some("Quota exceeded"));
        let mut wizard = filled_wizard();
        wizard.add_photos(["a.jpg"]);

        let err = wizard
            .submit(&mut service, Progress::discard())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Submission);
        assert_eq!(err.message(), "Quota exceeded");
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.form().client_company_name, "Konkan Agro");
        assert_eq!(wizard.photos().len(), 1);

        service.reject_with(None);
        assert!(wizard.submit(&mut service, Progress::discard()).await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_validates_first() {
        let mut service = service();
        let mut wizard = filled_wizard();
        wizard.set_field(FormField::InterestLevel, " ");
        let err = wizard
            .submit(&mut service, Progress::discard())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(service.get_state().visits.is_empty());
    }
}

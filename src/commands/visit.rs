use crate::api::{self, Mode, Progress, SubmissionReceipt};
use crate::commands::Out;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{FieldVisitForm, FieldVisitRecord, Step, MAX_PHOTOS};
use crate::{utils, Config, Result, Wizard};
use serde::Serialize;
use std::path::Path;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, info, warn};

/// The outcome of a successful `visit check`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// The steps that validated, in order.
    pub steps: Vec<Step>,
    /// The record that would be sent on submission.
    pub record: FieldVisitRecord,
}

/// Walks the form in `form_path` through every wizard step the way the screens would.
///
/// # Errors
/// - Returns a validation error naming the step and the first missing required field.
/// - Returns an error if the file cannot be read or is not a form.
pub async fn visit_check(form_path: &Path) -> Result<Out<CheckReport>> {
    let form = load_form(form_path).await?;
    let mut wizard = Wizard::with_form(form);
    let mut steps = Vec::new();
    loop {
        let step = wizard.step();
        if let Err(e) = wizard.next() {
            return Err(Error::validation(format!(
                "Step {} ({}): {}",
                step.number(),
                step.title(),
                e.message()
            )));
        }
        steps.push(step);
        if step.next().is_none() {
            break;
        }
    }
    let record = wizard.form().to_record();
    let message = format!(
        "The field visit for '{}' is complete and ready to submit (priority {}, satisfaction {})",
        wizard.form().client_company_name.trim(),
        record.priority,
        record.satisfaction
    );
    Ok(Out::new(message, CheckReport { steps, record }))
}

/// Validates the form in `form_path` and submits it, with `photos`, to the field-visit service.
///
/// Photos beyond the first eight are ignored with a warning. Progress is logged as it is reported
/// by the service.
///
/// # Errors
/// - Returns a validation error if a required field is missing. Nothing is sent in that case.
/// - Returns a submission error carrying the service's message if the service rejects the visit.
pub async fn visit_submit(
    config: Config,
    mode: Mode,
    form_path: &Path,
    photos: &[String],
) -> Result<Out<SubmissionReceipt>> {
    let form = load_form(form_path).await?;
    let mut wizard = Wizard::with_form(form);

    let attached = wizard.add_photos(photos.iter().cloned());
    if attached < photos.len() {
        warn!(
            "Only {MAX_PHOTOS} photos can be attached to a field visit, {} of the {} given will \
            not be sent",
            photos.len() - attached,
            photos.len()
        );
    }

    wizard.form().validate()?;
    let mut service = api::service(&config, mode)
        .await
        .pub_result(ErrorType::Config)?;

    let (tx, mut rx) = unbounded_channel();
    let submit = wizard.submit(service.as_mut(), Progress::new(tx));
    let report = async {
        while let Some(percent) = rx.recv().await {
            info!("Submitting field visit... {percent}%");
        }
    };
    let (result, ()) = tokio::join!(submit, report);
    let receipt = result?;

    let message = format!(
        "Field visit saved with id {} and {} photo(s)",
        receipt.id, receipt.photos
    );
    Ok(Out::new(message, receipt))
}

async fn load_form(path: &Path) -> Result<FieldVisitForm> {
    debug!("Loading field-visit form from {}", path.display());
    utils::deserialize(path).await.pub_result(ErrorType::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    const COMPLETE: &str = r#"{
        "clientCompanyName": "Sahyadri Dairy",
        "siteAddress": "MIDC, Satara",
        "contactPersonName": "R. Jadhav",
        "mobileNumber": "9822000000",
        "requirementDetails": "Bulk milk chiller",
        "interestLevel": "Warm",
        "urgency": "High",
        "siteAssessmentRating": "Excellent"
    }"#;

    #[tokio::test]
    async fn test_check_complete_form() {
        let env = TestEnv::new().await;
        let path = env.write_json("visit.json", COMPLETE);
        let out = visit_check(&path).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.steps, Step::ALL.to_vec());
        assert_eq!(report.record.field("siteName"), Some("Sahyadri Dairy"));
        assert_eq!(report.record.satisfaction, 5);
        assert_eq!(report.record.priority.to_string(), "high");
    }

    #[tokio::test]
    async fn test_check_reports_first_missing_field() {
        let env = TestEnv::new().await;
        let path = env.write_json(
            "visit.json",
            r#"{ "clientCompanyName": "Sahyadri Dairy", "siteAddress": "Satara" }"#,
        );
        let err = visit_check(&path).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.message().starts_with("Step 1"));
        assert!(err.message().contains("Contact person name"));
    }

    #[tokio::test]
    async fn test_check_missing_step_three_field() {
        let env = TestEnv::new().await;
        let path = env.write_json(
            "visit.json",
            r#"{
                "clientCompanyName": "A",
                "siteAddress": "B",
                "contactPersonName": "C",
                "mobileNumber": "D",
                "requirementDetails": "E"
            }"#,
        );
        let err = visit_check(&path).await.unwrap_err();
        assert!(err.message().starts_with("Step 3"));
    }

    #[tokio::test]
    async fn test_submit_stores_visit_with_truncated_photos() {
        let env = TestEnv::new().await;
        let path = env.write_json("visit.json", COMPLETE);
        let photos: Vec<String> = (0..10).map(|i| format!("photo{i}.jpg")).collect();

        let out = visit_submit(env.config(), Mode::Test, &path, &photos)
            .await
            .unwrap();
        let receipt = out.structure().unwrap();
        assert_eq!(receipt.photos, MAX_PHOTOS);

        let state = env.service().get_state();
        assert_eq!(state.visits.len(), 1);
        assert_eq!(state.visits[0].id, receipt.id);
        assert_eq!(state.visits[0].photos, photos[..MAX_PHOTOS].to_vec());
        assert_eq!(state.visits[0].record.field("phone"), Some("9822000000"));
    }

    #[tokio::test]
    async fn test_submit_rejected_by_service() {
        let env = TestEnv::new().await;
        env.service().reject_with(Some("Site already visited today"));
        let path = env.write_json("visit.json", COMPLETE);

        let err = visit_submit(env.config(), Mode::Test, &path, &[])
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Submission);
        assert_eq!(err.message(), "Site already visited today");
        assert!(env.service().get_state().visits.is_empty());
    }

    #[tokio::test]
    async fn test_submit_validates_before_connecting() {
        let env = TestEnv::new().await;
        let home = env.path("unconfigured");
        let config = Config::create(&home, "", None).await.unwrap();
        let path = env.write_json("visit.json", r#"{ "clientCompanyName": "Only this" }"#);
        let err = visit_submit(config, Mode::Remote, &path, &[])
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.message().contains("Site address"));
    }

    #[tokio::test]
    async fn test_submit_without_service_url_is_config_error() {
        let env = TestEnv::new().await;
        let config = Config::create(env.path("unconfigured"), "", None).await.unwrap();
        let path = env.write_json("visit.json", COMPLETE);
        let err = visit_submit(config, Mode::Remote, &path, &[])
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_submit_invalid_form_sends_nothing() {
        let env = TestEnv::new().await;
        let path = env.write_json("visit.json", r#"{ "clientCompanyName": "Only this" }"#);
        let err = visit_submit(env.config(), Mode::Test, &path, &[])
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(env.service().get_state().visits.is_empty());
    }
}

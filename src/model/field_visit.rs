//! The field-visit survey: its fields, the three wizard steps they belong to, photo attachments,
//! and the flat record the persistence service expects.

use crate::error::{Error, Res, Result};
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The most photos a single visit can carry.
pub const MAX_PHOTOS: usize = 8;

/// The steps of the field-visit wizard, in the order they are filled in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    ClientSite,
    SiteAssessment,
    FollowUp,
}

serde_plain::derive_display_from_serialize!(Step);
serde_plain::derive_fromstr_from_deserialize!(Step);

impl Step {
    pub const ALL: [Step; 3] = [Step::ClientSite, Step::SiteAssessment, Step::FollowUp];

    /// The 1-based position of the step.
    pub fn number(self) -> u8 {
        match self {
            Step::ClientSite => 1,
            Step::SiteAssessment => 2,
            Step::FollowUp => 3,
        }
    }

    pub fn from_number(n: u8) -> Res<Self> {
        match n {
            1 => Ok(Step::ClientSite),
            2 => Ok(Step::SiteAssessment),
            3 => Ok(Step::FollowUp),
            _ => bail!("There is no step {n}, steps are numbered 1 to 3"),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::ClientSite => "Client & Site",
            Step::SiteAssessment => "Site Assessment",
            Step::FollowUp => "Follow-up",
        }
    }

    pub fn next(self) -> Option<Step> {
        match self {
            Step::ClientSite => Some(Step::SiteAssessment),
            Step::SiteAssessment => Some(Step::FollowUp),
            Step::FollowUp => None,
        }
    }

    pub fn prev(self) -> Option<Step> {
        match self {
            Step::ClientSite => None,
            Step::SiteAssessment => Some(Step::ClientSite),
            Step::FollowUp => Some(Step::SiteAssessment),
        }
    }
}

/// Declares `FieldVisitForm` and `FormField` together so that every survey field has exactly one
/// label, step and required flag.
macro_rules! field_visit_form {
    ($( $field:ident => $variant:ident, $label:literal, $step:ident, $required:literal; )+) => {
        /// Every answer collected during a field visit, as typed.
        #[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct FieldVisitForm {
            $( pub $field: String, )+
        }

        /// Names one field of a `FieldVisitForm`. Displays as the camelCase form name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum FormField {
            $( $variant, )+
        }

        impl FormField {
            /// Every field, in form order.
            pub const ALL: &'static [FormField] = &[ $( FormField::$variant, )+ ];

            /// The human readable label used in validation messages.
            pub fn label(self) -> &'static str {
                match self {
                    $( FormField::$variant => $label, )+
                }
            }

            pub fn step(self) -> Step {
                match self {
                    $( FormField::$variant => Step::$step, )+
                }
            }

            pub fn is_required(self) -> bool {
                match self {
                    $( FormField::$variant => $required, )+
                }
            }
        }

        impl FieldVisitForm {
            pub fn get(&self, field: FormField) -> &str {
                match field {
                    $( FormField::$variant => &self.$field, )+
                }
            }

            fn field_mut(&mut self, field: FormField) -> &mut String {
                match field {
                    $( FormField::$variant => &mut self.$field, )+
                }
            }
        }
    };
}

field_visit_form! {
    client_company_name => ClientCompanyName, "Client company name", ClientSite, true;
    site_address => SiteAddress, "Site address", ClientSite, true;
    contact_person_name => ContactPersonName, "Contact person name", ClientSite, true;
    mobile_number => MobileNumber, "Mobile number", ClientSite, true;
    designation => Designation, "Designation", ClientSite, false;
    email => Email, "Email", ClientSite, false;
    city => City, "City", ClientSite, false;
    state => State, "State", ClientSite, false;
    pincode => Pincode, "Pincode", ClientSite, false;
    visit_date => VisitDate, "Visit date", ClientSite, false;
    visit_time => VisitTime, "Visit time", ClientSite, false;
    visit_purpose => VisitPurpose, "Purpose of visit", ClientSite, false;
    industry_type => IndustryType, "Industry type", ClientSite, false;
    existing_customer => ExistingCustomer, "Existing customer", ClientSite, false;
    site_type => SiteType, "Site type", SiteAssessment, false;
    site_area => SiteArea, "Site area", SiteAssessment, false;
    power_supply => PowerSupply, "Power supply", SiteAssessment, false;
    existing_equipment => ExistingEquipment, "Existing equipment", SiteAssessment, false;
    equipment_brand => EquipmentBrand, "Equipment brand", SiteAssessment, false;
    equipment_age => EquipmentAge, "Equipment age", SiteAssessment, false;
    equipment_condition => EquipmentCondition, "Equipment condition", SiteAssessment, false;
    requirement_details => RequirementDetails, "Requirement details", SiteAssessment, true;
    product_interest => ProductInterest, "Product of interest", SiteAssessment, false;
    quantity_required => QuantityRequired, "Quantity required", SiteAssessment, false;
    budget_range => BudgetRange, "Budget range", SiteAssessment, false;
    decision_timeline => DecisionTimeline, "Decision timeline", SiteAssessment, false;
    decision_maker => DecisionMaker, "Decision maker", SiteAssessment, false;
    competitor_present => CompetitorPresent, "Competitor present", SiteAssessment, false;
    competitor_name => CompetitorName, "Competitor name", SiteAssessment, false;
    site_assessment_rating => SiteAssessmentRating, "Site assessment rating", SiteAssessment, false;
    installation_feasibility => InstallationFeasibility, "Installation feasibility", SiteAssessment, false;
    accessibility => Accessibility, "Accessibility", SiteAssessment, false;
    safety_compliance => SafetyCompliance, "Safety compliance", SiteAssessment, false;
    site_remarks => SiteRemarks, "Site remarks", SiteAssessment, false;
    customer_feedback => CustomerFeedback, "Customer feedback", FollowUp, false;
    interest_level => InterestLevel, "Interest level", FollowUp, true;
    follow_up_required => FollowUpRequired, "Follow-up required", FollowUp, false;
    follow_up_date => FollowUpDate, "Follow-up date", FollowUp, false;
    follow_up_mode => FollowUpMode, "Follow-up mode", FollowUp, false;
    quotation_required => QuotationRequired, "Quotation required", FollowUp, false;
    demo_required => DemoRequired, "Demo required", FollowUp, false;
    samples_provided => SamplesProvided, "Samples provided", FollowUp, false;
    next_action => NextAction, "Next action", FollowUp, false;
    engineer_name => EngineerName, "Engineer name", FollowUp, false;
    engineer_remarks => EngineerRemarks, "Engineer remarks", FollowUp, false;
    lead_source => LeadSource, "Lead source", FollowUp, false;
    urgency => Urgency, "Urgency", FollowUp, false;
    gps_location => GpsLocation, "GPS location", FollowUp, false;
    customer_signature_name => CustomerSignatureName, "Customer signature name", FollowUp, false;
    additional_notes => AdditionalNotes, "Additional notes", FollowUp, false;
}

serde_plain::derive_display_from_serialize!(FormField);
serde_plain::derive_fromstr_from_deserialize!(FormField);

impl FormField {
    pub fn from_name(name: &str) -> Res<Self> {
        match name.parse::<FormField>() {
            Ok(field) => Ok(field),
            Err(_) => bail!("'{name}' is not a field-visit form field"),
        }
    }

    /// The name this field is stored under by the persistence service.
    pub fn canonical_name(self) -> String {
        match self {
            FormField::ClientCompanyName => "siteName".to_string(),
            FormField::MobileNumber => "phone".to_string(),
            FormField::ContactPersonName => "contactName".to_string(),
            FormField::SiteAddress => "address".to_string(),
            other => other.to_string(),
        }
    }

    /// The fields that belong to `step`, in form order.
    pub fn for_step(step: Step) -> impl Iterator<Item = FormField> {
        FormField::ALL.iter().copied().filter(move |f| f.step() == step)
    }
}

impl FieldVisitForm {
    /// Returns a new form equal to this one with `field` replaced by `value`.
    pub fn with_field(&self, field: FormField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        *next.field_mut(field) = value.into();
        next
    }

    /// The required fields of `step` that are empty or only whitespace, in form order.
    pub fn missing(&self, step: Step) -> Vec<FormField> {
        FormField::for_step(step)
            .filter(|f| f.is_required() && self.get(*f).trim().is_empty())
            .collect()
    }

    /// Checks that every required field of `step` has a value. The error names the first field
    /// that is missing.
    pub fn validate_step(&self, step: Step) -> Result<()> {
        match self.missing(step).first() {
            Some(field) => Err(Error::validation(format!("{} is required", field.label()))),
            None => Ok(()),
        }
    }

    /// Validates every step in order.
    pub fn validate(&self) -> Result<()> {
        for step in Step::ALL {
            self.validate_step(step)?;
        }
        Ok(())
    }

    /// Builds the flat record sent to the persistence service.
    pub fn to_record(&self) -> FieldVisitRecord {
        let fields = FormField::ALL
            .iter()
            .map(|f| (f.canonical_name(), self.get(*f).trim().to_string()))
            .collect();
        FieldVisitRecord {
            fields,
            satisfaction: satisfaction_score(&self.site_assessment_rating),
            priority: Priority::from_answers(&self.urgency, &self.interest_level),
        }
    }
}

/// How urgently the service should treat a visit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

serde_plain::derive_display_from_serialize!(Priority);
serde_plain::derive_fromstr_from_deserialize!(Priority);

impl Priority {
    /// Urgency wins when answered, otherwise the interest level decides.
    fn from_answers(urgency: &str, interest_level: &str) -> Self {
        let by_urgency = match urgency.trim().to_ascii_lowercase().as_str() {
            "high" | "urgent" | "immediate" => Some(Priority::High),
            "medium" | "normal" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        };
        by_urgency.unwrap_or(match interest_level.trim().to_ascii_lowercase().as_str() {
            "hot" | "high" => Priority::High,
            "cold" | "low" => Priority::Low,
            _ => Priority::Medium,
        })
    }
}

/// Maps the site assessment rating onto the service's 1 to 5 satisfaction score.
fn satisfaction_score(rating: &str) -> u8 {
    let rating = rating.trim().to_ascii_lowercase();
    match rating.as_str() {
        "excellent" => 5,
        "good" => 4,
        "average" => 3,
        "poor" => 2,
        "very poor" => 1,
        other => match other.parse::<u8>() {
            Ok(n @ 1..=5) => n,
            _ => 3,
        },
    }
}

/// The flat record accepted by the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldVisitRecord {
    /// Survey answers keyed by their canonical names.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
    pub satisfaction: u8,
    pub priority: Priority,
}

impl FieldVisitRecord {
    pub fn field(&self, canonical_name: &str) -> Option<&str> {
        self.fields.get(canonical_name).map(String::as_str)
    }
}

/// The photos attached to a visit, capped at `MAX_PHOTOS`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Attachments {
    uris: Vec<String>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the picked `uris`, keeping only as many as still fit under the cap. Blank entries
    /// are ignored. Returns how many were added.
    pub fn add<I, S>(&mut self, uris: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let room = self.remaining();
        let before = self.uris.len();
        self.uris.extend(
            uris.into_iter()
                .map(Into::into)
                .filter(|u| !u.trim().is_empty())
                .take(room),
        );
        self.uris.len() - before
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.uris.len() {
            Some(self.uris.remove(index))
        } else {
            None
        }
    }

    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    pub fn remaining(&self) -> usize {
        MAX_PHOTOS.saturating_sub(self.uris.len())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }
}

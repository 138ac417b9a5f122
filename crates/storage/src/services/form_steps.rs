//! Step-wise merging of submitted form fields into an application.
//!
//! Each role's form has three steps, and every step owns a disjoint subset of
//! the application's fields. A step update rewrites that subset and nothing
//! else. Which step the user is on lives entirely on the client.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::{
    Application, ApplicationDetails, JudgeFields, MentorFields, ParticipantFields,
};

/// Separator used when a participant multi-select is flattened into one column.
pub const PARTICIPANT_LIST_SEPARATOR: &str = ", ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("step '{0}' does not exist, expected 1, 2 or 3")]
    InvalidStep(String),

    #[error("field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// A single submitted form value.
///
/// Form posts send text and multi-selects; JSON clients may also send plain
/// numbers, booleans and `null`, which count as text, a checkbox and an
/// omitted field respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
    Bool(bool),
    Null,
}

pub type StepFields = HashMap<String, FormValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Personal,
    Experience,
    Final,
}

impl TryFrom<u8> for FormStep {
    type Error = FormError;

    fn try_from(step: u8) -> Result<Self, Self::Error> {
        match step {
            1 => Ok(Self::Personal),
            2 => Ok(Self::Experience),
            3 => Ok(Self::Final),
            other => Err(FormError::InvalidStep(other.to_string())),
        }
    }
}

impl FromStr for FormStep {
    type Err = FormError;

    fn from_str(step: &str) -> Result<Self, Self::Err> {
        step.trim()
            .parse::<u8>()
            .map_err(|_| FormError::InvalidStep(step.to_string()))
            .and_then(Self::try_from)
    }
}

/// Merges the fields owned by `step` into `application`.
///
/// Fields of the step that are absent from `fields` are cleared; fields that
/// belong to other steps keep their current values.
pub fn apply_step(
    application: &mut Application,
    step: FormStep,
    fields: &StepFields,
) -> Result<(), FormError> {
    let form = FieldReader { fields };

    match &mut application.details {
        ApplicationDetails::Participant(p) => {
            apply_participant(&mut application.full_name, p, step, &form)
        }
        ApplicationDetails::Mentor(m) => apply_mentor(&mut application.full_name, m, step, &form),
        ApplicationDetails::Judge(j) => apply_judge(&mut application.full_name, j, step, &form),
    }
}

fn apply_participant(
    full_name: &mut Option<String>,
    p: &mut ParticipantFields,
    step: FormStep,
    form: &FieldReader<'_>,
) -> Result<(), FormError> {
    match step {
        FormStep::Personal => {
            *full_name = form.text("full_name");
            p.gender = form.text("gender");
            p.university = form.text("university");
            p.program = form.text("program");
            p.year_of_study = form.text("year_of_study");
            p.phone = form.text("phone");
        }
        FormStep::Experience => {
            p.programming_experience = form.score("programming_experience", 1, 5)?;
            p.data_science_experience = form.score("data_science_experience", 1, 5)?;
            p.technical_skills = form.text("technical_skills");
            p.has_team = form.flag("has_team");
            p.team_members = form.text("team_members");
            p.dietary_restrictions = form.joined("dietary_restrictions");
            p.tshirt_size = form.text("tshirt_size");
        }
        FormStep::Final => {
            p.motivation = form.text("motivation");
            p.heard_from = form.text("heard_from");
            p.agree_to_code_of_conduct = form.flag("agree_to_code_of_conduct");
            p.agree_to_photo_release = form.flag("agree_to_photo_release");
        }
    }
    Ok(())
}

fn apply_mentor(
    full_name: &mut Option<String>,
    m: &mut MentorFields,
    step: FormStep,
    form: &FieldReader<'_>,
) -> Result<(), FormError> {
    match step {
        FormStep::Personal => {
            *full_name = form.text("full_name");
            m.organization = form.text("organization");
            m.job_title = form.text("job_title");
            m.linkedin_url = form.text("linkedin_url");
        }
        FormStep::Experience => {
            m.expertise_areas = form.text("expertise_areas");
            m.experience_level = form.score("experience_level", 1, 10)?;
            m.availability = form.text("availability");
            m.dietary_restrictions = form.list("dietary_restrictions");
            m.tshirt_size = form.text("tshirt_size");
        }
        FormStep::Final => {
            m.motivation = form.text("motivation");
            m.previous_mentoring = form.flag("previous_mentoring");
            m.agree_to_code_of_conduct = form.flag("agree_to_code_of_conduct");
        }
    }
    Ok(())
}

fn apply_judge(
    full_name: &mut Option<String>,
    j: &mut JudgeFields,
    step: FormStep,
    form: &FieldReader<'_>,
) -> Result<(), FormError> {
    match step {
        FormStep::Personal => {
            *full_name = form.text("full_name");
            j.organization = form.text("organization");
            j.job_title = form.text("job_title");
            j.linkedin_url = form.text("linkedin_url");
        }
        FormStep::Experience => {
            j.expertise_areas = form.text("expertise_areas");
            j.judging_experience = form.flag("judging_experience");
            j.domain_expertise_level = form.score("domain_expertise_level", 1, 10)?;
            j.availability = form.text("availability");
        }
        FormStep::Final => {
            j.motivation = form.text("motivation");
            j.conflict_of_interest = form.text("conflict_of_interest");
            j.agree_to_code_of_conduct = form.flag("agree_to_code_of_conduct");
        }
    }
    Ok(())
}

struct FieldReader<'a> {
    fields: &'a StepFields,
}

impl FieldReader<'_> {
    fn text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            FormValue::Text(value) => non_empty(value),
            FormValue::List(values) => values.iter().find_map(|v| non_empty(v)),
            FormValue::Number(value) => Some(value.to_string()),
            FormValue::Bool(value) => Some(value.to_string()),
            FormValue::Null => None,
        }
    }

    /// Checkbox semantics: only the literals `yes` and `on`, or JSON `true`.
    fn flag(&self, name: &str) -> bool {
        match self.fields.get(name) {
            Some(FormValue::Text(value)) => value == "yes" || value == "on",
            Some(FormValue::Bool(value)) => *value,
            _ => false,
        }
    }

    fn joined(&self, name: &str) -> Option<String> {
        let values = self.list(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join(PARTICIPANT_LIST_SEPARATOR))
        }
    }

    fn list(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(FormValue::List(values)) => values.iter().filter_map(|v| non_empty(v)).collect(),
            Some(FormValue::Text(value)) => non_empty(value).into_iter().collect(),
            Some(FormValue::Number(value)) => vec![value.to_string()],
            Some(FormValue::Bool(value)) => vec![value.to_string()],
            Some(FormValue::Null) | None => Vec::new(),
        }
    }

    fn score(&self, name: &'static str, min: i32, max: i32) -> Result<Option<i32>, FormError> {
        let Some(raw) = self.text(name) else {
            return Ok(None);
        };

        let value: i32 = raw.trim().parse().map_err(|_| FormError::InvalidField {
            field: name,
            reason: format!("'{}' is not a number", raw),
        })?;

        if !(min..=max).contains(&value) {
            return Err(FormError::InvalidField {
                field: name,
                reason: format!("must be between {} and {}", min, max),
            });
        }

        Ok(Some(value))
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

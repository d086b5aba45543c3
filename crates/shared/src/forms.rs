//! Validation for the three public lead-capture forms.
//!
//! Each form is described by a static list of [`FieldSpec`]s. The same specs
//! drive validation and the blank form descriptors handed to page templates.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{Appointment, ContactUs, LeadKind, NewLead, Subscription};

/// Longest address the email field accepts.
pub const MAX_EMAIL_LEN: usize = 254;

/// Canonical limit for free-text messages on both the appointment and
/// contact forms.
pub const MAX_MESSAGE_LEN: usize = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Integer,
    TextArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_len: usize,
    pub max_len: usize,
}

const fn field(
    name: &'static str,
    kind: FieldKind,
    required: bool,
    min_len: usize,
    max_len: usize,
) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required,
        min_len,
        max_len,
    }
}

pub const APPOINTMENT_FIELDS: &[FieldSpec] = &[
    field("name", FieldKind::Text, true, 2, 50),
    field("email", FieldKind::Email, true, 0, MAX_EMAIL_LEN),
    field("child_name", FieldKind::Text, true, 2, 50),
    field("child_age", FieldKind::Integer, true, 0, 2),
    field("message", FieldKind::TextArea, false, 0, MAX_MESSAGE_LEN),
];

pub const CONTACT_US_FIELDS: &[FieldSpec] = &[
    field("name", FieldKind::Text, true, 0, 50),
    field("email", FieldKind::Email, true, 0, MAX_EMAIL_LEN),
    field("subject", FieldKind::Text, true, 0, 50),
    field("message", FieldKind::TextArea, false, 0, MAX_MESSAGE_LEN),
];

pub const SUBSCRIPTION_FIELDS: &[FieldSpec] =
    &[field("email", FieldKind::Email, true, 0, MAX_EMAIL_LEN)];

pub fn fields_for(kind: LeadKind) -> &'static [FieldSpec] {
    match kind {
        LeadKind::Appointment => APPOINTMENT_FIELDS,
        LeadKind::ContactUs => CONTACT_US_FIELDS,
        LeadKind::Subscription => SUBSCRIPTION_FIELDS,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Per-form errors collected when a submission matched none of the forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub appointment: Vec<FieldError>,
    pub contact_us: Vec<FieldError>,
    pub subscription: Vec<FieldError>,
}

impl FormErrors {
    pub fn for_kind(&self, kind: LeadKind) -> &[FieldError] {
        match kind {
            LeadKind::Appointment => &self.appointment,
            LeadKind::ContactUs => &self.contact_us,
            LeadKind::Subscription => &self.subscription,
        }
    }
}

/// Tries the forms in priority order (appointment, contact, subscription)
/// and returns the first one that validates.
pub fn validate_submission(input: &HashMap<String, String>) -> Result<NewLead, FormErrors> {
    let appointment = match validate_appointment(input) {
        Ok(lead) => return Ok(NewLead::Appointment(lead)),
        Err(errors) => errors,
    };
    let contact_us = match validate_contact_us(input) {
        Ok(lead) => return Ok(NewLead::ContactUs(lead)),
        Err(errors) => errors,
    };
    let subscription = match validate_subscription(input) {
        Ok(lead) => return Ok(NewLead::Subscription(lead)),
        Err(errors) => errors,
    };
    Err(FormErrors {
        appointment,
        contact_us,
        subscription,
    })
}

/// Guesses which form a rejected submission was meant for: the form owning
/// the most non-blank submitted fields, ties going to the smaller form.
/// `None` when no known field was filled in.
pub fn likely_intended(input: &HashMap<String, String>) -> Option<LeadKind> {
    [
        LeadKind::Subscription,
        LeadKind::ContactUs,
        LeadKind::Appointment,
    ]
    .into_iter()
    .map(|kind| {
        let filled = fields_for(kind)
            .iter()
            .filter(|spec| input.get(spec.name).is_some_and(|v| !v.trim().is_empty()))
            .count();
        (kind, filled)
    })
    .filter(|(_, filled)| *filled > 0)
    .fold(None, |best: Option<(LeadKind, usize)>, candidate| match best {
        Some((_, best_filled)) if best_filled >= candidate.1 => best,
        _ => Some(candidate),
    })
    .map(|(kind, _)| kind)
}

pub fn validate_appointment(
    input: &HashMap<String, String>,
) -> Result<Appointment, Vec<FieldError>> {
    let mut cleaned = clean(APPOINTMENT_FIELDS, input)?;
    let child_age = cleaned
        .remove("child_age")
        .and_then(|age| age.parse::<i16>().ok())
        .unwrap_or_default();
    Ok(Appointment {
        name: cleaned.remove("name").unwrap_or_default(),
        email: cleaned.remove("email").unwrap_or_default(),
        child_name: cleaned.remove("child_name").unwrap_or_default(),
        child_age,
        message: cleaned.remove("message").unwrap_or_default(),
    })
}

pub fn validate_contact_us(input: &HashMap<String, String>) -> Result<ContactUs, Vec<FieldError>> {
    let mut cleaned = clean(CONTACT_US_FIELDS, input)?;
    Ok(ContactUs {
        name: cleaned.remove("name").unwrap_or_default(),
        email: cleaned.remove("email").unwrap_or_default(),
        subject: cleaned.remove("subject").unwrap_or_default(),
        message: cleaned.remove("message").unwrap_or_default(),
    })
}

pub fn validate_subscription(
    input: &HashMap<String, String>,
) -> Result<Subscription, Vec<FieldError>> {
    let mut cleaned = clean(SUBSCRIPTION_FIELDS, input)?;
    Ok(Subscription {
        email: cleaned.remove("email").unwrap_or_default(),
    })
}

fn clean(
    specs: &[FieldSpec],
    input: &HashMap<String, String>,
) -> Result<BTreeMap<&'static str, String>, Vec<FieldError>> {
    let mut cleaned = BTreeMap::new();
    let mut errors = Vec::new();

    for spec in specs {
        let value = input
            .get(spec.name)
            .map(|raw| raw.trim())
            .unwrap_or_default();
        match check_field(spec, value) {
            Ok(()) => {
                cleaned.insert(spec.name, value.to_string());
            }
            Err(message) => errors.push(FieldError {
                field: spec.name,
                message,
            }),
        }
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

fn check_field(spec: &FieldSpec, value: &str) -> Result<(), String> {
    if value.is_empty() {
        if spec.required {
            return Err("This field is required.".into());
        }
        return Ok(());
    }

    let len = value.chars().count();
    if len < spec.min_len {
        return Err(format!(
            "Ensure this value has at least {} characters (it has {len}).",
            spec.min_len
        ));
    }
    if len > spec.max_len {
        return Err(format!(
            "Ensure this value has at most {} characters (it has {len}).",
            spec.max_len
        ));
    }

    match spec.kind {
        FieldKind::Email if !is_valid_email(value) => Err("Enter a valid email address.".into()),
        FieldKind::Integer if !value.bytes().all(|b| b.is_ascii_digit()) => {
            Err("Enter a whole number.".into())
        }
        _ => Ok(()),
    }
}

pub fn is_valid_email(value: &str) -> bool {
    if value.len() > MAX_EMAIL_LEN {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    const ATOM_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";
    !local.is_empty()
        && local.len() <= 64
        && local
            .split('.')
            .all(|atom| {
                !atom.is_empty()
                    && atom
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || ATOM_SPECIALS.contains(c))
            })
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && !tld.bytes().all(|b| b.is_ascii_digit()));
    tld_ok
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;

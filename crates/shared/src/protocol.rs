use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
    domain::{
        About, Appointment, Call, ClassListing, ContactUs, Contacts, Facilities, GalleryImage,
        Headlines, Lead, LeadKind, Record, Schedule, Slide, Subscription, TeamMember,
        Testimonial,
    },
    forms::{fields_for, FieldError, FieldSpec},
};

/// Public pages. Every one of them accepts the lead forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Index,
    About,
    Contacts,
    Classes,
    JoinUs,
    Schedule,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Index,
        Page::About,
        Page::Contacts,
        Page::Classes,
        Page::JoinUs,
        Page::Schedule,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Page::Index => "/",
            Page::About => "/about/",
            Page::Contacts => "/contacts/",
            Page::Classes => "/classes/",
            Page::JoinUs => "/join_us/",
            Page::Schedule => "/schedule/",
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            Page::Index => "index.html",
            Page::About => "about.html",
            Page::Contacts => "contact.html",
            Page::Classes => "classes.html",
            Page::JoinUs => "join_us.html",
            Page::Schedule => "schedule.html",
        }
    }
}

pub const MANAGER_TEMPLATE: &str = "manager.html";
pub const LOGIN_TEMPLATE: &str = "login.html";

/// What a template needs to draw one of the lead forms: its fields and,
/// after a rejected submission, what was typed and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub kind: LeadKind,
    pub fields: &'static [FieldSpec],
    pub values: BTreeMap<String, String>,
    pub errors: Vec<FieldError>,
}

impl FormState {
    pub fn blank(kind: LeadKind) -> Self {
        Self {
            kind,
            fields: fields_for(kind),
            values: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// The form as the visitor left it: their values for this form's fields
    /// plus the errors that kept it from being accepted.
    pub fn rejected(
        kind: LeadKind,
        input: &HashMap<String, String>,
        errors: &[FieldError],
    ) -> Self {
        let fields = fields_for(kind);
        let values = fields
            .iter()
            .filter_map(|spec| {
                input
                    .get(spec.name)
                    .map(|value| (spec.name.to_string(), value.clone()))
            })
            .collect();
        Self {
            kind,
            fields,
            values,
            errors: errors.to_vec(),
        }
    }

    pub fn is_bound(&self) -> bool {
        !self.values.is_empty() || !self.errors.is_empty()
    }
}

/// Everything the public pages render from.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub user_auth: bool,
    pub user_manager: bool,
    pub slider: Vec<Record<Slide>>,
    pub team: Vec<Record<TeamMember>>,
    pub testimonial: Vec<Record<Testimonial>>,
    pub classes: Vec<ClassListing>,
    pub gallery: Vec<Record<GalleryImage>>,
    pub about: Record<About>,
    pub facilities: Record<Facilities>,
    pub call: Record<Call>,
    pub contacts: Record<Contacts>,
    pub schedule: Record<Schedule>,
    pub headlines: Record<Headlines>,
    pub make_appointment: FormState,
    pub subscription: FormState,
    pub contact_us: FormState,
}

impl PageContext {
    pub fn form_mut(&mut self, kind: LeadKind) -> &mut FormState {
        match kind {
            LeadKind::Appointment => &mut self.make_appointment,
            LeadKind::ContactUs => &mut self.contact_us,
            LeadKind::Subscription => &mut self.subscription,
        }
    }
}

/// Unprocessed leads on top of the regular page context.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerView {
    #[serde(flatten)]
    pub page: PageContext,
    pub subscriptions: Vec<Lead<Subscription>>,
    pub contact_requests: Vec<Lead<ContactUs>>,
    pub appointments: Vec<Lead<Appointment>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginView {
    pub next: String,
}

/// A rendered page as handed to the template engine.
#[derive(Debug, Clone, Serialize)]
pub struct PageView<T> {
    pub template: &'static str,
    pub context: T,
}

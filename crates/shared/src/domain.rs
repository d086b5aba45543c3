use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(TeamId);
id_newtype!(LeadId);

/// Group whose members may triage leads.
pub const MANAGER_GROUP: &str = "manager";

/// A stored content row: the database id plus the editable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: i64,
    #[serde(flatten)]
    pub fields: T,
}

pub(crate) fn visible() -> bool {
    true
}

fn default_twitter_url() -> String {
    "https://twitter.com/".into()
}

fn default_facebook_url() -> String {
    "https://www.facebook.com/".into()
}

fn default_instagram_url() -> String {
    "https://www.instagram.com/".into()
}

pub(crate) fn default_class_age() -> String {
    "3-5 Years".into()
}

pub(crate) fn default_class_time() -> String {
    "9-10 AM".into()
}

pub(crate) fn default_class_capacity() -> String {
    "30 Kids".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub profession: String,
    pub position: i64,
    #[serde(default = "visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub image_class: Option<String>,
    #[serde(default = "default_twitter_url")]
    pub twitter_url: String,
    #[serde(default = "default_facebook_url")]
    pub facebook_url: String,
    #[serde(default = "default_instagram_url")]
    pub instagram_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    pub position: i64,
    pub image: String,
    #[serde(default = "visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub button_1: String,
    #[serde(default)]
    pub button_1_url: String,
    #[serde(default)]
    pub button_2: String,
    #[serde(default)]
    pub button_2_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct About {
    pub heading: String,
    pub desc: String,
    pub button: String,
    pub founder_name: String,
    pub founder_position: String,
    pub founder_image: String,
    #[serde(default = "visible")]
    pub is_visible: bool,
    pub image_1: String,
    pub image_2: String,
    pub image_3: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: String,
    pub profession: String,
    pub position: i64,
    #[serde(default = "visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassOffering {
    pub title: String,
    /// Price in cents; the site shows two decimal places.
    pub price_cents: i64,
    #[serde(default)]
    pub image: Option<String>,
    pub position: i64,
    #[serde(default = "visible")]
    pub is_visible: bool,
    pub teacher_id: TeamId,
    #[serde(default = "default_class_age")]
    pub age: String,
    #[serde(default = "default_class_time")]
    pub time: String,
    #[serde(default = "default_class_capacity")]
    pub capacity: String,
}

impl ClassOffering {
    pub fn price_display(&self) -> String {
        let sign = if self.price_cents < 0 { "-" } else { "" };
        let cents = self.price_cents.unsigned_abs();
        format!("{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

/// A class as shown on the site, with its teacher resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassListing {
    #[serde(flatten)]
    pub class: Record<ClassOffering>,
    pub price: String,
    pub teacher: Record<TeamMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityColumn {
    pub heading: String,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facilities {
    pub columns: [FacilityColumn; 4],
    pub position: i64,
    #[serde(default = "visible")]
    pub is_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub image: Option<String>,
    pub position: i64,
    #[serde(default = "visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub button: String,
    #[serde(default)]
    pub button_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    #[serde(default)]
    pub image: Option<String>,
    pub position: i64,
    #[serde(default = "visible")]
    pub is_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contacts {
    pub heading: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub twitter_url: String,
    #[serde(default)]
    pub facebook_url: String,
    #[serde(default)]
    pub youtube_url: String,
    #[serde(default)]
    pub linkedin_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub image: Option<String>,
    pub position: i64,
    #[serde(default = "visible")]
    pub is_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headlines {
    pub title_facilities: String,
    #[serde(default)]
    pub desc_facilities: String,
    pub title_classes: String,
    #[serde(default)]
    pub desc_classes: String,
    pub title_teachers: String,
    #[serde(default)]
    pub desc_teachers: String,
    pub title_testimonial: String,
    #[serde(default)]
    pub desc_testimonial: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Appointment,
    ContactUs,
    Subscription,
}

impl LeadKind {
    pub fn table(self) -> &'static str {
        match self {
            LeadKind::Appointment => "appointments",
            LeadKind::ContactUs => "contact_us",
            LeadKind::Subscription => "subscriptions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub name: String,
    pub email: String,
    pub child_name: String,
    pub child_age: i16,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUs {
    pub name: String,
    pub email: String,
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// A validated submission that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewLead {
    Appointment(Appointment),
    ContactUs(ContactUs),
    Subscription(Subscription),
}

impl NewLead {
    pub fn kind(&self) -> LeadKind {
        match self {
            NewLead::Appointment(_) => LeadKind::Appointment,
            NewLead::ContactUs(_) => LeadKind::ContactUs,
            NewLead::Subscription(_) => LeadKind::Subscription,
        }
    }
}

/// A stored lead. `date` never changes after insert; `date_processing`
/// follows every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead<T> {
    pub id: LeadId,
    #[serde(flatten)]
    pub details: T,
    pub date: NaiveDate,
    pub date_processing: NaiveDate,
    pub is_processed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub username: String,
    pub groups: Vec<String>,
}

pub fn is_manager(actor: &Actor) -> bool {
    actor.groups.iter().any(|group| group == MANAGER_GROUP)
}

/// Who is making the current request. Built once per request by the HTTP
/// layer and handed to every handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: Option<Actor>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_actor(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.actor.is_some()
    }

    pub fn is_manager(&self) -> bool {
        self.actor.as_ref().is_some_and(is_manager)
    }
}

//! Site content as an operator writes it down for seeding, e.g. in TOML.

use serde::Deserialize;

use crate::domain::{
    default_class_age, default_class_capacity, default_class_time, visible, About, Call,
    ClassOffering, Contacts, Facilities, FacilityColumn, GalleryImage, Headlines, Schedule, Slide,
    TeamId, TeamMember, Testimonial,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteSeed {
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub slider: Vec<Slide>,
    #[serde(default)]
    pub about: Option<About>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    #[serde(default)]
    pub classes: Vec<ClassSeed>,
    #[serde(default)]
    pub facilities: Option<Facilities>,
    #[serde(default)]
    pub call: Option<Call>,
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,
    #[serde(default)]
    pub contacts: Option<Contacts>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub headlines: Option<Headlines>,
}

/// A class whose teacher is named by the teacher's team position, since
/// database ids are not known before seeding.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassSeed {
    pub teacher_position: i64,
    pub title: String,
    pub price_cents: i64,
    #[serde(default)]
    pub image: Option<String>,
    pub position: i64,
    #[serde(default = "visible")]
    pub is_visible: bool,
    #[serde(default = "default_class_age")]
    pub age: String,
    #[serde(default = "default_class_time")]
    pub time: String,
    #[serde(default = "default_class_capacity")]
    pub capacity: String,
}

impl ClassSeed {
    pub fn into_offering(self, teacher_id: TeamId) -> ClassOffering {
        ClassOffering {
            title: self.title,
            price_cents: self.price_cents,
            image: self.image,
            position: self.position,
            is_visible: self.is_visible,
            teacher_id,
            age: self.age,
            time: self.time,
            capacity: self.capacity,
        }
    }
}

impl SiteSeed {
    /// A small but complete site: every singleton present, a few ranked
    /// rows per table. Meant for local development and tests.
    pub fn demo() -> Self {
        let teacher = |name: &str, profession: &str, position: i64| TeamMember {
            name: name.into(),
            profession: profession.into(),
            position,
            is_visible: true,
            image: Some(format!("team/{position}.jpg")),
            desc: String::new(),
            image_class: None,
            twitter_url: "https://twitter.com/".into(),
            facebook_url: "https://www.facebook.com/".into(),
            instagram_url: "https://www.instagram.com/".into(),
        };
        let class = |title: &str, position: i64, teacher_position: i64| ClassSeed {
            teacher_position,
            title: title.into(),
            price_cents: 9_900,
            image: Some(format!("classes/{position}.jpg")),
            position,
            is_visible: true,
            age: default_class_age(),
            time: default_class_time(),
            capacity: default_class_capacity(),
        };
        let column = |heading: &str, desc: &str| FacilityColumn {
            heading: heading.into(),
            desc: desc.into(),
        };

        Self {
            team: vec![
                teacher("Olha Melnyk", "Art teacher", 1),
                teacher("Petro Bondar", "Music teacher", 2),
                teacher("Iryna Shevchuk", "Language teacher", 3),
                teacher("Mykola Kravets", "Sports coach", 4),
            ],
            slider: vec![Slide {
                title: "Welcome".into(),
                position: 1,
                image: "slider/1.jpg".into(),
                is_visible: true,
                heading: "The best kindergarten for your child".into(),
                desc: "Play, learn and grow with us.".into(),
                button_1: "Learn more".into(),
                button_1_url: "/about/".into(),
                button_2: "Our classes".into(),
                button_2_url: "/classes/".into(),
            }],
            about: Some(About {
                heading: "Learn more about our work".into(),
                desc: "We have been caring for children since 2010.".into(),
                button: "Read more".into(),
                founder_name: "Halyna Tkachenko".into(),
                founder_position: "Founder".into(),
                founder_image: "about/founder.jpg".into(),
                is_visible: true,
                image_1: "about/1.jpg".into(),
                image_2: "about/2.jpg".into(),
                image_3: "about/3.jpg".into(),
            }),
            testimonials: vec![Testimonial {
                name: "Natalia".into(),
                profession: "Parent".into(),
                position: 1,
                is_visible: true,
                image: None,
                desc: "Our son runs to the kindergarten every morning.".into(),
            }],
            classes: vec![
                class("Art & Drawing", 1, 1),
                class("Music", 2, 2),
                class("Languages", 3, 3),
            ],
            facilities: Some(Facilities {
                columns: [
                    column("Playground", "Safe outdoor play area."),
                    column("Healthy food", "Four meals a day."),
                    column("Positive learning", "Small groups."),
                    column("Transport", "Pick-up service."),
                ],
                position: 1,
                is_visible: true,
            }),
            call: Some(Call {
                title: "Become a teacher".into(),
                desc: "We are always looking for caring people.".into(),
                image: None,
                position: 1,
                is_visible: true,
                button: "Join us".into(),
                button_url: "/join_us/".into(),
            }),
            gallery: (1..=8)
                .map(|position| GalleryImage {
                    image: Some(format!("gallery/{position}.jpg")),
                    position,
                    is_visible: true,
                })
                .collect(),
            contacts: Some(Contacts {
                heading: "Get in touch".into(),
                address: "1 Main Street, Kyiv".into(),
                phone: "+380 44 000 0000".into(),
                email: "info@example.com".into(),
                twitter_url: String::new(),
                facebook_url: String::new(),
                youtube_url: String::new(),
                linkedin_url: String::new(),
            }),
            schedule: Some(Schedule {
                title: "Daily schedule".into(),
                desc: "Doors open at 8 AM.".into(),
                image: None,
                position: 1,
                is_visible: true,
            }),
            headlines: Some(Headlines {
                title_facilities: "School facilities".into(),
                desc_facilities: String::new(),
                title_classes: "School classes".into(),
                desc_classes: String::new(),
                title_teachers: "Popular teachers".into(),
                desc_teachers: String::new(),
                title_testimonial: "Our clients say".into(),
                desc_testimonial: String::new(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "tests/seed_tests.rs"]
mod tests;

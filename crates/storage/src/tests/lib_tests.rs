use super::*;
use shared::domain::{
    ClassOffering, GalleryImage, LeadKind, NewLead, Slide, Subscription, TeamMember,
    MANAGER_GROUP,
};

fn member(name: &str, position: i64, is_visible: bool) -> TeamMember {
    TeamMember {
        name: name.into(),
        profession: "Teacher".into(),
        position,
        is_visible,
        image: None,
        desc: String::new(),
        image_class: None,
        twitter_url: "https://twitter.com/".into(),
        facebook_url: "https://www.facebook.com/".into(),
        instagram_url: "https://www.instagram.com/".into(),
    }
}

fn slide(title: &str, position: i64, is_visible: bool) -> Slide {
    Slide {
        title: title.into(),
        position,
        image: format!("slides/{title}.jpg"),
        is_visible,
        heading: String::new(),
        desc: String::new(),
        button_1: String::new(),
        button_1_url: String::new(),
        button_2: String::new(),
        button_2_url: String::new(),
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("site.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite:./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("C:\\site\\test.db"),
        "sqlite://C:/site/test.db"
    );
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("sqlite://./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn prepared_url_has_its_parent_dir() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("data").join("site.db");

    let prepared = prepare_database_url(&db_path.to_string_lossy()).expect("prepare");
    assert!(prepared.starts_with("sqlite://"));
    assert!(temp_root.path().join("data").is_dir());
}

#[tokio::test]
async fn slides_are_listed_by_position_and_hidden_ones_skipped() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.insert_slide(&slide("third", 30, true)).await.expect("slide");
    storage.insert_slide(&slide("first", 10, true)).await.expect("slide");
    storage.insert_slide(&slide("hidden", 20, false)).await.expect("slide");

    let slides = storage.list_visible_slides().await.expect("slides");
    let positions: Vec<i64> = slides.iter().map(|s| s.fields.position).collect();
    assert_eq!(positions, vec![10, 30]);
}

#[tokio::test]
async fn position_must_be_unique() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .insert_team_member(&member("Anna", 1, true))
        .await
        .expect("first");
    let err = storage
        .insert_team_member(&member("Borys", 1, true))
        .await
        .expect_err("duplicate position");
    assert!(format!("{err:#}").contains("UNIQUE"));
}

#[tokio::test]
async fn team_listing_is_capped_and_ordered() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    for (name, position) in [("D", 4), ("B", 2), ("A", 1), ("C", 3)] {
        storage
            .insert_team_member(&member(name, position, true))
            .await
            .expect("member");
    }
    storage
        .insert_team_member(&member("Hidden", 0, false))
        .await
        .expect("member");

    let team = storage.list_team(3).await.expect("team");
    let names: Vec<&str> = team.iter().map(|m| m.fields.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn class_listing_embeds_teacher() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let teacher = storage
        .insert_team_member(&member("Anna", 1, true))
        .await
        .expect("member");
    storage
        .insert_class(&ClassOffering {
            title: "Art".into(),
            price_cents: 1_250,
            image: None,
            position: 1,
            is_visible: true,
            teacher_id: teacher,
            age: "3-5 Years".into(),
            time: "9-10 AM".into(),
            capacity: "30 Kids".into(),
        })
        .await
        .expect("class");

    let classes = storage.list_classes().await.expect("classes");
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].teacher.fields.name, "Anna");
    assert_eq!(classes[0].price, "12.50");
}

#[tokio::test]
async fn gallery_sample_is_capped() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage.sample_gallery(6).await.expect("empty").is_empty());

    for position in 1..=9 {
        storage
            .insert_gallery_image(&GalleryImage {
                image: Some(format!("gallery/{position}.jpg")),
                position,
                is_visible: true,
            })
            .await
            .expect("image");
    }
    let sample = storage.sample_gallery(6).await.expect("sample");
    assert_eq!(sample.len(), 6);
}

#[tokio::test]
async fn singleton_read_reports_missing_and_duplicated_rows() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let err = storage.headlines().await.expect_err("empty table");
    assert_eq!(
        err.downcast_ref::<SingletonError>(),
        Some(&SingletonError::Missing { table: "headlines" })
    );

    let headlines = shared::domain::Headlines {
        title_facilities: "Facilities".into(),
        desc_facilities: String::new(),
        title_classes: "Classes".into(),
        desc_classes: String::new(),
        title_teachers: "Teachers".into(),
        desc_teachers: String::new(),
        title_testimonial: "Parents say".into(),
        desc_testimonial: String::new(),
    };
    storage.insert_headlines(&headlines).await.expect("insert");
    assert_eq!(
        storage.headlines().await.expect("one row").fields,
        headlines
    );

    storage.insert_headlines(&headlines).await.expect("insert");
    let err = storage.headlines().await.expect_err("two rows");
    assert_eq!(
        err.downcast_ref::<SingletonError>(),
        Some(&SingletonError::Duplicated {
            table: "headlines",
            count: 2
        })
    );
}

#[tokio::test]
async fn lead_ids_are_unique_across_kinds() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let subscription = storage
        .insert_lead(&NewLead::Subscription(Subscription {
            email: "a@b.com".into(),
        }))
        .await
        .expect("subscription");
    let contact = storage
        .insert_lead(&NewLead::ContactUs(shared::domain::ContactUs {
            name: "Ivan".into(),
            email: "ivan@example.com".into(),
            subject: "Tour".into(),
            message: String::new(),
        }))
        .await
        .expect("contact");

    assert_ne!(subscription, contact);
    assert_eq!(
        storage.lead_kind(subscription).await.expect("kind"),
        Some(LeadKind::Subscription)
    );
    assert_eq!(
        storage.lead_kind(contact).await.expect("kind"),
        Some(LeadKind::ContactUs)
    );
}

#[tokio::test]
async fn new_leads_are_unprocessed_and_dated_today() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .insert_lead(&NewLead::Subscription(Subscription {
            email: "a@b.com".into(),
        }))
        .await
        .expect("lead");

    let leads = storage
        .list_unprocessed_subscriptions()
        .await
        .expect("leads");
    assert_eq!(leads.len(), 1);
    assert!(!leads[0].is_processed);
    assert_eq!(leads[0].date, chrono::Utc::now().date_naive());
    assert_eq!(leads[0].date, leads[0].date_processing);
}

#[tokio::test]
async fn marking_processed_is_idempotent() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let id = storage
        .insert_lead(&NewLead::Subscription(Subscription {
            email: "a@b.com".into(),
        }))
        .await
        .expect("lead");

    assert_eq!(
        storage.mark_lead_processed(id).await.expect("first"),
        MarkOutcome::Processed(LeadKind::Subscription)
    );
    assert_eq!(
        storage.mark_lead_processed(id).await.expect("second"),
        MarkOutcome::AlreadyProcessed(LeadKind::Subscription)
    );
    assert!(storage
        .list_unprocessed_subscriptions()
        .await
        .expect("leads")
        .is_empty());
    assert_eq!(
        storage.count_leads(LeadKind::Subscription).await.expect("count"),
        1
    );
}

#[tokio::test]
async fn marking_unknown_lead_is_a_no_op() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(
        storage
            .mark_lead_processed(shared::domain::LeadId(404))
            .await
            .expect("mark"),
        MarkOutcome::NotFound
    );
}

#[tokio::test]
async fn actor_carries_group_membership() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let user = storage.create_user("olga").await.expect("user");
    assert_eq!(storage.create_user("olga").await.expect("same user"), user);

    storage
        .add_user_to_group(user, MANAGER_GROUP)
        .await
        .expect("group");
    storage
        .add_user_to_group(user, MANAGER_GROUP)
        .await
        .expect("group twice");

    let actor = storage.load_actor(user).await.expect("load").expect("actor");
    assert_eq!(actor.username, "olga");
    assert_eq!(actor.groups, vec![MANAGER_GROUP.to_string()]);

    storage
        .remove_user_from_group(user, MANAGER_GROUP)
        .await
        .expect("remove");
    let actor = storage.load_actor(user).await.expect("load").expect("actor");
    assert!(actor.groups.is_empty());

    assert!(storage
        .load_actor(UserId(9_999))
        .await
        .expect("load")
        .is_none());
}

#[tokio::test]
async fn demo_seed_fills_every_singleton() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let report = storage
        .apply_seed(&shared::seed::SiteSeed::demo())
        .await
        .expect("seed");
    assert_eq!(report.singletons, 6);
    assert_eq!(report.classes, 3);

    storage.about().await.expect("about");
    storage.facilities().await.expect("facilities");
    storage.call().await.expect("call");
    storage.contacts().await.expect("contacts");
    storage.schedule().await.expect("schedule");
    storage.headlines().await.expect("headlines");
}

#[tokio::test]
async fn seeding_a_class_with_unknown_teacher_fails_without_leftovers() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut seed = shared::seed::SiteSeed::demo();
    seed.team.clear();
    let err = storage.apply_seed(&seed).await.expect_err("no teacher");
    assert!(err.to_string().contains("teacher position"));

    assert!(storage.list_visible_slides().await.expect("slides").is_empty());
    assert!(storage
        .list_visible_testimonials()
        .await
        .expect("testimonials")
        .is_empty());
    assert!(storage.sample_gallery(6).await.expect("gallery").is_empty());
    assert!(storage.about().await.is_err());

    let report = storage
        .apply_seed(&shared::seed::SiteSeed::demo())
        .await
        .expect("corrected seed");
    assert_eq!(report.slides, 1);
    assert_eq!(storage.list_visible_slides().await.expect("slides").len(), 1);
}

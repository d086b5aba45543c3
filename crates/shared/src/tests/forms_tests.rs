use super::*;

fn input(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn subscription_only_payload_matches_subscription() {
    let lead = validate_submission(&input(&[("email", "a@b.com")])).expect("match");
    assert_eq!(
        lead,
        NewLead::Subscription(Subscription {
            email: "a@b.com".into()
        })
    );
}

#[test]
fn full_appointment_payload_wins_over_other_forms() {
    let lead = validate_submission(&input(&[
        ("name", "Olena"),
        ("email", "olena@example.com"),
        ("child_name", "Taras"),
        ("child_age", "5"),
        ("subject", "ignored"),
    ]))
    .expect("match");
    match lead {
        NewLead::Appointment(appointment) => {
            assert_eq!(appointment.child_age, 5);
            assert_eq!(appointment.message, "");
        }
        other => panic!("expected appointment, got {other:?}"),
    }
}

#[test]
fn contact_payload_is_matched_before_subscription() {
    let lead = validate_submission(&input(&[
        ("name", "Ivan"),
        ("email", "ivan@example.com"),
        ("subject", "Tour"),
        ("message", "Can we visit on Friday?"),
    ]))
    .expect("match");
    assert_eq!(lead.kind(), LeadKind::ContactUs);
}

#[test]
fn payload_without_email_matches_nothing() {
    let errors = validate_submission(&input(&[("name", "Ivan"), ("subject", "Tour")]))
        .expect_err("no match");
    assert!(errors
        .subscription
        .iter()
        .any(|e| e.field == "email" && e.message.contains("required")));
    assert!(errors.for_kind(LeadKind::Appointment).len() >= 3);
}

#[test]
fn appointment_names_need_two_characters() {
    let errors = validate_appointment(&input(&[
        ("name", "O"),
        ("email", "olena@example.com"),
        ("child_name", "T"),
        ("child_age", "5"),
    ]))
    .expect_err("too short");
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, vec!["name", "child_name"]);
}

#[test]
fn appointment_child_age_must_be_a_small_number() {
    for age in ["abc", "100", "-1"] {
        let result = validate_appointment(&input(&[
            ("name", "Olena"),
            ("email", "olena@example.com"),
            ("child_name", "Taras"),
            ("child_age", age),
        ]));
        assert!(result.is_err(), "age {age:?} should be rejected");
    }
}

#[test]
fn message_limit_is_shared_by_both_forms() {
    let long = "x".repeat(MAX_MESSAGE_LEN + 1);
    let contact = validate_contact_us(&input(&[
        ("name", "Ivan"),
        ("email", "ivan@example.com"),
        ("subject", "Tour"),
        ("message", &long),
    ]));
    assert!(contact.is_err());

    let exact = "x".repeat(MAX_MESSAGE_LEN);
    let contact = validate_contact_us(&input(&[
        ("name", "Ivan"),
        ("email", "ivan@example.com"),
        ("subject", "Tour"),
        ("message", &exact),
    ]));
    assert!(contact.is_ok());
}

#[test]
fn lengths_count_characters_not_bytes() {
    let result = validate_contact_us(&input(&[
        ("name", &"Ї".repeat(50)),
        ("email", "ivan@example.com"),
        ("subject", "Тема"),
    ]));
    assert!(result.is_ok());
}

#[test]
fn values_are_trimmed() {
    let lead = validate_subscription(&input(&[("email", "  a@b.com \n")])).expect("valid");
    assert_eq!(lead.email, "a@b.com");
}

#[test]
fn email_syntax() {
    for good in ["a@b.com", "first.last+tag@sub.example.org", "x_y@mail-host.io"] {
        assert!(is_valid_email(good), "{good} should be valid");
    }
    for bad in [
        "plain",
        "@b.com",
        "a@",
        "a@b",
        "a..b@c.com",
        ".a@c.com",
        "a@-b.com",
        "a@b.c",
        "a b@c.com",
        "a@b..com",
    ] {
        assert!(!is_valid_email(bad), "{bad} should be invalid");
    }
}

#[test]
fn rejected_submission_is_attributed_to_the_closest_form() {
    assert_eq!(
        likely_intended(&input(&[("email", "not-an-email")])),
        Some(LeadKind::Subscription)
    );
    assert_eq!(
        likely_intended(&input(&[
            ("name", "Ivan"),
            ("email", "ivan@example"),
            ("subject", "Tour")
        ])),
        Some(LeadKind::ContactUs)
    );
    assert_eq!(
        likely_intended(&input(&[
            ("name", "Olena"),
            ("child_name", "T"),
            ("child_age", "4")
        ])),
        Some(LeadKind::Appointment)
    );
    assert_eq!(likely_intended(&input(&[("csrf", "x"), ("email", " ")])), None);
}

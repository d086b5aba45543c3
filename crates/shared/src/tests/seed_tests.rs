use super::*;

#[test]
fn sample_seed_document_parses_with_defaults() {
    let seed: SiteSeed =
        toml::from_str(include_str!("../../../../demos/site.toml")).expect("seed toml");

    assert_eq!(seed.team.len(), 2);
    assert!(seed.team[1].is_visible);
    assert_eq!(seed.team[1].twitter_url, "https://twitter.com/");
    assert_eq!(seed.classes[0].capacity, "30 Kids");
    assert_eq!(seed.classes[1].time, "10-11 AM");
    assert_eq!(
        seed.facilities.as_ref().expect("facilities").columns[3].heading,
        "Transport"
    );
    assert!(seed.headlines.is_some());
}

#[test]
fn empty_document_is_an_empty_seed() {
    let seed: SiteSeed = toml::from_str("").expect("seed toml");
    assert!(seed.team.is_empty());
    assert!(seed.about.is_none());
}

#[test]
fn class_seed_keeps_fields_when_resolved() {
    let class = SiteSeed::demo().classes.remove(0);
    let offering = class.into_offering(TeamId(9));
    assert_eq!(offering.teacher_id, TeamId(9));
    assert_eq!(offering.price_display(), "99.00");
}

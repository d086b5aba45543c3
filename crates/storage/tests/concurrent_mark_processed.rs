use shared::domain::{LeadKind, NewLead, Subscription};
use storage::{MarkOutcome, Storage};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_managers_mark_each_lead_exactly_once() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("site.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));
    let storage = Storage::new(&database_url).await.expect("db");

    let mut ids = Vec::new();
    for n in 0..40 {
        let id = storage
            .insert_lead(&NewLead::Subscription(Subscription {
                email: format!("parent{n}@example.com"),
            }))
            .await
            .expect("lead");
        ids.push(id);
    }

    let mut tasks = Vec::new();
    for _round in 0..3 {
        for &id in &ids {
            let storage = storage.clone();
            tasks.push(tokio::spawn(
                async move { storage.mark_lead_processed(id).await },
            ));
        }
    }

    let mut processed = 0;
    let mut already = 0;
    for task in tasks {
        match task.await.expect("join").expect("mark must not fail") {
            MarkOutcome::Processed(LeadKind::Subscription) => processed += 1,
            MarkOutcome::AlreadyProcessed(LeadKind::Subscription) => already += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(processed, 40);
    assert_eq!(already, 80);
    assert!(storage
        .list_unprocessed_subscriptions()
        .await
        .expect("leads")
        .is_empty());
}

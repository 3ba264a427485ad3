//! Ledger tests against a live MongoDB.
//!
//! Ignored by default; run with `cargo test -- --ignored` and `MONGODB_URI`
//! pointing at a reachable instance. Each test uses a throwaway database
//! that is dropped on the way out.

use bson::{doc, oid::ObjectId};
use learngate::auth::Caller;
use learngate::catalog::{CatalogStore, CourseInput};
use learngate::db::schemas::{CourseLevel, Role};
use learngate::db::MongoClient;
use learngate::enrollment::EnrollmentLedger;
use learngate::types::LearngateError;

fn mongo_uri() -> String {
    std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

async fn throwaway_client() -> (MongoClient, String) {
    let db_name = format!("learngate_test_{}", ObjectId::new().to_hex());
    let client = MongoClient::new(&mongo_uri(), &db_name)
        .await
        .expect("MongoDB not reachable");
    (client, db_name)
}

async fn drop_db(db_name: &str) {
    if let Ok(client) = mongodb::Client::with_uri_str(&mongo_uri()).await {
        let _ = client.database(db_name).drop().await;
    }
}

fn learner() -> Caller {
    Caller {
        account_id: ObjectId::new(),
        email: "learner@example.com".into(),
        role: Role::Learner,
    }
}

fn course_input() -> CourseInput {
    CourseInput {
        title: "Rust Fundamentals".into(),
        description: "Learn Rust from scratch with hands-on examples".into(),
        price: 0.0,
        thumbnail_media_id: None,
        category: "backend".into(),
        level: CourseLevel::Beginner,
        modules: vec![],
        is_published: true,
    }
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_progress_update_without_enrollment_creates_nothing() {
    let (mongo, db_name) = throwaway_client().await;
    let catalog = CatalogStore::new(&mongo).await.unwrap();
    let ledger = EnrollmentLedger::new(&mongo).await.unwrap();

    let course = catalog.create(course_input(), ObjectId::new()).await.unwrap();
    let course_id = course.id.unwrap();

    let err = ledger
        .set_lesson_completion(&learner(), course_id, ObjectId::new(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, LearngateError::NotFound(_)));

    // The failed update must not have conjured a record
    assert_eq!(ledger.collection().count(doc! {}).await.unwrap(), 0);

    drop_db(&db_name).await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_concurrent_enroll_yields_single_record() {
    let (mongo, db_name) = throwaway_client().await;
    let catalog = CatalogStore::new(&mongo).await.unwrap();
    let ledger = EnrollmentLedger::new(&mongo).await.unwrap();

    let course = catalog.create(course_input(), ObjectId::new()).await.unwrap();
    let course_id = course.id.unwrap();
    let caller = learner();

    let (a, b) = tokio::join!(
        ledger.enroll(&caller, course_id),
        ledger.enroll(&caller, course_id)
    );

    // Exactly one winner; the loser sees a conflict whichever way the race
    // interleaved (pre-check or unique index)
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    for result in [a, b] {
        if let Err(e) = result {
            assert!(matches!(e, LearngateError::Conflict(_)));
        }
    }

    let count = ledger
        .collection()
        .count(doc! { "account": caller.account_id, "course": course_id })
        .await
        .unwrap();
    assert_eq!(count, 1);

    drop_db(&db_name).await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_enroll_in_missing_course_creates_nothing() {
    let (mongo, db_name) = throwaway_client().await;
    let ledger = EnrollmentLedger::new(&mongo).await.unwrap();

    let err = ledger
        .enroll(&learner(), ObjectId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LearngateError::NotFound(_)));
    assert_eq!(ledger.collection().count(doc! {}).await.unwrap(), 0);

    drop_db(&db_name).await;
}

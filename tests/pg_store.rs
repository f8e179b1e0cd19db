//! `PgStore` against a real PostgreSQL server.
//!
//! Each test gets a fresh database with the migrations applied. They need
//! `DATABASE_URL` and run with `cargo test -- --ignored`.

use discussion_forum::store::{ForumStore, PgStore, StoreError};
use sqlx::PgPool;

async fn question_count(store: &PgStore, course_id: i32) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn question_for_missing_course_is_course_not_found(pool: PgPool) {
    let store = PgStore::from_pool(pool);

    let err = store
        .create_question(404, "Anyone?", "Hello there")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::CourseNotFound(404)), "{:?}", err);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deleting_a_course_cascades_to_questions(pool: PgPool) {
    let store = PgStore::from_pool(pool);
    let keep = store.create_course("Keep").await.unwrap();
    let gone = store.create_course("Gone").await.unwrap();
    store.create_question(keep.id, "Kept", "stays here").await.unwrap();
    store.create_question(gone.id, "Lost", "goes away").await.unwrap();
    store.create_question(gone.id, "Lost too", "also goes").await.unwrap();

    let deleted = store.delete_course(gone.id).await.unwrap();
    assert_eq!(deleted, Some(gone.clone()));

    assert_eq!(question_count(&store, gone.id).await, 0);
    assert_eq!(question_count(&store, keep.id).await, 1);
    assert!(store.get_course(gone.id).await.unwrap().is_none());
    assert!(store.delete_course(gone.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn upvotes_accumulate(pool: PgPool) {
    let store = PgStore::from_pool(pool);
    let course = store.create_course("CS101").await.unwrap();
    let question = store.create_question(course.id, "Why?", "Explain X").await.unwrap();
    assert_eq!(question.upvotes, 0);

    store.upvote_question(course.id, question.id).await.unwrap();
    let upvoted = store.upvote_question(course.id, question.id).await.unwrap().unwrap();
    assert_eq!(upvoted.upvotes, 2);

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.upvote_question(course.id, question.id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let listed = store.list_questions(course.id).await.unwrap();
    assert_eq!(listed[0].upvotes, 12);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn question_ids_are_scoped_to_their_course(pool: PgPool) {
    let store = PgStore::from_pool(pool);
    let first = store.create_course("First").await.unwrap();
    let second = store.create_course("Second").await.unwrap();
    let question = store.create_question(second.id, "Mine", "Course two").await.unwrap();

    assert!(store.upvote_question(first.id, question.id).await.unwrap().is_none());
    assert!(store.delete_question(first.id, question.id).await.unwrap().is_none());

    let listed = store.list_questions(second.id).await.unwrap();
    assert_eq!(listed, vec![question.clone()]);

    let deleted = store.delete_question(second.id, question.id).await.unwrap();
    assert_eq!(deleted, Some(question));
    assert!(store.list_questions(second.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn listings_are_ordered_by_id(pool: PgPool) {
    let store = PgStore::from_pool(pool);
    for name in ["Zoology", "Algebra", "Music"] {
        store.create_course(name).await.unwrap();
    }
    let ids: Vec<_> = store.list_courses().await.unwrap().iter().map(|c| c.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);

    let course = store.create_course("Physics").await.unwrap();
    let a = store.create_question(course.id, "First", "asked first").await.unwrap();
    let b = store.create_question(course.id, "Second", "asked second").await.unwrap();
    // An UPDATE rewrites the row at the end of the heap.
    store.upvote_question(course.id, a.id).await.unwrap();

    let ids: Vec<_> = store
        .list_questions(course.id)
        .await
        .unwrap()
        .iter()
        .map(|q| q.id)
        .collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ping_and_repeat_migrations_succeed(pool: PgPool) {
    let store = PgStore::from_pool(pool);
    store.migrate().await.unwrap();
    store.ping().await.unwrap();
}

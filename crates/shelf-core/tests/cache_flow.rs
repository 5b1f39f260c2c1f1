//! Query cache against a fake book service: sharing, cache-first reads and
//! refetch after writes.

mod fixtures;

use std::time::Duration;

use fixtures::{FakeBookService, can_bind_localhost};
use serde_json::json;
use shelf_core::AppContext;
use shelf_core::api::queries::{self, BooksData, LoginUserData, ReviewsByBookData};
use shelf_core::api::decode;
use shelf_core::config::Config;
use shelf_core::models::{CreateReviewInput, LoginUserInput};
use shelf_core::session::MemoryStorage;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context_for(server: &MockServer) -> AppContext {
    let config = Config {
        api_url: server.uri(),
        ..Config::default()
    };
    AppContext::with_storage(config, MemoryStorage::new()).unwrap()
}

async fn serve(fake: &FakeBookService) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(fake.clone())
        .mount(&server)
        .await;
    server
}

async fn login(ctx: &AppContext, username: &str) {
    let data = ctx
        .cache
        .mutate(&queries::login_user(&LoginUserInput {
            username: username.into(),
            password: "pw".into(),
        }))
        .await
        .unwrap();
    let payload = decode::<LoginUserData>(&data).unwrap().payload;
    ctx.session.set_session(payload.user, payload.token);
}

#[tokio::test]
async fn test_concurrent_identical_reads_share_one_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "GetBooks" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "books": [] } }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context_for(&server);
    let query = queries::get_books();

    let (a, b) = tokio::join!(ctx.cache.fetch(&query), ctx.cache.fetch(&query));
    assert!(a.error.is_none());
    assert_eq!(a.data, b.data);

    // Cache-first: a stored value is served without a request.
    let c = ctx.cache.fetch(&query).await;
    assert!(!c.loading);
    assert_eq!(c.decode::<BooksData>().data.unwrap().books.len(), 0);
}

#[tokio::test]
async fn test_refetch_after_failure_shows_loading_not_stale_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": null, "errors": [{ "message": "down" }] })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "books": [] } }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let ctx = context_for(&server);
    let query = queries::get_books();

    let failed = ctx.cache.fetch(&query).await;
    assert_eq!(failed.error.map(|e| e.to_string()).as_deref(), Some("down"));

    let (done, mid_flight) = tokio::join!(ctx.cache.refetch(&query), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.cache.read(&query)
    });
    assert!(mid_flight.loading);
    assert!(mid_flight.error.is_none());
    assert!(mid_flight.data.is_none());

    assert!(!done.loading);
    assert!(done.error.is_none());
    assert!(done.data.is_some());
}

#[tokio::test]
async fn test_refetch_always_hits_the_network() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let fake = FakeBookService::new();
    fake.add_user("u1", "ann").add_book("b1", "Dune", "u1");
    let server = serve(&fake).await;
    let ctx = context_for(&server);

    ctx.cache.fetch(&queries::get_books()).await;
    ctx.cache.refetch(&queries::get_books()).await;
    assert_eq!(fake.requests_for("GetBooks").len(), 2);
}

#[tokio::test]
async fn test_skipped_read_sends_nothing_and_shows_nothing() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let fake = FakeBookService::new();
    fake.add_user("u1", "ann");
    let server = serve(&fake).await;
    let ctx = context_for(&server);

    // Populate the entry for a real author first.
    let loaded = ctx.cache.fetch(&queries::get_user(Some("u1"))).await;
    assert!(loaded.data.is_some());

    let skipped = ctx.cache.fetch(&queries::get_user(None)).await;
    assert!(!skipped.loading);
    assert!(skipped.data.is_none());
    assert!(skipped.error.is_none());
    assert!(ctx.cache.read(&queries::get_user(None)).data.is_none());
    assert_eq!(fake.requests_for("GetUser").len(), 1);
}

#[tokio::test]
async fn test_review_appears_in_refetched_list() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let fake = FakeBookService::new();
    fake.add_user("author", "writer")
        .add_user("u1", "ann")
        .add_book("b1", "Dune", "author");
    let server = serve(&fake).await;
    let ctx = context_for(&server);
    login(&ctx, "ann").await;

    let reviews_query = queries::reviews_by_book("b1");
    let before = ctx.cache.fetch(&reviews_query).await;
    assert!(before
        .decode::<ReviewsByBookData>()
        .data
        .unwrap()
        .reviews
        .is_empty());

    let input = CreateReviewInput::new("b1", 4, "Loved it").unwrap();
    ctx.cache
        .mutate(&queries::create_review(&input))
        .await
        .unwrap();

    let after = ctx.cache.read(&reviews_query).decode::<ReviewsByBookData>();
    let reviews = after.data.unwrap().reviews;
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].user_id, "u1");
    assert_eq!(reviews[0].rating, 4);

    let create = fake.requests_for("CreateReview");
    assert_eq!(create[0].authorization.as_deref(), Some("Bearer token-u1"));
}

#[tokio::test]
async fn test_deleting_a_review_leaves_other_books_untouched() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let fake = FakeBookService::new();
    fake.add_user("u1", "ann")
        .add_user("u2", "bob")
        .add_book("b1", "Dune", "u2")
        .add_book("b2", "Emma", "u2")
        .add_review("r1", "b1", "u1", 5)
        .add_review("r2", "b1", "u2", 3)
        .add_review("r3", "b2", "u1", 2);
    let server = serve(&fake).await;
    let ctx = context_for(&server);
    login(&ctx, "ann").await;

    let b1 = queries::reviews_by_book("b1");
    let b2 = queries::reviews_by_book("b2");
    ctx.cache.fetch(&b1).await;
    let b2_before = ctx.cache.fetch(&b2).await;

    ctx.cache
        .mutate(&queries::delete_review("r1", "b1"))
        .await
        .unwrap();

    let ids: Vec<_> = ctx
        .cache
        .read(&b1)
        .decode::<ReviewsByBookData>()
        .data
        .unwrap()
        .reviews
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["r2"]);
    assert_eq!(ctx.cache.read(&b2), b2_before);
    assert_eq!(fake.requests_for("ReviewsByBook").len(), 3);
}

#[tokio::test]
async fn test_failed_write_refetches_nothing() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let fake = FakeBookService::new();
    fake.add_user("author", "writer")
        .add_user("u1", "ann")
        .add_book("b1", "Dune", "author")
        .add_review("r1", "b1", "u1", 5);
    let server = serve(&fake).await;
    let ctx = context_for(&server);
    login(&ctx, "ann").await;

    ctx.cache.fetch(&queries::reviews_by_book("b1")).await;

    let input = CreateReviewInput::new("b1", 3, "").unwrap();
    let err = ctx
        .cache
        .mutate(&queries::create_review(&input))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "You have already reviewed this book");
    assert_eq!(fake.requests_for("ReviewsByBook").len(), 1);
}

#[tokio::test]
async fn test_update_book_refreshes_list_and_detail() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let fake = FakeBookService::new();
    fake.add_user("u1", "ann").add_book("b1", "Dune", "u1");
    let server = serve(&fake).await;
    let ctx = context_for(&server);
    login(&ctx, "ann").await;

    ctx.cache.fetch(&queries::get_books()).await;
    ctx.cache.fetch(&queries::get_book("b1")).await;

    let input = shelf_core::models::BookInput::new("Dune Messiah", "Sequel", 1969, &[]);
    ctx.cache
        .mutate(&queries::update_book("b1", &input))
        .await
        .unwrap();

    let detail = ctx
        .cache
        .read(&queries::get_book("b1"))
        .decode::<queries::BookData>()
        .data
        .unwrap()
        .book
        .unwrap();
    assert_eq!(detail.title, "Dune Messiah");
    let list = ctx
        .cache
        .read(&queries::get_books())
        .decode::<BooksData>()
        .data
        .unwrap()
        .books;
    assert_eq!(list[0].publish_year, 1969);
}

#[tokio::test]
async fn test_logout_evicts_cached_reads() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let fake = FakeBookService::new();
    fake.add_user("u1", "ann").add_book("b1", "Dune", "u1");
    let server = serve(&fake).await;
    let ctx = context_for(&server);
    login(&ctx, "ann").await;

    let mut updates = ctx.cache.subscribe();
    ctx.cache.fetch(&queries::get_books()).await;
    assert_eq!(updates.recv().await.unwrap(), queries::get_books().key());

    ctx.logout();
    assert!(ctx.session.current().is_none());
    assert!(ctx.cache.read(&queries::get_books()).data.is_none());
    assert_eq!(updates.recv().await.unwrap(), queries::get_books().key());
}

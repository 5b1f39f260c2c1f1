//! Subcommands against a fake book service.

#[path = "../../shelf-core/tests/fixtures.rs"]
mod fixtures;

use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::{FakeBookService, can_bind_localhost};
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer};

struct Harness {
    home: TempDir,
    server: MockServer,
    fake: FakeBookService,
}

impl Harness {
    async fn start() -> Self {
        let server = MockServer::start().await;
        let fake = FakeBookService::new();
        fake.add_user("u1", "ann").add_user("u2", "bob");
        fake.add_book("b1", "Dune", "u1");
        Mock::given(method("POST"))
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        Self {
            home: TempDir::new().unwrap(),
            server,
            fake,
        }
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("shelf");
        cmd.env("SHELF_HOME", self.home.path())
            .env("SHELF_API_URL", self.server.uri())
            .env_remove("SHELF_NOTIFICATIONS_URL");
        cmd
    }

    fn login(&self, username: &str) {
        self.cmd()
            .args(["login", "--username", username])
            .env("SHELF_PASSWORD", "secret")
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("Logged in as {username}")));
    }
}

#[tokio::test]
async fn test_books_list_shows_titles_and_authors() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let h = Harness::start().await;

    h.cmd()
        .args(["books", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dune"))
        .stdout(predicate::str::contains("ann"));
}

#[tokio::test]
async fn test_books_show_lists_reviews_with_usernames() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let h = Harness::start().await;
    h.fake.add_review("r1", "b1", "u2", 4);

    h.cmd()
        .args(["books", "show", "b1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dune"))
        .stdout(predicate::str::contains("By: ann"))
        .stdout(predicate::str::contains("Reviews (1)"))
        .stdout(predicate::str::contains("4/5"))
        .stdout(predicate::str::contains("bob"));
}

#[tokio::test]
async fn test_books_show_unknown_id_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let h = Harness::start().await;

    h.cmd()
        .args(["books", "show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Book not found"));
}

#[tokio::test]
async fn test_login_persists_session_for_later_commands() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let h = Harness::start().await;
    h.login("bob");

    h.cmd()
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("bob (u2)"));

    h.cmd()
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));

    h.cmd()
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

#[tokio::test]
async fn test_failed_login_reports_service_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let h = Harness::start().await;

    h.cmd()
        .args(["login", "--username", "nobody"])
        .env("SHELF_PASSWORD", "secret")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid username or password"));
    assert!(!h.home.path().join("auth.json").exists());
}

#[tokio::test]
async fn test_review_of_own_book_is_refused_before_sending() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let h = Harness::start().await;
    h.login("ann");

    h.cmd()
        .args(["reviews", "add", "b1", "--rating", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You can't review your own book."));
    assert!(h.fake.requests_for("CreateReview").is_empty());
}

#[tokio::test]
async fn test_review_is_posted_with_bearer_token() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let h = Harness::start().await;
    h.login("bob");

    h.cmd()
        .args(["reviews", "add", "b1", "--rating", "4", "--comment", "Great"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Review posted."));

    let sent = h.fake.requests_for("CreateReview");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].authorization.as_deref(), Some("Bearer token-u2"));
    assert_eq!(sent[0].variables["input"]["rating"], 4);

    h.cmd()
        .args(["reviews", "list", "b1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4/5"))
        .stdout(predicate::str::contains("Great"));
}

#[tokio::test]
async fn test_only_author_can_delete_book() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let h = Harness::start().await;
    h.login("bob");

    h.cmd()
        .args(["books", "delete", "b1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Only the author can delete this book."));
    assert!(h.fake.requests_for("DeleteBook").is_empty());
}

#[tokio::test]
async fn test_create_book_rejects_bad_year() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let h = Harness::start().await;
    h.login("ann");

    h.cmd()
        .args(["books", "create", "--title", "Emma", "--year", "soon"])
        .assert()
        .failure();
    assert!(h.fake.requests_for("CreateBook").is_empty());

    h.cmd()
        .args(["books", "create", "--title", "Emma", "--year", "1815"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created book Emma"));
}

//! Engine behavior tests against in-memory fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use kut_core::{Config, SourceRow};
use kut_keycloak::{ApiError, CreateOutcome, CredentialRepresentation, UserRepresentation};
use kut_source::SourceError;
use kut_transfer::{RowSource, TransferEngine, UserSink};

fn config() -> Config {
    Config::from_yaml_str(
        r"
source:
  url: postgres://localhost/app
  table: users
  batch_size: 2
keycloak:
  base_url: http://localhost:8080
  realm: customers
  client_secret: s3cret
mapping:
  username: login
  email: mail
",
    )
    .unwrap()
}

fn row(key: &str, login: Option<&str>, mail: Option<&str>) -> SourceRow {
    SourceRow::new(key)
        .with_column("login", login)
        .with_column("mail", mail)
}

struct FakeSource {
    rows: Vec<SourceRow>,
    batch_size: u32,
}

#[async_trait]
impl RowSource for FakeSource {
    async fn count(&self) -> Result<u64, SourceError> {
        Ok(self.rows.len() as u64)
    }

    fn batch_size(&self) -> u32 {
        self.batch_size
    }

    async fn fetch_batch(&self, offset: u64) -> Result<Vec<SourceRow>, SourceError> {
        let start = (offset as usize).min(self.rows.len());
        let end = (start + self.batch_size as usize).min(self.rows.len());
        Ok(self.rows[start..end].to_vec())
    }
}

#[derive(Default)]
struct FakeSink {
    users: Mutex<HashMap<String, UserRepresentation>>,
    creates: AtomicUsize,
    updates: AtomicUsize,
    resets: AtomicUsize,
    // Simulates losing the lookup/create race.
    conflict_on_create: bool,
}

impl FakeSink {
    fn with_user(self, username: &str, id: &str) -> Self {
        let mut rep = UserRepresentation::new(username);
        rep.id = Some(id.to_string());
        self.users
            .lock()
            .unwrap()
            .insert(username.to_string(), rep);
        self
    }

    fn user(&self, username: &str) -> Option<UserRepresentation> {
        self.users.lock().unwrap().get(username).cloned()
    }

    fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserSink for FakeSink {
    async fn find_by_username(
        &self,
        _realm: &str,
        username: &str,
    ) -> Result<Option<UserRepresentation>, ApiError> {
        if self.conflict_on_create {
            // Pretend the user is not there yet so create hits the 409.
            if self.creates.load(Ordering::SeqCst) == 0 {
                return Ok(None);
            }
        }
        Ok(self.user(username))
    }

    async fn create(
        &self,
        _realm: &str,
        user: &UserRepresentation,
    ) -> Result<CreateOutcome, ApiError> {
        self.creates.fetch_add(1, Ordering::SeqCst);

        let mut users = self.users.lock().unwrap();
        if self.conflict_on_create || users.contains_key(&user.username) {
            let mut rep = user.clone();
            rep.id = Some(format!("id-{}", users.len()));
            users.entry(user.username.clone()).or_insert(rep);
            return Ok(CreateOutcome::AlreadyExists);
        }

        let id = format!("id-{}", users.len());
        let mut rep = user.clone();
        rep.id = Some(id.clone());
        rep.credentials.clear();
        users.insert(user.username.clone(), rep);
        Ok(CreateOutcome::Created(Some(id)))
    }

    async fn update(
        &self,
        _realm: &str,
        id: &str,
        user: &UserRepresentation,
    ) -> Result<(), ApiError> {
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut users = self.users.lock().unwrap();
        let mut rep = user.clone();
        rep.id = Some(id.to_string());
        rep.credentials.clear();
        users.insert(user.username.clone(), rep);
        Ok(())
    }

    async fn reset_password(
        &self,
        _realm: &str,
        _id: &str,
        _credential: &CredentialRepresentation,
    ) -> Result<(), ApiError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn transfers_new_users() {
    let source = FakeSource {
        rows: vec![
            row("1", Some("alice"), Some("alice@example.com")),
            row("2", Some("bob"), Some("bob@example.com")),
            row("3", Some("carol"), None),
        ],
        batch_size: 2,
    };
    let sink = FakeSink::default();
    let config = config();

    let report = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.added, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(sink.len(), 3);
    assert_eq!(
        sink.user("alice").unwrap().email.as_deref(),
        Some("alice@example.com")
    );
    assert_eq!(sink.user("carol").unwrap().email, None);
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let source = FakeSource {
        rows: vec![
            row("1", Some("alice"), Some("alice@example.com")),
            row("2", Some("bob"), None),
        ],
        batch_size: 10,
    };
    let sink = FakeSink::default();
    let config = config();

    let first = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();
    let second = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(first.added, 2);
    assert_eq!(second.added, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(sink.len(), 2);
    assert_eq!(sink.creates.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn update_existing_replaces_profile() {
    let source = FakeSource {
        rows: vec![row("1", Some("alice"), Some("new@example.com"))],
        batch_size: 10,
    };
    let sink = FakeSink::default().with_user("alice", "id-0");
    let mut config = config();
    config.transfer.update_existing = true;

    let report = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.added, 0);
    assert_eq!(
        sink.user("alice").unwrap().email.as_deref(),
        Some("new@example.com")
    );
    assert_eq!(sink.updates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn bad_record_does_not_abort_run() {
    let source = FakeSource {
        rows: vec![
            row("1", Some("alice"), None),
            row("2", None, Some("ghost@example.com")),
            row("3", Some("carol"), None),
        ],
        batch_size: 10,
    };
    let sink = FakeSink::default();
    let config = config();

    let report = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors[0].source_key, "2");
    assert!(report.errors[0].message.contains("NULL or empty"));
    assert_eq!(sink.len(), 2);
}

#[tokio::test]
async fn fail_fast_stops_after_first_failure() {
    let source = FakeSource {
        rows: vec![
            row("1", None, None),
            row("2", Some("bob"), None),
        ],
        batch_size: 10,
    };
    let sink = FakeSink::default();
    let mut config = config();
    config.transfer.fail_fast = true;

    let report = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.total(), 1);
    assert_eq!(sink.len(), 0);
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let source = FakeSource {
        rows: vec![
            row("1", Some("alice"), None),
            row("2", Some("bob"), None),
        ],
        batch_size: 10,
    };
    let sink = FakeSink::default().with_user("bob", "id-9");
    let config = config();

    let report = TransferEngine::new(&source, &sink, &config)
        .dry_run(true)
        .run()
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.added, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(sink.creates.load(Ordering::SeqCst), 0);
    assert_eq!(sink.updates.load(Ordering::SeqCst), 0);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn create_conflict_counts_as_skipped() {
    let source = FakeSource {
        rows: vec![row("1", Some("alice"), None)],
        batch_size: 10,
    };
    let sink = FakeSink {
        conflict_on_create: true,
        ..FakeSink::default()
    };
    let config = config();

    let report = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn empty_source_is_a_clean_run() {
    let source = FakeSource {
        rows: vec![],
        batch_size: 10,
    };
    let sink = FakeSink::default();
    let config = config();

    let report = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.total(), 0);
    assert!(!report.has_failures());
    assert_eq!(sink.creates.load(Ordering::SeqCst), 0);
    assert_eq!(sink.updates.load(Ordering::SeqCst), 0);
    assert_eq!(sink.len(), 0);
}

#[tokio::test]
async fn required_actions_only_attach_to_new_users() {
    let source = FakeSource {
        rows: vec![
            row("1", Some("alice"), None),
            row("2", Some("bob"), None),
        ],
        batch_size: 10,
    };
    let sink = FakeSink::default().with_user("bob", "id-0");
    let mut config = config();
    config.transfer.update_existing = true;
    config.transfer.required_actions = vec!["UPDATE_PASSWORD".to_string()];

    let report = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(
        sink.user("alice").unwrap().required_actions,
        vec!["UPDATE_PASSWORD"]
    );
    assert!(sink.user("bob").unwrap().required_actions.is_empty());
}

#[tokio::test]
async fn usernames_are_lowercased() {
    let source = FakeSource {
        rows: vec![row("1", Some("Alice"), None)],
        batch_size: 10,
    };
    let sink = FakeSink::default();
    let config = config();

    let report = TransferEngine::new(&source, &sink, &config)
        .run()
        .await
        .unwrap();

    assert_eq!(report.added, 1);
    assert!(sink.user("alice").is_some());
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::*;
use crate::domain::user::MockUserRepository;
use crate::domain::{RepositoryResult, User, UserRepository};
use crate::infrastructure::InMemoryUserRepository;
use crate::shared::{InfraError, RepositoryError, RequestContext, UserError, ValidationError};

fn memory() -> (Arc<InMemoryUserRepository>, UserUseCases) {
    let repo = Arc::new(InMemoryUserRepository::new());
    let use_cases = UserUseCases::new(repo.clone());
    (repo, use_cases)
}

fn ctx() -> RequestContext {
    RequestContext::new()
}

fn create_input(name: &str, email: &str) -> CreateUserInput {
    CreateUserInput {
        name: name.into(),
        email: email.into(),
    }
}

fn infra() -> RepositoryError {
    RepositoryError::Internal(InfraError::Storage("connection refused".into()))
}

/// Store whose every call blocks forever.
struct HangingRepository;

#[async_trait]
impl UserRepository for HangingRepository {
    async fn save(&self, _: &User) -> RepositoryResult<()> {
        std::future::pending().await
    }
    async fn find_by_id(&self, _: Uuid) -> RepositoryResult<User> {
        std::future::pending().await
    }
    async fn find_by_email(&self, _: &str) -> RepositoryResult<User> {
        std::future::pending().await
    }
    async fn find_all(&self, _: u64, _: u64) -> RepositoryResult<Vec<User>> {
        std::future::pending().await
    }
    async fn count(&self) -> RepositoryResult<u64> {
        std::future::pending().await
    }
    async fn update(&self, _: &User) -> RepositoryResult<()> {
        std::future::pending().await
    }
    async fn delete(&self, _: Uuid) -> RepositoryResult<()> {
        std::future::pending().await
    }
}

// ── CreateUser ──────────────────────────────────────────────────

#[tokio::test]
async fn create_normalizes_and_persists() {
    let (repo, uc) = memory();
    let out = uc
        .create
        .execute(&ctx(), create_input("  Ada ", " ADA@Example.com "))
        .await
        .unwrap();

    assert_eq!(out.name, "Ada");
    assert_eq!(out.email, "ada@example.com");
    assert_eq!(out.created_at, out.updated_at);

    let stored = repo.find_by_id(out.id).await.unwrap();
    assert_eq!(UserOutput::from(stored), out);
}

#[tokio::test]
async fn create_propagates_validation_errors() {
    let (repo, uc) = memory();

    let err = uc.create.execute(&ctx(), create_input("", "a@b.com")).await.unwrap_err();
    assert!(matches!(err, UserError::Validation(ValidationError::EmptyName)));

    let err = uc
        .create
        .execute(&ctx(), create_input("a", "not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::Validation(ValidationError::InvalidEmail)));

    let err = uc.create.execute(&ctx(), create_input("a", "")).await.unwrap_err();
    assert!(matches!(err, UserError::Validation(ValidationError::InvalidEmail)));

    assert!(repo.is_empty());
}

#[tokio::test]
async fn create_rejects_existing_email_case_insensitively() {
    let (repo, uc) = memory();
    uc.create.execute(&ctx(), create_input("a", "taken@example.com")).await.unwrap();

    let err = uc
        .create
        .execute(&ctx(), create_input("b", "TAKEN@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::EmailExists));
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn create_with_taken_email_never_calls_save() {
    let existing = User::new("a", "taken@example.com").unwrap();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .withf(|email| email == "taken@example.com")
        .times(1)
        .returning(move |_| Ok(existing.clone()));
    repo.expect_save().times(0);

    let uc = CreateUserUseCase::new(Arc::new(repo));
    let err = uc
        .execute(&ctx(), create_input("b", " Taken@Example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::EmailExists));
}

#[tokio::test]
async fn create_reports_store_conflict_as_email_exists() {
    // Another create won the race after our pre-check
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .returning(|_| Err(RepositoryError::NotFound));
    repo.expect_save()
        .times(1)
        .returning(|_| Err(RepositoryError::Conflict));

    let uc = CreateUserUseCase::new(Arc::new(repo));
    let err = uc.execute(&ctx(), create_input("a", "a@example.com")).await.unwrap_err();
    assert!(matches!(err, UserError::EmailExists));
}

#[tokio::test]
async fn create_aborts_on_precheck_infra_failure() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().times(1).returning(|_| Err(infra()));
    repo.expect_save().times(0);

    let uc = CreateUserUseCase::new(Arc::new(repo));
    let err = uc.execute(&ctx(), create_input("a", "a@example.com")).await.unwrap_err();
    match err {
        UserError::Internal { operation, source } => {
            assert_eq!(operation, "failed to check email existence");
            assert!(matches!(source, InfraError::Storage(_)));
        }
        other => panic!("expected internal error, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_creates_with_same_email_admit_one() {
    let (repo, uc) = memory();
    let mut handles = Vec::new();
    for i in 0..8 {
        let create = uc.create.clone();
        handles.push(tokio::spawn(async move {
            create
                .execute(&RequestContext::new(), create_input(&format!("u{i}"), "race@example.com"))
                .await
        }));
    }

    let mut created = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => created += 1,
            Err(UserError::EmailExists) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(repo.len(), 1);
}

// ── GetUser ─────────────────────────────────────────────────────

#[tokio::test]
async fn get_returns_user() {
    let (_, uc) = memory();
    let created = uc.create.execute(&ctx(), create_input("a", "a@example.com")).await.unwrap();
    let fetched = uc.get.execute(&ctx(), created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_unknown_is_not_found() {
    let (_, uc) = memory();
    let err = uc.get.execute(&ctx(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, UserError::NotFound));
}

#[tokio::test]
async fn get_wraps_infra_failure_once() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).returning(|_| Err(infra()));

    let uc = GetUserUseCase::new(Arc::new(repo));
    let err = uc.execute(&ctx(), Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_internal());
    assert_eq!(
        err.to_string(),
        "failed to find user: Storage error: connection refused"
    );
}

// ── ListUsers ───────────────────────────────────────────────────

#[tokio::test]
async fn list_on_empty_store_is_empty() {
    let (_, uc) = memory();
    let out = uc
        .list
        .execute(&ctx(), ListUsersInput { limit: 10, offset: 0 })
        .await
        .unwrap();
    assert!(out.users.is_empty());
    assert_eq!(out.total, 0);
}

#[tokio::test]
async fn list_passes_window_through_unchanged() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_all()
        .withf(|limit, offset| *limit == 0 && *offset == 500)
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    repo.expect_count().times(1).returning(|| Ok(3));

    let uc = ListUsersUseCase::new(Arc::new(repo));
    let out = uc
        .execute(&ctx(), ListUsersInput { limit: 0, offset: 500 })
        .await
        .unwrap();
    assert!(out.users.is_empty());
    assert_eq!(out.total, 3);
}

#[tokio::test]
async fn list_returns_page_and_total() {
    let (_, uc) = memory();
    for i in 0..3 {
        uc.create
            .execute(&ctx(), create_input("u", &format!("u{i}@example.com")))
            .await
            .unwrap();
    }

    let out = uc
        .list
        .execute(&ctx(), ListUsersInput { limit: 2, offset: 0 })
        .await
        .unwrap();
    assert_eq!(out.users.len(), 2);
    assert_eq!(out.total, 3);
    assert!(out.users[0].created_at >= out.users[1].created_at);
}

// ── UpdateUser ──────────────────────────────────────────────────

#[tokio::test]
async fn update_name_only_keeps_email() {
    let (_, uc) = memory();
    let created = uc.create.execute(&ctx(), create_input("a", "A@Example.com")).await.unwrap();

    let out = uc
        .update
        .execute(
            &ctx(),
            UpdateUserInput {
                id: created.id,
                name: Some(" renamed ".into()),
                email: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(out.name, "renamed");
    assert_eq!(out.email, "a@example.com");
    assert_eq!(out.created_at, created.created_at);
    assert!(out.updated_at >= created.updated_at);
}

#[tokio::test]
async fn update_with_same_email_in_other_case_is_not_a_conflict() {
    let (_, uc) = memory();
    let created = uc.create.execute(&ctx(), create_input("a", "me@example.com")).await.unwrap();

    let out = uc
        .update
        .execute(
            &ctx(),
            UpdateUserInput {
                id: created.id,
                name: None,
                email: Some(" ME@Example.COM ".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(out.email, "me@example.com");
}

#[tokio::test]
async fn update_same_email_skips_precheck() {
    let current = User::new("a", "me@example.com").unwrap();
    let id = current.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(current.clone()));
    repo.expect_find_by_email().times(0);
    repo.expect_update().times(1).returning(|_| Ok(()));

    let uc = UpdateUserUseCase::new(Arc::new(repo));
    uc.execute(
        &ctx(),
        UpdateUserInput {
            id,
            name: None,
            email: Some("ME@example.com".into()),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn update_to_taken_email_fails() {
    let (repo, uc) = memory();
    let a = uc.create.execute(&ctx(), create_input("a", "a@example.com")).await.unwrap();
    uc.create.execute(&ctx(), create_input("b", "b@example.com")).await.unwrap();

    let err = uc
        .update
        .execute(
            &ctx(),
            UpdateUserInput {
                id: a.id,
                name: Some("new name".into()),
                email: Some("B@example.com".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::EmailExists));

    let stored = repo.find_by_id(a.id).await.unwrap();
    assert_eq!(stored.name(), "a");
    assert_eq!(stored.email(), "a@example.com");
}

#[tokio::test]
async fn update_with_empty_values_fails_validation() {
    let (_, uc) = memory();
    let created = uc.create.execute(&ctx(), create_input("a", "a@example.com")).await.unwrap();

    let err = uc
        .update
        .execute(
            &ctx(),
            UpdateUserInput {
                id: created.id,
                name: Some(String::new()),
                email: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::Validation(ValidationError::EmptyName)));

    let err = uc
        .update
        .execute(
            &ctx(),
            UpdateUserInput {
                id: created.id,
                name: None,
                email: Some(String::new()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::Validation(ValidationError::InvalidEmail)));
}

#[tokio::test]
async fn update_unknown_is_not_found() {
    let (_, uc) = memory();
    let err = uc
        .update
        .execute(
            &ctx(),
            UpdateUserInput {
                id: Uuid::new_v4(),
                name: Some("x".into()),
                email: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::NotFound));
}

#[tokio::test]
async fn update_reports_store_conflict_as_email_exists() {
    let current = User::new("a", "a@example.com").unwrap();
    let id = current.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(current.clone()));
    repo.expect_find_by_email()
        .times(1)
        .returning(|_| Err(RepositoryError::NotFound));
    repo.expect_update()
        .times(1)
        .returning(|_| Err(RepositoryError::Conflict));

    let uc = UpdateUserUseCase::new(Arc::new(repo));
    let err = uc
        .execute(
            &ctx(),
            UpdateUserInput {
                id,
                name: None,
                email: Some("b@example.com".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::EmailExists));
}

#[tokio::test]
async fn update_reports_concurrent_delete_as_not_found() {
    let current = User::new("a", "a@example.com").unwrap();
    let id = current.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(current.clone()));
    repo.expect_update()
        .times(1)
        .returning(|_| Err(RepositoryError::NotFound));

    let uc = UpdateUserUseCase::new(Arc::new(repo));
    let err = uc
        .execute(
            &ctx(),
            UpdateUserInput {
                id,
                name: Some("b".into()),
                email: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::NotFound));
}

// ── DeleteUser ──────────────────────────────────────────────────

#[tokio::test]
async fn delete_twice_is_ok_then_not_found() {
    let (_, uc) = memory();
    let created = uc.create.execute(&ctx(), create_input("a", "a@example.com")).await.unwrap();

    uc.delete.execute(&ctx(), created.id).await.unwrap();
    let err = uc.delete.execute(&ctx(), created.id).await.unwrap_err();
    assert!(matches!(err, UserError::NotFound));

    let err = uc.get.execute(&ctx(), created.id).await.unwrap_err();
    assert!(matches!(err, UserError::NotFound));
}

#[tokio::test]
async fn delete_unknown_never_calls_delete() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(|_| Err(RepositoryError::NotFound));
    repo.expect_delete().times(0);

    let uc = DeleteUserUseCase::new(Arc::new(repo));
    let err = uc.execute(&ctx(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, UserError::NotFound));
}

#[tokio::test]
async fn delete_racing_another_delete_is_not_found() {
    let current = User::new("a", "a@example.com").unwrap();
    let id = current.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(current.clone()));
    repo.expect_delete()
        .times(1)
        .returning(|_| Err(RepositoryError::NotFound));

    let uc = DeleteUserUseCase::new(Arc::new(repo));
    let err = uc.execute(&ctx(), id).await.unwrap_err();
    assert!(matches!(err, UserError::NotFound));
}

// ── Cancellation ────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_context_aborts_hanging_store() {
    let uc = UserUseCases::new(Arc::new(HangingRepository));
    let ctx = RequestContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let err = uc.get.execute(&ctx, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, UserError::Cancelled));
}

#[tokio::test]
async fn every_use_case_honours_cancellation() {
    let uc = UserUseCases::new(Arc::new(HangingRepository));
    let ctx = RequestContext::new();
    ctx.cancel();
    let id = Uuid::new_v4();

    assert!(matches!(
        uc.create.execute(&ctx, create_input("a", "a@example.com")).await,
        Err(UserError::Cancelled)
    ));
    assert!(matches!(uc.get.execute(&ctx, id).await, Err(UserError::Cancelled)));
    assert!(matches!(
        uc.list.execute(&ctx, ListUsersInput { limit: 10, offset: 0 }).await,
        Err(UserError::Cancelled)
    ));
    assert!(matches!(
        uc.update
            .execute(&ctx, UpdateUserInput { id, name: Some("x".into()), email: None })
            .await,
        Err(UserError::Cancelled)
    ));
    assert!(matches!(uc.delete.execute(&ctx, id).await, Err(UserError::Cancelled)));
}

#[tokio::test]
async fn deadline_bounds_hanging_store() {
    let uc = UserUseCases::new(Arc::new(HangingRepository));
    let ctx = RequestContext::with_timeout(Duration::from_millis(20));
    let err = uc.delete.execute(&ctx, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, UserError::DeadlineExceeded));
}

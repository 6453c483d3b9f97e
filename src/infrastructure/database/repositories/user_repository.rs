use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

use crate::domain::{RepositoryResult, User, UserRepository};
use crate::infrastructure::database::entities::user;
use crate::shared::{InfraError, RepositoryError};

/// SeaORM-backed user repository. Email uniqueness rests on the unique index
/// created by the `users` migration.
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> RepositoryResult<User> {
    let id = Uuid::parse_str(&model.id).map_err(|e| {
        InfraError::Storage(format!("corrupt user id '{}': {}", model.id, e))
    })?;
    Ok(User::rehydrate(
        id,
        model.name,
        model.email,
        model.created_at,
        model.updated_at,
    ))
}

fn domain_to_active_model(u: &User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(u.id().to_string()),
        name: Set(u.name().to_string()),
        email: Set(u.email().to_string()),
        created_at: Set(u.created_at()),
        updated_at: Set(u.updated_at()),
    }
}

fn db_err(e: DbErr) -> RepositoryError {
    RepositoryError::Internal(InfraError::Database(e))
}

fn write_err(e: DbErr) -> RepositoryError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        RepositoryError::Conflict
    } else {
        db_err(e)
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn save(&self, u: &User) -> RepositoryResult<()> {
        user::Entity::insert(domain_to_active_model(u))
            .exec_without_returning(&self.db)
            .await
            .map_err(write_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<User> {
        let model = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        user_model_to_domain(model)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<User> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        user_model_to_domain(model)
    }

    async fn find_all(&self, limit: u64, offset: u64) -> RepositoryResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models.into_iter().map(user_model_to_domain).collect()
    }

    async fn count(&self) -> RepositoryResult<u64> {
        user::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn update(&self, u: &User) -> RepositoryResult<()> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::Name, Expr::value(u.name()))
            .col_expr(user::Column::Email, Expr::value(u.email()))
            .col_expr(user::Column::UpdatedAt, Expr::value(u.updated_at()))
            .filter(user::Column::Id.eq(u.id().to_string()))
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = user::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;

    use crate::infrastructure::database::migrator::Migrator;

    async fn repo() -> SeaOrmUserRepository {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        // One connection: every sqlite in-memory connection is its own database.
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmUserRepository::new(db)
    }

    fn user_created_at(name: &str, email: &str, minutes_ago: i64) -> User {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        User::rehydrate(Uuid::new_v4(), name.into(), email.into(), at, at)
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let repo = repo().await;
        let user = User::new("  Grace ", "Grace@Navy.mil").unwrap();
        repo.save(&user).await.unwrap();

        let by_id = repo.find_by_id(user.id()).await.unwrap();
        assert_eq!(by_id.id(), user.id());
        assert_eq!(by_id.name(), "Grace");
        assert_eq!(by_id.email(), "grace@navy.mil");
        assert_eq!(by_id.created_at(), user.created_at());
        assert_eq!(by_id.updated_at(), user.updated_at());

        let by_email = repo.find_by_email("grace@navy.mil").await.unwrap();
        assert_eq!(by_email.id(), user.id());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = repo().await;
        repo.save(&User::new("a", "dup@example.com").unwrap()).await.unwrap();

        let err = repo
            .save(&User::new("b", "dup@example.com").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let repo = repo().await;
        let id = Uuid::new_v4();

        assert!(matches!(repo.find_by_id(id).await, Err(RepositoryError::NotFound)));
        assert!(matches!(
            repo.find_by_email("ghost@example.com").await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(repo.delete(id).await, Err(RepositoryError::NotFound)));

        let ghost = User::new("ghost", "ghost@example.com").unwrap();
        assert!(matches!(repo.update(&ghost).await, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn find_all_orders_newest_first_and_slices() {
        let repo = repo().await;
        let oldest = user_created_at("old", "old@example.com", 30);
        let middle = user_created_at("mid", "mid@example.com", 20);
        let newest = user_created_at("new", "new@example.com", 10);
        for u in [&middle, &oldest, &newest] {
            repo.save(u).await.unwrap();
        }

        let all = repo.find_all(10, 0).await.unwrap();
        let ids: Vec<_> = all.iter().map(User::id).collect();
        assert_eq!(ids, vec![newest.id(), middle.id(), oldest.id()]);

        let page = repo.find_all(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id(), middle.id());

        assert!(repo.find_all(10, 3).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn update_persists_changes_and_detects_collisions() {
        let repo = repo().await;
        let mut a = User::new("a", "a@example.com").unwrap();
        let b = User::new("b", "b@example.com").unwrap();
        repo.save(&a).await.unwrap();
        repo.save(&b).await.unwrap();

        a.update_name("alpha").unwrap();
        a.update_email("alpha@example.com").unwrap();
        repo.update(&a).await.unwrap();
        let stored = repo.find_by_id(a.id()).await.unwrap();
        assert_eq!(stored.name(), "alpha");
        assert_eq!(stored.email(), "alpha@example.com");
        assert_eq!(stored.created_at(), a.created_at());

        a.update_email("b@example.com").unwrap();
        assert!(matches!(repo.update(&a).await, Err(RepositoryError::Conflict)));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let repo = repo().await;
        let user = User::new("a", "a@example.com").unwrap();
        repo.save(&user).await.unwrap();

        repo.delete(user.id()).await.unwrap();
        assert!(matches!(
            repo.find_by_id(user.id()).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(repo.delete(user.id()).await, Err(RepositoryError::NotFound)));
    }
}

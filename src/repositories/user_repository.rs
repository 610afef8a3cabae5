use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;
use crate::utils::errors::AppResult;

/// Gateway de identidad: resuelve propietarios por su identificador opaco
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn resolve_user(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Resuelve varios propietarios a la vez; los que no existen se omiten
    async fn resolve_users(&self, ids: &[Uuid]) -> AppResult<Vec<User>>;
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityGateway for UserRepository {
    async fn resolve_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn resolve_users(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, email FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

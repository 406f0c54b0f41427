//! User directory administrative operations

use crate::{
    error::AppResult,
    models::user::{Role, User, UserQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List users with pagination
    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

        self.repository.users.list(page, per_page).await
    }

    /// Change a user's role (overrides the allow-list resolution done at
    /// creation)
    pub async fn set_role(&self, id: i32, role: Role) -> AppResult<User> {
        let user = self.repository.users.set_role(id, role).await?;
        tracing::info!(user_id = id, role = %role, "Updated user role");
        Ok(user)
    }

    /// Activate or deactivate a user. Deactivation revokes every refresh
    /// token the user holds in the same request; already-issued access
    /// tokens expire on their own short schedule.
    pub async fn set_active(&self, id: i32, is_active: bool) -> AppResult<User> {
        let user = self.repository.users.set_active(id, is_active).await?;

        if !is_active {
            self.repository.tokens.revoke_all_for_user(id).await?;
            tracing::info!(user_id = id, "Deactivated user and revoked refresh tokens");
        }

        Ok(user)
    }
}

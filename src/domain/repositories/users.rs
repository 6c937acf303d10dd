use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::users::{RegisterUserEntity, UserEntity};

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn register(&self, user: RegisterUserEntity) -> Result<UserEntity>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool>;

    /// Affiliates with a positive cached balance, payout destination or not;
    /// the settlement job decides who is actually payable.
    async fn list_settlement_candidates(&self) -> Result<Vec<UserEntity>>;
}

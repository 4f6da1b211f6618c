use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::identity::{AuthSession, InviteOutcome};

/// Login identities for members and admins (Supabase Auth).
#[automock]
#[async_trait]
pub trait IdentityProvider {
    /// False when no service-role key is configured; invites are then skipped.
    fn can_provision(&self) -> bool;
    async fn invite_user(&self, email: String, full_name: Option<String>) -> Result<InviteOutcome>;
    async fn send_password_reset(&self, email: String, redirect_to: String) -> Result<()>;
    async fn sign_in_with_password(&self, email: String, password: String) -> Result<AuthSession>;
}

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::messaging::OutgoingMessage;

#[automock]
#[async_trait]
pub trait MessageSender {
    fn is_configured(&self) -> bool;
    async fn send_message(&self, message: OutgoingMessage) -> Result<()>;
}

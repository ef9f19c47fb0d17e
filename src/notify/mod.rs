pub mod telegram;

use anyhow::Result;

/// Everything the delivery side needs to render one fare alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareAlert {
    pub chat_id: i64,
    pub origin: String,
    pub destination: String,
    pub date: String,    // YYYY-MM-DD
    pub weekday: String, // "Monday" ..
    pub price: u64,
    pub currency: String,
    pub link: String,
}

/// Notification-delivery collaborator. `Ok(())` means the message was
/// accepted downstream; only then may the caller record the price.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &FareAlert) -> Result<()>;
}

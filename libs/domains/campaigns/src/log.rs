use chrono::Utc;

use crate::models::{DeliveryLog, DeliveryStatus};

/// Delivery log stamped with the current time.
pub fn build_log(
    to: impl Into<String>,
    message: impl Into<String>,
    status: DeliveryStatus,
    error: Option<String>,
    channel_message_id: Option<String>,
) -> DeliveryLog {
    DeliveryLog {
        to: to.into(),
        message: message.into(),
        status,
        error,
        timestamp: Utc::now(),
        channel_message_id,
    }
}

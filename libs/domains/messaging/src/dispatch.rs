//! Fan-out of one message to many recipients.
//!
//! Every recipient is attempted exactly once and yields exactly one
//! [`DeliveryLog`]; the returned logs are in recipient order whatever the
//! completion order was.

use domain_campaigns::{DeliveryLog, DeliveryStatus, build_log};
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::providers::{OutboundMessage, SmsProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatcher {
    /// One recipient at a time, pausing `delay` between sends
    Sequential { delay: Duration },
    /// Up to `max_in_flight` sends at once
    Concurrent { max_in_flight: usize },
}

impl Dispatcher {
    pub fn sequential(delay: Duration) -> Self {
        Dispatcher::Sequential { delay }
    }

    pub fn concurrent(max_in_flight: usize) -> Self {
        Dispatcher::Concurrent {
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Calls `send` once per recipient.
    ///
    /// `on_log` sees `(index, log)` as soon as each recipient completes.
    pub async fn run<F, Fut, P>(&self, recipients: &[String], send: F, on_log: P) -> Vec<DeliveryLog>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = DeliveryLog>,
        P: Fn(usize, &DeliveryLog),
    {
        match *self {
            Dispatcher::Sequential { delay } => {
                let mut logs = Vec::with_capacity(recipients.len());
                for (index, to) in recipients.iter().enumerate() {
                    if index > 0 && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let log = send(to.clone()).await;
                    on_log(index, &log);
                    logs.push(log);
                }
                logs
            }
            Dispatcher::Concurrent { max_in_flight } => {
                let permits = Semaphore::new(max_in_flight);
                let (send, on_log, permits) = (&send, &on_log, &permits);

                join_all(recipients.iter().enumerate().map(|(index, to)| async move {
                    // never closed, so acquire only waits
                    let _permit = permits.acquire().await.ok();
                    let log = send(to.clone()).await;
                    on_log(index, &log);
                    log
                }))
                .await
            }
        }
    }
}

/// Sends `message` and records the outcome; provider errors become a
/// `failed` log carrying the error text.
pub async fn deliver(provider: &dyn SmsProvider, message: OutboundMessage) -> DeliveryLog {
    match provider.send(&message).await {
        Ok(sent) => build_log(
            message.to,
            message.body,
            DeliveryStatus::Sent,
            None,
            sent.channel_message_id,
        ),
        Err(e) => {
            warn!(provider = %provider.kind(), to = %message.to, error = %e, "Delivery failed");
            build_log(
                message.to,
                message.body,
                DeliveryStatus::Failed,
                Some(e.to_string()),
                None,
            )
        }
    }
}

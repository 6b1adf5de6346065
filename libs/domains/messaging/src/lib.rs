//! Messaging Domain
//!
//! Bulk SMS through any configured vendor and WhatsApp template sends
//! through Twilio. Each send fans out to its recipients, collects one
//! [`DeliveryLog`](domain_campaigns::DeliveryLog) per recipient and is
//! recorded as a campaign.
//!
//! ```text
//! handlers ─► MessagingService ─► ProviderRegistry ─► SmsProvider / TwilioClient
//!                       │
//!                       └─► Dispatcher (sequential | concurrent)
//!                       └─► CampaignService::record
//! ```
//!
//! Providers are registered from the environment; a vendor without
//! credentials is simply absent and its routes answer 503.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod registry;
pub mod service;

pub use config::DispatchConfig;
pub use dispatch::{Dispatcher, deliver};
pub use error::{MessagingError, MessagingResult, ProviderError};
pub use handlers::ApiDoc;
pub use models::{SendResponse, SendSmsRequest, SendWhatsAppRequest, StreamEvent};
pub use providers::{OutboundMessage, SentMessage, SmsProvider};
pub use registry::ProviderRegistry;
pub use service::MessagingService;

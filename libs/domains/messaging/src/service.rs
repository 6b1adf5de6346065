//! Messaging Service - bulk sends through a provider, recorded as campaigns

use domain_campaigns::{
    CampaignRepository, CampaignService, Channel, DeliveryLog, DeliveryStatus, NewCampaign,
    ProviderKind, build_log, estimate_cost,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Instrument, Span, error, info, instrument};

use crate::config::DispatchConfig;
use crate::dispatch::{Dispatcher, deliver};
use crate::error::{MessagingError, MessagingResult};
use crate::models::{
    DEFAULT_LANGUAGE, DEFAULT_RECIPIENT_NAME, SendResponse, SendSmsRequest, SendWhatsAppRequest,
    StreamEvent, present,
};
use crate::providers::{OutboundMessage, SmsProvider, WhatsAppTemplate};
use crate::registry::ProviderRegistry;

pub struct MessagingService<R: CampaignRepository> {
    registry: Arc<ProviderRegistry>,
    campaigns: CampaignService<R>,
    dispatch: DispatchConfig,
}

/// A validated SMS send bound to its provider.
struct SmsJob {
    provider: Arc<dyn SmsProvider>,
    sender: Option<String>,
    request: SendSmsRequest,
}

impl SmsJob {
    async fn deliver(&self, to: String) -> DeliveryLog {
        let message = OutboundMessage {
            to,
            body: self.request.message.clone(),
            from: self.sender.clone(),
            campaign: self.request.name.clone(),
        };
        deliver(self.provider.as_ref(), message).await
    }

    fn into_campaign(self, results: Vec<DeliveryLog>) -> NewCampaign {
        let request = self.request;
        let cost = estimate_cost(&request.message, request.numbers.len());
        NewCampaign {
            name: request.name,
            channel: Channel::Sms,
            provider: self.provider.kind(),
            sender_id: self.sender.unwrap_or_default(),
            country: request.country,
            language: present(request.language.as_deref())
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
            message: request.message,
            characters: cost.characters,
            segments: cost.segments,
            estimated_cost: cost.estimated_cost,
            numbers: request.numbers,
            results,
        }
    }
}

impl<R: CampaignRepository + 'static> MessagingService<R> {
    pub fn new(
        registry: ProviderRegistry,
        campaigns: CampaignService<R>,
        dispatch: DispatchConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            campaigns,
            dispatch,
        }
    }

    /// Sends to every recipient, then records the campaign.
    #[instrument(skip(self, request), fields(campaign = %request.name, recipients = request.numbers.len()))]
    pub async fn send_sms(
        &self,
        provider: &str,
        request: SendSmsRequest,
    ) -> MessagingResult<SendResponse> {
        let job = self.prepare_sms(provider, request)?;

        let results = Dispatcher::sequential(Duration::ZERO)
            .run(&job.request.numbers, |to| job.deliver(to), |_, _| {})
            .await;

        let campaign = self.campaigns.record(job.into_campaign(results)).await?;
        info!(
            campaign_id = %campaign.id,
            successful = campaign.successful,
            failed = campaign.failed,
            "SMS campaign recorded"
        );

        Ok(SendResponse {
            results: campaign.results,
            campaign_id: campaign.id,
        })
    }

    /// Starts a paced send and returns its event feed.
    ///
    /// Request and provider errors are returned before anything is sent.
    /// The send runs on its own task and is recorded even if the receiver
    /// is dropped.
    #[instrument(skip(self, request), fields(campaign = %request.name, recipients = request.numbers.len()))]
    pub fn start_sms_stream(
        &self,
        provider: &str,
        request: SendSmsRequest,
    ) -> MessagingResult<mpsc::UnboundedReceiver<StreamEvent>> {
        let job = self.prepare_sms(provider, request)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let campaigns = self.campaigns.clone();
        let dispatcher = Dispatcher::sequential(self.dispatch.stream_delay);

        tokio::spawn(
            async move {
                let results = dispatcher
                    .run(
                        &job.request.numbers,
                        |to| job.deliver(to),
                        |index, log| {
                            let _ = tx.send(StreamEvent::Progress {
                                index,
                                log: log.clone(),
                            });
                        },
                    )
                    .await;

                let event = match campaigns.record(job.into_campaign(results)).await {
                    Ok(campaign) => {
                        info!(campaign_id = %campaign.id, "Streamed SMS campaign recorded");
                        StreamEvent::Done(campaign.id)
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to record streamed campaign");
                        StreamEvent::Error(e.to_string())
                    }
                };
                let _ = tx.send(event);
            }
            .instrument(Span::current()),
        );

        Ok(rx)
    }

    /// Sends an approved template to every recipient concurrently.
    #[instrument(skip(self, request), fields(campaign = %request.campaign_name, recipients = request.numbers.len()))]
    pub async fn send_whatsapp(
        &self,
        request: SendWhatsAppRequest,
    ) -> MessagingResult<SendResponse> {
        let twilio = self.registry.twilio()?;
        let sender = twilio
            .whatsapp_sender()
            .ok_or(MessagingError::MissingSetting("TWILIO_WHATSAPP_FROM"))?;

        let placeholder = format!("[Template SID: {}]", request.template_sid.trim());
        let name = present(request.name.as_deref())
            .unwrap_or(DEFAULT_RECIPIENT_NAME)
            .to_string();

        let results = {
            let twilio = twilio.as_ref();
            let template_sid = request.template_sid.trim();
            let placeholder = placeholder.as_str();
            let name = name.as_str();

            Dispatcher::concurrent(self.dispatch.max_in_flight)
                .run(
                    &request.numbers,
                    |to| async move {
                        match twilio.send_whatsapp(&to, template_sid, name).await {
                            Ok(sent) => build_log(
                                to,
                                placeholder,
                                DeliveryStatus::Sent,
                                None,
                                sent.channel_message_id,
                            ),
                            Err(e) => build_log(
                                to,
                                placeholder,
                                DeliveryStatus::Failed,
                                Some(e.to_string()),
                                None,
                            ),
                        }
                    },
                    |_, _| {},
                )
                .await
        };

        let cost = estimate_cost(&placeholder, request.numbers.len());
        let language = present(request.language.as_deref())
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string();

        let campaign = self
            .campaigns
            .record(NewCampaign {
                name: request.campaign_name,
                channel: Channel::Whatsapp,
                provider: ProviderKind::Twilio,
                sender_id: sender,
                country: request.country,
                language,
                message: placeholder,
                characters: cost.characters,
                segments: cost.segments,
                estimated_cost: cost.estimated_cost,
                numbers: request.numbers,
                results,
            })
            .await?;
        info!(
            campaign_id = %campaign.id,
            successful = campaign.successful,
            failed = campaign.failed,
            "WhatsApp campaign recorded"
        );

        Ok(SendResponse {
            results: campaign.results,
            campaign_id: campaign.id,
        })
    }

    #[instrument(skip(self))]
    pub async fn templates(&self) -> MessagingResult<Vec<WhatsAppTemplate>> {
        let twilio = self.registry.twilio()?;
        twilio
            .list_templates()
            .await
            .map_err(MessagingError::Templates)
    }

    fn prepare_sms(&self, provider: &str, request: SendSmsRequest) -> MessagingResult<SmsJob> {
        let provider = self.registry.sms(provider)?;
        let sender = present(request.from_number.as_deref())
            .map(str::to_string)
            .or_else(|| provider.default_sender());

        if provider.kind() == ProviderKind::Twilio && sender.is_none() {
            return Err(MessagingError::Validation(
                "fromNumber is required for Twilio".to_string(),
            ));
        }

        Ok(SmsJob {
            provider,
            sender,
            request,
        })
    }
}

impl<R: CampaignRepository> Clone for MessagingService<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            campaigns: self.campaigns.clone(),
            dispatch: self.dispatch.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::providers::{MockSmsProvider, SentMessage};
    use domain_campaigns::CampaignError;
    use domain_campaigns::repository::MockCampaignRepository;

    fn provider(kind: ProviderKind, sender: Option<&'static str>) -> MockSmsProvider {
        let mut mock = MockSmsProvider::new();
        mock.expect_kind().return_const(kind);
        mock.expect_default_sender()
            .returning(move || sender.map(str::to_string));
        mock
    }

    fn request(numbers: &[&str]) -> SendSmsRequest {
        SendSmsRequest {
            name: "Open day".into(),
            country: "Bangladesh".into(),
            numbers: numbers.iter().map(|n| n.to_string()).collect(),
            message: "Admission open".into(),
            ..Default::default()
        }
    }

    fn echo_repository() -> MockCampaignRepository {
        let mut repo = MockCampaignRepository::new();
        repo.expect_insert().returning(|c| Ok(c));
        repo
    }

    fn service(
        registry: ProviderRegistry,
        repo: MockCampaignRepository,
    ) -> MessagingService<MockCampaignRepository> {
        let dispatch = DispatchConfig {
            stream_delay: Duration::ZERO,
            ..Default::default()
        };
        MessagingService::new(registry, CampaignService::new(repo), dispatch)
    }

    #[tokio::test]
    async fn test_send_sms_records_every_recipient_in_order() {
        let mut sms = provider(ProviderKind::Bulksmsbd, Some("WeTrainEdu"));
        sms.expect_send()
            .times(3)
            .returning(|m| match m.to.as_str() {
                "+8801722222222" => Err(ProviderError::Rejected("Invalid number".into())),
                _ => Ok(SentMessage::with_id(format!("id-{}", m.to))),
            });

        let mut repo = MockCampaignRepository::new();
        repo.expect_insert()
            .withf(|c| {
                c.total_sent == 3
                    && c.successful == 2
                    && c.failed == 1
                    && c.sender_id == "WeTrainEdu"
                    && c.language == "english"
                    && c.channel == Channel::Sms
                    && c.segments == 1
                    && c.estimated_cost == 3
            })
            .times(1)
            .returning(|c| Ok(c));

        let service = service(ProviderRegistry::new().with_provider(sms), repo);
        let response = service
            .send_sms(
                "bulksmsbd",
                request(&["+8801711111111", "+8801722222222", "+8801733333333"]),
            )
            .await
            .unwrap();

        let order: Vec<_> = response.results.iter().map(|l| l.to.as_str()).collect();
        assert_eq!(
            order,
            ["+8801711111111", "+8801722222222", "+8801733333333"]
        );
        assert_eq!(response.results[1].error.as_deref(), Some("Invalid number"));
        assert_eq!(
            response.results[0].channel_message_id.as_deref(),
            Some("id-+8801711111111")
        );
    }

    #[tokio::test]
    async fn test_send_sms_provider_lookup_errors() {
        let service = service(ProviderRegistry::new(), MockCampaignRepository::new());

        let unknown = service.send_sms("carrier-pigeon", request(&["1"])).await;
        assert!(matches!(unknown, Err(MessagingError::UnknownProvider(p)) if p == "carrier-pigeon"));

        let missing = service.send_sms("hablame", request(&["1"])).await;
        assert!(matches!(
            missing,
            Err(MessagingError::NotConfigured(ProviderKind::Hablame))
        ));
    }

    #[tokio::test]
    async fn test_twilio_requires_a_sender() {
        let mut twilio = provider(ProviderKind::Twilio, None);
        twilio.expect_send().never();

        let service = service(
            ProviderRegistry::new().with_provider(twilio),
            MockCampaignRepository::new(),
        );
        let result = service.send_sms("twilio", request(&["+15551234567"])).await;

        assert!(
            matches!(result, Err(MessagingError::Validation(m)) if m == "fromNumber is required for Twilio")
        );
    }

    #[tokio::test]
    async fn test_from_number_overrides_default_sender() {
        let mut sms = provider(ProviderKind::Twilio, Some("+15550000000"));
        sms.expect_send()
            .withf(|m| m.from.as_deref() == Some("+15559999999") && m.campaign == "Open day")
            .returning(|_| Ok(SentMessage::default()));

        let mut repo = MockCampaignRepository::new();
        repo.expect_insert()
            .withf(|c| c.sender_id == "+15559999999")
            .returning(|c| Ok(c));

        let service = service(ProviderRegistry::new().with_provider(sms), repo);
        let mut body = request(&["+15551234567"]);
        body.from_number = Some(" +15559999999 ".into());

        service.send_sms("twilio", body).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_sms_persistence_failure() {
        let mut sms = provider(ProviderKind::Esms, Some("WeSend"));
        sms.expect_send().returning(|_| Ok(SentMessage::default()));

        let mut repo = MockCampaignRepository::new();
        repo.expect_insert()
            .returning(|_| Err(CampaignError::Database("connection reset".into())));

        let service = service(ProviderRegistry::new().with_provider(sms), repo);
        let result = service.send_sms("esms", request(&["+6591234567"])).await;

        assert!(matches!(
            result,
            Err(MessagingError::Campaign(CampaignError::Database(_)))
        ));
    }

    #[tokio::test]
    async fn test_stream_reports_progress_then_done() {
        let mut sms = provider(ProviderKind::Cheapglobalsms, Some("WeSend"));
        sms.expect_send()
            .times(2)
            .returning(|_| Ok(SentMessage::with_id("batch-1")));

        let service = service(ProviderRegistry::new().with_provider(sms), echo_repository());
        let mut events = service
            .start_sms_stream("cheapglobalsms", request(&["+2348011111111", "+2348022222222"]))
            .unwrap();

        let mut received = Vec::new();
        while let Some(event) = events.recv().await {
            received.push(event);
        }

        assert_eq!(received.len(), 3);
        assert!(
            matches!(&received[0], StreamEvent::Progress { index: 0, log } if log.to == "+2348011111111")
        );
        assert!(
            matches!(&received[1], StreamEvent::Progress { index: 1, log } if log.status == DeliveryStatus::Sent)
        );
        assert!(matches!(received[2], StreamEvent::Done(_)));
    }

    #[tokio::test]
    async fn test_stream_records_even_when_receiver_dropped() {
        let mut sms = provider(ProviderKind::Hablame, Some("WMT_Promo"));
        sms.expect_send().times(2).returning(|_| Ok(SentMessage::default()));

        let (recorded_tx, mut recorded_rx) = mpsc::unbounded_channel();
        let mut repo = MockCampaignRepository::new();
        repo.expect_insert().times(1).returning(move |c| {
            let _ = recorded_tx.send(c.total_sent);
            Ok(c)
        });

        let service = service(ProviderRegistry::new().with_provider(sms), repo);
        let events = service
            .start_sms_stream("hablame", request(&["+573001112233", "+573004445566"]))
            .unwrap();
        drop(events);

        assert_eq!(recorded_rx.recv().await, Some(2));
    }

    #[tokio::test]
    async fn test_stream_reports_record_failure() {
        let mut sms = provider(ProviderKind::Esms, Some("WeSend"));
        sms.expect_send().returning(|_| Ok(SentMessage::default()));

        let mut repo = MockCampaignRepository::new();
        repo.expect_insert()
            .returning(|_| Err(CampaignError::Database("write failed".into())));

        let service = service(ProviderRegistry::new().with_provider(sms), repo);
        let mut events = service
            .start_sms_stream("esms", request(&["+6591234567"]))
            .unwrap();

        let mut last = None;
        while let Some(event) = events.recv().await {
            last = Some(event);
        }
        assert!(matches!(last, Some(StreamEvent::Error(_))));
    }

    #[tokio::test]
    async fn test_stream_rejects_before_sending() {
        let service = service(ProviderRegistry::new(), MockCampaignRepository::new());
        assert!(matches!(
            service.start_sms_stream("nope", request(&["1"])),
            Err(MessagingError::UnknownProvider(_))
        ));
    }

    #[tokio::test]
    async fn test_whatsapp_requires_twilio() {
        let service = service(ProviderRegistry::new(), MockCampaignRepository::new());
        let result = service
            .send_whatsapp(SendWhatsAppRequest {
                numbers: vec!["+6591234567".into()],
                template_sid: "HX1".into(),
                campaign_name: "Reminder".into(),
                country: "Singapore".into(),
                ..Default::default()
            })
            .await;
        assert!(matches!(
            result,
            Err(MessagingError::NotConfigured(ProviderKind::Twilio))
        ));

        let templates = service.templates().await;
        assert!(matches!(
            templates,
            Err(MessagingError::NotConfigured(ProviderKind::Twilio))
        ));
    }
}

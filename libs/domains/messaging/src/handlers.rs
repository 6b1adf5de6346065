//! HTTP handlers for bulk sends, with SSE progress for paced SMS sends

use axum::{
    Json, Router,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, ServiceUnavailableResponse,
    },
};
use domain_campaigns::{CampaignRepository, DeliveryLog, DeliveryStatus};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::MessagingResult;
use crate::models::{
    SendResponse, SendSmsRequest, SendWhatsAppRequest, StreamEvent, TemplatesResponse,
};
use crate::providers::{WhatsAppTemplate, twilio::TemplateContent};
use crate::service::MessagingService;

/// OpenAPI documentation for the Messaging API
#[derive(OpenApi)]
#[openapi(
    paths(send_sms, stream_sms, send_whatsapp, list_templates),
    components(
        schemas(
            SendSmsRequest,
            SendWhatsAppRequest,
            SendResponse,
            TemplatesResponse,
            WhatsAppTemplate,
            TemplateContent,
            DeliveryLog,
            DeliveryStatus,
        ),
        responses(
            BadRequestResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = "Messaging", description = "Bulk SMS and WhatsApp sends")
    )
)]
pub struct ApiDoc;

pub fn router<R: CampaignRepository + 'static>(service: MessagingService<R>) -> Router {
    Router::new()
        .route("/sms/{provider}", post(send_sms))
        .route("/sms/{provider}/stream", post(stream_sms))
        .route("/whatsapp", post(send_whatsapp))
        .route("/whatsapp/templates", get(list_templates))
        .with_state(Arc::new(service))
}

/// Send one SMS campaign and wait for every recipient
#[utoipa::path(
    post,
    path = "/sms/{provider}",
    tag = "Messaging",
    params(
        ("provider" = String, Path, description = "twilio, bulksmsbd, cheapglobalsms, hablame or esms")
    ),
    request_body = SendSmsRequest,
    responses(
        (status = 200, description = "Per-recipient results and the recorded campaign id", body = SendResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn send_sms<R: CampaignRepository + 'static>(
    State(service): State<Arc<MessagingService<R>>>,
    Path(provider): Path<String>,
    ValidatedJson(request): ValidatedJson<SendSmsRequest>,
) -> MessagingResult<Json<SendResponse>> {
    Ok(Json(service.send_sms(&provider, request).await?))
}

/// Send one SMS campaign, streaming each result as it completes
///
/// Emits `data: {"index", "log"}` per recipient, then `event: done` with the
/// campaign id or `event: error` with a JSON string.
#[utoipa::path(
    post,
    path = "/sms/{provider}/stream",
    tag = "Messaging",
    params(
        ("provider" = String, Path, description = "twilio, bulksmsbd, cheapglobalsms, hablame or esms")
    ),
    request_body = SendSmsRequest,
    responses(
        (status = 200, description = "SSE stream of delivery logs", content_type = "text/event-stream"),
        (status = 400, response = BadRequestResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn stream_sms<R: CampaignRepository + 'static>(
    State(service): State<Arc<MessagingService<R>>>,
    Path(provider): Path<String>,
    ValidatedJson(request): ValidatedJson<SendSmsRequest>,
) -> MessagingResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let mut events = service.start_sms_stream(&provider, request)?;

    let stream = async_stream::stream! {
        while let Some(event) = events.recv().await {
            yield Ok(sse_event(event));
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn sse_event(event: StreamEvent) -> Event {
    match event {
        StreamEvent::Progress { index, log } => Event::default()
            .data(serde_json::json!({ "index": index, "log": log }).to_string()),
        StreamEvent::Done(id) => Event::default().event("done").data(id.to_string()),
        StreamEvent::Error(message) => Event::default()
            .event("error")
            .data(serde_json::Value::String(message).to_string()),
    }
}

/// Send an approved WhatsApp template to every recipient
#[utoipa::path(
    post,
    path = "/whatsapp",
    tag = "Messaging",
    request_body = SendWhatsAppRequest,
    responses(
        (status = 200, description = "Per-recipient results and the recorded campaign id", body = SendResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn send_whatsapp<R: CampaignRepository + 'static>(
    State(service): State<Arc<MessagingService<R>>>,
    ValidatedJson(request): ValidatedJson<SendWhatsAppRequest>,
) -> MessagingResult<Json<SendResponse>> {
    Ok(Json(service.send_whatsapp(request).await?))
}

/// List WhatsApp-approved Twilio content templates
#[utoipa::path(
    get,
    path = "/whatsapp/templates",
    tag = "Messaging",
    responses(
        (status = 200, description = "Approved templates", body = TemplatesResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_templates<R: CampaignRepository + 'static>(
    State(service): State<Arc<MessagingService<R>>>,
) -> MessagingResult<Json<TemplatesResponse>> {
    let templates = service.templates().await?;
    Ok(Json(TemplatesResponse { templates }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use crate::error::ProviderError;
    use crate::providers::{MockSmsProvider, SentMessage, TwilioClient, TwilioConfig};
    use crate::registry::ProviderRegistry;
    use axum::{body::Body, http::Request, http::StatusCode};
    use domain_campaigns::repository::MockCampaignRepository;
    use domain_campaigns::{CampaignService, Channel, ProviderKind};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(registry: ProviderRegistry, repo: MockCampaignRepository) -> Router {
        let dispatch = DispatchConfig {
            stream_delay: Duration::ZERO,
            ..Default::default()
        };
        router(MessagingService::new(
            registry,
            CampaignService::new(repo),
            dispatch,
        ))
    }

    fn echo_repository() -> MockCampaignRepository {
        let mut repo = MockCampaignRepository::new();
        repo.expect_insert().returning(|c| Ok(c));
        repo
    }

    fn bulksmsbd() -> MockSmsProvider {
        let mut mock = MockSmsProvider::new();
        mock.expect_kind().return_const(ProviderKind::Bulksmsbd);
        mock.expect_default_sender()
            .returning(|| Some("WeTrainEdu".to_string()));
        mock
    }

    fn twilio(url: &str) -> TwilioClient {
        let config = TwilioConfig::new("AC123", "secret")
            .with_whatsapp_from("+14155238886")
            .with_base_url(url);
        TwilioClient::new(config, reqwest::Client::new())
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn sms_body(numbers: &[&str]) -> Value {
        json!({
            "name": "Open day",
            "country": "Bangladesh",
            "numbers": numbers,
            "message": "Admission open"
        })
    }

    #[tokio::test]
    async fn test_send_sms() {
        let mut provider = bulksmsbd();
        provider
            .expect_send()
            .returning(|_| Ok(SentMessage::with_id("71829")));

        let (status, body) = send(
            app(ProviderRegistry::new().with_provider(provider), echo_repository()),
            "POST",
            "/sms/bulksmsbd",
            Some(sms_body(&["+8801711111111", "+8801722222222"])),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["results"][0]["to"], "+8801711111111");
        assert_eq!(body["results"][0]["status"], "sent");
        assert_eq!(body["results"][0]["channelMessageId"], "71829");
        assert!(body["campaignId"].is_string());
    }

    #[tokio::test]
    async fn test_send_sms_missing_fields() {
        let (status, body) = send(
            app(ProviderRegistry::new(), MockCampaignRepository::new()),
            "POST",
            "/sms/bulksmsbd",
            Some(json!({ "name": "Open day", "numbers": [] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["message"], "Missing required campaign fields.");
    }

    #[tokio::test]
    async fn test_send_sms_unknown_and_unconfigured_provider() {
        let (status, body) = send(
            app(ProviderRegistry::new(), MockCampaignRepository::new()),
            "POST",
            "/sms/smoke-signals",
            Some(sms_body(&["+1"])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["message"], "Unsupported provider: smoke-signals");

        let (status, _) = send(
            app(ProviderRegistry::new(), MockCampaignRepository::new()),
            "POST",
            "/sms/esms",
            Some(sms_body(&["+1"])),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_stream_sms_emits_progress_then_done() {
        let mut provider = bulksmsbd();
        provider.expect_send().returning(|m| {
            if m.to.ends_with('2') {
                Err(ProviderError::Rejected("Invalid Number".into()))
            } else {
                Ok(SentMessage::default())
            }
        });

        let (status, body) = send(
            app(ProviderRegistry::new().with_provider(provider), echo_repository()),
            "POST",
            "/sms/bulksmsbd/stream",
            Some(sms_body(&["+8801711111111", "+8801722222222"])),
        )
        .await;

        assert_eq!(status, StatusCode::OK);

        let data: Vec<Value> = body
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .filter_map(|data| serde_json::from_str::<Value>(data).ok())
            .filter(|value| value.is_object())
            .collect();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["index"], 0);
        assert_eq!(data[1]["index"], 1);
        assert_eq!(data[1]["log"]["status"], "failed");
        assert_eq!(data[1]["log"]["error"], "Invalid Number");

        assert!(body.contains("event: done"));
        assert!(!body.contains("event: error"));
    }

    #[tokio::test]
    async fn test_stream_sms_rejects_before_streaming() {
        let (status, _) = send(
            app(ProviderRegistry::new(), MockCampaignRepository::new()),
            "POST",
            "/sms/hablame/stream",
            Some(sms_body(&["+573001112233"])),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_send_whatsapp() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("ContentSid".into(), "HX42".into()),
                mockito::Matcher::UrlEncoded("ContentVariables".into(), r#"{"1":"sir"}"#.into()),
            ]))
            .with_status(201)
            .with_body(r#"{"sid":"SM1"}"#)
            .expect(2)
            .create_async()
            .await;

        let mut repo = MockCampaignRepository::new();
        repo.expect_insert()
            .withf(|c| {
                c.channel == Channel::Whatsapp
                    && c.provider == ProviderKind::Twilio
                    && c.message == "[Template SID: HX42]"
                    && c.language == "english"
                    && c.sender_id == "whatsapp:+14155238886"
            })
            .returning(|c| Ok(c));

        let (status, body) = send(
            app(ProviderRegistry::new().with_twilio(twilio(&server.url())), repo),
            "POST",
            "/whatsapp",
            Some(json!({
                "numbers": ["+6591234567", "+6598765432"],
                "templateSid": "HX42",
                "campaignName": "Reminder",
                "country": "Singapore"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        mock.assert_async().await;
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["results"][0]["to"], "+6591234567");
        assert_eq!(body["results"][1]["to"], "+6598765432");
        assert_eq!(body["results"][1]["message"], "[Template SID: HX42]");
        assert_eq!(body["results"][1]["channelMessageId"], "SM1");
    }

    #[tokio::test]
    async fn test_send_whatsapp_missing_fields() {
        let (status, body) = send(
            app(ProviderRegistry::new(), MockCampaignRepository::new()),
            "POST",
            "/whatsapp",
            Some(json!({ "numbers": ["+6591234567"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["message"], "Missing required fields");
    }

    #[tokio::test]
    async fn test_list_templates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/Content")
            .with_status(200)
            .with_body(
                json!({
                    "contents": [{
                        "sid": "HX1",
                        "friendly_name": "welcome",
                        "language": "en",
                        "whatsApp": { "approved": true },
                        "components": [{ "type": "body", "text": "Hi {{1}}" }]
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let (status, body) = send(
            app(
                ProviderRegistry::new().with_twilio(twilio(&server.url())),
                MockCampaignRepository::new(),
            ),
            "GET",
            "/whatsapp/templates",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["templates"][0]["sid"], "HX1");
        assert_eq!(body["templates"][0]["friendlyName"], "welcome");
        assert_eq!(body["templates"][0]["content"]["text"], "Hi {{1}}");
    }

    #[tokio::test]
    async fn test_list_templates_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/Content")
            .with_status(401)
            .with_body(r#"{"message":"Authenticate"}"#)
            .create_async()
            .await;

        let (status, body) = send(
            app(
                ProviderRegistry::new().with_twilio(twilio(&server.url())),
                MockCampaignRepository::new(),
            ),
            "GET",
            "/whatsapp/templates",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["message"], "Failed to fetch templates");
    }
}

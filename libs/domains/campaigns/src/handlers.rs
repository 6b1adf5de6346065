use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_helpers::{
    UuidPath,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::cost::CostEstimate;
use crate::error::CampaignResult;
use crate::models::{
    Campaign, CampaignEnvelope, CampaignFilter, CampaignPage, Channel, DeliveryLog,
    DeliveryStatus, ProviderKind,
};
use crate::repository::CampaignRepository;
use crate::service::CampaignService;

/// OpenAPI documentation for the Campaigns API
#[derive(OpenApi)]
#[openapi(
    paths(list_campaigns, get_campaign),
    components(
        schemas(
            Campaign,
            CampaignPage,
            CampaignEnvelope,
            Channel,
            ProviderKind,
            DeliveryLog,
            DeliveryStatus,
            CostEstimate,
        ),
        responses(
            BadRequestResponse,
            BadRequestUuidResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Campaigns", description = "Recorded bulk sends and their delivery logs")
    )
)]
pub struct ApiDoc;

pub fn router<R: CampaignRepository + 'static>(service: CampaignService<R>) -> Router {
    Router::new()
        .route("/", get(list_campaigns))
        .route("/{id}", get(get_campaign))
        .with_state(Arc::new(service))
}

/// List campaigns, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Campaigns",
    params(CampaignFilter),
    responses(
        (status = 200, description = "One page of campaigns", body = CampaignPage),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_campaigns<R: CampaignRepository>(
    State(service): State<Arc<CampaignService<R>>>,
    Query(filter): Query<CampaignFilter>,
) -> CampaignResult<Json<CampaignPage>> {
    Ok(Json(service.list_campaigns(filter).await?))
}

/// Get a campaign with its per-recipient results
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Campaigns",
    params(
        ("id" = Uuid, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Campaign found", body = CampaignEnvelope),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_campaign<R: CampaignRepository>(
    State(service): State<Arc<CampaignService<R>>>,
    UuidPath(id): UuidPath,
) -> CampaignResult<Json<CampaignEnvelope>> {
    let campaign = service.get_campaign(id).await?;
    Ok(Json(CampaignEnvelope { campaign }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CampaignError;
    use crate::log::build_log;
    use crate::models::NewCampaign;
    use crate::repository::MockCampaignRepository;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn sample() -> Campaign {
        Campaign::new(NewCampaign {
            name: "Weekend sale".into(),
            channel: Channel::Sms,
            provider: ProviderKind::Hablame,
            sender_id: "WMT_Promo".into(),
            country: "Colombia".into(),
            language: "spanish".into(),
            message: "Hola".into(),
            characters: 4,
            segments: 1,
            estimated_cost: 1,
            numbers: vec!["+573001234567".into()],
            results: vec![build_log("+573001234567", "Hola", DeliveryStatus::Sent, None, None)],
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_campaign_envelope() {
        let campaign = sample();
        let id = campaign.id;

        let mut repo = MockCampaignRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(campaign.clone())));

        let (status, body) = get(router(CampaignService::new(repo)), &format!("/{}", id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["campaign"]["_id"], id.to_string());
        assert_eq!(body["campaign"]["provider"], "hablame");
        assert_eq!(body["campaign"]["results"][0]["status"], "sent");
    }

    #[tokio::test]
    async fn test_get_campaign_missing() {
        let mut repo = MockCampaignRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let (status, body) =
            get(router(CampaignService::new(repo)), &format!("/{}", Uuid::now_v7())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Campaign not found");
    }

    #[tokio::test]
    async fn test_get_campaign_malformed_id() {
        let (status, body) = get(
            router(CampaignService::new(MockCampaignRepository::new())),
            "/64b7f0c2e4b0a1a2b3c4d5e6",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_list_campaigns_by_type() {
        let mut repo = MockCampaignRepository::new();
        repo.expect_count()
            .withf(|q| q.channel == Some(Channel::Sms))
            .returning(|_| Ok(1));
        repo.expect_list().returning(|_| Ok(vec![sample()]));

        let (status, body) = get(
            router(CampaignService::new(repo)),
            "/?type=sms&from=2025-01-01&to=2030-12-31",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["campaigns"].as_array().unwrap().len(), 1);
        assert_eq!(body["limit"], 10);
    }

    #[tokio::test]
    async fn test_list_campaigns_storage_failure_is_500() {
        let mut repo = MockCampaignRepository::new();
        repo.expect_count()
            .returning(|_| Err(CampaignError::Database("server selection timeout".into())));

        let (status, body) = get(router(CampaignService::new(repo)), "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "server selection timeout");
    }
}

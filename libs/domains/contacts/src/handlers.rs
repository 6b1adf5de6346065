use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::country::Country;
use crate::error::ContactResult;
use crate::models::{
    ByCountryRequest, ByCountryResponse, Contact, ContactEnvelope, ContactFilter, ContactInput,
    ContactPage, CreateContactsRequest, CreateContactsResponse, DeleteContactResponse,
    SkippedContact, UpdateContact, UpdateContactResponse,
};
use crate::repository::ContactRepository;
use crate::service::ContactService;

/// OpenAPI documentation for the Contacts API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_contacts,
        create_contacts,
        numbers_by_country,
        get_contact,
        update_contact,
        delete_contact,
    ),
    components(
        schemas(
            Contact,
            Country,
            ContactInput,
            SkippedContact,
            ContactPage,
            CreateContactsRequest,
            CreateContactsResponse,
            ByCountryRequest,
            ByCountryResponse,
            UpdateContact,
            ContactEnvelope,
            UpdateContactResponse,
            DeleteContactResponse,
        ),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Contacts", description = "Phone-number directory")
    )
)]
pub struct ApiDoc;

pub fn router<R: ContactRepository + 'static>(service: ContactService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_contacts).post(create_contacts))
        .route("/by-country", post(numbers_by_country))
        .route(
            "/{id}",
            get(get_contact).patch(update_contact).delete(delete_contact),
        )
        .with_state(shared_service)
}

/// List contacts, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Contacts",
    params(ContactFilter),
    responses(
        (status = 200, description = "One page of contacts", body = ContactPage),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_contacts<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    Query(filter): Query<ContactFilter>,
) -> ContactResult<Json<ContactPage>> {
    let page = service.list_contacts(filter).await?;
    Ok(Json(page))
}

/// Bulk-import contacts
///
/// Entries that fail validation or already exist are returned under
/// `skipped` with a reason.
#[utoipa::path(
    post,
    path = "",
    tag = "Contacts",
    request_body = CreateContactsRequest,
    responses(
        (status = 201, description = "Import finished", body = CreateContactsResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_contacts<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    ValidatedJson(request): ValidatedJson<CreateContactsRequest>,
) -> ContactResult<impl IntoResponse> {
    let response = service.create_contacts(request.contacts).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Newline-joined phone numbers stored for a country
#[utoipa::path(
    post,
    path = "/by-country",
    tag = "Contacts",
    request_body = ByCountryRequest,
    responses(
        (status = 200, description = "Phone numbers", body = ByCountryResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn numbers_by_country<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    ValidatedJson(request): ValidatedJson<ByCountryRequest>,
) -> ContactResult<Json<ByCountryResponse>> {
    let numbers = service.numbers_by_country(request.country).await?;
    Ok(Json(ByCountryResponse { numbers }))
}

/// Get a contact by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Contact ID")
    ),
    responses(
        (status = 200, description = "Contact found", body = ContactEnvelope),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    UuidPath(id): UuidPath,
) -> ContactResult<Json<ContactEnvelope>> {
    let contact = service.get_contact(id).await?;
    Ok(Json(ContactEnvelope { contact }))
}

/// Update a contact's phone and/or country
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Contact ID")
    ),
    request_body = UpdateContact,
    responses(
        (status = 200, description = "Contact updated", body = UpdateContactResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateContact>,
) -> ContactResult<Json<UpdateContactResponse>> {
    let contact = service.update_contact(id, input).await?;
    Ok(Json(UpdateContactResponse {
        success: true,
        contact,
    }))
}

/// Delete a contact
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Contact ID")
    ),
    responses(
        (status = 200, description = "Contact deleted", body = DeleteContactResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_contact<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    UuidPath(id): UuidPath,
) -> ContactResult<Json<DeleteContactResponse>> {
    service.delete_contact(id).await?;
    Ok(Json(DeleteContactResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContactError;
    use crate::repository::MockContactRepository;
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(repo: MockContactRepository) -> Router {
        router(ContactService::new(repo))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_contacts_returns_created() {
        let mut repo = MockContactRepository::new();
        repo.expect_insert().returning(Ok);

        let response = app(repo)
            .oneshot(json_request(
                "POST",
                "/",
                json!({"contacts": [
                    {"phone": "+1 (415) 555-0100", "country": "USA"},
                    {"phone": "", "country": "USA"}
                ]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["created"][0]["phone"], "+14155550100");
        assert_eq!(body["skipped"][0]["reason"], "Missing phone or country");
    }

    #[tokio::test]
    async fn test_create_contacts_empty_list_is_bad_request() {
        let response = app(MockContactRepository::new())
            .oneshot(json_request("POST", "/", json!({"contacts": []})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Contact list is empty.");
    }

    #[tokio::test]
    async fn test_by_country_unknown_country_is_bad_request() {
        let response = app(MockContactRepository::new())
            .oneshot(json_request(
                "POST",
                "/by-country",
                json!({"country": "Narnia"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Unsupported country: Narnia");
    }

    #[tokio::test]
    async fn test_by_country_returns_numbers() {
        let mut repo = MockContactRepository::new();
        repo.expect_phones_by_country()
            .returning(|_| Ok(vec!["+8801712345678".into(), "+8801812345678".into()]));

        let response = app(repo)
            .oneshot(json_request(
                "POST",
                "/by-country",
                json!({"country": "Bangladesh"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["numbers"], "+8801712345678\n+8801812345678");
    }

    #[tokio::test]
    async fn test_get_contact_invalid_id() {
        let response = app(MockContactRepository::new())
            .oneshot(
                Request::builder()
                    .uri("/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_contact_not_found() {
        let mut repo = MockContactRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .uri(format!("/{}", Uuid::now_v7()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Contact not found");
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_contact_duplicate_is_conflict() {
        let existing = Contact::new("+541112345678".into(), Country::Argentina);
        let id = existing.id;

        let mut repo = MockContactRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_replace()
            .returning(|_| Err(ContactError::Duplicate));

        let response = app(repo)
            .oneshot(json_request(
                "PATCH",
                &format!("/{}", id),
                json!({"phone": "+54 11 8765 4321"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Duplicate contact number.");
    }

    #[tokio::test]
    async fn test_delete_contact() {
        let mut repo = MockContactRepository::new();
        repo.expect_delete().returning(|_| Ok(true));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/{}", Uuid::now_v7()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_list_contacts_page_shape() {
        let mut repo = MockContactRepository::new();
        repo.expect_count().returning(|_| Ok(0));
        repo.expect_list().returning(|_| Ok(vec![]));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .uri("/?page=2&limit=500")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, json!({"contacts": [], "total": 0, "page": 2, "limit": 100}));
    }
}

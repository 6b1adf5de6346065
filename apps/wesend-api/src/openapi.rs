//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "WeSend API",
        version = "0.1.0",
        description = "Bulk SMS and WhatsApp campaigns with a contact directory",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/contacts", api = domain_contacts::ApiDoc),
        (path = "/api/campaigns", api = domain_campaigns::ApiDoc),
        (path = "/api", api = domain_messaging::ApiDoc)
    ),
    tags(
        (name = "Contacts", description = "Phone directory with per-country validation"),
        (name = "Campaigns", description = "Recorded bulk sends"),
        (name = "Messaging", description = "Bulk SMS and WhatsApp sends")
    )
)]
pub struct ApiDoc;

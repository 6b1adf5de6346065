//! Contacts Domain
//!
//! Phone-number directory used to pick campaign recipients by country.
//!
//! ```text
//! Handlers → ContactService → ContactRepository (trait) → MongoContactRepository
//!                  │
//!                  └── Country::normalize_phone (validation + `+<digits>`)
//! ```
//!
//! ```rust,no_run
//! use domain_contacts::{handlers, ContactService, MongoContactRepository};
//!
//! # async fn example(db: mongodb::Database) -> Result<(), Box<dyn std::error::Error>> {
//! let repository = MongoContactRepository::new(&db);
//! repository.create_indexes().await?;
//! let router = handlers::router(ContactService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod country;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use country::Country;
pub use error::{ContactError, ContactResult};
pub use handlers::ApiDoc;
pub use models::{
    Contact, ContactFilter, ContactInput, ContactPage, CreateContactsResponse, SkippedContact,
    UpdateContact,
};
pub use mongodb::MongoContactRepository;
pub use repository::ContactRepository;
pub use service::ContactService;

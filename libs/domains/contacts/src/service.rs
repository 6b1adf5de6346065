//! Contact Service - Business logic layer

use axum_helpers::pagination::{Page, parse_date_range};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::country::Country;
use crate::error::{ContactError, ContactResult};
use crate::models::{
    Contact, ContactFilter, ContactInput, ContactPage, ContactQuery, CreateContactsResponse,
    SkippedContact, UpdateContact,
};
use crate::repository::ContactRepository;

const MISSING_FIELDS: &str = "Missing phone or country";

pub struct ContactService<R: ContactRepository> {
    repository: Arc<R>,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Bulk import.
    ///
    /// Invalid or duplicate entries are skipped with a reason instead of
    /// failing the batch; only storage failures abort it.
    #[instrument(skip(self, inputs))]
    pub async fn create_contacts(
        &self,
        inputs: Option<Vec<ContactInput>>,
    ) -> ContactResult<CreateContactsResponse> {
        let inputs = inputs.unwrap_or_default();
        if inputs.is_empty() {
            return Err(ContactError::Validation("Contact list is empty.".to_string()));
        }

        let mut created = Vec::new();
        let mut skipped = Vec::new();

        for input in inputs {
            let (phone, country) = match (non_blank(&input.phone), non_blank(&input.country)) {
                (Some(phone), Some(country)) => (phone, country),
                _ => {
                    skipped.push(SkippedContact {
                        input,
                        reason: MISSING_FIELDS.to_string(),
                    });
                    continue;
                }
            };

            let contact = Country::parse(country).and_then(|country| {
                country
                    .normalize_phone(phone)
                    .map(|phone| Contact::new(phone, country))
            });

            let outcome = match contact {
                Ok(contact) => self.repository.insert(contact).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(contact) => created.push(contact),
                Err(e @ ContactError::Database(_)) => return Err(e),
                Err(e) => skipped.push(SkippedContact {
                    input,
                    reason: e.to_string(),
                }),
            }
        }

        tracing::info!(
            created = created.len(),
            skipped = skipped.len(),
            "Contact import finished"
        );

        Ok(CreateContactsResponse {
            success: true,
            created,
            skipped,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_contacts(&self, filter: ContactFilter) -> ContactResult<ContactPage> {
        let page = Page::new(filter.page, filter.limit);
        let (from, to) = parse_date_range(filter.from.as_deref(), filter.to.as_deref())?;
        let country = non_blank(&filter.country).map(Country::parse).transpose()?;

        let query = ContactQuery {
            search: non_blank(&filter.search).map(str::to_string),
            country,
            from,
            to,
            skip: page.skip(),
            limit: page.limit,
        };

        let total = self.repository.count(query.clone()).await?;
        let contacts = self.repository.list(query).await?;

        Ok(ContactPage {
            contacts,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_contact(&self, id: Uuid) -> ContactResult<Contact> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ContactError::NotFound(id))
    }

    /// Applies the provided fields and re-runs phone validation against the
    /// resulting country.
    #[instrument(skip(self, input))]
    pub async fn update_contact(&self, id: Uuid, input: UpdateContact) -> ContactResult<Contact> {
        let mut contact = self.get_contact(id).await?;

        if let Some(ref country) = input.country {
            contact.country = Country::parse(country)?;
        }
        let raw_phone = input.phone.as_deref().unwrap_or(&contact.phone);
        contact.phone = contact.country.normalize_phone(raw_phone)?;
        contact.updated_at = Utc::now();

        self.repository.replace(contact).await
    }

    #[instrument(skip(self))]
    pub async fn delete_contact(&self, id: Uuid) -> ContactResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ContactError::NotFound(id));
        }
        Ok(())
    }

    /// Newline-joined phones of one country.
    #[instrument(skip(self))]
    pub async fn numbers_by_country(&self, country: Option<String>) -> ContactResult<String> {
        let country = non_blank(&country)
            .ok_or_else(|| ContactError::Validation("Country is required".to_string()))?;
        let country = Country::parse(country)?;

        let phones = self.repository.phones_by_country(country).await?;
        Ok(phones.join("\n"))
    }
}

impl<R: ContactRepository> Clone for ContactService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

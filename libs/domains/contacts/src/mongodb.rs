//! MongoDB implementation of ContactRepository

use async_trait::async_trait;
use database::mongodb::timestamp;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;
use uuid::Uuid;

use crate::country::Country;
use crate::error::{ContactError, ContactResult};
use crate::models::{Contact, ContactQuery};
use crate::repository::ContactRepository;

pub const COLLECTION: &str = "contacts";

/// MongoDB implementation of the ContactRepository
#[derive(Clone)]
pub struct MongoContactRepository {
    collection: Collection<Contact>,
}

impl MongoContactRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Contact>(COLLECTION),
        }
    }

    /// Unique phone index plus the listing sort key.
    #[instrument(skip(self))]
    pub async fn create_indexes(&self) -> ContactResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "phone": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("phone_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "country": 1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "createdAt": -1 })
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = COLLECTION, "Contact indexes ensured");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) }
    }

    fn build_filter(query: &ContactQuery) -> Document {
        let mut doc = doc! {};

        if let Some(ref search) = query.search {
            doc.insert("phone", doc! { "$regex": regex::escape(search) });
        }

        if let Some(country) = query.country {
            doc.insert("country", country.to_string());
        }

        let mut range = doc! {};
        if let Some(from) = query.from {
            range.insert("$gte", timestamp::format(&from));
        }
        if let Some(to) = query.to {
            range.insert("$lte", timestamp::format(&to));
        }
        if !range.is_empty() {
            doc.insert("createdAt", range);
        }

        doc
    }
}

#[async_trait]
impl ContactRepository for MongoContactRepository {
    #[instrument(skip(self, contact), fields(phone = %contact.phone))]
    async fn insert(&self, contact: Contact) -> ContactResult<Contact> {
        self.collection.insert_one(&contact).await?;
        tracing::info!(contact_id = %contact.id, "Contact created");
        Ok(contact)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ContactResult<Option<Contact>> {
        Ok(self.collection.find_one(Self::id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: ContactQuery) -> ContactResult<Vec<Contact>> {
        let options = FindOptions::builder()
            .skip(query.skip)
            .limit(query.limit as i64)
            .sort(doc! { "createdAt": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&query))
            .with_options(options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, query: ContactQuery) -> ContactResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&query))
            .await?)
    }

    #[instrument(skip(self, contact), fields(contact_id = %contact.id))]
    async fn replace(&self, contact: Contact) -> ContactResult<Contact> {
        let result = self
            .collection
            .replace_one(Self::id_filter(contact.id), &contact)
            .await?;

        if result.matched_count == 0 {
            return Err(ContactError::NotFound(contact.id));
        }

        tracing::info!(contact_id = %contact.id, "Contact updated");
        Ok(contact)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ContactResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(contact_id = %id, "Contact deleted");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn phones_by_country(&self, country: Country) -> ContactResult<Vec<String>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": 1 })
            .projection(doc! { "phone": 1, "_id": 0 })
            .build();

        let cursor = self
            .collection
            .clone_with_type::<Document>()
            .find(doc! { "country": country.to_string() })
            .with_options(options)
            .await?;

        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs
            .into_iter()
            .filter_map(|d| d.get_str("phone").ok().map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoContactRepository::build_filter(&ContactQuery::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_escapes_search() {
        let query = ContactQuery {
            search: Some("+880".to_string()),
            ..Default::default()
        };
        let doc = MongoContactRepository::build_filter(&query);
        let phone = doc.get_document("phone").unwrap();
        assert_eq!(phone.get_str("$regex").unwrap(), r"\+880");
    }

    #[test]
    fn test_build_filter_date_range_uses_stored_format() {
        let query = ContactQuery {
            country: Some(Country::Peru),
            from: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap()),
            ..Default::default()
        };
        let doc = MongoContactRepository::build_filter(&query);
        assert_eq!(doc.get_str("country").unwrap(), "Peru");

        let range = doc.get_document("createdAt").unwrap();
        assert_eq!(range.get_str("$gte").unwrap(), "2025-01-01T00:00:00.000Z");
        assert_eq!(range.get_str("$lte").unwrap(), "2025-01-31T23:59:59.000Z");
    }
}

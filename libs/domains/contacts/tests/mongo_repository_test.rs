//! MongoDB-backed tests for the contacts repository and service.
//!
//! Require Docker; run with `cargo test -p domain_contacts -- --ignored`.

use domain_contacts::models::ContactQuery;
use domain_contacts::*;
use test_utils::{TestDataBuilder, TestMongo};

async fn repository(mongo: &TestMongo) -> MongoContactRepository {
    let repo = MongoContactRepository::new(&mongo.database());
    repo.create_indexes().await.unwrap();
    repo
}

#[tokio::test]
#[ignore] // needs Docker
async fn test_insert_and_get_contact() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo).await;
    let builder = TestDataBuilder::from_test_name("insert_and_get_contact");

    let phone = Country::Bangladesh
        .normalize_phone(&builder.phone("880", "17", 8))
        .unwrap();
    let created = repo.insert(Contact::new(phone.clone(), Country::Bangladesh)).await.unwrap();

    let found = repo.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.phone, phone);
    assert_eq!(found.country, Country::Bangladesh);
    assert_eq!(found.created_at.timestamp_millis(), created.created_at.timestamp_millis());
}

#[tokio::test]
#[ignore] // needs Docker
async fn test_duplicate_phone_is_rejected() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo).await;
    let builder = TestDataBuilder::from_test_name("duplicate_phone");

    let phone = format!("+{}", builder.phone("65", "", 8));
    repo.insert(Contact::new(phone.clone(), Country::Singapore)).await.unwrap();

    let err = repo
        .insert(Contact::new(phone, Country::Singapore))
        .await
        .unwrap_err();
    assert!(matches!(err, ContactError::Duplicate));
}

#[tokio::test]
#[ignore] // needs Docker
async fn test_list_filters_and_pages() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo).await;
    let builder = TestDataBuilder::from_test_name("list_filters_and_pages");

    for i in 0..5 {
        let phone = format!("+{}", builder.nth_phone("91", "9", 9, i));
        repo.insert(Contact::new(phone, Country::India)).await.unwrap();
    }
    let peru = format!("+{}", builder.phone("51", "9", 8));
    repo.insert(Contact::new(peru.clone(), Country::Peru)).await.unwrap();

    let india = ContactQuery {
        country: Some(Country::India),
        limit: 2,
        ..Default::default()
    };
    assert_eq!(repo.count(india.clone()).await.unwrap(), 5);

    let first_page = repo.list(india.clone()).await.unwrap();
    assert_eq!(first_page.len(), 2);
    assert!(first_page[0].created_at >= first_page[1].created_at);

    let last_page = repo
        .list(ContactQuery { skip: 4, ..india })
        .await
        .unwrap();
    assert_eq!(last_page.len(), 1);

    let search = ContactQuery {
        search: Some(peru[..6].to_string()),
        limit: 10,
        ..Default::default()
    };
    let found = repo.list(search).await.unwrap();
    assert!(found.iter().any(|c| c.phone == peru));
}

#[tokio::test]
#[ignore] // needs Docker
async fn test_update_and_by_country_through_service() {
    let mongo = TestMongo::new().await;
    let service = ContactService::new(repository(&mongo).await);
    let builder = TestDataBuilder::from_test_name("update_and_by_country");

    let response = service
        .create_contacts(Some(vec![
            ContactInput::new(builder.nth_phone("52", "55", 8, 0), "Mexico"),
            ContactInput::new(builder.nth_phone("52", "55", 8, 1), "Mexico"),
        ]))
        .await
        .unwrap();
    assert_eq!(response.created.len(), 2);

    let numbers = service
        .numbers_by_country(Some("Mexico".to_string()))
        .await
        .unwrap();
    assert_eq!(numbers.lines().count(), 2);

    let first = &response.created[0];
    let second = &response.created[1];
    let err = service
        .update_contact(
            first.id,
            UpdateContact {
                phone: Some(second.phone.clone()),
                country: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ContactError::Duplicate));

    service.delete_contact(first.id).await.unwrap();
    assert!(matches!(
        service.get_contact(first.id).await.unwrap_err(),
        ContactError::NotFound(_)
    ));
}

use mongodb::{Client, bson::doc};

/// Pings the `admin` database.
pub async fn check_health(client: &Client) -> Result<(), mongodb::error::Error> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
}

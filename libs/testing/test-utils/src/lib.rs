//! Shared test utilities for the domain crates.
//!
//! - `TestMongo`: throwaway MongoDB container (feature: "mongo", default)
//! - `TestDataBuilder`: deterministic ids, names and phone numbers
//!
//! ```rust,ignore
//! use test_utils::{TestMongo, TestDataBuilder};
//!
//! #[tokio::test]
//! #[ignore] // needs Docker
//! async fn stores_contacts() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("stores_contacts");
//!     let repo = MongoContactRepository::new(&mongo.database());
//!     let phone = builder.phone("880", "17", 8);
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Seeded generator so reruns of a test see the same data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed derived from the test name.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_contact");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// `test-<prefix>-<seed>-<suffix>`, e.g. a campaign name.
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A digits-only phone number: `prefix`, then `lead`, then `rest_len`
    /// seed-derived digits.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let phone = TestDataBuilder::new(7).phone("880", "17", 8);
    /// assert_eq!(phone.len(), 13);
    /// assert!(phone.starts_with("88017"));
    /// ```
    pub fn phone(&self, prefix: &str, lead: &str, rest_len: usize) -> String {
        let digits = format!("{:020}", self.seed);
        let tail = &digits[digits.len() - rest_len.min(digits.len())..];
        format!("{}{}{:0>width$}", prefix, lead, tail, width = rest_len)
    }

    /// Like [`Self::phone`] but distinct per `index`.
    pub fn nth_phone(&self, prefix: &str, lead: &str, rest_len: usize, index: u64) -> String {
        Self::new(self.seed.wrapping_add(index)).phone(prefix, lead, rest_len)
    }
}

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

use crate::error::ContactError;

/// Countries the directory accepts numbers for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
pub enum Country {
    Bangladesh,
    #[serde(rename = "USA")]
    #[strum(serialize = "USA")]
    Usa,
    Canada,
    India,
    Mexico,
    Colombia,
    Argentina,
    Peru,
    Singapore,
}

static PATTERNS: LazyLock<HashMap<Country, Regex>> = LazyLock::new(|| {
    Country::iter()
        .map(|country| {
            let pattern = match country {
                Country::Bangladesh => r"^8801[3-9]\d{8}$",
                Country::Usa | Country::Canada => r"^1\d{10}$",
                Country::India => r"^91\d{10}$",
                Country::Mexico => r"^52\d{10}$",
                Country::Colombia => r"^57\d{10}$",
                Country::Argentina => r"^54\d{10}$",
                Country::Peru => r"^51\d{9}$",
                Country::Singapore => r"^65\d{8}$",
            };
            (country, Regex::new(pattern).unwrap())
        })
        .collect()
});

impl Country {
    /// Parses a stored/submitted country name.
    pub fn parse(name: &str) -> Result<Self, ContactError> {
        name.trim()
            .parse()
            .map_err(|_| ContactError::UnsupportedCountry(name.trim().to_string()))
    }

    /// International dialing prefix, without `+`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Country::Bangladesh => "880",
            Country::Usa | Country::Canada => "1",
            Country::India => "91",
            Country::Mexico => "52",
            Country::Colombia => "57",
            Country::Argentina => "54",
            Country::Peru => "51",
            Country::Singapore => "65",
        }
    }

    fn pattern(&self) -> &'static Regex {
        &PATTERNS[self]
    }

    /// Strips non-digits, checks prefix and pattern, returns `+<digits>`.
    pub fn normalize_phone(&self, raw: &str) -> Result<String, ContactError> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        if !digits.starts_with(self.prefix()) {
            return Err(ContactError::Validation(format!(
                "Phone number must start with '{}' for {}",
                self.prefix(),
                self
            )));
        }

        if !self.pattern().is_match(&digits) {
            return Err(ContactError::Validation(format!(
                "Invalid phone number format for {}",
                self
            )));
        }

        Ok(format!("+{}", digits))
    }
}

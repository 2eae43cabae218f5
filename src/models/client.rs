//! Client form models

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::Client;

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\-]+$").expect("phone pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Invalid Client ID.")]
    InvalidClientId(String),

    #[error("Invalid phone number: only digits and '-' are allowed.")]
    InvalidPhone(String),
}

/// Raw text of the client form, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientForm {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address_line_1: String,
    #[serde(default)]
    pub address_line_2: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email_or_fax: String,
}

impl ClientForm {
    /// The id field parsed as an integer, `None` when left blank.
    pub fn parsed_client_id(&self) -> Result<Option<i64>, FormError> {
        let raw = self.client_id.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<i64>()
            .map(Some)
            .map_err(|_| FormError::InvalidClientId(raw.to_string()))
    }

    /// Check field constraints and return the id, if one was entered.
    pub fn validate(&self) -> Result<Option<i64>, FormError> {
        let client_id = self.parsed_client_id()?;
        let phone = self.phone.trim();
        if !phone.is_empty() && !PHONE.is_match(phone) {
            return Err(FormError::InvalidPhone(phone.to_string()));
        }
        Ok(client_id)
    }

    /// Every field is copied as-is, blanks included.
    pub fn into_client(self, client_id: i64) -> Client {
        Client {
            client_id,
            name: self.name,
            address_line_1: self.address_line_1,
            address_line_2: self.address_line_2,
            phone: self.phone.trim().to_string(),
            email_or_fax: self.email_or_fax,
        }
    }
}

impl From<&Client> for ClientForm {
    fn from(client: &Client) -> Self {
        ClientForm {
            client_id: client.client_id.to_string(),
            name: client.name.clone(),
            address_line_1: client.address_line_1.clone(),
            address_line_2: client.address_line_2.clone(),
            phone: client.phone.clone(),
            email_or_fax: client.email_or_fax.clone(),
        }
    }
}

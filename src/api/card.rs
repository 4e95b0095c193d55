//! Card operations.

use serde_json::Value;
use tracing::info;

use crate::api::board::expect_not_found;
use crate::api::resource::{ResourceClient, random_name};
use crate::api::session::Session;
use crate::api::transport::{ApiResponse, Method};
use crate::error::{ApiError, AssertionError, Result};

/// Description sent by [`CardResource::update_card`] when none is given.
pub const DEFAULT_DESCRIPTION: &str = "Updated description";

/// Card operations bound to one session.
#[derive(Debug, Clone)]
pub struct CardResource {
    client: ResourceClient,
}

impl CardResource {
    /// Bind card operations to `session`.
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            client: ResourceClient::new(session),
        }
    }

    /// Create a card on `list_id`, generating `Card_xxxxxx` when no name is
    /// given.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers 200.
    pub async fn create_card(&self, list_id: &str, name: Option<&str>) -> Result<ApiResponse> {
        let request = self
            .client
            .request(Method::Post, "cards")
            .with_form("idList", list_id)
            .with_form("name", name.map_or_else(|| random_name("Card"), str::to_owned));
        Ok(self
            .client
            .send_expecting("create card", request, 200)
            .await?)
    }

    /// Reject an empty card id.
    ///
    /// # Errors
    ///
    /// Returns `AssertionError::InvalidIdentifier` for an empty id.
    pub fn ensure_valid_card_id(card_id: &str) -> Result<()> {
        if card_id.trim().is_empty() {
            return Err(AssertionError::InvalidIdentifier {
                what: String::from("Card ID"),
            }
            .into());
        }
        Ok(())
    }

    /// Take the card id from the `id` field.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MalformedResponse` when `id` is absent and
    /// `AssertionError::InvalidIdentifier` when it is empty.
    pub fn extract_card_id(response: &ApiResponse) -> Result<String> {
        let card_id = response
            .string_field("id")?
            .ok_or_else(|| ApiError::MalformedResponse {
                message: String::from("response from card creation does not contain id"),
            })?;
        Self::ensure_valid_card_id(&card_id)?;
        Ok(card_id)
    }

    /// Fetch a card. The status is not checked.
    ///
    /// # Errors
    ///
    /// Fails for an empty id or if the call could not be made.
    pub async fn get_card(&self, card_id: &str) -> Result<ApiResponse> {
        Self::ensure_valid_card_id(card_id)?;
        let request = self.client.request(Method::Get, format!("cards/{card_id}"));
        Ok(self.client.send(request).await?)
    }

    /// Require the `name` field of `response` to equal `expected`.
    ///
    /// # Errors
    ///
    /// Returns `AssertionError::Mismatch` on a different name.
    pub fn assert_card_name(response: &ApiResponse, expected: &str) -> Result<()> {
        assert_field(response, "name", "card name", expected)
    }

    /// Require the `id` field of `response` to equal `expected`.
    ///
    /// # Errors
    ///
    /// Returns `AssertionError::Mismatch` on a different id.
    pub fn assert_card_id(response: &ApiResponse, expected: &str) -> Result<()> {
        assert_field(response, "id", "card ID", expected)
    }

    /// Rename and move a card and require a 200.
    ///
    /// # Errors
    ///
    /// Fails for an empty id or unless the service answers 200.
    pub async fn update_card(
        &self,
        card_id: &str,
        new_name: &str,
        list_id: &str,
        description: &str,
    ) -> Result<ApiResponse> {
        Self::ensure_valid_card_id(card_id)?;
        let request = self
            .client
            .request(Method::Put, format!("cards/{card_id}"))
            .with_form("idList", list_id)
            .with_form("name", new_name)
            .with_form("desc", description);
        Ok(self
            .client
            .send_expecting("update card", request, 200)
            .await?)
    }

    /// Delete a card and require a 200.
    ///
    /// # Errors
    ///
    /// Fails for an empty id or unless the service answers 200.
    pub async fn delete_card(&self, card_id: &str) -> Result<ApiResponse> {
        Self::ensure_valid_card_id(card_id)?;
        let request = self
            .client
            .request(Method::Delete, format!("cards/{card_id}"));
        let response = self
            .client
            .send_expecting("delete card", request, 200)
            .await?;
        info!(card_id, "deleted card");
        Ok(response)
    }

    /// Fetch a card and require a 404.
    ///
    /// # Errors
    ///
    /// Returns `AssertionError::Mismatch` when the card is still reachable.
    pub async fn assert_card_deleted(&self, card_id: &str) -> Result<()> {
        let response = self.get_card(card_id).await?;
        expect_not_found("deleted card", &response)
    }
}

fn assert_field(response: &ApiResponse, key: &str, label: &str, expected: &str) -> Result<()> {
    let body = response.json()?;
    let actual = body.get(key).and_then(Value::as_str);
    if actual == Some(expected) {
        return Ok(());
    }
    Err(AssertionError::Mismatch {
        field: label.to_owned(),
        expected: format!("\"{expected}\""),
        actual: actual.map_or_else(|| String::from("<missing>"), |v| format!("\"{v}\"")),
    }
    .into())
}

//! Board operations.

use futures_util::future::join_all;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::api::resource::{ResourceClient, expect_status, random_name};
use crate::api::session::Session;
use crate::api::transport::{ApiResponse, Method};
use crate::config::Auth;
use crate::error::{ApiError, AssertionError, Result};

/// Board operations bound to one session.
#[derive(Debug, Clone)]
pub struct BoardResource {
    client: ResourceClient,
}

impl BoardResource {
    /// Bind board operations to `session`.
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            client: ResourceClient::new(session),
        }
    }

    /// Create a board, generating `Board_xxxxxx` when no name is given.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers 200.
    pub async fn create_board(&self, name: Option<&str>) -> Result<ApiResponse> {
        let request = self
            .client
            .request(Method::Post, "boards/")
            .with_query("name", board_name(name));
        Ok(self
            .client
            .send_expecting("create board", request, 200)
            .await?)
    }

    /// Attempt to create a board and require a 401.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers 401.
    pub async fn unauthorized_create_board(&self, name: Option<&str>) -> Result<ApiResponse> {
        let request = self
            .client
            .request(Method::Post, "boards/")
            .with_query("name", board_name(name));
        Ok(self
            .client
            .send_expecting("create board without authorization", request, 401)
            .await?)
    }

    /// Take the board id from the trailing segment of `shortUrl`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MalformedResponse` when `shortUrl` is absent and
    /// `AssertionError::InvalidIdentifier` when its last segment is empty.
    pub fn extract_board_id(response: &ApiResponse) -> Result<String> {
        let short_url =
            response
                .string_field("shortUrl")?
                .ok_or_else(|| ApiError::MalformedResponse {
                    message: String::from("response does not contain shortUrl"),
                })?;
        match short_url.rsplit('/').next() {
            Some(id) if !id.is_empty() => Ok(id.to_owned()),
            _ => Err(AssertionError::InvalidIdentifier {
                what: String::from("Board ID"),
            }
            .into()),
        }
    }

    /// Fetch a board. The status is not checked.
    ///
    /// # Errors
    ///
    /// Fails only if the call could not be made.
    pub async fn get_board(&self, board_id: &str) -> Result<ApiResponse> {
        let request = self
            .client
            .request(Method::Get, format!("boards/{board_id}"));
        Ok(self.client.send(request).await?)
    }

    /// Require the `name` field of `response` to equal `expected`.
    ///
    /// # Errors
    ///
    /// Returns `AssertionError::Mismatch` on a different name.
    pub fn assert_board_name(response: &ApiResponse, expected: &str) -> Result<()> {
        let body = response.json()?;
        let actual = body.get("name").and_then(Value::as_str);
        if actual == Some(expected) {
            return Ok(());
        }
        Err(AssertionError::Mismatch {
            field: String::from("board name"),
            expected: expected.to_owned(),
            actual: format!(
                "{}\nResponse id: {}\nShort URL: {}",
                actual.unwrap_or("<missing>"),
                text_field(&body, "id"),
                text_field(&body, "shortUrl"),
            ),
        }
        .into())
    }

    /// Rename a board and require a 200.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers 200.
    pub async fn update_board_name(&self, board_id: &str, new_name: &str) -> Result<ApiResponse> {
        self.rename("update board name", board_id, new_name, 200)
            .await
    }

    /// Rename a board that should no longer exist and require a 404.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers 404.
    pub async fn update_deleted_board_name(
        &self,
        board_id: &str,
        new_name: &str,
    ) -> Result<ApiResponse> {
        self.rename("update deleted board name", board_id, new_name, 404)
            .await
    }

    async fn rename(
        &self,
        operation: &str,
        board_id: &str,
        new_name: &str,
        expected: u16,
    ) -> Result<ApiResponse> {
        let request = self
            .client
            .request(Method::Put, format!("boards/{board_id}"))
            .with_form("name", new_name);
        Ok(self
            .client
            .send_expecting(operation, request, expected)
            .await?)
    }

    /// Delete a board and require a 200.
    ///
    /// A non-200 answer is logged with its body before the error is returned.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers 200.
    pub async fn delete_board(&self, board_id: &str) -> Result<ApiResponse> {
        let request = self
            .client
            .request(Method::Delete, format!("boards/{board_id}"));
        let response = self.client.send(request).await?;
        if response.status() == 200 {
            info!(board_id, "deleted board");
        } else {
            error!(
                board_id,
                status = response.status(),
                body = response.body_or_unavailable(),
                "failed to delete board"
            );
        }
        Ok(expect_status("delete board", response, 200)?)
    }

    /// Fetch a board and require a 404.
    ///
    /// # Errors
    ///
    /// Returns `AssertionError::Mismatch` when the board is still reachable.
    pub async fn assert_board_deleted(&self, board_id: &str) -> Result<()> {
        let response = self.get_board(board_id).await?;
        expect_not_found("deleted board", &response)
    }

    /// Replace the key this object sends. Other resource objects and the
    /// session keep theirs.
    pub fn set_invalid_api_key(&mut self, invalid_key: &str) {
        self.client.set_key(invalid_key);
    }

    /// The credentials this object sends.
    #[must_use]
    pub const fn auth(&self) -> &Auth {
        self.client.auth()
    }

    /// List the ids of a board's lists in service order.
    ///
    /// Entries without an id are skipped.
    ///
    /// # Errors
    ///
    /// Fails unless the service answers 200 with a JSON array.
    pub async fn lists_on_board(&self, board_id: &str) -> Result<Vec<String>> {
        let request = self
            .client
            .request(Method::Get, format!("boards/{board_id}/lists"));
        let response = self
            .client
            .send_expecting("retrieve lists", request, 200)
            .await?;
        let body = response.json()?;
        let entries = body.as_array().ok_or_else(|| ApiError::MalformedResponse {
            message: String::from("lists response is not an array"),
        })?;
        Ok(entries
            .iter()
            .filter_map(|list| list.get("id").and_then(Value::as_str))
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// The id of a board's first list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NoLists` when the board has none.
    pub async fn first_list(&self, board_id: &str) -> Result<String> {
        self.lists_on_board(board_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ApiError::NoLists {
                    board_id: board_id.to_owned(),
                }
                .into()
            })
    }

    async fn purge(&self) -> Result<PurgeReport> {
        let request = self.client.request(Method::Get, "members/me/boards");
        let response = self
            .client
            .send_expecting("list member boards", request, 200)
            .await?;
        let body = response.json()?;
        let short_links: Vec<String> = body
            .as_array()
            .map(|boards| {
                boards
                    .iter()
                    .filter_map(|board| board.get("shortLink").and_then(Value::as_str))
                    .filter(|link| !link.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let deletions = short_links.iter().map(|link| async move {
            let request = self
                .client
                .request(Method::Delete, format!("boards/{link}"));
            let outcome = match self.client.send(request).await {
                Ok(response) if response.status() == 200 => Ok(()),
                Ok(response) => Err(format!(
                    "expected 200 status but got {}",
                    response.status()
                )),
                Err(e) => Err(e.to_string()),
            };
            (link.clone(), outcome)
        });

        let mut report = PurgeReport::default();
        for (link, outcome) in join_all(deletions).await {
            match outcome {
                Ok(()) => report.deleted.push(link),
                Err(reason) => {
                    warn!(board = %link, %reason, "failed to delete board during purge");
                    report.failed.push((link, reason));
                }
            }
        }
        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "purged member boards"
        );
        Ok(report)
    }
}

/// Outcome of [`delete_all_boards`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Short links of boards that were deleted.
    pub deleted: Vec<String>,
    /// Short links of boards that could not be deleted, with the reason.
    pub failed: Vec<(String, String)>,
}

impl PurgeReport {
    /// Whether every delete succeeded.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delete every board of the authenticated member.
///
/// Deletes are issued concurrently and all of them are awaited. Individual
/// failures are logged and recorded in the report, never returned.
///
/// # Errors
///
/// Fails only when the member's boards cannot be listed.
pub async fn delete_all_boards(session: &Session) -> Result<PurgeReport> {
    BoardResource::new(session).purge().await
}

fn board_name(name: Option<&str>) -> String {
    name.map_or_else(|| random_name("Board"), str::to_owned)
}

fn text_field<'a>(body: &'a Value, field: &str) -> &'a str {
    body.get(field).and_then(Value::as_str).unwrap_or("<missing>")
}

pub(crate) fn expect_not_found(what: &str, response: &ApiResponse) -> Result<()> {
    if response.status() == 404 {
        return Ok(());
    }
    Err(AssertionError::Mismatch {
        field: format!("404 status for {what}"),
        expected: String::from("to be returned"),
        actual: response.status().to_string(),
    }
    .into())
}

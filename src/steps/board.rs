//! Board step behaviour.

use tracing::info;

use crate::api::BoardResource;
use crate::context::ScenarioContext;
use crate::error::Result;

/// Name used by the board rename step.
pub const UPDATED_BOARD_NAME: &str = "Updated Board Name";
/// Name used when renaming a board that was deleted.
pub const DELETED_BOARD_NAME: &str = "Deleted Board";
/// Key installed by the invalid-key step.
pub const INVALID_API_KEY: &str = "invalid_key";

/// `I am authenticated with the Trello API`
///
/// # Errors
///
/// Fails when the scenario has no session.
pub fn authenticate(ctx: &mut ScenarioContext) -> Result<()> {
    ctx.boards()?;
    Ok(())
}

/// `I send a request to create a board`
///
/// # Errors
///
/// Fails without a session or unless the service answers 200.
pub async fn create_board(ctx: &mut ScenarioContext) -> Result<()> {
    let boards = ctx.boards()?.clone();
    ctx.response = Some(boards.create_board(None).await?);
    Ok(())
}

/// `the response should contain a valid board ID`
///
/// Stores the id and name and takes ownership of the board.
///
/// # Errors
///
/// Fails without a response or when it carries no usable `shortUrl`.
pub fn store_board_id(ctx: &mut ScenarioContext) -> Result<()> {
    let response = ctx.require_response()?;
    let board_id = BoardResource::extract_board_id(response)?;
    let board_name = response.string_field("name")?;
    ctx.own_board(&board_id);
    if board_name.is_some() {
        ctx.board_name = board_name;
    }
    ctx.board_id = Some(board_id);
    Ok(())
}

/// `I send an unauthorized request to create a board`
///
/// # Errors
///
/// Fails without a session or unless the service answers 401.
pub async fn create_board_unauthorized(ctx: &mut ScenarioContext) -> Result<()> {
    let boards = ctx.boards()?.clone();
    ctx.response = Some(boards.unauthorized_create_board(None).await?);
    Ok(())
}

/// `I have a valid board ID`
///
/// # Errors
///
/// Fails when no board id is set.
pub fn require_board(ctx: &mut ScenarioContext) -> Result<()> {
    ctx.require_board_id()?;
    Ok(())
}

/// `I am using an invalid Trello API key`
///
/// Only the scenario's board object is affected.
///
/// # Errors
///
/// Fails when the scenario has no session.
pub fn use_invalid_api_key(ctx: &mut ScenarioContext) -> Result<()> {
    ctx.boards()?.set_invalid_api_key(INVALID_API_KEY);
    Ok(())
}

/// `I send a request to update the board's name`
///
/// # Errors
///
/// Fails for the shared board, without a board id, or unless the service
/// answers 200.
pub async fn update_board_name(ctx: &mut ScenarioContext) -> Result<()> {
    let board_id = ctx.require_mutable_board_id()?.to_owned();
    let boards = ctx.boards()?.clone();
    ctx.response = Some(
        boards
            .update_board_name(&board_id, UPDATED_BOARD_NAME)
            .await?,
    );
    Ok(())
}

/// `I send a request to update the deleted board's name`
///
/// # Errors
///
/// Fails for the shared board, without a board id, or unless the service
/// answers 404.
pub async fn update_deleted_board_name(ctx: &mut ScenarioContext) -> Result<()> {
    let board_id = ctx.require_mutable_board_id()?.to_owned();
    let boards = ctx.boards()?.clone();
    ctx.response = Some(
        boards
            .update_deleted_board_name(&board_id, DELETED_BOARD_NAME)
            .await?,
    );
    Ok(())
}

/// `I send a request to retrieve the board details`
///
/// # Errors
///
/// Fails without a board id or if the call could not be made.
pub async fn get_board(ctx: &mut ScenarioContext) -> Result<()> {
    let board_id = ctx.require_board_id()?.to_owned();
    let boards = ctx.boards()?.clone();
    ctx.response = Some(boards.get_board(&board_id).await?);
    Ok(())
}

/// `the response should contain the correct board information`
///
/// # Errors
///
/// Fails without a response or board name, or when the names differ.
pub fn assert_board_information(ctx: &mut ScenarioContext) -> Result<()> {
    let response = ctx.require_response()?;
    let board_name = ctx.require_board_name()?;
    BoardResource::assert_board_name(response, board_name)
}

/// `the response should reflect the updated board name`
///
/// # Errors
///
/// Fails without a response or when the name was not updated.
pub fn assert_updated_board_name(ctx: &mut ScenarioContext) -> Result<()> {
    BoardResource::assert_board_name(ctx.require_response()?, UPDATED_BOARD_NAME)
}

/// `I send a request to delete the board`
///
/// A deleted board is no longer owned, so teardown will not delete it again.
///
/// # Errors
///
/// Fails for the shared board, without a board id, or unless the service
/// answers 200.
pub async fn delete_board(ctx: &mut ScenarioContext) -> Result<()> {
    let board_id = ctx.require_mutable_board_id()?.to_owned();
    let boards = ctx.boards()?.clone();
    let response = boards.delete_board(&board_id).await?;
    ctx.release_board(&board_id);
    ctx.response = Some(response);
    Ok(())
}

/// `the board should no longer exist when I attempt to retrieve it`
///
/// Clears the board id once the board is confirmed gone.
///
/// # Errors
///
/// Fails without a board id or when the board is still reachable.
pub async fn assert_board_deleted(ctx: &mut ScenarioContext) -> Result<()> {
    let board_id = ctx.require_board_id()?.to_owned();
    let boards = ctx.boards()?.clone();
    boards.assert_board_deleted(&board_id).await?;
    ctx.release_board(&board_id);
    ctx.board_id = None;
    info!(%board_id, "confirmed board deletion");
    Ok(())
}

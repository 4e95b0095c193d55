//! Card step behaviour.

use crate::api::{BoardResource, CardResource};
use crate::api::card::DEFAULT_DESCRIPTION;
use crate::context::ScenarioContext;
use crate::error::Result;

/// Name used by the card rename step.
pub const UPDATED_CARD_NAME: &str = "Updated Card Name";

/// `I have a valid board ID and list ID`
///
/// Keeps ids provided by hooks; otherwise creates a board the scenario owns
/// and binds its first list.
///
/// # Errors
///
/// Fails without a session, if the board cannot be created, or if it has
/// no lists.
pub async fn require_board_and_list(ctx: &mut ScenarioContext) -> Result<()> {
    if ctx.board_id.is_some() && ctx.list_id.is_some() {
        return Ok(());
    }
    let boards = ctx.boards()?.clone();
    let response = boards.create_board(None).await?;
    let board_id = BoardResource::extract_board_id(&response)?;
    ctx.own_board(&board_id);
    ctx.board_name = response.string_field("name")?;
    ctx.board_id = Some(board_id.clone());
    ctx.list_id = Some(boards.first_list(&board_id).await?);
    Ok(())
}

/// `I send a request to create a card`
///
/// # Errors
///
/// Fails without a list id or unless the service answers 200.
pub async fn create_card(ctx: &mut ScenarioContext) -> Result<()> {
    let list_id = ctx.require_list_id()?.to_owned();
    let cards = ctx.cards()?.clone();
    ctx.response = Some(cards.create_card(&list_id, None).await?);
    Ok(())
}

/// `the response should contain a valid card ID`
///
/// Stores the id and takes ownership of the card.
///
/// # Errors
///
/// Fails without a response or when it carries no id.
pub fn store_card_id(ctx: &mut ScenarioContext) -> Result<()> {
    let card_id = CardResource::extract_card_id(ctx.require_response()?)?;
    ctx.own_card(&card_id);
    ctx.card_id = Some(card_id);
    Ok(())
}

/// `I have a valid card ID`
///
/// # Errors
///
/// Fails when no card id is set or it is blank.
pub fn require_card(ctx: &mut ScenarioContext) -> Result<()> {
    CardResource::ensure_valid_card_id(ctx.require_card_id()?)
}

/// `I send a request to retrieve the card details`
///
/// # Errors
///
/// Fails without a card id or if the call could not be made.
pub async fn get_card(ctx: &mut ScenarioContext) -> Result<()> {
    let card_id = ctx.require_card_id()?.to_owned();
    let cards = ctx.cards()?.clone();
    ctx.response = Some(cards.get_card(&card_id).await?);
    Ok(())
}

/// `the response should contain the correct card information`
///
/// # Errors
///
/// Fails without a response or card id, or when the ids differ.
pub fn assert_card_information(ctx: &mut ScenarioContext) -> Result<()> {
    CardResource::assert_card_id(ctx.require_response()?, ctx.require_card_id()?)
}

/// `I send a request to update the card's name`
///
/// # Errors
///
/// Fails without a card or list id, or unless the service answers 200.
pub async fn update_card_name(ctx: &mut ScenarioContext) -> Result<()> {
    let card_id = ctx.require_card_id()?.to_owned();
    let list_id = ctx.require_list_id()?.to_owned();
    let cards = ctx.cards()?.clone();
    ctx.response = Some(
        cards
            .update_card(&card_id, UPDATED_CARD_NAME, &list_id, DEFAULT_DESCRIPTION)
            .await?,
    );
    Ok(())
}

/// `the response should reflect the updated card name`
///
/// # Errors
///
/// Fails without a response or when the name was not updated.
pub fn assert_updated_card_name(ctx: &mut ScenarioContext) -> Result<()> {
    CardResource::assert_card_name(ctx.require_response()?, UPDATED_CARD_NAME)
}

/// `I send a request to delete the card`
///
/// # Errors
///
/// Fails without a card id or unless the service answers 200.
pub async fn delete_card(ctx: &mut ScenarioContext) -> Result<()> {
    let card_id = ctx.require_card_id()?.to_owned();
    let cards = ctx.cards()?.clone();
    let response = cards.delete_card(&card_id).await?;
    ctx.release_card(&card_id);
    ctx.response = Some(response);
    Ok(())
}

/// `the card should no longer exist when I attempt to retrieve it`
///
/// Clears the card id once the card is confirmed gone.
///
/// # Errors
///
/// Fails without a card id or when the card is still reachable.
pub async fn assert_card_deleted(ctx: &mut ScenarioContext) -> Result<()> {
    let card_id = ctx.require_card_id()?.to_owned();
    let cards = ctx.cards()?.clone();
    cards.assert_card_deleted(&card_id).await?;
    ctx.release_card(&card_id);
    ctx.card_id = None;
    Ok(())
}

//! Given/when step definitions for board service scenarios.
#![expect(
    clippy::shadow_reuse,
    reason = "rstest-bdd step macros rebind placeholders during expansion"
)]
#![expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd step macros require owned capture values"
)]

use boardcheck::steps::{board, card, common};
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::state::ScenarioWorld;

#[given("I am authenticated with the Trello API")]
fn i_am_authenticated(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(board::authenticate)
}

#[given("I have a valid board ID")]
fn i_have_a_valid_board_id(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(board::require_board)
}

#[given("I am using an invalid Trello API key")]
fn i_am_using_an_invalid_key(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(board::use_invalid_api_key)
}

#[given("I have a valid board ID and list ID")]
fn i_have_a_valid_board_and_list(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(card::require_board_and_list(ctx)))
}

#[given("I have a valid card ID")]
fn i_have_a_valid_card_id(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(card::require_card)
}

#[when("I send a request to create a board")]
fn create_a_board(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(board::create_board(ctx)))
}

#[when("I send an unauthorized request to create a board")]
fn create_a_board_unauthorized(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(board::create_board_unauthorized(ctx)))
}

#[when("I send a request to update the board's name")]
fn update_the_board_name(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(board::update_board_name(ctx)))
}

#[when("I send a request to update the deleted board's name")]
fn update_the_deleted_board_name(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(board::update_deleted_board_name(ctx)))
}

#[when("I send a request to retrieve the board details")]
fn retrieve_the_board(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(board::get_board(ctx)))
}

#[when("I send a request to delete the board")]
fn delete_the_board(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(board::delete_board(ctx)))
}

#[when("I send a request to create a card")]
fn create_a_card(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(card::create_card(ctx)))
}

#[when("I send a request to retrieve the card details")]
fn retrieve_the_card(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(card::get_card(ctx)))
}

#[when("I send a request to update the card's name")]
fn update_the_card_name(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(card::update_card_name(ctx)))
}

#[when("I send a request to delete the card")]
fn delete_the_card(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(card::delete_card(ctx)))
}

#[when("I send a GET request to \"{url}\"")]
fn send_a_get_request(world: &mut ScenarioWorld, url: String) -> StepResult<()> {
    world.step(move |ctx| Box::pin(async move { common::send_get(ctx, &url).await }))
}

#[when("I send a POST request to \"{url}\" with body:")]
fn send_a_post_request(
    world: &mut ScenarioWorld,
    url: String,
    #[datatable] datatable: Vec<Vec<String>>,
) -> StepResult<()> {
    world.step(move |ctx| Box::pin(async move { common::send_post(ctx, &url, &datatable).await }))
}

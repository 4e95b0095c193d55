//! Then-step assertions for board service scenarios.
#![expect(
    clippy::shadow_reuse,
    reason = "rstest-bdd step macros rebind placeholders during expansion"
)]
#![expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd step macros require owned capture values"
)]

use boardcheck::steps::{board, card, common};
use rstest_bdd_macros::then;

use super::StepResult;
use super::state::ScenarioWorld;

#[then("the API should return a success status")]
fn the_api_returns_success(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(common::assert_success)
}

#[then("the response status should be {status}")]
fn the_status_is(world: &mut ScenarioWorld, status: u16) -> StepResult<()> {
    world.check(|ctx| common::assert_status(ctx, status))
}

#[then("the response status should indicate an unauthorized request")]
fn the_status_is_unauthorized(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(common::assert_unauthorized)
}

#[then("the response body should contain \"{text}\"")]
fn the_body_contains(world: &mut ScenarioWorld, text: String) -> StepResult<()> {
    world.check(|ctx| common::assert_body_contains(ctx, &text))
}

#[then("the response should have a property \"{property}\" with value \"{value}\"")]
fn the_property_has_value(
    world: &mut ScenarioWorld,
    property: String,
    value: String,
) -> StepResult<()> {
    world.check(|ctx| common::assert_property(ctx, &property, &value))
}

#[then("the response should have a property \"{property}\" with value {value:i64}")]
fn the_property_has_integer_value(
    world: &mut ScenarioWorld,
    property: String,
    value: i64,
) -> StepResult<()> {
    world.check(|ctx| common::assert_integer_property(ctx, &property, value))
}

#[then("the response should contain a valid board ID")]
fn the_response_has_a_board_id(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(board::store_board_id)
}

#[then("the response should contain the correct board information")]
fn the_board_information_is_correct(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(board::assert_board_information)
}

#[then("the response should reflect the updated board name")]
fn the_board_name_is_updated(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(board::assert_updated_board_name)
}

#[then("the board should no longer exist when I attempt to retrieve it")]
fn the_board_is_gone(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(board::assert_board_deleted(ctx)))
}

#[then("the response should contain a valid card ID")]
fn the_response_has_a_card_id(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(card::store_card_id)
}

#[then("the response should contain the correct card information")]
fn the_card_information_is_correct(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(card::assert_card_information)
}

#[then("the response should reflect the updated card name")]
fn the_card_name_is_updated(world: &mut ScenarioWorld) -> StepResult<()> {
    world.check(card::assert_updated_card_name)
}

#[then("the card should no longer exist when I attempt to retrieve it")]
fn the_card_is_gone(world: &mut ScenarioWorld) -> StepResult<()> {
    world.step(|ctx| Box::pin(card::assert_card_deleted(ctx)))
}

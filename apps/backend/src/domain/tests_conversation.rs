use crate::domain::conversation::{
    advance, ConversationEffect, ConversationInput, ConversationRules, ConversationState, Prompt,
};
use crate::domain::money::Money;
use crate::domain::state::WinCondition;

fn m(s: &str) -> Money {
    s.parse().unwrap()
}

fn rules(options: &[Money]) -> ConversationRules<'_> {
    ConversationRules {
        stake_options: options,
        min_deposit: m("10"),
    }
}

fn text(s: &str) -> ConversationInput {
    ConversationInput::Text { text: s.into() }
}

#[test]
fn new_game_flow_collects_stake_then_win_condition() {
    let options = [m("20"), m("50"), m("100")];
    let rules = rules(&options);

    let (state, effect) = advance(&ConversationState::Idle, ConversationInput::NewGame, &rules);
    assert_eq!(state, ConversationState::ChoosingStake);
    assert_eq!(
        effect,
        ConversationEffect::Prompt(Prompt::ChooseStake {
            options: options.to_vec()
        })
    );

    let (state, _) = advance(
        &state,
        ConversationInput::ChooseStake { amount: m("50") },
        &rules,
    );
    assert_eq!(state, ConversationState::ChoosingWinCondition { stake: m("50") });

    let (state, effect) = advance(
        &state,
        ConversationInput::ChooseWinCondition { tokens: 2 },
        &rules,
    );
    assert_eq!(state, ConversationState::Idle);
    assert_eq!(
        effect,
        ConversationEffect::CreateGame {
            stake: m("50"),
            win_condition: WinCondition::Two
        }
    );
}

#[test]
fn unknown_stake_is_rejected_in_place() {
    let options = [m("20")];
    let rules = rules(&options);
    let (state, effect) = advance(
        &ConversationState::ChoosingStake,
        ConversationInput::ChooseStake { amount: m("25") },
        &rules,
    );
    assert_eq!(state, ConversationState::ChoosingStake);
    assert!(matches!(effect, ConversationEffect::Reject { .. }));

    let (state, effect) = advance(
        &ConversationState::ChoosingWinCondition { stake: m("20") },
        ConversationInput::ChooseWinCondition { tokens: 3 },
        &rules,
    );
    assert_eq!(state, ConversationState::ChoosingWinCondition { stake: m("20") });
    assert!(matches!(effect, ConversationEffect::Reject { .. }));
}

#[test]
fn deposit_amount_respects_minimum() {
    let options = [m("20")];
    let rules = rules(&options);
    let waiting = ConversationState::AwaitingDepositAmount;

    let (state, effect) = advance(&waiting, text("5"), &rules);
    assert_eq!(state, waiting);
    assert!(matches!(effect, ConversationEffect::Reject { .. }));

    let (state, effect) = advance(&waiting, text("not money"), &rules);
    assert_eq!(state, waiting);
    assert!(matches!(effect, ConversationEffect::Reject { .. }));

    let (state, effect) = advance(&waiting, text("25.50"), &rules);
    assert_eq!(state, ConversationState::Idle);
    assert_eq!(
        effect,
        ConversationEffect::InitiateDeposit { amount: m("25.50") }
    );
}

#[test]
fn withdrawal_asks_amount_then_details() {
    let options = [m("20")];
    let rules = rules(&options);

    let (state, _) = advance(&ConversationState::Idle, ConversationInput::Withdraw, &rules);
    assert_eq!(state, ConversationState::AwaitingWithdrawalAmount);

    let (state, effect) = advance(&state, text("30"), &rules);
    assert_eq!(
        state,
        ConversationState::AwaitingWithdrawalDetails { amount: m("30") }
    );
    assert_eq!(
        effect,
        ConversationEffect::Prompt(Prompt::EnterWithdrawalDetails { amount: m("30") })
    );

    let (blank_state, effect) = advance(&state, text("   "), &rules);
    assert_eq!(blank_state, state);
    assert!(matches!(effect, ConversationEffect::Reject { .. }));

    let (state, effect) = advance(&state, text(" CBE 1000123456789 "), &rules);
    assert_eq!(state, ConversationState::Idle);
    assert_eq!(
        effect,
        ConversationEffect::RequestWithdrawal {
            amount: m("30"),
            account_details: "CBE 1000123456789".into()
        }
    );
}

#[test]
fn cancel_and_stray_input() {
    let options = [m("20")];
    let rules = rules(&options);

    let (state, effect) = advance(
        &ConversationState::AwaitingWithdrawalDetails { amount: m("30") },
        ConversationInput::Cancel,
        &rules,
    );
    assert_eq!(state, ConversationState::Idle);
    assert_eq!(effect, ConversationEffect::Cancelled);

    let (state, effect) = advance(&ConversationState::Idle, text("hello"), &rules);
    assert_eq!(state, ConversationState::Idle);
    assert_eq!(effect, ConversationEffect::Ignored);
}

#[test]
fn state_round_trips_through_json() {
    let state = ConversationState::AwaitingWithdrawalDetails { amount: m("12.5") };
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["step"], "awaiting_withdrawal_details");
    assert_eq!(json["amount"], "12.50");
}

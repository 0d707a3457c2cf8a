//! Per-user conversation steps for chat-driven flows.
//!
//! A chat transport delivers one input at a time; what the input means depends
//! on the step the user is in (a bare number is a deposit amount only after the
//! user asked to deposit). The step is an explicit value: `advance` takes the
//! current step and returns the next one plus the effect to execute. Nothing
//! here touches shared state.

use serde::{Deserialize, Serialize};

use super::money::Money;
use super::state::WinCondition;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    ChoosingStake,
    ChoosingWinCondition {
        stake: Money,
    },
    AwaitingDepositAmount,
    AwaitingWithdrawalAmount,
    AwaitingWithdrawalDetails {
        amount: Money,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationInput {
    NewGame,
    ChooseStake { amount: Money },
    ChooseWinCondition { tokens: u8 },
    Deposit,
    Withdraw,
    Text { text: String },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "prompt", rename_all = "snake_case")]
pub enum Prompt {
    ChooseStake { options: Vec<Money> },
    ChooseWinCondition { options: Vec<u8> },
    EnterDepositAmount { minimum: Money },
    EnterWithdrawalAmount,
    EnterWithdrawalDetails { amount: Money },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEffect {
    Prompt(Prompt),
    CreateGame {
        stake: Money,
        win_condition: WinCondition,
    },
    InitiateDeposit {
        amount: Money,
    },
    RequestWithdrawal {
        amount: Money,
        account_details: String,
    },
    Reject {
        reason: String,
    },
    Cancelled,
    /// Input has no meaning in the current step.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
pub struct ConversationRules<'a> {
    pub stake_options: &'a [Money],
    pub min_deposit: Money,
}

const WIN_CONDITION_OPTIONS: [u8; 3] = [1, 2, 4];

pub fn advance(
    state: &ConversationState,
    input: ConversationInput,
    rules: &ConversationRules<'_>,
) -> (ConversationState, ConversationEffect) {
    use ConversationEffect as Effect;
    use ConversationInput as Input;
    use ConversationState as State;

    match (state, input) {
        (_, Input::Cancel) => (State::Idle, Effect::Cancelled),
        (_, Input::NewGame) => (
            State::ChoosingStake,
            Effect::Prompt(Prompt::ChooseStake {
                options: rules.stake_options.to_vec(),
            }),
        ),
        (_, Input::Deposit) => (
            State::AwaitingDepositAmount,
            Effect::Prompt(Prompt::EnterDepositAmount {
                minimum: rules.min_deposit,
            }),
        ),
        (_, Input::Withdraw) => (
            State::AwaitingWithdrawalAmount,
            Effect::Prompt(Prompt::EnterWithdrawalAmount),
        ),

        (State::ChoosingStake, Input::ChooseStake { amount }) => {
            if rules.stake_options.contains(&amount) {
                (
                    State::ChoosingWinCondition { stake: amount },
                    Effect::Prompt(Prompt::ChooseWinCondition {
                        options: WIN_CONDITION_OPTIONS.to_vec(),
                    }),
                )
            } else {
                reject(state, format!("{amount} is not an offered stake"))
            }
        }
        (State::ChoosingWinCondition { stake }, Input::ChooseWinCondition { tokens }) => {
            match WinCondition::try_from(tokens) {
                Ok(win_condition) => (
                    State::Idle,
                    Effect::CreateGame {
                        stake: *stake,
                        win_condition,
                    },
                ),
                Err(_) => reject(state, format!("{tokens} is not a valid win condition")),
            }
        }
        (State::AwaitingDepositAmount, Input::Text { text }) => match parse_amount(&text) {
            Some(amount) if amount < rules.min_deposit => reject(
                state,
                format!("minimum deposit is {}", rules.min_deposit),
            ),
            Some(amount) => (State::Idle, Effect::InitiateDeposit { amount }),
            None => reject(state, "enter a positive amount, e.g. 50 or 50.25"),
        },
        (State::AwaitingWithdrawalAmount, Input::Text { text }) => match parse_amount(&text) {
            Some(amount) => (
                State::AwaitingWithdrawalDetails { amount },
                Effect::Prompt(Prompt::EnterWithdrawalDetails { amount }),
            ),
            None => reject(state, "enter a positive amount, e.g. 50 or 50.25"),
        },
        (State::AwaitingWithdrawalDetails { amount }, Input::Text { text }) => {
            let details = text.trim();
            if details.is_empty() {
                reject(state, "account details cannot be empty")
            } else {
                (
                    State::Idle,
                    Effect::RequestWithdrawal {
                        amount: *amount,
                        account_details: details.to_string(),
                    },
                )
            }
        }

        (current, _) => (current.clone(), Effect::Ignored),
    }
}

fn reject(
    state: &ConversationState,
    reason: impl Into<String>,
) -> (ConversationState, ConversationEffect) {
    (
        state.clone(),
        ConversationEffect::Reject {
            reason: reason.into(),
        },
    )
}

fn parse_amount(text: &str) -> Option<Money> {
    text.parse::<Money>().ok().filter(|m| m.is_positive())
}

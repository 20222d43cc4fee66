//! Conversions between engine values and wire types.

use std::collections::BTreeMap;

use api_types::{
    expense::{DetailedExpenseView, ExpenseStatus as ApiStatus, ExpenseView, HistoryView},
    group::{GroupBalanceView, GroupView},
    split::{Payer as ApiPayer, Split as ApiSplit},
    user::UserView,
};
use engine::EngineError;

use crate::ServerError;

pub(crate) fn user_view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        is_verified: user.is_verified,
    }
}

pub(crate) fn users_view(users: Vec<engine::User>) -> Vec<UserView> {
    users.into_iter().map(user_view).collect()
}

pub(crate) fn group_view(group: engine::Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        description: group.description,
        admin_id: group.admin_id,
        created_at: group.created_at,
    }
}

pub(crate) fn group_balance_view(balance: engine::GroupBalance) -> GroupBalanceView {
    GroupBalanceView {
        group: group_view(balance.group),
        total_owed: balance.total_owed,
        total_borrowed: balance.total_borrowed,
        history: history_view(balance.history),
    }
}

fn map_status(status: engine::ExpenseStatus) -> ApiStatus {
    match status {
        engine::ExpenseStatus::Draft => ApiStatus::Draft,
        engine::ExpenseStatus::Settled => ApiStatus::Settled,
        engine::ExpenseStatus::Reopened => ApiStatus::Reopened,
    }
}

fn split_view(split: engine::Split) -> ApiSplit {
    match split {
        engine::Split::Equal {
            participants,
            total_amount,
        } => ApiSplit::Equal {
            equal_split: participants,
            total_amount,
        },
        engine::Split::Unit { amounts } => ApiSplit::Unit {
            unit_split: amounts,
        },
        engine::Split::Percentage {
            percentages,
            total_amount,
        } => ApiSplit::Percentage {
            percentage_split: percentages,
            total_amount,
        },
        engine::Split::Share {
            units,
            total_amount,
        } => ApiSplit::Share {
            share_split: units,
            total_amount,
        },
    }
}

fn payer_view(payer: engine::Payer) -> ApiPayer {
    match payer {
        engine::Payer::Single { payer, amount } => ApiPayer::Single {
            payer_split: BTreeMap::from([(payer, amount)]),
        },
        engine::Payer::Multi { payers } => ApiPayer::Multi {
            payer_split: payers,
        },
    }
}

pub(crate) fn to_split(split: ApiSplit) -> engine::Split {
    match split {
        ApiSplit::Equal {
            equal_split,
            total_amount,
        } => engine::Split::Equal {
            participants: equal_split,
            total_amount,
        },
        ApiSplit::Unit { unit_split } => engine::Split::Unit {
            amounts: unit_split,
        },
        ApiSplit::Percentage {
            percentage_split,
            total_amount,
        } => engine::Split::Percentage {
            percentages: percentage_split,
            total_amount,
        },
        ApiSplit::Share {
            share_split,
            total_amount,
        } => engine::Split::Share {
            units: share_split,
            total_amount,
        },
    }
}

pub(crate) fn to_payer(payer: ApiPayer) -> Result<engine::Payer, ServerError> {
    match payer {
        ApiPayer::Single { payer_split } => {
            let mut entries = payer_split.into_iter();
            match (entries.next(), entries.next()) {
                (Some((payer, amount)), None) => Ok(engine::Payer::Single { payer, amount }),
                _ => Err(ServerError::Engine(EngineError::Validation(
                    "single payer requires exactly one entry".to_string(),
                ))),
            }
        }
        ApiPayer::Multi { payer_split } => Ok(engine::Payer::Multi {
            payers: payer_split,
        }),
    }
}

pub(crate) fn expense_view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        description: expense.description,
        amount: expense.amount,
        created_at: expense.created_at,
        created_by: expense.created_by,
        split: split_view(expense.split),
        payer: payer_view(expense.payer),
        status: map_status(expense.status),
        settled_by: expense.settled_by,
        group_id: expense.group_id,
    }
}

pub(crate) fn detailed_view(detailed: engine::DetailedExpense) -> DetailedExpenseView {
    DetailedExpenseView {
        expense: expense_view(detailed.expense),
        total_owed: detailed.total_owed,
        total_borrowed: detailed.total_borrowed,
    }
}

pub(crate) fn history_view(history: engine::ExpenseHistory) -> HistoryView {
    HistoryView {
        expenses: history.expenses.into_iter().map(detailed_view).collect(),
        total_owed: history.total_owed,
        total_borrowed: history.total_borrowed,
        page_number: history.page_number,
        total_pages: history.total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_payer_needs_one_entry() {
        let payer = to_payer(ApiPayer::Single {
            payer_split: BTreeMap::from([("a".to_string(), 5.0)]),
        })
        .unwrap();
        assert_eq!(
            payer,
            engine::Payer::Single {
                payer: "a".to_string(),
                amount: 5.0
            }
        );

        let err = to_payer(ApiPayer::Single {
            payer_split: BTreeMap::from([("a".to_string(), 5.0), ("b".to_string(), 5.0)]),
        })
        .unwrap_err();
        assert!(matches!(err, ServerError::Engine(EngineError::Validation(_))));
    }

    #[test]
    fn split_maps_back_and_forth() {
        let split = engine::Split::Share {
            units: BTreeMap::from([("a".to_string(), 2), ("b".to_string(), 1)]),
            total_amount: 30.0,
        };
        assert_eq!(to_split(split_view(split.clone())), split);
    }
}

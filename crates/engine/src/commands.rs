//! Command structs for expense write operations.
//!
//! These types group the parameters of create/update, keeping call sites
//! readable and avoiding long argument lists.

use uuid::Uuid;

use crate::{Payer, Split};

/// Create a draft expense.
#[derive(Clone, Debug)]
pub struct NewExpenseCmd {
    pub user_id: String,
    pub description: String,
    pub amount: f64,
    pub split: Split,
    pub payer: Payer,
    pub group_id: Option<Uuid>,
}

impl NewExpenseCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, amount: f64, split: Split, payer: Payer) -> Self {
        Self {
            user_id: user_id.into(),
            description: String::new(),
            amount,
            split,
            payer,
            group_id: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn group_id(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }
}

/// Replace the editable terms of a draft expense.
///
/// `group_id` must repeat the expense's current group: moving an expense to
/// another group (or in or out of one) is rejected.
#[derive(Clone, Debug)]
pub struct UpdateExpenseCmd {
    pub expense_id: Uuid,
    pub user_id: String,
    pub description: String,
    pub amount: f64,
    pub split: Split,
    pub payer: Payer,
    pub group_id: Option<Uuid>,
}

impl UpdateExpenseCmd {
    #[must_use]
    pub fn new(
        expense_id: Uuid,
        user_id: impl Into<String>,
        amount: f64,
        split: Split,
        payer: Payer,
    ) -> Self {
        Self {
            expense_id,
            user_id: user_id.into(),
            description: String::new(),
            amount,
            split,
            payer,
            group_id: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn group_id(mut self, group_id: Option<Uuid>) -> Self {
        self.group_id = group_id;
        self
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of every paged listing. Pages start at 1; `0` or a missing
/// value read as the first page.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignupRequest {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub name: String,
        pub email: String,
        pub is_verified: bool,
    }
}

pub mod friend {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendAdd {
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendsResponse {
        pub friends: Vec<user::UserView>,
    }
}

pub mod split {
    use super::*;

    /// How an expense amount is divided among participants.
    ///
    /// Tagged by `type`; the payload field depends on the kind:
    /// `{"type":"equal","equalSplit":["a","b"],"totalAmount":100.0}`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "camelCase")]
    pub enum Split {
        #[serde(rename_all = "camelCase")]
        Equal {
            equal_split: Vec<String>,
            total_amount: f64,
        },
        #[serde(rename_all = "camelCase")]
        Unit { unit_split: BTreeMap<String, f64> },
        /// Percentages of `total_amount`, expected to sum to 100.
        #[serde(rename_all = "camelCase")]
        Percentage {
            percentage_split: BTreeMap<String, f64>,
            total_amount: f64,
        },
        /// Integer share units; each participant gets `units / total units`.
        #[serde(rename_all = "camelCase")]
        Share {
            share_split: BTreeMap<String, u32>,
            total_amount: f64,
        },
    }

    /// Who paid for an expense. A `single` payer carries exactly one entry.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "camelCase")]
    pub enum Payer {
        #[serde(rename_all = "camelCase")]
        Single { payer_split: BTreeMap<String, f64> },
        #[serde(rename_all = "camelCase")]
        Multi { payer_split: BTreeMap<String, f64> },
    }
}

pub mod expense {
    use super::*;
    use split::{Payer, Split};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum ExpenseStatus {
        Draft,
        Settled,
        Reopened,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        #[serde(default)]
        pub description: String,
        pub amount: f64,
        pub split: Split,
        pub payer: Payer,
        pub group_id: Option<Uuid>,
    }

    /// Full replacement of the editable terms. `group_id` must match the
    /// stored one.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        #[serde(default)]
        pub description: String,
        pub amount: f64,
        pub split: Split,
        pub payer: Payer,
        pub group_id: Option<Uuid>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub amount: f64,
        pub created_at: DateTime<Utc>,
        pub created_by: String,
        pub split: Split,
        pub payer: Payer,
        pub status: ExpenseStatus,
        pub settled_by: Option<String>,
        pub group_id: Option<Uuid>,
    }

    /// An expense with what the caller is owed or has borrowed on it.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct DetailedExpenseView {
        pub expense: ExpenseView,
        pub total_owed: f64,
        pub total_borrowed: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryView {
        pub expenses: Vec<DetailedExpenseView>,
        /// Net totals over every page, not only this one.
        pub total_owed: f64,
        pub total_borrowed: f64,
        pub page_number: u64,
        pub total_pages: u64,
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub member_id: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub admin_id: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupDetailView {
        pub group: GroupView,
        pub members: Vec<user::UserView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupLedgerView {
        pub group: GroupView,
        pub members: Vec<user::UserView>,
        pub history: expense::HistoryView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupBalanceView {
        pub group: GroupView,
        pub total_owed: f64,
        pub total_borrowed: f64,
        pub history: expense::HistoryView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserHomeView {
        pub user: user::UserView,
        pub groups: Vec<GroupBalanceView>,
        pub total_owed: f64,
        pub total_borrowed: f64,
    }
}

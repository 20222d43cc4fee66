//! Shared expense ledger engine.
//!
//! Users record expenses, split among friends or inside groups, and the
//! engine tells every user how much they are owed and how much they owe.
//! All writes go through [`Engine`], which validates each expense, keeps the
//! expense membership index in sync and persists through sea-orm inside one
//! database transaction per operation.

pub use commands::{NewExpenseCmd, UpdateExpenseCmd};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseStatus};
pub use groups::{Group, GroupDetail};
pub use ledger::{
    Balance, DetailedExpense, ExpenseHistory, GroupBalance, GroupLedger, Ledger, UserHome,
};
pub use membership::MembershipDelta;
pub use ops::{Engine, EngineBuilder};
pub use payer::{Payer, PayerKind};
pub use split::{Split, SplitKind};
pub use storage::{GROUP_PAGE_SIZE, HISTORY_PAGE_SIZE};
pub use users::User;

pub mod amount;
mod commands;
mod error;
mod expense_members;
mod expenses;
mod friendships;
mod group_members;
mod groups;
mod ledger;
mod membership;
mod ops;
mod payer;
mod split;
mod storage;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

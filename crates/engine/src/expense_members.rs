//! Membership index: one row per (expense, participant).
//!
//! Rows are written only by the expense operations, through the
//! [`MembershipDelta`](crate::MembershipDelta) computed on every change.
//! `group_id` is copied from the expense so group views can filter on it.

use sea_orm::{ActiveValue, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expense_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub group_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expense,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn entry(expense_id: &str, user_id: &str, group_id: Option<&str>) -> Self {
        Self {
            expense_id: ActiveValue::Set(expense_id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            group_id: ActiveValue::Set(group_id.map(ToString::to_string)),
        }
    }
}

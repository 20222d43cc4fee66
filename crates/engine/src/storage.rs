//! Storage collaborator.
//!
//! [`Storage`] is the only place that talks to the database. It borrows any
//! sea-orm connection, so operations run it over a [`DatabaseTransaction`]
//! and commit once at the end.
//!
//! [`DatabaseTransaction`]: sea_orm::DatabaseTransaction

use std::collections::BTreeSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait,
};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseStatus, Group, ResultEngine, User, expense_members, expenses,
    friendships, group_members, groups, users,
};

/// Page size of group expense listings.
pub const GROUP_PAGE_SIZE: u64 = 20;
/// Page size of a user's expense history.
pub const HISTORY_PAGE_SIZE: u64 = 100;

/// One page of expenses, newest first. Pages are numbered from 1.
#[derive(Clone, Debug, Default)]
pub(crate) struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub page_number: u64,
    pub total_pages: u64,
}

pub(crate) struct Storage<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> Storage<'a, C> {
    pub(crate) fn new(db: &'a C) -> Self {
        Self { db }
    }

    // ── users ──────────────────────────────────────────────────────────────

    pub(crate) async fn fetch_user_by_id(&self, user_id: &str) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(crate) async fn find_user_by_email(
        &self,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email.to_string()))
            .one(self.db)
            .await?)
    }

    pub(crate) async fn fetch_user_by_email(&self, email: &str) -> ResultEngine<users::Model> {
        self.find_user_by_email(email)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(crate) async fn create_user(
        &self,
        user: users::ActiveModel,
    ) -> ResultEngine<users::Model> {
        Ok(user.insert(self.db).await?)
    }

    async fn fetch_users(&self, ids: Vec<String>) -> ResultEngine<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .order_by_asc(users::Column::Name)
            .all(self.db)
            .await?
            .into_iter()
            .map(User::from)
            .collect())
    }

    // ── friends ────────────────────────────────────────────────────────────

    pub(crate) async fn fetch_friend_ids(&self, user_id: &str) -> ResultEngine<BTreeSet<String>> {
        Ok(friendships::Entity::find()
            .filter(friendships::Column::UserId.eq(user_id.to_string()))
            .all(self.db)
            .await?
            .into_iter()
            .map(|link| link.friend_id)
            .collect())
    }

    pub(crate) async fn fetch_friends(&self, user_id: &str) -> ResultEngine<Vec<User>> {
        let ids = self.fetch_friend_ids(user_id).await?;
        self.fetch_users(ids.into_iter().collect()).await
    }

    pub(crate) async fn are_friends(&self, user_id: &str, friend_id: &str) -> ResultEngine<bool> {
        Ok(
            friendships::Entity::find_by_id((user_id.to_string(), friend_id.to_string()))
                .one(self.db)
                .await?
                .is_some(),
        )
    }

    /// Store the friendship in both directions.
    pub(crate) async fn add_friendship(&self, user_id: &str, friend_id: &str) -> ResultEngine<()> {
        for (from, to) in [(user_id, friend_id), (friend_id, user_id)] {
            friendships::ActiveModel {
                user_id: sea_orm::ActiveValue::Set(from.to_string()),
                friend_id: sea_orm::ActiveValue::Set(to.to_string()),
            }
            .insert(self.db)
            .await?;
        }
        Ok(())
    }

    // ── groups ─────────────────────────────────────────────────────────────

    pub(crate) async fn fetch_group_by_id(&self, group_id: Uuid) -> ResultEngine<Group> {
        groups::Entity::find_by_id(group_id.to_string())
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))
            .and_then(Group::try_from)
    }

    pub(crate) async fn fetch_groups_by_user(&self, user_id: &str) -> ResultEngine<Vec<Group>> {
        let ids: Vec<String> = group_members::Entity::find()
            .filter(group_members::Column::UserId.eq(user_id.to_string()))
            .all(self.db)
            .await?
            .into_iter()
            .map(|member| member.group_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        groups::Entity::find()
            .filter(groups::Column::Id.is_in(ids))
            .order_by_asc(groups::Column::CreatedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(Group::try_from)
            .collect()
    }

    pub(crate) async fn create_group(&self, group: &Group) -> ResultEngine<()> {
        groups::ActiveModel::from(group).insert(self.db).await?;
        Ok(())
    }

    /// Remove the group with its members, expenses and index rows.
    pub(crate) async fn delete_group(&self, group_id: Uuid) -> ResultEngine<()> {
        let id = group_id.to_string();
        expense_members::Entity::delete_many()
            .filter(expense_members::Column::GroupId.eq(id.clone()))
            .exec(self.db)
            .await?;
        expenses::Entity::delete_many()
            .filter(expenses::Column::GroupId.eq(id.clone()))
            .exec(self.db)
            .await?;
        group_members::Entity::delete_many()
            .filter(group_members::Column::GroupId.eq(id.clone()))
            .exec(self.db)
            .await?;
        groups::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(())
    }

    pub(crate) async fn fetch_group_members(&self, group_id: Uuid) -> ResultEngine<Vec<User>> {
        let ids = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id.to_string()))
            .all(self.db)
            .await?
            .into_iter()
            .map(|member| member.user_id)
            .collect();
        self.fetch_users(ids).await
    }

    pub(crate) async fn is_group_member(&self, group_id: Uuid, user_id: &str) -> ResultEngine<bool> {
        Ok(
            group_members::Entity::find_by_id((group_id.to_string(), user_id.to_string()))
                .one(self.db)
                .await?
                .is_some(),
        )
    }

    pub(crate) async fn add_user_to_group(&self, group_id: Uuid, user_id: &str) -> ResultEngine<()> {
        group_members::ActiveModel {
            group_id: sea_orm::ActiveValue::Set(group_id.to_string()),
            user_id: sea_orm::ActiveValue::Set(user_id.to_string()),
        }
        .insert(self.db)
        .await?;
        Ok(())
    }

    pub(crate) async fn remove_user_from_group(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        group_members::Entity::delete_by_id((group_id.to_string(), user_id.to_string()))
            .exec(self.db)
            .await?;
        Ok(())
    }

    // ── expenses ───────────────────────────────────────────────────────────

    pub(crate) async fn create_or_update_expense(&self, expense: &Expense) -> ResultEngine<()> {
        let active = expenses::ActiveModel::try_from(expense)?;
        match expenses::Entity::find_by_id(expense.id.to_string())
            .one(self.db)
            .await?
        {
            Some(_) => {
                active.update(self.db).await?;
            }
            None => {
                active.insert(self.db).await?;
            }
        }
        Ok(())
    }

    pub(crate) async fn fetch_expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        expenses::Entity::find_by_id(expense_id.to_string())
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
            .and_then(Expense::try_from)
    }

    pub(crate) async fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        expenses::Entity::delete_by_id(expense_id.to_string())
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Index `user_ids` on the expense. Ids already indexed are skipped.
    pub(crate) async fn attach_participants<'u>(
        &self,
        expense_id: Uuid,
        group_id: Option<Uuid>,
        user_ids: impl IntoIterator<Item = &'u String>,
    ) -> ResultEngine<()> {
        let expense_id = expense_id.to_string();
        let group_id = group_id.map(|id| id.to_string());
        for user_id in user_ids {
            let existing =
                expense_members::Entity::find_by_id((expense_id.clone(), user_id.clone()))
                    .one(self.db)
                    .await?;
            if existing.is_none() {
                expense_members::ActiveModel::entry(&expense_id, user_id, group_id.as_deref())
                    .insert(self.db)
                    .await?;
            }
        }
        Ok(())
    }

    pub(crate) async fn detach_participants<'u>(
        &self,
        expense_id: Uuid,
        user_ids: impl IntoIterator<Item = &'u String>,
    ) -> ResultEngine<()> {
        let ids: Vec<String> = user_ids.into_iter().cloned().collect();
        if ids.is_empty() {
            return Ok(());
        }
        expense_members::Entity::delete_many()
            .filter(expense_members::Column::ExpenseId.eq(expense_id.to_string()))
            .filter(expense_members::Column::UserId.is_in(ids))
            .exec(self.db)
            .await?;
        Ok(())
    }

    pub(crate) async fn fetch_participant_ids(
        &self,
        expense_id: Uuid,
    ) -> ResultEngine<BTreeSet<String>> {
        Ok(expense_members::Entity::find()
            .filter(expense_members::Column::ExpenseId.eq(expense_id.to_string()))
            .all(self.db)
            .await?
            .into_iter()
            .map(|member| member.user_id)
            .collect())
    }

    /// Every expense of a group, any status.
    pub(crate) async fn fetch_expenses_by_group(
        &self,
        group_id: Uuid,
        page: u64,
    ) -> ResultEngine<ExpensePage> {
        let condition =
            Condition::all().add(expenses::Column::GroupId.eq(group_id.to_string()));
        self.fetch_expense_page(condition, page, GROUP_PAGE_SIZE)
            .await
    }

    /// Expenses with `status` the user created or is indexed on.
    pub(crate) async fn fetch_expenses_by_user_and_status(
        &self,
        user_id: &str,
        status: ExpenseStatus,
        page: u64,
        page_size: u64,
    ) -> ResultEngine<ExpensePage> {
        let indexed = expense_members::Entity::find()
            .select_only()
            .column(expense_members::Column::ExpenseId)
            .filter(expense_members::Column::UserId.eq(user_id.to_string()))
            .into_query();

        let involved = Condition::any()
            .add(expenses::Column::CreatedBy.eq(user_id.to_string()))
            .add(expenses::Column::Id.in_subquery(indexed));
        let condition = Condition::all()
            .add(expenses::Column::Status.eq(status.as_str()))
            .add(involved);

        self.fetch_expense_page(condition, page, page_size).await
    }

    async fn fetch_expense_page(
        &self,
        condition: Condition,
        page: u64,
        page_size: u64,
    ) -> ResultEngine<ExpensePage> {
        let page_number = page.max(1);
        let paginator = expenses::Entity::find()
            .filter(condition)
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .paginate(self.db, page_size.max(1));

        let total_pages = paginator.num_pages().await?;
        let expenses = paginator
            .fetch_page(page_number - 1)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(ExpensePage {
            expenses,
            page_number,
            total_pages,
        })
    }
}

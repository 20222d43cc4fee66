use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    DetailedExpense, EngineError, Expense, MembershipDelta, NewExpenseCmd, ResultEngine,
    UpdateExpenseCmd, storage::Storage,
};

use super::{Engine, access, with_tx};

impl Engine {
    /// Record a new draft expense.
    ///
    /// The creator and the group (when given) must exist, at least one
    /// participant must be the creator or one of their friends, and both the
    /// split and the payer must cover the amount. Every participant and the
    /// creator are indexed on the expense.
    pub async fn create_expense(&self, cmd: NewExpenseCmd) -> ResultEngine<Expense> {
        let NewExpenseCmd {
            user_id,
            description,
            amount,
            split,
            payer,
            group_id,
        } = cmd;
        let expense = Expense::new(&user_id, description, amount, split, payer, group_id)?;

        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            storage.fetch_user_by_id(&user_id).await?;
            if let Some(group_id) = expense.group_id {
                storage.fetch_group_by_id(group_id).await?;
            }

            let mut members = expense.participants();
            access::require_friend_network(
                &storage,
                &user_id,
                &members,
                "all expense members should be friends of expense creator",
            )
            .await?;

            storage.create_or_update_expense(&expense).await?;
            members.insert(user_id.clone());
            storage
                .attach_participants(expense.id, expense.group_id, &members)
                .await?;

            tracing::info!(expense_id = %expense.id, user_id = %user_id, "expense created");
            Ok(expense)
        })
    }

    /// Replace description, amount, split and payer of a draft expense.
    ///
    /// Participants that left the split and payer are detached from the
    /// index and new ones attached; the creator always stays indexed.
    pub async fn update_expense(&self, cmd: UpdateExpenseCmd) -> ResultEngine<Expense> {
        let UpdateExpenseCmd {
            expense_id,
            user_id,
            description,
            amount,
            split,
            payer,
            group_id,
        } = cmd;

        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            let mut expense = storage.fetch_expense(expense_id).await?;
            if !expense.is_draft() {
                return Err(EngineError::Validation(
                    "expense is not in draft state, cannot update".to_string(),
                ));
            }
            if expense.group_id != group_id {
                return Err(EngineError::Validation(
                    "expense group id cannot be changed".to_string(),
                ));
            }
            access::require_expense_member(&storage, &expense, &user_id, "update").await?;

            let existing = expense.participants();
            expense.revise(description, amount, split, payer)?;
            let updated = expense.participants();
            access::require_friend_network(
                &storage,
                &user_id,
                &updated,
                "users part of expense should be friends of current user",
            )
            .await?;

            let delta = MembershipDelta::between(&existing, &updated);
            tracing::debug!(
                expense_id = %expense.id,
                added = delta.to_add.len(),
                removed = delta.to_remove.len(),
                "reconciling expense members"
            );
            storage
                .attach_participants(expense.id, expense.group_id, &delta.to_add)
                .await?;
            storage
                .detach_participants(
                    expense.id,
                    delta
                        .to_remove
                        .iter()
                        .filter(|id| **id != expense.created_by),
                )
                .await?;

            storage.create_or_update_expense(&expense).await?;
            tracing::info!(expense_id = %expense.id, user_id = %user_id, "expense updated");
            Ok(expense)
        })
    }

    /// Delete an expense and its index rows.
    pub async fn delete_expense(&self, user_id: &str, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            let expense = storage.fetch_expense(expense_id).await?;
            if self.strict_authorization {
                access::require_expense_member(&storage, &expense, user_id, "delete").await?;
            }

            let indexed = storage.fetch_participant_ids(expense.id).await?;
            storage.detach_participants(expense.id, &indexed).await?;
            storage.delete_expense(expense.id).await?;

            tracing::info!(expense_id = %expense.id, user_id, "expense deleted");
            Ok(())
        })
    }

    /// Mark an expense as settled by `user_id`.
    pub async fn settle_expense(&self, user_id: &str, expense_id: Uuid) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            let mut expense = storage.fetch_expense(expense_id).await?;
            if self.strict_authorization {
                access::require_expense_member(&storage, &expense, user_id, "settle").await?;
            }

            expense.settle(user_id);
            storage.create_or_update_expense(&expense).await?;

            tracing::info!(expense_id = %expense.id, user_id, "expense settled");
            Ok(expense)
        })
    }

    /// One expense with the caller's owed/borrowed contribution.
    pub async fn expense(&self, user_id: &str, expense_id: Uuid) -> ResultEngine<DetailedExpense> {
        let storage = Storage::new(&self.database);
        let expense = storage.fetch_expense(expense_id).await?;
        if !access::is_expense_member(&storage, &expense, user_id).await? {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        DetailedExpense::new(expense, user_id)
    }
}

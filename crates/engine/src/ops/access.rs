use std::collections::BTreeSet;

use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{EngineError, Expense, Group, ResultEngine, storage::Storage};

/// The user's friends plus the user.
pub(super) async fn friend_network<C: ConnectionTrait>(
    storage: &Storage<'_, C>,
    user_id: &str,
) -> ResultEngine<BTreeSet<String>> {
    let mut network = storage.fetch_friend_ids(user_id).await?;
    network.insert(user_id.to_string());
    Ok(network)
}

/// At least one of `members` must sit in the user's friend network.
pub(super) async fn require_friend_network<C: ConnectionTrait>(
    storage: &Storage<'_, C>,
    user_id: &str,
    members: &BTreeSet<String>,
    message: &str,
) -> ResultEngine<()> {
    let network = friend_network(storage, user_id).await?;
    if members.is_disjoint(&network) {
        return Err(EngineError::Validation(message.to_string()));
    }
    Ok(())
}

/// Creator, group member or participant of the expense.
pub(super) async fn is_expense_member<C: ConnectionTrait>(
    storage: &Storage<'_, C>,
    expense: &Expense,
    user_id: &str,
) -> ResultEngine<bool> {
    if expense.created_by == user_id || expense.participants().contains(user_id) {
        return Ok(true);
    }
    match expense.group_id {
        Some(group_id) => storage.is_group_member(group_id, user_id).await,
        None => Ok(false),
    }
}

pub(super) async fn require_expense_member<C: ConnectionTrait>(
    storage: &Storage<'_, C>,
    expense: &Expense,
    user_id: &str,
    action: &str,
) -> ResultEngine<()> {
    if !is_expense_member(storage, expense, user_id).await? {
        return Err(EngineError::Validation(format!(
            "user is not authorised to {action} expense"
        )));
    }
    Ok(())
}

/// Fetch the group, hiding it from users outside it.
pub(super) async fn require_group_member<C: ConnectionTrait>(
    storage: &Storage<'_, C>,
    group_id: Uuid,
    user_id: &str,
) -> ResultEngine<Group> {
    let group = storage.fetch_group_by_id(group_id).await?;
    if !storage.is_group_member(group_id, user_id).await? {
        return Err(EngineError::KeyNotFound("group not exists".to_string()));
    }
    Ok(group)
}

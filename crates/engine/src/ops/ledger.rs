//! Read views built on the ledger aggregation.
//!
//! Totals only count `Draft` expenses: once settled, an expense no longer
//! moves anyone's balance. They are folded over *every* page of the scope,
//! while the listed expenses are the requested page only.

use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{
    Balance, DetailedExpense, ExpenseHistory, ExpenseStatus, GroupBalance, GroupLedger, Ledger,
    ResultEngine, User, UserHome,
    storage::{ExpensePage, HISTORY_PAGE_SIZE, Storage},
};

use super::{Engine, access};

#[derive(Clone, Copy, Debug)]
enum Scope {
    /// Every expense of a group.
    Group(Uuid),
    /// Draft expenses the user created or participates in.
    User,
}

async fn fetch_page<C: ConnectionTrait>(
    storage: &Storage<'_, C>,
    scope: Scope,
    user_id: &str,
    page: u64,
) -> ResultEngine<ExpensePage> {
    match scope {
        Scope::Group(group_id) => storage.fetch_expenses_by_group(group_id, page).await,
        Scope::User => {
            storage
                .fetch_expenses_by_user_and_status(
                    user_id,
                    ExpenseStatus::Draft,
                    page,
                    HISTORY_PAGE_SIZE,
                )
                .await
        }
    }
}

/// Walk the scope page by page until the last one and net the totals.
async fn running_balance<C: ConnectionTrait>(
    storage: &Storage<'_, C>,
    scope: Scope,
    user_id: &str,
) -> ResultEngine<Balance> {
    let mut ledger = Ledger::new(user_id);
    let mut page = 1;
    loop {
        let batch = fetch_page(storage, scope, user_id, page).await?;
        ledger.record_all(batch.expenses.iter().filter(|expense| expense.is_draft()))?;
        if page >= batch.total_pages {
            break;
        }
        page += 1;
    }
    tracing::debug!(?scope, user_id, pages = page, "ledger walk finished");
    Ok(ledger.balance())
}

fn history(batch: ExpensePage, balance: Balance, user_id: &str) -> ResultEngine<ExpenseHistory> {
    let expenses = batch
        .expenses
        .into_iter()
        .map(|expense| DetailedExpense::new(expense, user_id))
        .collect::<ResultEngine<Vec<_>>>()?;
    Ok(ExpenseHistory {
        expenses,
        total_owed: balance.total_owed,
        total_borrowed: balance.total_borrowed,
        page_number: batch.page_number,
        total_pages: batch.total_pages,
    })
}

impl Engine {
    /// Draft expenses the user is involved in, one page at a time. Page `0`
    /// is read as the first page.
    pub async fn fetch_expense_history(
        &self,
        user_id: &str,
        page: u64,
    ) -> ResultEngine<ExpenseHistory> {
        let storage = Storage::new(&self.database);
        storage.fetch_user_by_id(user_id).await?;

        let batch = fetch_page(&storage, Scope::User, user_id, page).await?;
        let balance = running_balance(&storage, Scope::User, user_id).await?;
        history(batch, balance, user_id)
    }

    /// A group's members, one page of its expenses and the user's totals in it.
    pub async fn fetch_group_ledger(
        &self,
        user_id: &str,
        group_id: Uuid,
        page: u64,
    ) -> ResultEngine<GroupLedger> {
        let storage = Storage::new(&self.database);
        let group = access::require_group_member(&storage, group_id, user_id).await?;
        let members = storage.fetch_group_members(group_id).await?;

        let scope = Scope::Group(group_id);
        let batch = fetch_page(&storage, scope, user_id, page).await?;
        let balance = running_balance(&storage, scope, user_id).await?;

        Ok(GroupLedger {
            group,
            members,
            history: history(batch, balance, user_id)?,
        })
    }

    /// Per-group totals with the first page of each group's expenses, plus
    /// the user's overall net position.
    pub async fn user_home(&self, user_id: &str) -> ResultEngine<UserHome> {
        let storage = Storage::new(&self.database);
        let user = User::from(storage.fetch_user_by_id(user_id).await?);

        let mut overall = Balance::default();
        let mut groups = Vec::new();
        for group in storage.fetch_groups_by_user(user_id).await? {
            let scope = Scope::Group(group.id);
            let batch = fetch_page(&storage, scope, user_id, 1).await?;
            let balance = running_balance(&storage, scope, user_id).await?;
            overall += balance;
            groups.push(GroupBalance {
                group,
                total_owed: balance.total_owed,
                total_borrowed: balance.total_borrowed,
                history: history(batch, balance, user_id)?,
            });
        }

        let overall = overall.net_off();
        Ok(UserHome {
            user,
            groups,
            total_owed: overall.total_owed,
            total_borrowed: overall.total_borrowed,
        })
    }
}

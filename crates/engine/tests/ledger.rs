mod common;

use engine::{ExpenseStatus, GROUP_PAGE_SIZE, HISTORY_PAGE_SIZE, NewExpenseCmd, Split, User};
use uuid::Uuid;

use common::{befriend, engine_with_db, equal, single, user};

async fn pair() -> (engine::Engine, User, User) {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    befriend(&engine, &alice, &bob).await;
    (engine, alice, bob)
}

async fn shared_group(engine: &engine::Engine, admin: &User, member: &User, name: &str) -> Uuid {
    let group = engine.create_group(&admin.id, name, "").await.unwrap();
    engine.join_group(&admin.id, group.id, &member.id).await.unwrap();
    group.id
}

#[tokio::test]
async fn history_lists_drafts_and_totals_them() {
    let (engine, alice, bob) = pair().await;

    // alice fronts 80 for both: bob borrows 40.
    engine
        .create_expense(NewExpenseCmd::new(
            &alice.id,
            80.0,
            equal(&[&alice, &bob], 80.0),
            single(&alice, 80.0),
        ))
        .await
        .unwrap();
    // bob fronts 30 for alice only: alice borrows 30.
    let settled = engine
        .create_expense(NewExpenseCmd::new(
            &bob.id,
            30.0,
            Split::Unit {
                amounts: [(alice.id.clone(), 30.0)].into(),
            },
            single(&bob, 30.0),
        ))
        .await
        .unwrap();

    let history = engine.fetch_expense_history(&alice.id, 0).await.unwrap();
    assert_eq!(history.page_number, 1);
    assert_eq!(history.total_pages, 1);
    assert_eq!(history.expenses.len(), 2);
    assert_eq!(history.total_owed, 10.0);
    assert_eq!(history.total_borrowed, 0.0);

    engine.settle_expense(&alice.id, settled.id).await.unwrap();
    let history = engine.fetch_expense_history(&alice.id, 1).await.unwrap();
    assert_eq!(history.expenses.len(), 1);
    assert_eq!(history.total_owed, 40.0);

    let history = engine.fetch_expense_history(&bob.id, 1).await.unwrap();
    assert_eq!(history.total_owed, 0.0);
    assert_eq!(history.total_borrowed, 40.0);
    assert_eq!(history.expenses[0].total_borrowed, 40.0);
}

#[tokio::test]
async fn history_pages_past_the_first_batch() {
    let (engine, alice, bob) = pair().await;
    for _ in 0..=HISTORY_PAGE_SIZE {
        engine
            .create_expense(NewExpenseCmd::new(
                &alice.id,
                2.0,
                equal(&[&alice, &bob], 2.0),
                single(&alice, 2.0),
            ))
            .await
            .unwrap();
    }

    let first = engine.fetch_expense_history(&bob.id, 1).await.unwrap();
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.expenses.len() as u64, HISTORY_PAGE_SIZE);
    assert_eq!(first.total_borrowed, (HISTORY_PAGE_SIZE + 1) as f64);

    let second = engine.fetch_expense_history(&bob.id, 2).await.unwrap();
    assert_eq!(second.expenses.len(), 1);
    assert_eq!(second.total_borrowed, first.total_borrowed);
}

#[tokio::test]
async fn history_of_unknown_user_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    assert!(engine.fetch_expense_history("ghost", 1).await.is_err());
}

#[tokio::test]
async fn group_ledger_pages_expenses_but_totals_every_page() {
    let (engine, alice, bob) = pair().await;
    let group_id = shared_group(&engine, &alice, &bob, "Cabin").await;

    let mut last = None;
    for _ in 0..=GROUP_PAGE_SIZE {
        let expense = engine
            .create_expense(
                NewExpenseCmd::new(&alice.id, 10.0, equal(&[&alice, &bob], 10.0), single(&alice, 10.0))
                    .group_id(group_id),
            )
            .await
            .unwrap();
        last = Some(expense.id);
    }
    let last = last.unwrap();
    engine.settle_expense(&bob.id, last).await.unwrap();

    let first = engine.fetch_group_ledger(&alice.id, group_id, 1).await.unwrap();
    assert_eq!(first.history.page_number, 1);
    assert_eq!(first.history.total_pages, 2);
    assert_eq!(first.history.expenses.len() as u64, GROUP_PAGE_SIZE);
    assert_eq!(first.members.len(), 2);
    // 20 drafts, alice owed 5 on each.
    assert_eq!(first.history.total_owed, 100.0);
    assert_eq!(first.history.total_borrowed, 0.0);

    let second = engine.fetch_group_ledger(&alice.id, group_id, 2).await.unwrap();
    assert_eq!(second.history.expenses.len(), 1);
    assert_eq!(second.history.total_owed, 100.0);

    // Settled expenses are still listed.
    let statuses = first
        .history
        .expenses
        .iter()
        .chain(second.history.expenses.iter())
        .filter(|detailed| detailed.expense.status == ExpenseStatus::Settled)
        .count();
    assert_eq!(statuses, 1);

    let bob_view = engine.fetch_group_ledger(&bob.id, group_id, 1).await.unwrap();
    assert_eq!(bob_view.history.total_borrowed, 100.0);
}

#[tokio::test]
async fn group_ledger_requires_membership() {
    let (engine, alice, bob) = pair().await;
    let group = engine.create_group(&alice.id, "Solo", "").await.unwrap();
    assert!(engine.fetch_group_ledger(&bob.id, group.id, 1).await.is_err());
}

#[tokio::test]
async fn user_home_nets_group_totals() {
    let (engine, alice, bob) = pair().await;
    let dinners = shared_group(&engine, &alice, &bob, "Dinners").await;
    let rides = shared_group(&engine, &alice, &bob, "Rides").await;

    engine
        .create_expense(
            NewExpenseCmd::new(&alice.id, 120.0, equal(&[&alice, &bob], 120.0), single(&alice, 120.0))
                .group_id(dinners),
        )
        .await
        .unwrap();
    engine
        .create_expense(
            NewExpenseCmd::new(&bob.id, 50.0, equal(&[&alice, &bob], 50.0), single(&bob, 50.0))
                .group_id(rides),
        )
        .await
        .unwrap();

    let home = engine.user_home(&alice.id).await.unwrap();
    assert_eq!(home.user.id, alice.id);
    assert_eq!(home.groups.len(), 2);
    let of = |group_id: Uuid| {
        home.groups
            .iter()
            .find(|balance| balance.group.id == group_id)
            .map(|balance| (balance.total_owed, balance.total_borrowed))
            .unwrap()
    };
    assert_eq!(of(dinners), (60.0, 0.0));
    assert_eq!(of(rides), (0.0, 25.0));
    assert_eq!(home.total_owed, 35.0);
    assert_eq!(home.total_borrowed, 0.0);

    for balance in &home.groups {
        assert_eq!(balance.history.page_number, 1);
        assert_eq!(balance.history.total_pages, 1);
        assert_eq!(balance.history.expenses.len(), 1);
        assert_eq!(balance.history.expenses[0].expense.group_id, Some(balance.group.id));
        assert_eq!(balance.history.total_owed, balance.total_owed);
        assert_eq!(balance.history.total_borrowed, balance.total_borrowed);
    }

    let home = engine.user_home(&bob.id).await.unwrap();
    assert_eq!(home.total_owed, 0.0);
    assert_eq!(home.total_borrowed, 35.0);
}

mod common;

use engine::{EngineError, NewExpenseCmd};

use common::{PASSWORD, befriend, engine_with_db, equal, single, user};

#[tokio::test]
async fn signup_and_login() {
    let (engine, _db) = engine_with_db().await;
    let alice = engine
        .signup("  Alice  Liddell ", "Alice@Example.com ", PASSWORD)
        .await
        .unwrap();
    assert_eq!(alice.name, "Alice Liddell");
    assert_eq!(alice.email, "alice@example.com");
    assert!(!alice.is_verified);

    let logged = engine.login("ALICE@example.com", PASSWORD).await.unwrap();
    assert_eq!(logged, alice);

    assert_eq!(
        engine.login("alice@example.com", "Wr0ng!pass").await.unwrap_err(),
        EngineError::Validation("invalid password".to_string())
    );
    assert_eq!(
        engine.login("nobody@example.com", PASSWORD).await.unwrap_err(),
        EngineError::KeyNotFound("user not exists".to_string())
    );
}

#[tokio::test]
async fn signup_rejects_duplicates_and_weak_input() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice").await;

    assert_eq!(
        engine
            .signup("Other", "alice@example.com", PASSWORD)
            .await
            .unwrap_err(),
        EngineError::ExistingKey("alice@example.com".to_string())
    );
    assert!(
        engine
            .signup("Bob", "bob@example.com", "short")
            .await
            .unwrap_err()
            .is_validation()
    );
    assert!(
        engine
            .signup("Bob", "not-an-email", PASSWORD)
            .await
            .unwrap_err()
            .is_validation()
    );
}

#[tokio::test]
async fn friendship_is_mutual_and_unique() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;

    let friend = engine.add_friend(&alice.id, "BOB@example.com").await.unwrap();
    assert_eq!(friend.id, bob.id);
    assert_eq!(engine.friends(&bob.id).await.unwrap(), vec![alice.clone()]);

    assert_eq!(
        engine.add_friend(&bob.id, &alice.email).await.unwrap_err(),
        EngineError::ExistingKey(alice.email.clone())
    );
    assert!(
        engine
            .add_friend(&alice.id, &alice.email)
            .await
            .unwrap_err()
            .is_validation()
    );
}

#[tokio::test]
async fn group_names_are_unique_per_user_ignoring_accents() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;

    let group = engine
        .create_group(&alice.id, "Café  Crew", "coffee")
        .await
        .unwrap();
    assert_eq!(group.name, "Café Crew");
    assert!(group.is_admin(&alice.id));

    assert!(matches!(
        engine.create_group(&alice.id, "cafe crew", "").await,
        Err(EngineError::ExistingKey(_))
    ));
    // Another user may reuse the name.
    assert!(engine.create_group(&bob.id, "Cafe Crew", "").await.is_ok());

    assert!(
        engine
            .create_group(&alice.id, "   ", "")
            .await
            .unwrap_err()
            .is_validation()
    );
}

#[tokio::test]
async fn join_requires_membership_and_friendship() {
    let (engine, _db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let carol = user(&engine, "carol").await;
    let group = engine.create_group(&alice.id, "Trip", "").await.unwrap();

    assert_eq!(
        engine.join_group(&alice.id, group.id, &bob.id).await.unwrap_err(),
        EngineError::Validation("new member should be a friend of current user".to_string())
    );
    assert_eq!(
        engine.join_group(&bob.id, group.id, &carol.id).await.unwrap_err(),
        EngineError::KeyNotFound("group not exists".to_string())
    );

    befriend(&engine, &alice, &bob).await;
    engine.join_group(&alice.id, group.id, &bob.id).await.unwrap();
    assert_eq!(
        engine.join_group(&alice.id, group.id, &bob.id).await.unwrap_err(),
        EngineError::ExistingKey(bob.id.clone())
    );

    let detail = engine.group_detail(&bob.id, group.id).await.unwrap();
    assert_eq!(detail.group.id, group.id);
    assert_eq!(detail.members.len(), 2);
    let groups = engine.groups(&bob.id).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, group.id);
}

#[tokio::test]
async fn leave_and_delete_group() {
    let (engine, db) = engine_with_db().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    befriend(&engine, &alice, &bob).await;
    let group = engine.create_group(&alice.id, "Flat", "").await.unwrap();
    engine.join_group(&alice.id, group.id, &bob.id).await.unwrap();

    let expense = engine
        .create_expense(
            NewExpenseCmd::new(&alice.id, 20.0, equal(&[&alice, &bob], 20.0), single(&alice, 20.0))
                .group_id(group.id),
        )
        .await
        .unwrap();

    assert_eq!(
        engine.delete_group(&bob.id, group.id).await.unwrap_err(),
        EngineError::Validation(
            "user is not admin of the group, cannot delete group".to_string()
        )
    );

    engine.leave_group(&bob.id, group.id).await.unwrap();
    assert_eq!(
        engine.leave_group(&bob.id, group.id).await.unwrap_err(),
        EngineError::Validation("user does not exist in group".to_string())
    );
    assert!(engine.groups(&bob.id).await.unwrap().is_empty());

    engine.delete_group(&alice.id, group.id).await.unwrap();
    assert_eq!(
        engine.group_detail(&alice.id, group.id).await.unwrap_err(),
        EngineError::KeyNotFound("group not exists".to_string())
    );
    assert!(common::indexed_members(&db, expense.id).await.is_empty());
    assert!(engine.expense(&alice.id, expense.id).await.is_err());
}

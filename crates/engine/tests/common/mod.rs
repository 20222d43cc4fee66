#![allow(dead_code)]

use std::collections::BTreeSet;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, Payer, Split, User};
use migration::MigratorTrait;
use uuid::Uuid;

pub const PASSWORD: &str = "Sup3r!secret";

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_db_strict(true).await
}

pub async fn engine_with_db_strict(strict: bool) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .strict_authorization(strict)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn user(engine: &Engine, name: &str) -> User {
    engine
        .signup(name, &format!("{name}@example.com"), PASSWORD)
        .await
        .unwrap()
}

pub async fn befriend(engine: &Engine, a: &User, b: &User) {
    engine.add_friend(&a.id, &b.email).await.unwrap();
}

pub fn equal(users: &[&User], total: f64) -> Split {
    Split::Equal {
        participants: users.iter().map(|u| u.id.clone()).collect(),
        total_amount: total,
    }
}

pub fn single(user: &User, amount: f64) -> Payer {
    Payer::Single {
        payer: user.id.clone(),
        amount,
    }
}

/// Ids indexed on an expense, read straight from the table.
pub async fn indexed_members(db: &DatabaseConnection, expense_id: Uuid) -> BTreeSet<String> {
    let backend = db.get_database_backend();
    db.query_all(Statement::from_sql_and_values(
        backend,
        "SELECT user_id FROM expense_members WHERE expense_id = ?",
        vec![expense_id.to_string().into()],
    ))
    .await
    .unwrap()
    .into_iter()
    .map(|row| row.try_get::<String>("", "user_id").unwrap())
    .collect()
}

pub fn ids(users: &[&User]) -> BTreeSet<String> {
    users.iter().map(|u| u.id.clone()).collect()
}

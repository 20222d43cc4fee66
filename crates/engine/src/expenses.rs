//! Expense records.
//!
//! An [`Expense`] binds a description and an amount to a [`Split`] (who owes
//! what) and a [`Payer`] (who paid what). Both must cover the amount to the
//! cent. Only `Draft` expenses can be edited; settling is the one transition
//! allowed afterwards.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Payer, ResultEngine, Split,
    amount::{MIN_EXPENSE_AMOUNT, round2},
    util::parse_uuid,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    #[default]
    Draft,
    Settled,
    /// Declared for stored data compatibility. No operation moves an expense
    /// into this state.
    Reopened,
}

impl ExpenseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Settled => "SETTLED",
            Self::Reopened => "REOPENED",
        }
    }
}

impl TryFrom<&str> for ExpenseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DRAFT" => Ok(Self::Draft),
            "SETTLED" => Ok(Self::Settled),
            "REOPENED" => Ok(Self::Reopened),
            other => Err(EngineError::Decode(format!("invalid expense status: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
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

impl Expense {
    /// Build a new draft expense, checking every rule that needs no storage
    /// lookup.
    pub fn new(
        created_by: &str,
        description: String,
        amount: f64,
        split: Split,
        payer: Payer,
        group_id: Option<Uuid>,
    ) -> ResultEngine<Self> {
        if created_by.trim().is_empty() {
            return Err(EngineError::Validation(
                "creator id must not be empty".to_string(),
            ));
        }
        validate_terms(amount, &split, &payer)?;
        Ok(Self {
            id: Uuid::new_v4(),
            description,
            amount: round2(amount),
            created_at: Utc::now(),
            created_by: created_by.to_string(),
            split,
            payer,
            status: ExpenseStatus::Draft,
            settled_by: None,
            group_id,
        })
    }

    pub fn is_draft(&self) -> bool {
        self.status == ExpenseStatus::Draft
    }

    pub fn is_group_expense(&self) -> bool {
        self.group_id.is_some()
    }

    /// Union of split and payer participant ids.
    pub fn participants(&self) -> BTreeSet<String> {
        let mut ids = self.split.participants();
        ids.extend(self.payer.participants());
        ids
    }

    /// Replace the editable terms. Identity, status and group are untouched.
    pub(crate) fn revise(
        &mut self,
        description: String,
        amount: f64,
        split: Split,
        payer: Payer,
    ) -> ResultEngine<()> {
        validate_terms(amount, &split, &payer)?;
        self.description = description;
        self.amount = round2(amount);
        self.split = split;
        self.payer = payer;
        Ok(())
    }

    pub(crate) fn settle(&mut self, user_id: &str) {
        self.status = ExpenseStatus::Settled;
        self.settled_by = Some(user_id.to_string());
    }
}

/// Amount floor, payer presence, value ranges, then both totals against the
/// amount.
fn validate_terms(amount: f64, split: &Split, payer: &Payer) -> ResultEngine<()> {
    if !amount.is_finite() || amount < MIN_EXPENSE_AMOUNT {
        return Err(EngineError::Validation(format!(
            "amount should be at least {MIN_EXPENSE_AMOUNT:.1}"
        )));
    }
    if payer.is_empty() {
        return Err(EngineError::Validation("payers are required".to_string()));
    }
    split.ensure_valid_values()?;
    payer.ensure_valid_amounts()?;
    split.ensure_covers(amount)?;
    payer.ensure_covers(amount)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub created_at: DateTimeUtc,
    pub created_by: String,
    #[sea_orm(column_type = "Text")]
    pub split: String,
    #[sea_orm(column_type = "Text")]
    pub payer: String,
    pub status: String,
    pub settled_by: Option<String>,
    pub group_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_members::Entity")]
    Members,
}

impl Related<super::expense_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Expense> for ActiveModel {
    type Error = EngineError;

    fn try_from(expense: &Expense) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(expense.id.to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            amount: ActiveValue::Set(expense.amount),
            created_at: ActiveValue::Set(expense.created_at),
            created_by: ActiveValue::Set(expense.created_by.clone()),
            split: ActiveValue::Set(expense.split.encode()?),
            payer: ActiveValue::Set(expense.payer.encode()?),
            status: ActiveValue::Set(expense.status.as_str().to_string()),
            settled_by: ActiveValue::Set(expense.settled_by.clone()),
            group_id: ActiveValue::Set(expense.group_id.map(|id| id.to_string())),
        })
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            description: model.description,
            amount: model.amount,
            created_at: model.created_at,
            created_by: model.created_by,
            split: Split::decode(&model.split)?,
            payer: Payer::decode(&model.payer)?,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            settled_by: model.settled_by,
            group_id: model
                .group_id
                .as_deref()
                .map(|id| parse_uuid(id, "group"))
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn equal_split(ids: &[&str], total: f64) -> Split {
        Split::Equal {
            participants: ids.iter().map(ToString::to_string).collect(),
            total_amount: total,
        }
    }

    fn single(payer: &str, amount: f64) -> Payer {
        Payer::Single {
            payer: payer.to_string(),
            amount,
        }
    }

    #[test]
    fn new_expense_starts_as_draft() {
        let expense = Expense::new(
            "alice",
            "dinner".to_string(),
            100.0,
            equal_split(&["alice", "bob"], 100.0),
            single("alice", 100.0),
            None,
        )
        .unwrap();
        assert!(expense.is_draft());
        assert!(!expense.is_group_expense());
        assert_eq!(expense.created_by, "alice");
        assert_eq!(expense.settled_by, None);
        assert_eq!(
            expense.participants(),
            BTreeSet::from(["alice".to_string(), "bob".to_string()])
        );
    }

    #[test]
    fn amount_below_one_is_rejected() {
        let err = Expense::new(
            "alice",
            "gum".to_string(),
            0.5,
            equal_split(&["alice"], 0.5),
            single("alice", 0.5),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("amount should be at least 1.0".to_string())
        );
    }

    #[test]
    fn empty_creator_is_rejected() {
        let err = Expense::new(
            " ",
            "x".to_string(),
            10.0,
            equal_split(&["a"], 10.0),
            single("a", 10.0),
            None,
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn missing_payers_are_rejected() {
        let err = Expense::new(
            "alice",
            "x".to_string(),
            10.0,
            equal_split(&["alice"], 10.0),
            Payer::Multi {
                payers: BTreeMap::new(),
            },
            None,
        )
        .unwrap_err();
        assert_eq!(err, EngineError::Validation("payers are required".to_string()));
    }

    #[test]
    fn out_of_range_percentages_are_rejected() {
        let split = Split::Percentage {
            percentages: BTreeMap::from([("alice".to_string(), 150.0), ("bob".to_string(), -50.0)]),
            total_amount: 100.0,
        };
        let err = Expense::new(
            "alice",
            "x".to_string(),
            100.0,
            split,
            single("alice", 100.0),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("percentage must be between 0 and 100".to_string())
        );
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let unit_err = Expense::new(
            "alice",
            "x".to_string(),
            50.0,
            Split::Unit {
                amounts: BTreeMap::from([("alice".to_string(), 80.0), ("bob".to_string(), -30.0)]),
            },
            single("alice", 50.0),
            None,
        )
        .unwrap_err();
        assert_eq!(
            unit_err,
            EngineError::Validation("unit amount must not be negative".to_string())
        );

        let payer_err = Expense::new(
            "alice",
            "x".to_string(),
            100.0,
            Split::Unit {
                amounts: BTreeMap::from([("alice".to_string(), 50.0), ("bob".to_string(), 50.0)]),
            },
            Payer::Multi {
                payers: BTreeMap::from([("alice".to_string(), 200.0), ("bob".to_string(), -100.0)]),
            },
            None,
        )
        .unwrap_err();
        assert_eq!(
            payer_err,
            EngineError::Validation("payer amount must not be negative".to_string())
        );
    }

    #[test]
    fn non_finite_unit_amounts_are_rejected() {
        let err = Expense::new(
            "alice",
            "x".to_string(),
            10.0,
            Split::Unit {
                amounts: BTreeMap::from([("alice".to_string(), f64::INFINITY)]),
            },
            single("alice", 10.0),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn totals_must_cover_the_amount() {
        let split_err = Expense::new(
            "alice",
            "x".to_string(),
            100.0,
            equal_split(&["alice", "bob"], 98.0),
            single("alice", 100.0),
            None,
        )
        .unwrap_err();
        assert_eq!(
            split_err,
            EngineError::Validation("split amount does not match expense amount".to_string())
        );

        let payer_err = Expense::new(
            "alice",
            "x".to_string(),
            100.0,
            equal_split(&["alice", "bob"], 100.0),
            single("alice", 99.0),
            None,
        )
        .unwrap_err();
        assert_eq!(
            payer_err,
            EngineError::Validation(
                "payer contribution total does not match expense amount".to_string()
            )
        );
    }

    #[test]
    fn status_codes_match_storage() {
        for status in [
            ExpenseStatus::Draft,
            ExpenseStatus::Settled,
            ExpenseStatus::Reopened,
        ] {
            assert_eq!(ExpenseStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(ExpenseStatus::try_from("draft").is_err());
    }

    #[test]
    fn model_conversion_keeps_split_and_payer() {
        let expense = Expense::new(
            "alice",
            "rent".to_string(),
            90.0,
            Split::Share {
                units: BTreeMap::from([("alice".to_string(), 1), ("bob".to_string(), 2)]),
                total_amount: 90.0,
            },
            single("bob", 90.0),
            Some(Uuid::new_v4()),
        )
        .unwrap();
        let active = ActiveModel::try_from(&expense).unwrap();
        let model = Model {
            id: active.id.unwrap(),
            description: active.description.unwrap(),
            amount: active.amount.unwrap(),
            created_at: active.created_at.unwrap(),
            created_by: active.created_by.unwrap(),
            split: active.split.unwrap(),
            payer: active.payer.unwrap(),
            status: active.status.unwrap(),
            settled_by: active.settled_by.unwrap(),
            group_id: active.group_id.unwrap(),
        };
        assert_eq!(Expense::try_from(model).unwrap(), expense);
    }
}

//! Split strategies.
//!
//! A [`Split`] decides how much of an expense each participant owes. Four
//! strategies exist:
//!
//! - [`Split::Equal`]: the total is divided evenly among the participants.
//!   The remainder of the division is not redistributed.
//! - [`Split::Unit`]: every participant owes an explicit amount; the total is
//!   their sum.
//! - [`Split::Percentage`]: every participant owes a percentage of the total,
//!   rounded down to cents.
//! - [`Split::Share`]: every participant owes `units / total_units` of the
//!   total.
//!
//! Splits are persisted as a tagged JSON document:
//!
//! ```json
//! { "type": "equal", "totalAmount": 100.0, "equalSplit": ["a", "b"] }
//! ```
//!
//! Participant ids are free-form here. Whether they belong to real users is
//! checked by the expense operations, not by the strategy.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine,
    amount::{amounts_match, floor2},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitKind {
    Equal,
    Unit,
    Percentage,
    Share,
}

impl SplitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Unit => "unit",
            Self::Percentage => "percentage",
            Self::Share => "share",
        }
    }
}

impl TryFrom<&str> for SplitKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "unit" => Ok(Self::Unit),
            "percentage" => Ok(Self::Percentage),
            "share" => Ok(Self::Share),
            other => Err(EngineError::UnknownType(format!("split type {other}"))),
        }
    }
}

/// How an expense is divided among its participants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SplitRecord", into = "SplitRecord")]
pub enum Split {
    Equal {
        participants: Vec<String>,
        total_amount: f64,
    },
    Unit {
        amounts: BTreeMap<String, f64>,
    },
    Percentage {
        percentages: BTreeMap<String, f64>,
        total_amount: f64,
    },
    Share {
        units: BTreeMap<String, u32>,
        total_amount: f64,
    },
}

impl Split {
    pub fn kind(&self) -> SplitKind {
        match self {
            Self::Equal { .. } => SplitKind::Equal,
            Self::Unit { .. } => SplitKind::Unit,
            Self::Percentage { .. } => SplitKind::Percentage,
            Self::Share { .. } => SplitKind::Share,
        }
    }

    /// Amount owed by each participant.
    pub fn payee_split(&self) -> ResultEngine<BTreeMap<String, f64>> {
        match self {
            Self::Equal {
                participants,
                total_amount,
            } => {
                let count = equal_participant_count(participants)?;
                let share = total_amount / count;
                Ok(participants
                    .iter()
                    .map(|id| (id.clone(), share))
                    .collect())
            }
            Self::Unit { amounts } => Ok(amounts.clone()),
            Self::Percentage {
                percentages,
                total_amount,
            } => Ok(percentages
                .iter()
                .map(|(id, percent)| (id.clone(), floor2(percent / 100.0 * total_amount)))
                .collect()),
            Self::Share {
                units,
                total_amount,
            } => {
                let total_units = share_unit_total(units)?;
                Ok(units
                    .iter()
                    .map(|(id, unit)| {
                        (
                            id.clone(),
                            f64::from(*unit) / total_units * total_amount,
                        )
                    })
                    .collect())
            }
        }
    }

    /// Total covered by the split, to be checked against the expense amount.
    pub fn compute_total(&self) -> ResultEngine<f64> {
        match self {
            Self::Equal {
                participants,
                total_amount,
            } => {
                equal_participant_count(participants)?;
                Ok(*total_amount)
            }
            Self::Unit { amounts } => Ok(amounts.values().sum()),
            Self::Percentage {
                percentages,
                total_amount,
            } => {
                let total_percent: f64 = percentages.values().sum();
                if total_percent == 100.0 {
                    Ok(*total_amount)
                } else {
                    Ok(floor2(total_percent / 100.0 * total_amount))
                }
            }
            Self::Share { .. } => Ok(self.payee_split()?.values().sum()),
        }
    }

    /// Every participant id named by the split.
    pub fn participants(&self) -> BTreeSet<String> {
        match self {
            Self::Equal { participants, .. } => participants.iter().cloned().collect(),
            Self::Unit { amounts } => amounts.keys().cloned().collect(),
            Self::Percentage { percentages, .. } => percentages.keys().cloned().collect(),
            Self::Share { units, .. } => units.keys().cloned().collect(),
        }
    }

    /// Unit amounts must be finite and non-negative, percentages within
    /// `0..=100`.
    pub(crate) fn ensure_valid_values(&self) -> ResultEngine<()> {
        match self {
            Self::Unit { amounts }
                if !amounts
                    .values()
                    .all(|amount| amount.is_finite() && *amount >= 0.0) =>
            {
                Err(EngineError::Validation(
                    "unit amount must not be negative".to_string(),
                ))
            }
            Self::Percentage { percentages, .. }
                if !percentages
                    .values()
                    .all(|percent| (0.0..=100.0).contains(percent)) =>
            {
                Err(EngineError::Validation(
                    "percentage must be between 0 and 100".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Fails unless the split covers exactly `amount`.
    pub(crate) fn ensure_covers(&self, amount: f64) -> ResultEngine<()> {
        if !amounts_match(self.compute_total()?, amount) {
            return Err(EngineError::Validation(
                "split amount does not match expense amount".to_string(),
            ));
        }
        Ok(())
    }

    /// Decode the persisted JSON document.
    pub fn decode(raw: &str) -> ResultEngine<Self> {
        let record: SplitRecord =
            serde_json::from_str(raw).map_err(|err| EngineError::Decode(err.to_string()))?;
        Self::try_from(record)
    }

    /// Encode into the persisted JSON document.
    pub fn encode(&self) -> ResultEngine<String> {
        serde_json::to_string(self).map_err(|err| EngineError::Decode(err.to_string()))
    }
}

fn equal_participant_count(participants: &[String]) -> ResultEngine<f64> {
    if participants.is_empty() {
        return Err(EngineError::Validation(
            "equal split requires at least one participant".to_string(),
        ));
    }
    Ok(participants.len() as f64)
}

fn share_unit_total(units: &BTreeMap<String, u32>) -> ResultEngine<f64> {
    let total: u64 = units.values().map(|unit| u64::from(*unit)).sum();
    if total == 0 {
        return Err(EngineError::Validation(
            "share split requires at least one share unit".to_string(),
        ));
    }
    Ok(total as f64)
}

/// Flat wire shape of a [`Split`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SplitRecord {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    equal_split: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit_split: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    percentage_split: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    share_split: Option<BTreeMap<String, u32>>,
}

impl TryFrom<SplitRecord> for Split {
    type Error = EngineError;

    fn try_from(record: SplitRecord) -> Result<Self, Self::Error> {
        let total_amount = record.total_amount.unwrap_or_default();
        Ok(match SplitKind::try_from(record.kind.as_str())? {
            SplitKind::Equal => Self::Equal {
                participants: record.equal_split.unwrap_or_default(),
                total_amount,
            },
            SplitKind::Unit => Self::Unit {
                amounts: record.unit_split.unwrap_or_default(),
            },
            SplitKind::Percentage => Self::Percentage {
                percentages: record.percentage_split.unwrap_or_default(),
                total_amount,
            },
            SplitKind::Share => Self::Share {
                units: record.share_split.unwrap_or_default(),
                total_amount,
            },
        })
    }
}

impl From<Split> for SplitRecord {
    fn from(split: Split) -> Self {
        let kind = split.kind().as_str().to_string();
        match split {
            Split::Equal {
                participants,
                total_amount,
            } => Self {
                kind,
                total_amount: Some(total_amount),
                equal_split: Some(participants),
                ..Self::default()
            },
            Split::Unit { amounts } => Self {
                kind,
                unit_split: Some(amounts),
                ..Self::default()
            },
            Split::Percentage {
                percentages,
                total_amount,
            } => Self {
                kind,
                total_amount: Some(total_amount),
                percentage_split: Some(percentages),
                ..Self::default()
            },
            Split::Share {
                units,
                total_amount,
            } => Self {
                kind,
                total_amount: Some(total_amount),
                share_split: Some(units),
                ..Self::default()
            },
        }
    }
}

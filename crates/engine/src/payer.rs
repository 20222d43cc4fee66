//! Payer strategies.
//!
//! A [`Payer`] records who paid for an expense and how much. Persisted as
//! `{"type": "single" | "multi", "payerSplit": {"<id>": <amount>}}`; a single
//! payer document must name exactly one contributor.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, amount::amounts_match};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayerKind {
    Single,
    Multi,
}

impl PayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }
}

impl TryFrom<&str> for PayerKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "single" => Ok(Self::Single),
            "multi" => Ok(Self::Multi),
            other => Err(EngineError::UnknownType(format!("payer type {other}"))),
        }
    }
}

/// Who paid for an expense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PayerRecord", into = "PayerRecord")]
pub enum Payer {
    Single { payer: String, amount: f64 },
    Multi { payers: BTreeMap<String, f64> },
}

impl Payer {
    pub fn kind(&self) -> PayerKind {
        match self {
            Self::Single { .. } => PayerKind::Single,
            Self::Multi { .. } => PayerKind::Multi,
        }
    }

    /// Amount paid by each contributor.
    pub fn payers(&self) -> BTreeMap<String, f64> {
        match self {
            Self::Single { payer, amount } => BTreeMap::from([(payer.clone(), *amount)]),
            Self::Multi { payers } => payers.clone(),
        }
    }

    pub fn total(&self) -> f64 {
        match self {
            Self::Single { amount, .. } => *amount,
            Self::Multi { payers } => payers.values().sum(),
        }
    }

    pub fn participants(&self) -> BTreeSet<String> {
        match self {
            Self::Single { payer, .. } => BTreeSet::from([payer.clone()]),
            Self::Multi { payers } => payers.keys().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single { payer, .. } => payer.trim().is_empty(),
            Self::Multi { payers } => payers.is_empty(),
        }
    }

    /// Every contribution must be a finite, non-negative amount.
    pub(crate) fn ensure_valid_amounts(&self) -> ResultEngine<()> {
        let valid = match self {
            Self::Single { amount, .. } => amount.is_finite() && *amount >= 0.0,
            Self::Multi { payers } => payers
                .values()
                .all(|amount| amount.is_finite() && *amount >= 0.0),
        };
        if !valid {
            return Err(EngineError::Validation(
                "payer amount must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Fails unless the contributions add up to `amount`.
    pub(crate) fn ensure_covers(&self, amount: f64) -> ResultEngine<()> {
        if !amounts_match(self.total(), amount) {
            return Err(EngineError::Validation(
                "payer contribution total does not match expense amount".to_string(),
            ));
        }
        Ok(())
    }

    /// Decode the persisted JSON document.
    pub fn decode(raw: &str) -> ResultEngine<Self> {
        let record: PayerRecord =
            serde_json::from_str(raw).map_err(|err| EngineError::Decode(err.to_string()))?;
        Self::try_from(record)
    }

    /// Encode into the persisted JSON document.
    pub fn encode(&self) -> ResultEngine<String> {
        serde_json::to_string(self).map_err(|err| EngineError::Decode(err.to_string()))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayerRecord {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payer_split: BTreeMap<String, f64>,
}

impl TryFrom<PayerRecord> for Payer {
    type Error = EngineError;

    fn try_from(record: PayerRecord) -> Result<Self, Self::Error> {
        match PayerKind::try_from(record.kind.as_str())? {
            PayerKind::Single => {
                if record.payer_split.len() != 1 {
                    return Err(EngineError::Decode(
                        "single payer requires exactly one payer".to_string(),
                    ));
                }
                let Some((payer, amount)) = record.payer_split.into_iter().next() else {
                    return Err(EngineError::Decode("payers not found".to_string()));
                };
                Ok(Self::Single { payer, amount })
            }
            PayerKind::Multi => Ok(Self::Multi {
                payers: record.payer_split,
            }),
        }
    }
}

impl From<Payer> for PayerRecord {
    fn from(payer: Payer) -> Self {
        let kind = payer.kind().as_str().to_string();
        let payer_split = match payer {
            Payer::Single { payer, amount } => BTreeMap::from([(payer, amount)]),
            Payer::Multi { payers } => payers,
        };
        Self { kind, payer_split }
    }
}

//! Ledger aggregation.
//!
//! For one user and one expense, the difference between what the user paid
//! and the share they owe is either owed *to* them (they over-paid) or
//! borrowed *by* them (they under-paid). A [`Ledger`] sums these differences
//! over any number of expenses; [`Balance::net_off`] then lets the larger side
//! absorb the smaller so at most one of the two totals is non-zero.
//!
//! ```rust
//! use engine::Balance;
//!
//! let raw = Balance { total_owed: 60.0, total_borrowed: 25.0 };
//! assert_eq!(raw.net_off(), Balance { total_owed: 35.0, total_borrowed: 0.0 });
//! ```

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::{Expense, Group, ResultEngine, User};

/// Owed and borrowed totals of one user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub total_owed: f64,
    pub total_borrowed: f64,
}

impl Balance {
    /// Contribution of a single expense for `user_id`.
    pub fn of(expense: &Expense, user_id: &str) -> ResultEngine<Self> {
        let paid = expense.payer.payers().get(user_id).copied().unwrap_or(0.0);
        let share = expense
            .split
            .payee_split()?
            .get(user_id)
            .copied()
            .unwrap_or(0.0);

        Ok(if paid > share {
            Self {
                total_owed: paid - share,
                total_borrowed: 0.0,
            }
        } else if paid < share {
            Self {
                total_owed: 0.0,
                total_borrowed: share - paid,
            }
        } else {
            Self::default()
        })
    }

    #[must_use]
    pub fn net_off(self) -> Self {
        if self.total_owed > self.total_borrowed {
            Self {
                total_owed: self.total_owed - self.total_borrowed,
                total_borrowed: 0.0,
            }
        } else {
            Self {
                total_owed: 0.0,
                total_borrowed: self.total_borrowed - self.total_owed,
            }
        }
    }
}

impl Add for Balance {
    type Output = Balance;

    fn add(self, rhs: Balance) -> Self::Output {
        Balance {
            total_owed: self.total_owed + rhs.total_owed,
            total_borrowed: self.total_borrowed + rhs.total_borrowed,
        }
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Balance) {
        *self = *self + rhs;
    }
}

/// Running (raw) totals for one user across many expenses.
#[derive(Clone, Debug)]
pub struct Ledger {
    user_id: String,
    raw: Balance,
}

impl Ledger {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            raw: Balance::default(),
        }
    }

    /// Fold one expense in and return its contribution.
    pub fn record(&mut self, expense: &Expense) -> ResultEngine<Balance> {
        let contribution = Balance::of(expense, &self.user_id)?;
        self.raw += contribution;
        Ok(contribution)
    }

    pub fn record_all<'a>(
        &mut self,
        expenses: impl IntoIterator<Item = &'a Expense>,
    ) -> ResultEngine<()> {
        for expense in expenses {
            self.record(expense)?;
        }
        Ok(())
    }

    /// Totals before net-off.
    pub fn raw(&self) -> Balance {
        self.raw
    }

    pub fn balance(&self) -> Balance {
        self.raw.net_off()
    }
}

/// An expense together with the viewing user's contribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailedExpense {
    pub expense: Expense,
    pub total_owed: f64,
    pub total_borrowed: f64,
}

impl DetailedExpense {
    pub fn new(expense: Expense, user_id: &str) -> ResultEngine<Self> {
        let balance = Balance::of(&expense, user_id)?;
        Ok(Self {
            expense,
            total_owed: balance.total_owed,
            total_borrowed: balance.total_borrowed,
        })
    }
}

/// One page of expenses plus the user's totals over every page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseHistory {
    pub expenses: Vec<DetailedExpense>,
    pub total_owed: f64,
    pub total_borrowed: f64,
    pub page_number: u64,
    pub total_pages: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupLedger {
    pub group: Group,
    pub members: Vec<User>,
    pub history: ExpenseHistory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupBalance {
    pub group: Group,
    pub total_owed: f64,
    pub total_borrowed: f64,
    /// First page of the group's expenses.
    pub history: ExpenseHistory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserHome {
    pub user: User,
    pub groups: Vec<GroupBalance>,
    pub total_owed: f64,
    pub total_borrowed: f64,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{Payer, Split};

    fn expense(split: Split, payer: Payer, amount: f64) -> Expense {
        Expense::new("creator", "test".to_string(), amount, split, payer, None).unwrap()
    }

    fn unit(entries: &[(&str, f64)]) -> Split {
        Split::Unit {
            amounts: entries.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn overpaying_user_is_owed_the_difference() {
        let e = expense(
            unit(&[("u", 40.0), ("v", 60.0)]),
            Payer::Single {
                payer: "u".to_string(),
                amount: 100.0,
            },
            100.0,
        );
        assert_eq!(
            Balance::of(&e, "u").unwrap(),
            Balance {
                total_owed: 60.0,
                total_borrowed: 0.0
            }
        );
    }

    #[test]
    fn non_paying_user_borrows_their_share() {
        let e = expense(
            unit(&[("u", 75.0), ("v", 25.0)]),
            Payer::Single {
                payer: "u".to_string(),
                amount: 100.0,
            },
            100.0,
        );
        assert_eq!(
            Balance::of(&e, "v").unwrap(),
            Balance {
                total_owed: 0.0,
                total_borrowed: 25.0
            }
        );
    }

    #[test]
    fn exact_payment_and_strangers_contribute_nothing() {
        let e = expense(
            unit(&[("u", 50.0), ("v", 50.0)]),
            Payer::Multi {
                payers: BTreeMap::from([("u".to_string(), 50.0), ("v".to_string(), 50.0)]),
            },
            100.0,
        );
        assert_eq!(Balance::of(&e, "u").unwrap(), Balance::default());
        assert_eq!(Balance::of(&e, "stranger").unwrap(), Balance::default());
    }

    #[test]
    fn net_off_keeps_only_the_larger_side() {
        let raw = Balance {
            total_owed: 60.0,
            total_borrowed: 25.0,
        };
        assert_eq!(
            raw.net_off(),
            Balance {
                total_owed: 35.0,
                total_borrowed: 0.0
            }
        );

        let raw = Balance {
            total_owed: 10.0,
            total_borrowed: 30.0,
        };
        assert_eq!(
            raw.net_off(),
            Balance {
                total_owed: 0.0,
                total_borrowed: 20.0
            }
        );
        assert_eq!(Balance::default().net_off(), Balance::default());
    }

    #[test]
    fn ledger_sums_raw_totals_then_nets() {
        let paid = expense(
            unit(&[("u", 40.0), ("v", 60.0)]),
            Payer::Single {
                payer: "u".to_string(),
                amount: 100.0,
            },
            100.0,
        );
        let owes = expense(
            unit(&[("u", 25.0), ("v", 25.0)]),
            Payer::Single {
                payer: "v".to_string(),
                amount: 50.0,
            },
            50.0,
        );

        let mut ledger = Ledger::new("u");
        ledger.record_all([&paid, &owes]).unwrap();
        assert_eq!(
            ledger.raw(),
            Balance {
                total_owed: 60.0,
                total_borrowed: 25.0
            }
        );
        assert_eq!(
            ledger.balance(),
            Balance {
                total_owed: 35.0,
                total_borrowed: 0.0
            }
        );
    }

    #[test]
    fn empty_ledger_is_balanced() {
        let ledger = Ledger::new("u");
        assert_eq!(ledger.balance(), Balance::default());
    }
}

//! Transaction Roles
//!
//! Jupiter hands back up to three transactions per swap. Their position in
//! the sequence is fixed: setup creates what swap needs, cleanup closes what
//! swap left behind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Functional position of a transaction inside one swap attempt.
///
/// Variant order is submission order; `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxRole {
    Setup,
    Swap,
    Cleanup,
}

impl TxRole {
    /// All roles in submission order
    pub const ORDER: [TxRole; 3] = [TxRole::Setup, TxRole::Swap, TxRole::Cleanup];

    pub fn as_str(&self) -> &'static str {
        match self {
            TxRole::Setup => "setup",
            TxRole::Swap => "swap",
            TxRole::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for TxRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optional slot per role.
///
/// The three slots are named fields rather than a list, so a bundle can never
/// hold two swaps or put cleanup ahead of setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapTransactions<T> {
    pub setup: Option<T>,
    pub swap: Option<T>,
    pub cleanup: Option<T>,
}

impl<T> Default for SwapTransactions<T> {
    fn default() -> Self {
        Self {
            setup: None,
            swap: None,
            cleanup: None,
        }
    }
}

impl<T> SwapTransactions<T> {
    /// Bundle holding only a swap transaction
    pub fn swap_only(swap: T) -> Self {
        Self {
            swap: Some(swap),
            ..Default::default()
        }
    }

    pub fn with_setup(mut self, setup: T) -> Self {
        self.setup = Some(setup);
        self
    }

    pub fn with_cleanup(mut self, cleanup: T) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    pub fn get(&self, role: TxRole) -> Option<&T> {
        match role {
            TxRole::Setup => self.setup.as_ref(),
            TxRole::Swap => self.swap.as_ref(),
            TxRole::Cleanup => self.cleanup.as_ref(),
        }
    }

    /// Number of present roles
    pub fn len(&self) -> usize {
        self.roles().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present roles, in submission order
    pub fn roles(&self) -> impl Iterator<Item = TxRole> + '_ {
        TxRole::ORDER.into_iter().filter(move |role| self.get(*role).is_some())
    }

    /// Present entries by reference, in submission order
    pub fn iter(&self) -> impl Iterator<Item = (TxRole, &T)> + '_ {
        TxRole::ORDER
            .into_iter()
            .filter_map(move |role| self.get(role).map(|tx| (role, tx)))
    }

    /// Consume the bundle into its present entries, in submission order
    pub fn into_ordered(self) -> Vec<(TxRole, T)> {
        let Self { setup, swap, cleanup } = self;
        [
            (TxRole::Setup, setup),
            (TxRole::Swap, swap),
            (TxRole::Cleanup, cleanup),
        ]
        .into_iter()
        .filter_map(|(role, tx)| tx.map(|tx| (role, tx)))
        .collect()
    }

    /// Apply a fallible conversion to every present slot, stopping at the
    /// first error. The error is tagged with the role that produced it.
    pub fn try_map<U, E, F>(self, mut f: F) -> Result<SwapTransactions<U>, (TxRole, E)>
    where
        F: FnMut(TxRole, T) -> Result<U, E>,
    {
        let mut apply = |role: TxRole, slot: Option<T>| -> Result<Option<U>, (TxRole, E)> {
            slot.map(|tx| f(role, tx).map_err(|e| (role, e))).transpose()
        };

        Ok(SwapTransactions {
            setup: apply(TxRole::Setup, self.setup)?,
            swap: apply(TxRole::Swap, self.swap)?,
            cleanup: apply(TxRole::Cleanup, self.cleanup)?,
        })
    }
}

impl SwapTransactions<String> {
    /// Build a bundle from raw provider payloads; empty strings mean absent.
    pub fn from_payloads(setup: Option<String>, swap: Option<String>, cleanup: Option<String>) -> Self {
        let present = |payload: Option<String>| payload.filter(|p| !p.trim().is_empty());
        Self {
            setup: present(setup),
            swap: present(swap),
            cleanup: present(cleanup),
        }
    }
}

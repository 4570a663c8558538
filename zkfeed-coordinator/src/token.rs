//! Fungible payment-token collaborator.
//!
//! The coordinator only ever asks the token for one thing: move the fee
//! from the caller to the treasury, failing if the balance is short.
//! Everything else about the token's accounting is its own business.

use std::collections::HashMap;

use thiserror::Error;

use crate::types::Address;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance: account holds {balance}, transfer needs {amount}")]
    InsufficientBalance { balance: u64, amount: u64 },
}

/// In-memory fungible-token ledger standing in for the external token
/// contract.
#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    balances: HashMap<Address, u64>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, to: &Address, amount: u64) {
        *self.balances.entry(*to).or_insert(0) += amount;
    }

    pub fn balance_of(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<(), TokenError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TokenError::InsufficientBalance { balance, amount });
        }
        self.balances.insert(*from, balance - amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

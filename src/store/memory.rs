//! In-memory Ledger Store
//!
//! Used when no database is configured and by the test suite.
//! Every operation runs inside a single mutex critical section, so a
//! settlement's balance check and mutation cannot interleave with another.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Account, Amount, Balance, NewAccount};

use super::{LedgerError, LedgerStore};

#[derive(Debug, Default)]
struct Ledger {
    next_id: i64,
    /// Keyed by internal id
    accounts: BTreeMap<i64, Account>,
}

impl Ledger {
    fn find_by_number(&self, number: i64) -> Option<&Account> {
        self.accounts.values().find(|acc| acc.number == number)
    }

    fn id_for_number(&self, number: i64) -> Result<i64, LedgerError> {
        self.find_by_number(number)
            .map(|acc| acc.id)
            .ok_or_else(|| LedgerError::AccountNotFound(number.to_string()))
    }
}

/// Ledger store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    inner: Mutex<Ledger>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account, LedgerError> {
        Balance::new(account.balance)?;

        let mut ledger = self.inner.lock();
        if ledger.find_by_number(account.number).is_some() {
            return Err(LedgerError::DuplicateNumber(account.number));
        }

        ledger.next_id += 1;
        let account = account.into_account(ledger.next_id);
        ledger.accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<(), LedgerError> {
        self.inner
            .lock()
            .accounts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.inner.lock().accounts.values().cloned().collect())
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Account, LedgerError> {
        self.inner
            .lock()
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Account, LedgerError> {
        self.inner
            .lock()
            .find_by_number(number)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(number.to_string()))
    }

    async fn send_money(&self, from: i64, to: i64, amount: Amount) -> Result<(), LedgerError> {
        let mut ledger = self.inner.lock();

        let from_id = ledger.id_for_number(from)?;
        let to_id = ledger.id_for_number(to)?;

        // Compute both new balances before touching either account
        let from_balance = Balance::new(ledger.accounts[&from_id].balance)?;
        if !from_balance.is_sufficient_for(&amount) {
            return Err(LedgerError::InsufficientFunds {
                required: amount.value(),
                available: from_balance.value(),
            });
        }
        let debited = from_balance.debit(&amount)?;
        let credited = Balance::new(ledger.accounts[&to_id].balance)?.credit(&amount)?;

        if let Some(acc) = ledger.accounts.get_mut(&from_id) {
            acc.balance = debited.value();
        }
        if let Some(acc) = ledger.accounts.get_mut(&to_id) {
            acc.balance = credited.value();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(number: i64, balance: i64) -> NewAccount {
        NewAccount {
            first_name: "Test".to_string(),
            last_name: format!("Account{}", number),
            number,
            encrypted_password: String::new(),
            balance,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryLedgerStore::new();
        let a = store.create_account(draft(101, 0)).await.unwrap();
        let b = store.create_account(draft(202, 0)).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.get_accounts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_number_rejected() {
        let store = MemoryLedgerStore::new();
        store.create_account(draft(101, 0)).await.unwrap();

        let result = store.create_account(draft(101, 0)).await;
        assert!(matches!(result, Err(LedgerError::DuplicateNumber(101))));
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_number() {
        let store = MemoryLedgerStore::new();
        let created = store.create_account(draft(101, 50)).await.unwrap();

        assert_eq!(store.get_account_by_id(created.id).await.unwrap(), created);
        assert_eq!(store.get_account_by_number(101).await.unwrap(), created);
        assert!(store.get_account_by_id(99).await.unwrap_err().is_not_found());
        assert!(store.get_account_by_number(999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_account() {
        let store = MemoryLedgerStore::new();
        let created = store.create_account(draft(101, 0)).await.unwrap();

        store.delete_account(created.id).await.unwrap();
        assert!(store.get_account_by_id(created.id).await.is_err());
        assert!(store.delete_account(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_send_money_moves_balance() {
        let store = MemoryLedgerStore::new();
        store.create_account(draft(101, 500)).await.unwrap();
        store.create_account(draft(202, 100)).await.unwrap();

        store
            .send_money(101, 202, Amount::new(200).unwrap())
            .await
            .unwrap();

        assert_eq!(store.get_account_by_number(101).await.unwrap().balance, 300);
        assert_eq!(store.get_account_by_number(202).await.unwrap().balance, 300);
    }

    #[tokio::test]
    async fn test_send_money_insufficient_leaves_state() {
        let store = MemoryLedgerStore::new();
        store.create_account(draft(101, 500)).await.unwrap();
        store.create_account(draft(202, 100)).await.unwrap();

        let result = store.send_money(101, 202, Amount::new(501).unwrap()).await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds {
                required: 501,
                available: 500
            })
        ));
        assert_eq!(store.get_account_by_number(101).await.unwrap().balance, 500);
        assert_eq!(store.get_account_by_number(202).await.unwrap().balance, 100);
    }

    #[tokio::test]
    async fn test_send_money_missing_destination_leaves_state() {
        let store = MemoryLedgerStore::new();
        store.create_account(draft(101, 500)).await.unwrap();

        let result = store.send_money(101, 303, Amount::new(10).unwrap()).await;
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(store.get_account_by_number(101).await.unwrap().balance, 500);
    }

    #[tokio::test]
    async fn test_send_money_into_large_balance() {
        let store = MemoryLedgerStore::new();
        store.create_account(draft(101, 500)).await.unwrap();
        store
            .create_account(draft(202, 1_000_000_000_000))
            .await
            .unwrap();

        store
            .send_money(101, 202, Amount::new(1).unwrap())
            .await
            .unwrap();

        assert_eq!(store.get_account_by_number(101).await.unwrap().balance, 499);
        assert_eq!(
            store.get_account_by_number(202).await.unwrap().balance,
            1_000_000_000_001
        );
    }

    #[tokio::test]
    async fn test_negative_opening_balance_rejected() {
        let store = MemoryLedgerStore::new();
        let result = store.create_account(draft(101, -1)).await;
        assert!(matches!(result, Err(LedgerError::InvalidBalance(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_settlements_never_overdraw() {
        let store = std::sync::Arc::new(MemoryLedgerStore::new());
        store.create_account(draft(101, 500)).await.unwrap();
        store.create_account(draft(202, 0)).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.send_money(101, 202, Amount::new(60).unwrap()).await
            }));
        }

        let mut successes = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        // 8 * 60 = 480 fits, a ninth would overdraw
        assert_eq!(successes, 8);
        assert_eq!(store.get_account_by_number(101).await.unwrap().balance, 20);
        assert_eq!(store.get_account_by_number(202).await.unwrap().balance, 480);
    }
}

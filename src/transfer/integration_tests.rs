//! End-to-end transfer tests against the in-process store

#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::store::{LedgerStore, NOT_ENOUGH_FUNDS, account_not_found};
use super::{ListTransferQuery, ListTransferResponse, NewTransfer, TransferRecord};
use super::{TransferConfig, TransferEngine, TransferRequest};
use crate::account::{Account, AccountId, AccountRepository, NewAccount};
use crate::error::BankError;
use crate::store::MemoryStore;

const FIRST_PAGE: ListTransferQuery = ListTransferQuery {
    page_size: 15,
    page: 0,
};

async fn open(store: &MemoryStore, cpf: &str, balance: i64) -> AccountId {
    store
        .add_account(NewAccount {
            name: format!("holder {}", cpf),
            cpf: cpf.to_string(),
            secret_hash: "hash".to_string(),
            balance,
        })
        .await
        .unwrap()
}

fn engine(store: Arc<dyn LedgerStore>) -> TransferEngine {
    TransferEngine::new(store, TransferConfig::default())
}

fn balance(store: &MemoryStore, id: AccountId) -> i64 {
    store.account(id).unwrap().balance
}

/// Delegates to the memory store after a delay in the commit step
struct SlowStore {
    inner: Arc<MemoryStore>,
    delay: Duration,
}

#[async_trait]
impl LedgerStore for SlowStore {
    async fn get_account_balance(&self, id: AccountId) -> Result<i64, BankError> {
        LedgerStore::get_account_balance(&*self.inner, id).await
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, BankError> {
        self.inner.get_account_by_id(id).await
    }

    async fn add_transfer(&self, t: &NewTransfer) -> Result<TransferRecord, BankError> {
        tokio::time::sleep(self.delay).await;
        self.inner.add_transfer(t).await
    }

    async fn get_transfers(
        &self,
        account_id: AccountId,
        query: ListTransferQuery,
    ) -> Result<ListTransferResponse, BankError> {
        self.inner.get_transfers(account_id, query).await
    }
}

/// Yields after the balance read so that concurrent callers all pass the
/// engine's early funds check before any of them commits
struct InterleavingStore {
    inner: Arc<MemoryStore>,
}

#[async_trait]
impl LedgerStore for InterleavingStore {
    async fn get_account_balance(&self, id: AccountId) -> Result<i64, BankError> {
        let balance = LedgerStore::get_account_balance(&*self.inner, id).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        balance
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, BankError> {
        self.inner.get_account_by_id(id).await
    }

    async fn add_transfer(&self, t: &NewTransfer) -> Result<TransferRecord, BankError> {
        self.inner.add_transfer(t).await
    }

    async fn get_transfers(
        &self,
        account_id: AccountId,
        query: ListTransferQuery,
    ) -> Result<ListTransferResponse, BankError> {
        self.inner.get_transfers(account_id, query).await
    }
}

/// Origin row is gone by the time the unit of work locks it
struct VanishingOriginStore {
    inner: Arc<MemoryStore>,
}

#[async_trait]
impl LedgerStore for VanishingOriginStore {
    async fn get_account_balance(&self, id: AccountId) -> Result<i64, BankError> {
        LedgerStore::get_account_balance(&*self.inner, id).await
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, BankError> {
        self.inner.get_account_by_id(id).await
    }

    async fn add_transfer(&self, t: &NewTransfer) -> Result<TransferRecord, BankError> {
        Err(account_not_found(t.origin))
    }

    async fn get_transfers(
        &self,
        account_id: AccountId,
        query: ListTransferQuery,
    ) -> Result<ListTransferResponse, BankError> {
        self.inner.get_transfers(account_id, query).await
    }
}

#[tokio::test]
async fn test_successful_transfer_moves_funds() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 500).await;
    let engine = engine(store.clone());

    engine
        .do_transfer(TransferRequest::new(a, b, 300))
        .await
        .unwrap();

    assert_eq!(balance(&store, a), 700);
    assert_eq!(balance(&store, b), 800);

    let records = store.transfers();
    assert_eq!(records.len(), 1);
    assert_eq!(
        (records[0].origin, records[0].destination, records[0].amount),
        (a, b, 300)
    );
}

#[tokio::test]
async fn test_balance_sum_is_conserved() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 500).await;
    let engine = engine(store.clone());
    let before = balance(&store, a) + balance(&store, b);

    for (from, to, amount) in [(a, b, 250), (b, a, 600), (a, b, 1), (b, a, 149)] {
        engine
            .do_transfer(TransferRequest::new(from, to, amount))
            .await
            .unwrap();
        assert_eq!(balance(&store, a) + balance(&store, b), before);
    }
    assert_eq!(balance(&store, a), 1498);
    assert_eq!(balance(&store, b), 2);
}

#[tokio::test]
async fn test_insufficient_funds() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 100).await;
    let b = open(&store, "b", 0).await;
    let engine = engine(store.clone());

    let err = engine
        .do_transfer(TransferRequest::new(a, b, 500))
        .await
        .unwrap_err();

    assert_eq!(err, BankError::transfer(NOT_ENOUGH_FUNDS));
    assert_eq!(err.to_string(), "transfer error: not enough funds");
    assert_eq!(balance(&store, a), 100);
    assert_eq!(balance(&store, b), 0);
    assert!(store.transfers().is_empty());
}

#[tokio::test]
async fn test_unknown_destination() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let engine = engine(store.clone());

    let err = engine
        .do_transfer(TransferRequest::new(a, 999_999, 50))
        .await
        .unwrap_err();

    assert!(matches!(err, BankError::TransferRequest(_)));
    assert!(err.to_string().contains("destination account not found"));
    assert_eq!(balance(&store, a), 1000);
    assert!(store.transfers().is_empty());
}

#[tokio::test]
async fn test_unknown_origin() {
    let store = Arc::new(MemoryStore::new());
    let b = open(&store, "b", 0).await;
    let engine = engine(store.clone());

    let err = engine
        .do_transfer(TransferRequest::new(42, b, 50))
        .await
        .unwrap_err();
    assert_eq!(err, BankError::transfer("origin account not found"));
}

#[tokio::test]
async fn test_inactive_destination() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 0).await;
    store.set_active(b, false).unwrap();
    let engine = engine(store.clone());

    let err = engine
        .do_transfer(TransferRequest::new(a, b, 10))
        .await
        .unwrap_err();
    assert_eq!(err, BankError::transfer("destination account is inactive"));
    assert_eq!(balance(&store, a), 1000);
}

#[tokio::test]
async fn test_invalid_amount_never_reaches_store() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine(store.clone());

    for amount in [0, -300] {
        let err = engine
            .do_transfer(TransferRequest::new(1, 2, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, BankError::Argument(_)));
    }
    let err = engine
        .do_transfer(TransferRequest::new(1, 1, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, BankError::Argument(_)));

    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_failed_credit_rolls_back_debit() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 500).await;
    let engine = engine(store.clone());

    store.fail_next_credit();
    let err = engine
        .do_transfer(TransferRequest::new(a, b, 300))
        .await
        .unwrap_err();

    assert!(matches!(err, BankError::Database(_)));
    assert_eq!(balance(&store, a), 1000);
    assert_eq!(balance(&store, b), 500);
    assert!(store.transfers().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_never_overdraw() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 400).await;
    let b = open(&store, "b", 0).await;
    let engine = Arc::new(engine(Arc::new(InterleavingStore {
        inner: store.clone(),
    })));

    let (e1, e2) = (engine.clone(), engine.clone());
    let (r1, r2) = tokio::join!(
        tokio::spawn(async move { e1.do_transfer(TransferRequest::new(a, b, 400)).await }),
        tokio::spawn(async move { e2.do_transfer(TransferRequest::new(a, b, 400)).await }),
    );
    let results = [r1.unwrap(), r2.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| r == &Err(BankError::transfer(NOT_ENOUGH_FUNDS)))
    );
    assert_eq!(balance(&store, a), 0);
    assert_eq!(balance(&store, b), 400);
    assert_eq!(store.transfers().len(), 1);
}

#[tokio::test]
async fn test_many_concurrent_transfers_stay_non_negative() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 0).await;
    let engine = Arc::new(engine(store.clone()));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.do_transfer(TransferRequest::new(a, b, 75)).await })
        })
        .collect();

    let mut succeeded = 0;
    for h in handles {
        if h.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 13);
    assert_eq!(balance(&store, a), 1000 - 13 * 75);
    assert_eq!(balance(&store, a) + balance(&store, b), 1000);
}

#[tokio::test]
async fn test_deadline_abandons_commit_without_effect() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 500).await;
    let engine = TransferEngine::new(
        Arc::new(SlowStore {
            inner: store.clone(),
            delay: Duration::from_millis(500),
        }),
        TransferConfig {
            request_timeout: Duration::from_millis(50),
        },
    );

    let err = engine
        .do_transfer(TransferRequest::new(a, b, 300))
        .await
        .unwrap_err();

    assert_eq!(err, BankError::Timeout);
    assert_eq!(err.to_string(), "request timeout");
    // Outlive the abandoned commit to prove it never lands
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(balance(&store, a), 1000);
    assert_eq!(balance(&store, b), 500);
    assert!(store.transfers().is_empty());
}

#[tokio::test]
async fn test_explicit_deadline_in_the_past() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 0).await;
    let engine = engine(Arc::new(SlowStore {
        inner: store.clone(),
        delay: Duration::from_millis(10),
    }));

    let err = engine
        .do_transfer_until(tokio::time::Instant::now(), TransferRequest::new(a, b, 1))
        .await
        .unwrap_err();
    assert_eq!(err, BankError::Timeout);
    assert_eq!(balance(&store, a), 1000);
}

#[tokio::test]
async fn test_history_lists_both_directions() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 1000).await;
    let c = open(&store, "c", 1000).await;
    let engine = engine(store.clone());

    engine.do_transfer(TransferRequest::new(a, b, 10)).await.unwrap();
    engine.do_transfer(TransferRequest::new(b, a, 20)).await.unwrap();
    engine.do_transfer(TransferRequest::new(b, c, 30)).await.unwrap();

    let page = engine.get_transfers(a, FIRST_PAGE).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.page, 1);
    let amounts: Vec<u64> = page.data.iter().map(|v| v.amount).collect();
    assert_eq!(amounts, vec![10, 20]);
    assert_eq!(page.data[1].origin_name, "holder b");
    assert_eq!(page.data[1].destination_cpf, "a");

    let page = engine.get_transfers(c, FIRST_PAGE).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_history_paging() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 0).await;
    let engine = engine(store.clone());

    for amount in 1..=5 {
        engine
            .do_transfer(TransferRequest::new(a, b, amount))
            .await
            .unwrap();
    }

    let query = ListTransferQuery {
        page_size: 2,
        page: 2,
    };
    let page = engine.get_transfers(a, query).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.page, 3);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].amount, 5);
}

#[tokio::test]
async fn test_history_read_is_repeatable() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 0).await;
    let engine = engine(store.clone());
    engine.do_transfer(TransferRequest::new(a, b, 5)).await.unwrap();

    let first = engine.get_transfers(a, FIRST_PAGE).await.unwrap();
    let second = engine.get_transfers(a, FIRST_PAGE).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_history_rejects_bad_paging() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine(store.clone());

    let err = engine
        .get_transfers(
            1,
            ListTransferQuery {
                page_size: 0,
                page: -1,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, BankError::argument("pageSize, page"));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_origin_vanishing_before_commit() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let b = open(&store, "b", 0).await;
    let engine = engine(Arc::new(VanishingOriginStore {
        inner: store.clone(),
    }));

    let err = engine
        .do_transfer(TransferRequest::new(a, b, 10))
        .await
        .unwrap_err();
    assert_eq!(err, BankError::transfer("origin account not found"));
    assert_eq!(balance(&store, b), 0);
}

#[tokio::test]
async fn test_history_rejects_page_beyond_offset_range() {
    let store = Arc::new(MemoryStore::new());
    let a = open(&store, "a", 1000).await;
    let engine = engine(store.clone());
    let calls = store.call_count();

    let err = engine
        .get_transfers(
            a,
            ListTransferQuery {
                page_size: 100,
                page: i64::MAX - 1,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, BankError::argument("page"));
    assert_eq!(store.call_count(), calls);
}

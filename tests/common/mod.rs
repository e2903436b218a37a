//! Shared test doubles: an in-memory ledger store and stub downstream
//! clients, so the orchestrator can be driven without Postgres or a
//! network.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use debit_booking_service::breaker::{CircuitBreaker, CircuitBreakerConfig};
use debit_booking_service::clients::account::AccountResolver;
use debit_booking_service::clients::balance::BalanceNotifier;
use debit_booking_service::clients::fees::FeeProvider;
use debit_booking_service::error::AppError;
use debit_booking_service::models::account::Account;
use debit_booking_service::models::fee::{Fee, Script};
use debit_booking_service::models::statement::{AccountStatement, AccountStatementFee};
use debit_booking_service::services::debit_service::DebitService;
use debit_booking_service::store::{LedgerStore, LedgerTx};

#[derive(Default)]
struct LedgerData {
    statements: Vec<AccountStatement>,
    fees: Vec<AccountStatementFee>,
    next_statement_id: i32,
    next_fee_id: i32,
}

/// In-memory ledger store. Writes are staged per transaction and only
/// land in the shared vectors on commit, mirroring the Postgres store's
/// visibility rules.
#[derive(Default)]
pub struct InMemoryLedger {
    data: Arc<Mutex<LedgerData>>,
    pub begin_calls: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Committed debit rows, insertion order.
    pub fn statements(&self) -> Vec<AccountStatement> {
        self.data.lock().unwrap().statements.clone()
    }

    /// Committed fee rows, insertion order.
    pub fn fees(&self) -> Vec<AccountStatementFee> {
        self.data.lock().unwrap().fees.clone()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, AppError> {
        self.begin_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryTx {
            data: Arc::clone(&self.data),
            staged_statements: Vec::new(),
            staged_fees: Vec::new(),
        }))
    }

    async fn list_debits(
        &self,
        account_key: i32,
        type_charge: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AccountStatement>, AppError> {
        let data = self.data.lock().unwrap();
        let mut rows: Vec<AccountStatement> = data
            .statements
            .iter()
            .filter(|s| s.fk_account_id == account_key && s.type_charge == type_charge)
            .filter(|s| match since {
                Some(since) => s.charged_at.is_some_and(|at| at >= since),
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.charged_at.cmp(&a.charged_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

struct InMemoryTx {
    data: Arc<Mutex<LedgerData>>,
    staged_statements: Vec<AccountStatement>,
    staged_fees: Vec<AccountStatementFee>,
}

#[async_trait]
impl LedgerTx for InMemoryTx {
    async fn insert_debit(
        &mut self,
        mut statement: AccountStatement,
    ) -> Result<AccountStatement, AppError> {
        let mut data = self.data.lock().unwrap();
        data.next_statement_id += 1;
        statement.id = Some(data.next_statement_id);
        statement.charged_at = Some(Utc::now());
        drop(data);

        self.staged_statements.push(statement.clone());
        Ok(statement)
    }

    async fn insert_fee(
        &mut self,
        mut fee: AccountStatementFee,
    ) -> Result<AccountStatementFee, AppError> {
        let mut data = self.data.lock().unwrap();
        data.next_fee_id += 1;
        fee.id = Some(data.next_fee_id);
        fee.charged_at = Some(Utc::now());
        drop(data);

        self.staged_fees.push(fee.clone());
        Ok(fee)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let mut data = self.data.lock().unwrap();
        // obs never persists; strip it the way a column list would
        let committed = self.staged_statements.into_iter().map(|mut s| {
            s.obs = None;
            s
        });
        data.statements.extend(committed);
        data.fees.extend(self.staged_fees);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        // Staged rows are simply discarded
        Ok(())
    }
}

/// Stub account resolver returning a fixed internal key.
pub struct StubResolver {
    key: i32,
    fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl StubResolver {
    pub fn new(key: i32) -> Arc<Self> {
        Arc::new(Self {
            key,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    /// Make every subsequent resolve fail with `NotFound`.
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountResolver for StubResolver {
    async fn resolve(&self, account_id: &str) -> Result<Account, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::NotFound);
        }
        Ok(Account {
            id: self.key,
            account_id: account_id.to_string(),
        })
    }
}

/// Stub balance notifier recording every delivered debit.
#[derive(Default)]
pub struct StubNotifier {
    fail: AtomicBool,
    pub calls: AtomicUsize,
    pub delivered: Mutex<Vec<AccountStatement>>,
}

impl StubNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent notification fail with `Server`.
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BalanceNotifier for StubNotifier {
    async fn notify_debit(&self, debit: &AccountStatement) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Server);
        }
        self.delivered.lock().unwrap().push(debit.clone());
        Ok(())
    }
}

/// Stub fee provider. The script and the per-key fee definitions are
/// configured by each test; a missing definition fails the fetch, which
/// is how fee-service outages are simulated.
#[derive(Default)]
pub struct StubFees {
    script: Mutex<Option<Script>>,
    definitions: Mutex<HashMap<String, Fee>>,
    fail_script: AtomicBool,
    pub script_calls: AtomicUsize,
    pub fee_calls: AtomicUsize,
}

impl StubFees {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_script(&self, keys: &[&str]) {
        *self.script.lock().unwrap() = Some(Script {
            name: "script.debit".to_string(),
            description: String::new(),
            fee: keys.iter().map(|k| k.to_string()).collect(),
        });
    }

    pub fn set_fee(&self, key: &str, name: &str, value: Decimal) {
        self.definitions
            .lock()
            .unwrap()
            .insert(key.to_string(), Fee {
                name: name.to_string(),
                value,
            });
    }

    /// Make the script fetch itself fail with `Server`.
    pub fn fail_script(&self) {
        self.fail_script.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FeeProvider for StubFees {
    async fn fetch_script(&self, _script_key: &str) -> Result<Script, AppError> {
        self.script_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_script.load(Ordering::SeqCst) {
            return Err(AppError::Server);
        }
        self.script
            .lock()
            .unwrap()
            .clone()
            .ok_or(AppError::NotFound)
    }

    async fn fetch_fee(&self, fee_key: &str) -> Result<Fee, AppError> {
        self.fee_calls.fetch_add(1, Ordering::SeqCst);
        self.definitions
            .lock()
            .unwrap()
            .get(fee_key)
            .cloned()
            .ok_or(AppError::Server)
    }
}

/// A fully wired debit service over the in-memory doubles.
pub struct TestHarness {
    pub ledger: Arc<InMemoryLedger>,
    pub resolver: Arc<StubResolver>,
    pub notifier: Arc<StubNotifier>,
    pub fees: Arc<StubFees>,
    pub breaker: Arc<CircuitBreaker>,
    pub service: DebitService,
}

impl TestHarness {
    /// Resolver returns internal key 7; the script is empty (no fees)
    /// until a test configures one; the breaker will not trip unless a
    /// test uses a low threshold via [`TestHarness::with_breaker`].
    pub fn new() -> Self {
        Self::with_breaker(CircuitBreakerConfig {
            failure_threshold: 100,
            cooldown: Duration::from_secs(600),
        })
    }

    pub fn with_breaker(config: CircuitBreakerConfig) -> Self {
        let ledger = InMemoryLedger::new();
        let resolver = StubResolver::new(7);
        let notifier = StubNotifier::new();
        let fees = StubFees::new();
        fees.set_script(&[]);
        let breaker = Arc::new(CircuitBreaker::new(config));

        let service = DebitService::new(
            Arc::clone(&ledger) as Arc<dyn LedgerStore>,
            Arc::clone(&resolver) as Arc<dyn AccountResolver>,
            Arc::clone(&notifier) as Arc<dyn BalanceNotifier>,
            Arc::clone(&fees) as Arc<dyn FeeProvider>,
            Arc::clone(&breaker),
        );

        Self {
            ledger,
            resolver,
            notifier,
            fees,
            breaker,
            service,
        }
    }
}

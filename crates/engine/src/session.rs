//! Explicit user session: one user, one store, one analytics engine.
//!
//! Writes go through the store's write lock; reads clone what they need under
//! the read lock and release it before any aggregation runs.

use std::{
    fmt,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use uuid::Uuid;

use crate::{
    AnalysisResult, AnalyticsEngine, BucketPolicy, ChartType, DateRange, EngineError,
    Granularity, ResultEngine, Transaction, TransactionFilter, TransactionInput,
    TransactionStore, TransactionUpdate,
};

/// The password is opaque to the engine and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    password: String,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> ResultEngine<Self> {
        let username = username.into().trim().to_string();
        if username.is_empty() {
            return Err(EngineError::Validation(
                "username must not be empty".to_string(),
            ));
        }
        Ok(Self {
            username,
            password: password.into(),
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A [`TransactionStore`] shareable across views of the same session.
#[derive(Clone, Debug, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<TransactionStore>>,
}

impl SharedStore {
    pub fn new(store: TransactionStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    fn read(&self) -> ResultEngine<RwLockReadGuard<'_, TransactionStore>> {
        self.inner
            .read()
            .map_err(|err| EngineError::Poisoned(err.to_string()))
    }

    fn write(&self) -> ResultEngine<RwLockWriteGuard<'_, TransactionStore>> {
        self.inner
            .write()
            .map_err(|err| EngineError::Poisoned(err.to_string()))
    }

    pub fn add(&self, tx: Transaction) -> ResultEngine<Uuid> {
        Ok(self.write()?.add(tx))
    }

    pub fn add_input(&self, input: TransactionInput) -> ResultEngine<Uuid> {
        // Validate before taking the lock.
        let tx = Transaction::try_from(input)?;
        self.add(tx)
    }

    pub fn remove(&self, id: Uuid) -> ResultEngine<Transaction> {
        self.write()?.remove(id)
    }

    pub fn update(&self, id: Uuid, update: TransactionUpdate) -> ResultEngine<Transaction> {
        self.write()?.update(id, update).cloned()
    }

    pub fn get(&self, id: Uuid) -> ResultEngine<Transaction> {
        self.read()?.get(id).cloned()
    }

    pub fn len(&self) -> ResultEngine<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> ResultEngine<bool> {
        Ok(self.read()?.is_empty())
    }

    pub fn query(&self, range: DateRange) -> ResultEngine<Vec<Transaction>> {
        Ok(self.read()?.query(range.start, range.end))
    }

    pub fn query_filtered(&self, filter: &TransactionFilter) -> ResultEngine<Vec<Transaction>> {
        Ok(self.read()?.query_filtered(filter))
    }

    pub fn categories(&self) -> ResultEngine<Vec<String>> {
        Ok(self.read()?.categories())
    }

    /// Clones the whole store.
    pub fn snapshot(&self) -> ResultEngine<TransactionStore> {
        Ok(self.read()?.clone())
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    user: User,
    store: SharedStore,
    engine: AnalyticsEngine,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self::with_policy(user, BucketPolicy::default())
    }

    pub fn with_policy(user: User, policy: BucketPolicy) -> Self {
        tracing::info!(username = %user.username, "session started");
        Self {
            user,
            store: SharedStore::default(),
            engine: AnalyticsEngine::new(policy),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Loads boundary records, returning the ids added and the rejected rows.
    ///
    /// Rejected rows are reported with their zero-based position.
    pub fn load(
        &self,
        inputs: impl IntoIterator<Item = TransactionInput>,
    ) -> ResultEngine<(Vec<Uuid>, Vec<(usize, EngineError)>)> {
        let mut added = Vec::new();
        let mut rejected = Vec::new();
        for (row, input) in inputs.into_iter().enumerate() {
            match self.store.add_input(input) {
                Ok(id) => added.push(id),
                Err(err @ EngineError::Validation(_)) => {
                    tracing::warn!(row, "skipping transaction: {err}");
                    rejected.push((row, err));
                }
                Err(err) => return Err(err),
            }
        }
        tracing::info!(
            username = %self.user.username,
            added = added.len(),
            rejected = rejected.len(),
            "transactions loaded"
        );
        Ok((added, rejected))
    }

    /// Analyzes a snapshot taken under the read lock.
    pub fn analyze(
        &self,
        range: DateRange,
        chart_type: ChartType,
        granularity: Option<Granularity>,
    ) -> ResultEngine<AnalysisResult> {
        let snapshot = self.store.query(range)?;
        self.engine
            .summarize(&snapshot, range, chart_type, granularity)
    }
}

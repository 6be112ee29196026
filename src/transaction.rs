//! Server-side transactions
//!
//! A transaction scopes a sequence of operations so they become visible
//! atomically on commit, or not at all on rollback. The server hands out
//! a transaction URI; while it is active every call on the connection is
//! rewritten into that namespace (see the transport layer). One
//! transaction may be active per connection at a time.

use std::future::Future;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::{FcrepoError, FcrepoResult};
use crate::repo::{path_concat, Method, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Active,
    Committed,
    RolledBack,
    Failed,
}

/// An open server-side transaction
///
/// Obtained from [`Repository::begin_transaction`]. `commit` and
/// `rollback` consume the handle, so a finished transaction cannot be
/// used again; dropping an active handle clears the connection's
/// transaction slot but cannot roll back on the server.
#[derive(Debug)]
pub struct Transaction<'a> {
    repo: &'a Repository,
    uri: String,
    state: TxState,
}

impl Repository {
    /// Start a transaction.
    ///
    /// Fails if one is already active on this connection: transactions do
    /// not nest.
    pub async fn begin_transaction(&self) -> FcrepoResult<Transaction<'_>> {
        if let Some(active) = self.active_transaction() {
            return Err(FcrepoError::Transaction {
                uri: active,
                op: "begin",
                status: None,
                reason: "a transaction is already active on this connection".to_string(),
            });
        }
        let endpoint = self.path_to_uri("fcr:tx");
        let response = self
            .api(&endpoint, Method::Post, HeaderMap::new(), None)
            .await?;
        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(FcrepoError::Transaction {
                uri: endpoint,
                op: "begin",
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unrecognized status")
                    .to_string(),
            });
        }
        let uri = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| FcrepoError::Transaction {
                uri: endpoint,
                op: "begin",
                status: Some(status.as_u16()),
                reason: "created response carried no transaction Location".to_string(),
            })?;
        debug!(uri = %uri, "transaction started");
        self.set_active_transaction(Some(uri.clone()));
        Ok(Transaction {
            repo: self,
            uri,
            state: TxState::Active,
        })
    }

    /// Run a block of operations inside a transaction.
    ///
    /// Commits when the body succeeds; rolls back and re-raises the body's
    /// error when it fails. The original error always wins over a
    /// secondary rollback failure, which is only logged.
    pub async fn with_transaction<T, F, Fut>(&self, body: F) -> FcrepoResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FcrepoResult<T>>,
    {
        let tx = self.begin_transaction().await?;
        match body().await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "rolling back after error");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback itself failed");
                }
                Err(err)
            }
        }
    }
}

impl Transaction<'_> {
    /// The transaction's URI namespace.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Refresh the transaction's server-side timeout.
    pub async fn keep_alive(&self) -> FcrepoResult<()> {
        let uri = path_concat(&self.uri, "fcr:tx");
        self.tx_post(uri, "keep-alive").await
    }

    /// Commit: everything done inside the scope becomes visible.
    pub async fn commit(mut self) -> FcrepoResult<()> {
        let uri = path_concat(&path_concat(&self.uri, "fcr:tx"), "fcr:commit");
        let result = self.tx_post(uri, "commit").await;
        self.finish(result.is_ok(), TxState::Committed);
        result
    }

    /// Roll back: nothing done inside the scope survives.
    pub async fn rollback(mut self) -> FcrepoResult<()> {
        let uri = path_concat(&path_concat(&self.uri, "fcr:tx"), "fcr:rollback");
        let result = self.tx_post(uri, "rollback").await;
        self.finish(result.is_ok(), TxState::RolledBack);
        result
    }

    async fn tx_post(&self, uri: String, op: &'static str) -> FcrepoResult<()> {
        let response = self
            .repo
            .api(&uri, Method::Post, HeaderMap::new(), None)
            .await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            debug!(uri = %uri, op = %op, "transaction operation succeeded");
            Ok(())
        } else {
            Err(FcrepoError::Transaction {
                uri,
                op,
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unrecognized status")
                    .to_string(),
            })
        }
    }

    // The connection's transaction slot is cleared regardless of outcome
    // so later calls are not scoped to a dead transaction.
    fn finish(&mut self, ok: bool, on_success: TxState) {
        self.repo.set_active_transaction(None);
        self.state = if ok { on_success } else { TxState::Failed };
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.state == TxState::Active {
            warn!(uri = %self.uri, "transaction dropped without commit or rollback");
            self.repo.set_active_transaction(None);
        }
    }
}

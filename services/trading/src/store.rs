//! Store contracts
//!
//! The engine talks to two stores through these traits and never to a
//! concrete backend. The durable store is the system of record for session
//! rows and must provide row-exclusive read-for-update scoped to active
//! sessions. The volatile store is a TTL-bounded key-value cache holding the
//! larger, rebuildable payloads (holdings ledger, week data).

use async_trait::async_trait;
use std::time::Duration;
use types::errors::GameResult;
use types::session::Session;
use types::status::SessionStatus;
use types::token::SessionToken;

/// TTL applied to every volatile write; the session's effective trading
/// lifetime. There is no active sweeper: expiry is observed on the next read.
pub const VOLATILE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Key-value cache with per-key TTL
#[async_trait]
pub trait VolatileStore: Send + Sync {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> GameResult<()>;

    /// `None` on miss, including TTL expiry
    async fn get(&self, key: &str) -> GameResult<Option<Vec<u8>>>;

    async fn delete(&self, key: &str) -> GameResult<()>;
}

/// Durable session row store
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Insert a fresh session row; the id must be unused
    async fn insert(&self, session: &Session) -> GameResult<()>;

    /// Plain read of a session row; `NotFound` if absent
    async fn find(&self, id: &SessionToken) -> GameResult<Session>;

    /// Status upsert, used to demote sessions to `Expired` outside a
    /// coordinated transaction. Scoped to active sessions: a terminal row is
    /// left untouched, so a racing demotion cannot overwrite `Finished`.
    async fn set_status(&self, id: &SessionToken, status: SessionStatus) -> GameResult<()>;

    /// Resolve a crafting run: flips `Starting` to `Week1` on success or
    /// `Expired` on failure. Fails `NotFound` when the session is not in
    /// `Starting` (already crafted, or never existed).
    async fn complete_crafting(&self, id: &SessionToken, success: bool) -> GameResult<()>;

    /// Acquire the row-exclusive lock and return the locked unit of work.
    ///
    /// Scoped to active sessions: `NotFound` if the row is absent,
    /// `NotAvailable` if it is terminal. Two concurrent `begin`s on the same
    /// session serialize; different sessions never contend.
    async fn begin(&self, id: &SessionToken) -> GameResult<Box<dyn DurableTx>>;

    /// Finished sessions ordered by cash descending (stable), paginated
    async fn leaderboard(&self, page: usize, page_size: usize) -> GameResult<Vec<Session>>;
}

/// An open, row-locked unit of work on one session
///
/// Exactly one of `commit`/`rollback` finalizes it; dropping an open
/// transaction releases the lock and discards staged writes.
#[async_trait]
pub trait DurableTx: Send {
    /// The locked snapshot read at `begin`
    fn session(&self) -> &Session;

    /// Stage the full session row for the commit
    async fn save(&mut self, session: &Session) -> GameResult<()>;

    async fn commit(self: Box<Self>) -> GameResult<()>;

    async fn rollback(self: Box<Self>) -> GameResult<()>;
}

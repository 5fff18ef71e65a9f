//! Shared connection handle to the document store.
//!
//! The server keeps exactly one [`Storage`] per process. It is dialed lazily
//! on first use and then reused by every request. At most one dial is in
//! flight at a time: callers that arrive while a dial is running await that
//! same attempt and share its outcome. A failed dial empties the slot, so the
//! next caller starts a fresh attempt.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, OnceLock, PoisonError};
use tokio::sync::Mutex;

use super::Storage;
use crate::{Error, Result};

/// Environment variable holding the store's connection string.
pub const DATABASE_URL_ENV: &str = "DEVSHELF_DATABASE_URL";

/// Shared handle to an open store.
pub type Handle = Arc<Mutex<Storage>>;

/// Where the document store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// Private in-memory database, gone when the process exits
    Memory,
    /// SQLite database file
    File(PathBuf),
}

impl FromStr for DatabaseUrl {
    type Err = Error;

    /// Accepts `sqlite::memory:`, `:memory:`, `sqlite://<path>` or a bare path.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Config(format!("{} is empty", DATABASE_URL_ENV)));
        }
        if s == ":memory:" || s == "sqlite::memory:" {
            return Ok(Self::Memory);
        }
        let path = s
            .strip_prefix("sqlite://")
            .or_else(|| s.strip_prefix("sqlite:"))
            .unwrap_or(s);
        if path.is_empty() {
            return Err(Error::Config(format!("No database path in '{}'", s)));
        }
        Ok(Self::File(PathBuf::from(path)))
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "sqlite::memory:"),
            Self::File(path) => write!(f, "sqlite://{}", path.display()),
        }
    }
}

/// Outcome of one dial, cloneable so every waiter gets a copy.
type Dial = Shared<BoxFuture<'static, std::result::Result<Handle, String>>>;

enum Slot {
    Empty,
    Dialing { attempt: u64, dial: Dial },
    Ready(Handle),
}

/// Lazily dials the store and hands out the shared handle.
pub struct Connector {
    url: DatabaseUrl,
    slot: StdMutex<Slot>,
    attempts: AtomicU64,
}

static GLOBAL: OnceLock<Arc<Connector>> = OnceLock::new();

impl Connector {
    /// Create a connector that has not dialed yet.
    pub fn new(url: DatabaseUrl) -> Self {
        Self {
            url,
            slot: StdMutex::new(Slot::Empty),
            attempts: AtomicU64::new(0),
        }
    }

    /// Install the process-wide connector.
    ///
    /// The first call wins; later calls return the already-installed
    /// connector, whatever URL they were given.
    pub fn install(url: DatabaseUrl) -> Arc<Connector> {
        GLOBAL.get_or_init(|| Arc::new(Self::new(url))).clone()
    }

    /// The store location this connector dials.
    pub fn url(&self) -> &DatabaseUrl {
        &self.url
    }

    /// Whether a dial has succeeded and the handle is cached.
    pub fn is_connected(&self) -> bool {
        matches!(*self.lock_slot(), Slot::Ready(_))
    }

    /// Number of dial attempts started so far.
    pub fn dial_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Get the shared handle, dialing if nothing is cached or in flight.
    pub async fn handle(&self) -> Result<Handle> {
        let (attempt, dial) = {
            let mut slot = self.lock_slot();
            let in_flight = match &*slot {
                Slot::Ready(handle) => return Ok(handle.clone()),
                Slot::Dialing { attempt, dial } => Some((*attempt, dial.clone())),
                Slot::Empty => None,
            };
            match in_flight {
                Some(pending) => pending,
                None => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let dial = open_handle(self.url.clone()).boxed().shared();
                    *slot = Slot::Dialing {
                        attempt,
                        dial: dial.clone(),
                    };
                    (attempt, dial)
                }
            }
        };

        let outcome = dial.await;

        // Only the attempt that still owns the slot may settle it.
        let mut slot = self.lock_slot();
        if matches!(&*slot, Slot::Dialing { attempt: current, .. } if *current == attempt) {
            *slot = match &outcome {
                Ok(handle) => Slot::Ready(handle.clone()),
                Err(_) => Slot::Empty,
            };
        }
        outcome.map_err(Error::Connect)
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn open_handle(url: DatabaseUrl) -> std::result::Result<Handle, String> {
    let target = url.to_string();
    let opened = tokio::task::spawn_blocking(move || Storage::open(&url))
        .await
        .map_err(|e| format!("dial task failed: {}", e))?;

    match opened {
        Ok(storage) => {
            tracing::info!(database = %target, "connected to document store");
            Ok(Arc::new(Mutex::new(storage)))
        }
        Err(e) => {
            tracing::error!(database = %target, error = %e, "document store connection failed");
            Err(e.to_string())
        }
    }
}

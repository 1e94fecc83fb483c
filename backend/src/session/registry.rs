//! Open import sessions, keyed by id.
//!
//! The HTTP server keeps one registry. Callers never hold the lock across
//! an await: they move the session to `Processing` / `Importing` under the
//! lock, do the slow work outside it, then apply the result under the lock
//! again. A session that was removed in between simply drops the result.
//!
//! Every access touches the session. Sessions left idle longer than the
//! registry's timeout are closed and dropped, on each `open` and on the
//! server's periodic sweep.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::ImportSession;
use crate::config::DEFAULT_SESSION_IDLE_MINUTES;
use crate::error::{SessionError, SessionResult};

struct Entry {
    session: ImportSession,
    touched: DateTime<Utc>,
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_idle_timeout(Duration::minutes(i64::from(DEFAULT_SESSION_IDLE_MINUTES)))
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    fn lock(&self) -> SessionResult<MutexGuard<'_, HashMap<Uuid, Entry>>> {
        self.sessions.lock().map_err(|_| SessionError::LockPoisoned)
    }

    /// Open a session for a wedding on the upload step.
    pub fn open(&self, wedding_id: &str) -> SessionResult<Uuid> {
        let now = Utc::now();
        let session = ImportSession::new(wedding_id);
        let id = session.id();

        let mut sessions = self.lock()?;
        evict(&mut sessions, now, self.idle_timeout);
        sessions.insert(
            id,
            Entry {
                session,
                touched: now,
            },
        );
        Ok(id)
    }

    /// Run `f` on a session. A session that ends up closed is dropped from
    /// the registry.
    pub fn with_session<R, F>(&self, id: Uuid, f: F) -> SessionResult<R>
    where
        F: FnOnce(&mut ImportSession) -> R,
    {
        let mut sessions = self.lock()?;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        entry.touched = Utc::now();
        let result = f(&mut entry.session);
        if entry.session.is_closed() {
            sessions.remove(&id);
        }
        Ok(result)
    }

    /// Close and forget a session.
    pub fn close(&self, id: Uuid) -> SessionResult<()> {
        let mut entry = self
            .lock()?
            .remove(&id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        entry.session.close();
        Ok(())
    }

    /// Close and drop every session idle for longer than the timeout.
    /// Returns how many were dropped.
    pub fn evict_idle(&self) -> SessionResult<usize> {
        self.evict_idle_at(Utc::now())
    }

    /// [`Self::evict_idle`] measured against `now`.
    pub fn evict_idle_at(&self, now: DateTime<Utc>) -> SessionResult<usize> {
        let mut sessions = self.lock()?;
        Ok(evict(&mut sessions, now, self.idle_timeout))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn evict(sessions: &mut HashMap<Uuid, Entry>, now: DateTime<Utc>, idle_timeout: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, entry| {
        let keep = now - entry.touched < idle_timeout;
        if !keep {
            entry.session.close();
        }
        keep
    });
    before - sessions.len()
}

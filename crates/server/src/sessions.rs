//! In-process quote wizard sessions.
//!
//! Each session sits behind its own mutex, so events on one session apply one
//! at a time while other sessions proceed. Idle sessions are evicted whenever a
//! new one is created and by the background sweep.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use jesprec_core::wizard::{Phase, QuoteWizard};
use tokio::{
    sync::{Mutex, OwnedMutexGuard, RwLock},
    task::JoinHandle,
};
use tracing::debug;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
/// A finished session only needs to outlive the fast-track redirect.
pub const COMPLETED_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTtl {
    pub idle: Duration,
    pub completed: Duration,
}

impl SessionTtl {
    pub fn idle(idle: Duration) -> Self {
        Self { idle, completed: idle.min(COMPLETED_TTL) }
    }
}

impl Default for SessionTtl {
    fn default() -> Self {
        Self::idle(DEFAULT_IDLE_TTL)
    }
}

#[derive(Debug)]
pub struct QuoteSession {
    pub wizard: QuoteWizard,
    touched_at: Instant,
}

impl QuoteSession {
    fn new(wizard: QuoteWizard) -> Self {
        Self { wizard, touched_at: Instant::now() }
    }

    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }

    fn expired(&self, ttl: SessionTtl, now: Instant) -> bool {
        let limit = match self.wizard.phase() {
            Phase::Success => ttl.completed,
            _ => ttl.idle,
        };
        now.saturating_duration_since(self.touched_at) >= limit
    }
}

type SessionMap = HashMap<String, Arc<Mutex<QuoteSession>>>;

#[derive(Debug, Default)]
pub struct QuoteSessionStore {
    sessions: RwLock<SessionMap>,
    ttl: SessionTtl,
}

impl QuoteSessionStore {
    pub fn new(ttl: SessionTtl) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), ttl }
    }

    pub async fn create(&self, session_id: String, wizard: QuoteWizard) {
        let mut sessions = self.sessions.write().await;
        let evicted = evict(&mut sessions, self.ttl, Instant::now());
        if evicted > 0 {
            debug!(event_name = "quote.session.evicted", evicted, "idle quote sessions dropped");
        }
        sessions.insert(session_id, Arc::new(Mutex::new(QuoteSession::new(wizard))));
    }

    /// Waits for exclusive use of one session. The map lock is released before
    /// waiting, and an expired session reads as missing.
    pub async fn lock(&self, session_id: &str) -> Option<OwnedMutexGuard<QuoteSession>> {
        let session = self.sessions.read().await.get(session_id).cloned()?;
        let guard = session.lock_owned().await;
        if guard.expired(self.ttl, Instant::now()) {
            drop(guard);
            self.sessions.write().await.remove(session_id);
            return None;
        }
        Some(guard)
    }

    pub async fn evict_expired(&self) -> usize {
        evict(&mut *self.sessions.write().await, self.ttl, Instant::now())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = self.evict_expired().await;
                if evicted > 0 {
                    debug!(
                        event_name = "quote.session.swept",
                        evicted,
                        "idle quote sessions dropped"
                    );
                }
            }
        })
    }
}

/// Sessions currently locked by a request are in use and stay.
fn evict(sessions: &mut SessionMap, ttl: SessionTtl, now: Instant) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| match session.try_lock() {
        Ok(session) => !session.expired(ttl, now),
        Err(_) => true,
    });
    before - sessions.len()
}

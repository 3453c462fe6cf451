use std::sync::Arc;

use jesprec_core::audit::{AuditSink, TracingAuditSink};
use jesprec_gateway::Gateway;

use crate::sessions::{QuoteSessionStore, SessionTtl};

/// Shared across every router; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub whatsapp_number: String,
    pub quote_sessions: Arc<QuoteSessionStore>,
    pub audit: Arc<dyn AuditSink>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, whatsapp_number: impl Into<String>) -> Self {
        Self {
            gateway,
            whatsapp_number: whatsapp_number.into(),
            quote_sessions: Arc::new(QuoteSessionStore::default()),
            audit: Arc::new(TracingAuditSink),
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_session_ttl(mut self, ttl: SessionTtl) -> Self {
        self.quote_sessions = Arc::new(QuoteSessionStore::new(ttl));
        self
    }
}

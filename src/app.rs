//! Application context: the one place that owns storage, configuration,
//! session and notifications. Built once at startup and handed to every
//! screen by reference.

use std::path::Path;

use tokio::sync::broadcast::Receiver;

use crate::config::StockflowConfig;
use crate::error::Result;
use crate::notify::Toasts;
use crate::route::Route;
use crate::session::{self, GuardDecision, Session};
use crate::storage::{FileBackend, LocalStorage, StorageEvent};
use crate::workflow::{InboundDraft, InboundReceipt, OutboundDraft, OutboundReceipt};

pub struct AppContext {
    pub storage: LocalStorage,
    pub config: StockflowConfig,
    pub session: Session,
    pub toasts: Toasts,
    events: Receiver<StorageEvent>,
}

impl AppContext {
    /// Build a context over `storage` and finish the initial session check
    pub fn new(storage: LocalStorage, config: StockflowConfig) -> Result<Self> {
        let events = storage.subscribe();
        let mut session = Session::new(config.credentials.clone());
        session.restore(&storage)?;
        let toasts = Toasts::new(config.toast_duration());
        Ok(Self {
            storage,
            config,
            session,
            toasts,
            events,
        })
    }

    /// Create `.stockflow/` under `root` with a default config file
    pub fn init(root: &Path) -> Result<Self> {
        let backend = FileBackend::init(root)?;
        let config = StockflowConfig::default();
        config.save(backend.dir())?;
        Self::new(LocalStorage::new(backend), config)
    }

    pub fn open(root: &Path) -> Result<Self> {
        let backend = FileBackend::open(root)?;
        let config = StockflowConfig::load(backend.dir())?;
        Self::new(LocalStorage::new(backend), config)
    }

    /// Pick up changes made through other handles. True if the login state changed.
    pub fn sync(&mut self) -> Result<bool> {
        self.session.sync(&self.storage, &mut self.events)
    }

    pub fn guard(&self, route: Route) -> GuardDecision {
        session::guard(&self.session, route)
    }

    pub fn require(&self, route: Route) -> Result<()> {
        session::require(&self.session, route)
    }

    /// Turn an outcome into exactly one notification
    pub fn report<T>(&mut self, result: Result<T>, success: &str) -> Result<T> {
        match &result {
            Ok(_) => self.toasts.success(success),
            Err(e) if e.is_validation() => self.toasts.error(e.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "operation failed");
                self.toasts.error(format!("Could not save: {}. Try again.", e));
            }
        }
        result
    }

    pub fn submit_inbound(&mut self, draft: &mut InboundDraft) -> Result<InboundReceipt> {
        let result = draft.submit(&self.storage, &self.config);
        self.report(result, "Stock-in registered")
    }

    pub fn stage_outbound(&mut self, draft: &mut OutboundDraft, product_id: &str) -> Result<()> {
        let result = draft.stage(product_id).map(|_| ());
        self.report(result, "Product added to stock-out")
    }

    pub fn submit_outbound(&mut self, draft: &mut OutboundDraft) -> Result<OutboundReceipt> {
        let result = draft.submit(&self.storage, &self.config);
        self.report(result, "Stock-out registered")
    }
}

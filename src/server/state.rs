//! Server state shared across handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::builder::Builder;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::library::{JsonFileStore, LibraryStore, TemplateLibrary};
use crate::submit::{HttpLabelService, LabelService, StatusMonitor, Submitter};

/// The builder as the server holds it, over any library backend.
pub type SharedBuilder = Builder<Box<dyn LibraryStore>>;

/// Application state shared across handlers.
///
/// Handlers lock `builder` only for in-memory work; print service calls run
/// on a payload snapshot with the lock released.
pub struct AppState {
    pub config: ServerConfig,
    pub builder: Mutex<SharedBuilder>,
    pub submitter: Submitter,
    pub status: StatusMonitor,
}

impl AppState {
    /// State backed by the configured library file and print service.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let store: Box<dyn LibraryStore> = Box::new(JsonFileStore::new(&config.service.library));
        let library = TemplateLibrary::open(store)?;
        let service = HttpLabelService::new(
            &config.service.service_url,
            config.service.request_timeout(),
        )?;
        Ok(Self::from_parts(config, Builder::new(library), Arc::new(service)))
    }

    /// Assemble state from prepared parts.
    pub fn from_parts(
        config: ServerConfig,
        builder: SharedBuilder,
        service: Arc<dyn LabelService>,
    ) -> Self {
        Self {
            config,
            builder: Mutex::new(builder),
            submitter: Submitter::new(service),
            status: StatusMonitor::new(),
        }
    }
}

use std::sync::Arc;

use snowlink_core::{ReadRepository, Repository, UrlCache};
use snowlink_generator::Generator;
use snowlink_redirector::RedirectorService;
use snowlink_shortener::ShortenerService;

/// Submission flow over backends chosen at start-up.
pub type DynShortener = ShortenerService<dyn Repository, dyn Generator>;

/// Resolution flow over backends chosen at start-up.
pub type DynRedirector = RedirectorService<dyn ReadRepository, dyn UrlCache>;

#[derive(Clone)]
pub struct AppState {
    pub(crate) shortener: Arc<DynShortener>,
    pub(crate) redirector: Arc<DynRedirector>,
}

impl AppState {
    pub fn new(shortener: Arc<DynShortener>, redirector: Arc<DynRedirector>) -> Self {
        Self {
            shortener,
            redirector,
        }
    }
}

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use gitaly_git::{Repository, RepositoryStore};
use gitaly_storage::Locator;

/// Opens the store for a resolved repository directory.
pub type StoreFactory = Arc<dyn Fn(&Path) -> Arc<dyn RepositoryStore> + Send + Sync>;

/// Process-wide collaborators shared by every service handler.
#[derive(Clone)]
pub struct Dependencies {
    locator: Locator,
    store_factory: StoreFactory,
}

impl Dependencies {
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self::default().with_locator(locator)
    }

    #[must_use]
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    #[must_use]
    pub fn with_store_factory(mut self, store_factory: StoreFactory) -> Self {
        self.store_factory = store_factory;
        self
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn open_store(&self, path: &Path) -> Arc<dyn RepositoryStore> {
        (self.store_factory)(path)
    }
}

impl Default for Dependencies {
    fn default() -> Self {
        Self {
            locator: Locator::default(),
            store_factory: Arc::new(|path: &Path| -> Arc<dyn RepositoryStore> {
                Arc::new(Repository::new(path))
            }),
        }
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

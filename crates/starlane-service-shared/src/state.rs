//! Application state for the HTTP services.
//!
//! The state does not cache the starmap. Each request opens its own reader
//! from the shared [`SnapshotSource`], so every route is computed against one
//! consistent snapshot while the database stays free to change between
//! requests.

use std::path::Path;
use std::sync::Arc;

use starlane_lib::{CostConfig, Error as LibError, SnapshotSource, SqliteStore, StarmapStore};

/// Error raised while preparing or using application state.
#[derive(Debug)]
pub enum AppStateError {
    /// Database file not found.
    DatabaseNotFound(String),

    /// The store rejected the read (schema, SQLite or IO failure) or the
    /// request itself was invalid.
    Store(LibError),

    /// The blocking worker running the read panicked or was cancelled.
    Worker(String),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseNotFound(path) => write!(f, "database not found: {}", path),
            Self::Store(e) => write!(f, "{}", e),
            Self::Worker(e) => write!(f, "blocking worker failed: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::Store(err)
    }
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable (an `Arc` internally); share it via axum's `State`
/// extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use starlane_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let count = state
///         .with_reader(|store, _| Ok(store.fetch_visible_systems(None, true)?.len()))
///         .await;
/// }
///
/// let state = AppState::load("starlane.db", Default::default()).unwrap();
/// let app = Router::new().route("/count", get(handler)).with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    source: Box<dyn SnapshotSource>,
    config: CostConfig,
}

impl AppState {
    /// Prepare state backed by the SQLite database at `db_path`.
    ///
    /// Opens one reader up front so a missing file or unsupported schema is
    /// reported at startup instead of on the first request.
    pub fn load(db_path: impl AsRef<Path>, config: CostConfig) -> Result<Self, AppStateError> {
        let db_path = db_path.as_ref();

        if !db_path.exists() {
            return Err(AppStateError::DatabaseNotFound(
                db_path.display().to_string(),
            ));
        }

        tracing::info!(path = %db_path.display(), "opening starmap database");
        let store = SqliteStore::new(db_path);
        let systems = store.open()?.fetch_visible_systems(None, true)?.len();
        tracing::info!(
            systems,
            penalty_factor = %config.penalty_factor,
            slow_effect = %config.slow_effect,
            "starmap database ready"
        );

        Ok(Self::from_source(store, config))
    }

    /// Create state from any snapshot source.
    ///
    /// Useful for tests backed by [`starlane_lib::MemoryStore`].
    pub fn from_source(source: impl SnapshotSource + 'static, config: CostConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                source: Box::new(source),
                config,
            }),
        }
    }

    /// Cost configuration applied to every route.
    pub fn config(&self) -> &CostConfig {
        &self.inner.config
    }

    /// Run `read` against a fresh snapshot on tokio's blocking pool.
    ///
    /// SQLite access and the search itself are synchronous; running them here
    /// keeps the async workers free.
    pub async fn with_reader<F, T>(&self, read: F) -> Result<T, AppStateError>
    where
        F: FnOnce(&dyn StarmapStore, &CostConfig) -> starlane_lib::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let reader = state.inner.source.reader()?;
            read(reader.as_ref(), &state.inner.config)
        })
        .await;

        match joined {
            Ok(result) => result.map_err(AppStateError::from),
            Err(e) => Err(AppStateError::Worker(e.to_string())),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

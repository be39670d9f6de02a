//! Reusable server runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, storage
//! backend, migrations, the REST API and graceful shutdown. The binary is a
//! thin wrapper around it, and integration tests can start one in-process.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::SubscriptionService;
use crate::config::{AppConfig, DatabaseBackend};
use crate::domain::RepositoryProvider;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::redact_url;
use crate::infrastructure::{
    init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider,
};
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// Handle to a running server.
///
/// ```rust,no_run
/// use subscription_ledger::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub service: Arc<SubscriptionService>,
    pub config: AppConfig,
    /// Address actually bound (port 0 in the config picks a free one)
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the service.
    ///
    /// 1. Install the Prometheus recorder (once per process)
    /// 2. Open the configured storage backend and migrate it
    /// 3. Bind and serve the REST API with graceful shutdown
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting subscription ledger...");

        let prometheus = prometheus_handle()?;

        let (repos, db) = open_storage(&app_cfg, opts.auto_migrate).await?;
        let service = Arc::new(
            SubscriptionService::new(repos.clone()).with_query_timeout(app_cfg.query.timeout()),
        );

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let router = create_api_router(ApiState {
            service: service.clone(),
            health: HealthState::new(db.clone()),
            metrics: prometheus,
            shutdown: shutdown_signal.child_token(),
        });

        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            repos,
            service,
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown was triggered, bounded by
    /// `server.shutdown_timeout`, then close the database.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        let drained = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;
        if !drained {
            warn!("In-flight requests abandoned");
        }

        if let Some(db) = db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        }

        info!("Subscription ledger shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down subscription ledger...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// The global recorder can only be installed once per process; restarts
/// within the same process reuse it.
fn prometheus_handle() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

async fn open_storage(
    cfg: &AppConfig,
    auto_migrate: bool,
) -> Result<(Arc<dyn RepositoryProvider>, Option<DatabaseConnection>), Box<dyn std::error::Error>> {
    if cfg.database.backend == DatabaseBackend::Memory {
        warn!("Using in-memory storage; data is lost on restart");
        return Ok((Arc::new(InMemoryRepositoryProvider::new()), None));
    }

    let db_config = DatabaseConfig {
        url: cfg.database.connection_url(),
        max_connections: cfg.database.max_connections,
    };
    info!("Database: {}", redact_url(&db_config.url));

    let db = init_database(&db_config).await?;
    if auto_migrate {
        info!("Running database migrations...");
        Migrator::up(&db, None).await?;
        info!("Migrations completed");
    }

    Ok((Arc::new(SeaOrmRepositoryProvider::new(db.clone())), Some(db)))
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`. Call once at startup,
/// before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseSettings, ServerConfig};

    fn config(backend: DatabaseBackend, path: String) -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 1,
                shutdown_timeout: 5,
            },
            database: DatabaseSettings {
                backend,
                path,
                ..DatabaseSettings::default()
            },
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn memory_backend_needs_no_database() {
        let (repos, db) = open_storage(&config(DatabaseBackend::Memory, String::new()), true)
            .await
            .unwrap();
        assert!(db.is_none());
        assert!(repos
            .subscriptions()
            .list_before("01-2030".parse().unwrap())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn sqlite_backend_is_migrated_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.db").display().to_string();
        let (repos, db) = open_storage(&config(DatabaseBackend::Sqlite, path), true)
            .await
            .unwrap();
        assert!(db.is_some());
        assert!(repos
            .subscriptions()
            .list_before("01-2030".parse().unwrap())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn server_starts_and_stops() {
        let mut cfg = config(DatabaseBackend::Memory, String::new());
        cfg.server.port = 0;

        let handle = ServerHandle::start(ServerOptions {
            config: cfg,
            auto_migrate: true,
        })
        .await
        .unwrap();
        assert!(handle.is_running());
        assert_ne!(handle.local_addr.port(), 0);
        handle.shutdown().await;
    }
}

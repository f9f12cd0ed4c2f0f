use crate::{
    app::AppContext, config::Config, health::health_handler, http::RouteModule,
    middleware::MakeRequestUuid,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tokio::signal;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// The HTTP application: registered route modules, middleware and state
pub struct App {
    router: Router<AppContext>,
    config: Config,
    context: AppContext,
}

impl App {
    pub fn new(config: Config, context: AppContext) -> Self {
        let router = Router::<AppContext>::new().route("/health", get(health_handler));

        Self {
            router,
            config,
            context,
        }
    }

    /// Register a route module with the application
    pub fn register_module<M: RouteModule>(mut self, module: M) -> Self {
        self.router = module.register(self.router);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Final router with middleware and state applied
    ///
    /// Used by `serve` and by tests that drive the app in-process.
    pub fn into_router(self) -> Router {
        let mut router = self.router;

        // Innermost first: body limit, timeout, request id, tracing.
        router = router.layer(DefaultBodyLimit::max(self.config.server.max_body_size));

        if let Some(timeout) = self.config.server.request_timeout() {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        router = router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        router = router.layer(TraceLayer::new_for_http());

        router.with_state(self.context)
    }

    /// Bind and serve until Ctrl-C or SIGTERM, then drain in-flight requests
    pub async fn serve(self) -> Result<(), std::io::Error> {
        let addr = self
            .config
            .server
            .addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("Server starting on http://{}", addr);
        tracing::info!("Health check available at http://{}/health", addr);

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

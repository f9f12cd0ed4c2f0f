use crate::app::AppContext;
use axum::Router;

/// A group of routes mounted into the application together
///
/// # Example
///
/// ```ignore
/// struct TasksModule;
///
/// impl RouteModule for TasksModule {
///     fn routes(&self) -> Router<AppContext> {
///         Router::new().route("/tasks", get(list_tasks))
///     }
///
///     fn prefix(&self) -> Option<&str> {
///         Some("/api/v1")
///     }
/// }
/// ```
pub trait RouteModule {
    /// Routes for this module, still missing the `AppContext` state
    fn routes(&self) -> Router<AppContext>;

    /// Optional path prefix for every route in this module
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Mount this module's routes into `router`
    fn register(&self, router: Router<AppContext>) -> Router<AppContext> {
        let routes = self.routes();

        match self.prefix() {
            Some(prefix) => router.nest(prefix, routes),
            None => router.merge(routes),
        }
    }
}

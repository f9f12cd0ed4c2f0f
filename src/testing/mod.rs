//! Testing utilities: in-process HTTP scenarios and task fixtures
//!
//! # Example
//!
//! ```rust,ignore
//! use task_tracker::testing::{self, TestApp};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn creates_a_task() {
//!     let app = TestApp::new();
//!
//!     testing::post(app.router(), "/api/v1/tasks")
//!         .json_body(&json!({"title": "Write docs"}))
//!         .execute()
//!         .await
//!         .assert_created()
//!         .assert_json_path("status", json!("pending"))
//!         .await;
//! }
//! ```

mod fixtures;
mod scenario;

pub use fixtures::{TestApp, fake};
pub use scenario::{Scenario, ScenarioAssert, delete, get, post, put};

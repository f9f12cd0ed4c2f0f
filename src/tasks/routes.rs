use crate::app::AppContext;
use crate::error::{Result, TrackerError};
use crate::http::{CreatedResponse, NoContentResponse, RouteModule};
use crate::tasks::dto::{
    CreateTaskRequest, ListTasksParams, TaskListResponse, TaskResponse, UpdateTaskRequest,
};
use crate::validation::ValidatedJson;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue},
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

/// Response header reporting whether a read was served from the cache
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache-status");

/// CRUD endpoints under `/api/v1/tasks`
#[derive(Debug, Clone, Copy, Default)]
pub struct TasksModule;

impl RouteModule for TasksModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/tasks", get(list_tasks).post(create_task))
            .route(
                "/tasks/{id}",
                get(get_task).put(update_task).delete(delete_task),
            )
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/v1")
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| TrackerError::bad_request("Invalid task ID"))
}

async fn create_task(
    State(ctx): State<AppContext>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> Result<CreatedResponse<TaskResponse>> {
    let task = ctx.tasks.create(req.into()).await?;
    let location = format!("/api/v1/tasks/{}", task.id);

    Ok(CreatedResponse::new(TaskResponse::from(task), location))
}

async fn get_task(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let fetched = ctx.tasks.get(id).await?;

    Ok((
        [(
            CACHE_STATUS_HEADER,
            HeaderValue::from_static(fetched.status.as_str()),
        )],
        Json(TaskResponse::from(fetched.value)),
    ))
}

async fn list_tasks(
    State(ctx): State<AppContext>,
    Query(params): Query<ListTasksParams>,
) -> Result<impl IntoResponse> {
    let query = params.into_query()?;
    let page = ctx.tasks.list(&query).await?;

    Ok((
        [(
            CACHE_STATUS_HEADER,
            HeaderValue::from_static(page.cache_status.as_str()),
        )],
        Json(TaskListResponse::from(page)),
    ))
}

async fn update_task(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>> {
    let id = parse_id(&id)?;
    let task = ctx.tasks.update(id, req.into()).await?;

    Ok(Json(TaskResponse::from(task)))
}

async fn delete_task(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    let id = parse_id(&id)?;
    ctx.tasks.delete(id).await?;

    Ok(NoContentResponse)
}

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ClassResponse, CreateClassRequest, EnrollRequest},
    services,
};
use crate::{
    auth::{
        dto::{present, MessageResponse},
        CurrentStudent, CurrentTeacher,
    },
    error::AppError,
    state::AppState,
    store::Class,
};

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/student/classes", get(available_classes))
        .route("/student/enroll", post(enroll))
        .route("/student/my-classes", get(my_classes))
}

pub fn teacher_routes() -> Router<AppState> {
    Router::new().route("/teacher/classes", get(teacher_classes).post(create_class))
}

fn render(classes: Vec<Class>) -> Json<Vec<ClassResponse>> {
    Json(classes.into_iter().map(ClassResponse::from).collect())
}

#[instrument(skip(state, student), fields(username = %student.username))]
pub async fn available_classes(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Result<Json<Vec<ClassResponse>>, AppError> {
    let classes = services::list_available_classes(state.store.as_ref(), &student).await?;
    Ok(render(classes))
}

#[instrument(skip(state, student, payload), fields(username = %student.username))]
pub async fn enroll(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    payload: Result<Json<EnrollRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(body) = payload?;
    services::enroll(state.store.as_ref(), &student, body.class_id).await?;
    Ok(Json(MessageResponse {
        message: "Enrolled in class successfully",
    }))
}

#[instrument(skip(state, student), fields(username = %student.username))]
pub async fn my_classes(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Result<Json<Vec<ClassResponse>>, AppError> {
    let classes = services::my_classes(state.store.as_ref(), &student).await?;
    Ok(render(classes))
}

#[instrument(skip(state, teacher), fields(username = %teacher.username))]
pub async fn teacher_classes(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
) -> Result<Json<Vec<ClassResponse>>, AppError> {
    let classes = services::teacher_classes(state.store.as_ref(), &teacher).await?;
    Ok(render(classes))
}

#[instrument(skip(state, teacher, payload), fields(username = %teacher.username))]
pub async fn create_class(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    payload: Result<Json<CreateClassRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(body) = payload?;
    services::create_class(state.store.as_ref(), &teacher, present(&body.name)).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Class created successfully",
        }),
    ))
}

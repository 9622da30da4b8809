use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use campus_core::{CreateLectureInput, EntityKind, Lecture, LectureId, LectureService, StudentId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TitleQuery {
    title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RetitleBody {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentToAddQuery {
    student_to_add_id: StudentId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentQuery {
    student_id: StudentId,
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/lectures", post(create).get(list))
        .route("/lectures/sorted", get(list_sorted))
        .route("/lectures/lookup", get(lookup))
        .route("/lectures/:id", get(fetch).put(retitle).delete(remove))
        .route(
            "/lectures/:id/students",
            post(add_student).delete(remove_student),
        )
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateLectureInput>,
) -> ApiResult<(StatusCode, Json<Lecture>)> {
    let lecture = state
        .with_store(move |store| LectureService::new(store).create_lecture(input))
        .await?;
    Ok((StatusCode::CREATED, Json(lecture)))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Lecture>>> {
    let lectures = state
        .with_store(|store| LectureService::new(store).list_lectures())
        .await?;
    Ok(Json(lectures))
}

/// Lectures in ascending order of enrolled students.
async fn list_sorted(State(state): State<AppState>) -> ApiResult<Json<Vec<Lecture>>> {
    let lectures = state
        .with_store(|store| LectureService::new(store).list_lectures_sorted_by_student_count())
        .await?;
    Ok(Json(lectures))
}

async fn lookup(
    State(state): State<AppState>,
    Query(TitleQuery { title }): Query<TitleQuery>,
) -> ApiResult<Json<Lecture>> {
    let label = title.clone();
    state
        .with_store(move |store| LectureService::new(store).find_lecture_by_title(&title))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found_by_label(EntityKind::Lecture, &label))
}

async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<LectureId>,
) -> ApiResult<Json<Lecture>> {
    state
        .with_store(move |store| LectureService::new(store).get_lecture(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(EntityKind::Lecture, id))
}

async fn retitle(
    State(state): State<AppState>,
    Path(id): Path<LectureId>,
    Json(body): Json<RetitleBody>,
) -> ApiResult<Json<Lecture>> {
    let lecture = state
        .with_store(move |store| LectureService::new(store).rename_lecture(id, &body.title))
        .await?;
    Ok(Json(lecture))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<LectureId>,
) -> ApiResult<Json<Lecture>> {
    let lecture = state
        .with_store(move |store| LectureService::new(store).delete_lecture(id))
        .await?;
    Ok(Json(lecture))
}

async fn add_student(
    State(state): State<AppState>,
    Path(id): Path<LectureId>,
    Query(query): Query<StudentToAddQuery>,
) -> ApiResult<Json<Lecture>> {
    let lecture = state
        .with_store(move |store| {
            LectureService::new(store).add_student_to_lecture(id, query.student_to_add_id)
        })
        .await?;
    Ok(Json(lecture))
}

async fn remove_student(
    State(state): State<AppState>,
    Path(id): Path<LectureId>,
    Query(query): Query<StudentQuery>,
) -> ApiResult<Json<Lecture>> {
    let lecture = state
        .with_store(move |store| {
            LectureService::new(store).remove_student_from_lecture(id, query.student_id)
        })
        .await?;
    Ok(Json(lecture))
}

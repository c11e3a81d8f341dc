use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use shiftflow_core::errors::ScheduleError;
use shiftflow_core::models::template::{
    CreateTemplateRequest, ShiftTemplate, TemplateResponse, UpdateTemplateRequest,
    check_role_requirements,
};

use crate::middleware::{actor::Actor, error_handling::AppError};
use crate::ApiState;

fn ensure_window(start: chrono::NaiveTime, end: chrono::NaiveTime) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError(ScheduleError::Validation(
            "start_time must be before end_time".to_string(),
        )));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_template(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    actor.ensure_manager()?;
    ensure_window(payload.start_time, payload.end_time)?;

    // Hard role-requirement breaches reject; the advisory rides along in the response.
    let advisory = check_role_requirements(&payload.role_requirements, payload.max_staff_allowed)?;

    let db_template = shiftflow_db::repositories::template::create_template(&state.db_pool, &payload)
        .await
        .map_err(ScheduleError::Database)?;

    Ok(Json(TemplateResponse {
        template: db_template.into_core().map_err(ScheduleError::Database)?,
        advisory,
    }))
}

#[axum::debug_handler]
pub async fn get_template(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftTemplate>, AppError> {
    let db_template = shiftflow_db::repositories::template::get_template_by_id(&state.db_pool, id)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| ScheduleError::NotFound(format!("Template with ID {} not found", id)))?;

    Ok(Json(db_template.into_core().map_err(ScheduleError::Database)?))
}

#[axum::debug_handler]
pub async fn update_template(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    actor.ensure_manager()?;

    let current = shiftflow_db::repositories::template::get_template_by_id(&state.db_pool, id)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| ScheduleError::NotFound(format!("Template with ID {} not found", id)))?
        .into_core()
        .map_err(ScheduleError::Database)?;

    // Invariants run against the merged result, not just the delta.
    let start = payload.start_time.unwrap_or(current.start_time);
    let end = payload.end_time.unwrap_or(current.end_time);
    ensure_window(start, end)?;

    let cap = payload.max_staff_allowed.unwrap_or(current.max_staff_allowed);
    let roles = payload
        .role_requirements
        .as_deref()
        .unwrap_or(&current.role_requirements);
    let advisory = check_role_requirements(roles, cap)?;

    let db_template =
        shiftflow_db::repositories::template::update_template(&state.db_pool, id, &payload)
            .await
            .map_err(ScheduleError::Database)?;

    Ok(Json(TemplateResponse {
        template: db_template.into_core().map_err(ScheduleError::Database)?,
        advisory,
    }))
}

#[axum::debug_handler]
pub async fn deactivate_template(
    State(state): State<Arc<ApiState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftTemplate>, AppError> {
    actor.ensure_manager()?;

    shiftflow_db::repositories::template::get_template_by_id(&state.db_pool, id)
        .await
        .map_err(ScheduleError::Database)?
        .ok_or_else(|| ScheduleError::NotFound(format!("Template with ID {} not found", id)))?;

    let db_template = shiftflow_db::repositories::template::deactivate_template(&state.db_pool, id)
        .await
        .map_err(ScheduleError::Database)?;

    Ok(Json(db_template.into_core().map_err(ScheduleError::Database)?))
}

#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    pub branch_id: Uuid,
    #[serde(default)]
    pub active_only: bool,
}

#[axum::debug_handler]
pub async fn list_templates(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<Json<Vec<ShiftTemplate>>, AppError> {
    let db_templates = shiftflow_db::repositories::template::list_templates(
        &state.db_pool,
        query.branch_id,
        query.active_only,
    )
    .await
    .map_err(ScheduleError::Database)?;

    let mut templates = Vec::with_capacity(db_templates.len());
    for db_template in db_templates {
        templates.push(db_template.into_core().map_err(ScheduleError::Database)?);
    }
    Ok(Json(templates))
}

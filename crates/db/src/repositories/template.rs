use crate::models::DbShiftTemplate;
use chrono::Utc;
use eyre::{Result, eyre};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shiftflow_core::models::template::{CreateTemplateRequest, UpdateTemplateRequest};

pub async fn create_template(
    pool: &Pool<Postgres>,
    req: &CreateTemplateRequest,
) -> Result<DbShiftTemplate> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating shift template: id={}, branch={}, name={}",
        id,
        req.branch_id,
        req.name
    );

    let template = sqlx::query_as::<_, DbShiftTemplate>(
        r#"
        INSERT INTO shift_templates
            (id, branch_id, name, start_time, end_time, max_staff_allowed,
             employment_type, role_requirements, is_active, description, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9, $10, $10)
        RETURNING id, branch_id, name, start_time, end_time, max_staff_allowed,
                  employment_type, role_requirements, is_active, description, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(req.branch_id)
    .bind(&req.name)
    .bind(req.start_time)
    .bind(req.end_time)
    .bind(req.max_staff_allowed)
    .bind(req.employment_type.to_string())
    .bind(serde_json::to_value(&req.role_requirements)?)
    .bind(&req.description)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(template)
}

pub async fn get_template_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbShiftTemplate>> {
    let template = sqlx::query_as::<_, DbShiftTemplate>(
        r#"
        SELECT id, branch_id, name, start_time, end_time, max_staff_allowed,
               employment_type, role_requirements, is_active, description, created_at, updated_at
        FROM shift_templates
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(template)
}

pub async fn update_template(
    pool: &Pool<Postgres>,
    id: Uuid,
    req: &UpdateTemplateRequest,
) -> Result<DbShiftTemplate> {
    let current = get_template_by_id(pool, id)
        .await?
        .ok_or_else(|| eyre!("Template not found"))?;

    let name = req.name.clone().unwrap_or(current.name);
    let start_time = req.start_time.unwrap_or(current.start_time);
    let end_time = req.end_time.unwrap_or(current.end_time);
    let max_staff_allowed = req.max_staff_allowed.unwrap_or(current.max_staff_allowed);
    let employment_type = req
        .employment_type
        .map(|e| e.to_string())
        .unwrap_or(current.employment_type);
    let role_requirements = match &req.role_requirements {
        Some(roles) => serde_json::to_value(roles)?,
        None => current.role_requirements,
    };
    let description = req.description.clone().or(current.description);

    let template = sqlx::query_as::<_, DbShiftTemplate>(
        r#"
        UPDATE shift_templates
        SET name = $2, start_time = $3, end_time = $4, max_staff_allowed = $5,
            employment_type = $6, role_requirements = $7, description = $8, updated_at = $9
        WHERE id = $1
        RETURNING id, branch_id, name, start_time, end_time, max_staff_allowed,
                  employment_type, role_requirements, is_active, description, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(start_time)
    .bind(end_time)
    .bind(max_staff_allowed)
    .bind(employment_type)
    .bind(role_requirements)
    .bind(description)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(template)
}

pub async fn deactivate_template(pool: &Pool<Postgres>, id: Uuid) -> Result<DbShiftTemplate> {
    tracing::debug!("Deactivating shift template: id={}", id);

    let template = sqlx::query_as::<_, DbShiftTemplate>(
        r#"
        UPDATE shift_templates
        SET is_active = FALSE, updated_at = $2
        WHERE id = $1
        RETURNING id, branch_id, name, start_time, end_time, max_staff_allowed,
                  employment_type, role_requirements, is_active, description, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(template)
}

pub async fn list_templates(
    pool: &Pool<Postgres>,
    branch_id: Uuid,
    active_only: bool,
) -> Result<Vec<DbShiftTemplate>> {
    let templates = sqlx::query_as::<_, DbShiftTemplate>(
        r#"
        SELECT id, branch_id, name, start_time, end_time, max_staff_allowed,
               employment_type, role_requirements, is_active, description, created_at, updated_at
        FROM shift_templates
        WHERE branch_id = $1 AND (NOT $2 OR is_active)
        ORDER BY name ASC
        "#,
    )
    .bind(branch_id)
    .bind(active_only)
    .fetch_all(pool)
    .await?;

    Ok(templates)
}

use crate::models::DbStaffProfile;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shiftflow_core::models::template::EmploymentType;

pub async fn get_staff_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbStaffProfile>> {
    let staff = sqlx::query_as::<_, DbStaffProfile>(
        r#"
        SELECT id, branch_id, display_name, employment_type, is_active, created_at
        FROM staff_profiles
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(staff)
}

pub async fn list_staff(pool: &Pool<Postgres>, branch_id: Uuid) -> Result<Vec<DbStaffProfile>> {
    let staff = sqlx::query_as::<_, DbStaffProfile>(
        r#"
        SELECT id, branch_id, display_name, employment_type, is_active, created_at
        FROM staff_profiles
        WHERE branch_id = $1 AND is_active
        ORDER BY display_name ASC
        "#,
    )
    .bind(branch_id)
    .fetch_all(pool)
    .await?;

    Ok(staff)
}

/// Staff identity is owned upstream; this keeps the local mirror current.
pub async fn upsert_staff(
    pool: &Pool<Postgres>,
    id: Uuid,
    branch_id: Uuid,
    display_name: &str,
    employment_type: EmploymentType,
    is_active: bool,
) -> Result<DbStaffProfile> {
    let staff = sqlx::query_as::<_, DbStaffProfile>(
        r#"
        INSERT INTO staff_profiles (id, branch_id, display_name, employment_type, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE
        SET branch_id = EXCLUDED.branch_id,
            display_name = EXCLUDED.display_name,
            employment_type = EXCLUDED.employment_type,
            is_active = EXCLUDED.is_active
        RETURNING id, branch_id, display_name, employment_type, is_active, created_at
        "#,
    )
    .bind(id)
    .bind(branch_id)
    .bind(display_name)
    .bind(employment_type.to_string())
    .bind(is_active)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(staff)
}

use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create staff_profiles table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staff_profiles (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            branch_id UUID NOT NULL,
            display_name VARCHAR(255) NOT NULL,
            employment_type VARCHAR(32) NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create shift_templates table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shift_templates (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            branch_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            max_staff_allowed INTEGER NULL,
            employment_type VARCHAR(32) NOT NULL DEFAULT 'ANY',
            role_requirements JSONB NOT NULL DEFAULT '[]',
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            description TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT template_valid_window CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create shifts table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shifts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            branch_id UUID NOT NULL,
            source_template_id UUID NULL REFERENCES shift_templates(id),
            date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            max_staff_allowed INTEGER NULL,
            employment_type VARCHAR(32) NOT NULL DEFAULT 'ANY',
            role_requirements JSONB NOT NULL DEFAULT '[]',
            status VARCHAR(32) NOT NULL DEFAULT 'DRAFT',
            notes TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT shift_valid_window CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create shift_assignments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shift_assignments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            shift_id UUID NOT NULL REFERENCES shifts(id),
            staff_user_id UUID NOT NULL REFERENCES staff_profiles(id),
            status VARCHAR(32) NOT NULL DEFAULT 'PENDING',
            assignment_type VARCHAR(32) NOT NULL DEFAULT 'REGULAR',
            rest_waived BOOLEAN NOT NULL DEFAULT FALSE,
            notes TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create shift_requests table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shift_requests (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            request_type VARCHAR(32) NOT NULL,
            origin_shift_id UUID NOT NULL REFERENCES shifts(id),
            origin_assignment_id UUID NULL REFERENCES shift_assignments(id),
            target_user_id UUID NULL REFERENCES staff_profiles(id),
            requesting_user_id UUID NOT NULL REFERENCES staff_profiles(id),
            status VARCHAR(32) NOT NULL DEFAULT 'CREATED',
            waived_rule VARCHAR(64) NULL,
            reason TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create branch_closures table (managed externally, consumed read-only)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS branch_closures (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            branch_id UUID NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            reason TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT closure_valid_range CHECK (end_date >= start_date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_shift_templates_branch_id ON shift_templates(branch_id);
        CREATE INDEX IF NOT EXISTS idx_shifts_branch_date ON shifts(branch_id, date);
        CREATE INDEX IF NOT EXISTS idx_shift_assignments_shift_id ON shift_assignments(shift_id);
        CREATE INDEX IF NOT EXISTS idx_shift_assignments_staff ON shift_assignments(staff_user_id);
        CREATE INDEX IF NOT EXISTS idx_shift_requests_origin_shift ON shift_requests(origin_shift_id);
        CREATE INDEX IF NOT EXISTS idx_shift_requests_requesting_user ON shift_requests(requesting_user_id);
        CREATE INDEX IF NOT EXISTS idx_branch_closures_dates ON branch_closures(start_date, end_date);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}

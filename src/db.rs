use sqlx::MySqlPool;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPool::connect(database_url).await
}

/// Idempotent DDL, executed once at startup. The unique indexes carry the
/// business invariants: one employee per external id/email, one attendance
/// row per (employee, date). Attendance rows go away with their employee.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id          BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        employee_id VARCHAR(20)  NOT NULL,
        full_name   VARCHAR(120) NOT NULL,
        email       VARCHAR(254) NOT NULL,
        department  VARCHAR(80)  NOT NULL,
        created_at  TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        UNIQUE KEY uq_employees_employee_id (employee_id),
        UNIQUE KEY uq_employees_email (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id          BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        employee_id BIGINT UNSIGNED NOT NULL,
        date        DATE        NOT NULL,
        status      VARCHAR(10) NOT NULL,
        created_at  TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        UNIQUE KEY uq_attendance_employee_date (employee_id, date),
        CONSTRAINT fk_attendance_employee
            FOREIGN KEY (employee_id) REFERENCES employees (id)
            ON DELETE CASCADE
    )
    "#,
];

pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

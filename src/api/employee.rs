use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, FieldErrors, is_duplicate_entry},
    model::{attendance::AttendanceStatus, employee::Employee},
};

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "E1", value_type = String)]
    pub employee_id: Option<String>,
    #[schema(example = "Jane Doe", value_type = String)]
    pub full_name: Option<String>,
    #[schema(example = "jane.doe@company.com", format = "email", value_type = String)]
    pub email: Option<String>,
    #[schema(example = "Engineering", value_type = String)]
    pub department: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = "E1")]
    pub employee_id: String,
    #[schema(example = 12)]
    pub total_present_days: i64,
}

/// Validated, trimmed create payload.
#[derive(Debug)]
struct NewEmployee {
    employee_id: String,
    full_name: String,
    email: String,
    department: String,
}

fn required(details: &mut FieldErrors, field: &'static str, value: &Option<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            details.insert(field, "This field is required.".to_string());
            None
        }
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

impl CreateEmployee {
    fn validate(&self) -> Result<NewEmployee, ApiError> {
        let mut details = FieldErrors::new();

        let employee_id = required(&mut details, "employee_id", &self.employee_id);
        let full_name = required(&mut details, "full_name", &self.full_name);
        let email = required(&mut details, "email", &self.email);
        let department = required(&mut details, "department", &self.department);

        if let Some(email) = email.as_deref() {
            if !is_valid_email(email) {
                details.insert("email", "Enter a valid email address.".to_string());
            }
        }

        match (employee_id, full_name, email, department) {
            (Some(employee_id), Some(full_name), Some(email), Some(department))
                if details.is_empty() =>
            {
                Ok(NewEmployee {
                    employee_id,
                    full_name,
                    email,
                    department,
                })
            }
            _ => Err(ApiError::Validation(details)),
        }
    }
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "error": "Validation failed",
            "details": { "email": "This field is required." }
        })),
        (status = 409, description = "employee_id or email already taken", body = Object, example = json!({
            "error": "An employee with this employee_id already exists."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let new = payload.validate()?;

    // Pre-check both unique columns so the caller learns which one clashed.
    // The unique indexes stay the arbiter under concurrent creates.
    let (id_taken, email_taken) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM employees WHERE employee_id = ?),
            (SELECT COUNT(*) FROM employees WHERE email = ?)
        "#,
    )
    .bind(&new.employee_id)
    .bind(&new.email)
    .fetch_one(pool.get_ref())
    .await?;

    if id_taken != 0 {
        return Err(ApiError::Conflict(
            "An employee with this employee_id already exists.".to_string(),
        ));
    }
    if email_taken != 0 {
        return Err(ApiError::Conflict(
            "An employee with this email already exists.".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO employees (employee_id, full_name, email, department)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&new.employee_id)
    .bind(&new.full_name)
    .bind(&new.email)
    .bind(&new.department)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        if is_duplicate_entry(&e) {
            ApiError::Conflict(
                "An employee with this employee_id or email already exists.".to_string(),
            )
        } else {
            ApiError::Database(e)
        }
    })?;

    // Re-read for the server-assigned created_at.
    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employee_id, full_name, email, department, created_at
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(employee))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "All employees, ascending by employee_id", body = [Employee]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn list_employees(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let employees = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employee_id, full_name, email, department, created_at
        FROM employees
        ORDER BY employee_id ASC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(employees))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(
        ("id" = u64, Path, description = "Internal employee id")
    ),
    responses(
        (status = 204, description = "Employee and their attendance deleted"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    // Attendance rows go with the employee via ON DELETE CASCADE.
    let result = sqlx::query(r#"DELETE FROM employees WHERE id = ?"#)
        .bind(id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Employee attendance summary
#[utoipa::path(
    get,
    path = "/employees/{id}/summary",
    params(
        ("id" = u64, Path, description = "Internal employee id")
    ),
    responses(
        (status = 200, description = "Days marked PRESENT for this employee", body = EmployeeSummary),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn employee_summary(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let employee_id = sqlx::query_scalar::<_, String>(
        r#"SELECT employee_id FROM employees WHERE id = ?"#,
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    let total_present_days = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM attendance WHERE employee_id = ? AND status = ?"#,
    )
    .bind(id)
    .bind(AttendanceStatus::Present)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(EmployeeSummary {
        employee_id,
        total_present_days,
    }))
}

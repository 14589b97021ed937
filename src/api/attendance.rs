use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{ApiError, FieldErrors, is_duplicate_entry},
    model::{
        attendance::{Attendance, AttendanceStatus},
        employee::EmployeeBrief,
    },
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DUPLICATE_ATTENDANCE: &str = "Attendance already marked for this employee on this date.";

#[derive(Deserialize, ToSchema)]
pub struct CreateAttendance {
    /// External employee identifier, not the internal id
    #[schema(example = "E1", value_type = String)]
    pub employee_id: Option<String>,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub date: Option<String>,
    #[schema(example = "PRESENT", value_type = String)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Filter by external employee identifier (exact match)
    #[schema(example = "E1")]
    pub employee_id: Option<String>,
    /// Filter by exact date
    #[schema(example = "2024-01-01")]
    pub date: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "employee": {
        "id": 1,
        "employee_id": "E1",
        "full_name": "Jane Doe",
        "department": "Engineering"
    },
    "date": "2024-01-01",
    "status": "PRESENT",
    "created_at": "2024-01-01T09:00:00Z"
}))]
pub struct AttendanceResponse {
    pub id: u64,
    pub employee: EmployeeBrief,
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(example = "2024-01-01T09:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Joined row shape for list queries; flattened employee columns are
/// aliased to avoid clashing with the attendance ones.
#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: u64,
    date: NaiveDate,
    status: AttendanceStatus,
    created_at: DateTime<Utc>,
    employee_pk: u64,
    employee_id: String,
    full_name: String,
    department: String,
}

impl From<AttendanceRow> for AttendanceResponse {
    fn from(row: AttendanceRow) -> Self {
        Self {
            id: row.id,
            employee: EmployeeBrief {
                id: row.employee_pk,
                employee_id: row.employee_id,
                full_name: row.full_name,
                department: row.department,
            },
            date: row.date,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Validated create payload.
#[derive(Debug)]
struct NewAttendance {
    employee_id: String,
    date: NaiveDate,
    status: AttendanceStatus,
}

impl CreateAttendance {
    fn validate(&self) -> Result<NewAttendance, ApiError> {
        let mut details = FieldErrors::new();

        let employee_id = match self.employee_id.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                details.insert("employee_id", "This field is required.".to_string());
                None
            }
        };

        let date = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(d) => Some(d),
                Err(_) => {
                    details.insert("date", "Date has wrong format. Use YYYY-MM-DD.".to_string());
                    None
                }
            },
            _ => {
                details.insert("date", "This field is required.".to_string());
                None
            }
        };

        let status = match self.status.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match raw.parse::<AttendanceStatus>() {
                Ok(s) => Some(s),
                Err(_) => {
                    details.insert("status", "Must be PRESENT or ABSENT.".to_string());
                    None
                }
            },
            _ => {
                details.insert("status", "Must be PRESENT or ABSENT.".to_string());
                None
            }
        };

        match (employee_id, date, status) {
            (Some(employee_id), Some(date), Some(status)) if details.is_empty() => {
                Ok(NewAttendance {
                    employee_id,
                    date,
                    status,
                })
            }
            _ => Err(ApiError::Validation(details)),
        }
    }
}

/// Record attendance
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "error": "Validation failed",
            "details": { "status": "Must be PRESENT or ABSENT." }
        })),
        (status = 404, description = "Unknown employee_id", body = Object, example = json!({
            "error": "Employee not found"
        })),
        (status = 409, description = "Already marked for this date", body = Object, example = json!({
            "error": "Attendance already marked for this employee on this date."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn create_attendance(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAttendance>,
) -> Result<HttpResponse, ApiError> {
    let new = payload.validate()?;

    let employee = sqlx::query_as::<_, EmployeeBrief>(
        r#"
        SELECT id, employee_id, full_name, department
        FROM employees
        WHERE employee_id = ?
        "#,
    )
    .bind(&new.employee_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    // Pre-check for the clean message; the unique (employee_id, date) index
    // still decides races.
    let already_marked = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM attendance WHERE employee_id = ? AND date = ?"#,
    )
    .bind(employee.id)
    .bind(new.date)
    .fetch_one(pool.get_ref())
    .await?;

    if already_marked != 0 {
        return Err(ApiError::Conflict(DUPLICATE_ATTENDANCE.to_string()));
    }

    let result = sqlx::query(
        r#"INSERT INTO attendance (employee_id, date, status) VALUES (?, ?, ?)"#,
    )
    .bind(employee.id)
    .bind(new.date)
    .bind(new.status)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        if is_duplicate_entry(&e) {
            ApiError::Conflict(DUPLICATE_ATTENDANCE.to_string())
        } else {
            ApiError::Database(e)
        }
    })?;

    // Re-read for the server-assigned created_at.
    let row = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, status, created_at
        FROM attendance
        WHERE id = ?
        "#,
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(AttendanceResponse {
        id: row.id,
        employee,
        date: row.date,
        status: row.status,
        created_at: row.created_at,
    }))
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Str(&'a str),
    Date(NaiveDate),
}

/// List attendance
#[utoipa::path(
    get,
    path = "/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records, date then creation time descending",
         body = [AttendanceResponse]),
        (status = 400, description = "Malformed date filter", body = Object, example = json!({
            "error": "Validation failed",
            "details": { "date": "Date has wrong format. Use YYYY-MM-DD." }
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = query.employee_id.as_deref() {
        where_sql.push_str(" AND e.employee_id = ?");
        args.push(FilterValue::Str(employee_id));
    }

    if let Some(raw) = query.date.as_deref() {
        let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
            let mut details = FieldErrors::new();
            details.insert("date", "Date has wrong format. Use YYYY-MM-DD.".to_string());
            ApiError::Validation(details)
        })?;
        where_sql.push_str(" AND a.date = ?");
        args.push(FilterValue::Date(date));
    }

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT a.id, a.date, a.status, a.created_at,
               e.id AS employee_pk, e.employee_id, e.full_name, e.department
        FROM attendance a
        INNER JOIN employees e ON e.id = a.employee_id
        {}
        ORDER BY a.date DESC, a.created_at DESC
        "#,
        where_sql
    );
    tracing::debug!(sql = %data_sql, "Fetching attendance");

    let mut data_q = sqlx::query_as::<_, AttendanceRow>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let rows = data_q.fetch_all(pool.get_ref()).await?;
    let records: Vec<AttendanceResponse> =
        rows.into_iter().map(AttendanceResponse::from).collect();

    Ok(HttpResponse::Ok().json(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> CreateAttendance {
        CreateAttendance {
            employee_id: Some("E1".into()),
            date: Some("2024-01-01".into()),
            status: Some("PRESENT".into()),
        }
    }

    #[test]
    fn accepts_complete_payload() {
        let new = full_payload().validate().unwrap();
        assert_eq!(new.employee_id, "E1");
        assert_eq!(new.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(new.status, AttendanceStatus::Present);
    }

    #[test]
    fn rejects_unknown_status() {
        let mut payload = full_payload();
        payload.status = Some("LATE".into());
        let ApiError::Validation(details) = payload.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(
            details.get("status").map(String::as_str),
            Some("Must be PRESENT or ABSENT.")
        );
    }

    #[test]
    fn rejects_missing_status() {
        let mut payload = full_payload();
        payload.status = None;
        let ApiError::Validation(details) = payload.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(
            details.get("status").map(String::as_str),
            Some("Must be PRESENT or ABSENT.")
        );
    }

    #[test]
    fn rejects_malformed_date() {
        for bad in ["01-01-2024", "2024/01/01", "2024-13-01", "yesterday"] {
            let mut payload = full_payload();
            payload.date = Some(bad.into());
            let ApiError::Validation(details) = payload.validate().unwrap_err() else {
                panic!("expected validation error for {bad:?}");
            };
            assert_eq!(
                details.get("date").map(String::as_str),
                Some("Date has wrong format. Use YYYY-MM-DD."),
                "date {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn collects_every_bad_field_at_once() {
        let payload = CreateAttendance {
            employee_id: Some("".into()),
            date: None,
            status: Some("LATE".into()),
        };
        let ApiError::Validation(details) = payload.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(details.len(), 3);
        assert_eq!(
            details.get("employee_id").map(String::as_str),
            Some("This field is required.")
        );
        assert_eq!(
            details.get("date").map(String::as_str),
            Some("This field is required.")
        );
    }
}

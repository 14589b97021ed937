use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": "E1",
        "full_name": "Jane Doe",
        "email": "jane.doe@company.com",
        "department": "Engineering",
        "created_at": "2024-01-01T09:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "E1")]
    pub employee_id: String,

    #[schema(example = "Jane Doe")]
    pub full_name: String,

    #[schema(example = "jane.doe@company.com")]
    pub email: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(
        example = "2024-01-01T09:00:00Z",
        value_type = String,
        format = "date-time"
    )]
    pub created_at: DateTime<Utc>,
}

/// Condensed employee shape nested inside attendance responses.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeBrief {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "E1")]
    pub employee_id: String,

    #[schema(example = "Jane Doe")]
    pub full_name: String,

    #[schema(example = "Engineering")]
    pub department: String,
}

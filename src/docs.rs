use crate::api::attendance::{AttendanceQuery, AttendanceResponse, CreateAttendance};
use crate::api::employee::{CreateEmployee, EmployeeSummary};
use crate::model::attendance::AttendanceStatus;
use crate::model::employee::{Employee, EmployeeBrief};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Attendance API",
        version = "1.0.0",
        description = r#"
## HR Attendance Backend

Record-keeping API for employees and their daily attendance.

### Endpoints
- **Employees**: create, list, delete, and per-employee attendance summary
- **Attendance**: record one entry per employee per day, list with filters
- **Health**: database reachability probe

### Response Format
JSON throughout. Validation failures return per-field details; uniqueness
conflicts return 409 with a descriptive message.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::delete_employee,
        crate::api::employee::employee_summary,

        crate::api::attendance::create_attendance,
        crate::api::attendance::list_attendance,

        crate::api::health::health
    ),
    components(
        schemas(
            Employee,
            EmployeeBrief,
            CreateEmployee,
            EmployeeSummary,
            CreateAttendance,
            AttendanceQuery,
            AttendanceResponse,
            AttendanceStatus
        )
    ),
    tags(
        (name = "Employee", description = "Employee record APIs"),
        (name = "Attendance", description = "Daily attendance APIs"),
        (name = "Health", description = "Service health APIs"),
    )
)]
pub struct ApiDoc;

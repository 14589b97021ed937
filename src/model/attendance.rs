use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Stored as a plain string column; the unique (employee_id, date) index
/// lives on the table, not here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_api_spelling() {
        assert_eq!("PRESENT".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Present);
        assert_eq!("ABSENT".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Absent);
        assert!("present".parse::<AttendanceStatus>().is_err());
        assert!("LATE".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn status_renders_api_spelling() {
        assert_eq!(AttendanceStatus::Present.to_string(), "PRESENT");
        assert_eq!(AttendanceStatus::Absent.to_string(), "ABSENT");
    }
}

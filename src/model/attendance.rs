use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Vacation,
}

impl TryFrom<String> for AttendanceStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One employee, one day. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String)]
    pub scheduled_in: NaiveTime,
    #[schema(example = "17:00:00", value_type = String)]
    pub scheduled_out: NaiveTime,
    #[schema(example = "09:20:00", value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,
    #[sqlx(try_from = "String")]
    pub status: AttendanceStatus,
    #[schema(example = 20)]
    pub late_minutes: u32,
    #[schema(example = 60)]
    pub overtime_minutes: u32,
}

impl AttendanceRecord {
    /// Lateness is tracked by minutes, not by status.
    pub fn is_late(&self) -> bool {
        self.late_minutes > 0
    }
}

/// A single day cannot carry more late or overtime minutes than this.
pub const MAX_DAY_MINUTES: u32 = 24 * 60;

pub fn validate_day_minutes(late_minutes: u32, overtime_minutes: u32) -> Result<(), String> {
    if late_minutes > MAX_DAY_MINUTES || overtime_minutes > MAX_DAY_MINUTES {
        return Err(format!(
            "late_minutes and overtime_minutes must be at most {MAX_DAY_MINUTES}"
        ));
    }
    Ok(())
}

/// Late minutes after the scheduled start and overtime minutes past the
/// scheduled end. Days without a presence status, or without punches,
/// carry neither.
pub fn derive_minutes(
    status: AttendanceStatus,
    scheduled_in: NaiveTime,
    scheduled_out: NaiveTime,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
) -> (u32, u32) {
    if matches!(status, AttendanceStatus::Absent | AttendanceStatus::Vacation) {
        return (0, 0);
    }

    let late = check_in
        .map(|t| (t - scheduled_in).num_minutes().max(0) as u32)
        .unwrap_or(0);
    let overtime = check_out
        .map(|t| (t - scheduled_out).num_minutes().max(0) as u32)
        .unwrap_or(0);

    (late, overtime)
}

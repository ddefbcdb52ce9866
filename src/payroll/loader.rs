use sqlx::MySqlPool;

use crate::{
    error::{AppError, AppResult},
    model::{
        advance::Advance, attendance::AttendanceRecord, deduction_rules::DeductionRules,
        user::User,
    },
    utils::month::Month,
};

/// Everything a settlement reads, fetched for one employee and one month.
pub struct MonthSnapshot {
    pub user: User,
    pub records: Vec<AttendanceRecord>,
    pub pending_advances: Vec<Advance>,
    pub rules: DeductionRules,
}

pub async fn fetch_user(pool: &MySqlPool, user_id: u64) -> AppResult<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role_id, full_name, phone, base_salary, is_active
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))
}

pub async fn fetch_month_attendance(
    pool: &MySqlPool,
    user_id: u64,
    month: Month,
) -> AppResult<Vec<AttendanceRecord>> {
    let rows = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, scheduled_in, scheduled_out, check_in, check_out,
               status, late_minutes, overtime_minutes
        FROM attendance
        WHERE user_id = ? AND date BETWEEN ? AND ?
        ORDER BY date
        "#,
    )
    .bind(user_id)
    .bind(month.first_day())
    .bind(month.last_day())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn fetch_pending_advances(pool: &MySqlPool, user_id: u64) -> AppResult<Vec<Advance>> {
    let rows = sqlx::query_as::<_, Advance>(
        r#"
        SELECT id, user_id, amount, status, date
        FROM advances
        WHERE user_id = ? AND status = 'pending'
        ORDER BY date
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Falls back to [`DeductionRules::default`] until an admin saves rules.
pub async fn load_deduction_rules(pool: &MySqlPool) -> AppResult<DeductionRules> {
    let rules = sqlx::query_as::<_, DeductionRules>(
        r#"
        SELECT mode, per_minute_rate, per_hour_rate, per_half_day_rate,
               grace_minutes, overtime_multiplier
        FROM deduction_rules
        WHERE id = 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(rules.unwrap_or_default())
}

pub async fn load_month_snapshot(
    pool: &MySqlPool,
    user_id: u64,
    month: Month,
) -> AppResult<MonthSnapshot> {
    let (user, records, pending_advances, rules) = futures::try_join!(
        fetch_user(pool, user_id),
        fetch_month_attendance(pool, user_id, month),
        fetch_pending_advances(pool, user_id),
        load_deduction_rules(pool),
    )?;

    Ok(MonthSnapshot {
        user,
        records,
        pending_advances,
        rules,
    })
}

//! Month-end salary settlement.
//!
//! Turns one employee's attendance for a month, their pending advances and
//! the studio's deduction rules into a [`SalaryReport`]. Everything here is
//! plain arithmetic over already-fetched rows, so it never fails.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{
    advance::Advance,
    attendance::{AttendanceRecord, AttendanceStatus},
    deduction_rules::DeductionRules,
};

/// Hours in a standard month (30 days × 8 hours), used to derive an hourly
/// rate from the monthly base salary.
pub const MONTHLY_WORKING_HOURS: f64 = 30.0 * 8.0;

/// Operator-entered figures at settlement time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Adjustments {
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub other_deductions: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummary {
    pub present_days: u32,
    pub absent_days: u32,
    pub half_days: u32,
    pub vacation_days: u32,
    pub late_days: u32,
    // Month sums are widened so many long days cannot overflow
    pub total_late_minutes: u64,
    pub total_overtime_minutes: u64,
}

impl AttendanceSummary {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            match r.status {
                AttendanceStatus::Present => acc.present_days += 1,
                AttendanceStatus::Absent => acc.absent_days += 1,
                AttendanceStatus::HalfDay => acc.half_days += 1,
                AttendanceStatus::Vacation => acc.vacation_days += 1,
            }
            if r.is_late() {
                acc.late_days += 1;
            }
            acc.total_late_minutes += u64::from(r.late_minutes);
            acc.total_overtime_minutes += u64::from(r.overtime_minutes);
            acc
        })
    }
}

/// Every figure shown on the salary screen, plus the resulting net pay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalaryReport {
    pub attendance: AttendanceSummary,
    pub base_salary: f64,
    pub hourly_rate: f64,
    pub per_minute_deduction_rate: f64,
    /// Late minutes left after the grace period
    pub deductible_late_minutes: u64,
    pub late_deduction: f64,
    pub overtime_amount: f64,
    pub advances_deduction: f64,
    pub bonus: f64,
    pub other_deductions: f64,
    pub net_salary: f64,
}

pub fn hourly_rate(base_salary: f64) -> f64 {
    if !base_salary.is_finite() || base_salary <= 0.0 {
        return 0.0;
    }
    base_salary / MONTHLY_WORKING_HOURS
}

pub fn late_deduction(total_late_minutes: u64, rules: &DeductionRules) -> (u64, f64) {
    let deductible = total_late_minutes.saturating_sub(u64::from(rules.grace_minutes));
    (deductible, deductible as f64 * rules.per_minute_rate())
}

pub fn overtime_amount(total_overtime_minutes: u64, hourly_rate: f64, multiplier: f64) -> f64 {
    (total_overtime_minutes as f64 / 60.0) * hourly_rate * multiplier
}

/// Sums every pending advance. The date is not consulted, so pending
/// advances from earlier months are deducted in full.
pub fn advances_deduction(advances: &[Advance]) -> f64 {
    advances
        .iter()
        .filter(|a| a.is_pending())
        .map(|a| a.amount)
        .sum()
}

pub fn compute_salary_report(
    records: &[AttendanceRecord],
    advances: &[Advance],
    rules: &DeductionRules,
    base_salary: f64,
    adjustments: Adjustments,
) -> SalaryReport {
    let base_salary = if base_salary.is_finite() { base_salary } else { 0.0 };

    let attendance = AttendanceSummary::from_records(records);

    let (deductible_late_minutes, late_deduction) =
        late_deduction(attendance.total_late_minutes, rules);

    let hourly_rate = hourly_rate(base_salary);
    let overtime_amount = overtime_amount(
        attendance.total_overtime_minutes,
        hourly_rate,
        rules.overtime_multiplier,
    );

    let advances_deduction = advances_deduction(advances);

    let net_salary = base_salary + overtime_amount + adjustments.bonus
        - late_deduction
        - advances_deduction
        - adjustments.other_deductions;

    SalaryReport {
        attendance,
        base_salary,
        hourly_rate,
        per_minute_deduction_rate: rules.per_minute_rate(),
        deductible_late_minutes,
        late_deduction,
        overtime_amount,
        advances_deduction,
        bonus: adjustments.bonus,
        other_deductions: adjustments.other_deductions,
        net_salary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        advance::AdvanceStatus,
        attendance::AttendanceStatus,
        deduction_rules::{DeductionMode, DeductionRules},
    };
    use chrono::{NaiveDate, NaiveTime};

    fn day(d: u32, status: AttendanceStatus, late: u32, overtime: u32) -> AttendanceRecord {
        AttendanceRecord {
            id: d as u64,
            user_id: 7,
            date: NaiveDate::from_ymd_opt(2026, 1, d).unwrap(),
            scheduled_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            scheduled_out: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            check_in: None,
            check_out: None,
            status,
            late_minutes: late,
            overtime_minutes: overtime,
        }
    }

    fn advance(amount: f64, status: AdvanceStatus, month: u32) -> Advance {
        Advance {
            id: 0,
            user_id: 7,
            amount,
            status,
            date: NaiveDate::from_ymd_opt(2025, month, 10).unwrap(),
        }
    }

    fn per_minute(rate: f64, grace: u32) -> DeductionRules {
        DeductionRules {
            mode: DeductionMode::Minute,
            per_minute_rate: rate,
            grace_minutes: grace,
            overtime_multiplier: 1.5,
            ..Default::default()
        }
    }

    #[test]
    fn late_minutes_past_grace_are_charged() {
        let records = vec![
            day(5, AttendanceStatus::Present, 25, 0),
            day(6, AttendanceStatus::Present, 15, 0),
        ];
        let report = compute_salary_report(
            &records,
            &[],
            &per_minute(2.0, 15),
            3000.0,
            Adjustments::default(),
        );

        assert_eq!(report.attendance.total_late_minutes, 40);
        assert_eq!(report.deductible_late_minutes, 25);
        assert_eq!(report.late_deduction, 50.0);
    }

    #[test]
    fn overtime_pays_hourly_rate_times_multiplier() {
        assert_eq!(overtime_amount(120, 15.0, 1.5), 45.0);

        // 3600 / 240 = 15 per hour
        let records = vec![day(5, AttendanceStatus::Present, 0, 120)];
        let report = compute_salary_report(
            &records,
            &[],
            &per_minute(0.0, 0),
            3600.0,
            Adjustments::default(),
        );
        assert_eq!(report.hourly_rate, 15.0);
        assert_eq!(report.overtime_amount, 45.0);
    }

    #[test]
    fn all_pending_advances_are_deducted_regardless_of_date() {
        let advances = vec![
            advance(50.0, AdvanceStatus::Pending, 1),
            advance(30.0, AdvanceStatus::Pending, 11),
            advance(500.0, AdvanceStatus::Deducted, 11),
            advance(70.0, AdvanceStatus::Cancelled, 12),
        ];
        assert_eq!(advances_deduction(&advances), 80.0);
    }

    #[test]
    fn no_attendance_leaves_base_plus_bonus_minus_other() {
        let report = compute_salary_report(
            &[],
            &[],
            &per_minute(2.0, 15),
            3000.0,
            Adjustments {
                bonus: 200.0,
                other_deductions: 75.0,
            },
        );

        assert_eq!(report.attendance, AttendanceSummary::default());
        assert_eq!(report.late_deduction, 0.0);
        assert_eq!(report.overtime_amount, 0.0);
        assert_eq!(report.net_salary, 3000.0 + 200.0 - 75.0);
    }

    #[test]
    fn net_salary_is_plain_arithmetic_and_may_go_negative() {
        let records = vec![day(3, AttendanceStatus::Present, 100, 0)];
        let advances = vec![advance(900.0, AdvanceStatus::Pending, 1)];
        let report = compute_salary_report(
            &records,
            &advances,
            &per_minute(1.0, 0),
            480.0,
            Adjustments {
                bonus: 10.0,
                other_deductions: 5.0,
            },
        );

        let expected = report.base_salary + report.overtime_amount + report.bonus
            - report.late_deduction
            - report.advances_deduction
            - report.other_deductions;
        assert_eq!(report.net_salary, expected);
        assert_eq!(report.net_salary, 480.0 + 10.0 - 100.0 - 900.0 - 5.0);
    }

    #[test]
    fn zero_or_missing_base_salary_does_not_divide_by_zero() {
        assert_eq!(hourly_rate(0.0), 0.0);
        assert_eq!(hourly_rate(-10.0), 0.0);
        assert_eq!(hourly_rate(f64::NAN), 0.0);

        let records = vec![day(5, AttendanceStatus::Present, 0, 600)];
        let report =
            compute_salary_report(&records, &[], &per_minute(0.0, 0), 0.0, Adjustments::default());
        assert_eq!(report.overtime_amount, 0.0);
        assert_eq!(report.net_salary, 0.0);
    }

    #[test]
    fn counts_days_by_status_and_late_flag_independently() {
        let records = vec![
            day(1, AttendanceStatus::Present, 5, 0),
            day(2, AttendanceStatus::Present, 0, 30),
            day(3, AttendanceStatus::Absent, 0, 0),
            day(4, AttendanceStatus::HalfDay, 12, 0),
            day(5, AttendanceStatus::Vacation, 0, 0),
        ];
        let summary = AttendanceSummary::from_records(&records);

        assert_eq!(summary.present_days, 2);
        assert_eq!(summary.absent_days, 1);
        assert_eq!(summary.half_days, 1);
        assert_eq!(summary.vacation_days, 1);
        assert_eq!(summary.late_days, 2);
        assert_eq!(summary.total_late_minutes, 17);
        assert_eq!(summary.total_overtime_minutes, 30);
    }

    #[test]
    fn huge_minute_values_sum_without_wrapping() {
        let records = vec![
            day(1, AttendanceStatus::Present, u32::MAX, u32::MAX),
            day(2, AttendanceStatus::Present, 1, 1),
        ];
        let summary = AttendanceSummary::from_records(&records);

        assert_eq!(summary.total_late_minutes, u64::from(u32::MAX) + 1);
        assert_eq!(summary.total_overtime_minutes, u64::from(u32::MAX) + 1);

        let (deductible, amount) = late_deduction(summary.total_late_minutes, &per_minute(1.0, 0));
        assert_eq!(deductible, u64::from(u32::MAX) + 1);
        assert!(amount > f64::from(u32::MAX));
    }

    #[test]
    fn hour_and_half_day_modes_convert_to_per_minute() {
        let hourly = DeductionRules {
            mode: DeductionMode::Hour,
            per_hour_rate: 30.0,
            grace_minutes: 10,
            ..Default::default()
        };
        // (70 - 10) minutes at 0.5
        assert_eq!(late_deduction(70, &hourly), (60, 30.0));

        let half_day = DeductionRules {
            mode: DeductionMode::HalfDay,
            per_half_day_rate: 240.0,
            ..Default::default()
        };
        assert_eq!(late_deduction(45, &half_day), (45, 45.0));
    }

    #[test]
    fn late_deduction_never_decreases_with_more_lateness() {
        let rules = per_minute(1.25, 15);
        let mut previous = 0.0;
        for minutes in 0..=300 {
            let (_, amount) = late_deduction(minutes, &rules);
            assert!(amount >= previous, "dropped at {minutes} minutes");
            previous = amount;
        }
    }

    #[test]
    fn overtime_never_decreases_with_more_minutes() {
        let mut previous = 0.0;
        for minutes in 0..=600 {
            let amount = overtime_amount(minutes, 12.5, 1.5);
            assert!(amount >= previous, "dropped at {minutes} minutes");
            previous = amount;
        }
    }
}

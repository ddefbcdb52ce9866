use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Length of a half working day, used to turn the half-day rate into a
/// per-minute rate.
pub const HALF_DAY_MINUTES: f64 = 240.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeductionMode {
    #[default]
    Minute,
    Hour,
    HalfDay,
}

impl TryFrom<String> for DeductionMode {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Studio-wide lateness and overtime policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DeductionRules {
    #[sqlx(try_from = "String")]
    pub mode: DeductionMode,
    #[schema(example = 2.0)]
    pub per_minute_rate: f64,
    #[schema(example = 60.0)]
    pub per_hour_rate: f64,
    #[schema(example = 100.0)]
    pub per_half_day_rate: f64,
    #[schema(example = 15)]
    pub grace_minutes: u32,
    #[schema(example = 1.5)]
    pub overtime_multiplier: f64,
}

impl Default for DeductionRules {
    fn default() -> Self {
        Self {
            mode: DeductionMode::Minute,
            per_minute_rate: 0.0,
            per_hour_rate: 0.0,
            per_half_day_rate: 0.0,
            grace_minutes: 0,
            overtime_multiplier: 1.0,
        }
    }
}

impl DeductionRules {
    pub fn per_minute_rate(&self) -> f64 {
        match self.mode {
            DeductionMode::Minute => self.per_minute_rate,
            DeductionMode::Hour => self.per_hour_rate / 60.0,
            DeductionMode::HalfDay => self.per_half_day_rate / HALF_DAY_MINUTES,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let rates = [
            ("per_minute_rate", self.per_minute_rate),
            ("per_hour_rate", self.per_hour_rate),
            ("per_half_day_rate", self.per_half_day_rate),
            ("overtime_multiplier", self.overtime_multiplier),
        ];

        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(mode: DeductionMode) -> DeductionRules {
        DeductionRules {
            mode,
            per_minute_rate: 2.0,
            per_hour_rate: 90.0,
            per_half_day_rate: 120.0,
            ..Default::default()
        }
    }

    #[test]
    fn per_minute_rate_follows_mode() {
        assert_eq!(rules(DeductionMode::Minute).per_minute_rate(), 2.0);
        assert_eq!(rules(DeductionMode::Hour).per_minute_rate(), 1.5);
        assert_eq!(rules(DeductionMode::HalfDay).per_minute_rate(), 0.5);
    }

    #[test]
    fn rejects_negative_rates() {
        let mut r = rules(DeductionMode::Minute);
        assert!(r.validate().is_ok());
        r.overtime_multiplier = -1.0;
        assert!(r.validate().is_err());
    }

    #[test]
    fn deserializes_mode_names() {
        let r: DeductionRules = serde_json::from_str(
            r#"{"mode":"half_day","per_minute_rate":0,"per_hour_rate":0,
                "per_half_day_rate":48,"grace_minutes":10,"overtime_multiplier":2}"#,
        )
        .unwrap();
        assert_eq!(r.mode, DeductionMode::HalfDay);
        assert_eq!(r.per_minute_rate(), 0.2);
    }
}

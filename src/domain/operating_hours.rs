use chrono::NaiveTime;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::OperatingHours;

/// One day of the week as submitted by a shop owner.
#[derive(Deserialize, Debug, Clone)]
pub struct DayHours {
    pub day_of_week: i16,
    pub opens_at: Option<String>,
    pub closes_at: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
}

/// A validated set of operating hours, at most one entry per day.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyHours(Vec<ValidDay>);

#[derive(Debug, Clone, PartialEq)]
struct ValidDay {
    day_of_week: i16,
    opens_at: NaiveTime,
    closes_at: NaiveTime,
    is_closed: bool,
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value.trim(), "%H:%M:%S"))
        .map_err(|_| format!("{} must be formatted as HH:MM, got {}", field, value))
}

fn midnight() -> NaiveTime {
    NaiveTime::MIN
}

impl WeeklyHours {
    pub fn parse(days: Vec<DayHours>) -> Result<WeeklyHours, String> {
        let mut seen = [false; 7];
        let mut parsed = Vec::with_capacity(days.len());

        for day in days {
            if !(0..=6).contains(&day.day_of_week) {
                return Err(format!(
                    "day_of_week must be between 0 (Sunday) and 6 (Saturday), got {}",
                    day.day_of_week
                ));
            }
            let index = day.day_of_week as usize;
            if seen[index] {
                return Err(format!("day_of_week {} appears more than once", day.day_of_week));
            }
            seen[index] = true;

            if day.is_closed {
                parsed.push(ValidDay {
                    day_of_week: day.day_of_week,
                    opens_at: midnight(),
                    closes_at: midnight(),
                    is_closed: true,
                });
                continue;
            }

            let opens_at = match day.opens_at.as_deref() {
                Some(value) => parse_time("opens_at", value)?,
                None => return Err(format!("opens_at is required for day {}", day.day_of_week)),
            };
            let closes_at = match day.closes_at.as_deref() {
                Some(value) => parse_time("closes_at", value)?,
                None => return Err(format!("closes_at is required for day {}", day.day_of_week)),
            };
            if opens_at >= closes_at {
                return Err(format!(
                    "opening time must be before closing time on day {}",
                    day.day_of_week
                ));
            }

            parsed.push(ValidDay {
                day_of_week: day.day_of_week,
                opens_at,
                closes_at,
                is_closed: false,
            });
        }

        parsed.sort_by_key(|d| d.day_of_week);
        Ok(Self(parsed))
    }

    /// Monday to Saturday 08:00-18:00, closed on Sunday.
    pub fn default_week() -> WeeklyHours {
        let opens_at = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN);
        let closes_at = NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN);

        Self(
            (0..7)
                .map(|day| {
                    if day == 0 {
                        ValidDay {
                            day_of_week: day,
                            opens_at: midnight(),
                            closes_at: midnight(),
                            is_closed: true,
                        }
                    } else {
                        ValidDay {
                            day_of_week: day,
                            opens_at,
                            closes_at,
                            is_closed: false,
                        }
                    }
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_rows(self, branch_id: Uuid) -> Vec<OperatingHours> {
        self.0
            .into_iter()
            .map(|day| OperatingHours {
                branch_id,
                day_of_week: day.day_of_week,
                opens_at: day.opens_at,
                closes_at: day.closes_at,
                is_closed: day.is_closed,
            })
            .collect()
    }
}

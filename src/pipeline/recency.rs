//! Release recency heuristics.
//!
//! Whether a classified book counts as a new release is a policy decision, so
//! the filter is a configurable strategy rather than fixed pipeline behavior.
//! All checks take the current time as an argument.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::RawBibRecord;
use crate::utils::date::{parse_calendar_date, parse_year_month};

/// Date facts of a raw record used by the recency policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseFacts<'a> {
    /// Summary publication date, `YYYYMM...`
    pub pubdate: Option<&'a str>,
    /// Catalog registration date, `YYYY-MM-DD`
    pub registered_on: Option<&'a str>,
    /// Last-modified timestamp, `YYYY-MM-DD HH:MM:SS`
    pub modified_at: Option<&'a str>,
}

impl<'a> From<&'a RawBibRecord> for ReleaseFacts<'a> {
    fn from(record: &'a RawBibRecord) -> Self {
        Self {
            pubdate: record.pubdate(),
            registered_on: record.registered_on(),
            modified_at: record.modified_at(),
        }
    }
}

/// Strategy deciding which classified books are surfaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecencyPolicy {
    /// Every classified book is accepted.
    #[default]
    Disabled,

    /// Publication month is the current month or later; books without a
    /// publication date pass when registered within the last N months.
    UpcomingRelease {
        #[serde(default = "default_registered_within_months")]
        registered_within_months: u32,
    },

    /// Registered on or after the first of the current month, and last
    /// modified within N days of registration.
    RegisteredThisMonth {
        #[serde(default = "default_max_modified_lag_days")]
        max_modified_lag_days: i64,
    },
}

fn default_registered_within_months() -> u32 {
    3
}

fn default_max_modified_lag_days() -> i64 {
    3
}

/// Upper bound for `registered_within_months` (a century).
pub const MAX_REGISTERED_WITHIN_MONTHS: u32 = 1200;

/// Upper bound for `max_modified_lag_days` (ten years).
pub const MAX_MODIFIED_LAG_DAYS: i64 = 3650;

impl RecencyPolicy {
    /// Reject window sizes that are negative or absurdly large.
    pub fn validate(&self) -> Result<()> {
        match self {
            RecencyPolicy::Disabled => Ok(()),
            RecencyPolicy::UpcomingRelease {
                registered_within_months,
            } => {
                if (1..=MAX_REGISTERED_WITHIN_MONTHS).contains(registered_within_months) {
                    Ok(())
                } else {
                    Err(AppError::validation(format!(
                        "recency.policy.registered_within_months must be between 1 and {MAX_REGISTERED_WITHIN_MONTHS}, got {registered_within_months}"
                    )))
                }
            }
            RecencyPolicy::RegisteredThisMonth {
                max_modified_lag_days,
            } => {
                if (0..=MAX_MODIFIED_LAG_DAYS).contains(max_modified_lag_days) {
                    Ok(())
                } else {
                    Err(AppError::validation(format!(
                        "recency.policy.max_modified_lag_days must be between 0 and {MAX_MODIFIED_LAG_DAYS}, got {max_modified_lag_days}"
                    )))
                }
            }
        }
    }

    pub fn admits(&self, facts: &ReleaseFacts<'_>, now: DateTime<Utc>) -> bool {
        match self {
            RecencyPolicy::Disabled => true,
            RecencyPolicy::UpcomingRelease {
                registered_within_months,
            } => is_new_release_within(
                facts.pubdate.unwrap_or(""),
                facts.registered_on.unwrap_or(""),
                now.date_naive(),
                *registered_within_months,
            ),
            RecencyPolicy::RegisteredThisMonth {
                max_modified_lag_days,
            } => {
                let registered = facts.registered_on.unwrap_or("");
                is_registered_this_month(registered, now.date_naive())
                    && is_recently_registered(
                        registered,
                        facts.modified_at.unwrap_or(""),
                        *max_modified_lag_days,
                    )
            }
        }
    }
}

/// Upcoming-release check with the default three month registration window.
pub fn is_new_release(pubdate: &str, registered_on: &str, now: DateTime<Utc>) -> bool {
    is_new_release_within(
        pubdate,
        registered_on,
        now.date_naive(),
        default_registered_within_months(),
    )
}

/// True when the publication month is not in the past, or when there is no
/// publication date and the record was registered within `months` of `today`.
pub fn is_new_release_within(
    pubdate: &str,
    registered_on: &str,
    today: NaiveDate,
    months: u32,
) -> bool {
    if let Some((year, month)) = parse_year_month(pubdate) {
        if year > today.year() || (year == today.year() && month >= today.month()) {
            return true;
        }
    }

    if !pubdate.trim().is_empty() {
        return false;
    }

    let Some(registered) = parse_calendar_date(registered_on) else {
        return false;
    };
    today
        .checked_sub_months(Months::new(months))
        .is_some_and(|cutoff| registered >= cutoff)
}

/// Registration date falls on or after the first day of `today`'s month.
pub fn is_registered_this_month(registered_on: &str, today: NaiveDate) -> bool {
    let Some(registered) = parse_calendar_date(registered_on) else {
        return false;
    };
    today
        .with_day(1)
        .is_some_and(|first_of_month| registered >= first_of_month)
}

/// Last modification happened between 0 and `max_days` days after registration.
///
/// A `max_days` too large to express as a duration admits nothing.
pub fn is_recently_registered(registered_on: &str, modified_at: &str, max_days: i64) -> bool {
    let Some(registered) = parse_calendar_date(registered_on).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return false;
    };
    let Some(modified) = parse_timestamp(modified_at) else {
        return false;
    };

    let lag = modified - registered;
    TimeDelta::try_days(max_days).is_some_and(|max| lag >= TimeDelta::zero() && lag <= max)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| parse_calendar_date(raw)?.and_hms_opt(0, 0, 0))
}

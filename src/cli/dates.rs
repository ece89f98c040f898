use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use crate::{store::parse_contact_date, utils::time::utc_day_start};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Turns user input into a contact date. `YYYY-MM-DD` is tried first, then anything
/// chrono-english understands ("yesterday", "last friday", "15/03/2025"). Relative phrases are
/// resolved against UTC `now` and only the UTC calendar day is kept, the same frame
/// [days_since](crate::metrics::days_since) measures in.
pub fn parse_user_date(
    value: &str,
    now: DateTime<Utc>,
    style: DateStyle,
) -> Result<DateTime<Utc>> {
    if let Ok(date) = parse_contact_date(value) {
        return Ok(date);
    }
    match parse_date_string(value.trim(), now, style.into()) {
        Ok(v) => Ok(utc_day_start(v.date_naive())),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {value:?}: {e}"),
            )
            .into()),
    }
}

/// Start of the current UTC day. A person added with it is 0 days old right away.
pub fn today(now: DateTime<Utc>) -> DateTime<Utc> {
    utc_day_start(now.date_naive())
}

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a contact date to a string in sincedb.
pub fn date_to_record_value(date: NaiveDate) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}

/// Start of the given calendar day in UTC. Stored dates come back as this moment.
pub fn utc_day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::time::utc_day_start;

/// Opaque identifier of a tracked person. Generated ids are UUIDv7 (millisecond timestamp plus
/// random bits), but anything read back from storage is accepted as is.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub struct PersonId(Arc<str>);

impl PersonId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

/// A tracked contact as the store keeps it in memory.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Person {
    pub id: PersonId,
    /// Always trimmed and non-empty.
    pub name: String,
    /// Full precision in memory, only the calendar day survives a save.
    pub last_contact: DateTime<Utc>,
}

impl Person {
    pub(crate) fn same_name(&self, other: &str) -> bool {
        self.name.trim().to_lowercase() == other.trim().to_lowercase()
    }
}

/// The struct used for storing a person. Dates are kept as `YYYY-MM-DD`.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct PersonEntity {
    pub id: PersonId,
    pub name: String,
    #[serde(rename = "lastContact", with = "contact_date_ser")]
    pub last_contact: NaiveDate,
}

mod contact_date_ser {
    use chrono::NaiveDate;
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    use crate::utils::time::{date_to_record_value, RECORD_DATE_FORMAT};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date_to_record_value(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, RECORD_DATE_FORMAT).map_err(D::Error::custom)
    }
}

impl From<&Person> for PersonEntity {
    fn from(person: &Person) -> Self {
        PersonEntity {
            id: person.id.clone(),
            name: person.name.clone(),
            last_contact: person.last_contact.date_naive(),
        }
    }
}

impl From<PersonEntity> for Person {
    fn from(PersonEntity { id, name, last_contact }: PersonEntity) -> Self {
        Person {
            id,
            name,
            last_contact: utc_day_start(last_contact),
        }
    }
}

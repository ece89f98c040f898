//! The store owns the list of tracked people.
//!  - Records are loaded once from a [KeyValueStorage], after that the in-memory copy is the
//!    source of truth.
//!  - Every successful mutation writes the whole collection back under [PEOPLE_KEY].
//!  - A failed write never rolls the mutation back. It's logged and remembered until the next
//!    successful save, see [Store::has_unsaved_changes].

pub mod entities;
pub mod error;

use std::collections::HashSet;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::{
    storage::KeyValueStorage,
    utils::{
        clock::Clock,
        time::{utc_day_start, RECORD_DATE_FORMAT},
    },
};

pub use entities::{Person, PersonEntity, PersonId};
pub use error::{StoreError, StoreResult};

/// Storage key holding the whole serialized collection.
pub const PEOPLE_KEY: &str = "sincedb-people";

pub struct Store<S: KeyValueStorage> {
    storage: S,
    clock: Box<dyn Clock>,
    people: Vec<Person>,
    unsaved: bool,
}

impl<S: KeyValueStorage> Store<S> {
    /// Creates an empty store. Nothing is read until [Store::load] is called.
    pub fn new(storage: S, clock: Box<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            people: Vec::new(),
            unsaved: false,
        }
    }

    /// Creates a store and loads whatever is persisted.
    pub fn open(storage: S, clock: Box<dyn Clock>) -> Self {
        let mut store = Self::new(storage, clock);
        store.load();
        store
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn get(&self, id: &PersonId) -> Option<&Person> {
        self.people.iter().find(|p| &p.id == id)
    }

    /// Looks a person up by id first and then by name, ignoring case.
    pub fn find(&self, query: &str) -> Option<&Person> {
        self.people
            .iter()
            .find(|p| p.id.as_str() == query)
            .or_else(|| self.people.iter().find(|p| p.same_name(query)))
    }

    /// True when the last attempt to persist failed and memory is ahead of storage.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Size in bytes of the persisted collection, 0 if there's nothing readable.
    pub fn storage_size(&self) -> usize {
        match self.storage.get(PEOPLE_KEY) {
            Ok(v) => v.map_or(0, |v| v.len()),
            Err(e) => {
                warn!("Couldn't read storage size {e:?}");
                0
            }
        }
    }

    /// Replaces the in-memory collection with the persisted one. Missing or unreadable data
    /// results in an empty collection.
    pub fn load(&mut self) -> &[Person] {
        self.people = match self.read_persisted() {
            Ok(people) => people,
            Err(e) => {
                warn!("Failed to load people, starting empty: {e:?}");
                Vec::new()
            }
        };
        self.unsaved = false;
        debug!("Loaded {} people", self.people.len());
        &self.people
    }

    fn read_persisted(&self) -> anyhow::Result<Vec<Person>> {
        let Some(raw) = self.storage.get(PEOPLE_KEY)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let entities = serde_json::from_str::<Vec<PersonEntity>>(&raw)
            .context("persisted people are not valid")?;

        let mut seen = HashSet::new();
        let mut people = Vec::with_capacity(entities.len());
        for entity in entities {
            if !seen.insert(entity.id.clone()) {
                warn!("Skipping person with repeated id {}", entity.id);
                continue;
            }
            people.push(entity.into());
        }
        Ok(people)
    }

    /// Writes the whole collection. Dates are stored as calendar days.
    pub fn save(&mut self) -> StoreResult<()> {
        let result = self.write_persisted();
        self.unsaved = result.is_err();
        result.map_err(StoreError::Persistence)
    }

    fn write_persisted(&self) -> anyhow::Result<()> {
        let entities = self
            .people
            .iter()
            .map(PersonEntity::from)
            .collect::<Vec<_>>();
        let raw = serde_json::to_string(&entities)?;
        self.storage.set(PEOPLE_KEY, &raw)?;
        debug!("Saved {} people", entities.len());
        Ok(())
    }

    /// Saving after a mutation only gets reported, the mutation itself stands.
    fn persist(&mut self) {
        if let Err(e) = self.save() {
            error!("Keeping changes in memory only: {e}");
        }
    }

    /// Adds a new person. Names are compared without case against everyone already tracked.
    pub fn add(&mut self, name: &str, last_contact: DateTime<Utc>) -> StoreResult<&Person> {
        let name = validate_name(name)?;
        if let Some(existing) = self.people.iter().find(|p| p.same_name(&name)) {
            return Err(StoreError::DuplicateName(existing.name.clone()));
        }

        let person = Person {
            id: PersonId::generate(),
            name,
            last_contact,
        };
        info!("Adding {} as {}", person.name, person.id);
        self.people.push(person);
        self.persist();

        let index = self.people.len() - 1;
        Ok(&self.people[index])
    }

    /// Replaces name and date of an existing person. Unlike [Store::add], duplicate names are
    /// allowed here.
    pub fn edit(
        &mut self,
        id: &PersonId,
        name: &str,
        last_contact: DateTime<Utc>,
    ) -> StoreResult<&Person> {
        let name = validate_name(name)?;
        let index = self.position(id)?;

        let person = &mut self.people[index];
        info!("Editing {} ({} -> {name})", person.id, person.name);
        person.name = name;
        person.last_contact = last_contact;
        self.persist();

        Ok(&self.people[index])
    }

    pub fn remove(&mut self, id: &PersonId) -> StoreResult<Person> {
        let index = self.position(id)?;
        let removed = self.people.remove(index);
        info!("Removed {} ({})", removed.name, removed.id);
        self.persist();
        Ok(removed)
    }

    /// Marks a person as contacted right now.
    pub fn touch(&mut self, id: &PersonId) -> StoreResult<&Person> {
        let index = self.position(id)?;
        let now = self.clock.time();

        let person = &mut self.people[index];
        person.last_contact = now;
        info!("Contacted {} at {now}", person.name);
        self.persist();

        Ok(&self.people[index])
    }

    /// Forgets everyone and deletes the storage key, instead of saving an empty list.
    pub fn clear(&mut self) {
        self.people.clear();
        match self.storage.remove(PEOPLE_KEY) {
            Ok(()) => {
                self.unsaved = false;
                info!("Cleared all people");
            }
            Err(e) => {
                self.unsaved = true;
                error!("Cleared people in memory but the stored copy is still there: {e:?}");
            }
        }
    }

    fn position(&self, id: &PersonId) -> StoreResult<usize> {
        self.people
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

fn validate_name(name: &str) -> StoreResult<String> {
    let name = name.trim();
    if name.is_empty() {
        Err(StoreError::EmptyName)
    } else {
        Ok(name.to_owned())
    }
}

/// Parses a `YYYY-MM-DD` date into the start of that day in UTC.
pub fn parse_contact_date(value: &str) -> StoreResult<DateTime<Utc>> {
    NaiveDate::parse_from_str(value.trim(), RECORD_DATE_FORMAT)
        .map(utc_day_start)
        .map_err(|_| StoreError::InvalidDate(value.to_owned()))
}

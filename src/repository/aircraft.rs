use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{Aircraft, AircraftId, Person};

/// Aircraft stored by their composite key (see `AircraftId::storage_key`)
#[derive(Debug, Default)]
pub struct AircraftRepository(DashMap<String, Aircraft>);

impl AircraftRepository {
    /// Stores an aircraft, replacing any aircraft with the same composite key
    pub fn insert(&self, aircraft: Aircraft) {
        self.0.insert(aircraft.id().storage_key(), aircraft);
    }

    /// Moves an aircraft to a new composite key, keeping its crew
    ///
    /// returns false if there is no aircraft under the old key.
    /// the aircraft is briefly absent between the removal and the reinsertion,
    /// and it replaces any aircraft that was already stored under the new key.
    pub fn update(&self, old: &AircraftId, new: AircraftId) -> bool {
        let Some((_, mut aircraft)) = self.0.remove(&old.storage_key()) else {
            return false;
        };

        aircraft.set_id(new);
        self.insert(aircraft);

        true
    }

    pub fn get(&self, id: &AircraftId) -> Option<Aircraft> {
        self.0
            .get(&id.storage_key())
            .map(|aircraft| aircraft.value().clone())
    }

    /// Removes an aircraft, returns false if it didn't exist
    pub fn delete(&self, id: &AircraftId) -> bool {
        self.0.remove(&id.storage_key()).is_some()
    }

    pub fn exists(&self, id: &AircraftId) -> bool {
        self.0.contains_key(&id.storage_key())
    }

    /// All aircraft, ordered by model, year and brand
    pub fn list(&self) -> Vec<Aircraft> {
        let mut aircraft: Vec<_> = self.0.iter().map(|entry| entry.value().clone()).collect();
        aircraft.sort_by(|a, b| a.id().cmp(b.id()));

        aircraft
    }

    /// Adds a person to the crew of an aircraft
    ///
    /// returns false only if the aircraft doesn't exist,
    /// adding a person that is already part of the crew is a no-op.
    pub fn add_crew(&self, id: &AircraftId, person: Arc<Person>) -> bool {
        let Some(mut aircraft) = self.0.get_mut(&id.storage_key()) else {
            return false;
        };

        aircraft.add_crew(person);
        true
    }

    /// Removes a person from the crew of an aircraft
    ///
    /// returns false if the aircraft doesn't exist or the person isn't part of its crew
    pub fn remove_crew(&self, id: &AircraftId, cpf: &str) -> bool {
        match self.0.get_mut(&id.storage_key()) {
            Some(mut aircraft) => aircraft.remove_crew(cpf),
            None => false,
        }
    }

    /// The crew of an aircraft, an unknown aircraft has an empty crew
    pub fn list_crew(&self, id: &AircraftId) -> Vec<Arc<Person>> {
        self.0
            .get(&id.storage_key())
            .map(|aircraft| aircraft.crew().to_vec())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

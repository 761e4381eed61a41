use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{InvalidSalaryErr, Person, PersonKind};

/// Persons stored by cpf
#[derive(Debug, Default)]
pub struct PersonRepository(DashMap<String, Arc<Person>>);

impl PersonRepository {
    /// Stores a person, replacing any person with the same cpf
    pub fn insert(&self, person: Person) {
        self.0.insert(person.cpf().to_string(), Arc::new(person));
    }

    /// Updates the person with the given cpf in place
    ///
    /// returns false if there is no such person, see `Person::update` for the extras.
    pub fn update(
        &self,
        cpf: &str,
        name: String,
        address: String,
        extras: &[String],
    ) -> Result<bool, InvalidSalaryErr> {
        let Some(person) = self.get(cpf) else {
            return Ok(false);
        };

        person.update(name, address, extras)?;
        Ok(true)
    }

    pub fn get(&self, cpf: &str) -> Option<Arc<Person>> {
        self.0.get(cpf).map(|person| person.value().clone())
    }

    /// Removes a person, returns false if it didn't exist
    ///
    /// aircraft crews that reference the person keep their handle.
    pub fn delete(&self, cpf: &str) -> bool {
        self.0.remove(cpf).is_some()
    }

    /// All persons, ordered by cpf
    pub fn list(&self) -> Vec<Arc<Person>> {
        self.collect_sorted(|_| true)
    }

    /// All persons of a single kind, ordered by cpf
    pub fn list_by_kind(&self, kind: PersonKind) -> Vec<Arc<Person>> {
        self.collect_sorted(|person| person.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn collect_sorted(&self, filter: impl Fn(&Person) -> bool) -> Vec<Arc<Person>> {
        let mut persons: Vec<_> = self
            .0
            .iter()
            .filter(|entry| filter(entry.value().as_ref()))
            .map(|entry| entry.value().clone())
            .collect();
        persons.sort_by(|a, b| a.cpf().cmp(b.cpf()));

        persons
    }
}

#[cfg(test)]
mod tests {
    use super::PersonRepository;
    use crate::model::{Person, PersonKind};

    fn crew(cpf: &str, name: &str) -> Person {
        Person::crew(cpf.into(), name.into(), "Rua A".into(), 5000.0, "Piloto".into())
    }

    fn passenger(cpf: &str, name: &str) -> Person {
        Person::passenger(cpf.into(), name.into(), "Rua B".into(), "1A".into())
    }

    #[test]
    fn same_cpf_is_the_same_person() {
        let repository = PersonRepository::default();
        repository.insert(crew("111", "Ana"));
        repository.insert(passenger("111", "Ana"));

        assert_eq!(repository.len(), 1);
        assert_eq!(repository.list().len(), 1);
        assert_eq!(
            repository.get("111").unwrap().kind(),
            PersonKind::Passenger
        );
    }

    #[test]
    fn listings_are_sorted_and_filtered() {
        let repository = PersonRepository::default();
        repository.insert(crew("333", "Carla"));
        repository.insert(passenger("222", "Bruno"));
        repository.insert(crew("111", "Ana"));

        let cpfs: Vec<_> = repository
            .list()
            .iter()
            .map(|person| person.cpf().to_string())
            .collect();
        assert_eq!(cpfs, ["111", "222", "333"]);

        let cpfs: Vec<_> = repository
            .list_by_kind(PersonKind::Crew)
            .iter()
            .map(|person| person.cpf().to_string())
            .collect();
        assert_eq!(cpfs, ["111", "333"]);

        assert_eq!(repository.list_by_kind(PersonKind::Passenger).len(), 1);
    }

    #[test]
    fn update_and_delete() {
        let repository = PersonRepository::default();
        assert_eq!(
            repository.update("111", "Ana".into(), "Rua A".into(), &[]),
            Ok(false)
        );
        assert!(repository.is_empty());

        repository.insert(crew("111", "Ana"));
        assert_eq!(
            repository.update(
                "111",
                "Ana Maria".into(),
                "Rua Z".into(),
                &["6000".into(), "Copiloto".into()]
            ),
            Ok(true)
        );
        assert_eq!(
            repository.get("111").unwrap().to_data_string(),
            "111;Ana Maria;Rua Z;6000.0;Copiloto"
        );

        assert!(repository.delete("111"));
        assert!(!repository.delete("111"));
        assert!(repository.get("111").is_none());
    }
}

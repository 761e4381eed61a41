mod aircraft;
mod person;

pub use aircraft::AircraftRepository;
pub use person::PersonRepository;

use crate::model::PersonKind;

/// All the state of the server, shared by every connection
#[derive(Debug, Default)]
pub struct Registry {
    pub persons: PersonRepository,
    pub aircraft: AircraftRepository,
}

impl Registry {
    /// A one line summary of the registry content
    pub fn statistics(&self) -> String {
        // counted from a single listing so the totals always add up
        let persons = self.persons.list();
        let crew = persons
            .iter()
            .filter(|person| person.kind() == PersonKind::Crew)
            .count();

        format!(
            "Pessoas: {} (Tripulantes: {}, Passageiros: {}), Aviões: {}",
            persons.len(),
            crew,
            persons.len() - crew,
            self.aircraft.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::model::{Aircraft, AircraftId, Person};

    #[test]
    fn check_statistics() {
        let registry = Registry::default();
        assert_eq!(
            registry.statistics(),
            "Pessoas: 0 (Tripulantes: 0, Passageiros: 0), Aviões: 0"
        );

        registry.persons.insert(Person::crew(
            "111".into(),
            "Ana".into(),
            "Rua A".into(),
            5000.0,
            "Piloto".into(),
        ));
        registry.persons.insert(Person::passenger(
            "222".into(),
            "Bruno".into(),
            "Rua B".into(),
            "12A".into(),
        ));
        registry.persons.insert(Person::passenger(
            "333".into(),
            "Carla".into(),
            "Rua C".into(),
            "12B".into(),
        ));
        registry.aircraft.insert(Aircraft::new(AircraftId::new(
            "737".into(),
            2020,
            "Boeing".into(),
        )));

        assert_eq!(
            registry.statistics(),
            "Pessoas: 3 (Tripulantes: 1, Passageiros: 2), Aviões: 1"
        );
    }
}

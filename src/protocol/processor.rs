use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use crate::{
    model::{parse_salary, Aircraft, AircraftId, Person, PersonKind},
    repository::Registry,
};

use super::message::{ListTarget, RawAircraftId, Request, RequestErr};

pub type SharedRegistry = Arc<Registry>;

const NO_PERSONS_MSG: &str = "Sem pessoas cadastradas";
const NO_AIRCRAFT_MSG: &str = "Sem aviões cadastrados";
const PERSON_NOT_FOUND_MSG: &str = "Pessoa não encontrada";
const AIRCRAFT_NOT_FOUND_MSG: &str = "Avião não encontrado";
const EMPTY_LIST_MSG: &str = "0";

/// A numeric field that couldn't be parsed
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NumberErr {
    #[error("Ano de fabricação deve ser um número válido")]
    ManufactureYear,

    #[error("Ano deve ser um número válido")]
    Year,

    #[error("Anos devem ser números válidos")]
    Years,

    #[error("Salário deve ser um número válido")]
    Salary,
}

#[derive(thiserror::Error, Debug)]
enum ProcessErr {
    #[error("{0}")]
    Request(#[from] RequestErr),

    #[error("{0}")]
    Number(#[from] NumberErr),
}

/// Executes protocol messages against the registry
///
/// the processor holds no state of its own, a clone can be handed to every connection.
#[derive(Debug, Clone)]
pub struct Processor {
    registry: SharedRegistry,
}

impl Processor {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// Processes a single message and returns the response text
    ///
    /// never fails: malformed requests, unknown keys and even internal
    /// failures are all reported back as text.
    pub fn process(&self, message: &str) -> String {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_process(message))) {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                tracing::error!("failed to process \"{}\": {}", message, detail);
                format!("Erro interno do servidor: {}", detail)
            }
        }
    }

    fn try_process(&self, message: &str) -> Result<String, ProcessErr> {
        let request = message.parse::<Request>()?;

        let response = match request {
            Request::InsertCrew {
                cpf,
                name,
                address,
                salary,
                role,
            } => {
                let salary = parse_salary(&salary).map_err(|_| NumberErr::Salary)?;
                self.insert_person(Person::crew(cpf, name, address, salary, role))
            }
            Request::InsertPassenger {
                cpf,
                name,
                address,
                seat,
            } => self.insert_person(Person::passenger(cpf, name, address, seat)),
            Request::InsertAircraft(id) => {
                let id = id.parse().map_err(|_| NumberErr::ManufactureYear)?;
                let aircraft = Aircraft::new(id);
                tracing::debug!("aircraft inserted: {}", aircraft.to_data_string());
                self.registry.aircraft.insert(aircraft);

                String::new()
            }
            Request::UpdatePerson {
                kind,
                cpf,
                name,
                address,
                extras,
            } => self.update_person(kind, &cpf, name, address, &extras)?,
            Request::UpdateAircraft { old, new } => {
                let (Ok(old), Ok(new)) = (old.parse(), new.parse()) else {
                    return Err(NumberErr::Years.into());
                };

                match self.registry.aircraft.update(&old, new) {
                    true => "Avião atualizado com sucesso".into(),
                    false => AIRCRAFT_NOT_FOUND_MSG.into(),
                }
            }
            Request::GetPerson { cpf } => {
                if self.registry.persons.is_empty() {
                    return Ok(NO_PERSONS_MSG.into());
                }

                match self.registry.persons.get(&cpf) {
                    Some(person) => person.to_tagged_string(),
                    None => PERSON_NOT_FOUND_MSG.into(),
                }
            }
            Request::GetAircraft(id) => {
                // an empty registry is reported before a bad year
                if self.registry.aircraft.is_empty() {
                    return Ok(NO_AIRCRAFT_MSG.into());
                }

                match self.registry.aircraft.get(&parse_year(&id)?) {
                    Some(aircraft) => aircraft.to_full_data_string(),
                    None => AIRCRAFT_NOT_FOUND_MSG.into(),
                }
            }
            Request::DeletePerson { cpf } => {
                if self.registry.persons.is_empty() {
                    return Ok(NO_PERSONS_MSG.into());
                }

                match self.registry.persons.delete(&cpf) {
                    true => "Pessoa removida com sucesso".into(),
                    false => PERSON_NOT_FOUND_MSG.into(),
                }
            }
            Request::DeleteAircraft(id) => {
                if self.registry.aircraft.is_empty() {
                    return Ok(NO_AIRCRAFT_MSG.into());
                }

                match self.registry.aircraft.delete(&parse_year(&id)?) {
                    true => "Avião removido com sucesso".into(),
                    false => AIRCRAFT_NOT_FOUND_MSG.into(),
                }
            }
            Request::List(target) => self.list(target),
            Request::AddCrew { aircraft, cpf } => {
                let id = parse_year(&aircraft)?;
                if !self.registry.aircraft.exists(&id) {
                    return Ok(AIRCRAFT_NOT_FOUND_MSG.into());
                }

                let Some(person) = self.registry.persons.get(&cpf) else {
                    return Ok(PERSON_NOT_FOUND_MSG.into());
                };

                // the aircraft may have been removed in the meantime
                match self.registry.aircraft.add_crew(&id, person) {
                    true => "Pessoa adicionado ao avião com sucesso".into(),
                    false => "Erro ao adicionar Pessoa".into(),
                }
            }
            Request::RemoveCrew { aircraft, cpf } => {
                let id = parse_year(&aircraft)?;
                if !self.registry.aircraft.exists(&id) {
                    return Ok(AIRCRAFT_NOT_FOUND_MSG.into());
                }

                match self.registry.aircraft.remove_crew(&id, &cpf) {
                    true => "Tripulante removido do avião com sucesso".into(),
                    false => "Tripulante não encontrado no avião".into(),
                }
            }
            Request::ListCrew(aircraft) => {
                let id = parse_year(&aircraft)?;
                if !self.registry.aircraft.exists(&id) {
                    return Ok(AIRCRAFT_NOT_FOUND_MSG.into());
                }

                format_list(&self.registry.aircraft.list_crew(&id), |person| {
                    person.to_tagged_string()
                })
            }
        };

        Ok(response)
    }

    fn insert_person(&self, person: Person) -> String {
        tracing::debug!("person inserted: {}", person.to_tagged_string());
        self.registry.persons.insert(person);

        String::new()
    }

    fn update_person(
        &self,
        kind: PersonKind,
        cpf: &str,
        name: String,
        address: String,
        extras: &[String],
    ) -> Result<String, NumberErr> {
        let label = match kind {
            PersonKind::Crew => "Tripulante",
            PersonKind::Passenger => "Passageiro",
        };

        match self.registry.persons.update(cpf, name, address, extras) {
            Ok(true) => Ok(format!("{} atualizado com sucesso", label)),
            Ok(false) => Ok(format!("{} não encontrado", label)),
            Err(_) => Err(NumberErr::Salary),
        }
    }

    fn list(&self, target: ListTarget) -> String {
        match target {
            ListTarget::Persons(kind) => {
                format_list(&self.registry.persons.list_by_kind(kind), |person| {
                    person.to_tagged_string()
                })
            }
            ListTarget::Aircraft => {
                format_list(&self.registry.aircraft.list(), Aircraft::to_full_data_string)
            }
            ListTarget::All => self.report(),
        }
    }

    // the complete registry: statistics, then crew members, passengers and aircraft,
    // every block starts with its size
    fn report(&self) -> String {
        let crew = self.registry.persons.list_by_kind(PersonKind::Crew);
        let passengers = self.registry.persons.list_by_kind(PersonKind::Passenger);
        let aircraft = self.registry.aircraft.list();

        let mut lines = vec![format!("ESTATISTICAS;{}", self.registry.statistics())];

        lines.push(format!("TRIPULANTES;{}", crew.len()));
        lines.extend(crew.iter().map(|person| person.to_tagged_string()));

        lines.push(format!("PASSAGEIROS;{}", passengers.len()));
        lines.extend(passengers.iter().map(|person| person.to_tagged_string()));

        lines.push(format!("AVIOES;{}", aircraft.len()));
        lines.extend(
            aircraft
                .iter()
                .map(|aircraft| format!("AVIAO;{}", aircraft.to_full_data_string())),
        );

        lines.join("\n")
    }
}

fn parse_year(id: &RawAircraftId) -> Result<AircraftId, NumberErr> {
    id.parse().map_err(|_| NumberErr::Year)
}

// "0" for an empty list, otherwise the size (at least 2 digits) followed by a line per item
fn format_list<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return EMPTY_LIST_MSG.into();
    }

    let mut lines = vec![format!("{:02}", items.len())];
    lines.extend(items.iter().map(render));

    lines.join("\n")
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message.to_string();
    }

    match payload.downcast_ref::<String>() {
        Some(message) => message.clone(),
        None => "unknown error".into(),
    }
}

use std::{fmt, hash::Hash, sync::Arc};

use super::{Person, FIELD_SEPARATOR};

/// The composite key of an aircraft
///
/// the field order is also the listing order: model, year, brand.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AircraftId {
    pub model: String,
    pub year: i32,
    pub brand: String,
}

impl AircraftId {
    pub fn new(model: String, year: i32, brand: String) -> Self {
        Self { model, year, brand }
    }

    /// The key an aircraft is stored under: model_year_brand
    ///
    /// two different ids only collide when the fields themselves contain an underscore.
    pub fn storage_key(&self) -> String {
        format!("{}_{}_{}", self.model, self.year, self.brand)
    }
}

// short form: model;year;brand
impl fmt::Display for AircraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.model,
            self.year,
            self.brand,
            sep = FIELD_SEPARATOR
        )
    }
}

#[derive(Debug, Clone)]
pub struct Aircraft {
    id: AircraftId,
    // handles to persons owned by the person repository
    crew: Vec<Arc<Person>>,
}

impl Aircraft {
    pub fn new(id: AircraftId) -> Self {
        Self {
            id,
            crew: Vec::default(),
        }
    }

    pub fn id(&self) -> &AircraftId {
        &self.id
    }

    pub fn set_id(&mut self, id: AircraftId) {
        self.id = id;
    }

    pub fn crew(&self) -> &[Arc<Person>] {
        &self.crew
    }

    /// Adds a person to the crew
    ///
    /// returns false if the person was already part of it
    pub fn add_crew(&mut self, person: Arc<Person>) -> bool {
        if self.crew.contains(&person) {
            return false;
        }

        self.crew.push(person);
        true
    }

    /// Removes every crew member with the given cpf
    ///
    /// returns false if there was none
    pub fn remove_crew(&mut self, cpf: &str) -> bool {
        let before = self.crew.len();
        self.crew.retain(|person| person.cpf() != cpf);

        self.crew.len() != before
    }

    pub fn to_data_string(&self) -> String {
        self.id.to_string()
    }

    /// model;year;brand;crew_count followed by every crew member
    /// as ;TYPE;data, all on a single line
    pub fn to_full_data_string(&self) -> String {
        let mut data = format!("{}{}{}", self.id, FIELD_SEPARATOR, self.crew.len());
        for person in self.crew.iter() {
            data.push(FIELD_SEPARATOR);
            data.push_str(&person.to_tagged_string());
        }

        data
    }
}

// an aircraft is identified by its composite key alone
impl PartialEq for Aircraft {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq(&other.id)
    }
}

impl Eq for Aircraft {}

impl Hash for Aircraft {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

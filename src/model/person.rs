use std::{
    fmt,
    hash::Hash,
    str::FromStr,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use super::{format_decimal, FIELD_SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonKind {
    Crew,
    Passenger,
}

impl PersonKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Crew => "TRIPULANTE",
            Self::Passenger => "PASSAGEIRO",
        }
    }
}

impl fmt::Display for PersonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("unknown person type: {0}")]
pub struct UnknownKindErr(String);

impl FromStr for PersonKind {
    type Err = UnknownKindErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRIPULANTE" => Ok(Self::Crew),
            "PASSAGEIRO" => Ok(Self::Passenger),
            _ => Err(UnknownKindErr(s.to_string())),
        }
    }
}

/// The variant specific part of a person
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    Crew { salary: f64, role: String },
    Passenger { seat: String },
}

impl Details {
    pub fn kind(&self) -> PersonKind {
        match self {
            Self::Crew { .. } => PersonKind::Crew,
            Self::Passenger { .. } => PersonKind::Passenger,
        }
    }
}

/// The mutable part of a person
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub address: String,
    pub details: Details,
}

/// A person registered in the system, either a crew member or a passenger.
///
/// a person is identified by its cpf alone, the cpf can never change.
/// the rest of the fields live behind a lock so a person can be shared
/// (e.g. with the crew list of an aircraft) and still be updated in place.
#[derive(Debug)]
pub struct Person {
    cpf: String,
    profile: RwLock<Profile>,
}

impl Person {
    fn new(cpf: String, profile: Profile) -> Self {
        Self {
            cpf,
            profile: RwLock::new(profile),
        }
    }

    pub fn crew(cpf: String, name: String, address: String, salary: f64, role: String) -> Self {
        Self::new(
            cpf,
            Profile {
                name,
                address,
                details: Details::Crew { salary, role },
            },
        )
    }

    pub fn passenger(cpf: String, name: String, address: String, seat: String) -> Self {
        Self::new(
            cpf,
            Profile {
                name,
                address,
                details: Details::Passenger { seat },
            },
        )
    }

    pub fn cpf(&self) -> &str {
        &self.cpf
    }

    pub fn kind(&self) -> PersonKind {
        self.read().details.kind()
    }

    /// Returns a snapshot of the current profile
    #[cfg(test)]
    pub fn profile(&self) -> Profile {
        self.read().clone()
    }

    /// Updates the person in place
    ///
    /// the extras are positional and are interpreted according to the stored variant:
    /// a crew member takes (salary, role), a passenger takes (seat).
    /// when there are not enough extras for the stored variant they are ignored.
    ///
    /// returns an error, without touching the person, if a salary is required but isn't a number.
    pub fn update(
        &self,
        name: String,
        address: String,
        extras: &[String],
    ) -> Result<(), InvalidSalaryErr> {
        let mut profile = self.write();

        let details = match (&profile.details, extras) {
            (Details::Crew { .. }, [salary, role, ..]) => Some(Details::Crew {
                salary: parse_salary(salary)?,
                role: role.clone(),
            }),
            (Details::Passenger { .. }, [seat, ..]) => Some(Details::Passenger { seat: seat.clone() }),
            _ => None,
        };

        profile.name = name;
        profile.address = address;
        if let Some(details) = details {
            profile.details = details;
        }

        Ok(())
    }

    /// Serializes the person without its type tag
    ///
    /// crew: cpf;name;address;salary;role
    /// passenger: cpf;name;address;seat
    pub fn to_data_string(&self) -> String {
        let profile = self.read();
        let mut fields = vec![
            self.cpf.clone(),
            profile.name.clone(),
            profile.address.clone(),
        ];

        match &profile.details {
            Details::Crew { salary, role } => {
                fields.push(format_decimal(*salary));
                fields.push(role.clone());
            }
            Details::Passenger { seat } => fields.push(seat.clone()),
        }

        fields.join(&FIELD_SEPARATOR.to_string())
    }

    /// Same as `Self::to_data_string`, prefixed with the type tag
    pub fn to_tagged_string(&self) -> String {
        format!("{}{}{}", self.kind(), FIELD_SEPARATOR, self.to_data_string())
    }

    // a panic can't leave a profile half written, so a poisoned lock is still usable
    fn read(&self) -> RwLockReadGuard<'_, Profile> {
        self.profile.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Profile> {
        self.profile.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("invalid salary: {0}")]
pub struct InvalidSalaryErr(String);

/// Parses a salary, surrounding whitespace is ignored
///
/// only digits (with an optional sign, fraction and exponent) and the exact
/// words "NaN" and "Infinity" are numbers, other spellings like "inf" aren't.
pub fn parse_salary(text: &str) -> Result<f64, InvalidSalaryErr> {
    let text = text.trim();
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);

    let numeric = matches!(unsigned, "NaN" | "Infinity")
        || unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if !numeric {
        return Err(InvalidSalaryErr(text.to_string()));
    }

    text.parse().map_err(|_| InvalidSalaryErr(text.to_string()))
}

// a person is identified by its cpf alone
impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.cpf.eq(&other.cpf)
    }
}

impl Eq for Person {}

impl Hash for Person {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.cpf.hash(state)
    }
}

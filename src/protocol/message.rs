use std::{num::ParseIntError, str::FromStr};

use crate::model::{AircraftId, PersonKind, FIELD_SEPARATOR};

const INSERT_CREW_USAGE_MSG: &str =
    "Dados insuficientes. Formato: INSERT;TRIPULANTE;cpf;nome;endereco;salario;cargo";
const INSERT_PASSENGER_USAGE_MSG: &str =
    "Dados insuficientes. Formato: INSERT;PASSAGEIRO;cpf;nome;endereco;poltrona";
const INSERT_AIRCRAFT_USAGE_MSG: &str =
    "Dados insuficientes. Formato: INSERT;AVIAO;modelo;anoFabricacao;marca";
const UPDATE_CREW_USAGE_MSG: &str = "Dados insuficientes para atualização de tripulante";
const UPDATE_PASSENGER_USAGE_MSG: &str = "Dados insuficientes para atualização de passageiro";
const UPDATE_AIRCRAFT_USAGE_MSG: &str = "Dados insuficientes. Formato: UPDATE;AVIAO;modeloAtual;anoAtual;marcaAtual;novoModelo;novoAno;novaMarca";
const MISSING_CPF_MSG: &str = "CPF não informado";
const GET_AIRCRAFT_USAGE_MSG: &str =
    "Dados insuficientes. Formato: GET;AVIAO;modelo;anoFabricacao;marca";
const DELETE_AIRCRAFT_USAGE_MSG: &str = "Dados insuficientes para remoção de avião";
const ADD_CREW_USAGE_MSG: &str =
    "Dados insuficientes. Formato: ADD_TRIPULANTE;modelo;anoFabricacao;marca;cpfTripulante";
const REMOVE_CREW_USAGE_MSG: &str =
    "Dados insuficientes. Formato: REMOVE_TRIPULANTE;modelo;anoFabricacao;marca;cpfTripulante";
const LIST_CREW_USAGE_MSG: &str =
    "Dados insuficientes. Formato: LIST_TRIPULANTES;modelo;anoFabricacao;marca";

const AIRCRAFT_TYPE: &str = "AVIAO";
const ALL_TYPE: &str = "ALL";

/// The key of an aircraft as it was received, the year is not parsed yet
///
/// the year is only parsed when the request is executed,
/// some requests report other problems before a bad year.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAircraftId {
    pub model: String,
    pub year: String,
    pub brand: String,
}

impl RawAircraftId {
    fn new(model: &str, year: &str, brand: &str) -> Self {
        Self {
            model: model.into(),
            year: year.into(),
            brand: brand.into(),
        }
    }

    pub fn parse(&self) -> Result<AircraftId, ParseIntError> {
        Ok(AircraftId::new(
            self.model.clone(),
            self.year.parse()?,
            self.brand.clone(),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListTarget {
    Persons(PersonKind),
    Aircraft,
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    InsertCrew {
        cpf: String,
        name: String,
        address: String,
        salary: String,
        role: String,
    },
    InsertPassenger {
        cpf: String,
        name: String,
        address: String,
        seat: String,
    },
    InsertAircraft(RawAircraftId),
    UpdatePerson {
        // the type the client asked for, the stored person may be of another type
        kind: PersonKind,
        cpf: String,
        name: String,
        address: String,
        extras: Vec<String>,
    },
    UpdateAircraft {
        old: RawAircraftId,
        new: RawAircraftId,
    },
    GetPerson {
        cpf: String,
    },
    GetAircraft(RawAircraftId),
    DeletePerson {
        cpf: String,
    },
    DeleteAircraft(RawAircraftId),
    List(ListTarget),
    AddCrew {
        aircraft: RawAircraftId,
        cpf: String,
    },
    RemoveCrew {
        aircraft: RawAircraftId,
        cpf: String,
    },
    ListCrew(RawAircraftId),
}

/// A request that can't be understood
///
/// the message of each error is the exact text that is sent back to the client
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RequestErr {
    #[error("Mensagem vazia")]
    Empty,

    #[error("Formato inválido. Use: OPERACAO;TIPO;dados...")]
    BadFormat,

    #[error("Operação não reconhecida: {0}")]
    UnknownOperation(String),

    #[error("Tipo inválido para {action}: {kind}")]
    UnknownType { action: &'static str, kind: String },

    #[error("{0}")]
    MissingFields(&'static str),
}

impl FromStr for Request {
    type Err = RequestErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RequestErr::Empty);
        }

        let fields = split_fields(s);
        if fields.len() < 2 {
            return Err(RequestErr::BadFormat);
        }

        // operation & type are case insensitive
        let operation = fields[0].to_uppercase();
        let kind = fields[1].to_uppercase();

        match operation.as_str() {
            "INSERT" => parse_insert(&kind, &fields[2..]),
            "UPDATE" => parse_update(&kind, &fields[2..]),
            "GET" => parse_get(&kind, &fields[2..]),
            "DELETE" => parse_delete(&kind, &fields[2..]),
            "LIST" => parse_list(&kind),
            // crew management requests have no type, the aircraft starts right after the operation
            "ADD_TRIPULANTE" => match &fields[1..] {
                [model, year, brand, cpf, ..] => Ok(Self::AddCrew {
                    aircraft: RawAircraftId::new(model, year, brand),
                    cpf: cpf.clone(),
                }),
                _ => Err(RequestErr::MissingFields(ADD_CREW_USAGE_MSG)),
            },
            "REMOVE_TRIPULANTE" => match &fields[1..] {
                [model, year, brand, cpf, ..] => Ok(Self::RemoveCrew {
                    aircraft: RawAircraftId::new(model, year, brand),
                    cpf: cpf.clone(),
                }),
                _ => Err(RequestErr::MissingFields(REMOVE_CREW_USAGE_MSG)),
            },
            "LIST_TRIPULANTES" => match &fields[1..] {
                [model, year, brand, ..] => {
                    Ok(Self::ListCrew(RawAircraftId::new(model, year, brand)))
                }
                _ => Err(RequestErr::MissingFields(LIST_CREW_USAGE_MSG)),
            },
            _ => Err(RequestErr::UnknownOperation(operation)),
        }
    }
}

// splits a line into its fields, trailing empty fields are dropped
fn split_fields(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = line.split(FIELD_SEPARATOR).map(String::from).collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }

    fields
}

fn unknown_type(action: &'static str, kind: &str) -> RequestErr {
    RequestErr::UnknownType {
        action,
        kind: kind.to_string(),
    }
}

fn parse_insert(kind: &str, data: &[String]) -> Result<Request, RequestErr> {
    match kind {
        "TRIPULANTE" => match data {
            [cpf, name, address, salary, role, ..] => Ok(Request::InsertCrew {
                cpf: cpf.clone(),
                name: name.clone(),
                address: address.clone(),
                salary: salary.clone(),
                role: role.clone(),
            }),
            _ => Err(RequestErr::MissingFields(INSERT_CREW_USAGE_MSG)),
        },
        "PASSAGEIRO" => match data {
            [cpf, name, address, seat, ..] => Ok(Request::InsertPassenger {
                cpf: cpf.clone(),
                name: name.clone(),
                address: address.clone(),
                seat: seat.clone(),
            }),
            _ => Err(RequestErr::MissingFields(INSERT_PASSENGER_USAGE_MSG)),
        },
        AIRCRAFT_TYPE => match data {
            [model, year, brand, ..] => {
                Ok(Request::InsertAircraft(RawAircraftId::new(model, year, brand)))
            }
            _ => Err(RequestErr::MissingFields(INSERT_AIRCRAFT_USAGE_MSG)),
        },
        _ => Err(unknown_type("inserção", kind)),
    }
}

fn parse_update(kind: &str, data: &[String]) -> Result<Request, RequestErr> {
    if kind == AIRCRAFT_TYPE {
        return match data {
            [old_model, old_year, old_brand, new_model, new_year, new_brand, ..] => {
                Ok(Request::UpdateAircraft {
                    old: RawAircraftId::new(old_model, old_year, old_brand),
                    new: RawAircraftId::new(new_model, new_year, new_brand),
                })
            }
            _ => Err(RequestErr::MissingFields(UPDATE_AIRCRAFT_USAGE_MSG)),
        };
    }

    let person_kind = kind
        .parse::<PersonKind>()
        .map_err(|_| unknown_type("atualização", kind))?;

    // a crew member is updated with (salary, role), a passenger with (seat)
    let (extra_count, usage) = match person_kind {
        PersonKind::Crew => (2, UPDATE_CREW_USAGE_MSG),
        PersonKind::Passenger => (1, UPDATE_PASSENGER_USAGE_MSG),
    };

    match data {
        [cpf, name, address, extras @ ..] if extras.len() >= extra_count => {
            Ok(Request::UpdatePerson {
                kind: person_kind,
                cpf: cpf.clone(),
                name: name.clone(),
                address: address.clone(),
                extras: extras[..extra_count].to_vec(),
            })
        }
        _ => Err(RequestErr::MissingFields(usage)),
    }
}

fn parse_get(kind: &str, data: &[String]) -> Result<Request, RequestErr> {
    match kind {
        AIRCRAFT_TYPE => match data {
            [model, year, brand, ..] => Ok(Request::GetAircraft(RawAircraftId::new(
                model, year, brand,
            ))),
            _ => Err(RequestErr::MissingFields(GET_AIRCRAFT_USAGE_MSG)),
        },
        _ if kind.parse::<PersonKind>().is_ok() => match data {
            [cpf, ..] => Ok(Request::GetPerson { cpf: cpf.clone() }),
            _ => Err(RequestErr::MissingFields(MISSING_CPF_MSG)),
        },
        _ => Err(unknown_type("busca", kind)),
    }
}

fn parse_delete(kind: &str, data: &[String]) -> Result<Request, RequestErr> {
    match kind {
        AIRCRAFT_TYPE => match data {
            [model, year, brand, ..] => Ok(Request::DeleteAircraft(RawAircraftId::new(
                model, year, brand,
            ))),
            _ => Err(RequestErr::MissingFields(DELETE_AIRCRAFT_USAGE_MSG)),
        },
        _ if kind.parse::<PersonKind>().is_ok() => match data {
            [cpf, ..] => Ok(Request::DeletePerson { cpf: cpf.clone() }),
            _ => Err(RequestErr::MissingFields(MISSING_CPF_MSG)),
        },
        _ => Err(unknown_type("remoção", kind)),
    }
}

fn parse_list(kind: &str) -> Result<Request, RequestErr> {
    let target = match kind {
        AIRCRAFT_TYPE => ListTarget::Aircraft,
        ALL_TYPE => ListTarget::All,
        _ => ListTarget::Persons(
            kind.parse()
                .map_err(|_| unknown_type("listagem", kind))?,
        ),
    };

    Ok(Request::List(target))
}

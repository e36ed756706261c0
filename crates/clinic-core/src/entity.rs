//! Entity types — the four record kinds the service keeps.
//!
//! Each kind is a typed struct. The string-keyed hash representation used by
//! the store exists only at the repository boundary, via [`Entity::to_fields`]
//! and [`Entity::from_fields`]. Field names below are the stored wire names.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Params, Result, store::Fields};

/// Format of [`Individual::birth_date`] on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored field of a [`CaseRecord`] naming its [`Individual`].
pub const INDIVIDUAL_REF: &str = "patient_ID";

// ─── Kinds ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
  Facility,
  Practitioner,
  Individual,
  CaseRecord,
}

impl EntityKind {
  pub const ALL: [EntityKind; 4] = [
    Self::Facility,
    Self::Practitioner,
    Self::Individual,
    Self::CaseRecord,
  ];

  /// The key prefix this kind is stored under.
  pub fn prefix(self) -> &'static str {
    match self {
      Self::Facility => "hospital",
      Self::Practitioner => "doctor",
      Self::Individual => "patient",
      Self::CaseRecord => "diagnosis",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.prefix())
  }
}

// ─── Entity trait ────────────────────────────────────────────────────────────

/// A typed record that can be flattened into, and rebuilt from, a stored
/// field map.
pub trait Entity: Sized + Send + Sync + 'static {
  const KIND: EntityKind;

  fn to_fields(&self) -> Fields;

  /// Rebuild from stored fields. The error is a human-readable reason; the
  /// repository attaches kind and id.
  fn from_fields(fields: &Fields) -> Result<Self, String>;
}

/// A record together with the identifier it is stored under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<E> {
  pub id:     u64,
  #[serde(flatten)]
  pub record: E,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn field<'a>(fields: &'a Fields, name: &str) -> Result<&'a str, String> {
  fields
    .get(name)
    .map(String::as_str)
    .ok_or_else(|| format!("missing field {name:?}"))
}

fn fields<const N: usize>(pairs: [(&str, String); N]) -> Fields {
  pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

/// Parse a foreign identifier. Anything that is not a positive integer cannot
/// name a stored record.
pub(crate) fn parse_reference(kind: EntityKind, raw: &str) -> Result<u64> {
  raw
    .parse::<u64>()
    .ok()
    .filter(|id| *id > 0)
    .ok_or_else(|| Error::Reference { kind, reference: raw.to_owned() })
}

fn decode_optional_id(raw: &str) -> Result<Option<u64>, String> {
  if raw.is_empty() {
    return Ok(None);
  }
  raw.parse().map(Some).map_err(|_| format!("bad identifier {raw:?}"))
}

// ─── Facility ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
  pub name:    String,
  pub address: String,
  pub phone:   String,
  #[serde(rename = "beds_number")]
  pub beds:    Option<u32>,
}

impl Facility {
  /// Validate write parameters. `name` and `address` are required; `phone`
  /// is free text and `beds_number`, when given, must be a whole number.
  pub fn from_params(params: &Params) -> Result<Self> {
    let name = params.required("name")?.to_owned();
    let address = params.required("address")?.to_owned();
    let beds = params
      .optional("beds_number")
      .map(|raw| {
        raw.parse::<u32>().map_err(|_| Error::Validation {
          field:  "beds_number",
          reason: format!("{raw:?} is not a whole number"),
        })
      })
      .transpose()?;

    Ok(Self { name, address, phone: params.text("phone").to_owned(), beds })
  }
}

impl Entity for Facility {
  const KIND: EntityKind = EntityKind::Facility;

  fn to_fields(&self) -> Fields {
    fields([
      ("name", self.name.clone()),
      ("address", self.address.clone()),
      ("phone", self.phone.clone()),
      ("beds_number", self.beds.map(|b| b.to_string()).unwrap_or_default()),
    ])
  }

  fn from_fields(f: &Fields) -> Result<Self, String> {
    let beds = match field(f, "beds_number").unwrap_or("") {
      "" => None,
      raw => Some(raw.parse().map_err(|_| format!("bad bed count {raw:?}"))?),
    };
    Ok(Self {
      name: field(f, "name")?.to_owned(),
      address: field(f, "address")?.to_owned(),
      phone: field(f, "phone").unwrap_or("").to_owned(),
      beds,
    })
  }
}

// ─── Practitioner ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Practitioner {
  pub surname:     String,
  pub profession:  String,
  /// Optional reference into [`Facility`].
  #[serde(rename = "hospital_ID")]
  pub facility_id: Option<u64>,
}

impl Practitioner {
  /// Validate write parameters. A non-empty `hospital_ID` must be an
  /// identifier; whether it exists is checked later, against the store.
  pub fn from_params(params: &Params) -> Result<Self> {
    let surname = params.required("surname")?.to_owned();
    let profession = params.required("profession")?.to_owned();
    let facility_id = params
      .optional("hospital_ID")
      .map(|raw| parse_reference(EntityKind::Facility, raw))
      .transpose()?;
    Ok(Self { surname, profession, facility_id })
  }
}

impl Entity for Practitioner {
  const KIND: EntityKind = EntityKind::Practitioner;

  fn to_fields(&self) -> Fields {
    fields([
      ("surname", self.surname.clone()),
      ("profession", self.profession.clone()),
      (
        "hospital_ID",
        self.facility_id.map(|id| id.to_string()).unwrap_or_default(),
      ),
    ])
  }

  fn from_fields(f: &Fields) -> Result<Self, String> {
    Ok(Self {
      surname:     field(f, "surname")?.to_owned(),
      profession:  field(f, "profession")?.to_owned(),
      facility_id: decode_optional_id(field(f, "hospital_ID").unwrap_or(""))?,
    })
  }
}

// ─── Individual ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
  M,
  F,
}

impl Sex {
  pub fn code(self) -> &'static str {
    match self {
      Self::M => "M",
      Self::F => "F",
    }
  }
}

impl FromStr for Sex {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, String> {
    match s {
      "M" => Ok(Self::M),
      "F" => Ok(Self::F),
      other => Err(format!("{other:?} is not 'M' or 'F'")),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
  pub surname:       String,
  #[serde(rename = "born_date")]
  pub birth_date:    NaiveDate,
  pub sex:           Sex,
  /// Medical policy number.
  #[serde(rename = "mpn")]
  pub policy_number: String,
}

impl Individual {
  /// Validate write parameters. Every field is required; `sex` must be `M`
  /// or `F` and `born_date` a `YYYY-MM-DD` date.
  pub fn from_params(params: &Params) -> Result<Self> {
    let surname = params.required("surname")?.to_owned();
    let born = params.required("born_date")?;
    let sex = params.required("sex")?;
    let policy_number = params.required("mpn")?.to_owned();

    let sex = sex
      .parse::<Sex>()
      .map_err(|reason| Error::Validation { field: "sex", reason })?;
    let birth_date =
      NaiveDate::parse_from_str(born, DATE_FORMAT).map_err(|_| Error::Validation {
        field:  "born_date",
        reason: format!("{born:?} is not a YYYY-MM-DD date"),
      })?;

    Ok(Self { surname, birth_date, sex, policy_number })
  }
}

impl Entity for Individual {
  const KIND: EntityKind = EntityKind::Individual;

  fn to_fields(&self) -> Fields {
    fields([
      ("surname", self.surname.clone()),
      ("born_date", self.birth_date.format(DATE_FORMAT).to_string()),
      ("sex", self.sex.code().to_owned()),
      ("mpn", self.policy_number.clone()),
    ])
  }

  fn from_fields(f: &Fields) -> Result<Self, String> {
    let born = field(f, "born_date")?;
    Ok(Self {
      surname:       field(f, "surname")?.to_owned(),
      birth_date:    NaiveDate::parse_from_str(born, DATE_FORMAT)
        .map_err(|e| format!("bad birth date {born:?}: {e}"))?,
      sex:           field(f, "sex")?.parse()?,
      policy_number: field(f, "mpn")?.to_owned(),
    })
  }
}

// ─── CaseRecord ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
  /// Required reference into [`Individual`].
  #[serde(rename = "patient_ID")]
  pub individual_id: u64,
  #[serde(rename = "type")]
  pub case_type:     String,
  pub information:   String,
}

impl CaseRecord {
  /// Validate write parameters. `patient_ID` and `type` are required;
  /// `information` is free text.
  pub fn from_params(params: &Params) -> Result<Self> {
    let individual = params.required(INDIVIDUAL_REF)?;
    let case_type = params.required("type")?.to_owned();
    Ok(Self {
      individual_id: parse_reference(EntityKind::Individual, individual)?,
      case_type,
      information: params.text("information").to_owned(),
    })
  }
}

impl Entity for CaseRecord {
  const KIND: EntityKind = EntityKind::CaseRecord;

  fn to_fields(&self) -> Fields {
    fields([
      (INDIVIDUAL_REF, self.individual_id.to_string()),
      ("type", self.case_type.clone()),
      ("information", self.information.clone()),
    ])
  }

  fn from_fields(f: &Fields) -> Result<Self, String> {
    let individual = field(f, INDIVIDUAL_REF)?;
    Ok(Self {
      individual_id: individual
        .parse()
        .map_err(|_| format!("bad identifier {individual:?}"))?,
      case_type:     field(f, "type")?.to_owned(),
      information:   field(f, "information").unwrap_or("").to_owned(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn individual_params() -> Params {
    Params::new()
      .with("surname", "Ivanov")
      .with("born_date", "1980-04-12")
      .with("sex", "M")
      .with("mpn", "770011")
  }

  #[test]
  fn facility_requires_name_and_address() {
    let err = Facility::from_params(&Params::new().with("name", "City")).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "address", .. }));
  }

  #[test]
  fn facility_bed_count_must_be_numeric() {
    let p = Params::new()
      .with("name", "City")
      .with("address", "Main street")
      .with("beds_number", "lots");
    let err = Facility::from_params(&p).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "beds_number", .. }));
  }

  #[test]
  fn facility_fields_roundtrip() {
    let f = Facility {
      name:    "City Hospital".into(),
      address: "Main street".into(),
      phone:   "123".into(),
      beds:    Some(100),
    };
    let stored = f.to_fields();
    assert_eq!(stored["beds_number"], "100");
    assert_eq!(Facility::from_fields(&stored).unwrap(), f);
  }

  #[test]
  fn individual_rejects_unknown_sex() {
    let err = Individual::from_params(&individual_params().with("sex", "X")).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "sex", .. }));
  }

  #[test]
  fn individual_rejects_bad_date() {
    let err =
      Individual::from_params(&individual_params().with("born_date", "12/04/1980"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation { field: "born_date", .. }));
  }

  #[test]
  fn practitioner_without_facility_stores_empty_reference() {
    let p = Practitioner::from_params(
      &Params::new().with("surname", "Smith").with("profession", "surgeon"),
    )
    .unwrap();
    assert_eq!(p.facility_id, None);
    assert_eq!(p.to_fields()["hospital_ID"], "");
    assert_eq!(Practitioner::from_fields(&p.to_fields()).unwrap(), p);
  }

  #[test]
  fn non_numeric_reference_is_a_reference_error() {
    let p = Params::new().with("patient_ID", "abc").with("type", "flu");
    let err = CaseRecord::from_params(&p).unwrap_err();
    assert!(matches!(
      err,
      Error::Reference { kind: EntityKind::Individual, ref reference } if reference == "abc"
    ));
  }

  #[test]
  fn stored_serialises_flat() {
    let stored = Stored {
      id:     4,
      record: CaseRecord {
        individual_id: 1,
        case_type:     "flu".into(),
        information:   String::new(),
      },
    };
    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["id"], 4);
    assert_eq!(json["patient_ID"], 1);
    assert_eq!(json["type"], "flu");
  }
}

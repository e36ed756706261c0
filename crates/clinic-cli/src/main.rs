//! `clinic` — command-line client for the clinic record service.
//!
//! # Usage
//!
//! ```text
//! clinic create hospital name="City Hospital" address="Main street" beds_number=100
//! clinic create patient surname=Ivanov born_date=1980-04-12 sex=M mpn=7700
//! clinic link 1 1
//! clinic list patient
//! clinic analytics
//! ```

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clinic_core::{Params, entity::EntityKind};
use client::ApiClient;
use serde::{Deserialize, Serialize};

const DEFAULT_URL: &str = "http://localhost:8888";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "clinic", about = "Client for the clinic record service")]
struct Args {
  /// Path to a TOML config file (`url = "..."`).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the server (default: http://localhost:8888).
  #[arg(long, env = "CLINIC_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create a record from `name=value` parameters.
  Create {
    kind:   Kind,
    #[arg(value_parser = parse_param)]
    params: Vec<(String, String)>,
  },
  /// List every record of a kind.
  List { kind: Kind },
  /// Link a patient to a doctor.
  Link { doctor_id: u64, patient_id: u64 },
  /// Show every doctor's patients.
  Links,
  /// Show derived statistics.
  Analytics,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
  Hospital,
  Doctor,
  Patient,
  Diagnosis,
}

impl From<Kind> for EntityKind {
  fn from(k: Kind) -> Self {
    match k {
      Kind::Hospital => EntityKind::Facility,
      Kind::Doctor => EntityKind::Practitioner,
      Kind::Patient => EntityKind::Individual,
      Kind::Diagnosis => EntityKind::CaseRecord,
    }
  }
}

fn parse_param(s: &str) -> Result<(String, String), String> {
  s.split_once('=')
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .ok_or_else(|| format!("expected name=value, got {s:?}"))
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());

  let client = ApiClient::new(url)?;

  match args.command {
    Command::Create { kind, params } => {
      let params: Params = params.into_iter().collect();
      print_json(&client.create(kind.into(), &params).await?)
    }
    Command::List { kind } => print_json(&client.list(kind.into()).await?),
    Command::Link { doctor_id, patient_id } => {
      print_json(&client.link(doctor_id, patient_id).await?)
    }
    Command::Links => print_json(&client.links().await?),
    Command::Analytics => print_json(&client.analytics().await?),
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn params_split_on_first_equals() {
    assert_eq!(
      parse_param("information=a=b").unwrap(),
      ("information".to_owned(), "a=b".to_owned())
    );
    assert!(parse_param("nonsense").is_err());
  }

  #[test]
  fn create_command_parses() {
    let args = Args::try_parse_from([
      "clinic",
      "create",
      "doctor",
      "surname=Smith",
      "profession=surgeon",
    ])
    .unwrap();
    match args.command {
      Command::Create { kind, params } => {
        assert!(matches!(EntityKind::from(kind), EntityKind::Practitioner));
        assert_eq!(params.len(), 2);
      }
      other => panic!("unexpected command {other:?}"),
    }
  }
}

// flags.rs
use crate::DomainError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Flags reconocidos por defecto (claves booleanas del estado de vista).
pub const DEFAULT_FLAGS: [&str; 6] =
  ["viewedHome", "clickedLoans", "exploredSavings", "checkedCreditCards", "openedInvestments", "viewedCalculator"];

static DEFAULT_SCHEMA: Lazy<FlagSchema> = Lazy::new(|| FlagSchema { names: DEFAULT_FLAGS.iter().map(|s| s.to_string()).collect() });

/// Conjunto de claves de flag reconocidas. Un `FlagSet` sólo contiene estas
/// claves; cualquier otro nombre se ignora al aplicar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSchema {
  names: BTreeSet<String>,
}

impl FlagSchema {
  pub fn new<I, S>(names: I) -> Result<Self, DomainError>
  where I: IntoIterator<Item = S>,
        S: AsRef<str> {
    let names: BTreeSet<String> =
      names.into_iter().map(|n| n.as_ref().trim().to_string()).filter(|n| !n.is_empty()).collect();
    if names.is_empty() {
      return Err(DomainError::Validation("el esquema de flags no puede estar vacío".to_string()));
    }
    Ok(Self { names })
  }

  /// Interpreta una lista separada por comas (`INTENTFLOW_FLAGS`).
  pub fn parse_list(raw: &str) -> Result<Self, DomainError> {
    Self::new(raw.split(','))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.names.contains(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.names.iter().map(|s| s.as_str())
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

impl Default for FlagSchema {
  fn default() -> Self {
    DEFAULT_SCHEMA.clone()
  }
}

/// Resultado de aplicar un lote de flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagApplyOutcome {
  /// Flags que pasaron de `false` a `true` en esta aplicación.
  pub newly_set: Vec<String>,
  /// Flags reconocidos que ya estaban en `true` (no-op).
  pub already_set: Vec<String>,
  /// Nombres fuera del esquema; se ignoran.
  pub unknown: Vec<String>,
}

impl FlagApplyOutcome {
  pub fn changed(&self) -> bool {
    !self.newly_set.is_empty()
  }
}

/// Mapa nombre de flag -> booleano. Monótono: la única forma de volver un
/// flag a `false` es `reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
  flags: BTreeMap<String, bool>,
}

impl FlagSet {
  pub fn from_schema(schema: &FlagSchema) -> Self {
    Self { flags: schema.names().map(|n| (n.to_string(), false)).collect() }
  }

  /// `None` si el nombre no pertenece al esquema.
  pub fn get(&self, name: &str) -> Option<bool> {
    self.flags.get(name).copied()
  }

  pub fn is_set(&self, name: &str) -> bool {
    self.get(name).unwrap_or(false)
  }

  pub fn is_known(&self, name: &str) -> bool {
    self.flags.contains_key(name)
  }

  /// Unión monótona: pone a `true` cada nombre reconocido.
  pub fn apply<I, S>(&mut self, names: I) -> FlagApplyOutcome
  where I: IntoIterator<Item = S>,
        S: AsRef<str> {
    let mut outcome = FlagApplyOutcome::default();
    for name in names {
      let name = name.as_ref();
      match self.flags.get_mut(name) {
        Some(value) if *value => outcome.already_set.push(name.to_string()),
        Some(value) => {
          *value = true;
          outcome.newly_set.push(name.to_string());
        }
        None => outcome.unknown.push(name.to_string()),
      }
    }
    outcome
  }

  /// Reinicialización completa: todos los flags a `false`.
  pub fn reset(&mut self) {
    for value in self.flags.values_mut() {
      *value = false;
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
    self.flags.iter().map(|(k, v)| (k.as_str(), *v))
  }

  /// Nombres actualmente en `true`.
  pub fn active(&self) -> Vec<String> {
    self.flags.iter().filter(|(_, v)| **v).map(|(k, _)| k.clone()).collect()
  }

  /// Verdadero si todos los nombres están en `true`. Una lista vacía no
  /// satisface nada.
  pub fn all_set(&self, required: &[String]) -> bool {
    !required.is_empty() && required.iter().all(|f| self.is_set(f))
  }
}

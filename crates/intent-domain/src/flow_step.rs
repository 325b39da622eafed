// flow_step.rs
use crate::InteractionEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Regla que asocia un par (ubicación, acción) a uno o más flags.
///
/// Se construye normalizada: `event` ya contiene el valor de `action`
/// cuando el documento sólo traía el nombre heredado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStepDefinition {
  #[serde(rename = "parentUIComp")]
  pub parent_ui_comp: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub event: Option<String>,
  pub flags: Vec<String>,
}

/// Campo por el que un paso coincidió con un evento. Sólo diagnóstico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedBy {
  Action,
  Event,
  Both,
}

/// Paso descartado durante la normalización (sin `parentUIComp` o sin flags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardedStep {
  #[serde(rename = "parentUIComp")]
  pub parent_ui_comp: Option<String>,
  pub action: Option<String>,
  pub event: Option<String>,
}

impl FlowStepDefinition {
  /// Construye un paso con el nombre de evento actual.
  pub fn with_event<I, S>(parent_ui_comp: impl Into<String>, event: impl Into<String>, flags: I) -> Self
  where I: IntoIterator<Item = S>,
        S: Into<String> {
    Self { parent_ui_comp: parent_ui_comp.into(),
           action: None,
           event: Some(event.into()),
           flags: dedup(flags.into_iter().map(Into::into)) }
  }

  /// Construye un paso con el nombre heredado `action`. Igual que en la
  /// normalización, `event` toma el mismo valor.
  pub fn with_action<I, S>(parent_ui_comp: impl Into<String>, action: impl Into<String>, flags: I) -> Self
  where I: IntoIterator<Item = S>,
        S: Into<String> {
    let action = action.into();
    Self { parent_ui_comp: parent_ui_comp.into(),
           action: Some(action.clone()),
           event: Some(action),
           flags: dedup(flags.into_iter().map(Into::into)) }
  }

  /// Un paso coincide cuando la ruta es igual y el nombre del evento es
  /// igual a `action` o a `event`.
  pub fn matches(&self, event: &InteractionEvent) -> Option<MatchedBy> {
    if self.parent_ui_comp != event.url_path {
      return None;
    }
    let by_action = self.action.as_deref() == Some(event.event_name.as_str());
    let by_event = self.event.as_deref() == Some(event.event_name.as_str());
    match (by_action, by_event) {
      (true, true) => Some(MatchedBy::Both),
      (true, false) => Some(MatchedBy::Action),
      (false, true) => Some(MatchedBy::Event),
      (false, false) => None,
    }
  }

  /// Normaliza un paso crudo del documento de configuración.
  ///
  /// - `flags` = `flag` si es un arreglo, si no `flags`, si no vacío; se
  ///   descartan entradas no textuales o en blanco.
  /// - `event` = `event` si es texto, si no `action`.
  /// - sin `parentUIComp` o con cero flags el paso se descarta.
  pub fn normalize(raw: &JsonValue) -> Result<Self, DiscardedStep> {
    let text = |key: &str| raw.get(key).and_then(JsonValue::as_str).map(str::to_string);
    let parent_ui_comp = text("parentUIComp").filter(|p| !p.is_empty());
    let action = text("action");
    let event = text("event").or_else(|| action.clone());

    let flag_source = match (raw.get("flag"), raw.get("flags")) {
      (Some(JsonValue::Array(items)), _) => items.as_slice(),
      (_, Some(JsonValue::Array(items))) => items.as_slice(),
      _ => &[],
    };
    let flags = dedup(flag_source.iter()
                                 .filter_map(JsonValue::as_str)
                                 .filter(|f| !f.trim().is_empty())
                                 .map(str::to_string));

    match parent_ui_comp {
      Some(parent_ui_comp) if !flags.is_empty() => Ok(Self { parent_ui_comp, action, event, flags }),
      parent_ui_comp => Err(DiscardedStep { parent_ui_comp, action, event }),
    }
  }
}

fn dedup(flags: impl Iterator<Item = String>) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  for f in flags {
    if !out.contains(&f) {
      out.push(f);
    }
  }
  out
}

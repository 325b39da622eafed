// config.rs
//
// Frontera de ingesta del documento `enriched_config`: todas las variantes
// de nombres (`flag`/`flags`, `action`/`event`, `centredModal`) se resuelven
// aquí y el resto del sistema sólo ve `FlowConfig`.
use crate::{ComponentContent, DiscardedStep, DomainError, FlowStepDefinition, SurfaceId, VisibilityMapping};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Entrada de `eventFlagMapping`, en el orden en que aparece en el documento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFlagMappingEntry {
  pub key: String,
  pub event: String,
  /// Discriminador crudo tal como llegó (`componentContent`).
  pub component_content: String,
  /// Superficie resuelta a partir del discriminador, si es conocida.
  pub surface: Option<SurfaceId>,
  pub flags: Vec<String>,
}

/// Configuración completa normalizada.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfig {
  pub steps: Vec<FlowStepDefinition>,
  pub component_props: BTreeMap<SurfaceId, ComponentContent>,
  pub event_flag_mapping: Vec<EventFlagMappingEntry>,
  pub injection_config: VisibilityMapping,
  /// Pasos descartados en la normalización (diagnóstico).
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub discarded: Vec<DiscardedStep>,
}

impl FlowConfig {
  /// Decodifica el documento. Acepta tanto un objeto JSON como un string
  /// con JSON serializado.
  ///
  /// Sólo un string no parseable o un documento que no es un objeto son
  /// `DomainError::Parse`. Dentro del objeto cada sección se normaliza
  /// entrada por entrada: las entradas con forma inválida se descartan y se
  /// registran, los textos `null` quedan vacíos y los flags no textuales se
  /// filtran, igual que con los pasos de `flowSteps`.
  pub fn from_document(document: &JsonValue) -> Result<Self, DomainError> {
    let parsed;
    let document = match document {
      JsonValue::String(raw) => {
        parsed = serde_json::from_str::<JsonValue>(raw)?;
        &parsed
      }
      other => other,
    };
    let object = document.as_object()
                         .ok_or_else(|| DomainError::Parse(format!("enriched_config no es un objeto: {}", kind(document))))?;

    let mut steps = Vec::new();
    let mut discarded = Vec::new();
    match object.get("flowSteps") {
      Some(JsonValue::Array(raw_steps)) => {
        for raw in raw_steps {
          match FlowStepDefinition::normalize(raw) {
            Ok(step) => steps.push(step),
            Err(d) => discarded.push(d),
          }
        }
      }
      None | Some(JsonValue::Null) => {}
      Some(other) => log::warn!("flowSteps is {} instead of an array, ignored", kind(other)),
    }

    let mut component_props = BTreeMap::new();
    for (key, value) in section(object, "componentProps") {
      let Some(surface) = SurfaceId::parse(key) else {
        log::debug!("componentProps key '{}' is not a known surface, ignored", key);
        continue;
      };
      match content_entry(value) {
        Some(content) => {
          component_props.insert(surface, content);
        }
        None => log::warn!("componentProps.{} is {} instead of an object, ignored", key, kind(value)),
      }
    }

    let mut event_flag_mapping = Vec::new();
    for (key, value) in section(object, "eventFlagMapping") {
      let Some(entry) = value.as_object() else {
        log::warn!("eventFlagMapping.{} is {} instead of an object, ignored", key, kind(value));
        continue;
      };
      let component_content = text(entry, "componentContent");
      event_flag_mapping.push(EventFlagMappingEntry { key: key.clone(),
                                                      event: text(entry, "event"),
                                                      surface: SurfaceId::parse(&component_content),
                                                      component_content,
                                                      flags: string_list(entry.get("flags")) });
    }

    let mut injection_config = VisibilityMapping::default();
    for (key, value) in section(object, "injectionConfig") {
      let Some(surface) = SurfaceId::parse(key) else {
        log::debug!("injectionConfig key '{}' is not a known surface, ignored", key);
        continue;
      };
      match value {
        JsonValue::Array(_) => injection_config.insert(surface, string_list(Some(value))),
        other => log::warn!("injectionConfig.{} is {} instead of an array, ignored", key, kind(other)),
      }
    }

    Ok(Self { steps, component_props, event_flag_mapping, injection_config, discarded })
  }

  /// Mapa de visibilidad derivado (ver `VisibilityMapping::derive`).
  pub fn visibility_mapping(&self) -> VisibilityMapping {
    VisibilityMapping::derive(&self.event_flag_mapping, &self.injection_config)
  }

  pub fn content_for(&self, surface: SurfaceId) -> Option<&ComponentContent> {
    self.component_props.get(&surface)
  }
}

/// Sección opcional del documento. Ausente o `null`: vacía; con otra forma
/// que no sea un objeto: se registra y se trata como vacía.
fn section<'a>(object: &'a Map<String, JsonValue>, name: &str) -> impl Iterator<Item = (&'a String, &'a JsonValue)> {
  let entries = match object.get(name) {
    Some(JsonValue::Object(entries)) => Some(entries),
    None | Some(JsonValue::Null) => None,
    Some(other) => {
      log::warn!("{} is {} instead of an object, ignored", name, kind(other));
      None
    }
  };
  entries.into_iter().flat_map(|m| m.iter())
}

/// Campo de texto; ausente, `null` o no textual -> vacío.
fn text(entry: &Map<String, JsonValue>, key: &str) -> String {
  entry.get(key).and_then(JsonValue::as_str).unwrap_or_default().to_string()
}

/// Lista de flags: sólo entradas textuales no vacías, en orden.
fn string_list(value: Option<&JsonValue>) -> Vec<String> {
  match value {
    Some(JsonValue::Array(items)) => items.iter()
                                          .filter_map(JsonValue::as_str)
                                          .filter(|f| !f.trim().is_empty())
                                          .map(str::to_string)
                                          .collect(),
    _ => Vec::new(),
  }
}

/// Contenido de una superficie. El texto se toma de `text`, `content`,
/// `innerContent` o `message`, el primero que sea textual.
fn content_entry(value: &JsonValue) -> Option<ComponentContent> {
  let entry = value.as_object()?;
  let body = ["text", "content", "innerContent", "message"].iter()
                                                        .find_map(|k| entry.get(*k).and_then(JsonValue::as_str))
                                                        .unwrap_or_default();
  Some(ComponentContent::new(body, text(entry, "imageUrl"), text(entry, "link")))
}

fn kind(v: &JsonValue) -> &'static str {
  match v {
    JsonValue::Null => "null",
    JsonValue::Bool(_) => "bool",
    JsonValue::Number(_) => "number",
    JsonValue::String(_) => "string",
    JsonValue::Array(_) => "array",
    JsonValue::Object(_) => "object",
  }
}

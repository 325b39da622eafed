// Archivo: matcher.rs
// Propósito: comparar un lote de eventos contra los pasos de flujo cacheados
// y producir la unión de flags a aplicar en una sola actualización.
use intent_domain::{FlowStepDefinition, InteractionEvent, MatchedBy};
use serde::Serialize;
use std::collections::BTreeSet;

/// Coincidencia (paso, evento) registrada para diagnóstico.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub url_path: String,
    pub event_name: String,
    pub matched_by: MatchedBy,
    pub flags: Vec<String>,
}

/// Resultado de comparar un lote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchMatch {
    /// Unión de los flags de todas las coincidencias del lote.
    pub flags: BTreeSet<String>,
    pub matches: Vec<MatchSummary>,
}

impl BatchMatch {
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Comparador de pasos de flujo. Sin estado: O(eventos × pasos) por lote.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowMatcher;

impl FlowMatcher {
    pub fn new() -> Self {
        FlowMatcher
    }

    pub fn match_batch(&self, events: &[InteractionEvent], steps: &[FlowStepDefinition]) -> BatchMatch {
        let mut out = BatchMatch::default();
        for event in events {
            for step in steps {
                if let Some(matched_by) = step.matches(event) {
                    out.flags.extend(step.flags.iter().cloned());
                    out.matches.push(MatchSummary { url_path: event.url_path.clone(),
                                                    event_name: event.event_name.clone(),
                                                    matched_by,
                                                    flags: step.flags.clone() });
                }
            }
        }

        if out.is_empty() {
            log::info!("flow step comparison completed with no matches (processed_events={}, tracked_steps={})",
                       events.len(),
                       steps.len());
        } else {
            log::info!("flow step matches detected: flags={:?} matches={}",
                       out.flags,
                       serde_json::to_string(&out.matches).unwrap_or_default());
        }
        out
    }
}

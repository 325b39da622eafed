// Archivo: state.rs
// Propósito: almacén canónico de flags + configuración activa.
//
// Es el único recurso mutable compartido. Las escrituras se serializan a
// través del `watch::Sender` y cada una publica un `StateSnapshot` nuevo e
// inmutable; los lectores sólo clonan el `Arc` del snapshot vigente.
use crate::connectors::ConfigOrigin;
use crate::resolver::{resolve, VisibilityDecision};
use intent_domain::{ComponentContent, FlagApplyOutcome, FlagSchema, FlagSet, FlowConfig, FlowStepDefinition, SurfaceId,
                    VisibilityMapping};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Configuración activa: el documento decodificado completo y el mapa de
/// visibilidad derivado de él se reemplazan juntos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveConfig {
    /// Configuración completa tal como se decodificó (pasos, contenido,
    /// `eventFlagMapping`, `injectionConfig` y pasos descartados).
    pub full: FlowConfig,
    pub visibility: VisibilityMapping,
    pub origin: Option<ConfigOrigin>,
}

impl ActiveConfig {
    pub fn steps(&self) -> &[FlowStepDefinition] {
        &self.full.steps
    }

    pub fn content(&self) -> &BTreeMap<SurfaceId, ComponentContent> {
        &self.full.component_props
    }
}

/// Vista inmutable del estado en una revisión.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub revision: u64,
    pub flags: FlagSet,
    pub config: Arc<ActiveConfig>,
    pub decision: VisibilityDecision,
}

impl StateSnapshot {
    fn initial(schema: &FlagSchema) -> Self {
        let flags = FlagSet::from_schema(schema);
        let config = Arc::new(ActiveConfig::default());
        let decision = resolve(&flags, &config.visibility, config.content());
        Self { revision: 0, flags, config, decision }
    }
}

/// Almacén de estado del motor.
pub struct FlowStateStore {
    tx: watch::Sender<Arc<StateSnapshot>>,
}

impl FlowStateStore {
    pub fn new(schema: &FlagSchema) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(StateSnapshot::initial(schema)));
        Self { tx }
    }

    /// Snapshot vigente.
    pub fn snapshot(&self) -> Arc<StateSnapshot> {
        self.tx.borrow().clone()
    }

    /// Suscripción a cada snapshot nuevo. Las escrituras que no cambian nada
    /// no notifican.
    pub fn subscribe(&self) -> watch::Receiver<Arc<StateSnapshot>> {
        self.tx.subscribe()
    }

    /// Aplica un lote de flags como una única actualización atómica.
    /// Reconocidos -> `true`; ya activos -> no-op; desconocidos -> ignorados.
    pub fn apply_flags<I, S>(&self, names: I) -> FlagApplyOutcome
        where I: IntoIterator<Item = S>,
              S: AsRef<str>
    {
        let mut outcome = FlagApplyOutcome::default();
        self.tx.send_if_modified(|current| {
                   let mut flags = current.flags.clone();
                   outcome = flags.apply(names);
                   for unknown in &outcome.unknown {
                       log::warn!("matched flag '{}' is not part of the flag schema, ignored", unknown);
                   }
                   if !outcome.changed() {
                       return false;
                   }
                   let decision = resolve(&flags, &current.config.visibility, current.config.content());
                   *current = Arc::new(StateSnapshot { revision: current.revision + 1,
                                                       flags,
                                                       config: current.config.clone(),
                                                       decision });
                   true
               });
        if outcome.changed() {
            log::info!("flags set: {:?}", outcome.newly_set);
        }
        outcome
    }

    /// Reemplaza la configuración completa y su mapa de visibilidad de forma
    /// atómica y recalcula la decisión.
    pub fn replace_config(&self, config: FlowConfig, origin: Option<ConfigOrigin>) -> Arc<StateSnapshot> {
        let visibility = config.visibility_mapping();
        let active = Arc::new(ActiveConfig { full: config, visibility, origin });
        self.tx.send_modify(|current| {
                   let decision = resolve(&current.flags, &active.visibility, active.content());
                   *current = Arc::new(StateSnapshot { revision: current.revision + 1,
                                                       flags: current.flags.clone(),
                                                       config: active,
                                                       decision });
               });
        self.snapshot()
    }

    /// Reinicialización explícita: todos los flags vuelven a `false`. Fuera
    /// de la operación normal.
    pub fn reset(&self) {
        self.tx.send_modify(|current| {
                   let mut flags = current.flags.clone();
                   flags.reset();
                   let decision = resolve(&flags, &current.config.visibility, current.config.content());
                   *current = Arc::new(StateSnapshot { revision: current.revision + 1,
                                                       flags,
                                                       config: current.config.clone(),
                                                       decision });
               });
        log::info!("flag state reset");
    }
}

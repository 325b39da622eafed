// Archivo: service.rs
// Propósito: poller del lado de presentación. Sincroniza el tablero de
// superficies con los snapshots del motor y consulta el canal de override
// del backend en su propio temporizador.
use crate::errors::Result;
use crate::scheduler::{ShutdownSignal, TickSource};
use crate::state::StateSnapshot;
use crate::surface::SurfaceBoard;
use async_trait::async_trait;
use intent_domain::{ComponentContent, SurfaceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Intervalo por defecto del poller de presentación (ms).
pub const DEFAULT_PRESENTATION_INTERVAL_MS: u64 = 10_000;

/// Petición al canal de override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub session_id: String,
    pub state: Vec<String>,
}

/// Componente forzado por el backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideComponent {
    /// `bottomCard` | `centeredModal` (acepta `centredModal`).
    #[serde(rename = "type")]
    pub surface: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, alias = "content", alias = "message")]
    pub inner_content: String,
    #[serde(default)]
    pub image_url: String,
}

impl OverrideComponent {
    fn content(&self) -> ComponentContent {
        ComponentContent::new(self.inner_content.clone(), self.image_url.clone(), self.link.clone())
    }
}

/// Respuesta del canal de override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideResponse {
    #[serde(default)]
    pub updated_state: Option<Vec<String>>,
    #[serde(default)]
    pub components: Option<OverrideComponent>,
}

/// Canal de override del backend.
#[async_trait]
pub trait OverrideChannel: Send + Sync {
    async fn update(&self, request: &OverrideRequest) -> Result<OverrideResponse>;
}

#[async_trait]
impl<T> OverrideChannel for Arc<T> where T: OverrideChannel + ?Sized
{
    async fn update(&self, request: &OverrideRequest) -> Result<OverrideResponse> {
        (**self).update(request).await
    }
}

/// Resultado de una consulta al canal de override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverridePoll {
    /// Respuesta recibida; `forced` es la superficie abierta, si hubo una.
    Updated { forced: Option<SurfaceId> },
    /// Backend inalcanzable: sin cambios en este ciclo.
    Unreachable(String),
}

/// Sesión del cliente de presentación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationSession {
    pub session_id: String,
    pub state: Vec<String>,
}

impl PresentationSession {
    /// Usa el id del host si se conoce; si no, genera uno.
    pub fn new(session_id: Option<String>) -> Self {
        let session_id = session_id.filter(|s| !s.trim().is_empty())
                                   .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self { session_id, state: Vec::new() }
    }
}

/// Servicio de presentación: dueño del `SurfaceBoard` de una sesión.
pub struct PresentationService<C>
    where C: OverrideChannel
{
    channel: C,
    session: PresentationSession,
    board: SurfaceBoard,
    snapshots: Option<watch::Receiver<Arc<StateSnapshot>>>,
}

impl<C> PresentationService<C> where C: OverrideChannel
{
    /// El tablero arranca con todas las superficies ocultas.
    pub fn new(channel: C, session: PresentationSession) -> Self {
        Self { channel, session, board: SurfaceBoard::new(), snapshots: None }
    }

    /// Conecta el servicio a los snapshots del motor.
    pub fn with_snapshots(mut self, snapshots: watch::Receiver<Arc<StateSnapshot>>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn session(&self) -> &PresentationSession {
        &self.session
    }

    pub fn board(&self) -> &SurfaceBoard {
        &self.board
    }

    /// Cierre explícito de una superficie por el usuario.
    pub fn dismiss(&mut self, surface: SurfaceId) -> Result<()> {
        self.board.dismiss(surface)
    }

    pub fn dismiss_error(&mut self) {
        self.board.dismiss_error();
    }

    /// Aplica la decisión de un snapshot al tablero.
    pub fn sync_decision(&mut self, snapshot: &StateSnapshot) -> Option<SurfaceId> {
        self.board.present(&snapshot.decision)
    }

    /// Lee el último snapshot publicado, si hay suscripción.
    pub fn sync_from_engine(&mut self) -> Option<SurfaceId> {
        let snapshot = self.snapshots.as_mut().map(|rx| rx.borrow_and_update().clone())?;
        self.sync_decision(&snapshot)
    }

    /// Una consulta al canal de override.
    pub async fn poll_override(&mut self) -> OverridePoll {
        let request = OverrideRequest { session_id: self.session.session_id.clone(), state: self.session.state.clone() };
        match self.channel.update(&request).await {
            Ok(response) => {
                self.board.dismiss_error();
                if let Some(state) = response.updated_state {
                    self.session.state = state;
                }
                let forced = response.components.and_then(|component| match SurfaceId::parse(&component.surface) {
                    Some(surface) => {
                        self.board.force_open(surface, component.content());
                        Some(surface)
                    }
                    None => {
                        log::warn!("override component with unknown surface type '{}', ignored", component.surface);
                        None
                    }
                });
                OverridePoll::Updated { forced }
            }
            Err(e) => {
                log::warn!("override channel unreachable for session {}: {}", self.session.session_id, e);
                self.board.report_error(e.to_string());
                OverridePoll::Unreachable(e.to_string())
            }
        }
    }

    /// Un ciclo completo: snapshot del motor y luego override.
    pub async fn cycle(&mut self) -> OverridePoll {
        self.sync_from_engine();
        self.poll_override().await
    }

    /// Ejecuta ciclos hasta el apagado o hasta agotar la fuente de ticks.
    /// Devuelve la cantidad de ciclos completados.
    pub async fn run<T>(&mut self, ticks: &mut T, shutdown: &mut ShutdownSignal) -> u64
        where T: TickSource
    {
        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                more = ticks.next_tick() => {
                    if !more {
                        break;
                    }
                    self.cycle().await;
                    cycles += 1;
                }
            }
        }
        log::info!("presentation poller for session {} stopped after {} cycles", self.session.session_id, cycles);
        cycles
    }
}

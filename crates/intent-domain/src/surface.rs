// surface.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Superficies de inyección conocidas.
///
/// El orden de declaración es también la prioridad de presentación:
/// `BottomCard` gana a `CenteredModal` cuando ambas son elegibles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SurfaceId {
  #[serde(rename = "bottomCard")]
  BottomCard,
  #[serde(rename = "centeredModal", alias = "centredModal")]
  CenteredModal,
}

impl SurfaceId {
  /// Prioridad fija usada por el resolvedor de visibilidad.
  pub const PRIORITY: [SurfaceId; 2] = [SurfaceId::BottomCard, SurfaceId::CenteredModal];

  pub fn as_str(&self) -> &'static str {
    match self {
      SurfaceId::BottomCard => "bottomCard",
      SurfaceId::CenteredModal => "centeredModal",
    }
  }

  /// Interpreta un identificador de superficie tal como llega en la
  /// configuración. `centredModal` se acepta como alias heredado de
  /// `centeredModal`.
  pub fn parse(raw: &str) -> Option<Self> {
    match raw.trim() {
      "bottomCard" => Some(SurfaceId::BottomCard),
      "centeredModal" => Some(SurfaceId::CenteredModal),
      "centredModal" => {
        log::debug!("surface id 'centredModal' normalized to 'centeredModal'");
        Some(SurfaceId::CenteredModal)
      }
      _ => None,
    }
  }
}

impl fmt::Display for SurfaceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Contenido a renderizar cuando una superficie se muestra.
///
/// `text` acepta también `content` (nombre usado en `componentProps`) e
/// `innerContent` (nombre usado por el canal de override).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentContent {
  #[serde(default, alias = "content", alias = "innerContent", alias = "message")]
  pub text: String,
  #[serde(default)]
  pub image_url: String,
  #[serde(default)]
  pub link: String,
}

impl ComponentContent {
  pub fn new(text: impl Into<String>, image_url: impl Into<String>, link: impl Into<String>) -> Self {
    Self { text: text.into(), image_url: image_url.into(), link: link.into() }
  }
}

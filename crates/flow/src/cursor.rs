// Archivo: cursor.rs
// Propósito: almacén de cursores (marca de agua de timestamp) por stream
// consultado. Los cursores sólo avanzan, nunca retroceden.
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::UNIX_EPOCH;

/// Streams consultados de forma incremental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Events,
    Config,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Events => f.write_str("website_event"),
            Stream::Config => f.write_str("llm_enriched_config"),
        }
    }
}

/// Último `createdAt` procesado de un stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cursor(DateTime<Utc>);

impl Cursor {
    /// Cursor inicial cuando el stream no tiene filas (epoch).
    pub fn origin() -> Self {
        Cursor(DateTime::<Utc>::from(UNIX_EPOCH))
    }

    pub fn at(ts: DateTime<Utc>) -> Self {
        Cursor(ts)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::origin()
    }
}

/// Cursores por stream. Propiedad exclusiva del motor.
///
/// `advance` es monótono: un valor menor que el actual se ignora.
#[derive(Debug, Default)]
pub struct CursorStore {
    cursors: DashMap<Stream, Cursor>,
}

impl CursorStore {
    pub fn new() -> Self {
        Self { cursors: DashMap::new() }
    }

    /// Cursor actual; `Cursor::origin()` si nunca se fijó.
    pub fn get(&self, stream: Stream) -> Cursor {
        self.cursors.get(&stream).map(|c| *c).unwrap_or_default()
    }

    /// Avanza el cursor a `to` si es mayor. Devuelve el cursor resultante.
    pub fn advance(&self, stream: Stream, to: DateTime<Utc>) -> Cursor {
        let mut entry = self.cursors.entry(stream).or_default();
        if to > entry.0 {
            entry.0 = to;
        }
        *entry
    }
}

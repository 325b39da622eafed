mod config;
mod errors;
mod event;
mod flags;
mod flow_step;
mod surface;
mod visibility;

pub use config::{EventFlagMappingEntry, FlowConfig};
pub use errors::DomainError;
pub use event::{ConfigRecord, InteractionEvent};
pub use flags::{FlagApplyOutcome, FlagSchema, FlagSet, DEFAULT_FLAGS};
pub use flow_step::{DiscardedStep, FlowStepDefinition, MatchedBy};
pub use surface::{ComponentContent, SurfaceId};
pub use visibility::VisibilityMapping;

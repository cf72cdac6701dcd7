//! Core library for Driftwave, an ambient tone generator whose sound is
//! reshaped over a timed session by a declarative [`SoundProfile`].
//!
//! Each module owns one piece of the automation pipeline: curve evaluation,
//! unit mapping, per-frame scheduling, the Pro Mode feedback loop and the
//! session lifecycle that ties them to an [`AudioGraph`]. The synthesis back
//! end itself lives outside this crate and is reached through the
//! [`AudioBackend`] trait.

pub mod adaptive;
pub mod audio;
pub mod automation;
pub mod config;
pub mod curve;
pub mod error;
pub mod mapping;
pub mod profile;
pub mod session;
pub mod timeline;

pub use adaptive::{AdaptiveController, AdaptiveSnapshot, Adjustment, InteractionHandle, Offsets};
pub use audio::{
    AudioBackend, AudioGraph, GainStage, GraphSnapshot, RecordingBackend, RecordingGraph,
    UnavailableBackend,
};
pub use automation::{FrameTargets, ParameterScheduler};
pub use config::{AdaptiveConfig, AppConfig, EngineConfig, FrameConfig};
pub use curve::interpolate;
pub use error::{DriftwaveError, Result};
pub use mapping::{ControlTarget, ModulationKind, ParameterUpdate, TextureParams};
pub use profile::{CurvePoint, Modulation, ProfileSummary, SilenceBlock, SoundProfile};
pub use session::{CompletionEvent, Engine, PreviewLayer, Progress, TickOutcome};
pub use timeline::{ManualClock, SystemClock, TimeSource};

//! Core library for the TypewriterFX hero animation.
//!
//! A phrase sequencer types and erases title/subtitle pairs in a loop and
//! fans every step out to sound effects, a reactive particle backdrop and a
//! decorative pointer follower. The host page is modelled as explicit input
//! events on a virtual millisecond clock, so a whole session can be replayed
//! deterministically without a browser.

pub mod analysis;
pub mod assets;
pub mod audio;
pub mod backdrop;
pub mod bootstrap;
pub mod config;
pub mod cursor;
pub mod error;
pub mod record;
pub mod runtime;
pub mod scene;
pub mod sequencer;
pub mod timeline;
pub mod tween;

pub use analysis::{ToneAnalyser, ToneAnalysis};
pub use assets::{AssetCatalog, DependencyLoader, DirectoryLoader};
pub use audio::{SoundEffectPlayer, ToneRecorder, ToneSink};
pub use backdrop::ParticleBackdrop;
pub use bootstrap::{launch, load_dependencies};
pub use config::{AppConfig, AudioConfig};
pub use cursor::PointerFollower;
pub use error::{Result, TypewriterError};
pub use record::{Recorder, RecordingSettings};
pub use runtime::{Command, Controls, HeroRuntime, HeroSnapshot, HostEvent};
pub use scene::{Page, Viewport};
pub use sequencer::{EffectHooks, Phase, PhraseSequencer, SequencerState, Stats};
pub use timeline::{PlaybackClock, ScheduledEvent, Scheduler};
pub use tween::Easing;

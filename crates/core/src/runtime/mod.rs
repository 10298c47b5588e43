//! The host side of the hero animation: input events, the frame loop and the
//! control surface handed back by [`crate::bootstrap::launch`].

use glam::Vec2;
use serde::Serialize;

use crate::{
    audio::SoundEffectPlayer,
    backdrop::{BackdropFrame, ParticleBackdrop},
    cursor::{CursorFrame, PointerFollower},
    scene::{ElementStyle, LetterStyle, Viewport},
    sequencer::{HeroEffects, Phase, PhraseSequencer, SequencerState, Stats},
};

/// Share of the hero section that must be on screen before the sequence
/// starts.
pub const VISIBILITY_THRESHOLD: f32 = 0.1;

/// Inputs coming from the page.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Fraction of the hero section inside the viewport.
    Visibility { ratio: f32 },
    PointerMove { x: f32, y: f32 },
    PointerEnter { selector: String },
    PointerLeave { selector: String },
    Click,
    KeyPress,
    Resize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Restart,
}

/// The narrow control surface exposed to whoever embeds the animation.
pub trait Controls {
    fn pause(&mut self) -> bool;
    fn resume(&mut self) -> bool;
    fn restart(&mut self) -> bool;
    fn stats(&self) -> Stats;
}

/// Fires once, the first time the observed ratio reaches the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityTrigger {
    threshold: f32,
    fired: bool,
}

impl VisibilityTrigger {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            fired: false,
        }
    }

    pub fn observe(&mut self, ratio: f32) -> bool {
        if self.fired || ratio < self.threshold {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

impl Default for VisibilityTrigger {
    fn default() -> Self {
        Self::new(VISIBILITY_THRESHOLD)
    }
}

/// What the page would show at one instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSnapshot {
    pub at_ms: u64,
    pub phase: Phase,
    pub state: SequencerState,
    pub title_markup: String,
    pub subtitle_text: String,
    pub title_style: ElementStyle,
    pub subtitle_style: ElementStyle,
    pub letter_style: Option<LetterStyle>,
    pub audio_unlocked: bool,
    pub backdrop_frames: u64,
    #[serde(skip)]
    pub backdrop: Option<BackdropFrame>,
    #[serde(skip)]
    pub cursor: Option<CursorFrame>,
}

pub struct HeroRuntime {
    sequencer: PhraseSequencer<HeroEffects>,
    follower: PointerFollower,
    trigger: VisibilityTrigger,
    frame_interval_ms: u64,
    next_frame_ms: u64,
    now_ms: u64,
    last_backdrop: Option<BackdropFrame>,
    last_cursor: Option<CursorFrame>,
}

impl HeroRuntime {
    pub fn new(
        sequencer: PhraseSequencer<HeroEffects>,
        follower: PointerFollower,
        frame_interval_ms: u64,
    ) -> Self {
        Self {
            sequencer,
            follower,
            trigger: VisibilityTrigger::default(),
            frame_interval_ms: frame_interval_ms.max(1),
            next_frame_ms: 0,
            now_ms: 0,
            last_backdrop: None,
            last_cursor: None,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn sequencer(&self) -> &PhraseSequencer<HeroEffects> {
        &self.sequencer
    }

    pub fn follower(&self) -> &PointerFollower {
        &self.follower
    }

    pub fn sound(&self) -> &SoundEffectPlayer {
        self.sequencer.hooks().sound()
    }

    pub fn backdrop(&self) -> Option<&ParticleBackdrop> {
        self.sequencer.hooks().backdrop()
    }

    pub fn is_triggered(&self) -> bool {
        self.trigger.has_fired()
    }

    /// Runs every animation frame due up to `target_ms`, with the sequencer
    /// caught up to each frame first. Earlier targets are ignored.
    pub fn advance_to(&mut self, target_ms: u64) {
        if target_ms < self.now_ms {
            return;
        }
        while self.next_frame_ms <= target_ms {
            let at = self.next_frame_ms;
            self.sequencer.advance_to(at);
            self.render_frame(at);
            self.next_frame_ms += self.frame_interval_ms;
        }
        self.sequencer.advance_to(target_ms);
        self.now_ms = target_ms;
    }

    pub fn dispatch(&mut self, event: HostEvent) {
        let now = self.now_ms;
        match event {
            HostEvent::Visibility { ratio } => {
                if self.trigger.observe(ratio) {
                    tracing::info!(ratio, at_ms = now, "hero section visible");
                    self.sequencer.start();
                }
            }
            HostEvent::PointerMove { x, y } => {
                self.follower.pointer_moved(Vec2::new(x, y), now);
                if let Some(backdrop) = self.sequencer.hooks_mut().backdrop_mut() {
                    backdrop.pointer_moved(x, y);
                }
            }
            HostEvent::PointerEnter { selector } => self.follower.pointer_entered(&selector, now),
            HostEvent::PointerLeave { selector } => self.follower.pointer_left(&selector, now),
            HostEvent::Click | HostEvent::KeyPress => {
                self.sequencer.hooks_mut().sound_mut().unlock();
            }
            HostEvent::Resize { width, height } => {
                if let Some(backdrop) = self.sequencer.hooks_mut().backdrop_mut() {
                    backdrop.resize(Viewport::new(width, height));
                }
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::Pause => self.sequencer.pause(),
            Command::Resume => self.sequencer.resume(),
            Command::Restart => self.sequencer.restart(),
        }
    }

    pub fn snapshot(&self) -> HeroSnapshot {
        let now = self.now_ms;
        let title = self.sequencer.title();
        let subtitle = self.sequencer.subtitle();
        HeroSnapshot {
            at_ms: now,
            phase: self.sequencer.phase(),
            state: self.sequencer.state(),
            title_markup: title.markup(),
            subtitle_text: subtitle.text_content(),
            title_style: title.style_at(now),
            subtitle_style: subtitle.style_at(now),
            letter_style: title.letter_style_at(now),
            audio_unlocked: self.sound().is_unlocked(),
            backdrop_frames: self.backdrop().map_or(0, ParticleBackdrop::frames_rendered),
            backdrop: self.last_backdrop,
            cursor: self.last_cursor,
        }
    }

    fn render_frame(&mut self, at_ms: u64) {
        self.last_cursor = self.follower.frame(at_ms);
        if let Some(backdrop) = self.sequencer.hooks_mut().backdrop_mut() {
            // A stopped loop keeps showing its last frame.
            if let Some(frame) = backdrop.frame(at_ms) {
                self.last_backdrop = Some(frame);
            }
        }
    }
}

impl Controls for HeroRuntime {
    fn pause(&mut self) -> bool {
        self.execute(Command::Pause)
    }

    fn resume(&mut self) -> bool {
        self.execute(Command::Resume)
    }

    fn restart(&mut self) -> bool {
        self.execute(Command::Restart)
    }

    fn stats(&self) -> Stats {
        self.sequencer.stats()
    }
}

impl std::fmt::Debug for HeroRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeroRuntime")
            .field("now_ms", &self.now_ms)
            .field("triggered", &self.trigger.has_fired())
            .field("sequencer", &self.sequencer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::AssetCatalog,
        audio::ToneRecorder,
        bootstrap::launch,
        scene::Page,
        AppConfig,
    };

    /// Entry ends at 100; "HI" types at 110 and 120.
    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.typing.title_phrases = vec!["HI".into(), "YO".into()];
        config.typing.subtitle_phrases = vec!["sub".into()];
        config.typing.type_speed_ms = 10;
        config.typing.back_speed_ms = 5;
        config.typing.start_delay_ms = 0;
        config.typing.back_delay_ms = 50;
        config.typing.subtitle_start_offset_ms = 10;
        config.typing.subtitle_back_delay_ms = 20;
        config.transitions.entry.duration_ms = 100;
        config.transitions.exit.duration_ms = 40;
        config.backdrop.particle_count = 50;
        config.frame_interval_ms = 10;
        config
    }

    fn runtime(config: &AppConfig, recorder: &ToneRecorder) -> HeroRuntime {
        let page = Page::hero(Viewport::default(), &config.selectors);
        let catalog = AssetCatalog::bundled(&config.dependencies);
        launch(config, &page, &catalog, Box::new(recorder.clone())).unwrap()
    }

    #[test]
    fn visibility_starts_the_sequence_once() {
        let config = config();
        let recorder = ToneRecorder::new(8_000);
        let mut runtime = runtime(&config, &recorder);

        runtime.dispatch(HostEvent::Visibility { ratio: 0.05 });
        assert_eq!(runtime.sequencer().phase(), Phase::Idle);

        runtime.dispatch(HostEvent::Visibility { ratio: 0.1 });
        assert!(runtime.is_triggered());
        assert_eq!(runtime.sequencer().phase(), Phase::Entering);

        runtime.advance_to(50);
        runtime.dispatch(HostEvent::Visibility { ratio: 1.0 });
        assert_eq!(runtime.stats().animations_run, 2);
    }

    #[test]
    fn tones_stay_silent_until_a_gesture() {
        let config = config();
        let recorder = ToneRecorder::new(8_000);
        let mut runtime = runtime(&config, &recorder);
        runtime.dispatch(HostEvent::Visibility { ratio: 1.0 });

        runtime.advance_to(115);
        assert_eq!(runtime.stats().typed_chars, 1);
        assert_eq!(recorder.tone_count().unwrap(), 0);

        runtime.dispatch(HostEvent::Click);
        runtime.advance_to(120);
        assert_eq!(runtime.stats().typed_chars, 2);
        assert_eq!(recorder.tone_count().unwrap(), 1);
        assert!(runtime.sound().is_unlocked());
    }

    #[test]
    fn typed_characters_pulse_the_backdrop() {
        let config = config();
        let recorder = ToneRecorder::new(8_000);
        let mut runtime = runtime(&config, &recorder);
        runtime.dispatch(HostEvent::KeyPress);
        runtime.dispatch(HostEvent::Visibility { ratio: 1.0 });

        runtime.advance_to(110);
        let stats = runtime.stats();
        assert_eq!(stats.typed_chars, 1);
        assert_eq!(stats.animations_run, 3);
        assert_eq!(recorder.tone_count().unwrap(), 1);
        assert_eq!(runtime.backdrop().unwrap().active_pulses(110), 1);
        assert_eq!(runtime.snapshot().title_markup, "<span>H</span>_");
    }

    #[test]
    fn pause_halts_the_render_loop() {
        let config = config();
        let recorder = ToneRecorder::new(8_000);
        let mut runtime = runtime(&config, &recorder);
        runtime.dispatch(HostEvent::Visibility { ratio: 1.0 });
        runtime.advance_to(115);

        assert!(Controls::pause(&mut runtime));
        let frames = runtime.backdrop().unwrap().frames_rendered();
        runtime.advance_to(500);
        assert_eq!(runtime.backdrop().unwrap().frames_rendered(), frames);
        assert_eq!(runtime.snapshot().title_markup, "<span>H</span>_");
        assert_eq!(runtime.snapshot().backdrop.unwrap().at_ms, 110);

        assert!(Controls::resume(&mut runtime));
        runtime.advance_to(520);
        assert!(runtime.backdrop().unwrap().frames_rendered() > frames);
        assert_eq!(runtime.sequencer().title().text(), "HI");
    }

    #[test]
    fn restart_through_controls_replays_from_the_top() {
        let config = config();
        let recorder = ToneRecorder::new(8_000);
        let mut runtime = runtime(&config, &recorder);
        runtime.dispatch(HostEvent::Visibility { ratio: 1.0 });
        runtime.advance_to(125);

        let controls: &mut dyn Controls = &mut runtime;
        assert!(controls.restart());
        assert!(!controls.resume());

        runtime.advance_to(165);
        let snapshot = runtime.snapshot();
        assert_eq!(snapshot.phase, Phase::Entering);
        assert_eq!(snapshot.state.phrase_index, 0);
        assert_eq!(snapshot.state.stats.typed_chars, 0);
        assert_eq!(snapshot.title_markup, "");
    }

    #[test]
    fn pointer_and_resize_reach_cursor_and_backdrop() {
        let config = config();
        let recorder = ToneRecorder::new(8_000);
        let mut runtime = runtime(&config, &recorder);

        runtime.dispatch(HostEvent::PointerMove { x: 300.0, y: 200.0 });
        runtime.dispatch(HostEvent::PointerEnter {
            selector: "button".into(),
        });
        runtime.advance_to(500);
        let cursor = runtime.snapshot().cursor.unwrap();
        assert_eq!(cursor.dot_position, Vec2::new(300.0, 200.0));
        assert_eq!(cursor.ring_scale, config.cursor.hover_scale);

        runtime.dispatch(HostEvent::Resize {
            width: 640,
            height: 480,
        });
        assert_eq!(runtime.backdrop().unwrap().viewport(), Viewport::new(640, 480));
    }

    #[test]
    fn snapshots_serialise_in_camel_case() {
        let config = config();
        let recorder = ToneRecorder::new(8_000);
        let mut runtime = runtime(&config, &recorder);
        runtime.dispatch(HostEvent::Visibility { ratio: 1.0 });
        runtime.advance_to(120);

        let json = serde_json::to_value(runtime.snapshot()).unwrap();
        assert_eq!(json["titleMarkup"], "H<span>I</span>_");
        assert_eq!(json["state"]["stats"]["typedChars"], 2);
        assert_eq!(json["phase"], "Typing");
    }
}

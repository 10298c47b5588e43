//! Phrase sequencing: entry transition, the type/erase loop, per-character
//! side effects, cycle advance, pause/resume and restart.
//!
//! All timing runs on the sequencer's virtual clock. The host advances it with
//! [`PhraseSequencer::advance_to`]; commands act at the current instant.

pub mod effects;
pub mod typer;

use serde::Serialize;

use crate::{
    config::{LetterPopConfig, TransitionConfig, TypingConfig},
    scene::{ElementStyle, HeroElements, Page, TextElement},
    timeline::{PlaybackClock, Scheduler},
    tween::Tween,
    AppConfig, Result,
};

pub use effects::{
    CharacterErased, CharacterTyped, EffectHooks, HeroEffects, NoEffects, PhraseComplete,
};
pub use typer::{Typer, TyperEvent, TyperPhase, TyperSettings};

/// Counters exposed through the control surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub typed_chars: u64,
    pub deleted_chars: u64,
    pub cycles_completed: u64,
    /// Entry, exit and letter pop-in animations started.
    pub animations_run: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencerState {
    pub running: bool,
    /// Only ever true while `running` is.
    pub paused: bool,
    pub phrase_index: usize,
    pub stats: Stats,
}

/// Externally visible state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Entering,
    Typing,
    Paused,
    Cycling,
    Restarting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Entering,
    Typing,
    Cycling,
    Restarting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequencerTimer {
    EntryFinished,
    NextPhrase,
    ExitFinished,
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Timer,
    Title,
    Subtitle,
}

/// The live (title, subtitle) typer pair for the current phrase.
#[derive(Debug)]
struct TypingSession {
    title: Typer,
    subtitle: Typer,
}

pub struct PhraseSequencer<H = HeroEffects> {
    typing: TypingConfig,
    transitions: TransitionConfig,
    letter_pop: LetterPopConfig,
    container: String,
    title: TextElement,
    subtitle: TextElement,
    state: SequencerState,
    stage: Stage,
    session: Option<TypingSession>,
    timers: Scheduler<SequencerTimer>,
    /// A phrase start came due while paused; it runs on resume.
    deferred_phrase: bool,
    clock: PlaybackClock,
    hooks: H,
}

impl<H: EffectHooks> PhraseSequencer<H> {
    pub fn new(config: &AppConfig, elements: HeroElements, hooks: H) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            typing: config.typing.clone(),
            transitions: config.transitions.clone(),
            letter_pop: config.letter_pop.clone(),
            container: elements.container,
            title: elements.title,
            subtitle: elements.subtitle,
            state: SequencerState::default(),
            stage: Stage::Idle,
            session: None,
            timers: Scheduler::new(),
            deferred_phrase: false,
            clock: PlaybackClock::new(),
            hooks,
        })
    }

    /// Resolves the hero elements on `page` first; a missing one aborts.
    pub fn from_page(config: &AppConfig, page: &Page, hooks: H) -> Result<Self> {
        let elements = HeroElements::resolve(page, &config.selectors).map_err(|err| {
            tracing::error!(%err, "required page elements missing, aborting");
            err
        })?;
        Self::new(config, elements, hooks)
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn stats(&self) -> Stats {
        self.state.stats
    }

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Restarting => Phase::Restarting,
            _ if self.state.paused => Phase::Paused,
            Stage::Entering => Phase::Entering,
            Stage::Typing => Phase::Typing,
            Stage::Cycling => Phase::Cycling,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn title(&self) -> &TextElement {
        &self.title
    }

    pub fn subtitle(&self) -> &TextElement {
        &self.subtitle
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn has_typing_session(&self) -> bool {
        self.session.is_some()
    }

    /// Begins the entry transition. Only the first call while not running
    /// has an effect; during a restart exit the reset replays the entry.
    pub fn start(&mut self) -> bool {
        if self.state.running || self.stage == Stage::Restarting {
            return false;
        }
        let now = self.clock.now_ms();
        self.state.running = true;
        self.stage = Stage::Entering;

        let entry = &self.transitions.entry;
        let hidden = ElementStyle {
            opacity: entry.opacity,
            offset_y: entry.offset_y,
            scale: entry.scale,
        };
        let shown = ElementStyle::default();
        self.title.animate(Tween::new(
            hidden,
            shown,
            now,
            entry.duration_ms,
            entry.easing,
        ));
        self.subtitle.animate(Tween::new(
            hidden,
            shown,
            now + entry.subtitle_delay_ms,
            entry.duration_ms,
            entry.easing,
        ));
        self.state.stats.animations_run += 2;

        // The typing loop starts after the nominal duration, not on an
        // animation-finished signal.
        self.timers
            .schedule(now + entry.duration_ms, SequencerTimer::EntryFinished);
        tracing::info!(at_ms = now, "starting animation sequence");
        true
    }

    /// Processes every step due up to `target_ms`, in timestamp order.
    pub fn advance_to(&mut self, target_ms: u64) {
        while let Some((at, source)) = self.next_due() {
            if at > target_ms {
                break;
            }
            self.clock.advance_to(at);
            match source {
                Source::Timer => {
                    if let Some(event) = self.timers.pop_due(at) {
                        self.on_timer(event.payload);
                    }
                }
                Source::Title => {
                    let event = self.session.as_mut().and_then(|s| s.title.fire(at));
                    if let Some(event) = event {
                        self.on_title_event(event);
                    }
                }
                Source::Subtitle => {
                    let event = self.session.as_mut().and_then(|s| s.subtitle.fire(at));
                    if let Some(event) = event {
                        self.on_subtitle_event(event);
                    }
                }
            }
        }
        self.clock.advance_to(target_ms);
    }

    /// Freezes typing mid-character and halts the backdrop loop.
    pub fn pause(&mut self) -> bool {
        if self.state.paused || !self.state.running {
            return false;
        }
        let now = self.clock.now_ms();
        self.state.paused = true;
        if let Some(session) = self.session.as_mut() {
            session.title.stop(now);
            session.subtitle.stop(now);
        }
        self.hooks.on_pause(now);
        tracing::warn!(at_ms = now, phrase_index = self.state.phrase_index, "animation paused");
        true
    }

    /// Continues exactly where [`PhraseSequencer::pause`] left off.
    pub fn resume(&mut self) -> bool {
        if !self.state.paused || self.stage == Stage::Restarting {
            return false;
        }
        let now = self.clock.now_ms();
        self.state.paused = false;
        if let Some(session) = self.session.as_mut() {
            session.title.start(now);
            session.subtitle.start(now);
        }
        self.hooks.on_resume(now);
        tracing::info!(at_ms = now, "animation resumed");
        if std::mem::take(&mut self.deferred_phrase) {
            self.begin_phrase();
        }
        true
    }

    /// Pauses, plays the exit transition, then resets and replays the entry.
    pub fn restart(&mut self) -> bool {
        if self.stage == Stage::Restarting {
            return false;
        }
        tracing::info!(at_ms = self.clock.now_ms(), "restarting animation");
        self.pause();

        let now = self.clock.now_ms();
        let exit = &self.transitions.exit;
        for element in [&mut self.title, &mut self.subtitle] {
            let current = element.style_at(now);
            let target = ElementStyle {
                opacity: exit.opacity,
                offset_y: exit.offset_y,
                scale: current.scale,
            };
            element.animate_to(target, now, exit.duration_ms, exit.easing);
        }
        self.state.stats.animations_run += 2;

        self.timers.clear();
        self.deferred_phrase = false;
        self.timers
            .schedule(now + exit.duration_ms, SequencerTimer::ExitFinished);
        self.stage = Stage::Restarting;
        true
    }

    fn next_due(&self) -> Option<(u64, Source)> {
        let mut best = self
            .timers
            .next_due_ms()
            .map(|at| (at, Source::Timer));
        if let Some(session) = &self.session {
            let candidates = [
                (session.title.next_deadline(), Source::Title),
                (session.subtitle.next_deadline(), Source::Subtitle),
            ];
            for (deadline, source) in candidates {
                if let Some(at) = deadline {
                    if best.map_or(true, |(current, _)| at < current) {
                        best = Some((at, source));
                    }
                }
            }
        }
        best
    }

    fn on_timer(&mut self, timer: SequencerTimer) {
        match timer {
            SequencerTimer::EntryFinished | SequencerTimer::NextPhrase => self.begin_phrase(),
            SequencerTimer::ExitFinished => self.finish_restart(),
        }
    }

    /// Replaces the typing session with a fresh one for the current phrase.
    fn begin_phrase(&mut self) {
        if self.state.paused {
            self.deferred_phrase = true;
            tracing::debug!("phrase start deferred until resume");
            return;
        }
        let now = self.clock.now_ms();
        if self.session.take().is_some() {
            tracing::debug!("previous typing session destroyed");
        }

        let index = self.state.phrase_index;
        let title = Typer::new(self.typing.title_for(index), self.title_settings(), now);
        let subtitle = Typer::new(
            self.typing.subtitle_for(index),
            self.subtitle_settings(),
            now,
        );
        self.title.set_text("", title.cursor());
        self.subtitle.set_text("", subtitle.cursor());
        self.session = Some(TypingSession { title, subtitle });
        self.stage = Stage::Typing;
        tracing::debug!(phrase_index = index, at_ms = now, "typing phrase");
    }

    fn title_settings(&self) -> TyperSettings {
        TyperSettings {
            type_speed_ms: self.typing.type_speed_ms,
            back_speed_ms: self.typing.back_speed_ms,
            start_delay_ms: self.typing.start_delay_ms,
            back_delay_ms: self.typing.back_delay_ms,
            cursor: self.typing.show_cursor.then_some(self.typing.cursor_char),
        }
    }

    /// The subtitle runs at double speed on its own, unsynchronised track.
    fn subtitle_settings(&self) -> TyperSettings {
        TyperSettings {
            type_speed_ms: (self.typing.type_speed_ms / 2).max(1),
            back_speed_ms: (self.typing.back_speed_ms / 2).max(1),
            start_delay_ms: self.typing.start_delay_ms + self.typing.subtitle_start_offset_ms,
            back_delay_ms: self.typing.subtitle_back_delay_ms,
            cursor: None,
        }
    }

    fn on_title_event(&mut self, event: TyperEvent) {
        let now = self.clock.now_ms();
        let phrase_index = self.state.phrase_index;
        match event {
            TyperEvent::CharTyped {
                position,
                character,
            } => {
                // Fixed order: tone and pulse, counter, then the pop-in.
                self.hooks.on_character_typed(&CharacterTyped {
                    phrase_index,
                    position,
                    character,
                    at_ms: now,
                    stats: self.state.stats,
                });
                self.state.stats.typed_chars += 1;
                self.sync_title();
                if self.title.pop_last_letter(now, &self.letter_pop) {
                    self.state.stats.animations_run += 1;
                }
            }
            TyperEvent::StringTyped => {
                tracing::debug!(phrase_index, at_ms = now, "phrase fully typed");
            }
            TyperEvent::Backspace { position } => {
                self.hooks.on_character_erased(&CharacterErased {
                    phrase_index,
                    position,
                    at_ms: now,
                });
                self.state.stats.deleted_chars += 1;
                self.sync_title();
            }
            TyperEvent::Complete => self.complete_phrase(now),
        }
    }

    /// Subtitle progress only updates its element; its completion is not
    /// reported back, the title alone drives cycling.
    fn on_subtitle_event(&mut self, event: TyperEvent) {
        match event {
            TyperEvent::CharTyped { .. } | TyperEvent::Backspace { .. } => {
                if let Some(session) = &self.session {
                    self.subtitle
                        .set_text(&session.subtitle.visible_text(), session.subtitle.cursor());
                }
            }
            TyperEvent::StringTyped | TyperEvent::Complete => {}
        }
    }

    fn sync_title(&mut self) {
        if let Some(session) = &self.session {
            self.title
                .set_text(&session.title.visible_text(), session.title.cursor());
        }
    }

    fn complete_phrase(&mut self, now: u64) {
        let completed_index = self.state.phrase_index;
        let next_index = (completed_index + 1) % self.typing.title_phrases.len();
        let wrapped = next_index == 0;

        self.hooks.on_phrase_complete(&PhraseComplete {
            completed_index,
            next_index,
            wrapped,
            at_ms: now,
        });
        self.state.phrase_index = next_index;
        if wrapped {
            self.state.stats.cycles_completed += 1;
            tracing::info!(
                cycles = self.state.stats.cycles_completed,
                "phrase cycle complete"
            );
        }

        self.timers
            .schedule(now + self.typing.back_delay_ms, SequencerTimer::NextPhrase);
        self.stage = Stage::Cycling;
    }

    fn finish_restart(&mut self) {
        let now = self.clock.now_ms();
        let was_paused = self.state.paused;

        self.session = None;
        self.deferred_phrase = false;
        self.timers.clear();
        self.state = SequencerState::default();
        self.title.clear();
        self.subtitle.clear();
        self.stage = Stage::Idle;
        if was_paused {
            self.hooks.on_resume(now);
        }
        tracing::info!(at_ms = now, "sequence reset");

        self.start();
    }
}

impl<H> std::fmt::Debug for PhraseSequencer<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseSequencer")
            .field("state", &self.state)
            .field("stage", &self.stage)
            .field("now_ms", &self.clock.now_ms())
            .field("session", &self.session.is_some())
            .field("pending_timers", &self.timers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scene::Viewport, TypewriterError};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Typed(CharacterTyped),
        Erased(CharacterErased),
        Complete(PhraseComplete),
        Pause,
        Resume,
    }

    #[derive(Debug, Default)]
    struct Recording {
        calls: Vec<Call>,
    }

    impl Recording {
        fn typed(&self) -> usize {
            self.calls
                .iter()
                .filter(|call| matches!(call, Call::Typed(_)))
                .count()
        }

        fn completions(&self) -> Vec<PhraseComplete> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Complete(event) => Some(*event),
                    _ => None,
                })
                .collect()
        }
    }

    impl EffectHooks for Recording {
        fn on_character_typed(&mut self, event: &CharacterTyped) {
            self.calls.push(Call::Typed(*event));
        }
        fn on_character_erased(&mut self, event: &CharacterErased) {
            self.calls.push(Call::Erased(*event));
        }
        fn on_phrase_complete(&mut self, event: &PhraseComplete) {
            self.calls.push(Call::Complete(*event));
        }
        fn on_pause(&mut self, _at_ms: u64) {
            self.calls.push(Call::Pause);
        }
        fn on_resume(&mut self, _at_ms: u64) {
            self.calls.push(Call::Resume);
        }
    }

    /// Phrase 0 ("AB"): chars at 130 and 140, erased at 180 and 185,
    /// next phrase at 225. Phrase 1 ("CDE"): chars at 255, 265, 275, erased
    /// by 325, next at 365. Phrase 2 ("F"): char at 395, erased and complete
    /// at 435, next at 475.
    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.typing = TypingConfig {
            title_phrases: vec!["AB".into(), "CDE".into(), "F".into()],
            subtitle_phrases: vec!["xy".into(), "z".into()],
            type_speed_ms: 10,
            back_speed_ms: 5,
            start_delay_ms: 20,
            back_delay_ms: 40,
            subtitle_start_offset_ms: 10,
            subtitle_back_delay_ms: 15,
            show_cursor: true,
            cursor_char: '_',
        };
        config.transitions.entry.duration_ms = 100;
        config.transitions.entry.subtitle_delay_ms = 30;
        config.transitions.exit.duration_ms = 50;
        config
    }

    fn sequencer(config: &AppConfig) -> PhraseSequencer<Recording> {
        let page = Page::hero(Viewport::default(), &config.selectors);
        PhraseSequencer::from_page(config, &page, Recording::default()).unwrap()
    }

    #[test]
    fn missing_elements_abort_construction() {
        let config = test_config();
        let page = Page::new(Viewport::default()).with_element(".hero-section");
        let err = PhraseSequencer::from_page(&config, &page, NoEffects).unwrap_err();
        assert!(matches!(err, TypewriterError::MissingElement { .. }));
    }

    #[test]
    fn entry_transition_runs_before_typing() {
        let config = test_config();
        let mut seq = sequencer(&config);
        assert_eq!(seq.phase(), Phase::Idle);
        assert!(seq.start());
        assert!(!seq.start());
        assert_eq!(seq.phase(), Phase::Entering);
        assert_eq!(seq.stats().animations_run, 2);
        assert_eq!(seq.title().style_at(0).opacity, 0.0);
        assert_eq!(seq.subtitle().style_at(20).opacity, 0.0);

        seq.advance_to(99);
        assert!(!seq.has_typing_session());
        seq.advance_to(100);
        assert_eq!(seq.phase(), Phase::Typing);
        assert_eq!(seq.title().style_at(100), ElementStyle::default());
        assert!(seq.subtitle().is_transitioning(100));
        assert_eq!(seq.title().text_content(), "_");
    }

    #[test]
    fn three_phrases_wrap_into_one_cycle() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();
        seq.advance_to(474);

        let state = seq.state();
        assert_eq!(state.phrase_index, 0);
        assert_eq!(state.stats.cycles_completed, 1);
        assert_eq!(state.stats.typed_chars, 6);
        assert_eq!(state.stats.deleted_chars, 6);

        let completions: Vec<_> = seq
            .hooks()
            .completions()
            .iter()
            .map(|event| (event.completed_index, event.next_index, event.wrapped))
            .collect();
        assert_eq!(completions, vec![(0, 1, false), (1, 2, false), (2, 0, true)]);
        assert_eq!(seq.phase(), Phase::Cycling);
    }

    #[test]
    fn index_always_advances_modulo_phrase_count() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();
        seq.advance_to(20_000);

        let completions = seq.hooks().completions();
        assert!(completions.len() > 30);
        for event in &completions {
            assert_eq!(event.next_index, (event.completed_index + 1) % 3);
            assert_eq!(event.wrapped, event.next_index == 0);
        }
        let wraps = completions.iter().filter(|event| event.wrapped).count() as u64;
        assert_eq!(seq.stats().cycles_completed, wraps);
        assert!(seq.state().phrase_index < 3);
    }

    #[test]
    fn each_typed_character_fires_effects_then_pops_in() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();

        seq.advance_to(130);
        assert_eq!(seq.stats().typed_chars, 1);
        assert_eq!(seq.hooks().typed(), 1);
        assert_eq!(seq.stats().animations_run, 3);
        assert_eq!(seq.title().markup(), "<span>A</span>_");

        seq.advance_to(140);
        assert_eq!(seq.stats().typed_chars, 2);
        assert_eq!(seq.hooks().typed(), 2);
        assert_eq!(seq.stats().animations_run, 4);
        assert_eq!(seq.title().markup(), "A<span>B</span>_");
        assert_eq!(
            seq.hooks().calls.last(),
            Some(&Call::Typed(CharacterTyped {
                phrase_index: 0,
                position: 1,
                character: 'B',
                at_ms: 140,
                stats: Stats {
                    typed_chars: 1,
                    deleted_chars: 0,
                    cycles_completed: 0,
                    animations_run: 3,
                },
            }))
        );

        seq.advance_to(180);
        assert_eq!(seq.stats().deleted_chars, 1);
        assert_eq!(seq.title().markup(), "A_");
    }

    #[test]
    fn effects_fire_before_counter_and_pop_in() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();

        for (i, at) in [130, 140].into_iter().enumerate() {
            seq.advance_to(at);
            let Some(Call::Typed(event)) = seq.hooks().calls.last().cloned() else {
                panic!("no typed event at {at}");
            };
            let i = i as u64;
            assert_eq!(event.stats.typed_chars, i);
            assert_eq!(event.stats.animations_run, 2 + i);
            assert_eq!(seq.stats().typed_chars, i + 1);
            assert_eq!(seq.stats().animations_run, 3 + i);
        }
    }

    #[test]
    fn pause_then_resume_keeps_position_and_text() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();
        seq.advance_to(135);
        assert_eq!(seq.title().text(), "A");

        assert!(seq.pause());
        assert_eq!(seq.phase(), Phase::Paused);
        assert!(seq.resume());
        assert_eq!(seq.state().phrase_index, 0);
        assert_eq!(seq.title().text(), "A");

        seq.advance_to(140);
        assert_eq!(seq.title().text(), "AB");
    }

    #[test]
    fn long_pause_freezes_typing_mid_phrase() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();
        seq.advance_to(135);
        seq.pause();

        seq.advance_to(1_000);
        assert_eq!(seq.title().text(), "A");
        assert_eq!(seq.stats().typed_chars, 1);

        seq.resume();
        seq.advance_to(1_004);
        assert_eq!(seq.title().text(), "A");
        seq.advance_to(1_005);
        assert_eq!(seq.title().text(), "AB");
        assert_eq!(
            &seq.hooks().calls[1..3],
            &[Call::Pause, Call::Resume]
        );
    }

    #[test]
    fn pause_and_resume_are_noops_out_of_place() {
        let config = test_config();
        let mut seq = sequencer(&config);
        let before = seq.state();
        assert!(!seq.pause());
        assert_eq!(seq.state(), before);
        assert!(!seq.resume());
        assert_eq!(seq.state(), before);

        seq.start();
        assert!(!seq.resume());
        assert!(seq.pause());
        assert!(!seq.pause());
        assert_eq!(
            seq.hooks().calls.iter().filter(|call| **call == Call::Pause).count(),
            1
        );
    }

    #[test]
    fn phrase_due_during_pause_starts_on_resume() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();
        seq.advance_to(200);
        assert_eq!(seq.phase(), Phase::Cycling);

        seq.pause();
        seq.advance_to(400);
        assert_eq!(seq.state().phrase_index, 1);
        assert_eq!(seq.stats().typed_chars, 2);

        seq.resume();
        seq.advance_to(429);
        assert_eq!(seq.stats().typed_chars, 2);
        seq.advance_to(430);
        assert_eq!(seq.title().text(), "C");
    }

    #[test]
    fn pause_during_entry_defers_typing() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();
        seq.advance_to(50);
        seq.pause();
        seq.advance_to(500);
        assert!(!seq.has_typing_session());

        seq.resume();
        assert!(seq.has_typing_session());
        seq.advance_to(530);
        assert_eq!(seq.title().text(), "A");
    }

    #[test]
    fn restart_resets_state_and_replays_entry() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();
        seq.advance_to(300);
        assert_eq!(seq.state().phrase_index, 1);
        assert_eq!(seq.title().text(), "CDE");

        assert!(seq.restart());
        assert!(!seq.restart());
        assert_eq!(seq.phase(), Phase::Restarting);
        assert!(!seq.resume());

        seq.advance_to(349);
        assert_eq!(seq.title().text(), "CDE");
        assert!(seq.title().style_at(349).opacity < 0.1);

        seq.advance_to(350);
        let state = seq.state();
        assert!(state.running);
        assert!(!state.paused);
        assert_eq!(state.phrase_index, 0);
        assert_eq!(state.stats.typed_chars, 0);
        assert_eq!(state.stats.deleted_chars, 0);
        assert_eq!(state.stats.cycles_completed, 0);
        assert_eq!(state.stats.animations_run, 2);
        assert_eq!(seq.title().text_content(), "");
        assert_eq!(seq.subtitle().text_content(), "");
        assert!(!seq.has_typing_session());
        assert_eq!(seq.phase(), Phase::Entering);
        assert_eq!(seq.hooks().calls.last(), Some(&Call::Resume));

        // Entry replays for 100 ms, then the first phrase types again.
        seq.advance_to(479);
        assert_eq!(seq.title().text(), "");
        seq.advance_to(480);
        assert_eq!(seq.title().text(), "A");
    }

    #[test]
    fn restart_cancels_pending_phrase_advance() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.start();
        seq.advance_to(200);
        seq.restart();

        // The stale advance would have fired at 225.
        seq.advance_to(349);
        assert_eq!(seq.stats().typed_chars, 0);
        assert!(!seq.has_typing_session());
        seq.advance_to(380);
        assert_eq!(seq.title().text(), "A");
    }

    #[test]
    fn restart_from_idle_starts_the_sequence() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.restart();
        assert!(!seq.state().running);
        seq.advance_to(50);
        assert!(seq.state().running);
        assert_eq!(seq.phase(), Phase::Entering);
        assert!(!seq.hooks().calls.contains(&Call::Resume));
    }

    #[test]
    fn start_during_exit_schedules_a_single_entry() {
        let config = test_config();
        let mut seq = sequencer(&config);
        seq.restart();
        seq.advance_to(10);
        assert!(!seq.start());
        assert_eq!(seq.phase(), Phase::Restarting);

        // Exit ends at 50, the replayed entry at 150, first char at 180.
        seq.advance_to(149);
        assert_eq!(seq.phase(), Phase::Entering);
        assert!(!seq.has_typing_session());
        seq.advance_to(179);
        assert_eq!(seq.stats().typed_chars, 0);
        seq.advance_to(180);
        assert_eq!(seq.title().text(), "A");
        assert_eq!(seq.stats().typed_chars, 1);

        // No second entry timer recreates the session mid-phrase.
        seq.advance_to(190);
        assert_eq!(seq.title().text(), "AB");
        assert_eq!(seq.stats().typed_chars, 2);
        assert_eq!(seq.stats().animations_run, 4);
    }

    #[test]
    fn subtitle_finishes_on_its_own_track() {
        let mut config = test_config();
        config.typing.title_phrases = vec!["A".into(), "B".into()];
        config.typing.subtitle_phrases = vec!["a long subtitle that outlasts the title".into()];
        let mut seq = sequencer(&config);
        seq.start();

        // Title "A" completes at 170; the subtitle is still typing.
        seq.advance_to(175);
        assert_eq!(seq.state().phrase_index, 1);
        assert_eq!(seq.phase(), Phase::Cycling);
        let partial = seq.subtitle().text().to_string();
        assert!(!partial.is_empty());
        assert!(partial.len() < 39);

        // The next phrase replaces the session, subtitle included.
        seq.advance_to(215);
        assert_eq!(seq.subtitle().text(), "");
        seq.advance_to(300);
        assert!(seq.subtitle().text().starts_with("a long"));
    }
}

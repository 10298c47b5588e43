//! Lifecycle events the sequencer emits and the hooks that turn them into
//! tones and backdrop pulses.

use super::Stats;
use crate::{audio::SoundEffectPlayer, backdrop::ParticleBackdrop};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterTyped {
    pub phrase_index: usize,
    pub position: usize,
    pub character: char,
    pub at_ms: u64,
    /// Counters before this character is counted or popped in.
    pub stats: Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterErased {
    pub phrase_index: usize,
    pub position: usize,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseComplete {
    pub completed_index: usize,
    pub next_index: usize,
    /// The cycle wrapped back to the first phrase.
    pub wrapped: bool,
    pub at_ms: u64,
}

/// Receivers of sequencer lifecycle events. Every call happens synchronously
/// inside the sequencer step that produced the event.
pub trait EffectHooks {
    fn on_character_typed(&mut self, event: &CharacterTyped);
    fn on_character_erased(&mut self, event: &CharacterErased);
    fn on_phrase_complete(&mut self, event: &PhraseComplete);
    fn on_pause(&mut self, at_ms: u64);
    fn on_resume(&mut self, at_ms: u64);
}

/// Hooks that do nothing, for sequencing without any output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEffects;

impl EffectHooks for NoEffects {
    fn on_character_typed(&mut self, _event: &CharacterTyped) {}
    fn on_character_erased(&mut self, _event: &CharacterErased) {}
    fn on_phrase_complete(&mut self, _event: &PhraseComplete) {}
    fn on_pause(&mut self, _at_ms: u64) {}
    fn on_resume(&mut self, _at_ms: u64) {}
}

impl<T: EffectHooks + ?Sized> EffectHooks for &mut T {
    fn on_character_typed(&mut self, event: &CharacterTyped) {
        (**self).on_character_typed(event);
    }
    fn on_character_erased(&mut self, event: &CharacterErased) {
        (**self).on_character_erased(event);
    }
    fn on_phrase_complete(&mut self, event: &PhraseComplete) {
        (**self).on_phrase_complete(event);
    }
    fn on_pause(&mut self, at_ms: u64) {
        (**self).on_pause(at_ms);
    }
    fn on_resume(&mut self, at_ms: u64) {
        (**self).on_resume(at_ms);
    }
}

/// An absent layer ignores every event.
impl<T: EffectHooks> EffectHooks for Option<T> {
    fn on_character_typed(&mut self, event: &CharacterTyped) {
        if let Some(hooks) = self {
            hooks.on_character_typed(event);
        }
    }
    fn on_character_erased(&mut self, event: &CharacterErased) {
        if let Some(hooks) = self {
            hooks.on_character_erased(event);
        }
    }
    fn on_phrase_complete(&mut self, event: &PhraseComplete) {
        if let Some(hooks) = self {
            hooks.on_phrase_complete(event);
        }
    }
    fn on_pause(&mut self, at_ms: u64) {
        if let Some(hooks) = self {
            hooks.on_pause(at_ms);
        }
    }
    fn on_resume(&mut self, at_ms: u64) {
        if let Some(hooks) = self {
            hooks.on_resume(at_ms);
        }
    }
}

/// Two layers; the first always sees an event before the second.
impl<A: EffectHooks, B: EffectHooks> EffectHooks for (A, B) {
    fn on_character_typed(&mut self, event: &CharacterTyped) {
        self.0.on_character_typed(event);
        self.1.on_character_typed(event);
    }
    fn on_character_erased(&mut self, event: &CharacterErased) {
        self.0.on_character_erased(event);
        self.1.on_character_erased(event);
    }
    fn on_phrase_complete(&mut self, event: &PhraseComplete) {
        self.0.on_phrase_complete(event);
        self.1.on_phrase_complete(event);
    }
    fn on_pause(&mut self, at_ms: u64) {
        self.0.on_pause(at_ms);
        self.1.on_pause(at_ms);
    }
    fn on_resume(&mut self, at_ms: u64) {
        self.0.on_resume(at_ms);
        self.1.on_resume(at_ms);
    }
}

impl EffectHooks for SoundEffectPlayer {
    fn on_character_typed(&mut self, event: &CharacterTyped) {
        self.typing_sound(event.at_ms);
    }
    fn on_character_erased(&mut self, event: &CharacterErased) {
        self.delete_sound(event.at_ms);
    }
    fn on_phrase_complete(&mut self, event: &PhraseComplete) {
        self.completion_sound(event.at_ms);
    }
    fn on_pause(&mut self, _at_ms: u64) {}
    fn on_resume(&mut self, _at_ms: u64) {}
}

impl EffectHooks for ParticleBackdrop {
    fn on_character_typed(&mut self, event: &CharacterTyped) {
        self.pulse(event.at_ms);
    }
    fn on_character_erased(&mut self, _event: &CharacterErased) {}
    fn on_phrase_complete(&mut self, _event: &PhraseComplete) {}
    fn on_pause(&mut self, _at_ms: u64) {
        self.stop();
    }
    fn on_resume(&mut self, _at_ms: u64) {
        self.start();
    }
}

/// Production hooks: tones through the sound player, pulses and loop control
/// on the backdrop when one could be created.
#[derive(Debug)]
pub struct HeroEffects {
    sound: SoundEffectPlayer,
    backdrop: Option<ParticleBackdrop>,
}

impl HeroEffects {
    pub fn new(sound: SoundEffectPlayer, backdrop: Option<ParticleBackdrop>) -> Self {
        Self { sound, backdrop }
    }

    pub fn sound(&self) -> &SoundEffectPlayer {
        &self.sound
    }

    pub fn sound_mut(&mut self) -> &mut SoundEffectPlayer {
        &mut self.sound
    }

    pub fn backdrop(&self) -> Option<&ParticleBackdrop> {
        self.backdrop.as_ref()
    }

    pub fn backdrop_mut(&mut self) -> Option<&mut ParticleBackdrop> {
        self.backdrop.as_mut()
    }

    /// Sound first, then the backdrop.
    fn layers(&mut self) -> (&mut SoundEffectPlayer, &mut Option<ParticleBackdrop>) {
        (&mut self.sound, &mut self.backdrop)
    }
}

impl EffectHooks for HeroEffects {
    fn on_character_typed(&mut self, event: &CharacterTyped) {
        self.layers().on_character_typed(event);
    }

    fn on_character_erased(&mut self, event: &CharacterErased) {
        self.layers().on_character_erased(event);
    }

    fn on_phrase_complete(&mut self, event: &PhraseComplete) {
        self.layers().on_phrase_complete(event);
    }

    fn on_pause(&mut self, at_ms: u64) {
        self.layers().on_pause(at_ms);
    }

    fn on_resume(&mut self, at_ms: u64) {
        self.layers().on_resume(at_ms);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        audio::ToneRecorder,
        config::{AudioConfig, BackdropConfig},
        scene::Viewport,
    };

    fn effects(recorder: &ToneRecorder) -> HeroEffects {
        let mut sound = SoundEffectPlayer::new(AudioConfig::default(), Box::new(recorder.clone()));
        sound.unlock();
        let backdrop = ParticleBackdrop::init(
            BackdropConfig {
                particle_count: 10,
                ..Default::default()
            },
            Viewport::default(),
            true,
        )
        .unwrap();
        HeroEffects::new(sound, Some(backdrop))
    }

    #[test]
    fn typed_characters_sound_and_pulse() {
        let recorder = ToneRecorder::new(8_000);
        let mut effects = effects(&recorder);
        effects.on_character_typed(&CharacterTyped {
            phrase_index: 0,
            position: 0,
            character: 'V',
            at_ms: 40,
            stats: Stats::default(),
        });

        assert_eq!(recorder.tone_count().unwrap(), 1);
        assert_eq!(effects.backdrop().unwrap().active_pulses(40), 1);
    }

    struct Logged {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl EffectHooks for Logged {
        fn on_character_typed(&mut self, _event: &CharacterTyped) {
            self.log.borrow_mut().push(self.name);
        }
        fn on_character_erased(&mut self, _event: &CharacterErased) {}
        fn on_phrase_complete(&mut self, _event: &PhraseComplete) {}
        fn on_pause(&mut self, _at_ms: u64) {
            self.log.borrow_mut().push(self.name);
        }
        fn on_resume(&mut self, _at_ms: u64) {}
    }

    #[test]
    fn layers_run_first_to_second() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let tone = Logged {
            name: "tone",
            log: Rc::clone(&log),
        };
        let pulse = Logged {
            name: "pulse",
            log: Rc::clone(&log),
        };
        let mut layers = (tone, Some(pulse));
        layers.on_character_typed(&CharacterTyped {
            phrase_index: 0,
            position: 0,
            character: 'a',
            at_ms: 0,
            stats: Stats::default(),
        });
        layers.1 = None;
        layers.on_pause(5);
        assert_eq!(*log.borrow(), vec!["tone", "pulse", "tone"]);
    }

    #[test]
    fn pause_and_resume_toggle_the_render_loop() {
        let recorder = ToneRecorder::new(8_000);
        let mut effects = effects(&recorder);
        effects.on_resume(0);
        assert!(effects.backdrop().unwrap().is_animating());
        effects.on_pause(10);
        assert!(!effects.backdrop().unwrap().is_animating());
    }

    #[test]
    fn missing_backdrop_is_tolerated() {
        let mut effects = HeroEffects::new(SoundEffectPlayer::silent(AudioConfig::default()), None);
        effects.on_character_typed(&CharacterTyped {
            phrase_index: 0,
            position: 0,
            character: 'x',
            at_ms: 0,
            stats: Stats::default(),
        });
        effects.on_pause(0);
        effects.on_resume(0);
        assert!(effects.backdrop().is_none());
    }
}

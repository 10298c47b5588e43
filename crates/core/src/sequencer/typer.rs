//! Character-by-character typing of a single string: type, hold, erase.

/// Cadence of one typer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TyperSettings {
    pub type_speed_ms: u64,
    pub back_speed_ms: u64,
    pub start_delay_ms: u64,
    pub back_delay_ms: u64,
    pub cursor: Option<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TyperEvent {
    CharTyped { position: usize, character: char },
    StringTyped,
    Backspace { position: usize },
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TyperPhase {
    Typing,
    Typed,
    /// Fully typed, waiting out the back delay.
    Holding,
    Erasing,
    Erased,
    Done,
}

/// One typing animation bound to a string. Every step is due at an explicit
/// virtual instant; the owner fires steps as time passes.
#[derive(Debug, Clone)]
pub struct Typer {
    chars: Vec<char>,
    settings: TyperSettings,
    typed: usize,
    phase: TyperPhase,
    next_at: Option<u64>,
    /// Time left until the next step while stopped.
    frozen: Option<u64>,
}

impl Typer {
    pub fn new(text: &str, settings: TyperSettings, now_ms: u64) -> Self {
        Self {
            chars: text.chars().collect(),
            settings,
            typed: 0,
            phase: TyperPhase::Typing,
            next_at: Some(now_ms + settings.start_delay_ms + settings.type_speed_ms),
            frozen: None,
        }
    }

    pub fn phase(&self) -> TyperPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == TyperPhase::Done
    }

    pub fn is_stopped(&self) -> bool {
        self.frozen.is_some()
    }

    /// When the next step is due. `None` while stopped or once done.
    pub fn next_deadline(&self) -> Option<u64> {
        self.next_at
    }

    pub fn typed_len(&self) -> usize {
        self.typed
    }

    /// Typed prefix, without cursor.
    pub fn visible_text(&self) -> String {
        self.chars[..self.typed].iter().collect()
    }

    pub fn cursor(&self) -> Option<char> {
        self.settings.cursor
    }

    /// Runs the step due at `now_ms`, if any.
    pub fn fire(&mut self, now_ms: u64) -> Option<TyperEvent> {
        match self.next_at {
            Some(at) if at <= now_ms => {}
            _ => return None,
        }

        match self.phase {
            TyperPhase::Typing => {
                if self.typed == self.chars.len() {
                    self.phase = TyperPhase::Typed;
                    self.next_at = Some(now_ms);
                    return None;
                }
                let character = self.chars[self.typed];
                let position = self.typed;
                self.typed += 1;
                if self.typed == self.chars.len() {
                    self.phase = TyperPhase::Typed;
                    self.next_at = Some(now_ms);
                } else {
                    self.next_at = Some(now_ms + self.settings.type_speed_ms);
                }
                Some(TyperEvent::CharTyped {
                    position,
                    character,
                })
            }
            TyperPhase::Typed => {
                self.phase = TyperPhase::Holding;
                self.next_at = Some(now_ms + self.settings.back_delay_ms);
                Some(TyperEvent::StringTyped)
            }
            TyperPhase::Holding | TyperPhase::Erasing => {
                self.phase = TyperPhase::Erasing;
                if self.typed == 0 {
                    self.phase = TyperPhase::Erased;
                    self.next_at = Some(now_ms);
                    return None;
                }
                self.typed -= 1;
                let position = self.typed;
                if self.typed == 0 {
                    self.phase = TyperPhase::Erased;
                    self.next_at = Some(now_ms);
                } else {
                    self.next_at = Some(now_ms + self.settings.back_speed_ms);
                }
                Some(TyperEvent::Backspace { position })
            }
            TyperPhase::Erased => {
                self.phase = TyperPhase::Done;
                self.next_at = None;
                Some(TyperEvent::Complete)
            }
            TyperPhase::Done => {
                self.next_at = None;
                None
            }
        }
    }

    /// Freezes mid-step. The remaining wait is kept for [`Typer::start`].
    pub fn stop(&mut self, now_ms: u64) {
        if self.frozen.is_some() {
            return;
        }
        if let Some(at) = self.next_at.take() {
            self.frozen = Some(at.saturating_sub(now_ms));
        }
    }

    /// Resumes a stopped typer with the wait it had left.
    pub fn start(&mut self, now_ms: u64) {
        if let Some(remaining) = self.frozen.take() {
            self.next_at = Some(now_ms + remaining);
        }
    }
}

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{tween::Lerp, Easing, Result, TypewriterError};

/// Top-level configuration structure. Loaded once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub selectors: SelectorConfig,
    pub typing: TypingConfig,
    pub transitions: TransitionConfig,
    pub letter_pop: LetterPopConfig,
    pub backdrop: BackdropConfig,
    pub audio: AudioConfig,
    pub cursor: CursorConfig,
    pub logger: LoggerConfig,
    pub dependencies: DependencyConfig,
    pub frame_interval_ms: u64,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects settings the sequencer cannot run with. Zero speeds or delays
    /// would let virtual time stall on a single instant.
    pub fn validate(&self) -> Result<()> {
        let typing = &self.typing;
        if typing.title_phrases.is_empty() {
            return Err(invalid("typing.title_phrases must not be empty"));
        }
        if typing.subtitle_phrases.is_empty() {
            return Err(invalid("typing.subtitle_phrases must not be empty"));
        }
        if typing.type_speed_ms == 0 {
            return Err(invalid("typing.type_speed_ms must be positive"));
        }
        if typing.back_speed_ms == 0 {
            return Err(invalid("typing.back_speed_ms must be positive"));
        }
        if typing.back_delay_ms == 0 {
            return Err(invalid("typing.back_delay_ms must be positive"));
        }
        if self.frame_interval_ms == 0 {
            return Err(invalid("frame_interval_ms must be positive"));
        }
        if self.audio.sample_rate == 0 {
            return Err(invalid("audio.sample_rate must be positive"));
        }
        if self.dependencies.stages.iter().any(|stage| stage.is_empty()) {
            return Err(invalid("dependencies.stages must not contain empty stages"));
        }
        Ok(())
    }

    pub fn phrase_count(&self) -> usize {
        self.typing.title_phrases.len()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            selectors: SelectorConfig::default(),
            typing: TypingConfig::default(),
            transitions: TransitionConfig::default(),
            letter_pop: LetterPopConfig::default(),
            backdrop: BackdropConfig::default(),
            audio: AudioConfig::default(),
            cursor: CursorConfig::default(),
            logger: LoggerConfig::default(),
            dependencies: DependencyConfig::default(),
            // Roughly one display frame at 60 Hz.
            frame_interval_ms: 16,
        }
    }
}

fn invalid(message: &str) -> TypewriterError {
    TypewriterError::InvalidConfig(message.to_string())
}

/// Page selectors for the three required hero elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub hero_section: String,
    pub title: String,
    pub subtitle: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            hero_section: ".hero-section".to_string(),
            title: ".hero-title".to_string(),
            subtitle: ".hero-subtitle".to_string(),
        }
    }
}

/// Phrase copy and typing cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub title_phrases: Vec<String>,
    /// Parallel to `title_phrases`; indexed modulo its own length.
    pub subtitle_phrases: Vec<String>,
    pub type_speed_ms: u64,
    pub back_speed_ms: u64,
    pub start_delay_ms: u64,
    pub back_delay_ms: u64,
    pub subtitle_start_offset_ms: u64,
    pub subtitle_back_delay_ms: u64,
    pub show_cursor: bool,
    pub cursor_char: char,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            title_phrases: vec![
                "VIRTUAL REPRESENTATION AND PRECISION TOPOGRAPHY".to_string(),
                "3D MODELING WITH HIGH-END DRONES".to_string(),
                "TRANSFORMING DATA INTO SMART DECISIONS".to_string(),
            ],
            subtitle_phrases: vec![
                "I transform reality into interactive data. Solutions with drones and 3D modeling for engineering and construction.".to_string(),
                "Centimeter-level accuracy for infrastructure, construction, and cultural heritage inspection.".to_string(),
                "Visualize your projects like never before with high-resolution point clouds and orthophotos.".to_string(),
                "Specialist in photogrammetry, topographic surveys.".to_string(),
            ],
            type_speed_ms: 50,
            back_speed_ms: 25,
            start_delay_ms: 500,
            back_delay_ms: 2_000,
            subtitle_start_offset_ms: 200,
            subtitle_back_delay_ms: 700,
            show_cursor: true,
            cursor_char: '_',
        }
    }
}

impl TypingConfig {
    pub fn title_for(&self, index: usize) -> &str {
        &self.title_phrases[index % self.title_phrases.len()]
    }

    pub fn subtitle_for(&self, index: usize) -> &str {
        &self.subtitle_phrases[index % self.subtitle_phrases.len()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TransitionConfig {
    pub entry: EntryTransition,
    pub exit: ExitTransition,
}

/// Fade/slide/scale-in played once per sequence start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryTransition {
    pub duration_ms: u64,
    pub opacity: f32,
    pub offset_y: f32,
    pub scale: f32,
    pub easing: Easing,
    pub subtitle_delay_ms: u64,
}

impl Default for EntryTransition {
    fn default() -> Self {
        Self {
            duration_ms: 1_500,
            opacity: 0.0,
            offset_y: 50.0,
            scale: 0.95,
            easing: Easing::Power3Out,
            subtitle_delay_ms: 300,
        }
    }
}

/// Fade/slide-out played before a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitTransition {
    pub duration_ms: u64,
    pub opacity: f32,
    pub offset_y: f32,
    pub easing: Easing,
}

impl Default for ExitTransition {
    fn default() -> Self {
        Self {
            duration_ms: 800,
            opacity: 0.0,
            offset_y: -30.0,
            easing: Easing::Power2In,
        }
    }
}

/// Pop-in applied to the most recently typed title letter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterPopConfig {
    pub offset_y: f32,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Default for LetterPopConfig {
    fn default() -> Self {
        Self {
            offset_y: -10.0,
            duration_ms: 300,
            easing: Easing::ExpoOut,
        }
    }
}

/// Particle field parameters. Colours are `0xRRGGBB`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    pub particle_count: usize,
    pub field_extent: f32,
    pub particle_color: u32,
    pub background_color: u32,
    pub camera_distance: f32,
    pub fov_degrees: f32,
    pub pointer_influence: f32,
    pub rotation_speed: f32,
    pub base_size: f32,
    pub base_opacity: f32,
    pub pulse_color: u32,
    pub pulse_size: f32,
    pub pulse_half_ms: u64,
    pub seed: u64,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            particle_count: 5_000,
            field_extent: 1_000.0,
            particle_color: 0x30A5BF,
            background_color: 0x0A0F1A,
            camera_distance: 1_000.0,
            fov_degrees: 75.0,
            pointer_influence: 0.1,
            rotation_speed: 0.1,
            base_size: 2.0,
            base_opacity: 0.7,
            pulse_color: 0xFFFFFF,
            pulse_size: 3.0,
            pulse_half_ms: 200,
            seed: 0x5EED_CAFE,
        }
    }
}

/// Converts `0xRRGGBB` into normalised RGB.
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One fixed tone recipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TonePreset {
    pub frequency_hz: f32,
    pub waveform: Waveform,
    pub duration_s: f32,
    pub gain: f32,
}

/// Configuration specific to the audio subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enable: bool,
    pub sample_rate: u32,
    pub typing: TonePreset,
    pub deleting: TonePreset,
    pub completion: TonePreset,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enable: true,
            sample_rate: 48_000,
            typing: TonePreset {
                frequency_hz: 700.0,
                waveform: Waveform::Sine,
                duration_s: 0.05,
                gain: 0.1,
            },
            deleting: TonePreset {
                frequency_hz: 440.0,
                waveform: Waveform::Square,
                duration_s: 0.06,
                gain: 0.08,
            },
            completion: TonePreset {
                frequency_hz: 1_200.0,
                waveform: Waveform::Triangle,
                duration_s: 0.1,
                gain: 0.15,
            },
        }
    }
}

/// Straight RGBA colour, channels in `0..=255` plus alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Lerp for Rgba {
    fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            r: self.r.lerp(to.r, t),
            g: self.g.lerp(to.g, t),
            b: self.b.lerp(to.b, t),
            a: self.a.lerp(to.a, t),
        }
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {:.2})",
            self.r.round(),
            self.g.round(),
            self.b.round(),
            self.a
        )
    }
}

/// Pointer follower visuals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub enable: bool,
    pub size: f32,
    pub dot_size: f32,
    pub color: Rgba,
    pub dot_color: Rgba,
    pub hover_color: Rgba,
    pub hover_scale: f32,
    pub ring_follow_ms: u64,
    pub dot_follow_ms: u64,
    pub hover_ms: u64,
    pub interactive_selectors: Vec<String>,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enable: true,
            size: 30.0,
            dot_size: 8.0,
            color: Rgba::new(48.0, 165.0, 191.0, 0.5),
            dot_color: Rgba::new(255.0, 255.0, 255.0, 0.9),
            hover_color: Rgba::new(255.0, 255.0, 255.0, 0.2),
            hover_scale: 1.5,
            ring_follow_ms: 400,
            dot_follow_ms: 100,
            hover_ms: 300,
            interactive_selectors: vec![
                "a".to_string(),
                "button".to_string(),
                ".hero-cta-button".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub enable: bool,
    pub prefix: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enable: true,
            prefix: "TypewriterFX".to_string(),
        }
    }
}

/// A named external animation library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub url: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Ordered load plan. Each stage finishes before the next one starts; the
/// entries inside a stage load jointly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    pub stages: Vec<Vec<Dependency>>,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            stages: vec![
                vec![Dependency::new(
                    "gsap",
                    "https://cdnjs.cloudflare.com/ajax/libs/gsap/3.12.5/gsap.min.js",
                )],
                vec![Dependency::new(
                    "scroll-trigger",
                    "https://cdnjs.cloudflare.com/ajax/libs/gsap/3.12.5/ScrollTrigger.min.js",
                )],
                vec![
                    Dependency::new("typed", "https://unpkg.com/typed.js@2.1.0/dist/typed.umd.js"),
                    Dependency::new(
                        "anime",
                        "https://cdnjs.cloudflare.com/ajax/libs/animejs/3.2.1/anime.min.js",
                    ),
                    Dependency::new(
                        "three",
                        "https://cdnjs.cloudflare.com/ajax/libs/three.js/r128/three.min.js",
                    ),
                ],
            ],
        }
    }
}

impl DependencyConfig {
    pub fn all(&self) -> impl Iterator<Item = &Dependency> {
        self.stages.iter().flatten()
    }
}

//! Time-based interpolation shared by transitions, letter pop-ins, pulses and
//! the pointer follower.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Easing curves. Names follow the usual `powerN` convention where
/// `power1` is quadratic, `power2` cubic and `power3` quartic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    QuadOut,
    Power2In,
    Power2Out,
    Power3Out,
    ExpoOut,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t).powi(2),
            Easing::Power2In => t.powi(3),
            Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
            Easing::Power3Out => 1.0 - (1.0 - t).powi(4),
            Easing::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
        }
    }
}

/// Values that can be blended linearly.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec2::lerp(self, to, t)
    }
}

impl Lerp for Vec3 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec3::lerp(self, to, t)
    }
}

/// A single `from → to` animation over a fixed window of virtual time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, start_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
            easing,
        }
    }

    pub fn end_ms(&self) -> u64 {
        self.start_ms + self.duration_ms
    }

    /// Linear progress, `0.0` before the start and `1.0` at or after the end.
    pub fn progress(&self, now_ms: u64) -> f32 {
        if now_ms <= self.start_ms {
            return if self.duration_ms == 0 && now_ms == self.start_ms {
                1.0
            } else {
                0.0
            };
        }
        if self.duration_ms == 0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) as f32 / self.duration_ms as f32).min(1.0)
    }

    pub fn sample(&self, now_ms: u64) -> T {
        let eased = self.easing.apply(self.progress(now_ms));
        self.from.lerp(self.to, eased)
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        now_ms >= self.end_ms()
    }
}

/// A value with an optional running tween. Retargeting starts from whatever
/// the value looks like at that instant, so interrupted animations never jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animated<T> {
    value: T,
    tween: Option<Tween<T>>,
}

impl<T: Lerp> Animated<T> {
    pub fn new(value: T) -> Self {
        Self { value, tween: None }
    }

    pub fn sample(&self, now_ms: u64) -> T {
        match &self.tween {
            Some(tween) => tween.sample(now_ms),
            None => self.value,
        }
    }

    pub fn retarget(&mut self, to: T, now_ms: u64, duration_ms: u64, easing: Easing) {
        let from = self.sample(now_ms);
        self.value = to;
        self.tween = Some(Tween::new(from, to, now_ms, duration_ms, easing));
    }

    /// Replaces any running tween with an explicit one.
    pub fn play(&mut self, tween: Tween<T>) {
        self.value = tween.to;
        self.tween = Some(tween);
    }

    pub fn is_animating(&self, now_ms: u64) -> bool {
        self.tween
            .as_ref()
            .map(|tween| !tween.is_finished(now_ms))
            .unwrap_or(false)
    }
}

//! Decorative pointer follower: an outer ring and an inner dot trailing the
//! real pointer with independent easing.

use glam::Vec2;

use crate::{
    config::{CursorConfig, Rgba},
    tween::Animated,
    Easing,
};

/// Sampled look of both layers for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorFrame {
    pub ring_position: Vec2,
    pub ring_size: f32,
    pub ring_scale: f32,
    pub ring_color: Rgba,
    pub dot_position: Vec2,
    pub dot_size: f32,
    pub dot_color: Rgba,
}

#[derive(Debug, Clone)]
pub struct PointerFollower {
    config: CursorConfig,
    initialized: bool,
    ring_position: Animated<Vec2>,
    ring_scale: Animated<f32>,
    ring_color: Animated<Rgba>,
    dot_position: Animated<Vec2>,
}

impl PointerFollower {
    pub fn new(config: CursorConfig) -> Self {
        Self {
            ring_color: Animated::new(config.color),
            config,
            initialized: false,
            ring_position: Animated::new(Vec2::ZERO),
            ring_scale: Animated::new(1.0),
            dot_position: Animated::new(Vec2::ZERO),
        }
    }

    /// Takes over the pointer. Does nothing when disabled by configuration.
    pub fn init(&mut self) -> bool {
        if !self.config.enable || self.initialized {
            return false;
        }
        self.initialized = true;
        tracing::info!("custom cursor initialised");
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn pointer_moved(&mut self, position: Vec2, now_ms: u64) {
        if !self.initialized {
            return;
        }
        self.ring_position
            .retarget(position, now_ms, self.config.ring_follow_ms, Easing::Power2Out);
        self.dot_position
            .retarget(position, now_ms, self.config.dot_follow_ms, Easing::QuadOut);
    }

    pub fn is_interactive(&self, selector: &str) -> bool {
        self.config
            .interactive_selectors
            .iter()
            .any(|candidate| candidate == selector)
    }

    /// Pointer entered an element. Only interactive ones grow the ring.
    pub fn pointer_entered(&mut self, selector: &str, now_ms: u64) {
        if !self.initialized || !self.is_interactive(selector) {
            return;
        }
        let duration = self.config.hover_ms;
        self.ring_scale
            .retarget(self.config.hover_scale, now_ms, duration, Easing::QuadOut);
        self.ring_color
            .retarget(self.config.hover_color, now_ms, duration, Easing::QuadOut);
    }

    pub fn pointer_left(&mut self, selector: &str, now_ms: u64) {
        if !self.initialized || !self.is_interactive(selector) {
            return;
        }
        let duration = self.config.hover_ms;
        self.ring_scale.retarget(1.0, now_ms, duration, Easing::QuadOut);
        self.ring_color
            .retarget(self.config.color, now_ms, duration, Easing::QuadOut);
    }

    pub fn frame(&self, now_ms: u64) -> Option<CursorFrame> {
        if !self.initialized {
            return None;
        }
        Some(CursorFrame {
            ring_position: self.ring_position.sample(now_ms),
            ring_size: self.config.size,
            ring_scale: self.ring_scale.sample(now_ms),
            ring_color: self.ring_color.sample(now_ms),
            dot_position: self.dot_position.sample(now_ms),
            dot_size: self.config.dot_size,
            dot_color: self.config.dot_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_colour(actual: Rgba, expected: Rgba) {
        for (a, e) in [
            (actual.r, expected.r),
            (actual.g, expected.g),
            (actual.b, expected.b),
            (actual.a, expected.a),
        ] {
            assert!((a - e).abs() < 1e-5, "{actual} != {expected}");
        }
    }

    fn follower() -> PointerFollower {
        let mut follower = PointerFollower::new(CursorConfig::default());
        assert!(follower.init());
        follower
    }

    #[test]
    fn disabled_follower_stays_inert() {
        let mut follower = PointerFollower::new(CursorConfig {
            enable: false,
            ..Default::default()
        });
        assert!(!follower.init());
        follower.pointer_moved(Vec2::new(10.0, 10.0), 0);
        assert!(follower.frame(100).is_none());
    }

    #[test]
    fn dot_arrives_before_ring() {
        let mut follower = follower();
        let target = Vec2::new(200.0, 100.0);
        follower.pointer_moved(target, 0);

        let frame = follower.frame(100).unwrap();
        assert_eq!(frame.dot_position, target);
        assert!(frame.ring_position.x < target.x);

        let settled = follower.frame(400).unwrap();
        assert_eq!(settled.ring_position, target);
    }

    #[test]
    fn interactive_hover_scales_and_recolours_ring() {
        let mut follower = follower();
        follower.pointer_entered("p", 0);
        assert_eq!(follower.frame(300).unwrap().ring_scale, 1.0);

        follower.pointer_entered("button", 0);
        let hovered = follower.frame(300).unwrap();
        assert_eq!(hovered.ring_scale, 1.5);
        assert_colour(hovered.ring_color, CursorConfig::default().hover_color);

        follower.pointer_left("button", 300);
        let restored = follower.frame(600).unwrap();
        assert_eq!(restored.ring_scale, 1.0);
        assert_colour(restored.ring_color, CursorConfig::default().color);
    }
}

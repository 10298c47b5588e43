//! Reactive particle field behind the hero text.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::{
    config::{rgb_from_hex, BackdropConfig},
    scene::Viewport,
    tween::Lerp,
    Result, TypewriterError,
};

/// Converts virtual milliseconds into the field's rotation time base.
const ROTATION_TIME_SCALE: f32 = 0.000_05;

/// Particle material as sampled for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub size: f32,
    pub opacity: f32,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropFrame {
    pub at_ms: u64,
    pub camera: Vec3,
    pub rotation: Vec2,
    pub material: Material,
    pub view_proj: Mat4,
    pub clear_color: Vec3,
}

pub struct ParticleBackdrop {
    config: BackdropConfig,
    particles: Vec<Vec3>,
    viewport: Viewport,
    half_extent: Vec2,
    pointer: Vec2,
    camera: Vec3,
    rotation: Vec2,
    animating: bool,
    pulses: Vec<u64>,
    base_color: Vec3,
    pulse_color: Vec3,
    frames_rendered: u64,
}

impl ParticleBackdrop {
    /// Builds the particle field. Fails when no 3D context is available or
    /// the viewport cannot hold a projection.
    pub fn init(config: BackdropConfig, viewport: Viewport, graphics_available: bool) -> Result<Self> {
        if !graphics_available {
            return Err(TypewriterError::BackdropInit(
                "no 3D rendering context available".to_string(),
            ));
        }
        if viewport.is_empty() {
            return Err(TypewriterError::BackdropInit(format!(
                "viewport {}x{} is empty",
                viewport.width, viewport.height
            )));
        }
        if config.particle_count == 0 {
            return Err(TypewriterError::BackdropInit(
                "particle_count must be positive".to_string(),
            ));
        }

        let mut rng = Lcg::new(config.seed);
        let extent = config.field_extent;
        let particles = (0..config.particle_count)
            .map(|_| {
                Vec3::new(
                    rng.next_signed() * extent,
                    rng.next_signed() * extent,
                    rng.next_signed() * extent,
                )
            })
            .collect();

        let backdrop = Self {
            camera: Vec3::new(0.0, 0.0, config.camera_distance),
            base_color: rgb_from_hex(config.particle_color),
            pulse_color: rgb_from_hex(config.pulse_color),
            config,
            particles,
            viewport,
            half_extent: half_of(viewport),
            pointer: Vec2::ZERO,
            rotation: Vec2::ZERO,
            animating: false,
            pulses: Vec::new(),
            frames_rendered: 0,
        };
        tracing::info!(
            particles = backdrop.particles.len(),
            width = viewport.width,
            height = viewport.height,
            "3D backdrop initialised"
        );
        Ok(backdrop)
    }

    pub fn start(&mut self) {
        if !self.animating {
            self.animating = true;
            tracing::debug!("backdrop render loop started");
        }
    }

    pub fn stop(&mut self) {
        if self.animating {
            self.animating = false;
            tracing::debug!("backdrop render loop stopped");
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn particles(&self) -> &[Vec3] {
        &self.particles
    }

    pub fn camera(&self) -> Vec3 {
        self.camera
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Starts a short self-reverting emphasis. Pulses overlap, they never queue.
    pub fn pulse(&mut self, now_ms: u64) {
        let window = self.pulse_window();
        self.pulses.retain(|start| now_ms < start + window);
        self.pulses.push(now_ms);
    }

    pub fn active_pulses(&self, now_ms: u64) -> usize {
        let window = self.pulse_window();
        self.pulses
            .iter()
            .filter(|start| **start <= now_ms && now_ms < **start + window)
            .count()
    }

    /// Pointer position in page pixels.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x - self.half_extent.x, y - self.half_extent.y) / 2.0;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            tracing::warn!(width = viewport.width, height = viewport.height, "ignoring empty resize");
            return;
        }
        self.viewport = viewport;
        self.half_extent = half_of(viewport);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Advances one display frame. Returns `None` while the loop is stopped.
    pub fn frame(&mut self, now_ms: u64) -> Option<BackdropFrame> {
        if !self.animating {
            return None;
        }

        let influence = self.config.pointer_influence;
        self.camera.x += (self.pointer.x - self.camera.x) * influence;
        self.camera.y += (-self.pointer.y - self.camera.y) * influence;

        let angle = now_ms as f32 * ROTATION_TIME_SCALE * self.config.rotation_speed;
        self.rotation = Vec2::splat(angle);

        let window = self.pulse_window();
        self.pulses.retain(|start| now_ms < start + window);
        self.frames_rendered += 1;

        Some(BackdropFrame {
            at_ms: now_ms,
            camera: self.camera,
            rotation: self.rotation,
            material: self.material_at(now_ms),
            view_proj: self.view_projection(),
            clear_color: rgb_from_hex(self.config.background_color),
        })
    }

    pub fn material_at(&self, now_ms: u64) -> Material {
        let envelope = self
            .pulses
            .iter()
            .map(|start| self.envelope(*start, now_ms))
            .fold(0.0_f32, f32::max);
        Material {
            color: self.base_color.lerp(self.pulse_color, envelope),
            size: self.config.base_size.lerp(self.config.pulse_size, envelope),
            opacity: self.config.base_opacity,
        }
    }

    /// Camera looking at the field origin through the current projection.
    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.camera, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(
            self.config.fov_degrees.to_radians(),
            self.viewport.aspect_ratio(),
            1.0,
            self.config.camera_distance * 2.0,
        );
        proj * view
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x) * Mat4::from_rotation_y(self.rotation.y)
    }

    /// Particles that land inside clip space this frame.
    pub fn visible_particles(&self) -> usize {
        let mvp = self.view_projection() * self.model_matrix();
        self.particles
            .iter()
            .filter(|particle| {
                let clip = mvp * particle.extend(1.0);
                if clip.w <= 0.0 {
                    return false;
                }
                let ndc = clip.xyz() / clip.w;
                ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z)
            })
            .count()
    }

    fn pulse_window(&self) -> u64 {
        self.config.pulse_half_ms * 2
    }

    /// Linear rise then fall, peaking after `pulse_half_ms`.
    fn envelope(&self, start_ms: u64, now_ms: u64) -> f32 {
        let half = self.config.pulse_half_ms.max(1) as f32;
        if now_ms < start_ms {
            return 0.0;
        }
        let elapsed = (now_ms - start_ms) as f32;
        if elapsed < half {
            elapsed / half
        } else if elapsed < 2.0 * half {
            1.0 - (elapsed - half) / half
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for ParticleBackdrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleBackdrop")
            .field("particles", &self.particles.len())
            .field("viewport", &self.viewport)
            .field("animating", &self.animating)
            .field("camera", &self.camera)
            .field("pulses", &self.pulses.len())
            .finish()
    }
}

fn half_of(viewport: Viewport) -> Vec2 {
    Vec2::new(viewport.width as f32, viewport.height as f32) / 2.0
}

/// Small deterministic generator for particle placement.
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 32) as u32
    }

    /// Uniform in `[-1, 1]`.
    fn next_signed(&mut self) -> f32 {
        (self.next_u32() as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
    }
}

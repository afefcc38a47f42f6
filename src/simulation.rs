//! Effect builder and runner.
//!
//! [`Confetti`] configures an effect with method chaining; [`Confetti::build`]
//! yields a headless [`ConfettiEffect`] you drive with your own clock, while
//! [`Confetti::run`] opens a window where every click pops confetti.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::emitter::{EmissionPhase, EmissionScheduler};
use crate::error::EffectError;
use crate::feedback::{EffectCue, SilentCue};
use crate::particle::Particle;
use crate::render::Renderer;
use crate::spawn::SpawnContext;
use crate::time::Time;
use crate::visuals::Palette;
use crate::world::World;

/// A confetti effect builder.
///
/// Use method chaining to configure, then `.build()` for a headless effect or
/// `.run()` for a window.
///
/// ```ignore
/// use confetti::Confetti;
///
/// fn main() -> Result<(), confetti::EffectError> {
///     Confetti::new()
///         .with_palette(confetti::Palette::Classic)
///         .run()
/// }
/// ```
pub struct Confetti {
    palette: Palette,
    base_size: Vec2,
    lifetime: Option<f32>,
    seed: Option<u64>,
    background: Vec3,
    window_size: (u32, u32),
    cue: Option<Box<dyn EffectCue>>,
}

impl Confetti {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            palette: Palette::Classic,
            base_size: Vec2::new(12.0, 24.0),
            lifetime: None,
            seed: None,
            background: Vec3::new(0.02, 0.02, 0.05),
            window_size: (480, 800),
            cue: None,
        }
    }

    /// Set the color palette particles draw from.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set the unscaled particle size in pixels. Each spawn shrinks it by a
    /// random factor in [0.5, 1].
    pub fn with_base_size(mut self, size: Vec2) -> Self {
        self.base_size = size;
        self
    }

    /// Give every particle a fixed lifespan in seconds. Without one,
    /// particles live until they leave the canvas.
    pub fn with_lifetime(mut self, seconds: f32) -> Self {
        self.lifetime = Some(seconds);
        self
    }

    /// Seed the spawn randomness for reproducible effects.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the window clear color.
    pub fn with_background(mut self, color: Vec3) -> Self {
        self.background = color;
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Attach an audio/haptic cue fired once per trigger.
    pub fn with_cue<C: EffectCue + 'static>(mut self, cue: C) -> Self {
        self.cue = Some(Box::new(cue));
        self
    }

    /// Build the headless effect. You supply the clock and the canvas size.
    pub fn build(self) -> ConfettiEffect {
        let spawner = match self.seed {
            Some(seed) => {
                SpawnContext::seeded(seed, self.base_size, self.palette, self.lifetime)
            }
            None => SpawnContext::new(self.base_size, self.palette, self.lifetime),
        };
        ConfettiEffect {
            world: World::new(spawner),
            scheduler: None,
            cue: self.cue.unwrap_or_else(|| Box::new(SilentCue)),
        }
    }

    /// Open a window and run the effect. Click to pop. Blocks until the
    /// window is closed.
    pub fn run(self) -> Result<(), EffectError> {
        let background = self.background;
        let window_size = self.window_size;
        let effect = self.build();

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App {
            window: None,
            renderer: None,
            effect,
            time: Time::new(),
            background,
            window_size,
        };
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

impl Default for Confetti {
    fn default() -> Self {
        Self::new()
    }
}

/// A running effect: world, schedule and feedback cue behind one interface.
///
/// All mutation happens through [`ConfettiEffect::trigger`] and
/// [`ConfettiEffect::tick`], both called from a single execution context.
/// Renderers read [`ConfettiEffect::particles`] between ticks.
pub struct ConfettiEffect {
    world: World,
    scheduler: Option<EmissionScheduler>,
    cue: Box<dyn EffectCue>,
}

impl ConfettiEffect {
    /// Start (or restart) the effect at `now` on the given canvas.
    ///
    /// Any in-flight schedule is cancelled before the world is cleared, so a
    /// stale schedule can never spawn into the new run; the cue fires before
    /// the first particle appears.
    pub fn trigger(&mut self, now: f32, canvas: Vec2) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.handle().cancel();
        }
        self.world.reset();
        self.cue.play();
        self.scheduler = Some(EmissionScheduler::new(now, canvas));
    }

    /// Advance the effect one frame: spawn every batch due at `now`, then
    /// integrate and cull the population.
    pub fn tick(&mut self, now: f32, canvas: Vec2) {
        if let Some(scheduler) = &mut self.scheduler {
            for batch in scheduler.poll(now) {
                self.world.spawn_batch(batch, canvas);
            }
            if scheduler.is_finished() {
                self.scheduler = None;
            }
        }
        self.world.advance(now, canvas);
    }

    /// The live particles, in draw order.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        self.world.particles()
    }

    /// Particles spawned by the current run so far.
    #[inline]
    pub fn total_spawned(&self) -> u64 {
        self.world.total_spawned()
    }

    /// Where the emission schedule currently stands. [`EmissionPhase::Idle`]
    /// once the schedule has drained; particles may still be falling.
    pub fn phase(&self) -> EmissionPhase {
        self.scheduler
            .as_ref()
            .map(|s| s.phase())
            .unwrap_or(EmissionPhase::Idle)
    }

    /// Whether the schedule has drained and every particle has been culled.
    pub fn is_settled(&self) -> bool {
        self.scheduler.is_none() && self.world.is_empty()
    }
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    effect: ConfettiEffect,
    time: Time,
    background: Vec3,
    window_size: (u32, u32),
}

impl App {
    fn canvas(&self) -> Vec2 {
        match &self.renderer {
            Some(renderer) => Vec2::new(
                renderer.config.width as f32,
                renderer.config.height as f32,
            ),
            None => Vec2::ZERO,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let (width, height) = self.window_size;
            let window_attrs = Window::default_attributes()
                .with_title("Confetti")
                .with_inner_size(winit::dpi::LogicalSize::new(width, height));

            let window = match event_loop.create_window(window_attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    eprintln!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            self.window = Some(window.clone());

            match pollster::block_on(Renderer::new(window, self.background)) {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(e) => {
                    eprintln!("GPU error: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left && state == ElementState::Pressed {
                    let canvas = self.canvas();
                    self.effect.trigger(self.time.elapsed(), canvas);
                }
            }
            WindowEvent::RedrawRequested => {
                let (elapsed, _) = self.time.update();
                let canvas = self.canvas();
                self.effect.tick(elapsed, canvas);

                if let Some(renderer) = &mut self.renderer {
                    match renderer.render(self.effect.particles()) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            renderer.resize(winit::dpi::PhysicalSize {
                                width: renderer.config.width,
                                height: renderer.config.height,
                            })
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

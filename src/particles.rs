//! Bouncing-particle canvas behind the page content.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use gloo::render::request_animation_frame;
use leptos::prelude::{document, window};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::dom;
use crate::error::{Result, UiError};
use crate::subscriptions::Subscriptions;

pub const CANVAS_ID: &str = "particle-canvas";
const CANVAS_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; pointer-events: none; z-index: -1; opacity: 0.3;";
pub const MAX_SPEED: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleColor {
    Cyan,
    Magenta,
    Green,
}

impl ParticleColor {
    pub const ALL: [ParticleColor; 3] = [Self::Cyan, Self::Magenta, Self::Green];

    pub fn css(self) -> &'static str {
        match self {
            Self::Cyan => "#00ffff",
            Self::Magenta => "#ff00ff",
            Self::Green => "#00ff00",
        }
    }

    /// Maps a unit sample in `[0, 1)` onto one of the three colours.
    pub fn from_unit(sample: f64) -> Self {
        let idx = (sample.clamp(0.0, 0.999_999) * Self::ALL.len() as f64) as usize;
        Self::ALL[idx]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub opacity: f64,
    pub color: ParticleColor,
}

impl Particle {
    /// Draws every attribute from `sample`, a source of uniform values in `[0, 1)`.
    pub fn random(width: f64, height: f64, sample: &mut impl FnMut() -> f64) -> Self {
        Self {
            x: sample() * width,
            y: sample() * height,
            vx: (sample() - 0.5) * 2.0 * MAX_SPEED,
            vy: (sample() - 0.5) * 2.0 * MAX_SPEED,
            size: sample() * 2.0 + 1.0,
            opacity: sample() * 0.5 + 0.2,
            color: ParticleColor::from_unit(sample()),
        }
    }

    /// Advances one frame, turning the velocity back toward the interior on
    /// any axis where the particle is out of bounds.
    pub fn step(&mut self, width: f64, height: f64) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < 0.0 {
            self.vx = self.vx.abs();
        } else if self.x > width {
            self.vx = -self.vx.abs();
        }
        if self.y < 0.0 {
            self.vy = self.vy.abs();
        } else if self.y > height {
            self.vy = -self.vy.abs();
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
}

impl ParticleField {
    pub fn new(count: usize, width: f64, height: f64, mut sample: impl FnMut() -> f64) -> Self {
        let particles = (0..count)
            .map(|_| Particle::random(width, height, &mut sample))
            .collect();
        Self {
            particles,
            width,
            height,
        }
    }

    pub fn from_particles(particles: Vec<Particle>, width: f64, height: f64) -> Self {
        Self {
            particles,
            width,
            height,
        }
    }

    /// New draw surface; positions are left as they are.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn step(&mut self) {
        let (width, height) = (self.width, self.height);
        for particle in &mut self.particles {
            particle.step(width, height);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

struct Animation {
    field: ParticleField,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Animation {
    fn frame(&mut self) {
        let (width, height) = self.field.size();
        self.ctx.clear_rect(0.0, 0.0, width, height);
        self.field.step();
        for p in self.field.particles() {
            self.ctx.begin_path();
            if self.ctx.arc(p.x, p.y, p.size, 0.0, PI * 2.0).is_err() {
                continue;
            }
            self.ctx.set_fill_style_str(p.color.css());
            self.ctx.set_global_alpha(p.opacity);
            self.ctx.fill();
        }
    }

    fn fit_viewport(&mut self) {
        let (width, height) = dom::viewport_size();
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.field.resize(width, height);
    }
}

/// Appends the background canvas and starts the frame loop.
pub fn start(count: usize, subs: &Rc<RefCell<Subscriptions>>) -> Result<()> {
    let canvas = document()
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| UiError::Js("canvas element has unexpected type".to_string()))?;
    canvas.set_id(CANVAS_ID);
    canvas.style().set_css_text(CANVAS_STYLE);
    document()
        .body()
        .ok_or(UiError::MissingElement("body"))?
        .append_child(&canvas)?;

    let ctx = canvas
        .get_context("2d")?
        .ok_or(UiError::MissingElement("2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| UiError::Js("2d context has unexpected type".to_string()))?;

    let (width, height) = dom::viewport_size();
    let field = ParticleField::new(count, width, height, js_sys::Math::random);
    let animation = Rc::new(RefCell::new(Animation { field, canvas, ctx }));
    animation.borrow_mut().fit_viewport();

    let resized = animation.clone();
    subs.borrow_mut()
        .listen("particles-resize", &window(), "resize", move |_| {
            resized.borrow_mut().fit_viewport();
        });

    schedule_frame(animation, Rc::downgrade(subs));
    log::debug!("particle field started with {count} particles");
    Ok(())
}

fn schedule_frame(
    animation: Rc<RefCell<Animation>>,
    subs: std::rc::Weak<RefCell<Subscriptions>>,
) {
    let Some(registry) = subs.upgrade() else {
        return;
    };
    let next_subs = subs.clone();
    let frame = request_animation_frame(move |_| {
        animation.borrow_mut().frame();
        schedule_frame(animation, next_subs);
    });
    match registry.try_borrow_mut() {
        Ok(mut registry) => registry.hold_frame("particles-frame", frame),
        Err(_) => log::warn!("subscriptions busy; particle animation stopped"),
    };
}

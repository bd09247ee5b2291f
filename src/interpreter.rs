//! Interpreter that walks a token sequence as a turtle, accumulating transforms.
//!
//! The entry point is [`Interpreter`]. Configure it with an [`InterpreterConfig`], then
//! call [`Interpreter::build`] to emit geometry or [`Interpreter::draw`] to receive one
//! [`DrawCall`] per sub-model reference.

use crate::command::Command;
use crate::geometry::GeometryBuffer;
use crate::transform::{rotate_x, rotate_y, rotate_z, scale, transform_point, translate};
use crate::turtle::{Attributes, StateStack, TurtleState};
use glam::{Mat4, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Configuration for interpretation.
#[derive(Clone, Debug)]
pub struct InterpreterConfig {
    /// Turn angle (radians) in effect before any `A` override. Default: 0.3.
    pub default_angle: f32,
    /// Colour in effect before any `Colour` command. Default: opaque white.
    pub default_color: [f32; 4],
    /// Maximum stack depth for push/pop operations.
    pub max_stack_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            default_angle: 0.3,
            default_color: [1.0, 1.0, 1.0, 1.0],
            max_stack_depth: 4096,
        }
    }
}

/// Whether interpretation emits geometry or delegates sub-model tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Build,
    Draw,
}

/// External inputs read during interpretation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DrawContext {
    /// Monotonic clock. `HR` spins by `clock * 2π` radians about Y.
    pub clock: f32,
    /// Per-index angles read by `Hinge(i)`.
    pub hinges: Vec<f32>,
    /// Extra tilt about X applied after each `HR` spin.
    pub hr_compensation: Option<f32>,
}

impl DrawContext {
    /// A context at `clock` with no hinges and no compensation.
    pub fn at(clock: f32) -> Self {
        Self {
            clock,
            ..Default::default()
        }
    }
}

/// A sub-model reference met in draw mode, borrowed from the live registers.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall<'a> {
    /// The unrecognised token, used as the sub-model name.
    pub name: &'a str,
    /// Current local-to-world transform.
    pub transform: &'a Mat4,
    pub attributes: &'a Attributes,
}

/// An owned [`DrawCall`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub name: String,
    pub transform: Mat4,
    pub attributes: Attributes,
}

impl From<DrawCall<'_>> for DrawCommand {
    fn from(call: DrawCall<'_>) -> Self {
        Self {
            name: call.name.to_owned(),
            transform: *call.transform,
            attributes: *call.attributes,
        }
    }
}

/// The result of one interpretation pass.
#[derive(Clone, Debug, Default)]
pub struct Interpretation {
    /// Emitted geometry. Always empty in [`Mode::Draw`].
    pub geometry: GeometryBuffer,
    /// Registers after the last token.
    pub state: TurtleState,
}

// Unit triangle: apex up, base across the local origin.
const TRIANGLE: [Vec3; 3] = [
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(-0.1, 0.0, 0.0),
    Vec3::new(0.1, 0.0, 0.0),
];

const QUAD: [Vec3; 4] = [
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(-1.0, 1.0, 0.0),
];

/// Interprets token sequences as turtle programs.
#[derive(Clone, Debug, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    /// Creates an interpreter with the given configuration.
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Registers at the start of every pass.
    pub fn initial_state(&self, transform: Mat4) -> TurtleState {
        TurtleState::new(
            transform,
            Attributes {
                color: self.config.default_color,
                angle: self.config.default_angle,
                ..Default::default()
            },
        )
    }

    /// Runs `tokens` in build mode and returns the emitted geometry.
    pub fn build<S: AsRef<str>>(
        &self,
        tokens: &[S],
        start: Mat4,
        ctx: &DrawContext,
    ) -> GeometryBuffer {
        self.build_with_rng(tokens, start, ctx, &mut rand::thread_rng())
    }

    /// [`build`](Self::build) drawing `RandScale` factors from `rng`.
    pub fn build_with_rng<S: AsRef<str>, R: Rng + ?Sized>(
        &self,
        tokens: &[S],
        start: Mat4,
        ctx: &DrawContext,
        rng: &mut R,
    ) -> GeometryBuffer {
        self.interpret_with_rng(tokens, start, Mode::Build, ctx, None, rng)
            .geometry
    }

    /// Runs `tokens` in draw mode, calling `on_draw` for every unrecognised token.
    pub fn draw<S, F>(&self, tokens: &[S], start: Mat4, ctx: &DrawContext, mut on_draw: F)
    where
        S: AsRef<str>,
        F: FnMut(DrawCall<'_>),
    {
        let on_draw: &mut dyn FnMut(DrawCall<'_>) = &mut on_draw;
        self.interpret(tokens, start, Mode::Draw, ctx, Some(on_draw));
    }

    /// Runs `tokens` in draw mode and collects the draw calls in order.
    pub fn draw_list<S: AsRef<str>>(
        &self,
        tokens: &[S],
        start: Mat4,
        ctx: &DrawContext,
    ) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        self.draw(tokens, start, ctx, |call| out.push(call.into()));
        out
    }

    /// Interprets `tokens` from `start` with a thread-local RNG for `RandScale`.
    pub fn interpret<S: AsRef<str>>(
        &self,
        tokens: &[S],
        start: Mat4,
        mode: Mode,
        ctx: &DrawContext,
        on_draw: Option<&mut dyn FnMut(DrawCall<'_>)>,
    ) -> Interpretation {
        self.interpret_with_rng(tokens, start, mode, ctx, on_draw, &mut rand::thread_rng())
    }

    /// Interprets `tokens` from `start`.
    ///
    /// Walks every token in order. Transform commands post-multiply the current matrix
    /// (they act in the turtle's local frame). Geometry is only emitted in
    /// [`Mode::Build`]; in [`Mode::Draw`] every [`Command::Unknown`] token is handed to
    /// `on_draw` with the live transform and attributes.
    ///
    /// # Push / Pop
    ///
    /// `[` saves transform and attributes together; `]` restores both. Popping an empty
    /// stack does nothing. Pushes beyond `max_stack_depth` save nothing, and the `]`
    /// matching such a push keeps the current registers, so outer brackets still pair up.
    pub fn interpret_with_rng<S: AsRef<str>, R: Rng + ?Sized>(
        &self,
        tokens: &[S],
        start: Mat4,
        mode: Mode,
        ctx: &DrawContext,
        mut on_draw: Option<&mut dyn FnMut(DrawCall<'_>)>,
        rng: &mut R,
    ) -> Interpretation {
        let build = mode == Mode::Build;
        let mut geometry = GeometryBuffer::new();
        let mut turtle = self.initial_state(start);
        let mut stack = StateStack::new(self.config.max_stack_depth);

        for token in tokens {
            let token = token.as_ref();
            let a = turtle.attributes;

            match Command::parse(token) {
                // --- SPATIAL ---
                Command::Forward => turtle.apply(translate(0.0, 1.0, 0.0)),
                Command::Back => turtle.apply(translate(0.0, -1.0, 0.0)),
                Command::TurnZ(s) => turtle.apply(rotate_z(a.angle * s)),
                Command::TurnY(s) => turtle.apply(rotate_y(a.angle * s)),
                Command::TurnX(s) => turtle.apply(rotate_x(a.angle * s)),
                Command::ScaleBy(k) => turtle.apply(scale(k, k, k)),
                Command::Scale(x, y, z) => turtle.apply(scale(x, y, z)),
                Command::RandScale(lo, hi) => {
                    let k = sample_between(rng, lo, hi);
                    turtle.apply(scale(k, k, k));
                }
                Command::ClockSpin => {
                    turtle.apply(rotate_y(ctx.clock * TAU));
                    if let Some(tilt) = ctx.hr_compensation
                        && tilt != 0.0
                    {
                        turtle.apply(rotate_x(tilt));
                    }
                }
                Command::Hinge(i) => {
                    if let Some(&angle) = ctx.hinges.get(i) {
                        turtle.apply(rotate_y(angle));
                    }
                }

                // --- GEOMETRY ---
                Command::Triangle { advance } => {
                    if build {
                        for corner in TRIANGLE {
                            let p = transform_point(&turtle.transform, corner);
                            geometry.push_vertex(p, a.color);
                        }
                    }
                    if advance {
                        turtle.apply(translate(0.0, 1.0, 0.0));
                    }
                }
                Command::Quad => {
                    if build {
                        for i in [0, 1, 2, 0, 2, 3] {
                            let p = transform_point(&turtle.transform, QUAD[i]);
                            geometry.push_vertex(p, a.color);
                        }
                    }
                }
                Command::Point => {
                    if build {
                        let p = transform_point(&turtle.transform, Vec3::ZERO);
                        geometry.push_vertex(p, a.color);
                    }
                }
                Command::Origin => {
                    if build {
                        geometry.push_vertex(Vec3::ZERO, a.color);
                    }
                }
                Command::Vertex(x, y) => {
                    if build {
                        let p = transform_point(&turtle.transform, Vec3::new(x, y, 0.0));
                        geometry.push_vertex(p, a.color);
                    }
                }
                Command::ReverseTriangle => {
                    if build {
                        geometry.reverse_last_triangle();
                    }
                }

                // --- ATTRIBUTES ---
                Command::Lighting(on) => turtle.attributes.use_lighting = on,
                Command::Mirror(on) => turtle.attributes.mirror = on,
                Command::Colour([r, g, b]) => {
                    let alpha = turtle.attributes.color[3];
                    turtle.attributes.color = [r, g, b, alpha];
                }
                Command::Angle(angle) => turtle.attributes.angle = angle,

                // --- FLOW ---
                Command::Push => {
                    if !stack.push(&turtle) && stack.overflow() == 1 {
                        log::warn!(
                            "push dropped: stack depth limit {} reached",
                            self.config.max_stack_depth
                        );
                    }
                }
                // A pop that closes a dropped push leaves the registers alone.
                Command::Pop => {
                    if let Some(saved) = stack.pop() {
                        turtle = saved;
                    }
                }

                Command::Malformed(raw) => log::debug!("ignoring malformed command {raw:?}"),
                Command::Unknown(name) => {
                    if !build && let Some(cb) = on_draw.as_mut() {
                        log::trace!("delegating {name:?}");
                        cb(DrawCall {
                            name,
                            transform: &turtle.transform,
                            attributes: &turtle.attributes,
                        });
                    }
                }
            }
        }

        Interpretation {
            geometry,
            state: turtle,
        }
    }
}

/// Uniform sample from `[lo, hi]`, tolerating reversed or equal bounds.
///
/// A span that is not finite cannot be sampled; the result is then `lo` when finite,
/// otherwise the identity scale.
fn sample_between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if !(hi - lo).is_finite() {
        return if lo.is_finite() { lo } else { 1.0 };
    }
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if lo == hi {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

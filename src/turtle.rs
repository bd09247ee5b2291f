//! Turtle registers and the paired save/restore stack.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Drawing attributes carried alongside the transform.
///
/// This acts as the "pen style": every emitted vertex takes the current colour, and
/// every turn command uses the current angle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// RGBA in `0..=1`.
    pub color: [f32; 4],

    /// Turn angle in radians used by `Y`/`y`, `R`/`r` and `P`/`p`.
    pub angle: f32,

    /// Whether the renderer should light geometry drawn with these attributes.
    pub use_lighting: bool,

    /// Mirror flag toggled by `mirrorOn`/`mirrorOff`.
    pub mirror: bool,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            angle: 0.3,
            use_lighting: false,
            mirror: false,
        }
    }
}

/// The full register file of the interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Local-to-world transform. Local +Y is "forward".
    pub transform: Mat4,
    /// Pen style in effect at this transform.
    pub attributes: Attributes,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            attributes: Attributes::default(),
        }
    }
}

impl TurtleState {
    /// Registers from an explicit transform and attributes.
    pub fn new(transform: Mat4, attributes: Attributes) -> Self {
        Self {
            transform,
            attributes,
        }
    }

    /// Post-multiplies the transform: `m` is applied in the turtle's local frame.
    pub fn apply(&mut self, m: Mat4) {
        self.transform *= m;
    }

    /// World-space position of the local origin.
    pub fn position(&self) -> glam::Vec3 {
        self.transform.w_axis.truncate()
    }
}

/// Saved turtle states for `[` / `]`.
///
/// Transform and attributes are always saved and restored together, so their depths
/// can never drift apart.
///
/// Pushes past `max_depth` are counted instead of saved. Each pop first pays off that
/// count, so brackets opened below the limit still pop their own frames.
#[derive(Clone, Debug)]
pub struct StateStack {
    frames: Vec<TurtleState>,
    max_depth: usize,
    overflow: usize,
}

impl StateStack {
    /// An empty stack holding at most `max_depth` saved states.
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
            overflow: 0,
        }
    }

    /// Saves a copy of `state`. Returns `false` (and saves nothing) at `max_depth`.
    pub fn push(&mut self, state: &TurtleState) -> bool {
        if self.frames.len() >= self.max_depth {
            self.overflow += 1;
            return false;
        }
        self.frames.push(*state);
        true
    }

    /// Removes and returns the most recent save.
    ///
    /// `None` on an empty stack, and also when the pop closes a push that was dropped.
    pub fn pop(&mut self) -> Option<TurtleState> {
        if self.overflow > 0 {
            self.overflow -= 1;
            return None;
        }
        self.frames.pop()
    }

    /// Number of saved states.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of open pushes that were dropped at the depth limit.
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    /// True when no bracket is open, saved or dropped.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.overflow == 0
    }
}

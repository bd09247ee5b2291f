//! # lsys-mesh
//!
//! A symbolic rewriting engine ("L-System") paired with a stack-based turtle interpreter
//! that turns the rewritten token sequence into triangle geometry using [`glam`].
//!
//! Data flows one way: a [`RuleBook`] is expanded by [`expand`] into a token sequence,
//! the [`Interpreter`] walks those tokens accumulating 3D transforms, and either emits a
//! [`GeometryBuffer`] (build mode) or hands each unknown token to a draw callback
//! (draw mode). [`flat_normals`] finishes built geometry for lighting. Rendering itself is
//! left to an implementation of [`Renderer`].

pub mod bonsai;
pub mod catalog;
pub mod command;
pub mod error;
pub mod geometry;
pub mod interpreter;
pub mod rewrite;
pub mod rules;
pub mod scene;
pub mod transform;
pub mod turtle;

pub use bonsai::*;
pub use catalog::*;
pub use command::*;
pub use error::*;
pub use geometry::*;
pub use interpreter::*;
pub use rewrite::*;
pub use rules::*;
pub use scene::*;
pub use turtle::*;

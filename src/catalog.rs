//! Built-in grammar data: the plant gallery, the hinged snake, and hinge animation.

use crate::error::LsysError;
use crate::rules::RuleBook;
use crate::transform::{multiply, scale, translate};
use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

const PLANTS_JSON: &str = include_str!("../assets/plants.json");
const GALLERY_JSON: &str = include_str!("../assets/gallery.json");

/// Number of hinges in the snake program.
pub const SNAKE_HINGES: usize = 23;

/// Parses the embedded plant rule book (Koch curves, trees, flowers, polyhedra, ...).
pub fn plant_rules() -> Result<RuleBook, LsysError> {
    RuleBook::from_json_str(PLANTS_JSON)
}

/// One gallery exhibit: a draw-mode program plus framing for the camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// Caption shown with the exhibit.
    pub label: String,
    /// Token string run in draw mode.
    pub program: String,
    /// `[scale, x offset, y offset]` that centres the plant in view.
    pub compensation: [f32; 3],
}

impl GalleryEntry {
    /// `translate(x, y, 0) * scale(s)` from the compensation triple.
    pub fn base_transform(&self) -> Mat4 {
        compensation_transform(self.compensation)
    }
}

/// Camera framing for a `[scale, x, y]` triple: `translate(x, y, 0) * scale(s)`.
pub fn compensation_transform([s, x, y]: [f32; 3]) -> Mat4 {
    multiply(translate(x, y, 0.0), scale(s, s, s))
}

/// The built-in exhibits, snake poses and bonsai framing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    /// Exhibits in display order.
    pub gallery: Vec<GalleryEntry>,
    /// Named snake poses, one step value per hinge.
    pub hinge_patterns: HashMap<String, Vec<i8>>,
    /// Framing for generated bonsai, as for [`GalleryEntry::compensation`].
    pub bonsai_compensation: [f32; 3],
}

impl Gallery {
    /// Parses the embedded gallery description.
    pub fn builtin() -> Result<Self, LsysError> {
        Ok(serde_json::from_str(GALLERY_JSON)?)
    }

    /// Exhibit at `index`.
    pub fn entry(&self, index: usize) -> Option<&GalleryEntry> {
        self.gallery.get(index)
    }

    /// Snake pose by name.
    pub fn pattern(&self, name: &str) -> Option<&[i8]> {
        self.hinge_patterns.get(name).map(Vec::as_slice)
    }

    /// Pattern names in a stable (sorted) order.
    pub fn pattern_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.hinge_patterns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Builds the draw-mode program for a chain of `segments` hinged prisms.
///
/// Segment `i` is joined to its predecessor by `Hinge(i)`; segments alternate between
/// the `Prism1` and `Prism` sub-models, each capped with a stretched tip.
pub fn snake_program(segments: usize) -> String {
    const CAP: &str = "[ hs F A2.356 P Scale(1.0,1.2,1.0) ]";
    let mut program = format!(
        "[ mirrorOff noRtt LightsOn Colour255,0,0 f A0.35 R HR [ s s Arrow F Arrow Prism {CAP} A1.5707"
    );
    for i in 0..segments {
        let body = if i % 2 == 0 { "Prism1" } else { "Prism" };
        program.push_str(&format!(
            " hs F Scale(1.2,1.2,1.2) p F Scale(0.8333,0.8333,0.8333) hS Hinge({i}) {body} {CAP}"
        ));
    }
    program.push_str(" ] ]");
    program
}

/// Eases a set of hinge angles toward target poses.
#[derive(Clone, Debug, PartialEq)]
pub struct HingeRig {
    current: Vec<f32>,
    target: Vec<f32>,
}

impl HingeRig {
    /// Fraction of the remaining distance covered by each [`step`](Self::step).
    pub const EASING: f32 = 0.1;

    /// `count` hinges, all resting (and aimed) at π.
    pub fn new(count: usize) -> Self {
        Self {
            current: vec![PI; count],
            target: vec![PI; count],
        }
    }

    /// Aims hinge `i` at `(pattern[i] + 2) * π/2`. Extra pattern entries are ignored.
    pub fn set_pattern(&mut self, pattern: &[i8]) {
        for (t, &p) in self.target.iter_mut().zip(pattern) {
            *t = (p as f32 + 2.0) * FRAC_PI_2;
        }
    }

    /// Moves every hinge [`EASING`](Self::EASING) of the way to its target.
    pub fn step(&mut self) {
        for (h, t) in self.current.iter_mut().zip(&self.target) {
            *h += (t - *h) * Self::EASING;
        }
    }

    /// Current hinge angles, suitable for [`DrawContext::hinges`](crate::DrawContext::hinges).
    pub fn angles(&self) -> &[f32] {
        &self.current
    }

    /// Angles the hinges are easing toward.
    pub fn targets(&self) -> &[f32] {
        &self.target
    }
}

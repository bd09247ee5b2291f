//! Tokenizer and the two-stage command classification.
//!
//! Raw tokens are plain strings. Before interpretation each one is classified into a
//! [`Command`]: literal commands by exact match, parameterized families by prefix with
//! their numeric payload already parsed. The interpreter then dispatches with a single
//! exhaustive `match`.

use std::str::FromStr;

/// Splits a command string on runs of whitespace, discarding empty tokens.
pub fn tokenize(source: &str) -> Vec<&str> {
    source.split_whitespace().collect()
}

/// A classified interpreter command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command<'a> {
    // --- Spatial Navigation ---
    /// Translate one unit along local +Y (`F`).
    Forward,
    /// Translate one unit along local -Y (`f`).
    Back,
    /// Rotate about local Z by the current angle times the sign (`Y` / `y`).
    TurnZ(f32),
    /// Rotate about local Y by the current angle times the sign (`R` / `r`).
    TurnY(f32),
    /// Rotate about local X by the current angle times the sign (`P` / `p`).
    TurnX(f32),
    /// Uniform scale by a fixed factor (`s`, `S`, `hs`, `hS`).
    ScaleBy(f32),
    /// Explicit nonuniform scale, `Scale(x,y,z)`.
    Scale(f32, f32, f32),
    /// Uniform scale sampled from `[lo, hi]`, `RandScale(lo,hi)`.
    RandScale(f32, f32),
    /// Spin about Y driven by the external clock (`HR`).
    ClockSpin,
    /// Rotate about Y by an externally supplied hinge angle, `Hinge(i)`.
    Hinge(usize),

    // --- Geometry Emission ---
    /// Unit triangle (`T`), optionally followed by a forward move (`TF`).
    Triangle { advance: bool },
    /// Unit quad as two triangles (`Q`).
    Quad,
    /// Transformed origin (`.` / `op`).
    Point,
    /// Untransformed world origin (`origin`).
    Origin,
    /// Explicit local vertex at `(x, y, 0)`, `V(x,y)`.
    Vertex(f32, f32),
    /// Swap the first two vertices of the last emitted triangle (`reverseTriangle`).
    ReverseTriangle,

    // --- Attributes ---
    /// `LightsOn` / `LightsOff`.
    Lighting(bool),
    /// `mirrorOn` / `mirrorOff`.
    Mirror(bool),
    /// `ColourR,G,B`, normalized to `0..=1`.
    Colour([f32; 3]),
    /// Turn angle override in radians, `A0.35`.
    Angle(f32),

    // --- Flow Control ---
    /// Save transform and attributes (`[`).
    Push,
    /// Restore transform and attributes (`]`).
    Pop,

    /// A known parameterized family whose payload did not parse. Ignored.
    Malformed(&'a str),
    /// Anything outside the vocabulary; delegated to the draw callback in draw mode.
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Classifies a single raw token. Total: every input maps to some command.
    pub fn parse(token: &'a str) -> Self {
        if let Some(cmd) = Self::parse_literal(token) {
            return cmd;
        }

        if let Some(rest) = token.strip_prefix("Colour") {
            return parse_colour(rest).map_or(Command::Malformed(token), Command::Colour);
        }
        if let Some(args) = call_args(token, "RandScale") {
            // Both bounds and their span must be finite to sample from.
            return match parse_floats::<2>(args) {
                Some([lo, hi]) if (hi - lo).is_finite() => Command::RandScale(lo, hi),
                _ => Command::Malformed(token),
            };
        }
        if let Some(args) = call_args(token, "Scale") {
            return match parse_floats::<3>(args) {
                Some([x, y, z]) => Command::Scale(x, y, z),
                None => Command::Malformed(token),
            };
        }
        if let Some(args) = call_args(token, "Hinge") {
            return parse_unsigned::<usize>(args).map_or(Command::Malformed(token), Command::Hinge);
        }
        if let Some(args) = call_args(token, "V") {
            return match parse_floats::<2>(args) {
                Some([x, y]) => Command::Vertex(x, y),
                None => Command::Malformed(token),
            };
        }
        // `A` only claims tokens that are a well-formed angle; `Arrow` stays a symbol.
        if let Some(rest) = token.strip_prefix('A')
            && let Ok(angle) = rest.parse::<f32>()
            && angle.is_finite()
        {
            return Command::Angle(angle);
        }

        Command::Unknown(token)
    }

    fn parse_literal(token: &str) -> Option<Self> {
        let cmd = match token {
            "F" => Command::Forward,
            "f" => Command::Back,
            "Y" => Command::TurnZ(1.0),
            "y" => Command::TurnZ(-1.0),
            "R" => Command::TurnY(1.0),
            "r" => Command::TurnY(-1.0),
            "P" => Command::TurnX(1.0),
            "p" => Command::TurnX(-1.0),
            "s" => Command::ScaleBy(0.666),
            "S" => Command::ScaleBy(1.5),
            "hs" => Command::ScaleBy(0.5),
            "hS" => Command::ScaleBy(2.0),
            "HR" => Command::ClockSpin,
            "T" => Command::Triangle { advance: false },
            "TF" => Command::Triangle { advance: true },
            "Q" => Command::Quad,
            "." | "op" => Command::Point,
            "origin" => Command::Origin,
            "reverseTriangle" => Command::ReverseTriangle,
            "LightsOn" => Command::Lighting(true),
            "LightsOff" => Command::Lighting(false),
            "mirrorOn" => Command::Mirror(true),
            "mirrorOff" => Command::Mirror(false),
            "[" => Command::Push,
            "]" => Command::Pop,
            _ => return None,
        };
        Some(cmd)
    }
}

/// Returns the text between `Name(` and the closing `)`, if `token` has that shape.
fn call_args<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    token
        .strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_floats<const N: usize>(args: &str) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    let mut parts = args.split(',');
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse::<f32>().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Plain decimal digits only; `str::parse` alone would also take a leading `+`.
fn parse_unsigned<T: FromStr>(digits: &str) -> Option<T> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn parse_colour(args: &str) -> Option<[f32; 3]> {
    let mut out = [0.0; 3];
    let mut parts = args.split(',');
    for slot in out.iter_mut() {
        *slot = parse_unsigned::<u8>(parts.next()?)? as f32 / 255.0;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

//! Randomized bonsai grammar.
//!
//! Every call to [`BonsaiGenerator::generate`] returns a brand-new [`RuleBook`]; nothing
//! shared is mutated, so a regenerated tree only appears once the caller swaps the book
//! in and discards the cached model.

use crate::rules::{ModelMeta, PrimitiveKind, RuleBook};
use rand::prelude::*;

/// Name of the generated root symbol.
pub const BONSAI_SYMBOL: &str = "RandomBonsai";

const TRUNKS: &[&str] = &["F T F T F T", "F T F T F T F T", "F T F T F T F T F T"];

const FORKS: &[&str] = &[
    "[ y MyBranch ] [ Y MyBranch ] [ r p MyBranch ] [ R p MyBranch ]",
    "[ y MyBranch ] [ Y MyBranch ] [ r p MyBranch ]",
    "[ y MyBranch ] [ Y MyBranch ] [ r p MyBranch ] [ R p MyBranch ] [ P MyBranch ]",
];

const BRANCHES: &[&str] = &[
    "s F T [ y MyBranch [ p S S MyLeaf ] ] [ Y MyBranch [ p S S MyLeaf ] ] [ p S S MyLeaf ]",
    "s F T F T [ y MyBranch [ p S S MyLeaf ] ] [ Y MyBranch [ p S S MyLeaf ] ] [ P S S MyLeaf ]",
    "s F T [ y MyBranch ] [ r MyBranch ] [ Y S S MyLeaf ]",
    "s F T [ MyLeaf ] [ y MyBranch ] [ Y MyBranch ]",
];

const LEAVES: &[&str] = &[
    "[ T ]",
    "[ r p T r p T r p T ]",
    "[ Y T y T Y T ]",
    "[ p T P T p T ]",
];

/// Generator settings.
#[derive(Clone, Debug)]
pub struct BonsaiGenerator {
    /// Self-expansion depth of the generated root. Default: 5.
    pub iterations: u32,
    /// Turn angle range in radians, sampled as `[lo, hi)`. Default: `0.3..0.6`.
    pub angle_range: (f32, f32),
}

impl Default for BonsaiGenerator {
    fn default() -> Self {
        Self {
            iterations: 5,
            angle_range: (0.3, 0.6),
        }
    }
}

impl BonsaiGenerator {
    /// Picks a trunk, fork, branch, and leaf template plus colours and a turn angle.
    ///
    /// The result holds a single group, [`BONSAI_SYMBOL`], whose helper productions
    /// `MyBranch` and `MyLeaf` recurse only within that group's fixed depth.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> RuleBook {
        let trunk_colour = random_colour(rng);
        let leaf_colour = random_colour(rng);
        let (lo, hi) = self.angle_range;
        let angle = if hi > lo { rng.gen_range(lo..hi) } else { lo };

        let trunk = pick(rng, TRUNKS);
        let fork = pick(rng, FORKS);
        let branch = pick(rng, BRANCHES);
        let leaf = pick(rng, LEAVES);

        let root = format!("A{angle:.2} {trunk_colour} {trunk} {fork}");
        let my_leaf = format!("{leaf_colour} {leaf}");

        log::debug!("generated bonsai: trunk {trunk:?}, fork {fork:?}, angle {angle:.2}");

        RuleBook::new()
            .with_group(
                BONSAI_SYMBOL,
                [
                    (BONSAI_SYMBOL, split(&root)),
                    ("MyBranch", split(branch)),
                    ("MyLeaf", split(&my_leaf)),
                ],
            )
            .with_meta(
                BONSAI_SYMBOL,
                ModelMeta {
                    iterations: self.iterations,
                    style: PrimitiveKind::Triangles,
                    ..Default::default()
                },
            )
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, table: &[&'a str]) -> &'a str {
    table.choose(rng).copied().unwrap_or_default()
}

fn split(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_owned).collect()
}

/// `ColourR,G,B` with each channel in `50..=255`.
fn random_colour<R: Rng + ?Sized>(rng: &mut R) -> String {
    let r: u8 = rng.gen_range(50..=255);
    let g: u8 = rng.gen_range(50..=255);
    let b: u8 = rng.gen_range(50..=255);
    format!("Colour{r},{g},{b}")
}

//! The rewriting engine.
//!
//! Each outer pass scans the sequence left to right. Every token that owns a rule group
//! is replaced by the result of self-expanding that token alone against its group for
//! its own depth. Passes repeat until one makes no substitution or a ceiling is reached.

use crate::rules::{RuleBook, RuleGroup};

/// Bounds on the outer rewriting loop.
#[derive(Clone, Copy, Debug)]
pub struct RewriteConfig {
    /// Maximum number of outer passes. Default: 50.
    pub max_passes: usize,
    /// Once the output of a pass grows past this many tokens, the rest of the pass copies
    /// tokens through unchanged and expansion stops.
    pub max_tokens: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_passes: 50,
            max_tokens: 4_000_000,
        }
    }
}

/// Expands `seed` against `book` with the default ceilings.
pub fn expand<S: AsRef<str>>(seed: &[S], book: &RuleBook) -> Vec<String> {
    expand_with(seed, book, &RewriteConfig::default())
}

/// Expands `seed` against `book`.
///
/// Never fails: tokens without a rule pass through, empty productions delete their
/// symbol, and runaway grammars are truncated at whichever ceiling is hit first.
pub fn expand_with<S: AsRef<str>>(
    seed: &[S],
    book: &RuleBook,
    config: &RewriteConfig,
) -> Vec<String> {
    let mut output: Vec<String> = seed.iter().map(|s| s.as_ref().to_owned()).collect();

    for pass in 0..config.max_passes {
        let mut next = Vec::with_capacity(output.len());
        let mut changed = false;
        let mut truncated = false;

        for token in output {
            if truncated {
                next.push(token);
                continue;
            }
            match book.group(&token) {
                Some(group) => {
                    let depth = book.depth_of(&token);
                    next.extend(self_expand(token, group, depth, config.max_tokens));
                    changed = true;
                    truncated = next.len() > config.max_tokens;
                }
                None => next.push(token),
            }
        }

        output = next;
        if truncated {
            log::warn!(
                "rewriting stopped at pass {}: {} tokens exceeds the {} token ceiling",
                pass + 1,
                output.len(),
                config.max_tokens
            );
            return output;
        }
        if !changed {
            log::debug!("rewriting reached a fixpoint after {} passes", pass + 1);
            return output;
        }
    }

    log::warn!(
        "rewriting hit the {} pass ceiling with {} tokens",
        config.max_passes,
        output.len()
    );
    output
}

/// Rewrites the single-token sequence `[symbol]` against `group` for `depth` iterations.
fn self_expand(symbol: String, group: &RuleGroup, depth: u32, max_tokens: usize) -> Vec<String> {
    let mut current = vec![symbol];
    for _ in 0..depth {
        current = rewrite_once(&current, group);
        if current.len() > max_tokens {
            break;
        }
    }
    current
}

fn rewrite_once(tokens: &[String], group: &RuleGroup) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match group.get(token) {
            Some(production) => out.extend(production.iter().cloned()),
            None => out.push(token.clone()),
        }
    }
    out
}

//! Markup normalisation: deterministic stripping of the light markup the
//! rewrite model tends to emit.
//!
//! Even when asked for plain corrected text, generative models habitually
//! decorate their output — `**bold**` around answer numbers, `*emphasis*`
//! on corrected words, `- ` bullets in front of list items. This module
//! removes exactly that fixed set of patterns and nothing else, so the
//! plain rendition is always derivable from the marked one by a pure
//! function.
//!
//! ## Rule Order
//!
//! Emphasis markers are prefix-overlapping (`***` contains `**` contains
//! `*`), so the widest pattern must run first: stripping `*X*` before
//! `***X***` would eat the outer asterisks and leave `*X*` behind
//! corrupted. Bullet removal is line-anchored and runs after the emphasis
//! passes; the final step trims the whole result.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_TRIPLE_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*\*(.*?)\*\*\*").unwrap());
static RE_DOUBLE_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static RE_SINGLE_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static RE_LEADING_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-*+]\s+").unwrap());

/// Strip light markup from `text`, producing the plain rendition.
///
/// Pure, total over all inputs, and idempotent: running it twice yields
/// byte-identical output, and text containing no markup tokens comes back
/// as `text.trim()`.
///
/// Passes, in order:
/// 1. `***X***` → `X`
/// 2. `**X**` → `X`
/// 3. `*X*` → `X`
/// 4. Remove a leading `-`/`*`/`+` bullet (plus following whitespace) at
///    the start of any line; the same characters mid-line are untouched
/// 5. Trim leading/trailing whitespace of the whole result
pub fn normalize(text: &str) -> String {
    let s = RE_TRIPLE_EMPHASIS.replace_all(text, "$1");
    let s = RE_DOUBLE_EMPHASIS.replace_all(&s, "$1");
    let s = RE_SINGLE_EMPHASIS.replace_all(&s, "$1");
    let s = RE_LEADING_BULLET.replace_all(&s, "");
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triple_emphasis_unwraps_in_one_pass() {
        // Widest-first ordering: the result is the bare word, not "*bold*".
        assert_eq!(normalize("***bold***"), "bold");
    }

    #[test]
    fn double_emphasis_unwraps() {
        assert_eq!(normalize("**1.** Halo dunia"), "1. Halo dunia");
    }

    #[test]
    fn single_emphasis_unwraps() {
        assert_eq!(normalize("kata *penting* di sini"), "kata penting di sini");
    }

    #[test]
    fn bullet_removal_is_line_scoped() {
        assert_eq!(normalize("- item\nkeep - this"), "item\nkeep - this");
    }

    #[test]
    fn all_bullet_markers_are_removed() {
        assert_eq!(normalize("- satu\n* dua\n+ tiga"), "satu\ndua\ntiga");
    }

    #[test]
    fn plain_text_equals_trimmed_input() {
        let t = "  1. Jawaban pertama.\n2. Jawaban kedua.  \n";
        assert_eq!(normalize(t), t.trim());
    }

    #[test]
    fn idempotent() {
        let samples = [
            "***a*** dan **b** dan *c*",
            "- item\n  - nested\nplain",
            "no markup at all",
            "",
            "  \n\t ",
            "**1.** Halo dunia",
        ];
        for t in samples {
            let once = normalize(t);
            assert_eq!(normalize(&once), once, "not idempotent for {t:?}");
        }
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n  "), "");
    }

    #[test]
    fn mixed_document() {
        let input = "**1.** *Ibu* pergi ke pasar.\n- **2.** Ayah membaca koran.\n";
        assert_eq!(
            normalize(input),
            "1. Ibu pergi ke pasar.\n2. Ayah membaca koran."
        );
    }
}

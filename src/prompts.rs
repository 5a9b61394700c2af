//! Instruction template for the AI rewrite stage.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the template is a structural constant of
//!    the rewrite engine, not a runtime knob; changing the product's
//!    correction behaviour means editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the built prompt directly
//!    without calling a real model, so template regressions are easy to
//!    catch.
//!
//! The wording targets Indonesian orthography: the product digitises
//! handwritten school answers written in Indonesian, and the numbering
//! convention ("Berikan nomor untuk tiap jawaban") is part of the expected
//! output shape.

/// The fixed correction instructions sent after the recognized text.
pub const REWRITE_INSTRUCTIONS: &str = "\
Kamu adalah AI yang bertugas merapikan hasil OCR tulisan tangan.
Tolong perbaiki struktur kalimat, ejaan, dan rapikan tata letak. \
Berikan nomor untuk tiap jawaban yang sesuai dengan ejaan berdasarkan \
sintaksis bahasa Indonesia yang baik dan benar.";

/// Build the full rewrite prompt for one block of recognized text.
///
/// The raw text is embedded verbatim, quoted, before the instructions —
/// the model sees exactly what the recognizer produced, line breaks and
/// all.
pub fn build_rewrite_prompt(raw_text: &str) -> String {
    format!(
        "\nBerikut adalah hasil OCR dari teks tulisan tangan:\n\n\"{raw_text}\"\n{REWRITE_INSTRUCTIONS}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_raw_text_verbatim() {
        let raw = "ini teks\ndengan dua baris  ";
        let prompt = build_rewrite_prompt(raw);
        assert!(prompt.contains(raw), "raw text must appear unmodified");
        assert!(prompt.contains(REWRITE_INSTRUCTIONS));
    }

    #[test]
    fn prompt_quotes_the_raw_text() {
        let prompt = build_rewrite_prompt("halo");
        assert!(prompt.contains("\"halo\""));
    }

    #[test]
    fn empty_raw_text_still_builds() {
        let prompt = build_rewrite_prompt("");
        assert!(prompt.contains("\"\""));
        assert!(prompt.contains(REWRITE_INSTRUCTIONS));
    }
}

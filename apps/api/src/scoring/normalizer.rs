//! Text Normalizer: turns extracted or raw document content into bounded, scorable ASCII text.
//!
//! Three entry points, from most to least trusted input:
//! - `normalize_text` cleans text that was already extracted upstream.
//! - `normalize_bytes` does best-effort extraction from arbitrary bytes (PDF, UTF-8, binary).
//! - `normalize_file` reads a path and delegates to `normalize_bytes`.
//!
//! Extraction never fails: unusable input yields `PLACEHOLDER_TEXT`.

use std::path::Path;
use std::sync::OnceLock;

use regex::bytes::Regex as BytesRegex;
use tracing::{debug, warn};

/// Default cap on normalized text length, in characters.
pub const DEFAULT_MAX_CHARS: usize = 10_000;

/// Neutral stand-in returned when nothing usable could be extracted.
pub const PLACEHOLDER_TEXT: &str = "RAPPORT DE PROJET PFA - ANALYSE AUTOMATIQUE";

/// Minimum length of a printable ASCII run kept when scraping binary content.
const MIN_PRINTABLE_RUN: usize = 4;

static PRINTABLE_RUN_RE: OnceLock<BytesRegex> = OnceLock::new();

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Cleans already-extracted text.
///
/// Accented Latin letters are folded to ASCII, every other run of non-printable or
/// non-ASCII characters becomes a single space (or a single `\n` when the run held a
/// line break), and the result is trimmed and truncated to `max_chars`.
///
/// Empty input stays empty: scorers treat it with their neutral defaults.
pub fn normalize_text(raw: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(raw.len().min(max_chars));
    // None = no pending separator, Some(false) = space, Some(true) = newline
    let mut pending: Option<bool> = None;

    for c in raw.chars() {
        if out.len() >= max_chars {
            break;
        }

        let mut printable = true;
        match fold_char(c) {
            Folded::One(f) if f.is_ascii_graphic() => push_with_separator(&mut out, &mut pending, f),
            Folded::Two(a, b) => {
                push_with_separator(&mut out, &mut pending, a);
                out.push(b);
            }
            _ => printable = false,
        }

        if !printable {
            let newline = c == '\n';
            pending = Some(pending.unwrap_or(false) || newline);
        }
    }

    out.truncate(max_chars);
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out
}

/// Best-effort extraction from arbitrary bytes.
///
/// PDF content goes through `pdf-extract`, valid UTF-8 is used directly, anything else
/// is scraped for printable ASCII runs. Returns `PLACEHOLDER_TEXT` when nothing usable
/// remains.
pub fn normalize_bytes(bytes: &[u8], max_chars: usize) -> String {
    let extracted = if bytes.starts_with(b"%PDF") {
        extract_pdf(bytes).unwrap_or_else(|| scrape_printable_runs(bytes))
    } else {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => scrape_printable_runs(bytes),
        }
    };

    let normalized = normalize_text(&extracted, max_chars);
    if normalized.is_empty() {
        debug!(input_bytes = bytes.len(), "No text recovered, using placeholder");
        return PLACEHOLDER_TEXT.to_string();
    }
    normalized
}

/// Reads a document from disk and normalizes it. Unreadable files yield the placeholder.
pub fn normalize_file(path: &Path, max_chars: usize) -> String {
    match std::fs::read(path) {
        Ok(bytes) => normalize_bytes(&bytes, max_chars),
        Err(e) => {
            warn!("Could not read document {}: {e}", path.display());
            PLACEHOLDER_TEXT.to_string()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Accent folding
// ────────────────────────────────────────────────────────────────────────────

enum Folded {
    One(char),
    Two(char, char),
}

/// Folds French/Latin-1 letters to their ASCII base. Other characters pass through.
fn fold_char(c: char) -> Folded {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ÿ' => 'y',
        'œ' => return Folded::Two('o', 'e'),
        'Œ' => return Folded::Two('O', 'E'),
        'æ' => return Folded::Two('a', 'e'),
        'Æ' => return Folded::Two('A', 'E'),
        '’' | '‘' => '\'',
        other => other,
    };
    Folded::One(base)
}

/// Folds accents in a string without any other cleaning. Used for guide patterns and
/// curated word lists so they line up with normalized text.
pub fn fold_accents(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match fold_char(c) {
            Folded::One(f) => out.push(f),
            Folded::Two(a, b) => {
                out.push(a);
                out.push(b);
            }
        }
    }
    out
}

fn push_with_separator(out: &mut String, pending: &mut Option<bool>, c: char) {
    if let Some(newline) = pending.take() {
        if !out.is_empty() {
            out.push(if newline { '\n' } else { ' ' });
        }
    }
    out.push(c);
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction helpers
// ────────────────────────────────────────────────────────────────────────────

fn extract_pdf(bytes: &[u8]) -> Option<String> {
    // pdf-extract panics on some malformed documents; contain it and fall back to scraping.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
        Ok(Ok(_)) => {
            debug!("PDF contains no extractable text (image-only?)");
            None
        }
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {e:?}");
            None
        }
        Err(_) => {
            warn!("PDF extractor panicked, falling back to printable-run scrape");
            None
        }
    }
}

/// Joins every run of at least `MIN_PRINTABLE_RUN` printable ASCII bytes with spaces.
fn scrape_printable_runs(bytes: &[u8]) -> String {
    let re = PRINTABLE_RUN_RE.get_or_init(|| {
        BytesRegex::new(&format!(r"[\x20-\x7E]{{{MIN_PRINTABLE_RUN},}}")).unwrap()
    });

    re.find_iter(bytes)
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

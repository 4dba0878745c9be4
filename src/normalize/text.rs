//! Description text sanitization
//!
//! Product descriptions on the source site are written with a heavy hand:
//! emoji bullets, decorative symbols, and whitespace shaped by the HTML
//! they came from. The persisted description is plain text, so sanitizing
//! strips emoji code points and collapses whitespace runs. The range
//! table lives here behind [`sanitize_text`] so it can be swapped without
//! touching extraction logic.

/// Inclusive Unicode code-point ranges stripped from description text
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F), // emoticons
    (0x1F300, 0x1F5FF), // symbols & pictographs
    (0x1F680, 0x1F6FF), // transport & map symbols
    (0x1F1E0, 0x1F1FF), // regional indicators (flags)
    (0x2702, 0x27B0),   // dingbats
    (0x24C2, 0x1F251),  // enclosed characters
    (0x1F900, 0x1F9FF), // supplemental symbols & pictographs
];

fn is_stripped(c: char) -> bool {
    let cp = c as u32;
    EMOJI_RANGES.iter().any(|&(lo, hi)| cp >= lo && cp <= hi)
}

/// Sanitizes raw description text into plain, single-spaced text.
///
/// Removes characters in the emoji ranges above and collapses every
/// whitespace run (spaces, newlines, tabs) to a single space. The
/// function is total: any input string produces a valid, possibly
/// empty, output string.
pub fn sanitize_text(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|&c| !is_stripped(c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

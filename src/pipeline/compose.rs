//! Response composition and pre-translation cleanup.

/// Cleaned text shorter than this is assumed to have lost its content;
/// the original text is translated instead.
pub const MIN_TRANSLATABLE_CHARS: usize = 10;

/// Merge accumulated response parts into one message, blank-line
/// separated. Zero parts yields a generic completion acknowledgment.
pub fn compose(parts: &[String]) -> String {
    if parts.is_empty() {
        return "\u{2705} Processing completed!".to_string();
    }
    parts.join("\n\n")
}

/// Strip formatting that does not survive translation well: markdown bold
/// markers, emoji and decorative symbols. Applied to non-English targets
/// only; English output keeps its formatting.
pub fn clean_for_translation(text: &str) -> String {
    let without_bold = text.replace("**", "");

    let mut cleaned = String::with_capacity(without_bold.len());
    for c in without_bold.chars() {
        if !is_stripped_symbol(c) {
            cleaned.push(c);
        }
    }

    collapse_whitespace(&cleaned)
}

fn is_stripped_symbol(c: char) -> bool {
    matches!(c,
        // Emoticons, pictographs, transport, supplemental symbols
        '\u{1F300}'..='\u{1FAFF}'
        // Regional indicators (flags)
        | '\u{1F1E6}'..='\u{1F1FF}'
        // Miscellaneous symbols and dingbats
        | '\u{2600}'..='\u{27BF}'
        // Variation selector and zero-width joiner left over from emoji
        | '\u{FE0F}'
        | '\u{200D}'
    )
}

/// Collapse runs of spaces and keep at most one blank line between
/// paragraphs.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_newlines = 0usize;
    let mut last_was_space = false;

    for c in text.chars() {
        match c {
            '\n' => {
                pending_newlines += 1;
                last_was_space = false;
            }
            ' ' | '\t' => {
                if pending_newlines == 0 {
                    last_was_space = true;
                }
            }
            _ => {
                if pending_newlines > 0 {
                    if !out.is_empty() {
                        out.push_str(if pending_newlines > 1 { "\n\n" } else { "\n" });
                    }
                    pending_newlines = 0;
                } else if last_was_space && !out.is_empty() {
                    out.push(' ');
                }
                last_was_space = false;
                out.push(c);
            }
        }
    }

    out.trim().to_string()
}

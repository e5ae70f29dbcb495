/// One indentation level
pub const INDENT: &str = "    ";

/// Bullet glyph used for list entries
const BULLET: &str = "\u{2022}";

/// Prefix every non-blank line of `text` with `level` indentation units.
///
/// Blank lines are left empty so reports never carry trailing whitespace.
pub fn indent(level: usize, text: &str) -> String {
    let prefix = INDENT.repeat(level);
    let mut output = String::with_capacity(text.len() + prefix.len() * 4);

    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if !content.trim().is_empty() {
            output.push_str(&prefix);
        }
        output.push_str(line);
    }

    output
}

/// Prefix `text` with a bullet
pub fn bullet(text: &str) -> String {
    format!("{} {}", BULLET, text)
}

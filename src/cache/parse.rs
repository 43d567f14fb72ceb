//! Text parsers for recognized screen regions.
//!
//! Recognition output is noisy, so every parser returns `None` instead of an
//! error; callers keep their previous value when a parse fails.

/// Parse a score such as `"1.52"`, `"1.52x"` or `"1,204.10"`
pub fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_suffix('x')
        .or_else(|| trimmed.strip_suffix('X'))
        .unwrap_or(trimmed);
    parse_number(trimmed)
}

/// Parse a `"left/total"` player count
pub fn parse_count(text: &str) -> Option<(u32, u32)> {
    let (left, total) = text.trim().split_once('/')?;
    let left = left.trim().parse().ok()?;
    let total = total.trim().parse().ok()?;
    Some((left, total))
}

/// Parse a money amount with thousands separators, e.g. `"12,345.60"`
pub fn parse_money(text: &str) -> Option<f64> {
    parse_number(text.trim())
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

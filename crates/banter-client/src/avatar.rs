//! Avatar helpers derived from a username.
//!
//! Pure, stateless functions for presentation layers; no session state is
//! involved. Colors are stable: the same username always maps to the same
//! palette entry.

/// Palette for user avatar backgrounds.
pub const AVATAR_COLORS: [&str; 16] = [
    "#667eea", "#764ba2", "#f093fb", "#f5576c", "#4facfe", "#00f2fe", "#43e97b", "#38f9d7",
    "#ffecd2", "#fcb69f", "#a8edea", "#fed6e3", "#ff9a9e", "#fecfef", "#ffeaa7", "#fab1a0",
];

/// Pick a stable palette color for a username.
#[must_use]
pub fn color_for(username: &str) -> &'static str {
    let mut hash: i32 = 0;
    for c in username.chars() {
        hash = (c as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }

    AVATAR_COLORS[hash.unsigned_abs() as usize % AVATAR_COLORS.len()]
}

/// Short initials for an avatar badge.
///
/// Two-word names yield the first letter of each word; anything else
/// yields the first two characters, uppercased either way.
#[must_use]
pub fn initials(username: &str) -> String {
    let words: Vec<&str> = username.split_whitespace().collect();

    match words.as_slice() {
        [first, second, ..] => {
            let mut out = String::new();
            out.extend(first.chars().next());
            out.extend(second.chars().next());
            out.to_uppercase()
        }
        _ => username
            .trim()
            .chars()
            .take(2)
            .collect::<String>()
            .to_uppercase(),
    }
}

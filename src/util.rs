// ABOUTME: Slug generation for post filenames
// ABOUTME: Stable per title; collisions are last-write-wins by design

/// Derives the filesystem-safe slug for a post title. Pure function of the
/// title, so the same title maps to the same file across runs.
pub fn slug_for_title(title: &str) -> String {
    let base = slug::slugify(title.replace('/', "-"));

    // slugify already strips most punctuation; these passes pin the
    // forbidden-character set regardless of what it lets through.
    let cleaned: String = base
        .chars()
        .filter(|c| !matches!(c, '_' | '!' | '[' | ']'))
        .map(|c| match c {
            '.' | '(' | ')' | '/' => '-',
            other => other,
        })
        .collect();

    cleaned.trim_end_matches('-').to_lowercase()
}

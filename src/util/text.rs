//! Pure text helpers shared by the reconciler and article persistence.

/// Derives a URL-safe slug from an article title.
///
/// The mapping is deterministic and intentionally simple: lowercase the
/// title and replace every space with a dash. No other characters are
/// touched, so two titles differing only in case/spacing slug identically.
///
/// # Examples
///
/// ```
/// use newsdesk::util::slugify;
///
/// assert_eq!(slugify("Rust Hits 1.0"), "rust-hits-1.0");
/// assert_eq!(slugify("already-slugged"), "already-slugged");
/// ```
pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// Builds the keyword query string sent to the news-search API.
///
/// Keywords are joined with ` AND `; multi-word keywords are wrapped in
/// double quotes so the search engine treats them as phrases. The caller
/// builds this string once per settings update and reuses it verbatim for
/// every topic queried.
pub fn build_keyword_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| {
            if k.contains(' ') {
                format!("\"{}\"", k)
            } else {
                k.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Common English words excluded from extracted keywords.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "had", "has",
    "have", "he", "her", "his", "i", "if", "in", "into", "is", "it", "its", "more", "new", "not",
    "of", "on", "or", "our", "out", "over", "said", "she", "so", "than", "that", "the", "their",
    "them", "then", "there", "they", "this", "to", "up", "was", "we", "were", "what", "when",
    "which", "who", "will", "with", "would", "you",
];

/// Extracts up to `max_keywords` keywords from free text.
///
/// Terms are lowercased words of three or more characters, stopwords
/// excluded, ranked by frequency with first occurrence breaking ties.
/// This recomputes an article's keyword list from the fetched excerpt;
/// user-supplied keywords never feed into it.
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3)
    {
        let word = word.to_lowercase();
        if STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        if !counts.contains_key(&word) {
            order.push(word.clone());
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    // Stable sort keeps first-occurrence order among equal counts.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(max_keywords);
    order
}

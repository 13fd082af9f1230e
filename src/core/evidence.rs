use crate::models::{BusinessProfile, ProcessedQuery};

/// Maximum number of evidence entries shown per match
const MAX_SERVICES: usize = 5;

/// Context window pulled around a keyword hit in the description
const SNIPPET_PADDING: usize = 15;

/// Derive a short list of services justifying why a profile matched
///
/// Tags whose lowercased value is a query keyword are included verbatim;
/// keywords found inside the description pull a small context snippet.
/// Entries related by case-insensitive substring containment collapse to
/// whichever was discovered first (an approximate dedup, kept as-is), and
/// everything is capitalized for display. At most five entries; an empty
/// result falls back to the profile's industry as a general category.
pub fn extract_relevant_services(
    profile: &BusinessProfile,
    query: &ProcessedQuery,
) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for tag in &profile.service_tags {
        if query.keywords.contains(&tag.to_lowercase()) {
            found.push(tag.clone());
        }
    }

    let description = profile.products_services_description.to_lowercase();
    if !description.is_empty() {
        for keyword in &query.keywords {
            if let Some(position) = description.find(keyword.as_str()) {
                // Skip keywords already covered by a tag entry
                if found.iter().any(|entry| entry.to_lowercase() == *keyword) {
                    continue;
                }
                found.push(snippet_around(&description, position, keyword.len()));
            }
        }
    }

    let mut services: Vec<String> = Vec::new();
    for candidate in &found {
        let candidate = candidate.trim();
        let candidate_lower = candidate.to_lowercase();
        let duplicate = services.iter().any(|existing| {
            let existing_lower = existing.trim().to_lowercase();
            candidate_lower.contains(&existing_lower) || existing_lower.contains(&candidate_lower)
        });
        if !duplicate {
            services.push(capitalize_display(candidate));
            if services.len() == MAX_SERVICES {
                break;
            }
        }
    }

    if services.is_empty() && !profile.industry.is_empty() {
        services.push(format!(
            "{} (General Category)",
            capitalize_display(&profile.industry)
        ));
    }

    services
}

/// Extract a ~30-char window around a description hit, trimmed of
/// punctuation edges and wrapped in ellipsis markers
fn snippet_around(text: &str, position: usize, match_len: usize) -> String {
    let mut start = position.saturating_sub(SNIPPET_PADDING);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (position + match_len + SNIPPET_PADDING).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }

    let phrase = text[start..end].trim_matches(|c: char| !c.is_alphanumeric());
    format!("...{}...", phrase)
}

/// Display capitalization: first character uppercased, the rest lowercased
fn capitalize_display(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

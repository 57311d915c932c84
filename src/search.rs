//! Chapter search.

use crate::models::Chapter;
use crate::normalize::normalize;

/// Chapters whose section, chapter label, or `"section chapter"` contains the
/// term, ignoring case and accents. A blank term returns the whole catalog in
/// order; otherwise the term is matched as typed, surrounding spaces included.
pub fn filter_chapters(catalog: &[Chapter], term: &str) -> Vec<Chapter> {
    if term.trim().is_empty() {
        return catalog.to_vec();
    }

    let needle = normalize(term);

    catalog
        .iter()
        .filter(|c| {
            normalize(&c.section).contains(&needle)
                || normalize(&c.chapter).contains(&needle)
                || normalize(&c.label()).contains(&needle)
        })
        .cloned()
        .collect()
}

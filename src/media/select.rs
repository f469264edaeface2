//! Best-derivative selection.

use std::collections::BTreeMap;

use crate::api::types::Derivative;

/// The derivative chosen for download.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedDerivative<'a> {
    pub key: &'a str,
    pub derivative: &'a Derivative,
    pub url: &'a str,
}

/// Whether a derivative key names a full-resolution rendition.
///
/// Besides descriptive names, the service uses keys `"3"` and `"4"` for
/// full-resolution variants.
pub fn is_original_like(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    key_lower.contains("original") || key_lower.contains("full") || key == "3" || key == "4"
}

/// Pick the derivative to download.
///
/// Only derivatives with a URL are candidates. Originals win over everything
/// else; within a group the largest pixel area wins, and a group with no
/// fully-dimensioned member falls back to its first entry. Iteration follows
/// key order, so ties go to the smallest key. Returns `None` when no
/// derivative has a URL.
pub fn select_best_derivative(
    derivatives: &BTreeMap<String, Derivative>,
) -> Option<SelectedDerivative<'_>> {
    let candidates: Vec<SelectedDerivative<'_>> = derivatives
        .iter()
        .filter_map(|(key, derivative)| {
            derivative.url.as_deref().map(|url| SelectedDerivative {
                key,
                derivative,
                url,
            })
        })
        .collect();

    let originals: Vec<SelectedDerivative<'_>> = candidates
        .iter()
        .copied()
        .filter(|c| is_original_like(c.key))
        .collect();

    let group = if originals.is_empty() {
        &candidates
    } else {
        &originals
    };

    largest_area(group).or_else(|| group.first().copied())
}

/// First candidate with the strictly largest known pixel area.
fn largest_area<'a>(candidates: &[SelectedDerivative<'a>]) -> Option<SelectedDerivative<'a>> {
    let mut best: Option<(u64, SelectedDerivative<'a>)> = None;

    for candidate in candidates {
        let Some(area) = candidate.derivative.pixel_area() else {
            continue;
        };
        match best {
            Some((best_area, _)) if area <= best_area => {}
            _ => best = Some((area, *candidate)),
        }
    }

    best.map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derivative(width: Option<u32>, height: Option<u32>, url: Option<&str>) -> Derivative {
        Derivative {
            checksum: String::new(),
            file_size: None,
            width,
            height,
            url: url.map(str::to_string),
        }
    }

    fn map(entries: Vec<(&str, Derivative)>) -> BTreeMap<String, Derivative> {
        entries
            .into_iter()
            .map(|(k, d)| (k.to_string(), d))
            .collect()
    }

    fn selected_key(derivatives: &BTreeMap<String, Derivative>) -> Option<&str> {
        select_best_derivative(derivatives).map(|s| s.key)
    }

    #[test]
    fn test_is_original_like() {
        assert!(is_original_like("original"));
        assert!(is_original_like("ORIGINAL_HEIC"));
        assert!(is_original_like("fullres"));
        assert!(is_original_like("3"));
        assert!(is_original_like("4"));
        assert!(!is_original_like("thumbnail"));
        assert!(!is_original_like("34"));
        assert!(!is_original_like("1"));
    }

    #[test]
    fn test_original_beats_thumbnail() {
        let d = map(vec![
            ("thumbnail", derivative(Some(1920), Some(1080), Some("u1"))),
            ("original", derivative(Some(3840), Some(2160), Some("u2"))),
        ]);
        let selected = select_best_derivative(&d).unwrap();
        assert_eq!(selected.key, "original");
        assert_eq!(selected.url, "u2");
    }

    #[test]
    fn test_numeric_full_resolution_key() {
        let d = map(vec![
            ("1", derivative(Some(1920), Some(1080), Some("u1"))),
            ("4", derivative(Some(3840), Some(2160), Some("u4"))),
        ]);
        assert_eq!(selected_key(&d), Some("4"));
    }

    #[test]
    fn test_original_preferred_even_when_smaller() {
        let d = map(vec![
            ("3", derivative(Some(640), Some(480), Some("u3"))),
            ("huge", derivative(Some(8000), Some(6000), Some("uh"))),
        ]);
        assert_eq!(selected_key(&d), Some("3"));
    }

    #[test]
    fn test_original_without_dimensions() {
        let d = map(vec![
            ("original", derivative(None, None, Some("uo"))),
            ("thumbnail", derivative(Some(320), Some(240), Some("ut"))),
        ]);
        assert_eq!(selected_key(&d), Some("original"));
    }

    #[test]
    fn test_largest_original_wins() {
        let d = map(vec![
            ("3", derivative(Some(1000), Some(1000), Some("u3"))),
            ("4", derivative(None, Some(5000), Some("u4"))),
            ("original", derivative(Some(2000), Some(2000), Some("uo"))),
        ]);
        assert_eq!(selected_key(&d), Some("original"));
    }

    #[test]
    fn test_largest_non_original_when_no_original() {
        let d = map(vec![
            ("1", derivative(Some(320), Some(240), Some("u1"))),
            ("2", derivative(Some(1920), Some(1080), Some("u2"))),
            ("5", derivative(None, None, Some("u5"))),
        ]);
        assert_eq!(selected_key(&d), Some("2"));
    }

    #[test]
    fn test_ties_resolve_to_smallest_key() {
        let d = map(vec![
            ("b", derivative(Some(100), Some(100), Some("ub"))),
            ("a", derivative(Some(100), Some(100), Some("ua"))),
        ]);
        assert_eq!(selected_key(&d), Some("a"));
    }

    #[test]
    fn test_first_with_url_when_no_dimensions() {
        let d = map(vec![
            ("a", derivative(None, None, None)),
            ("b", derivative(Some(10), None, Some("ub"))),
            ("c", derivative(None, None, Some("uc"))),
        ]);
        assert_eq!(selected_key(&d), Some("b"));
    }

    #[test]
    fn test_derivatives_without_url_are_ignored() {
        let d = map(vec![
            ("original", derivative(Some(4000), Some(3000), None)),
            ("thumbnail", derivative(Some(320), Some(240), Some("ut"))),
        ]);
        assert_eq!(selected_key(&d), Some("thumbnail"));
    }

    #[test]
    fn test_nothing_selectable() {
        assert_eq!(selected_key(&BTreeMap::new()), None);
        let d = map(vec![("original", derivative(Some(1), Some(1), None))]);
        assert_eq!(selected_key(&d), None);
    }
}

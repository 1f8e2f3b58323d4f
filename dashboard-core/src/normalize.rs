//! Cosmetic cleanup of user-typed city names before geocoding.
//!
//! Nothing here decides identity. Dedup always uses the key the geocoder
//! resolved, never the normalized text.

/// Trim and title-case free text, e.g. `"  new   york "` → `"New York"`.
///
/// An optional country hint after a comma is kept and upper-cased
/// (`"paris, fr"` → `"Paris,FR"`). Returns an empty string when no city name
/// is left.
pub fn normalize_city_input(raw: &str) -> String {
    let (name, hint) = match raw.split_once(',') {
        Some((name, hint)) => (name, Some(hint.trim())),
        None => (raw, None),
    };

    let name = name.split_whitespace().map(title_case_word).collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return name;
    }

    match hint.filter(|h| !h.is_empty()) {
        Some(hint) => format!("{name},{}", hint.to_uppercase()),
        None => name,
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_cases_each_word() {
        assert_eq!(normalize_city_input("london"), "London");
        assert_eq!(normalize_city_input("  new   york "), "New York");
        assert_eq!(normalize_city_input("RIO DE JANEIRO"), "Rio De Janeiro");
    }

    #[test]
    fn handles_non_ascii() {
        assert_eq!(normalize_city_input("são paulo"), "São Paulo");
        assert_eq!(normalize_city_input("ÅLESUND"), "Ålesund");
    }

    #[test]
    fn keeps_country_hint() {
        assert_eq!(normalize_city_input("paris, fr"), "Paris,FR");
        assert_eq!(normalize_city_input("paris,"), "Paris");
    }

    #[test]
    fn blank_input_normalizes_to_empty() {
        assert_eq!(normalize_city_input(""), "");
        assert_eq!(normalize_city_input("   "), "");
        assert_eq!(normalize_city_input(" , FR"), "");
    }
}

//! Static city alias to airport code table.

use serde::{Deserialize, Serialize};

/// Aliases in definition order. With [`CityMatch::DefinitionOrder`] this order,
/// not the order of mention, decides which city becomes the origin.
pub const CITY_ALIASES: &[(&str, &str)] = &[
    ("bangalore", "BLR"),
    ("bengaluru", "BLR"),
    ("blr", "BLR"),
    ("jeddah", "JED"),
    ("jed", "JED"),
    ("jada", "JED"),
    ("jedda", "JED"),
    ("riyadh", "RUH"),
    ("ruh", "RUH"),
    ("dubai", "DXB"),
    ("dxb", "DXB"),
    ("delhi", "DEL"),
    ("del", "DEL"),
    ("mumbai", "BOM"),
    ("bom", "BOM"),
    ("chennai", "MAA"),
    ("maa", "MAA"),
    ("hyderabad", "HYD"),
    ("hyd", "HYD"),
    ("kolkata", "CCU"),
    ("ccu", "CCU"),
    ("mecca", "JED"),
    ("medina", "MED"),
    ("dammam", "DMM"),
    ("dmm", "DMM"),
    ("abha", "AHB"),
    ("ahb", "AHB"),
    ("goa", "GOI"),
    ("goi", "GOI"),
    ("kochi", "COK"),
    ("cochin", "COK"),
    ("cok", "COK"),
];

/// How multiple city mentions in one utterance are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityMatch {
    /// Substring containment, ordered by position in [`CITY_ALIASES`].
    #[default]
    DefinitionOrder,
    /// Whole-word matches, ordered by where they occur in the utterance.
    Leftmost,
}

/// Finds the distinct airport codes mentioned in `text`.
pub fn find_codes(text: &str, strategy: CityMatch) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    match strategy {
        CityMatch::DefinitionOrder => {
            let mut codes = Vec::new();
            for (alias, code) in CITY_ALIASES {
                if lower.contains(alias) && !codes.contains(code) {
                    codes.push(*code);
                }
            }
            codes
        }
        CityMatch::Leftmost => {
            let mut hits: Vec<(usize, &'static str)> = CITY_ALIASES
                .iter()
                .flat_map(|(alias, code)| {
                    word_positions(&lower, alias).map(move |pos| (pos, *code))
                })
                .collect();
            hits.sort_by_key(|(pos, _)| *pos);

            let mut codes = Vec::new();
            for (_, code) in hits {
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
            codes
        }
    }
}

fn word_positions<'a>(haystack: &'a str, word: &'a str) -> impl Iterator<Item = usize> + 'a {
    haystack.match_indices(word).filter_map(move |(pos, _)| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + word.len()..].chars().next();
        let is_boundary = |c: Option<char>| c.map_or(true, |c| !c.is_alphanumeric());
        (is_boundary(before) && is_boundary(after)).then_some(pos)
    })
}

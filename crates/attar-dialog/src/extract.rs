//! Parameter extraction from free-text utterances.
//!
//! Every function here is pure: it reads the utterance (and, for
//! [`extract`], the current context) and returns what it recognised. Merging
//! into the context is the engine's job.

use crate::config::DialogConfig;
use crate::context::ConversationContext;
use crate::lexicon;
use attar_types::{CabinClass, FlightResult, MealPreference, SeatPreference, TripType};
use regex::Regex;
use std::sync::LazyLock;

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s*(?:of\s+)?({MONTHS})\b"
    ))
    .unwrap()
});

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({MONTHS})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b")).unwrap()
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)(st|nd|rd|th)?").unwrap());

static COUNTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+|one|two|three|four|five|six|seven|eight|nine|ten)\s*(?:passengers?|people|persons?|adults?|travell?ers?|tickets?|seats?|of us)\b")
        .unwrap()
});

// "one" is left out: "the second one" and "one way" are not counts.
static NUMBER_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(two|three|four|five|six|seven|eight|nine|ten)\b").unwrap()
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static NAME_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:my name is|my name's|name is|i am|i'm|this is|it's|it is)\s+").unwrap()
});

static ORDINAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(first|1st|second|2nd|third|3rd|fourth|4th|fifth|5th|last)\b").unwrap()
});

static AFFIRMATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(yes|confirm\w*|proceed|book\w*)\b").unwrap());

/// Keywords that mark an utterance as a flight request.
const FLIGHT_INTENT_KEYWORDS: &[&str] = &[
    "flight", "fly", "travel", "show", "search", "find", "need", "book", "trip", "package",
    "ticket", "again",
];

const PLANNING_KEYWORDS: &[&str] = &["plan", "itinerary"];

/// Minimum digit count for a phone number.
const MIN_PHONE_DIGITS: usize = 7;

/// Maximum digit count for a phone number (E.164).
const MAX_PHONE_DIGITS: usize = 15;

/// Everything recognised in one utterance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Distinct airport codes, ordered by the configured [`lexicon::CityMatch`].
    pub cities: Vec<&'static str>,
    /// Origin to write into the context, if this utterance sets one.
    pub origin: Option<String>,
    /// Destination to write into the context, if this utterance sets one.
    pub destination: Option<String>,
    pub departure_date: Option<String>,
    pub cabin_class: Option<CabinClass>,
}

/// Extracts route, date and cabin from `text` against the current context.
///
/// Two or more cities re-state the whole route. A single city fills origin
/// when none is known, otherwise destination when none is known; it never
/// overwrites a field that is already set.
pub fn extract(text: &str, context: &ConversationContext, config: &DialogConfig) -> Extraction {
    let cities = lexicon::find_codes(text, config.city_match);

    let (origin, destination) = match cities.as_slice() {
        [] => (None, None),
        [only] => {
            if context.origin.is_none() {
                (Some(only.to_string()), None)
            } else if context.destination.is_none() && context.origin.as_deref() != Some(*only) {
                (None, Some(only.to_string()))
            } else {
                (None, None)
            }
        }
        [first, second, ..] => (Some(first.to_string()), Some(second.to_string())),
    };

    Extraction {
        cities,
        origin,
        destination,
        departure_date: extract_date(text, config.assumed_year),
        cabin_class: extract_cabin_class(text),
    }
}

/// Maps a month name or abbreviation to its two-digit number.
pub fn month_number(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    let prefix = lower.get(..3)?;
    let number = match prefix {
        "jan" => "01",
        "feb" => "02",
        "mar" => "03",
        "apr" => "04",
        "may" => "05",
        "jun" => "06",
        "jul" => "07",
        "aug" => "08",
        "sep" => "09",
        "oct" => "10",
        "nov" => "11",
        "dec" => "12",
        _ => return None,
    };
    Some(number)
}

/// Extracts a `<day> <month>` (or `<month> <day>`) date as `YYYY-MM-DD`.
///
/// The day is zero-padded but not range-checked: "35 December" yields
/// `YYYY-12-35`.
pub fn extract_date(text: &str, year: i32) -> Option<String> {
    let (day, month) = if let Some(caps) = DAY_MONTH_RE.captures(text) {
        (caps.get(1)?.as_str(), caps.get(2)?.as_str())
    } else {
        let caps = MONTH_DAY_RE.captures(text)?;
        (caps.get(2)?.as_str(), caps.get(1)?.as_str())
    };
    let month = month_number(month)?;
    Some(format!("{year}-{month}-{day:0>2}"))
}

/// Extracts a positive passenger count.
///
/// A number next to a counting word ("3 adults", "two of us") wins.
/// Otherwise the first plain integer is used, skipping ordinals like "2nd",
/// unless `skip_bare_numbers` is set because the digits belong to a flight
/// number. Spelled-out numbers are the last resort.
pub fn extract_passengers(text: &str, skip_bare_numbers: bool) -> Option<u32> {
    let positive = |n: u32| (n > 0).then_some(n);

    if let Some(caps) = COUNTED_RE.captures(text) {
        return count_value(caps.get(1)?.as_str()).and_then(positive);
    }

    let lower = text.to_lowercase();
    if lower.contains("just me") || lower.contains("only me") || lower.contains("myself") {
        return Some(1);
    }

    if !skip_bare_numbers {
        let bare = NUMBER_RE
            .captures_iter(text)
            .find(|caps| caps.get(2).is_none())
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());
        if let Some(n) = bare {
            return positive(n);
        }
    }

    let word = NUMBER_WORD_RE.captures(&lower)?.get(1)?.as_str().to_string();
    count_value(&word)
}

fn count_value(token: &str) -> Option<u32> {
    let n = match token.to_lowercase().as_str() {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        digits => digits.parse().ok()?,
    };
    Some(n)
}

/// Extracts a trip length in days: "5 days", "ten", "a week".
pub fn extract_days(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    if lower.contains("fortnight") || lower.contains("two weeks") {
        return Some(14);
    }
    if lower.contains("a week") || lower.contains("one week") {
        return Some(7);
    }
    if lower.contains("weekend") {
        return Some(2);
    }
    let n = NUMBER_RE
        .captures_iter(text)
        .find(|caps| caps.get(2).is_none())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .or_else(|| {
            let caps = NUMBER_WORD_RE.captures(&lower)?;
            count_value(caps.get(1)?.as_str())
        })?;
    (n > 0).then_some(n)
}

pub fn extract_seat(text: &str) -> Option<SeatPreference> {
    let lower = text.to_lowercase();
    if lower.contains("window") {
        Some(SeatPreference::Window)
    } else if lower.contains("aisle") {
        Some(SeatPreference::Aisle)
    } else {
        None
    }
}

/// Extracts a meal preference. Non-vegetarian forms are tested first because
/// they contain "veg", and vegan before vegetarian for the same reason.
pub fn extract_meal(text: &str) -> Option<MealPreference> {
    let lower = text.to_lowercase();
    const NON_VEG: &[&str] = &["non-veg", "non veg", "nonveg", "meat"];
    if NON_VEG.iter().any(|k| lower.contains(k)) {
        Some(MealPreference::NonVegetarian)
    } else if lower.contains("vegan") {
        Some(MealPreference::Vegan)
    } else if lower.contains("veg") {
        Some(MealPreference::Vegetarian)
    } else {
        None
    }
}

pub fn extract_trip_type(text: &str) -> Option<TripType> {
    let lower = text.to_lowercase();
    if lower.contains("one way") || lower.contains("one-way") || lower.contains("oneway") {
        Some(TripType::OneWay)
    } else if lower.contains("round") || lower.contains("return") {
        Some(TripType::RoundTrip)
    } else {
        None
    }
}

pub fn extract_cabin_class(text: &str) -> Option<CabinClass> {
    let lower = text.to_lowercase();
    if lower.contains("premium economy") {
        Some(CabinClass::PremiumEconomy)
    } else if lower.contains("business") {
        Some(CabinClass::Business)
    } else if lower.contains("first class") {
        Some(CabinClass::First)
    } else if lower.contains("economy") {
        Some(CabinClass::Economy)
    } else {
        None
    }
}

/// Extracts an email address, accepting the spoken form
/// "sara dot khan at example dot com".
pub fn extract_email(text: &str) -> Option<String> {
    if let Some(m) = EMAIL_RE.find(text) {
        return Some(m.as_str().to_lowercase());
    }

    let spoken = format!(" {} ", text.to_lowercase())
        .replace(" at the rate ", "@")
        .replace(" at ", "@")
        .replace(" dot ", ".")
        .replace(" underscore ", "_")
        .replace(" dash ", "-");
    let compact: String = spoken.split_whitespace().collect::<Vec<_>>().join(" ");
    EMAIL_RE.find(&compact).map(|m| m.as_str().to_string())
}

/// Extracts a phone number of 7 to 15 digits, keeping a leading `+`.
pub fn extract_phone(text: &str) -> Option<String> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return None;
    }

    let plus = text
        .find(|c: char| c.is_ascii_digit())
        .is_some_and(|first_digit| text[..first_digit].trim_end().ends_with('+'));
    Some(if plus { format!("+{digits}") } else { digits })
}

/// Extracts a passenger name, dropping introductions like "my name is".
pub fn extract_name(text: &str) -> Option<String> {
    let stripped = NAME_PREFIX_RE.replace(text, "");
    let name = stripped
        .trim()
        .trim_end_matches(['.', '!', ','])
        .trim()
        .to_string();

    let valid = name.chars().any(char::is_alphabetic)
        && !name.chars().any(|c| c.is_ascii_digit() || c == '@');
    valid.then_some(name)
}

/// Resolves a reference to one of the listed flights, by flight number or by
/// ordinal ("the second one", "the last flight").
pub fn flight_reference(text: &str, flights: &[FlightResult]) -> Option<usize> {
    if flights.is_empty() {
        return None;
    }

    if let Some(idx) = flight_number_reference(text, flights) {
        return Some(idx);
    }

    // "first class" names a cabin, not the first flight.
    let lower = text.to_lowercase().replace("first class", "");
    let ordinal = ORDINAL_RE.captures(&lower)?.get(1)?.as_str().to_string();
    let idx = match ordinal.as_str() {
        "first" | "1st" => 0,
        "second" | "2nd" => 1,
        "third" | "3rd" => 2,
        "fourth" | "4th" => 3,
        "fifth" | "5th" => 4,
        "last" => flights.len() - 1,
        _ => return None,
    };
    (idx < flights.len()).then_some(idx)
}

/// Returns the index of a flight whose number appears in `text`.
pub fn flight_number_reference(text: &str, flights: &[FlightResult]) -> Option<usize> {
    let squash = |s: &str| {
        s.chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect::<String>()
    };
    let haystack = squash(text);
    flights.iter().position(|flight| {
        let number = squash(&flight.flight_number);
        !number.is_empty() && haystack.contains(&number)
    })
}

/// Returns `true` for a positive confirmation: yes, confirm, proceed or book.
pub fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVE_RE.is_match(text)
}

pub fn has_flight_intent(text: &str) -> bool {
    let lower = text.to_lowercase();
    FLIGHT_INTENT_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn has_planning_intent(text: &str) -> bool {
    let lower = text.to_lowercase();
    PLANNING_KEYWORDS.iter().any(|k| lower.contains(k))
}

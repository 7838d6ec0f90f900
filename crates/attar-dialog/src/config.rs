use crate::lexicon::CityMatch;
use attar_types::CabinClass;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

fn default_assumed_year() -> i32 {
    chrono::Local::now().year()
}

/// Tunables for extraction and the step engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogConfig {
    /// Year attached to spoken dates, which never carry one.
    #[serde(default = "default_assumed_year")]
    pub assumed_year: i32,

    /// Ordering used when an utterance names several cities.
    #[serde(default)]
    pub city_match: CityMatch,

    /// Cabin searched when the traveller has not named one.
    #[serde(default)]
    pub cabin_class: CabinClass,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            assumed_year: default_assumed_year(),
            city_match: CityMatch::default(),
            cabin_class: CabinClass::default(),
        }
    }
}

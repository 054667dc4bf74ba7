//! Provider icon-code to CSS icon-class mapping.
//!
//! Built once at startup from the static code/description table below
//! (mirrors the provider's `current_conditions_icon_code_descriptions` CSV)
//! and immutable thereafter. Several class-name candidates can map to one
//! numeric code (day / night / day-and-night variants); per code the
//! shortest still-unclaimed name becomes the canonical class, and a claimed
//! name is excluded from every later code's candidates.

use std::collections::{HashMap, HashSet};

/// Sentinel class for a missing or unmapped icon code.
pub const ICON_NA: &str = "we-na";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Day,
    Night,
    DayAndNight,
}

impl Variant {
    fn suffix(&self) -> &'static str {
        match self {
            Variant::Day => "d",
            Variant::Night => "n",
            Variant::DayAndNight => "dn",
        }
    }
}

use Variant::{Day, DayAndNight, Night};

/// (code, condition description, applicable time of day), in CSV order.
const ICON_DESCRIPTIONS: &[(u32, &str, Variant)] = &[
    (0, "Sunny", Day),
    (1, "Mainly sunny", Day),
    (2, "Partly cloudy", Day),
    (3, "Mostly cloudy", Day),
    (4, "Increasing cloud", Day),
    (5, "Decreasing cloud", Day),
    (6, "Chance of showers", Day),
    (7, "Rain showers or flurries", Day),
    (8, "Snow showers or flurries", Day),
    (9, "Thunderstorm with rain", Day),
    (10, "Cloudy", DayAndNight),
    (11, "Precipitation", DayAndNight),
    (12, "Rain", DayAndNight),
    (13, "Heavy rain", DayAndNight),
    (14, "Freezing rain", DayAndNight),
    (15, "Snow or rain", DayAndNight),
    (16, "Light snow", DayAndNight),
    (17, "Snow", DayAndNight),
    (18, "Heavy snow", DayAndNight),
    (19, "Thunderstorm", DayAndNight),
    (23, "Haze", DayAndNight),
    (24, "Fog", DayAndNight),
    (25, "Drifting snow", DayAndNight),
    (26, "Ice crystals", DayAndNight),
    (27, "Ice pellets", DayAndNight),
    (28, "Drizzle", DayAndNight),
    (30, "Clear", Night),
    (31, "Mainly clear", Night),
    (32, "Partly cloudy", Night),
    (33, "Mostly cloudy", Night),
    (34, "Increasing cloud", Night),
    (35, "Decreasing cloud", Night),
    (36, "Chance of showers", Night),
    (37, "Rain showers or flurries", Night),
    (38, "Snow showers or flurries", Night),
    (39, "Thunderstorm", Night),
    (40, "Blowing snow", DayAndNight),
    (41, "Funnel cloud", DayAndNight),
    (42, "Tornado", DayAndNight),
    (43, "Windy", DayAndNight),
    (44, "Smoke", DayAndNight),
    (45, "Sandstorm", DayAndNight),
    (46, "Thunderstorm with hail", DayAndNight),
    (47, "Thunderstorm with dust storm", DayAndNight),
    (48, "Waterspout", DayAndNight),
];

/// Static icon-code lookup table. Construct once, share by reference.
#[derive(Debug, Clone)]
pub struct IconTable {
    classes: HashMap<u32, String>,
}

impl IconTable {
    pub fn new() -> Self {
        Self::from_entries(ICON_DESCRIPTIONS)
    }

    fn from_entries(entries: &[(u32, &str, Variant)]) -> Self {
        let mut code_order: Vec<u32> = Vec::new();
        let mut candidates: HashMap<u32, Vec<String>> = HashMap::new();

        for (code, description, variant) in entries {
            let name = format!(
                "we-{}-{}",
                description.to_lowercase().replace(' ', "-"),
                variant.suffix()
            );
            let entry = candidates.entry(*code).or_insert_with(|| {
                code_order.push(*code);
                Vec::new()
            });
            if !entry.contains(&name) {
                entry.push(name);
            }
        }

        let mut claimed: HashSet<String> = HashSet::new();
        let mut classes = HashMap::new();

        for code in code_order {
            let mut names: Vec<String> = candidates[&code]
                .iter()
                .filter(|n| !claimed.contains(*n))
                .cloned()
                .collect();
            // Stable sort: equal-length candidates keep table order.
            names.sort_by_key(String::len);

            if let Some(winner) = names.into_iter().next() {
                claimed.insert(winner.clone());
                classes.insert(code, winner);
            }
            // A code whose every candidate is already claimed falls back
            // to the sentinel at lookup time.
        }

        Self { classes }
    }

    /// Canonical icon class for a provider icon code.
    /// Missing or unmapped code → `"we-na"`.
    pub fn lookup(&self, code: Option<i64>) -> &str {
        code.and_then(|c| u32::try_from(c).ok())
            .and_then(|c| self.classes.get(&c))
            .map(String::as_str)
            .unwrap_or(ICON_NA)
    }
}

impl Default for IconTable {
    fn default() -> Self {
        Self::new()
    }
}

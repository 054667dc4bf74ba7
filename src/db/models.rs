use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Bulletin language. Environment Canada publishes every citypage
/// bulletin in both English and French under distinct URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// The single-letter suffix used in citypage bulletin file names
    /// (`s0000430_e.xml` / `s0000430_f.xml`).
    pub fn bulletin_letter(&self) -> &'static str {
        match self {
            Language::En => "e",
            Language::Fr => "f",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canadian province / territory codes used by the provider's site list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Province {
    Ab,
    Bc,
    Mb,
    Nb,
    Nl,
    Ns,
    Nt,
    Nu,
    On,
    Pe,
    Qc,
    Sk,
    Yt,
}

impl Province {
    pub fn code(&self) -> &'static str {
        match self {
            Province::Ab => "AB",
            Province::Bc => "BC",
            Province::Mb => "MB",
            Province::Nb => "NB",
            Province::Nl => "NL",
            Province::Ns => "NS",
            Province::Nt => "NT",
            Province::Nu => "NU",
            Province::On => "ON",
            Province::Pe => "PE",
            Province::Qc => "QC",
            Province::Sk => "SK",
            Province::Yt => "YT",
        }
    }

    /// Full province/territory name for a given display language.
    pub fn full_name(&self, language: Language) -> &'static str {
        match (self, language) {
            (Province::Ab, _) => "Alberta",
            (Province::Bc, Language::En) => "British Columbia",
            (Province::Bc, Language::Fr) => "Colombie-Britannique",
            (Province::Mb, _) => "Manitoba",
            (Province::Nb, Language::En) => "New Brunswick",
            (Province::Nb, Language::Fr) => "Nouveau-Brunswick",
            (Province::Nl, Language::En) => "Newfoundland and Labrador",
            (Province::Nl, Language::Fr) => "Terre-Neuve-et-Labrador",
            (Province::Ns, Language::En) => "Nova Scotia",
            (Province::Ns, Language::Fr) => "Nouvelle-Écosse",
            (Province::Nt, Language::En) => "Northwest Territories",
            (Province::Nt, Language::Fr) => "Territoires du Nord-Ouest",
            (Province::Nu, _) => "Nunavut",
            (Province::On, _) => "Ontario",
            (Province::Pe, Language::En) => "Prince Edward Island",
            (Province::Pe, Language::Fr) => "Île-du-Prince-Édouard",
            (Province::Qc, _) => "Québec",
            (Province::Sk, _) => "Saskatchewan",
            (Province::Yt, _) => "Yukon",
        }
    }
}

impl std::str::FromStr for Province {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AB" => Ok(Province::Ab),
            "BC" => Ok(Province::Bc),
            "MB" => Ok(Province::Mb),
            "NB" => Ok(Province::Nb),
            "NL" => Ok(Province::Nl),
            "NS" => Ok(Province::Ns),
            "NT" => Ok(Province::Nt),
            "NU" => Ok(Province::Nu),
            "ON" => Ok(Province::On),
            "PE" => Ok(Province::Pe),
            "QC" => Ok(Province::Qc),
            "SK" => Ok(Province::Sk),
            "YT" => Ok(Province::Yt),
            other => Err(format!("unknown province code '{}'", other)),
        }
    }
}

impl TryFrom<String> for Province {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for Province {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A fixed weather-observation point. Stations are created by the offline
/// seeding process and immutable while serving.
#[derive(Debug, Clone, FromRow)]
pub struct Station {
    pub id: i64,
    pub name_en: String,
    pub name_fr: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    pub fn name(&self, language: Language) -> &str {
        match language {
            Language::En => &self.name_en,
            Language::Fr => &self.name_fr,
        }
    }
}

/// A place a caller can request weather for. Every city references exactly
/// one station; non-authoritative cities (merged in from the gazetteer)
/// inherited their station from the nearest authoritative city at seed time
/// and are never re-resolved at request time.
#[derive(Debug, Clone, FromRow)]
pub struct City {
    pub id: i64,
    /// Provider station-page code (e.g. "s0000430"), max 8 chars.
    pub code: String,
    #[sqlx(try_from = "String")]
    pub province: Province,
    pub name_en: String,
    pub name_fr: String,
    pub name_en_unaccented: String,
    pub name_fr_unaccented: String,
    pub station_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub time_zone: String,
    pub authoritative: bool,
}

impl City {
    pub fn name(&self, language: Language) -> &str {
        match language {
            Language::En => &self.name_en,
            Language::Fr => &self.name_fr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_province_roundtrip() {
        for code in [
            "AB", "BC", "MB", "NB", "NL", "NS", "NT", "NU", "ON", "PE", "QC", "SK", "YT",
        ] {
            let p: Province = code.parse().unwrap();
            assert_eq!(p.code(), code);
        }
    }

    #[test]
    fn test_province_parse_is_case_insensitive() {
        assert_eq!("qc".parse::<Province>().unwrap(), Province::Qc);
        assert_eq!(" on ".parse::<Province>().unwrap(), Province::On);
    }

    #[test]
    fn test_province_unknown_code_rejected() {
        assert!("HEF".parse::<Province>().is_err());
    }

    #[test]
    fn test_province_full_names() {
        assert_eq!(Province::Pe.full_name(Language::En), "Prince Edward Island");
        assert_eq!(Province::Pe.full_name(Language::Fr), "Île-du-Prince-Édouard");
        assert_eq!(Province::On.full_name(Language::Fr), "Ontario");
    }

    #[test]
    fn test_language_bulletin_letter() {
        assert_eq!(Language::En.bulletin_letter(), "e");
        assert_eq!(Language::Fr.bulletin_letter(), "f");
    }
}

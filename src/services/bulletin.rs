//! Citypage XML bulletin parser.
//!
//! Turns one raw provider bulletin (`<siteData>` document) into the
//! canonical `Forecast` model. Every leaf field is optional in the source:
//! a missing node degrades to `Reading::Absent` or `None`, and numeric text
//! that fails to parse is kept verbatim as `Reading::Text` — the parse never
//! fails over a field. The only fatal error is markup that is not a
//! well-formed bulletin.

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;

use crate::icons::IconTable;

/// Fixed-width timestamp inside `<timeStamp>` nodes.
const OBSERVATION_TS_FORMAT: &str = "%Y%m%d%H%M%S";
/// Fixed-width timestamp in the `dateTimeUTC` attribute of hourly nodes.
const HOURLY_TS_FORMAT: &str = "%Y%m%d%H%M";

/// Weekday names (English + French). A period label containing any of these
/// is a long-term forecast; the feed carries no explicit short/long flag.
const WEEKDAY_TOKENS: [&str; 14] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "lundi",
    "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

#[derive(Debug, Error)]
pub enum BulletinError {
    #[error("malformed bulletin: {0}")]
    Malformed(#[from] quick_xml::Error),
    #[error("malformed bulletin: no siteData root element")]
    MissingRoot,
    #[error("malformed bulletin: unexpected end of input")]
    Truncated,
}

/// A leaf value under the lenient numeric coercion contract: integer if the
/// source text parses as one, else float, else the source text verbatim.
/// Serializes untagged, so JSON output is a number, a string, or null.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Reading {
    Int(i64),
    Float(f64),
    Text(String),
    #[default]
    Absent,
}

impl Reading {
    /// Lenient coercion. Whitespace-only text counts as absent (the feed
    /// emits self-closing and empty elements interchangeably).
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Reading::Absent;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Reading::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Reading::Float(f);
        }
        Reading::Text(trimmed.to_string())
    }

    /// Rounded-integer form of the same source value. Non-numeric readings
    /// pass through unchanged so the two forms never disagree on origin.
    pub fn rounded(&self) -> Self {
        match self {
            Reading::Float(f) => Reading::Int(f.round() as i64),
            other => other.clone(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Reading::Absent)
    }
}

/// Warning severity. Out-of-set values pass through unchanged (and are
/// logged at parse time), never rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningPriority {
    Low,
    High,
    Urgent,
    Other(String),
}

impl WarningPriority {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "low" => WarningPriority::Low,
            "high" => WarningPriority::High,
            "urgent" => WarningPriority::Urgent,
            _ => {
                tracing::warn!("unrecognized warning priority '{}', passing through", raw);
                WarningPriority::Other(raw.to_string())
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WarningPriority::Low => "low",
            WarningPriority::High => "high",
            WarningPriority::Urgent => "urgent",
            WarningPriority::Other(raw) => raw,
        }
    }
}

impl Serialize for WarningPriority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// An active weather warning. Only `event` nodes whose type normalizes to
/// `"warning"` are retained; advisories and statements are dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub priority: WarningPriority,
    pub description: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub icon_code: Option<i64>,
    pub icon_class: String,
    pub description: Option<String>,
    /// Unrounded temperature, from the same source text as the rounded form.
    pub temperature: Reading,
    pub temperature_rounded: Reading,
    pub dew_point: Reading,
    pub humidex: Reading,
    pub pressure_kpa: Reading,
    pub visibility_km: Reading,
    pub relative_humidity: Reading,
    pub wind_speed: Reading,
    pub wind_gust: Reading,
    pub wind_direction: Option<String>,
    pub wind_bearing_degree: Reading,
    pub regional_normal_low: Reading,
    pub regional_normal_high: Reading,
}

/// One named forecast period ("Tonight", "Monday night", ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodForecast {
    pub period: String,
    pub text_summary: Option<String>,
    pub icon_code: Option<i64>,
    pub icon_class: String,
    pub pop_percent: Reading,
    pub temperature: Reading,
    /// "high" or "low", from the temperature node's class attribute.
    pub temperature_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecast {
    pub time_utc: Option<DateTime<Utc>>,
    /// Local hour of day ("00".."23"), derived from the bulletin's UTC
    /// offset. Display data only; `time_utc` stays canonical.
    pub local_hour: Option<String>,
    pub condition: Option<String>,
    pub icon_code: Option<i64>,
    pub icon_class: String,
    pub temperature: Reading,
    pub temperature_rounded: Reading,
    pub humidex: Reading,
    pub precip_chance: Reading,
    pub wind_speed: Reading,
    pub wind_gust: Reading,
    pub wind_direction: Option<String>,
}

/// Canonical normalized weather snapshot for one (city, language) pair.
/// Constructed fresh per parse call, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub observation_time_utc: Option<DateTime<Utc>>,
    pub region: Option<String>,
    pub station_name: Option<String>,
    pub current: CurrentConditions,
    pub warnings: Vec<Warning>,
    pub short_term: Vec<PeriodForecast>,
    pub long_term: Vec<PeriodForecast>,
    pub hourly: Vec<HourlyForecast>,
}

/// Which leaf element's text we are currently capturing.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Region,
    StationName,
    ObservationTimeStamp,
    Condition,
    CurrentIcon,
    CurrentTemperature,
    DewPoint,
    Humidex,
    Pressure,
    Visibility,
    RelativeHumidity,
    WindSpeed,
    WindGust,
    WindDirection,
    WindBearing,
    RegionalNormal,
    Period,
    PeriodSummary,
    PeriodIcon,
    PeriodPop,
    PeriodTemperature,
    HourlyCondition,
    HourlyIcon,
    HourlyTemperature,
    HourlyHumidex,
    HourlyPrecipChance,
    HourlyWindSpeed,
    HourlyWindGust,
    HourlyWindDirection,
}

fn parse_fixed_utc(text: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), format)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_long_term(period_label: &str) -> bool {
    let label = period_label.to_lowercase();
    WEEKDAY_TOKENS.iter().any(|token| label.contains(token))
}

/// Zero-padded local hour for an hourly UTC timestamp, given the bulletin's
/// UTC offset in hours (fractional offsets occur, e.g. Newfoundland).
fn local_hour(time_utc: DateTime<Utc>, utc_offset_hours: f64) -> String {
    let local = time_utc + Duration::minutes((utc_offset_hours * 60.0).round() as i64);
    format!("{:02}", local.hour())
}

fn icon_code_from_text(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

fn attr_value(e: &quick_xml::events::BytesStart<'_>, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return std::str::from_utf8(&attr.value).ok().map(str::to_string);
        }
    }
    None
}

/// Parse one raw XML bulletin into the canonical forecast model.
///
/// Fails only on markup that is not a well-formed `siteData` document;
/// absent or unparseable leaf values degrade per the leniency contract.
pub fn parse(xml: &str, icons: &IconTable) -> Result<Forecast, BulletinError> {
    let mut reader = Reader::from_str(xml);

    let mut forecast = Forecast::default();
    let mut saw_root = false;

    // Bulletin-level context
    let mut warnings_url: Option<String> = None;
    let mut utc_offset_hours: Option<f64> = None;

    // Nesting context
    let mut in_location = false;
    let mut in_warnings = false;
    let mut in_current = false;
    let mut reading_obs_utc = false;
    let mut in_forecast_group = false;
    let mut in_regional_normals = false;
    let mut in_forecast = false;
    let mut in_abbreviated = false;
    let mut in_temperatures = false;
    let mut in_hourly_group = false;
    let mut in_hourly = false;
    let mut in_wind = false;

    // In-progress records
    let mut period = PeriodForecast::default();
    let mut hour = HourlyForecast::default();
    let mut regional_normal_class: Option<String> = None;
    let mut period_temp_class: Option<String> = None;

    let mut current_field: Option<Field> = None;
    let mut depth: usize = 0;

    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf);
        // The reader does not flag unclosed elements at EOF on its own.
        if matches!(event, Ok(Event::Start(_))) {
            depth += 1;
        }
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                // A self-closing element has no End event, so any pending
                // capture must be dropped here, not only on End.
                current_field = None;
                let name = e.name();
                match name.as_ref() {
                    b"siteData" => saw_root = true,
                    b"location" => in_location = true,
                    b"region" if in_location => current_field = Some(Field::Region),
                    b"warnings" => {
                        in_warnings = true;
                        warnings_url = attr_value(e, "url");
                    }
                    b"event" if in_warnings => {
                        let kind = attr_value(e, "type").unwrap_or_default();
                        if kind.trim().to_lowercase() == "warning" {
                            let priority = attr_value(e, "priority").unwrap_or_default();
                            forecast.warnings.push(Warning {
                                priority: WarningPriority::parse(&priority),
                                description: attr_value(e, "description").unwrap_or_default(),
                                url: warnings_url.clone(),
                            });
                        }
                    }
                    b"currentConditions" => in_current = true,
                    b"station" if in_current => current_field = Some(Field::StationName),
                    b"dateTime" if in_current => {
                        if attr_value(e, "name").as_deref() == Some("observation") {
                            let zone = attr_value(e, "zone").unwrap_or_default();
                            if zone == "UTC" {
                                reading_obs_utc = true;
                            } else if let Some(offset) = attr_value(e, "UTCOffset") {
                                // Offset lives on the local-time node; it only
                                // ever feeds hourly local-hour derivation.
                                utc_offset_hours = offset.trim().parse::<f64>().ok();
                            }
                        }
                    }
                    b"timeStamp" if reading_obs_utc => {
                        current_field = Some(Field::ObservationTimeStamp);
                    }
                    b"condition" if in_current => current_field = Some(Field::Condition),
                    b"iconCode" if in_current => current_field = Some(Field::CurrentIcon),
                    b"temperature" if in_current => {
                        current_field = Some(Field::CurrentTemperature);
                    }
                    b"dewpoint" if in_current => current_field = Some(Field::DewPoint),
                    b"humidex" if in_current => current_field = Some(Field::Humidex),
                    b"pressure" if in_current => current_field = Some(Field::Pressure),
                    b"visibility" if in_current => current_field = Some(Field::Visibility),
                    b"relativeHumidity" if in_current => {
                        current_field = Some(Field::RelativeHumidity);
                    }
                    b"wind" if in_current || in_hourly => in_wind = true,
                    b"speed" if in_wind => {
                        current_field = Some(if in_hourly {
                            Field::HourlyWindSpeed
                        } else {
                            Field::WindSpeed
                        });
                    }
                    b"gust" if in_wind => {
                        current_field = Some(if in_hourly {
                            Field::HourlyWindGust
                        } else {
                            Field::WindGust
                        });
                    }
                    b"direction" if in_wind => {
                        current_field = Some(if in_hourly {
                            Field::HourlyWindDirection
                        } else {
                            Field::WindDirection
                        });
                    }
                    b"bearing" if in_wind && !in_hourly => {
                        current_field = Some(Field::WindBearing);
                    }
                    b"forecastGroup" => in_forecast_group = true,
                    b"regionalNormals" if in_forecast_group => in_regional_normals = true,
                    b"temperature" if in_regional_normals => {
                        regional_normal_class = attr_value(e, "class");
                        current_field = Some(Field::RegionalNormal);
                    }
                    b"forecast" if in_forecast_group => {
                        in_forecast = true;
                        period = PeriodForecast::default();
                    }
                    b"period" if in_forecast => current_field = Some(Field::Period),
                    b"textSummary" if in_forecast && !in_abbreviated && !in_temperatures => {
                        current_field = Some(Field::PeriodSummary);
                    }
                    b"abbreviatedForecast" if in_forecast => in_abbreviated = true,
                    b"iconCode" if in_abbreviated => current_field = Some(Field::PeriodIcon),
                    b"pop" if in_abbreviated => current_field = Some(Field::PeriodPop),
                    b"temperatures" if in_forecast => in_temperatures = true,
                    b"temperature" if in_temperatures => {
                        period_temp_class = attr_value(e, "class");
                        current_field = Some(Field::PeriodTemperature);
                    }
                    b"hourlyForecastGroup" => in_hourly_group = true,
                    b"hourlyForecast" if in_hourly_group => {
                        in_hourly = true;
                        hour = HourlyForecast::default();
                        hour.time_utc = attr_value(e, "dateTimeUTC")
                            .and_then(|ts| parse_fixed_utc(&ts, HOURLY_TS_FORMAT));
                    }
                    b"condition" if in_hourly => current_field = Some(Field::HourlyCondition),
                    b"iconCode" if in_hourly => current_field = Some(Field::HourlyIcon),
                    b"temperature" if in_hourly => {
                        current_field = Some(Field::HourlyTemperature);
                    }
                    b"humidex" if in_hourly => current_field = Some(Field::HourlyHumidex),
                    b"lwc" if in_hourly => current_field = Some(Field::HourlyPrecipChance),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(field) = current_field {
                    let text = e.unescape().unwrap_or_default().trim().to_string();
                    if !text.is_empty() {
                        apply_field(
                            field,
                            &text,
                            &mut forecast,
                            &mut period,
                            &mut hour,
                            &regional_normal_class,
                            &period_temp_class,
                        );
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                depth = depth.saturating_sub(1);
                current_field = None;
                match e.name().as_ref() {
                    b"location" => in_location = false,
                    b"warnings" => in_warnings = false,
                    b"dateTime" => reading_obs_utc = false,
                    b"currentConditions" => in_current = false,
                    b"wind" => in_wind = false,
                    b"regionalNormals" => in_regional_normals = false,
                    b"abbreviatedForecast" => in_abbreviated = false,
                    b"temperatures" => in_temperatures = false,
                    b"forecast" if in_forecast => {
                        period.icon_class = icons.lookup(period.icon_code).to_string();
                        if is_long_term(&period.period) {
                            forecast.long_term.push(std::mem::take(&mut period));
                        } else {
                            forecast.short_term.push(std::mem::take(&mut period));
                        }
                        in_forecast = false;
                    }
                    b"forecastGroup" => in_forecast_group = false,
                    b"hourlyForecast" if in_hourly => {
                        hour.icon_class = icons.lookup(hour.icon_code).to_string();
                        hour.temperature_rounded = hour.temperature.rounded();
                        hour.local_hour = match (hour.time_utc, utc_offset_hours) {
                            (Some(t), Some(offset)) => Some(local_hour(t, offset)),
                            _ => None,
                        };
                        forecast.hourly.push(std::mem::take(&mut hour));
                        in_hourly = false;
                    }
                    b"hourlyForecastGroup" => in_hourly_group = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => {
                if depth > 0 {
                    return Err(BulletinError::Truncated);
                }
                break;
            }
            Err(e) => return Err(BulletinError::Malformed(e)),
            _ => {}
        }
    }

    if !saw_root {
        return Err(BulletinError::MissingRoot);
    }

    forecast.current.icon_class = icons.lookup(forecast.current.icon_code).to_string();
    forecast.current.temperature_rounded = forecast.current.temperature.rounded();

    Ok(forecast)
}

#[allow(clippy::too_many_arguments)]
fn apply_field(
    field: Field,
    text: &str,
    forecast: &mut Forecast,
    period: &mut PeriodForecast,
    hour: &mut HourlyForecast,
    regional_normal_class: &Option<String>,
    period_temp_class: &Option<String>,
) {
    let current = &mut forecast.current;
    match field {
        Field::Region => forecast.region = Some(text.to_string()),
        Field::StationName => forecast.station_name = Some(text.to_string()),
        Field::ObservationTimeStamp => {
            forecast.observation_time_utc = parse_fixed_utc(text, OBSERVATION_TS_FORMAT);
        }
        Field::Condition => current.description = Some(text.to_string()),
        Field::CurrentIcon => current.icon_code = icon_code_from_text(text),
        Field::CurrentTemperature => current.temperature = Reading::parse(text),
        Field::DewPoint => current.dew_point = Reading::parse(text),
        Field::Humidex => current.humidex = Reading::parse(text),
        Field::Pressure => current.pressure_kpa = Reading::parse(text),
        Field::Visibility => current.visibility_km = Reading::parse(text),
        Field::RelativeHumidity => current.relative_humidity = Reading::parse(text),
        Field::WindSpeed => current.wind_speed = Reading::parse(text),
        Field::WindGust => current.wind_gust = Reading::parse(text),
        Field::WindDirection => current.wind_direction = Some(text.to_string()),
        Field::WindBearing => current.wind_bearing_degree = Reading::parse(text),
        Field::RegionalNormal => match regional_normal_class.as_deref() {
            Some("high") => current.regional_normal_high = Reading::parse(text),
            Some("low") => current.regional_normal_low = Reading::parse(text),
            _ => {}
        },
        Field::Period => period.period = text.to_string(),
        Field::PeriodSummary => period.text_summary = Some(text.to_string()),
        Field::PeriodIcon => period.icon_code = icon_code_from_text(text),
        Field::PeriodPop => period.pop_percent = Reading::parse(text),
        Field::PeriodTemperature => {
            period.temperature = Reading::parse(text);
            period.temperature_class = period_temp_class.clone();
        }
        Field::HourlyCondition => hour.condition = Some(text.to_string()),
        Field::HourlyIcon => hour.icon_code = icon_code_from_text(text),
        Field::HourlyTemperature => hour.temperature = Reading::parse(text),
        Field::HourlyHumidex => hour.humidex = Reading::parse(text),
        Field::HourlyPrecipChance => hour.precip_chance = Reading::parse(text),
        Field::HourlyWindSpeed => hour.wind_speed = Reading::parse(text),
        Field::HourlyWindGust => hour.wind_gust = Reading::parse(text),
        Field::HourlyWindDirection => hour.wind_direction = Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::ICON_NA;

    const SAMPLE_BULLETIN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<siteData>
  <location>
    <province code="ON">Ontario</province>
    <name code="s0000430" lat="45.42N" lon="75.69W">Ottawa</name>
    <region>Ottawa North - Gatineau</region>
  </location>
  <warnings url="https://weather.gc.ca/warnings/report_e.html?on41">
    <event type="warning" priority="high" description="FREEZING RAIN WARNING"/>
    <event type="advisory" priority="low" description="FOG ADVISORY"/>
    <event type="Warning" priority="tornado!" description="SEVERE THUNDERSTORM WARNING"/>
  </warnings>
  <currentConditions>
    <station code="yow" lat="45.32N" lon="75.67W">Ottawa Macdonald-Cartier Int'l Airport</station>
    <dateTime name="observation" zone="UTC" UTCOffset="0">
      <timeStamp>20260827120000</timeStamp>
    </dateTime>
    <dateTime name="observation" zone="EDT" UTCOffset="-4">
      <timeStamp>20260827080000</timeStamp>
    </dateTime>
    <condition>Mostly Cloudy</condition>
    <iconCode format="gif">03</iconCode>
    <temperature unitType="metric" units="C">20.9</temperature>
    <dewpoint unitType="metric" units="C">14.8</dewpoint>
    <humidex unitType="metric"/>
    <pressure unitType="metric" units="kPa">101.7</pressure>
    <visibility unitType="metric" units="km">24.1</visibility>
    <relativeHumidity units="%">68</relativeHumidity>
    <wind>
      <speed unitType="metric" units="km/h">19</speed>
      <gust unitType="metric" units="km/h">calm</gust>
      <direction>SW</direction>
      <bearing units="degrees">229.0</bearing>
    </wind>
  </currentConditions>
  <forecastGroup>
    <regionalNormals>
      <textSummary>Low 13. High 24.</textSummary>
      <temperature unitType="metric" units="C" class="high">24</temperature>
      <temperature unitType="metric" units="C" class="low">13</temperature>
    </regionalNormals>
    <forecast>
      <period textForecastName="Tonight">Tonight</period>
      <textSummary>Clear. Low 12.</textSummary>
      <abbreviatedForecast>
        <iconCode format="gif">30</iconCode>
        <pop units="%"/>
        <textSummary>Clear</textSummary>
      </abbreviatedForecast>
      <temperatures>
        <textSummary>Low 12.</textSummary>
        <temperature unitType="metric" units="C" class="low">12</temperature>
      </temperatures>
    </forecast>
    <forecast>
      <period textForecastName="Monday">Monday night</period>
      <textSummary>Showers. Low 9.</textSummary>
      <abbreviatedForecast>
        <iconCode format="gif">12</iconCode>
        <pop units="%">70</pop>
        <textSummary>Showers</textSummary>
      </abbreviatedForecast>
      <temperatures>
        <textSummary>Low 9.</textSummary>
        <temperature unitType="metric" units="C" class="low">9</temperature>
      </temperatures>
    </forecast>
    <forecast>
      <period textForecastName="Mardi">Mardi</period>
      <textSummary>Ensoleillé.</textSummary>
      <abbreviatedForecast>
        <iconCode format="gif">00</iconCode>
        <pop units="%"/>
        <textSummary>Ensoleillé</textSummary>
      </abbreviatedForecast>
      <temperatures>
        <textSummary>Max 22.</textSummary>
        <temperature unitType="metric" units="C" class="high">22</temperature>
      </temperatures>
    </forecast>
  </forecastGroup>
  <hourlyForecastGroup>
    <hourlyForecast dateTimeUTC="202608271300">
      <condition>Sunny</condition>
      <iconCode format="png">00</iconCode>
      <temperature unitType="metric" units="C">21.4</temperature>
      <lwc units="%">0</lwc>
      <humidex unitType="metric"/>
      <wind>
        <speed unitType="metric" units="km/h">20</speed>
        <direction windDirFull="Southwest">SW</direction>
        <gust unitType="metric" units="km/h">40</gust>
      </wind>
    </hourlyForecast>
    <hourlyForecast dateTimeUTC="202608271400">
      <condition>Chance of showers</condition>
      <iconCode format="png">06</iconCode>
      <temperature unitType="metric" units="C">n/a</temperature>
      <lwc units="%">40</lwc>
      <humidex unitType="metric"/>
      <wind>
        <speed unitType="metric" units="km/h"/>
        <direction/>
        <gust unitType="metric" units="km/h"/>
      </wind>
    </hourlyForecast>
  </hourlyForecastGroup>
</siteData>"#;

    fn parse_sample() -> Forecast {
        parse(SAMPLE_BULLETIN, &IconTable::new()).unwrap()
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = serde_json::to_string(&parse_sample()).unwrap();
        let b = serde_json::to_string(&parse_sample()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_observation_time_from_utc_node_only() {
        let forecast = parse_sample();
        let obs = forecast.observation_time_utc.unwrap();
        // The UTC-tagged node says 12:00; the EDT node (08:00) must not win.
        assert_eq!(obs.to_rfc3339(), "2026-08-27T12:00:00+00:00");
    }

    #[test]
    fn test_observation_time_absent_without_utc_node() {
        let xml = r#"<siteData><currentConditions>
            <dateTime name="observation" zone="EDT" UTCOffset="-4">
              <timeStamp>20260827080000</timeStamp>
            </dateTime>
        </currentConditions></siteData>"#;
        let forecast = parse(xml, &IconTable::new()).unwrap();
        assert!(forecast.observation_time_utc.is_none());
    }

    #[test]
    fn test_temperature_two_forms_from_one_source() {
        let current = parse_sample().current;
        assert_eq!(current.temperature, Reading::Float(20.9));
        assert_eq!(current.temperature_rounded, Reading::Int(21));
    }

    #[test]
    fn test_lenient_coercion_keeps_source_text() {
        let current = parse_sample().current;
        // <gust> holds "calm" — not a number, kept verbatim.
        assert_eq!(current.wind_gust, Reading::Text("calm".to_string()));
    }

    #[test]
    fn test_empty_element_is_absent() {
        let current = parse_sample().current;
        assert!(current.humidex.is_absent());
    }

    #[test]
    fn test_integer_fields_stay_integers() {
        let current = parse_sample().current;
        assert_eq!(current.relative_humidity, Reading::Int(68));
        assert_eq!(current.wind_bearing_degree, Reading::Float(229.0));
    }

    #[test]
    fn test_regional_normals() {
        let current = parse_sample().current;
        assert_eq!(current.regional_normal_high, Reading::Int(24));
        assert_eq!(current.regional_normal_low, Reading::Int(13));
    }

    #[test]
    fn test_warning_filter_keeps_only_warning_type() {
        let warnings = parse_sample().warnings;
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].description, "FREEZING RAIN WARNING");
        assert_eq!(warnings[0].priority, WarningPriority::High);
        // type="Warning" (mixed case) is included; type="advisory" is not.
        assert_eq!(warnings[1].description, "SEVERE THUNDERSTORM WARNING");
    }

    #[test]
    fn test_out_of_set_priority_passes_through() {
        let warnings = parse_sample().warnings;
        assert_eq!(
            warnings[1].priority,
            WarningPriority::Other("tornado!".to_string())
        );
        assert_eq!(warnings[1].priority.as_str(), "tornado!");
    }

    #[test]
    fn test_warning_url_from_warnings_element() {
        let warnings = parse_sample().warnings;
        assert_eq!(
            warnings[0].url.as_deref(),
            Some("https://weather.gc.ca/warnings/report_e.html?on41")
        );
    }

    #[test]
    fn test_period_classification() {
        let forecast = parse_sample();
        let short: Vec<&str> = forecast.short_term.iter().map(|p| p.period.as_str()).collect();
        let long: Vec<&str> = forecast.long_term.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(short, vec!["Tonight"]);
        // English and French weekday tokens both recognized.
        assert_eq!(long, vec!["Monday night", "Mardi"]);
    }

    #[test]
    fn test_period_fields() {
        let forecast = parse_sample();
        let tonight = &forecast.short_term[0];
        assert_eq!(tonight.text_summary.as_deref(), Some("Clear. Low 12."));
        assert_eq!(tonight.icon_code, Some(30));
        assert_eq!(tonight.icon_class, "we-clear-n");
        assert!(tonight.pop_percent.is_absent());
        assert_eq!(tonight.temperature, Reading::Int(12));
        assert_eq!(tonight.temperature_class.as_deref(), Some("low"));
    }

    #[test]
    fn test_hourly_series() {
        let forecast = parse_sample();
        assert_eq!(forecast.hourly.len(), 2);

        let first = &forecast.hourly[0];
        assert_eq!(
            first.time_utc.unwrap().to_rfc3339(),
            "2026-08-27T13:00:00+00:00"
        );
        // 13:00 UTC at offset -4 → 09 local.
        assert_eq!(first.local_hour.as_deref(), Some("09"));
        assert_eq!(first.condition.as_deref(), Some("Sunny"));
        assert_eq!(first.icon_class, "we-sunny-d");
        assert_eq!(first.temperature, Reading::Float(21.4));
        assert_eq!(first.temperature_rounded, Reading::Int(21));
        assert_eq!(first.wind_gust, Reading::Int(40));
    }

    #[test]
    fn test_hourly_leniency() {
        let forecast = parse_sample();
        let second = &forecast.hourly[1];
        assert_eq!(second.temperature, Reading::Text("n/a".to_string()));
        assert_eq!(second.temperature_rounded, Reading::Text("n/a".to_string()));
        assert!(second.wind_speed.is_absent());
        assert!(second.wind_direction.is_none());
    }

    #[test]
    fn test_local_hour_fractional_offset() {
        // Newfoundland: UTC-2.5 in summer. 13:00 UTC → 10:30 local → "10".
        let t = parse_fixed_utc("202608271300", HOURLY_TS_FORMAT).unwrap();
        assert_eq!(local_hour(t, -2.5), "10");
    }

    #[test]
    fn test_unmapped_icon_gets_sentinel() {
        let xml = r#"<siteData><currentConditions>
            <iconCode format="gif">97</iconCode>
        </currentConditions></siteData>"#;
        let forecast = parse(xml, &IconTable::new()).unwrap();
        assert_eq!(forecast.current.icon_code, Some(97));
        assert_eq!(forecast.current.icon_class, ICON_NA);
    }

    #[test]
    fn test_missing_icon_gets_sentinel() {
        let xml = "<siteData><currentConditions/></siteData>";
        let forecast = parse(xml, &IconTable::new()).unwrap();
        assert!(forecast.current.icon_code.is_none());
        assert_eq!(forecast.current.icon_class, ICON_NA);
    }

    #[test]
    fn test_not_xml_is_malformed() {
        let result = parse("this is not a bulletin", &IconTable::new());
        assert!(matches!(result, Err(BulletinError::MissingRoot)));
    }

    #[test]
    fn test_unclosed_markup_is_malformed() {
        let result = parse("<siteData><currentConditions>", &IconTable::new());
        assert!(matches!(result, Err(BulletinError::Truncated)));
    }

    #[test]
    fn test_empty_element_does_not_capture_following_text() {
        // <pop/> is self-closing; the abbreviated textSummary after it must
        // not be swallowed into the still-pending pop capture.
        let xml = r#"<siteData><forecastGroup><forecast>
            <period textForecastName="Tonight">Tonight</period>
            <abbreviatedForecast>
              <pop units="%"/>
              <textSummary>Clear</textSummary>
            </abbreviatedForecast>
        </forecast></forecastGroup></siteData>"#;
        let forecast = parse(xml, &IconTable::new()).unwrap();
        let tonight = &forecast.short_term[0];
        assert!(tonight.pop_percent.is_absent());
        assert!(tonight.text_summary.is_none());
    }

    #[test]
    fn test_temperatures_summary_does_not_replace_period_summary() {
        let forecast = parse_sample();
        // The forecast-level summary, not the one inside <temperatures>.
        assert_eq!(
            forecast.short_term[0].text_summary.as_deref(),
            Some("Clear. Low 12.")
        );
    }

    #[test]
    fn test_station_and_region_carried() {
        let forecast = parse_sample();
        assert_eq!(
            forecast.station_name.as_deref(),
            Some("Ottawa Macdonald-Cartier Int'l Airport")
        );
        assert_eq!(forecast.region.as_deref(), Some("Ottawa North - Gatineau"));
    }

    #[test]
    fn test_reading_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Reading::Int(21),
            Reading::Float(20.9),
            Reading::Text("calm".to_string()),
            Reading::Absent,
        ])
        .unwrap();
        assert_eq!(json, r#"[21,20.9,"calm",null]"#);
    }

    #[test]
    fn test_weekday_match_is_case_insensitive() {
        assert!(is_long_term("MONDAY NIGHT"));
        assert!(is_long_term("Nuit de samedi"));
        assert!(!is_long_term("Tonight"));
        assert!(!is_long_term("Ce soir"));
    }
}

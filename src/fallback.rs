//! Simulated weather answers for when the live agent is unreachable.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Words that make a message a weather question.
const WEATHER_KEYWORDS: &[&str] = &["weather", "temperature", "forecast"];

/// Keyword to city name, checked in order.
const CITIES: &[(&str, &str)] = &[
    ("mumbai", "Mumbai"),
    ("delhi", "Delhi"),
    ("bangalore", "Bangalore"),
    ("chennai", "Chennai"),
    ("kolkata", "Kolkata"),
    ("hyderabad", "Hyderabad"),
    ("pune", "Pune"),
    ("ahmedabad", "Ahmedabad"),
    ("new york", "New York"),
    ("london", "London"),
    ("tokyo", "Tokyo"),
    ("paris", "Paris"),
    ("sydney", "Sydney"),
    ("dubai", "Dubai"),
    ("singapore", "Singapore"),
];

const DEFAULT_CITY: &str = "Mumbai";

const CONDITIONS: &[&str] = &["sunny", "cloudy", "rainy", "partly cloudy", "clear"];

/// Reply for messages that are not about the weather.
pub const HELP_MESSAGE: &str = "🤖 I'm your weather assistant! I can help you with:\n\n\
• Current weather conditions\n\
• Weather forecasts\n\
• Temperature and humidity\n\
• Wind speed and direction\n\
• Climate information\n\n\
Just ask me about the weather in any city!";

/// Randomised readings for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// Degrees Celsius, 10..=39
    pub temperature: i32,
    /// Percent, 40..=79
    pub humidity: u32,
    /// km/h, 5..=19
    pub wind_speed: u32,
    pub condition: &'static str,
}

/// Produces a plausible weather report from the user's message.
pub struct SimulatedResponder {
    rng: Mutex<StdRng>,
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl std::fmt::Debug for SimulatedResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SimulatedResponder")
    }
}

impl SimulatedResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Responder with a fixed seed, producing the same readings every run.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Full answer for `message`: a weather report, or the help text.
    pub fn respond(&self, message: &str) -> String {
        let lower = message.to_lowercase();
        if !WEATHER_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return HELP_MESSAGE.to_string();
        }

        render_report(city_for(&lower), &self.reading())
    }

    fn reading(&self) -> Reading {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Reading {
            temperature: rng.gen_range(10..40),
            humidity: rng.gen_range(40..80),
            wind_speed: rng.gen_range(5..20),
            condition: CONDITIONS.choose(&mut *rng).copied().unwrap_or("clear"),
        }
    }
}

/// First city whose keyword appears in the lowercased message.
pub fn city_for(lower: &str) -> &'static str {
    CITIES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, city)| *city)
        .unwrap_or(DEFAULT_CITY)
}

fn render_report(city: &str, r: &Reading) -> String {
    format!(
        "🌤️ Current Weather for {city}:\n\n\
         🌡️ Temperature: {temp}°C\n\
         💧 Humidity: {humidity}%\n\
         💨 Wind Speed: {wind} km/h\n\
         ☁️ Conditions: {condition}\n\n\
         📊 3-Day Forecast:\n\
         • Today: {condition}, {temp}°C\n\
         • Tomorrow: Partly cloudy, {tomorrow}°C\n\
         • Day after: Sunny, {after}°C\n\n\
         Note: This is simulated weather data. The weather agent API is currently processing your request.",
        temp = r.temperature,
        humidity = r.humidity,
        wind = r.wind_speed,
        condition = r.condition,
        tomorrow = r.temperature + 2,
        after = r.temperature - 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_table_order() {
        assert_eq!(city_for("weather in tokyo"), "Tokyo");
        assert_eq!(city_for("new york weather"), "New York");
        assert_eq!(city_for("weather somewhere"), DEFAULT_CITY);
        // "delhi" comes before "london" in the table
        assert_eq!(city_for("london or delhi forecast"), "Delhi");
    }

    #[test]
    fn test_weather_report() {
        let responder = SimulatedResponder::seeded(1);
        let report = responder.respond("What's the WEATHER in Tokyo?");
        assert!(report.starts_with("🌤️ Current Weather for Tokyo:"));
        assert!(report.contains("🌡️ Temperature: "));
        assert!(report.contains("3-Day Forecast"));
        assert!(report.contains("simulated weather data"));
    }

    #[test]
    fn test_readings_stay_in_range() {
        let responder = SimulatedResponder::seeded(99);
        for _ in 0..200 {
            let r = responder.reading();
            assert!((10..40).contains(&r.temperature));
            assert!((40..80).contains(&r.humidity));
            assert!((5..20).contains(&r.wind_speed));
            assert!(CONDITIONS.contains(&r.condition));
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = SimulatedResponder::seeded(5).respond("forecast for paris");
        let b = SimulatedResponder::seeded(5).respond("forecast for paris");
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_weather_message_gets_help() {
        let responder = SimulatedResponder::new();
        assert_eq!(responder.respond("tell me a joke"), HELP_MESSAGE);
    }
}

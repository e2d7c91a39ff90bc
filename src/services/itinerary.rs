//! Itinerary generation
//!
//! Client for the external text-generation service. The contract with callers
//! is strict: `generate` always returns exactly five day structures, numbered
//! 1 through 5 in order, with 3-4 activities each. Any failure on the wire,
//! in parsing or in shape validation degrades to the deterministic fallback
//! so the booking write path is never blocked indefinitely or handed a
//! malformed plan.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::ItineraryConfig;
use crate::models::{DiningPlan, ItineraryDay, ResortSnapshot};

/// Inputs to itinerary generation, assembled by the booking engine.
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryRequest {
    pub resort_name: String,
    pub location: String,
    pub amenities: Vec<String>,
    pub nights: i64,
    pub kids_ages: Vec<i32>,
    pub brand_tone: String,
    pub partner_name: String,
}

impl ItineraryRequest {
    pub fn new(
        resort: &ResortSnapshot,
        nights: i64,
        kids_ages: &[i32],
        brand_tone: &str,
        partner_name: &str,
    ) -> Self {
        Self {
            resort_name: resort.name.clone(),
            location: resort.location.clone(),
            amenities: resort.amenities.clone(),
            nights,
            kids_ages: kids_ages.to_vec(),
            brand_tone: brand_tone.to_string(),
            partner_name: partner_name.to_string(),
        }
    }
}

/// Pluggable itinerary collaborator. Implementations never fail: the
/// documented fallback stands in for any internal error.
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    async fn generate(&self, request: &ItineraryRequest) -> Vec<ItineraryDay>;
}

/// Client for the Gemini generateContent endpoint.
pub struct GeminiGenerator {
    http: reqwest::Client,
    config: ItineraryConfig,
}

impl GeminiGenerator {
    pub fn new(config: ItineraryConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    async fn call_model(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.api_base, self.config.model, self.config.api_key
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_output_tokens,
            }
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: serde_json::Value = response.json().await?;
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("No text candidate in model response"))?;

        Ok(text.to_string())
    }
}

#[async_trait]
impl ItineraryGenerator for GeminiGenerator {
    async fn generate(&self, request: &ItineraryRequest) -> Vec<ItineraryDay> {
        if self.config.api_key.is_empty() {
            debug!("Itinerary API key not configured, using fallback itinerary");
            return fallback_itinerary(&request.kids_ages);
        }

        let prompt = build_prompt(request);
        match self.call_model(&prompt).await {
            Ok(text) => match parse_itinerary(&text) {
                Some(days) => days,
                None => {
                    warn!("Model returned malformed itinerary, using fallback");
                    fallback_itinerary(&request.kids_ages)
                }
            },
            Err(err) => {
                warn!(error = %err, "Itinerary generation failed, using fallback");
                fallback_itinerary(&request.kids_ages)
            }
        }
    }
}

fn build_prompt(request: &ItineraryRequest) -> String {
    let kids_context = if request.kids_ages.is_empty() {
        "This trip may include adults and families. Provide a balanced mix of relaxation and adventure.".to_string()
    } else {
        let ages = request
            .kids_ages
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "This is a family trip with kids aged {} years old. Include age-appropriate activities like Kids' Club, family-friendly excursions, and child-safe amenities.",
            ages
        )
    };

    format!(
        r#"You are the AI Concierge for {partner}. Your brand tone is {tone}.
Use words like "Bespoke," "Curated," "Exclusive," "Unforgettable," and "Tailored" to describe the experience.

As a guest of {partner}, create a strictly 5-day vacation itinerary for a stay at {resort} in {location}.
Even if the stay duration is different, provide a comprehensive 5-day plan.

The resort has the following amenities: {amenities}.

{kids_context}

SYSTEM INSTRUCTION:
Return ONLY a JSON array of objects. Each object represents one day and must have the following keys:
- day: (number) The day number (1-5).
- title: (string) A catchy, luxury-themed title for the day.
- activities: (array of strings) A list of 3-4 specific activities for that day.
- dining: (object) with keys "breakfast", "lunch", "dinner" - each a string describing the dining experience.

Do not include any other text, markdown formatting, or code blocks. Output ONLY the raw JSON array."#,
        partner = request.partner_name,
        tone = request.brand_tone,
        resort = request.resort_name,
        location = request.location,
        amenities = request.amenities.join(", "),
        kids_context = kids_context,
    )
}

static JSON_ARRAY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// Extract and validate an itinerary from raw model output.
/// Returns None unless the result satisfies the five-day contract.
fn parse_itinerary(text: &str) -> Option<Vec<ItineraryDay>> {
    let json_slice = JSON_ARRAY_REGEX.find(text)?.as_str();
    let days: Vec<ItineraryDay> = serde_json::from_str(json_slice).ok()?;

    if itinerary_is_valid(&days) {
        Some(days)
    } else {
        None
    }
}

/// The five-day contract: days 1..5 in ascending order, 3-4 activities each.
pub fn itinerary_is_valid(days: &[ItineraryDay]) -> bool {
    days.len() == 5
        && days
            .iter()
            .enumerate()
            .all(|(i, d)| d.day as usize == i + 1 && (3..=4).contains(&d.activities.len()))
}

/// Deterministic fallback itinerary. Activity selection is kid-aware but the
/// structure is fixed: five days, three activities, full dining plan.
pub fn fallback_itinerary(kids_ages: &[i32]) -> Vec<ItineraryDay> {
    let activities: Vec<String> = if kids_ages.is_empty() {
        vec![
            "Beach lounging".to_string(),
            "Swimming at infinity pool".to_string(),
            "Guided resort tour".to_string(),
        ]
    } else {
        vec![
            "Kids' Club activities".to_string(),
            "Family pool time".to_string(),
            "Beach games and sandcastle building".to_string(),
        ]
    };

    (1..=5u8)
        .map(|day| ItineraryDay {
            day,
            title: format!("Paradise Discovery Day {}", day),
            activities: activities.clone(),
            dining: DiningPlan {
                breakfast: "Buffet Breakfast".to_string(),
                lunch: "Poolside Grill".to_string(),
                dinner: "Resort Specialty Restaurant".to_string(),
            },
        })
        .collect()
}

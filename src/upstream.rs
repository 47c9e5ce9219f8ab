//! Upstream seed sources for fox images and jokes.
//!
//! The gateway seeds new entities from two external APIs:
//! `randomfox.ca` for fox images and the official joke API for jokes.
//! Both are consumed through the [`SeedSource`] trait so the service
//! can be tested against a scripted fake. Every upstream call carries
//! a bounded timeout; on timeout or malformed responses callers fall
//! back to the static content in this module rather than failing the
//! request.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{FoxNumber, JokeId};
use crate::error::GatewayError;

/// A fox candidate returned by the seed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoxSeed {
    /// Numeric identifier extracted from the image URL.
    pub fox_number: FoxNumber,
    /// Full upstream image URL.
    pub image_url: String,
}

/// A joke candidate returned by the seed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JokeSeed {
    /// Joke identifier (`official_<n>` for upstream jokes).
    pub joke_id: JokeId,
    /// Setup and punchline joined into one string.
    pub text: String,
    /// Category label; `"general"` when the source gives none.
    pub category: String,
}

/// Source of random fox and joke seed data.
#[async_trait]
pub trait SeedSource: Send + Sync + std::fmt::Debug {
    /// Fetches one random fox.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UpstreamTimeout`] on timeout or a
    /// malformed upstream response.
    async fn random_fox(&self) -> Result<FoxSeed, GatewayError>;

    /// Fetches one random joke.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UpstreamTimeout`] on timeout or a
    /// malformed upstream response.
    async fn random_joke(&self) -> Result<JokeSeed, GatewayError>;
}

/// Wire shape of a `randomfox.ca/floof/` response.
#[derive(Debug, Deserialize)]
struct FoxApiResponse {
    image: String,
}

/// Wire shape of an official-joke-api response.
#[derive(Debug, Deserialize)]
struct JokeApiResponse {
    id: u64,
    #[serde(rename = "type", default)]
    joke_type: Option<String>,
    setup: String,
    punchline: String,
}

/// HTTP implementation of [`SeedSource`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpSeedClient {
    client: reqwest::Client,
    fox_url: String,
    joke_url: String,
}

impl HttpSeedClient {
    /// Builds a client with the given endpoints and per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(
        fox_url: String,
        joke_url: String,
        timeout: std::time::Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            fox_url,
            joke_url,
        })
    }
}

#[async_trait]
impl SeedSource for HttpSeedClient {
    async fn random_fox(&self) -> Result<FoxSeed, GatewayError> {
        let response: FoxApiResponse = self
            .client
            .get(&self.fox_url)
            .send()
            .await
            .map_err(|e| GatewayError::UpstreamTimeout(e.to_string()))?
            .json()
            .await
            .map_err(|e| GatewayError::UpstreamTimeout(e.to_string()))?;

        let fox_number = parse_fox_number(&response.image).ok_or_else(|| {
            GatewayError::UpstreamTimeout(format!("unparseable fox image url: {}", response.image))
        })?;

        Ok(FoxSeed {
            fox_number,
            image_url: response.image,
        })
    }

    async fn random_joke(&self) -> Result<JokeSeed, GatewayError> {
        let response: JokeApiResponse = self
            .client
            .get(&self.joke_url)
            .send()
            .await
            .map_err(|e| GatewayError::UpstreamTimeout(e.to_string()))?
            .json()
            .await
            .map_err(|e| GatewayError::UpstreamTimeout(e.to_string()))?;

        Ok(JokeSeed {
            joke_id: JokeId::new(format!("official_{}", response.id)),
            text: format!("{} {}", response.setup, response.punchline),
            category: response
                .joke_type
                .unwrap_or_else(|| "general".to_string()),
        })
    }
}

/// Extracts the fox number from an image URL of the form
/// `https://randomfox.ca/images/<n>.jpg`.
fn parse_fox_number(image_url: &str) -> Option<FoxNumber> {
    let file = image_url.rsplit('/').next()?;
    let stem = file.split('.').next()?;
    stem.parse::<u32>().ok().map(FoxNumber::new)
}

/// Static jokes served when the upstream source is unavailable.
#[must_use]
pub fn fallback_jokes() -> Vec<JokeSeed> {
    [
        (
            "fallback_1",
            "Why don't scientists trust atoms? Because they make up everything!",
            "science",
        ),
        (
            "fallback_2",
            "Why did the scarecrow win an award? He was outstanding in his field!",
            "general",
        ),
        (
            "fallback_3",
            "Why don't eggs tell jokes? They'd crack each other up!",
            "general",
        ),
        (
            "fallback_4",
            "What do you call a fake noodle? An impasta!",
            "food",
        ),
        (
            "fallback_5",
            "Why did the math book look so sad? Because it was full of problems!",
            "school",
        ),
    ]
    .into_iter()
    .map(|(id, text, category)| JokeSeed {
        joke_id: JokeId::new(id),
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

/// Static fox pair served when the upstream source is unavailable.
#[must_use]
pub fn fallback_fox_pair() -> (FoxSeed, FoxSeed) {
    let seed = |n: u32| FoxSeed {
        fox_number: FoxNumber::new(n),
        image_url: FoxNumber::new(n).default_image_url(),
    };
    (seed(1), seed(2))
}

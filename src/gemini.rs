use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::Error;
use crate::prompt;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// The message shown for any failed generation. Specifics of the
/// underlying failure go to the log, not to the user.
const GENERATION_FAILURE_MESSAGE: &str = "Failed to generate code from the Gemini API";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// One non-streaming request with the fixed simulation prompt.
    /// Returns the raw response text; callers strip the fence markers.
    pub async fn generate_simulation_script(&self) -> Result<String, Error> {
        match self.generate(prompt::simulation_prompt()).await {
            Ok(text) => Ok(text),
            Err(e) => {
                error!("Gemini request failed: {e:#}");
                Err(Error::Generation(GENERATION_FAILURE_MESSAGE.to_string()))
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            BASE_URL, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(
            "sending generateContent request to {}",
            url.replace(&self.api_key, "***")
        );

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status, body));
        }

        let response: GenerateResponse = response.json().await?;
        extract_text(response)
    }
}

fn extract_text(response: GenerateResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no candidates in response"))?;
    let part = candidate
        .content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no parts in candidate"))?;
    Ok(part.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_gemini_wire_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hello".to_string(),
                }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn response_text_is_extracted_from_first_candidate() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"print(1)"},{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "print(1)");
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(extract_text(response).is_err());
    }

    #[test]
    fn empty_parts_is_an_error() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert!(extract_text(response).is_err());
    }
}

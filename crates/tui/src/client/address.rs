//! Address lookup against the Places API (v1 "new" endpoints).
//!
//! Two calls are used: autocomplete-by-text while the user types a name, and
//! a details lookup once a suggestion is picked. Both are billed per session,
//! so callers pass the same session token for one form.

use api_types::geo::format_lat_lon;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

const AUTOCOMPLETE_FIELDS: &str = "suggestions.placePrediction.placeId,suggestions.placePrediction.structuredFormat,suggestions.placePrediction.text";
const DETAILS_FIELDS: &str = "id,displayName,formattedAddress,location,googleMapsUri";

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Missing maps API key")]
    MissingApiKey,
    #[error("Places API error {0}")]
    Status(u16),
    #[error("Failed to fetch suggestions")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSuggestion {
    pub place_id: String,
    pub main_text: String,
    pub secondary_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDetails {
    /// `"lat,lon"` with six decimals.
    pub location: Option<String>,
    pub maps_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Suggestion {
    place_prediction: Option<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    place_id: String,
    text: Option<FormattableText>,
    structured_format: Option<StructuredFormat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredFormat {
    main_text: Option<FormattableText>,
    secondary_text: Option<FormattableText>,
}

#[derive(Debug, Deserialize)]
struct FormattableText {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsResponse {
    location: Option<LatLng>,
    google_maps_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone)]
pub struct AddressClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl AddressClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn key(&self) -> Result<&str, AddressError> {
        self.api_key.as_deref().ok_or(AddressError::MissingApiKey)
    }

    pub async fn autocomplete(
        &self,
        input: &str,
        session: Uuid,
    ) -> Result<Vec<AddressSuggestion>, AddressError> {
        let key = self.key()?;
        let res = self
            .http
            .post(format!("{}/places:autocomplete", self.base_url))
            .header("X-Goog-Api-Key", key)
            .header("X-Goog-FieldMask", AUTOCOMPLETE_FIELDS)
            .json(&json!({ "input": input, "sessionToken": session.to_string() }))
            .send()
            .await?;
        if !res.status().is_success() {
            tracing::warn!(status = %res.status(), "autocomplete failed");
            return Err(AddressError::Status(res.status().as_u16()));
        }
        Ok(suggestions(res.json::<AutocompleteResponse>().await?))
    }

    pub async fn details(
        &self,
        place_id: &str,
        session: Uuid,
    ) -> Result<AddressDetails, AddressError> {
        let key = self.key()?;
        let res = self
            .http
            .get(format!("{}/places/{place_id}", self.base_url))
            .query(&[
                ("languageCode", "en"),
                ("regionCode", "GB"),
                ("sessionToken", session.to_string().as_str()),
            ])
            .header("X-Goog-Api-Key", key)
            .header("X-Goog-FieldMask", DETAILS_FIELDS)
            .send()
            .await?;
        if !res.status().is_success() {
            tracing::warn!(status = %res.status(), "place details failed");
            return Err(AddressError::Status(res.status().as_u16()));
        }
        Ok(details(res.json::<DetailsResponse>().await?))
    }
}

fn suggestions(response: AutocompleteResponse) -> Vec<AddressSuggestion> {
    response
        .suggestions
        .into_iter()
        .filter_map(|s| s.place_prediction)
        .map(|p| {
            let (main, secondary) = match p.structured_format {
                Some(format) => (format.main_text, format.secondary_text),
                None => (None, None),
            };
            let main_text = main
                .or(p.text)
                .map(|t| t.text)
                .unwrap_or_default();
            AddressSuggestion {
                place_id: p.place_id,
                main_text,
                secondary_text: secondary.map(|t| t.text),
            }
        })
        .collect()
}

fn details(response: DetailsResponse) -> AddressDetails {
    AddressDetails {
        location: response
            .location
            .map(|loc| format_lat_lon(loc.latitude, loc.longitude)),
        maps_url: response.google_maps_uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_prefer_structured_main_text() {
        let raw = r#"{"suggestions":[
            {"placePrediction":{"placeId":"a","text":{"text":"Cafe X, London"},
              "structuredFormat":{"mainText":{"text":"Cafe X"},"secondaryText":{"text":"London"}}}},
            {"placePrediction":{"placeId":"b","text":{"text":"Park Y"}}},
            {"queryPrediction":{}}
        ]}"#;
        let parsed = suggestions(serde_json::from_str(raw).unwrap());
        assert_eq!(
            parsed,
            vec![
                AddressSuggestion {
                    place_id: "a".to_string(),
                    main_text: "Cafe X".to_string(),
                    secondary_text: Some("London".to_string()),
                },
                AddressSuggestion {
                    place_id: "b".to_string(),
                    main_text: "Park Y".to_string(),
                    secondary_text: None,
                },
            ]
        );
    }

    #[test]
    fn empty_autocomplete_body_has_no_suggestions() {
        assert!(suggestions(serde_json::from_str("{}").unwrap()).is_empty());
    }

    #[test]
    fn details_format_coordinates_with_six_decimals() {
        let raw = r#"{"location":{"latitude":51.5,"longitude":-0.1278},"googleMapsUri":"https://maps.google.com/?cid=1"}"#;
        let parsed = details(serde_json::from_str(raw).unwrap());
        assert_eq!(parsed.location.as_deref(), Some("51.500000,-0.127800"));
        assert_eq!(parsed.maps_url.as_deref(), Some("https://maps.google.com/?cid=1"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = AddressClient::new(reqwest::Client::new(), "http://127.0.0.1:1", None);
        let err = client.autocomplete("cafe", Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AddressError::MissingApiKey));
        let err = client.details("abc", Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AddressError::MissingApiKey));
    }
}

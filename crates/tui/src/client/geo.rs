use api_types::geo::format_lat_lon;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("location service error {0}")]
    Status(u16),
    #[error("location unavailable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("location out of range")]
    OutOfRange,
}

#[derive(Debug, Deserialize)]
struct Position {
    latitude: f64,
    longitude: f64,
}

/// One-shot lookup of the machine's approximate position.
#[derive(Debug, Clone)]
pub struct Locator {
    http: reqwest::Client,
    url: String,
}

impl Locator {
    pub fn new(http: reqwest::Client, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }

    /// Returns the current position as a six-decimal `"lat,lon"` string.
    pub async fn locate(&self) -> Result<String, LocateError> {
        let res = self.http.get(&self.url).send().await?;
        if !res.status().is_success() {
            return Err(LocateError::Status(res.status().as_u16()));
        }
        position_string(res.json::<Position>().await?)
    }
}

fn position_string(position: Position) -> Result<String, LocateError> {
    if !(-90.0..=90.0).contains(&position.latitude)
        || !(-180.0..=180.0).contains(&position.longitude)
    {
        return Err(LocateError::OutOfRange);
    }
    Ok(format_lat_lon(position.latitude, position.longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_rendered_with_six_decimals() {
        let position: Position =
            serde_json::from_str(r#"{"latitude":48.8566,"longitude":2.3522,"city":"Paris"}"#)
                .unwrap();
        assert_eq!(position_string(position).unwrap(), "48.856600,2.352200");
    }

    #[test]
    fn impossible_positions_are_rejected() {
        let position = Position {
            latitude: 123.0,
            longitude: 0.0,
        };
        assert!(matches!(
            position_string(position),
            Err(LocateError::OutOfRange)
        ));
    }
}

use serde::{Deserialize, Deserializer, Serialize};

/// Decodes `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub mod place {
    use super::*;

    use crate::visit::Visit;

    /// Label rendered for a cost that is missing or outside `0..=3`.
    pub const UNKNOWN_COST: &str = "—";

    /// Price bracket of a place, stored by the backend as an ordinal `0..=3`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Cost {
        Free,
        Low,
        Medium,
        High,
    }

    impl Cost {
        pub const ALL: [Cost; 4] = [Cost::Free, Cost::Low, Cost::Medium, Cost::High];

        pub fn from_ordinal(value: i64) -> Option<Self> {
            match value {
                0 => Some(Self::Free),
                1 => Some(Self::Low),
                2 => Some(Self::Medium),
                3 => Some(Self::High),
                _ => None,
            }
        }

        pub fn ordinal(self) -> u8 {
            match self {
                Self::Free => 0,
                Self::Low => 1,
                Self::Medium => 2,
                Self::High => 3,
            }
        }

        pub fn label(self) -> &'static str {
            match self {
                Self::Free => "Free",
                Self::Low => "£",
                Self::Medium => "££",
                Self::High => "£££",
            }
        }
    }

    /// Renders a stored cost, falling back to [`UNKNOWN_COST`].
    pub fn cost_label(cost: Option<i64>) -> &'static str {
        cost.and_then(Cost::from_ordinal)
            .map(Cost::label)
            .unwrap_or(UNKNOWN_COST)
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Place {
        pub id: i64,
        pub name: String,
        #[serde(default)]
        pub google_place_id: Option<String>,
        /// Canonical `"lat,lon"` with six decimals, when known.
        #[serde(default)]
        pub location: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        pub tags: Vec<String>,
        #[serde(default)]
        pub cost: Option<i64>,
        #[serde(default)]
        pub google_maps_url: Option<String>,
        #[serde(default)]
        pub website_url: Option<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        pub visits: Vec<Visit>,
    }

    impl Place {
        pub fn cost_label(&self) -> &'static str {
            cost_label(self.cost)
        }
    }

    /// Request body for `POST /places` and `PUT /places/{id}`.
    ///
    /// Absent fields are left out of the JSON entirely; the backend treats
    /// them as "not provided" rather than as empty values.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct PlacePayload {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub google_place_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub location: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub tags: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub cost: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub google_maps_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub website_url: Option<String>,
    }
}

pub mod visit {
    use super::*;

    use chrono::NaiveDate;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Visit {
        pub id: i64,
        pub visit_date: NaiveDate,
        /// 1..=5 when rated.
        #[serde(default)]
        pub rating: Option<u8>,
        #[serde(default)]
        pub notes: Option<String>,
    }

    /// Request body for `POST /places/{id}/visits` and `PUT /visits/{id}`.
    ///
    /// `rating` and `notes` are always sent, so `null` clears them on update.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct VisitPayload {
        pub visit_date: NaiveDate,
        #[serde(default)]
        pub rating: Option<u8>,
        #[serde(default)]
        pub notes: Option<String>,
    }
}

pub mod filter {
    use super::*;

    /// Criteria for `GET /places`. Lives only in client state.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Filters {
        pub text_search: Option<String>,
        /// Upper bound on the cost ordinal, `0..=3`.
        pub max_cost: Option<u8>,
        #[serde(default)]
        pub tags: Vec<String>,
        /// Origin for the radius filter, `"lat,lon"`.
        pub distance_from: Option<String>,
        pub radius_km: Option<f64>,
    }

    impl Filters {
        /// Criteria the place list starts with.
        pub fn initial() -> Self {
            Self {
                max_cost: Some(3),
                radius_km: Some(50.0),
                ..Self::default()
            }
        }
    }
}

pub mod tag {
    /// Trims and lowercases a tag; `None` when nothing is left.
    pub fn normalize(raw: &str) -> Option<String> {
        let tag = raw.trim().to_lowercase();
        (!tag.is_empty()).then_some(tag)
    }

    /// Normalizes every tag and drops empties and repeats, keeping the first
    /// occurrence's position.
    pub fn normalize_all<I, S>(tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for tag in tags {
            if let Some(tag) = normalize(tag.as_ref()) {
                if !out.contains(&tag) {
                    out.push(tag);
                }
            }
        }
        out
    }
}

pub mod geo {
    /// Parses `"lat,lon"` (optional signs, optional whitespace around the
    /// comma) and checks both coordinates are in range.
    pub fn parse_lat_lon(value: &str) -> Option<(f64, f64)> {
        let (lat, lon) = value.trim().split_once(',')?;
        let lat = parse_coordinate(lat.trim())?;
        let lon = parse_coordinate(lon.trim())?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some((lat, lon))
    }

    /// Canonical `"lat,lon"` rendering with six decimal places.
    pub fn format_lat_lon(lat: f64, lon: f64) -> String {
        format!("{lat:.6},{lon:.6}")
    }

    /// Re-renders a valid `"lat,lon"` string in canonical form.
    pub fn normalize_lat_lon(value: &str) -> Option<String> {
        parse_lat_lon(value).map(|(lat, lon)| format_lat_lon(lat, lon))
    }

    fn parse_coordinate(raw: &str) -> Option<f64> {
        let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
        if digits.is_empty()
            || !digits.chars().any(|c| c.is_ascii_digit())
            || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
            || digits.matches('.').count() > 1
            || digits.ends_with('.')
        {
            return None;
        }
        raw.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_labels_cover_the_four_ordinals() {
        let labels: Vec<_> = (0..4).map(|n| place::cost_label(Some(n))).collect();
        assert_eq!(labels, ["Free", "£", "££", "£££"]);
    }

    #[test]
    fn cost_label_marks_unknown_values() {
        assert_eq!(place::cost_label(None), place::UNKNOWN_COST);
        assert_eq!(place::cost_label(Some(4)), place::UNKNOWN_COST);
        assert_eq!(place::cost_label(Some(-1)), place::UNKNOWN_COST);
    }

    #[test]
    fn cost_ordinals_round_trip() {
        for cost in place::Cost::ALL {
            assert_eq!(
                place::Cost::from_ordinal(i64::from(cost.ordinal())),
                Some(cost)
            );
        }
    }

    #[test]
    fn place_decodes_null_collections_as_empty() {
        let raw = r#"{"id":1,"name":"Cafe","tags":null,"visits":null,"cost":null}"#;
        let place: place::Place = serde_json::from_str(raw).unwrap();
        assert!(place.tags.is_empty());
        assert!(place.visits.is_empty());
        assert_eq!(place.cost_label(), place::UNKNOWN_COST);
    }

    #[test]
    fn place_payload_omits_absent_fields() {
        let payload = place::PlacePayload {
            name: Some("Cafe X".to_string()),
            cost: Some(1),
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, serde_json::json!({"name": "Cafe X", "cost": 1}));
    }

    #[test]
    fn visit_payload_sends_null_rating() {
        let payload = visit::VisitPayload {
            visit_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            rating: None,
            notes: Some("Great".to_string()),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"visit_date": "2024-01-05", "rating": null, "notes": "Great"})
        );
    }

    #[test]
    fn tags_are_trimmed_lowercased_and_unique() {
        let tags = tag::normalize_all(["  Paris", "paris", "", "Museum ", "  "]);
        assert_eq!(tags, ["paris", "museum"]);
    }

    #[test]
    fn lat_lon_parsing_accepts_signed_decimals() {
        assert_eq!(geo::parse_lat_lon("51.5, -0.12"), Some((51.5, -0.12)));
        assert_eq!(geo::parse_lat_lon("+10,.5"), Some((10.0, 0.5)));
        assert_eq!(
            geo::normalize_lat_lon("51.5,-0.12").as_deref(),
            Some("51.500000,-0.120000")
        );
    }

    #[test]
    fn lat_lon_parsing_rejects_garbage_and_out_of_range() {
        for raw in ["", "51.5", "abc,def", "1e3,2", "inf,0", "91,0", "0,181", "1.,2"] {
            assert_eq!(geo::parse_lat_lon(raw), None, "{raw}");
        }
    }
}

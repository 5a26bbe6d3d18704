//! In-memory place and visit storage.

use std::collections::BTreeMap;

use api_types::{
    geo,
    place::{Place, PlacePayload},
    tag,
    visit::{Visit, VisitPayload},
};
use serde::Deserialize;

const EARTH_RADIUS_KM: f64 = 6371.0088;
const DEFAULT_RADIUS_KM: f64 = 50.0;
const MAX_TAGS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    BadQuery(String),
}

/// Query parameters accepted by `GET /places`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub text_search: Option<String>,
    pub max_cost: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub distance_from: Option<String>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_place_id: i64,
    next_visit_id: i64,
    places: BTreeMap<i64, Place>,
}

impl Store {
    pub fn create_place(&mut self, payload: PlacePayload) -> Result<Place, StoreError> {
        let name = payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| StoreError::Invalid("name is required".to_string()))?
            .to_string();

        let mut place = Place {
            id: self.next_place_id + 1,
            name,
            google_place_id: None,
            location: None,
            description: None,
            tags: Vec::new(),
            cost: None,
            google_maps_url: None,
            website_url: None,
            visits: Vec::new(),
        };
        apply_payload(&mut place, payload)?;
        self.next_place_id = place.id;
        self.places.insert(place.id, place.clone());
        tracing::debug!(id = place.id, "place created");
        Ok(place)
    }

    /// Places matching every given criterion, newest first.
    pub fn list_places(&self, query: &ListQuery) -> Result<Vec<Place>, StoreError> {
        if let Some(max_cost) = query.max_cost {
            if !(0..=3).contains(&max_cost) {
                return Err(StoreError::Invalid(
                    "max_cost must be between 0 and 3".to_string(),
                ));
            }
        }
        let radius_km = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
        if radius_km <= 0.0 {
            return Err(StoreError::Invalid("radius_km must be positive".to_string()));
        }
        let origin = match query.distance_from.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(geo::parse_lat_lon(raw).ok_or_else(|| {
                StoreError::BadQuery("distance_from must be 'lat,lon'".to_string())
            })?),
            None => None,
        };
        let text = query
            .text_search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let tags = query_tags(&query.tags);

        let places = self
            .places
            .values()
            .rev()
            .filter(|place| {
                text.as_deref().is_none_or(|text| {
                    place.name.to_lowercase().contains(text)
                        || place
                            .description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(text))
                })
            })
            .filter(|place| match (query.max_cost, place.cost) {
                (Some(max), Some(cost)) => cost <= max,
                _ => true,
            })
            .filter(|place| tags.is_empty() || place.tags.iter().any(|t| tags.contains(t)))
            .filter(|place| match origin {
                Some(origin) => place
                    .location
                    .as_deref()
                    .and_then(geo::parse_lat_lon)
                    .is_some_and(|point| haversine_km(origin, point) <= radius_km),
                None => true,
            })
            .cloned()
            .collect();
        Ok(places)
    }

    pub fn get_place(&self, id: i64) -> Result<Place, StoreError> {
        self.places
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("place"))
    }

    /// Applies only the fields present in `payload`.
    pub fn update_place(&mut self, id: i64, payload: PlacePayload) -> Result<Place, StoreError> {
        let place = self
            .places
            .get_mut(&id)
            .ok_or(StoreError::NotFound("place"))?;
        let mut updated = place.clone();
        if let Some(name) = payload.name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(StoreError::Invalid("name is required".to_string()));
            }
            updated.name = name.to_string();
        }
        apply_payload(&mut updated, payload)?;
        *place = updated.clone();
        Ok(updated)
    }

    pub fn delete_place(&mut self, id: i64) -> Result<(), StoreError> {
        self.places
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("place"))
    }

    pub fn add_visit(&mut self, place_id: i64, payload: VisitPayload) -> Result<Visit, StoreError> {
        validate_rating(payload.rating)?;
        let place = self
            .places
            .get_mut(&place_id)
            .ok_or(StoreError::NotFound("place"))?;
        self.next_visit_id += 1;
        let visit = Visit {
            id: self.next_visit_id,
            visit_date: payload.visit_date,
            rating: payload.rating,
            notes: payload.notes,
        };
        place.visits.push(visit.clone());
        Ok(visit)
    }

    pub fn update_visit(
        &mut self,
        visit_id: i64,
        payload: VisitPayload,
    ) -> Result<Visit, StoreError> {
        validate_rating(payload.rating)?;
        let visit = self
            .places
            .values_mut()
            .flat_map(|place| place.visits.iter_mut())
            .find(|visit| visit.id == visit_id)
            .ok_or(StoreError::NotFound("visit"))?;
        visit.visit_date = payload.visit_date;
        visit.rating = payload.rating;
        visit.notes = payload.notes;
        Ok(visit.clone())
    }

    pub fn delete_visit(&mut self, visit_id: i64) -> Result<(), StoreError> {
        for place in self.places.values_mut() {
            if let Some(pos) = place.visits.iter().position(|v| v.id == visit_id) {
                place.visits.remove(pos);
                return Ok(());
            }
        }
        Err(StoreError::NotFound("visit"))
    }

    /// Distinct tags in use, sorted, capped at ten.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .places
            .values()
            .flat_map(|place| place.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags.truncate(MAX_TAGS);
        tags
    }
}

fn apply_payload(place: &mut Place, payload: PlacePayload) -> Result<(), StoreError> {
    if let Some(cost) = payload.cost {
        if !(0..=3).contains(&cost) {
            return Err(StoreError::Invalid("cost must be between 0 and 3".to_string()));
        }
        place.cost = Some(cost);
    }
    if let Some(location) = payload.location {
        let location = location.trim();
        if !location.is_empty() {
            let normalized = geo::normalize_lat_lon(location)
                .ok_or_else(|| StoreError::Invalid("location must be 'lat,lon'".to_string()))?;
            place.location = Some(normalized);
        }
    }
    if let Some(url) = payload.google_maps_url {
        place.google_maps_url = Some(validate_url(url)?);
    }
    if let Some(url) = payload.website_url {
        place.website_url = Some(validate_url(url)?);
    }
    if let Some(tags) = payload.tags {
        place.tags = tag::normalize_all(tags);
    }
    if payload.description.is_some() {
        place.description = payload.description;
    }
    if payload.google_place_id.is_some() {
        place.google_place_id = payload.google_place_id;
    }
    Ok(())
}

fn validate_url(url: String) -> Result<String, StoreError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(StoreError::Invalid(format!("invalid url: {url}")))
    }
}

fn validate_rating(rating: Option<u8>) -> Result<(), StoreError> {
    match rating {
        Some(rating) if !(1..=5).contains(&rating) => Err(StoreError::Invalid(
            "rating must be between 1 and 5".to_string(),
        )),
        _ => Ok(()),
    }
}

/// A single comma-separated `tags` value is split, as older clients send it
/// that way.
fn query_tags(raw: &[String]) -> Vec<String> {
    match raw {
        [single] if single.contains(',') => tag::normalize_all(single.split(',')),
        _ => tag::normalize_all(raw),
    }
}

fn haversine_km((lat1, lon1): (f64, f64), (lat2, lon2): (f64, f64)) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> PlacePayload {
        PlacePayload {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn create_rejects_blank_name_and_bad_cost() {
        let mut store = Store::default();
        assert!(matches!(
            store.create_place(payload("  ")),
            Err(StoreError::Invalid(_))
        ));
        let mut bad = payload("Cafe");
        bad.cost = Some(4);
        assert!(matches!(store.create_place(bad), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn rejected_create_does_not_consume_an_id() {
        let mut store = Store::default();
        let mut bad = payload("Cafe");
        bad.cost = Some(9);
        assert!(store.create_place(bad).is_err());
        assert_eq!(store.create_place(payload("Cafe")).unwrap().id, 1);
        assert_eq!(store.create_place(payload("Bar")).unwrap().id, 2);
    }

    #[test]
    fn create_normalizes_location_and_tags() {
        let mut store = Store::default();
        let mut input = payload("Cafe");
        input.location = Some(" 51.5, -0.12 ".to_string());
        input.tags = Some(vec!["Coffee".to_string(), "coffee ".to_string()]);
        let place = store.create_place(input).unwrap();
        assert_eq!(place.location.as_deref(), Some("51.500000,-0.120000"));
        assert_eq!(place.tags, ["coffee"]);
    }

    #[test]
    fn list_filters_by_cost_keeping_unpriced_places() {
        let mut store = Store::default();
        let mut cheap = payload("Cheap");
        cheap.cost = Some(0);
        let mut pricey = payload("Pricey");
        pricey.cost = Some(3);
        store.create_place(cheap).unwrap();
        store.create_place(pricey).unwrap();
        store.create_place(payload("Unpriced")).unwrap();

        let query = ListQuery {
            max_cost: Some(1),
            ..Default::default()
        };
        let names: Vec<_> = store
            .list_places(&query)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Unpriced", "Cheap"]);
    }

    #[test]
    fn list_filters_by_radius() {
        let mut store = Store::default();
        let mut london = payload("London");
        london.location = Some("51.5074,-0.1278".to_string());
        let mut paris = payload("Paris");
        paris.location = Some("48.8566,2.3522".to_string());
        store.create_place(london).unwrap();
        store.create_place(paris).unwrap();

        let query = ListQuery {
            distance_from: Some("51.5,-0.1".to_string()),
            radius_km: Some(50.0),
            ..Default::default()
        };
        let places = store.list_places(&query).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "London");
    }

    #[test]
    fn list_rejects_malformed_origin() {
        let store = Store::default();
        let query = ListQuery {
            distance_from: Some("nowhere".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.list_places(&query),
            Err(StoreError::BadQuery(_))
        ));
    }

    #[test]
    fn comma_separated_tag_query_is_split() {
        assert_eq!(query_tags(&["a, B".to_string()]), ["a", "b"]);
    }

    #[test]
    fn update_keeps_fields_that_are_not_sent() {
        let mut store = Store::default();
        let mut input = payload("Cafe");
        input.description = Some("corner".to_string());
        let place = store.create_place(input).unwrap();

        let update = PlacePayload {
            cost: Some(2),
            ..Default::default()
        };
        let updated = store.update_place(place.id, update).unwrap();
        assert_eq!(updated.name, "Cafe");
        assert_eq!(updated.description.as_deref(), Some("corner"));
        assert_eq!(updated.cost, Some(2));
    }

    #[test]
    fn haversine_matches_known_distance() {
        let km = haversine_km((51.5074, -0.1278), (48.8566, 2.3522));
        assert!((km - 343.5).abs() < 2.0, "{km}");
    }
}

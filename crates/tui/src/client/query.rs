use api_types::filter::Filters;
use reqwest::Url;

/// Flattens filters into query parameters.
///
/// Absent and empty values are skipped; every tag becomes its own `tags`
/// parameter.
pub fn filter_pairs(filters: &Filters) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(text) = filters.text_search.as_deref().filter(|s| !s.is_empty()) {
        pairs.push(("text_search", text.to_string()));
    }
    if let Some(max_cost) = filters.max_cost {
        pairs.push(("max_cost", max_cost.to_string()));
    }
    pairs.extend(
        filters
            .tags
            .iter()
            .filter(|tag| !tag.is_empty())
            .map(|tag| ("tags", tag.clone())),
    );
    if let Some(origin) = filters.distance_from.as_deref().filter(|s| !s.is_empty()) {
        pairs.push(("distance_from", origin.to_string()));
    }
    if let Some(radius) = filters.radius_km {
        pairs.push(("radius_km", radius.to_string()));
    }
    pairs
}

/// Appends the pairs to `url`, leaving it without a `?` when there are none.
pub fn append_pairs(url: &mut Url, pairs: &[(&str, String)]) {
    if pairs.is_empty() {
        return;
    }
    let mut query = url.query_pairs_mut();
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
}

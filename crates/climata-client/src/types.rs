//! City entity and climate API wire types.

use serde::{Deserialize, Serialize};

/// A located place, as reported by the climate service.
///
/// Built only by mapping API responses; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    /// Administrative region the city belongs to.
    pub admin: String,
    /// Stable identifier assigned by the remote service.
    pub id: i64,
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.name, self.admin)
    }
}

// API Response Types

/// One feature from a city listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct CityFeature {
    pub id: i64,
    pub properties: CityProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityProperties {
    pub name: String,
    pub admin: String,
}

impl From<CityFeature> for City {
    fn from(feature: CityFeature) -> Self {
        Self {
            name: feature.properties.name,
            admin: feature.properties.admin,
            id: feature.id,
        }
    }
}

/// One page of the paginated `/city` listing.
///
/// Only the presence of `next` matters for pagination; its shape is
/// opaque to us.
#[derive(Debug, Deserialize)]
pub struct CityPage {
    #[serde(default)]
    pub features: Vec<CityFeature>,
    #[serde(default)]
    pub next: Option<serde_json::Value>,
}

/// Response of `/city/nearest`.
#[derive(Debug, Deserialize)]
pub struct NearestCityResponse {
    pub count: u64,
    #[serde(default)]
    pub features: Vec<CityFeature>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_city_display() {
        let city = City {
            name: "Vancouver".to_string(),
            admin: "British Columbia".to_string(),
            id: 7,
        };
        assert_eq!(city.to_string(), "Vancouver, British Columbia");
    }

    #[test]
    fn test_city_from_feature() {
        let feature: CityFeature = serde_json::from_value(serde_json::json!({
            "id": 12,
            "properties": {"name": "Lima", "admin": "Lima"}
        }))
        .unwrap();

        let city = City::from(feature);
        assert_eq!(city, City { name: "Lima".to_string(), admin: "Lima".to_string(), id: 12 });
    }

    #[test]
    fn test_city_page_with_next() {
        let page: CityPage = serde_json::from_value(serde_json::json!({
            "features": [{"id": 1, "properties": {"name": "A", "admin": "B"}}],
            "next": "https://example.com/api/city?page=2"
        }))
        .unwrap();

        assert_eq!(page.features.len(), 1);
        assert!(page.next.is_some());
    }

    #[test]
    fn test_city_page_last_page() {
        // Both an absent and a null `next` mean there is no further page.
        let absent: CityPage =
            serde_json::from_value(serde_json::json!({"features": []})).unwrap();
        let null: CityPage =
            serde_json::from_value(serde_json::json!({"features": [], "next": null})).unwrap();

        assert!(absent.next.is_none());
        assert!(null.next.is_none());
    }
}

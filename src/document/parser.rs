use log::warn;
use serde_json::Value;

use crate::error::Result;

/// A scraped restaurant before classification and scoring.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRestaurant {
    pub name: String,
    pub url: String,
    pub rating: Option<f64>,
    pub review_count: u32,
    pub reviews: Vec<String>,
}

const MAX_RATING: f64 = 5.0;

/// Parses a JSON array of scraped records.
///
/// Only a non-array top level is an error. Entries that are not objects or carry no
/// name are skipped; every other malformed field falls back to a default.
pub fn parse_restaurants(content: &str) -> Result<Vec<RawRestaurant>> {
    let entries: Vec<Value> = serde_json::from_str(content)?;
    let total = entries.len();

    let restaurants: Vec<RawRestaurant> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let parsed = parse_entry(entry);
            if parsed.is_none() {
                warn!("Skipping corpus entry {}: not a restaurant record", i);
            }
            parsed
        })
        .collect();

    if restaurants.len() < total {
        warn!("Skipped {} of {} corpus entries", total - restaurants.len(), total);
    }
    Ok(restaurants)
}

fn parse_entry(entry: &Value) -> Option<RawRestaurant> {
    let object = entry.as_object()?;

    let name = field(object, &["name", "restaurant_name"])
        .and_then(Value::as_str)
        .map(clean_name)
        .filter(|name| !name.is_empty())?;

    let url = field(object, &["url", "link"])
        .and_then(Value::as_str)
        .map(|url| url.trim().to_string())
        .unwrap_or_default();

    let reviews: Vec<String> = match field(object, &["reviews", "comments"]) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|review| !review.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let rating = field(object, &["rating"]).and_then(parse_rating);

    let review_count = match field(object, &["review_count"]) {
        Some(value) => parse_count(value),
        None => reviews.len() as u32,
    };

    Some(RawRestaurant {
        name,
        url,
        rating,
        review_count,
        reviews,
    })
}

fn field<'a>(object: &'a serde_json::Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| object.get(*name))
        .filter(|value| !value.is_null())
}

/// Strips leading list numbering: `"77. Kervan Bistro"` becomes `"Kervan Bistro"`.
pub fn clean_name(name: &str) -> String {
    let name = name.trim();
    match name.split_once('.') {
        Some((prefix, rest)) => {
            let prefix = prefix.trim();
            if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
                rest.trim().to_string()
            } else {
                name.to_string()
            }
        }
        None => name.to_string(),
    }
}

/// Accepts numbers and strings with either decimal separator (`"4,5"`).
pub fn parse_rating(value: &Value) -> Option<f64> {
    let rating = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        _ => return None,
    };
    (rating.is_finite() && (0.0..=MAX_RATING).contains(&rating)).then_some(rating)
}

fn parse_count(value: &Value) -> u32 {
    let count = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    count.map(|c| c.min(u32::MAX as u64) as u32).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_scraper_field_names() {
        let content = json!([{
            "restaurant_name": "12. Mado",
            "rating": "4,5",
            "url": "https://example.com/mado",
            "review_count": 2,
            "comments": ["Dondurma harika", "  "],
            "scraped_at": null
        }])
        .to_string();

        let parsed = parse_restaurants(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        let mado = &parsed[0];
        assert_eq!(mado.name, "Mado");
        assert_eq!(mado.rating, Some(4.5));
        assert_eq!(mado.review_count, 2);
        assert_eq!(mado.reviews, vec!["Dondurma harika".to_string()]);
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let content = json!([
            {"name": "Kervan Bistro", "url": "u1", "rating": null, "reviews": "not a list"},
            {"name": "Akdo", "url": "u2", "rating": "yok", "review_count": -3, "reviews": [1, "iyi"]},
            {"scraped_at": "2024-01-01"},
            "garbage"
        ])
        .to_string();

        let parsed = parse_restaurants(&content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].rating, None);
        assert!(parsed[0].reviews.is_empty());
        assert_eq!(parsed[0].review_count, 0);
        assert_eq!(parsed[1].rating, None);
        assert_eq!(parsed[1].review_count, 0);
        assert_eq!(parsed[1].reviews, vec!["iyi".to_string()]);
    }

    #[test]
    fn test_non_array_is_an_error() {
        assert!(matches!(parse_restaurants("{\"name\": \"x\"}"), Err(Error::Json(_))));
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("77. Kervan Bistro"), "Kervan Bistro");
        assert_eq!(clean_name("Dr. Burger"), "Dr. Burger");
        assert_eq!(clean_name("Simit Sarayı"), "Simit Sarayı");
    }

    #[test]
    fn test_rating_range() {
        assert_eq!(parse_rating(&json!(3)), Some(3.0));
        assert_eq!(parse_rating(&json!("5.0")), Some(5.0));
        assert_eq!(parse_rating(&json!(7.5)), None);
        assert_eq!(parse_rating(&json!(true)), None);
    }
}

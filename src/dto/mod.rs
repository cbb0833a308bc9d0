use serde::{Deserialize, Deserializer};

pub mod auth;
pub mod categories;
pub mod products;
pub mod promotions;

/// Keeps an explicit `null` distinct from an absent field in partial updates:
/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Splits a comma-separated query value, dropping empty entries.
pub fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn default_true() -> bool {
    true
}

/// Page-number pagination as received on the query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    /// Returns `(page, limit, offset)` with page at least 1 and limit in 1..=100.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * limit;
        (page, limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        image: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_absent_from_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"image": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"image": "https://x.io/a.png"}"#).unwrap();
        assert_eq!(absent.image, None);
        assert_eq!(null.image, Some(None));
        assert_eq!(set.image, Some(Some("https://x.io/a.png".into())));
    }

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 10, 0));
        let p = Pagination { page: Some(3), limit: Some(500) };
        assert_eq!(p.normalize(), (3, 100, 200));
        let p = Pagination { page: Some(-2), limit: Some(0) };
        assert_eq!(p.normalize(), (1, 1, 0));
    }

    #[test]
    fn csv_values_are_trimmed() {
        assert_eq!(split_csv(Some("psn, xbox,,steam")), vec!["psn", "xbox", "steam"]);
        assert!(split_csv(None).is_empty());
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// Query string parameters. Keys are matched exactly.
#[derive(Debug, Default)]
pub struct QueryParams {
    map: HashMap<String, String>,
}

impl<'de> Deserialize<'de> for QueryParams {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = HashMap::<String, String>::deserialize(deserializer)?;
        Ok(QueryParams { map })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        QueryParams {
            map: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl QueryParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|x| x.as_str())
    }

    /// Like `get`, but treats an empty value as absent. Whitespace counts
    /// as a value.
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_case_sensitive() {
        let params: QueryParams = [("ProductId", "42"), ("type", "related")]
            .into_iter()
            .collect();
        assert_eq!(params.get("type"), Some("related"));
        assert_eq!(params.get("productId"), None);
        assert_eq!(params.get("ProductId"), Some("42"));
        assert_eq!(params.get("Type"), None);
    }

    #[test]
    fn test_get_nonempty() {
        let params: QueryParams = [("query", ""), ("category", "  "), ("limit", "5")]
            .into_iter()
            .collect();
        assert_eq!(params.get("query"), Some(""));
        assert_eq!(params.get_nonempty("query"), None);
        assert_eq!(params.get_nonempty("category"), Some("  "));
        assert_eq!(params.get_nonempty("limit"), Some("5"));
        assert_eq!(params.get_nonempty("missing"), None);
    }
}

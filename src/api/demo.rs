use serde::Deserialize;

use super::types::Product;
use crate::engine::{RecommendationRequest, RecommendationType};

const BUILTIN_CATALOG: &str = include_str!("../../data/demo_catalog.yaml");

/// Canned product groups used when recommendations are served without
/// the external engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoCatalog {
    #[serde(default)]
    pub popular: Vec<Product>,
    #[serde(default)]
    pub related: Vec<Product>,
    #[serde(default)]
    pub search: Vec<Product>,
}

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("Failed to read demo catalog {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse demo catalog {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}

impl DemoCatalog {
    pub fn builtin() -> Result<Self, DemoError> {
        serde_yaml::from_str(BUILTIN_CATALOG)
            .map_err(|e| DemoError::ParseError("<builtin>".to_string(), e))
    }

    pub fn from_file(path: &str) -> Result<Self, DemoError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DemoError::ReadError(path.to_string(), e))?;
        serde_yaml::from_str(&content).map_err(|e| DemoError::ParseError(path.to_string(), e))
    }

    /// Load `path` if given, otherwise the catalog compiled into the binary.
    pub fn load(path: Option<&str>) -> Result<Self, DemoError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    pub fn recommend(&self, req: &RecommendationRequest) -> Vec<Product> {
        let limit = req.limit as usize;

        match req.kind {
            RecommendationType::Popular => first_n(&self.popular, limit),
            RecommendationType::Related => first_n(&self.related, limit),
            RecommendationType::Search => {
                let query = req.query.as_deref().unwrap_or_default().to_lowercase();
                if mentions_brand(&self.search, &query).is_some() {
                    first_n(&self.search, limit)
                } else if let Some(brand) = mentions_brand(&self.popular, &query) {
                    self.popular
                        .iter()
                        .filter(|p| p.brand.eq_ignore_ascii_case(brand))
                        .take(limit)
                        .cloned()
                        .collect()
                } else {
                    first_n(&self.popular, limit)
                }
            }
            RecommendationType::Category => match req.category.as_deref() {
                Some(category) => {
                    let category = category.to_lowercase();
                    self.popular
                        .iter()
                        .filter(|p| p.category.to_lowercase().contains(&category))
                        .take(limit)
                        .cloned()
                        .collect()
                }
                None => first_n(&self.popular, limit),
            },
        }
    }
}

fn first_n(items: &[Product], limit: usize) -> Vec<Product> {
    items.iter().take(limit).cloned().collect()
}

/// First brand in `items` that appears in the (lowercased) query.
fn mentions_brand<'a>(items: &'a [Product], query: &str) -> Option<&'a str> {
    if query.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|p| p.brand.as_str())
        .find(|brand| !brand.is_empty() && query.contains(&brand.to_lowercase()))
}

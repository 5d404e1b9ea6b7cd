use serde::{Deserialize, Serialize};

use crate::engine::RecommendationType;

/// One product as served by the demo catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: u64,
    pub rating: String,
    pub features: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_ratings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoResponse {
    pub success: bool,
    pub data: Vec<Product>,
    pub source: &'static str,
    pub note: &'static str,
    pub algorithm: RecommendationType,
    pub count: usize,
}

impl DemoResponse {
    pub fn new(algorithm: RecommendationType, data: Vec<Product>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            source: "demo",
            note: "Using demo data - the recommendation engine is not in use",
            algorithm,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

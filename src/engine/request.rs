use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::util::QueryParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Popular,
    Related,
    Category,
    Search,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Popular => "popular",
            RecommendationType::Related => "related",
            RecommendationType::Category => "category",
            RecommendationType::Search => "search",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationType {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(RecommendationType::Popular),
            "related" => Ok(RecommendationType::Related),
            "category" => Ok(RecommendationType::Category),
            "search" => Ok(RecommendationType::Search),
            _ => Err(RequestError::InvalidType),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid or missing type parameter")]
    InvalidType,
}

/// A validated recommendation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub kind: RecommendationType,
    pub product_id: Option<String>,
    pub category: Option<String>,
    pub query: Option<String>,
    pub limit: u32,
}

impl RecommendationRequest {
    pub fn new(kind: RecommendationType, limit: u32) -> Self {
        Self {
            kind,
            product_id: None,
            category: None,
            query: None,
            limit,
        }
    }

    /// Validate query parameters. Fails only on a missing or unknown `type`.
    /// `limit` uses its leading digits (`5abc` is 5); without any it falls
    /// back to `default_limit`.
    pub fn from_query(params: &QueryParams, default_limit: u32) -> Result<Self, RequestError> {
        let kind = params
            .get("type")
            .ok_or(RequestError::InvalidType)?
            .parse::<RecommendationType>()?;

        let limit = match params.get_nonempty("limit") {
            Some(raw) => leading_number(raw).unwrap_or_else(|| {
                tracing::debug!(limit = raw, "unparseable limit, using default");
                default_limit
            }),
            None => default_limit,
        };

        let owned = |key: &str| params.get_nonempty(key).map(|v| v.to_string());

        Ok(Self {
            kind,
            product_id: owned("productId"),
            category: owned("category"),
            query: owned("query"),
            limit,
        })
    }
}

fn leading_number(raw: &str) -> Option<u32> {
    let raw = raw.trim_start();
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}

/// Command-line arguments for one engine run, derived from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    args: Vec<String>,
}

impl Invocation {
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl From<&RecommendationRequest> for Invocation {
    fn from(req: &RecommendationRequest) -> Self {
        let mut args = vec![
            "--type".to_string(),
            req.kind.as_str().to_string(),
            "--limit".to_string(),
            req.limit.to_string(),
        ];

        let optional = [
            ("--product-id", &req.product_id),
            ("--category", &req.category),
            ("--query", &req.query),
        ];
        for (flag, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                args.push(flag.to_string());
                args.push(value.to_string());
            }
        }

        Invocation { args }
    }
}

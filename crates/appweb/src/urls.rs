//! Outbound URL building for named endpoints.
//!
//! Endpoints are registered with the same axum path patterns the routers use
//! (`/{lang}/download/{file_id}`). When a pattern declares `{lang}` and the
//! caller did not pass one, the active locale of the current request is
//! injected so generated links keep the visitor's language.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

/// Name of the route capture carrying the locale.
pub const LANG_PARAM: &str = "lang";

/// Errors building a URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlBuildError {
    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    #[error("endpoint '{endpoint}' requires a value for '{param}'")]
    MissingValue { endpoint: String, param: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

#[derive(Debug, Clone)]
struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => match name.strip_prefix('*') {
                    Some(name) => Segment::Wildcard(name.to_string()),
                    None => Segment::Param(name.to_string()),
                },
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    fn expects(&self, param: &str) -> bool {
        self.segments.iter().any(|s| match s {
            Segment::Param(name) | Segment::Wildcard(name) => name == param,
            Segment::Literal(_) => false,
        })
    }
}

/// Registry of named endpoints and their path patterns.
#[derive(Debug, Clone, Default)]
pub struct UrlMap {
    endpoints: HashMap<String, Pattern>,
}

impl UrlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint. Re-registering a name replaces its pattern.
    pub fn register(&mut self, endpoint: &str, pattern: &str) {
        self.endpoints
            .insert(endpoint.to_string(), Pattern::parse(pattern));
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.endpoints.contains_key(endpoint)
    }

    /// Whether `endpoint` declares the route parameter `param`.
    pub fn is_endpoint_expecting(&self, endpoint: &str, param: &str) -> bool {
        self.endpoints
            .get(endpoint)
            .is_some_and(|pattern| pattern.expects(param))
    }

    /// Build the path for `endpoint`.
    ///
    /// `lang` is filled from `locale` when the endpoint expects it and the
    /// caller did not supply it. Values not consumed by the pattern become
    /// the query string, in key order.
    pub fn url_for(
        &self,
        endpoint: &str,
        mut values: BTreeMap<String, String>,
        locale: &str,
    ) -> Result<String, UrlBuildError> {
        let pattern = self
            .endpoints
            .get(endpoint)
            .ok_or_else(|| UrlBuildError::UnknownEndpoint(endpoint.to_string()))?;

        if !values.contains_key(LANG_PARAM) && pattern.expects(LANG_PARAM) {
            values.insert(LANG_PARAM.to_string(), locale.to_string());
        }

        let mut path = String::new();
        for segment in &pattern.segments {
            path.push('/');
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Param(name) | Segment::Wildcard(name) => {
                    let value =
                        values
                            .remove(name)
                            .ok_or_else(|| UrlBuildError::MissingValue {
                                endpoint: endpoint.to_string(),
                                param: name.clone(),
                            })?;
                    if matches!(segment, Segment::Wildcard(_)) {
                        let parts: Vec<_> = value
                            .split('/')
                            .map(|p| urlencoding::encode(p).into_owned())
                            .collect();
                        path.push_str(&parts.join("/"));
                    } else {
                        path.push_str(&urlencoding::encode(&value));
                    }
                }
            }
        }

        if path.is_empty() {
            path.push('/');
        }

        if !values.is_empty() {
            let query: Vec<_> = values
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            path.push('?');
            path.push_str(&query.join("&"));
        }

        Ok(path)
    }
}

//! Wikipedia search resolver
//!
//! One MediaWiki action API request per attempt: a title search limited to
//! the top hit, joined with the page's canonical URL.

use super::{Reference, ReferenceResolver, ResolveFailure};
use crate::config::ResolverSettings;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

/// Resolver backed by the MediaWiki search index
pub struct WikipediaResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl WikipediaResolver {
    pub fn new(settings: &ResolverSettings) -> Result<Self, ResolveFailure> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| ResolveFailure::Malformed(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
        })
    }
}

#[async_trait]
impl ReferenceResolver for WikipediaResolver {
    async fn resolve(&self, mention: &str) -> Result<Reference, ResolveFailure> {
        let query = mention.trim();
        if query.is_empty() {
            return Err(ResolveFailure::Malformed("empty search query".into()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", "1"),
                ("prop", "info"),
                ("inprop", "url"),
                ("redirects", "1"),
                ("maxlag", "5"),
            ])
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let body: Value = response.json().await.map_err(classify_transport_error)?;
        parse_search_response(&body)
    }

    fn name(&self) -> &str {
        "wikipedia"
    }
}

fn classify_transport_error(error: reqwest::Error) -> ResolveFailure {
    if error.is_decode() {
        ResolveFailure::Malformed(format!("undecodable response: {}", error))
    } else if error.is_builder() {
        ResolveFailure::Malformed(format!("invalid request: {}", error))
    } else {
        // timeouts, refused connections, resets
        ResolveFailure::Transient(error.to_string())
    }
}

pub(crate) fn classify_status(status: StatusCode) -> ResolveFailure {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        ResolveFailure::Transient(format!("HTTP {}", status))
    } else {
        ResolveFailure::Malformed(format!("HTTP {}", status))
    }
}

/// Pick the canonical URL of the first search hit
pub(crate) fn parse_search_response(body: &Value) -> Result<Reference, ResolveFailure> {
    if let Some(error) = body.get("error") {
        let code = error.get("code").and_then(Value::as_str).unwrap_or("unknown");
        let info = error.get("info").and_then(Value::as_str).unwrap_or("");
        return Err(match code {
            "maxlag" | "ratelimited" | "readonly" => {
                ResolveFailure::Transient(format!("{}: {}", code, info))
            }
            _ => ResolveFailure::Malformed(format!("{}: {}", code, info)),
        });
    }

    let first_page = match body.pointer("/query/pages") {
        None => return Err(ResolveFailure::NotFound),
        Some(Value::Array(pages)) => pages
            .iter()
            .min_by_key(|page| page.get("index").and_then(Value::as_u64).unwrap_or(u64::MAX)),
        Some(_) => {
            return Err(ResolveFailure::Malformed(
                "query.pages is not an array".into(),
            ))
        }
    };

    let page = first_page.ok_or(ResolveFailure::NotFound)?;
    if page.get("missing").and_then(Value::as_bool).unwrap_or(false) {
        return Err(ResolveFailure::NotFound);
    }

    let url = page
        .get("fullurl")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ResolveFailure::Malformed("search hit without fullurl".into()))?;

    Ok(Reference::new(escape_markup_delimiters(url)))
}

/// Percent-encode parentheses so the URL can sit inside `[..](..)` markup
fn escape_markup_delimiters(url: &str) -> String {
    url.replace('(', "%28").replace(')', "%29")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_hit_wins() {
        let body = json!({
            "batchcomplete": true,
            "query": {
                "pages": [
                    {"pageid": 2, "title": "Printing press", "index": 2,
                     "fullurl": "https://en.wikipedia.org/wiki/Printing_press"},
                    {"pageid": 1, "title": "Movable type", "index": 1,
                     "fullurl": "https://en.wikipedia.org/wiki/Movable_type"}
                ]
            }
        });

        let reference = parse_search_response(&body).unwrap();
        assert_eq!(reference.as_str(), "https://en.wikipedia.org/wiki/Movable_type");
    }

    #[test]
    fn test_no_hits_is_not_found() {
        let body = json!({"batchcomplete": true});
        assert_eq!(parse_search_response(&body), Err(ResolveFailure::NotFound));

        let body = json!({"query": {"pages": []}});
        assert_eq!(parse_search_response(&body), Err(ResolveFailure::NotFound));

        let body = json!({"query": {"pages": [{"title": "Nope", "missing": true}]}});
        assert_eq!(parse_search_response(&body), Err(ResolveFailure::NotFound));
    }

    #[test]
    fn test_api_errors() {
        let lagged = json!({"error": {"code": "maxlag", "info": "Waiting for a database server"}});
        assert!(parse_search_response(&lagged).unwrap_err().is_transient());

        let bad = json!({"error": {"code": "invalidparammix", "info": "nope"}});
        assert!(matches!(
            parse_search_response(&bad),
            Err(ResolveFailure::Malformed(_))
        ));
    }

    #[test]
    fn test_parentheses_are_escaped() {
        let body = json!({
            "query": {"pages": [{"index": 1,
                "fullurl": "https://en.wikipedia.org/wiki/Mercury_(planet)"}]}
        });
        let reference = parse_search_response(&body).unwrap();
        assert_eq!(
            reference.as_str(),
            "https://en.wikipedia.org/wiki/Mercury_%28planet%29"
        );
    }

    #[test]
    fn test_status_classification() {
        assert!(classify_status(StatusCode::SERVICE_UNAVAILABLE).is_transient());
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(!classify_status(StatusCode::BAD_REQUEST).is_transient());
        assert!(!classify_status(StatusCode::FORBIDDEN).is_transient());
    }

    #[tokio::test]
    async fn test_blank_mention_skips_request() {
        let settings = ResolverSettings {
            // unroutable on purpose: the request must never be sent
            endpoint: "http://127.0.0.1:9/api.php".to_string(),
            user_agent: "enlink-test".to_string(),
            request_timeout: std::time::Duration::from_millis(50),
            max_concurrent: 1,
        };
        let resolver = WikipediaResolver::new(&settings).unwrap();
        assert!(matches!(
            resolver.resolve("   ").await,
            Err(ResolveFailure::Malformed(_))
        ));
    }
}

//! Values picked out of a JSON document served over HTTP

use async_trait::async_trait;
use marquee_config::ConfigMap;
use marquee_plugin::{Content, Source, SourceError, SourceResult};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::parse_settings;

#[derive(Debug, Clone, Deserialize)]
struct Settings {
    #[serde(default)]
    url: Option<String>,

    /// Label -> JSON pointer into the response body
    #[serde(default)]
    fields: BTreeMap<String, String>,

    #[serde(default)]
    title: Option<String>,
}

/// Fetches a JSON document and renders one `label: value` line per field
///
/// Fields whose pointer resolves to `null` are left out; when none remain the
/// source has nothing to render.
pub struct HttpJsonSource {
    id: String,
    settings: SourceResult<Settings>,
    client: reqwest::Client,
}

impl HttpJsonSource {
    pub const TYPE: &'static str = "http_json";

    pub fn new(id: &str, config: &ConfigMap) -> Self {
        Self {
            id: id.to_string(),
            settings: parse_settings(config),
            client: reqwest::Client::new(),
        }
    }

    fn settings(&self) -> SourceResult<(&Settings, Url)> {
        let settings = self.settings.as_ref().map_err(Clone::clone)?;

        let url = match settings.url.as_deref().map(str::trim) {
            None | Some("") => return Err(SourceError::invalid_field("url", "is required")),
            Some(raw) => Url::parse(raw)
                .map_err(|e| SourceError::invalid_field("url", format!("invalid URL: {}", e)))?,
        };
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SourceError::invalid_field(
                "url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if settings.fields.is_empty() {
            return Err(SourceError::invalid_field("fields", "must map at least one label"));
        }
        let bad: Vec<String> = settings
            .fields
            .iter()
            .filter(|(_, pointer)| !pointer.is_empty() && !pointer.starts_with('/'))
            .map(|(label, _)| format!("fields.{}", label))
            .collect();
        if !bad.is_empty() {
            return Err(SourceError::Validation {
                fields: bad,
                message: "JSON pointers must be empty or start with '/'".to_string(),
            });
        }

        Ok((settings, url))
    }

    async fn fetch_document(&self, url: Url) -> SourceResult<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::fetch(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::fetch(format!("upstream returned HTTP {}", status.as_u16())));
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::fetch(format!("invalid JSON body: {}", e)))
    }
}

#[async_trait]
impl Source for HttpJsonSource {
    fn validate_config(&self) -> SourceResult<()> {
        self.settings().map(|_| ())
    }

    async fn fetch_data(&self) -> SourceResult<Option<Content>> {
        let (settings, url) = self.settings()?;
        let document = self.fetch_document(url).await?;

        let mut lines = Vec::new();
        for (label, pointer) in &settings.fields {
            let value = document.pointer(pointer).ok_or_else(|| {
                SourceError::fetch(format!("field '{}' not found at '{}'", label, pointer))
            })?;
            match value {
                Value::Null => continue,
                Value::String(text) => lines.push(format!("{}: {}", label, text)),
                other => lines.push(format!("{}: {}", label, other)),
            }
        }

        if lines.is_empty() {
            tracing::debug!(source_id = %self.id, "All configured fields are null");
            return Ok(None);
        }

        if let Some(title) = &settings.title {
            lines.insert(0, title.clone());
        }
        Ok(Some(Content::new(lines, self.id.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(config: Value) -> HttpJsonSource {
        HttpJsonSource::new("ferry", config.as_object().unwrap())
    }

    #[tokio::test]
    async fn test_fields_rendered_in_label_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "vessel": {"name": "Kalakala", "eta_minutes": 12},
                "delayed": false
            })))
            .mount(&server)
            .await;

        let source = source(json!({
            "url": format!("{}/status", server.uri()),
            "title": "Ferry",
            "fields": {"eta": "/vessel/eta_minutes", "boat": "/vessel/name", "delayed": "/delayed"}
        }));

        assert!(source.validate_config().is_ok());
        let content = source.fetch_data().await.unwrap().unwrap();
        assert_eq!(
            content.lines,
            vec!["Ferry", "boat: Kalakala", "delayed: false", "eta: 12"]
        );
    }

    #[tokio::test]
    async fn test_all_null_means_nothing_to_render() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"next": null})))
            .mount(&server)
            .await;

        let source = source(json!({"url": server.uri(), "fields": {"next": "/next"}}));
        assert_eq!(source.fetch_data().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upstream_errors_are_fetch_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = source(json!({"url": server.uri(), "fields": {"eta": "/eta"}}));
        let err = source.fetch_data().await.unwrap_err();
        assert_eq!(err, SourceError::fetch("upstream returned HTTP 503"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_pointer_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"other": 1})))
            .mount(&server)
            .await;

        let source = source(json!({"url": server.uri(), "fields": {"eta": "/eta"}}));
        assert!(matches!(
            source.fetch_data().await,
            Err(SourceError::Fetch(ref message)) if message.contains("'eta'")
        ));
    }

    #[test]
    fn test_config_errors_name_fields() {
        let missing_url = source(json!({"fields": {"eta": "/eta"}}));
        assert_eq!(
            missing_url.validate_config().unwrap_err(),
            SourceError::invalid_field("url", "is required")
        );

        let bad_scheme = source(json!({"url": "ftp://example.com", "fields": {"eta": "/eta"}}));
        assert!(matches!(
            bad_scheme.validate_config(),
            Err(SourceError::Validation { ref fields, .. }) if fields == &["url"]
        ));

        let no_fields = source(json!({"url": "http://example.com"}));
        assert!(matches!(
            no_fields.validate_config(),
            Err(SourceError::Validation { ref fields, .. }) if fields == &["fields"]
        ));

        let bad_pointer = source(json!({"url": "http://example.com", "fields": {"eta": "eta"}}));
        assert!(matches!(
            bad_pointer.validate_config(),
            Err(SourceError::Validation { ref fields, .. }) if fields == &["fields.eta"]
        ));
    }
}

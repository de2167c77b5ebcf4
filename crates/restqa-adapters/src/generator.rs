//! curl-to-scenario collaborator.
//!
//! The conversion itself belongs to the scenario generator; this module only
//! fixes the seam ([`ScenarioGenerator`]) and ships a small curl-driven
//! implementation so `restqa init` and `POST /generate` work out of the box.

use async_trait::async_trait;
use restqa_error::{RestqaError, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Upper bound for one network fetch made on behalf of a scenario.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait ScenarioGenerator: Send + Sync {
    /// Turn a curl argv (`curl` first) into Given/When/Then steps.
    async fn generate(&self, args: &[String]) -> Result<String>;
}

#[async_trait]
impl<T: ScenarioGenerator + ?Sized> ScenarioGenerator for Arc<T> {
    async fn generate(&self, args: &[String]) -> Result<String> {
        (**self).generate(args).await
    }
}

/// Split a shell-style command line, honoring single and double quotes.
pub fn split_command(cmd: &str) -> Result<Vec<String>> {
    shell_words::split(cmd)
        .map_err(|e| RestqaError::InvalidRequest(format!("invalid command: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurlRequest {
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl CurlRequest {
    /// Understands `-X/--request`, `-H/--header`, `-d/--data*` and the URL.
    /// Other flags are accepted and ignored.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut iter = args.iter().map(String::as_str);
        if iter.next() != Some("curl") {
            return Err(RestqaError::InvalidRequest(
                "the command must start with `curl`".into(),
            ));
        }

        let mut method = None;
        let mut headers = Vec::new();
        let mut body = None;
        let mut url = None;

        while let Some(arg) = iter.next() {
            match arg {
                "-X" | "--request" => {
                    method = Some(value_for(arg, iter.next())?.to_ascii_uppercase());
                }
                "-H" | "--header" => {
                    let raw = value_for(arg, iter.next())?;
                    let (k, v) = raw.split_once(':').ok_or_else(|| {
                        RestqaError::InvalidRequest(format!("invalid header `{raw}`"))
                    })?;
                    headers.push((k.trim().to_string(), v.trim().to_string()));
                }
                "-d" | "--data" | "--data-raw" | "--data-binary" => {
                    body = Some(value_for(arg, iter.next())?.to_string());
                }
                a if a.starts_with("-X") && a.len() > 2 => {
                    method = Some(a[2..].to_ascii_uppercase());
                }
                a if a.starts_with('-') => {}
                a if url.is_none() => url = Some(parse_url(a)?),
                _ => {}
            }
        }

        let url = url.ok_or_else(|| RestqaError::InvalidRequest("no url in command".into()))?;
        let method = method.unwrap_or_else(|| {
            if body.is_some() { "POST" } else { "GET" }.to_string()
        });

        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }
}

fn value_for<'a>(flag: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| RestqaError::InvalidRequest(format!("`{flag}` expects a value")))
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw)
        .or_else(|_| Url::parse(&format!("http://{raw}")))
        .map_err(|e| RestqaError::InvalidRequest(format!("invalid url `{raw}`: {e}")))
}

/// Issues the request with reqwest and describes what came back.
#[derive(Debug, Clone)]
pub struct CurlScenarioGenerator {
    client: reqwest::Client,
}

impl CurlScenarioGenerator {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RestqaError::Collaborator(format!("http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ScenarioGenerator for CurlScenarioGenerator {
    async fn generate(&self, args: &[String]) -> Result<String> {
        let req = CurlRequest::parse(args)?;
        let method = reqwest::Method::from_bytes(req.method.as_bytes())
            .map_err(|_| RestqaError::InvalidRequest(format!("invalid method `{}`", req.method)))?;

        let mut builder = self.client.request(method, req.url.clone());
        for (k, v) in &req.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        if let Some(b) = &req.body {
            builder = builder.body(b.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RestqaError::Collaborator(format!("request to {} failed: {e}", req.url)))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RestqaError::Collaborator(format!("read body of {}: {e}", req.url)))?;

        Ok(render_scenario(&req, status, &text))
    }
}

fn render_scenario(req: &CurlRequest, status: u16, response_body: &str) -> String {
    let mut lines = vec![
        "  Given I have the api gateway".to_string(),
        format!("    And I have the path \"{}\"", req.url.path()),
        format!("    And I have the method \"{}\"", req.method),
    ];

    for (k, v) in req.url.query_pairs() {
        lines.push(format!(
            "    And the query parameter contains \"{k}\" as \"{v}\""
        ));
    }
    for (k, v) in &req.headers {
        lines.push(format!("    And the header contains \"{k}\" as \"{v}\""));
    }
    if let Some(payload) = &req.body {
        lines.push("    And the payload:".to_string());
        push_doc_string(&mut lines, payload);
    }

    lines.push("  When I run the API".to_string());
    lines.push(format!(
        "  Then I should receive a response with the status {status}"
    ));

    if let Ok(json) = serde_json::from_str::<Value>(response_body) {
        if let Ok(pretty) = serde_json::to_string_pretty(&json) {
            lines.push("    And the response body should be equal to:".to_string());
            push_doc_string(&mut lines, &pretty);
        }
    }

    lines.join("\n") + "\n"
}

fn push_doc_string(lines: &mut Vec<String>, text: &str) {
    lines.push("    \"\"\"".to_string());
    lines.extend(text.lines().map(|l| format!("    {l}")));
    lines.push("    \"\"\"".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use restqa_error::ErrorKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn argv(cmd: &str) -> Vec<String> {
        split_command(cmd).expect("split")
    }

    #[test]
    fn split_honors_quotes() {
        assert_eq!(
            argv(r#"curl -H "Accept: application/json" 'http://x/a b'"#),
            vec!["curl", "-H", "Accept: application/json", "http://x/a b"]
        );
    }

    #[test]
    fn parse_defaults_to_get() {
        let req = CurlRequest::parse(&argv("curl -s https://restqa.io/welcome.json")).expect("parse");
        assert_eq!(req.method, "GET");
        assert_eq!(req.url.path(), "/welcome.json");
        assert!(req.headers.is_empty());
    }

    #[test]
    fn parse_reads_method_headers_and_data() {
        let req = CurlRequest::parse(&argv(
            r#"curl -XPUT -H "Content-Type: application/json" -d '{"a":1}' api.example.com/users/1"#,
        ))
        .expect("parse");
        assert_eq!(req.method, "PUT");
        assert_eq!(req.url.as_str(), "http://api.example.com/users/1");
        assert_eq!(
            req.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        assert_eq!(req.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn data_without_method_implies_post() {
        let req = CurlRequest::parse(&argv("curl --data x=1 http://x/y")).expect("parse");
        assert_eq!(req.method, "POST");
    }

    #[test]
    fn parse_rejects_non_curl_and_missing_url() {
        let err = CurlRequest::parse(&argv("wget http://x")).expect_err("not curl");
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err = CurlRequest::parse(&argv("curl -X GET")).expect_err("no url");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn render_includes_query_and_payload() {
        let req = CurlRequest::parse(&argv(r#"curl -d 'hello' "http://x/search?q=rust""#))
            .expect("parse");
        let out = render_scenario(&req, 201, "not json");
        assert!(out.contains("And I have the path \"/search\""));
        assert!(out.contains("the query parameter contains \"q\" as \"rust\""));
        assert!(out.contains("    hello"));
        assert!(out.contains("status 201"));
        assert!(!out.contains("response body"));
    }

    #[tokio::test]
    async fn generates_scenario_from_live_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/welcome.json"))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"name": "docs"}])),
            )
            .mount(&server)
            .await;

        let generator = CurlScenarioGenerator::new(DEFAULT_FETCH_TIMEOUT).expect("client");
        let out = generator
            .generate(&argv(&format!(
                "curl -H 'Accept: application/json' {}/welcome.json",
                server.uri()
            )))
            .await
            .expect("generate");

        assert!(out.contains("Given I have the api gateway"));
        assert!(out.contains("I have the path \"/welcome.json\""));
        assert!(out.contains("status 200"));
        assert!(out.contains("\"name\": \"docs\""));
    }

    #[tokio::test]
    async fn slow_upstream_is_a_collaborator_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let generator = CurlScenarioGenerator::new(Duration::from_millis(100)).expect("client");
        let err = generator
            .generate(&argv(&format!("curl {}/slow", server.uri())))
            .await
            .expect_err("should time out");
        assert_eq!(err.kind(), ErrorKind::External);
    }
}

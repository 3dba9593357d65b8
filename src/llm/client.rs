use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, StatusCode};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::llm::LlmError;

pub type HttpClient = Client<hyper_tls::HttpsConnector<HttpConnector>, Full<Bytes>>;

pub fn create_client() -> HttpClient {
    let https = hyper_tls::HttpsConnector::new();
    Client::builder(TokioExecutor::new()).build(https)
}

/// POSTs a JSON body and collects the whole response.
pub async fn post_json(
    client: &HttpClient,
    target_url: &str,
    api_key: &str,
    body: Vec<u8>,
) -> Result<(StatusCode, Bytes), LlmError> {
    let target_uri: hyper::Uri = target_url
        .parse()
        .map_err(|e| LlmError::Http(format!("Invalid URL: {}", e)))?;

    let mut builder = Request::builder()
        .method(hyper::Method::POST)
        .uri(target_uri)
        .header(hyper::header::CONTENT_TYPE, "application/json");
    if !api_key.is_empty() {
        builder = builder.header(hyper::header::AUTHORIZATION, format!("Bearer {}", api_key));
    }

    let req = builder
        .body(Full::new(Bytes::from(body)))
        .map_err(|e| LlmError::Http(e.to_string()))?;

    let response = client
        .request(req)
        .await
        .map_err(|e| LlmError::Connection(e.to_string()))?;

    let status = response.status();
    let body_bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| LlmError::Connection(e.to_string()))?
        .to_bytes();

    Ok((status, body_bytes))
}

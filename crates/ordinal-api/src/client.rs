// Async HTTP client for the appliance rule collection API.
//
// Base path: /api/
// Auth: X-API-KEY header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{ChainReorderRequest, Envelope, PolicyReorderRequest, RuleRecord};

/// Policy type segment used by extended community list endpoints.
const EXTCOMMUNITY_LIST: &str = "extcommunity-list";

// ── Error response shape for non-2xx answers ─────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the appliance's rule collection endpoints.
///
/// One method per collection kind for fetching and one for submitting a
/// reorder. A reorder is always a single request carrying every
/// renumbering entry; the client never splits or retries it.
pub struct ConsoleClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ConsoleClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `X-API-KEY` as a default header on every request.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-API-KEY", key_value);

        let http = transport.build_client(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The normalized API base URL (always ends with `/api/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `/api/` unless the caller already pointed at it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    ///
    /// Chain and list names are user-defined, so they are pushed as
    /// segments rather than formatted into a path string.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(endpoint)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<Option<T>, Error> {
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Option<T>, Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if envelope.success {
            Ok(envelope.data)
        } else {
            Err(Error::Rejected {
                message: envelope
                    .error
                    .unwrap_or_else(|| "request rejected without a message".into()),
            })
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Api {
                status: status.as_u16(),
                message: err
                    .error
                    .or(err.message)
                    .unwrap_or_else(|| status.to_string()),
                code: err.code,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Firewall chains ──────────────────────────────────────────────

    pub async fn list_chain_rules(
        &self,
        protocol: &str,
        chain: &str,
        custom: bool,
        refresh: bool,
    ) -> Result<Vec<RuleRecord>, Error> {
        let url = self.endpoint(&["v1", "firewall", protocol, "chains", chain, "rules"])?;
        let rules = self
            .get(
                url,
                &[("custom", custom.to_string()), ("refresh", refresh.to_string())],
            )
            .await?;
        Ok(rules.unwrap_or_default())
    }

    pub async fn reorder_chain_rules(
        &self,
        protocol: &str,
        chain: &str,
        body: &ChainReorderRequest,
    ) -> Result<(), Error> {
        let url = self.endpoint(&[
            "v1", "firewall", protocol, "chains", chain, "rules", "reorder",
        ])?;
        self.post::<serde_json::Value, _>(url, body).await?;
        Ok(())
    }

    // ── Route policies ───────────────────────────────────────────────

    pub async fn list_policy_rules(
        &self,
        policy_type: &str,
        name: &str,
        refresh: bool,
    ) -> Result<Vec<RuleRecord>, Error> {
        let url = self.endpoint(&["v1", "policy", policy_type, name, "rules"])?;
        let rules = self.get(url, &[("refresh", refresh.to_string())]).await?;
        Ok(rules.unwrap_or_default())
    }

    pub async fn reorder_policy_rules(
        &self,
        policy_type: &str,
        name: &str,
        body: &PolicyReorderRequest,
    ) -> Result<(), Error> {
        let url = self.endpoint(&["v1", "policy", policy_type, name, "rules", "reorder"])?;
        self.post::<serde_json::Value, _>(url, body).await?;
        Ok(())
    }

    // ── Extended community lists ─────────────────────────────────────

    pub async fn list_extcommunity_rules(
        &self,
        list_name: &str,
        refresh: bool,
    ) -> Result<Vec<RuleRecord>, Error> {
        self.list_policy_rules(EXTCOMMUNITY_LIST, list_name, refresh)
            .await
    }

    pub async fn reorder_extcommunity_rules(
        &self,
        list_name: &str,
        body: &PolicyReorderRequest,
    ) -> Result<(), Error> {
        self.reorder_policy_rules(EXTCOMMUNITY_LIST, list_name, body)
            .await
    }
}

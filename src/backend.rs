//! Backend client: executes compiled queries against Solr endpoints.
//!
//! [`SearchBackend`] is the seam between query compilation and the network.
//! [`GolrClient`] is the HTTP implementation: one `ureq::Agent`, built once
//! with a fixed timeout, shared by every request. Nothing is retried and no
//! failure is ever turned into an empty result.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::compile::{CompiledQuery, FilterClause};
use crate::config::GolrConfig;
use crate::error::{GolrError, GolrResult};
use crate::schema::SchemaProfile;

/// Longest error body excerpt kept in a [`GolrError::BackendUnavailable`].
const MAX_ERROR_BODY: usize = 500;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// A resolved search endpoint and its schema dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    pub profile: SchemaProfile,
}

impl Endpoint {
    /// URL of the Solr `select` handler.
    pub fn select_url(&self) -> String {
        format!("{}/select", self.url.trim_end_matches('/'))
    }
}

/// Explicit object-category to endpoint routing table.
#[derive(Debug, Clone)]
pub struct BackendTable {
    endpoints: BTreeMap<String, Endpoint>,
    routes: BTreeMap<String, String>,
    default_endpoint: String,
}

impl BackendTable {
    pub fn from_config(config: &GolrConfig) -> GolrResult<Self> {
        config.validate()?;
        let endpoints: BTreeMap<String, Endpoint> = config
            .endpoints
            .iter()
            .map(|(name, ep)| {
                (
                    name.clone(),
                    Endpoint {
                        name: name.clone(),
                        url: ep.url.clone(),
                        profile: ep.schema(),
                    },
                )
            })
            .collect();
        let table = Self {
            endpoints,
            routes: config.routes.clone(),
            default_endpoint: config.default_endpoint.clone(),
        };
        table.get(&table.default_endpoint)?;
        for target in table.routes.values() {
            table.get(target)?;
        }
        Ok(table)
    }

    pub fn get(&self, name: &str) -> GolrResult<&Endpoint> {
        self.endpoints
            .get(name)
            .ok_or_else(|| GolrError::UnknownEndpoint {
                name: name.to_string(),
            })
    }

    /// Endpoint serving `object_category`, or the default endpoint.
    pub fn resolve(&self, object_category: Option<&str>) -> &Endpoint {
        let name = object_category
            .and_then(|c| self.routes.get(c))
            .unwrap_or(&self.default_endpoint);
        // Both lookups are checked in `from_config`.
        &self.endpoints[name]
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }
}

// ---------------------------------------------------------------------------
// Raw response
// ---------------------------------------------------------------------------

/// Undigested Solr response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawResponse {
    pub num_found: u64,
    pub docs: Vec<Map<String, Value>>,
    /// Flat `[value, count, value, count, ...]` arrays per field.
    pub facet_fields: BTreeMap<String, Vec<Value>>,
    /// Pivot trees keyed by the comma-joined pivot field list.
    pub facet_pivot: BTreeMap<String, Vec<Value>>,
    /// Full response body, for consumers of `json.facet` or stats.
    pub raw: Value,
}

impl RawResponse {
    /// Decode a Solr JSON body.
    pub fn from_json(url: &str, body: Value) -> GolrResult<Self> {
        let malformed = |message: &str| GolrError::MalformedResponse {
            url: url.to_string(),
            message: message.to_string(),
        };
        let response = body
            .get("response")
            .and_then(Value::as_object)
            .ok_or_else(|| malformed("missing \"response\" object"))?;
        let num_found = response
            .get("numFound")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let docs = match response.get("docs") {
            None => Vec::new(),
            Some(Value::Array(docs)) => docs
                .iter()
                .map(|d| {
                    d.as_object()
                        .cloned()
                        .ok_or_else(|| malformed("document is not a JSON object"))
                })
                .collect::<GolrResult<Vec<_>>>()?,
            Some(_) => return Err(malformed("\"docs\" is not an array")),
        };

        let facet_counts = body.get("facet_counts");
        let facet_fields = arrays_under(facet_counts, "facet_fields");
        let facet_pivot = arrays_under(facet_counts, "facet_pivot");

        Ok(Self {
            num_found,
            docs,
            facet_fields,
            facet_pivot,
            raw: body,
        })
    }
}

fn arrays_under(parent: Option<&Value>, key: &str) -> BTreeMap<String, Vec<Value>> {
    parent
        .and_then(|p| p.get(key))
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_array().map(|a| (k.clone(), a.clone())))
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Wire serialization
// ---------------------------------------------------------------------------

/// Quote a value as a Solr phrase, escaping `\` and `"`.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Render a filter clause as a Solr `fq` expression.
pub fn solr_filter(clause: &FilterClause) -> String {
    let body = match clause.values.as_slice() {
        [single] => format!("{}:{}", clause.field, quote(single)),
        values => {
            let alternatives: Vec<String> = values.iter().map(|v| quote(v)).collect();
            format!("{}:({})", clause.field, alternatives.join(" OR "))
        }
    };
    if clause.negated {
        format!("-{body}")
    } else {
        body
    }
}

/// Solr request parameters for a compiled query, in emission order.
pub fn solr_params(query: &CompiledQuery) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![
        ("q".into(), query.q.clone()),
        ("wt".into(), "json".into()),
        ("rows".into(), query.rows.to_string()),
        ("start".into(), query.start.to_string()),
    ];
    for clause in &query.filters {
        params.push(("fq".into(), solr_filter(clause)));
    }
    if !query.fields.is_empty() {
        params.push(("fl".into(), query.fields.join(",")));
    }
    if query.facet {
        params.push(("facet".into(), "on".into()));
        params.push(("facet.limit".into(), query.facet_limit.wire().to_string()));
        params.push(("facet.mincount".into(), query.facet_mincount.to_string()));
        for f in &query.facet_fields {
            params.push(("facet.field".into(), f.clone()));
        }
        for (f, limit) in &query.facet_field_limits {
            params.push((format!("f.{f}.facet.limit"), limit.wire().to_string()));
        }
        if !query.facet_pivot.is_empty() {
            params.push(("facet.pivot".into(), query.facet_pivot.join(",")));
        }
    }
    if let Some(json_facet) = &query.json_facet {
        params.push(("json.facet".into(), json_facet.to_string()));
    }
    params
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// Executes compiled queries. Implementations must be safe to share across threads.
pub trait SearchBackend: Send + Sync {
    fn execute(&self, query: &CompiledQuery) -> GolrResult<RawResponse>;
}

impl<B: SearchBackend + ?Sized> SearchBackend for std::sync::Arc<B> {
    fn execute(&self, query: &CompiledQuery) -> GolrResult<RawResponse> {
        (**self).execute(query)
    }
}

/// HTTP client for Golr Solr endpoints.
#[derive(Debug, Clone)]
pub struct GolrClient {
    http: ureq::Agent,
    timeout: Duration,
}

impl GolrClient {
    pub fn new(config: &GolrConfig) -> Self {
        let timeout = config.timeout();
        let http = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(&config.user_agent)
            .build();
        Self { http, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl SearchBackend for GolrClient {
    fn execute(&self, query: &CompiledQuery) -> GolrResult<RawResponse> {
        let url = query.endpoint.select_url();
        let params = solr_params(query);
        let form: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        tracing::debug!(url = %url, params = params.len(), "executing solr query");
        let started = std::time::Instant::now();

        let resp = match self.http.post(&url).send_form(&form) {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                let preview: String = body.chars().take(MAX_ERROR_BODY).collect();
                tracing::warn!(url = %url, status = code, "solr returned error status");
                return Err(GolrError::BackendUnavailable {
                    url,
                    status: Some(code),
                    message: format!("HTTP {code}: {preview}"),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                tracing::warn!(url = %url, error = %transport, "solr transport failure");
                return Err(GolrError::BackendUnavailable {
                    url,
                    status: None,
                    message: transport.to_string(),
                });
            }
        };

        let body: Value = resp.into_json().map_err(|e| GolrError::MalformedResponse {
            url: url.clone(),
            message: format!("failed to parse JSON: {e}"),
        })?;
        let raw = RawResponse::from_json(&url, body)?;
        tracing::debug!(
            url = %url,
            num_found = raw.num_found,
            docs = raw.docs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solr query complete"
        );
        Ok(raw)
    }
}

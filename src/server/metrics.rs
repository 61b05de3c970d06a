use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::AppState;

const UNMATCHED: &str = "unmatched";

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RequestKey {
    method: String,
    endpoint: String,
    status: u16,
}

/// `http_requests_total`, labelled by method, endpoint and status.
#[derive(Debug, Default, Clone)]
pub struct RequestCounter {
    counts: Arc<Mutex<BTreeMap<RequestKey, u64>>>,
}

impl RequestCounter {
    pub fn inc(&self, method: &str, endpoint: &str, status: u16) {
        let key = RequestKey {
            method: method.to_owned(),
            endpoint: endpoint.to_owned(),
            status,
        };
        // a poisoned counter only loses samples
        if let Ok(mut counts) = self.counts.lock() {
            *counts.entry(key).or_default() += 1;
        }
    }

    #[cfg(test)]
    pub fn get(&self, method: &str, endpoint: &str, status: u16) -> u64 {
        let key = RequestKey {
            method: method.to_owned(),
            endpoint: endpoint.to_owned(),
            status,
        };
        self.counts
            .lock()
            .map(|counts| counts.get(&key).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Renders the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::from(
            "# HELP http_requests_total Total HTTP Requests\n# TYPE http_requests_total counter\n",
        );
        if let Ok(counts) = self.counts.lock() {
            for (key, count) in counts.iter() {
                let labels = format!(
                    "endpoint=\"{}\",http_status=\"{}\",method=\"{}\"",
                    key.endpoint, key.status, key.method
                );
                let _ = writeln!(out, "http_requests_total{{{labels}}} {count}");
            }
        }
        out
    }
}

/// Counts every response against its route template, so `/books/1` and
/// `/books/2` share one series. Requests that match no route all land in the
/// `unmatched` series.
pub async fn track(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED.to_owned());

    let response = next.run(req).await;
    state
        .metrics
        .inc(&method, &endpoint, response.status().as_u16());
    response
}

//! Access log line rendering
//!
//! `combined` and `common` follow the usual httpd layouts, `json` emits one
//! object per line, and anything else is a pattern of `$variables`.

use chrono::{DateTime, Local};
use serde_json::json;

/// Timestamp layout used by the CLF-style formats
const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// One served request, as recorded in the access log
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    /// Raw request path, before percent-decoding
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub request_time_us: u64,
    /// Resolver classification (found, forbidden, not_found, error)
    pub outcome: Option<&'static str>,
}

/// Parsed `logging.access_log_format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout<'a> {
    Combined,
    Common,
    Json,
    Pattern(&'a str),
}

impl<'a> Layout<'a> {
    fn parse(format: &'a str) -> Self {
        match format {
            "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            pattern => Self::Pattern(pattern),
        }
    }
}

impl AccessLogEntry {
    /// Entry stamped with the current local time; the rest is filled in
    /// once the response is known
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
            outcome: None,
        }
    }

    pub fn format(&self, format: &str) -> String {
        match Layout::parse(format) {
            Layout::Common => self.clf(),
            Layout::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.clf(),
                dash(self.referer.as_deref()),
                dash(self.user_agent.as_deref()),
            ),
            Layout::Json => self.json(),
            Layout::Pattern(pattern) => self.substitute(pattern),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {} HTTP/{}",
            self.method,
            self.request_uri(),
            self.http_version
        )
    }

    fn clf(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn json(&self) -> String {
        json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
            "outcome": self.outcome,
        })
        .to_string()
    }

    /// Expand `$name` variables in a custom pattern.
    ///
    /// Known names: `remote_addr`, `time_local`, `time_iso8601`, `request`,
    /// `request_method`, `request_uri`, `request_time` (seconds, 3 decimals),
    /// `status`, `body_bytes_sent`, `http_referer`, `http_user_agent` and
    /// `outcome`. Unknown names are left as written.
    fn substitute(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 64);
        let mut rest = pattern;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let name_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..name_len];

            match self.variable(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &after[name_len..];
        }
        out.push_str(rest);
        out
    }

    fn variable(&self, name: &str) -> Option<String> {
        let value = match name {
            "remote_addr" => self.remote_addr.clone(),
            "time_local" => self.time.format(CLF_TIME).to_string(),
            "time_iso8601" => self.time.to_rfc3339(),
            "request" => self.request_line(),
            "request_method" => self.method.clone(),
            "request_uri" => self.request_uri(),
            "request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let secs = self.request_time_us as f64 / 1_000_000.0;
                format!("{secs:.3}")
            }
            "status" => self.status.to_string(),
            "body_bytes_sent" => self.body_bytes.to_string(),
            "http_referer" => dash(self.referer.as_deref()).to_string(),
            "http_user_agent" => dash(self.user_agent.as_deref()).to_string(),
            "outcome" => dash(self.outcome).to_string(),
            _ => return None,
        };
        Some(value)
    }
}

fn dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

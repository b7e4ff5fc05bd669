use crate::error::{ActionError, Result};
use crate::html;
use crate::process;
use crate::result::{HeaderDump, HeaderSource, ScanResult, VerbOutcome};
use futures::future::join_all;
use reqwest::{Client, Method};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Verbs issued by [`Probe::sweep`], in reporting order.
pub const SWEEP_METHODS: [&str; 6] = ["GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD"];

pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub timeout: Duration,
    pub tool_timeout: Duration,
    pub script_timeout: Duration,
    pub header_tool: String,
    pub interpreters: Vec<String>,
    pub truncate_limit: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            tool_timeout: Duration::from_secs(5),
            script_timeout: Duration::from_secs(10),
            header_tool: "curl".to_string(),
            interpreters: vec!["python3".to_string(), "python".to_string()],
            truncate_limit: 1000,
        }
    }
}

/// Issues the single network or process call behind each action.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Probe {
    client: Client,
    options: ProbeOptions,
}

impl Probe {
    pub fn new(options: ProbeOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("Nextdomain/", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .connect_timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(ActionError::Http)?;

        Ok(Self { client, options })
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    /// Fetches `url` once and sorts its anchors.
    pub async fn scan(&self, url: &str) -> Result<ScanResult> {
        info!("Scanning {}", url);
        let body = self.fetch_body(url).await?;
        let result = html::classify_links(url, &body)?;
        info!(
            "Scan of {} found {} pages and {} hidden pages",
            url,
            result.pages.len(),
            result.hidden.len()
        );
        Ok(result)
    }

    /// Response headers, from the header tool when present, else from a HEAD request.
    pub async fn analyze_stream(&self, url: &str) -> Result<HeaderDump> {
        match process::run_tool(&self.options.header_tool, &["-I", url], self.options.tool_timeout)
            .await
        {
            Ok(output) => Ok(HeaderDump {
                source: HeaderSource::Tool,
                text: String::from_utf8_lossy(&output.stdout).into_owned(),
            }),
            Err(ActionError::ToolMissing(tool)) => {
                warn!("{} not found, falling back to HEAD request", tool);
                let response = self.client.head(url).send().await?;
                let text = response
                    .headers()
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or("<binary>")))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(HeaderDump {
                    source: HeaderSource::Fallback,
                    text,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Raw page body as served.
    pub async fn frontend_source(&self, url: &str) -> Result<String> {
        self.fetch_body(url).await
    }

    /// Page body fetched through the header tool (following redirects),
    /// optionally cut at the truncation limit.
    pub async fn backend_source(&self, url: &str, truncate: bool) -> Result<String> {
        let body = match process::run_tool(
            &self.options.header_tool,
            &["-s", "-L", url],
            self.options.tool_timeout,
        )
        .await
        {
            Ok(output) => String::from_utf8_lossy(&output.stdout).into_owned(),
            Err(ActionError::ToolMissing(tool)) => {
                warn!("{} not found, fetching backend source directly", tool);
                self.fetch_body(url).await?
            }
            Err(e) => return Err(e),
        };

        if truncate {
            Ok(truncate_chars(&body, self.options.truncate_limit))
        } else {
            Ok(body)
        }
    }

    /// Readable text of the page.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let body = self.fetch_body(url).await?;
        Ok(html::visible_text(&body))
    }

    /// Sends every verb in [`SWEEP_METHODS`] to `url`. Always returns six outcomes.
    pub async fn sweep(&self, url: &str) -> Vec<VerbOutcome> {
        let requests = SWEEP_METHODS.iter().map(|name| async move {
            let result = match Method::from_bytes(name.as_bytes()) {
                Ok(method) => match self.client.request(method, url).send().await {
                    Ok(response) => Ok(response.status().as_u16()),
                    Err(e) => {
                        let err = ActionError::from(e);
                        debug!("{} {} failed: {}", name, url, err);
                        Err(err.kind())
                    }
                },
                Err(_) => Err(crate::error::ErrorKind::Other),
            };
            VerbOutcome {
                method: name.to_string(),
                result,
            }
        });

        join_all(requests).await
    }

    /// Posts `message` as a form field and returns the trimmed reply body.
    pub async fn post_message(&self, target: &str, message: &str) -> Result<String> {
        debug!("POST {} ({} bytes)", target, message.len());
        let response = self
            .client
            .post(target)
            .form(&[("message", message)])
            .send()
            .await?;
        let body = response.text().await?;
        Ok(body.trim().to_string())
    }

    pub async fn run_script(&self, path: &Path) -> Result<String> {
        info!("Running script {}", path.display());
        process::run_script(path, &self.options.interpreters, self.options.script_timeout).await
    }

    /// Saves the body behind `link` to `dest`, returning the number of bytes written.
    pub async fn download(&self, link: &str, dest: &Path) -> Result<usize> {
        let response = self.client.get(link).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        info!("Downloaded {} bytes from {} to {}", bytes.len(), link, dest.display());
        Ok(bytes.len())
    }

    async fn fetch_body(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        Ok(response.text().await?)
    }
}

/// Keeps the first `limit` characters and appends [`TRUNCATION_MARKER`] when anything was cut.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

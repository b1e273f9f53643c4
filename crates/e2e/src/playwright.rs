//! Playwright browser automation
//!
//! A generated Node.js script keeps one browser page open and answers
//! newline-delimited JSON requests on stdin:
//!
//! ```text
//! -> {"id":3,"op":"query","selector":"tbody tr","within":null}
//! <- {"id":3,"ok":true,"result":[12,13,14]}
//! <- {"id":4,"ok":false,"kind":"stale","error":"element 9 is detached"}
//! ```

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{BrowserKind, SuiteConfig, Viewport};
use crate::driver::{ActionOptions, BrowserDriver, DialogEvent, DriverLauncher, ElementHandle};
use crate::error::{E2eError, E2eResult};

/// Configuration for the Playwright bridge
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
    pub viewport: Viewport,
    /// Playwright's own wait for actionability before an action fails
    pub action_timeout: Duration,
    /// How long a single bridge request may take
    pub request_timeout: Duration,
    /// Where `require('playwright')` is resolved from
    pub node_modules: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self::from_suite(&SuiteConfig::default())
    }
}

impl PlaywrightConfig {
    pub fn from_suite(config: &SuiteConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            browser: config.browser,
            headless: config.headless,
            viewport: config.viewport,
            action_timeout: Duration::from_millis(config.command_timeout_ms),
            request_timeout: Duration::from_millis(config.command_timeout_ms) + Duration::from_secs(30),
            node_modules: PathBuf::from("node_modules"),
        }
    }
}

/// One request understood by the bridge script
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BridgeCommand {
    Goto { url: String },
    Path,
    Query { selector: String, within: Option<ElementHandle> },
    Contains { selector: Option<String>, text: String, within: Option<ElementHandle> },
    Click { handle: ElementHandle, force: bool },
    Check { handle: ElementHandle, force: bool },
    Type { handle: ElementHandle, text: String },
    Clear { handle: ElementHandle },
    Text { handle: ElementHandle },
    Attribute { handle: ElementHandle, name: String },
    Property { handle: ElementHandle, name: String },
    IsChecked { handle: ElementHandle },
    IsDisabled { handle: ElementHandle },
    IsVisible { handle: ElementHandle },
    SetConfirmResponse { accept: bool },
    TakeDialogs,
    Close,
}

impl BridgeCommand {
    fn name(&self) -> &'static str {
        match self {
            BridgeCommand::Goto { .. } => "goto",
            BridgeCommand::Path => "path",
            BridgeCommand::Query { .. } => "query",
            BridgeCommand::Contains { .. } => "contains",
            BridgeCommand::Click { .. } => "click",
            BridgeCommand::Check { .. } => "check",
            BridgeCommand::Type { .. } => "type",
            BridgeCommand::Clear { .. } => "clear",
            BridgeCommand::Text { .. } => "text",
            BridgeCommand::Attribute { .. } => "attribute",
            BridgeCommand::Property { .. } => "property",
            BridgeCommand::IsChecked { .. } => "isChecked",
            BridgeCommand::IsDisabled { .. } => "isDisabled",
            BridgeCommand::IsVisible { .. } => "isVisible",
            BridgeCommand::SetConfirmResponse { .. } => "setConfirmResponse",
            BridgeCommand::TakeDialogs => "takeDialogs",
            BridgeCommand::Close => "close",
        }
    }

    fn handle(&self) -> Option<ElementHandle> {
        match self {
            BridgeCommand::Click { handle, .. }
            | BridgeCommand::Check { handle, .. }
            | BridgeCommand::Type { handle, .. }
            | BridgeCommand::Clear { handle }
            | BridgeCommand::Text { handle }
            | BridgeCommand::Attribute { handle, .. }
            | BridgeCommand::Property { handle, .. }
            | BridgeCommand::IsChecked { handle }
            | BridgeCommand::IsDisabled { handle }
            | BridgeCommand::IsVisible { handle } => Some(*handle),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    #[serde(flatten)]
    command: &'a BridgeCommand,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    id: u64,
    ok: bool,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl BridgeResponse {
    fn into_result<T: DeserializeOwned>(self, command: &BridgeCommand) -> E2eResult<T> {
        if self.ok {
            return Ok(serde_json::from_value(self.result)?);
        }
        let message = self.error.unwrap_or_else(|| "unknown bridge error".to_string());
        Err(match (self.kind.as_deref(), command.handle()) {
            (Some("stale"), Some(handle)) => E2eError::StaleElement(handle.0),
            (Some("not_interactable"), Some(handle)) => E2eError::NotInteractable {
                selector: handle.to_string(),
                reason: message,
            },
            _ => E2eError::Playwright(format!("{} failed: {}", command.name(), message)),
        })
    }
}

struct BridgeIo {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// A live browser page behind the bridge script
pub struct PlaywrightDriver {
    io: Mutex<BridgeIo>,
    next_id: AtomicU64,
    request_timeout: Duration,
    // Keeps the generated script on disk for the lifetime of the process
    _script_dir: tempfile::TempDir,
}

impl PlaywrightDriver {
    /// Launch the browser and wait for the bridge to report ready
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, build_bridge_script(config))?;

        let node_path = std::fs::canonicalize(&config.node_modules)
            .unwrap_or_else(|_| config.node_modules.clone());
        debug!("Running Playwright bridge: {}", script_path.display());

        let mut child = Command::new("node")
            .arg(&script_path)
            .env("NODE_PATH", node_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("Failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout unavailable".into()))?;
        let mut lines = BufReader::new(stdout).lines();

        let ready = tokio::time::timeout(config.request_timeout, lines.next_line())
            .await
            .map_err(|_| E2eError::Timeout("Playwright bridge to start".into()))??;
        match ready {
            Some(line) if line.contains("\"ready\":true") => {}
            Some(line) if line.contains("Cannot find module") => return Err(E2eError::PlaywrightNotFound),
            Some(line) => return Err(E2eError::Playwright(format!("unexpected bridge greeting: {}", line))),
            None => return Err(E2eError::PlaywrightNotFound),
        }

        info!(
            "{} ready ({}x{}, headless: {})",
            config.browser.as_str(),
            config.viewport.width,
            config.viewport.height,
            config.headless
        );

        Ok(Self {
            io: Mutex::new(BridgeIo { child, stdin, stdout: lines }),
            next_id: AtomicU64::new(1),
            request_timeout: config.request_timeout,
            _script_dir: script_dir,
        })
    }

    /// Send one command and wait for its response
    pub async fn request<T: DeserializeOwned>(&self, command: BridgeCommand) -> E2eResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&BridgeRequest { id, command: &command })?;
        line.push('\n');

        let mut io = self.io.lock().await;
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        let exchange = async {
            loop {
                let Some(raw) = io.stdout.next_line().await? else {
                    return Err(E2eError::Playwright("bridge exited".into()));
                };
                match serde_json::from_str::<BridgeResponse>(&raw) {
                    Ok(resp) if resp.id == id => return resp.into_result(&command),
                    Ok(resp) => warn!("dropping late bridge response {}", resp.id),
                    Err(_) => debug!("[bridge] {}", raw),
                }
            }
        };

        tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| E2eError::Timeout(format!("bridge {} request {}", command.name(), id)))?
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightDriver {
    async fn goto(&self, path: &str) -> E2eResult<()> {
        self.request::<serde_json::Value>(BridgeCommand::Goto { url: path.to_string() })
            .await
            .map(|_| ())
    }

    async fn current_path(&self) -> E2eResult<String> {
        self.request(BridgeCommand::Path).await
    }

    async fn query(&self, selector: &str, within: Option<ElementHandle>) -> E2eResult<Vec<ElementHandle>> {
        self.request(BridgeCommand::Query {
            selector: selector.to_string(),
            within,
        })
        .await
    }

    async fn contains(
        &self,
        selector: Option<&str>,
        text: &str,
        within: Option<ElementHandle>,
    ) -> E2eResult<Option<ElementHandle>> {
        self.request(BridgeCommand::Contains {
            selector: selector.map(str::to_string),
            text: text.to_string(),
            within,
        })
        .await
    }

    async fn click(&self, el: ElementHandle, options: ActionOptions) -> E2eResult<()> {
        self.request::<serde_json::Value>(BridgeCommand::Click { handle: el, force: options.force })
            .await
            .map(|_| ())
    }

    async fn check(&self, el: ElementHandle, options: ActionOptions) -> E2eResult<()> {
        self.request::<serde_json::Value>(BridgeCommand::Check { handle: el, force: options.force })
            .await
            .map(|_| ())
    }

    async fn type_text(&self, el: ElementHandle, text: &str) -> E2eResult<()> {
        self.request::<serde_json::Value>(BridgeCommand::Type {
            handle: el,
            text: text.to_string(),
        })
        .await
        .map(|_| ())
    }

    async fn clear(&self, el: ElementHandle) -> E2eResult<()> {
        self.request::<serde_json::Value>(BridgeCommand::Clear { handle: el })
            .await
            .map(|_| ())
    }

    async fn text(&self, el: ElementHandle) -> E2eResult<String> {
        self.request(BridgeCommand::Text { handle: el }).await
    }

    async fn attribute(&self, el: ElementHandle, name: &str) -> E2eResult<Option<String>> {
        self.request(BridgeCommand::Attribute {
            handle: el,
            name: name.to_string(),
        })
        .await
    }

    async fn property(&self, el: ElementHandle, name: &str) -> E2eResult<Option<serde_json::Value>> {
        let value: serde_json::Value = self
            .request(BridgeCommand::Property {
                handle: el,
                name: name.to_string(),
            })
            .await?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn is_checked(&self, el: ElementHandle) -> E2eResult<bool> {
        self.request(BridgeCommand::IsChecked { handle: el }).await
    }

    async fn is_disabled(&self, el: ElementHandle) -> E2eResult<bool> {
        self.request(BridgeCommand::IsDisabled { handle: el }).await
    }

    async fn is_visible(&self, el: ElementHandle) -> E2eResult<bool> {
        self.request(BridgeCommand::IsVisible { handle: el }).await
    }

    async fn set_confirm_response(&self, accept: bool) -> E2eResult<()> {
        self.request::<serde_json::Value>(BridgeCommand::SetConfirmResponse { accept })
            .await
            .map(|_| ())
    }

    async fn take_dialogs(&self) -> E2eResult<Vec<DialogEvent>> {
        self.request(BridgeCommand::TakeDialogs).await
    }

    async fn close(&self) -> E2eResult<()> {
        let closed = self.request::<serde_json::Value>(BridgeCommand::Close).await;
        let mut io = self.io.lock().await;
        match tokio::time::timeout(Duration::from_secs(5), io.child.wait()).await {
            Ok(_) => {}
            Err(_) => {
                warn!("bridge did not exit, killing it");
                let _ = io.child.kill().await;
            }
        }
        closed.map(|_| ())
    }
}

/// Launches one Playwright page per test case
pub struct PlaywrightLauncher {
    config: PlaywrightConfig,
}

impl PlaywrightLauncher {
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        check_playwright_installed()?;
        Ok(Self { config })
    }
}

#[async_trait]
impl DriverLauncher for PlaywrightLauncher {
    async fn launch(&self) -> E2eResult<Arc<dyn BrowserDriver>> {
        Ok(Arc::new(PlaywrightDriver::launch(&self.config).await?))
    }

    fn name(&self) -> &'static str {
        "playwright"
    }
}

/// Check if Playwright is installed
fn check_playwright_installed() -> E2eResult<()> {
    let output = std::process::Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match output {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// Build the bridge script for a configuration
pub fn build_bridge_script(config: &PlaywrightConfig) -> String {
    let base_url = serde_json::Value::String(config.base_url.clone()).to_string();
    BRIDGE_TEMPLATE
        .replace("__BROWSER__", config.browser.as_str())
        .replace("__HEADLESS__", if config.headless { "true" } else { "false" })
        .replace("__WIDTH__", &config.viewport.width.to_string())
        .replace("__HEIGHT__", &config.viewport.height.to_string())
        .replace("__ACTION_TIMEOUT__", &config.action_timeout.as_millis().to_string())
        .replace("__BASE_URL__", &base_url)
}

const BRIDGE_TEMPLATE: &str = r#"
const { chromium, firefox, webkit } = require('playwright');
const readline = require('readline');

class BridgeError extends Error {
  constructor(kind, message) { super(message); this.kind = kind; }
}

(async () => {
  const browser = await __BROWSER__.launch({ headless: __HEADLESS__ });
  const context = await browser.newContext({
    viewport: { width: __WIDTH__, height: __HEIGHT__ }
  });
  const page = await context.newPage();
  page.setDefaultTimeout(__ACTION_TIMEOUT__);
  const baseUrl = __BASE_URL__;

  const handles = new Map();
  let nextHandle = 1;
  let confirmResponse = true;
  let dialogs = [];

  page.on('dialog', async dialog => {
    const kind = dialog.type();
    const accepted = kind !== 'confirm' || confirmResponse;
    dialogs.push({ kind, message: dialog.message(), accepted });
    if (accepted) { await dialog.accept(); } else { await dialog.dismiss(); }
  });

  const register = h => { const id = nextHandle++; handles.set(id, h); return id; };
  const resolve = async id => {
    const h = handles.get(id);
    if (!h || !(await h.evaluate(el => el.isConnected))) {
      throw new BridgeError('stale', `element ${id} is detached`);
    }
    return h;
  };
  const scope = async within => (within == null ? page : await resolve(within));
  const act = async (fn) => {
    try { return await fn(); } catch (e) {
      if (e.name === 'TimeoutError') { throw new BridgeError('not_interactable', e.message.split('\n')[0]); }
      throw e;
    }
  };

  const ops = {
    goto: async ({ url }) => { await page.goto(baseUrl + url); return null; },
    path: async () => new URL(page.url()).pathname,
    query: async ({ selector, within }) => (await (await scope(within)).$$(selector)).map(register),
    contains: async ({ selector, text, within }) => {
      const root = await scope(within);
      if (selector == null) {
        const found = await root.$$('text=' + text);
        return found.length ? register(found[0]) : null;
      }
      for (const h of await root.$$(selector)) {
        const content = await h.textContent();
        if (content && content.includes(text)) { return register(h); }
      }
      return null;
    },
    click: async ({ handle, force }) => { const h = await resolve(handle); await act(() => h.click({ force })); return null; },
    check: async ({ handle, force }) => { const h = await resolve(handle); await act(() => h.check({ force })); return null; },
    type: async ({ handle, text }) => { const h = await resolve(handle); await act(() => h.type(text)); return null; },
    clear: async ({ handle }) => { const h = await resolve(handle); await act(() => h.fill('')); return null; },
    text: async ({ handle }) => (await (await resolve(handle)).textContent()) || '',
    attribute: async ({ handle, name }) => (await resolve(handle)).getAttribute(name),
    property: async ({ handle, name }) => (await resolve(handle)).evaluate((el, n) => {
      const v = el[n];
      if (v === undefined || v === null) { return null; }
      return typeof v === 'object' ? String(v) : v;
    }, name),
    isChecked: async ({ handle }) => (await resolve(handle)).isChecked(),
    isDisabled: async ({ handle }) => (await resolve(handle)).isDisabled(),
    isVisible: async ({ handle }) => (await resolve(handle)).isVisible(),
    setConfirmResponse: async ({ accept }) => { confirmResponse = accept; return null; },
    takeDialogs: async () => { await page.waitForTimeout(50); const taken = dialogs; dialogs = []; return taken; },
    close: async () => null,
  };

  const write = obj => process.stdout.write(JSON.stringify(obj) + '\n');
  write({ ready: true });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) { continue; }
    const req = JSON.parse(line);
    try {
      const op = ops[req.op];
      if (!op) { throw new BridgeError('other', `unknown op ${req.op}`); }
      const result = await op(req);
      write({ id: req.id, ok: true, result: result === undefined ? null : result });
    } catch (e) {
      write({ id: req.id, ok: false, kind: e.kind || 'other', error: e.message });
    }
    if (req.op === 'close') { break; }
  }
  await browser.close();
  process.exit(0);
})().catch(e => {
  process.stdout.write(JSON.stringify({ ready: false, error: e.message }) + '\n');
  process.exit(1);
});
"#;

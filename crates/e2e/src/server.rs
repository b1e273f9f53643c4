//! Application under test - spawning and health checking its dev server

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running application process
pub struct AppServerHandle {
    child: Child,
    base_url: String,
}

impl AppServerHandle {
    /// Spawn the application and wait until `base_url` answers
    pub async fn spawn(config: &AppServerConfig, base_url: &str) -> E2eResult<Self> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| E2eError::Config("app.command is empty".into()))?;

        info!("Spawning application: {}", config.command.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args).stdout(Stdio::null()).stderr(Stdio::inherit());
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        let child = cmd.spawn().map_err(|e| {
            E2eError::ServerStartup(format!("Failed to spawn {}: {}", program, e))
        })?;

        let mut handle = AppServerHandle {
            child,
            base_url: base_url.to_string(),
        };

        // Wait for the application to be reachable
        if let Err(e) = handle
            .wait_for_healthy(Duration::from_secs(config.startup_timeout_secs))
            .await
        {
            let _ = handle.stop();
            return Err(e);
        }

        info!("Application is up at {}", base_url);
        Ok(handle)
    }

    /// Poll the base URL until it answers with a success status
    async fn wait_for_healthy(&mut self, timeout_duration: Duration) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            if let Some(status) = self.child.try_wait()? {
                return Err(E2eError::ServerStartup(format!(
                    "application exited early with {}",
                    status
                )));
            }

            match client.get(&self.base_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for application to start...");
                    }
                    // Connection refused is expected while the dev server compiles
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(500)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the application
    pub fn stop(&mut self) -> E2eResult<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        info!("Stopping application (pid: {})", self.child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        // Force kill if still running
        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for AppServerHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// How to start the application under test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppServerConfig {
    /// Program and arguments, e.g. `["npm", "start"]`
    pub command: Vec<String>,

    /// Directory to run the command in
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// How long to wait for the base URL to answer
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_secs: u64,
}

fn default_startup_timeout() -> u64 {
    180 // the Angular dev server compiles on first start
}

impl Default for AppServerConfig {
    fn default() -> Self {
        Self {
            command: vec!["npm".to_string(), "start".to_string()],
            working_dir: None,
            env: BTreeMap::new(),
            startup_timeout_secs: default_startup_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let config = AppServerConfig {
            command: vec![],
            ..Default::default()
        };
        let err = AppServerHandle::spawn(&config, "http://127.0.0.1:9").await.err().unwrap();
        assert!(matches!(err, E2eError::Config(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_early_exit_is_reported() {
        let config = AppServerConfig {
            command: vec!["false".to_string()],
            startup_timeout_secs: 10,
            ..Default::default()
        };
        let err = AppServerHandle::spawn(&config, "http://127.0.0.1:9").await.err().unwrap();
        assert!(matches!(err, E2eError::ServerStartup(_)));
    }
}

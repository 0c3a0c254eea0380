//! SSH port-forward to reach the database through a jump host.
//!
//! The export core never depends on this module — it only needs a reachable
//! endpoint. [`TunnelManager`] is the capability interface (establish, poll
//! liveness, terminate); [`SshTunnel`] implements it by spawning the system
//! `ssh` binary with a local forward, so there is no SSH protocol code here.
//!
//! The `tunnel` command establishes the forward, probes the database through
//! it, rewrites the config file so later runs use the forwarded port, and
//! holds the tunnel open until Ctrl-C.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::check;
use crate::config::{self, Config, TunnelConfig};
use crate::db;

/// How long the spawned ssh process gets to settle before the first
/// liveness check.
const ESTABLISH_SETTLE: Duration = Duration::from_secs(3);

/// An opaque tunnel resource: start it, ask if it is still up, tear it down.
pub trait TunnelManager {
    /// Start the tunnel. `Ok(false)` means the process exited before it
    /// settled (bad credentials, unreachable host); diagnostics have been
    /// printed already.
    fn establish(&mut self) -> Result<bool>;

    /// Whether the tunnel process is still running.
    fn is_alive(&mut self) -> bool;

    /// Tear the tunnel down and reap the process. Idempotent.
    fn terminate(&mut self);
}

/// [`TunnelManager`] backed by the system `ssh` binary.
pub struct SshTunnel {
    config: TunnelConfig,
    child: Option<Child>,
}

impl SshTunnel {
    pub fn new(config: TunnelConfig) -> Self {
        Self {
            config,
            child: None,
        }
    }
}

/// The ssh argument list for a forward described by `config`.
fn ssh_args(config: &TunnelConfig) -> Vec<String> {
    vec![
        "-N".to_string(),
        "-L".to_string(),
        format!(
            "{}:{}:{}",
            config.local_port, config.remote_host, config.remote_port
        ),
        "-p".to_string(),
        config.ssh_port.to_string(),
        format!("{}@{}", config.ssh_user, config.ssh_host),
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        "-o".to_string(),
        "LogLevel=ERROR".to_string(),
    ]
}

impl TunnelManager for SshTunnel {
    fn establish(&mut self) -> Result<bool> {
        let mut child = Command::new("ssh")
            .args(ssh_args(&self.config))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn ssh")?;

        // Give ssh time to authenticate and bind the local port.
        std::thread::sleep(ESTABLISH_SETTLE);

        match child.try_wait().context("failed to poll ssh")? {
            None => {
                self.child = Some(child);
                Ok(true)
            }
            Some(status) => {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = pipe.read_to_string(&mut stderr);
                }
                eprintln!("ssh exited with {} before the tunnel settled", status);
                if !stderr.trim().is_empty() {
                    eprintln!("{}", stderr.trim());
                }
                Ok(false)
            }
        }
    }

    fn is_alive(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn terminate(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for SshTunnel {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Run the tunnel command: forward, probe, rewrite config, hold open.
pub async fn run_tunnel(config: &Config, config_path: &Path) -> Result<()> {
    let tunnel_config = config
        .tunnel
        .as_ref()
        .context("no [tunnel] section in the config file")?
        .clone();
    let local_port = tunnel_config.local_port;

    println!(
        "Opening tunnel {}@{}:{} -> localhost:{} -> {}:{}",
        tunnel_config.ssh_user,
        tunnel_config.ssh_host,
        tunnel_config.ssh_port,
        local_port,
        tunnel_config.remote_host,
        tunnel_config.remote_port
    );

    let mut tunnel = SshTunnel::new(tunnel_config);
    if !tunnel.establish()? {
        anyhow::bail!("failed to establish the ssh tunnel");
    }

    // Probe the database through the forward before touching the config.
    let forwarded = config.database.with_endpoint("localhost", local_port);
    let pool = db::connect(&forwarded).await?;
    let probed = check::probe(&pool).await;
    pool.close().await;
    if let Err(err) = probed {
        tunnel.terminate();
        return Err(err.into());
    }

    config::rewrite_database_endpoint(config_path, "localhost", local_port)?;
    println!(
        "Updated {} to use localhost:{}",
        config_path.display(),
        local_port
    );
    println!();
    println!("Tunnel is up. Press Ctrl-C to close it.");

    let mut liveness = tokio::time::interval(Duration::from_secs(1));
    liveness.tick().await; // first tick fires immediately
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("failed to wait for Ctrl-C")?;
                break;
            }
            _ = liveness.tick() => {
                if !tunnel.is_alive() {
                    anyhow::bail!("ssh tunnel exited unexpectedly");
                }
            }
        }
    }

    tunnel.terminate();
    println!("Tunnel closed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssh_args_describe_the_forward() {
        let config = TunnelConfig {
            ssh_host: "jump.internal".to_string(),
            ssh_user: "ubuntu".to_string(),
            ssh_port: 22,
            local_port: 5433,
            remote_host: "10.0.0.5".to_string(),
            remote_port: 5432,
        };
        let args = ssh_args(&config);
        assert_eq!(args[0], "-N");
        assert_eq!(args[1], "-L");
        assert_eq!(args[2], "5433:10.0.0.5:5432");
        assert!(args.contains(&"ubuntu@jump.internal".to_string()));
        assert!(args.contains(&"StrictHostKeyChecking=no".to_string()));
    }
}

//! Environment diagnostics: store permissions, Automation permission,
//! Messages.app state and provider availability.

use imsg_core::traits::SendProvider;
use imsg_providers::{applescript::script::AUTOMATION_PROBE, ScriptRunner};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

/// Outcome of a single permission probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Authorized,
    Denied,
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub full_disk_access: PermissionState,
    pub automation_messages: PermissionState,
    pub contacts_access: PermissionState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub healthy: bool,
    pub permissions: Permissions,
    pub messages_app_running: bool,
    pub chat_db_exists: bool,
    pub chat_db_readable: bool,
    pub provider_chain_available: bool,
    pub errors: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Raw probe results, before they are judged.
#[derive(Debug, Clone)]
pub struct Probes {
    pub db_path: String,
    pub chat_db_exists: bool,
    pub full_disk_access: PermissionState,
    pub automation_messages: PermissionState,
    pub messages_app_running: bool,
    pub provider_chain_available: bool,
}

/// Run every probe and assemble the report.
pub async fn check(
    db_path: &str,
    runner: &dyn ScriptRunner,
    chain: &dyn SendProvider,
) -> HealthReport {
    let probes = Probes {
        db_path: db_path.to_string(),
        chat_db_exists: Path::new(db_path).exists(),
        full_disk_access: check_full_disk_access(db_path).await,
        automation_messages: check_automation(runner).await,
        messages_app_running: is_messages_running().await,
        provider_chain_available: chain.is_available().await,
    };
    assess(probes)
}

/// Read the first bytes of the store. macOS only allows this with Full Disk
/// Access.
pub async fn check_full_disk_access(db_path: &str) -> PermissionState {
    let result = async {
        let mut file = tokio::fs::File::open(db_path).await?;
        let mut buf = [0u8; 16];
        file.read(&mut buf).await
    }
    .await;

    match result {
        Ok(_) => PermissionState::Authorized,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => PermissionState::Denied,
        Err(e) => {
            debug!("full disk access probe inconclusive: {e}");
            PermissionState::Unknown
        }
    }
}

/// Ask System Events about Messages. Succeeds only with Automation permission.
pub async fn check_automation(runner: &dyn ScriptRunner) -> PermissionState {
    match runner.run(AUTOMATION_PROBE).await {
        Ok(reply) => match reply.trim() {
            "true" | "false" => PermissionState::Authorized,
            _ => PermissionState::Unknown,
        },
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("Not authorized") || msg.contains("(-1743)") {
                PermissionState::Denied
            } else {
                debug!("automation probe inconclusive: {msg}");
                PermissionState::Unknown
            }
        }
    }
}

/// `pgrep -x Messages`.
pub async fn is_messages_running() -> bool {
    match Command::new("pgrep").arg("-x").arg("Messages").output().await {
        Ok(output) => !String::from_utf8_lossy(&output.stdout).trim().is_empty(),
        Err(e) => {
            debug!("pgrep failed: {e}");
            false
        }
    }
}

/// Turn probe results into errors, recommendations and an overall verdict.
pub fn assess(probes: Probes) -> HealthReport {
    let mut errors = Vec::new();
    let mut recommendations = Vec::new();

    if !probes.chat_db_exists {
        errors.push(format!("chat.db not found at: {}", probes.db_path));
        recommendations.push(
            "Ensure Messages.app has been used at least once to create the database.".to_string(),
        );
    }

    if probes.full_disk_access == PermissionState::Denied {
        errors.push("Full Disk Access is denied.".to_string());
        recommendations.extend(
            [
                "Grant Full Disk Access to your terminal:",
                "1. Open System Settings > Privacy & Security > Full Disk Access",
                "2. Click + and add your terminal or editor app",
                "3. Restart the terminal",
            ]
            .map(String::from),
        );
    }

    if probes.automation_messages == PermissionState::Denied {
        errors.push("Automation permission for Messages.app is denied.".to_string());
        recommendations.extend(
            [
                "Grant Automation permission:",
                "1. Open System Settings > Privacy & Security > Automation",
                "2. Find your terminal app and enable \"Messages\"",
            ]
            .map(String::from),
        );
    }

    if !probes.messages_app_running {
        recommendations
            .push("Consider launching Messages.app so sending works reliably.".to_string());
    }

    if !probes.provider_chain_available {
        recommendations.push(
            "No send provider is currently available. Sends will still try every provider."
                .to_string(),
        );
    }

    let healthy = errors.is_empty() && probes.full_disk_access == PermissionState::Authorized;

    HealthReport {
        healthy,
        permissions: Permissions {
            full_disk_access: probes.full_disk_access,
            automation_messages: probes.automation_messages,
            contacts_access: PermissionState::Unknown,
        },
        messages_app_running: probes.messages_app_running,
        chat_db_exists: probes.chat_db_exists,
        chat_db_readable: probes.full_disk_access == PermissionState::Authorized
            && probes.chat_db_exists,
        provider_chain_available: probes.provider_chain_available,
        errors,
        recommendations,
    }
}

/// Human-readable rendering for `imsg health --pretty`.
pub fn format_report(report: &HealthReport) -> String {
    let mut lines = vec![
        "imsg health check".to_string(),
        String::new(),
        format!(
            "Overall: {}",
            if report.healthy { "HEALTHY" } else { "UNHEALTHY" }
        ),
        String::new(),
        "Permissions".to_string(),
        format!(
            "  Full Disk Access:     {}",
            state_label(report.permissions.full_disk_access)
        ),
        format!(
            "  Messages Automation:  {}",
            state_label(report.permissions.automation_messages)
        ),
        String::new(),
        "System".to_string(),
        format!("  chat.db exists:       {}", yes_no(report.chat_db_exists)),
        format!("  chat.db readable:     {}", yes_no(report.chat_db_readable)),
        format!(
            "  Messages.app running: {}",
            yes_no(report.messages_app_running)
        ),
        format!(
            "  Send provider ready:  {}",
            yes_no(report.provider_chain_available)
        ),
    ];

    if !report.errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors".to_string());
        lines.extend(report.errors.iter().map(|e| format!("  x {e}")));
    }

    if !report.recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations".to_string());
        lines.extend(report.recommendations.iter().map(|r| format!("  > {r}")));
    }

    lines.join("\n")
}

fn state_label(state: PermissionState) -> &'static str {
    match state {
        PermissionState::Authorized => "authorized",
        PermissionState::Denied => "DENIED",
        PermissionState::Unknown => "unknown",
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

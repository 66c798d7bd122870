//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Hent Doctor");
    println!();

    let checks = vec![
        check_tool(&settings.download.ytdlp_bin, "yt-dlp", "--version"),
        check_tool("ffmpeg", "ffmpeg", "-version"),
        check_temp_dir(settings),
        check_config_file(),
    ];

    for check in &checks {
        check.print();
    }

    println!();
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    if errors == 0 {
        Output::success("All checks passed.");
    } else {
        Output::error(&format!("{} check(s) failed.", errors));
    }

    Ok(())
}

/// Check if an external tool is available and report its version.
fn check_tool(bin: &str, name: &str, version_arg: &str) -> CheckResult {
    match Command::new(bin).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout.lines().next().unwrap_or("unknown version");
            CheckResult::ok(name, version.trim())
        }
        Ok(_) => CheckResult::warning(
            name,
            "installed but returned an error",
            "Try reinstalling it",
        ),
        Err(_) => CheckResult::error(
            name,
            "not found",
            &format!("Install {} and ensure it's in your PATH", name),
        ),
    }
}

/// Check that the temp directory exists (or can be created) and is writable.
fn check_temp_dir(settings: &Settings) -> CheckResult {
    let dir = settings.temp_dir();

    if let Err(e) = std::fs::create_dir_all(&dir) {
        return CheckResult::error(
            "temp dir",
            &format!("cannot create {:?}: {}", dir, e),
            "Set [general].temp_dir to a writable location",
        );
    }

    let probe = dir.join(".hent-doctor-probe");
    match std::fs::write(&probe, b"probe") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            CheckResult::ok("temp dir", &format!("{:?} is writable", dir))
        }
        Err(e) => CheckResult::error(
            "temp dir",
            &format!("{:?} is not writable: {}", dir, e),
            "Set [general].temp_dir to a writable location",
        ),
    }
}

/// Check whether a configuration file is present.
fn check_config_file() -> CheckResult {
    let path = Settings::default_config_path();
    if path.exists() {
        CheckResult::ok("config", &format!("{:?}", path))
    } else {
        CheckResult::warning(
            "config",
            "no config file, using defaults",
            &format!("Create {:?} to customize settings", path),
        )
    }
}

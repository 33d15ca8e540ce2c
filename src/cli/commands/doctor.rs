//! Doctor command - verify credentials and configuration.

use super::setup;
use crate::arcade::ToolProvider;
use crate::cli::Output;
use crate::config::env::{ARCADE_API_KEY_VAR, MODEL_VAR, OPENAI_API_KEY_VAR, USER_ID_VAR};
use crate::config::{ArcadeCredentials, Settings};
use console::style;
use std::path::{Path, PathBuf};

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

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub async fn run_doctor(
    settings: &Settings,
    config_path: Option<&PathBuf>,
    env_file: &Path,
) -> anyhow::Result<()> {
    Output::header("ytagent Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let lookup = |key: &str| std::env::var(key).ok();
    let mut checks = Vec::new();

    let credentials = vec![
        check_secret(ARCADE_API_KEY_VAR, lookup(ARCADE_API_KEY_VAR)),
        check_secret(OPENAI_API_KEY_VAR, lookup(OPENAI_API_KEY_VAR)),
        check_user_id(lookup(USER_ID_VAR)),
        check_model(lookup(MODEL_VAR), settings),
    ];
    print_section("Environment", &credentials);
    checks.extend(credentials);

    let config_path = config_path
        .cloned()
        .unwrap_or_else(Settings::default_config_path);
    let files = vec![
        check_config_file(&config_path),
        check_env_file(env_file),
        check_instruction_file(settings),
    ];
    print_section("Files", &files);
    checks.extend(files);

    let connectivity = vec![check_arcade(settings).await];
    print_section("Arcade", &connectivity);
    checks.extend(connectivity);

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before chatting.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! ytagent is ready to use.");
    }

    Ok(())
}

/// Show only the ends of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_secret(name: &str, value: Option<String>) -> CheckResult {
    let hint = format!("Add {}=... to your .env file", name);
    match value {
        Some(key) if key.trim().is_empty() => CheckResult::error(name, "empty", &hint),
        Some(key) => CheckResult::ok(name, &format!("configured ({})", mask(&key))),
        None => CheckResult::error(name, "not set", &hint),
    }
}

fn check_user_id(value: Option<String>) -> CheckResult {
    match value {
        Some(id) if !id.trim().is_empty() => CheckResult::ok(USER_ID_VAR, &id),
        _ => CheckResult::warning(
            USER_ID_VAR,
            "not set",
            "Add ARCADE_USER_ID=you@example.com to .env, or pass --user-id",
        ),
    }
}

fn check_model(value: Option<String>, settings: &Settings) -> CheckResult {
    match (value.filter(|v| !v.trim().is_empty()), &settings.agent.model) {
        (Some(model), _) => CheckResult::ok(MODEL_VAR, &model),
        (None, Some(model)) => CheckResult::ok(MODEL_VAR, &format!("{} (from config)", model)),
        (None, None) => CheckResult::warning(
            MODEL_VAR,
            "not set",
            "Add OPENAI_MODEL=gpt-4o-mini to .env, or pass --model",
        ),
    }
}

fn check_config_file(path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::ok("Config file", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override defaults", path.display()),
        )
    }
}

fn check_env_file(path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::ok("Env file", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Env file",
            &format!("{} not found", path.display()),
            "Variables must come from the shell environment",
        )
    }
}

fn check_instruction_file(settings: &Settings) -> CheckResult {
    match &settings.agent.instruction_file {
        None => CheckResult::ok("Instruction", "built-in"),
        Some(file) => {
            let path = Settings::expand_path(file);
            if path.is_file() {
                CheckResult::ok("Instruction", &format!("{}", path.display()))
            } else {
                CheckResult::error(
                    "Instruction",
                    &format!("{} not found", path.display()),
                    "Fix agent.instruction_file in the config",
                )
            }
        }
    }
}

/// Probe the Arcade API with a one-item listing.
async fn check_arcade(settings: &Settings) -> CheckResult {
    let credentials = ArcadeCredentials::from_env(settings);
    let name = "Arcade API";
    if credentials.api_key.is_none() {
        return CheckResult::warning(name, "skipped", "Set ARCADE_API_KEY to test connectivity");
    }

    let client = match setup::arcade_client(settings) {
        Ok(client) => client,
        Err(e) => return CheckResult::error(name, &e.to_string(), "Check ARCADE_BASE_URL"),
    };

    let Some(toolkit) = settings.arcade.toolkits.first() else {
        return CheckResult::warning(
            name,
            "no toolkit configured",
            "Set arcade.toolkits in the config",
        );
    };

    match client.list_tools(toolkit, 1, 0).await {
        Ok(page) => {
            let count = page
                .total_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| page.items.len().to_string());
            CheckResult::ok(
                name,
                &format!("{} reachable, {} tools in {}", credentials.base_url, count, toolkit),
            )
        }
        Err(e) => CheckResult::error(
            name,
            &e.to_string(),
            "Check ARCADE_API_KEY and ARCADE_BASE_URL",
        ),
    }
}

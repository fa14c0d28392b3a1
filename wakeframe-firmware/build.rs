//! Build script for wakeframe-firmware
//!
//! - Passes the esp-hal linker script
//! - Validates device.toml at compile time
//! - Requires the WiFi credentials in the build environment

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    setup_linker();
    check_secrets();
    validate_config();
}

/// Link against the esp-hal memory layout
fn setup_linker() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Fail early when the credentials `env!` needs are missing
fn check_secrets() {
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");

    let missing: Vec<&str> = ["WIFI_SSID", "WIFI_PASS"]
        .into_iter()
        .filter(|name| env::var(name).is_err())
        .collect();

    if !missing.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: WiFi credentials not set                                 ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            missing
                .iter()
                .map(|name| format!("║  • {:<62} ║", format!("{} is not set", name)))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Validate device.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds device.toml from the wakeframe-firmware     ║\n\
            ║  directory. Copy the sample from the repository and edit it.     ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_server(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_sync(&config, &mut errors);
    validate_sleep(&config, &mut errors);
    validate_battery(&config, &mut errors);
    validate_watchdog(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml validation failed                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SECTIONS: [(&str, &[&str]); 6] = [
    ("server", &["host", "port", "bitmap_path", "config_path"]),
    ("display", &["width", "height", "x", "y", "color", "firmware"]),
    (
        "sync",
        &[
            "max_attempts",
            "retry_delay_ms",
            "read_timeout_ms",
            "poll_interval_ms",
            "retry_on_bad_magic",
            "clear_on_failure",
            "honor_not_modified",
        ],
    ),
    ("sleep", &["normal_s", "temporary_error_s", "permanent_error_s"]),
    (
        "battery",
        &[
            "divider_x1000",
            "samples",
            "critical_mv",
            "min_mv",
            "max_mv",
            "linear_min_mv",
            "linear_max_mv",
        ],
    ),
    ("watchdog", &["timeout_s"]),
];

/// Only known sections and keys, and only inside sections
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let root = match config {
        toml::Value::Table(t) => t,
        _ => return,
    };

    for (name, value) in root {
        let Some((_, keys)) = SECTIONS.iter().find(|(section, _)| *section == name.as_str()) else {
            errors.push(format!("unknown key or section '{}'", name));
            continue;
        };
        let toml::Value::Table(table) = value else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
            if matches!(table.get(key), Some(toml::Value::Table(_))) {
                errors.push(format!("[{}.{}] nested tables are not supported", name, key));
            }
        }
    }

    if config.get("server").is_none() {
        errors.push("Missing [server] section - host is required".to_string());
    }
}

fn int(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

/// Check an optional integer key lies in `min..=max`
fn check_range(
    config: &toml::Value,
    errors: &mut Vec<String>,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
) {
    let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
        return;
    };
    match value.as_integer() {
        Some(v) if (min..=max).contains(&v) => {}
        Some(_) => errors.push(format!("[{}] {} must be {}-{}", section, key, min, max)),
        None => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

fn check_bool(config: &toml::Value, errors: &mut Vec<String>, section: &str, key: &str) {
    if let Some(value) = config.get(section).and_then(|s| s.get(key)) {
        if !value.is_bool() {
            errors.push(format!("[{}] {} must be true or false", section, key));
        }
    }
}

/// Check an optional string key is at most `max_len` bytes
fn check_string(
    config: &toml::Value,
    errors: &mut Vec<String>,
    section: &str,
    key: &str,
    max_len: usize,
) -> Option<String> {
    let value = config.get(section).and_then(|s| s.get(key))?;
    match value.as_str() {
        Some(s) if s.len() <= max_len => Some(s.to_string()),
        Some(_) => {
            errors.push(format!("[{}] {} is longer than {} bytes", section, key, max_len));
            None
        }
        None => {
            errors.push(format!("[{}] {} must be a string", section, key));
            None
        }
    }
}

fn validate_server(config: &toml::Value, errors: &mut Vec<String>) {
    match check_string(config, errors, "server", "host", 64) {
        Some(host) if host.is_empty() => errors.push("[server] host must not be empty".into()),
        Some(_) => {}
        None if config.get("server").is_some() => {
            errors.push("[server] missing 'host'".to_string())
        }
        None => {}
    }
    check_range(config, errors, "server", "port", 1, 65_535);

    for key in ["bitmap_path", "config_path"] {
        if let Some(path) = check_string(config, errors, "server", key, 64) {
            if !path.starts_with('/') {
                errors.push(format!("[server] {} must start with '/'", key));
            }
        }
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, errors, "display", "width", 1, 800);
    check_range(config, errors, "display", "height", 1, 480);
    check_range(config, errors, "display", "x", 0, 799);
    check_range(config, errors, "display", "y", 0, 479);
    check_string(config, errors, "display", "firmware", 16);

    if let Some(color) = check_string(config, errors, "display", "color", 8) {
        if !["bw", "3c"].contains(&color.to_ascii_lowercase().as_str()) {
            errors.push("[display] color must be 'bw' or '3c'".to_string());
        }
    }

    if let Some(x) = int(config, "display", "x") {
        if x % 8 != 0 {
            errors.push("[display] x must be a multiple of 8".to_string());
        }
        let width = int(config, "display", "width").unwrap_or(800);
        if x + width > 800 {
            errors.push("[display] x + width exceeds the 800 px panel".to_string());
        }
    }
    if let Some(y) = int(config, "display", "y") {
        let height = int(config, "display", "height").unwrap_or(480);
        if y + height > 480 {
            errors.push("[display] y + height exceeds the 480 px panel".to_string());
        }
    }
}

fn validate_sync(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, errors, "sync", "max_attempts", 1, 20);
    check_range(config, errors, "sync", "retry_delay_ms", 0, 60_000);
    check_range(config, errors, "sync", "read_timeout_ms", 1, 60_000);
    check_range(config, errors, "sync", "poll_interval_ms", 1, 1_000);
    for key in ["retry_on_bad_magic", "clear_on_failure", "honor_not_modified"] {
        check_bool(config, errors, "sync", key);
    }
}

fn validate_sleep(config: &toml::Value, errors: &mut Vec<String>) {
    for key in ["normal_s", "temporary_error_s", "permanent_error_s"] {
        check_range(config, errors, "sleep", key, 1, 7 * 24 * 3600);
    }
}

fn validate_battery(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, errors, "battery", "divider_x1000", 1, 100_000);
    check_range(config, errors, "battery", "samples", 1, 64);
    for key in ["critical_mv", "min_mv", "max_mv", "linear_min_mv", "linear_max_mv"] {
        check_range(config, errors, "battery", key, 0, 20_000);
    }

    if let (Some(lo), Some(hi)) = (
        int(config, "battery", "linear_min_mv"),
        int(config, "battery", "linear_max_mv"),
    ) {
        if lo >= hi {
            errors.push("[battery] linear_min_mv must be below linear_max_mv".to_string());
        }
    }
}

fn validate_watchdog(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, errors, "watchdog", "timeout_s", 10, 600);
}

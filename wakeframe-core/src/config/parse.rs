//! Line parser for `device.toml`
//!
//! Handles only the subset the device file uses:
//! - `[section]` headers
//! - `key = value` pairs (string, integer, boolean)
//! - Comments (`# ...`), whole-line or trailing
//!
//! Anything else, including unknown sections and keys, is an error. The
//! build script checks the same file with a full TOML parser, so errors
//! here mean the two disagree.

use heapless::String;
use wakeframe_protocol::ColorMode;

use super::types::DeviceConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value has the wrong type or range
    InvalidValue,
    /// String value longer than its field
    ValueTooLong,
    /// Line is neither a header nor `key = value`
    MalformedLine,
    /// `[server] host` was not given
    MissingHost,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Server,
    Display,
    Sync,
    Sleep,
    Battery,
    Watchdog,
}

/// Parse `device.toml` into a [`DeviceConfig`]
pub fn parse_config(input: &str) -> Result<DeviceConfig, ParseError> {
    let mut config = DeviceConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(strip_comment(line))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::MalformedLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    if config.server.host.is_empty() {
        return Err(ParseError::MissingHost);
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let name = header
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?
        .trim();

    match name {
        "server" => Ok(Section::Server),
        "display" => Ok(Section::Display),
        "sync" => Ok(Section::Sync),
        "sleep" => Ok(Section::Sleep),
        "battery" => Ok(Section::Battery),
        "watchdog" => Ok(Section::Watchdog),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Cut at the first `#` outside a quoted string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (pos, ch) in line.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return line[..pos].trim(),
            _ => {}
        }
    }
    line
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ParseError::InvalidValue)
    }
}

fn parse_heapless<const N: usize>(value: &str) -> Result<String<N>, ParseError> {
    String::try_from(parse_string(value)?).map_err(|_| ParseError::ValueTooLong)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    // TOML allows 1_000 style separators
    let mut digits: String<24> = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_color(value: &str) -> Result<ColorMode, ParseError> {
    ColorMode::parse(parse_string(value)?).ok_or(ParseError::InvalidValue)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeviceConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::UnknownKey),
        Section::Server => {
            let server = &mut config.server;
            match key {
                "host" => server.host = parse_heapless(value)?,
                "port" => server.port = parse_int(value)?,
                "bitmap_path" => server.bitmap_path = parse_heapless(value)?,
                "config_path" => server.config_path = parse_heapless(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Display => {
            let display = &mut config.display;
            match key {
                "width" => display.width = parse_int(value)?,
                "height" => display.height = parse_int(value)?,
                "x" => display.x = parse_int(value)?,
                "y" => display.y = parse_int(value)?,
                "color" => display.color = parse_color(value)?,
                "firmware" => display.firmware = parse_heapless(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Sync => {
            let sync = &mut config.sync;
            match key {
                "max_attempts" => sync.policy.max_attempts = parse_int(value)?,
                "retry_delay_ms" => sync.policy.retry_delay_ms = parse_int(value)?,
                "retry_on_bad_magic" => sync.policy.retry_on_bad_magic = parse_bool(value)?,
                "clear_on_failure" => sync.policy.clear_on_failure = parse_bool(value)?,
                "honor_not_modified" => sync.policy.honor_not_modified = parse_bool(value)?,
                "read_timeout_ms" => sync.timeouts.read_timeout_ms = parse_int(value)?,
                "poll_interval_ms" => sync.timeouts.poll_interval_ms = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Sleep => {
            let sleep = &mut config.sleep;
            match key {
                "normal_s" => sleep.normal_s = parse_int(value)?,
                "temporary_error_s" => sleep.temporary_error_s = parse_int(value)?,
                "permanent_error_s" => sleep.permanent_error_s = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Battery => {
            let battery = &mut config.battery;
            match key {
                "divider_x1000" => battery.divider_x1000 = parse_int(value)?,
                "samples" => battery.samples = parse_int(value)?,
                "critical_mv" => battery.critical_mv = parse_int(value)?,
                "min_mv" => battery.min_mv = parse_int(value)?,
                "max_mv" => battery.max_mv = parse_int(value)?,
                "linear_min_mv" => battery.linear_min_mv = parse_int(value)?,
                "linear_max_mv" => battery.linear_max_mv = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Watchdog => match key {
            "timeout_s" => config.watchdog.timeout_s = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
    }

    Ok(())
}

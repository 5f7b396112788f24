/// Configuration resolution module
///
/// This module handles:
/// - Reading the optional TOML configuration file
/// - Overlaying process environment variables on top of it
/// - Applying defaults and validating every value up front
///
/// Resolution works over an injected lookup so tests never touch the real
/// environment. A missing or malformed required value is fatal: nothing is
/// fetched or sent until configuration resolves.
use crate::compose::EmailComposer;
use crate::error::AllocationError;
use crate::report::{ProjectLabels, ReportFormatter};
use chrono::NaiveTime;
use log::debug;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const SHEET_URL: &str = "SHEET_URL";
pub const SERVICE_ACCOUNT_FILE: &str = "SERVICE_ACCOUNT_FILE";
pub const EMAIL_USERNAME: &str = "EMAIL_USERNAME";
pub const EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";
pub const RECIPIENTS: &str = "RECIPIENTS";
pub const CC_RECIPIENT: &str = "CC_RECIPIENT";
pub const SMTP_SERVER: &str = "SMTP_SERVER";
pub const SMTP_PORT: &str = "SMTP_PORT";
pub const SENDER_NAME: &str = "SENDER_NAME";
pub const EMAIL_DOMAIN: &str = "EMAIL_DOMAIN";
pub const PROJECT_NAMES: &str = "PROJECT_NAMES";
pub const SCHEDULE_TIME: &str = "SCHEDULE_TIME";
pub const SKIP_EMPTY_REPORTS: &str = "SKIP_EMPTY_REPORTS";
pub const LOCK_FILE: &str = "LOCK_FILE";

/// Keys that must resolve to a non-blank value
const REQUIRED: [&str; 5] = [SHEET_URL, SERVICE_ACCOUNT_FILE, EMAIL_USERNAME, EMAIL_PASSWORD, RECIPIENTS];

/// Every key the resolver reads, in documentation order
pub const ALL_KEYS: [&str; 14] = [
    SHEET_URL,
    SERVICE_ACCOUNT_FILE,
    EMAIL_USERNAME,
    EMAIL_PASSWORD,
    RECIPIENTS,
    CC_RECIPIENT,
    SMTP_SERVER,
    SMTP_PORT,
    SENDER_NAME,
    EMAIL_DOMAIN,
    PROJECT_NAMES,
    SCHEDULE_TIME,
    SKIP_EMPTY_REPORTS,
    LOCK_FILE,
];

const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SENDER_NAME: &str = "Falak";
const DEFAULT_SCHEDULE_TIME: &str = "21:00";

pub const DEFAULT_PROJECT_NAMES: [&str; 8] = [
    "ISB",
    "Operations",
    "OutCaller AI",
    "Claypot Website",
    "Hiranandani School",
    "Calton EMS",
    "OutRiskAI",
    "Adhoc",
];

/// Spreadsheet access settings
#[derive(Debug, Clone, PartialEq)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    pub service_account_file: PathBuf,
}

/// SMTP relay settings; `username` doubles as the sender address
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub sheet: SheetConfig,
    pub smtp: SmtpConfig,
    pub sender_name: String,
    pub recipients: Vec<String>,
    pub cc: Option<String>,
    pub email_domain: String,
    pub project_names: ProjectLabels,
    pub schedule_at: NaiveTime,
    pub skip_empty_reports: bool,
    pub lock_file: PathBuf,
}

impl Config {
    /// Resolve configuration from the optional file and the process environment
    ///
    /// An explicit `path` must exist; without one, the platform default
    /// location is used only if a file is there.
    pub fn load(path: Option<&Path>) -> Result<Self, AllocationError> {
        let file_values = file_layer(path)?;
        Self::resolve(&file_values, |key| env::var(key).ok())
    }

    /// Resolve configuration from file values and an environment lookup
    ///
    /// Environment values win over file values; blank values count as unset.
    pub fn resolve<F>(file_values: &HashMap<String, String>, env_lookup: F) -> Result<Self, AllocationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| -> Option<String> {
            env_lookup(key)
                .or_else(|| file_values.get(key).cloned())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing: Vec<String> = REQUIRED.iter().filter(|&&k| lookup(k).is_none()).map(|k| k.to_string()).collect();

        let recipients = lookup(RECIPIENTS).map(|v| parse_list(&v)).unwrap_or_default();
        if recipients.is_empty() && !missing.iter().any(|k| k == RECIPIENTS) {
            missing.push(RECIPIENTS.to_string());
        }

        if !missing.is_empty() {
            return Err(AllocationError::MissingConfig(missing));
        }

        // Required keys are present past this point
        let required = |key: &str| lookup(key).unwrap_or_default();

        let sheet = SheetConfig {
            spreadsheet_id: spreadsheet_id_from_url(&required(SHEET_URL))?,
            service_account_file: PathBuf::from(required(SERVICE_ACCOUNT_FILE)),
        };

        let port = match lookup(SMTP_PORT) {
            Some(v) => v.parse::<u16>().map_err(|e| AllocationError::invalid(SMTP_PORT, format!("'{}': {}", v, e)))?,
            None => DEFAULT_SMTP_PORT,
        };

        let smtp = SmtpConfig {
            host: lookup(SMTP_SERVER).unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
            port,
            username: required(EMAIL_USERNAME),
            password: required(EMAIL_PASSWORD),
        };

        let email_domain = match lookup(EMAIL_DOMAIN) {
            Some(domain) => domain,
            None => domain_of(&smtp.username).ok_or_else(|| {
                AllocationError::invalid(EMAIL_DOMAIN, format!("not set and {} has no domain part", EMAIL_USERNAME))
            })?,
        };

        let project_names = project_labels_from(lookup(PROJECT_NAMES))?;

        let schedule_at = parse_time(SCHEDULE_TIME, &lookup(SCHEDULE_TIME).unwrap_or_else(|| DEFAULT_SCHEDULE_TIME.to_string()))?;

        let skip_empty_reports = match lookup(SKIP_EMPTY_REPORTS) {
            Some(v) => parse_bool(SKIP_EMPTY_REPORTS, &v)?,
            None => false,
        };

        let lock_file = lookup(LOCK_FILE).map(PathBuf::from).unwrap_or_else(default_lock_path);

        debug!(
            "configuration resolved: {} recipients, {} projects, schedule {}",
            recipients.len(),
            project_names.as_slice().len(),
            schedule_at
        );

        Ok(Config {
            sheet,
            smtp,
            sender_name: lookup(SENDER_NAME).unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
            recipients,
            cc: lookup(CC_RECIPIENT),
            email_domain,
            project_names,
            schedule_at,
            skip_empty_reports,
            lock_file,
        })
    }

    pub fn composer(&self) -> EmailComposer {
        EmailComposer {
            sender_name: self.sender_name.clone(),
            sender_address: self.smtp.username.clone(),
            recipients: self.recipients.clone(),
            cc: self.cc.clone(),
            domain: self.email_domain.clone(),
        }
    }

    pub fn formatter(&self) -> ReportFormatter {
        ReportFormatter::new(self.project_names.clone())
    }
}

/// Project labels alone, for formatting without the rest of the configuration
///
/// Uses the same layering as `Config::load` but requires nothing else.
pub fn load_project_labels(path: Option<&Path>) -> Result<ProjectLabels, AllocationError> {
    let file_values = file_layer(path)?;
    resolve_project_labels(&file_values, |key| env::var(key).ok())
}

pub fn resolve_project_labels<F>(file_values: &HashMap<String, String>, env_lookup: F) -> Result<ProjectLabels, AllocationError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = env_lookup(PROJECT_NAMES).or_else(|| file_values.get(PROJECT_NAMES).cloned()).filter(|v| !v.trim().is_empty());
    project_labels_from(value)
}

fn project_labels_from(value: Option<String>) -> Result<ProjectLabels, AllocationError> {
    let labels = match value {
        Some(v) => ProjectLabels::new(parse_list(&v)),
        None => ProjectLabels::new(DEFAULT_PROJECT_NAMES),
    };
    if labels.is_empty() {
        return Err(AllocationError::invalid(PROJECT_NAMES, "no project names given"));
    }
    Ok(labels)
}

/// File values from an explicit path, or from the default location if a file is there
///
/// An explicit path must exist.
fn file_layer(path: Option<&Path>) -> Result<HashMap<String, String>, AllocationError> {
    match path {
        Some(p) => load_file(p),
        None => match default_config_path() {
            Some(p) if p.exists() => load_file(&p),
            _ => Ok(HashMap::new()),
        },
    }
}

/// Default configuration file location
/// - Linux: ~/.config/daily-allocation/config.toml
/// - macOS: ~/Library/Application Support/daily-allocation/config.toml
/// - Windows: %APPDATA%/daily-allocation/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("daily-allocation").join("config.toml"))
}

/// Default run lock location (platform cache directory)
pub fn default_lock_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("daily-allocation"))
        .unwrap_or_else(|| PathBuf::from(".daily-allocation"))
        .join("run.lock")
}

/// Read a flat TOML table into upper-cased key/value strings
///
/// Keys are the environment names in any case (`sheet_url` or `SHEET_URL`).
/// Arrays of strings are joined with commas, like the list variables.
pub fn load_file(path: &Path) -> Result<HashMap<String, String>, AllocationError> {
    debug!("reading configuration file {:?}", path);
    let text = fs::read_to_string(path)
        .map_err(|e| AllocationError::invalid("--config", format!("failed to read {}: {}", path.display(), e)))?;
    parse_file(&text).map_err(|reason| AllocationError::invalid("--config", format!("{}: {}", path.display(), reason)))
}

fn parse_file(text: &str) -> Result<HashMap<String, String>, String> {
    let table: toml::Table = toml::from_str(text).map_err(|e| format!("invalid TOML: {}", e))?;

    let mut values = HashMap::new();
    for (key, value) in table {
        let key = key.to_uppercase();
        if !ALL_KEYS.contains(&key.as_str()) {
            return Err(format!("unknown key '{}'", key.to_lowercase()));
        }
        let text = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    toml::Value::String(s) => Ok(s.clone()),
                    other => Err(format!("'{}' must be a list of strings, found {}", key.to_lowercase(), other)),
                })
                .collect::<Result<Vec<_>, _>>()?
                .join(","),
            other => return Err(format!("'{}' has unsupported type {}", key.to_lowercase(), other.type_str())),
        };
        values.insert(key, text);
    }
    Ok(values)
}

/// Extract the spreadsheet id from a `.../d/<id>/...` URL, or accept a bare id
pub fn spreadsheet_id_from_url(url: &str) -> Result<String, AllocationError> {
    let url = url.trim();
    let id = match url.split_once("/d/") {
        Some((_, rest)) => rest.split(['/', '?', '#']).next().unwrap_or(""),
        None if !url.contains('/') => url,
        None => "",
    };

    if id.is_empty() {
        return Err(AllocationError::invalid(SHEET_URL, format!("no spreadsheet id in '{}'", url)));
    }
    Ok(id.to_string())
}

/// Comma-separated list with blanks dropped
pub fn parse_list(value: &str) -> Vec<String> {
    value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).map(|s| s.to_string()).collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AllocationError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AllocationError::invalid(key, format!("'{}' is not a boolean", value))),
    }
}

fn parse_time(key: &str, value: &str) -> Result<NaiveTime, AllocationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| AllocationError::invalid(key, format!("'{}' is not HH:MM: {}", value, e)))
}

fn domain_of(address: &str) -> Option<String> {
    address.rsplit_once('@').map(|(_, d)| d.trim_end_matches('>').to_string()).filter(|d| !d.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

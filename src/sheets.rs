/// Google Sheets data source
///
/// This module handles:
/// - Service-account authentication (signed JWT exchanged for an access token)
/// - Locating the sheet whose title contains the requested date
/// - Fetching that sheet's cell range as a grid
///
/// Fetch failures are logged and turned into an empty grid; only an
/// unreadable service-account key is reported, when the client is built.
use crate::calendar;
use crate::config::{SERVICE_ACCOUNT_FILE, SheetConfig};
use crate::error::AllocationError;
use crate::source::{DataSource, cell_text};
use crate::types::Grid;
use chrono::NaiveDate;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::fs;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

const USER_AGENT: &str = concat!("daily-allocation/", env!("CARGO_PKG_VERSION"));
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Bounded rectangle read from the matching sheet
const CELL_RANGE: &str = "A1:Z1000";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Refresh a cached token this long before Google expires it
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Why a fetch came back empty
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("unexpected response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

#[derive(Debug, serde::Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, serde::Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, serde::Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, serde::Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId", default)]
    sheet_id: i64,
    title: String,
}

#[derive(Debug, serde::Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Read-only Google Sheets client for one spreadsheet
pub struct SheetsClient {
    spreadsheet_id: String,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
    agent: ureq::Agent,
    token: Mutex<Option<CachedToken>>,
}

impl SheetsClient {
    /// Build a client, loading the service-account key up front
    pub fn new(config: &SheetConfig) -> Result<Self, AllocationError> {
        let path = &config.service_account_file;
        debug!("loading service account key from {:?}", path);

        let text = fs::read_to_string(path)
            .map_err(|e| AllocationError::invalid(SERVICE_ACCOUNT_FILE, format!("{}: {}", path.display(), e)))?;
        let key: ServiceAccountKey = serde_json::from_str(&text)
            .map_err(|e| AllocationError::invalid(SERVICE_ACCOUNT_FILE, format!("{}: {}", path.display(), e)))?;
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AllocationError::invalid(SERVICE_ACCOUNT_FILE, format!("{}: bad private key: {}", path.display(), e))
        })?;

        let agent = ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).user_agent(USER_AGENT).build();

        Ok(SheetsClient {
            spreadsheet_id: config.spreadsheet_id.clone(),
            client_email: key.client_email,
            token_uri: key.token_uri,
            signing_key,
            agent,
            token: Mutex::new(None),
        })
    }

    /// Fetch the grid for `date`, reporting why it failed
    ///
    /// `Ok` with an empty grid means no sheet title contains the date.
    pub fn try_fetch(&self, date: NaiveDate) -> Result<Grid, SheetsError> {
        let fragment = calendar::sheet_date(date);
        let titles = self.sheet_titles()?;

        let Some(title) = find_sheet_title(&titles, &fragment) else {
            info!("No sheet found for date: {}", fragment);
            return Ok(Grid::new());
        };

        debug!("using sheet '{}' for {}", title, fragment);
        self.sheet_values(title)
    }

    /// Titles of every sheet in the spreadsheet, in tab order
    pub fn sheet_titles(&self) -> Result<Vec<String>, SheetsError> {
        let url = format!("{}/{}?fields=sheets.properties", SHEETS_API, encode_path_segment(&self.spreadsheet_id));
        let meta: SpreadsheetMeta = self.get_json(&url)?;
        for sheet in &meta.sheets {
            debug!("sheet {} '{}'", sheet.properties.sheet_id, sheet.properties.title);
        }
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    /// Cell values of one sheet (bounded to A1:Z1000)
    pub fn sheet_values(&self, title: &str) -> Result<Grid, SheetsError> {
        let url = format!(
            "{}/{}/values/{}",
            SHEETS_API,
            encode_path_segment(&self.spreadsheet_id),
            encode_path_segment(&range_for(title))
        );
        let range: ValueRange = self.get_json(&url)?;
        Ok(range.values.into_iter().map(|row| row.into_iter().map(cell_text).collect()).collect())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SheetsError> {
        let token = self.access_token()?;
        debug!("GET {}", url);

        let body = self
            .agent
            .get(url)
            .set("Authorization", &format!("Bearer {}", token))
            .call()
            .map_err(|e| SheetsError::Http { url: url.to_string(), reason: e.to_string() })?
            .into_string()
            .map_err(|e| SheetsError::Http { url: url.to_string(), reason: e.to_string() })?;

        serde_json::from_str(&body).map_err(|e| SheetsError::Malformed { url: url.to_string(), reason: e.to_string() })
    }

    /// Cached access token, refreshed shortly before it expires
    fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(ref token) = *cached
            && Instant::now() < token.refresh_at
        {
            return Ok(token.token.clone());
        }

        let fresh = self.request_token()?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    fn request_token(&self) -> Result<CachedToken, SheetsError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: READONLY_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?;

        debug!("requesting access token for {}", self.client_email);
        let url = self.token_uri.as_str();
        let body = self
            .agent
            .post(url)
            .send_form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .map_err(|e| SheetsError::Http { url: url.to_string(), reason: e.to_string() })?
            .into_string()
            .map_err(|e| SheetsError::Http { url: url.to_string(), reason: e.to_string() })?;

        let response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SheetsError::Malformed { url: url.to_string(), reason: e.to_string() })?;

        let lifetime = Duration::from_secs(response.expires_in.unwrap_or(TOKEN_LIFETIME_SECS as u64));
        Ok(CachedToken {
            token: response.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        })
    }
}

impl DataSource for SheetsClient {
    fn fetch_grid(&self, date: NaiveDate) -> Grid {
        match self.try_fetch(date) {
            Ok(grid) => grid,
            Err(e) => {
                warn!("Error fetching data for {}: {}", calendar::long_date(date), e);
                Grid::new()
            }
        }
    }
}

/// First title containing the "DD Month" fragment
pub fn find_sheet_title<'a>(titles: &'a [String], fragment: &str) -> Option<&'a str> {
    titles.iter().find(|t| t.contains(fragment)).map(|t| t.as_str())
}

/// A1-notation range for a sheet title, quoted so spaces and digits are safe
pub fn range_for(title: &str) -> String {
    format!("'{}'!{}", title.replace('\'', "''"), CELL_RANGE)
}

/// Percent-encode a URL path segment (quotes, spaces, `!` and `:` in ranges)
pub fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

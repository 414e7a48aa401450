use std::fs;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::a1;
use super::{ServiceError, SpreadsheetService};
use crate::model::{CellRef, CellValue, DestinationSheetRef, GridSize};

/// Base URL of the public Sheets API.
pub const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com";

const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Grid the API gives a new sheet when no size is requested.
const DEFAULT_ROW_COUNT: u32 = 1000;
const DEFAULT_COLUMN_COUNT: u32 = 26;

/// The fields of a service-account key file used for authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Loads a key from the JSON file downloaded from the cloud console.
    pub fn from_file(path: &Path) -> Result<Self, ServiceError> {
        if !path.is_file() {
            return Err(ServiceError::CredentialsNotFound(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)
            .map_err(|error| ServiceError::Credentials(format!("{}: {error}", path.display())))?;
        serde_json::from_str(&data)
            .map_err(|error| ServiceError::Credentials(format!("{}: {error}", path.display())))
    }

    /// Builds the signed assertion exchanged for an access token.
    fn assertion(&self, issued_at: u64) -> Result<String, ServiceError> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|error| ServiceError::Credentials(format!("private key: {error}")))?;
        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|error| ServiceError::Credentials(format!("signing assertion: {error}")))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<Reply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Reply {
    add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Deserialize)]
struct AddSheetReply {
    properties: SheetProperties,
}

/// Blocking client for one destination spreadsheet.
pub struct GoogleSheetsClient {
    http: Client,
    key: ServiceAccountKey,
    spreadsheet_id: String,
    endpoint: String,
    token: Option<AccessToken>,
}

impl GoogleSheetsClient {
    /// Loads the service-account key at `credentials` and authenticates
    /// against the token endpoint.
    #[instrument(level = "info", skip_all, fields(spreadsheet = %spreadsheet_id))]
    pub fn connect(spreadsheet_id: &str, credentials: &Path) -> Result<Self, ServiceError> {
        let key = ServiceAccountKey::from_file(credentials)?;
        let mut client = Self::new(spreadsheet_id, key)?;
        client.access_token()?;
        debug!(account = %client.key.client_email, "authenticated service account");
        Ok(client)
    }

    /// Creates a client without contacting the API.
    pub fn new(spreadsheet_id: &str, key: ServiceAccountKey) -> Result<Self, ServiceError> {
        Ok(Self {
            http: Client::builder().build()?,
            key,
            spreadsheet_id: spreadsheet_id.to_string(),
            endpoint: SHEETS_ENDPOINT.to_string(),
            token: None,
        })
    }

    /// Points the client at another API root, e.g. a local emulator.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.endpoint, self.spreadsheet_id)
    }

    fn access_token(&mut self) -> Result<String, ServiceError> {
        if let Some(token) = self.token.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.value.clone());
        }

        let issued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let assertion = self.key.assertion(issued_at)?;
        let requested_at = Instant::now();
        let request = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]);
        let response: TokenResponse = execute(request)?;
        debug!(expires_in = response.expires_in, "obtained access token");

        let value = response.access_token;
        self.token = Some(AccessToken {
            value: value.clone(),
            expires_at: requested_at + Duration::from_secs(response.expires_in),
        });
        Ok(value)
    }
}

impl SpreadsheetService for GoogleSheetsClient {
    fn sheet_names(&mut self) -> Result<Vec<String>, ServiceError> {
        let token = self.access_token()?;
        let request = self
            .http
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .bearer_auth(token);
        let response: SpreadsheetResponse = execute(request)?;
        Ok(response
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    fn create_sheet(
        &mut self,
        title: &str,
        size: GridSize,
    ) -> Result<DestinationSheetRef, ServiceError> {
        let token = self.access_token()?;
        let request = self
            .http
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .bearer_auth(token)
            .json(&add_sheet_request(title, size));
        let response: BatchUpdateResponse = execute(request)?;
        parse_added_sheet(response)
    }

    fn write_values(
        &mut self,
        sheet: &DestinationSheetRef,
        origin: CellRef,
        rows: &[Vec<CellValue>],
    ) -> Result<(), ServiceError> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let range = a1::block_range(&sheet.name, origin, rows.len() as u32, width);
        debug!(%range, "writing values");

        let token = self.access_token()?;
        let request = self
            .http
            .post(format!("{}/values:batchUpdate", self.spreadsheet_url()))
            .bearer_auth(token)
            .json(&values_update_request(&range, rows));
        let _: Value = execute(request)?;
        Ok(())
    }
}

/// Sends `request` and decodes a JSON body, turning non-success statuses into
/// [`ServiceError::Api`].
fn execute<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ServiceError> {
    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ServiceError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(response.json()?)
}

/// Extracts a readable message from an error body.
///
/// The Sheets API wraps errors as `{"error": {"message": ...}}` while the
/// token endpoint answers `{"error": ..., "error_description": ...}`.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
        return message.to_string();
    }
    match (
        value.get("error").and_then(Value::as_str),
        value.get("error_description").and_then(Value::as_str),
    ) {
        (Some(error), Some(description)) => format!("{error}: {description}"),
        (Some(error), None) => error.to_string(),
        _ => body.trim().to_string(),
    }
}

fn add_sheet_request(title: &str, size: GridSize) -> Value {
    json!({
        "requests": [{
            "addSheet": {
                "properties": {
                    "title": title,
                    "gridProperties": {
                        "rowCount": size.rows.max(DEFAULT_ROW_COUNT),
                        "columnCount": size.columns.max(DEFAULT_COLUMN_COUNT),
                    }
                }
            }
        }]
    })
}

fn values_update_request(range: &str, rows: &[Vec<CellValue>]) -> Value {
    let values: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| row.iter().map(CellValue::to_json).collect())
        .collect();
    json!({
        "valueInputOption": "RAW",
        "data": [{
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        }]
    })
}

fn parse_added_sheet(response: BatchUpdateResponse) -> Result<DestinationSheetRef, ServiceError> {
    let properties = response
        .replies
        .into_iter()
        .find_map(|reply| reply.add_sheet)
        .map(|reply| reply.properties)
        .ok_or_else(|| ServiceError::UnexpectedResponse("missing addSheet reply".into()))?;
    Ok(DestinationSheetRef {
        name: properties.title,
        remote_id: properties.sheet_id,
    })
}

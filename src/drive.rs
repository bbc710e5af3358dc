use std::fs::File;
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::FileId;
use crate::error::SetupError;

pub trait DriveClient: Send + Sync {
    fn download_file(&self, id: &FileId, destination: &Path) -> Result<(), SetupError>;
}

#[derive(Clone)]
pub struct DriveHttpClient {
    client: Client,
}

impl DriveHttpClient {
    pub fn new() -> Result<Self, SetupError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("cxr-setup/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SetupError::DriveHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| SetupError::DriveHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn download_url(id: &FileId) -> String {
        format!("https://drive.google.com/uc?export=download&id={id}")
    }

    fn confirm_url(id: &FileId, form: &ConfirmForm) -> String {
        let mut url = format!(
            "https://drive.usercontent.google.com/download?id={id}&export=download&confirm={}",
            form.confirm
        );
        if let Some(uuid) = &form.uuid {
            url.push_str("&uuid=");
            url.push_str(uuid);
        }
        url
    }

    fn write_response_to_file(
        mut response: reqwest::blocking::Response,
        destination: &Path,
    ) -> Result<(), SetupError> {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| SetupError::Filesystem(err.to_string()))?;
        }
        let mut file =
            File::create(destination).map_err(|err| SetupError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| SetupError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

impl DriveClient for DriveHttpClient {
    fn download_file(&self, id: &FileId, destination: &Path) -> Result<(), SetupError> {
        let url = Self::download_url(id);
        tracing::debug!(%url, "requesting archive from Drive");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| SetupError::DriveHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Drive request failed".to_string());
            return Err(SetupError::DriveStatus { status, message });
        }

        if !is_html_response(&response) {
            return Self::write_response_to_file(response, destination);
        }

        // Large files get a virus-scan interstitial instead of the bytes.
        // Re-request through the usercontent endpoint with the confirm form.
        let page = response
            .text()
            .map_err(|err| SetupError::DriveHttp(err.to_string()))?;
        let form = parse_confirm_form(&page).ok_or(SetupError::DriveInterstitial)?;
        let url = Self::confirm_url(id, &form);
        tracing::debug!(%url, "following Drive confirm form");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| SetupError::DriveHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Drive request failed".to_string());
            return Err(SetupError::DriveStatus { status, message });
        }
        if is_html_response(&response) {
            return Err(SetupError::DriveInterstitial);
        }
        Self::write_response_to_file(response, destination)
    }
}

fn is_html_response(response: &reqwest::blocking::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("text/html"))
        .unwrap_or(false)
}

#[derive(Debug, PartialEq, Eq)]
struct ConfirmForm {
    confirm: String,
    uuid: Option<String>,
}

fn parse_confirm_form(page: &str) -> Option<ConfirmForm> {
    let confirm = hidden_input_value(page, "confirm")?;
    let uuid = hidden_input_value(page, "uuid");
    Some(ConfirmForm { confirm, uuid })
}

fn hidden_input_value(page: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"name="{name}"\s+value="([^"]*)""#);
    let re = Regex::new(&pattern).ok()?;
    re.captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERSTITIAL: &str = r#"
        <form id="download-form" action="https://drive.usercontent.google.com/download" method="get">
          <input type="hidden" name="id" value="1tJtH-BHsqncTnh9bJovB6ap-IZc-tVW3">
          <input type="hidden" name="export" value="download">
          <input type="hidden" name="confirm" value="t">
          <input type="hidden" name="uuid" value="9a1b2c3d-4e5f">
        </form>
    "#;

    #[test]
    fn parses_confirm_form() {
        let form = parse_confirm_form(INTERSTITIAL).unwrap();
        assert_eq!(form.confirm, "t");
        assert_eq!(form.uuid.as_deref(), Some("9a1b2c3d-4e5f"));
    }

    #[test]
    fn rejects_page_without_confirm() {
        assert_eq!(parse_confirm_form("<html><body>quota exceeded</body></html>"), None);
    }

    #[test]
    fn confirm_url_carries_form_fields() {
        let id: FileId = "1tJtH-BHsqncTnh9bJovB6ap-IZc-tVW3".parse().unwrap();
        let form = ConfirmForm {
            confirm: "t".to_string(),
            uuid: Some("abc".to_string()),
        };
        let url = DriveHttpClient::confirm_url(&id, &form);
        assert!(url.contains("id=1tJtH-BHsqncTnh9bJovB6ap-IZc-tVW3"));
        assert!(url.contains("confirm=t"));
        assert!(url.ends_with("uuid=abc"));
    }
}

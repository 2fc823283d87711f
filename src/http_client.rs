use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 20;
const USER_AGENT: &str = concat!("futalgo/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

/// GETs `url` and decodes the body leniently; the sheets are not always UTF-8.
pub fn get_text(url: &str) -> Result<String> {
    let resp = http_client()?
        .get(url)
        .send()
        .with_context(|| format!("request failed: {url}"))?
        .error_for_status()
        .with_context(|| format!("bad status: {url}"))?;
    let bytes = resp
        .bytes()
        .with_context(|| format!("failed reading body: {url}"))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

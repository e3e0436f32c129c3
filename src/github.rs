// src/github.rs

//! GitHub REST client for the dispatch flow.
//!
//! This module owns the four endpoints the program touches:
//! - Resolve the app installation for the org (JWT auth)
//! - Exchange the JWT for an installation access token (JWT auth)
//! - List the workflows in the target repo (token auth)
//! - Dispatch one workflow with string inputs (token auth)
//!
//! Every call is fatal on error except the single documented fallback:
//! a 422 on the scoped token request triggers exactly one retry without
//! explicit scopes, letting GitHub grant the installation's defaults.

use crate::config::Config;

use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const USER_AGENT_VALUE: &str = "jai-org-control-plane";
const ACCEPT_VALUE: &str = "application/vnd.github+json";

/* ---------------- response models ---------------- */

#[derive(Debug, Deserialize)]
struct Installation {
    id: u64,
}

/// Scoped, short-lived credential for the token-authenticated calls.
///
/// `expires_at` is informational only: each run uses the token immediately
/// and exactly once, so expiry is never tracked.
#[derive(Debug, Deserialize)]
pub struct InstallationToken {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkflowList {
    pub total_count: u64,
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub state: String,
}

/* ---------------- headers ---------------- */

/// Headers for JWT-authenticated app endpoints.
fn bearer_headers(app_jwt: &str) -> Result<HeaderMap> {
    base_headers(&format!("Bearer {}", app_jwt))
}

/// Headers for installation-token-authenticated endpoints.
fn token_headers(token: &str) -> Result<HeaderMap> {
    base_headers(&format!("token {}", token))
}

fn base_headers(auth_val: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(auth_val).context("Credential is not a valid header value")?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    Ok(headers)
}

/* ---------------- client ---------------- */

/// Thin client over the GitHub REST endpoints the dispatch flow needs.
///
/// Target coordinates (org, repo, branch, API base) are fixed from the
/// configuration at construction; credentials are passed per call since
/// the JWT and the installation token have different lifecycles.
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    org: String,
    repo: String,
    branch: String,
}

impl GithubClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: cfg.api_base.clone(),
            org: cfg.org.clone(),
            repo: cfg.repo.clone(),
            branch: cfg.branch.clone(),
        }
    }

    /// Resolve the app's installation on the configured org.
    ///
    /// A 404 means the app simply is not installed there, which is a
    /// user-actionable condition and gets its own message.
    pub async fn installation_id(&self, app_jwt: &str) -> Result<u64> {
        let url = format!("{}/orgs/{}/installation", self.api_base, self.org);
        let resp = self
            .http
            .get(url)
            .headers(bearer_headers(app_jwt)?)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to call GitHub get-installation")?;

        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            bail!(
                "GitHub App is not installed on organization '{}'.\n\
                 Install the app on the org (Settings → GitHub Apps) and re-run.",
                self.org
            );
        }

        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            bail!("GitHub get-installation failed: {} {}", status, text);
        }

        let installation: Installation =
            serde_json::from_str(&text).context("Installation response is not valid JSON")?;
        Ok(installation.id)
    }

    /// Exchange the app JWT for an installation access token.
    ///
    /// Requests the minimal scopes the dispatch flow needs. If GitHub
    /// rejects the scope request with a 422, retries once with no explicit
    /// scopes so the installation's default grants apply.
    pub async fn installation_token(
        &self,
        app_jwt: &str,
        installation_id: u64,
    ) -> Result<InstallationToken> {
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_base, installation_id
        );

        // actions:write to dispatch, contents:read for checkout steps
        let scoped = serde_json::json!({
            "permissions": { "actions": "write", "contents": "read" }
        });

        let resp = self
            .http
            .post(&url)
            .headers(bearer_headers(app_jwt)?)
            .json(&scoped)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to call GitHub create-installation-token")?;

        let resp = if resp.status() == StatusCode::UNPROCESSABLE_ENTITY {
            tracing::debug!("scoped token request rejected (422), retrying without scopes");
            self.http
                .post(&url)
                .headers(bearer_headers(app_jwt)?)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await
                .context("Failed to call GitHub create-installation-token (fallback)")?
        } else {
            resp
        };

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            bail!(
                "GitHub create-installation-token failed: {} {}",
                status,
                text
            );
        }

        serde_json::from_str(&text).context("Installation token response is not valid JSON")
    }

    /// List the workflows defined in the target repository.
    pub async fn list_workflows(&self, token: &str) -> Result<WorkflowList> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows",
            self.api_base, self.org, self.repo
        );
        let resp = self
            .http
            .get(url)
            .headers(token_headers(token)?)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to call GitHub list-workflows")?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            bail!("GitHub list-workflows failed: {} {}", status, text);
        }

        serde_json::from_str(&text).context("Workflow list response is not valid JSON")
    }

    /// Dispatch one workflow on the configured branch.
    ///
    /// GitHub answers 204 on success; anything >= 300 is surfaced verbatim
    /// (status + raw body) since the error shapes are not ours to parse.
    pub async fn dispatch(
        &self,
        token: &str,
        workflow_file: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base, self.org, self.repo, workflow_file
        );
        let payload = serde_json::json!({
            "ref": self.branch,
            "inputs": inputs,
        });

        let resp = self
            .http
            .post(url)
            .headers(token_headers(token)?)
            .json(&payload)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Failed to call dispatch for {}", workflow_file))?;

        let status = resp.status();
        if status.as_u16() >= 300 {
            let text = resp.text().await.unwrap_or_default();
            bail!("Dispatch failed {}: {}", status, text);
        }

        Ok(())
    }
}

/* ---------------- tests ---------------- */

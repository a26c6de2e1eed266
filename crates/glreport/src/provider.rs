use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use glreport_core::config::ReportConfig;
use glreport_core::gitlab::{
    group_node, normalize_issues, referenced_projects, GitLabGroup, GitLabIssue, GitLabProject,
};
use glreport_core::issues::Issues;
use glreport_core::summary::GroupNode;
use indicatif::ProgressBar;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;

use crate::prelude::*;

const PER_PAGE: &str = "100";
/// Minimum role (Guest) a user needs on a group for it to be listed
const MIN_ACCESS_LEVEL: &str = "10";

/// Helper to set spinner message if spinner is present
fn set_spinner_msg(spinner: Option<&ProgressBar>, msg: impl Into<String>) {
    if let Some(s) = spinner {
        s.set_message(msg.into());
    }
}

/// Build the authentication headers; a private token wins over an OAuth token
pub fn auth_headers(config: &ReportConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    match (&config.private_token, &config.oauth_token) {
        (Some(token), _) => {
            headers.insert(
                "private-token",
                HeaderValue::from_str(token).map_err(|e| eyre!("Invalid private token: {}", e))?,
            );
        }
        (None, Some(token)) => {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| eyre!("Invalid OAuth token: {}", e))?,
            );
        }
        (None, None) => return Err(eyre!("Either a private token or an OAuth token is required")),
    }

    Ok(headers)
}

/// Page number announced by the `x-next-page` header, if any
pub fn next_page(headers: &HeaderMap) -> Option<u32> {
    headers
        .get("x-next-page")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Thin client over the GitLab REST v4 API
pub struct GitLabClient {
    client: reqwest::Client,
    base_url: String,
}

impl GitLabClient {
    pub fn new(config: &ReportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .default_headers(auth_headers(config)?)
            .danger_accept_invalid_certs(config.skip_ssl);

        if let Some(path) = &config.ca_file {
            let pem = std::fs::read(path)
                .with_context(|| format!("Failed to read CA file {}", path.display()))?;
            let certificate = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| Error::Tls(format!("{}: {}", path.display(), e)))?;
            builder = builder.add_root_certificate(certificate);
        }

        if config.skip_ssl {
            log::warn!("TLS certificate verification is disabled");
        }

        Ok(Self {
            client: builder.build().map_err(Error::Http)?,
            base_url: format!("{}/api/v4", config.url.trim_end_matches('/')),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response, Error> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        Ok(self.get(path, &[]).await?.json().await?)
    }

    /// Follow `x-next-page` until the last page
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let mut paged = query.to_vec();
            paged.push(("per_page", PER_PAGE.to_string()));
            paged.push(("page", page.to_string()));

            let response = self.get(path, &paged).await?;
            let next = next_page(response.headers());
            let batch: Vec<T> = response.json().await?;
            items.extend(batch);

            match next {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(items)
    }

    /// Fetch every issue visible to the user, created within the period
    pub async fn fetch_issues(
        &self,
        period_from: Option<DateTime<Utc>>,
        period_to: Option<DateTime<Utc>>,
        spinner: Option<&ProgressBar>,
    ) -> Result<Issues> {
        let mut query = vec![("scope", "all".to_string())];
        if let Some(from) = period_from {
            query.push(("created_after", from.to_rfc3339()));
        }
        if let Some(to) = period_to {
            query.push(("created_before", to.to_rfc3339()));
        }

        set_spinner_msg(spinner, "Fetching issues...");
        let raw: Vec<GitLabIssue> = self
            .get_all_pages("/issues", &query)
            .await
            .context("Failed to fetch issues")?;
        log::info!("Fetched {} issue(s)", raw.len());

        let ids = referenced_projects(&raw);
        set_spinner_msg(spinner, format!("Resolving {} project(s)...", ids.len()));
        let lookups = ids.iter().map(|id| async move {
            self.get_json::<GitLabProject>(&format!("/projects/{id}"))
                .await
        });
        let mut projects = HashMap::new();
        for project in join_all(lookups).await {
            let project = project.context("Failed to fetch project")?;
            projects.insert(project.id, project);
        }

        let (issues, rejected) = normalize_issues(raw, &projects);
        for error in &rejected {
            log::warn!("Skipping {}", error);
        }

        Ok(Issues::new(issues, Utc::now()))
    }

    /// Fetch the groups the user can access, each with its projects
    pub async fn fetch_groups_and_projects(
        &self,
        spinner: Option<&ProgressBar>,
    ) -> Result<Vec<GroupNode>> {
        set_spinner_msg(spinner, "Fetching groups...");
        let groups: Vec<GitLabGroup> = self
            .get_all_pages("/groups", &[("min_access_level", MIN_ACCESS_LEVEL.to_string())])
            .await
            .context("Failed to fetch groups")?;

        let mut nodes = Vec::with_capacity(groups.len());
        for group in groups {
            set_spinner_msg(spinner, format!("Fetching projects of {}...", group.name));
            let projects: Vec<GitLabProject> = self
                .get_all_pages(&format!("/groups/{}/projects", group.id), &[])
                .await
                .with_context(|| format!("Failed to fetch projects of group {}", group.name))?;
            nodes.push(group_node(group, projects));
        }
        log::info!("Fetched {} group(s)", nodes.len());

        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_token_header() {
        let config = ReportConfig {
            private_token: Some("glpat-123".to_string()),
            oauth_token: Some("ignored".to_string()),
            ..Default::default()
        };

        let headers = auth_headers(&config).unwrap();

        assert_eq!(headers.get("private-token").unwrap(), "glpat-123");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_oauth_token_header() {
        let config = ReportConfig {
            oauth_token: Some("abc".to_string()),
            ..Default::default()
        };

        let headers = auth_headers(&config).unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn test_missing_token_is_an_error() {
        assert!(auth_headers(&ReportConfig::default()).is_err());
    }

    #[test]
    fn test_next_page_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(next_page(&headers), None);

        headers.insert("x-next-page", HeaderValue::from_static(""));
        assert_eq!(next_page(&headers), None);

        headers.insert("x-next-page", HeaderValue::from_static("3"));
        assert_eq!(next_page(&headers), Some(3));
    }

    #[test]
    fn test_client_targets_api_v4() {
        let config = ReportConfig {
            url: "https://gitlab.example.com/".to_string(),
            private_token: Some("t".to_string()),
            ..Default::default()
        };

        let client = GitLabClient::new(&config).unwrap();

        assert_eq!(client.base_url, "https://gitlab.example.com/api/v4");
    }
}

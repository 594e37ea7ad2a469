//! GitHub REST implementation of [`HostingPlatform`]
//!
//! Blocking `reqwest` client. Lists are paginated with `per_page=100`; pull requests are
//! fetched one page at a time, only when the consumer asks for the next item.

use super::{
  ByCloseTime, HostingPlatform, LiveLabel, PullRequest, PullRequests, PullState, PullStatus, Release, RepoId,
};
use crate::catalog::Label;
use crate::core::config::GithubConfig;
use crate::core::error::{ConfigError, HostingError, WardenError, WardenResult};
use chrono::{DateTime, Utc};
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

const PER_PAGE: usize = 100;
const API_VERSION: &str = "2022-11-28";

/// Authenticated client bound to one repository
pub struct GitHubClient {
  http: Client,
  /// `{api_url}/repos/{org}/{repo}`
  base: Url,
  web_url: String,
  repo: RepoId,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
  message: String,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
  name: String,
  color: String,
  #[serde(default)]
  description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
  login: String,
}

#[derive(Debug, Deserialize)]
struct RawPull {
  number: u64,
  title: String,
  state: PullStatus,
  merged_at: Option<DateTime<Utc>>,
  merge_commit_sha: Option<String>,
  closed_at: Option<DateTime<Utc>>,
  updated_at: DateTime<Utc>,
  #[serde(default)]
  labels: Vec<RawLabel>,
  user: Option<RawUser>,
  html_url: String,
}

impl From<RawLabel> for LiveLabel {
  fn from(raw: RawLabel) -> Self {
    LiveLabel {
      name: raw.name,
      color: raw.color,
      description: raw.description.unwrap_or_default(),
    }
  }
}

impl From<RawPull> for PullRequest {
  fn from(raw: RawPull) -> Self {
    PullRequest {
      number: raw.number,
      title: raw.title,
      state: raw.state,
      merged: raw.merged_at.is_some(),
      merge_commit_sha: raw.merge_commit_sha,
      closed_at: raw.closed_at,
      updated_at: raw.updated_at,
      labels: raw.labels.into_iter().map(|l| l.name).collect(),
      // Deleted accounts come back as `null`
      author: raw.user.map(|u| u.login).unwrap_or_else(|| "ghost".to_string()),
      html_url: raw.html_url,
    }
  }
}

impl GitHubClient {
  /// Build a client for `repo`; the token is optional for public read-only use
  pub fn new(config: &GithubConfig, repo: RepoId) -> WardenResult<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

    match config.token() {
      Some(token) => {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|_| {
          WardenError::with_help(
            "API token contains characters not allowed in an HTTP header",
            format!("Check the value of {}", config.token_env),
          )
        })?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
      }
      None => tracing::warn!(
        "No API token in {} or GH_TOKEN; requests are unauthenticated",
        config.token_env
      ),
    }

    let http = Client::builder()
      .user_agent(concat!("warden/", env!("CARGO_PKG_VERSION")))
      .default_headers(headers)
      .timeout(Duration::from_secs(30))
      .build()?;

    let base = Url::parse(config.api_url.trim_end_matches('/')).map_err(|e| {
      WardenError::Config(ConfigError::Malformed {
        location: None,
        reason: format!("github.api_url '{}': {}", config.api_url, e),
      })
    })?;
    let base = with_segments(base, &["repos", &repo.org, &repo.repo])?;

    Ok(Self {
      http,
      base,
      web_url: config.web_url.trim_end_matches('/').to_string(),
      repo,
    })
  }

  /// Repository-scoped endpoint; each segment is percent-encoded
  fn endpoint(&self, segments: &[&str]) -> WardenResult<Url> {
    with_segments(self.base.clone(), segments)
  }

  fn send(&self, request: RequestBuilder, endpoint: &Url) -> WardenResult<Response> {
    let response = request.send()?;
    check_status(response, endpoint)
  }

  /// One page of a list endpoint
  fn page<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)], page: usize) -> WardenResult<Vec<T>> {
    let mut url = self.endpoint(segments)?;
    url
      .query_pairs_mut()
      .extend_pairs(query)
      .append_pair("per_page", &PER_PAGE.to_string())
      .append_pair("page", &page.to_string());

    tracing::debug!("GET {}", url);
    let response = self.send(self.http.get(url.clone()), &url)?;
    Ok(response.json()?)
  }

  /// Every page of a list endpoint
  fn all_pages<T: DeserializeOwned>(&self, segments: &[&str]) -> WardenResult<Vec<T>> {
    let mut items = Vec::new();
    for page in 1.. {
      let batch: Vec<T> = self.page(segments, &[], page)?;
      let last = batch.len() < PER_PAGE;
      items.extend(batch);
      if last {
        break;
      }
    }
    Ok(items)
  }
}

fn with_segments(mut url: Url, segments: &[&str]) -> WardenResult<Url> {
  if url.cannot_be_a_base() {
    return Err(WardenError::message(format!("'{}' cannot be used as an API base URL", url)));
  }
  if let Ok(mut path) = url.path_segments_mut() {
    path.pop_if_empty().extend(segments);
  }
  Ok(url)
}

fn check_status(response: Response, endpoint: &Url) -> WardenResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().unwrap_or_default();
  let message = serde_json::from_str::<ApiMessage>(&body)
    .map(|m| m.message)
    .unwrap_or(body);

  Err(WardenError::Hosting(HostingError::Api {
    status: status.as_u16(),
    endpoint: endpoint.path().to_string(),
    message,
  }))
}

/// Pull requests fetched page by page, on demand
struct PullPages<'a> {
  client: &'a GitHubClient,
  state: PullState,
  page: usize,
  buffer: std::vec::IntoIter<PullRequest>,
  exhausted: bool,
}

impl Iterator for PullPages<'_> {
  type Item = WardenResult<PullRequest>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if let Some(pull) = self.buffer.next() {
        return Some(Ok(pull));
      }
      if self.exhausted {
        return None;
      }

      self.page += 1;
      let query = [
        ("state", self.state.as_str()),
        ("sort", "updated"),
        ("direction", "desc"),
      ];
      match self.client.page::<RawPull>(&["pulls"], &query, self.page) {
        Ok(batch) => {
          self.exhausted = batch.len() < PER_PAGE;
          let pulls: Vec<PullRequest> = batch.into_iter().map(PullRequest::from).collect();
          self.buffer = pulls.into_iter();
        }
        Err(e) => {
          self.exhausted = true;
          return Some(Err(e));
        }
      }
    }
  }
}

impl HostingPlatform for GitHubClient {
  fn list_labels(&self) -> WardenResult<Vec<LiveLabel>> {
    let raw: Vec<RawLabel> = self.all_pages(&["labels"])?;
    Ok(raw.into_iter().map(LiveLabel::from).collect())
  }

  fn create_label(&self, label: &Label) -> WardenResult<()> {
    let url = self.endpoint(&["labels"])?;
    let body = json!({
      "name": label.name,
      "color": crate::catalog::normalize_color(&label.color),
      "description": label.description,
    });
    self.send(self.http.post(url.clone()).json(&body), &url)?;
    Ok(())
  }

  fn update_label(&self, name: &str, color: &str, description: &str) -> WardenResult<()> {
    let url = self.endpoint(&["labels", name])?;
    let body = json!({
      "color": crate::catalog::normalize_color(color),
      "description": description,
    });
    self.send(self.http.patch(url.clone()).json(&body), &url)?;
    Ok(())
  }

  fn pull_requests(&self, state: PullState) -> PullRequests<'_> {
    let pages = PullPages {
      client: self,
      state,
      page: 0,
      buffer: Vec::new().into_iter(),
      exhausted: false,
    };
    match state {
      PullState::Closed => Box::new(ByCloseTime::new(pages)),
      PullState::Open | PullState::All => Box::new(pages),
    }
  }

  fn list_releases(&self) -> WardenResult<Vec<Release>> {
    self.all_pages(&["releases"])
  }

  fn create_draft_release(&self, name: &str, tag: &str, body: &str) -> WardenResult<Release> {
    let url = self.endpoint(&["releases"])?;
    let payload = json!({
      "tag_name": tag,
      "name": name,
      "body": body,
      "draft": true,
      "prerelease": true,
    });
    let response = self.send(self.http.post(url.clone()).json(&payload), &url)?;
    Ok(response.json()?)
  }

  fn update_release(&self, id: u64, name: &str, body: &str) -> WardenResult<()> {
    let url = self.endpoint(&["releases", &id.to_string()])?;
    let payload = json!({
      "name": name,
      "body": body,
      "draft": true,
    });
    self.send(self.http.patch(url.clone()).json(&payload), &url)?;
    Ok(())
  }

  fn commit_url(&self, sha: &str) -> String {
    format!("{}/{}/{}/commit/{}", self.web_url, self.repo.org, self.repo.repo, sha)
  }
}

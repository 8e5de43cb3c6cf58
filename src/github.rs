use crate::config::{MilestoneState, RepoScope};
use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use http_req::{
    request::{Method, Request},
    uri::Uri,
};
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;

pub static GITHUB_API_URL: &str = "https://api.github.com";
const PER_PAGE: u8 = 100;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Milestone {
    pub title: String,
    #[serde(default)]
    pub due_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: String,
}

/// A search hit. Fields the run does not look at are carried through
/// untouched so the written record matches what the API returned.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Issue {
    pub number: u64,
    pub html_url: String,
    pub repository_url: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchPage {
    #[serde(skip)]
    pub status: u16,
    pub total_count: u64,
    pub items: Vec<Issue>,
}

/// The two upstream calls a run makes.
pub trait GithubApi {
    fn list_milestones(
        &self,
        repo: &RepoScope,
        state: MilestoneState,
    ) -> impl Future<Output = anyhow::Result<Vec<Milestone>>>;

    fn search_issues(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = anyhow::Result<SearchPage>>;
}

pub struct GithubClient {
    octocrab: Octocrab,
    search_url: String,
    token: String,
}

impl GithubClient {
    pub fn new(token: &str) -> anyhow::Result<Self> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Points both the milestone and the search calls at `base`, e.g. a
    /// GitHub Enterprise API root.
    pub fn with_base_url(token: &str, base: &str) -> anyhow::Result<Self> {
        let base = base.trim_end_matches('/');
        let octocrab = Octocrab::builder()
            .base_url(format!("{base}/"))
            .map_err(|e| anyhow!("Invalid GitHub API url {base}: {e}"))?
            .personal_token(token.to_string())
            .build()
            .context("failed to build GitHub client")?;
        Ok(GithubClient {
            octocrab,
            search_url: format!("{base}/search/issues"),
            token: token.to_string(),
        })
    }
}

#[derive(Serialize)]
struct MilestoneParams {
    state: &'static str,
    per_page: u8,
}

impl GithubApi for GithubClient {
    async fn list_milestones(
        &self,
        repo: &RepoScope,
        state: MilestoneState,
    ) -> anyhow::Result<Vec<Milestone>> {
        let route = format!("/repos/{}/{}/milestones", repo.owner, repo.name);
        let params = MilestoneParams {
            state: state.as_str(),
            per_page: PER_PAGE,
        };

        let mut page: Page<Milestone> = self
            .octocrab
            .get(&route, Some(&params))
            .await
            .map_err(|e| anyhow!("Failed to list milestones of {repo}: {e}"))?;

        let mut milestones = std::mem::take(&mut page.items);
        while let Some(mut next) = self
            .octocrab
            .get_page::<Milestone>(&page.next)
            .await
            .map_err(|e| anyhow!("Failed to list milestones of {repo}: {e}"))?
        {
            milestones.append(&mut next.items);
            page = next;
        }

        log::debug!("{} milestones of {repo} in state {}", milestones.len(), state.as_str());
        Ok(milestones)
    }

    async fn search_issues(&self, query: &str, page: u32) -> anyhow::Result<SearchPage> {
        let url = format!(
            "{}?q={}&page={page}&per_page={PER_PAGE}",
            self.search_url,
            urlencoding::encode(query)
        );
        let body = github_http_get(&url, &self.token).await?;

        let mut result: SearchPage = serde_json::from_slice(&body.bytes)
            .map_err(|e| anyhow!("Failed to deserialize search response: {}", e))?;
        result.status = body.status;
        Ok(result)
    }
}

struct HttpBody {
    status: u16,
    bytes: Vec<u8>,
}

async fn github_http_get(url: &str, token: &str) -> anyhow::Result<HttpBody> {
    let uri = Uri::try_from(url).map_err(|e| anyhow!("Invalid url {url}: {e}"))?;
    let mut writer = Vec::new();

    match Request::new(&uri)
        .method(Method::GET)
        .header("User-Agent", "issue-output")
        .header("Accept", "application/vnd.github+json")
        .header("Authorization", &format!("Bearer {}", token))
        .send(&mut writer)
    {
        Ok(res) => {
            let status = u16::from(res.status_code());
            if !res.status_code().is_success() {
                log::error!("Github http error {:?}", res.status_code());
                return Err(anyhow!(
                    "Github http error {}: {}",
                    status,
                    String::from_utf8_lossy(&writer)
                ));
            }
            Ok(HttpBody {
                status,
                bytes: writer,
            })
        }
        Err(e) => {
            log::error!("Error getting response from Github: {:?}", e);
            Err(anyhow!(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn issue_keeps_unknown_fields() {
        let raw = json!({
            "number": 7,
            "html_url": "https://github.com/acme/widgets/issues/7",
            "repository_url": "https://api.github.com/repos/acme/widgets",
            "title": "Crash on start",
            "labels": [{"name": "bug"}],
            "milestone": null
        });

        let issue: Issue = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(issue.number, 7);
        assert_eq!(issue.payload["title"], "Crash on start");
        assert_eq!(serde_json::to_value(&issue).unwrap(), raw);
    }

    #[test]
    fn search_page_parses_api_shape() {
        let raw = json!({
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                {"number": 1, "html_url": "h1", "repository_url": "https://api.github.com/repos/acme/widgets"},
                {"number": 2, "html_url": "h2", "repository_url": "https://api.github.com/repos/acme/widgets"}
            ]
        });

        let page: SearchPage = serde_json::from_value(raw).unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].number, 2);
    }

    #[test]
    fn milestone_due_on_is_optional() {
        let with_due: Milestone = serde_json::from_value(json!({
            "title": "August Release",
            "due_on": "2023-08-31T07:00:00Z",
            "state": "open",
            "number": 3
        }))
        .unwrap();
        assert_eq!(
            with_due.due_on.map(|d| d.date_naive().to_string()),
            Some("2023-08-31".to_string())
        );

        let without_due: Milestone =
            serde_json::from_value(json!({"title": "Backlog", "due_on": null, "state": "open"}))
                .unwrap();
        assert_eq!(without_due.due_on, None);
    }

    fn acme() -> RepoScope {
        RepoScope::parse("acme/widgets").unwrap()
    }

    #[tokio::test]
    async fn milestones_follow_next_links() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/acme/widgets/milestones")
                .query_param("state", "open")
                .query_param("per_page", "100");
            then.status(200)
                .header(
                    "link",
                    format!(
                        "<{}>; rel=\"next\"",
                        server.url("/repos/acme/widgets/milestones?page=2")
                    ),
                )
                .json_body(json!([
                    {"title": "v1", "due_on": "2024-01-31T08:00:00Z", "state": "open"},
                    {"title": "v2", "due_on": null, "state": "open"}
                ]));
        });
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/acme/widgets/milestones")
                .query_param("page", "2");
            then.status(200)
                .json_body(json!([{"title": "v3", "due_on": null, "state": "open"}]));
        });

        let client = GithubClient::with_base_url("token", &server.base_url()).unwrap();
        let milestones = client
            .list_milestones(&acme(), MilestoneState::Open)
            .await
            .unwrap();

        let titles: Vec<&str> = milestones.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["v1", "v2", "v3"]);
        first.assert();
        second.assert();
    }

    #[tokio::test]
    async fn search_sends_encoded_query_and_paging() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(GET)
                .path("/search/issues")
                .query_param("q", "is:open milestone:\"v 1.0\" repo:acme/widgets")
                .query_param("page", "2")
                .query_param("per_page", "100")
                .header("Authorization", "Bearer token");
            then.status(200).json_body(json!({
                "total_count": 101,
                "incomplete_results": false,
                "items": [{
                    "number": 101,
                    "html_url": "https://github.com/acme/widgets/issues/101",
                    "repository_url": "https://api.github.com/repos/acme/widgets",
                    "title": "Last one"
                }]
            }));
        });

        let client = GithubClient::with_base_url("token", &server.base_url()).unwrap();
        let page = client
            .search_issues("is:open milestone:\"v 1.0\" repo:acme/widgets", 2)
            .await
            .unwrap();

        search.assert();
        assert_eq!(page.status, 200);
        assert_eq!(page.total_count, 101);
        assert_eq!(page.items[0].number, 101);
        assert_eq!(page.items[0].payload["title"], "Last one");
    }

    #[tokio::test]
    async fn search_error_status_is_fatal() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(GET).path("/search/issues");
            then.status(401)
                .json_body(json!({"message": "Bad credentials"}));
        });

        let client = GithubClient::with_base_url("bad-token", &server.base_url()).unwrap();
        let err = client.search_issues("bug repo:acme/widgets", 1).await.unwrap_err();

        search.assert();
        let message = err.to_string();
        assert!(message.contains("401"), "{message}");
        assert!(message.contains("Bad credentials"), "{message}");
    }
}

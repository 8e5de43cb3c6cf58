use crate::artifact::{ArtifactUploader, UploadOptions};
use crate::config::{FilterConfig, RunConfig};
use crate::github::{GithubApi, Issue};
use crate::issue_search::{compose_query, query_issues};
use crate::milestones::select_milestones;
use crate::output::{reset_dir, write_issues};
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub artifact_name: String,
    pub issue_count: usize,
    pub files: Vec<PathBuf>,
}

/// Runs one query per selected milestone, or a single unscoped query when no
/// milestone filter is set. Results are concatenated as-is, so an issue
/// matched under two milestones appears twice.
pub async fn collect_issues<A: GithubApi>(
    filter: &FilterConfig,
    api: &A,
    today: NaiveDate,
) -> anyhow::Result<Vec<Issue>> {
    let mut issues = Vec::new();

    match select_milestones(filter, api, today).await? {
        Some(milestones) => {
            for milestone in milestones {
                log::debug!("Searching Issues related to Milestone: {}", milestone.title);
                let query = compose_query(&filter.search_query, Some(&milestone.title), &filter.repo);
                query_issues(api, &query, &filter.repo, &mut issues).await?;
            }
        }
        None => {
            let query = compose_query(&filter.search_query, None, &filter.repo);
            query_issues(api, &query, &filter.repo, &mut issues).await?;
        }
    }

    log::info!("{} issue(s) collected from {}", issues.len(), filter.repo);
    Ok(issues)
}

pub async fn run<A, U>(
    config: &RunConfig,
    api: &A,
    uploader: &U,
    today: NaiveDate,
) -> anyhow::Result<RunOutcome>
where
    A: GithubApi,
    U: ArtifactUploader,
{
    let issues = collect_issues(&config.filter, api, today).await?;

    reset_dir(&config.issues_dir)?;
    let files = write_issues(&config.issues_dir, &issues)?;

    let artifact_name = config.artifact_name();
    let upload = uploader.upload(
        &artifact_name,
        &files,
        &config.issues_dir,
        UploadOptions {
            continue_on_error: true,
        },
    )?;
    log::debug!("uploaded {} artifacts...", upload.artifact_items.len());

    Ok(RunOutcome {
        artifact_name,
        issue_count: issues.len(),
        files,
    })
}

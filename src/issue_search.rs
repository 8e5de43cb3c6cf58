use crate::config::RepoScope;
use crate::github::{GithubApi, Issue};

pub fn compose_query(search_query: &str, milestone_title: Option<&str>, repo: &RepoScope) -> String {
    match milestone_title {
        Some(title) => format!("{search_query} milestone:\"{title}\" repo:{repo}"),
        None => format!("{search_query} repo:{repo}"),
    }
}

/// Walks the search pages for `query` and appends every hit that belongs to
/// `repo` onto `issues`, in page order.
///
/// The loop stops once the number of items received reaches the
/// `total_count` reported by the most recent page. A request failure aborts
/// the scan and leaves `issues` holding whatever earlier pages added.
pub async fn query_issues<A: GithubApi>(
    api: &A,
    query: &str,
    repo: &RepoScope,
    issues: &mut Vec<Issue>,
) -> anyhow::Result<()> {
    log::debug!("resultingQuery: {query}.");

    let scope = repo.to_string();
    let mut page_num: u32 = 1;
    let mut items_received: u64 = 0;

    loop {
        let page = api.search_issues(query, page_num).await?;
        let page_len = page.items.len() as u64;

        items_received += page_len;
        let incomplete = items_received < page.total_count;

        issues.extend(
            page.items
                .into_iter()
                .filter(|issue| issue.repository_url.ends_with(&scope)),
        );

        log::debug!(
            "search issues by query: ({}) {} of {} results from page #{} incomplete:{} totalIssues:{}",
            page.status,
            items_received,
            page.total_count,
            page_num,
            incomplete,
            issues.len()
        );

        if !incomplete {
            break;
        }
        if page_len == 0 {
            log::warn!(
                "page #{page_num} came back empty with {items_received} of {} results received, stopping",
                page.total_count
            );
            break;
        }
        page_num += 1;
    }

    Ok(())
}

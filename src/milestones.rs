use crate::config::{DueDateFilter, FilterConfig, MilestoneState};
use crate::github::{GithubApi, Milestone};
use chrono::NaiveDate;

/// Fetches the repository's milestones and keeps the ones matching the
/// requested state and due-date bucket. Returns `None` when no milestone
/// filter was requested, in which case the caller runs one unscoped query.
pub async fn select_milestones<A: GithubApi>(
    filter: &FilterConfig,
    api: &A,
    today: NaiveDate,
) -> anyhow::Result<Option<Vec<Milestone>>> {
    if !filter.milestone_filters_requested() {
        return Ok(None);
    }

    let state = filter.milestone_state.unwrap_or(MilestoneState::All);
    let milestones = api.list_milestones(&filter.repo, state).await?;

    let selected = milestones
        .into_iter()
        .filter(|milestone| match filter.milestone_due_on {
            Some(bucket) => in_due_bucket(milestone, bucket, today),
            None => true,
        })
        .collect::<Vec<_>>();

    log::info!(
        "{} milestone(s) of {} match state {} and due date {:?}",
        selected.len(),
        filter.repo,
        state.as_str(),
        filter.milestone_due_on
    );
    Ok(Some(selected))
}

/// Day-level comparison; a milestone without a due date is never in a bucket.
pub fn in_due_bucket(milestone: &Milestone, bucket: DueDateFilter, today: NaiveDate) -> bool {
    let Some(due_on) = milestone.due_on.map(|d| d.date_naive()) else {
        return false;
    };
    match bucket {
        DueDateFilter::Past => due_on < today,
        DueDateFilter::Today => due_on == today,
        DueDateFilter::Future => due_on > today,
    }
}

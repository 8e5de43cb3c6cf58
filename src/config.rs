use crate::error::ConfigError;
use chrono::Utc;
use derivative::Derivative;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::path::PathBuf;

lazy_static! {
    static ref REPO_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_-]+/[A-Za-z0-9_-]+$").unwrap();
}

pub static INPUT_SEARCH_QUERY: &str = "searchQuery";
pub static INPUT_REPO: &str = "repoOwnerAndName";
pub static INPUT_MILESTONE_STATE: &str = "searchByAssociatedMilestoneState";
pub static INPUT_MILESTONE_DUE_DATE: &str = "searchByAssociatedMilestoneDueDate";
pub static INPUT_TOKEN: &str = "repotoken";

pub static DEFAULT_ISSUES_DIR: &str = "issues";
pub static DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoScope {
    pub owner: String,
    pub name: String,
}

impl RepoScope {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if !REPO_PATTERN.is_match(raw) {
            return Err(ConfigError::InvalidRepository(raw.to_string()));
        }
        let (owner, name) = raw
            .split_once('/')
            .ok_or_else(|| ConfigError::InvalidRepository(raw.to_string()))?;
        Ok(RepoScope {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneState {
    Open,
    Closed,
    All,
}

impl MilestoneState {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(MilestoneState::Open),
            "closed" => Some(MilestoneState::Closed),
            "all" => Some(MilestoneState::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneState::Open => "open",
            MilestoneState::Closed => "closed",
            MilestoneState::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateFilter {
    Past,
    Today,
    Future,
}

impl DueDateFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "past" => Some(DueDateFilter::Past),
            "today" => Some(DueDateFilter::Today),
            "future" => Some(DueDateFilter::Future),
            _ => None,
        }
    }
}

#[derive(Derivative, Clone, PartialEq, Eq)]
#[derivative(Debug)]
pub struct FilterConfig {
    pub search_query: String,
    pub repo: RepoScope,
    pub milestone_state: Option<MilestoneState>,
    pub milestone_due_on: Option<DueDateFilter>,
    #[derivative(Debug = "ignore")]
    pub token: String,
}

impl FilterConfig {
    pub fn milestone_filters_requested(&self) -> bool {
        self.milestone_state.is_some() || self.milestone_due_on.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub filter: FilterConfig,
    pub run_id: String,
    pub issues_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub output_file: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the run configuration from a key lookup, validating every
    /// input before anything touches the network.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = |name: &str| get_input(&lookup, name);

        let search_query = input(INPUT_SEARCH_QUERY).unwrap_or_default();
        log::debug!("Searching issues with query: {search_query}");

        let repo_raw = input(INPUT_REPO).unwrap_or_default();
        log::debug!("Repo Owner/Name: {repo_raw}");
        let repo = RepoScope::parse(&repo_raw)?;

        let milestone_state = input(INPUT_MILESTONE_STATE).and_then(|raw| {
            let parsed = MilestoneState::parse(&raw);
            if parsed.is_none() {
                log::warn!("Ignoring unknown milestone state {raw:?}");
            }
            parsed
        });
        log::debug!("Filtering issues with milestoneState: {milestone_state:?}");

        let milestone_due_on = input(INPUT_MILESTONE_DUE_DATE).and_then(|raw| {
            let parsed = DueDateFilter::parse(&raw);
            if parsed.is_none() {
                log::warn!("Ignoring unknown milestone due date filter {raw:?}");
            }
            parsed
        });
        log::debug!("Filtering issues with milestoneDueOn: {milestone_due_on:?}");

        let token = input(INPUT_TOKEN).ok_or(ConfigError::MissingInput(INPUT_TOKEN))?;

        let filter = FilterConfig {
            search_query,
            repo,
            milestone_state,
            milestone_due_on,
            token,
        };

        if !filter.milestone_filters_requested() && filter.search_query.is_empty() {
            return Err(ConfigError::NoFilters);
        }

        let run_id = non_empty(lookup("GITHUB_RUN_ID"))
            .unwrap_or_else(|| Utc::now().timestamp().to_string());
        let issues_dir = non_empty(lookup("ISSUE_OUTPUT_DIR"))
            .unwrap_or_else(|| DEFAULT_ISSUES_DIR.to_string());
        let artifacts_dir = non_empty(lookup("ISSUE_OUTPUT_ARTIFACTS_DIR"))
            .unwrap_or_else(|| DEFAULT_ARTIFACTS_DIR.to_string());

        Ok(RunConfig {
            filter,
            run_id,
            issues_dir: PathBuf::from(issues_dir),
            artifacts_dir: PathBuf::from(artifacts_dir),
            output_file: non_empty(lookup("GITHUB_OUTPUT")).map(PathBuf::from),
        })
    }

    pub fn artifact_name(&self) -> String {
        format!("issueoutput_{}", self.run_id)
    }
}

/// Reads `INPUT_<NAME>` the way workflow runners expose step inputs.
fn get_input<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
    non_empty(lookup(&key))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

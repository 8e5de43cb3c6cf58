pub mod artifact;
pub mod config;
pub mod error;
pub mod github;
pub mod issue_search;
pub mod milestones;
pub mod output;
pub mod runner;

pub use artifact::{ArtifactUploader, LocalArtifactStore, UploadOptions, UploadResult};
pub use config::{DueDateFilter, FilterConfig, MilestoneState, RepoScope, RunConfig};
pub use error::ConfigError;
pub use github::{GithubApi, GithubClient, Issue, Milestone, SearchPage};
pub use issue_search::{compose_query, query_issues};
pub use milestones::select_milestones;
pub use runner::{collect_issues, run, RunOutcome};

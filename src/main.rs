use chrono::Utc;
use dotenv::dotenv;
use issue_output::output::{error_annotation, set_output};
use issue_output::{run, GithubClient, LocalArtifactStore, RunConfig};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match inner().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            println!("{}", error_annotation(&e));
            ExitCode::FAILURE
        }
    }
}

async fn inner() -> anyhow::Result<()> {
    let config = RunConfig::from_env()?;
    let client = GithubClient::new(&config.filter.token)?;
    let store = LocalArtifactStore::new(config.artifacts_dir.clone());

    let outcome = run(&config, &client, &store, Utc::now().date_naive()).await?;

    set_output(
        config.output_file.as_deref(),
        "issuesArtifact",
        &outcome.artifact_name,
    )?;
    log::info!(
        "wrote {} issue(s) into artifact {}",
        outcome.issue_count,
        outcome.artifact_name
    );
    Ok(())
}

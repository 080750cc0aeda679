use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use judge_scribe::traits::store::LAST_SELECTED_REPO;
use judge_scribe::{
    CaptureOutcome, Config, CredentialStore, ExplanationStatus, FileArtifactSink, GeminiExplainer,
    GithubClient, JsonFileStore, RepositorySink, RetryPolicy, SecretString, Session,
    SyntheticPage,
};

pub struct ExtractArgs {
    pub file: PathBuf,
    pub url: String,
    pub explain: bool,
    pub out: Option<PathBuf>,
    pub publish: Option<Option<String>>,
    pub folder: Option<String>,
}

pub struct ReplayArgs {
    pub url: String,
    pub snapshots: Vec<String>,
    pub interval_ms: u64,
    pub explain: bool,
    pub out: Option<PathBuf>,
}

fn credential_store(config: &Config) -> Arc<dyn CredentialStore> {
    Arc::new(JsonFileStore::new(&config.store_path))
}

fn gemini(config: &Config, store: Arc<dyn CredentialStore>) -> GeminiExplainer {
    GeminiExplainer::new(store)
        .with_base_url(&config.gemini_base_url)
        .with_model(&config.gemini_model)
}

fn github(config: &Config, store: Arc<dyn CredentialStore>) -> GithubClient {
    GithubClient::new(store).with_base_url(&config.github_api_url)
}

async fn read_snapshot(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))
}

/// Session with the explanation step and local sink configured.
fn build_session(
    config: &Config,
    page: Arc<SyntheticPage>,
    store: &Arc<dyn CredentialStore>,
    explain: bool,
    out: Option<PathBuf>,
) -> Session {
    let artifact_dir = out.unwrap_or_else(|| config.artifact_dir.clone());
    let session = Session::new(page)
        .with_config(config.scribe_config().with_explain(explain))
        .with_sink(Arc::new(FileArtifactSink::new(artifact_dir)));

    if explain {
        session.with_explainer(Arc::new(gemini(config, store.clone())))
    } else {
        session
    }
}

pub async fn extract(config: &Config, args: ExtractArgs) -> Result<()> {
    let html = read_snapshot(&args.file).await?;
    let store = credential_store(config);
    let page = Arc::new(SyntheticPage::new(args.url, html));

    // A saved snapshot never changes, so waiting for the editor is pointless.
    let scribe = config
        .scribe_config()
        .with_explain(args.explain)
        .with_code_retry(RetryPolicy::new(Duration::ZERO, 0));
    let mut session = build_session(config, page, &store, args.explain, args.out).with_config(scribe);

    if let Some(repo) = args.publish {
        let repo = match repo {
            Some(repo) => repo,
            None => last_selected_repo(&store).await?,
        };
        let mut sink = RepositorySink::new(github(config, store.clone()), repo);
        if let Some(folder) = args.folder {
            sink = sink.with_folder(folder);
        }
        session = session.with_sink(Arc::new(sink));
    }

    let outcome = session
        .capture_now()
        .await?
        .context("Page was already captured")?;
    report(&outcome);
    println!("{}", outcome.record.to_artifact_json()?);
    Ok(())
}

pub async fn replay(config: &Config, args: ReplayArgs) -> Result<()> {
    let store = credential_store(config);
    let page = Arc::new(SyntheticPage::new(&args.url, "<html><body></body></html>"));
    let scribe = config.scribe_config().with_explain(args.explain);
    let mut handle =
        Arc::new(build_session(config, page.clone(), &store, args.explain, args.out)).start();

    let interval = Duration::from_millis(args.interval_ms);
    for snapshot in &args.snapshots {
        let (url, path) = parse_snapshot(snapshot);
        let html = read_snapshot(Path::new(path)).await?;
        tokio::time::sleep(interval).await;
        match url {
            Some(url) => page.navigate(url, html),
            None => page.set_html(html),
        }
    }

    // Long enough for the slowest capture to finish after the last snapshot.
    let mut quiet = scribe.navigation_settle
        + scribe.code_retry.delay * scribe.code_retry.attempts()
        + Duration::from_secs(2);
    if args.explain {
        quiet += scribe.explain_timeout;
    }

    let mut captured = 0;
    loop {
        match tokio::time::timeout(quiet, handle.next_outcome()).await {
            Ok(Some(Ok(outcome))) => {
                captured += 1;
                report(&outcome);
            }
            Ok(Some(Err(e))) => info!(error = %e, "capture ended without a record"),
            Ok(None) | Err(_) => break,
        }
    }

    handle.shutdown();
    println!("{} record(s) captured", captured);
    Ok(())
}

pub async fn list_repos(config: &Config) -> Result<()> {
    let repos = github(config, credential_store(config))
        .list_repositories()
        .await
        .context("Failed to list repositories")?;

    for repo in repos {
        let visibility = if repo.private { "private" } else { "public" };
        println!("{}\t{}", repo.full_name, visibility);
    }
    Ok(())
}

pub async fn show_repo(config: &Config, full_name: &str) -> Result<()> {
    let store = credential_store(config);
    let repo = github(config, store.clone())
        .repository(full_name)
        .await
        .with_context(|| format!("Failed to fetch repository {}", full_name))?;

    store
        .set(LAST_SELECTED_REPO, SecretString::new(repo.full_name.clone()))
        .await
        .context("Failed to remember selected repository")?;

    println!("{}", serde_json::to_string_pretty(&repo)?);
    Ok(())
}

pub async fn set_key(config: &Config, key: &str, value: String) -> Result<()> {
    let secret = SecretString::new(value);
    if secret.is_blank() {
        anyhow::bail!("Refusing to store an empty value for {}", key);
    }
    let hint = secret.hint();
    credential_store(config)
        .set(key, secret)
        .await
        .with_context(|| format!("Failed to store {}", key))?;
    info!(key, hint = %hint, "stored");
    Ok(())
}

pub async fn clear_key(config: &Config, key: &str) -> Result<()> {
    credential_store(config)
        .remove(key)
        .await
        .with_context(|| format!("Failed to clear {}", key))?;
    info!(key, "cleared");
    Ok(())
}

async fn last_selected_repo(store: &Arc<dyn CredentialStore>) -> Result<String> {
    store
        .get(LAST_SELECTED_REPO)
        .await?
        .map(|repo| repo.expose().to_string())
        .ok_or_else(|| anyhow!("No repository selected; pass --publish OWNER/REPO or run `repo`"))
}

/// Split `URL=FILE` into its parts; a plain `FILE` has no URL.
fn parse_snapshot(spec: &str) -> (Option<&str>, &str) {
    match spec.split_once('=') {
        Some((url, path)) if url.starts_with("http://") || url.starts_with("https://") => {
            (Some(url), path)
        }
        _ => (None, spec),
    }
}

fn report(outcome: &CaptureOutcome) {
    let explanation = match &outcome.explanation {
        ExplanationStatus::Received => "received".to_string(),
        ExplanationStatus::Failed(e) => format!("failed ({})", e),
        ExplanationStatus::Skipped => "skipped".to_string(),
    };
    eprintln!(
        "[epoch {}] {} | code: {} | explanation: {}",
        outcome.epoch,
        outcome.record.full_title,
        if outcome.code_found { "captured" } else { "missing" },
        explanation
    );
    for artifact in &outcome.artifacts {
        eprintln!("  saved {} ({})", artifact.location, artifact.sink);
    }
    for failure in &outcome.sink_failures {
        eprintln!("  {} failed: {}", failure.sink, failure.reason);
    }
}

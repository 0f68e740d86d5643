//! Import command handlers

use anyhow::{bail, Result};

use linkshelf_core::{
    run_import, Config, GitHubSource, ImportOutcome, ImportSource, LinkStore, Persistence,
    VercelSource,
};

use crate::output::{Output, TablePresenter};

/// Import a user's GitHub repositories
pub async fn github<P: Persistence>(
    store: &mut LinkStore<P>,
    config: &Config,
    username: Option<String>,
    exclude: Option<String>,
    output: &Output,
) -> Result<()> {
    let Some(username) = username.or_else(|| config.github_username.clone()) else {
        bail!(
            "No GitHub username given.\n\
             Pass one, or set a default: linkshelf config set github_username <name>"
        );
    };

    let source = GitHubSource::new(username)?
        .with_token(config.github_token.clone())
        .excluding(exclude.or_else(|| config.github_exclude_repo.clone()));

    import(store, &source, output).await
}

/// Import deployed Vercel projects
pub async fn vercel<P: Persistence>(
    store: &mut LinkStore<P>,
    config: &Config,
    token: Option<String>,
    output: &Output,
) -> Result<()> {
    let Some(token) = token.or_else(|| config.vercel_token.clone()) else {
        bail!(
            "No Vercel token given.\n\
             Pass --token, or set one: linkshelf config set vercel_token <token>"
        );
    };

    let source = VercelSource::new(token)?;
    import(store, &source, output).await
}

async fn import<P: Persistence, S: ImportSource>(
    store: &mut LinkStore<P>,
    source: &S,
    output: &Output,
) -> Result<()> {
    if output.should_prompt() {
        output.message(&format!("Importing from {}...", source.name()));
        store.set_presenter(Box::new(TablePresenter::new()));
    }

    let outcome = run_import(store, source).await;
    output.print_import(&outcome);

    match outcome {
        ImportOutcome::Success { .. } => Ok(()),
        // Already reported; only the exit status is left
        ImportOutcome::Failure { source, .. } => bail!("{} import failed", source),
    }
}

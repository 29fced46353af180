mod builtin;
mod cli;
mod error;
mod fetcher;
mod html;
mod loader;
mod post;
mod progress;
mod record;

use std::io::Write as _;

use anyhow::Context as _;

pub use cli::ProgressMode;
pub use cli::Args as CliArgs;
pub use error::{LoadError, Operation};
pub use fetcher::Fetcher;
pub use html::{RenderOptions, build_html, render_page};
pub use loader::{Outcome, PageState, PageStatus, PostDetailLoader, load_primary, load_related};
pub use post::{Post, RELATED_LIMIT, related_posts};
pub use record::RawPostRecord;

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);

    let fetcher = Fetcher::new(args.base_url.clone(), &args.user_agent)?;
    let loader = PostDetailLoader::new(fetcher)?;

    progress.set_stage(format!("loading {}", args.slug));
    let mut updates = loader.subscribe();
    loader.navigate(args.slug.clone());

    let state = tokio::select! {
        state = loader.wait_settled() => state?,
        _ = async {
            while updates.changed().await.is_ok() {
                progress.observe(&updates.borrow_and_update());
            }
        } => anyhow::bail!("page state channel closed"),
    };

    progress.set_stage("rendering");
    let opts = RenderOptions {
        link_prefix: &args.link_prefix,
        site_title: &args.title,
    };
    let html = build_html(&state, &opts);

    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
            }
            std::fs::write(path, &html).with_context(|| format!("write {}", path.display()))?;
            tracing::info!(path = %path.display(), "page written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes()).context("write stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }
    progress.finish();

    if args.fail_on_error {
        if let PageStatus::Error(msg) = state.status() {
            anyhow::bail!("{}: {}", args.slug, msg);
        }
    }
    Ok(())
}

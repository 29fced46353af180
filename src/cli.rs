use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Collection endpoint of the content API (e.g. `https://api.example.com/apiv1/blogs`).
    ///
    /// A single post is fetched from `<base-url>/<slug>`.
    #[arg(long)]
    pub base_url: Url,

    /// Slug of the post to render.
    #[arg(long)]
    pub slug: String,

    /// Output HTML file. Writes to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Href prefix for related-post links; the post id is appended.
    #[arg(long, default_value = "/blog/")]
    pub link_prefix: String,

    /// Site name shown in the page `<title>`.
    #[arg(long, default_value = "Blog")]
    pub title: String,

    /// HTTP User-Agent used for API requests.
    #[arg(long, default_value = "blog-post-render/0.1")]
    pub user_agent: String,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,

    /// Exit with an error when the page ends up in the error state.
    ///
    /// The error page is still written first.
    #[arg(long)]
    pub fail_on_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from([
            "blog-post-render",
            "--base-url",
            "https://api.example.com/apiv1/blogs",
            "--slug",
            "abc",
        ])
        .unwrap();

        assert_eq!(args.slug, "abc");
        assert_eq!(args.link_prefix, "/blog/");
        assert_eq!(args.title, "Blog");
        assert!(args.out.is_none());
        assert!(!args.fail_on_error);
        assert!(matches!(args.progress, ProgressMode::Auto));
    }

    #[test]
    fn slug_is_required() {
        assert!(
            Args::try_parse_from(["blog-post-render", "--base-url", "https://x.test/"]).is_err()
        );
    }
}

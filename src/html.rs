use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::builtin;
use crate::loader::{Outcome, PageState, PageStatus};
use crate::post::Post;

pub struct RenderOptions<'a> {
    /// Prefix for related-post hrefs; the post id is appended verbatim.
    pub link_prefix: &'a str,
    pub site_title: &'a str,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            link_prefix: "/blog/",
            site_title: "Blog",
        }
    }
}

pub fn build_html(state: &PageState, opts: &RenderOptions<'_>) -> String {
    let title = match state.status() {
        PageStatus::Ready { post, .. } => format!("{} | {}", post.title, opts.site_title),
        _ => opts.site_title.to_string(),
    };

    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(builtin::BUILTIN_CSS)) }
            }
            body class="bpr" {
                (render_page(state, opts))
            }
        }
    };
    markup.into_string()
}

/// The page body for the current status, without document chrome.
pub fn render_page(state: &PageState, opts: &RenderOptions<'_>) -> Markup {
    match state.status() {
        PageStatus::Loading => html! {
            p class="bpr-status" { "Loading post..." }
        },
        PageStatus::Error(msg) => html! {
            p class="bpr-status bpr-error" { (msg) }
        },
        PageStatus::Ready { post, related } => html! {
            (render_post(post))
            (render_related(related, opts))
        },
    }
}

fn render_post(post: &Post) -> Markup {
    html! {
        section class="bpr-detail" {
            article class="bpr-post" data-post-id=(post.id) {
                header {
                    h1 { (post.title) }
                    p class="bpr-byline" { (post.date) " | " (post.author) }
                }
                div class="bpr-hero" {
                    img src=(post.img) alt=(post.title) width="1100" height="700";
                }
                section class="bpr-body" {
                    p class="bpr-desc" { (post.desc) }
                    br;
                    p class="bpr-content" { (post.content) }
                }
            }
        }
    }
}

fn render_related(related: &Outcome<Vec<Post>>, opts: &RenderOptions<'_>) -> Markup {
    html! {
        aside class="bpr-related" {
            h2 { "Related posts" }
            @match related {
                Outcome::Pending => {
                    p class="bpr-related-status" { "Loading related posts..." }
                }
                Outcome::Failed(msg) => {
                    p class="bpr-related-status bpr-error" { (msg) }
                }
                Outcome::Ready(posts) if posts.is_empty() => {
                    p class="bpr-related-status" { "No related posts" }
                }
                Outcome::Ready(posts) => {
                    div class="bpr-related-grid" {
                        @for p in posts {
                            (render_card(p, opts))
                        }
                    }
                }
            }
        }
    }
}

fn render_card(post: &Post, opts: &RenderOptions<'_>) -> Markup {
    let href = format!("{}{}", opts.link_prefix, post.id);
    html! {
        a class="bpr-card" href=(href) {
            img src=(post.img) alt=(post.title) loading="lazy";
            div class="bpr-card-body" {
                h3 class="bpr-card-title" { (post.title) }
                p class="bpr-card-date" { (post.date) }
            }
        }
    }
}

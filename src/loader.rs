//! The detail-page state machine.
//!
//! A navigation to a slug starts two independent loads: the post itself and
//! the related-posts panel. Each writes its own slot of [`PageState`], and the
//! page status shown to the user is composed from both.
//!
//! Every navigation bumps a generation counter. Loads carry the generation
//! they were issued for, and anything they publish for an older generation is
//! dropped, so a slow response for a previous slug never overwrites the page.

use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{LoadError, Operation};
use crate::fetcher::Fetcher;
use crate::post::{self, Post};
use crate::record::{self, RawPostRecord};

/// Result slot for one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    fn from_result(result: Result<T, LoadError>, op: Operation) -> Self {
        match result {
            Ok(v) => Outcome::Ready(v),
            Err(err) => Outcome::Failed(err.user_message(op)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub slug: Option<String>,
    pub generation: u64,
    /// Cleared once per generation, when the post load completes.
    pub loading: bool,
    pub post: Outcome<Post>,
    pub related: Outcome<Vec<Post>>,
}

/// What the presentation layer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus<'a> {
    Loading,
    Error(&'a str),
    Ready {
        post: &'a Post,
        related: &'a Outcome<Vec<Post>>,
    },
}

impl PageState {
    fn new(slug: Option<String>, generation: u64) -> Self {
        Self {
            slug,
            generation,
            loading: true,
            post: Outcome::Pending,
            related: Outcome::Pending,
        }
    }

    /// Only a failed post load turns the page into an error page; a failed
    /// related load is shown inside the related panel.
    pub fn status(&self) -> PageStatus<'_> {
        if self.loading {
            return PageStatus::Loading;
        }
        match &self.post {
            Outcome::Ready(post) => PageStatus::Ready {
                post,
                related: &self.related,
            },
            Outcome::Failed(msg) => PageStatus::Error(msg),
            Outcome::Pending => PageStatus::Error("Post not found"),
        }
    }

    /// Both loads have reported for the current generation.
    pub fn is_settled(&self) -> bool {
        self.slug.is_some() && !self.loading && !self.related.is_pending()
    }

    pub fn related_posts(&self) -> &[Post] {
        self.related.ready().map(Vec::as_slice).unwrap_or(&[])
    }
}

pub struct PostDetailLoader {
    fetcher: Fetcher,
    runtime: Handle,
    state: Arc<watch::Sender<PageState>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PostDetailLoader {
    /// Binds the loader to the current tokio runtime; loads are spawned there.
    pub fn new(fetcher: Fetcher) -> anyhow::Result<Self> {
        let runtime = Handle::try_current().context("post loader needs a tokio runtime")?;
        let (tx, _rx) = watch::channel(PageState::new(None, 0));
        Ok(Self {
            fetcher,
            runtime,
            state: Arc::new(tx),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Switches the page to `slug` and starts both loads. Returns the
    /// generation assigned to this navigation.
    pub fn navigate(&self, slug: impl Into<String>) -> u64 {
        let slug = slug.into();
        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = s.generation + 1;
            *s = PageState::new(Some(slug.clone()), generation);
        });
        tracing::info!(%slug, generation, "loading post");

        let primary = self.runtime.spawn(run_primary(
            self.fetcher.clone(),
            self.state.clone(),
            slug.clone(),
            generation,
        ));
        let related = self.runtime.spawn(run_related(
            self.fetcher.clone(),
            self.state.clone(),
            slug,
            generation,
        ));

        match self.tasks.lock() {
            Ok(mut tasks) => {
                for stale in tasks.drain(..) {
                    stale.abort();
                }
                tasks.push(primary);
                tasks.push(related);
            }
            Err(_) => {
                tracing::debug!(generation, "task list poisoned; stale loads left running");
            }
        }
        generation
    }

    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PageState {
        self.state.borrow().clone()
    }

    /// Waits until both loads for the current slug have reported.
    pub async fn wait_settled(&self) -> anyhow::Result<PageState> {
        if self.state.borrow().slug.is_none() {
            anyhow::bail!("no post requested");
        }
        let mut rx = self.state.subscribe();
        let state = rx.wait_for(PageState::is_settled).await?;
        Ok(state.clone())
    }
}

impl Drop for PostDetailLoader {
    fn drop(&mut self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }
}

pub async fn load_primary(fetcher: &Fetcher, slug: &str) -> Result<Post, LoadError> {
    let body = fetcher.get_json(fetcher.post_url(slug)).await?;
    let value = body.filter(record::is_truthy).ok_or(LoadError::NotFound)?;
    let mut record = RawPostRecord::from_value(value)?;
    if record.id.is_none() {
        record.id = Some(slug.to_string());
    }
    Post::from_record(record).ok_or(LoadError::NotFound)
}

pub async fn load_related(fetcher: &Fetcher, slug: &str) -> Result<Vec<Post>, LoadError> {
    let body = fetcher.get_json(fetcher.collection_url()).await?;
    let Some(Value::Array(items)) = body else {
        return Err(LoadError::NoRelated);
    };

    let candidates = items
        .into_iter()
        .filter_map(|item| match RawPostRecord::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::debug!(error = %err, "skipping related candidate");
                None
            }
        })
        .collect();
    Ok(post::related_posts(candidates, slug))
}

async fn run_primary(
    fetcher: Fetcher,
    state: Arc<watch::Sender<PageState>>,
    slug: String,
    generation: u64,
) {
    let _done = CompletionGuard {
        state: state.clone(),
        generation,
        op: Operation::Primary,
    };

    let result = load_primary(&fetcher, &slug).await;
    if let Err(err) = &result {
        tracing::warn!(%slug, generation, error = %err, "error fetching post from API");
    }
    let outcome = Outcome::from_result(result, Operation::Primary);
    publish(&state, generation, |s| s.post = outcome);
}

async fn run_related(
    fetcher: Fetcher,
    state: Arc<watch::Sender<PageState>>,
    slug: String,
    generation: u64,
) {
    let _done = CompletionGuard {
        state: state.clone(),
        generation,
        op: Operation::Related,
    };

    let result = load_related(&fetcher, &slug).await;
    match &result {
        Ok(posts) => tracing::info!(%slug, generation, count = posts.len(), "related posts loaded"),
        Err(err) => {
            tracing::warn!(%slug, generation, error = %err, "error fetching related posts from API")
        }
    }
    let outcome = Outcome::from_result(result, Operation::Related);
    publish(&state, generation, |s| s.related = outcome);
}

fn publish(
    state: &watch::Sender<PageState>,
    generation: u64,
    apply: impl FnOnce(&mut PageState),
) {
    let applied = state.send_if_modified(|s| {
        if s.generation != generation {
            return false;
        }
        apply(s);
        true
    });
    if !applied {
        tracing::debug!(generation, "discarding stale result");
    }
}

/// Runs when a load task ends, however it ends. A task that unwound before
/// publishing leaves an unknown error in its slot, and the post load always
/// clears `loading` here.
struct CompletionGuard {
    state: Arc<watch::Sender<PageState>>,
    generation: u64,
    op: Operation,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let generation = self.generation;
        let op = self.op;
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            let unknown = || LoadError::Unknown.user_message(op);
            match op {
                Operation::Primary => {
                    let mut changed = false;
                    if s.post.is_pending() {
                        s.post = Outcome::Failed(unknown());
                        changed = true;
                    }
                    if s.loading {
                        s.loading = false;
                        changed = true;
                    }
                    changed
                }
                Operation::Related => {
                    if s.related.is_pending() {
                        s.related = Outcome::Failed(unknown());
                        true
                    } else {
                        false
                    }
                }
            }
        });
    }
}

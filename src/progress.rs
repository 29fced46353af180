use std::time::{Duration, Instant};

use indicatif::{HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::loader::{Outcome, PageState};

/// Stage spinner on stderr. A disabled instance swallows every call.
pub struct Progress {
    enabled: bool,
    start: Instant,
    stage: ProgressBar,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        let start = Instant::now();

        if !enabled {
            return Self {
                enabled: false,
                start,
                stage: ProgressBar::hidden(),
            };
        }

        let stage = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]") {
            stage.set_style(style);
        }
        stage.enable_steady_tick(Duration::from_millis(80));
        stage.set_message("starting");

        Self {
            enabled: true,
            start,
            stage,
        }
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    /// Mirrors the loader's slots while both loads are in flight.
    pub fn observe(&self, state: &PageState) {
        if !self.enabled {
            return;
        }
        let post = slot_label(&state.post);
        let related = slot_label(&state.related);
        self.set_stage(format!("post: {post} | related: {related}"));
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.stage
            .finish_with_message(format!("done in {}", HumanDuration(self.start.elapsed())));
    }
}

fn slot_label<T>(outcome: &Outcome<T>) -> &'static str {
    match outcome {
        Outcome::Pending => "loading",
        Outcome::Ready(_) => "ok",
        Outcome::Failed(_) => "failed",
    }
}

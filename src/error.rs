/// Why a load ended without a usable result.
///
/// `Display` gives the bare cause; [`LoadError::user_message`] adds the
/// per-operation prefix shown on the page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("{0}")]
    Transport(String),
    #[error("HTTP error! status: {0}")]
    UnexpectedStatus(u16),
    #[error("{0}")]
    Decode(String),
    #[error("Post not found")]
    NotFound,
    #[error("No related posts found")]
    NoRelated,
    #[error("An unknown error occurred.")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Primary,
    Related,
}

impl Operation {
    fn prefix(self) -> &'static str {
        match self {
            Operation::Primary => "Error fetching post from API",
            Operation::Related => "Error fetching related posts from API",
        }
    }
}

impl LoadError {
    pub fn transport(err: reqwest::Error) -> Self {
        use std::error::Error as _;

        let mut msg = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            msg.push_str(": ");
            msg.push_str(&cause.to_string());
            source = cause.source();
        }
        LoadError::Transport(msg)
    }

    pub fn user_message(&self, op: Operation) -> String {
        match self {
            LoadError::Transport(_) | LoadError::UnexpectedStatus(_) | LoadError::Decode(_) => {
                format!("{}: {}", op.prefix(), self)
            }
            LoadError::NotFound | LoadError::NoRelated | LoadError::Unknown => self.to_string(),
        }
    }
}

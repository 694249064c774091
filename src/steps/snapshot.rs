//! Snapshot types emitted by the executor.

/// Value of the leading status channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusValue {
    /// Rendered progress markup for the current step.
    Progress(String),
    /// A plain status message (initial banner, final message).
    Message { text: String, visible: bool },
}

impl StatusValue {
    /// A visible status message.
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message {
            text: text.into(),
            visible: true,
        }
    }

    /// A status message that replaces the progress markup but is not shown.
    pub fn hidden_message(text: impl Into<String>) -> Self {
        Self::Message {
            text: text.into(),
            visible: false,
        }
    }

    /// Progress markup, if this is a progress status.
    pub fn progress(&self) -> Option<&str> {
        match self {
            Self::Progress(markup) => Some(markup),
            Self::Message { .. } => None,
        }
    }
}

/// One emitted element: the status channel plus every display channel.
///
/// All snapshots of one run have the same number of channels; the consumer
/// binds them positionally to fixed output elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<D> {
    /// Progress markup or status message.
    pub status: StatusValue,
    /// Display channel values, in channel order.
    pub channels: Vec<D>,
}

impl<D> Snapshot<D> {
    /// Create a snapshot.
    pub fn new(status: StatusValue, channels: Vec<D>) -> Self {
        Self { status, channels }
    }

    /// Total arity of the emitted tuple (status + channels).
    pub fn arity(&self) -> usize {
        self.channels.len() + 1
    }
}

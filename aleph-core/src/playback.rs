//! Timeline playback: which state is shown, and whether it follows new ones.

use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Follow the last state.
    #[default]
    Live,
    /// Pinned to an earlier state chosen by the user.
    Scrubbing,
}

/// Index and mode over a timeline of `len` states.
///
/// Mutators return `true` when the shown state changed and the caller should
/// render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackController {
    index: Option<usize>,
    mode: PlaybackMode,
    len: usize,
}

impl PlaybackController {
    pub fn new(len: usize) -> Self {
        Self {
            index: len.checked_sub(1),
            mode: PlaybackMode::Live,
            len,
        }
    }

    /// Shown state, `None` on an empty timeline.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn is_live(&self) -> bool {
        self.mode == PlaybackMode::Live
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn last(&self) -> Option<usize> {
        self.len.checked_sub(1)
    }

    /// Show state `index`. Seeking to the last state returns to live mode.
    pub fn seek(&mut self, index: usize) -> Result<bool, PlaybackError> {
        if index >= self.len {
            return Err(PlaybackError::OutOfRange {
                index,
                len: self.len,
            });
        }

        self.mode = if Some(index) == self.last() {
            PlaybackMode::Live
        } else {
            PlaybackMode::Scrubbing
        };

        let changed = self.index != Some(index);
        self.index = Some(index);
        Ok(changed)
    }

    pub fn go_live(&mut self) -> bool {
        self.mode = PlaybackMode::Live;
        let last = self.last();
        let changed = self.index != last;
        self.index = last;
        changed
    }

    /// New states were appended. Live playback advances; scrubbing keeps its
    /// index.
    pub fn extend(&mut self, len: usize) -> bool {
        self.len = len.max(self.len);
        match self.mode {
            PlaybackMode::Live => {
                let last = self.last();
                let changed = self.index != last;
                self.index = last;
                changed
            }
            PlaybackMode::Scrubbing => false,
        }
    }

    /// The timeline was rebuilt with `len` states.
    ///
    /// Scrubbing survives when its index still exists; otherwise playback
    /// falls back to live. A non-empty rebuild always needs a render.
    pub fn replace(&mut self, len: usize) -> bool {
        self.len = len;

        match (self.mode, self.index) {
            (PlaybackMode::Scrubbing, Some(index)) if index + 1 < len => {}
            _ => {
                self.mode = PlaybackMode::Live;
                self.index = self.last();
            }
        }

        len > 0
    }
}

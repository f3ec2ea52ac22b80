//! Code fences used to bound rendered file content.

use serde::{Deserialize, Serialize};

const TRIPLE_BACKTICK: &str = "```";
const QUAD_BACKTICK: &str = "````";

/// An (open, close) delimiter pair.
///
/// One fence is chosen per assembly run and threaded unchanged through every
/// formatting call, so all blocks in a payload share the same delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fence {
    open: String,
    close: String,
}

impl Fence {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    /// True when the opening delimiter is exactly four backticks.
    pub fn is_quad_backtick(&self) -> bool {
        self.open == QUAD_BACKTICK
    }
}

impl Default for Fence {
    fn default() -> Self {
        Self::new(TRIPLE_BACKTICK, TRIPLE_BACKTICK)
    }
}

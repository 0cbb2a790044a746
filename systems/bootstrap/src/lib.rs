#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Startup preflight that confirms the background image exists before any
//! simulation state is built.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Relative path the background image is expected at.
pub const DEFAULT_BACKGROUND_PATH: &str = "Screenshot.png";

/// Prompt shown while waiting for the user to acknowledge a fatal startup error.
pub const EXIT_PROMPT: &str = "Press Enter to exit...";

/// Fatal conditions detected before the simulation starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BootstrapError {
    /// The background image could not be found.
    #[error(
        "Error: File '{}' not found. Please ensure the image is in the same directory as this script.",
        path.display()
    )]
    MissingBackground {
        /// Path that was checked.
        path: PathBuf,
    },
}

/// Resolves the assets required before the presentation loop may start.
#[derive(Debug)]
pub struct Bootstrap {
    background: PathBuf,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND_PATH)
    }
}

impl Bootstrap {
    /// Creates a preflight that looks for the background at `background`.
    #[must_use]
    pub fn new(background: impl Into<PathBuf>) -> Self {
        Self {
            background: background.into(),
        }
    }

    /// Path that will be checked for the background image.
    #[must_use]
    pub fn background_path(&self) -> &Path {
        &self.background
    }

    /// Confirms the background image exists and returns its path.
    pub fn locate_background(&self) -> Result<&Path, BootstrapError> {
        if self.background.is_file() {
            Ok(&self.background)
        } else {
            Err(BootstrapError::MissingBackground {
                path: self.background.clone(),
            })
        }
    }
}

//! Reconciling the live boundary stack with a frame list.
//!
//! Every frame is checked against the live stack before the first
//! mutation, so a mismatch leaves the document untouched.

use thiserror::Error;

use crate::client::host::{BrowserHost, LiveBoundary};
use crate::protocol::FrameDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("retained frame {index} ({expected}) does not match the live boundary {found:?}")]
    RetainMismatch {
        index: usize,
        expected: String,
        found: Option<String>,
    },

    #[error("frame {index} carries no html")]
    MissingHtml { index: usize },
}

/// Apply a stack payload's frames, outermost first.
pub fn apply_frames(host: &dyn BrowserHost, frames: &[FrameDescriptor]) -> Result<(), ApplyError> {
    let live = host.boundaries();

    for (index, frame) in frames.iter().enumerate() {
        if frame.retain {
            let current = live.get(index);
            let matches = current.is_some_and(|b| b.id == frame.id && b.version == frame.version);
            if !matches {
                return Err(ApplyError::RetainMismatch {
                    index,
                    expected: format!("{}@{}", frame.id, frame.version),
                    found: current.map(|b| format!("{}@{}", b.id, b.version)),
                });
            }
        } else if frame.html.is_none() {
            return Err(ApplyError::MissingHtml { index });
        }
    }

    if live.len() > frames.len() {
        host.truncate_boundaries(frames.len());
    }

    for (index, frame) in frames.iter().enumerate() {
        let Some(html) = frame.html.as_ref().filter(|_| !frame.retain) else {
            continue;
        };
        let boundary = LiveBoundary::new(frame.id.clone(), frame.version, html.clone());
        if index < live.len() {
            host.replace_boundary(index, boundary);
        } else {
            host.append_boundary(boundary);
        }
    }
    Ok(())
}

/// Apply frames restored from history: positions whose live boundary still
/// has the same identity and version are kept, the rest use stored markup.
pub fn apply_snapshot(host: &dyn BrowserHost, frames: &[FrameDescriptor]) -> Result<(), ApplyError> {
    let live = host.boundaries();
    let plan: Vec<FrameDescriptor> = frames
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            let unchanged = live
                .get(index)
                .is_some_and(|b| b.id == frame.id && b.version == frame.version);
            if unchanged {
                FrameDescriptor::retained(frame.id.clone(), frame.version)
            } else {
                FrameDescriptor {
                    retain: false,
                    ..frame.clone()
                }
            }
        })
        .collect();
    apply_frames(host, &plan)
}

//! Replay driver: feeds a JSON-lines event script through a workspace.
//!
//! Each non-blank line that does not start with `#` is one event object
//! tagged by `"type"`, for example
//! `{"type": "pointer_down", "x": 120, "y": 80}`. Pointer coordinates are
//! screen pixels in the configured viewport.

use std::path::{Path, PathBuf};

use canvas::camera::{Point, Size};
use canvas::doc::ImageId;
use canvas::engine::EditorSession;
use canvas::input::{Button, Key, Modifiers, Tool, WheelDelta};
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::DetectParams;
use crate::workspace::{Workspace, WorkspaceError};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The script file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A script line is not a valid event.
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A workspace operation failed in a way the replay cannot continue from.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonName {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl From<ButtonName> for Button {
    fn from(b: ButtonName) -> Self {
        match b {
            ButtonName::Primary => Self::Primary,
            ButtonName::Middle => Self::Middle,
            ButtonName::Secondary => Self::Secondary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolName {
    Draw,
    Pan,
}

impl From<ToolName> for Tool {
    fn from(t: ToolName) -> Self {
        match t {
            ToolName::Draw => Self::Draw,
            ToolName::Pan => Self::Pan,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModifierKeys {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl From<ModifierKeys> for Modifiers {
    fn from(m: ModifierKeys) -> Self {
        Self { shift: m.shift, ctrl: m.ctrl, alt: m.alt, meta: m.meta }
    }
}

/// One scripted input or command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Viewport {
        width: f64,
        height: f64,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: ButtonName,
        #[serde(default)]
        modifiers: ModifierKeys,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: ModifierKeys,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: ButtonName,
        #[serde(default)]
        modifiers: ModifierKeys,
    },
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
        #[serde(default)]
        modifiers: ModifierKeys,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        modifiers: ModifierKeys,
    },
    KeyUp {
        key: String,
        #[serde(default)]
        modifiers: ModifierKeys,
    },
    ZoomIn,
    ZoomOut,
    ResetZoom,
    SetTool {
        tool: ToolName,
    },
    SetLabel {
        label: String,
    },
    DeleteSelected,
    DeleteLast,
    Clear,
    Open {
        index: usize,
    },
    Next,
    Previous,
    AutoAnnotate(DetectParams),
}

/// Parse a whole script. Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns [`ReplayError::Parse`] with the 1-based line of the first bad event.
pub fn parse_script(text: &str) -> Result<Vec<Event>, ReplayError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| serde_json::from_str(line).map_err(|source| ReplayError::Parse { line: i + 1, source }))
        .collect()
}

/// Read and parse a script file.
///
/// # Errors
///
/// Fails when the file cannot be read or any line fails to parse.
pub async fn load_script(path: &Path) -> Result<Vec<Event>, ReplayError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReplayError::Read { path: path.to_path_buf(), source })?;
    parse_script(&text)
}

// =============================================================================
// RUNNER
// =============================================================================

/// What a replay did, for the final log line.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub events: usize,
    /// Events that failed without stopping the replay.
    pub failed: usize,
    pub image: Option<ImageId>,
    pub boxes: usize,
}

/// Apply `events` in order, then flush pending saves.
///
/// Detector failures are logged and counted; the replay continues.
///
/// # Errors
///
/// Stops at the first image that cannot be opened.
pub async fn run(workspace: &mut Workspace, events: &[Event]) -> Result<Summary, ReplayError> {
    let mut failed = 0;
    for (n, event) in events.iter().enumerate() {
        match apply(workspace, event).await {
            Ok(()) => {}
            Err(e @ (WorkspaceError::Detect(_) | WorkspaceError::NoImage)) => {
                warn!(error = %e, event = n + 1, "replay: event failed");
                failed += 1;
            }
            Err(e) => {
                workspace.flush().await;
                return Err(e.into());
            }
        }
    }
    workspace.flush().await;

    let session = workspace.session();
    Ok(Summary {
        events: events.len(),
        failed,
        image: session.image_id().cloned(),
        boxes: session.boxes.len(),
    })
}

async fn apply(ws: &mut Workspace, event: &Event) -> Result<(), WorkspaceError> {
    match event {
        Event::Viewport { width, height } => {
            ws.set_viewport(Size::new(*width, *height));
            Ok(())
        }
        Event::PointerDown { x, y, button, modifiers } => {
            let (pt, button, mods) = (Point::new(*x, *y), Button::from(*button), Modifiers::from(*modifiers));
            ws.apply(|s| s.on_pointer_down(pt, button, mods)).await
        }
        Event::PointerMove { x, y, modifiers } => {
            let (pt, mods) = (Point::new(*x, *y), Modifiers::from(*modifiers));
            ws.apply(|s| s.on_pointer_move(pt, mods)).await
        }
        Event::PointerUp { x, y, button, modifiers } => {
            let (pt, button, mods) = (Point::new(*x, *y), Button::from(*button), Modifiers::from(*modifiers));
            ws.apply(|s| s.on_pointer_up(pt, button, mods)).await
        }
        Event::Wheel { x, y, dx, dy, modifiers } => {
            let (pt, delta, mods) = (Point::new(*x, *y), WheelDelta { dx: *dx, dy: *dy }, Modifiers::from(*modifiers));
            ws.apply(|s| s.on_wheel(pt, delta, mods)).await
        }
        Event::KeyDown { key, modifiers } => {
            let (key, mods) = (Key::new(key.as_str()), Modifiers::from(*modifiers));
            ws.apply(|s| s.on_key_down(&key, mods)).await
        }
        Event::KeyUp { key, modifiers } => {
            let (key, mods) = (Key::new(key.as_str()), Modifiers::from(*modifiers));
            ws.apply(|s| s.on_key_up(&key, mods)).await
        }
        Event::ZoomIn => ws.apply(EditorSession::zoom_in).await,
        Event::ZoomOut => ws.apply(EditorSession::zoom_out).await,
        Event::ResetZoom => ws.apply(EditorSession::reset_zoom).await,
        Event::SetTool { tool } => {
            let tool = Tool::from(*tool);
            ws.apply(|s| s.set_tool(tool)).await
        }
        Event::SetLabel { label } => ws.apply(|s| s.set_active_label(label.as_str())).await,
        Event::DeleteSelected => ws.apply(EditorSession::delete_selected).await,
        Event::DeleteLast => ws.apply(EditorSession::delete_last_box).await,
        Event::Clear => ws.apply(EditorSession::clear_boxes).await,
        Event::Open { index } => ws.open(*index).await,
        Event::Next => ws.next().await,
        Event::Previous => ws.previous().await,
        Event::AutoAnnotate(params) => {
            let outcome = ws.auto_annotate(params).await?;
            info!(found = outcome.found, summary = %outcome.summary, "replay: detections merged");
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "replay_test.rs"]
mod tests;

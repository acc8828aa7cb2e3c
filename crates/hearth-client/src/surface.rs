//! The rendered UI surface the client drives
//!
//! The client never owns widgets. It tells a [`ChatSurface`] which region to
//! show, how the credential form looks, which lines the message list holds,
//! and when to alert the user.

use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// Top-level region of the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Credential form
    Login,
    /// Message list and composer
    Chat,
}

/// Whether the credential form submits a login or a signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Login,
    Signup,
}

impl FormMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Signup,
            Self::Signup => Self::Login,
        }
    }

    /// Label of the submit button
    pub fn submit_label(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Signup => "Sign Up",
        }
    }
}

/// How the credential form should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormLayout {
    pub mode: FormMode,
    pub display_name_visible: bool,
    pub submit_label: &'static str,
}

impl FormLayout {
    pub fn new(mode: FormMode, collects_display_name: bool) -> Self {
        Self {
            mode,
            display_name_visible: collects_display_name && mode == FormMode::Signup,
            submit_label: mode.submit_label(),
        }
    }
}

/// One rendered entry of the message list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    /// Display name, or the raw email when none is known
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for FeedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.author, self.text)
    }
}

/// A UI the chat client renders into
///
/// Calls arrive from async tasks, so implementations use interior
/// mutability and must not block.
pub trait ChatSurface: Send + Sync {
    /// Show `region` and hide the other one
    fn show_region(&self, region: Region);

    /// Redraw the credential form
    fn set_form_layout(&self, layout: FormLayout);

    /// Remove every line from the message list
    fn clear_messages(&self);

    /// Append a line to the message list
    fn append_message(&self, line: &FeedLine);

    /// Scroll the message list to its newest entry
    fn scroll_to_latest(&self);

    /// Show a modal message to the user
    fn alert(&self, message: &str);
}

/// Everything a [`RecordingSurface`] has been told
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceState {
    pub region: Option<Region>,
    pub form: Option<FormLayout>,
    pub lines: Vec<String>,
    pub alerts: Vec<String>,
    pub clears: usize,
}

/// A [`ChatSurface`] that records what it is told
///
/// Each `scroll_to_latest` marks the end of one feed render, which
/// [`wait_for_renders`](Self::wait_for_renders) can await.
#[derive(Debug)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
    renders: watch::Sender<usize>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        let (renders, _) = watch::channel(0);
        Self {
            state: Mutex::new(SurfaceState::default()),
            renders,
        }
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the recorded state
    pub fn snapshot(&self) -> SurfaceState {
        self.state().clone()
    }

    /// Lines currently in the message list
    pub fn lines(&self) -> Vec<String> {
        self.state().lines.clone()
    }

    /// Every alert shown so far
    pub fn alerts(&self) -> Vec<String> {
        self.state().alerts.clone()
    }

    /// Most recent alert
    pub fn last_alert(&self) -> Option<String> {
        self.state().alerts.last().cloned()
    }

    /// Visible region
    pub fn region(&self) -> Option<Region> {
        self.state().region
    }

    /// Number of completed renders
    pub fn render_count(&self) -> usize {
        *self.renders.borrow()
    }

    /// Wait until at least `count` renders have completed
    ///
    /// Returns false if that does not happen within `timeout`.
    pub async fn wait_for_renders(&self, count: usize, timeout: Duration) -> bool {
        let mut rx = self.renders.subscribe();
        tokio::time::timeout(timeout, rx.wait_for(|n| *n >= count))
            .await
            .is_ok_and(|r| r.is_ok())
    }

    /// Wait until the message list holds exactly `expected` after a render
    pub async fn wait_for_lines(&self, expected: &[&str], timeout: Duration) -> bool {
        let mut rx = self.renders.subscribe();
        let matched = rx.wait_for(|_| self.state().lines == expected);
        tokio::time::timeout(timeout, matched)
            .await
            .is_ok_and(|r| r.is_ok())
    }
}

impl ChatSurface for RecordingSurface {
    fn show_region(&self, region: Region) {
        self.state().region = Some(region);
    }

    fn set_form_layout(&self, layout: FormLayout) {
        self.state().form = Some(layout);
    }

    fn clear_messages(&self) {
        let mut state = self.state();
        state.lines.clear();
        state.clears += 1;
    }

    fn append_message(&self, line: &FeedLine) {
        self.state().lines.push(line.to_string());
    }

    fn scroll_to_latest(&self) {
        self.renders.send_modify(|n| *n += 1);
    }

    fn alert(&self, message: &str) {
        self.state().alerts.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_layout() {
        let login = FormLayout::new(FormMode::Login, true);
        assert!(!login.display_name_visible);
        assert_eq!(login.submit_label, "Login");

        let signup = FormLayout::new(FormMode::Signup, true);
        assert!(signup.display_name_visible);
        assert_eq!(signup.submit_label, "Sign Up");

        let plain_signup = FormLayout::new(FormMode::Signup, false);
        assert!(!plain_signup.display_name_visible);
        assert_eq!(FormMode::Signup.toggled(), FormMode::Login);
    }

    #[test]
    fn test_feed_line_display() {
        let line = FeedLine {
            author: "Ann".into(),
            text: "hi".into(),
            created_at: Utc::now(),
        };
        assert_eq!(line.to_string(), "Ann: hi");
    }

    #[tokio::test]
    async fn test_recording_surface_counts_renders() {
        let surface = RecordingSurface::new();
        surface.clear_messages();
        surface.append_message(&FeedLine {
            author: "a@x.com".into(),
            text: "hi".into(),
            created_at: Utc::now(),
        });
        surface.scroll_to_latest();

        assert!(surface.wait_for_renders(1, Duration::from_secs(1)).await);
        assert!(
            surface
                .wait_for_lines(&["a@x.com: hi"], Duration::from_secs(1))
                .await
        );
        assert!(!surface.wait_for_renders(2, Duration::from_millis(20)).await);
        assert_eq!(surface.snapshot().clears, 1);
    }
}

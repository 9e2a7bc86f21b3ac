//! Serialized session snapshot and the narrow contract live applications expose to produce it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSessionEntry {
    pub name: String,
    pub dimension: Dimension,
    pub position: Position,
    /// Window-defined state, stored and restored without interpretation.
    #[serde(default)]
    pub state: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSessionEntry {
    pub name: String,
    /// Construction arguments the application was launched with.
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub windows: Vec<WindowSessionEntry>,
}

/// Ordered list of running applications as written on logout.
///
/// Reads return the stored JSON untouched, so this type describes the write side only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSnapshot {
    pub applications: Vec<ApplicationSessionEntry>,
}

/// A live window as seen by the session layer.
pub trait SessionWindow {
    fn name(&self) -> &str;
    fn dimension(&self) -> Dimension;
    fn position(&self) -> Position;
    fn state(&self) -> Value;
}

/// A live desktop application as seen by the session layer.
pub trait SessionApplication {
    fn name(&self) -> &str;
    fn launch_args(&self) -> Value;
    /// Windows in the order the application currently holds them.
    fn windows(&self) -> Vec<&dyn SessionWindow>;
}

/// Any process known to the runtime. Only processes that are desktop applications take part in
/// session snapshots.
pub trait RunningProcess {
    fn as_application(&self) -> Option<&dyn SessionApplication> {
        None
    }
}

impl WindowSessionEntry {
    pub fn capture(window: &dyn SessionWindow) -> Self {
        Self {
            name: window.name().to_string(),
            dimension: window.dimension(),
            position: window.position(),
            state: window.state(),
        }
    }
}

impl ApplicationSessionEntry {
    pub fn capture(app: &dyn SessionApplication) -> Self {
        Self {
            name: app.name().to_string(),
            args: app.launch_args(),
            windows: app
                .windows()
                .into_iter()
                .map(WindowSessionEntry::capture)
                .collect(),
        }
    }
}

impl SessionSnapshot {
    /// Captures every application among `processes`, in process order.
    pub fn capture(processes: &[&dyn RunningProcess]) -> Self {
        Self {
            applications: processes
                .iter()
                .filter_map(|process| process.as_application())
                .map(ApplicationSessionEntry::capture)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

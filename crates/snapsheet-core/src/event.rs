#![forbid(unsafe_code)]

//! Notifications a drawer emits to its host.
//!
//! Events carry no payload. They are queued while the drawer processes
//! input and drained by the host with
//! [`Drawer::drain_events`](crate::drawer::Drawer::drain_events).

use std::fmt;

use crate::geometry::SnapTarget;

/// A completed settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawerEvent {
    /// Settled at Start, Middle or End.
    Opened,
    /// Settled at Closed.
    Closed,
}

impl DrawerEvent {
    /// Event for a settle that finished at `target`.
    #[must_use]
    pub const fn for_target(target: SnapTarget) -> Self {
        if target.is_open() {
            DrawerEvent::Opened
        } else {
            DrawerEvent::Closed
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DrawerEvent::Opened => "opened",
            DrawerEvent::Closed => "closed",
        }
    }
}

impl fmt::Display for DrawerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Alert routing between system notifications and in-app toasts.

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use flock_core::types::Role;
use flock_notify::model::{Audience, Notification};

/// Whether the app surface currently has the user's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceVisibility {
    Visible,
    Hidden,
}

/// Shared visibility flag, flipped by the embedding surface as the user
/// switches away and back. Starts visible.
#[derive(Debug, Clone, Default)]
pub struct SurfaceFlag(Arc<AtomicBool>);

impl SurfaceFlag {
    pub fn new(initial: SurfaceVisibility) -> Self {
        let flag = Self::default();
        flag.set(initial);
        flag
    }

    pub fn set(&self, visibility: SurfaceVisibility) {
        self.0
            .store(visibility == SurfaceVisibility::Hidden, Ordering::Relaxed);
    }

    pub fn get(&self) -> SurfaceVisibility {
        if self.0.load(Ordering::Relaxed) {
            SurfaceVisibility::Hidden
        } else {
            SurfaceVisibility::Visible
        }
    }
}

/// OS-level notification surface.
pub trait SystemNotifier: Send + Sync + Debug {
    /// Whether the user granted system notification permission.
    fn permission(&self) -> bool;
    fn notify(&self, notification: &Notification);
}

/// In-app toast surface.
pub trait ToastSink: Send + Sync + Debug {
    fn notify(&self, notification: &Notification);
    /// Shown once when automatic reconnection gives up.
    fn connection_lost(&self);
}

/// Where one notification surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertSurface {
    System,
    Toast,
    Nothing,
}

/// Routes freshly delivered notifications to at most one alert surface.
#[derive(Debug, Clone)]
pub struct AlertRouter {
    viewer_role: Role,
    surface: SurfaceFlag,
    system: Arc<dyn SystemNotifier>,
    toasts: Arc<dyn ToastSink>,
}

impl AlertRouter {
    pub fn new(
        viewer_role: Role,
        surface: SurfaceFlag,
        system: Arc<dyn SystemNotifier>,
        toasts: Arc<dyn ToastSink>,
    ) -> Self {
        Self {
            viewer_role,
            surface,
            system,
            toasts,
        }
    }

    /// Surface one notification. An event alerts through exactly one
    /// channel or none; it is never shown twice.
    pub fn route(&self, notification: &Notification) {
        match decide(
            notification,
            self.viewer_role,
            self.surface.get(),
            self.system.permission(),
        ) {
            AlertSurface::System => self.system.notify(notification),
            AlertSurface::Toast => self.toasts.notify(notification),
            AlertSurface::Nothing => {}
        }
    }

    /// Offline notice after reconnection gives up.
    pub fn connection_lost(&self) {
        self.toasts.connection_lost();
    }
}

fn decide(
    notification: &Notification,
    viewer: Role,
    surface: SurfaceVisibility,
    permission: bool,
) -> AlertSurface {
    let admin_alert = viewer.is_admin() && notification.audience == Audience::Admin;
    if !notification.priority.is_alert_worthy() && !admin_alert {
        return AlertSurface::Nothing;
    }
    match surface {
        SurfaceVisibility::Visible => AlertSurface::Toast,
        SurfaceVisibility::Hidden if permission => AlertSurface::System,
        SurfaceVisibility::Hidden => AlertSurface::Nothing,
    }
}

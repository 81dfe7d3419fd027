//! Route groups mounted under `/api`.
//!
//! Each group is served by an external [`Collaborator`]. The service only
//! knows the fixed, ordered list of prefixes; what a collaborator does behind
//! its prefix is outside this crate.

pub mod collaborator;
pub mod mount;

pub use collaborator::{Collaborator, Unimplemented};
pub use mount::{mount_all, MountPoint, RouteLoadError};

use std::sync::Arc;

/// Route groups in mount order.
pub const ROUTE_GROUPS: [&str; 8] = [
    "auth",
    "profile",
    "challenges",
    "courses",
    "compiler",
    "bepo",
    "payment",
    "admin",
];

/// Mount points for every route group, each served by [`Unimplemented`].
pub fn default_mounts() -> Vec<MountPoint> {
    ROUTE_GROUPS
        .iter()
        .map(|&group| MountPoint::new(format!("/api/{group}"), Arc::new(Unimplemented::new(group))))
        .collect()
}

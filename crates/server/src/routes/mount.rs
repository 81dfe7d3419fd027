//! All-or-nothing registration of route groups.
//!
//! [`mount_all`] first validates every prefix, then loads every collaborator in
//! order, and only nests them once all loads have succeeded. A failure at any
//! step returns an error and no router, so a partially mounted server can
//! never start listening.

use std::collections::HashSet;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tracing::{debug, info};

use super::Collaborator;
use crate::server::state::AppContext;

/// Errors raised while registering route groups.
#[derive(Debug, Error)]
pub enum RouteLoadError {
    /// The prefix cannot be nested.
    #[error("invalid mount prefix {prefix:?}: {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },

    /// Two mount points share a prefix.
    #[error("duplicate mount prefix {0:?}")]
    DuplicatePrefix(String),

    /// The collaborator could not build its router.
    #[error("failed to load {name} routes: {reason}")]
    Collaborator { name: String, reason: String },
}

/// A path prefix bound to the collaborator that serves it.
#[derive(Clone)]
pub struct MountPoint {
    prefix: String,
    collaborator: Arc<dyn Collaborator>,
}

impl MountPoint {
    pub fn new(prefix: impl Into<String>, collaborator: Arc<dyn Collaborator>) -> Self {
        Self {
            prefix: prefix.into(),
            collaborator,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl std::fmt::Debug for MountPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountPoint")
            .field("prefix", &self.prefix)
            .field("collaborator", &self.collaborator.name())
            .finish()
    }
}

/// Load every collaborator and nest it under its prefix.
///
/// Each group is nested as a service, so the bare prefix, the prefix with a
/// trailing slash, and every path below it all reach the collaborator.
///
/// # Errors
///
/// Returns the first [`RouteLoadError`] encountered; nothing is mounted in that case.
pub fn mount_all(ctx: &AppContext, mounts: &[MountPoint]) -> Result<Router<AppContext>, RouteLoadError> {
    let mut seen = HashSet::new();
    for mount in mounts {
        validate_prefix(mount.prefix())?;
        if !seen.insert(mount.prefix()) {
            return Err(RouteLoadError::DuplicatePrefix(mount.prefix.clone()));
        }
    }

    let loaded = mounts
        .iter()
        .map(|mount| -> Result<_, RouteLoadError> {
            let name = mount.collaborator.name();
            let router = mount
                .collaborator
                .load(ctx)
                .map_err(|e| RouteLoadError::Collaborator {
                    name: name.to_owned(),
                    reason: format!("{e:#}"),
                })?;
            debug!(prefix = %mount.prefix, collaborator = name, "collaborator loaded");
            Ok((mount.prefix(), router.with_state::<()>(ctx.clone())))
        })
        .collect::<Result<Vec<_>, RouteLoadError>>()?;

    let api = loaded
        .into_iter()
        .fold(Router::new(), |api, (prefix, group)| api.nest_service(prefix, group));

    info!(groups = mounts.len(), "route groups mounted");
    Ok(api)
}

fn validate_prefix(prefix: &str) -> Result<(), RouteLoadError> {
    let reason = if !prefix.starts_with('/') {
        Some("must start with '/'")
    } else if prefix == "/" {
        Some("must not be the root path")
    } else if prefix.ends_with('/') {
        Some("must not end with '/'")
    } else if prefix.contains(['*', ':', '{']) {
        Some("must not contain path parameters or wildcards")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RouteLoadError::InvalidPrefix {
            prefix: prefix.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{default_mounts, Unimplemented};
    use crate::server::state::test_support::healthy_context;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Collaborator that fails to load, counting how often it was asked.
    struct Broken {
        loads: Arc<AtomicUsize>,
    }

    impl Collaborator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn load(&self, _ctx: &AppContext) -> anyhow::Result<Router<AppContext>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("handler table missing")
        }
    }

    /// Collaborator that counts loads and succeeds.
    struct Counting {
        loads: Arc<AtomicUsize>,
    }

    impl Collaborator for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn load(&self, ctx: &AppContext) -> anyhow::Result<Router<AppContext>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Unimplemented::new("counting").load(ctx)
        }
    }

    fn server_for(ctx: AppContext, api: Router<AppContext>) -> TestServer {
        TestServer::new(api.with_state(ctx)).unwrap()
    }

    #[tokio::test]
    async fn every_default_group_is_reachable() {
        let ctx = healthy_context();
        let api = mount_all(&ctx, &default_mounts()).unwrap();
        let server = server_for(ctx, api);

        for prefix in default_mounts().iter().map(MountPoint::prefix) {
            let resp = server.get(&format!("{prefix}/anything/below")).await;
            assert_eq!(resp.status_code(), StatusCode::NOT_IMPLEMENTED, "{prefix}");
            let body: serde_json::Value = resp.json();
            assert_eq!(body["code"], "not_implemented");

            let resp = server.post(prefix).await;
            assert_eq!(resp.status_code(), StatusCode::NOT_IMPLEMENTED, "{prefix}");

            let resp = server.get(&format!("{prefix}/")).await;
            assert_eq!(resp.status_code(), StatusCode::NOT_IMPLEMENTED, "{prefix}/");
        }
    }

    #[tokio::test]
    async fn unmounted_prefix_is_not_routed() {
        let ctx = healthy_context();
        let api = mount_all(&ctx, &default_mounts()).unwrap();
        let server = server_for(ctx, api);
        assert_eq!(server.get("/api/unknown").await.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn failing_collaborator_aborts_registration() {
        let ctx = healthy_context();
        let after = Arc::new(AtomicUsize::new(0));
        let broken = Arc::new(AtomicUsize::new(0));
        let mounts = vec![
            MountPoint::new("/api/auth", Arc::new(Unimplemented::new("auth"))),
            MountPoint::new("/api/payment", Arc::new(Broken { loads: broken.clone() })),
            MountPoint::new("/api/admin", Arc::new(Counting { loads: after.clone() })),
        ];

        let err = mount_all(&ctx, &mounts).unwrap_err();
        assert!(
            matches!(&err, RouteLoadError::Collaborator { name, reason }
                if name == "broken" && reason == "handler table missing"),
            "{err:?}"
        );
        assert_eq!(broken.load(Ordering::SeqCst), 1);
        // Loading stops at the first failure.
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_prefix_fails_before_any_load() {
        let ctx = healthy_context();
        let loads = Arc::new(AtomicUsize::new(0));
        let mounts = vec![
            MountPoint::new("/api/auth", Arc::new(Counting { loads: loads.clone() })),
            MountPoint::new("/api/*all", Arc::new(Unimplemented::new("all"))),
        ];

        let err = mount_all(&ctx, &mounts).unwrap_err();
        assert!(matches!(err, RouteLoadError::InvalidPrefix { .. }));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn duplicate_prefix_is_rejected() {
        let ctx = healthy_context();
        let mounts = vec![
            MountPoint::new("/api/bepo", Arc::new(Unimplemented::new("bepo"))),
            MountPoint::new("/api/bepo", Arc::new(Unimplemented::new("bepo"))),
        ];
        let err = mount_all(&ctx, &mounts).unwrap_err();
        assert!(matches!(err, RouteLoadError::DuplicatePrefix(p) if p == "/api/bepo"));
    }

    #[test]
    fn prefix_rules() {
        assert!(validate_prefix("/api/courses").is_ok());
        assert!(validate_prefix("api/courses").is_err());
        assert!(validate_prefix("/").is_err());
        assert!(validate_prefix("/api/courses/").is_err());
        assert!(validate_prefix("/api/:id").is_err());
        assert!(validate_prefix("/api/{id}").is_err());
    }
}

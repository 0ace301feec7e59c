//! Post-sign-out navigation hook.
//!
//! The facade owns no routing. After a sign-out timer fires it hands the
//! login route to whatever `Navigator` the caller installed.

use tracing::info;

/// Route shown after a sign-out completes.
pub const LOGIN_ROUTE: &str = "/log-in";

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Records navigation requests in the log; used by headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "navigation requested");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _route: &str) {}
}

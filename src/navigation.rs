//! Navigation side effects
//!
//! The session store only ever asks to "go to route R"; how a route is
//! rendered belongs to the presentation layer.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Client-side views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Landing,
    Login,
    Signup,
    Chat,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Chat => "/chat",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Sink for navigation requests
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn navigate(&self, route: Route) {
        (**self).navigate(route);
    }
}

/// Navigator that publishes the current route on a watch channel
pub struct RouteNavigator {
    tx: watch::Sender<Route>,
}

impl RouteNavigator {
    pub fn new(initial: Route) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> Route {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }
}

impl Default for RouteNavigator {
    fn default() -> Self {
        Self::new(Route::Landing)
    }
}

impl Navigator for RouteNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "Navigating");
        // Re-navigating to the current route still wakes subscribers
        self.tx.send_replace(route);
    }
}

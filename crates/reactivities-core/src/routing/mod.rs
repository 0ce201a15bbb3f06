//! Route table and route guard.
//!
//! Routes are plain data (`RouteSpec`). `guard` decorates a spec with an
//! access predicate without touching how it matches, so a guarded route
//! matches exactly the locations its unguarded form does.

mod pattern;

use std::fmt;
use std::sync::Arc;

pub use pattern::{Params, RoutePattern};

/// Public landing route; unauthenticated navigation is sent here.
pub const HOME_PATH: &str = "/";

/// Session facts the router needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationContext {
    /// Boot sequence has completed.
    pub ready: bool,
    /// A session token is present.
    pub authenticated: bool,
}

/// Screens a route can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    ActivityDashboard,
    ActivityDetails,
    ActivityForm,
    Profile,
    VerifyEmail,
    NotFound,
}

/// A location split into path and query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
}

impl Location {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (location, None),
        };
        let path = if path.is_empty() { HOME_PATH } else { path };
        Self {
            path: path.to_string(),
            query: query.filter(|query| !query.is_empty()),
        }
    }
}

pub type AccessPredicate = Arc<dyn Fn(&NavigationContext) -> bool + Send + Sync>;

#[derive(Clone)]
enum Access {
    Public,
    Guarded {
        predicate: AccessPredicate,
        redirect_to: String,
    },
}

/// One entry of the route table.
#[derive(Clone)]
pub struct RouteSpec {
    patterns: Vec<RoutePattern>,
    exact: bool,
    screen: Screen,
    access: Access,
}

impl RouteSpec {
    pub fn new(path: &str, screen: Screen) -> Self {
        Self::multi(&[path], screen)
    }

    /// A route answering to several paths; the first matching path wins.
    pub fn multi(paths: &[&str], screen: Screen) -> Self {
        Self {
            patterns: paths.iter().map(|path| RoutePattern::parse(path)).collect(),
            exact: false,
            screen,
            access: Access::Public,
        }
    }

    /// A route matching every location.
    pub fn catch_all(screen: Screen) -> Self {
        Self::multi(&[HOME_PATH], screen)
    }

    #[must_use]
    pub const fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub const fn screen(&self) -> Screen {
        self.screen
    }

    pub const fn is_guarded(&self) -> bool {
        matches!(self.access, Access::Guarded { .. })
    }

    /// Match a location, returning the pattern that matched and its params.
    pub fn matches(&self, location: &Location) -> Option<(&RoutePattern, Params)> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .match_path(&location.path, self.exact)
                .map(|params| (pattern, params))
        })
    }
}

impl fmt::Debug for RouteSpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RouteSpec")
            .field(
                "patterns",
                &self.patterns.iter().map(RoutePattern::as_str).collect::<Vec<_>>(),
            )
            .field("exact", &self.exact)
            .field("screen", &self.screen)
            .field("guarded", &self.is_guarded())
            .finish()
    }
}

/// Decorate `spec` so it only renders when `predicate` holds, redirecting
/// home otherwise. Matching is left untouched.
pub fn guard<P>(predicate: P, spec: RouteSpec) -> RouteSpec
where
    P: Fn(&NavigationContext) -> bool + Send + Sync + 'static,
{
    RouteSpec {
        access: Access::Guarded {
            predicate: Arc::new(predicate),
            redirect_to: HOME_PATH.to_string(),
        },
        ..spec
    }
}

/// Guard requiring a session token.
pub fn private(spec: RouteSpec) -> RouteSpec {
    guard(|context| context.authenticated, spec)
}

/// A rendered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub screen: Screen,
    pub pattern: String,
    pub params: Params,
    pub query: Option<String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Every screen except the landing page renders inside the nav chrome.
    pub fn has_navbar(&self) -> bool {
        self.screen != Screen::Home
    }
}

/// Result of resolving a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Boot has not completed; nothing renders.
    Loading,
    Render(RouteMatch),
    Redirect { to: String },
}

#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<RouteSpec>,
}

impl Router {
    pub const fn new(routes: Vec<RouteSpec>) -> Self {
        Self { routes }
    }

    /// The application's route table.
    pub fn app_routes() -> Self {
        Self::new(vec![
            RouteSpec::new(HOME_PATH, Screen::Home).exact(),
            private(RouteSpec::new("/activities", Screen::ActivityDashboard).exact()),
            private(RouteSpec::new("/activities/:id", Screen::ActivityDetails)),
            private(RouteSpec::multi(
                &["/createActivity", "/manage/:id"],
                Screen::ActivityForm,
            )),
            RouteSpec::new("/profile/:username", Screen::Profile),
            RouteSpec::new("/user/verifyEmail", Screen::VerifyEmail),
            RouteSpec::catch_all(Screen::NotFound),
        ])
    }

    pub fn resolve(&self, location: &str, context: &NavigationContext) -> Navigation {
        if !context.ready {
            return Navigation::Loading;
        }

        let location = Location::parse(location);
        let Some((route, pattern, params)) = self.routes.iter().find_map(|route| {
            route
                .matches(&location)
                .map(|(pattern, params)| (route, pattern.as_str().to_string(), params))
        }) else {
            return Navigation::Render(RouteMatch {
                screen: Screen::NotFound,
                pattern: location.path,
                params: Params::new(),
                query: location.query,
            });
        };

        if let Access::Guarded {
            predicate,
            redirect_to,
        } = &route.access
        {
            if !predicate(context) {
                tracing::debug!(path = %location.path, to = %redirect_to, "Redirecting guarded route");
                return Navigation::Redirect {
                    to: redirect_to.clone(),
                };
            }
        }

        Navigation::Render(RouteMatch {
            screen: route.screen,
            pattern,
            params,
            query: location.query,
        })
    }
}

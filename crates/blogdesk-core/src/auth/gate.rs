//! Navigation gating.
//!
//! `can_enter` decides from a snapshot alone whether protected content may
//! render; `navigate` combines it with the application's route table.
//! Neither holds state, so callers re-evaluate on every navigation.

use serde::Serialize;

use super::SessionSnapshot;

/// Where unauthenticated callers are sent
pub const LOGIN_PATH: &str = "/login";

/// Where unknown paths are sent
pub const HOME_PATH: &str = "/";

/// Where the host navigates after a successful sign-in
pub const AFTER_LOGIN_PATH: &str = "/posts";

/// Outcome of gating a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum GateDecision {
    Allow,
    /// Session is still being restored; render neither the view nor a redirect
    Pending,
    Deny {
        #[serde(rename = "redirectTo")]
        redirect_to: &'static str,
    },
}

pub fn can_enter(snapshot: &SessionSnapshot) -> GateDecision {
    if snapshot.is_loading() {
        GateDecision::Pending
    } else if snapshot.is_authenticated() {
        GateDecision::Allow
    } else {
        GateDecision::Deny {
            redirect_to: LOGIN_PATH,
        }
    }
}

/// Views of the blog client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Posts,
    NewPost,
    Post(i64),
    EditPost(i64),
    Categories,
    NewCategory,
    EditCategory(i64),
    Tags,
    NewTag,
    EditTag(i64),
    NotFound,
}

impl Route {
    /// Match a path such as `/posts/12/edit`. Query strings and fragments are
    /// ignored; ids must be integers.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["posts"] => Route::Posts,
            ["posts", "new"] => Route::NewPost,
            ["posts", id] => id.parse().map(Route::Post).unwrap_or(Route::NotFound),
            ["posts", id, "edit"] => id.parse().map(Route::EditPost).unwrap_or(Route::NotFound),
            ["categories"] => Route::Categories,
            ["categories", "new"] => Route::NewCategory,
            ["categories", id, "edit"] => {
                id.parse().map(Route::EditCategory).unwrap_or(Route::NotFound)
            }
            ["tags"] => Route::Tags,
            ["tags", "new"] => Route::NewTag,
            ["tags", id, "edit"] => id.parse().map(Route::EditTag).unwrap_or(Route::NotFound),
            _ => Route::NotFound,
        }
    }

    /// Whether entering this view requires a signed-in user
    pub fn is_protected(&self) -> bool {
        !matches!(
            self,
            Route::Home | Route::Login | Route::Register | Route::NotFound
        )
    }
}

/// Result of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Pending,
    Redirect(&'static str),
}

pub fn navigate(path: &str, snapshot: &SessionSnapshot) -> Navigation {
    let route = Route::parse(path);
    if route == Route::NotFound {
        return Navigation::Redirect(HOME_PATH);
    }
    if !route.is_protected() {
        return Navigation::Render(route);
    }
    match can_enter(snapshot) {
        GateDecision::Allow => Navigation::Render(route),
        GateDecision::Pending => Navigation::Pending,
        GateDecision::Deny { redirect_to } => Navigation::Redirect(redirect_to),
    }
}

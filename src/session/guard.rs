//! Route guards
//!
//! Pure functions of session state deciding whether a route may render or
//! must redirect.

use super::store::SessionStore;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Result of evaluating a guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The nested route may render
    Render,
    /// Navigation must go to the given path instead
    Redirect(&'static str),
}

impl GuardOutcome {
    pub fn is_render(self) -> bool {
        matches!(self, GuardOutcome::Render)
    }
}

/// Guard state required by a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Anyone may enter
    Public,
    /// Requires an authenticated session; admin only when `require_admin`
    Protected { require_admin: bool },
    /// Only for anonymous users (login, register)
    RedirectIfAuthenticated,
}

impl Guard {
    pub fn evaluate(self, authenticated: bool, admin: bool) -> GuardOutcome {
        match self {
            Guard::Public => GuardOutcome::Render,
            Guard::Protected { require_admin } => {
                protected_route(authenticated, admin, require_admin)
            }
            Guard::RedirectIfAuthenticated => redirect_if_authenticated(authenticated),
        }
    }

    pub fn check(self, session: &SessionStore) -> GuardOutcome {
        self.evaluate(session.is_authenticated(), session.is_admin())
    }
}

/// Render when authenticated, otherwise send the user to the login page.
/// A non-admin on an admin route goes back home.
pub fn protected_route(authenticated: bool, admin: bool, require_admin: bool) -> GuardOutcome {
    if !authenticated {
        return GuardOutcome::Redirect(LOGIN_PATH);
    }
    if require_admin && !admin {
        return GuardOutcome::Redirect(HOME_PATH);
    }
    GuardOutcome::Render
}

/// Render only for anonymous users; authenticated users go home
pub fn redirect_if_authenticated(authenticated: bool) -> GuardOutcome {
    if authenticated {
        GuardOutcome::Redirect(HOME_PATH)
    } else {
        GuardOutcome::Render
    }
}

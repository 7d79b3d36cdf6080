//! Identity state machine and the view it selects.

use crate::models::{Identity, Role};

/// Who is using the client.
///
/// `Anonymous -> Authenticating -> Operator | Admin`; a failed sign-in
/// goes back to `Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticating {
        username: String,
    },
    Operator(Identity),
    Admin(Identity),
}

impl Session {
    /// Fork an authenticated identity by role.
    pub fn authenticated(identity: Identity) -> Self {
        match identity.role {
            Role::Operator => Session::Operator(identity),
            Role::SuperAdmin => Session::Admin(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Operator(me) | Session::Admin(me) => Some(me),
            _ => None,
        }
    }

    pub(crate) fn identity_mut(&mut self) -> Option<&mut Identity> {
        match self {
            Session::Operator(me) | Session::Admin(me) => Some(me),
            _ => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.identity().is_some()
    }

    pub fn is_authenticating(&self) -> bool {
        matches!(self, Session::Authenticating { .. })
    }
}

/// Which anonymous screen is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnonymousScreen {
    #[default]
    Client,
    Login,
}

/// Top-level view, dispatched by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Client,
    Login,
    Operator,
    Admin,
}

impl View {
    pub fn resolve(session: &Session, screen: AnonymousScreen) -> Self {
        match session {
            Session::Operator(_) => View::Operator,
            Session::Admin(_) => View::Admin,
            Session::Authenticating { .. } => View::Login,
            Session::Anonymous => match screen {
                AnonymousScreen::Client => View::Client,
                AnonymousScreen::Login => View::Login,
            },
        }
    }
}

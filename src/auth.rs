/// What the identity provider has told us about the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub loading: bool,
}

/// Decision for a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Still determining the session; render nothing yet.
    Pending,
    Allow,
    /// Not signed in; send the user to sign-in.
    Redirect,
}

impl SessionState {
    pub fn gate(self) -> Gate {
        match (self.loading, self.authenticated) {
            (true, _) => Gate::Pending,
            (false, true) => Gate::Allow,
            (false, false) => Gate::Redirect,
        }
    }
}

pub trait IdentityProvider {
    fn session(&self) -> SessionState;
}

/// Single-user local install: the person at the terminal owns the data.
pub struct LocalIdentity;

impl IdentityProvider for LocalIdentity {
    fn session(&self) -> SessionState {
        SessionState {
            authenticated: true,
            loading: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_wins_over_authentication() {
        for authenticated in [true, false] {
            let state = SessionState { authenticated, loading: true };
            assert_eq!(state.gate(), Gate::Pending);
        }
    }

    #[test]
    fn settled_sessions_allow_or_redirect() {
        assert_eq!(SessionState { authenticated: true, loading: false }.gate(), Gate::Allow);
        assert_eq!(SessionState { authenticated: false, loading: false }.gate(), Gate::Redirect);
    }

    #[test]
    fn local_identity_is_signed_in() {
        assert_eq!(LocalIdentity.session().gate(), Gate::Allow);
    }
}

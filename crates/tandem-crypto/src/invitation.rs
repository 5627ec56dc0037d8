//! Progress of a pairing handshake

/// Immutable snapshot of an invitation exchange.
///
/// Each handshake step produces a new snapshot from the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvitationState {
    local_invitation_code: u32,
    remote_invitation_code: u32,
    local_confirmation_code: u32,
    remote_confirmation_code: u32,
    connection_failed: bool,
    local_compared: bool,
    remote_compared: bool,
    local_matched: bool,
    remote_matched: bool,
}

impl InvitationState {
    /// Start from the two exchanged invitation codes.
    pub fn new(local_invitation_code: u32, remote_invitation_code: u32) -> Self {
        Self { local_invitation_code, remote_invitation_code, ..Self::default() }
    }

    /// Record the confirmation codes derived after key agreement.
    pub fn with_confirmation_codes(self, local: u32, remote: u32) -> Self {
        Self { local_confirmation_code: local, remote_confirmation_code: remote, ..self }
    }

    /// Record that the connection to the peer could not be made.
    pub fn with_connection_failed(self) -> Self {
        Self { connection_failed: true, ..self }
    }

    /// Record the local user's comparison of the remote code.
    pub fn with_local_comparison(self, matched: bool) -> Self {
        Self { local_compared: true, local_matched: matched, ..self }
    }

    /// Record the remote user's comparison of the local code.
    pub fn with_remote_comparison(self, matched: bool) -> Self {
        Self { remote_compared: true, remote_matched: matched, ..self }
    }

    /// Our invitation code
    pub fn local_invitation_code(&self) -> u32 {
        self.local_invitation_code
    }

    /// Peer's invitation code
    pub fn remote_invitation_code(&self) -> u32 {
        self.remote_invitation_code
    }

    /// Our confirmation code
    pub fn local_confirmation_code(&self) -> u32 {
        self.local_confirmation_code
    }

    /// Peer's confirmation code
    pub fn remote_confirmation_code(&self) -> u32 {
        self.remote_confirmation_code
    }

    /// Whether connecting to the peer failed
    pub fn connection_failed(&self) -> bool {
        self.connection_failed
    }

    /// Whether the local user has compared codes
    pub fn local_compared(&self) -> bool {
        self.local_compared
    }

    /// Whether the remote user has compared codes
    pub fn remote_compared(&self) -> bool {
        self.remote_compared
    }

    /// Whether the local user saw matching codes
    pub fn local_matched(&self) -> bool {
        self.local_matched
    }

    /// Whether the remote user saw matching codes
    pub fn remote_matched(&self) -> bool {
        self.remote_matched
    }

    /// Both users compared and both saw a match.
    pub fn is_confirmed(&self) -> bool {
        !self.connection_failed
            && self.local_compared
            && self.remote_compared
            && self.local_matched
            && self.remote_matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_only_after_both_matches() {
        let state = InvitationState::new(11, 22).with_confirmation_codes(33, 44);
        assert!(!state.is_confirmed());

        let state = state.with_local_comparison(true);
        assert!(!state.is_confirmed());

        let state = state.with_remote_comparison(true);
        assert!(state.is_confirmed());
        assert_eq!(state.local_invitation_code(), 11);
        assert_eq!(state.remote_confirmation_code(), 44);
    }

    #[test]
    fn mismatch_is_not_confirmed() {
        let state = InvitationState::new(1, 2)
            .with_local_comparison(true)
            .with_remote_comparison(false);

        assert!(state.remote_compared());
        assert!(!state.remote_matched());
        assert!(!state.is_confirmed());
    }

    #[test]
    fn connection_failure_is_not_confirmed() {
        let state = InvitationState::new(1, 2)
            .with_local_comparison(true)
            .with_remote_comparison(true)
            .with_connection_failed();

        assert!(state.connection_failed());
        assert!(!state.is_confirmed());
    }
}

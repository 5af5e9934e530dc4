use evently_core::{Role, Route};
use evently_store::Session;

/// Gate for role-only screens: the screen renders only when a token for
/// `role` is present, otherwise the caller is sent to that role's login.
pub fn require_role(session: &Session, role: Role) -> Result<(), Route> {
    if session.is_logged_in(role) {
        Ok(())
    } else {
        tracing::debug!(%role, "No session, redirecting to login");
        Err(role.login_route())
    }
}

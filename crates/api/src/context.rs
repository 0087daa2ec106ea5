use fintrack_auth::ResolvedIdentity;

/// Acting identity for a request, inserted by the auth middleware.
///
/// Guaranteed present on all protected routes; handlers never re-derive it
/// from cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity(pub ResolvedIdentity);

impl RequestIdentity {
    pub fn username(&self) -> &str {
        self.0.username()
    }

    pub fn identity(&self) -> &ResolvedIdentity {
        &self.0
    }
}

/// Caller identity and request metadata, threaded explicitly through every
/// workflow call. There are no ambient "current actor" lookups anywhere in
/// the crate: whoever invokes the workflow supplies this.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Authenticated actor id, if any. Audit events record attempts from
    /// unauthenticated callers too, so this stays optional.
    pub actor_id: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            ip: None,
            user_agent: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self.user_agent = Some(user_agent.into());
        self
    }
}

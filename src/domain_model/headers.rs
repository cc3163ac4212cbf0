pub const AUTHORIZATION: &str = "Authorization";
pub const ACCEPT_TOKEN: &str = "Accept-Token";
pub const REFRESH_TOKEN: &str = "Refresh-Token";
pub const REFRESH_EXPIRES: &str = "Refresh-Expires";
pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const ACCESS_CONTROL_EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";

/// Request headers a browser client is allowed to send.
pub const ALLOWED_REQUEST_HEADERS: &str = "Refresh-Token, Accept-Version, Authorization, \
Access-Token, Language, Access-Control-Allow-Methods, Access-Control-Allow-Origin, \
Cache-Control, Content-Type, if-match, if-modified-since, if-none-match, \
if-unmodified-since, X-Requested-With";

/// Response headers a browser client's script is allowed to read.
pub const EXPOSED_RESPONSE_HEADERS: &str =
    "Authorization, Access-Token, Refresh-Token, Refresh-Expires";

/// The headers the session layer reads from an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    pub authorization: Option<String>,
    pub accept_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    pub fn with_accept_token(mut self, value: impl Into<String>) -> Self {
        self.accept_token = Some(value.into());
        self
    }

    pub fn with_refresh_token(mut self, value: impl Into<String>) -> Self {
        self.refresh_token = Some(value.into());
        self
    }
}

/// Ordered header set to attach to the response. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(&'static str, String)>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

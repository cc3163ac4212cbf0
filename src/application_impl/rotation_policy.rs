use crate::domain_model::RotationTicket;
use std::time::Duration;

/// Directive values that switch rotation off. Compared case-insensitively.
pub const ROTATION_OPT_OUT: [&str; 3] = ["false", "0", "off"];

/// Rotation is on unless the client opts out through `Refresh-Token`.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    ttl: Duration,
}

impl RotationPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn is_requested(directive: Option<&str>) -> bool {
        match directive {
            Some(value) => !ROTATION_OPT_OUT
                .iter()
                .any(|off| off.eq_ignore_ascii_case(value)),
            None => true,
        }
    }

    pub fn decide(&self, directive: Option<&str>) -> Option<RotationTicket> {
        Self::is_requested(directive).then(|| RotationTicket::issue(self.ttl))
    }
}

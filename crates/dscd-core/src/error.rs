/// Why an enqueue was refused.
///
/// Both variants are silent to the sender by design (the networking fabric
/// above the scheduler owns retransmission policy, not this crate); the
/// caller is only expected to count the drop and free the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    /// `len(P) + CC_cq + abe_credit_bytes() + CC_be` would exceed `limit`.
    AdmissionExceeded,
    /// The service queue could not accept a new element.
    AllocFailed,
}

impl std::fmt::Display for EnqueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnqueueError::AdmissionExceeded => write!(f, "admission limit exceeded"),
            EnqueueError::AllocFailed => write!(f, "service queue allocation failed"),
        }
    }
}

impl std::error::Error for EnqueueError {}

/// Why a `change` request was rejected.
///
/// `change` never partially applies: on error, scheduler state is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeError {
    InvalidConfig(String),
}

impl std::fmt::Display for ChangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ChangeError {}

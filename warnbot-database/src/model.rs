/// Persisted warning counter for a single user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WarnRecord {
    /// Chat identifier of the warned user.
    pub jid: String,
    pub warn_count: u32,
}

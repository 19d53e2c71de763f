/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    /// Questions not yet moved past, including the current one.
    pub remaining: usize,
    pub is_complete: bool,
}

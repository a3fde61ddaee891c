use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The asset set was already on disk; nothing was touched.
    AlreadyPresent,
    /// The asset set was downloaded; lists the files written.
    Fetched { files: Vec<PathBuf> },
}

use std::fmt;

/// Classification of one expected file after merging expected, remote and local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileStatus {
    /// Slot lies in the future; nothing is due yet.
    Scheduled,
    /// Current UTC hour and already on the remote: still being written.
    New,
    MissingRemotely,
    MissingLocally,
    SizeMismatch,
    Ok,
}

/// The facts classification depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusInputs {
    pub future: bool,
    pub current: bool,
    pub remote_exists: bool,
    pub local_exists: bool,
    pub size_match: bool,
}

impl FileStatus {
    /// Total over all inputs; earlier rules win.
    pub fn classify(i: StatusInputs) -> FileStatus {
        if i.future {
            FileStatus::Scheduled
        } else if i.current && i.remote_exists {
            FileStatus::New
        } else if !i.remote_exists {
            FileStatus::MissingRemotely
        } else if !i.local_exists {
            FileStatus::MissingLocally
        } else if !i.size_match {
            FileStatus::SizeMismatch
        } else {
            FileStatus::Ok
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileStatus::Scheduled => "scheduled",
            FileStatus::New => "new",
            FileStatus::MissingRemotely => "missing remotely",
            FileStatus::MissingLocally => "missing locally",
            FileStatus::SizeMismatch => "size mismatch",
            FileStatus::Ok => "ok",
        }
    }

    /// Statuses a download can fix.
    pub fn is_fetchable(self) -> bool {
        matches!(self, FileStatus::MissingLocally | FileStatus::SizeMismatch)
    }

    /// Statuses counted as gaps in summaries.
    pub fn is_gap(self) -> bool {
        matches!(
            self,
            FileStatus::MissingLocally | FileStatus::MissingRemotely | FileStatus::SizeMismatch
        )
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

use std::path::PathBuf;
use std::time::Instant;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        }
    }
}

/// One observed change, as admitted into a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub timestamp: Instant,
}

impl FileChange {
    pub fn new(path: PathBuf, kind: ChangeKind) -> Self {
        Self {
            path,
            kind,
            timestamp: Instant::now(),
        }
    }
}

/// What a raw event says about the entry it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    File,
    Folder,
    /// The platform did not say; ask the filesystem if it matters.
    Unknown,
}

impl Entry {
    fn of(kind: &notify::EventKind) -> Self {
        use notify::EventKind;
        use notify::event::{CreateKind, ModifyKind, RemoveKind};

        match kind {
            EventKind::Create(CreateKind::File)
            | EventKind::Remove(RemoveKind::File)
            | EventKind::Modify(ModifyKind::Data(_)) => Self::File,
            EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => {
                Self::Folder
            }
            _ => Self::Unknown,
        }
    }
}

/// Map a raw notify event to logical changes.
///
/// A rename carrying both names becomes two `Renamed` changes so consumers
/// watching either name react. Metadata-only modifications are dropped.
pub(super) fn changes_from_event(event: &notify::Event) -> Vec<(PathBuf, ChangeKind, Entry)> {
    use notify::EventKind;
    use notify::event::ModifyKind;

    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Remove(_) => ChangeKind::Deleted,
        // mtime/atime/chmod noise
        EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Renamed,
        EventKind::Modify(_) => ChangeKind::Modified,
        _ => return Vec::new(),
    };
    let entry = Entry::of(&event.kind);

    event
        .paths
        .iter()
        .map(|path| (path.clone(), kind, entry))
        .collect()
}

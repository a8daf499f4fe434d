use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use super::classifier::{ChangeFilter, FileClass};
use super::debouncer::Debouncer;
use super::types::{ChangeKind, Entry, FileChange, changes_from_event};
use crate::config::{SessionConfig, test_session_config};
use crate::suppress::Suppressor;
use crate::utils::path::normalize_path;

const WINDOW: Duration = Duration::from_millis(500);

fn make_config(extra: &str) -> (TempDir, SessionConfig) {
    let temp = TempDir::new().unwrap();
    let root = normalize_path(temp.path());
    std::fs::create_dir_all(root.join("Content/GlobalContent")).unwrap();
    let config = test_session_config(&root, extra);
    (temp, config)
}

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn change(path: &str, kind: ChangeKind, at: Instant) -> FileChange {
    FileChange {
        path: PathBuf::from(path),
        kind,
        timestamp: at,
    }
}

// ============================================================================
// event mapping
// ============================================================================

#[test]
fn test_rename_expands_to_both_names() {
    let event = make_event(
        vec!["/game/Content/old.png", "/game/Content/new.png"],
        notify::EventKind::Modify(notify::event::ModifyKind::Name(
            notify::event::RenameMode::Both,
        )),
    );
    let changes = changes_from_event(&event);
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().all(|(_, kind, _)| *kind == ChangeKind::Renamed));
    assert_eq!(changes[0].0, PathBuf::from("/game/Content/old.png"));
    assert_eq!(changes[1].0, PathBuf::from("/game/Content/new.png"));
}

#[test]
fn test_metadata_and_access_dropped() {
    let metadata = make_event(
        vec!["/game/a.cs"],
        notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
            notify::event::MetadataKind::WriteTime,
        )),
    );
    let access = make_event(
        vec!["/game/a.cs"],
        notify::EventKind::Access(notify::event::AccessKind::Any),
    );
    assert!(changes_from_event(&metadata).is_empty());
    assert!(changes_from_event(&access).is_empty());
}

#[test]
fn test_event_kinds() {
    let create = make_event(
        vec!["/game/a.cs"],
        notify::EventKind::Create(notify::event::CreateKind::File),
    );
    let remove = make_event(
        vec!["/game/a.cs"],
        notify::EventKind::Remove(notify::event::RemoveKind::File),
    );
    assert_eq!(changes_from_event(&create)[0].1, ChangeKind::Created);
    assert_eq!(changes_from_event(&remove)[0].1, ChangeKind::Deleted);
    assert_eq!(
        changes_from_event(&make_event(vec!["/game/a.cs"], modify_kind()))[0].1,
        ChangeKind::Modified
    );
}

// ============================================================================
// debouncer
// ============================================================================

#[test]
fn test_debouncer_empty() {
    let mut debouncer = Debouncer::new(WINDOW);
    assert!(debouncer.is_empty());
    assert!(debouncer.try_flush().is_none());
}

#[test]
fn test_burst_collapses_to_one_change() {
    let mut debouncer = Debouncer::new(WINDOW);
    let start = Instant::now();

    for i in 0..10 {
        let at = start + Duration::from_millis(i * 40);
        debouncer.admit_at(change("/game/Screens/GameScreen.cs", ChangeKind::Modified, at), at);
    }

    let last = start + Duration::from_millis(360);
    assert!(debouncer.try_flush_at(last + Duration::from_millis(100)).is_none());

    let batch = debouncer.try_flush_at(last + WINDOW).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].path, PathBuf::from("/game/Screens/GameScreen.cs"));
    assert!(debouncer.is_empty());
}

#[test]
fn test_spaced_events_produce_separate_batches() {
    let mut debouncer = Debouncer::new(WINDOW);
    let start = Instant::now();
    let mut batches = 0;

    for i in 0..3 {
        let at = start + WINDOW * 2 * i;
        debouncer.admit_at(change("/game/Content/Items.csv", ChangeKind::Modified, at), at);
        if debouncer.try_flush_at(at + WINDOW).is_some() {
            batches += 1;
        }
    }

    assert_eq!(batches, 3);
}

#[test]
fn test_same_path_never_duplicated() {
    let mut debouncer = Debouncer::new(WINDOW);
    let now = Instant::now();

    assert!(debouncer.admit_at(change("/game/a.cs", ChangeKind::Created, now), now));
    assert!(!debouncer.admit_at(change("/game/a.cs", ChangeKind::Modified, now), now));
    assert!(!debouncer.admit_at(change("/game/a.cs", ChangeKind::Created, now), now));

    let batch = debouncer.try_flush_at(now + WINDOW).unwrap();
    assert_eq!(batch.len(), 1);
    // First event wins
    assert_eq!(batch[0].kind, ChangeKind::Created);
}

#[test]
fn test_duplicate_still_extends_window() {
    let mut debouncer = Debouncer::new(WINDOW);
    let start = Instant::now();
    let later = start + Duration::from_millis(400);

    debouncer.admit_at(change("/game/a.cs", ChangeKind::Modified, start), start);
    debouncer.admit_at(change("/game/a.cs", ChangeKind::Modified, later), later);

    assert!(debouncer.try_flush_at(start + WINDOW).is_none());
    assert!(debouncer.try_flush_at(later + WINDOW).is_some());
}

#[test]
fn test_both_sets_must_be_quiet() {
    let mut debouncer = Debouncer::new(WINDOW);
    let start = Instant::now();
    let later = start + Duration::from_millis(300);

    debouncer.admit_at(change("/game/a.cs", ChangeKind::Modified, start), start);
    debouncer.admit_at(change("/game/b.cs", ChangeKind::Deleted, later), later);

    // Modified set is quiet, deleted set is not
    assert!(!debouncer.can_flush(start + WINDOW));
    assert!(debouncer.can_flush(later + WINDOW));
}

#[test]
fn test_deletes_flush_first() {
    let mut debouncer = Debouncer::new(WINDOW);
    let now = Instant::now();

    debouncer.admit_at(change("/game/a.cs", ChangeKind::Created, now), now);
    debouncer.admit_at(change("/game/b.cs", ChangeKind::Deleted, now), now);
    debouncer.admit_at(change("/game/c.cs", ChangeKind::Modified, now), now);

    let batch = debouncer.try_flush_at(now + WINDOW).unwrap();
    let kinds: Vec<_> = batch.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![ChangeKind::Deleted, ChangeKind::Created, ChangeKind::Modified]
    );
}

#[test]
fn test_sleep_duration_capped() {
    let mut debouncer = Debouncer::new(Duration::from_secs(5));
    assert_eq!(debouncer.sleep_duration(), super::debouncer::TICK);

    debouncer.admit(PathBuf::from("/game/a.cs"), ChangeKind::Modified);
    assert!(debouncer.sleep_duration() <= super::debouncer::TICK);
}

// ============================================================================
// admission filter
// ============================================================================

#[test]
fn test_filter_excludes_generated_files() {
    let (_temp, config) = make_config("");
    let filter = ChangeFilter::new(&config, Arc::new(Suppressor::new()));
    let root = &config.watch.root;

    assert!(!filter.admits(&root.join("Screens/GameScreen.Generated.cs"), ChangeKind::Modified, Entry::Unknown));
    assert!(!filter.admits(&root.join("obj/Debug/Game.dll"), ChangeKind::Created, Entry::Unknown));
    assert!(!filter.admits(&root.join(".vs/Game/v17/.suo"), ChangeKind::Modified, Entry::Unknown));
    assert!(filter.admits(&root.join("Screens/GameScreen.cs"), ChangeKind::Modified, Entry::Unknown));
}

#[test]
fn test_filter_project_files_only_modified() {
    let (_temp, config) = make_config("");
    let filter = ChangeFilter::new(&config, Arc::new(Suppressor::new()));
    let screen = config.watch.root.join("Screens/GameScreen.glsj");

    assert!(!filter.admits(&screen, ChangeKind::Created, Entry::Unknown));
    assert!(!filter.admits(&screen, ChangeKind::Deleted, Entry::Unknown));
    assert!(!filter.admits(&screen, ChangeKind::Renamed, Entry::Unknown));
    assert!(filter.admits(&screen, ChangeKind::Modified, Entry::Unknown));
}

#[test]
fn test_filter_skips_directories() {
    let (_temp, config) = make_config("");
    let filter = ChangeFilter::new(&config, Arc::new(Suppressor::new()));
    let content = config.watch.root.join("Content");

    assert!(!filter.admits(&content, ChangeKind::Modified, Entry::Unknown));
    // A deleted directory no longer exists; it is admitted like a file
    assert!(filter.admits(&config.watch.root.join("Gone"), ChangeKind::Deleted, Entry::Unknown));
}

#[test]
fn test_filter_trusts_event_entry() {
    let (_temp, config) = make_config("");
    let filter = ChangeFilter::new(&config, Arc::new(Suppressor::new()));
    let root = &config.watch.root;

    // Not on disk, yet known to be a folder
    assert!(!filter.admits(&root.join("Content/Levels"), ChangeKind::Created, Entry::Folder));
    assert!(!filter.admits(&root.join("Content/Levels"), ChangeKind::Deleted, Entry::Folder));
    // The filesystem is not asked when the event names a file
    assert!(filter.admits(&root.join("Content"), ChangeKind::Modified, Entry::File));
}

#[test]
fn test_event_entry_hints() {
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind, RenameMode};

    let entry = |kind| changes_from_event(&make_event(vec!["/game/Content/Levels"], kind))[0].2;
    assert_eq!(entry(notify::EventKind::Create(CreateKind::Folder)), Entry::Folder);
    assert_eq!(entry(notify::EventKind::Remove(RemoveKind::Folder)), Entry::Folder);
    assert_eq!(entry(notify::EventKind::Create(CreateKind::File)), Entry::File);
    assert_eq!(
        entry(notify::EventKind::Modify(ModifyKind::Data(DataChange::Content))),
        Entry::File
    );
    assert_eq!(
        entry(notify::EventKind::Modify(ModifyKind::Name(RenameMode::To))),
        Entry::Unknown
    );
    assert_eq!(entry(notify::EventKind::Remove(RemoveKind::Any)), Entry::Unknown);
}

#[test]
fn test_filter_consults_suppressor() {
    let (_temp, config) = make_config("");
    let suppressor = Arc::new(Suppressor::new());
    let filter = ChangeFilter::new(&config, Arc::clone(&suppressor));
    let path = config.watch.root.join("Screens/GameScreen.glsj");

    suppressor.register_ignore(&path, 1);
    assert!(!filter.admits(&path, ChangeKind::Modified, Entry::Unknown));
    assert!(filter.admits(&path, ChangeKind::Modified, Entry::Unknown));
}

// ============================================================================
// classification
// ============================================================================

#[test]
fn test_classify_files() {
    let (_temp, config) = make_config("[watch]\nlocalization_files = [\"Strings.csv\"]");
    let root = &config.watch.root;
    let class = |rel: &str| FileClass::of(&root.join(rel), &config);

    assert_eq!(class("Screens/GameScreen.cs"), FileClass::Code);
    assert_eq!(class("Screens/GameScreen.Generated.cs"), FileClass::Ignored);
    assert_eq!(class("Content/Entities.Generated.xml"), FileClass::Ignored);
    assert_eq!(class("CompilerSettings.json"), FileClass::Ignored);
    assert_eq!(class("Makefile"), FileClass::Ignored);
    assert_eq!(class("Entities/Player.glej"), FileClass::Project);
    assert_eq!(class("README.md"), FileClass::Other);
    assert_eq!(
        class("Content/Screens/GameScreen/Level1.tmx"),
        FileClass::Content {
            global: false,
            reloadable: false,
            localization: false
        }
    );
    assert_eq!(
        class("Content/GlobalContent/Strings.csv"),
        FileClass::Content {
            global: true,
            reloadable: true,
            localization: true
        }
    );
}

#[test]
fn test_classify_config_file() {
    let (_temp, config) = make_config("");
    assert_eq!(FileClass::of(&config.config_path, &config), FileClass::Config);
}

// ============================================================================
// actor
// ============================================================================

#[tokio::test]
async fn test_actor_sends_debounced_batch() {
    use super::FsActor;
    use crate::actor::messages::SyncMsg;

    let (_temp, config) = make_config("");
    let root = config.watch.root.clone();
    let filter = ChangeFilter::new(&config, Arc::new(Suppressor::new()));
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);

    let actor = FsActor::new(vec![root.clone()], filter, Duration::from_millis(100), tx).unwrap();
    let handle = tokio::spawn(actor.run());

    let file = root.join("Content/Items.csv");
    for i in 0..5 {
        std::fs::write(&file, format!("Name,Value\nSword,{i}\n")).unwrap();
    }

    let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    let SyncMsg::Files(batch) = msg else {
        panic!("expected a file batch");
    };
    assert_eq!(batch.iter().filter(|c| c.path == file).count(), 1);

    handle.abort();
}

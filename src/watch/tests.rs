use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use super::debouncer::Debouncer;
use super::native::{Target, classify};
use super::{
    ManualWatchService, NotifyWatchService, Subscription, WatchControl, WatchEvent, WatchHandle,
    WatchService,
};

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

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn rename_kind(mode: notify::event::RenameMode) -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Name(mode))
}

fn counting_callback(
    counter: &Arc<AtomicUsize>,
    verdict: WatchControl,
) -> super::WatchCallback {
    let counter = Arc::clone(counter);
    Box::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        verdict
    })
}

// ----------------------------------------------------------------------------
// classify
// ----------------------------------------------------------------------------

#[test]
fn test_classify_by_kind() {
    let target = Target::new(Path::new("/tmp/out/doc.pdf"));

    assert_eq!(
        classify(&make_event(vec!["/tmp/out/doc.pdf"], create_kind()), &target),
        Some(WatchEvent::ContentChanged)
    );
    assert_eq!(
        classify(&make_event(vec!["/tmp/out/doc.pdf"], modify_kind()), &target),
        Some(WatchEvent::ContentChanged)
    );
    assert_eq!(
        classify(&make_event(vec!["/tmp/out/doc.pdf"], remove_kind()), &target),
        Some(WatchEvent::PathInvalidated)
    );
}

#[test]
fn test_classify_ignores_other_files() {
    let target = Target::new(Path::new("/tmp/out/doc.pdf"));
    assert_eq!(
        classify(&make_event(vec!["/tmp/out/doc.aux"], modify_kind()), &target),
        None
    );
}

#[test]
fn test_classify_ignores_metadata() {
    let target = Target::new(Path::new("/tmp/out/doc.pdf"));
    let kind = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ));
    assert_eq!(classify(&make_event(vec!["/tmp/out/doc.pdf"], kind), &target), None);
}

#[test]
fn test_classify_renames() {
    use notify::event::RenameMode;

    let target = Target::new(Path::new("/tmp/out/doc.pdf"));

    // Renamed away
    assert_eq!(
        classify(
            &make_event(vec!["/tmp/out/doc.pdf"], rename_kind(RenameMode::From)),
            &target
        ),
        Some(WatchEvent::PathInvalidated)
    );
    // Atomic replace: temp file renamed onto the target
    assert_eq!(
        classify(
            &make_event(vec!["/tmp/out/doc.pdf"], rename_kind(RenameMode::To)),
            &target
        ),
        Some(WatchEvent::ContentChanged)
    );
    assert_eq!(
        classify(
            &make_event(
                vec!["/tmp/out/.doc.pdf.tmp", "/tmp/out/doc.pdf"],
                rename_kind(RenameMode::Both)
            ),
            &target
        ),
        Some(WatchEvent::ContentChanged)
    );
    assert_eq!(
        classify(
            &make_event(
                vec!["/tmp/out/doc.pdf", "/tmp/out/old.pdf"],
                rename_kind(RenameMode::Both)
            ),
            &target
        ),
        Some(WatchEvent::PathInvalidated)
    );
}

#[test]
fn test_classify_unpaired_rename_checks_filesystem() {
    use notify::event::RenameMode;

    let temp = TempDir::new().unwrap();
    let pdf = temp.path().join("doc.pdf");
    let target = Target::new(&pdf);
    let path = pdf.to_str().unwrap();

    // `mv doc.tmp doc.pdf` as FSEvents reports it: one event per side,
    // neither marked as source or destination.
    std::fs::write(&pdf, b"%PDF-1.5").unwrap();
    for mode in [RenameMode::Any, RenameMode::Other] {
        assert_eq!(
            classify(&make_event(vec![path], rename_kind(mode)), &target),
            Some(WatchEvent::ContentChanged)
        );
    }

    // `mv doc.pdf old.pdf`
    std::fs::remove_file(&pdf).unwrap();
    for mode in [RenameMode::Any, RenameMode::Other] {
        assert_eq!(
            classify(&make_event(vec![path], rename_kind(mode)), &target),
            Some(WatchEvent::PathInvalidated)
        );
    }
}

// ----------------------------------------------------------------------------
// Debouncer
// ----------------------------------------------------------------------------

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new(Duration::from_millis(50));
    assert!(!debouncer.is_ready());
}

#[test]
fn test_debouncer_same_kind_coalesces() {
    let mut debouncer = Debouncer::new(Duration::ZERO);
    debouncer.add(WatchEvent::ContentChanged);
    debouncer.add(WatchEvent::ContentChanged);
    assert_eq!(debouncer.take_if_ready(), Some(WatchEvent::ContentChanged));
    assert_eq!(debouncer.take_if_ready(), None);
}

#[test]
fn test_debouncer_replace_in_place() {
    let mut debouncer = Debouncer::new(Duration::ZERO);
    debouncer.add(WatchEvent::PathInvalidated);
    debouncer.add(WatchEvent::ContentChanged);
    assert_eq!(debouncer.pending, Some(WatchEvent::ContentChanged));
}

#[test]
fn test_debouncer_change_then_remove() {
    let mut debouncer = Debouncer::new(Duration::ZERO);
    debouncer.add(WatchEvent::ContentChanged);
    debouncer.add(WatchEvent::PathInvalidated);
    assert_eq!(debouncer.take_if_ready(), Some(WatchEvent::PathInvalidated));
}

#[test]
fn test_debouncer_waits_for_quiet_period() {
    let mut debouncer = Debouncer::new(Duration::from_secs(60));
    debouncer.add(WatchEvent::ContentChanged);
    assert!(!debouncer.is_ready());
    assert_eq!(debouncer.take_if_ready(), None);
    assert!(debouncer.sleep_duration() <= Duration::from_secs(60));
    assert!(debouncer.sleep_duration() >= Duration::from_millis(1));
}

// ----------------------------------------------------------------------------
// Subscription
// ----------------------------------------------------------------------------

#[test]
fn test_subscription_stop_closes() {
    let counter = Arc::new(AtomicUsize::new(0));
    let sub = Subscription::new(counting_callback(&counter, WatchControl::Stop));

    assert!(sub.deliver(WatchEvent::PathInvalidated));
    assert!(!sub.is_active());
    assert!(!sub.deliver(WatchEvent::ContentChanged));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_subscription_cancel() {
    let counter = Arc::new(AtomicUsize::new(0));
    let sub = Subscription::new(counting_callback(&counter, WatchControl::Continue));
    sub.cancel();
    assert!(!sub.deliver(WatchEvent::ContentChanged));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

// ----------------------------------------------------------------------------
// ManualWatchService
// ----------------------------------------------------------------------------

#[test]
fn test_manual_emit_and_close() {
    let service = ManualWatchService::new();
    let path = Path::new("/tmp/doc.pdf");
    let counter = Arc::new(AtomicUsize::new(0));

    let mut handle = service
        .watch(path, counting_callback(&counter, WatchControl::Continue))
        .unwrap();
    assert_eq!(handle.path(), path);
    assert_eq!(service.watch_count(path), 1);

    assert_eq!(service.emit(path, WatchEvent::ContentChanged), 1);
    assert_eq!(service.emit(Path::new("/tmp/other.pdf"), WatchEvent::ContentChanged), 0);

    handle.close();
    assert!(!handle.is_active());
    assert_eq!(service.emit(path, WatchEvent::ContentChanged), 0);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_manual_drop_closes() {
    let service = ManualWatchService::new();
    let path = Path::new("/tmp/doc.pdf");
    let counter = Arc::new(AtomicUsize::new(0));

    let handle = service
        .watch(path, counting_callback(&counter, WatchControl::Continue))
        .unwrap();
    drop(handle);
    assert_eq!(service.watch_count(path), 0);
}

#[test]
fn test_manual_registry_shrinks_on_close() {
    let service = ManualWatchService::new();
    for i in 0..1000 {
        let path = PathBuf::from(format!("/tmp/doc-{i}.pdf"));
        let mut handle = service
            .watch(&path, Box::new(|_| WatchControl::Continue))
            .unwrap();
        handle.close();
    }
    assert_eq!(service.path_count(), 0);

    // Stopped by its callback, released when the handle goes.
    let path = Path::new("/tmp/doc.pdf");
    let keep = service
        .watch(path, Box::new(|_| WatchControl::Continue))
        .unwrap();
    let stopped = service
        .watch(path, Box::new(|_| WatchControl::Stop))
        .unwrap();
    assert_eq!(service.emit(path, WatchEvent::ContentChanged), 2);
    assert_eq!(service.watch_count(path), 1);
    drop(stopped);
    assert_eq!(service.path_count(), 1);
    drop(keep);
    assert_eq!(service.path_count(), 0);
}

// ----------------------------------------------------------------------------
// NotifyWatchService (real filesystem)
// ----------------------------------------------------------------------------

fn wait_for(counter: &AtomicUsize, at_least: usize) -> bool {
    for _ in 0..100 {
        if counter.load(Ordering::SeqCst) >= at_least {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    false
}

#[test]
fn test_notify_sees_creation() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("doc.pdf");
    let counter = Arc::new(AtomicUsize::new(0));

    let service = NotifyWatchService::new(Duration::from_millis(20));
    let handle = service
        .watch(&path, counting_callback(&counter, WatchControl::Continue))
        .unwrap();
    assert!(handle.is_active());

    std::fs::write(&path, b"%PDF-1.5").unwrap();
    assert!(wait_for(&counter, 1), "no event for created file");
}

#[test]
fn test_notify_ignores_siblings() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("doc.pdf");
    let counter = Arc::new(AtomicUsize::new(0));

    let service = NotifyWatchService::new(Duration::from_millis(20));
    let _handle = service
        .watch(&path, counting_callback(&counter, WatchControl::Continue))
        .unwrap();

    std::fs::write(temp.path().join("doc.log"), b"log").unwrap();
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_notify_closed_handle_is_silent() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("doc.pdf");
    let counter = Arc::new(AtomicUsize::new(0));

    let service = NotifyWatchService::new(Duration::from_millis(20));
    let mut handle = service
        .watch(&path, counting_callback(&counter, WatchControl::Continue))
        .unwrap();
    handle.close();
    assert!(!handle.is_active());

    std::fs::write(&path, b"%PDF-1.5").unwrap();
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_notify_missing_directory() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing").join("doc.pdf");
    let service = NotifyWatchService::default();
    let result = service.watch(&path, Box::new(|_| WatchControl::Continue));
    assert!(result.is_err());
}

#[test]
fn test_notify_stop_releases_watcher() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("doc.pdf");
    let counter = Arc::new(AtomicUsize::new(0));

    let service = NotifyWatchService::new(Duration::from_millis(20));
    let handle = service
        .start(&path, counting_callback(&counter, WatchControl::Stop))
        .unwrap();
    assert!(handle.holds_watcher());

    std::fs::write(&path, b"%PDF-1.5").unwrap();
    assert!(wait_for(&counter, 1), "no event for created file");

    let mut released = false;
    for _ in 0..100 {
        if !handle.holds_watcher() {
            released = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(released, "watcher kept after the callback stopped");
    assert!(!handle.is_active());
}

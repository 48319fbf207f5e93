use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::models::resume::{most_recent, unique_resume_id, Resume, ResumeSummary, SaveStatus};
use crate::models::resume_data::{default_data, merge_defaults};
use crate::storage::{ResumeRepository, StorageError};
use crate::store::timer::CancellableTimer;

pub const DEFAULT_RESUME_NAME: &str = "Untitled Resume";
/// Name used when a resume is created implicitly by the first edit.
pub const FIRST_EDIT_RESUME_NAME: &str = "My Resume";
pub const COPY_SUFFIX: &str = " (Copy)";

/// Receives resume data the store loads on the editor's behalf.
pub trait DataSink: Send + Sync {
    fn apply(&self, data: Value);
}

impl<F> DataSink for F
where
    F: Fn(Value) + Send + Sync,
{
    fn apply(&self, data: Value) {
        self(data)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoreTimings {
    /// Quiet period after the last edit before an auto-save commits.
    pub autosave_delay: Duration,
    /// How long `Saved` is shown before reverting to `Idle`.
    pub saved_display: Duration,
}

impl Default for StoreTimings {
    fn default() -> Self {
        Self {
            autosave_delay: Duration::from_millis(1500),
            saved_display: Duration::from_millis(2000),
        }
    }
}

struct PendingSave {
    generation: u64,
    target: String,
    data: Value,
}

#[derive(Default)]
struct Session {
    active_id: Option<String>,
    status: SaveStatus,
    generation: u64,
    pending: Option<PendingSave>,
    autosave_timer: CancellableTimer,
    status_timer: CancellableTimer,
}

struct Inner {
    repo: Arc<dyn ResumeRepository>,
    sink: Option<Arc<dyn DataSink>>,
    timings: StoreTimings,
    session: Mutex<Session>,
    /// Serializes read-modify-write cycles on the collection within this process.
    write_lock: Mutex<()>,
    /// Held across the check and the create in `ensure_active`.
    ensure_lock: Mutex<()>,
}

/// Session-scoped manager of the persisted resume collection.
///
/// Tracks the active resume, persists edits with a trailing-edge debounce and
/// exposes CRUD over the collection. Every command reads the collection fresh
/// and writes it back whole; ids that do not exist are silently ignored.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct ResumeStore {
    inner: Arc<Inner>,
}

impl ResumeStore {
    /// `sink` receives data loaded into the editor. Without one the store runs
    /// read-only with respect to live edits: `auto_save` does nothing.
    pub fn new(
        repo: Arc<dyn ResumeRepository>,
        sink: Option<Arc<dyn DataSink>>,
        timings: StoreTimings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                repo,
                sink,
                timings,
                session: Mutex::new(Session::default()),
                write_lock: Mutex::new(()),
                ensure_lock: Mutex::new(()),
            }),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn resumes(&self) -> Vec<Resume> {
        self.inner.repo.read_all()
    }

    pub fn summaries(&self) -> Vec<ResumeSummary> {
        self.resumes().iter().map(Resume::summary).collect()
    }

    pub fn get(&self, id: &str) -> Option<Resume> {
        self.resumes().into_iter().find(|r| r.id == id)
    }

    pub fn active_id(&self) -> Option<String> {
        self.session().active_id.clone()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.session().status
    }

    #[cfg(test)]
    pub fn has_pending_save(&self) -> bool {
        self.session().pending.is_some()
    }

    // ── Bootstrap ───────────────────────────────────────────────────────────

    /// Restores the active resume for a new session and hands its data to the sink.
    ///
    /// Prefers the persisted pointer; falls back to the most recently updated
    /// resume and persists that choice. Returns the resulting active id.
    pub fn bootstrap(&self) -> Result<Option<String>, StorageError> {
        let resumes = self.inner.repo.read_all();

        if let Some(saved_id) = self.inner.repo.active_id() {
            if let Some(found) = resumes.iter().find(|r| r.id == saved_id) {
                info!("Restoring active resume {}", found.id);
                self.set_active(Some(found.id.clone()));
                self.hand_off(found.data.clone());
                return Ok(Some(found.id.clone()));
            }
            debug!("Persisted active resume {saved_id} no longer exists");
        }

        match most_recent(&resumes) {
            Some(latest) => {
                info!("Activating most recently updated resume {}", latest.id);
                self.set_active(Some(latest.id.clone()));
                self.hand_off(latest.data.clone());
                self.inner.repo.set_active_id(Some(&latest.id))?;
                Ok(Some(latest.id.clone()))
            }
            None => {
                debug!("No stored resumes, nothing to restore");
                Ok(None)
            }
        }
    }

    // ── Commands ────────────────────────────────────────────────────────────

    /// Creates a blank resume at the front of the collection and activates it.
    /// A missing or blank name falls back to "Untitled Resume".
    pub fn create(&self, name: Option<&str>) -> Result<String, StorageError> {
        self.flush()?;

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_RESUME_NAME)
            .to_string();

        let id = self
            .mutate(|resumes| {
                let id = unique_resume_id(resumes);
                resumes.insert(0, Resume::with_id(id.clone(), name, default_data()));
                Some(id)
            })?
            .unwrap_or_default();

        info!("Created resume {id}");
        self.activate(&id, default_data())?;
        Ok(id)
    }

    /// Makes `id` the active resume and hands its data to the sink.
    pub fn load(&self, id: &str) -> Result<(), StorageError> {
        self.flush()?;

        let Some(found) = self.get(id) else {
            debug!("Load of unknown resume {id} ignored");
            return Ok(());
        };
        info!("Loaded resume {id}");
        self.activate(&found.id, found.data)
    }

    /// Replaces the data of `id` (or of the active resume) immediately.
    ///
    /// A pending auto-save for the same resume is dropped, and saving the
    /// active resume also replaces the editor's live data.
    pub fn save(&self, data: Value, id: Option<&str>) -> Result<(), StorageError> {
        let target = match id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => match self.active_id() {
                Some(active) => active,
                None => {
                    debug!("Save with no target resume ignored");
                    return Ok(());
                }
            },
        };

        let live = {
            let mut session = self.session();
            if session.pending.as_ref().is_some_and(|p| p.target == target) {
                session.autosave_timer.cancel();
                session.pending = None;
                debug!("Pending auto-save of resume {target} superseded by a save");
            }
            (session.active_id.as_deref() == Some(target.as_str())).then(|| data.clone())
        };

        if self.write_data(&target, data)? {
            if let Some(live) = live {
                self.hand_off(live);
            }
            self.mark_saved();
        }
        Ok(())
    }

    /// Debounced save of the live editor data into the active resume.
    ///
    /// Each call restarts the quiet period; only the last payload of a burst is
    /// written. The target is the resume active at call time.
    pub fn auto_save(&self, data: Value) {
        if self.inner.sink.is_none() {
            return;
        }

        let mut session = self.session();
        let Some(target) = session.active_id.clone() else {
            debug!("Auto-save skipped, no active resume");
            return;
        };

        session.generation += 1;
        let generation = session.generation;
        session.pending = Some(PendingSave {
            generation,
            target,
            data,
        });
        session.status_timer.cancel();
        session.status = SaveStatus::Saving;

        let store = Arc::downgrade(&self.inner);
        session
            .autosave_timer
            .schedule(self.inner.timings.autosave_delay, async move {
                commit_pending(store, generation);
            });
    }

    /// Commits a pending auto-save right away.
    pub fn flush(&self) -> Result<(), StorageError> {
        let pending = {
            let mut session = self.session();
            session.autosave_timer.cancel();
            session.pending.take()
        };
        match pending {
            Some(pending) => self.commit(pending),
            None => Ok(()),
        }
    }

    /// Renames `id`. Names are trimmed; blank names are ignored.
    pub fn rename(&self, id: &str, new_name: &str) -> Result<(), StorageError> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let renamed = self.mutate(|resumes| {
            let resume = resumes.iter_mut().find(|r| r.id == id)?;
            resume.name = trimmed.to_string();
            resume.touch();
            Some(())
        })?;
        if renamed.is_some() {
            info!("Renamed resume {id} to '{trimmed}'");
        }
        Ok(())
    }

    /// Copies `id` to a new resume at the front of the collection.
    /// The active resume does not change.
    pub fn duplicate(&self, id: &str) -> Result<Option<String>, StorageError> {
        let copy_id = self.mutate(|resumes| {
            let source = resumes.iter().find(|r| r.id == id)?;
            let copy = Resume::with_id(
                unique_resume_id(resumes),
                format!("{}{COPY_SUFFIX}", source.name),
                source.data.clone(),
            );
            let copy_id = copy.id.clone();
            resumes.insert(0, copy);
            Some(copy_id)
        })?;
        if let Some(copy_id) = &copy_id {
            info!("Duplicated resume {id} as {copy_id}");
        }
        Ok(copy_id)
    }

    /// Removes `id`. When it was active, the front-most remaining resume becomes
    /// active; with none left the editor is reset to the blank document.
    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let was_active = self.active_id().as_deref() == Some(id);
        if was_active {
            self.discard_pending();
        }

        let remaining = {
            let _guard = self.write_guard();
            let mut resumes = self.inner.repo.read_all();
            let before = resumes.len();
            resumes.retain(|r| r.id != id);
            if resumes.len() != before {
                self.inner.repo.write_all(&resumes)?;
                info!("Deleted resume {id}");
            }
            resumes
        };

        if !was_active {
            return Ok(());
        }

        match remaining.into_iter().next() {
            Some(next) => self.activate(&next.id, next.data),
            None => {
                info!("Last resume deleted, no active resume");
                self.set_active(None);
                self.hand_off(default_data());
                self.inner.repo.set_active_id(None)
            }
        }
    }

    /// Returns the active id, creating "My Resume" first if nothing is active.
    pub fn ensure_active(&self) -> Result<String, StorageError> {
        let _guard = self
            .inner
            .ensure_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match self.active_id() {
            Some(id) => Ok(id),
            None => self.create(Some(FIRST_EDIT_RESUME_NAME)),
        }
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn session(&self) -> MutexGuard<'_, Session> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the collection, apply `f`, and write it back if `f` returns `Some`.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Vec<Resume>) -> Option<R>,
    ) -> Result<Option<R>, StorageError> {
        let _guard = self.write_guard();
        let mut resumes = self.inner.repo.read_all();
        let Some(result) = f(&mut resumes) else {
            return Ok(None);
        };
        self.inner.repo.write_all(&resumes)?;
        Ok(Some(result))
    }

    /// Returns false when `target` no longer exists.
    fn write_data(&self, target: &str, data: Value) -> Result<bool, StorageError> {
        let written = self.mutate(|resumes| {
            let resume = resumes.iter_mut().find(|r| r.id == target)?;
            resume.data = data;
            resume.touch();
            Some(())
        })?;
        match written {
            Some(()) => {
                debug!("Saved data of resume {target}");
                Ok(true)
            }
            None => {
                debug!("Save target {target} not found, ignored");
                Ok(false)
            }
        }
    }

    fn commit(&self, pending: PendingSave) -> Result<(), StorageError> {
        match self.write_data(&pending.target, pending.data) {
            Ok(true) => {
                self.mark_saved();
                Ok(())
            }
            Ok(false) => {
                self.set_status(SaveStatus::Idle);
                Ok(())
            }
            Err(e) => {
                self.set_status(SaveStatus::Idle);
                Err(e)
            }
        }
    }

    fn discard_pending(&self) {
        let mut session = self.session();
        session.autosave_timer.cancel();
        if session.pending.take().is_some() {
            debug!("Discarded pending auto-save");
            session.status_timer.cancel();
            session.status = SaveStatus::Idle;
        }
    }

    fn activate(&self, id: &str, data: Value) -> Result<(), StorageError> {
        self.set_active(Some(id.to_string()));
        self.set_status(SaveStatus::Idle);
        self.hand_off(data);
        self.inner.repo.set_active_id(Some(id))
    }

    fn set_active(&self, id: Option<String>) {
        self.session().active_id = id;
    }

    fn hand_off(&self, data: Value) {
        if let Some(sink) = &self.inner.sink {
            sink.apply(merge_defaults(data));
        }
    }

    fn set_status(&self, status: SaveStatus) {
        let mut session = self.session();
        session.status_timer.cancel();
        session.status = status;
    }

    fn mark_saved(&self) {
        let mut session = self.session();
        session.status = SaveStatus::Saved;

        let store = Arc::downgrade(&self.inner);
        session
            .status_timer
            .schedule(self.inner.timings.saved_display, async move {
                if let Some(inner) = store.upgrade() {
                    let mut session = inner.session.lock().unwrap_or_else(PoisonError::into_inner);
                    if session.status == SaveStatus::Saved {
                        session.status = SaveStatus::Idle;
                    }
                }
            });
    }
}

/// Timer callback of `auto_save`. Only the generation that is still pending commits.
fn commit_pending(store: Weak<Inner>, generation: u64) {
    let Some(inner) = store.upgrade() else {
        return;
    };
    let store = ResumeStore { inner };

    let pending = {
        let mut session = store.session();
        match session.pending.take() {
            Some(pending) if pending.generation == generation => pending,
            other => {
                session.pending = other;
                return;
            }
        }
    };

    let target = pending.target.clone();
    if let Err(e) = store.commit(pending) {
        error!("Auto-save of resume {target} failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::RESUMES_KEY;
    use crate::storage::{KeyValueStore, KvResumeRepository, MemoryStore};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Repository wrapper that counts collection writes.
    struct CountingRepo {
        inner: KvResumeRepository<MemoryStore>,
        writes: AtomicUsize,
    }

    impl CountingRepo {
        fn new() -> Self {
            Self {
                inner: KvResumeRepository::new(MemoryStore::new()),
                writes: AtomicUsize::new(0),
            }
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl ResumeRepository for CountingRepo {
        fn read_all(&self) -> Vec<Resume> {
            self.inner.read_all()
        }
        fn write_all(&self, resumes: &[Resume]) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.write_all(resumes)
        }
        fn active_id(&self) -> Option<String> {
            self.inner.active_id()
        }
        fn set_active_id(&self, id: Option<&str>) -> Result<(), StorageError> {
            self.inner.set_active_id(id)
        }
    }

    /// Repository whose writes always fail.
    struct ReadOnlyRepo;

    impl ResumeRepository for ReadOnlyRepo {
        fn read_all(&self) -> Vec<Resume> {
            Vec::new()
        }
        fn write_all(&self, _: &[Resume]) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
        fn active_id(&self) -> Option<String> {
            None
        }
        fn set_active_id(&self, _: Option<&str>) -> Result<(), StorageError> {
            Ok(())
        }
    }

    struct Harness {
        store: ResumeStore,
        repo: Arc<CountingRepo>,
        live: Arc<Mutex<Value>>,
    }

    fn harness() -> Harness {
        harness_with(Arc::new(CountingRepo::new()))
    }

    fn harness_with(repo: Arc<CountingRepo>) -> Harness {
        let live = Arc::new(Mutex::new(Value::Null));
        let sink_live = live.clone();
        let sink: Arc<dyn DataSink> = Arc::new(move |data: Value| {
            *sink_live.lock().unwrap() = data;
        });
        let store = ResumeStore::new(repo.clone(), Some(sink), StoreTimings::default());
        Harness { store, repo, live }
    }

    impl Harness {
        fn live(&self) -> Value {
            self.live.lock().unwrap().clone()
        }
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        settle().await;
    }

    // ── Bootstrap ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_bootstrap_empty_collection_leaves_nothing_active() {
        let h = harness();
        assert_eq!(h.store.bootstrap().unwrap(), None);
        assert_eq!(h.store.active_id(), None);
        assert!(h.live().is_null());
    }

    #[tokio::test]
    async fn test_bootstrap_restores_persisted_pointer() {
        let repo = Arc::new(CountingRepo::new());
        let older = Resume::new("older", json!({"name": "Old"}));
        let mut newer = Resume::new("newer", json!({"name": "New"}));
        newer.updated_at = older.updated_at + chrono::Duration::seconds(60);
        repo.inner.write_all(&[newer.clone(), older.clone()]).unwrap();
        repo.inner.set_active_id(Some(&older.id)).unwrap();

        let h = harness_with(repo);
        assert_eq!(h.store.bootstrap().unwrap(), Some(older.id.clone()));
        assert_eq!(h.live()["name"], "Old");
    }

    #[tokio::test]
    async fn test_bootstrap_falls_back_to_most_recent_and_persists_it() {
        let repo = Arc::new(CountingRepo::new());
        let mut a = Resume::new("a", json!({"name": "A"}));
        let mut b = Resume::new("b", json!({"name": "B"}));
        a.updated_at = b.updated_at - chrono::Duration::seconds(60);
        b.updated_at = a.updated_at + chrono::Duration::seconds(120);
        repo.inner.write_all(&[a.clone(), b.clone()]).unwrap();
        repo.inner.set_active_id(Some("stale-id")).unwrap();

        let h = harness_with(repo.clone());
        assert_eq!(h.store.bootstrap().unwrap(), Some(b.id.clone()));
        assert_eq!(h.live()["name"], "B");
        assert_eq!(repo.active_id(), Some(b.id));
    }

    #[tokio::test]
    async fn test_bootstrap_merges_defaults_into_handed_data() {
        let repo = Arc::new(CountingRepo::new());
        let legacy = Resume::new("legacy", json!({"name": "Ann"}));
        repo.inner.write_all(&[legacy]).unwrap();

        let h = harness_with(repo.clone());
        h.store.bootstrap().unwrap();
        assert_eq!(h.live()["name"], "Ann");
        assert_eq!(h.live()["fontFamily"], "Georgia, serif");
        // Merged keys are not written back.
        assert!(repo.read_all()[0].data.get("fontFamily").is_none());
    }

    // ── Create / load ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_inserts_at_front_and_activates() {
        let h = harness();
        let first = h.store.create(None).unwrap();
        let second = h.store.create(Some("Backend CV")).unwrap();

        assert_ne!(first, second);
        let resumes = h.store.resumes();
        assert_eq!(resumes[0].id, second);
        assert_eq!(resumes[0].name, "Backend CV");
        assert_eq!(resumes[1].name, DEFAULT_RESUME_NAME);
        assert_eq!(h.store.active_id(), Some(second.clone()));
        assert_eq!(h.repo.active_id(), Some(second));
        assert_eq!(h.live(), default_data());
        assert_eq!(h.store.save_status(), SaveStatus::Idle);
    }

    #[tokio::test]
    async fn test_create_blank_name_uses_default() {
        let h = harness();
        h.store.create(Some("   ")).unwrap();
        assert_eq!(h.store.resumes()[0].name, DEFAULT_RESUME_NAME);
    }

    #[tokio::test]
    async fn test_load_sets_active_and_hands_data() {
        let h = harness();
        let a = h.store.create(Some("A")).unwrap();
        h.store.save(json!({"name": "Alice"}), Some(&a)).unwrap();
        let b = h.store.create(Some("B")).unwrap();
        assert_eq!(h.store.active_id(), Some(b));

        h.store.load(&a).unwrap();
        assert_eq!(h.store.active_id(), Some(a.clone()));
        assert_eq!(h.repo.active_id(), Some(a));
        assert_eq!(h.live()["name"], "Alice");
        assert_eq!(h.store.save_status(), SaveStatus::Idle);
    }

    #[tokio::test]
    async fn test_load_unknown_id_is_noop() {
        let h = harness();
        let a = h.store.create(None).unwrap();
        h.store.load("missing").unwrap();
        assert_eq!(h.store.active_id(), Some(a));
    }

    // ── Save ────────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_save_updates_data_and_status_reverts_to_idle() {
        let h = harness();
        let id = h.store.create(None).unwrap();
        let before = h.store.get(&id).unwrap().updated_at;

        h.store.save(json!({"name": "Bob"}), None).unwrap();
        let saved = h.store.get(&id).unwrap();
        assert_eq!(saved.data["name"], "Bob");
        assert!(saved.updated_at >= before);
        assert_eq!(h.store.save_status(), SaveStatus::Saved);

        advance(1999).await;
        assert_eq!(h.store.save_status(), SaveStatus::Saved);
        advance(2).await;
        assert_eq!(h.store.save_status(), SaveStatus::Idle);
    }

    #[tokio::test]
    async fn test_save_without_target_is_noop() {
        let h = harness();
        h.store.save(json!({"name": "x"}), None).unwrap();
        assert_eq!(h.repo.writes(), 0);
        assert_eq!(h.store.save_status(), SaveStatus::Idle);
    }

    #[tokio::test]
    async fn test_save_unknown_id_is_noop() {
        let h = harness();
        h.store.create(None).unwrap();
        let writes = h.repo.writes();
        h.store.save(json!({}), Some("missing")).unwrap();
        assert_eq!(h.repo.writes(), writes);
        assert_eq!(h.store.save_status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_supersedes_pending_autosave_of_same_resume() {
        let h = harness();
        let id = h.store.create(None).unwrap();

        h.store.auto_save(json!({"name": "typed"}));
        h.store.save(json!({"name": "saved"}), Some(&id)).unwrap();
        assert!(!h.store.has_pending_save());
        assert_eq!(h.live()["name"], "saved");
        let writes = h.repo.writes();

        advance(2000).await;
        assert_eq!(h.repo.writes(), writes);
        assert_eq!(h.store.get(&id).unwrap().data["name"], "saved");
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_of_other_resume_keeps_pending_autosave() {
        let h = harness();
        let other = h.store.create(Some("Other")).unwrap();
        let active = h.store.create(Some("Active")).unwrap();

        h.store.auto_save(json!({"name": "typed"}));
        h.store.save(json!({"name": "elsewhere"}), Some(&other)).unwrap();
        assert!(h.store.has_pending_save());
        assert_ne!(h.live()["name"], "elsewhere");

        advance(1600).await;
        assert_eq!(h.store.get(&active).unwrap().data["name"], "typed");
        assert_eq!(h.store.get(&other).unwrap().data["name"], "elsewhere");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let live: Arc<dyn DataSink> = Arc::new(|_: Value| {});
        let store = ResumeStore::new(Arc::new(ReadOnlyRepo), Some(live), StoreTimings::default());
        assert!(matches!(store.create(None), Err(StorageError::Io(_))));
    }

    // ── Auto-save ───────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_autosave_burst_commits_once_with_last_value() {
        let h = harness();
        let id = h.store.create(None).unwrap();
        let writes = h.repo.writes();

        for i in 0..5 {
            h.store.auto_save(json!({"summary": format!("draft {i}")}));
            assert_eq!(h.store.save_status(), SaveStatus::Saving);
            advance(1000).await;
        }
        assert_eq!(h.repo.writes(), writes);

        advance(600).await;
        assert_eq!(h.repo.writes(), writes + 1);
        assert_eq!(h.store.get(&id).unwrap().data["summary"], "draft 4");
        assert_eq!(h.store.save_status(), SaveStatus::Saved);

        advance(2001).await;
        assert_eq!(h.store.save_status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_waits_full_quiet_period() {
        let h = harness();
        h.store.create(None).unwrap();
        let writes = h.repo.writes();

        h.store.auto_save(json!({"name": "a"}));
        advance(1499).await;
        assert_eq!(h.repo.writes(), writes);
        advance(2).await;
        assert_eq!(h.repo.writes(), writes + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_without_active_resume_is_skipped() {
        let h = harness();
        h.store.auto_save(json!({"name": "a"}));
        assert_eq!(h.store.save_status(), SaveStatus::Idle);
        advance(5000).await;
        assert_eq!(h.repo.writes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_is_noop_without_sink() {
        let repo = Arc::new(CountingRepo::new());
        let store = ResumeStore::new(repo.clone(), None, StoreTimings::default());
        store.create(None).unwrap();
        let writes = repo.writes();

        store.auto_save(json!({"name": "a"}));
        advance(5000).await;
        assert_eq!(repo.writes(), writes);
        assert_eq!(store.save_status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_resume_flushes_pending_edit_to_its_origin() {
        let h = harness();
        let a = h.store.create(Some("A")).unwrap();
        let b = h.store.create(Some("B")).unwrap();
        h.store.load(&a).unwrap();

        h.store.auto_save(json!({"name": "edited A"}));
        h.store.load(&b).unwrap();
        assert!(!h.store.has_pending_save());
        assert_eq!(h.store.get(&a).unwrap().data["name"], "edited A");
        assert_ne!(h.store.get(&b).unwrap().data["name"], "edited A");

        let writes = h.repo.writes();
        advance(5000).await;
        assert_eq!(h.repo.writes(), writes);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_commits_immediately() {
        let h = harness();
        let id = h.store.create(None).unwrap();
        h.store.auto_save(json!({"name": "now"}));
        h.store.flush().unwrap();
        assert_eq!(h.store.get(&id).unwrap().data["name"], "now");
        assert_eq!(h.store.save_status(), SaveStatus::Saved);
    }

    // ── Rename / duplicate ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_rename_trims_name() {
        let h = harness();
        let id = h.store.create(None).unwrap();
        h.store.rename(&id, "  Data Engineer  ").unwrap();
        assert_eq!(h.store.get(&id).unwrap().name, "Data Engineer");
    }

    #[tokio::test]
    async fn test_rename_whitespace_keeps_original_name() {
        let h = harness();
        let id = h.store.create(Some("Original")).unwrap();
        let writes = h.repo.writes();
        h.store.rename(&id, " \t\n ").unwrap();
        assert_eq!(h.store.get(&id).unwrap().name, "Original");
        assert_eq!(h.repo.writes(), writes);
    }

    #[tokio::test]
    async fn test_rename_unknown_id_is_noop() {
        let h = harness();
        h.store.create(None).unwrap();
        let writes = h.repo.writes();
        h.store.rename("missing", "x").unwrap();
        assert_eq!(h.repo.writes(), writes);
    }

    #[tokio::test]
    async fn test_duplicate_deep_copies_data() {
        let h = harness();
        let id = h.store.create(Some("Base")).unwrap();
        h.store
            .save(json!({"skills": [{"title": "Tech", "skills": ["Rust"]}]}), Some(&id))
            .unwrap();

        let copy_id = h.store.duplicate(&id).unwrap().unwrap();
        assert_ne!(copy_id, id);

        let resumes = h.store.resumes();
        assert_eq!(resumes[0].id, copy_id);
        assert_eq!(resumes[0].name, "Base (Copy)");
        assert_eq!(resumes[0].data, resumes[1].data);
        // Duplicating does not change the active resume.
        assert_eq!(h.store.active_id(), Some(id.clone()));

        h.store
            .save(json!({"skills": [{"title": "Tech", "skills": ["Go"]}]}), Some(&copy_id))
            .unwrap();
        assert_eq!(h.store.get(&id).unwrap().data["skills"][0]["skills"][0], "Rust");
    }

    #[tokio::test]
    async fn test_duplicate_unknown_id_returns_none() {
        let h = harness();
        assert_eq!(h.store.duplicate("missing").unwrap(), None);
        assert_eq!(h.repo.writes(), 0);
    }

    // ── Delete ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_delete_active_activates_front_most_remaining() {
        let h = harness();
        let a = h.store.create(Some("A")).unwrap();
        h.store.save(json!({"name": "from A"}), Some(&a)).unwrap();
        let _b = h.store.create(Some("B")).unwrap();
        let c = h.store.create(Some("C")).unwrap();
        h.store.load(&a).unwrap();
        h.store.delete(&a).unwrap();

        let front = h.store.resumes()[0].id.clone();
        assert_eq!(front, c);
        assert_eq!(h.store.active_id(), Some(c.clone()));
        assert_eq!(h.repo.active_id(), Some(c));
        assert_ne!(h.live()["name"], "from A");
    }

    #[tokio::test]
    async fn test_delete_last_resume_clears_active_and_resets_editor() {
        let h = harness();
        let id = h.store.create(None).unwrap();
        h.store.save(json!({"name": "gone"}), None).unwrap();
        h.store.load(&id).unwrap();

        h.store.delete(&id).unwrap();
        assert!(h.store.resumes().is_empty());
        assert_eq!(h.store.active_id(), None);
        assert_eq!(h.repo.active_id(), None);
        assert_eq!(h.live(), default_data());
    }

    #[tokio::test]
    async fn test_delete_inactive_keeps_active() {
        let h = harness();
        let a = h.store.create(Some("A")).unwrap();
        let b = h.store.create(Some("B")).unwrap();
        h.store.delete(&a).unwrap();
        assert_eq!(h.store.active_id(), Some(b));
        assert_eq!(h.store.resumes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_active_discards_its_pending_autosave() {
        let h = harness();
        let a = h.store.create(Some("A")).unwrap();
        let b = h.store.create(Some("B")).unwrap();
        h.store.auto_save(json!({"name": "doomed"}));
        h.store.delete(&b).unwrap();

        assert!(!h.store.has_pending_save());
        advance(5000).await;
        assert_ne!(h.store.get(&a).unwrap().data["name"], "doomed");
        assert_eq!(h.store.save_status(), SaveStatus::Idle);
    }

    // ── Ensure active ───────────────────────────────────────────────────────

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ensure_active_creates_one_resume() {
        let h = harness();
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = h.store.clone();
                tokio::spawn(async move { store.ensure_active() })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(h.store.resumes().len(), 1);
        assert_eq!(h.store.active_id(), Some(ids[0].clone()));
    }

    // ── Storage tolerance ───────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_keeps_records_with_odd_fields() {
        let repo = Arc::new(CountingRepo::new());
        let raw = r#"[
            {"id":"keep1","name":"Mine","updatedAt":"2024-05-01T10:00:00.000Z","data":{"name":"Ann"}},
            {"id":"odd","name":null,"updatedAt":null,"data":{"name":"Bo"}}
        ]"#;
        repo.inner.kv().set(RESUMES_KEY, raw).unwrap();

        let h = harness_with(repo);
        assert_eq!(h.store.resumes().len(), 2);
        h.store.create(Some("New")).unwrap();

        let names: Vec<_> = h.store.resumes().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["New", "Mine", ""]);
        assert_eq!(h.store.get("keep1").unwrap().data["name"], "Ann");
        assert_eq!(h.store.get("odd").unwrap().data["name"], "Bo");
    }

    #[tokio::test]
    async fn test_ensure_active_creates_once() {
        let h = harness();
        let id = h.store.ensure_active().unwrap();
        assert_eq!(h.store.resumes()[0].name, FIRST_EDIT_RESUME_NAME);
        assert_eq!(h.store.ensure_active().unwrap(), id);
        assert_eq!(h.store.resumes().len(), 1);
    }
}

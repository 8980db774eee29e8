// SPDX-License-Identifier: Apache-2.0 OR MIT
// Context registry: process-global tags, per-thread scoped tags, and
// thread identity caching
//
// Global state is read under a shared lock on every record; writes are rare
// (operator actions). Per-thread state is single-owner with no
// synchronization at all.

use crate::config::{MAX_GLOBAL_TAGS, MAX_TAGS, THREAD_NAME_LEN};
use crate::record::{Record, Tag};
use std::cell::RefCell;
use std::sync::{Mutex, OnceLock, RwLock};

/// Fixed-capacity tag storage; the bounded analog of a growable vector for
/// both the global set and the per-thread stack.
pub(crate) struct TagVec<const N: usize> {
    tags: [Tag; N],
    len: usize,
}

impl<const N: usize> TagVec<N> {
    pub(crate) const fn new() -> Self {
        Self {
            tags: [Tag::empty(); N],
            len: 0,
        }
    }

    pub(crate) fn push(&mut self, tag: Tag) -> bool {
        if self.len < N {
            self.tags[self.len] = tag;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Remove index `i` by moving the last element into its place.
    pub(crate) fn swap_remove(&mut self, i: usize) {
        let last = self.len - 1;
        if i != last {
            self.tags[i] = self.tags[last];
        }
        self.len = last;
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags[..self.len].iter()
    }

    fn position_of_key(&self, key: &str) -> Option<usize> {
        self.tags[..self.len].iter().position(|t| t.key() == key)
    }

    fn rposition_of_key(&self, key: &str) -> Option<usize> {
        self.tags[..self.len].iter().rposition(|t| t.key() == key)
    }
}

static GLOBAL_TAGS: RwLock<TagVec<MAX_GLOBAL_TAGS>> = RwLock::new(TagVec::new());

struct ProcessMeta {
    name: String,
    version: String,
}

static PROCESS_META: Mutex<ProcessMeta> = Mutex::new(ProcessMeta {
    name: String::new(),
    version: String::new(),
});

struct ThreadState {
    tags: TagVec<MAX_TAGS>,
    name: [u8; THREAD_NAME_LEN],
    // 0 = not yet resolved through the OS
    thread_id: u32,
}

impl ThreadState {
    const fn new() -> Self {
        Self {
            tags: TagVec::new(),
            name: [0; THREAD_NAME_LEN],
            thread_id: 0,
        }
    }
}

thread_local! {
    static THREAD_STATE: RefCell<ThreadState> = const { RefCell::new(ThreadState::new()) };
}

/// Set or update a process-global tag (upsert, last-write-wins). Attached to
/// every record produced by any thread from this point on. An empty key is
/// ignored.
pub fn set_global_tag(key: &str, value: &str) {
    if key.is_empty() {
        return;
    }
    let tag = Tag::new(key, value);
    let mut tags = GLOBAL_TAGS.write().unwrap_or_else(|e| e.into_inner());
    match tags.position_of_key(tag.key()) {
        Some(i) => tags.tags[i] = tag,
        None => {
            tags.push(tag);
        }
    }
}

/// Remove a process-global tag (swap-with-last). No-op if absent.
pub fn remove_global_tag(key: &str) {
    if key.is_empty() {
        return;
    }
    // Compare against the stored (truncated) form of the key.
    let probe = Tag::new(key, "");
    let mut tags = GLOBAL_TAGS.write().unwrap_or_else(|e| e.into_inner());
    if let Some(i) = tags.position_of_key(probe.key()) {
        tags.swap_remove(i);
    }
}

/// Record the process name; surfaced to sinks and the setup layer.
pub fn set_process_name(name: &str) {
    let mut meta = PROCESS_META.lock().unwrap_or_else(|e| e.into_inner());
    meta.name = name.to_string();
}

pub fn process_name() -> String {
    PROCESS_META
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .name
        .clone()
}

pub fn set_app_version(version: &str) {
    let mut meta = PROCESS_META.lock().unwrap_or_else(|e| e.into_inner());
    meta.version = version.to_string();
}

pub fn app_version() -> String {
    PROCESS_META
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .version
        .clone()
}

/// Git commit the library was built from.
pub fn git_hash() -> &'static str {
    crate::config::GIT_HASH
}

/// Cargo profile the library was built with.
pub fn build_type() -> &'static str {
    crate::config::BUILD_TYPE
}

/// Name the calling thread; carried inline on every record it produces.
/// Truncated to the inline capacity.
pub fn set_thread_name(name: &str) {
    THREAD_STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.name = [0; THREAD_NAME_LEN];
        let bytes = name.as_bytes();
        let mut take = bytes.len().min(THREAD_NAME_LEN - 1);
        while take > 0 && !name.is_char_boundary(take) {
            take -= 1;
        }
        state.name[..take].copy_from_slice(&bytes[..take]);
    });
}

/// Calling thread's name, empty if never set.
pub fn thread_name() -> String {
    THREAD_STATE.with(|state| {
        let state = state.borrow();
        let end = state
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(THREAD_NAME_LEN);
        String::from_utf8_lossy(&state.name[..end]).into_owned()
    })
}

/// OS thread id of the calling thread, resolved once and cached.
pub fn thread_id() -> u32 {
    THREAD_STATE.with(|state| {
        let mut state = state.borrow_mut();
        if state.thread_id == 0 {
            state.thread_id = os_thread_id();
        }
        state.thread_id
    })
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn os_thread_id() -> u32 {
    // SAFETY: gettid has no preconditions.
    unsafe { libc::gettid() as u32 }
}

#[cfg(target_os = "macos")]
fn os_thread_id() -> u32 {
    let mut tid: u64 = 0;
    // SAFETY: null thread means "calling thread"; tid is a valid out-pointer.
    unsafe {
        libc::pthread_threadid_np(std::ptr::null_mut(), &mut tid);
    }
    tid as u32
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos")))]
fn os_thread_id() -> u32 {
    // Fall back to a hash of the language-level thread id.
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish() as u32
}

pub(crate) fn push_scoped_tag(key: &str, value: &str) {
    if key.is_empty() {
        return;
    }
    THREAD_STATE.with(|state| {
        state.borrow_mut().tags.push(Tag::new(key, value));
    });
}

pub(crate) fn pop_scoped_tag(key: &str) {
    THREAD_STATE.with(|state| {
        let mut state = state.borrow_mut();
        if let Some(i) = state.tags.rposition_of_key(key) {
            state.tags.swap_remove(i);
        }
    });
}

/// Copy the global tag set, then the calling thread's scoped stack, into the
/// record's inline tag array. Copying stops silently once the record is
/// full; later tag mutations never appear on an already-filled record.
pub(crate) fn fill_tags(record: &mut Record) {
    {
        let global = GLOBAL_TAGS.read().unwrap_or_else(|e| e.into_inner());
        for tag in global.iter() {
            if !record.push_tag(*tag) {
                return;
            }
        }
    }
    THREAD_STATE.with(|state| {
        let state = state.borrow();
        for tag in state.tags.iter() {
            if !record.push_tag(*tag) {
                break;
            }
        }
    });
}

/// Stamp process id, cached OS thread id, and thread name onto the record.
pub(crate) fn fill_thread_info(record: &mut Record) {
    static PROCESS_ID: OnceLock<u32> = OnceLock::new();
    record.process_id = *PROCESS_ID.get_or_init(std::process::id);
    THREAD_STATE.with(|state| {
        let mut state = state.borrow_mut();
        if state.thread_id == 0 {
            state.thread_id = os_thread_id();
        }
        record.thread_id = state.thread_id;
        record.set_thread_name(&state.name);
    });
}

/// RAII guard attaching a (key, value) tag to the current thread for the
/// guard's lifetime.
///
/// Dropping pops the topmost entry on this thread's stack whose key matches
/// (LIFO-by-key). Two live guards with the same key on one thread therefore
/// release in reverse acquisition order regardless of which guard drops
/// first; keep keys distinct within an active set if that matters.
pub struct ScopedTag {
    key: [u8; crate::config::MAX_TAG_KEY_LEN],
    // Per-thread stack: the guard must drop on the thread that created it.
    _not_send: std::marker::PhantomData<*const ()>,
}

impl ScopedTag {
    pub fn new(key: &str, value: &str) -> Self {
        push_scoped_tag(key, value);
        // Store the truncated form so Drop matches what was pushed.
        let stored = Tag::new(key, value);
        let mut key_buf = [0u8; crate::config::MAX_TAG_KEY_LEN];
        let bytes = stored.key().as_bytes();
        key_buf[..bytes.len()].copy_from_slice(bytes);
        Self {
            key: key_buf,
            _not_send: std::marker::PhantomData,
        }
    }

    fn key_str(&self) -> &str {
        let end = self
            .key
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.key.len());
        std::str::from_utf8(&self.key[..end]).unwrap_or("")
    }
}

impl Drop for ScopedTag {
    fn drop(&mut self) {
        pop_scoped_tag(self.key_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Global tag state is process-wide; serialize the tests that touch it.
    static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

    fn global_snapshot() -> Vec<(String, String)> {
        let mut record = Record::default();
        fill_tags(&mut record);
        record
            .tags()
            .iter()
            .map(|t| (t.key().to_string(), t.value().to_string()))
            .collect()
    }

    fn clear_globals() {
        loop {
            let key = {
                let tags = GLOBAL_TAGS.read().unwrap();
                let next = tags.iter().next().map(|tag| tag.key().to_string());
                match next {
                    Some(key) => key,
                    None => break,
                }
            };
            remove_global_tag(&key);
        }
    }

    #[test]
    fn test_global_tag_upsert() {
        let _guard = GLOBAL_LOCK.lock().unwrap();
        clear_globals();

        set_global_tag("env", "dev");
        set_global_tag("node", "arm-0");
        set_global_tag("env", "prod");

        let tags = global_snapshot();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&("env".to_string(), "prod".to_string())));
        assert!(tags.contains(&("node".to_string(), "arm-0".to_string())));

        clear_globals();
    }

    #[test]
    fn test_global_tag_remove() {
        let _guard = GLOBAL_LOCK.lock().unwrap();
        clear_globals();

        set_global_tag("a", "1");
        set_global_tag("b", "2");
        remove_global_tag("a");
        remove_global_tag("missing");

        let tags = global_snapshot();
        assert_eq!(tags, vec![("b".to_string(), "2".to_string())]);

        clear_globals();
    }

    #[test]
    fn test_scoped_tag_raii() {
        let _guard = GLOBAL_LOCK.lock().unwrap();
        clear_globals();

        {
            let _tag = ScopedTag::new("req", "456");
            let tags = global_snapshot();
            assert_eq!(tags, vec![("req".to_string(), "456".to_string())]);
        }
        assert!(global_snapshot().is_empty());
    }

    #[test]
    fn test_scoped_tags_nest() {
        let _guard = GLOBAL_LOCK.lock().unwrap();
        clear_globals();

        let outer = ScopedTag::new("outer", "1");
        {
            let _inner = ScopedTag::new("inner", "2");
            assert_eq!(global_snapshot().len(), 2);
        }
        assert_eq!(
            global_snapshot(),
            vec![("outer".to_string(), "1".to_string())]
        );
        drop(outer);
        assert!(global_snapshot().is_empty());
    }

    #[test]
    fn test_fill_order_global_first() {
        let _guard = GLOBAL_LOCK.lock().unwrap();
        clear_globals();

        set_global_tag("g", "1");
        let _scoped = ScopedTag::new("s", "2");

        let tags = global_snapshot();
        assert_eq!(tags[0].0, "g");
        assert_eq!(tags[1].0, "s");

        clear_globals();
    }

    #[test]
    fn test_snapshot_isolation() {
        let _guard = GLOBAL_LOCK.lock().unwrap();
        clear_globals();

        set_global_tag("env", "dev");
        let mut record = Record::default();
        fill_tags(&mut record);

        // Later mutations must not show up on the already-filled record.
        set_global_tag("env", "prod");
        set_global_tag("late", "x");
        assert_eq!(record.tags().len(), 1);
        assert_eq!(record.tags()[0].value(), "dev");

        clear_globals();
    }

    #[test]
    fn test_scoped_stack_bounded() {
        let _guard = GLOBAL_LOCK.lock().unwrap();
        clear_globals();

        let mut guards = Vec::new();
        for i in 0..MAX_TAGS + 3 {
            guards.push(ScopedTag::new(&format!("k{i}"), "v"));
        }
        assert_eq!(global_snapshot().len(), MAX_TAGS);
        drop(guards);
        assert!(global_snapshot().is_empty());
    }

    #[test]
    fn test_thread_identity() {
        let id = thread_id();
        assert_ne!(id, 0);
        assert_eq!(id, thread_id());

        set_thread_name("worker-7");
        assert_eq!(thread_name(), "worker-7");

        let mut record = Record::default();
        fill_thread_info(&mut record);
        assert_eq!(record.thread_id, id);
        assert_eq!(record.thread_name(), "worker-7");
        assert_eq!(record.process_id, std::process::id());
    }

    #[test]
    fn test_scoped_tags_are_per_thread() {
        let _guard = GLOBAL_LOCK.lock().unwrap();
        clear_globals();

        let _tag = ScopedTag::new("main-only", "1");
        let other = std::thread::spawn(|| {
            let mut record = Record::default();
            fill_tags(&mut record);
            record.tag_count
        })
        .join()
        .unwrap();
        assert_eq!(other, 0);
        assert_eq!(global_snapshot().len(), 1);
    }

    #[test]
    fn test_process_metadata() {
        set_process_name("sensor-node");
        set_app_version("1.4.2");
        assert_eq!(process_name(), "sensor-node");
        assert_eq!(app_version(), "1.4.2");
        assert!(!git_hash().is_empty());
        assert!(!build_type().is_empty());
    }
}

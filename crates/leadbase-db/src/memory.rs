//! In-memory store for tests
//!
//! Implements [`ActivityLogStore`] and [`WorkspaceDirectory`] over plain
//! vectors, reading time from a shared [`Clock`]. Failures can be injected
//! per trait and every store call is counted, so callers can assert that a
//! denied request never reached the store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadbase_types::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogId, ActivityType, ActivityTypeCount, Clock,
    MemberActivityCount, NewActivityLog, SystemClock, UserId, WorkspaceId,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{DbError, DbResult};
use crate::models::{WorkspaceMembership, MEMBER_STATUS_ACCEPTED};
use crate::store::{ActivityLogStore, WorkspaceDirectory};

#[derive(Debug, Clone)]
struct WorkspaceRow {
    name: String,
    owner_id: UserId,
}

#[derive(Debug, Clone)]
struct MemberRow {
    workspace_id: WorkspaceId,
    user_id: UserId,
    role: String,
    status: String,
    is_active: bool,
}

#[derive(Default)]
struct State {
    logs: Vec<ActivityLogEntry>,
    workspaces: HashMap<WorkspaceId, WorkspaceRow>,
    members: Vec<MemberRow>,
}

pub struct InMemoryStore {
    clock: Arc<dyn Clock>,
    state: RwLock<State>,
    fail_inserts: AtomicBool,
    fail_reads: AtomicBool,
    fail_directory: AtomicBool,
    insert_delay: RwLock<Option<Duration>>,
    queries: AtomicUsize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: RwLock::new(State::default()),
            fail_inserts: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_directory: AtomicBool::new(false),
            insert_delay: RwLock::new(None),
            queries: AtomicUsize::new(0),
        }
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    pub fn add_workspace(&self, workspace_id: WorkspaceId, name: &str, owner_id: UserId) {
        self.state.write().workspaces.insert(
            workspace_id,
            WorkspaceRow {
                name: name.to_string(),
                owner_id,
            },
        );
    }

    /// Add a membership with the given status (`accepted`, `pending`, ...).
    pub fn add_member(&self, workspace_id: WorkspaceId, user_id: UserId, role: &str, status: &str) {
        self.state.write().members.push(MemberRow {
            workspace_id,
            user_id,
            role: role.to_string(),
            status: status.to_string(),
            is_active: false,
        });
    }

    /// Persist an entry with an explicit `created_at`.
    pub fn insert_at(&self, log: &NewActivityLog, created_at: DateTime<Utc>) -> ActivityLogEntry {
        let entry = materialize(log, created_at);
        self.state.write().logs.push(entry.clone());
        entry
    }

    // ========================================================================
    // Failure injection
    // ========================================================================

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Fail every activity log read (lookups, listing, counts).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Fail every workspace ownership/membership lookup.
    pub fn fail_directory(&self, fail: bool) {
        self.fail_directory.store(fail, Ordering::SeqCst);
    }

    /// Make every insert hang for `delay` before completing.
    pub fn delay_inserts(&self, delay: Option<Duration>) {
        *self.insert_delay.write() = delay;
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Number of store calls made through either trait.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn entries(&self) -> Vec<ActivityLogEntry> {
        self.state.read().logs.clone()
    }

    pub fn count_of(&self, workspace_id: WorkspaceId, activity_type: ActivityType) -> usize {
        self.state
            .read()
            .logs
            .iter()
            .filter(|e| e.workspace_id == workspace_id && e.activity_type == activity_type)
            .count()
    }

    fn touch(&self, failing: &AtomicBool, what: &str) -> DbResult<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if failing.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable(format!("injected {what} failure")));
        }
        Ok(())
    }

    fn membership(&self, state: &State, member: &MemberRow) -> Option<WorkspaceMembership> {
        state
            .workspaces
            .get(&member.workspace_id)
            .map(|ws| WorkspaceMembership {
                workspace_id: member.workspace_id,
                workspace_name: ws.name.clone(),
                role: member.role.clone(),
                is_active: member.is_active,
            })
    }
}

fn materialize(log: &NewActivityLog, created_at: DateTime<Utc>) -> ActivityLogEntry {
    ActivityLogEntry {
        id: ActivityLogId::new(),
        workspace_id: log.workspace_id,
        user_id: log.user_id,
        member_email: log.member_email.clone(),
        member_name: log.member_name.clone(),
        activity_type: log.activity_type,
        activity_description: log.activity_description.clone(),
        metadata: log.metadata.clone(),
        ip_address: log.ip_address.clone(),
        user_agent: log.user_agent.clone(),
        created_at,
        updated_at: created_at,
    }
}

fn newest_first(a: &ActivityLogEntry, b: &ActivityLogEntry) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

#[async_trait]
impl ActivityLogStore for InMemoryStore {
    async fn insert(&self, log: &NewActivityLog) -> DbResult<ActivityLogEntry> {
        self.touch(&self.fail_inserts, "insert")?;
        let delay = *self.insert_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.insert_at(log, self.clock.now()))
    }

    async fn find_by_id(
        &self,
        workspace_id: WorkspaceId,
        id: ActivityLogId,
    ) -> DbResult<Option<ActivityLogEntry>> {
        self.touch(&self.fail_reads, "read")?;
        Ok(self
            .state
            .read()
            .logs
            .iter()
            .find(|e| e.workspace_id == workspace_id && e.id == id)
            .cloned())
    }

    async fn find_recent(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        activity_type: ActivityType,
        since: DateTime<Utc>,
    ) -> DbResult<Option<ActivityLogEntry>> {
        self.touch(&self.fail_reads, "read")?;
        Ok(self
            .state
            .read()
            .logs
            .iter()
            .filter(|e| {
                e.workspace_id == workspace_id
                    && e.user_id == user_id
                    && e.activity_type == activity_type
                    && e.created_at >= since
            })
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn list(&self, filter: &ActivityLogFilter) -> DbResult<(Vec<ActivityLogEntry>, i64)> {
        self.touch(&self.fail_reads, "read")?;
        let state = self.state.read();
        let mut matching: Vec<&ActivityLogEntry> =
            state.logs.iter().filter(|e| filter.matches(e)).collect();
        matching.sort_by(|a, b| newest_first(a, b));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn count_since(
        &self,
        workspace_id: WorkspaceId,
        since: Option<DateTime<Utc>>,
    ) -> DbResult<i64> {
        self.touch(&self.fail_reads, "read")?;
        Ok(self
            .state
            .read()
            .logs
            .iter()
            .filter(|e| e.workspace_id == workspace_id)
            .filter(|e| since.map_or(true, |s| e.created_at >= s))
            .count() as i64)
    }

    async fn member_counts_since(
        &self,
        workspace_id: WorkspaceId,
        since: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<MemberActivityCount>> {
        self.touch(&self.fail_reads, "read")?;
        let state = self.state.read();
        let mut by_email: BTreeMap<&str, MemberActivityCount> = BTreeMap::new();
        for e in state
            .logs
            .iter()
            .filter(|e| e.workspace_id == workspace_id && e.created_at >= since)
        {
            let slot = by_email
                .entry(e.member_email.as_str())
                .or_insert_with(|| MemberActivityCount {
                    member_email: e.member_email.clone(),
                    member_name: None,
                    activity_count: 0,
                });
            slot.activity_count += 1;
            if e.member_name > slot.member_name {
                slot.member_name = e.member_name.clone();
            }
        }

        let mut counts: Vec<MemberActivityCount> = by_email.into_values().collect();
        counts.sort_by(|a, b| {
            b.activity_count
                .cmp(&a.activity_count)
                .then_with(|| a.member_email.cmp(&b.member_email))
        });
        counts.truncate(limit.max(0) as usize);
        Ok(counts)
    }

    async fn type_counts_since(
        &self,
        workspace_id: WorkspaceId,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<ActivityTypeCount>> {
        self.touch(&self.fail_reads, "read")?;
        let state = self.state.read();
        let mut by_type: BTreeMap<&'static str, ActivityTypeCount> = BTreeMap::new();
        for e in state
            .logs
            .iter()
            .filter(|e| e.workspace_id == workspace_id && e.created_at >= since)
        {
            by_type
                .entry(e.activity_type.as_str())
                .or_insert(ActivityTypeCount {
                    activity_type: e.activity_type,
                    count: 0,
                })
                .count += 1;
        }

        let mut counts: Vec<ActivityTypeCount> = by_type.into_values().collect();
        counts.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.activity_type.as_str().cmp(b.activity_type.as_str()))
        });
        Ok(counts)
    }

    async fn health_check(&self) -> DbResult<()> {
        self.touch(&self.fail_reads, "read")
    }
}

#[async_trait]
impl WorkspaceDirectory for InMemoryStore {
    async fn owner_of(&self, workspace_id: WorkspaceId) -> DbResult<Option<UserId>> {
        self.touch(&self.fail_directory, "directory")?;
        Ok(self
            .state
            .read()
            .workspaces
            .get(&workspace_id)
            .map(|ws| ws.owner_id))
    }

    async fn is_accepted_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> DbResult<bool> {
        self.touch(&self.fail_directory, "directory")?;
        Ok(self.state.read().members.iter().any(|m| {
            m.workspace_id == workspace_id
                && m.user_id == user_id
                && m.status == MEMBER_STATUS_ACCEPTED
        }))
    }

    async fn active_membership(&self, user_id: UserId) -> DbResult<Option<WorkspaceMembership>> {
        self.touch(&self.fail_directory, "directory")?;
        let state = self.state.read();
        Ok(state
            .members
            .iter()
            .find(|m| m.user_id == user_id && m.status == MEMBER_STATUS_ACCEPTED && m.is_active)
            .and_then(|m| self.membership(&state, m)))
    }

    async fn first_accepted_membership(
        &self,
        user_id: UserId,
    ) -> DbResult<Option<WorkspaceMembership>> {
        self.touch(&self.fail_directory, "directory")?;
        let state = self.state.read();
        Ok(state
            .members
            .iter()
            .find(|m| m.user_id == user_id && m.status == MEMBER_STATUS_ACCEPTED)
            .and_then(|m| self.membership(&state, m)))
    }

    async fn activate_membership(
        &self,
        user_id: UserId,
        workspace_id: WorkspaceId,
    ) -> DbResult<()> {
        self.touch(&self.fail_directory, "directory")?;
        let mut state = self.state.write();
        for m in state.members.iter_mut().filter(|m| m.user_id == user_id) {
            m.is_active = m.workspace_id == workspace_id;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use leadbase_types::{Actor, ManualClock};

    fn login(ws: WorkspaceId, actor: &Actor) -> NewActivityLog {
        NewActivityLog::new(ws, actor, ActivityType::Login, "login")
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_counts_total() {
        let clock = ManualClock::new(Utc::now());
        let store = InMemoryStore::new(Arc::new(clock.clone()));
        let ws = WorkspaceId(1);
        let actor = Actor::new(UserId::new(), "a@b.com");

        for _ in 0..3 {
            store.insert(&login(ws, &actor)).await.unwrap();
            clock.advance(ChronoDuration::seconds(1));
        }

        let mut filter = ActivityLogFilter::for_workspace(ws);
        filter.limit = 2;
        let (page, total) = store.list(&filter).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert!(page[0].created_at > page[1].created_at);
    }

    #[tokio::test]
    async fn test_injected_failures_are_counted() {
        let store = InMemoryStore::default();
        store.fail_inserts(true);
        let actor = Actor::new(UserId::new(), "a@b.com");

        assert!(store.insert(&login(WorkspaceId(1), &actor)).await.is_err());
        assert_eq!(store.query_count(), 1);
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn test_activate_membership_is_exclusive() {
        let store = InMemoryStore::default();
        let user = UserId::new();
        store.add_workspace(WorkspaceId(1), "One", UserId::new());
        store.add_workspace(WorkspaceId(2), "Two", UserId::new());
        store.add_member(WorkspaceId(1), user, "member", MEMBER_STATUS_ACCEPTED);
        store.add_member(WorkspaceId(2), user, "admin", MEMBER_STATUS_ACCEPTED);

        assert!(store.active_membership(user).await.unwrap().is_none());
        store.activate_membership(user, WorkspaceId(2)).await.unwrap();
        let active = store.active_membership(user).await.unwrap().unwrap();
        assert_eq!(active.workspace_id, WorkspaceId(2));
        assert_eq!(active.workspace_name, "Two");

        store.activate_membership(user, WorkspaceId(1)).await.unwrap();
        let active = store.active_membership(user).await.unwrap().unwrap();
        assert_eq!(active.workspace_id, WorkspaceId(1));
    }

    #[tokio::test]
    async fn test_pending_member_is_not_accepted() {
        let store = InMemoryStore::default();
        let user = UserId::new();
        store.add_member(WorkspaceId(1), user, "member", "pending");
        assert!(!store.is_accepted_member(WorkspaceId(1), user).await.unwrap());
    }
}

//! In-memory task store used by tests across the workspace.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::client::TaskTransport;
use crate::error::TransportError;
use crate::model::{NewTask, Task, TaskId};

pub fn task(id: TaskId, title: &str, completed: bool) -> Task {
    Task {
        id,
        user_id: 1,
        title: title.into(),
        completed,
    }
}

/// Holds fake requests until opened. Once open it stays open.
pub struct Gate {
    open: watch::Sender<bool>,
}

impl Gate {
    fn new() -> Arc<Self> {
        let (open, _) = watch::channel(false);
        Arc::new(Self { open })
    }

    pub fn open(&self) {
        self.open.send_replace(true);
    }

    async fn pass(&self) {
        let mut rx = self.open.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }
}

#[derive(Default)]
struct Gates {
    create: Option<Arc<Gate>>,
    update: Option<Arc<Gate>>,
    delete: Option<Arc<Gate>>,
}

#[derive(Default)]
struct Switches {
    fail_list: bool,
    fail_create: bool,
    fail_update: BTreeSet<TaskId>,
    fail_delete: BTreeSet<TaskId>,
}

/// Scriptable [`TaskTransport`] that keeps tasks in memory.
#[derive(Default)]
pub struct FakeTransport {
    tasks: Mutex<Vec<Task>>,
    next_id: Mutex<TaskId>,
    switches: Mutex<Switches>,
    gates: Mutex<Gates>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl FakeTransport {
    pub fn with_tasks(tasks: Vec<Task>) -> Arc<Self> {
        let next_id = tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            tasks: Mutex::new(tasks),
            next_id: Mutex::new(next_id),
            ..Self::default()
        })
    }

    pub fn fail_list(&self, fail: bool) {
        self.switches.lock().fail_list = fail;
    }

    pub fn fail_create(&self, fail: bool) {
        self.switches.lock().fail_create = fail;
    }

    pub fn fail_update_for(&self, id: TaskId) {
        self.switches.lock().fail_update.insert(id);
    }

    pub fn fail_delete_for(&self, id: TaskId) {
        self.switches.lock().fail_delete.insert(id);
    }

    /// Make every create wait until the returned gate opens.
    pub fn hold_creates(&self) -> Arc<Gate> {
        let gate = Gate::new();
        self.gates.lock().create = Some(gate.clone());
        gate
    }

    /// Updates are counted and failure-checked first, then wait for the gate.
    pub fn hold_updates(&self) -> Arc<Gate> {
        let gate = Gate::new();
        self.gates.lock().update = Some(gate.clone());
        gate
    }

    /// Deletes are counted and failure-checked first, then wait for the gate.
    pub fn hold_deletes(&self) -> Arc<Gate> {
        let gate = Gate::new();
        self.gates.lock().delete = Some(gate.clone());
        gate
    }

    pub fn stored(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskTransport for FakeTransport {
    async fn list(&self) -> Result<Vec<Task>, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.switches.lock().fail_list {
            return Err(TransportError::status("GET /todos", 500));
        }
        Ok(self.stored())
    }

    async fn create(&self, draft: &NewTask) -> Result<Task, TransportError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().create.clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.switches.lock().fail_create {
            return Err(TransportError::status("POST /todos", 500));
        }
        let id = {
            let mut next = self.next_id.lock();
            let id = *next;
            *next += 1;
            id
        };
        let created = Task {
            id,
            user_id: draft.user_id,
            title: draft.title.clone(),
            completed: draft.completed,
        };
        self.tasks.lock().push(created.clone());
        Ok(created)
    }

    async fn update(&self, task: &Task) -> Result<Task, TransportError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let endpoint = format!("PATCH /todos/{}", task.id);
        if self.switches.lock().fail_update.contains(&task.id) {
            return Err(TransportError::status(endpoint, 500));
        }
        let gate = self.gates.lock().update.clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        let mut tasks = self.tasks.lock();
        match tasks.iter_mut().find(|stored| stored.id == task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(task.clone())
            }
            None => Err(TransportError::status(endpoint, 404)),
        }
    }

    async fn delete(&self, id: TaskId) -> Result<(), TransportError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let endpoint = format!("DELETE /todos/{}", id);
        if self.switches.lock().fail_delete.contains(&id) {
            return Err(TransportError::status(endpoint, 500));
        }
        let gate = self.gates.lock().delete.clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|stored| stored.id != id);
        if tasks.len() == before {
            return Err(TransportError::status(endpoint, 404));
        }
        Ok(())
    }
}

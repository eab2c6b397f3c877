//! Fault injection around [`InMemoryImageIndex`] for driving race and
//! failure branches deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cis_index::{Image, ImageIndex, InMemoryImageIndex, IndexError, IndexOp, IndexResult};
use cis_types::Digest;
use tokio::sync::Notify;

type Hook = Box<dyn FnOnce(&InMemoryImageIndex) + Send>;

enum Action {
    Fail(IndexError),
    Before(Hook),
}

/// A one-shot fault, triggered by the first matching call after `skip`
/// matching calls have passed through.
pub(crate) struct Fault {
    op: IndexOp,
    name: Option<String>,
    skip: usize,
    action: Action,
}

impl Fault {
    /// Fail the call with `error` instead of reaching the index.
    pub(crate) fn fail(op: IndexOp, name: Option<&str>, error: IndexError) -> Self {
        Self {
            op,
            name: name.map(str::to_string),
            skip: 0,
            action: Action::Fail(error),
        }
    }

    /// Mutate the index just before the call reaches it, simulating a
    /// concurrent caller that got there first.
    pub(crate) fn before(
        op: IndexOp,
        name: Option<&str>,
        hook: impl FnOnce(&InMemoryImageIndex) + Send + 'static,
    ) -> Self {
        Self {
            op,
            name: name.map(str::to_string),
            skip: 0,
            action: Action::Before(Box::new(hook)),
        }
    }

    /// Let `n` matching calls through before triggering.
    pub(crate) fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }
}

pub(crate) struct FaultyIndex {
    inner: Arc<InMemoryImageIndex>,
    faults: Mutex<Vec<Fault>>,
    gates: Mutex<HashMap<IndexOp, Arc<Notify>>>,
}

impl FaultyIndex {
    pub(crate) fn new(inner: Arc<InMemoryImageIndex>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            faults: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
        })
    }

    pub(crate) fn inner(&self) -> &InMemoryImageIndex {
        &self.inner
    }

    pub(crate) fn inject(&self, fault: Fault) {
        self.faults.lock().unwrap().push(fault);
    }

    /// Park the next `op` call until the returned handle is notified.
    pub(crate) fn gate(&self, op: IndexOp) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(op, Arc::clone(&notify));
        notify
    }

    async fn intercept(&self, op: IndexOp, name: Option<&str>) -> IndexResult<()> {
        let gate = self.gates.lock().unwrap().remove(&op);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let action = {
            let mut faults = self.faults.lock().unwrap();
            let mut triggered = None;
            for (i, fault) in faults.iter_mut().enumerate() {
                let name_matches = match (&fault.name, name) {
                    (None, _) => true,
                    (Some(want), Some(got)) => want == got,
                    (Some(_), None) => false,
                };
                if fault.op != op || !name_matches {
                    continue;
                }
                if fault.skip > 0 {
                    fault.skip -= 1;
                    continue;
                }
                triggered = Some(i);
                break;
            }
            triggered.map(|i| faults.remove(i).action)
        };

        match action {
            Some(Action::Fail(e)) => Err(e),
            Some(Action::Before(hook)) => {
                hook(&self.inner);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ImageIndex for FaultyIndex {
    async fn create(&self, image: Image) -> IndexResult<Image> {
        self.intercept(IndexOp::Create, Some(&image.name)).await?;
        self.inner.create(image).await
    }

    async fn get(&self, name: &str) -> IndexResult<Image> {
        self.intercept(IndexOp::Get, Some(name)).await?;
        self.inner.get(name).await
    }

    async fn delete(&self, name: &str) -> IndexResult<()> {
        self.intercept(IndexOp::Delete, Some(name)).await?;
        self.inner.delete(name).await
    }

    async fn list_by_digest(&self, digest: &Digest) -> IndexResult<Vec<Image>> {
        self.intercept(IndexOp::List, None).await?;
        self.inner.list_by_digest(digest).await
    }
}

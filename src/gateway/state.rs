use std::sync::Arc;

use crate::reconcile::{Manifest, Reconciler};
use crate::store::ReferenceStore;
use crate::terminology::TerminologyClient;
use crate::update::BatchUpdater;

pub struct HandlerState<S, T> {
    pub reconciler: Arc<Reconciler<S, T>>,

    pub updater: Arc<BatchUpdater<S>>,

    pub store: S,

    pub manifest: Arc<Manifest>,
}

// `T` (the terminology client) need not be `Clone`; it lives behind the `Arc`.
impl<S: Clone, T> Clone for HandlerState<S, T> {
    fn clone(&self) -> Self {
        Self {
            reconciler: Arc::clone(&self.reconciler),
            updater: Arc::clone(&self.updater),
            store: self.store.clone(),
            manifest: Arc::clone(&self.manifest),
        }
    }
}

impl<S, T> HandlerState<S, T>
where
    S: ReferenceStore + Clone + 'static,
    T: TerminologyClient + 'static,
{
    pub fn new(store: S, reconciler: Reconciler<S, T>, manifest: Manifest) -> Self {
        Self {
            updater: Arc::new(BatchUpdater::new(store.clone())),
            reconciler: Arc::new(reconciler),
            store,
            manifest: Arc::new(manifest),
        }
    }
}

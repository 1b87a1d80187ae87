//! Scripted in-memory [`Runtime`] used by the supervisor tests.
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::container::{ContainerID, ContainerSpec, ContainerStatus};

use super::{Error, Launched, Result, Runtime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Ping,
    FindByName(String),
    Run(String),
    Reload(ContainerID),
    Stop(ContainerID),
    Remove(ContainerID),
}

/// Failure a scripted call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    ImageNotFound,
    Api,
}

impl Failure {
    fn into_error(self, what: &str) -> Error {
        match self {
            Failure::NotFound => Error::NotFound(what.to_owned()),
            Failure::ImageNotFound => Error::ImageNotFound(what.to_owned()),
            Failure::Api => Error::Api(bollard::errors::Error::DockerResponseServerError {
                status_code: 500,
                message: format!("scripted failure for `{what}`"),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    next_id: u64,
    /// Containers that exist in the fake daemon, by name.
    existing: HashMap<String, ContainerID>,
    run_failures: HashMap<String, Failure>,
    reloads: HashMap<ContainerID, VecDeque<Result<ContainerStatus>>>,
    stop_failures: HashMap<ContainerID, Failure>,
    remove_failures: HashMap<ContainerID, Failure>,
    launched: Vec<ContainerID>,
    panic_on_reload: bool,
}

#[derive(Debug, Default)]
pub struct FakeRuntime {
    state: Mutex<State>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn allocate_id(state: &mut State) -> ContainerID {
        state.next_id += 1;
        ContainerID::new(format!("{:064x}", state.next_id)).unwrap()
    }

    /// Registers a pre-existing container named `name` and returns its id.
    pub fn with_existing(&self, name: &str) -> ContainerID {
        let mut state = self.state();
        let id = Self::allocate_id(&mut state);
        state.existing.insert(name.to_owned(), id.clone());
        id
    }

    pub fn fail_run(&self, name: &str, failure: Failure) {
        self.state().run_failures.insert(name.to_owned(), failure);
    }

    /// Queues the outcome of the next `reload` for `id`. Once the queue is empty, reloads report
    /// `running`.
    pub fn push_reload(
        &self,
        id: &ContainerID,
        outcome: std::result::Result<ContainerStatus, Failure>,
    ) {
        let outcome = outcome.map_err(|failure| failure.into_error(id.as_ref()));
        self.state()
            .reloads
            .entry(id.clone())
            .or_default()
            .push_back(outcome);
    }

    pub fn fail_stop(&self, id: &ContainerID, failure: Failure) {
        self.state().stop_failures.insert(id.clone(), failure);
    }

    pub fn fail_remove(&self, id: &ContainerID, failure: Failure) {
        self.state().remove_failures.insert(id.clone(), failure);
    }

    /// Makes every following `reload` panic.
    pub fn panic_on_reload(&self) {
        self.state().panic_on_reload = true;
    }

    /// Ids handed out by successful `run` calls, in launch order.
    pub fn launched(&self) -> Vec<ContainerID> {
        self.state().launched.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn existing(&self, name: &str) -> Option<ContainerID> {
        self.state().existing.get(name).cloned()
    }
}

impl Runtime for FakeRuntime {
    async fn ping(&self) -> Result<()> {
        self.state().calls.push(Call::Ping);
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<ContainerID> {
        let mut state = self.state();
        state.calls.push(Call::FindByName(name.to_owned()));
        state
            .existing
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<Launched> {
        let mut state = self.state();
        state.calls.push(Call::Run(spec.name.clone()));
        if let Some(failure) = state.run_failures.get(&spec.name) {
            let what = match failure {
                Failure::ImageNotFound => spec.image.as_str(),
                _ => spec.name.as_str(),
            };
            return Err(failure.into_error(what));
        }
        let id = Self::allocate_id(&mut state);
        state.existing.insert(spec.name.clone(), id.clone());
        state.launched.push(id.clone());

        Ok(Launched {
            id,
            status: ContainerStatus::Running,
        })
    }

    async fn reload(&self, id: &ContainerID) -> Result<ContainerStatus> {
        let mut state = self.state();
        state.calls.push(Call::Reload(id.clone()));
        if state.panic_on_reload {
            // Release the lock first so later calls do not see a poisoned mutex.
            drop(state);
            panic!("scripted panic while reloading {}", id.short());
        }
        state
            .reloads
            .get_mut(id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(ContainerStatus::Running))
    }

    async fn stop(&self, id: &ContainerID, _timeout: Duration) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::Stop(id.clone()));
        match state.stop_failures.get(id) {
            Some(failure) => Err(failure.into_error(id.as_ref())),
            None => Ok(()),
        }
    }

    async fn remove(&self, id: &ContainerID) -> Result<()> {
        let mut state = self.state();
        state.calls.push(Call::Remove(id.clone()));
        if let Some(failure) = state.remove_failures.get(id) {
            return Err(failure.into_error(id.as_ref()));
        }
        state.existing.retain(|_, existing| existing != id);
        Ok(())
    }
}

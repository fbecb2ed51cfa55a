//! Headless viewer host
//!
//! Simulates media loading with tokio tasks that report back over a channel.
//! Releasing a handle aborts its task, so a late load never reaches the
//! viewer through this host.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use indras_stories::{CloseReason, HostRoute, MediaEvent, MediaHandle, Story, StoryId, ViewerHost};

use crate::records::SimulatedMedia;

pub struct HeadlessHost {
    media: HashMap<StoryId, SimulatedMedia>,
    events: mpsc::UnboundedSender<MediaEvent>,
    loading: HashMap<MediaHandle, JoinHandle<()>>,
    loads_started: u64,
    closed: Option<CloseReason>,
    routes: Vec<HostRoute>,
}

impl HeadlessHost {
    pub fn new(
        media: HashMap<StoryId, SimulatedMedia>,
        events: mpsc::UnboundedSender<MediaEvent>,
    ) -> Self {
        Self {
            media,
            events,
            loading: HashMap::new(),
            loads_started: 0,
            closed: None,
            routes: Vec::new(),
        }
    }

    /// Number of media loads requested so far; one per slide entry
    pub fn loads_started(&self) -> u64 {
        self.loads_started
    }

    /// Simulated loads still in flight
    pub fn pending_loads(&self) -> usize {
        self.loading.values().filter(|task| !task.is_finished()).count()
    }

    pub fn closed(&self) -> Option<CloseReason> {
        self.closed
    }

    pub fn routes(&self) -> &[HostRoute] {
        &self.routes
    }
}

impl ViewerHost for HeadlessHost {
    fn load_media(&mut self, handle: MediaHandle, story: &Story) {
        self.loads_started += 1;
        let simulation = self.media.get(&story.id).cloned().unwrap_or_default();
        debug!(%handle, story = %story.id, url = %story.media_url, "Loading media");

        let Some(event) = simulation.outcome(handle, story.media_type) else {
            return;
        };
        let tx = self.events.clone();
        let delay = simulation.load_delay();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        });
        self.loading.insert(handle, task);
    }

    fn release_media(&mut self, handle: MediaHandle) {
        if let Some(task) = self.loading.remove(&handle) {
            task.abort();
        }
        debug!(%handle, "Released media");
    }

    fn close(&mut self, reason: CloseReason) {
        info!(?reason, "Viewer closed");
        self.closed = Some(reason);
    }

    fn navigate_to(&mut self, route: HostRoute) {
        info!(?route, "Switching screen");
        self.routes.push(route);
    }
}

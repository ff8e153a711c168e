//! Desktop daemon - hosts one icon view over the desktop directory
//!
//! Watches the directory, feeds the resulting model changes to the view,
//! carries out the view's requests (timers, position write-back) and keeps
//! the position file up to date. Runs on a calloop event loop.

use anyhow::{Context, Result};
use calloop::channel::{Channel, Sender};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle, RegistrationToken};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::grid::Slot;
use crate::icons::IconCache;
use crate::model::ModelEvent;
use crate::positions::PositionStore;
use crate::text::{FixedMeasurer, FontMeasurer, TextMeasurer};
use crate::view::{IconView, TimerId, ViewEvent, ViewId};

mod model;

pub use model::{entry_name, row_for_path, DesktopModel};

/// How often dirty positions are flushed to disk
const SAVE_INTERVAL: Duration = Duration::from_secs(2);

/// A timer change the event loop has to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    Schedule { id: TimerId, delay: Duration },
    Cancel(TimerId),
}

pub struct IconDaemon {
    config: Config,
    desktop_dir: PathBuf,
    model: DesktopModel,
    view: IconView,
    positions: PositionStore,
    icons: IconCache,
    needs_redraw: bool,
    watcher: Option<RecommendedWatcher>,
    timers: HashMap<TimerId, RegistrationToken>,
}

fn measurer_for(config: &Config) -> Box<dyn TextMeasurer> {
    if let Some(path) = &config.font_path {
        match FontMeasurer::from_file(path, config.font_size) {
            Ok(measurer) => return Box::new(measurer),
            Err(e) => warn!("Falling back to fixed text metrics: {}", e),
        }
    }
    Box::new(FixedMeasurer::for_font_size(config.font_size))
}

impl IconDaemon {
    /// Scan `desktop_dir` and lay its entries out on a `width` x `height`
    /// desktop
    pub fn new(
        config: Config,
        desktop_dir: PathBuf,
        positions: PositionStore,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        info!("Initializing icon daemon for {}", desktop_dir.display());

        let view = IconView::with_measurer(ViewId(1), &config, measurer_for(&config));
        let icons = IconCache::new(config.icon_theme.clone());
        let mut daemon = Self {
            model: DesktopModel::empty(&desktop_dir),
            config,
            desktop_dir,
            view,
            positions,
            icons,
            needs_redraw: true,
            watcher: None,
            timers: HashMap::new(),
        };

        daemon.view.resize(width, height);
        daemon.scan_desktop()?;
        Ok(daemon)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn view(&self) -> &IconView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut IconView {
        &mut self.view
    }

    pub fn model(&self) -> &DesktopModel {
        &self.model
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    /// Set up file system watcher with calloop channel
    fn setup_watcher(&mut self, sender: Sender<notify::Result<Event>>) -> Result<()> {
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = sender.send(res);
            },
            notify::Config::default(),
        )?;
        watcher.watch(&self.desktop_dir, RecursiveMode::NonRecursive)?;
        info!("Watching desktop directory: {}", self.desktop_dir.display());

        self.watcher = Some(watcher);
        Ok(())
    }

    /// Rebuild the model from disk and repopulate the view
    fn scan_desktop(&mut self) -> Result<()> {
        self.model = DesktopModel::scan(&self.desktop_dir, &self.positions)
            .context("Failed to read desktop directory")?;
        self.view.populate(&self.model);
        info!("Loaded {} desktop icons", self.model.len());
        Ok(())
    }

    fn forward(&mut self, event: Option<ModelEvent>) {
        if let Some(event) = event {
            self.view.handle_model_event(&self.model, event);
        }
    }

    fn add_entry(&mut self, path: &Path) {
        let event = self.model.add(path, &self.positions);
        self.forward(event);
    }

    fn remove_entry(&mut self, path: &Path) {
        let event = self.model.remove(path);
        if event.is_some() {
            if let Some(name) = entry_name(path) {
                self.positions.remove(name);
            }
        }
        self.forward(event);
    }

    fn rename_entry(&mut self, from: &Path, to: &Path) {
        if let (Some(old), Some(new)) = (entry_name(from), entry_name(to)) {
            self.positions.rename(old, new);
        }
        let removed = self.model.remove(from);
        self.forward(removed);
        self.add_entry(to);
    }

    /// Handle a file system event
    fn handle_fs_event(&mut self, event: Event) {
        use notify::event::{ModifyKind, RenameMode};
        use notify::EventKind;

        match event.kind {
            EventKind::Create(_) => {
                for path in &event.paths {
                    self.add_entry(path);
                }
            }
            EventKind::Remove(_) => {
                for path in &event.paths {
                    self.remove_entry(path);
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
                self.rename_entry(&event.paths[0], &event.paths[1]);
            }
            EventKind::Modify(_) => {
                for path in &event.paths {
                    if !path.exists() {
                        self.remove_entry(path);
                    } else if self.model.index_of_path(path).is_some() {
                        let refreshed = self.model.refresh(path, &self.positions);
                        self.forward(refreshed);
                    } else {
                        self.add_entry(path);
                    }
                }
            }
            _ => {}
        }
    }

    /// Carry out everything the view queued. Returns the timer changes
    /// the event loop must apply.
    pub fn process_view_events(&mut self) -> Vec<TimerRequest> {
        let mut requests = Vec::new();
        loop {
            let events = self.view.take_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                match event {
                    ViewEvent::ItemMoved { reference, slot, .. } => {
                        let index = reference.resolve(&self.model);
                        self.write_back(index, slot);
                    }
                    ViewEvent::ItemUnplaced { item, .. } => {
                        warn!("No free slot for {:?}", self.view.item_label(item));
                    }
                    ViewEvent::Activated(items) => {
                        for item in items {
                            let path = self.view.index_of_item(item).and_then(|i| self.model.path_at(i));
                            if let Some(path) = path {
                                info!("Activate {}", path.display());
                            }
                        }
                    }
                    ViewEvent::ContextMenu { item, position } => {
                        let label = item.and_then(|id| self.view.item_label(id));
                        info!("Context menu for {:?} at {:?}", label, position);
                    }
                    ViewEvent::DragBegin(item) => debug!("Drag started from {:?}", item),
                    ViewEvent::ScheduleTimer { id, delay } => {
                        requests.push(TimerRequest::Schedule { id, delay });
                    }
                    ViewEvent::CancelTimer(id) => requests.push(TimerRequest::Cancel(id)),
                    ViewEvent::Redraw(_) | ViewEvent::RedrawAll => self.needs_redraw = true,
                    ViewEvent::SelectionChanged | ViewEvent::CursorChanged(_) => {}
                }
            }
        }
        requests
    }

    /// Store a placement in the position file and in the model row
    fn write_back(&mut self, index: Option<usize>, slot: Slot) {
        let Some(index) = index else {
            return;
        };
        if let Some(name) = self.model.path_at(index).and_then(entry_name) {
            self.positions.set(name, slot);
        }
        let event = self.model.set_position(index, slot);
        self.forward(event);
    }

    /// Deliver an expired timer to the view
    pub fn timer_fired(&mut self, id: TimerId) {
        self.timers.remove(&id);
        self.view.timer_fired(id);
    }

    /// Reload icon images if the cache moved to a new generation
    pub fn refresh_icons(&mut self) {
        let loaded = self.view.refresh_icons(&mut self.icons);
        if loaded > 0 {
            debug!("Loaded {} icon images", loaded);
            self.needs_redraw = true;
        }
    }

    /// Whether anything changed since the last call
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Flush dirty positions to disk
    pub fn save_positions(&mut self) {
        if let Err(e) = self.positions.save() {
            error!("Failed to save icon positions: {}", e);
        }
    }

    /// Labels and slots of every item, in model order
    pub fn layout(&self) -> Vec<(String, Option<Slot>)> {
        self.view
            .item_ids()
            .map(|id| {
                let label = self.view.item_label(id).unwrap_or_default().to_string();
                (label, self.view.item_slot(id))
            })
            .collect()
    }

    fn apply_timer_requests(&mut self, handle: &LoopHandle<'_, DaemonState>, requests: Vec<TimerRequest>) {
        for request in requests {
            match request {
                TimerRequest::Schedule { id, delay } => {
                    let timer = Timer::from_duration(delay);
                    let inserted = handle.insert_source(timer, move |_, _, state: &mut DaemonState| {
                        state.fired_timers.push(id);
                        TimeoutAction::Drop
                    });
                    match inserted {
                        Ok(token) => {
                            self.timers.insert(id, token);
                        }
                        Err(e) => error!("Failed to schedule timer {:?}: {:?}", id, e),
                    }
                }
                TimerRequest::Cancel(id) => {
                    if let Some(token) = self.timers.remove(&id) {
                        handle.remove(token);
                    }
                }
            }
        }
    }

    /// Run the main daemon loop using calloop
    pub fn run(&mut self) -> Result<()> {
        info!("Icon daemon running with calloop event loop");

        let mut event_loop: EventLoop<DaemonState> = EventLoop::try_new()
            .context("Failed to create calloop event loop")?;
        let loop_handle = event_loop.handle();

        let (sender, channel): (Sender<notify::Result<Event>>, Channel<notify::Result<Event>>) =
            calloop::channel::channel();
        self.setup_watcher(sender)?;

        loop_handle
            .insert_source(channel, |event, _, state: &mut DaemonState| match event {
                calloop::channel::Event::Msg(Ok(fs_event)) => {
                    state.pending_events.push(fs_event);
                }
                calloop::channel::Event::Msg(Err(e)) => {
                    error!("Watcher error: {}", e);
                }
                calloop::channel::Event::Closed => {
                    error!("Watcher channel closed");
                    state.should_stop = true;
                }
            })
            .map_err(|e| anyhow::anyhow!("Failed to register file watcher channel: {:?}", e))?;

        let save_timer = Timer::from_duration(SAVE_INTERVAL);
        loop_handle
            .insert_source(save_timer, |_, _, state: &mut DaemonState| {
                state.should_save = true;
                TimeoutAction::ToDuration(SAVE_INTERVAL)
            })
            .map_err(|e| anyhow::anyhow!("Failed to register save timer: {:?}", e))?;

        let mut state = DaemonState::default();
        info!("Entering calloop dispatch loop");

        loop {
            self.refresh_icons();
            let requests = self.process_view_events();
            self.apply_timer_requests(&loop_handle, requests);

            event_loop
                .dispatch(Some(Duration::from_millis(16)), &mut state)
                .context("Event loop dispatch failed")?;

            for event in std::mem::take(&mut state.pending_events) {
                self.handle_fs_event(event);
            }
            for id in std::mem::take(&mut state.fired_timers) {
                self.timer_fired(id);
            }

            if state.should_save {
                self.save_positions();
                state.should_save = false;
            }

            if state.should_stop {
                info!("Daemon stopping");
                break;
            }
        }

        self.save_positions();
        Ok(())
    }
}

/// State passed to the calloop event loop callbacks
#[derive(Default)]
struct DaemonState {
    pending_events: Vec<Event>,
    fired_timers: Vec<TimerId>,
    should_save: bool,
    should_stop: bool,
}

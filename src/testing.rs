//! Host-side doubles for the browser pieces: image sources, a spawner, a
//! drawing surface that records calls and a hand-cranked frame scheduler.

use crate::engine::{Entity, FrameScheduler, Point, Rect, Surface};
use crate::resources::{ImageSource, Spawner};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::channel::oneshot::{channel, Sender};
use futures::executor::LocalPool;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Resolves every url to itself right away
pub struct ImmediateSource;

#[async_trait(?Send)]
impl ImageSource for ImmediateSource {
    type Handle = String;

    async fn fetch(&self, url: &str) -> Result<String> {
        Ok(url.to_owned())
    }
}

/// Holds every fetch until the test releases or fails it
#[derive(Clone, Default)]
pub struct GatedSource {
    state: Rc<RefCell<Gates>>,
}

#[derive(Default)]
struct Gates {
    requests: Vec<String>,
    pending: HashMap<String, Sender<Result<()>>>,
}

impl GatedSource {
    pub fn requests(&self) -> Vec<String> {
        self.state.borrow().requests.clone()
    }

    pub fn release(&self, url: &str) {
        self.open(url, Ok(()));
    }

    pub fn fail(&self, url: &str) {
        self.open(url, Err(anyhow!("broken image")));
    }

    fn open(&self, url: &str, outcome: Result<()>) {
        let gate = self
            .state
            .borrow_mut()
            .pending
            .remove(url)
            .unwrap_or_else(|| panic!("no fetch waiting on '{}'", url));
        let _ = gate.send(outcome);
    }
}

#[async_trait(?Send)]
impl ImageSource for GatedSource {
    type Handle = String;

    async fn fetch(&self, url: &str) -> Result<String> {
        let (tx, rx) = channel();
        {
            let mut state = self.state.borrow_mut();
            state.requests.push(url.to_owned());
            state.pending.insert(url.to_owned(), tx);
        }
        rx.await??;
        Ok(url.to_owned())
    }
}

/// Polls each task once on the spot; enough for [`ImmediateSource`]
pub fn immediate_spawner() -> Spawner {
    Box::new(|task: LocalBoxFuture<'static, ()>| {
        let _ = task.now_or_never();
    })
}

/// Queues tasks on `pool`; they progress on `run_until_stalled`
pub fn pool_spawner(pool: &LocalPool) -> Spawner {
    let spawner = pool.spawner();
    Box::new(move |task: LocalBoxFuture<'static, ()>| {
        spawner
            .spawn_local(task)
            .expect("local pool accepts tasks");
    })
}

/// Everything that happened during a frame, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Clear(Rect),
    Draw { image: String, position: Point },
    Update { entity: String, dt: f64 },
    Render(String),
    Check(usize),
}

pub struct RecordingSurface {
    journal: Rc<RefCell<Vec<Call>>>,
}

impl RecordingSurface {
    pub fn new(journal: &Rc<RefCell<Vec<Call>>>) -> Self {
        RecordingSurface {
            journal: Rc::clone(journal),
        }
    }
}

impl Surface for RecordingSurface {
    type Image = String;

    fn clear(&self, rect: &Rect) {
        self.journal.borrow_mut().push(Call::Clear(*rect));
    }

    fn draw_image(&self, image: &String, position: Point) -> Result<()> {
        self.journal.borrow_mut().push(Call::Draw {
            image: image.clone(),
            position,
        });
        Ok(())
    }
}

/// Entity that only reports its calls
pub struct Probe {
    name: String,
    journal: Rc<RefCell<Vec<Call>>>,
}

impl Probe {
    pub fn new(name: &str, journal: &Rc<RefCell<Vec<Call>>>) -> Self {
        Probe {
            name: name.to_owned(),
            journal: Rc::clone(journal),
        }
    }
}

impl Entity<RecordingSurface> for Probe {
    fn update(&mut self, dt: f64) {
        self.journal.borrow_mut().push(Call::Update {
            entity: self.name.clone(),
            dt,
        });
    }

    fn render(&self, _surface: &RecordingSurface) -> Result<()> {
        self.journal
            .borrow_mut()
            .push(Call::Render(self.name.clone()));
        Ok(())
    }
}

/// Frames run only when the test calls [`ManualScheduler::run_frame`]
pub struct ManualScheduler {
    now: Cell<f64>,
    pending: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl ManualScheduler {
    pub fn new(start: f64) -> Self {
        ManualScheduler {
            now: Cell::new(start),
            pending: RefCell::new(None),
        }
    }

    pub fn advance(&self, millis: f64) {
        self.now.set(self.now.get() + millis);
    }

    /// Runs the requested frame, false when nothing was requested
    pub fn run_frame(&self) -> bool {
        let callback = self.pending.borrow_mut().take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> Result<()> {
        let mut pending = self.pending.borrow_mut();
        if pending.is_some() {
            return Err(anyhow!("a frame is already requested"));
        }
        *pending = Some(callback);
        Ok(())
    }
}

use crate::board::Board;
use crate::browser;
use crate::resources::{ImageSource, ResourceCache};
use anyhow::{anyhow, Context, Result};
use std::cell::Cell;
use std::rc::Rc;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }
}

/// The 2d drawing surface every frame is drawn into. The engine owns it and
/// lends it to entities while they render.
pub trait Surface {
    type Image;

    fn clear(&self, rect: &Rect);
    fn draw_image(&self, image: &Self::Image, position: Point) -> Result<()>;
}

/// Canvas backed [`Surface`]
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Renderer { context }
    }
}

impl Surface for Renderer {
    type Image = HtmlImageElement;

    fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.position.x,
            rect.position.y,
            rect.size.width,
            rect.size.height,
        );
    }

    fn draw_image(&self, image: &HtmlImageElement, position: Point) -> Result<()> {
        self.context
            .draw_image_with_html_image_element(image, position.x, position.y)
            .map_err(|err| anyhow!("Error drawing image : {:#?}", err))
    }
}

/// Anything the engine updates and draws every frame.
///
/// `update` only changes the entity's own state; all drawing happens in
/// `render`.
pub trait Entity<S: Surface> {
    /// `dt` is the elapsed time since the previous frame in seconds
    fn update(&mut self, dt: f64);
    fn render(&self, surface: &S) -> Result<()>;
}

/// Runs between the update and render passes, every frame
pub type CollisionCheck<S> = Box<dyn FnMut(&mut [Box<dyn Entity<S>>], &mut dyn Entity<S>)>;

/// Per-frame orchestration: update the enemies, check collisions, redraw the
/// board and then every entity back to front.
pub struct Engine<S, L>
where
    S: Surface,
    L: ImageSource<Handle = S::Image>,
{
    surface: S,
    board: Board,
    resources: Rc<ResourceCache<L>>,
    enemies: Vec<Box<dyn Entity<S>>>,
    player: Box<dyn Entity<S>>,
    collision_check: Option<CollisionCheck<S>>,
    // milliseconds
    last_time: f64,
}

impl<S, L> Engine<S, L>
where
    S: Surface,
    L: ImageSource<Handle = S::Image> + 'static,
{
    pub fn new(
        surface: S,
        board: Board,
        resources: Rc<ResourceCache<L>>,
        player: Box<dyn Entity<S>>,
    ) -> Self {
        Engine {
            surface,
            board,
            resources,
            enemies: Vec::new(),
            player,
            collision_check: None,
            last_time: 0.0,
        }
    }

    pub fn with_enemies(mut self, enemies: Vec<Box<dyn Entity<S>>>) -> Self {
        self.enemies = enemies;
        self
    }

    pub fn with_collision_check(
        mut self,
        check: impl FnMut(&mut [Box<dyn Entity<S>>], &mut dyn Entity<S>) + 'static,
    ) -> Self {
        self.collision_check = Some(Box::new(check));
        self
    }

    /// Sets the timing baseline, so the first frame sees a near-zero delta
    pub fn init(&mut self, now: f64) {
        log::info!(
            "[engine] starting with {} enemies on a {}x{} board",
            self.enemies.len(),
            self.board.columns(),
            self.board.rows()
        );
        self.last_time = now;
    }

    /// One loop iteration at time `now` (milliseconds)
    pub fn frame(&mut self, now: f64) -> Result<()> {
        let dt = (now - self.last_time) / 1000.0;

        self.update(dt);
        self.render()?;

        self.last_time = now;
        Ok(())
    }

    fn update(&mut self, dt: f64) {
        for enemy in self.enemies.iter_mut() {
            enemy.update(dt);
        }
        self.check_collisions();
    }

    fn check_collisions(&mut self) {
        if let Some(check) = self.collision_check.as_mut() {
            check(&mut self.enemies, self.player.as_mut());
        }
    }

    fn render(&self) -> Result<()> {
        self.surface.clear(&self.board.bounds());

        // Draw order matters : board -> enemies -> player
        for tile in self.board.tiles() {
            let image = self
                .resources
                .get(tile.image)
                .ok_or_else(|| anyhow!("Tile image '{}' is not loaded", tile.image))?;
            self.surface.draw_image(&image, tile.position)?;
        }

        self.render_entities()
    }

    fn render_entities(&self) -> Result<()> {
        for enemy in self.enemies.iter() {
            enemy.render(&self.surface).context("Rendering enemy")?;
        }
        self.player.render(&self.surface).context("Rendering player")
    }
}

/// Host side of the loop: a clock and a way to run something on the next
/// display refresh.
pub trait FrameScheduler {
    /// milliseconds
    fn now(&self) -> f64;
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> Result<()>;
}

/// `Date.now()` + `requestAnimationFrame`
pub struct AnimationFrameScheduler;

impl FrameScheduler for AnimationFrameScheduler {
    fn now(&self) -> f64 {
        browser::now()
    }

    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> Result<()> {
        browser::request_animation_frame(move |_timestamp: f64| callback())?;
        Ok(())
    }
}

/// Observes and cancels a running [`GameLoop`]
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    stopped: Rc<Cell<bool>>,
    frames: Rc<Cell<u64>>,
}

impl LoopHandle {
    /// The loop exits before its next frame
    pub fn stop(&self) {
        self.stopped.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    /// Frames completed so far
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}

pub struct GameLoop;

impl GameLoop {
    /// Initializes the engine, runs the first frame right away and then
    /// re-arms itself through `scheduler` until the handle is stopped or a
    /// frame fails.
    pub fn start<S, L, F>(mut engine: Engine<S, L>, scheduler: Rc<F>) -> LoopHandle
    where
        S: Surface + 'static,
        L: ImageSource<Handle = S::Image> + 'static,
        F: FrameScheduler + 'static,
    {
        let handle = LoopHandle::default();
        engine.init(scheduler.now());
        Self::tick(engine, scheduler, handle.clone());
        handle
    }

    fn tick<S, L, F>(mut engine: Engine<S, L>, scheduler: Rc<F>, handle: LoopHandle)
    where
        S: Surface + 'static,
        L: ImageSource<Handle = S::Image> + 'static,
        F: FrameScheduler + 'static,
    {
        if handle.is_stopped() {
            log::info!("[engine] loop stopped after {} frames", handle.frames());
            return;
        }

        if let Err(err) = engine.frame(scheduler.now()) {
            log::error!("[engine] frame {} failed, stopping: {:#}", handle.frames(), err);
            handle.stop();
            return;
        }
        handle.frames.set(handle.frames.get() + 1);

        let next = Rc::clone(&scheduler);
        let next_handle = handle.clone();
        let requested =
            scheduler.request_frame(Box::new(move || Self::tick(engine, next, next_handle)));
        if let Err(err) = requested {
            log::error!("[engine] could not schedule next frame: {:#}", err);
            handle.stop();
        }
    }
}

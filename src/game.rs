use crate::board::Board;
use crate::browser;
use crate::config::GameConfig;
use crate::engine::{
    AnimationFrameScheduler, Engine, Entity, FrameScheduler, GameLoop, Renderer, Surface,
};
use crate::entities::{Enemy, Player, Sprite};
use crate::resources::{HtmlImageSource, ImageSource, ResourceCache};
use anyhow::{Context, Result};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

/// Builds the engine for `config`: the board, one player and the enemies,
/// all drawing from `resources`.
pub fn build_engine<S, L>(
    config: &GameConfig,
    surface: S,
    resources: Rc<ResourceCache<L>>,
) -> Engine<S, L>
where
    S: Surface + 'static,
    L: ImageSource<Handle = S::Image> + 'static,
{
    let board = Board::new(&config.board, &config.canvas);

    let player = Player::new(
        Sprite::new(Rc::clone(&resources), config.player.image.as_str()),
        &board,
        config.player.column,
        config.player.row,
    );
    let enemies = config
        .enemies
        .iter()
        .map(|enemy| {
            Box::new(Enemy::new(
                Sprite::new(Rc::clone(&resources), enemy.image.as_str()),
                &board,
                enemy.row,
                enemy.speed,
            )) as Box<dyn Entity<S>>
        })
        .collect();

    Engine::new(surface, board, resources, Box::new(player)).with_enemies(enemies)
}

/// Requests every preload image and starts the loop the first time they are
/// all loaded. A loop that starts is never started again, even if the cache
/// becomes ready a second time.
pub fn launch<S, L, F>(
    config: &GameConfig,
    surface: S,
    resources: Rc<ResourceCache<L>>,
    scheduler: Rc<F>,
) where
    S: Surface + 'static,
    L: ImageSource<Handle = S::Image> + 'static,
    F: FrameScheduler + 'static,
{
    let mut engine = Some(build_engine(config, surface, Rc::clone(&resources)));

    resources.load_all(&config.preload);
    resources.on_ready(move || {
        if let Some(engine) = engine.take() {
            log::info!("[game] resources ready, starting loop");
            GameLoop::start(engine, Rc::clone(&scheduler));
        }
    });
    resources.on_error(|url, _| {
        log::error!("[game] '{}' will never load, the game cannot start", url);
    });
}

/// Browser assembly: canvas, `<img>` loading and `requestAnimationFrame`
pub fn start(config: &GameConfig) -> Result<()> {
    let canvas = browser::create_canvas(config.canvas.width, config.canvas.height)
        .context("Creating the game canvas")?;
    let renderer = Renderer::new(browser::context(&canvas)?);
    let resources = Rc::new(ResourceCache::new(
        HtmlImageSource,
        Box::new(|task: LocalBoxFuture<'static, ()>| browser::spawn_local(task)),
    ));

    launch(config, renderer, resources, Rc::new(AnimationFrameScheduler));
    Ok(())
}

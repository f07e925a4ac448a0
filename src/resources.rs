use crate::browser;
use anyhow::{anyhow, Error, Result};
// ELI5: wasm runs on one thread, so Rc + RefCell instead of Arc + Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlImageElement;

/// Where images come from. The browser implementation is [`HtmlImageSource`];
/// anything that can asynchronously turn a URL into a handle will do.
#[async_trait(?Send)]
pub trait ImageSource {
    type Handle: Clone + 'static;

    async fn fetch(&self, url: &str) -> Result<Self::Handle>;
}

/// Runs a load task to completion on the local executor
pub type Spawner = Box<dyn Fn(LocalBoxFuture<'static, ()>)>;

type ReadyCallback = Box<dyn FnMut()>;
type ErrorCallback = Box<dyn FnMut(&str, &Error)>;

/// Image cache keyed by URL.
///
/// Every URL is requested at most once. An entry is `None` while its load is
/// outstanding (or failed) and `Some(handle)` once loaded.
///
/// Ready-callbacks stay registered for the lifetime of the cache. Readiness
/// is re-checked after each completed load; every time the cache is fully
/// loaded at that point, all callbacks run in registration order. A callback
/// registered while the cache is already ready does not run until a later
/// load completes.
///
/// A failed load is reported to the error-callbacks and stays pending, so the
/// cache never becomes ready again. There is no timeout.
pub struct ResourceCache<S: ImageSource> {
    source: Rc<S>,
    spawner: Spawner,
    entries: RefCell<HashMap<String, Option<S::Handle>>>,
    ready_callbacks: RefCell<Vec<ReadyCallback>>,
    error_callbacks: RefCell<Vec<ErrorCallback>>,
    // set while ready-callbacks run; a transition caused by one of them is
    // recorded in `ready_again` and dispatched once they return
    notifying: Cell<bool>,
    ready_again: Cell<bool>,
}

impl<S: ImageSource + 'static> ResourceCache<S> {
    pub fn new(source: S, spawner: Spawner) -> Self {
        ResourceCache {
            source: Rc::new(source),
            spawner,
            entries: RefCell::new(HashMap::new()),
            ready_callbacks: RefCell::new(Vec::new()),
            error_callbacks: RefCell::new(Vec::new()),
            notifying: Cell::new(false),
            ready_again: Cell::new(false),
        }
    }

    /// Request a single image. No-op when the URL is cached or pending.
    pub fn load(self: &Rc<Self>, url: &str) {
        if !self.request(url) {
            log::debug!("[resources] '{}' already requested", url);
            return;
        }

        let cache = Rc::clone(self);
        let source = Rc::clone(&self.source);
        let url = url.to_owned();
        (self.spawner)(Box::pin(async move {
            let result = source.fetch(&url).await;
            cache.complete(&url, result);
        }));
    }

    /// Request every image in order
    pub fn load_all<I>(self: &Rc<Self>, urls: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for url in urls {
            self.load(url.as_ref());
        }
    }

    /// The loaded handle, or `None` while pending or when never requested
    pub fn get(&self, url: &str) -> Option<S::Handle> {
        self.entries.borrow().get(url).cloned().flatten()
    }

    pub fn is_ready(&self) -> bool {
        self.entries.borrow().values().all(Option::is_some)
    }

    pub fn on_ready(&self, callback: impl FnMut() + 'static) {
        self.ready_callbacks.borrow_mut().push(Box::new(callback));
    }

    pub fn on_error(&self, callback: impl FnMut(&str, &Error) + 'static) {
        self.error_callbacks.borrow_mut().push(Box::new(callback));
    }

    /// Marks `url` pending, returns false when it was already known
    fn request(&self, url: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(url) {
            return false;
        }
        entries.insert(url.to_owned(), None);
        true
    }

    fn complete(&self, url: &str, result: Result<S::Handle>) {
        match result {
            Ok(handle) => {
                self.entries
                    .borrow_mut()
                    .insert(url.to_owned(), Some(handle));
                log::debug!("[resources] loaded '{}'", url);

                if self.is_ready() {
                    self.notify_ready();
                }
            }
            Err(err) => {
                log::error!("[resources] failed to load '{}': {:#}", url, err);
                self.notify_error(url, &err);
            }
        }
    }

    fn notify_ready(&self) {
        if self.notifying.replace(true) {
            self.ready_again.set(true);
            return;
        }

        loop {
            self.ready_again.set(false);

            // callbacks may call back into the cache, so none of our borrows
            // can be held while they run
            let mut callbacks = std::mem::take(&mut *self.ready_callbacks.borrow_mut());
            log::debug!("[resources] ready, notifying {} callback(s)", callbacks.len());
            for callback in callbacks.iter_mut() {
                callback();
            }

            let mut registered = self.ready_callbacks.borrow_mut();
            callbacks.append(&mut *registered);
            *registered = callbacks;

            if !self.ready_again.get() {
                break;
            }
        }
        self.notifying.set(false);
    }

    fn notify_error(&self, url: &str, err: &Error) {
        let mut callbacks = std::mem::take(&mut *self.error_callbacks.borrow_mut());
        for callback in callbacks.iter_mut() {
            callback(url, err);
        }

        let mut registered = self.error_callbacks.borrow_mut();
        callbacks.append(&mut *registered);
        *registered = callbacks;
    }
}

/// Loads images through `<img>` elements
pub struct HtmlImageSource;

#[async_trait(?Send)]
impl ImageSource for HtmlImageSource {
    type Handle = HtmlImageElement;

    async fn fetch(&self, url: &str) -> Result<HtmlImageElement> {
        load_image(url).await
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let source_url = source.to_owned();
    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "Error loading image '{}': {:#?}",
                source_url,
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callbacks alive until the image loads or errors
    success_callback.forget();
    error_callback.forget();

    // Result<Result<(), Error>, oneshot::Canceled>
    // - outer: channel dropped before either callback ran
    // - inner: the load outcome
    rx.await??;

    Ok(image)
}

use anyhow::{anyhow, Result};
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosureFnOnce};
use wasm_bindgen::JsCast;

#[rustfmt::skip]
use web_sys::{
    Document,
    Window,
    CanvasRenderingContext2d,
    HtmlCanvasElement,
    HtmlImageElement,
};

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CANVAS: &str = "canvas";
    pub const CONTEXT_2D: &str = "2d";
}

pub fn new_image() -> Result<HtmlImageElement> {
    HtmlImageElement::new()
        .map_err(|err| anyhow!("Could not create image element : {:#?}", err))
}

/// Create a `<canvas>` of the given size and append it to the document body
pub fn create_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement> {
    let document = document()?;
    let canvas = document
        .create_element(html::CANVAS)
        .map_err(|err| anyhow!("Could not create canvas element : {:#?}", err))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))?;
    canvas.set_width(width);
    canvas.set_height(height);

    document
        .body()
        .ok_or_else(|| anyhow!("No Body Found"))?
        .append_child(&canvas)
        .map_err(|err| anyhow!("Could not append canvas to body : {:#?}", err))?;

    Ok(canvas)
}

pub fn context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue>
        // - JsValue error -> anyhow
        // - None -> "no context" error
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

/// Milliseconds since the epoch, the same clock the frame deltas are
/// computed against
pub fn now() -> f64 {
    js_sys::Date::now()
}

/// Schedule `f` for the next display refresh. The closure is released by
/// wasm-bindgen once the browser has invoked it.
pub fn request_animation_frame<F>(f: F) -> Result<i32>
where
    F: FnOnce(f64) + 'static,
{
    let callback = Closure::once_into_js(move |timestamp: f64| f(timestamp));
    window()?
        .request_animation_frame(callback.unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame : {:#?}", err))
}

pub fn closure_once<F, A, R>(f: F) -> Closure<F::FnMut>
where
    F: 'static + WasmClosureFnOnce<A, R>,
{
    Closure::once(f)
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

//! Host backed by the page's `performance` object
//!
//! Capabilities are detected once at construction: the User Timing
//! functions, `PerformanceObserver`, the non-standard `performance.memory`
//! sampler, and a `document.body` for the layout probe.

use futures::future::{FutureExt, LocalBoxFuture};
use js_sys::{Array, Function, Promise, Reflect};
use std::cell::RefCell;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    HtmlElement, Performance, PerformanceEntry as JsPerformanceEntry, PerformanceObserver,
    PerformanceObserverEntryList, PerformanceObserverInit, Window,
};

use super::{Capabilities, EntryReceiver, EntryType, PerformanceEntry, PerformanceHost};
use crate::error::TrackerError;

type ObserverCallback = Closure<dyn FnMut(PerformanceObserverEntryList, PerformanceObserver)>;

struct ActiveObserver {
    observer: PerformanceObserver,
    sender: mpsc::UnboundedSender<PerformanceEntry>,
    _callback: ObserverCallback,
}

/// Host for code running inside a browser page
pub struct BrowserHost {
    window: Window,
    performance: Performance,
    capabilities: Capabilities,
    observers: RefCell<Vec<ActiveObserver>>,
}

impl BrowserHost {
    /// Bind to the current window
    ///
    /// Returns `None` outside a window context (workers, node).
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let performance = window.performance()?;
        let capabilities = Self::detect(&window, &performance);
        debug!("Browser host capabilities: {:?}", capabilities);

        Some(Self {
            window,
            performance,
            capabilities,
            observers: RefCell::new(Vec::new()),
        })
    }

    fn detect(window: &Window, performance: &Performance) -> Capabilities {
        let has_fn = |name: &str| {
            Reflect::get(performance, &JsValue::from_str(name))
                .map(|v| v.is_function())
                .unwrap_or(false)
        };
        let observer = Reflect::has(window, &JsValue::from_str("PerformanceObserver"))
            .unwrap_or(false);
        let heap_usage = Reflect::get(performance, &JsValue::from_str("memory"))
            .map(|v| v.is_object())
            .unwrap_or(false);
        let document = window.document().and_then(|d| d.body()).is_some();

        Capabilities {
            marks: has_fn("mark"),
            measures: has_fn("measure"),
            observer,
            heap_usage,
            document,
        }
    }

    /// Disconnect observers whose subscriber went away
    fn prune_observers(&self) {
        self.observers.borrow_mut().retain(|active| {
            if active.sender.is_closed() {
                active.observer.disconnect();
                false
            } else {
                true
            }
        });
    }

    fn convert(entry: &JsPerformanceEntry) -> Option<PerformanceEntry> {
        let entry_type = EntryType::parse(&entry.entry_type())?;
        let duration = finite_duration(entry.duration());

        Some(PerformanceEntry {
            name: entry.name(),
            entry_type,
            start_time: entry.start_time(),
            duration,
        })
    }
}

/// Some layout-shift entries report no duration
fn finite_duration(duration: f64) -> Option<f64> {
    Some(duration).filter(|d| !d.is_nan())
}

impl PerformanceHost for BrowserHost {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn now(&self) -> f64 {
        self.performance.now()
    }

    fn mark(&self, name: &str) {
        if let Err(e) = self.performance.mark(name) {
            debug!("performance.mark('{}') failed: {:?}", name, e);
        }
    }

    fn measure(&self, name: &str, start_mark: &str, end_mark: &str) {
        if let Err(e) = self
            .performance
            .measure_with_start_mark_and_end_mark(name, start_mark, end_mark)
        {
            debug!("performance.measure('{}') failed: {:?}", name, e);
        }
    }

    fn observe(&self, entry_types: &[EntryType]) -> Result<EntryReceiver, TrackerError> {
        if !self.capabilities.observer {
            return Err(TrackerError::ObserverUnsupported);
        }
        self.prune_observers();

        let (sender, receiver) = mpsc::unbounded_channel();
        let callback_sender = sender.clone();
        let callback: ObserverCallback = Closure::wrap(Box::new(
            move |list: PerformanceObserverEntryList, observer: PerformanceObserver| {
                for value in list.get_entries().iter() {
                    let Ok(entry) = value.dyn_into::<JsPerformanceEntry>() else {
                        continue;
                    };
                    if let Some(entry) = Self::convert(&entry) {
                        if callback_sender.send(entry).is_err() {
                            observer.disconnect();
                            return;
                        }
                    }
                }
            },
        ) as Box<dyn FnMut(PerformanceObserverEntryList, PerformanceObserver)>);

        let observer = PerformanceObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| TrackerError::ObserverFailed(format!("{:?}", e)))?;

        let types: Array = entry_types
            .iter()
            .map(|t| JsValue::from_str(t.as_str()))
            .collect();
        let init = js_sys::Object::new();
        Reflect::set(&init, &JsValue::from_str("entryTypes"), &types)
            .map_err(|e| TrackerError::ObserverFailed(format!("{:?}", e)))?;

        observer
            .observe_with_options(init.unchecked_ref::<PerformanceObserverInit>())
            .map_err(|e| {
                warn!("PerformanceObserver.observe rejected entry types: {:?}", e);
                TrackerError::ObserverFailed(format!("{:?}", e))
            })?;

        self.observers.borrow_mut().push(ActiveObserver {
            observer,
            sender,
            _callback: callback,
        });
        Ok(receiver)
    }

    fn heap_used_bytes(&self) -> u64 {
        Reflect::get(&self.performance, &JsValue::from_str("memory"))
            .and_then(|memory| Reflect::get(&memory, &JsValue::from_str("usedJSHeapSize")))
            .ok()
            .and_then(|v| v.as_f64())
            .map(|bytes| bytes as u64)
            .unwrap_or(0)
    }

    fn force_layout(&self) {
        let Some(document) = self.window.document() else {
            return;
        };
        let Some(body) = document.body() else {
            return;
        };
        let Ok(element) = document.create_element("div") else {
            return;
        };

        let _ = element.set_attribute("style", "width: 100px; height: 100px; background: red;");
        if body.append_child(&element).is_err() {
            return;
        }
        if let Ok(html) = element.clone().dyn_into::<HtmlElement>() {
            // Reading offsetHeight forces style and layout
            let _ = html.offset_height();
        }
        let _ = body.remove_child(&element);
    }

    fn next_frame(&self) -> LocalBoxFuture<'static, f64> {
        let (tx, rx) = oneshot::channel::<f64>();
        let callback = Closure::once_into_js(move |timestamp: f64| {
            let _ = tx.send(timestamp);
        });
        let scheduled = self
            .window
            .request_animation_frame(callback.unchecked_ref::<Function>());
        let performance = self.performance.clone();

        async move {
            if scheduled.is_err() {
                return performance.now();
            }
            rx.await.unwrap_or_else(|_| performance.now())
        }
        .boxed_local()
    }

    fn settle(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        let window = self.window.clone();
        let timeout = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let promise = Promise::new(&mut |resolve, _reject| {
            if window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout)
                .is_err()
            {
                let _ = resolve.call0(&JsValue::UNDEFINED);
            }
        });

        async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local()
    }
}

//! Toast stack, loading overlay and auto-save banners.
//!
//! State lives in [`NotificationQueue`], a plain model driven by the
//! [`NotificationCenter`] through Leptos signals; the [`Overlay`] component
//! renders it into a fixed container appended to `<body>`.

use gloo::timers::callback::Timeout;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::UiConfig;

pub type NotificationId = String;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl NotificationKind {
    /// Unknown names fall back to `Info`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Success => "#00ff00",
            Self::Error => "#ff0040",
            Self::Warning => "#ffff00",
            Self::Info => "#00ffff",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "fas fa-check-circle",
            Self::Error => "fas fa-exclamation-triangle",
            Self::Warning => "fas fa-exclamation-circle",
            Self::Info => "fas fa-info-circle",
        }
    }
}

/// Duration as passed from JavaScript. Absent keeps the configured default;
/// zero, negative or NaN keeps the toast open until it is closed.
pub fn duration_from_js(duration_ms: Option<f64>) -> Option<u32> {
    duration_ms.map(|ms| {
        if ms.is_nan() || ms <= 0.0 {
            0
        } else {
            // Browsers treat delays past i32::MAX as zero.
            ms.ceil().min(f64::from(i32::MAX)) as u32
        }
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: f64,
    pub duration_ms: u32,
    pub closing: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotificationQueue {
    items: Vec<Notification>,
    max_visible: Option<usize>,
    last_stamp: u64,
    same_stamp: u32,
}

impl NotificationQueue {
    pub fn new(max_visible: Option<usize>) -> Self {
        Self {
            max_visible: max_visible.map(|n| n.max(1)),
            ..Self::default()
        }
    }

    /// Appends a toast. Returns its id and the ids of older toasts that must
    /// start closing to respect the visible bound.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration_ms: u32,
        now_ms: f64,
    ) -> (NotificationId, Vec<NotificationId>) {
        let id = self.next_id(now_ms);
        self.items.push(Notification {
            id: id.clone(),
            message: message.into(),
            kind,
            created_at: now_ms,
            duration_ms,
            closing: false,
        });

        let mut evicted = Vec::new();
        if let Some(max) = self.max_visible {
            let mut open = self.items.iter().filter(|n| !n.closing).count();
            for item in self.items.iter_mut().filter(|n| !n.closing) {
                if open <= max {
                    break;
                }
                item.closing = true;
                evicted.push(item.id.clone());
                open -= 1;
            }
        }
        (id, evicted)
    }

    fn next_id(&mut self, now_ms: f64) -> NotificationId {
        let stamp = now_ms.max(0.0) as u64;
        if stamp == self.last_stamp && !self.items.is_empty() {
            self.same_stamp += 1;
            format!("notification-{stamp}-{}", self.same_stamp)
        } else {
            self.last_stamp = stamp;
            self.same_stamp = 0;
            format!("notification-{stamp}")
        }
    }

    /// Marks a toast as leaving. False for unknown or already closing ids.
    pub fn begin_close(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(item) if !item.closing => {
                item.closing = true;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        before != self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn is_closing(&self, id: &str) -> bool {
        self.get(id).is_some_and(|n| n.closing)
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Ids of the transient "saved" banners currently on screen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Banners {
    next: u64,
    live: Vec<u64>,
}

impl Banners {
    pub fn push(&mut self) -> u64 {
        self.next += 1;
        self.live.push(self.next);
        self.next
    }

    pub fn remove(&mut self, id: u64) {
        self.live.retain(|b| *b != id);
    }

    pub fn live(&self) -> &[u64] {
        &self.live
    }
}

/// Pending-request counter behind the loading overlay.
#[derive(Clone, Copy)]
pub struct BusyIndicator {
    pending: RwSignal<u32>,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self {
            pending: RwSignal::new(0),
        }
    }

    /// Shows the overlay until the returned guard is dropped.
    pub fn hold(&self) -> BusyGuard {
        self.pending.update(|n| *n += 1);
        BusyGuard {
            pending: self.pending,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.get_untracked() > 0
    }
}

impl Default for BusyIndicator {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BusyGuard {
    pending: RwSignal<u32>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.pending.update(|n| *n = n.saturating_sub(1));
    }
}

#[derive(Clone, Copy)]
pub struct NotificationCenter {
    queue: RwSignal<NotificationQueue>,
    banners: RwSignal<Banners>,
    busy: BusyIndicator,
    default_duration_ms: u32,
    exit_ms: u32,
    banner_ms: u32,
}

impl NotificationCenter {
    pub fn new(config: &UiConfig) -> Self {
        Self {
            queue: RwSignal::new(NotificationQueue::new(config.max_notifications)),
            banners: RwSignal::new(Banners::default()),
            busy: BusyIndicator::new(),
            default_duration_ms: config.notification_duration_ms,
            exit_ms: config.notification_exit_ms,
            banner_ms: config.autosave_indicator_ms,
        }
    }

    pub fn busy(&self) -> BusyIndicator {
        self.busy
    }

    pub fn show(&self, message: impl Into<String>) -> NotificationId {
        self.show_with(message, NotificationKind::Info, None)
    }

    /// `duration_ms` of `None` uses the configured default; `Some(0)` keeps
    /// the toast until it is closed.
    pub fn show_with(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration_ms: Option<u32>,
    ) -> NotificationId {
        let duration = duration_ms.unwrap_or(self.default_duration_ms);
        let message = message.into();
        log::debug!("notification ({kind:?}): {message}");

        let mut pushed = None;
        self.queue
            .update(|q| pushed = Some(q.push(message, kind, duration, js_sys::Date::now())));
        let (id, evicted) = pushed.unwrap_or_default();

        for old in evicted {
            self.schedule_removal(old);
        }
        if duration > 0 {
            let center = *self;
            let expiring = id.clone();
            Timeout::new(duration, move || center.close(&expiring)).forget();
        }
        id
    }

    /// Plays the exit transition, then drops the node. Unknown ids are ignored.
    pub fn close(&self, id: &str) {
        let mut started = false;
        self.queue.update(|q| started = q.begin_close(id));
        if started {
            self.schedule_removal(id.to_string());
        }
    }

    fn schedule_removal(&self, id: NotificationId) {
        let queue = self.queue;
        Timeout::new(self.exit_ms, move || {
            queue.update(|q| {
                q.remove(&id);
            });
        })
        .forget();
    }

    pub fn show_saved_banner(&self) {
        let mut id = 0;
        self.banners.update(|b| id = b.push());
        let banners = self.banners;
        Timeout::new(self.banner_ms, move || banners.update(|b| b.remove(id))).forget();
    }

    pub fn len(&self) -> usize {
        self.queue.with_untracked(|q| q.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const CONTAINER_STYLE: &str =
    "position: fixed; top: 20px; right: 20px; z-index: 10000; max-width: 400px;";
const BANNER_STYLE: &str = "position: fixed; top: 20px; right: 20px; background: rgba(0, 255, 0, 0.9); color: #000; padding: 0.5rem 1rem; border-radius: 5px; z-index: 9999; animation: fadeInOut 3s ease-in-out forwards;";

fn toast_style(kind: NotificationKind, closing: bool) -> String {
    let color = kind.color();
    let animation = if closing {
        "slideOutRight 0.5s ease-out forwards"
    } else {
        "slideInRight 0.5s ease-out"
    };
    format!("background: rgba(0, 0, 0, 0.9); border: 2px solid {color}; border-radius: 10px; padding: 1rem; margin-bottom: 1rem; box-shadow: 0 0 20px {color}40; animation: {animation}; backdrop-filter: blur(10px);")
}

fn loading_style(visible: bool) -> String {
    format!(
        "position: fixed; top: 0; left: 0; width: 100%; height: 100%; background: rgba(0, 0, 0, 0.9); display: {}; justify-content: center; align-items: center; z-index: 9999;",
        if visible { "flex" } else { "none" }
    )
}

#[component]
pub fn Overlay(center: NotificationCenter) -> impl IntoView {
    let queue = center.queue;
    let banners = center.banners;
    let pending = center.busy.pending;

    view! {
        <div id="notification-container" style=CONTAINER_STYLE>
            <For
                each=move || queue.with(|q| q.items().to_vec())
                key=|n| n.id.clone()
                let:notification
            >
                <Toast center=center notification=notification />
            </For>
        </div>
        <div id="cyber-loading-spinner" style=move || loading_style(pending.get() > 0)>
            <div class="cyber-spinner">
                <div class="cyber-spinner-ring"></div>
                <div class="cyber-spinner-ring"></div>
                <div class="cyber-spinner-ring"></div>
                <div class="cyber-spinner-text">"CARGANDO..."</div>
            </div>
        </div>
        <For each=move || banners.with(|b| b.live().to_vec()) key=|id| *id let:_banner>
            <div class="autosave-indicator" style=BANNER_STYLE>
                <i class="fas fa-save"></i>
                " Guardado automáticamente"
            </div>
        </For>
    }
}

#[component]
fn Toast(center: NotificationCenter, notification: Notification) -> impl IntoView {
    let Notification {
        id, message, kind, ..
    } = notification;
    let queue = center.queue;
    let watched = id.clone();
    let closed = id.clone();

    view! {
        <div
            id=id
            class="cyber-notification"
            style=move || toast_style(kind, queue.with(|q| q.is_closing(&watched)))
        >
            <div class="notification-content">
                <i class=kind.icon()></i>
                <span class="notification-message">{message}</span>
                <button class="notification-close" on:click=move |_| center.close(&closed)>
                    <i class="fas fa-times"></i>
                </button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_keep_insertion_order() {
        let mut queue = NotificationQueue::new(None);
        let (a, _) = queue.push("uno", NotificationKind::Info, 5000, 1000.0);
        let (b, _) = queue.push("dos", NotificationKind::Success, 5000, 1001.0);
        let (c, _) = queue.push("tres", NotificationKind::Error, 0, 1002.0);
        let ids: Vec<_> = queue.items().iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(queue.items()[0].id, "notification-1000");
    }

    #[test]
    fn same_millisecond_ids_stay_unique() {
        let mut queue = NotificationQueue::new(None);
        let (a, _) = queue.push("a", NotificationKind::Info, 0, 42.0);
        let (b, _) = queue.push("b", NotificationKind::Info, 0, 42.0);
        let (c, _) = queue.push("c", NotificationKind::Info, 0, 42.0);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(b, "notification-42-1");
    }

    #[test]
    fn close_keeps_node_until_removed() {
        let mut queue = NotificationQueue::new(None);
        let (id, _) = queue.push("hola", NotificationKind::Info, 5000, 0.0);

        assert!(queue.begin_close(&id));
        assert!(queue.is_closing(&id));
        assert_eq!(queue.len(), 1);
        assert!(!queue.begin_close(&id));

        assert!(queue.remove(&id));
        assert!(queue.is_empty());
    }

    #[test]
    fn closing_unknown_id_is_noop() {
        let mut queue = NotificationQueue::new(None);
        queue.push("hola", NotificationKind::Info, 5000, 0.0);
        assert!(!queue.begin_close("notification-999"));
        assert!(!queue.remove("notification-999"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn bound_evicts_oldest_open_toast() {
        let mut queue = NotificationQueue::new(Some(2));
        let (first, _) = queue.push("1", NotificationKind::Info, 0, 1.0);
        let (second, _) = queue.push("2", NotificationKind::Info, 0, 2.0);
        let (_, evicted) = queue.push("3", NotificationKind::Info, 0, 3.0);
        assert_eq!(evicted, vec![first.clone()]);
        assert!(queue.is_closing(&first));
        assert!(!queue.is_closing(&second));

        let (_, evicted) = queue.push("4", NotificationKind::Info, 0, 4.0);
        assert_eq!(evicted, vec![second]);
    }

    #[test]
    fn unbounded_queue_never_evicts() {
        let mut queue = NotificationQueue::new(None);
        for i in 0..50 {
            let (_, evicted) = queue.push("x", NotificationKind::Info, 0, f64::from(i));
            assert!(evicted.is_empty());
        }
        assert_eq!(queue.len(), 50);
    }

    #[test]
    fn kind_parsing_and_palette() {
        assert_eq!(NotificationKind::parse("Error"), NotificationKind::Error);
        assert_eq!(NotificationKind::parse("bogus"), NotificationKind::Info);
        assert_eq!(NotificationKind::Warning.color(), "#ffff00");
        assert_eq!(NotificationKind::Success.icon(), "fas fa-check-circle");
    }

    #[test]
    fn closing_style_switches_animation() {
        assert!(toast_style(NotificationKind::Info, false).contains("slideInRight"));
        let closing = toast_style(NotificationKind::Error, true);
        assert!(closing.contains("slideOutRight 0.5s"));
        assert!(closing.contains("#ff0040"));
    }

    #[test]
    fn js_durations_at_or_below_zero_persist() {
        assert_eq!(duration_from_js(None), None);
        assert_eq!(duration_from_js(Some(-1.0)), Some(0));
        assert_eq!(duration_from_js(Some(0.0)), Some(0));
        assert_eq!(duration_from_js(Some(f64::NAN)), Some(0));
        assert_eq!(duration_from_js(Some(3000.0)), Some(3000));
        assert_eq!(duration_from_js(Some(0.4)), Some(1));
        assert_eq!(duration_from_js(Some(1e12)), Some(i32::MAX as u32));
    }

    #[test]
    fn banners_expire_individually() {
        let mut banners = Banners::default();
        let a = banners.push();
        let b = banners.push();
        banners.remove(a);
        assert_eq!(banners.live(), &[b]);
    }

    #[test]
    fn busy_guard_pairs_show_and_hide() {
        let busy = BusyIndicator::new();
        assert!(!busy.is_busy());
        {
            let _outer = busy.hold();
            let inner = busy.hold();
            assert!(busy.is_busy());
            drop(inner);
            assert!(busy.is_busy());
        }
        assert!(!busy.is_busy());
    }
}

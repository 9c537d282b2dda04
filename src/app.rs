use std::cell::RefCell;
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::actions::{self, ActionRequest};
use crate::autosave::AutoSave;
use crate::bindings::{self, Behavior, Binding, Phase};
use crate::cards::CardController;
use crate::config::UiConfig;
use crate::error::{Result, UiError};
use crate::interaction::InteractionEffects;
use crate::notifications::{self, NotificationCenter, NotificationKind, Overlay};
use crate::request::{self, RequestGateway};
use crate::subscriptions::Subscriptions;
use crate::validation::{self, FormValidator};
use crate::{layout, particles, reveal, theme, widgets};

/// Everything a handler may need, built once at mount and shared by reference.
pub struct AppContext {
    pub config: UiConfig,
    pub notifications: NotificationCenter,
    pub gateway: RequestGateway,
}

impl AppContext {
    fn effects(&self) -> InteractionEffects {
        InteractionEffects {
            ripple_ms: self.config.ripple_ms,
            glow_ms: self.config.glow_ms,
        }
    }

    fn apply(&self, binding: &Binding, subs: &mut Subscriptions) -> Result<()> {
        let selector = binding.selector;
        match binding.behavior {
            Behavior::HoverCard => self.effects().bind_cards(selector, subs),
            Behavior::HoverButton => self.effects().bind_buttons(selector, subs),
            Behavior::ScrollReveal => reveal::bind_scroll_reveal(selector, subs)?,
            Behavior::ExpandCard => CardController::bind_expansion(selector, subs),
            Behavior::FilterCards => CardController::bind_filters(selector, subs),
            Behavior::SortCards => CardController::bind_sorting(selector, subs),
            Behavior::ValidateForm => FormValidator::new(self.notifications).bind(selector, subs),
            Behavior::FocusGlow => validation::bind_focus_effects(selector, subs),
            Behavior::AutoSave => AutoSave::new(self.notifications, self.config.autosave_debounce_ms)
                .bind(selector, subs),
            Behavior::ModalTransition => widgets::bind_modals(selector, subs),
            Behavior::Tooltip => {
                let created = widgets::init_tooltips(selector);
                log::debug!("{created} tooltips initialised");
            }
            Behavior::CountUp => reveal::bind_counters(
                selector,
                self.config.counter_duration_ms,
                self.config.counter_tick_ms,
                subs,
            )?,
            Behavior::Calendar => widgets::init_calendar(selector),
        }
        Ok(())
    }

    fn apply_phase(&self, phase: Phase, subs: &mut Subscriptions) {
        for binding in bindings::in_phase(phase) {
            if let Err(err) = self.apply(binding, subs) {
                log::warn!("binding {:?} on {} failed: {err}", binding.behavior, binding.selector);
            }
        }
    }

    async fn run(&self, action: ActionRequest) -> Result<Value> {
        actions::perform(&self.gateway, action, request::fetch).await
    }
}

fn run_ready_phase(context: &AppContext, subs: &Weak<RefCell<Subscriptions>>) {
    let Some(subs) = subs.upgrade() else {
        return;
    };
    context.apply_phase(Phase::Ready, &mut subs.borrow_mut());
    log::info!("diario ready");
}

fn to_js(value: &Value) -> std::result::Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| UiError::from(e).into())
}

fn object_from_js(data: JsValue) -> Result<Map<String, Value>> {
    if data.is_undefined() || data.is_null() {
        return Ok(Map::new());
    }
    Ok(serde_wasm_bindgen::from_value(data)?)
}

/// The page's handle on the UI. Construct it with `Diario.mount()` once the
/// module is loaded and keep it for the page's lifetime.
#[wasm_bindgen]
pub struct Diario {
    context: Rc<AppContext>,
    subs: Rc<RefCell<Subscriptions>>,
}

#[wasm_bindgen]
impl Diario {
    pub fn mount() -> std::result::Result<Diario, JsValue> {
        console_error_panic_hook::set_once();
        _ = console_log::init_with_level(log::Level::Trace);
        let config = UiConfig::from_document();
        log::set_max_level(config.level().to_level_filter());
        log::info!("Iniciando Diario Sic Parvis Magna...");

        let body = document().body().ok_or(UiError::MissingElement("body"))?;
        let notifications = NotificationCenter::new(&config);
        leptos::mount::mount_to(body, move || view! { <Overlay center=notifications /> }).forget();

        let gateway = RequestGateway::from_document(notifications);
        let context = Rc::new(AppContext {
            config,
            notifications,
            gateway,
        });
        let subs = Rc::new(RefCell::new(Subscriptions::new()));

        theme::start(context.config.theme_refresh_ms, &mut subs.borrow_mut());
        if let Err(err) = particles::start(context.config.particle_count, &subs) {
            log::warn!("particle background unavailable: {err}");
        }
        {
            let mut registry = subs.borrow_mut();
            context.apply_phase(Phase::Mount, &mut registry);
            layout::bind(context.config.mobile_breakpoint_px, &mut registry);
            widgets::bind_shortcuts(&mut registry);
        }

        let weak = Rc::downgrade(&subs);
        if document().ready_state() == "loading" {
            let ready_context = context.clone();
            subs.borrow_mut()
                .listen("dom-ready", &document(), "DOMContentLoaded", move |_| {
                    run_ready_phase(&ready_context, &weak);
                });
        } else {
            run_ready_phase(&context, &weak);
        }

        log::debug!("{} subscriptions active", subs.borrow().len());
        Ok(Diario { context, subs })
    }

    #[wasm_bindgen(js_name = toggleHabito)]
    pub fn toggle_habito(&self, habito_id: JsValue, completado: bool) -> js_sys::Promise {
        let habit_id = match serde_wasm_bindgen::from_value::<Value>(habito_id) {
            Ok(id) => id,
            Err(err) => return js_sys::Promise::reject(&UiError::from(err).into()),
        };
        self.dispatch(actions::toggle_habit(
            &self.context.config.endpoints,
            habit_id,
            completado,
        ))
    }

    #[wasm_bindgen(js_name = updateEudaimonia)]
    pub fn update_eudaimonia(&self, area_id: JsValue, data: JsValue) -> js_sys::Promise {
        let parsed = serde_wasm_bindgen::from_value::<Value>(area_id)
            .map_err(UiError::from)
            .and_then(|id| Ok((id, object_from_js(data)?)));
        match parsed {
            Ok((area_id, data)) => self.dispatch(actions::update_wellbeing_area(
                &self.context.config.endpoints,
                area_id,
                data,
            )),
            Err(err) => js_sys::Promise::reject(&err.into()),
        }
    }

    #[wasm_bindgen(js_name = saveGnosisContent)]
    pub fn save_gnosis_content(&self, data: JsValue) -> js_sys::Promise {
        match object_from_js(data) {
            Ok(data) => self.dispatch(actions::save_note(&self.context.config.endpoints, data)),
            Err(err) => js_sys::Promise::reject(&err.into()),
        }
    }

    #[wasm_bindgen(js_name = showNotification)]
    pub fn show_notification(
        &self,
        message: String,
        kind: Option<String>,
        duration_ms: Option<f64>,
    ) -> String {
        let kind = kind
            .as_deref()
            .map(NotificationKind::parse)
            .unwrap_or_default();
        self.context
            .notifications
            .show_with(message, kind, notifications::duration_from_js(duration_ms))
    }

    #[wasm_bindgen(js_name = closeNotification)]
    pub fn close_notification(&self, id: String) {
        self.context.notifications.close(&id);
    }

    /// Removes every listener, timer and observer this handle installed.
    pub fn teardown(&self) {
        self.subs.borrow_mut().teardown();
    }
}

impl Diario {
    fn dispatch(&self, action: ActionRequest) -> js_sys::Promise {
        let context = self.context.clone();
        future_to_promise(async move {
            let response = context.run(action).await?;
            to_js(&response)
        })
    }
}

use std::future::Future;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Endpoints;
use crate::error::Result;
use crate::notifications::NotificationKind;
use crate::request::{Notify, Outbound, RequestGateway, RequestOptions};

/// A domain call ready for the gateway: where it goes, what it carries and
/// what to tell the user when the backend reports success.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionRequest {
    pub endpoint: String,
    pub body: Value,
    pub success_message: &'static str,
}

#[derive(Serialize)]
struct HabitToggle {
    habito_id: Value,
    completado: bool,
}

pub fn toggle_habit(endpoints: &Endpoints, habit_id: Value, completed: bool) -> ActionRequest {
    let body = serde_json::to_value(HabitToggle {
        habito_id: habit_id,
        completado: completed,
    })
    .unwrap_or(Value::Null);
    ActionRequest {
        endpoint: endpoints.habit_toggle.clone(),
        body,
        success_message: "Hábito actualizado correctamente",
    }
}

/// `area_id` comes first; extra fields are spread after it and may overwrite it.
pub fn update_wellbeing_area(
    endpoints: &Endpoints,
    area_id: Value,
    data: Map<String, Value>,
) -> ActionRequest {
    let mut body = Map::new();
    body.insert("area_id".to_string(), area_id);
    body.extend(data);
    ActionRequest {
        endpoint: endpoints.wellbeing_update.clone(),
        body: Value::Object(body),
        success_message: "Área actualizada correctamente",
    }
}

pub fn save_note(endpoints: &Endpoints, data: Map<String, Value>) -> ActionRequest {
    ActionRequest {
        endpoint: endpoints.note_create.clone(),
        body: Value::Object(data),
        success_message: "Contenido guardado correctamente",
    }
}

/// True when the backend answered `{ "success": true, ... }`.
pub fn reports_success(response: &Value) -> bool {
    response
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Posts `action` through the gateway and confirms it with a success toast
/// when the backend says so. Failures were already toasted by the gateway.
pub async fn perform<N, F, Fut>(
    gateway: &RequestGateway<N>,
    action: ActionRequest,
    transport: F,
) -> Result<Value>
where
    N: Notify,
    F: FnOnce(Outbound) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let response = gateway
        .send_via(&action.endpoint, RequestOptions::post_json(action.body), transport)
        .await?;
    if reports_success(&response) {
        gateway
            .notifier()
            .notify(action.success_message.to_string(), NotificationKind::Success);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UiError;
    use crate::notifications::BusyIndicator;
    use crate::request::testing::RecordingNotifier;
    use futures::executor::block_on;
    use serde_json::json;

    fn gateway() -> RequestGateway<RecordingNotifier> {
        RequestGateway::new(None, BusyIndicator::new(), RecordingNotifier::default())
    }

    fn responding(
        result: Result<Value>,
    ) -> impl FnOnce(Outbound) -> std::future::Ready<Result<Value>> {
        move |_| std::future::ready(result)
    }

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn habit_toggle_payload() {
        let request = toggle_habit(&Endpoints::default(), json!(1), true);
        assert_eq!(request.endpoint, "/diario/prosoche/habito/toggle/");
        assert_eq!(request.body, json!({"habito_id": 1, "completado": true}));
    }

    #[test]
    fn wellbeing_payload_spreads_extra_fields() {
        let request = update_wellbeing_area(
            &Endpoints::default(),
            json!(7),
            map(json!({"puntuacion": 8, "notas": "bien"})),
        );
        assert_eq!(request.endpoint, "/diario/eudaimonia/actualizar/");
        assert_eq!(
            request.body,
            json!({"area_id": 7, "puntuacion": 8, "notas": "bien"})
        );
    }

    #[test]
    fn later_fields_win_like_object_spread() {
        let request =
            update_wellbeing_area(&Endpoints::default(), json!(7), map(json!({"area_id": 9})));
        assert_eq!(request.body, json!({"area_id": 9}));
    }

    #[test]
    fn note_payload_is_passed_through() {
        let request = save_note(&Endpoints::default(), map(json!({"titulo": "Meditaciones"})));
        assert_eq!(request.endpoint, "/diario/gnosis/crear/");
        assert_eq!(request.body, json!({"titulo": "Meditaciones"}));
        assert_eq!(request.success_message, "Contenido guardado correctamente");
    }

    #[test]
    fn confirmed_action_shows_one_success_toast() {
        let gateway = gateway();
        let action = toggle_habit(&Endpoints::default(), json!(3), true);
        let response = block_on(perform(
            &gateway,
            action,
            responding(Ok(json!({"success": true, "racha": 4}))),
        ));
        assert_eq!(response, Ok(json!({"success": true, "racha": 4})));
        assert_eq!(
            gateway.notifier().taken(),
            vec![(
                "Hábito actualizado correctamente".to_string(),
                NotificationKind::Success
            )]
        );
    }

    #[test]
    fn unconfirmed_action_is_silent() {
        let gateway = gateway();
        let action = save_note(&Endpoints::default(), Map::new());
        let response = block_on(perform(
            &gateway,
            action,
            responding(Ok(json!({"success": false}))),
        ));
        assert_eq!(response, Ok(json!({"success": false})));
        assert!(gateway.notifier().taken().is_empty());
    }

    #[test]
    fn failed_action_only_shows_the_error() {
        let gateway = gateway();
        let action = update_wellbeing_area(&Endpoints::default(), json!(1), Map::new());
        let response = block_on(perform(
            &gateway,
            action,
            responding(Err(UiError::Http { status: 500 })),
        ));
        assert_eq!(response, Err(UiError::Http { status: 500 }));
        let toasts = gateway.notifier().taken();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].1, NotificationKind::Error);
    }

    #[test]
    fn success_flag_detection() {
        assert!(reports_success(&json!({"success": true, "id": 3})));
        assert!(!reports_success(&json!({"success": false})));
        assert!(!reports_success(&json!({"success": "yes"})));
        assert!(!reports_success(&json!({})));
    }
}

use std::future::Future;

use gloo::net::http::{Method, RequestBuilder};
use serde_json::Value;

use crate::dom;
use crate::error::{Result, UiError};
use crate::notifications::{BusyIndicator, NotificationCenter, NotificationKind};

pub const CSRF_FIELD_SELECTOR: &str = "[name=csrfmiddlewaretoken]";
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            headers: Vec::new(),
        }
    }
}

/// Default headers overlaid with the caller's; names compare case-insensitively
/// and the caller wins.
pub fn merge_headers(csrf_token: Option<&str>, extra: &[(String, String)]) -> Vec<(String, String)> {
    let mut headers = vec![(
        "Content-Type".to_string(),
        "application/json".to_string(),
    )];
    if let Some(token) = csrf_token {
        headers.push((CSRF_HEADER.to_string(), token.to_string()));
    }
    for (name, value) in extra {
        match headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value.clone(),
            None => headers.push((name.clone(), value.clone())),
        }
    }
    headers
}

/// Where gateway failures (and action confirmations) are reported.
pub trait Notify {
    fn notify(&self, message: String, kind: NotificationKind);
}

impl Notify for NotificationCenter {
    fn notify(&self, message: String, kind: NotificationKind) {
        self.show_with(message, kind, None);
    }
}

/// A request with its final header set, ready for a transport.
#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Outbound calls to the diary backend with the anti-forgery header,
/// loading overlay and error toast handled uniformly.
#[derive(Clone)]
pub struct RequestGateway<N = NotificationCenter> {
    csrf_token: Option<String>,
    busy: BusyIndicator,
    notifier: N,
}

impl RequestGateway<NotificationCenter> {
    /// Captures the token from the page's hidden form field.
    pub fn from_document(notifications: NotificationCenter) -> Self {
        let token = dom::query(CSRF_FIELD_SELECTOR)
            .and_then(|el| el.get_attribute("value"))
            .filter(|t| !t.is_empty());
        if token.is_none() {
            log::warn!("no csrfmiddlewaretoken on page; requests go out without {CSRF_HEADER}");
        }
        Self::new(token, notifications.busy(), notifications)
    }

    pub async fn send(&self, url: &str, options: RequestOptions) -> Result<Value> {
        self.send_via(url, options, fetch).await
    }
}

impl<N: Notify> RequestGateway<N> {
    pub fn new(csrf_token: Option<String>, busy: BusyIndicator, notifier: N) -> Self {
        Self {
            csrf_token,
            busy,
            notifier,
        }
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn outbound(&self, url: &str, options: RequestOptions) -> Outbound {
        Outbound {
            url: url.to_string(),
            method: options.method,
            headers: merge_headers(self.csrf_token(), &options.headers),
            body: options.body.map(|body| body.to_string()),
        }
    }

    /// Holds the loading overlay for the whole call and turns any failure
    /// into one error toast before handing it back to the caller.
    pub async fn send_via<F, Fut>(&self, url: &str, options: RequestOptions, transport: F) -> Result<Value>
    where
        F: FnOnce(Outbound) -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let _busy = self.busy.hold();
        let result = transport(self.outbound(url, options)).await;
        if let Err(err) = &result {
            log::error!("request to {url} failed: {err}");
            self.notifier
                .notify(format!("Error: {err}"), NotificationKind::Error);
        }
        result
    }
}

/// The browser transport: `fetch` through gloo, non-2xx statuses as errors.
pub async fn fetch(request: Outbound) -> Result<Value> {
    let mut builder = RequestBuilder::new(&request.url).method(request.method);
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    let request = match request.body {
        Some(body) => builder.body(body)?,
        None => builder.build()?,
    };

    let response = request.send().await?;
    if !response.ok() {
        return Err(UiError::Http {
            status: response.status(),
        });
    }
    Ok(response.json::<Value>().await?)
}

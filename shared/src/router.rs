//! Dispatch of CEK requests to registered handlers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::request::{ClovaRequest, RequestBody};
use crate::response::{Message, SpeechResponse};

/// Built-in intent asking how to use the extension.
pub const GUIDE_INTENT: &str = "Clova.GuideIntent";
/// Built-in intent for "cancel" / "stop".
pub const CANCEL_INTENT: &str = "Clova.CancelIntent";

/// Category a request is dispatched on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Launch,
    Intent(String),
    SessionEnded,
    Default,
}

impl Route {
    pub fn of(request: &ClovaRequest) -> Self {
        match &request.request {
            RequestBody::Launch => Route::Launch,
            RequestBody::Intent { intent } => Route::Intent(intent.name.clone()),
            RequestBody::SessionEnded => Route::SessionEnded,
            RequestBody::Event { .. } | RequestBody::Unknown => Route::Default,
        }
    }
}

/// Produces the response for one request category.
///
/// Handlers cannot fail: lookup errors are turned into spoken fallback
/// messages before returning.
#[async_trait]
pub trait Handler<S: Sync>: Send + Sync {
    async fn handle(&self, state: &S, request: &ClovaRequest) -> SpeechResponse;
}

/// Handler that always answers with the same speech.
#[derive(Debug, Clone)]
pub struct FixedResponse {
    messages: Vec<Message>,
    should_end_session: bool,
    reprompt: Option<Vec<Message>>,
}

impl FixedResponse {
    pub fn new(messages: Vec<Message>, should_end_session: bool) -> Self {
        Self {
            messages,
            should_end_session,
            reprompt: None,
        }
    }

    /// Plain-text answer that keeps the session open and repeats itself as
    /// the re-prompt.
    pub fn prompt(text: impl Into<String>, lang: &str) -> Self {
        let message = Message::text(text, lang);
        Self::new(vec![message.clone()], false).with_reprompt(vec![message])
    }

    /// Plain-text answer that closes the session.
    pub fn farewell(text: impl Into<String>, lang: &str) -> Self {
        Self::new(vec![Message::text(text, lang)], true)
    }

    pub fn with_reprompt(mut self, messages: Vec<Message>) -> Self {
        self.reprompt = Some(messages);
        self
    }

    pub fn not_understood(lang: &str) -> Self {
        Self::prompt(not_understood_text(lang), lang)
    }

    pub fn response(&self) -> SpeechResponse {
        let response = SpeechResponse::new(self.messages.clone(), self.should_end_session);
        match &self.reprompt {
            Some(reprompt) => response.with_reprompt(reprompt.clone()),
            None => response,
        }
    }
}

#[async_trait]
impl<S: Sync> Handler<S> for FixedResponse {
    async fn handle(&self, _state: &S, _request: &ClovaRequest) -> SpeechResponse {
        self.response()
    }
}

/// Handler for `SessionEndedRequest`: nothing to clean up, close silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionEnded;

#[async_trait]
impl<S: Sync> Handler<S> for SessionEnded {
    async fn handle(&self, _state: &S, request: &ClovaRequest) -> SpeechResponse {
        info!("Session ended: {}", request.session.session_id);
        SpeechResponse::end_session()
    }
}

fn not_understood_text(lang: &str) -> &'static str {
    match lang {
        "ja" => "すみません、よくわかりませんでした。もう一度お願いします。",
        "ko" => "죄송합니다. 잘 이해하지 못했습니다. 다시 말씀해 주세요.",
        _ => "Sorry I don't understand! Could you please repeat?",
    }
}

/// Explicit table from request category to handler.
pub struct Router<S: Sync> {
    handlers: HashMap<Route, Arc<dyn Handler<S>>>,
    default: Arc<dyn Handler<S>>,
    fallback: FixedResponse,
}

impl<S: Sync + 'static> Router<S> {
    /// Empty router whose default handler answers "not understood" in `lang`.
    pub fn new(lang: &str) -> Self {
        let fallback = FixedResponse::not_understood(lang);
        Self {
            handlers: HashMap::new(),
            default: Arc::new(fallback.clone()),
            fallback,
        }
    }

    pub fn on_launch(self, handler: impl Handler<S> + 'static) -> Self {
        self.on(Route::Launch, handler)
    }

    pub fn on_intent(self, name: impl Into<String>, handler: impl Handler<S> + 'static) -> Self {
        self.on(Route::Intent(name.into()), handler)
    }

    pub fn on_session_ended(self, handler: impl Handler<S> + 'static) -> Self {
        self.on(Route::SessionEnded, handler)
    }

    /// Replace the handler used for anything without a registered route.
    pub fn on_default(mut self, handler: impl Handler<S> + 'static) -> Self {
        self.default = Arc::new(handler);
        self
    }

    fn on(mut self, route: Route, handler: impl Handler<S> + 'static) -> Self {
        self.handlers.insert(route, Arc::new(handler));
        self
    }

    /// Response for a body that could not be parsed into a request.
    pub fn not_understood(&self) -> SpeechResponse {
        self.fallback.response()
    }

    /// Run the handler registered for the request's category.
    pub async fn dispatch(&self, state: &S, request: &ClovaRequest) -> SpeechResponse {
        let route = Route::of(request);
        let handler = match self.handlers.get(&route) {
            Some(handler) => handler,
            None => {
                debug!("No handler for {:?}, using default", route);
                &self.default
            }
        };
        handler.handle(state, request).await
    }
}

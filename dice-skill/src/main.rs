//! Dice Lambda - Rolls a die with a user-chosen number of faces.
//!
//! Intents:
//! - CallNumberIntent (slot `endNumber`) - roll a value in [0, endNumber]
//! - Clova.GuideIntent / Clova.CancelIntent - help and goodbye

use async_trait::async_trait;
use lambda_http::{run, service_fn, Error};
use rand::Rng;
use shared::router::{CANCEL_INTENT, GUIDE_INTENT};
use shared::{
    ClovaRequest, Config, Extension, FixedResponse, Handler, Message, Router, SessionEnded,
    SignatureVerifier, SpeechResponse,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DICE_INTENT: &str = "CallNumberIntent";
const BOUND_SLOT: &str = "endNumber";

/// Everything the dice extension says, in one language.
struct Phrases {
    greeting: &'static str,
    ask_bound: &'static str,
    guide: &'static str,
    goodbye: &'static str,
    result_prefix: &'static str,
    result_suffix: &'static str,
}

const EN: Phrases = Phrases {
    greeting: "Welcome to dice. How many faces should the dice have?",
    ask_bound: "Please tell me the largest number on the dice.",
    guide: "Say a number, for example: roll up to six.",
    goodbye: "Goodbye.",
    result_prefix: "dice result: ",
    result_suffix: "",
};

const JA: Phrases = Phrases {
    greeting: "サイコロを振ります。いくつまでの数字にしますか？",
    ask_bound: "サイコロの一番大きい数字を教えてください。",
    guide: "「6まで振って」のように数字を言ってください。",
    goodbye: "またね。",
    result_prefix: "サイコロの結果は",
    result_suffix: "です。",
};

/// Japanese for `ja`, English otherwise.
fn phrases(lang: &str) -> &'static Phrases {
    match lang {
        "ja" => &JA,
        _ => &EN,
    }
}

impl Phrases {
    fn result(&self, value: u64) -> String {
        format!("{}{}{}", self.result_prefix, value, self.result_suffix)
    }
}

/// Rolls a value in `[0, endNumber]`.
struct RollDice {
    lang: String,
    phrases: &'static Phrases,
}

impl RollDice {
    fn ask_again(&self) -> SpeechResponse {
        SpeechResponse::text(self.phrases.ask_bound, &self.lang, false)
            .with_reprompt(vec![Message::text(self.phrases.ask_bound, &self.lang)])
    }
}

/// Only non-negative integers are valid bounds.
fn parse_bound(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn roll(bound: u64) -> u64 {
    rand::thread_rng().gen_range(0..=bound)
}

#[async_trait]
impl Handler<()> for RollDice {
    async fn handle(&self, _state: &(), request: &ClovaRequest) -> SpeechResponse {
        let slot = request.slot_value(BOUND_SLOT);
        info!("{}: {:?}", BOUND_SLOT, slot);

        match slot.and_then(parse_bound) {
            Some(bound) => {
                let value = roll(bound);
                SpeechResponse::text(self.phrases.result(value), &self.lang, true)
            }
            None => self.ask_again(),
        }
    }
}

fn router(lang: &str) -> Router<()> {
    let phrases = phrases(lang);
    Router::new(lang)
        .on_launch(FixedResponse::prompt(phrases.greeting, lang))
        .on_intent(
            DICE_INTENT,
            RollDice {
                lang: lang.to_string(),
                phrases,
            },
        )
        .on_intent(GUIDE_INTENT, FixedResponse::prompt(phrases.guide, lang))
        .on_intent(CANCEL_INTENT, FixedResponse::farewell(phrases.goodbye, lang))
        .on_session_ended(SessionEnded)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    let verifier = SignatureVerifier::from_config(&config, &reqwest::Client::new()).await?;
    let extension = Arc::new(Extension::new(
        &config,
        verifier,
        router(&config.default_language),
        (),
    ));

    run(service_fn(move |event| {
        let extension = Arc::clone(&extension);
        async move { extension.handle(event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dice_request(slots: serde_json::Value) -> ClovaRequest {
        serde_json::from_value(json!({
            "version": "1.0",
            "session": {"new": false, "sessionId": "s1"},
            "context": {"System": {"application": {"applicationId": "com.example.tutorial.test"}}},
            "request": {
                "type": "IntentRequest",
                "intent": {"name": DICE_INTENT, "slots": slots}
            }
        }))
        .unwrap()
    }

    fn rolled_value(response: &SpeechResponse) -> u64 {
        response
            .message_text()
            .strip_prefix("dice result: ")
            .expect("unexpected message")
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_roll_within_bound() {
        let router = router("en");
        let request = dice_request(json!({"endNumber": {"name": "endNumber", "value": "6"}}));

        for _ in 0..200 {
            let response = router.dispatch(&(), &request).await;
            assert!(rolled_value(&response) <= 6);
            assert!(response.should_end_session());
            assert!(response.reprompt_text().is_none());
        }
    }

    #[tokio::test]
    async fn test_zero_bound() {
        let request = dice_request(json!({"endNumber": {"name": "endNumber", "value": "0"}}));
        let response = router("en").dispatch(&(), &request).await;
        assert_eq!(response.message_text(), "dice result: 0");
        assert!(response.should_end_session());
    }

    #[tokio::test]
    async fn test_missing_slot_reprompts() {
        let router = router("en");
        for slots in [json!(null), json!({}), json!({"endNumber": {"name": "endNumber"}})] {
            let response = router.dispatch(&(), &dice_request(slots)).await;
            assert_eq!(response.message_text(), EN.ask_bound);
            assert_eq!(response.reprompt_text().as_deref(), Some(EN.ask_bound));
            assert!(!response.should_end_session());
        }
    }

    #[tokio::test]
    async fn test_invalid_bound_reprompts() {
        let router = router("en");
        for value in ["-3", "six", "2.5"] {
            let request = dice_request(json!({"endNumber": {"name": "endNumber", "value": value}}));
            let response = router.dispatch(&(), &request).await;
            assert!(!response.should_end_session(), "value {value}");
        }
    }

    #[tokio::test]
    async fn test_launch_greets() {
        let launch: ClovaRequest =
            serde_json::from_value(json!({"request": {"type": "LaunchRequest"}})).unwrap();
        let response = router("en").dispatch(&(), &launch).await;
        assert_eq!(response.message_text(), EN.greeting);
        assert!(!response.should_end_session());
    }

    #[tokio::test]
    async fn test_japanese_phrases() {
        let router = router("ja");
        let launch: ClovaRequest =
            serde_json::from_value(json!({"request": {"type": "LaunchRequest"}})).unwrap();
        let response = router.dispatch(&(), &launch).await;
        assert_eq!(response.message_text(), JA.greeting);
        assert_eq!(
            serde_json::to_value(&response).unwrap()["response"]["outputSpeech"]["values"]["lang"],
            "ja"
        );

        let request = dice_request(json!({"endNumber": {"name": "endNumber", "value": "0"}}));
        let response = router.dispatch(&(), &request).await;
        assert_eq!(response.message_text(), "サイコロの結果は0です。");

        let response = router.dispatch(&(), &dice_request(json!(null))).await;
        assert_eq!(response.message_text(), JA.ask_bound);
    }

    #[test]
    fn test_unsupported_language_uses_english() {
        assert_eq!(phrases("ko").greeting, EN.greeting);
        assert_eq!(EN.result(4), "dice result: 4");
    }

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound(" 12 "), Some(12));
        assert_eq!(parse_bound("-1"), None);
        assert_eq!(parse_bound(""), None);
    }
}

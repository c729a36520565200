//! Food Trivia Lambda - Answers questions about regional specialties.
//!
//! Intents:
//! - RegionalFoodIntent (slot `prefecture`) - specialty of a prefecture
//! - FoodInfoIntent (slot `food`) - where a dish comes from
//! - Clova.GuideIntent / Clova.CancelIntent - help and goodbye

use async_trait::async_trait;
use lambda_http::{run, service_fn, Error};
use shared::router::{CANCEL_INTENT, GUIDE_INTENT};
use shared::{
    ClovaRequest, Config, DynamoFoodStore, Extension, FixedResponse, FoodRecord, FoodStore,
    Handler, Message, Router, SessionEnded, SignatureVerifier, SpeechResponse,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const PREFECTURE_INTENT: &str = "RegionalFoodIntent";
const PREFECTURE_SLOT: &str = "prefecture";
const FOOD_INTENT: &str = "FoodInfoIntent";
const FOOD_SLOT: &str = "food";

const GREETING: &str = "ご当地グルメをご紹介します。都道府県名を教えてください。";
const ASK_PREFECTURE: &str = "都道府県名を教えてください。";
const ASK_FOOD: &str = "知りたい料理の名前を教えてください。";
const NOT_FOUND: &str = "ごめんなさい、その情報は見つかりませんでした。";
const GUIDE: &str = "「秋田県の名物は？」や「きりたんぽについて教えて」と話しかけてください。";
const GOODBYE: &str = "ご利用ありがとうございました。";

/// Application state shared across requests.
struct AppState {
    foods: Box<dyn FoodStore>,
}

/// Which lookup a handler performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
    /// Scan for the prefecture's specialty
    ByPrefecture,
    /// Get the dish by name
    ByName,
}

impl Query {
    fn slot(self) -> &'static str {
        match self {
            Query::ByPrefecture => PREFECTURE_SLOT,
            Query::ByName => FOOD_SLOT,
        }
    }

    fn ask(self) -> &'static str {
        match self {
            Query::ByPrefecture => ASK_PREFECTURE,
            Query::ByName => ASK_FOOD,
        }
    }
}

/// Looks up one food record and reads it out.
struct DescribeFood {
    lang: String,
    query: Query,
}

impl DescribeFood {
    fn message(&self, record: &FoodRecord) -> String {
        let name = record.display_name(&self.lang);
        let mut text = match self.query {
            Query::ByPrefecture => format!("{}の名物は{}です。", record.prefecture, name),
            Query::ByName => format!("{}は{}の名物です。", name, record.prefecture),
        };
        if let Some(description) = &record.description {
            text.push_str(description);
        }
        text
    }

    fn reprompt(&self, text: &str) -> SpeechResponse {
        SpeechResponse::text(text, &self.lang, false)
            .with_reprompt(vec![Message::text(self.query.ask(), &self.lang)])
    }
}

#[async_trait]
impl Handler<AppState> for DescribeFood {
    async fn handle(&self, state: &AppState, request: &ClovaRequest) -> SpeechResponse {
        let key = match request.slot_value(self.query.slot()) {
            Some(key) if !key.trim().is_empty() => key.trim(),
            _ => return self.reprompt(self.query.ask()),
        };
        info!("{}: {}", self.query.slot(), key);

        let lookup = match self.query {
            Query::ByPrefecture => state.foods.find_by_prefecture(key).await,
            Query::ByName => state.foods.get(key).await,
        };

        match lookup {
            Ok(Some(record)) => SpeechResponse::text(self.message(&record), &self.lang, true),
            Ok(None) => {
                info!("No food record for {}", key);
                self.reprompt(NOT_FOUND)
            }
            Err(e) => {
                error!("Food lookup failed for {}: {}", key, e);
                self.reprompt(NOT_FOUND)
            }
        }
    }
}

fn router(lang: &str) -> Router<AppState> {
    let describe = |query| DescribeFood {
        lang: lang.to_string(),
        query,
    };

    Router::new(lang)
        .on_launch(FixedResponse::prompt(GREETING, lang))
        .on_intent(PREFECTURE_INTENT, describe(Query::ByPrefecture))
        .on_intent(FOOD_INTENT, describe(Query::ByName))
        .on_intent(GUIDE_INTENT, FixedResponse::prompt(GUIDE, lang))
        .on_intent(CANCEL_INTENT, FixedResponse::farewell(GOODBYE, lang))
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

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let table = config.require_food_table()?;
    info!("Reading food records from table {}", table);

    let state = AppState {
        foods: Box::new(DynamoFoodStore::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            table,
        )),
    };
    let extension = Arc::new(Extension::new(
        &config,
        verifier,
        router(&config.default_language),
        state,
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
    use std::collections::HashMap;

    /// In-memory table keyed by name.
    struct MemoryFoods(Vec<FoodRecord>);

    #[async_trait]
    impl FoodStore for MemoryFoods {
        async fn find_by_prefecture(&self, prefecture: &str) -> shared::Result<Option<FoodRecord>> {
            Ok(self.0.iter().find(|r| r.prefecture == prefecture).cloned())
        }

        async fn get(&self, name: &str) -> shared::Result<Option<FoodRecord>> {
            Ok(self.0.iter().find(|r| r.name == name).cloned())
        }
    }

    struct BrokenFoods;

    #[async_trait]
    impl FoodStore for BrokenFoods {
        async fn find_by_prefecture(&self, _prefecture: &str) -> shared::Result<Option<FoodRecord>> {
            Err(shared::Error::Aws("ProvisionedThroughputExceededException".to_string()))
        }

        async fn get(&self, _name: &str) -> shared::Result<Option<FoodRecord>> {
            Err(shared::Error::Aws("ResourceNotFoundException".to_string()))
        }
    }

    fn foods() -> AppState {
        AppState {
            foods: Box::new(MemoryFoods(vec![
                FoodRecord {
                    name: "kiritanpo".to_string(),
                    prefecture: "秋田県".to_string(),
                    labels: HashMap::from([("ja".to_string(), "きりたんぽ".to_string())]),
                    description: Some("潰したご飯を杉の棒に巻いて焼いたものです。".to_string()),
                },
                FoodRecord {
                    name: "hoto".to_string(),
                    prefecture: "山梨県".to_string(),
                    labels: HashMap::from([("ja".to_string(), "ほうとう".to_string())]),
                    description: None,
                },
            ])),
        }
    }

    fn intent(name: &str, slot: &str, value: Option<&str>) -> ClovaRequest {
        let mut slots = serde_json::Map::new();
        if let Some(value) = value {
            slots.insert(slot.to_string(), json!({"name": slot, "value": value}));
        }
        serde_json::from_value(json!({
            "request": {"type": "IntentRequest", "intent": {"name": name, "slots": slots}}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_prefecture_hit() {
        let response = router("ja")
            .dispatch(&foods(), &intent(PREFECTURE_INTENT, PREFECTURE_SLOT, Some("秋田県")))
            .await;
        assert_eq!(
            response.message_text(),
            "秋田県の名物はきりたんぽです。潰したご飯を杉の棒に巻いて焼いたものです。"
        );
        assert!(response.should_end_session());
    }

    #[tokio::test]
    async fn test_food_hit() {
        let response = router("ja")
            .dispatch(&foods(), &intent(FOOD_INTENT, FOOD_SLOT, Some("hoto")))
            .await;
        assert_eq!(response.message_text(), "ほうとうは山梨県の名物です。");
        assert!(response.should_end_session());
    }

    #[tokio::test]
    async fn test_display_name_falls_back_to_key() {
        let response = router("en")
            .dispatch(&foods(), &intent(FOOD_INTENT, FOOD_SLOT, Some("hoto")))
            .await;
        assert_eq!(response.message_text(), "hotoは山梨県の名物です。");
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let response = router("ja")
            .dispatch(&foods(), &intent(PREFECTURE_INTENT, PREFECTURE_SLOT, Some("北海道")))
            .await;
        assert_eq!(response.message_text(), NOT_FOUND);
        assert_eq!(response.reprompt_text().as_deref(), Some(ASK_PREFECTURE));
        assert!(!response.should_end_session());
    }

    #[tokio::test]
    async fn test_store_errors_fall_back() {
        let state = AppState {
            foods: Box::new(BrokenFoods),
        };
        let router = router("ja");

        let response = router
            .dispatch(&state, &intent(PREFECTURE_INTENT, PREFECTURE_SLOT, Some("秋田県")))
            .await;
        assert_eq!(response.message_text(), NOT_FOUND);
        assert!(!response.should_end_session());

        let response = router
            .dispatch(&state, &intent(FOOD_INTENT, FOOD_SLOT, Some("kiritanpo")))
            .await;
        assert_eq!(response.message_text(), NOT_FOUND);
        assert_eq!(response.reprompt_text().as_deref(), Some(ASK_FOOD));
    }

    #[tokio::test]
    async fn test_missing_slot_reprompts() {
        let response = router("ja")
            .dispatch(&foods(), &intent(FOOD_INTENT, FOOD_SLOT, None))
            .await;
        assert_eq!(response.message_text(), ASK_FOOD);
        assert!(!response.should_end_session());
    }

    #[tokio::test]
    async fn test_cancel_ends_session() {
        let response = router("ja")
            .dispatch(&foods(), &intent(CANCEL_INTENT, FOOD_SLOT, None))
            .await;
        assert_eq!(response.message_text(), GOODBYE);
        assert!(response.should_end_session());
    }
}

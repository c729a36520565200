//! Sensor Status Lambda - Reads out the latest brainwave headset reading.
//!
//! Readings are indexed in Elasticsearch by the headset bridge; this
//! extension reports the newest document's attention or meditation level.
//!
//! Intents:
//! - callStatus (slot `status`: 集中度 | リラックス度)
//! - Clova.GuideIntent / Clova.CancelIntent - help and goodbye

use async_trait::async_trait;
use lambda_http::{run, service_fn, Error};
use shared::router::{CANCEL_INTENT, GUIDE_INTENT};
use shared::{
    display_text, ClovaRequest, Config, Extension, FixedResponse, Handler, Message, ReadingSource, Router,
    SearchClient, SensorReading, SessionEnded, SignatureVerifier, SpeechResponse,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const STATUS_INTENT: &str = "callStatus";
const STATUS_SLOT: &str = "status";

const GREETING: &str = "知りたい情報を教えてください";
const ASK_STATUS: &str = "集中度かリラックス度を聞いてください。";
const GUIDE: &str = "「集中度を教えて」や「リラックス度を教えて」と話しかけてください。";
const GOODBYE: &str = "またいつでも聞いてください。";
const UNKNOWN: &str = "不明";

/// Application state shared across requests.
struct AppState {
    readings: Box<dyn ReadingSource>,
}

/// Which reading field a spoken status name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Attention,
    Meditation,
}

impl Metric {
    fn from_slot(value: &str) -> Option<Self> {
        match value.trim() {
            "集中度" => Some(Metric::Attention),
            "リラックス度" => Some(Metric::Meditation),
            _ => None,
        }
    }

    fn read(self, reading: &SensorReading) -> Option<String> {
        let value = match self {
            Metric::Attention => reading.attention.as_ref(),
            Metric::Meditation => reading.meditation.as_ref(),
        };
        display_text(value)
    }
}

/// Reports one metric from the newest reading.
struct ReportStatus {
    lang: String,
    subject: String,
}

impl ReportStatus {
    fn sentence(&self, status: &str, value: &str) -> String {
        format!("{}さんの{}は{}です。", self.subject, status, value)
    }

    fn unknown(&self, status: &str) -> SpeechResponse {
        SpeechResponse::text(self.sentence(status, UNKNOWN), &self.lang, false)
            .with_reprompt(vec![Message::text(ASK_STATUS, &self.lang)])
    }

    async fn lookup(&self, readings: &dyn ReadingSource, metric: Metric) -> Option<String> {
        match readings.latest_reading().await {
            Ok(Some(reading)) => {
                info!("Latest reading at {:?}", reading.timestamp);
                metric.read(&reading)
            }
            Ok(None) => {
                info!("No readings indexed yet");
                None
            }
            Err(e) => {
                error!("Failed to fetch latest reading: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Handler<AppState> for ReportStatus {
    async fn handle(&self, state: &AppState, request: &ClovaRequest) -> SpeechResponse {
        let status = match request.slot_value(STATUS_SLOT) {
            Some(status) => status,
            None => {
                return SpeechResponse::text(ASK_STATUS, &self.lang, false)
                    .with_reprompt(vec![Message::text(ASK_STATUS, &self.lang)]);
            }
        };
        info!("{}: {}", STATUS_SLOT, status);

        let metric = match Metric::from_slot(status) {
            Some(metric) => metric,
            None => return self.unknown(status),
        };

        match self.lookup(state.readings.as_ref(), metric).await {
            Some(value) => SpeechResponse::text(self.sentence(status, &value), &self.lang, false)
                .with_reprompt(vec![Message::text(ASK_STATUS, &self.lang)]),
            None => self.unknown(status),
        }
    }
}

fn router(config: &Config) -> Router<AppState> {
    let lang = config.default_language.as_str();
    Router::new(lang)
        .on_launch(FixedResponse::prompt(GREETING, lang))
        .on_intent(
            STATUS_INTENT,
            ReportStatus {
                lang: lang.to_string(),
                subject: config.sensor_subject.clone(),
            },
        )
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
    let http = reqwest::Client::new();
    let verifier = SignatureVerifier::from_config(&config, &http).await?;

    let search = SearchClient::new(http, config.require_search_endpoint()?, &config.search_index);
    info!("Reading sensor data from {}", search.search_url());

    let state = AppState {
        readings: Box::new(search),
    };
    let extension = Arc::new(Extension::new(&config, verifier, router(&config), state));

    run(service_fn(move |event| {
        let extension = Arc::clone(&extension);
        async move { extension.handle(event).await }
    }))
    .await
}

use chrono::{DateTime, Utc};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use zeitplan_slots::{
    Block, ScoringError, SlotSuggestion, Suggester, SuggestionConfig, SuggestionRequest,
    WorkingHours,
};

/// Everything the scorer needs for one user. Calendar blocks are expected to
/// cover the lookback period as well as the searched range.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    working_hours: WorkingHours,
    #[serde(default)]
    blocks: Vec<Block>,
    request: SuggestionRequest,
    now: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct Response {
    suggestions: Vec<SlotSuggestion>,
}

async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, ScoringError> {
    let payload = event.payload;
    let now = payload.now.unwrap_or_else(Utc::now);

    let suggester = Suggester::new(
        payload.working_hours,
        payload.blocks,
        SuggestionConfig::from_env(),
    );

    suggester
        .suggest(&payload.request, now)
        .map(|suggestions| Response { suggestions })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();

    run(service_fn(function_handler)).await
}

use crate::{Block, SlotSuggestion, Suggester, SuggestionConfig, SuggestionRequest, WorkingHours};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestInput {
    working_hours: WorkingHours,
    #[serde(default)]
    blocks: Vec<Block>,
    request: SuggestionRequest,
    now: DateTime<Utc>,
    #[serde(default)]
    config: SuggestionConfig,
}

#[derive(Serialize)]
struct SuggestOutput {
    suggestions: Vec<SlotSuggestion>,
}

#[wasm_bindgen(js_name = suggestSlots)]
pub fn suggest_slots(input: JsValue) -> Result<JsValue, JsValue> {
    let input: SuggestInput = serde_wasm_bindgen::from_value(input)?;

    let suggester = Suggester::new(input.working_hours, input.blocks, input.config);
    let suggestions = suggester
        .suggest(&input.request, input.now)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok(serde_wasm_bindgen::to_value(&SuggestOutput { suggestions })?)
}

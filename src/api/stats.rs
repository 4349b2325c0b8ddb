use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let node = &state.node;
    let (tip_height, known_blocks, pending_blocks, difficulty_target) = {
        let ledger = node.ledger().lock().expect("mutex poisoned");
        (
            ledger.tip_height(),
            ledger.known_len(),
            ledger.pending().len(),
            ledger.target().to_string(),
        )
    };

    HttpResponse::Ok().json(StatsResponse {
        miner_name: node.config().miner_name.clone(),
        mining: node.config().mining,
        tip_height,
        known_blocks,
        pending_blocks,
        difficulty_target,
        miner: node.stats().snapshot(),
    })
}

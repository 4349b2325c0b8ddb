use actix_web::{HttpResponse, Responder, get, web};
use log::error;

use super::models::{AppState, ChainResponse, ErrorResponse, TipResponse};

/// Get the winning chain, tip first.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.node.ledger().lock().expect("mutex poisoned");
    match ledger.winning_chain() {
        Ok(blocks) => HttpResponse::Ok().json(ChainResponse {
            height: ledger.tip_height(),
            blocks,
        }),
        Err(e) => {
            error!("{e}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}

/// Hash and height miners currently extend.
#[get("/tip/")]
pub async fn get_tip(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.node.ledger().lock().expect("mutex poisoned");
    HttpResponse::Ok().json(TipResponse {
        hash: ledger.current_tip_hash().to_string(),
        height: ledger.tip_height(),
    })
}

use actix_web::{HttpResponse, Responder, post, web};

use super::models::{AppState, IngestResponse};
use crate::blockchain::IngestOutcome;
use crate::transport::NodeMessage;

/// Receive a block announcement from a peer.
///
/// A rejected block is still a 200: the verdict is final, the request
/// itself was fine.
#[post("/blocks/")]
pub async fn receive_block(
    state: web::Data<AppState>,
    message: web::Json<NodeMessage>,
) -> impl Responder {
    let resp = match state.node.dispatch(message.into_inner()) {
        IngestOutcome::Accepted { hash, linked } => IngestResponse {
            accepted: true,
            hash,
            linked: Some(linked),
            reason: None,
        },
        IngestOutcome::Rejected { hash, reason } => IngestResponse {
            accepted: false,
            hash,
            linked: None,
            reason: Some(reason),
        },
    };
    HttpResponse::Ok().json(resp)
}

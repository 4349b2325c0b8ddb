mod blocks;
mod chain;
mod health;
pub mod models;
mod stats;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(blocks::receive_block)
            .service(chain::get_chain)
            .service(chain::get_tip)
            .service(stats::get_stats),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use super::{AppState, init_routes};
    use crate::blockchain::{Block, Ledger, SENTINEL_HASH};
    use crate::config::Config;
    use crate::node::Node;
    use crate::transport::NodeMessage;

    const EASY: &str = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

    fn state(target: &str) -> web::Data<AppState> {
        let node = Node::with_ledger(Config::new("tester"), Ledger::with_target(target));
        web::Data::new(AppState::new(Arc::new(node)))
    }

    #[actix_web::test]
    async fn post_block_then_read_chain() {
        let app = test::init_service(
            App::new()
                .app_data(state(EASY))
                .configure(init_routes),
        )
        .await;

        let genesis = Block::new("peer", SENTINEL_HASH, "hello");
        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(NodeMessage::IncomingBlock(genesis.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["accepted"], true);
        assert_eq!(body["linked"], true);
        assert_eq!(body["hash"], genesis.hash.as_str());

        let req = test::TestRequest::get().uri("/api/v1/tip/").to_request();
        let tip: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(tip["hash"], genesis.hash.as_str());
        assert_eq!(tip["height"], 0);

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let chain: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(chain["height"], 0);
        assert_eq!(chain["blocks"][0]["data"], "hello");
        assert_eq!(chain["blocks"][0]["height"], 0);
    }

    #[actix_web::test]
    async fn duplicate_is_a_verdict_not_a_failure() {
        let app = test::init_service(
            App::new()
                .app_data(state(EASY))
                .configure(init_routes),
        )
        .await;
        let block = Block::new("peer", SENTINEL_HASH, "");
        for expected in [true, false] {
            let req = test::TestRequest::post()
                .uri("/api/v1/blocks/")
                .set_json(NodeMessage::IncomingBlock(block.clone()))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["accepted"], expected);
        }
    }

    #[actix_web::test]
    async fn weak_block_is_rejected_with_reason() {
        let app = test::init_service(
            App::new()
                .app_data(state(SENTINEL_HASH))
                .configure(init_routes),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(json!({
                "kind": "incoming_block",
                "payload": {
                    "timestamp": 1,
                    "author": "peer",
                    "prev_hash": SENTINEL_HASH,
                    "data": "",
                    "nonce": 7,
                    "hash": SENTINEL_HASH
                }
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["accepted"], false);
        assert_eq!(body["reason"], "difficulty_not_met");

        let req = test::TestRequest::get().uri("/api/v1/stats/").to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["known_blocks"], 0);
        assert_eq!(stats["pending_blocks"], 0);
        assert_eq!(stats["tip_height"], -1);
        assert_eq!(stats["miner_name"], "tester");
    }

    #[actix_web::test]
    async fn malformed_message_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(state(EASY))
                .configure(init_routes),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/v1/blocks/")
            .set_json(json!({"kind": "incoming_block"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn health_is_up() {
        let app = test::init_service(App::new().configure(init_routes)).await;
        let req = test::TestRequest::get().uri("/api/v1/health/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}

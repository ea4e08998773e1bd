//! Peer identity handler

use axum::Json;
use peergate_axum::RequirePeer;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub peer: String,
}

/// GET /whoami - Echo the authenticated peer's id
pub async fn whoami(peer: RequirePeer) -> Json<WhoamiResponse> {
    Json(WhoamiResponse {
        peer: peer.id().to_string(),
    })
}

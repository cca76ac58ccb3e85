use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::dto::{SearchParams, SearchResponse};
use crate::state::AppState;

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let result = state.session.search(&params.q).await;
    Json(SearchResponse { query: params.q, result })
}

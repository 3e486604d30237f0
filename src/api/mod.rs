/*
 * Responsibility
 * - /api 配下の公開ポイント (routes() の re-export など)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod openapi;
mod routes;

pub use routes::routes;

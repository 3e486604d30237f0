/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::access (request gate), cors, http, security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;

/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が gate を通して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証や scope 判定は services::auth の責務
 */
use crate::services::auth::claims::{ClaimSet, GrantedScopes};

/// 認証・認可済みのリクエストに付与されるコンテキスト
///
/// - `subject` は token の `sub`（client_credentials では client id のことが多い）
/// - `scopes` は監査/ログ用。認可判定は gate で完了している
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: Option<String>,
    pub scopes: GrantedScopes,
}

impl AuthCtx {
    /// Subject for log fields; tokens without `sub` show as "-".
    pub fn principal(&self) -> &str {
        self.subject.as_deref().unwrap_or("-")
    }
}

impl From<ClaimSet> for AuthCtx {
    fn from(claims: ClaimSet) -> Self {
        Self {
            subject: claims.subject,
            scopes: claims.scopes,
        }
    }
}

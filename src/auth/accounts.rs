//! Mapping from external identities to local account subjects.

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use uuid::Uuid;

use super::oracle::ExternalSubject;
use super::token::Subject;

#[derive(Debug, thiserror::Error)]
#[error("account directory unavailable: {0}")]
pub struct AccountError(pub String);

/// Resolves a verified external identity to the local account it belongs to,
/// provisioning a new account on first sight.
pub trait AccountDirectory: Send + Sync + 'static {
    fn resolve_or_provision<'a>(
        &'a self,
        external: &'a ExternalSubject,
    ) -> BoxFuture<'a, Result<Subject, AccountError>>;
}

/// In-process directory; accounts live for the lifetime of the process.
#[derive(Clone, Default)]
pub struct InMemoryAccountDirectory {
    accounts: Arc<DashMap<ExternalSubject, Subject>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn resolve_or_provision<'a>(
        &'a self,
        external: &'a ExternalSubject,
    ) -> BoxFuture<'a, Result<Subject, AccountError>> {
        Box::pin(async move {
            let subject = self
                .accounts
                .entry(external.clone())
                .or_insert_with(|| {
                    let subject = Subject::new(Uuid::new_v4().to_string());
                    tracing::info!(issuer = %external.issuer, subject = %subject, "Provisioned account");
                    subject
                })
                .clone();
            Ok(subject)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external(sub: &str) -> ExternalSubject {
        ExternalSubject {
            issuer: "https://id.example".to_string(),
            subject: sub.to_string(),
        }
    }

    #[tokio::test]
    async fn test_same_identity_same_account() {
        let directory = InMemoryAccountDirectory::new();
        let a = directory.resolve_or_provision(&external("g-1")).await.unwrap();
        let b = directory.resolve_or_provision(&external("g-1")).await.unwrap();
        let c = directory.resolve_or_provision(&external("g-2")).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[tokio::test]
    async fn test_separator_in_issuer_does_not_alias() {
        let directory = InMemoryAccountDirectory::new();
        let a = ExternalSubject {
            issuer: "https://id.example|x".to_string(),
            subject: "y".to_string(),
        };
        let b = ExternalSubject {
            issuer: "https://id.example".to_string(),
            subject: "x|y".to_string(),
        };

        let first = directory.resolve_or_provision(&a).await.unwrap();
        let second = directory.resolve_or_provision(&b).await.unwrap();
        assert_ne!(first, second);
    }
}

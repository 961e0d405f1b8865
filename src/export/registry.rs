//! Identifier collision tracking for a single run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::CollisionPolicy;
use crate::error_handling::ExportError;

/// Serializes writes to one record directory.
pub type WriteLock = Arc<tokio::sync::Mutex<()>>;

/// How an identifier was claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// First record with this identifier in the run
    First,
    /// Identifier seen before; the policy allows overwriting
    Overwrite,
}

/// A successful claim and the lock guarding the identifier's directory.
#[derive(Debug, Clone)]
pub struct Claimed {
    pub claim: Claim,
    /// Shared by every record claiming the same identifier
    pub write_lock: WriteLock,
}

/// Identifiers already exported in this run.
///
/// Only collisions inside one run count. Directories left by earlier runs are
/// overwritten, which keeps re-runs idempotent.
pub struct IdentifierRegistry {
    policy: CollisionPolicy,
    seen: Mutex<HashMap<String, WriteLock>>,
}

impl IdentifierRegistry {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Records `identifier` as used.
    ///
    /// Records that overwrite an identifier get the same [`WriteLock`] as the
    /// first one, so their writes can be ordered.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::DuplicateIdentifier` when the identifier was
    /// already claimed and the policy is [`CollisionPolicy::Fail`].
    pub fn claim(&self, identifier: &str) -> Result<Claimed, ExportError> {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(write_lock) = seen.get(identifier) {
            return match self.policy {
                CollisionPolicy::Fail => {
                    Err(ExportError::DuplicateIdentifier(identifier.to_string()))
                }
                CollisionPolicy::Overwrite => Ok(Claimed {
                    claim: Claim::Overwrite,
                    write_lock: Arc::clone(write_lock),
                }),
            };
        }
        let write_lock = WriteLock::default();
        seen.insert(identifier.to_string(), Arc::clone(&write_lock));
        Ok(Claimed {
            claim: Claim::First,
            write_lock,
        })
    }

    /// Number of distinct identifiers claimed so far.
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_first_time() {
        let registry = IdentifierRegistry::new(CollisionPolicy::Fail);
        assert!(registry.is_empty());
        assert_eq!(registry.claim("A1").unwrap().claim, Claim::First);
        assert_eq!(registry.claim("B2").unwrap().claim, Claim::First);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_fails_by_default() {
        let registry = IdentifierRegistry::new(CollisionPolicy::Fail);
        registry.claim("A1").unwrap();
        let err = registry.claim("A1").unwrap_err();
        assert!(matches!(err, ExportError::DuplicateIdentifier(ref id) if id == "A1"));
    }

    #[test]
    fn test_duplicate_allowed_with_overwrite() {
        let registry = IdentifierRegistry::new(CollisionPolicy::Overwrite);
        assert_eq!(registry.claim("A1").unwrap().claim, Claim::First);
        assert_eq!(registry.claim("A1").unwrap().claim, Claim::Overwrite);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_identifiers_are_case_sensitive() {
        let registry = IdentifierRegistry::new(CollisionPolicy::Fail);
        registry.claim("a1").unwrap();
        assert_eq!(registry.claim("A1").unwrap().claim, Claim::First);
    }

    #[test]
    fn test_overwrite_shares_write_lock() {
        let registry = IdentifierRegistry::new(CollisionPolicy::Overwrite);
        let first = registry.claim("A1").unwrap();
        let second = registry.claim("A1").unwrap();
        let other = registry.claim("B2").unwrap();
        assert!(Arc::ptr_eq(&first.write_lock, &second.write_lock));
        assert!(!Arc::ptr_eq(&first.write_lock, &other.write_lock));
    }

    #[tokio::test]
    async fn test_overwrite_waits_for_earlier_writer() {
        let registry = IdentifierRegistry::new(CollisionPolicy::Overwrite);
        let first = registry.claim("A1").unwrap();
        let second = registry.claim("A1").unwrap();

        let held = Arc::clone(&first.write_lock).lock_owned().await;
        assert!(second.write_lock.try_lock().is_err());
        drop(held);
        assert!(second.write_lock.try_lock().is_ok());
    }
}

use crate::error::Result;
use crate::primary::subscription::ChangeNotifier;

/// Synchronous string key-value storage (the browser-local store's contract).
///
/// Implementations store text verbatim; serialization and expiry live in
/// [`PrimaryStore`](crate::primary::PrimaryStore).
pub trait KeyValueBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Fails with `QuotaExceeded` or `Io` without touching the old value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    fn keys(&self) -> Result<Vec<String>>;

    /// Channel shared by every handle opened on this backend.
    fn notifier(&self) -> &ChangeNotifier;
}

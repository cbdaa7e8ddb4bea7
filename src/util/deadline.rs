// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use crate::storage::error::{StorageError, StorageResult};
use std::future::Future;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Run `operation` under a deadline of `timeout` measured from now.
///
/// When the deadline elapses the operation future is dropped, which aborts the
/// in-flight transfer and runs any cleanup held by its locals.
///
/// # Arguments
///
/// * `operation_name` - Name of the operation for logging and error reporting
/// * `timeout` - Time allowed for this single call
/// * `operation` - The async operation to bound
///
/// # Returns
///
/// The operation's own result, or [`StorageError::DeadlineExceeded`].
pub async fn with_deadline<Fut, T>(
    operation_name: &str,
    timeout: Duration,
    operation: Fut,
) -> StorageResult<T>
where
    Fut: Future<Output = StorageResult<T>>,
{
    let start = Instant::now();
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => {
            debug!(
                "{} | ok={}, took={}",
                operation_name,
                result.is_ok(),
                start.elapsed().as_millis()
            );
            result
        }
        Err(_) => {
            warn!(
                "{} | deadline of {}ms exceeded",
                operation_name,
                timeout.as_millis()
            );
            Err(StorageError::DeadlineExceeded {
                operation: operation_name.to_string(),
                timeout,
            })
        }
    }
}

/// Reject an empty string argument.
pub fn require_non_empty(name: &str, value: &str) -> StorageResult<()> {
    if value.is_empty() {
        return Err(StorageError::InvalidArgument(format!(
            "{} cannot be empty",
            name
        )));
    }
    Ok(())
}

/// Reject an empty path argument.
pub fn require_non_empty_path(name: &str, value: &Path) -> StorageResult<()> {
    if value.as_os_str().is_empty() {
        return Err(StorageError::InvalidArgument(format!(
            "{} cannot be empty",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline("fast", Duration::from_secs(5), async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_inner_error_is_returned_unchanged() {
        let result: StorageResult<()> = with_deadline("failing", Duration::from_secs(5), async {
            Err(StorageError::CloseError("boom".to_string()))
        })
        .await;

        match result {
            Err(StorageError::CloseError(msg)) => assert_eq!(msg, "boom"),
            _ => panic!("Expected the inner CloseError"),
        }
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let start = Instant::now();
        let result: StorageResult<()> =
            with_deadline("slow(report.txt)", Duration::from_millis(50), async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;

        assert!(start.elapsed() < Duration::from_secs(5));
        match result {
            Err(StorageError::DeadlineExceeded { operation, timeout }) => {
                assert_eq!(operation, "slow(report.txt)");
                assert_eq!(timeout, Duration::from_millis(50));
            }
            _ => panic!("Expected DeadlineExceeded"),
        }
    }

    #[tokio::test]
    async fn test_expired_operation_is_dropped() {
        struct SetOnDrop(Arc<AtomicBool>);
        impl Drop for SetOnDrop {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let guard = SetOnDrop(Arc::clone(&dropped));

        let result: StorageResult<()> =
            with_deadline("cleanup", Duration::from_millis(20), async move {
                let _guard = guard;
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;

        assert!(result.unwrap_err().is_timeout());
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_each_call_gets_a_fresh_deadline() {
        // Together these run longer than one timeout, each alone fits
        for _ in 0..3 {
            let result = with_deadline("sequential", Duration::from_millis(200), async {
                tokio::time::sleep(Duration::from_millis(80)).await;
                Ok(())
            })
            .await;
            assert!(result.is_ok());
        }
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("object", "report.txt").is_ok());
        match require_non_empty("object", "") {
            Err(StorageError::InvalidArgument(msg)) => assert_eq!(msg, "object cannot be empty"),
            _ => panic!("Expected InvalidArgument"),
        }
    }

    #[test]
    fn test_require_non_empty_path() {
        assert!(require_non_empty_path("path", Path::new("./local/report.txt")).is_ok());
        assert!(matches!(
            require_non_empty_path("path", Path::new("")),
            Err(StorageError::InvalidArgument(_))
        ));
    }
}

use std::future::Future;
use std::time::Duration;

/// Runs a collaborator call under a deadline; an elapsed deadline becomes an ordinary error.
pub(crate) async fn bounded<F, T>(limit: Duration, what: &str, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!("{what} timed out after {limit:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn elapsed_deadline_is_an_error() {
        let res: anyhow::Result<()> = bounded(Duration::from_millis(20), "slow call", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        let err = res.unwrap_err().to_string();
        assert!(err.contains("slow call timed out"), "{err}");
    }

    #[tokio::test]
    async fn passes_through_inner_result() {
        let res = bounded(Duration::from_secs(1), "fast call", async { Ok(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }
}

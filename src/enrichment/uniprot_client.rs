// std imports
use std::time::Duration;

// 3rd party imports
use metrics::counter;
use reqwest::{Client as HttpClient, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};

// internal imports
use super::protein_record::ProteinRecord;
use super::record_source::RecordSource;
use crate::configuration::EnrichmentConfiguration;
use crate::errors::record_error::RecordError;

/// Metric name for successfully fetched records
///
const FETCHED_METRIC: &str = "clipper_records_fetched";

/// Metric name for retried requests
///
const RETRY_METRIC: &str = "clipper_record_retries";

/// Metric name for requests which finally failed
///
const FAILED_METRIC: &str = "clipper_record_failures";

/// Client for the UniProtKB REST API
///
pub struct UniProtClient {
    client: HttpClient,
    base_url: String,
    sleep_time: Duration,
    max_retries: usize,
    backoff: Duration,
}

impl UniProtClient {
    /// Creates a new client
    ///
    /// # Arguments
    /// * `configuration` - Enrichment configuration
    ///
    pub fn new(configuration: &EnrichmentConfiguration) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: configuration
                .record_source_url
                .trim_end_matches('/')
                .to_string(),
            sleep_time: Duration::from_millis(configuration.sleep_time_ms),
            max_retries: configuration.max_retries,
            backoff: Duration::from_millis(configuration.backoff_ms),
        }
    }

    /// URL of the JSON record of the accession
    ///
    /// # Arguments
    /// * `accession` - Protein accession
    ///
    pub fn record_url(&self, accession: &str) -> String {
        format!("{}/uniprotkb/{}.json", self.base_url, accession)
    }

    /// Backoff before the given retry (0-based), doubled with every retry
    ///
    /// # Arguments
    /// * `retry` - Number of the retry
    ///
    pub fn backoff(&self, retry: usize) -> Duration {
        self.backoff * 2_u32.saturating_pow(retry as u32)
    }

    async fn fetch_once(&self, accession: &str) -> Result<ProteinRecord, RecordError> {
        let response = self
            .client
            .get(self.record_url(accession))
            .send()
            .await
            .map_err(|err| RecordError::Transport(accession.to_string(), err))?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(RecordError::NotFound(accession.to_string())),
            status if !status.is_success() => {
                return Err(RecordError::UnexpectedStatus(
                    accession.to_string(),
                    status.as_u16(),
                ))
            }
            _ => (),
        }
        let body = response
            .text()
            .await
            .map_err(|err| RecordError::Transport(accession.to_string(), err))?;
        serde_json::from_str(&body)
            .map_err(|err| RecordError::Deserialization(accession.to_string(), err))
    }
}

impl RecordSource for UniProtClient {
    /// Fetches the record after the configured delay.
    /// Transport errors, 429 and 5xx responses are retried with exponential backoff.
    ///
    async fn fetch(&self, accession: &str) -> Result<ProteinRecord, RecordError> {
        sleep(self.sleep_time).await;
        let mut retry = 0;
        loop {
            match self.fetch_once(accession).await {
                Ok(record) => {
                    counter!(FETCHED_METRIC).increment(1);
                    return Ok(record);
                }
                Err(err) if err.is_retryable() && retry < self.max_retries => {
                    let backoff = self.backoff(retry);
                    debug!(
                        "Retrying `{}` in {} ms ({}/{}): {}",
                        accession,
                        backoff.as_millis(),
                        retry + 1,
                        self.max_retries,
                        err
                    );
                    counter!(RETRY_METRIC).increment(1);
                    sleep(backoff).await;
                    retry += 1;
                }
                Err(err) => {
                    if retry > 0 {
                        warn!("Giving up on `{}` after {} retries", accession, retry);
                    }
                    counter!(FAILED_METRIC).increment(1);
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const RECORD_BODY: &str = r#"{"primaryAccession":"P12345","sequence":{"value":"MKTAYIAKQ"}}"#;

    /// Serves one canned response per connection in the given order and counts the requests.
    /// The last response is repeated once the list is exhausted.
    ///
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(connection) => connection,
                    Err(_) => break,
                };
                let hit = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responses[hit.min(responses.len() - 1)];
                let mut buffer = [0_u8; 4096];
                let _ = stream.read(&mut buffer).await;
                let response = format!(
                    "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        (format!("http://{}", address), hits)
    }

    fn local_configuration(url: String) -> EnrichmentConfiguration {
        EnrichmentConfiguration {
            record_source_url: url,
            sleep_time_ms: 0,
            max_retries: 3,
            backoff_ms: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_record_url_and_backoff() {
        let configuration = EnrichmentConfiguration {
            record_source_url: "https://rest.uniprot.org/".to_string(),
            backoff_ms: 100,
            ..Default::default()
        };
        let client = UniProtClient::new(&configuration);
        assert_eq!(
            client.record_url("P12345"),
            "https://rest.uniprot.org/uniprotkb/P12345.json"
        );
        assert_eq!(client.backoff(0), Duration::from_millis(100));
        assert_eq!(client.backoff(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_unreachable_source_is_transport_error() {
        let configuration = EnrichmentConfiguration {
            record_source_url: "http://127.0.0.1:9".to_string(),
            sleep_time_ms: 0,
            max_retries: 1,
            backoff_ms: 1,
            ..Default::default()
        };
        let client = UniProtClient::new(&configuration);
        assert!(matches!(
            client.fetch("P12345").await,
            Err(RecordError::Transport(_, _))
        ));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let (url, hits) = serve(vec![(503, ""), (429, ""), (200, RECORD_BODY)]).await;
        let client = UniProtClient::new(&local_configuration(url));
        let record = client.fetch("P12345").await.unwrap();
        assert_eq!(record.sequence(), Some("MKTAYIAKQ"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let (url, hits) = serve(vec![(404, "")]).await;
        let client = UniProtClient::new(&local_configuration(url));
        assert!(matches!(
            client.fetch("P99999").await,
            Err(RecordError::NotFound(_))
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let (url, hits) = serve(vec![(500, "")]).await;
        let client = UniProtClient::new(&local_configuration(url));
        assert!(matches!(
            client.fetch("P12345").await,
            Err(RecordError::UnexpectedStatus(_, 500))
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }
}

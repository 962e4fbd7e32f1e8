//! Client configuration tests.

use manta_client::{Client, ClientConfig};
use std::time::Duration;

#[test]
fn default_base_url() {
    let config = ClientConfig::default();
    assert_eq!(config.base_url, "http://127.0.0.1:5001");
    assert!(config.timeout.is_none());
}

#[test]
fn for_url_overrides_base() {
    let client = Client::for_url("http://10.0.0.7:9000").unwrap();
    assert_eq!(client.config().base_url, "http://10.0.0.7:9000");
}

#[test]
fn timeout_is_accepted() {
    let client = Client::new(ClientConfig {
        timeout: Some(Duration::from_secs(30)),
        ..ClientConfig::default()
    })
    .unwrap();
    assert_eq!(client.config().timeout, Some(Duration::from_secs(30)));
}

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_iotfleetwise::config::{Credentials, Region};
use aws_sdk_iotfleetwise::error::DisplayErrorContext;
use aws_sdk_iotfleetwise::primitives::DateTime as SdkDateTime;
use aws_sdk_iotfleetwise::types::VehicleSummary as SdkVehicleSummary;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::config::FleetWiseConfig;

/// Provider name attached to the static credentials (shows up in SDK logs).
const CREDENTIALS_PROVIDER: &str = "fleetwise-connector-configuration";

/// One vehicle as listed by FleetWise.
///
/// Every field is optional here so that a summary missing a field is caught
/// by the row mapping, which names the field in its error.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub vehicle_name: Option<String>,
    pub arn: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_modification_time: Option<DateTime<Utc>>,
    pub model_manifest_arn: Option<String>,
    pub decoder_manifest_arn: Option<String>,
    /// Static vehicle attributes (a map upstream, occasionally a plain string)
    pub attributes: Option<Value>,
}

/// One page of a ListVehicles listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VehiclePage {
    pub summaries: Vec<VehicleSummary>,
    /// Continuation token; `None` on the last page
    pub next_token: Option<String>,
}

/// Anything that can list vehicles one page at a time.
///
/// The pipeline takes this as an explicit value, so tests drive it with
/// in-memory pages instead of the AWS client.
#[async_trait]
pub trait VehicleSource: Send + Sync {
    /// Fetch the page starting at `next_token` (`None` for the first page).
    async fn list_vehicles(&self, next_token: Option<String>) -> Result<VehiclePage>;
}

/// AWS IoT FleetWise API client.
///
/// Authenticates with the static credentials from the connector
/// configuration. SDK retries are disabled: a failed call fails the sync.
pub struct FleetWiseClient {
    client: aws_sdk_iotfleetwise::Client,
}

impl FleetWiseClient {
    /// Create a client for the configured region.
    ///
    /// `endpoint_url` overrides the regional endpoint (for testing with a mock server).
    pub async fn connect(config: &FleetWiseConfig, endpoint_url: Option<&str>) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            config.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }

        let sdk_config = loader.load().await;
        Self {
            client: aws_sdk_iotfleetwise::Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl VehicleSource for FleetWiseClient {
    async fn list_vehicles(&self, next_token: Option<String>) -> Result<VehiclePage> {
        let output = self
            .client
            .list_vehicles()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| anyhow!("ListVehicles request failed: {}", DisplayErrorContext(&e)))?;

        let summaries = output
            .vehicle_summaries
            .unwrap_or_default()
            .into_iter()
            .map(from_sdk)
            .collect::<Result<Vec<_>>>()?;

        Ok(VehiclePage {
            summaries,
            next_token: output.next_token.filter(|t| !t.is_empty()),
        })
    }
}

/// Convert an SDK summary into the upstream shape.
///
/// The SDK deserializer fills required members absent from the response with
/// defaults (empty string, epoch 0). Those are mapped back to `None` so the
/// row mapping reports the field as missing instead of storing a fabricated
/// value. A timestamp chrono cannot represent is an error of its own.
fn from_sdk(summary: SdkVehicleSummary) -> Result<VehicleSummary> {
    Ok(VehicleSummary {
        vehicle_name: present(summary.vehicle_name),
        arn: present(summary.arn),
        creation_time: timestamp(&summary.creation_time, "creationTime")?,
        last_modification_time: timestamp(
            &summary.last_modification_time,
            "lastModificationTime",
        )?,
        model_manifest_arn: present(summary.model_manifest_arn),
        decoder_manifest_arn: present(summary.decoder_manifest_arn),
        attributes: summary.attributes.map(|attributes| {
            Value::Object(
                attributes
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            )
        }),
    })
}

fn present(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

fn timestamp(value: &SdkDateTime, name: &str) -> Result<Option<DateTime<Utc>>> {
    if value.secs() == 0 && value.subsec_nanos() == 0 {
        return Ok(None);
    }
    to_utc(value).map(Some).ok_or_else(|| {
        anyhow!(
            "vehicle summary field '{}' is out of range: {} seconds since epoch",
            name,
            value.secs()
        )
    })
}

/// `None` when the instant falls outside chrono's representable range.
fn to_utc(timestamp: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::fleetwise::config::{ACCESS_KEY_ID, SECRET_ACCESS_KEY};
    use fleetsync::Configuration;
    use mockito::{Matcher, Server};

    const LIST_VEHICLES_TARGET: &str = "IoTAutobahnControlPlane.ListVehicles";

    fn test_config() -> FleetWiseConfig {
        let configuration = Configuration::new()
            .with(ACCESS_KEY_ID, "AKIDEXAMPLE")
            .with(SECRET_ACCESS_KEY, "secret");
        FleetWiseConfig::from_configuration(&configuration).unwrap()
    }

    #[test]
    fn test_summary_deserializes_from_upstream_shape() {
        let summary: VehicleSummary = serde_json::from_str(
            r#"{
                "vehicleName": "car-1",
                "arn": "arn:aws:iotfleetwise:us-east-1:123456789012:vehicle/car-1",
                "creationTime": "2026-02-17T12:00:00Z",
                "lastModificationTime": "2026-02-18T08:30:00.250Z",
                "modelManifestArn": "arn:model",
                "decoderManifestArn": "arn:decoder",
                "attributes": {"make": "Acme"}
            }"#,
        )
        .unwrap();

        assert_eq!(summary.vehicle_name.as_deref(), Some("car-1"));
        assert_eq!(
            summary.creation_time.unwrap().to_rfc3339(),
            "2026-02-17T12:00:00+00:00"
        );
        assert_eq!(summary.attributes.unwrap()["make"], "Acme");
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let summary: VehicleSummary =
            serde_json::from_str(r#"{"vehicleName": "car-1"}"#).unwrap();
        assert_eq!(summary.decoder_manifest_arn, None);
        assert_eq!(summary.attributes, None);
    }

    #[test]
    fn test_to_utc() {
        let timestamp = SdkDateTime::from_secs_and_nanos(1_771_329_600, 500_000_000);
        let converted = to_utc(&timestamp).unwrap();
        assert_eq!(converted.timestamp(), 1_771_329_600);
        assert_eq!(converted.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_sdk_defaults_read_as_missing() {
        assert_eq!(present(String::new()), None);
        assert_eq!(present("arn:decoder".to_string()).as_deref(), Some("arn:decoder"));

        let epoch = SdkDateTime::from_secs(0);
        assert_eq!(timestamp(&epoch, "creationTime").unwrap(), None);

        let just_after = SdkDateTime::from_secs_and_nanos(0, 1_000);
        assert!(timestamp(&just_after, "creationTime").unwrap().is_some());
    }

    #[test]
    fn test_out_of_range_timestamp_is_not_reported_missing() {
        let far_future = SdkDateTime::from_secs(i64::MAX / 2);
        let err = timestamp(&far_future, "lastModificationTime").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("lastModificationTime"));
        assert!(message.contains("out of range"));
    }

    #[tokio::test]
    async fn test_list_vehicles_omitted_members_read_as_missing() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", LIST_VEHICLES_TARGET)
            .with_status(200)
            .with_header("content-type", "application/x-amz-json-1.0")
            .with_body(
                r#"{
                    "vehicleSummaries": [
                        {
                            "vehicleName": "car-1",
                            "arn": "arn:1",
                            "modelManifestArn": "m1",
                            "attributes": {}
                        }
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = FleetWiseClient::connect(&test_config(), Some(&server.url())).await;
        let page = client.list_vehicles(None).await.unwrap();

        let summary = &page.summaries[0];
        assert_eq!(summary.vehicle_name.as_deref(), Some("car-1"));
        assert_eq!(summary.decoder_manifest_arn, None);
        assert_eq!(summary.creation_time, None);
        assert_eq!(summary.last_modification_time, None);
    }

    #[tokio::test]
    async fn test_list_vehicles() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", LIST_VEHICLES_TARGET)
            .with_status(200)
            .with_header("content-type", "application/x-amz-json-1.0")
            .with_body(
                r#"{
                    "vehicleSummaries": [
                        {
                            "vehicleName": "car-1",
                            "arn": "arn:aws:iotfleetwise:us-east-1:123456789012:vehicle/car-1",
                            "modelManifestArn": "arn:model",
                            "decoderManifestArn": "arn:decoder",
                            "creationTime": 1771329600,
                            "lastModificationTime": 1771416000,
                            "attributes": {"make": "Acme", "model": "Roadster"}
                        }
                    ],
                    "nextToken": "page-2"
                }"#,
            )
            .create_async()
            .await;

        let client = FleetWiseClient::connect(&test_config(), Some(&server.url())).await;
        let page = client.list_vehicles(None).await.unwrap();

        assert_eq!(page.next_token.as_deref(), Some("page-2"));
        assert_eq!(page.summaries.len(), 1);

        let summary = &page.summaries[0];
        assert_eq!(summary.vehicle_name.as_deref(), Some("car-1"));
        assert_eq!(summary.model_manifest_arn.as_deref(), Some("arn:model"));
        assert_eq!(summary.decoder_manifest_arn.as_deref(), Some("arn:decoder"));
        assert_eq!(summary.creation_time.unwrap().timestamp(), 1_771_329_600);
        assert_eq!(
            summary.last_modification_time.unwrap().timestamp(),
            1_771_416_000
        );
        assert_eq!(summary.attributes.as_ref().unwrap()["model"], "Roadster");
    }

    #[tokio::test]
    async fn test_list_vehicles_sends_next_token() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .match_header("x-amz-target", LIST_VEHICLES_TARGET)
            .match_body(Matcher::PartialJsonString(
                r#"{"nextToken": "page-2"}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/x-amz-json-1.0")
            .with_body(r#"{"vehicleSummaries": []}"#)
            .create_async()
            .await;

        let client = FleetWiseClient::connect(&test_config(), Some(&server.url())).await;
        let page = client
            .list_vehicles(Some("page-2".to_string()))
            .await
            .unwrap();

        assert!(page.summaries.is_empty());
        assert_eq!(page.next_token, None);
    }

    #[tokio::test]
    async fn test_access_denied() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(400)
            .with_header("content-type", "application/x-amz-json-1.0")
            .with_body(
                r#"{"__type": "AccessDeniedException", "message": "User is not authorized"}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = FleetWiseClient::connect(&test_config(), Some(&server.url())).await;
        let err = client.list_vehicles(None).await.unwrap_err();

        assert!(err.to_string().contains("ListVehicles request failed"));
        // Retries are disabled: exactly one request.
        mock.assert_async().await;
    }
}

//! Wire types for the controller's consuming segments info endpoint.
//!
//! Shape of `GET /tables/{table}/consumingSegmentsInfo`:
//!
//! ```json
//! {
//!   "_segmentToConsumingInfoMap": {
//!     "orders__0__12__20240101T0000Z": [
//!       {
//!         "serverName": "Server_pinot-server-0_8098",
//!         "consumerState": "CONSUMING",
//!         "lastConsumedTimestamp": 1704067200000,
//!         "partitionToOffsetMap": { "0": "1500" },
//!         "partitionOffsetInfo": {
//!           "currentOffsetsMap": { "0": "1500" },
//!           "latestUpstreamOffsetMap": { "0": "1550" },
//!           "recordsLagMap": { "0": "50" },
//!           "availabilityLagMsMap": { "0": "120" }
//!         }
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! Controllers omit or null out maps freely, so every map tolerates both.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Partition id to string-encoded value. `None` when the controller sent null.
pub type OffsetMap = BTreeMap<String, Option<String>>;

/// Segment name to the replicas reporting on it.
pub type SegmentConsumingInfoMap = BTreeMap<String, Vec<ConsumingReplicaInfo>>;

/// Per-partition offset and lag telemetry for one replica.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionOffsetInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_offsets_map: OffsetMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latest_upstream_offset_map: OffsetMap,
    /// Partition id to records lag, the only map aggregation reads.
    #[serde(default, deserialize_with = "null_as_default")]
    pub records_lag_map: OffsetMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub availability_lag_ms_map: OffsetMap,
}

/// One server's view of a consuming segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumingReplicaInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub server_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consumer_state: String,
    /// Epoch millis of the last consumed message.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_consumed_timestamp: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub partition_to_offset_map: OffsetMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub partition_offset_info: PartitionOffsetInfo,
}

impl ConsumingReplicaInfo {
    /// Creates a replica carrying only a records lag map.
    pub fn with_lag<I, K, V>(server_name: impl Into<String>, lags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            server_name: server_name.into(),
            partition_offset_info: PartitionOffsetInfo {
                records_lag_map: lags
                    .into_iter()
                    .map(|(k, v)| (k.into(), Some(v.into())))
                    .collect(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Decoded consuming segments info response for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumingSegmentsInfo {
    #[serde(
        rename = "_segmentToConsumingInfoMap",
        default,
        deserialize_with = "null_as_default"
    )]
    pub segment_to_consuming_info: SegmentConsumingInfoMap,
}

impl ConsumingSegmentsInfo {
    /// Decodes a raw response body.
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn segments(&self) -> &SegmentConsumingInfoMap {
        &self.segment_to_consuming_info
    }

    pub fn replica_count(&self) -> usize {
        self.segment_to_consuming_info.values().map(Vec::len).sum()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//! Query catalogs: which filter expressions a run issues, and in what order.
//!
//! Order matters. The baseline is matched against a live run by position, so
//! appending queries is safe but reordering invalidates an existing baseline.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{BaselineError, Query, Suite};

/// Built-in regression suite: `(query, consistent)` pairs.
pub const DEFAULT_QUERIES: &[(&str, bool)] = &[
    ("", false),
    ("amqp", true),
    ("amqp and method == \"connection start\"", true),
    ("amqp and method == \"connection close\" and request.replyText == \"kthxbai\"", true),
    ("amqp and method == \"connection start\" and request.versionMajor == \"0\" and request.versionMinor == \"9\"", true),
    ("amqp and method == \"queue declare\" and request.queue == \"test-integration-declared-passive-queue\"", true),
    ("amqp and request.redelivered == \"false\" and request.routingKey == \"test-corrupted-message-regression\"", true),
    ("amqp and timestamp >= datetime(\"02/03/2022, 9:02:18.034 AM\") and timestamp <= datetime(\"02/03/2022, 9:02:32.634 AM\")", true),
    ("amqp and src.port == \"49346\" and dst.port == \"5672\"", true),
    ("amqp and method == \"basic publish\" and summary == \"not-existing-exchange\" and src.port == \"49332\" and dst.port == \"5672\" and timestamp >= datetime(\"02/03/2022, 9:02:17.935 AM\")", true),
    ("amqp and method == \"basic publish\" and summary == \"not-existing-exchange\" and request.routingKey == \"some-key\"", true),
    ("amqp and method == \"queue bind\" and summary == \"test-basic-ops-queue\"", true),
    ("amqp and method == \"exchange declare\" and summary == \"test-integration-declared-passive-exchange\" and request.autoDelete == \"true\" and request.durable == \"false\" and request.exchange == \"test-integration-declared-passive-exchange\" and request.internal == \"false\" and request.noWait == \"false\" and request.passive == \"true\" and request.type == \"direct\"", true),
    ("amqp and method == \"queue declare\" and summary == \"test-integration-declared-passive-queue\" and request.autoDelete == \"true\" and request.durable == \"true\" and request.exclusive == \"false\" and request.noWait == \"false\" and request.queue == \"true\" and request.queue == \"test-integration-declared-passive-queue\"", true),
    ("amqp and method == \"connection close\" and summary == \"NOT_IMPLEMENTED - active=false\" and request.classId == \"20\" and request.methodId == \"20\" and request.replyCode == \"\" and request.replyText == \"NOT_IMPLEMENTED - active=false\"", true),
    ("amqp and method == \"basic consume\" and summary == \"test.integration.consumer-flow\" and timestamp >= datetime(\"02/03/2022, 9:02:01.291 AM\") and request.consumerTag == \"ctag-/tmp/go-build1228491040/b001/amqp.test-7\" and request.queue == \"test.integration.consumer-flow\"", true),
    ("grpc", false),
    ("http", false),
    ("http2", false),
    ("kafka", false),
    ("kafka and request.apiKey == \"Produce\" and request.apiVersion == \"8\" and request.correlationID == \"2\" and request.payload.topicData.partitions.partitionData.records.recordBatch[\"firstTimestamp\"] == 1643962317412", true),
    ("kafka and request.apiKey == \"Fetch\" and request.apiVersion == \"11\" and request.size == \"104\" and request.payload.maxBytes == \"262144\" and request.payload.topics[0].partitions[0][\"fetchOffset\"] == 640", true),
    ("kafka and request.apiKey == \"ApiVersions\" and request.apiVersion == \"0\" and request.correlationID == \"1\"", true),
    ("kafka and request.apiKey == \"ListOffsets\" and request.apiVersion == \"1\" and summary == \"kafka-go-4619ebd3231b3901\" and response.correlationID == \"3\"", true),
    ("kafka and request.apiKey == \"Metadata\" and request.apiVersion == \"1\" and request.correlationID == \"2\" and request.size == \"94\" and response.payload.brokers == \"[{\"host\":\"localhost\",\"nodeId\":0,\"port\":9092,\"rack\":\"\"}]\" and response.payload.controllerID == \"0\"", true),
    ("kafka and request.apiKey == \"Produce\" and request.apiVersion == \"7\" and request.clientID == \"kafka-go.test@Corsair (github.com/segmentio/kafka-go)\" and request.correlationID == \"13\" and request.size == \"183\" and request.payload.timeout == \"2147483647\" and request.payload.transactionalID == 1 and request.payload.topicData.partitions.partitionData.records.recordBatch[\"firstTimestamp\"] == 1643962320535 and request.payload.topicData.partitions.partitionData.records.recordBatch.record[0][\"attributes\"] == 0 and request.payload.topicData.partitions.partitionData.records.recordBatch.record[0].value == \"6\"", true),
    ("kafka and request.apiKey == \"Fetch\" and request.apiVersion == \"10\" and summary == \"kafka-go-260b77aad1937b0f\" and response.payload.responses[0].partitionResponses[0].recordSet.recordBatch.record[0].value == \"3\"", true),
    ("redis", false),
    ("redis and method == \"PING\"", false),
    ("redis and method == \"FLUSHDB\"", false),
    ("redis and request.command == \"GET\" and request.key == \"counter3\"", true),
    ("redis and request.command == \"MULTI\" and request.type == \"Array\"", false),
    ("redis and request.command == \"SUBSCRIBE\" and request.key == \"mychannel1\"", true),
    ("redis and request.command == \"PING\" and request.type == \"Array\"", false),
    ("redis and request.command == \"GET\" and request.key == \"A\" and request.type == \"Array\"", true),
    ("redis and request.command == \"DEL\" and request.key == \"A\" and request.type == \"Array\"", true),
    ("redis and request.command == \"SET\" and request.key == \"key6\" and request.type == \"Array\" and request.value == \"value\"", false),
    ("redis and request.command == \"INFO\" and request.key == \"keyspace\" and request.type == \"Array\" and response.type == \"Bulk String\" and response.value == \"# Keyspace\"", false),
    ("redis and response.keyword == \"OK\" and response.type == \"Simple String\"", false),
    ("redis and request.command == \"EVALSHA\" and request.key == \"b3b5be469962cc72e488ee86a39ed8b552e3ed35\" and request.type == \"Array\" and request.value == \"[1, key2, value]\" and response.type == \"Error\" and response.value == \"NoScriptError: NOSCRIPT No matching script. Please use EVAL.\"", false),
    ("redis and request.command == \"EVAL\" and request.key == \"\n\t\t\t\tlocal r = redis.call('SET', KEYS[1], ARGV[1])\n\t\t\t\treturn r\n\t\t\t\" and request.type == \"Array\" and response.keyword == \"OK\" and response.type == \"Simple String\"", true),
    ("redis and request.command == \"SCRIPT\" and request.key == \"flush\" and request.type == \"Array\"", true),
    ("redis and request.command == \"SCRIPT\" and request.key == \"load\" and request.type == \"Array\" and request.value == \"return 'Unique script'\" and response.value == \"586deab7f5d7baecfdab4753abeff059e87bebe0\"", true),
    ("redis and request.command == \"EXPIRE\" and request.key == \"D\" and request.type == \"Array\" and request.value == \"14400\" and response.type == \"Integer\" and response.value == \"1\"", true),
    ("redis and (request.command == \"DBSIZE\" or request.command == \"TTL\" or request.command == \"WATCH\" or request.command == \"UNWATCH\")", false),
    ("redis and request.command == \"WATCH\" and request.key == \"{shard}key1\" and request.value == \"{shard}key2\"", true),
    ("redis and request.command == \"SET\" and request.key == \";��Q&���_�Z7�\u{1e}ω;�;���sh��\u{19}\u{14}���\u{1}?��.x����W�;kE7\n!)\u{1d}�z7��߯�Qe\u{16}N�\"", true),
    ("redis and request.command == \"AUTH\" and request.key == \"password1\" and response.type == \"Error\" and response.value == \"DataError: ERR AUTH <password> called without any password configured for the default user. Are you sure your configuration is correct?\"", true),
    ("redis and request.command == \"CLIENT\" and request.key == \"setname\" and request.type == \"Array\" and request.value == \"foobar\"", true),
    ("redis and request.command == \"CLIENT\" and request.key == \"getname\" and request.type == \"Array\" and response.type == \"Bulk String\" and response.value == \"foobar\"", true),
];

/// One entry of a YAML-defined catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub query: String,
    #[serde(default)]
    pub consistent: bool,
}

/// The ordered list of queries to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for QueryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl QueryCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            entries: DEFAULT_QUERIES
                .iter()
                .map(|(query, consistent)| CatalogEntry {
                    query: (*query).to_string(),
                    consistent: *consistent,
                })
                .collect(),
        }
    }

    /// Load a catalog from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BaselineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BaselineError::Catalog(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a catalog from a YAML list of `{query, consistent}` entries.
    pub fn from_yaml(yaml: &str) -> Result<Self, BaselineError> {
        let entries: Vec<CatalogEntry> = serde_yaml::from_str(yaml)
            .map_err(|e| BaselineError::Catalog(format!("invalid catalog: {e}")))?;
        if entries.is_empty() {
            return Err(BaselineError::Catalog(
                "catalog contains no queries".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh queries with zero counts, ready to be run.
    pub fn queries(&self) -> impl Iterator<Item = Query> + '_ {
        self.entries
            .iter()
            .map(|e| Query::new(e.query.clone(), e.consistent))
    }

    /// A suite with one unrun query per catalog entry.
    pub fn to_suite(&self) -> Suite {
        self.queries().collect()
    }
}

//! Result summaries
//!
//! Built once a stream is exhausted, from the RUN acknowledgement and the
//! metadata of the final PULL or DISCARD.

use super::notification::Notification;
use super::plan::{Plan, ProfiledPlan};
use crate::error::Result;
use crate::packstream::{Value, ValueMap};
use crate::protocol::ProtocolVersion;

/// What kind of work a query did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    ReadOnly,
    ReadWrite,
    WriteOnly,
    SchemaWrite,
    Unknown,
}

impl QueryType {
    fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("r") => QueryType::ReadOnly,
            Some("rw") => QueryType::ReadWrite,
            Some("w") => QueryType::WriteOnly,
            Some("s") => QueryType::SchemaWrite,
            _ => QueryType::Unknown,
        }
    }
}

/// Update statistics reported by the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    pub nodes_created: i64,
    pub nodes_deleted: i64,
    pub relationships_created: i64,
    pub relationships_deleted: i64,
    pub properties_set: i64,
    pub labels_added: i64,
    pub labels_removed: i64,
    pub indexes_added: i64,
    pub indexes_removed: i64,
    pub constraints_added: i64,
    pub constraints_removed: i64,
    pub system_updates: i64,
}

impl Counters {
    fn from_stats(stats: &ValueMap) -> Self {
        let count = |key: &str| stats.get(key).and_then(Value::as_int).unwrap_or(0);
        Self {
            nodes_created: count("nodes-created"),
            nodes_deleted: count("nodes-deleted"),
            relationships_created: count("relationships-created"),
            relationships_deleted: count("relationships-deleted"),
            properties_set: count("properties-set"),
            labels_added: count("labels-added"),
            labels_removed: count("labels-removed"),
            indexes_added: count("indexes-added"),
            indexes_removed: count("indexes-removed"),
            constraints_added: count("constraints-added"),
            constraints_removed: count("constraints-removed"),
            system_updates: count("system-updates"),
        }
    }

    /// Whether the query changed any data or schema
    pub fn contains_updates(&self) -> bool {
        [
            self.nodes_created,
            self.nodes_deleted,
            self.relationships_created,
            self.relationships_deleted,
            self.properties_set,
            self.labels_added,
            self.labels_removed,
            self.indexes_added,
            self.indexes_removed,
            self.constraints_added,
            self.constraints_removed,
        ]
        .iter()
        .any(|&count| count > 0)
    }

    pub fn contains_system_updates(&self) -> bool {
        self.system_updates > 0
    }
}

/// The server a result came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub protocol_version: ProtocolVersion,

    /// Product and version, e.g. `Neo4j/5.13.0`, when the owner recorded it
    pub agent: Option<String>,
}

/// Terminal summary of one query
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub query: String,
    pub parameters: ValueMap,
    pub query_type: QueryType,
    pub counters: Counters,

    /// Milliseconds until the first record was available (`t_first`)
    pub result_available_after: Option<i64>,

    /// Milliseconds until the last record was consumed (`t_last`)
    pub result_consumed_after: Option<i64>,

    pub database: Option<String>,
    pub bookmark: Option<String>,

    pub notifications: Vec<Notification>,

    /// Present for EXPLAIN, and for PROFILE alongside `profile`
    pub plan: Option<Plan>,
    pub profile: Option<ProfiledPlan>,

    /// None when the stream was not created by a connection
    pub server: Option<ServerInfo>,
}

impl ResultSummary {
    pub fn has_plan(&self) -> bool {
        self.plan.is_some()
    }

    pub fn has_profile(&self) -> bool {
        self.profile.is_some()
    }
}

/// Accumulates summary metadata while a stream runs
#[derive(Debug, Default)]
pub(crate) struct SummaryCollector {
    result_available_after: Option<i64>,
    result_consumed_after: Option<i64>,
    query_type: Option<String>,
    counters: Counters,
    database: Option<String>,
    bookmark: Option<String>,
    notifications: Vec<Notification>,
    plan: Option<Plan>,
    profile: Option<ProfiledPlan>,
}

impl SummaryCollector {
    pub(crate) fn collect_run(&mut self, metadata: &ValueMap) {
        self.result_available_after = metadata.get("t_first").and_then(Value::as_int);
    }

    /// Metadata of the final PULL or DISCARD
    ///
    /// A plan or notification of the wrong shape is a protocol error.
    pub(crate) fn collect_final(&mut self, metadata: &ValueMap) -> Result<()> {
        let text = |key: &str| metadata.get(key).and_then(Value::as_str).map(str::to_string);

        self.result_consumed_after = metadata.get("t_last").and_then(Value::as_int);
        self.query_type = text("type");
        self.database = text("db");
        self.bookmark = text("bookmark");
        if let Some(stats) = metadata.get("stats").and_then(Value::as_map) {
            self.counters = Counters::from_stats(stats);
        }
        self.notifications = Notification::collect(metadata)?;
        self.plan = Plan::collect(metadata, "plan")?;
        self.profile = ProfiledPlan::collect(metadata, "profile")?;
        Ok(())
    }

    pub(crate) fn build(
        &self,
        query: &str,
        parameters: &ValueMap,
        server: Option<ServerInfo>,
    ) -> ResultSummary {
        ResultSummary {
            query: query.to_string(),
            parameters: parameters.clone(),
            query_type: QueryType::from_code(self.query_type.as_deref()),
            counters: self.counters.clone(),
            result_available_after: self.result_available_after,
            result_consumed_after: self.result_consumed_after,
            database: self.database.clone(),
            bookmark: self.bookmark.clone(),
            notifications: self.notifications.clone(),
            plan: self.plan.clone(),
            profile: self.profile.clone(),
            server,
        }
    }
}

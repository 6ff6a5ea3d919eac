//! Query plans
//!
//! Parsed from the `plan` (EXPLAIN) and `profile` (PROFILE) entries of
//! the final summary metadata. Both are trees of operators.

use crate::error::{BoltError, Result};
use crate::packstream::{Value, ValueMap};

/// One operator of an EXPLAIN plan
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub operator_type: String,
    pub arguments: ValueMap,
    pub identifiers: Vec<String>,
    pub children: Vec<Plan>,
}

/// One operator of a PROFILE plan, with the statistics it recorded
#[derive(Debug, Clone, PartialEq)]
pub struct ProfiledPlan {
    pub operator_type: String,
    pub arguments: ValueMap,
    pub identifiers: Vec<String>,
    pub db_hits: i64,
    pub rows: i64,
    pub page_cache_hits: i64,
    pub page_cache_misses: i64,
    pub page_cache_hit_ratio: f64,

    /// Milliseconds spent in this operator
    pub time: i64,
    pub children: Vec<ProfiledPlan>,
}

impl Plan {
    /// Parse the plan under `key`; an absent, null or empty entry is no plan
    pub(crate) fn collect(metadata: &ValueMap, key: &str) -> Result<Option<Self>> {
        match entry(metadata, key)? {
            Some(map) => Self::parse(map).map(Some),
            None => Ok(None),
        }
    }

    fn parse(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            operator_type: required_str(map, "operatorType")?,
            arguments: arguments(map)?,
            identifiers: identifiers(map)?,
            children: children(map)?
                .into_iter()
                .map(Self::parse)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

impl ProfiledPlan {
    pub(crate) fn collect(metadata: &ValueMap, key: &str) -> Result<Option<Self>> {
        match entry(metadata, key)? {
            Some(map) => Self::parse(map).map(Some),
            None => Ok(None),
        }
    }

    fn parse(map: &ValueMap) -> Result<Self> {
        let optional_int = |key: &str| map.get(key).and_then(Value::as_int).unwrap_or(0);

        Ok(Self {
            operator_type: required_str(map, "operatorType")?,
            arguments: arguments(map)?,
            identifiers: identifiers(map)?,
            db_hits: required_int(map, "dbHits")?,
            rows: required_int(map, "rows")?,
            page_cache_hits: optional_int("pageCacheHits"),
            page_cache_misses: optional_int("pageCacheMisses"),
            page_cache_hit_ratio: map
                .get("pageCacheHitRatio")
                .and_then(Value::as_float)
                .unwrap_or(0.0),
            time: optional_int("time"),
            children: children(map)?
                .into_iter()
                .map(Self::parse)
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Whether the server reported page cache statistics for this operator
    pub fn has_page_cache_stats(&self) -> bool {
        self.page_cache_hits > 0 || self.page_cache_misses > 0 || self.page_cache_hit_ratio > 0.0
    }
}

// =============================================================================
// Field Access
// =============================================================================

fn entry<'m>(metadata: &'m ValueMap, key: &str) -> Result<Option<&'m ValueMap>> {
    match metadata.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Map(map)) if map.is_empty() => Ok(None),
        Some(Value::Map(map)) => Ok(Some(map)),
        Some(other) => Err(BoltError::protocol(format!(
            "'{}' metadata must be a Map, got {}",
            key,
            other.type_name()
        ))),
    }
}

fn required_str(map: &ValueMap, key: &str) -> Result<String> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(BoltError::protocol(format!(
            "plan key '{}' must be a String, got {}",
            key,
            other.type_name()
        ))),
        None => Err(missing(key)),
    }
}

fn required_int(map: &ValueMap, key: &str) -> Result<i64> {
    match map.get(key) {
        Some(Value::Integer(i)) => Ok(*i),
        Some(other) => Err(BoltError::protocol(format!(
            "plan key '{}' must be an Integer, got {}",
            key,
            other.type_name()
        ))),
        None => Err(missing(key)),
    }
}

fn missing(key: &str) -> BoltError {
    BoltError::protocol(format!("plan is missing required key '{}'", key))
}

fn arguments(map: &ValueMap) -> Result<ValueMap> {
    match map.get("args") {
        None | Some(Value::Null) => Ok(ValueMap::new()),
        Some(Value::Map(args)) => Ok(args.clone()),
        Some(other) => Err(BoltError::protocol(format!(
            "plan 'args' must be a Map, got {}",
            other.type_name()
        ))),
    }
}

fn identifiers(map: &ValueMap) -> Result<Vec<String>> {
    match map.get("identifiers") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    BoltError::protocol(format!(
                        "plan identifier must be a String, got {}",
                        item.type_name()
                    ))
                })
            })
            .collect(),
        Some(other) => Err(BoltError::protocol(format!(
            "plan 'identifiers' must be a List, got {}",
            other.type_name()
        ))),
    }
}

fn children(map: &ValueMap) -> Result<Vec<&ValueMap>> {
    match map.get("children") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| {
                item.as_map().ok_or_else(|| {
                    BoltError::protocol(format!(
                        "child plan must be a Map, got {}",
                        item.type_name()
                    ))
                })
            })
            .collect(),
        Some(other) => Err(BoltError::protocol(format!(
            "plan 'children' must be a List, got {}",
            other.type_name()
        ))),
    }
}

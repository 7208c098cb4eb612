//! Key-value zones of the `http` and `stream` modules.

use std::collections::HashMap;

use http::StatusCode;

use crate::client::{Client, Transport};
use crate::common::error::ResultExt;
use crate::common::{Error, Result};
use crate::upstream::Context;

/// Key-value pairs stored in a zone.
pub type KeyValPairs = HashMap<String, String>;

/// Key-value pairs of every zone, by zone name.
pub type KeyValPairsByZone = HashMap<String, KeyValPairs>;

fn zone_path(context: Context, zone: &str) -> Result<String> {
    if zone.is_empty() {
        return Err(Error::Validation("zone required".into()));
    }
    Ok(format!("{}/keyvals/{}", context.as_str(), zone))
}

impl<T: Transport> Client<T> {
    pub async fn get_keyvals(&self, context: Context, zone: &str) -> Result<KeyValPairs> {
        let path = zone_path(context, zone)?;
        self.get(&path)
            .await
            .with_context(|| format!("getting keyvals for {}/{} zone", context.as_str(), zone))
    }

    pub async fn get_all_keyvals(&self, context: Context) -> Result<KeyValPairsByZone> {
        let path = format!("{}/keyvals", context.as_str());
        self.get(&path)
            .await
            .with_context(|| format!("getting keyvals for all {} zones", context.as_str()))
    }

    pub async fn add_keyval(&self, context: Context, zone: &str, key: &str, value: &str) -> Result<()> {
        let path = zone_path(context, zone)?;
        let input = HashMap::from([(key, value)]);
        self.post(&path, &input).await.with_context(|| {
            format!("adding key value pair for {}/{} zone", context.as_str(), zone)
        })
    }

    /// Changes the value of an existing key.
    pub async fn modify_keyval(&self, context: Context, zone: &str, key: &str, value: &str) -> Result<()> {
        let path = zone_path(context, zone)?;
        let input = HashMap::from([(key, value)]);
        self.patch(&path, &input, &[StatusCode::NO_CONTENT])
            .await
            .with_context(|| {
                format!("updating key value pair for {}/{} zone", context.as_str(), zone)
            })
    }

    /// Deletes a key by setting its value to null.
    pub async fn delete_keyval(&self, context: Context, zone: &str, key: &str) -> Result<()> {
        let path = zone_path(context, zone)?;
        let input: HashMap<&str, Option<&str>> = HashMap::from([(key, None)]);
        self.patch(&path, &input, &[StatusCode::NO_CONTENT])
            .await
            .with_context(|| {
                format!("removing key value pair for {}/{} zone", context.as_str(), zone)
            })
    }

    /// Deletes every key of the zone.
    pub async fn delete_all_keyvals(&self, context: Context, zone: &str) -> Result<()> {
        let path = zone_path(context, zone)?;
        self.delete(&path, &[StatusCode::NO_CONTENT])
            .await
            .with_context(|| {
                format!("removing all key value pairs for {}/{} zone", context.as_str(), zone)
            })
    }
}

use super::Source;
use crate::config::{Settings, SETTINGS_TABLE};
use crate::error::Result;
use crate::store::PageRequest;

pub struct SettingsQuery<'a> {
    source: Source<'a>,
}

impl<'a> SettingsQuery<'a> {
    pub fn new(source: Source<'a>) -> Self {
        Self { source }
    }

    /// The tenant's settings row, with defaults for anything unset.
    ///
    /// The all-tenants scope has no single owner and always gets defaults.
    pub fn load(&self) -> Result<Settings> {
        let Some(tenant) = self.source.scope.tenant_id() else {
            return Ok(Settings::default());
        };

        let request = PageRequest::new(SETTINGS_TABLE).eq("tenant_id", tenant).limit(1);
        let rows = self.source.store.fetch_page(&request)?;

        match rows.into_iter().next() {
            Some(mut row) => {
                // Nulls fall back to per-field defaults.
                row.retain(|_, v| !v.is_null());
                let value = serde_json::Value::Object(row.into_iter().collect());
                Ok(serde_json::from_value(value)?)
            }
            None => Ok(Settings::default()),
        }
    }
}

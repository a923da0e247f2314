use crate::client_message::ClientMessage;
use crate::log::FeedEntry;
use anyhow::Result;
use schemars::{schema_for, JsonSchema};
use serde::Serialize;
use std::path::Path;

//Everything the engine sends to a presentation layer
#[derive(Serialize, JsonSchema)]
pub enum Protocol {
    Feed(FeedEntry),
    Request(ClientMessage),
}

pub fn schema_json() -> Result<String> {
    let schema = schema_for!(Protocol);
    Ok(serde_json::to_string_pretty(&schema)?)
}

pub fn write_schema(path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, schema_json()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_feed_and_requests() {
        let schema = schema_json().unwrap();
        assert!(schema.contains("FeedEntry"));
        assert!(schema.contains("ClientMessage"));
        assert!(schema.contains("StateBasedAction"));
    }
}

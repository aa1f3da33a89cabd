//! XML payload for the `sendMessage` process action.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A trigger message addressed to an undercover agent (UCA) of a process app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerMessage {
    pub process_app: String,
    #[serde(default)]
    pub snapshot: Option<String>,
    pub uca_name: String,
    pub event_name: String,
    #[serde(default)]
    pub parameters: Vec<(String, String)>,
}

impl TriggerMessage {
    pub fn new(process_app: &str, uca_name: &str, event_name: &str) -> Self {
        Self {
            process_app: process_app.to_string(),
            snapshot: None,
            uca_name: uca_name.to_string(),
            event_name: event_name.to_string(),
            parameters: Vec::new(),
        }
    }

    pub fn snapshot(mut self, snapshot: &str) -> Self {
        self.snapshot = Some(snapshot.to_string());
        self
    }

    pub fn parameter(mut self, key: &str, value: &str) -> Self {
        self.parameters.push((key.to_string(), value.to_string()));
        self
    }

    /// Serialize to the `<eventmsg>` document the server expects.
    pub fn to_xml(&self) -> Result<String, ApiError> {
        let mut writer = Writer::new(Vec::new());

        write(&mut writer, Event::Start(BytesStart::new("eventmsg")))?;

        let mut event = BytesStart::new("event");
        event.push_attribute(("processApp", self.process_app.as_str()));
        if let Some(snapshot) = &self.snapshot {
            event.push_attribute(("snapshot", snapshot.as_str()));
        }
        event.push_attribute(("ucaname", self.uca_name.as_str()));
        write(&mut writer, Event::Start(event))?;
        write(&mut writer, Event::Text(BytesText::new(&self.event_name)))?;
        write(&mut writer, Event::End(BytesEnd::new("event")))?;

        if !self.parameters.is_empty() {
            write(&mut writer, Event::Start(BytesStart::new("parameters")))?;
            for (key, value) in &self.parameters {
                write(&mut writer, Event::Start(BytesStart::new("parameter")))?;
                text_element(&mut writer, "key", key)?;
                text_element(&mut writer, "value", value)?;
                write(&mut writer, Event::End(BytesEnd::new("parameter")))?;
            }
            write(&mut writer, Event::End(BytesEnd::new("parameters")))?;
        }

        write(&mut writer, Event::End(BytesEnd::new("eventmsg")))?;
        String::from_utf8(writer.into_inner()).map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), ApiError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ApiError> {
    writer
        .write_event(event)
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_message() {
        let xml = TriggerMessage::new("HSS", "StartUCA", "go").to_xml().unwrap();
        assert_eq!(
            xml,
            r#"<eventmsg><event processApp="HSS" ucaname="StartUCA">go</event></eventmsg>"#
        );
    }

    #[test]
    fn snapshot_and_parameters() {
        let xml = TriggerMessage::new("HSS", "StartUCA", "go")
            .snapshot("v1.0")
            .parameter("customer", "42")
            .parameter("region", "EU")
            .to_xml()
            .unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<eventmsg><event processApp="HSS" snapshot="v1.0" ucaname="StartUCA">go</event>"#,
                "<parameters>",
                "<parameter><key>customer</key><value>42</value></parameter>",
                "<parameter><key>region</key><value>EU</value></parameter>",
                "</parameters></eventmsg>"
            )
        );
    }

    #[test]
    fn special_characters_are_escaped() {
        let xml = TriggerMessage::new("A&B", "UCA", "x<y")
            .parameter("k", "\"quoted\" & <tagged>")
            .to_xml()
            .unwrap();
        assert!(xml.contains(r#"processApp="A&amp;B""#));
        assert!(xml.contains("x&lt;y"));
        assert!(xml.contains("&lt;tagged&gt;"));
        assert!(!xml.contains("<tagged>"));
    }
}

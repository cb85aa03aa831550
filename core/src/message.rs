use serde::{Deserialize, Serialize};

use crate::SecondarySlot;

/// Pushed to browsers over the dashboard websocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Replace the contents of the element with id `target`.
    #[serde(rename = "replace")]
    Replace { target: String, html: String },
    /// Append to `target`, keeping at most `keep` children.
    #[serde(rename = "append")]
    Append {
        target: String,
        html: String,
        keep: usize,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "swap")]
    Swap { slot: SecondarySlot },
    #[serde(rename = "refresh_feeds")]
    RefreshFeeds,
    #[serde(rename = "dismiss_banner")]
    DismissBanner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_serialization() {
        let msg = ServerMessage::Append {
            target: "log".into(),
            html: "<div>#1</div>".into(),
            keep: 500,
        };

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"append""#));
        assert!(json.contains(r#""target":"log""#));
        assert!(json.contains(r#""keep":500"#));
    }

    #[test]
    fn test_client_message_deserialization() {
        let json = r#"{"type":"swap","slot":"secondary-1"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();

        match msg {
            ClientMessage::Swap { slot } => assert_eq!(slot, SecondarySlot::First),
            _ => panic!("Expected Swap variant"),
        }
    }

    #[test]
    fn test_client_message_rejects_main_swap() {
        let json = r#"{"type":"swap","slot":"main"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_unit_client_messages() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"refresh_feeds"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::RefreshFeeds));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"dismiss_banner"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::DismissBanner));
    }
}

use serde::{Deserialize, Serialize};

/// One entry of `hyprctl clients -j`.
///
/// Only the attributes the rule matcher cares about are typed; everything
/// else in the compositor's output is ignored during decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pid: i32,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub initial_class: String,
    #[serde(default)]
    pub initial_title: String,
    #[serde(default)]
    pub workspace: WorkspaceRef,
    #[serde(default)]
    pub floating: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRef {
    pub id: i64,
    pub name: String,
}

impl ClientInfo {
    /// Decode the JSON array printed by `hyprctl clients -j`.
    pub fn parse_list(json: &str) -> serde_json::Result<Vec<ClientInfo>> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYPRCTL_OUTPUT: &str = r#"[
        {
            "address": "0x55d1c0a3b2f0",
            "mapped": true,
            "hidden": false,
            "at": [10, 40],
            "size": [1900, 1030],
            "workspace": {"id": 2, "name": "web"},
            "floating": false,
            "monitor": 0,
            "class": "firefox",
            "title": "Mozilla Firefox",
            "initialClass": "firefox",
            "initialTitle": "Mozilla Firefox",
            "pid": 4242,
            "xwayland": false,
            "pinned": false,
            "fullscreen": 0,
            "grouped": [],
            "tags": []
        },
        {
            "address": "0x55d1c0a3c100",
            "workspace": {"id": -98, "name": "special:scratch"},
            "floating": true,
            "class": "kitty",
            "title": "~",
            "initialClass": "kitty",
            "initialTitle": "kitty",
            "pid": 5151
        }
    ]"#;

    #[test]
    fn test_parse_hyprctl_clients() {
        let clients = ClientInfo::parse_list(HYPRCTL_OUTPUT).unwrap();
        assert_eq!(clients.len(), 2);

        assert_eq!(clients[0].class, "firefox");
        assert_eq!(clients[0].initial_title, "Mozilla Firefox");
        assert_eq!(clients[0].workspace.id, 2);
        assert_eq!(clients[0].workspace.name, "web");
        assert!(!clients[0].floating);

        assert_eq!(clients[1].workspace.name, "special:scratch");
        assert_eq!(clients[1].workspace.id, -98);
        assert!(clients[1].floating);
        assert_eq!(clients[1].pid, 5151);
    }

    #[test]
    fn test_missing_fields_default() {
        let clients = ClientInfo::parse_list(r#"[{"class": "mpv"}]"#).unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].class, "mpv");
        assert_eq!(clients[0].title, "");
        assert_eq!(clients[0].workspace, WorkspaceRef::default());
    }

    #[test]
    fn test_empty_list() {
        let clients = ClientInfo::parse_list("[]").unwrap();
        assert!(clients.is_empty());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(ClientInfo::parse_list(r#"[{"class": "mpv""#).is_err());
        assert!(ClientInfo::parse_list(r#"{"class": "mpv"}"#).is_err());
    }

    #[test]
    fn test_client_info_serialization() {
        let client = ClientInfo {
            class: "org.gnome.Nautilus".to_string(),
            initial_class: "org.gnome.Nautilus".to_string(),
            workspace: WorkspaceRef {
                id: 3,
                name: "3".to_string(),
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&client).unwrap();
        assert!(json.contains("\"initialClass\":\"org.gnome.Nautilus\""));
        assert!(json.contains("\"workspace\":{\"id\":3,\"name\":\"3\"}"));

        let deserialized: ClientInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, client);
    }
}

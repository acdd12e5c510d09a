use serde_json::{json, Value};

use super::COMMAND;
use crate::config::AddonConfig;

/// The add-on descriptor served at `/`.
///
/// HipChat reads it at install time to learn the install callback, the API
/// scopes to grant and the `/standup` webhook to register.
pub fn capabilities(config: &AddonConfig) -> Value {
    json!({
        "links": {
            "self": config.base_url,
            "homepage": config.base_url,
        },
        "key": config.plugin_key,
        "name": config.addon_name,
        "description": "HipChat connect add-on that supports async standups",
        "vendor": {
            "name": "Gank Incoming",
            "url": "",
        },
        "capabilities": {
            "installable": {
                "allowGlobal": false,
                "allowRoom": true,
                "callbackUrl": format!("{}/installable", config.base_url),
            },
            "hipchatApiConsumer": {
                "scopes": ["view_group", "send_notification"],
                "fromName": config.from_name,
            },
            "webhook": [
                {
                    "url": format!("{}/standup", config.base_url),
                    "event": "room_message",
                    "pattern": format!("^{}(\\s|$).*", COMMAND),
                }
            ],
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_points_at_base_url() {
        let descriptor = capabilities(&AddonConfig::with_base_url("https://standup.example.com"));

        assert_eq!(descriptor["key"], "gi-standup");
        assert_eq!(
            descriptor["capabilities"]["installable"]["callbackUrl"],
            "https://standup.example.com/installable"
        );
        assert_eq!(
            descriptor["capabilities"]["webhook"][0]["url"],
            "https://standup.example.com/standup"
        );
        assert_eq!(descriptor["capabilities"]["webhook"][0]["pattern"], r"^/standup(\s|$).*");
        assert_eq!(
            descriptor["capabilities"]["hipchatApiConsumer"]["scopes"],
            json!(["view_group", "send_notification"])
        );
    }
}

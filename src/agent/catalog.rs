//! Fixed tool catalog offered to the model.
//!
//! Every tool takes no parameters and is bound to exactly one route of the
//! HTTP surface. The table is data so tests can enumerate it.

use serde_json::json;

use crate::providers::ToolDefinition;

/// Prefix shared by the emoticon tools (`emo_happy`, `emo_wink`, ...).
pub const EMOTICON_TOOL_PREFIX: &str = "emo_";

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub endpoint: &'static str,
}

impl ToolSpec {
    /// The emoticon tag this tool displays, if it is an emoticon tool.
    ///
    /// # Example
    /// ```
    /// use zeptosense::agent::catalog::find;
    ///
    /// assert_eq!(find("emo_happy").unwrap().emoticon_tag(), Some("happy"));
    /// assert_eq!(find("turn_led_on").unwrap().emoticon_tag(), None);
    /// ```
    pub fn emoticon_tag(&self) -> Option<&'static str> {
        self.name.strip_prefix(EMOTICON_TOOL_PREFIX)
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name,
            self.description,
            json!({"type": "object", "properties": {}}),
        )
    }
}

const fn tool(
    name: &'static str,
    description: &'static str,
    endpoint: &'static str,
) -> ToolSpec {
    ToolSpec {
        name,
        description,
        endpoint,
    }
}

pub const TOOLS: &[ToolSpec] = &[
    tool(
        "get_temperature",
        "获取当前温度传感器读数",
        "/api/sensor/temperature",
    ),
    tool("get_humidity", "获取当前湿度传感器读数", "/api/sensor/humidity"),
    tool(
        "get_temp_humidity",
        "同时获取温度和湿度读数",
        "/api/sensor/temp-humidity",
    ),
    tool(
        "get_all_sensor_data",
        "获取所有传感器读数（温度、湿度、光照、红外）",
        "/api/sensor/all",
    ),
    tool("turn_led_on", "打开LED灯", "/api/control/led/on"),
    tool("turn_led_off", "关闭LED灯", "/api/control/led/off"),
    tool("emo_happy", "做快乐的表情", "/api/emo/happy"),
    tool("emo_wink", "显示眨眼的表情", "/api/emo/wink"),
    tool("emo_surprised", "显示惊讶的表情", "/api/emo/surprised"),
    tool("emo_angry", "显示愤怒的表情", "/api/emo/angry"),
    tool("emo_sleepy", "显示困倦的表情", "/api/emo/sleepy"),
    tool("emo_crying", "显示哭泣的表情", "/api/emo/crying"),
    tool("emo_playful", "显示调皮的表情", "/api/emo/playful"),
    tool("emo_cute", "显示可爱的表情", "/api/emo/cute"),
    tool("emo_thinking", "显示思考的表情", "/api/emo/thinking"),
    tool("emo_love", "显示爱心的表情", "/api/emo/love"),
];

/// Look up a tool by name.
pub fn find(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}

/// Provider-facing definitions for the whole catalog, in catalog order.
pub fn definitions() -> Vec<ToolDefinition> {
    TOOLS.iter().map(ToolSpec::definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::emoticon;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_sixteen_unique_tools() {
        assert_eq!(TOOLS.len(), 16);
        let names: HashSet<_> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn test_every_endpoint_is_an_api_route() {
        for spec in TOOLS {
            assert!(spec.endpoint.starts_with("/api/"), "{}", spec.name);
        }
    }

    #[test]
    fn test_emoticon_tools_cover_the_emoticon_table() {
        let tags: HashSet<_> = TOOLS.iter().filter_map(|t| t.emoticon_tag()).collect();
        let table: HashSet<_> = emoticon::tags().collect();
        assert_eq!(tags, table);

        for spec in TOOLS.iter().filter(|t| t.emoticon_tag().is_some()) {
            let tag = spec.emoticon_tag().unwrap();
            assert_eq!(spec.endpoint, format!("/api/emo/{}", tag));
        }
    }

    #[test]
    fn test_definitions_have_empty_parameters() {
        let defs = definitions();
        assert_eq!(defs.len(), TOOLS.len());
        assert_eq!(defs[0].name, "get_temperature");
        for def in defs {
            assert_eq!(def.parameters["type"], "object");
            assert!(def.parameters["properties"].as_object().unwrap().is_empty());
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(
            find("get_all_sensor_data").unwrap().endpoint,
            "/api/sensor/all"
        );
        assert!(find("format_disk").is_none());
    }
}

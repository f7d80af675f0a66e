//! JSON envelopes and user-facing messages.
//!
//! Every response is HTTP 200. Clients check `success`, never the status code.

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

pub const MSG_CONNECTION_FAILED: &str = "串口连接失败";
pub const MSG_LED_ON: &str = "LED已打开";
pub const MSG_LED_OFF: &str = "LED已关闭";
pub const MSG_INVALID_LED_STATUS: &str = "无效的状态参数，使用 'on' 或 'off'";

/// LED or LCD I/O failure.
pub fn operation_failed(err: impl std::fmt::Display) -> String {
    format!("操作失败: {}", err)
}

/// LCD success message; `text` is what the display actually shows.
pub fn lcd_text_set(text: &str) -> String {
    format!("LCD显示内容已设置为: {}", text)
}

/// Emoticon I/O failure.
pub fn emoticon_failed(err: impl std::fmt::Display) -> String {
    format!("获取表情符号失败: {}", err)
}

/// `{"success": true, "data": data}`
pub fn success_data<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// `{"success": false, "message": message}`
pub fn failure(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "success": false, "message": message.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_wraps_data() {
        let Json(v) = success_data(json!({"temperature": 21.5}));
        assert_eq!(v["success"], true);
        assert_eq!(v["data"]["temperature"], 21.5);
    }

    #[test]
    fn test_failure_envelope_shape() {
        let Json(v) = failure(MSG_CONNECTION_FAILED);
        assert_eq!(v, json!({"success": false, "message": "串口连接失败"}));
    }

    #[test]
    fn test_message_formats() {
        assert_eq!(operation_failed("broken pipe"), "操作失败: broken pipe");
        assert_eq!(lcd_text_set("hi?"), "LCD显示内容已设置为: hi?");
        assert_eq!(emoticon_failed("x"), "获取表情符号失败: x");
    }
}

//! Publication sinks: structured log records, or JSON lines on stdout.

use drywatch_traits::Sink;

/// Publishes every channel as a tracing event.
pub struct LogSink;

impl Sink for LogSink {
    fn set_temp(&mut self, value: Option<f32>) {
        tracing::info!(channel = "set_temp", value = ?value, "publish");
    }
    fn current_temp(&mut self, value: Option<f32>) {
        tracing::info!(channel = "current_temp", value = ?value, "publish");
    }
    fn humidity(&mut self, value: Option<f32>) {
        tracing::info!(channel = "humidity", value = ?value, "publish");
    }
    fn drying_time(&mut self, hhmmss: &str) {
        tracing::info!(channel = "drying_time", value = hhmmss, "publish");
    }
    fn material(&mut self, name: &str) {
        tracing::info!(channel = "material", value = name, "publish");
    }
    fn cursor(&mut self, name: &str) {
        tracing::info!(channel = "cursor", value = name, "publish");
    }
    fn temp_units(&mut self, units: &str) {
        tracing::info!(channel = "temp_units", value = units, "publish");
    }
    fn error_status(&mut self, code: &str) {
        tracing::info!(channel = "error_status", value = code, "publish");
    }
    fn dryer_status(&mut self, status: &str) {
        tracing::info!(channel = "dryer_status", value = status, "publish");
    }
}

/// Publishes every channel as one JSON object per line on stdout
/// (`{"channel": "...", "value": ...}`); numeric channels use `null` for
/// "no value".
pub struct JsonlSink;

impl JsonlSink {
    fn emit(&self, channel: &str, value: serde_json::Value) {
        let line = serde_json::json!({ "channel": channel, "value": value });
        println!("{line}");
    }

    fn number(value: Option<f32>) -> serde_json::Value {
        match value {
            Some(v) => serde_json::json!(v),
            None => serde_json::Value::Null,
        }
    }
}

impl Sink for JsonlSink {
    fn set_temp(&mut self, value: Option<f32>) {
        self.emit("set_temp", Self::number(value));
    }
    fn current_temp(&mut self, value: Option<f32>) {
        self.emit("current_temp", Self::number(value));
    }
    fn humidity(&mut self, value: Option<f32>) {
        self.emit("humidity", Self::number(value));
    }
    fn drying_time(&mut self, hhmmss: &str) {
        self.emit("drying_time", serde_json::json!(hhmmss));
    }
    fn material(&mut self, name: &str) {
        self.emit("material", serde_json::json!(name));
    }
    fn cursor(&mut self, name: &str) {
        self.emit("cursor", serde_json::json!(name));
    }
    fn temp_units(&mut self, units: &str) {
        self.emit("temp_units", serde_json::json!(units));
    }
    fn error_status(&mut self, code: &str) {
        self.emit("error_status", serde_json::json!(code));
    }
    fn dryer_status(&mut self, status: &str) {
        self.emit("dryer_status", serde_json::json!(status));
    }
}

/// Choose the sink for the requested output mode.
pub fn make_sink(json: bool) -> Box<dyn Sink + Send> {
    if json { Box::new(JsonlSink) } else { Box::new(LogSink) }
}

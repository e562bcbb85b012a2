//! Default value functions for serde.

pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_true() -> bool {
    true
}
pub(super) fn default_providers() -> Vec<String> {
    vec!["native-imcore".into(), "applescript".into()]
}
pub(super) fn default_max_retries() -> u32 {
    2
}
pub(super) fn default_backoff_unit_ms() -> u64 {
    1000
}
pub(super) fn default_db_path() -> String {
    "~/Library/Messages/chat.db".to_string()
}
pub(super) fn default_limit() -> i64 {
    20
}

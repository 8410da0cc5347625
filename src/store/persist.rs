use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read a whole-document JSON file, falling back to `Default` when the file
/// is missing or unreadable. A corrupt file is logged and treated as empty
/// rather than taking the bot down.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("解析数据文件失败 {}: {e}", path.display());
                T::default()
            }
        },
        Err(e) => {
            tracing::warn!("读取数据文件失败 {}: {e}", path.display());
            T::default()
        }
    }
}

/// Rewrite a whole-document JSON file. Failures are logged and swallowed:
/// the in-memory state stays authoritative and the next successful save
/// reconciles the file.
pub fn save_json<T: Serialize>(path: &Path, value: &T) {
    let raw = match serde_json::to_string_pretty(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("序列化数据失败 {}: {e}", path.display());
            return;
        }
    };
    if let Err(e) = std::fs::write(path, raw) {
        tracing::warn!("保存数据文件失败 {}: {e}", path.display());
    }
}

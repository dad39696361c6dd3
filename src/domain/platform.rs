//! Platform registry: static catalog of promotion targets and alias normalization.
//!
//! Both lookups are total. Unknown ids pass through as synthetic records so callers
//! never branch on "platform not found".

use crate::domain::Platform;

/// Canonical platform ids, in catalog order.
pub const CANONICAL_IDS: [&str; 4] = ["tiktok", "facebook", "instagram", "x"];

/// (canonical id, display name, icon, color token, description)
const CATALOG: [(&str, &str, &str, &str, &str); 4] = [
    ("tiktok", "TikTok", "🎵", "from-black to-cyan-500", "15-60秒短视频"),
    ("facebook", "Facebook", "👥", "from-blue-600 to-blue-700", "1-3分钟视频"),
    (
        "instagram",
        "Instagram",
        "📸",
        "from-purple-600 via-pink-600 to-orange-500",
        "Reels 90秒以内",
    ),
    ("x", "X (Twitter)", "🐦", "from-black to-gray-800", "2分钟视频"),
];

/// Lower-cased alias -> canonical id. Includes the display names the backend echoes back.
const ALIASES: [(&str, &str); 13] = [
    ("douyin", "tiktok"),
    ("抖音", "tiktok"),
    ("tiktok", "tiktok"),
    ("fb", "facebook"),
    ("meta", "facebook"),
    ("facebook", "facebook"),
    ("ig", "instagram"),
    ("ins", "instagram"),
    ("instagram", "instagram"),
    ("twitter", "x"),
    ("x (twitter)", "x"),
    ("推特", "x"),
    ("x", "x"),
];

const UNKNOWN_ICON: &str = "✨";
const UNKNOWN_COLOR: &str = "from-gray-600 to-gray-700";

/// Map a raw platform id onto its canonical id. Unknown input comes back lower-cased.
pub fn normalize(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(lower)
}

/// Normalize then look up the catalog; falls back to `{id, name: id, icon: ✨}`.
pub fn resolve(raw: &str) -> Platform {
    let id = normalize(raw);
    CATALOG
        .iter()
        .find(|(cid, ..)| *cid == id)
        .map(|(cid, name, icon, color, description)| Platform {
            id: (*cid).to_string(),
            name: (*name).to_string(),
            icon: (*icon).to_string(),
            color: (*color).to_string(),
            description: (*description).to_string(),
        })
        .unwrap_or_else(|| Platform {
            name: id.clone(),
            id,
            icon: UNKNOWN_ICON.to_string(),
            color: UNKNOWN_COLOR.to_string(),
            description: String::new(),
        })
}

/// The full catalog, in display order.
pub fn catalog() -> Vec<Platform> {
    CANONICAL_IDS.iter().map(|id| resolve(id)).collect()
}

/// Normalize a list of raw ids, dropping blanks and duplicates while keeping first-seen order.
pub fn normalize_all<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for r in raw {
        let id = normalize(r.as_ref());
        if !id.is_empty() && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

use std::fmt;

use md5::{Digest, Md5};

/// Canonicalized (provider, game_id) pair shared by every stage.
///
/// Both parts are trimmed and lowercased on construction, so two keys built
/// from `" Steam "` / `"123"` and `"steam"` / `"123 "` compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameKey {
    provider: String,
    game_id: String,
}

impl GameKey {
    pub fn new(provider: &str, game_id: &str) -> Self {
        Self {
            provider: provider.trim().to_lowercase(),
            game_id: game_id.trim().to_lowercase(),
        }
    }

    /// Build a key only when both parts are non-blank.
    pub fn non_blank(provider: &str, game_id: &str) -> Option<Self> {
        let key = Self::new(provider, game_id);
        if key.provider.is_empty() || key.game_id.is_empty() {
            None
        } else {
            Some(key)
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// 32-char lowercase hex MD5 of `provider|game_id`.
    pub fn digest(&self) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.provider.as_bytes());
        hasher.update(b"|");
        hasher.update(self.game_id.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(32);
        for b in digest {
            use std::fmt::Write;
            let _ = write!(&mut out, "{:02x}", b);
        }
        out
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.provider, self.game_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_md5() {
        assert_eq!(
            GameKey::new("steam", "123").digest(),
            "8347e405fa53b68d1a714391b08fa747"
        );
    }

    #[test]
    fn digest_ignores_case_and_whitespace() {
        let a = GameKey::new("  STEAM", "123 ");
        let b = GameKey::new("steam", "123");
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.to_string(), "steam|123");
    }

    #[test]
    fn distinct_keys_have_distinct_digests() {
        let keys = [
            GameKey::new("steam", "123"),
            GameKey::new("steam", "124"),
            GameKey::new("gog", "123"),
            GameKey::new("gog", "abc"),
        ];
        let mut digests: Vec<String> = keys.iter().map(GameKey::digest).collect();
        assert!(digests.iter().all(|d| d.len() == 32));
        digests.sort();
        digests.dedup();
        assert_eq!(digests.len(), keys.len());
        assert_eq!(keys[3].digest(), "442ed4125bec78a44a0d3dfffc7f424e");
    }

    #[test]
    fn non_blank_rejects_missing_parts() {
        assert!(GameKey::non_blank("steam", "  ").is_none());
        assert!(GameKey::non_blank("", "1").is_none());
        assert_eq!(
            GameKey::non_blank(" Steam ", "1").map(|k| k.provider().to_string()),
            Some("steam".to_string())
        );
    }
}

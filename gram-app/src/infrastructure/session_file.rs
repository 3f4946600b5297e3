//! Локальный маркер сессии: один файл с секретом. Его отсутствие —
//! сигнал сразу отправлять пользователя на вход, не опрашивая бэкенд.

use std::fs;
use std::io;
use std::path::Path;

fn parse_secret(raw: &str) -> Option<String> {
    let secret = raw.trim().to_string();
    if secret.is_empty() {
        return None;
    }
    Some(secret)
}

pub fn load_session(path: &Path) -> io::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)?;
    Ok(parse_secret(&raw))
}

pub fn save_session(path: &Path, secret: &str) -> io::Result<()> {
    fs::write(path, secret)
}

pub fn clear_session(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{clear_session, load_session, parse_secret, save_session};

    fn temp_path() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock must be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("gram_session_{nanos}"))
    }

    #[test]
    fn parse_secret_trims_and_returns_value() {
        let secret = parse_secret("  abc.def  ");
        assert_eq!(secret.as_deref(), Some("abc.def"));
    }

    #[test]
    fn parse_secret_rejects_blank() {
        assert!(parse_secret("   ").is_none());
    }

    #[test]
    fn load_returns_none_for_missing_file() {
        let path = temp_path();
        let loaded = load_session(&path).expect("load must succeed");
        assert!(loaded.is_none());
    }

    #[test]
    fn save_load_clear_round_trip() {
        let path = temp_path();

        save_session(&path, "s3cret").expect("save must succeed");
        let loaded = load_session(&path).expect("load must succeed");
        assert_eq!(loaded.as_deref(), Some("s3cret"));

        clear_session(&path).expect("clear must succeed");
        let loaded = load_session(&path).expect("load must succeed");
        assert!(loaded.is_none());

        // повторная очистка безопасна
        clear_session(&path).expect("clear must succeed");
    }
}

use super::*;

use counsel::session::{Session, SessionState};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("legally-cli-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("session.json")
}

#[test]
fn missing_file_loads_as_none() {
    let store = FileStore::new(scratch("missing"));
    assert_eq!(store.load(), Ok(None));
}

#[test]
fn save_creates_parent_dirs_and_round_trips() {
    let store = FileStore::new(scratch("save"));
    store.save("{\"version\":1}").unwrap();
    assert_eq!(store.load(), Ok(Some("{\"version\":1}".to_owned())));
}

#[test]
fn clear_is_idempotent() {
    let store = FileStore::new(scratch("clear"));
    store.save("{}").unwrap();
    assert_eq!(store.clear(), Ok(()));
    assert_eq!(store.clear(), Ok(()));
    assert_eq!(store.load(), Ok(None));
}

#[test]
fn admin_token_survives_reload() {
    let path = scratch("admin");
    let mut session = Session::load(FileStore::new(&path));
    session.update(|s| s.admin_sign_in("admin@legally.com", "tok-1")).unwrap();

    let reloaded = Session::load(FileStore::new(&path));
    assert_eq!(reloaded.state().admin_token(), Some("tok-1"));
}

#[test]
fn corrupt_file_loads_default_session() {
    let path = scratch("corrupt");
    let store = FileStore::new(&path);
    store.save("not json").unwrap();

    let session = Session::load(FileStore::new(&path));
    assert_eq!(session.state(), &SessionState::default());
}

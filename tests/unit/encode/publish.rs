use super::*;

#[test]
fn temp_path_keeps_directory_and_extension() {
    assert_eq!(
        temp_path_for(Path::new("out/1234.mp4")).unwrap(),
        PathBuf::from("out/1234.part.mp4")
    );
    assert_eq!(
        temp_path_for(Path::new("/videos/card.v2.mov")).unwrap(),
        PathBuf::from("/videos/card.v2.part.mov")
    );
    assert_eq!(
        temp_path_for(Path::new("raw")).unwrap(),
        PathBuf::from("raw.part")
    );
    assert!(temp_path_for(Path::new("/")).is_err());
}

#[test]
fn publish_replaces_destination() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested").join("clip.mp4");
    ensure_parent_dir(&dest).unwrap();
    let temp = temp_path_for(&dest).unwrap();

    std::fs::write(&dest, b"old").unwrap();
    std::fs::write(&temp, b"new").unwrap();
    publish(&temp, &dest).unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    assert!(!temp.exists());
}

#[test]
fn publish_missing_temp_fails_and_keeps_destination() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("clip.mp4");
    std::fs::write(&dest, b"old").unwrap();
    assert!(publish(&dir.path().join("clip.part.mp4"), &dest).is_err());
    assert_eq!(std::fs::read(&dest).unwrap(), b"old");
}

#[test]
fn discard_ignores_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let temp = dir.path().join("x.part.mp4");
    discard(&temp);
    std::fs::write(&temp, b"x").unwrap();
    discard(&temp);
    assert!(!temp.exists());
}

#[test]
fn publish_new_moves_into_an_empty_slot() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("clip.mp4");
    let temp = temp_path_for(&dest).unwrap();
    std::fs::write(&temp, b"new").unwrap();

    publish_new(&temp, &dest).unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    assert!(!temp.exists());
}

#[test]
fn publish_new_never_replaces_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("clip.mp4");
    let temp = temp_path_for(&dest).unwrap();
    std::fs::write(&dest, b"old").unwrap();
    std::fs::write(&temp, b"new").unwrap();

    let err = publish_new(&temp, &dest).unwrap_err();
    assert!(matches!(err, ReactionError::Validation(_)), "{err}");
    assert_eq!(std::fs::read(&dest).unwrap(), b"old");
    assert_eq!(std::fs::read(&temp).unwrap(), b"new");
}

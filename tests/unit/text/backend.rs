use super::*;

#[test]
fn missing_faces_fall_back_to_regular() {
    let set = FontSet::new(FontSource::new(vec![1, 2, 3]));
    let (src, dedicated) = set.resolve(FontFace::Bold);
    assert_eq!(src.bytes, vec![1, 2, 3]);
    assert!(!dedicated);
    let (_, dedicated) = set.resolve(FontFace::Regular);
    assert!(dedicated);
}

#[test]
fn dedicated_faces_are_preferred() {
    let set = FontSet::new(FontSource::new(vec![1]))
        .with_bold(FontSource::new(vec![2]).with_index(1))
        .with_mono(FontSource::new(vec![3]));
    let (bold, dedicated) = set.resolve(FontFace::Bold);
    assert_eq!((bold.bytes.as_slice(), bold.index, dedicated), (&[2u8][..], 1, true));
    assert_eq!(set.resolve(FontFace::Mono).0.bytes, vec![3]);
}

#[test]
fn reading_missing_font_reports_path() {
    let err = FontSource::read(std::path::Path::new("/definitely/not/here.ttf")).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.ttf"));
}

use midistat::{collect, find_midis, Error, MetaSkip, Report, Stat};
use pretty_assertions::assert_eq;
use std::{fs, path::Path};

/// A format 1 file with one track holding `notes` Note-On events.
fn midi_with_notes(notes: usize) -> Vec<u8> {
    let mut track = Vec::new();
    for _ in 0..notes {
        track.extend_from_slice(&[0x00, 0x90, 0x3C, 0x40]);
    }
    track.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
    let mut file = Vec::new();
    file.extend_from_slice(b"MThd\0\0\0\x06\0\x01\0\x01\0\x60");
    file.extend_from_slice(b"MTrk");
    file.extend_from_slice(&(track.len() as u32).to_be_bytes());
    file.extend_from_slice(&track);
    file
}

fn write(root: &Path, rel: &str, data: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}

#[test]
fn finds_only_mid_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("midis");
    write(&root, "B/v1.mid", &midi_with_notes(0));
    write(&root, "A/v2.mid", &midi_with_notes(0));
    write(&root, "A/v1.mid", &midi_with_notes(0));
    write(&root, "A/notes.txt", b"not a midi");
    write(&root, "A/v3.midi", &midi_with_notes(0));
    fs::create_dir_all(root.join("C.mid")).unwrap();

    let found = find_midis(&root, "mid").unwrap();
    let rel = found
        .iter()
        .map(|path| path.strip_prefix(&root).unwrap().to_path_buf())
        .collect::<Vec<_>>();
    assert_eq!(
        rel,
        vec![
            Path::new("A/v1.mid").to_path_buf(),
            Path::new("A/v2.mid").to_path_buf(),
            Path::new("B/v1.mid").to_path_buf(),
        ]
    );
}

#[cfg(unix)]
#[test]
fn symlinked_midis_are_found() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("midis");
    write(dir.path(), "library/take.mid", &midi_with_notes(2));
    fs::create_dir_all(root.join("A")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("library/take.mid"), root.join("A/v1.mid"))
        .unwrap();

    let found = find_midis(&root, "mid").unwrap();
    assert_eq!(found, vec![root.join("A/v1.mid")]);
    let report = collect(&found, MetaSkip::Fixed).unwrap();
    assert_eq!(report.get("A", "v1").unwrap().notes, 2);
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(find_midis(dir.path().join("nope"), "mid").is_err());
}

#[test]
fn groups_versions_by_midi_name() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("midis");
    write(&root, "A/v1.mid", &midi_with_notes(1));
    write(&root, "A/v2.mid", &midi_with_notes(3));

    let midis = find_midis(&root, "mid").unwrap();
    let report = collect(&midis, MetaSkip::Fixed).unwrap();

    let mut expected = Report::new();
    expected.insert(
        "A".into(),
        "v1".into(),
        Stat {
            file_size: "30 B".into(),
            tracks: 1,
            ppqn: 96,
            notes: 1,
        },
    );
    expected.insert(
        "A".into(),
        "v2".into(),
        Stat {
            file_size: "38 B".into(),
            tracks: 1,
            ppqn: 96,
            notes: 3,
        },
    );
    assert_eq!(report, expected);
}

#[test]
fn one_bad_file_aborts_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("midis");
    write(&root, "A/v1.mid", &midi_with_notes(1));
    let mut bad = midi_with_notes(3);
    bad.truncate(bad.len() - 6);
    write(&root, "A/v2.mid", &bad);

    let midis = find_midis(&root, "mid").unwrap();
    match collect(&midis, MetaSkip::Fixed) {
        Err(Error::Truncated(_)) => {}
        other => panic!("expected a truncated file to abort the batch, got {:?}", other),
    }
}

#[test]
fn unreadable_file_is_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("A/gone.mid");
    assert!(matches!(
        collect([&missing], MetaSkip::Fixed),
        Err(Error::Io(_))
    ));
}

#[test]
fn saved_report_matches_printed_json() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("midis");
    write(&root, "Song/final.mid", &midi_with_notes(2));

    let report = collect(find_midis(&root, "mid").unwrap(), MetaSkip::Fixed).unwrap();
    let out = dir.path().join("midi_info.json");
    report.save(&out).unwrap();

    let saved = fs::read_to_string(&out).unwrap();
    assert_eq!(saved, report.to_json().unwrap());
    let reparsed: Report = serde_json::from_str(&saved).unwrap();
    assert_eq!(reparsed.get("Song", "final").map(|stat| stat.notes), Some(2));
}

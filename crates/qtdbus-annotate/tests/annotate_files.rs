use std::fs;
use std::path::{Path, PathBuf};

use qtdbus_annotate::{process_file, run, validate_file, AnnotateError, TypeMapping};
use tempfile::TempDir;

const PLAYLISTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<node>
  <interface name="org.mpris.MediaPlayer2.Playlists">
    <method name="GetPlaylists">
      <arg direction="in" name="Index" type="u"/>
      <arg direction="in" name="MaxCount" type="u"/>
      <arg direction="out" name="Playlists" type="a(oss)"/>
    </method>
    <signal name="PlaylistChanged">
      <arg name="Playlist" type="(oss)"/>
    </signal>
    <property name="ActivePlaylist" type="(b(oss))" access="read"/>
    <property name="PlaylistCount" type="u" access="read"/>
  </interface>
</node>
"#;

const PLAYER: &str = r#"<node>
  <interface name="org.mpris.MediaPlayer2.Player">
    <method name="SetPosition">
      <arg direction="in" name="TrackId" type="o"/>
      <arg direction="in" name="Position" type="x"/>
    </method>
    <property name="Metadata" type="a{sv}" access="read">
      <annotation name="org.qtproject.QtDBus.QtTypeName" value="QVariantMap"/>
    </property>
  </interface>
</node>
"#;

const NOT_AN_INTERFACE: &str = r#"<node>
  <node name="child"/>
  <interface name="org.example.Late"/>
</node>
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn annotates_members_and_keeps_layout() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "playlists.xml", PLAYLISTS);

    assert!(process_file(&path, &TypeMapping::mpris()).unwrap());

    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<node>
  <interface name="org.mpris.MediaPlayer2.Playlists">
    <method name="GetPlaylists">
      <arg direction="in" name="Index" type="u"/>
      <arg direction="in" name="MaxCount" type="u"/>
      <arg direction="out" name="Playlists" type="a(oss)"/>
      <annotation name="org.qtproject.QtDBus.QtTypeName.Out0" value="MprisPlaylistList"/>
    </method>
    <signal name="PlaylistChanged">
      <arg name="Playlist" type="(oss)"/>
      <annotation name="org.qtproject.QtDBus.QtTypeName.Out0" value="MprisPlaylist"/>
    </signal>
    <property name="ActivePlaylist" type="(b(oss))" access="read"><annotation name="org.qtproject.QtDBus.QtTypeName" value="MprisMaybePlaylist"/></property>
    <property name="PlaylistCount" type="u" access="read"/>
  </interface>
</node>
"#;
    assert_eq!(read(&path), expected);
}

#[test]
fn second_pass_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "playlists.xml", PLAYLISTS);
    let mapping = TypeMapping::mpris();

    assert!(process_file(&path, &mapping).unwrap());
    let first = read(&path);
    assert!(!process_file(&path, &mapping).unwrap());
    assert_eq!(read(&path), first);
}

#[test]
fn escapes_qt_template_types() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tracklist.xml",
        r#"<node><interface name="org.mpris.MediaPlayer2.TrackList"><method name="GetTracksMetadata"><arg direction="out" type="aa{sv}"/></method></interface></node>"#,
    );

    assert!(process_file(&path, &TypeMapping::mpris()).unwrap());
    let written = read(&path);
    assert!(
        written.contains(r#"value="QVector&lt;QVariantList&gt;""#),
        "{written}"
    );
    let document = dbus_xml::parse(&written).unwrap();
    let interface = document.root.first_child_element().unwrap();
    let method = interface.first_child_element().unwrap();
    let annotation = method.children_named("annotation").next().unwrap();
    assert_eq!(annotation.attribute("value"), Some("QVector<QVariantList>"));
}

#[test]
fn unmodified_files_are_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "player.xml", PLAYER);
    let before = fs::metadata(&path).unwrap().modified().unwrap();

    assert!(!process_file(&path, &TypeMapping::mpris()).unwrap());
    assert_eq!(read(&path), PLAYER);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
}

#[test]
fn run_reports_rewritten_files() {
    let dir = TempDir::new().unwrap();
    let playlists = write(&dir, "playlists.xml", PLAYLISTS);
    let player = write(&dir, "player.xml", PLAYER);

    let summary = run(&[&playlists, &player], &TypeMapping::mpris()).unwrap();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.rewritten, 1);

    let again = run(&[&playlists, &player], &TypeMapping::mpris()).unwrap();
    assert_eq!(again.rewritten, 0);
}

#[test]
fn structural_error_aborts_before_any_write() {
    let dir = TempDir::new().unwrap();
    let playlists = write(&dir, "playlists.xml", PLAYLISTS);
    let broken = write(&dir, "broken.xml", NOT_AN_INTERFACE);

    let err = run(&[&playlists, &broken], &TypeMapping::mpris()).unwrap_err();
    match &err {
        AnnotateError::Structure { path, .. } => assert_eq!(path, &broken),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("missing interface node"));
    assert_eq!(read(&playlists), PLAYLISTS);
    assert_eq!(read(&broken), NOT_AN_INTERFACE);
}

#[test]
fn empty_root_is_a_structural_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "empty.xml", "<node/>\n");

    assert!(matches!(
        validate_file(&path),
        Err(AnnotateError::Structure { .. })
    ));
    assert!(matches!(
        process_file(&path, &TypeMapping::mpris()),
        Err(AnnotateError::Structure { .. })
    ));
}

#[test]
fn unreadable_and_malformed_files_are_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.xml");
    let malformed = write(&dir, "malformed.xml", "<node><interface></node>");

    assert!(matches!(
        validate_file(&missing),
        Err(AnnotateError::Io { .. })
    ));
    assert!(matches!(
        validate_file(&malformed),
        Err(AnnotateError::Xml { .. })
    ));
}

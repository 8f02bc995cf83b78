//! End-to-end tests for building font packages into output roots.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use fontpack::composer::{ComposeError, ComposeErrorKind, ComposerConfig, PackageComposer};
use fontpack::manifest::{
    Manifest, ManifestError, CUSTOM_FONTS_PACKAGE, DEFAULT_PACKAGE, ORIGINAL_FONTS_PACKAGE,
};
use fontpack::package::{CompositePackage, PackageSpec, Version};

/// Relative path -> (contents, permission bits).
type Snapshot = BTreeMap<PathBuf, (Vec<u8>, u32)>;

fn write(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[cfg(unix)]
fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn mode_of(path: &Path) -> u32 {
    if fs::metadata(path).unwrap().permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

fn snapshot(root: &Path) -> Snapshot {
    fn walk(root: &Path, dir: &Path, out: &mut Snapshot) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, (fs::read(&path).unwrap(), mode_of(&path)));
            }
        }
    }

    let mut out = Snapshot::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out
}

fn file_names(root: &Path) -> Vec<String> {
    snapshot(root)
        .keys()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect()
}

/// A fonts/original-fonts checkout resembling the real font repository.
struct FontTree {
    _temp: TempDir,
    custom: PathBuf,
    original: PathBuf,
}

impl FontTree {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("fonts");
        let original = temp.path().join("original-fonts");

        write(&custom, "Go-Mono/Go-Mono-Fast.ttf", "go mono fast");
        write(&custom, "Go-Mono/Bold/Go-Mono-Bold-Fast.ttf", "go mono bold fast");
        write(&custom, "Go-Mono/notes.txt", "not a font");
        write(&original, "Fast_Mono.ttf", "fast mono");
        write(&original, "sans/Fast_Sans.ttf", "fast sans");
        write(&original, "README.md", "readme");

        Self {
            _temp: temp,
            custom,
            original,
        }
    }

    fn composer(&self) -> PackageComposer {
        PackageComposer::new(Manifest::fast_fonts(&self.custom, &self.original)).unwrap()
    }
}

#[test]
fn test_build_is_idempotent() {
    let fonts = FontTree::new();
    let composer = fonts.composer();
    let out = TempDir::new().unwrap();

    let first = out.path().join("first");
    let second = out.path().join("second");
    composer.build(DEFAULT_PACKAGE, &first).unwrap();
    composer.build(DEFAULT_PACKAGE, &second).unwrap();

    let a = snapshot(&first);
    assert_eq!(a.len(), 4);
    assert_eq!(a, snapshot(&second));
    assert!(a.values().all(|(_, mode)| *mode == 0o444));
}

#[test]
fn test_only_ttf_files_are_selected() {
    let fonts = FontTree::new();
    write(&fonts.custom, "Go-Mono/UPPER.TTF", "case matters");
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");

    fonts.composer().build(CUSTOM_FONTS_PACKAGE, &root).unwrap();

    assert_eq!(
        file_names(&root),
        vec![
            "share/fonts/truetype/Go-Mono-Bold-Fast.ttf",
            "share/fonts/truetype/Go-Mono-Fast.ttf",
        ]
    );
}

#[test]
fn test_nesting_is_flattened() {
    let fonts = FontTree::new();
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");

    let report = fonts.composer().build(ORIGINAL_FONTS_PACKAGE, &root).unwrap();

    assert_eq!(report.files.len(), 2);
    for file in &report.files {
        assert_eq!(file.path.parent(), Some(Path::new("share/fonts/truetype")));
    }
    assert_eq!(
        fs::read_to_string(root.join("share/fonts/truetype/Fast_Sans.ttf")).unwrap(),
        "fast sans"
    );
}

#[test]
fn test_composite_equals_member_builds() {
    let fonts = FontTree::new();
    let composer = fonts.composer();
    let out = TempDir::new().unwrap();

    let composite_root = out.path().join("composite");
    composer.build(DEFAULT_PACKAGE, &composite_root).unwrap();

    let separate_root = out.path().join("separate");
    composer.build(CUSTOM_FONTS_PACKAGE, &separate_root).unwrap();
    composer.build(ORIGINAL_FONTS_PACKAGE, &separate_root).unwrap();

    assert_eq!(snapshot(&composite_root), snapshot(&separate_root));
}

#[test]
fn test_all_alias_builds_default() {
    let fonts = FontTree::new();
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");

    let report = fonts.composer().build("all", &root).unwrap();
    assert_eq!(report.package, DEFAULT_PACKAGE);
    assert_eq!(report.files.len(), 4);
}

#[test]
fn test_composite_conflict_writes_nothing() {
    let fonts = FontTree::new();
    write(&fonts.original, "dupe/Go-Mono-Fast.ttf", "shadow");
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");

    let err = fonts.composer().build(DEFAULT_PACKAGE, &root).unwrap_err();

    match &err {
        ComposeError::CompositeConflict {
            destination,
            first_package,
            second_package,
            ..
        } => {
            assert_eq!(
                destination,
                Path::new("share/fonts/truetype/Go-Mono-Fast.ttf")
            );
            assert_eq!(first_package, CUSTOM_FONTS_PACKAGE);
            assert_eq!(second_package, ORIGINAL_FONTS_PACKAGE);
        }
        other => panic!("expected CompositeConflict, got {:?}", other),
    }
    assert_eq!(err.kind(), ComposeErrorKind::CompositeConflict);
    assert!(!root.exists());
}

#[test]
fn test_empty_package_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let empty = temp.path().join("empty");
    write(&empty, "only-notes.txt", "n");

    let manifest = Manifest::new("empty")
        .with_leaf(PackageSpec::fonts("empty", Version::new(1, 0, 0), &empty));
    let composer = PackageComposer::new(manifest).unwrap();
    let root = temp.path().join("root");

    let err = composer.build("empty", &root).unwrap_err();
    assert_eq!(err.kind(), ComposeErrorKind::EmptyPackage);
    assert!(!root.exists());
}

#[test]
fn test_unknown_package_touches_nothing() {
    let fonts = FontTree::new();
    let out = TempDir::new().unwrap();
    let root = out.path().join("nested/root");

    let err = fonts.composer().build("nonexistent", &root).unwrap_err();

    assert_eq!(err.kind(), ComposeErrorKind::UnknownPackage);
    assert!(err.to_string().contains("nonexistent"));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_cyclic_manifest_is_rejected() {
    let manifest = Manifest::new("a")
        .with_composite(CompositePackage::new("a", Version::new(1, 0, 0)).with_member("b"))
        .with_composite(CompositePackage::new("b", Version::new(1, 0, 0)).with_member("a"));

    let err = PackageComposer::new(manifest).err().unwrap();
    assert_eq!(err.kind(), ComposeErrorKind::InvalidManifest);
    assert!(matches!(
        err,
        ComposeError::InvalidManifest(ManifestError::Cycle { .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_locked_root_rejects_build() {
    use fd_lock::RwLock;

    let fonts = FontTree::new();
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");

    let held_dir = fs::File::open(fontpack::composer::lock_path_for(&root)).unwrap();
    let mut held = RwLock::new(held_dir);
    let _guard = held.try_write().unwrap();

    let err = fonts.composer().build(DEFAULT_PACKAGE, &root).unwrap_err();
    assert_eq!(err.kind(), ComposeErrorKind::Locked);
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn test_unlocked_build_ignores_held_lock() {
    use fd_lock::RwLock;

    let fonts = FontTree::new();
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");

    let held_dir = fs::File::open(fontpack::composer::lock_path_for(&root)).unwrap();
    let mut held = RwLock::new(held_dir);
    let _guard = held.try_write().unwrap();

    let composer = PackageComposer::with_config(
        Manifest::fast_fonts(&fonts.custom, &fonts.original),
        ComposerConfig::default().with_lock_output(false),
    )
    .unwrap();
    assert!(composer.build(DEFAULT_PACKAGE, &root).is_ok());
}

#[test]
fn test_build_writes_nothing_beside_root() {
    let fonts = FontTree::new();
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");

    fonts.composer().build(DEFAULT_PACKAGE, &root).unwrap();

    let entries: Vec<_> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("root")]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_root_is_built_through() {
    use std::os::unix::fs::symlink;

    let fonts = FontTree::new();
    let out = TempDir::new().unwrap();
    let real = out.path().join("real");
    fs::create_dir(&real).unwrap();
    let result = out.path().join("result");
    symlink(&real, &result).unwrap();

    fonts.composer().build(DEFAULT_PACKAGE, &result).unwrap();

    assert_eq!(snapshot(&real).len(), 4);
    assert!(fs::symlink_metadata(&result).unwrap().file_type().is_symlink());
}

#[test]
fn test_missing_source_error_names_package() {
    let temp = TempDir::new().unwrap();
    let manifest = Manifest::fast_fonts(temp.path().join("fonts"), temp.path().join("original"));
    let composer = PackageComposer::new(manifest).unwrap();

    let err = composer
        .build(CUSTOM_FONTS_PACKAGE, &temp.path().join("root"))
        .unwrap_err();
    assert_eq!(err.kind(), ComposeErrorKind::Io);
    assert!(err.to_string().contains(CUSTOM_FONTS_PACKAGE));
}

#[cfg(unix)]
#[test]
fn test_escaping_symlinks_are_not_copied() {
    use std::os::unix::fs::symlink;

    let fonts = FontTree::new();
    let outside = TempDir::new().unwrap();
    write(outside.path(), "Secret.ttf", "secret");
    write(outside.path(), "dir/Hidden.ttf", "hidden");
    symlink(outside.path().join("Secret.ttf"), fonts.custom.join("Secret.ttf")).unwrap();
    symlink(outside.path().join("dir"), fonts.custom.join("linked")).unwrap();

    let out = TempDir::new().unwrap();
    let root = out.path().join("root");
    fonts.composer().build(CUSTOM_FONTS_PACKAGE, &root).unwrap();

    let names = file_names(&root);
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| !n.contains("Secret") && !n.contains("Hidden")));
}

#[test]
fn test_rebuild_into_existing_root_replaces_files() {
    let fonts = FontTree::new();
    let composer = fonts.composer();
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");

    composer.build(CUSTOM_FONTS_PACKAGE, &root).unwrap();

    let font = fonts.custom.join("Go-Mono/Go-Mono-Fast.ttf");
    fs::write(&font, "updated").unwrap();
    composer.build(CUSTOM_FONTS_PACKAGE, &root).unwrap();

    assert_eq!(
        fs::read_to_string(root.join("share/fonts/truetype/Go-Mono-Fast.ttf")).unwrap(),
        "updated"
    );
    assert_eq!(snapshot(&root).len(), 2);
}

#[test]
fn test_manifest_file_drives_build() {
    let fonts = FontTree::new();
    let dir = fonts.custom.parent().unwrap();
    let manifest_path = dir.join("fontpack.ini");
    fs::write(
        &manifest_path,
        "[fontpack]\n\
         default = mono\n\
         \n\
         [package.mono]\n\
         version = 2.1.0\n\
         source = fonts\n\
         pattern = *-Bold-Fast.ttf\n\
         destination = share/fonts/mono\n",
    )
    .unwrap();

    let composer = PackageComposer::new(Manifest::load(&manifest_path).unwrap()).unwrap();
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");
    let report = composer.build("all", &root).unwrap();

    assert_eq!(report.package, "mono");
    assert_eq!(file_names(&root), vec!["share/fonts/mono/Go-Mono-Bold-Fast.ttf"]);
}

#[test]
fn test_report_checksums_match_contents() {
    let fonts = FontTree::new();
    let out = TempDir::new().unwrap();
    let root = out.path().join("root");

    let report = fonts.composer().build(DEFAULT_PACKAGE, &root).unwrap();

    for file in &report.files {
        let on_disk = fontpack::composer::calculate_file_checksum(&root.join(&file.path)).unwrap();
        assert_eq!(on_disk, file.checksum);
    }
    let expected: u64 = report.files.iter().map(|f| f.size).sum();
    assert_eq!(report.total_bytes, expected);
}

use std::io::Write;
use std::sync::Arc;

use janitor_core::testing::{MockApplication, MockPackage, PackageMark};
use janitor_core::{
    Application, Cruft, CruftError, CruftExt, FileCruft, LogProgress, MissingPackageCruft,
    Notification, PackageCache, PackageCruft, PackageRef,
};
use tempfile::NamedTempFile;

fn temp_file_with(bytes: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&vec![b'x'; bytes]).unwrap();
    file.flush().unwrap();
    file
}

fn mock_package() -> (Arc<MockPackage>, PackageRef) {
    let package = Arc::new(MockPackage::new("name"));
    let handle: PackageRef = package.clone();
    (package, handle)
}

#[test]
fn test_file_cruft_properties() {
    let file = temp_file_with(1024);
    let path = file.path().to_string_lossy().into_owned();
    let cruft = FileCruft::new(file.path(), "description").unwrap();

    assert_eq!(cruft.prefix(), "file");
    assert_eq!(cruft.prefix_description().as_deref(), Some("A file on disk"));
    assert_eq!(cruft.shortname(), path);
    assert_eq!(cruft.name(), format!("file:{path}"));
    assert_eq!(cruft.description(), "description\n");
}

#[cfg(unix)]
#[test]
fn test_file_cruft_disk_usage_is_block_usage() {
    use std::os::unix::fs::MetadataExt;

    let file = temp_file_with(1024);
    let cruft = FileCruft::new(file.path(), "description").unwrap();
    let blocks = std::fs::metadata(file.path()).unwrap().blocks();

    assert_eq!(cruft.disk_usage(), Some(blocks * 512));
}

#[test]
fn test_file_cruft_cleanup_removes_file() {
    let file = temp_file_with(16);
    let path = file.path().to_path_buf();
    let mut cruft = FileCruft::new(&path, "description").unwrap();

    assert!(path.exists());
    cruft.cleanup().unwrap();
    assert!(!path.exists());

    // A second cleanup reports the missing file instead of succeeding silently.
    let err = cruft.cleanup().unwrap_err();
    assert!(matches!(err, CruftError::NotFound { .. }));
}

#[test]
fn test_file_cruft_requires_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileCruft::new(dir.path().join("missing"), "gone").unwrap_err();
    assert!(matches!(err, CruftError::NotFound { .. }));
}

#[test]
fn test_package_cruft_properties() {
    let (_, handle) = mock_package();
    let cruft = PackageCruft::new(handle, "description");

    assert_eq!(cruft.prefix(), "deb");
    assert_eq!(cruft.prefix_description().as_deref(), Some(".deb package"));
    assert_eq!(cruft.shortname(), "name");
    assert_eq!(cruft.name(), "deb:name");
    assert_eq!(cruft.description(), "description\n\nsummary");
    assert_eq!(cruft.disk_usage(), Some(12765));
}

#[test]
fn test_package_cruft_cleanup_marks_delete() {
    let (package, handle) = mock_package();
    let mut cruft = PackageCruft::new(handle, "description");

    cruft.cleanup().unwrap();
    assert!(package.delete_marked());
    assert_eq!(package.marks(), vec![PackageMark::Delete]);
}

#[test]
fn test_missing_package_cruft_properties() {
    let (_, handle) = mock_package();
    let cruft = MissingPackageCruft::new(handle);

    assert_eq!(cruft.prefix(), "install-deb");
    assert!(cruft.prefix_description().unwrap().contains("Install"));
    assert_eq!(cruft.shortname(), "name");
    assert_eq!(cruft.name(), "install-deb:name");
    assert_eq!(cruft.description(), "Package name should be installed.");
    assert_eq!(cruft.disk_usage(), None);
}

#[test]
fn test_missing_package_cruft_explicit_description() {
    let (_, handle) = mock_package();
    let cruft = MissingPackageCruft::with_description(handle, "foo");
    assert_eq!(cruft.description(), "foo");
}

#[test]
fn test_missing_package_cruft_cleanup_marks_install() {
    let (package, handle) = mock_package();
    let mut cruft = MissingPackageCruft::new(handle);

    cruft.cleanup().unwrap();
    assert!(package.install_marked());
    assert_eq!(package.marks(), vec![PackageMark::Install]);
}

#[test]
fn test_mock_application_records_interactions() {
    let app = MockApplication::new();
    app.mock_cache().add(MockPackage::new("grub").installed());

    assert!(app.cache().contains("grub"));
    assert!(!app.cache().contains("lilo"));
    assert_eq!(app.cache().packages().len(), 1);

    let mut progress = LogProgress::new();
    let mut install = LogProgress::new();
    app.cache().commit(&mut progress, &mut install).unwrap();
    app.refresh_cache().unwrap();
    app.notify(Notification::new("test", "hello"));

    assert!(app.commit_called());
    assert!(app.refresh_called());
    assert_eq!(app.notifications(), vec![Notification::new("test", "hello")]);
}

#[test]
fn test_mock_cache_failing_commit() {
    let app = MockApplication::new();
    app.mock_cache().set_fail_commit(true);

    let mut fetch = LogProgress::new();
    let mut install = LogProgress::new();
    assert!(app.cache().commit(&mut fetch, &mut install).is_err());
    assert!(app.commit_called());
}

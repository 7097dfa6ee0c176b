use std::path::{Path, PathBuf};
use std::sync::Arc;

use janitor_core::testing::{MockApplication, MockPackage, PackageMark};
use janitor_core::{Application, CruftExt};
use janitor_plugin::{ConditionQuery, Plugin, PluginManager};
use janitor_plugins::{
    BuiltinOptions, DpkgStatusPlugin, Kdelibs4devToKdelibs5devPlugin,
    MarkLangpacksManuallyInstalledPlugin, RemoveLiloPlugin, builtin_registry, kinds,
};
use tempfile::TempDir;

fn shipped_plugins() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/plugins")
}

fn attach(plugin: &dyn Plugin) -> Arc<MockApplication> {
    let app = Arc::new(MockApplication::new());
    plugin.set_application(app.clone());
    app
}

fn names(plugin: &dyn Plugin) -> Vec<String> {
    let mut names: Vec<String> = plugin
        .get_cruft()
        .unwrap()
        .iter()
        .map(|cruft| cruft.name())
        .collect();
    names.sort();
    names
}

#[test]
fn test_dpkg_status_finds_obsolete_entry() {
    let dir = TempDir::new().unwrap();
    let status = dir.path().join("status");
    std::fs::write(&status, "Status: purge ok not-installed\n").unwrap();

    let plugin = DpkgStatusPlugin::with_status_file(&status);
    assert_eq!(names(&plugin), vec!["dpkg-status:Obsolete entries in dpkg status"]);
}

#[test]
fn test_dpkg_status_clean_file() {
    let dir = TempDir::new().unwrap();
    let status = dir.path().join("status");
    std::fs::write(&status, "Package: a\nStatus: install ok installed\n").unwrap();

    let plugin = DpkgStatusPlugin::with_status_file(&status);
    assert!(plugin.get_cruft().unwrap().is_empty());
}

#[test]
fn test_dpkg_status_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let plugin = DpkgStatusPlugin::with_status_file(dir.path().join("absent"));
    assert!(plugin.get_cruft().is_err());
}

#[cfg(unix)]
#[test]
fn test_dpkg_status_cleanup_runs_command() {
    let dir = TempDir::new().unwrap();
    let status = dir.path().join("status");
    std::fs::write(&status, "Status: purge ok not-installed\n").unwrap();

    let plugin = DpkgStatusPlugin::with_status_file(&status).with_forget_command(vec!["true".into()]);
    let mut cruft = plugin.get_cruft().unwrap();
    assert!(cruft[0].cleanup().is_ok());
}

#[test]
fn test_langpacks_marked_manual() {
    let plugin = MarkLangpacksManuallyInstalledPlugin::new();
    let app = attach(&plugin);
    let cache = app.mock_cache();
    let de = cache.add(MockPackage::new("language-pack-de").installed().auto_installed());
    cache.add(MockPackage::new("language-pack-de-base").installed().auto_installed());
    cache.add(MockPackage::new("language-pack-fr").installed());
    cache.add(MockPackage::new("language-pack-es").auto_installed());
    cache.add(MockPackage::new("vim").installed().auto_installed());

    let mut cruft = plugin.get_cruft().unwrap();
    assert_eq!(cruft.len(), 1);
    assert_eq!(cruft[0].name(), "mark-manually-installed:language-pack-de");
    assert_eq!(
        cruft[0].description(),
        "language-pack-de needs to be marked as manually installed."
    );
    assert_eq!(cruft[0].prefix_description(), None);

    cruft[0].cleanup().unwrap();
    assert_eq!(de.marks(), vec![PackageMark::Keep, PackageMark::Install]);
}

#[test]
fn test_kdelibs5_missing() {
    let plugin = Kdelibs4devToKdelibs5devPlugin::new();
    let app = attach(&plugin);
    app.mock_cache().add(MockPackage::new("kdelibs4-dev").installed());
    let five = app.mock_cache().add(MockPackage::new("kdelibs5-dev"));

    let mut cruft = plugin.get_cruft().unwrap();
    assert_eq!(cruft.len(), 1);
    assert_eq!(cruft[0].name(), "install-deb:kdelibs5-dev");
    assert!(cruft[0].description().contains("bug #279621"));

    cruft[0].cleanup().unwrap();
    assert!(five.install_marked());
}

#[test]
fn test_kdelibs_nothing_to_do() {
    let plugin = Kdelibs4devToKdelibs5devPlugin::new();
    let app = attach(&plugin);
    app.mock_cache().add(MockPackage::new("kdelibs4-dev").installed());
    assert!(plugin.get_cruft().unwrap().is_empty());

    app.mock_cache().add(MockPackage::new("kdelibs5-dev").installed());
    assert!(plugin.get_cruft().unwrap().is_empty());
}

#[test]
fn test_remove_lilo_without_config() {
    let dir = TempDir::new().unwrap();
    let plugin = RemoveLiloPlugin::with_lilo_conf(dir.path().join("lilo.conf"));
    let app = attach(&plugin);
    let lilo = app.mock_cache().add(MockPackage::new("lilo").installed());
    app.mock_cache().add(MockPackage::new("grub").installed());

    let mut cruft = plugin.get_cruft().unwrap();
    assert_eq!(cruft.len(), 1);
    assert_eq!(cruft[0].name(), "deb:lilo");
    assert!(cruft[0].description().starts_with("Remove lilo since grub is also installed."));

    cruft[0].cleanup().unwrap();
    assert!(lilo.delete_marked());
}

#[test]
fn test_remove_lilo_keeps_configured_lilo() {
    let dir = TempDir::new().unwrap();
    let conf = dir.path().join("lilo.conf");
    std::fs::write(&conf, "boot=/dev/sda\n").unwrap();

    let plugin = RemoveLiloPlugin::with_lilo_conf(&conf);
    let app = attach(&plugin);
    app.mock_cache().add(MockPackage::new("lilo").installed());
    app.mock_cache().add(MockPackage::new("grub").installed());

    assert!(plugin.get_cruft().unwrap().is_empty());
}

#[test]
fn test_remove_lilo_needs_grub() {
    let dir = TempDir::new().unwrap();
    let plugin = RemoveLiloPlugin::with_lilo_conf(dir.path().join("lilo.conf"));
    let app = attach(&plugin);
    app.mock_cache().add(MockPackage::new("lilo").installed());
    app.mock_cache().add(MockPackage::new("grub"));

    assert!(plugin.get_cruft().unwrap().is_empty());
}

#[test]
fn test_registry_has_every_kind() {
    let registry = builtin_registry(&BuiltinOptions::default()).unwrap();
    assert_eq!(
        registry.kinds().collect::<Vec<_>>(),
        vec![
            kinds::DEB,
            kinds::DPKG_STATUS,
            kinds::KDELIBS4TO5,
            kinds::LANGPACK_MANUAL,
            kinds::REMOVE_LILO,
        ]
    );
}

#[test]
fn test_shipped_sources_load() {
    let app: Arc<dyn Application> = Arc::new(MockApplication::new());
    let registry = builtin_registry(&BuiltinOptions::default()).unwrap();
    let mut manager = PluginManager::new(app, registry, [shipped_plugins()]);

    assert_eq!(manager.plugin_files().len(), 5);

    let all = manager.get_plugins(ConditionQuery::Any).unwrap();
    assert_eq!(all.len(), 5);

    let unconditional = manager.get_plugins(ConditionQuery::Default).unwrap();
    let names: Vec<&str> = unconditional.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec![kinds::DEB]);

    let post = manager.get_plugins("PostCleanup").unwrap();
    assert_eq!(post.len(), 1);
    assert_eq!(post[0].name(), kinds::DPKG_STATUS);

    let hardy = manager.get_plugins("from_hardyPostDistUpgradeCache").unwrap();
    let names: Vec<&str> = hardy.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec![kinds::KDELIBS4TO5, kinds::LANGPACK_MANUAL]);
}

#[test]
fn test_options_reach_plugins() {
    let dir = TempDir::new().unwrap();
    let status = dir.path().join("status");
    std::fs::write(&status, "Status: purge ok not-installed\n\nStatus: purge ok not-installed\n").unwrap();

    let options = BuiltinOptions {
        dpkg_status_file: status,
        ..BuiltinOptions::default()
    };
    let registry = builtin_registry(&options).unwrap();
    let plugin = registry.create(kinds::DPKG_STATUS).unwrap();

    let cruft = plugin.get_cruft().unwrap();
    assert_eq!(
        cruft[0].prefix_description().as_deref(),
        Some("2 obsolete entries in the status file")
    );
}

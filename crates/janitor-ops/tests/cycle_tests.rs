use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use janitor_core::testing::{MockApplication, MockPackage};
use janitor_core::{Application, Cruft, FileCruft, Notification, PackageCruft};
use janitor_plugin::{Plugin, PluginBase, PluginError, PluginManager, PluginRegistry, PluginResult};
use janitor_ops::{CleanupCycle, CruftInfo, CycleOptions, Selection};
use tempfile::TempDir;

/// Reports every file in a directory.
struct LeftoversPlugin {
    base: PluginBase,
    dir: PathBuf,
}

impl Plugin for LeftoversPlugin {
    fn name(&self) -> &str {
        "leftovers"
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn get_cruft(&self) -> PluginResult<Vec<Box<dyn Cruft>>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)
            .map_err(|e| PluginError::io(&self.dir, e))?
            .flatten()
            .map(|entry| entry.path())
            .collect();
        paths.sort();
        paths
            .into_iter()
            .map(|path| Ok(Box::new(FileCruft::new(path, "leftover")?) as Box<dyn Cruft>))
            .collect()
    }
}

/// Offers one package for removal and counts post-cleanup calls.
#[derive(Default)]
struct PackagesPlugin {
    base: PluginBase,
    post_calls: Arc<AtomicUsize>,
}

impl Plugin for PackagesPlugin {
    fn name(&self) -> &str {
        "packages"
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn get_cruft(&self) -> PluginResult<Vec<Box<dyn Cruft>>> {
        let cache = self.app()?.cache();
        Ok(cache
            .get("old-lib")
            .map(|pkg| Box::new(PackageCruft::new(pkg, "unused")) as Box<dyn Cruft>)
            .into_iter()
            .collect())
    }

    fn post_cleanup(&self) -> PluginResult<()> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        self.app()?.notify(Notification::new("packages", "post"));
        Ok(())
    }
}

/// Only runs under its condition, and its post-cleanup fails.
#[derive(Default)]
struct GatedPlugin {
    base: PluginBase,
}

impl Plugin for GatedPlugin {
    fn name(&self) -> &str {
        "gated"
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn get_cruft(&self) -> PluginResult<Vec<Box<dyn Cruft>>> {
        Ok(Vec::new())
    }

    fn post_cleanup(&self) -> PluginResult<()> {
        Err(PluginError::Execution {
            name: "gated".to_string(),
            message: "refused".to_string(),
        })
    }
}

struct Fixture {
    _plugins: TempDir,
    junk: TempDir,
    app: Arc<MockApplication>,
    post_calls: Arc<AtomicUsize>,
    manager: PluginManager,
}

fn fixture(junk_files: &[&str]) -> Fixture {
    let plugins = TempDir::new().unwrap();
    let junk = TempDir::new().unwrap();
    for name in junk_files {
        std::fs::write(junk.path().join(name), b"junk").unwrap();
    }

    std::fs::write(
        plugins.path().join("all_plugin.toml"),
        r#"
        [[plugin]]
        kind = "leftovers"

        [[plugin]]
        kind = "packages"

        [[plugin]]
        kind = "gated"
        condition = "PostCleanup"
        "#,
    )
    .unwrap();

    let post_calls = Arc::new(AtomicUsize::new(0));
    let mut registry = PluginRegistry::new();
    let dir = junk.path().to_path_buf();
    registry
        .register("leftovers", move || {
            Box::new(LeftoversPlugin {
                base: PluginBase::new(),
                dir: dir.clone(),
            }) as Box<dyn Plugin>
        })
        .unwrap();
    let calls = Arc::clone(&post_calls);
    registry
        .register("packages", move || {
            Box::new(PackagesPlugin {
                base: PluginBase::new(),
                post_calls: Arc::clone(&calls),
            }) as Box<dyn Plugin>
        })
        .unwrap();
    registry.register_default::<GatedPlugin>("gated").unwrap();

    let app = Arc::new(MockApplication::new());
    let shared: Arc<dyn Application> = app.clone();
    let manager = PluginManager::new(shared, registry, [plugins.path()]);

    Fixture {
        _plugins: plugins,
        junk,
        app,
        post_calls,
        manager,
    }
}

fn names(cycle: &CleanupCycle) -> Vec<String> {
    cycle.found().iter().map(|f| f.name()).collect()
}

#[test]
fn test_scan_orders_by_plugin_then_yield() {
    let mut fx = fixture(&["b.tmp", "a.tmp"]);
    fx.app.mock_cache().add(MockPackage::new("old-lib").installed());

    let cycle = CleanupCycle::scan(&mut fx.manager, None::<&str>).unwrap();
    let a = fx.junk.path().join("a.tmp");
    let b = fx.junk.path().join("b.tmp");

    assert_eq!(
        names(&cycle),
        vec![
            format!("file:{}", a.display()),
            format!("file:{}", b.display()),
            "deb:old-lib".to_string(),
        ]
    );
    assert_eq!(cycle.found()[2].plugin, "packages");
    assert_eq!(cycle.plugins().len(), 2);
}

#[test]
fn test_end_to_end_cleanup() {
    let mut fx = fixture(&["a.tmp"]);
    let pkg = fx.app.mock_cache().add(MockPackage::new("old-lib").installed());

    let mut cycle = CleanupCycle::scan(&mut fx.manager, None::<&str>).unwrap();
    let report = cycle.cleanup(&Selection::All);

    assert!(report.is_success(), "{report:?}");
    assert_eq!(report.cleaned.len(), 2);
    assert!(!fx.junk.path().join("a.tmp").exists());
    assert!(pkg.delete_marked());
    assert!(report.bytes_freed >= 12765);
    assert!(cycle.found().is_empty());

    assert_eq!(fx.post_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fx.app.notifications(), vec![Notification::new("packages", "post")]);
}

#[test]
fn test_post_cleanup_runs_without_selection() {
    let mut fx = fixture(&["a.tmp"]);

    let mut cycle = CleanupCycle::scan(&mut fx.manager, None::<&str>).unwrap();
    let report = cycle.cleanup(&Selection::Nothing);

    assert!(report.cleaned.is_empty());
    assert!(fx.junk.path().join("a.tmp").exists());
    assert_eq!(cycle.found().len(), 1);
    assert_eq!(fx.post_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_named_selection() {
    let mut fx = fixture(&["a.tmp", "b.tmp"]);
    let b = fx.junk.path().join("b.tmp");

    let mut cycle = CleanupCycle::scan(&mut fx.manager, None::<&str>).unwrap();
    let wanted = format!("file:{}", b.display());
    let report = cycle.cleanup(&Selection::names([wanted.as_str(), "file:/nowhere"]));

    assert_eq!(report.cleaned, vec![wanted]);
    assert_eq!(report.unmatched, vec!["file:/nowhere".to_string()]);
    assert!(fx.junk.path().join("a.tmp").exists());
    assert!(!b.exists());
}

#[test]
fn test_failure_stops_remaining_items() {
    let mut fx = fixture(&["a.tmp", "b.tmp"]);
    let mut cycle = CleanupCycle::scan(&mut fx.manager, None::<&str>).unwrap();

    std::fs::remove_file(fx.junk.path().join("a.tmp")).unwrap();
    let report = cycle.cleanup(&Selection::All);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.skipped, 1);
    assert!(report.cleaned.is_empty());
    assert!(fx.junk.path().join("b.tmp").exists());
    assert!(!report.is_success());
    assert_eq!(fx.post_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_continue_on_error() {
    let mut fx = fixture(&["a.tmp", "b.tmp"]);
    let options = CycleOptions::builder().continue_on_error(true).build().unwrap();
    let mut cycle = CleanupCycle::scan_with_options(&mut fx.manager, None::<&str>, options).unwrap();

    std::fs::remove_file(fx.junk.path().join("a.tmp")).unwrap();
    let report = cycle.cleanup(&Selection::All);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.cleaned.len(), 1);
    assert!(!fx.junk.path().join("b.tmp").exists());
}

#[test]
fn test_dry_run_touches_nothing() {
    let mut fx = fixture(&["a.tmp"]);
    let pkg = fx.app.mock_cache().add(MockPackage::new("old-lib").installed());
    let options = CycleOptions::builder().dry_run(true).build().unwrap();
    let mut cycle = CleanupCycle::scan_with_options(&mut fx.manager, None::<&str>, options).unwrap();

    let report = cycle.cleanup(&Selection::All);

    assert!(report.dry_run);
    assert_eq!(report.cleaned.len(), 2);
    assert!(report.summary().starts_with("Would clean 2 items"));
    assert!(fx.junk.path().join("a.tmp").exists());
    assert!(pkg.marks().is_empty());
    assert_eq!(cycle.found().len(), 2);
    assert_eq!(fx.post_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_post_cleanup_failures_recorded() {
    let mut fx = fixture(&[]);
    let mut cycle = CleanupCycle::scan(&mut fx.manager, "PostCleanup").unwrap();
    assert_eq!(cycle.plugins().len(), 1);

    let report = cycle.cleanup(&Selection::All);
    assert_eq!(report.post_cleanup_failures.len(), 1);
    assert_eq!(report.post_cleanup_failures[0].name, "gated");
    assert!(!report.is_success());
}

#[test]
fn test_scan_error_aborts() {
    let mut fx = fixture(&[]);
    let junk = fx.junk.path().to_path_buf();
    drop(fx.junk);
    std::fs::remove_dir_all(&junk).ok();

    assert!(CleanupCycle::scan(&mut fx.manager, None::<&str>).is_err());
}

#[test]
fn test_cruft_info_serializes() {
    let mut fx = fixture(&[]);
    fx.app.mock_cache().add(MockPackage::new("old-lib").installed());
    let cycle = CleanupCycle::scan(&mut fx.manager, None::<&str>).unwrap();

    let info: Vec<CruftInfo> = cycle.found().iter().map(CruftInfo::from).collect();
    let json = serde_json::to_value(&info).unwrap();

    assert_eq!(json[0]["name"], "deb:old-lib");
    assert_eq!(json[0]["prefix_description"], ".deb package");
    assert_eq!(json[0]["disk_usage"], 12765);
    assert_eq!(json[0]["plugin"], "packages");
}

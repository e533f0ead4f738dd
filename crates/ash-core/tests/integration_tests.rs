use ash_core::plugins::events::{ErrorEvent, InfoEvent, Phase, ScanComplete, ScanStart};
use ash_core::plugins::manifest::{register_manifest, ExternalPlugin, PluginManifest};
use ash_core::plugins::{PluginManager, PluginType, ASH_DEFAULT};
use ash_core::scan_set::{ignorespec_lines, IGNORE_REPORT_FILE, SCAN_SET_FILE};
use ash_core::{scan_set, ScanSetOptions};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "content").unwrap();
}

fn relative_paths(root: &Path, files: &[String]) -> Vec<String> {
    files
        .iter()
        .map(|file| {
            Path::new(file)
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

// ─── Plugin manager ───

#[test]
fn test_reserved_default_name_is_protected_in_every_category() {
    let mut manager = PluginManager::with_builtin_plugins();

    for plugin_type in PluginType::ALL {
        let before = manager.library().get(plugin_type).clone();
        for path in [
            "third_party.plugins",
            "automated_security_helper.scanners.ash_default_extra",
            "",
        ] {
            manager.register_plugin_module(plugin_type, ASH_DEFAULT, path, None, true);
        }
        assert_eq!(manager.library().get(plugin_type), &before);
    }
}

#[test]
fn test_default_path_reregistration_is_duplicate_noop() {
    let mut manager = PluginManager::new();
    let before = manager.library().clone();

    manager.register_plugin_module(
        PluginType::Reporter,
        ASH_DEFAULT,
        PluginType::Reporter.default_module_path(),
        Some("0.0.1"),
        false,
    );

    assert_eq!(manager.library(), &before);
}

#[test]
fn test_builtin_names_cannot_be_shadowed() {
    let mut manager = PluginManager::with_builtin_plugins();
    let original = manager
        .registration(PluginType::Scanner, "bandit")
        .unwrap()
        .plugin_module_path
        .clone();

    manager.register_plugin_module(PluginType::Scanner, "bandit", "evil.bandit", None, true);

    assert_eq!(
        manager
            .registration(PluginType::Scanner, "bandit")
            .unwrap()
            .plugin_module_path,
        original
    );
    assert_eq!(
        manager
            .plugin_modules(PluginType::Scanner)
            .iter()
            .filter(|d| d.name == "bandit")
            .count(),
        1
    );
}

#[test]
fn test_manifest_plugins_join_builtin_implementations() {
    let mut manager = PluginManager::with_builtin_plugins();
    let builtin_count = manager.plugin_modules(PluginType::Reporter).len();

    let manifest = PluginManifest {
        converters: Vec::new(),
        scanners: Vec::new(),
        reporters: vec![ExternalPlugin {
            name: "security-hub".to_string(),
            module_path: "ash_aws_plugins".to_string(),
            description: "Send findings to AWS Security Hub".to_string(),
            tool: None,
            version: Some("1.2.0".to_string()),
            enabled: false,
        }],
    };
    assert_eq!(register_manifest(&mut manager, &manifest), 1);

    let reporters = manager.plugin_modules(PluginType::Reporter);
    assert_eq!(reporters.len(), builtin_count + 1);
    assert_eq!(reporters.last().unwrap().name, "security-hub");
    assert!(
        !manager
            .registration(PluginType::Reporter, "security-hub")
            .unwrap()
            .enabled
    );

    let with_tools = manager.plugin_modules_where(PluginType::Scanner, |d| {
        d.tool.as_deref() == Some("semgrep")
    });
    assert_eq!(with_tools.len(), 1);
}

// ─── Events ───

#[test]
fn test_notify_without_subscribers_returns_empty() {
    let manager = PluginManager::new();
    let results = manager
        .notify(&InfoEvent {
            phase: Some(Phase::Report),
            message: "nothing listening".to_string(),
        })
        .unwrap();
    assert!(results.is_empty());

    let mut manager = PluginManager::new();
    manager.subscribe(|_: &ErrorEvent| Ok(()));
    let results = manager
        .notify(&ScanComplete {
            scanner: "bandit".to_string(),
            finding_count: 3,
            message: "done".to_string(),
        })
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_notify_runs_subscribers_in_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut manager = PluginManager::new();

    for id in 0..4 {
        let seen = Rc::clone(&seen);
        manager.subscribe(move |event: &ScanStart| {
            seen.borrow_mut().push(format!("{id}:{}", event.scanner));
            Ok(())
        });
    }

    let results = manager
        .notify(&ScanStart {
            scanner: "checkov".to_string(),
            scan_targets: vec!["main.tf".into()],
            message: "Starting scanner: checkov".to_string(),
        })
        .unwrap();

    assert_eq!(results.len(), 4);
    assert_eq!(
        *seen.borrow(),
        vec!["0:checkov", "1:checkov", "2:checkov", "3:checkov"]
    );
}

// ─── Scan set ───

#[test]
fn test_gitignore_pattern_excludes_matching_files() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join(".gitignore"), "*.log\n").unwrap();
    touch(root, "a.py");
    touch(root, "b.log");

    let files = scan_set(&ScanSetOptions::new(root)).unwrap();
    let files = relative_paths(root, &files);

    assert!(files.contains(&"a.py".to_string()));
    assert!(!files.contains(&"b.log".to_string()));
}

#[test]
fn test_cdk_template_reincluded_under_asset_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    touch(root, "cdk.out/asset.123/template.template.json");
    touch(root, "cdk.out/asset.123/other.txt");

    let files = relative_paths(root, &scan_set(&ScanSetOptions::new(root)).unwrap());

    assert!(files.contains(&"cdk.out/asset.123/template.template.json".to_string()));
    assert!(!files.contains(&"cdk.out/asset.123/other.txt".to_string()));
}

#[test]
fn test_builtin_asset_exclusion_overrides_user_negation() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join(".gitignore"), "*.txt\n!requirements.txt\n").unwrap();
    touch(root, "cdk.out/asset.abc123/requirements.txt");
    touch(root, "requirements.txt");
    touch(root, "notes.txt");
    touch(root, "handler.py");

    let files = relative_paths(root, &scan_set(&ScanSetOptions::new(root)).unwrap());

    assert_eq!(files, vec![".gitignore", "handler.py", "requirements.txt"]);
}

#[test]
fn test_later_directory_negation_reincludes_files() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join(".gitignore"), "*.log\n!important/\n").unwrap();
    touch(root, "important/x.log");
    touch(root, "debug.log");

    let files = relative_paths(root, &scan_set(&ScanSetOptions::new(root)).unwrap());

    assert_eq!(files, vec![".gitignore", "important/x.log"]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_directories_do_not_duplicate_ignore_blocks() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join(".gitignore"), "*.log\n").unwrap();
    fs::create_dir_all(root.join("a")).unwrap();
    std::os::unix::fs::symlink(root, root.join("a/loop")).unwrap();
    fs::create_dir_all(root.join("real")).unwrap();
    fs::write(root.join("real/.ignore"), "tmp/\n").unwrap();
    std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();
    touch(root, "a/app.py");

    let lines = ignorespec_lines(root, &["./.gitignore".to_string()]).unwrap();
    let blocks: Vec<&String> = lines
        .iter()
        .filter(|line| line.starts_with("######### START CONTENTS: ${SOURCE_DIR}"))
        .collect();
    assert_eq!(blocks.len(), 2);

    let files = relative_paths(root, &scan_set(&ScanSetOptions::new(root)).unwrap());
    assert_eq!(files, vec![".gitignore", "a/app.py", "real/.ignore"]);
}

#[test]
fn test_nested_gitignore_patterns_apply() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("service")).unwrap();
    fs::write(root.join("service/.gitignore"), "*.pyc\n__pycache__/\n").unwrap();
    touch(root, "service/app.py");
    touch(root, "service/app.pyc");
    touch(root, "service/__pycache__/app.cpython-312.pyc");
    touch(root, "tools/helper.pyc");

    let files = relative_paths(root, &scan_set(&ScanSetOptions::new(root)).unwrap());

    assert_eq!(files, vec!["service/.gitignore", "service/app.py"]);
}

#[test]
fn test_extra_ignorefile_is_honored() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join(".ashignore"), "fixtures/\n").unwrap();
    touch(root, "fixtures/secret.pem");
    touch(root, "src/lib.py");

    let options = ScanSetOptions::new(root).ignorefiles(vec![".ashignore".to_string()]);
    let files = relative_paths(root, &scan_set(&options).unwrap());

    assert_eq!(files, vec![".ashignore", "src/lib.py"]);
}

#[test]
fn test_node_modules_aws_cdk_never_in_scan_set() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join(".gitignore"), "!**/node_modules/**\n").unwrap();
    touch(root, "node_modules/aws-cdk/lib/index.js");
    touch(root, "infra/node_modules/aws-cdk-lib/core.js");
    touch(root, "infra/app.ts");

    let files = scan_set(&ScanSetOptions::new(root)).unwrap();

    assert!(files.iter().all(|f| !f.contains("/node_modules/aws-cdk")));
    assert!(files.iter().any(|f| f.ends_with("app.ts")));
}

#[test]
fn test_second_call_reuses_cache_verbatim() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("repo");
    let output = tmp.path().join("ash_output");
    fs::create_dir_all(&root).unwrap();
    touch(&root, "a.py");
    touch(&root, "b.py");

    let options = ScanSetOptions::new(&root).output(&output);
    let first = scan_set(&options).unwrap();
    let report_before = fs::read(output.join(IGNORE_REPORT_FILE)).unwrap();
    let list_before = fs::read(output.join(SCAN_SET_FILE)).unwrap();

    touch(&root, "c.py");
    fs::remove_file(root.join("a.py")).unwrap();
    fs::write(root.join(".gitignore"), "b.py\n").unwrap();

    let second = scan_set(&options).unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read(output.join(IGNORE_REPORT_FILE)).unwrap(), report_before);
    assert_eq!(fs::read(output.join(SCAN_SET_FILE)).unwrap(), list_before);
}

#[test]
fn test_removing_cache_forces_recompute() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("repo");
    let output = tmp.path().join("ash_output");
    fs::create_dir_all(&root).unwrap();
    touch(&root, "a.py");

    let options = ScanSetOptions::new(&root).output(&output);
    assert_eq!(scan_set(&options).unwrap().len(), 1);

    touch(&root, "b.py");
    fs::remove_file(output.join(SCAN_SET_FILE)).unwrap();
    fs::remove_file(output.join(IGNORE_REPORT_FILE)).unwrap();

    assert_eq!(scan_set(&options).unwrap().len(), 2);
}

#[test]
fn test_missing_source_propagates_error() {
    let tmp = tempfile::tempdir().unwrap();
    let result = scan_set(&ScanSetOptions::new(tmp.path().join("does-not-exist")));
    assert!(result.is_err());
}

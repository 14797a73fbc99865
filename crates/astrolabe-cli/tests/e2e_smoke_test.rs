use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use astrolabe_cli::{Args, BackendArg, FormatArg};

/// Directory holding the demo manifests at the workspace root
fn demos_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

/// Collects all .toml manifests from a directory
fn collect_manifests(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Arguments rendering with the builtin backend, so no Graphviz is needed
fn builtin_args(input: &Path, output_dir: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output_dir: Some(output_dir.to_string_lossy().to_string()),
        config: None,
        format: Some(FormatArg::Svg),
        backend: Some(BackendArg::Builtin),
        best_effort: false,
        emit_dot: true,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_manifests() {
    // Create a temporary directory for test outputs
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_manifests = collect_manifests(demos_dir());

    assert!(
        !valid_manifests.is_empty(),
        "No valid manifests found in demos/"
    );

    let mut failed_manifests = Vec::new();

    for manifest_path in &valid_manifests {
        let output_dir = temp_dir
            .path()
            .join(manifest_path.file_stem().unwrap().to_string_lossy().as_ref());
        let args = builtin_args(manifest_path, &output_dir);

        match astrolabe_cli::run(&args) {
            Ok(report) if report.is_success() => {
                for artifact in report.artifacts() {
                    assert!(
                        artifact.path().is_file(),
                        "missing artifact {}",
                        artifact.path().display()
                    );
                }
            }
            Ok(report) => {
                let titles: Vec<_> = report.failures().iter().map(|f| f.title()).collect();
                failed_manifests.push((manifest_path.clone(), titles.join(", ")));
            }
            Err(e) => failed_manifests.push((manifest_path.clone(), e.to_string())),
        }
    }

    if !failed_manifests.is_empty() {
        eprintln!("\nValid manifests that failed:");
        for (path, err) in &failed_manifests {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!(
            "{} valid manifest(s) failed unexpectedly",
            failed_manifests.len()
        );
    }

    println!("✅ All {} valid manifests passed", valid_manifests.len());
}

#[test]
fn e2e_smoke_test_mern_artifacts() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let args = builtin_args(&demos_dir().join("mern.toml"), temp_dir.path());

    let report = astrolabe_cli::run(&args).expect("mern manifest builds");
    assert_eq!(report.artifacts().len(), 3);

    for name in [
        "mern_ecommerce_kubernetes_architecture",
        "mern_components",
        "mern_cicd",
    ] {
        assert!(temp_dir.path().join(format!("{name}.svg")).is_file(), "{name}.svg");
        assert!(temp_dir.path().join(format!("{name}.dot")).is_file(), "{name}.dot");
    }
}

#[test]
fn e2e_smoke_test_error_manifests() {
    // Create a temporary directory for test outputs
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_manifests = collect_manifests(demos_dir().join("errors"));

    assert!(
        !error_manifests.is_empty(),
        "No error manifests found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for manifest_path in &error_manifests {
        let output_dir = temp_dir.path().join(format!(
            "error_{}",
            manifest_path.file_stem().unwrap().to_string_lossy()
        ));
        let args = builtin_args(manifest_path, &output_dir);

        if matches!(astrolabe_cli::run(&args), Ok(report) if report.is_success()) {
            unexpectedly_succeeded.push(manifest_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError manifests that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error manifest(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error manifests failed as expected",
        error_manifests.len()
    );
}

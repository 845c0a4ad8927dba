use std::{fs, path::PathBuf};

use tempfile::tempdir;

use terracanvas::graph::Graph;
use terracanvas_cli::{Args, Command, run};

/// Demo inputs live at the workspace root, not inside the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects the inputs of a directory: `.tf` and `.json` files plus
/// subdirectories holding a multi-file configuration
fn collect_inputs(dir: PathBuf) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                let extension = path.extension().and_then(|s| s.to_str());
                (path.is_file() && matches!(extension, Some("tf" | "json")))
                    || (path.is_dir() && path.file_name().is_some_and(|name| name != "errors"))
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    inputs.sort();
    inputs
}

fn args(command: Command) -> Args {
    Args {
        command,
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_inputs(demos_path());

    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();

    for demo in &demos {
        let stem = demo.file_stem().unwrap().to_string_lossy().to_string();
        let snapshot = temp_dir.path().join(format!("{stem}.json"));
        let generated = temp_dir.path().join(format!("{stem}-generated"));

        let build = args(Command::Build {
            input: demo.to_string_lossy().to_string(),
            output: snapshot.to_string_lossy().to_string(),
        });
        let generate = args(Command::Generate {
            snapshot: snapshot.to_string_lossy().to_string(),
            output: generated.to_string_lossy().to_string(),
        });

        if let Err(e) = run(&build).and_then(|()| run(&generate)) {
            failed.push((demo.clone(), e));
            continue;
        }

        let graph: Graph =
            serde_json::from_str(&fs::read_to_string(&snapshot).unwrap()).unwrap();
        assert!(graph.nodes_count() > 0, "{}: empty diagram", demo.display());
        assert!(
            generated.join("main.tf").exists(),
            "{}: no main.tf generated",
            demo.display()
        );
    }

    if !failed.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_round_trip_is_stable() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let first = temp_dir.path().join("first");
    let second = temp_dir.path().join("second");

    run(&args(Command::RoundTrip {
        input: demos_path().join("network.tf").to_string_lossy().to_string(),
        output: first.to_string_lossy().to_string(),
    }))
    .unwrap();
    run(&args(Command::RoundTrip {
        input: first.to_string_lossy().to_string(),
        output: second.to_string_lossy().to_string(),
    }))
    .unwrap();

    for name in ["main.tf", "variables.tf", "outputs.tf"] {
        assert_eq!(
            fs::read_to_string(first.join(name)).unwrap(),
            fs::read_to_string(second.join(name)).unwrap(),
            "{name} changed on the second round trip"
        );
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_inputs(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo in &error_demos {
        let output = temp_dir.path().join(format!(
            "error_{}.json",
            demo.file_stem().unwrap().to_string_lossy()
        ));

        let build = args(Command::Build {
            input: demo.to_string_lossy().to_string(),
            output: output.to_string_lossy().to_string(),
        });

        if run(&build).is_ok() {
            unexpectedly_succeeded.push(demo.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

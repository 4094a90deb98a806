//! End-to-end exercises of the public API against the mock runner: the
//! client is driven exactly as production callers drive it, with template
//! fixtures on disk and assertions on the argv handed to the runner.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use packer_client::subprocess::MockProcessRunner;
use packer_client::{BuildConfig, BuildOptions, Installer, Packer, PackerError, PushOptions};

fn template_in(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("packerfile.json");
    std::fs::write(&path, r#"{"builders": [{"type": "docker"}]}"#).unwrap();
    path
}

const INSPECT_SAMPLE: &str = "\
1508999535,,ui,say,Variables:
1508999535,,template-variable,aws_access_key,{{env `AWS_ACCESS_KEY_ID`}}
1508999535,,ui,say,Builders:
1508999535,,template-builder,docker,docker
1508999535,,ui,say,Provisioners:
1508999535,,template-provisioner,shell
1508999535,,ui,say,Note: If your build names contain user variables or template functions such as 'timestamp'%!(PACKER_COMMA) these are processed at build time%!(PACKER_COMMA) and therefore only show in their raw form here.
";

#[tokio::test]
async fn validate_emits_the_documented_argv_layout() {
    let dir = TempDir::new().unwrap();
    let template = template_in(&dir);
    let config = BuildConfig::builder(&template)
        .exclude(["a", "b"])
        .var("x", "y")
        .build()
        .unwrap();

    let mock = MockProcessRunner::new();
    let expected_template = template.display().to_string();
    mock.expect("packer")
        .with_args(move |args| {
            args == [
                "validate",
                "-syntax-only",
                "-except=a,b",
                "-var",
                "x=y",
                expected_template.as_str(),
            ]
        })
        .stdout("Template validated successfully.\n")
        .register();

    let packer = Packer::with_runner(config, Arc::new(mock.clone()));
    let validation = packer.validate(true).await.unwrap();

    assert!(validation.succeeded);
    assert_eq!(mock.call_count("packer"), 1);
}

#[tokio::test]
async fn inspect_reduces_the_full_machine_readable_stream() {
    let dir = TempDir::new().unwrap();
    let template = template_in(&dir);
    let config = BuildConfig::builder(&template).build().unwrap();

    let mock = MockProcessRunner::new();
    mock.expect("packer").stdout(INSPECT_SAMPLE).register();

    let packer = Packer::with_runner(config, Arc::new(mock));
    let inspection = packer.inspect().await.unwrap();

    assert_eq!(inspection.variables.len(), 1);
    assert_eq!(inspection.variables[0].name, "aws_access_key");
    assert_eq!(inspection.builders.len(), 1);
    assert_eq!(inspection.builders[0].name, "docker");
    assert_eq!(inspection.builders[0].kind, "docker");
    assert_eq!(inspection.provisioners.len(), 1);
    assert_eq!(inspection.provisioners[0].kind, "shell");
}

#[tokio::test]
async fn build_with_var_file_places_template_last() {
    let dir = TempDir::new().unwrap();
    let template = template_in(&dir);
    let var_file = dir.path().join("vars.json");
    std::fs::write(&var_file, "{}").unwrap();

    let config = BuildConfig::builder(&template)
        .var_file(&var_file)
        .build()
        .unwrap();

    let mock = MockProcessRunner::new();
    let expected_template = template.display().to_string();
    let expected_var_file = format!("-var-file={}", var_file.display());
    mock.expect("packer")
        .with_args(move |args| {
            args.first().map(String::as_str) == Some("build")
                && args.contains(&expected_var_file)
                && args.last().map(String::as_str) == Some(expected_template.as_str())
        })
        .register();

    let packer = Packer::with_runner(config, Arc::new(mock));
    let output = packer.build(&BuildOptions::default()).await.unwrap();
    assert!(output.status.success());
}

#[tokio::test]
async fn conflicting_builder_selection_never_reaches_the_runner() {
    let dir = TempDir::new().unwrap();
    let template = template_in(&dir);
    let config = BuildConfig::builder(&template)
        .only(["x"])
        .exclude(["y"])
        .build()
        .unwrap();

    let mock = MockProcessRunner::new();
    let packer = Packer::with_runner(config, Arc::new(mock.clone()));

    let result = packer.build(&BuildOptions::default()).await;
    assert!(matches!(result, Err(PackerError::Configuration(_))));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn missing_template_fails_at_construction() {
    let result = BuildConfig::builder("/definitely/missing/packerfile.json").build();
    assert!(matches!(result, Err(PackerError::Configuration(_))));
}

#[tokio::test]
async fn installed_executable_feeds_the_client() {
    let dir = TempDir::new().unwrap();
    let template = template_in(&dir);

    // Stage a release-style zip containing the executable.
    let archive_path = dir.path().join("packer_1.2.3_linux_amd64.zip");
    let mut writer = zip::ZipWriter::new(std::fs::File::create(&archive_path).unwrap());
    writer
        .start_file("packer", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"#!/bin/sh\n").unwrap();
    writer.finish().unwrap();

    let install_dir = dir.path().join("tools");
    let exec_path = Installer::new(&archive_path, &install_dir).install().unwrap();
    assert_eq!(exec_path, install_dir.join("packer"));

    let exec = exec_path.display().to_string();
    let mock = MockProcessRunner::new();
    mock.expect(&exec).stdout("Packer v1.2.3\n").register();

    let config = BuildConfig::builder(&template).build().unwrap();
    let packer = Packer::with_runner(config, Arc::new(mock)).exec_path(&exec);
    assert_eq!(packer.version().await.unwrap(), "1.2.3");
}

#[tokio::test]
async fn push_and_fix_share_the_template_tail() {
    let dir = TempDir::new().unwrap();
    let template = template_in(&dir);
    let config = BuildConfig::builder(&template).build().unwrap();
    let expected_template = template.display().to_string();

    let mock = MockProcessRunner::new();
    let push_template = expected_template.clone();
    mock.expect("packer")
        .with_args(move |args| args == ["push", "-name=org/image", push_template.as_str()])
        .register();
    let fix_template = expected_template.clone();
    mock.expect("packer")
        .with_args(move |args| args == ["fix", fix_template.as_str()])
        .stdout("{\"builders\": [{\"type\": \"docker\"}]}\n")
        .register();

    let packer = Packer::with_runner(config, Arc::new(mock));

    let options = PushOptions {
        name: Some("org/image".to_string()),
        ..Default::default()
    };
    assert!(packer.push(&options).await.unwrap().status.success());

    let fix = packer.fix(None).await.unwrap();
    assert_eq!(fix.fixed.unwrap()["builders"][0]["type"], "docker");
}

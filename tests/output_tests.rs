// ABOUTME: Integration tests for compiling templates to files
// ABOUTME: Tests numbered and fixed naming, stdout-free persistence and fatal errors

use promptweave::engine::{CompileError, Compiler};
use promptweave::output::{FileWriter, OutputNaming, OutputSettings};

mod common;
use common::{FailingVariable, TestEnvironment, TestRegistryBuilder};

fn compiler(env: &TestEnvironment) -> Compiler {
    Compiler::new(
        TestRegistryBuilder::new()
            .with_config(&[("project_name", "weave")])
            .with("broken", FailingVariable)
            .resolver(env.path()),
    )
}

#[tokio::test]
async fn test_numbered_output_continues_sequence() {
    let env = TestEnvironment::new();
    let out = env.output_dir();
    tokio::fs::create_dir_all(&out).await.unwrap();
    tokio::fs::write(out.join("001-foo.md"), "earlier").await.unwrap();

    let template = env.write_template("foo", "Project: {{$config.project_name}}").await;
    let writer = FileWriter::new(OutputSettings::new(&out));

    let document = compiler(&env)
        .compile_file(&template, None, &writer)
        .await
        .unwrap();

    let path = document.path.unwrap();
    assert_eq!(path, out.join("002-foo.md"));
    assert_eq!(
        tokio::fs::read_to_string(&path).await.unwrap(),
        "Project: weave"
    );
}

#[tokio::test]
async fn test_successive_compiles_number_upwards() {
    let env = TestEnvironment::new();
    let template = env.write_template("notes", "static text").await;
    let writer = FileWriter::new(OutputSettings::new(env.output_dir()));
    let compiler = compiler(&env);

    let first = compiler.compile_file(&template, None, &writer).await.unwrap();
    let second = compiler
        .compile_file(&template, Some("renamed"), &writer)
        .await
        .unwrap();

    assert_eq!(first.path.unwrap(), env.output_dir().join("001-notes.md"));
    assert_eq!(second.path.unwrap(), env.output_dir().join("002-renamed.md"));
}

#[tokio::test]
async fn test_fixed_output_overwrites() {
    let env = TestEnvironment::new();
    let template = env.write_template("fixed", "v1").await;
    let writer = FileWriter::new(
        OutputSettings::new(env.output_dir())
            .with_naming(OutputNaming::Fixed)
            .with_extension("txt"),
    );
    let compiler = compiler(&env);

    compiler.compile_file(&template, None, &writer).await.unwrap();
    tokio::fs::write(&template, "v2").await.unwrap();
    let document = compiler.compile_file(&template, None, &writer).await.unwrap();

    let path = document.path.unwrap();
    assert_eq!(path, env.output_dir().join("fixed.txt"));
    assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "v2");
}

#[tokio::test]
async fn test_placeholder_failures_still_write_output() {
    let env = TestEnvironment::new();
    let template = env
        .write_template("partial", "{{$broken}}\n{{$config.project_name}}\n")
        .await;
    let writer = FileWriter::new(OutputSettings::new(env.output_dir()));

    let document = compiler(&env)
        .compile_file(&template, None, &writer)
        .await
        .unwrap();

    let written = tokio::fs::read_to_string(document.path.unwrap())
        .await
        .unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert!(lines[0].starts_with("<!-- No value for $broken"));
    assert_eq!(lines[1], "weave");
    assert_eq!(document.result.summary.failed, 1);
}

#[tokio::test]
async fn test_missing_template_is_fatal_and_writes_nothing() {
    let env = TestEnvironment::new();
    let writer = FileWriter::new(OutputSettings::new(env.output_dir()));

    let err = compiler(&env)
        .compile_file(&env.path().join("absent.md"), None, &writer)
        .await
        .unwrap_err();

    assert!(matches!(err, CompileError::TemplateRead { .. }));
    assert!(!env.output_dir().exists());
}

#[tokio::test]
async fn test_uncreatable_output_dir_is_fatal() {
    let env = TestEnvironment::new();
    let blocker = env.write_file("blocker", "not a directory").await;
    let template = env.write_template("t", "text").await;
    let writer = FileWriter::new(OutputSettings::new(blocker.join("out")));

    let err = compiler(&env)
        .compile_file(&template, None, &writer)
        .await
        .unwrap_err();

    assert!(matches!(err, CompileError::Output(_)));
}

//! Applying the wheel trampoline to bundles loaded from disk.

use crate::common::{JAR_PATH, TestBundle, WHEEL_JOB, WHEEL_PATH, bundle_dir, wheel_job_with_wrapper};
use rstest::rstest;
use trampoline::config::Library;
use trampoline::mutator;
use trampoline::path::relative_slash_path;
use trampoline::python::transform_wheel_task;

#[rstest]
fn test_no_transform_by_default(bundle_dir: TestBundle) {
    bundle_dir.write_config(WHEEL_JOB);
    let mut bundle = bundle_dir.load();

    mutator::apply(&mut bundle, &transform_wheel_task()).unwrap();

    let task = &bundle.config.resources.jobs["job1"].tasks[0];
    let wheel = task.python_wheel_task().expect("wheel task should be kept");
    assert_eq!(wheel.package_name, "test_package");
    assert_eq!(wheel.entry_point, "main");
    assert_eq!(task.libraries[0], Library::Whl(WHEEL_PATH.to_string()));
    assert_eq!(task.libraries.len(), 2);
    assert!(task.notebook_task().is_none());

    // Nothing resolved the internal directory
    assert!(!bundle_dir.root_path().join(".bundle").exists());
}

#[rstest]
fn test_transform_with_experimental_setting_set_to_true(bundle_dir: TestBundle) {
    bundle_dir.write_config(&wheel_job_with_wrapper());
    let mut bundle = bundle_dir.load();

    mutator::apply(&mut bundle, &transform_wheel_task()).unwrap();

    let task = &bundle.config.resources.jobs["job1"].tasks[0];
    assert!(task.python_wheel_task().is_none());
    let notebook = task.notebook_task().expect("notebook task should be set");

    let internal_dir = bundle.internal_dir().unwrap();
    let internal_dir_rel = relative_slash_path(bundle.root(), &internal_dir).unwrap();
    assert_eq!(
        notebook.notebook_path,
        format!("{internal_dir_rel}/notebook_job1_key1")
    );
    assert_eq!(
        notebook.notebook_path,
        ".bundle/development/.internal/notebook_job1_key1"
    );

    assert_eq!(task.libraries, vec![Library::Jar(JAR_PATH.to_string())]);
}

#[rstest]
fn test_reapplying_is_a_noop(bundle_dir: TestBundle) {
    bundle_dir.write_config(&wheel_job_with_wrapper());
    let mut bundle = bundle_dir.load();

    mutator::apply(&mut bundle, &transform_wheel_task()).unwrap();
    let once = bundle.config.clone();
    mutator::apply(&mut bundle, &transform_wheel_task()).unwrap();

    assert_eq!(bundle.config, once);
}

#[rstest]
fn test_files_path_prefixes_notebook_path(bundle_dir: TestBundle) {
    bundle_dir.write_config(&format!(
        "{}\n[workspace]\nfiles-path = \"/Workspace/Users/test@test.com/.bundle/test-bundle/files\"\n",
        wheel_job_with_wrapper()
    ));
    let mut bundle = bundle_dir.load();

    mutator::apply(&mut bundle, &transform_wheel_task()).unwrap();

    let task = &bundle.config.resources.jobs["job1"].tasks[0];
    assert_eq!(
        task.notebook_task().unwrap().notebook_path,
        "/Workspace/Users/test@test.com/.bundle/test-bundle/files/.bundle/development/.internal/notebook_job1_key1"
    );
}

#[rstest]
fn test_relocated_cache_is_cleaned_against_files_path(bundle_dir: TestBundle) {
    bundle_dir.write_config(&format!(
        "{}\n[workspace]\nfiles-path = \"/Workspace/Users/test@test.com/.bundle/test-bundle/files\"\n",
        wheel_job_with_wrapper()
    ));
    let cache = bundle_dir.root_path().parent().unwrap().join("cache");
    let mut bundle = bundle_dir.load().with_cache_root(&cache);

    mutator::apply(&mut bundle, &transform_wheel_task()).unwrap();

    let task = &bundle.config.resources.jobs["job1"].tasks[0];
    assert_eq!(
        task.notebook_task().unwrap().notebook_path,
        "/Workspace/Users/test@test.com/.bundle/test-bundle/cache/.internal/notebook_job1_key1"
    );
}

#[rstest]
fn test_missing_target_fails_without_mutating(bundle_dir: TestBundle) {
    bundle_dir.write_config(&wheel_job_with_wrapper());
    let mut bundle = bundle_dir.load();
    bundle.config.bundle.target.clear();
    let before = bundle.config.clone();

    let err = mutator::apply(&mut bundle, &transform_wheel_task()).unwrap_err();

    assert_eq!(
        format!("{err:#}"),
        "Mutator python.TransformWheelTask failed: bundle target is not set; cannot resolve the cache directory"
    );
    assert_eq!(bundle.config, before);
}

#[rstest]
fn test_unwritable_cache_fails_without_mutating(bundle_dir: TestBundle) {
    bundle_dir.write_config(&wheel_job_with_wrapper());
    let blocker = bundle_dir.root_path().join("cache-file");
    std::fs::write(&blocker, "").unwrap();
    let mut bundle = bundle_dir.load().with_cache_root(&blocker);
    let before = bundle.config.clone();

    let err = mutator::apply(&mut bundle, &transform_wheel_task()).unwrap_err();

    assert!(
        format!("{err:#}").contains("failed to create directory"),
        "unexpected error: {err:#}"
    );
    assert_eq!(bundle.config, before);
}

#[rstest]
fn test_mixed_jobs_only_rewrite_wheel_tasks(bundle_dir: TestBundle) {
    bundle_dir.write_config(
        r#"
[bundle]
target = "staging"

[experimental]
python-wheel-wrapper = true

[[resources.jobs.ingest.tasks]]
task-key = "load"
spark-jar-task = { main-class-name = "com.example.Load" }
libraries = [{ jar = "dist/load.jar" }]

[[resources.jobs.ingest.tasks]]
task-key = "score"
python-wheel-task = { package-name = "scoring", entry-point = "run", parameters = ["--fast"] }
libraries = [{ pypi = { package = "numpy" } }, { whl = "dist/scoring.whl" }]

[[resources.jobs.report.tasks]]
task-key = "render"
notebook-task = { notebook-path = "src/report" }
"#,
    );
    let mut bundle = bundle_dir.load();
    let before = bundle.config.clone();

    mutator::apply(&mut bundle, &transform_wheel_task()).unwrap();

    let jobs = &bundle.config.resources.jobs;
    assert_eq!(jobs["ingest"].tasks[0], before.resources.jobs["ingest"].tasks[0]);
    assert_eq!(jobs["report"], before.resources.jobs["report"]);

    let score = &jobs["ingest"].tasks[1];
    assert_eq!(score.task_key, "score");
    assert_eq!(
        score.notebook_task().unwrap().notebook_path,
        ".bundle/staging/.internal/notebook_ingest_score"
    );
    assert_eq!(score.libraries, vec![before.resources.jobs["ingest"].tasks[1].libraries[0].clone()]);
}

//! End-to-end pipeline runs over the in-memory `users` feature.

use fluxcheck::env::{RealEnv, ValidationEnv};
use fluxcheck::pipeline::{PipelineRunner, StageStatus, ValidationScope};
use fluxcheck::testkit::{fixtures, TestEnv};
use fluxcheck::{Error, FluxcheckConfig, ManifestStore};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

const GET_MANIFEST: &str = ".fluxcheck/manifests/users/get.manifest.json";
const LIST_MANIFEST: &str = ".fluxcheck/manifests/users/list.manifest.json";
const REPORT: &str = ".fluxcheck/manifests/users/users.report.json";

fn stages(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn scope(target: &str) -> ValidationScope {
    target.parse().unwrap()
}

fn json_without_timestamp(text: &str) -> Value {
    let mut value: Value = serde_json::from_str(text).unwrap();
    if let Some(object) = value.as_object_mut() {
        object.remove("generated_at");
    }
    value
}

#[test]
fn test_repeated_runs_produce_identical_manifests() {
    let env = TestEnv::new().with_files(fixtures::users_feature_files());
    let runner = PipelineRunner::new(&env);

    runner.run(&scope("users"), &env.config().stages).unwrap();
    let first_manifest = json_without_timestamp(&env.read(GET_MANIFEST).unwrap());
    let first_report = json_without_timestamp(&env.read(REPORT).unwrap());

    runner.run(&scope("users"), &env.config().stages).unwrap();
    assert_eq!(json_without_timestamp(&env.read(GET_MANIFEST).unwrap()), first_manifest);
    assert_eq!(json_without_timestamp(&env.read(REPORT).unwrap()), first_report);
}

#[test]
fn test_missing_logic_file_fails_endpoint_without_scoring() {
    let env = TestEnv::new().with_files(fixtures::users_feature_files());
    env.fs.remove(&env.path("src/features/users/list/list.logic.ts"));

    let report = PipelineRunner::new(&env)
        .run(&scope("users"), &stages(&["compliance"]))
        .unwrap();
    assert!(!report.success());

    let manifest: Value = serde_json::from_str(&env.read(LIST_MANIFEST).unwrap()).unwrap();
    assert_eq!(manifest["status"], "FAIL");
    assert_eq!(manifest["overall_reliability"], 0);
    assert_eq!(manifest["deployment_ready"], false);
    assert_eq!(
        manifest["blocking_issues"][0],
        "missing logic file: src/features/users/list/list.logic.ts"
    );
    assert_eq!(manifest["reliability_validation"], Value::Object(Default::default()));

    let healthy: Value = serde_json::from_str(&env.read(GET_MANIFEST).unwrap()).unwrap();
    assert_eq!(healthy["deployment_ready"], true);
}

#[test]
fn test_thresholds_switch_to_configurable_scoring() {
    let spec = fixtures::SPEC_JSON.replace(
        r#""validation_targets": {}"#,
        r#""validation_targets": { "reliability_thresholds": { "overall_reliability_minimum": 0 } }"#,
    );
    let env = TestEnv::new()
        .with_files(fixtures::users_feature_files())
        .with_file("src/features/users/users.spec.json", spec);

    let report = PipelineRunner::new(&env)
        .run(&scope("users/get"), &stages(&["compliance"]))
        .unwrap();
    assert!(report.success());
    assert_eq!(report.endpoints[0].scoring_mode, "configurable");

    let manifest: Value = serde_json::from_str(&env.read(GET_MANIFEST).unwrap()).unwrap();
    assert_eq!(manifest["scoring_mode"], "configurable");
}

#[test]
fn test_feature_report_only_for_whole_feature_scopes() {
    let env = TestEnv::new().with_files(fixtures::users_feature_files());
    let runner = PipelineRunner::new(&env);

    runner.run(&scope("users/get"), &stages(&["compliance"])).unwrap();
    assert!(env.read(GET_MANIFEST).is_some());
    assert!(env.read(LIST_MANIFEST).is_none());
    assert!(env.read(REPORT).is_none());

    runner.run(&scope("all"), &stages(&["compliance"])).unwrap();
    let report: Value = serde_json::from_str(&env.read(REPORT).unwrap()).unwrap();
    assert_eq!(report["status"], "PASS");
    assert_eq!(report["compliance_summary"]["total_endpoints"], 2);
    assert_eq!(report["compliance_summary"]["compliant_endpoints"], 2);
}

#[test]
fn test_contract_drift_fails_contract_stage() {
    let drifted = fixtures::CONTRACT.replace("'GET /users/:id': 'getUser'", "'GET /users/:id': 'fetchUser'");
    let env = TestEnv::new()
        .with_files(fixtures::users_feature_files())
        .with_file("src/features/users/get/get.contract.ts", drifted);

    let report = PipelineRunner::new(&env)
        .run(&scope("users"), &env.config().stages)
        .unwrap();

    let failed = report.failed_stage().unwrap();
    assert_eq!(failed.name, "contract");
    assert_eq!(failed.status, StageStatus::Failed);
    assert_eq!(report.not_run, vec!["test", "compliance"]);
    assert!(env.read(REPORT).is_none());
}

#[test]
fn test_unknown_stage_is_rejected_before_running() {
    let env = TestEnv::new().with_files(fixtures::users_feature_files());
    let result = PipelineRunner::new(&env).run(&scope("users"), &stages(&["lint", "deploy"]));

    assert!(matches!(result, Err(Error::Configuration(_))));
    assert!(env.reporter.started_stages().is_empty());
}

#[test]
fn test_real_file_system_run() {
    let dir = TempDir::new().unwrap();
    for (path, content) in fixtures::users_feature_files() {
        let full = dir.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    let env = RealEnv::new(dir.path(), FluxcheckConfig::default());
    let report = PipelineRunner::new(&env)
        .run(&scope("users"), &stages(&["lint", "contract", "test", "compliance"]))
        .unwrap();
    assert!(report.success(), "{:?}", report.failed_stage());
    assert_eq!(report.written.len(), 3);
    assert!(dir.path().join(GET_MANIFEST).is_file());

    let store = ManifestStore::new(env.file_system(), env.layout());
    let manifest = store.read_endpoint("users", "get").unwrap();
    assert!(manifest.deployment_ready);
    assert_eq!(manifest.route.as_deref(), Some("GET /users/:id"));
}

//! # Integration Tests for mlent-load
//!
//! Loads every fixture under `tests/fixtures/` through its public loader and
//! checks subtype selection, relative path resolution, origin handling and
//! the error surface seen by callers.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use mlent_core::{EntityFamily, Override, ParseErrorKind, Source};
use mlent_entities::{
    Component, Compute, Datastore, EnvironmentRef, Job, ModelRef, OnlineDeployment,
    OnlineEndpoint, ScheduledJob,
};
use mlent_load::{
    load_batch_deployment, load_batch_endpoint, load_code, load_component, load_compute,
    load_data, load_datastore, load_environment, load_job, load_model, load_online_deployment,
    load_online_endpoint, load_registry, load_schedule, load_workspace,
    load_workspace_connection, ComponentLoadArgs, LoadArgs, LoadError,
};

/// Helper: absolute path of a fixture file.
fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Helper: `reference` resolved the way the loader resolves it for `name`.
fn resolved_next_to(name: &str, reference: &str) -> String {
    fixture(name)
        .parent()
        .unwrap()
        .join(reference)
        .to_string_lossy()
        .into_owned()
}

// -- Jobs ---------------------------------------------------------------------

#[test]
fn test_command_job_fixture() {
    let job = load_job(LoadArgs::from_source(fixture("jobs/command_job.yml"))).unwrap();
    let Job::Command(command) = job else {
        panic!("expected command job, got {}", job.job_type());
    };
    assert_eq!(command.metadata.experiment_name.as_deref(), Some("iris"));
    assert_eq!(command.metadata.compute.as_deref(), Some("azureml:cpu-cluster"));
    assert_eq!(
        command.code.as_deref(),
        Some(resolved_next_to("jobs/command_job.yml", "./src").as_str())
    );
    assert_eq!(
        command.environment,
        EnvironmentRef::Reference("azureml:sklearn-1.5:3".to_string())
    );
    assert!(command.command.starts_with("python train.py"));
}

#[test]
fn test_sweep_job_fixture() {
    let job = load_job(LoadArgs::from_source(fixture("jobs/sweep_job.yml"))).unwrap();
    let Job::Sweep(sweep) = job else {
        panic!("expected sweep job, got {}", job.job_type());
    };
    assert_eq!(sweep.sampling_algorithm, "random");
    assert_eq!(sweep.objective.primary_metric, "accuracy");
    assert_eq!(sweep.search_space.len(), 2);
    assert_eq!(sweep.search_space["lr"].max_value, Some(0.1));
    assert_eq!(
        sweep.trial.code.as_deref(),
        Some(resolved_next_to("jobs/sweep_job.yml", "../src").as_str())
    );
    assert_eq!(sweep.limits.and_then(|l| l.max_total_trials), Some(20));
}

#[test]
fn test_pipeline_job_fixture() {
    let job = load_job(LoadArgs::from_source(fixture("jobs/pipeline_job.yml"))).unwrap();
    let Job::Pipeline(pipeline) = job else {
        panic!("expected pipeline job, got {}", job.job_type());
    };
    assert_eq!(
        pipeline.jobs["prep"].component.as_deref(),
        Some(resolved_next_to("jobs/pipeline_job.yml", "./components/prep.yml").as_str())
    );
    assert_eq!(pipeline.jobs["train"].component.as_deref(), Some("azureml:train:2"));
    assert_eq!(
        pipeline.settings.and_then(|s| s.default_compute).as_deref(),
        Some("azureml:cpu-cluster")
    );
}

#[test]
fn test_job_override_changes_compute() {
    let job = load_job(
        LoadArgs::from_source(fixture("jobs/command_job.yml"))
            .with_override(Override::new("compute", "azureml:gpu-cluster")),
    )
    .unwrap();
    assert_eq!(job.metadata().compute.as_deref(), Some("azureml:gpu-cluster"));
}

// -- Workspace-level entities -------------------------------------------------

#[test]
fn test_workspace_fixture() {
    let workspace = load_workspace(LoadArgs::from_source(fixture("workspace.yml"))).unwrap();
    assert_eq!(workspace.name, "mlw-basic");
    assert_eq!(workspace.location.as_deref(), Some("eastus"));
    assert_eq!(workspace.hbi_workspace, Some(false));
}

#[test]
fn test_registry_fixture() {
    let registry = load_registry(LoadArgs::from_source(fixture("registry.yml"))).unwrap();
    assert_eq!(registry.name, "shared-registry");
    let locations: Vec<&str> = registry
        .replication_locations
        .iter()
        .map(|l| l.location.as_str())
        .collect();
    assert_eq!(locations, ["eastus", "westus"]);
}

#[test]
fn test_workspace_connection_fixture() {
    let connection =
        load_workspace_connection(LoadArgs::from_source(fixture("workspace_connection.yml")))
            .unwrap();
    assert_eq!(connection.connection_type, "git");
    assert_eq!(connection.target, "https://github.com/contoso/ml-repo");
    assert_eq!(
        connection.credentials.map(|c| c.credential_type).as_deref(),
        Some("pat")
    );
}

#[test]
fn test_datastore_fixture() {
    let datastore = load_datastore(LoadArgs::from_source(fixture("datastore.yml"))).unwrap();
    assert_eq!(datastore.name(), "blob_example");
    let Datastore::AzureBlob(blob) = datastore else {
        panic!("expected azure_blob datastore");
    };
    assert_eq!(blob.container_name, "data-container");
}

#[test]
fn test_compute_fixture() {
    let compute = load_compute(LoadArgs::from_source(fixture("compute.yml"))).unwrap();
    let Compute::AmlCompute(cluster) = compute else {
        panic!("expected amlcompute");
    };
    assert_eq!(cluster.name, "cpu-cluster");
    assert_eq!(cluster.max_instances, Some(4));
    assert_eq!(cluster.idle_time_before_scale_down, Some(120));
}

// -- Assets -------------------------------------------------------------------

#[test]
fn test_code_fixture() {
    let code = load_code(LoadArgs::from_source(fixture("code.yml"))).unwrap();
    assert_eq!(code.version.as_deref(), Some("1"));
    assert_eq!(code.path, resolved_next_to("code.yml", "./score"));
}

#[test]
fn test_model_fixture() {
    let model = load_model(LoadArgs::from_source(fixture("model.yml"))).unwrap();
    assert_eq!(model.name, "local-file-example");
    assert_eq!(model.version.as_deref(), Some("3"));
    assert_eq!(model.model_type.as_deref(), Some("custom_model"));
    assert_eq!(model.path, resolved_next_to("model.yml", "mlflow-model/model.pkl"));
}

#[test]
fn test_data_fixture_keeps_remote_path() {
    let data = load_data(LoadArgs::from_source(fixture("data.yml"))).unwrap();
    assert_eq!(data.data_type.as_deref(), Some("uri_folder"));
    assert_eq!(
        data.path,
        "https://azuremlexamples.blob.core.windows.net/datasets/cifar10/"
    );
}

#[test]
fn test_environment_fixture() {
    let environment = load_environment(LoadArgs::from_source(fixture("environment.yml"))).unwrap();
    let build = environment.build.expect("build context");
    assert_eq!(
        build.path,
        resolved_next_to("environment.yml", "docker-contexts/python-and-pip")
    );
    assert!(environment.image.is_none());
}

#[test]
fn test_component_fixture() {
    let component = load_component(ComponentLoadArgs::from_source(fixture("component.yml"))).unwrap();
    assert_eq!(component.name(), "train_model");
    assert_eq!(component.version(), Some("2"));
    let Component::Command(command) = component else {
        panic!("expected command component");
    };
    assert_eq!(
        command.code.as_deref(),
        Some(resolved_next_to("component.yml", "./train_src").as_str())
    );
}

// -- Endpoints and deployments ------------------------------------------------

#[test]
fn test_online_deployment_fixture() {
    let deployment =
        load_online_deployment(LoadArgs::from_source(fixture("online_deployment.yml"))).unwrap();
    let OnlineDeployment::Managed(managed) = &deployment else {
        panic!("expected managed online deployment");
    };
    let settings = &managed.settings;
    assert_eq!(settings.endpoint_name, "my-endpoint");
    assert_eq!(settings.instance_count, Some(1));
    let Some(ModelRef::Inline(model)) = &settings.model else {
        panic!("expected inline model");
    };
    assert_eq!(
        model.path,
        resolved_next_to("online_deployment.yml", "../../model-1/model/")
    );
    assert_eq!(
        settings
            .code_configuration
            .as_ref()
            .and_then(|c| c.code.as_deref()),
        Some(resolved_next_to("online_deployment.yml", "../../model-1/onlinescoring/").as_str())
    );
}

#[test]
fn test_type_override_selects_other_deployment_subtype() {
    let deployment = load_online_deployment(
        LoadArgs::from_source(fixture("online_deployment.yml"))
            .with_override(Override::new("type", "kubernetes")),
    )
    .unwrap();
    assert!(matches!(deployment, OnlineDeployment::Kubernetes(_)));
    assert_eq!(deployment.settings().name, "blue");
}

#[test]
fn test_batch_deployment_fixture() {
    let deployment =
        load_batch_deployment(LoadArgs::from_source(fixture("batch_deployment.yml"))).unwrap();
    assert_eq!(deployment.compute, "azureml:batch-cluster");
    assert_eq!(deployment.mini_batch_size, Some(10));
    assert_eq!(
        deployment.model,
        Some(ModelRef::Reference("azureml:mnist-classifier-torch:1".to_string()))
    );
}

#[test]
fn test_online_endpoint_with_compute_is_kubernetes() {
    let endpoint =
        load_online_endpoint(LoadArgs::from_source(fixture("online_endpoint.yml"))).unwrap();
    assert_eq!(endpoint.name(), "k8s-endpoint");
    let OnlineEndpoint::Kubernetes(k8s) = endpoint else {
        panic!("expected kubernetes online endpoint");
    };
    assert_eq!(k8s.compute, "azureml:k8s-compute");
}

#[test]
fn test_batch_endpoint_fixture() {
    let endpoint = load_batch_endpoint(LoadArgs::from_source(fixture("batch_endpoint.yml"))).unwrap();
    assert_eq!(endpoint.name, "mnist-batch");
    assert_eq!(endpoint.auth_mode.as_deref(), Some("aad_token"));
}

#[test]
fn test_schedule_fixture_resolves_job_file() {
    let schedule = load_schedule(LoadArgs::from_source(fixture("schedule.yml"))).unwrap();
    assert_eq!(schedule.name, "simple_cron_job_schedule");
    assert_eq!(
        schedule.create_job,
        ScheduledJob::File(resolved_next_to("schedule.yml", "./jobs/command_job.yml"))
    );
}

// -- Source and origin handling -----------------------------------------------

#[test]
#[allow(deprecated)]
fn test_legacy_path_matches_source() {
    let via_source = load_code(LoadArgs::from_source(fixture("code.yml"))).unwrap();
    let via_path = load_code(LoadArgs::new().path(fixture("code.yml"))).unwrap();
    assert_eq!(via_source, via_path);
}

#[test]
#[allow(deprecated)]
fn test_legacy_path_matches_source_for_jobs() {
    let via_source = load_job(LoadArgs::from_source(fixture("jobs/sweep_job.yml"))).unwrap();
    let via_path = load_job(LoadArgs::new().path(fixture("jobs/sweep_job.yml"))).unwrap();
    assert_eq!(via_path.job_type(), "sweep");
    assert_eq!(via_source, via_path);
}

#[test]
#[allow(deprecated)]
fn test_legacy_path_matches_source_for_components() {
    let via_source =
        load_component(ComponentLoadArgs::from_source(fixture("component.yml"))).unwrap();
    let via_path = load_component(ComponentLoadArgs::new().path(fixture("component.yml"))).unwrap();
    assert_eq!(via_source, via_path);
}

#[test]
fn test_positional_arg_is_a_source() {
    let via_arg = load_model(LoadArgs::new().arg(fixture("model.yml"))).unwrap();
    let via_source = load_model(LoadArgs::from_source(fixture("model.yml"))).unwrap();
    assert_eq!(via_arg, via_source);
}

#[test]
fn test_named_stream_origin() {
    let yaml = std::fs::read_to_string(fixture("code.yml")).unwrap();
    let mut cursor = Cursor::new(yaml.into_bytes());
    let code = load_code(LoadArgs::from_source(Source::named_stream(
        &mut cursor,
        "/srv/assets/code.yml",
    )))
    .unwrap();
    assert_eq!(
        code.path,
        Path::new("/srv/assets").join("./score").to_string_lossy()
    );
}

#[test]
fn test_anonymous_stream_keeps_relative_path() {
    let mut cursor = Cursor::new(b"path: ./score\n".to_vec());
    let code = load_code(LoadArgs::from_source(Source::stream(&mut cursor))).unwrap();
    assert_eq!(code.path, "./score");
}

#[test]
fn test_relative_origin_overrides_source_location() {
    let code = load_code(
        LoadArgs::from_source(fixture("code.yml")).relative_origin("/mnt/shared/code.yml"),
    )
    .unwrap();
    assert_eq!(
        code.path,
        Path::new("/mnt/shared").join("./score").to_string_lossy()
    );
}

// -- Error surface ------------------------------------------------------------

#[test]
fn test_missing_file_is_io_error() {
    let err = load_model(LoadArgs::from_source(fixture("does_not_exist.yml"))).unwrap_err();
    let LoadError::Io(io) = &err else {
        panic!("expected I/O error, got {err:?}");
    };
    assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    assert!(err.category().is_none());
}

#[test]
fn test_empty_fixture_is_parse_error() {
    let err = load_data(LoadArgs::from_source(fixture("empty.yml"))).unwrap_err();
    let LoadError::Parse(parse) = err else {
        panic!("expected ParseError, got {err:?}");
    };
    assert_eq!(parse.kind, ParseErrorKind::EmptyDocument);
    assert_eq!(parse.target, EntityFamily::Data);
}

#[test]
fn test_sequence_fixture_is_parse_error() {
    let err = load_environment(LoadArgs::from_source(fixture("sequence.yml"))).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Parse(ref parse) if matches!(parse.kind, ParseErrorKind::WrongShape { .. })
    ));
}

#[test]
fn test_unstructured_family_returns_raw_schema_error() {
    let err = load_workspace(
        LoadArgs::from_source(fixture("workspace.yml")).with_override(Override::new("bogus", 1)),
    )
    .unwrap_err();
    assert!(err.category().is_some());
    let LoadError::Schema(raw) = err else {
        panic!("expected raw SchemaError, got {err:?}");
    };
    assert_eq!(raw.schema_name(), "workspace.schema.json");
}

#[test]
fn test_structured_error_points_at_fixture_directory() {
    let err = load_batch_deployment(
        LoadArgs::from_source(fixture("batch_deployment.yml"))
            .with_override(Override::new("mini_batch_size", "ten")),
    )
    .unwrap_err();
    let LoadError::SchemaValidation(structured) = err else {
        panic!("expected SchemaValidation, got {err:?}");
    };
    assert_eq!(structured.target, EntityFamily::BatchDeployment);
    assert_eq!(structured.schema.base_path, fixture("batch_deployment.yml").parent().unwrap());
    assert!(structured.result.messages().contains_key("mini_batch_size"));
}

//! # Job Schedules
//!
//! A schedule pairs a trigger (cron expression or recurrence pattern) with
//! the job it creates. `create_job` is either a reference to an existing
//! job, a path to a job YAML file, or an inline job document. Inline jobs
//! go through the [`Job`] registry, and their violations are reported
//! under `create_job.*`.

use mlent_core::{Document, EntityFamily};
use mlent_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{StringMap, Tags};
use crate::job::Job;
use crate::paths::is_remote_reference;
use crate::registry::{build_from_schema, resolve_subtype, LoadContext, Resource, SubtypeSpec};

const SCHEDULE_SCHEMA: &str = "schedule.schema.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronTrigger {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_days: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_days: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceTrigger {
    pub frequency: String,
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<RecurrencePattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    Cron(CronTrigger),
    Recurrence(RecurrenceTrigger),
}

/// What a schedule runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScheduledJob {
    /// A job already known to the service (`azureml:...`).
    Existing(String),
    /// A job YAML file, resolved against the schedule's origin.
    File(String),
    Inline(Box<Job>),
}

/// Matches `schemas/schedule.schema.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSchedule {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    pub trigger: Trigger,
    pub create_job: ScheduledJob,
}

/// Wire shape of a schedule before `create_job` is built.
#[derive(Deserialize)]
struct ScheduleDocument {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Option<Tags>,
    #[serde(default)]
    properties: Option<StringMap>,
    #[serde(default)]
    is_enabled: Option<bool>,
    trigger: Trigger,
    create_job: Value,
}

fn scheduled_job(value: Value, ctx: &LoadContext<'_>) -> Result<ScheduledJob, SchemaError> {
    match value {
        Value::String(reference) if is_remote_reference(&reference) => {
            Ok(ScheduledJob::Existing(reference))
        }
        Value::String(path) => Ok(ScheduledJob::File(ctx.resolve(&path))),
        inline => {
            let document = Document::from_json(inline, EntityFamily::Job).map_err(|e| {
                SchemaError::single(SCHEDULE_SCHEMA, "create_job", e.to_string(), e.error_type())
            })?;
            let resolved = resolve_subtype::<Job>(&document).map_err(|e| e.nest("create_job"))?;
            let job = (resolved.spec.build)(document.into_value(), ctx)
                .map_err(|e| e.nest("create_job"))?;
            Ok(ScheduledJob::Inline(Box::new(job)))
        }
    }
}

fn build_schedule(value: Value, ctx: &LoadContext<'_>) -> Result<JobSchedule, SchemaError> {
    let doc: ScheduleDocument = build_from_schema(value, SCHEDULE_SCHEMA, ctx)?;
    let create_job = scheduled_job(doc.create_job, ctx)?;
    Ok(JobSchedule {
        name: doc.name,
        display_name: doc.display_name,
        description: doc.description,
        tags: doc.tags,
        properties: doc.properties,
        is_enabled: doc.is_enabled,
        trigger: doc.trigger,
        create_job,
    })
}

static SCHEDULE_SUBTYPES: [SubtypeSpec<JobSchedule>; 1] = [SubtypeSpec {
    discriminator: "schedule",
    schema: SCHEDULE_SCHEMA,
    build: build_schedule,
}];

impl Resource for JobSchedule {
    const FAMILY: EntityFamily = EntityFamily::Schedule;
    const STRUCTURED_VALIDATION: bool = true;
    const DEFAULT_SUBTYPE: Option<&'static str> = Some("schedule");

    fn subtypes() -> &'static [SubtypeSpec<Self>] {
        &SCHEDULE_SUBTYPES
    }

    fn discriminator(_: &Document) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::embedded_validator;
    use mlent_core::{Origin, ValidationErrorType};
    use serde_json::json;
    use std::path::Path;

    fn ctx(origin: &str) -> LoadContext<'static> {
        LoadContext::new(Origin::new(origin), embedded_validator().unwrap())
    }

    #[test]
    fn test_cron_schedule_with_file_job() {
        let schedule = build_schedule(
            json!({
                "name": "nightly",
                "trigger": {"type": "cron", "expression": "0 2 * * *", "time_zone": "UTC"},
                "create_job": "./train.yml"
            }),
            &ctx("schedules/nightly.yml"),
        )
        .unwrap();
        assert!(matches!(schedule.trigger, Trigger::Cron(ref c) if c.expression == "0 2 * * *"));
        assert_eq!(
            schedule.create_job,
            ScheduledJob::File(
                Path::new("schedules").join("./train.yml").to_string_lossy().into_owned()
            )
        );
    }

    #[test]
    fn test_existing_job_reference() {
        let schedule = build_schedule(
            json!({
                "name": "weekly",
                "trigger": {"type": "recurrence", "frequency": "week", "interval": 1,
                            "schedule": {"week_days": ["monday"], "hours": [6], "minutes": [0]}},
                "create_job": "azureml:train-job"
            }),
            &ctx("./"),
        )
        .unwrap();
        assert_eq!(schedule.create_job, ScheduledJob::Existing("azureml:train-job".to_string()));
        let Trigger::Recurrence(recurrence) = schedule.trigger else {
            panic!("expected recurrence trigger");
        };
        assert_eq!(recurrence.schedule.unwrap().hours, Some(vec![6]));
    }

    #[test]
    fn test_inline_job_built_through_registry() {
        let schedule = build_schedule(
            json!({
                "name": "hourly",
                "trigger": {"type": "cron", "expression": "0 * * * *"},
                "create_job": {"command": "python run.py", "code": "src", "environment": "azureml:e:1"}
            }),
            &ctx("schedules/hourly.yml"),
        )
        .unwrap();
        let ScheduledJob::Inline(job) = schedule.create_job else {
            panic!("expected inline job");
        };
        let Job::Command(command) = *job else {
            panic!("expected command job");
        };
        assert_eq!(
            command.code.unwrap(),
            Path::new("schedules").join("src").to_string_lossy()
        );
    }

    #[test]
    fn test_inline_job_violations_are_nested() {
        let err = build_schedule(
            json!({
                "name": "broken",
                "trigger": {"type": "cron", "expression": "0 * * * *"},
                "create_job": {"type": "command", "environment": "azureml:e:1"}
            }),
            &ctx("./"),
        )
        .unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(violations.violations()[0].field(), "create_job.command");
        assert_eq!(violations.violations()[0].kind, ValidationErrorType::MissingValue);
    }

    #[test]
    fn test_empty_inline_job() {
        let err = build_schedule(
            json!({
                "name": "empty",
                "trigger": {"type": "cron", "expression": "* * * * *"},
                "create_job": {}
            }),
            &ctx("./"),
        )
        .unwrap_err();
        let SchemaError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(violations.violations()[0].field(), "create_job");
        assert_eq!(violations.violations()[0].kind, ValidationErrorType::CannotParse);
    }

    #[test]
    fn test_recurrence_needs_interval() {
        let err = build_schedule(
            json!({
                "name": "bad",
                "trigger": {"type": "recurrence", "frequency": "day"},
                "create_job": "azureml:j"
            }),
            &ctx("./"),
        )
        .unwrap_err();
        assert_eq!(err.schema_name(), SCHEDULE_SCHEMA);
    }
}

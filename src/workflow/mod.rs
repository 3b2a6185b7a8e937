//! Workflow definitions.
//!
//! Parses the declarative job -> steps document of a CI workflow into typed
//! structures and resolves which job a log belongs to.

mod error;
mod step;

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use yaml_rust2::{Yaml, YamlLoader};

pub use error::WorkflowError;
pub use step::StepSpec;

/// A job declared in a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Key under `jobs:`
    pub key: String,
    /// Display name (`name:`), if declared
    pub name: Option<String>,
    /// Jobs this one depends on (`needs:`)
    pub needs: Vec<String>,
    pub steps: Vec<StepSpec>,
}

/// A parsed workflow document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: Option<String>,
    /// Jobs in declaration order
    pub jobs: Vec<JobDefinition>,
}

impl WorkflowDefinition {
    /// Read and parse a workflow file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| WorkflowError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse a workflow document.
    pub fn parse(content: &str) -> Result<Self, WorkflowError> {
        let docs = YamlLoader::load_from_str(content)?;
        let doc = match docs.into_iter().next() {
            Some(doc) if !doc.is_null() && !doc.is_badvalue() => doc,
            _ => return Err(WorkflowError::Empty),
        };
        if doc.as_hash().is_none() {
            return Err(WorkflowError::invalid("<root>", "a mapping"));
        }

        let name = optional_string(&doc["name"], "name")?;
        let jobs = match &doc["jobs"] {
            Yaml::Hash(jobs) => jobs
                .iter()
                .map(|(key, job)| parse_job(key, job))
                .collect::<Result<Vec<_>, _>>()?,
            Yaml::Null | Yaml::BadValue => Vec::new(),
            _ => return Err(WorkflowError::invalid("jobs", "a mapping")),
        };

        Ok(Self { name, jobs })
    }

    /// Find the job a log belongs to.
    ///
    /// Tries, in order: exact job key, exact display name, then a
    /// case-insensitive containment of `job_name` in the display name.
    pub fn find_job(&self, job_name: &str) -> Option<&JobDefinition> {
        if let Some(job) = self.jobs.iter().find(|j| j.key == job_name) {
            return Some(job);
        }
        if let Some(job) = self
            .jobs
            .iter()
            .find(|j| j.name.as_deref() == Some(job_name))
        {
            return Some(job);
        }
        let needle = job_name.to_lowercase();
        self.jobs.iter().find(|j| {
            j.name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
    }

    /// Steps of the matching job, or an empty list if no job matches.
    pub fn steps_for_job(&self, job_name: &str) -> &[StepSpec] {
        match self.find_job(job_name) {
            Some(job) => &job.steps,
            None => {
                tracing::warn!(
                    job = job_name,
                    available = ?self.job_keys(),
                    "no workflow job matches log; segmenting without steps"
                );
                &[]
            }
        }
    }

    /// Dependencies (`needs`) of the matching job.
    pub fn dependencies_for_job(&self, job_name: &str) -> &[String] {
        self.find_job(job_name)
            .map(|job| job.needs.as_slice())
            .unwrap_or_default()
    }

    pub fn job_keys(&self) -> Vec<&str> {
        self.jobs.iter().map(|j| j.key.as_str()).collect()
    }
}

fn parse_job(key: &Yaml, job: &Yaml) -> Result<JobDefinition, WorkflowError> {
    let key = scalar_to_string(key).ok_or_else(|| WorkflowError::invalid("jobs", "string job keys"))?;
    if job.as_hash().is_none() {
        return Err(WorkflowError::invalid(format!("jobs.{}", key), "a mapping"));
    }

    let name = optional_string(&job["name"], &format!("jobs.{}.name", key))?;
    let needs = match &job["needs"] {
        Yaml::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        Yaml::Null | Yaml::BadValue => Vec::new(),
        other => match scalar_to_string(other) {
            Some(single) => vec![single],
            None => return Err(WorkflowError::invalid(format!("jobs.{}.needs", key), "a string or list")),
        },
    };
    let steps = match &job["steps"] {
        Yaml::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, step)| parse_step(step, &format!("jobs.{}.steps[{}]", key, index)))
            .collect::<Result<Vec<_>, _>>()?,
        Yaml::Null | Yaml::BadValue => Vec::new(),
        _ => return Err(WorkflowError::invalid(format!("jobs.{}.steps", key), "a list")),
    };

    Ok(JobDefinition {
        key,
        name,
        needs,
        steps,
    })
}

fn parse_step(step: &Yaml, location: &str) -> Result<StepSpec, WorkflowError> {
    if step.as_hash().is_none() {
        return Err(WorkflowError::invalid(location, "a mapping"));
    }
    Ok(StepSpec {
        name: optional_string(&step["name"], &format!("{}.name", location))?,
        run: optional_string(&step["run"], &format!("{}.run", location))?,
        uses: optional_string(&step["uses"], &format!("{}.uses", location))?,
        with: optional_mapping(&step["with"], &format!("{}.with", location))?,
        env: optional_mapping(&step["env"], &format!("{}.env", location))?,
    })
}

fn optional_string(value: &Yaml, location: &str) -> Result<Option<String>, WorkflowError> {
    match value {
        Yaml::Null | Yaml::BadValue => Ok(None),
        other => scalar_to_string(other)
            .map(Some)
            .ok_or_else(|| WorkflowError::invalid(location, "a string")),
    }
}

fn optional_mapping(
    value: &Yaml,
    location: &str,
) -> Result<Option<IndexMap<String, String>>, WorkflowError> {
    match value {
        Yaml::Null | Yaml::BadValue => Ok(None),
        Yaml::Hash(entries) => Ok(Some(
            entries
                .iter()
                .map(|(k, v)| (render_value(k), render_value(v)))
                .collect(),
        )),
        // Whole-mapping expressions such as `env: ${{ fromJSON(...) }}` are
        // only known at run time
        Yaml::String(expr) => {
            tracing::debug!(location, expr = %expr, "skipping expression-valued mapping");
            Ok(None)
        }
        _ => Err(WorkflowError::invalid(location, "a mapping")),
    }
}

fn scalar_to_string(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flow-style text for any YAML value.
fn render_value(value: &Yaml) -> String {
    if let Some(scalar) = scalar_to_string(value) {
        return scalar;
    }
    match value {
        Yaml::Array(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        Yaml::Hash(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", render_value(k), render_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        _ => "null".to_string(),
    }
}

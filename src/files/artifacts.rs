//! Per-job artifact persistence.
//!
//! Layout under the output root:
//!
//! ```text
//! <root>/<job>/segmentation.json
//! <root>/<job>/00_Set-up-job.log
//! <root>/<job>/01_<step>.log
//! ```
//!
//! Step text lives in the `.log` files; the JSON records carry the file name
//! in `log_file_path` and an empty `log_content`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::ArtifactError;
use super::filename::{sanitize_component, step_log_filename, MAX_COMPONENT_LENGTH};
use crate::segment::Segmentation;

/// Name of the structured record file in each job directory.
pub const RECORDS_FILENAME: &str = "segmentation.json";

/// Files produced for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenJob {
    pub directory: PathBuf,
    pub records_path: PathBuf,
    pub step_logs: Vec<PathBuf>,
}

/// Writes segmentation results to disk.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
    pretty: bool,
    inline_logs: bool,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pretty: true,
            inline_logs: false,
        }
    }

    /// Pretty-print the JSON record files.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Keep step text inside the JSON instead of separate files.
    pub fn inline_logs(mut self, inline_logs: bool) -> Self {
        self.inline_logs = inline_logs;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that holds a job's artifacts.
    pub fn job_dir(&self, job_name: &str) -> PathBuf {
        self.root
            .join(sanitize_component(job_name, MAX_COMPONENT_LENGTH))
    }

    /// Write one job's records and step logs under [`Self::job_dir`].
    pub fn write(&self, segmentation: &Segmentation) -> Result<WrittenJob, ArtifactError> {
        self.write_to(segmentation, self.job_dir(&segmentation.job_name))
    }

    /// Write one job's records and step logs under `<root>/<dir_name>`.
    ///
    /// `dir_name` is used as given; see [`unique_job_dirs`].
    pub fn write_in(
        &self,
        segmentation: &Segmentation,
        dir_name: &str,
    ) -> Result<WrittenJob, ArtifactError> {
        self.write_to(segmentation, self.root.join(dir_name))
    }

    fn write_to(
        &self,
        segmentation: &Segmentation,
        directory: PathBuf,
    ) -> Result<WrittenJob, ArtifactError> {
        fs::create_dir_all(&directory).map_err(|source| ArtifactError::Write {
            path: directory.clone(),
            source,
        })?;

        let mut persisted = segmentation.clone();
        let mut step_logs = Vec::new();

        if !self.inline_logs {
            for (position, record) in persisted.records.iter_mut().enumerate() {
                if record.log_content.is_empty() {
                    continue;
                }
                let filename = step_log_filename(position, &record.name)?;
                let path = directory.join(&filename);
                write_file(&path, record.log_content.as_bytes())?;

                record.log_file_path = Some(filename);
                record.log_content.clear();
                step_logs.push(path);
            }
        }

        let json = if self.pretty {
            serde_json::to_string_pretty(&persisted)?
        } else {
            serde_json::to_string(&persisted)?
        };
        let records_path = directory.join(RECORDS_FILENAME);
        write_file(&records_path, json.as_bytes())?;

        tracing::debug!(
            job = %segmentation.job_name,
            dir = %directory.display(),
            logs = step_logs.len(),
            "artifacts written"
        );

        Ok(WrittenJob {
            directory,
            records_path,
            step_logs,
        })
    }
}

/// One distinct directory name per job, in input order.
///
/// Names are sanitized first; a name already taken (compared without case,
/// for case-insensitive filesystems) gets a `-2`, `-3`, ... suffix.
pub fn unique_job_dirs<'a, I>(job_names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken = HashSet::new();
    job_names
        .into_iter()
        .map(|name| {
            let base = sanitize_component(name, MAX_COMPONENT_LENGTH);
            let mut candidate = base.clone();
            let mut suffix = 2;
            while !taken.insert(candidate.to_lowercase()) {
                candidate = format!("{}-{}", base, suffix);
                suffix += 1;
            }
            candidate
        })
        .collect()
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ArtifactError> {
    fs::write(path, contents).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })
}

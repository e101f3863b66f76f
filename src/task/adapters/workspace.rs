//! Local filesystem working environment.
//!
//! Each task gets a directory named after its identifier under a shared
//! root. All access goes through a capability handle on that root, so paths
//! reported as changes can never point outside it.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::task::{
    domain::{FileChange, Task, TaskId},
    ports::{EnvironmentError, EnvironmentResult, TaskEnvironment},
};

/// Directory names never reported as changes.
const IGNORED_DIRECTORIES: [&str; 1] = [".git"];

/// Working environment backed by per-task directories on local disk.
#[derive(Debug, Clone)]
pub struct LocalWorkspaceEnvironment {
    root: Utf8PathBuf,
}

impl LocalWorkspaceEnvironment {
    /// Creates an environment rooted at `root`.
    ///
    /// The directory is created on first use.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the directory that holds the task's files.
    #[must_use]
    pub fn task_path(&self, task_id: TaskId) -> Utf8PathBuf {
        self.root.join(task_id.to_string())
    }

    async fn run_blocking<F, T>(&self, f: F) -> EnvironmentResult<T>
    where
        F: FnOnce(&Utf8Path) -> EnvironmentResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || f(&root))
            .await
            .map_err(EnvironmentError::io)?
    }
}

#[async_trait]
impl TaskEnvironment for LocalWorkspaceEnvironment {
    async fn prepare(&self, task: &Task) -> EnvironmentResult<()> {
        let directory = task.id().to_string();
        self.run_blocking(move |root| {
            Dir::create_ambient_dir_all(root, ambient_authority())
                .map_err(|err| EnvironmentError::Preparation(format!("{root}: {err}")))?;
            let root_dir = Dir::open_ambient_dir(root, ambient_authority())
                .map_err(|err| EnvironmentError::Preparation(format!("{root}: {err}")))?;
            root_dir
                .create_dir_all(&directory)
                .map_err(|err| EnvironmentError::Preparation(format!("{directory}: {err}")))
        })
        .await
    }

    async fn collect_changes(&self, task: &Task) -> EnvironmentResult<Vec<FileChange>> {
        let directory = task.id().to_string();
        self.run_blocking(move |root| {
            let root_dir = Dir::open_ambient_dir(root, ambient_authority())
                .map_err(|_| EnvironmentError::MissingWorkspace)?;
            let task_dir = root_dir.open_dir(&directory).map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    EnvironmentError::MissingWorkspace
                } else {
                    EnvironmentError::io(err)
                }
            })?;
            let mut changes = Vec::new();
            collect_files(&task_dir, Utf8Path::new(""), &mut changes)?;
            changes.sort_by(|left, right| left.path().cmp(right.path()));
            Ok(changes)
        })
        .await
    }
}

fn collect_files(
    dir: &Dir,
    prefix: &Utf8Path,
    changes: &mut Vec<FileChange>,
) -> EnvironmentResult<()> {
    for item in dir.entries().map_err(EnvironmentError::io)? {
        let entry = item.map_err(EnvironmentError::io)?;
        let name = entry.file_name().map_err(EnvironmentError::io)?;
        let file_type = entry.file_type().map_err(EnvironmentError::io)?;
        let relative = prefix.join(&name);

        if file_type.is_dir() {
            if IGNORED_DIRECTORIES.contains(&name.as_str()) {
                continue;
            }
            let child = entry.open_dir().map_err(EnvironmentError::io)?;
            collect_files(&child, &relative, changes)?;
        } else if file_type.is_file() {
            let contents = dir.read_to_string(&name).map_err(EnvironmentError::io)?;
            let change = FileChange::new(relative.as_str(), contents)
                .map_err(|err| EnvironmentError::io(std::io::Error::other(err.to_string())))?;
            changes.push(change);
        }
    }
    Ok(())
}

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("storage `{name}` root must be absolute: `{path}`")]
    NonAbsoluteStorageRoot { name: String, path: PathBuf },
    #[error("failed to resolve storage `{name}` root `{path}`")]
    ResolveStorageRoot {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage `{name}` root is not a directory: `{path}`")]
    StorageRootNotDirectory { name: String, path: PathBuf },
    #[error("no storage is configured")]
    NoStorageConfigured,
    #[error("repository path must not be empty")]
    EmptyRepositoryPath,
    #[error("repository path is not inside any configured storage: `{0}`")]
    OutsideStorages(PathBuf),
    #[error("repository path contains disallowed component `{component}`: `{path}`")]
    InvalidRepositoryPathComponent {
        path: PathBuf,
        component: &'static str,
    },
    #[error(
        "repository path escapes storage root: `{path}` resolved to `{resolved}` outside `{storage_root}`"
    )]
    RepositoryPathEscapesStorageRoot {
        path: PathBuf,
        resolved: PathBuf,
        storage_root: PathBuf,
    },
    #[error("repository not found: `{0}`")]
    RepositoryNotFound(PathBuf),
    #[error("failed to inspect repository path `{path}`")]
    InspectRepositoryPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Storage {
    name: String,
    configured_root: PathBuf,
    root: PathBuf,
}

/// A repository located inside one of the configured storages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRepository {
    pub storage_name: String,
    pub relative_path: PathBuf,
    pub path: PathBuf,
}

/// Maps repository path tokens onto directories inside named storage roots.
/// The first storage is the default for relative tokens.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    storages: Vec<Storage>,
}

impl Locator {
    pub fn new<I, N, P>(storages: I) -> Result<Self, LocatorError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<PathBuf>,
    {
        let storages = storages
            .into_iter()
            .map(|(name, root)| open_storage(name.into(), root.into()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { storages })
    }

    pub fn default_storage_root(&self) -> Option<&Path> {
        self.storages.first().map(|storage| storage.root.as_path())
    }

    /// Resolves a path token to an existing repository directory. Absolute
    /// tokens must lie under a storage root; relative tokens are taken
    /// relative to the default storage.
    pub fn resolve(&self, token: impl AsRef<Path>) -> Result<LocatedRepository, LocatorError> {
        let token = token.as_ref();
        let default = self
            .storages
            .first()
            .ok_or(LocatorError::NoStorageConfigured)?;

        if token.as_os_str().is_empty() {
            return Err(LocatorError::EmptyRepositoryPath);
        }

        let (storage, relative) = if token.is_absolute() {
            self.storages
                .iter()
                .find_map(|storage| {
                    token
                        .strip_prefix(&storage.root)
                        .or_else(|_| token.strip_prefix(&storage.configured_root))
                        .ok()
                        .map(|relative| (storage, relative))
                })
                .ok_or_else(|| LocatorError::OutsideStorages(token.to_path_buf()))?
        } else {
            (default, token)
        };

        let relative = normalize_repository_path(relative)?;
        validate_existing_path_components(&storage.root, &relative)?;

        let path = storage.root.join(&relative);
        match path.metadata() {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(LocatorError::RepositoryNotFound(path)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(LocatorError::RepositoryNotFound(path));
            }
            Err(source) => return Err(LocatorError::InspectRepositoryPath { path, source }),
        }

        Ok(LocatedRepository {
            storage_name: storage.name.clone(),
            relative_path: relative,
            path,
        })
    }
}

fn open_storage(name: String, configured_root: PathBuf) -> Result<Storage, LocatorError> {
    if !configured_root.is_absolute() {
        return Err(LocatorError::NonAbsoluteStorageRoot {
            name,
            path: configured_root,
        });
    }

    let root = match configured_root.canonicalize() {
        Ok(root) => root,
        Err(source) => {
            return Err(LocatorError::ResolveStorageRoot {
                name,
                path: configured_root,
                source,
            })
        }
    };

    if !root.is_dir() {
        return Err(LocatorError::StorageRootNotDirectory { name, path: root });
    }

    Ok(Storage {
        name,
        configured_root,
        root,
    })
}

fn validate_existing_path_components(
    storage_root: &Path,
    repository_path: &Path,
) -> Result<(), LocatorError> {
    let mut current = storage_root.to_path_buf();

    for component in repository_path.components() {
        let Component::Normal(segment) = component else {
            continue;
        };

        current.push(segment);

        if !current.exists() {
            break;
        }

        let canonical =
            current
                .canonicalize()
                .map_err(|source| LocatorError::InspectRepositoryPath {
                    path: repository_path.to_path_buf(),
                    source,
                })?;

        if !canonical.starts_with(storage_root) {
            return Err(LocatorError::RepositoryPathEscapesStorageRoot {
                path: repository_path.to_path_buf(),
                resolved: canonical,
                storage_root: storage_root.to_path_buf(),
            });
        }

        current = canonical;
    }

    Ok(())
}

fn normalize_repository_path(repository_path: &Path) -> Result<PathBuf, LocatorError> {
    let mut normalized = PathBuf::new();

    for component in repository_path.components() {
        match component {
            Component::Normal(segment) => normalized.push(segment),
            Component::CurDir => {
                return Err(LocatorError::InvalidRepositoryPathComponent {
                    path: repository_path.to_path_buf(),
                    component: "current directory",
                });
            }
            Component::ParentDir => {
                return Err(LocatorError::InvalidRepositoryPathComponent {
                    path: repository_path.to_path_buf(),
                    component: "parent directory",
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(LocatorError::InvalidRepositoryPathComponent {
                    path: repository_path.to_path_buf(),
                    component: "root",
                });
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(LocatorError::EmptyRepositoryPath);
    }

    Ok(normalized)
}

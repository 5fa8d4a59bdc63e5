use ndarray::ArrayD;

use super::error::ProjectError;
use super::options::ReadOptions;
use crate::source::Container;

/// Container access with the project's naming conventions applied.
pub struct ProjectReader<'a, C: ?Sized> {
    container: &'a C,
    options: &'a ReadOptions,
}

impl<'a, C: Container + ?Sized> ProjectReader<'a, C> {
    pub fn new(container: &'a C, options: &'a ReadOptions) -> Self {
        Self { container, options }
    }

    pub fn options(&self) -> &ReadOptions {
        self.options
    }

    /// Children of `group` whose names start with `prefix`, in the configured
    /// key order.
    pub fn keys(&self, group: &str, prefix: &str) -> Result<Vec<String>, ProjectError> {
        let mut keys: Vec<String> = self
            .container
            .children(group)?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        self.options.key_order.sort(&mut keys, prefix);
        Ok(keys)
    }

    /// Whether `path` exists and is not an empty group.
    pub fn is_populated(&self, path: &str) -> Result<bool, ProjectError> {
        Ok(self.container.is_populated(path)?)
    }

    pub fn string(&self, path: &str) -> Result<String, ProjectError> {
        Ok(self.container.read_string(path)?)
    }

    pub fn strings(&self, path: &str) -> Result<Vec<String>, ProjectError> {
        Ok(self.container.read_strings(path)?)
    }

    pub fn ints(&self, path: &str) -> Result<ArrayD<i64>, ProjectError> {
        Ok(self.container.read_ints(path)?)
    }

    pub fn floats(&self, path: &str) -> Result<ArrayD<f64>, ProjectError> {
        Ok(self.container.read_floats(path)?)
    }

    pub fn bools(&self, path: &str) -> Result<ArrayD<bool>, ProjectError> {
        Ok(self.container.read_bools(path)?)
    }

    pub fn attr_string(&self, path: &str, name: &str) -> Result<String, ProjectError> {
        Ok(self.container.read_attr_string(path, name)?)
    }
}

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::{ClassificationData, RegressionData};
use crate::{MlErr, Result};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StoredRef<'a> {
    Classification(&'a ClassificationData),
    Regression(&'a RegressionData),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Stored {
    Classification(ClassificationData),
    Regression(RegressionData),
}

impl Stored {
    fn kind(&self) -> &'static str {
        match self {
            Stored::Classification(_) => "classification",
            Stored::Regression(_) => "regression",
        }
    }
}

fn write(path: &Path, stored: &StoredRef<'_>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, stored)?;
    writer.flush()?;
    Ok(())
}

fn read(path: &Path) -> Result<Stored> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

impl ClassificationData {
    /// Writes the dataset as JSON to `path`, replacing any existing file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write(path.as_ref(), &StoredRef::Classification(self))
    }

    /// Replaces the content of this dataset with the one stored at `path`.
    ///
    /// On failure the dataset is left untouched.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        match read(path.as_ref())? {
            Stored::Classification(data) => {
                data.validate()?;
                *self = data;
                Ok(())
            }
            other => Err(MlErr::KindMismatch {
                expected: "classification",
                got: other.kind(),
            }),
        }
    }
}

impl RegressionData {
    /// Writes the dataset as JSON to `path`, replacing any existing file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write(path.as_ref(), &StoredRef::Regression(self))
    }

    /// Replaces the content of this dataset with the one stored at `path`.
    ///
    /// On failure the dataset is left untouched.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        match read(path.as_ref())? {
            Stored::Regression(data) => {
                data.validate()?;
                *self = data;
                Ok(())
            }
            other => Err(MlErr::KindMismatch {
                expected: "regression",
                got: other.kind(),
            }),
        }
    }
}

use std::path::Path;

use log::debug;
use machine_learning::{
    self as ml,
    dataset::{ClassificationData, DatasetRef, RegressionData},
};

/// Where sessions persist and retrieve their training samples.
pub trait DatasetStore {
    /// Writes `dataset` to `path`.
    fn save(&mut self, path: &Path, dataset: DatasetRef<'_>) -> ml::Result<()>;

    /// Reads back a classification dataset written by `save`.
    fn load_classification(&mut self, path: &Path) -> ml::Result<ClassificationData>;

    /// Reads back a regression dataset written by `save`.
    fn load_regression(&mut self, path: &Path) -> ml::Result<RegressionData>;
}

/// Stores datasets as JSON files on the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStore;

impl DatasetStore for FileStore {
    fn save(&mut self, path: &Path, dataset: DatasetRef<'_>) -> ml::Result<()> {
        debug!("writing {} {} samples to {}", dataset.len(), dataset.kind(), path.display());

        match dataset {
            DatasetRef::Classification(data) => data.save_to_file(path),
            DatasetRef::Regression(data) => data.save_to_file(path),
        }
    }

    fn load_classification(&mut self, path: &Path) -> ml::Result<ClassificationData> {
        let mut data = ClassificationData::new(1);
        data.load_from_file(path)?;
        Ok(data)
    }

    fn load_regression(&mut self, path: &Path) -> ml::Result<RegressionData> {
        let mut data = RegressionData::new(1, 1);
        data.load_from_file(path)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use machine_learning::MlErr;

    use super::*;

    #[test]
    fn file_store_round_trips_both_kinds() {
        let dir = env::temp_dir().join(format!("ml-adapter-store-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        let mut store = FileStore;

        let mut classification = ClassificationData::new(2);
        classification.add_sample(4, vec![0.5, 1.5]).unwrap();
        let path = dir.join("classification.json");
        store.save(&path, DatasetRef::Classification(&classification)).unwrap();
        assert_eq!(store.load_classification(&path).unwrap(), classification);

        assert!(matches!(
            store.load_regression(&path),
            Err(MlErr::KindMismatch { .. })
        ));

        let mut regression = RegressionData::new(1, 2);
        regression.add_sample(vec![1.0], vec![2.0, 3.0]).unwrap();
        let path = dir.join("regression.json");
        store.save(&path, DatasetRef::Regression(&regression)).unwrap();
        assert_eq!(store.load_regression(&path).unwrap(), regression);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_files_are_io_errors() {
        let path = env::temp_dir().join("ml-adapter-store-missing").join("none.json");
        assert!(matches!(FileStore.load_classification(&path), Err(MlErr::Io(_))));
    }
}

use std::path::{Path, PathBuf};

/// File naming for harness artifacts - defines only naming, not I/O
/// Keeps the runner, the CLI and the tests agreeing on where files land,
/// and keeps every run's files private to that run

pub const RUN_DIR_PREFIX: &str = "run";
pub const RESULT_PREFIX: &str = "result";
pub const RESULT_EXTENSION: &str = "yml";
pub const REFERENCE_EXTENSION: &str = "txt";

/// Private working directory name for a run
pub fn run_dir_name(run_id: &uuid::Uuid) -> String {
    format!("{}-{}", RUN_DIR_PREFIX, run_id)
}

/// Private result file name for a run
pub fn result_file_name(run_id: &uuid::Uuid) -> String {
    format!("{}-{}.{}", RESULT_PREFIX, run_id, RESULT_EXTENSION)
}

/// Reference results are checked in as `<problem>.txt` next to the problem files
pub fn reference_file(reference_dir: &Path, problem: &str) -> PathBuf {
    reference_dir.join(format!("{}.{}", problem, REFERENCE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_result_file_name_deterministic() {
        let id = Uuid::new_v4();
        let name1 = result_file_name(&id);
        let name2 = result_file_name(&id);
        assert_eq!(name1, name2);
        assert!(name1.starts_with("result-"));
        assert!(name1.ends_with(".yml"));
    }

    #[test]
    fn test_result_file_names_are_private_per_run() {
        assert_ne!(
            result_file_name(&Uuid::new_v4()),
            result_file_name(&Uuid::new_v4())
        );
    }

    #[test]
    fn test_run_dir_name_format() {
        let id = Uuid::new_v4();
        let name = run_dir_name(&id);
        assert!(name.starts_with("run-"));
        assert!(name.contains(&id.to_string()));
    }

    #[test]
    fn test_reference_file_naming() {
        let path = reference_file(Path::new("fixtures/mpec"), "linear1");
        assert_eq!(path, PathBuf::from("fixtures/mpec/linear1.txt"));
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::constants::targets::GENERATOR;
use crate::errors::PipelineError;
use crate::types::ConfigValue;
use crate::utils::{file_uri_path, file_url, split_scheme};

/// Yield a `file://` URL for every direct child of `dir` that `allow` accepts.
///
/// `dir` is a `file:` URL or a plain path, taken verbatim. Entries whose name starts with `.` are
/// skipped; the rest come in file-name order. Fails up front when `dir` is
/// not a directory; unreadable entries met later are logged and skipped.
pub fn entry_generator<F>(
    dir: &str,
    mut allow: F,
) -> Result<impl Iterator<Item = ConfigValue> + use<F>, PipelineError>
where
    F: FnMut(&Path) -> bool,
{
    let root = match split_scheme(dir).0.as_str() {
        "file" => file_uri_path(dir),
        _ => PathBuf::from(dir),
    };
    if !fs::metadata(&root)?.is_dir() {
        return Err(PipelineError::Configuration(format!(
            "`{}` is not a directory",
            root.display()
        )));
    }
    debug!(target: GENERATOR, root = %root.display(), "listing entries");
    let entries = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(target: GENERATOR, "skipping entry: {err}");
                None
            }
        })
        .filter(|entry| !is_hidden(entry))
        .filter(move |entry| allow(entry.path()))
        .map(|entry| file_url(entry.path()));
    Ok(entries)
}

/// [`entry_generator`] restricted to regular files (symlinks followed).
pub fn file_generator(
    dir: &str,
) -> Result<impl Iterator<Item = ConfigValue> + use<>, PipelineError> {
    entry_generator(dir, Path::is_file)
}

/// [`entry_generator`] restricted to directories (symlinks followed).
pub fn directory_generator(
    dir: &str,
) -> Result<impl Iterator<Item = ConfigValue> + use<>, PipelineError> {
    entry_generator(dir, Path::is_dir)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fixture() -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join(".hidden"), "h").unwrap();
        fs::create_dir(root.join("house_2")).unwrap();
        fs::create_dir(root.join("house_1")).unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join("house_1").join("nested.txt"), "n").unwrap();
        temp
    }

    fn tails(urls: impl Iterator<Item = ConfigValue>) -> Vec<String> {
        urls.map(|url| url.rsplit('/').next().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn entries_are_sorted_and_skip_dot_names() {
        let temp = fixture();
        let dir = temp.path().to_string_lossy().into_owned();
        let urls: Vec<_> = entry_generator(&dir, |_| true).unwrap().collect();
        assert!(urls.iter().all(|url| url.starts_with("file:///")));
        assert_eq!(
            tails(urls.into_iter()),
            vec!["a.txt", "b.txt", "house_1", "house_2"]
        );
    }

    #[test]
    fn file_and_directory_generators_filter_by_kind() {
        let temp = fixture();
        let url = file_url(temp.path());
        assert_eq!(tails(file_generator(&url).unwrap()), vec!["a.txt", "b.txt"]);
        assert_eq!(
            tails(directory_generator(&url).unwrap()),
            vec!["house_1", "house_2"]
        );
    }

    #[test]
    fn generated_urls_resolve_back_to_paths() {
        let temp = fixture();
        let dir = temp.path().to_string_lossy().into_owned();
        for url in file_generator(&dir).unwrap() {
            assert!(file_uri_path(&url).is_file());
        }
    }

    #[test]
    fn reserved_characters_and_relative_roots_survive() {
        let temp = tempfile::tempdir_in(".").unwrap();
        let root = temp.path().join("c%41 lot");
        fs::create_dir(&root).unwrap();
        for name in ["a#1.jpg", "b?x.jpg", "c%41.jpg"] {
            fs::write(root.join(name), "x").unwrap();
        }
        assert!(root.is_relative());

        let dir = root.to_string_lossy().into_owned();
        let names: Vec<String> = file_generator(&dir)
            .unwrap()
            .map(|url| {
                assert!(url.starts_with("file:///"), "{url}");
                let path = file_uri_path(&url);
                assert!(path.is_file(), "{url}");
                path.file_name().unwrap().to_string_lossy().into_owned()
            })
            .collect();
        assert_eq!(names, vec!["a#1.jpg", "b?x.jpg", "c%41.jpg"]);
        assert_eq!(file_generator(&file_url(&root)).unwrap().count(), 3);
    }

    #[test]
    fn missing_or_plain_file_roots_fail() {
        let temp = fixture();
        let missing = temp.path().join("nope").to_string_lossy().into_owned();
        assert!(matches!(file_generator(&missing), Err(PipelineError::Io(_))));
        let plain = temp.path().join("a.txt").to_string_lossy().into_owned();
        assert!(matches!(
            file_generator(&plain),
            Err(PipelineError::Configuration(_))
        ));
    }
}

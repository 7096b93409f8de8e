//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! These helpers wrap `cap_std::fs::Dir` so test suites share consistent
    //! file access without touching `std::fs` directly.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a UTF-8 text file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use restaurant_backend::test_support::cap_fs::{read_file_to_string, write_file};
    ///
    /// let path = std::env::temp_dir().join("cap-fs-read-example.txt");
    /// write_file(&path, b"hello\n")?;
    ///
    /// let content = read_file_to_string(&path)?;
    /// assert_eq!(content, "hello\n");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn read_file_to_string(path: &Path) -> io::Result<String> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read_to_string(Path::new(&file_name))
    }

    /// Write bytes to a file through `cap_std`, replacing existing content.
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "path must include a file name")
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

pub mod offers {
    //! Offer input fixtures.

    use std::io;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::cap_fs::write_file;

    /// Temporary directory holding one offer input file.
    ///
    /// The directory is removed when the fixture is dropped.
    #[derive(Debug)]
    pub struct OfferInputFixture {
        directory: TempDir,
        input_path: PathBuf,
    }

    impl OfferInputFixture {
        /// Write `lines` joined by `\n` to `offers.csv` in a fresh directory.
        pub fn with_lines<I, S>(lines: I) -> io::Result<Self>
        where
            I: IntoIterator<Item = S>,
            S: AsRef<str>,
        {
            let directory = TempDir::new()?;
            let input_path = directory.path().join("offers.csv");
            let contents = lines
                .into_iter()
                .map(|line| format!("{}\n", line.as_ref()))
                .collect::<String>();
            write_file(&input_path, contents.as_bytes())?;
            Ok(Self {
                directory,
                input_path,
            })
        }

        /// Path of the input file.
        pub fn input_path(&self) -> &std::path::Path {
            &self.input_path
        }

        /// Path for an output file next to the input.
        pub fn output_path(&self, file_name: &str) -> PathBuf {
            self.directory.path().join(file_name)
        }
    }
}

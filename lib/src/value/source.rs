use std::{fs, io};
use std::path::Path;
use std::fmt::Debug;

use either::Either;

use crate::error::{Result, Chainable};

/// Something that can be read as text or raw bytes.
pub trait Source: Debug {
    fn read(self) -> Result<Either<String, Vec<u8>>>;

    /// Reads `self`, failing if the contents are not valid UTF-8.
    fn read_string(self) -> Result<String> where Self: Sized {
        let path = self.path().map(|p| p.display().to_string());
        match self.read()? {
            Either::Left(string) => Ok(string),
            Either::Right(_) => err! {
                "input is not valid UTF-8",
                "path" => path.as_deref().unwrap_or("<memory>"),
            },
        }
    }

    fn path(&self) -> Option<&Path> {
        None
    }
}

impl Source for &str {
    fn read(self) -> Result<Either<String, Vec<u8>>> {
        Ok(Either::Left(self.to_owned()))
    }
}

impl Source for &fs::File {
    fn read(self) -> Result<Either<String, Vec<u8>>> {
        use io::Read;

        let mut data = Vec::new();
        let mut file = io::BufReader::new(self);
        file.read_to_end(&mut data)?;

        let value = String::from_utf8(data)
            .map(Either::Left)
            .unwrap_or_else(|e| Either::Right(e.into_bytes()));

        Ok(value)
    }
}

impl Source for &Path {
    fn read(self) -> Result<Either<String, Vec<u8>>> {
        let file = fs::File::open(self).chain(error! {
            "failed to open file for reading",
            "file path" => self.display()
        })?;

        file.read()
    }

    fn path(&self) -> Option<&Path> {
        Some(self)
    }
}

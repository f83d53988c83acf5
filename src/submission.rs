use std::path::PathBuf;

use reqwest::blocking::multipart::{Form, Part};

use crate::models::{ConversionInput, ConversionJob, OutputFormat};

pub const FILE_FIELD: &str = "file";
pub const URL_FIELD: &str = "url";
pub const FORMAT_FIELD: &str = "format";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceField {
    File {
        path: PathBuf,
        name: String,
        mime_type: String,
    },
    Url(String),
}

/// Transfer payload for `POST /api/convert`: one source field plus `format`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub source: SourceField,
    pub format: OutputFormat,
}

impl SubmissionPayload {
    pub fn build(job: &ConversionJob) -> Self {
        let source = match &job.input {
            ConversionInput::File(file) => SourceField::File {
                path: file.path.clone(),
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            },
            ConversionInput::Url(url) => SourceField::Url(url.trim().to_string()),
        };

        Self {
            source,
            format: job.format,
        }
    }

    /// Form field names in the order they are written.
    pub fn field_names(&self) -> [&'static str; 2] {
        match self.source {
            SourceField::File { .. } => [FILE_FIELD, FORMAT_FIELD],
            SourceField::Url(_) => [URL_FIELD, FORMAT_FIELD],
        }
    }

    /// Opens the file (when there is one) and produces the multipart body.
    ///
    /// File contents are streamed from disk while the request is sent.
    pub fn into_form(self) -> std::io::Result<Form> {
        let form = match self.source {
            SourceField::File {
                path,
                name,
                mime_type,
            } => {
                let mut part = Part::file(&path)?.file_name(name);
                if !mime_type.is_empty() {
                    part = part
                        .mime_str(&mime_type)
                        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
                }
                Form::new().part(FILE_FIELD, part)
            }
            SourceField::Url(url) => Form::new().text(URL_FIELD, url),
        };

        Ok(form.text(FORMAT_FIELD, self.format.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectedFile;

    #[test]
    fn test_url_job_has_url_and_format_fields() {
        let job = ConversionJob {
            input: ConversionInput::Url(" https://youtu.be/abc ".to_string()),
            format: OutputFormat::Flac,
        };
        let payload = SubmissionPayload::build(&job);

        assert_eq!(payload.source, SourceField::Url("https://youtu.be/abc".to_string()));
        assert_eq!(payload.field_names(), ["url", "format"]);
        assert_eq!(payload.format.as_str(), "flac");
    }

    #[test]
    fn test_file_job_has_file_and_format_fields() {
        let job = ConversionJob {
            input: ConversionInput::File(SelectedFile::new("/music/a.wav", 10)),
            format: OutputFormat::default(),
        };
        let payload = SubmissionPayload::build(&job);

        assert!(matches!(&payload.source, SourceField::File { name, .. } if name == "a.wav"));
        assert_eq!(payload.field_names(), ["file", "format"]);
        assert_eq!(payload.format, OutputFormat::Mp3);
    }

    #[test]
    fn test_into_form_opens_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp3");
        std::fs::write(&path, b"ID3").unwrap();
        let job = ConversionJob {
            input: ConversionInput::File(SelectedFile::from_path(&path).unwrap()),
            format: OutputFormat::Aac,
        };

        assert!(SubmissionPayload::build(&job).into_form().is_ok());
    }

    #[test]
    fn test_into_form_missing_file_is_an_error() {
        let job = ConversionJob {
            input: ConversionInput::File(SelectedFile::new("/definitely/not/here.mp3", 0)),
            format: OutputFormat::Mp3,
        };

        assert!(SubmissionPayload::build(&job).into_form().is_err());
    }
}

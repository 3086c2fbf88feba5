use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::foundation::error::{DraggenError, DraggenResult};
use crate::generate::client::{GeneratedImage, GenerationRequest, ImageGenerator};

/// Generator backed by an external program.
///
/// The program receives the [`GenerationRequest`] as JSON on stdin and must print a
/// [`GeneratedImage`] JSON object (`{"mime_type": ..., "data": ...}`) on stdout, exiting 0.
#[derive(Clone, Debug)]
pub struct ProcessGenerator {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessGenerator {
    /// Run `program` with no extra arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl ImageGenerator for ProcessGenerator {
    #[tracing::instrument(skip_all, fields(program = %self.program.display()))]
    fn generate(&self, request: &GenerationRequest) -> DraggenResult<GeneratedImage> {
        let input = serde_json::to_vec(request)
            .map_err(|e| DraggenError::generation(format!("serialize request: {e}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DraggenError::generation(format!(
                    "failed to spawn '{}': {e}",
                    self.program.display()
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DraggenError::generation("failed to open generator stdin"))?;
        // Feed stdin from another thread so a chatty child cannot block on a full stdout pipe.
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let out = child
            .wait_with_output()
            .map_err(|e| DraggenError::generation(format!("wait for generator: {e}")))?;
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!("generator closed stdin early");
            }
            Ok(Err(e)) => {
                return Err(DraggenError::generation(format!("write request: {e}")));
            }
            Err(_) => return Err(DraggenError::generation("request writer panicked")),
        }

        if !out.status.success() {
            return Err(DraggenError::generation(format!(
                "'{}' failed ({}): {}",
                self.program.display(),
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let image: GeneratedImage = serde_json::from_slice(&out.stdout)
            .map_err(|e| DraggenError::generation(format!("parse generator output: {e}")))?;
        tracing::debug!(
            mime = %image.mime_type,
            data_len = image.data.len(),
            "generator responded"
        );
        Ok(image)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/process.rs"]
mod tests;

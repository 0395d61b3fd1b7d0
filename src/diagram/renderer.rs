use super::{DiagramRenderer, DiagramTask};
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Renders by invoking an external command line tool.
///
/// The tool is called as `<program> -i <input> -o <output> -w <width>
/// -H <height> -b <background> [extra args]`, which is the Mermaid CLI
/// calling convention.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: PathBuf,
    background: String,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandRenderer {
    /// Create a renderer for `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            background: "white".to_string(),
            extra_args: Vec::new(),
            timeout: None,
        }
    }

    /// Renderer for the Mermaid CLI found on `PATH`.
    pub fn mermaid() -> Self {
        Self::new("mmdc")
    }

    /// Set the background color.
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    /// Append extra arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Kill the tool if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the program path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn wait(&self, child: &mut Child, figure_id: &str) -> Result<ExitStatus> {
        let Some(limit) = self.timeout else {
            return Ok(child.wait()?);
        };

        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if started.elapsed() >= limit {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::render(
                    figure_id,
                    format!("timed out after {}s", limit.as_secs_f32()),
                ));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self::mermaid()
    }
}

impl DiagramRenderer for CommandRenderer {
    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("renderer")
    }

    fn render(&self, task: &DiagramTask, output: &Path) -> Result<()> {
        let input = output.with_extension("mmd");
        fs::write(&input, &task.source)?;

        // stderr to a file, never a pipe
        let log_path = output.with_extension("log");
        let log_file = File::create(&log_path)?;

        let mut child = Command::new(&self.program)
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(output)
            .arg("-w")
            .arg(task.width.to_string())
            .arg("-H")
            .arg(task.height.to_string())
            .arg("-b")
            .arg(&self.background)
            .args(&self.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log_file))
            .spawn()
            .map_err(|e| {
                Error::render(
                    &task.figure_id,
                    format!("cannot start {}: {}", self.program.display(), e),
                )
            })?;

        let status = self.wait(&mut child, &task.figure_id)?;
        if !status.success() {
            let stderr = fs::read_to_string(&log_path).unwrap_or_default();
            let detail = stderr.lines().last().unwrap_or("").trim();
            return Err(Error::render(
                &task.figure_id,
                format!("{} exited with {}: {}", self.name(), status, detail),
            ));
        }
        Ok(())
    }
}

/// Picks up images rendered ahead of time.
///
/// Looks for `diagram_<chapter>_<n>.png` in a directory, the same name
/// [`DiagramTask::output_file_name`] produces.
#[derive(Debug, Clone)]
pub struct DirectoryRenderer {
    dir: PathBuf,
}

impl DirectoryRenderer {
    /// Create a renderer over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DiagramRenderer for DirectoryRenderer {
    fn name(&self) -> &str {
        "directory"
    }

    fn render(&self, task: &DiagramTask, output: &Path) -> Result<()> {
        let source = self.dir.join(task.output_file_name());
        if !source.is_file() {
            return Err(Error::render(
                &task.figure_id,
                format!("no pre-rendered image at {}", source.display()),
            ));
        }
        if source != output {
            fs::copy(&source, output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_renderer_copies() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(src.path().join("diagram_1_1.png"), b"png").unwrap();

        let renderer = DirectoryRenderer::new(src.path());
        let task = DiagramTask::new("1-1", "graph TD");
        let output = out.path().join(task.output_file_name());
        renderer.render(&task, &output).unwrap();
        assert_eq!(fs::read(&output).unwrap(), b"png");

        let missing = DiagramTask::new("1-2", "graph TD");
        let err = renderer
            .render(&missing, &out.path().join(missing.output_file_name()))
            .unwrap_err();
        assert!(matches!(err, Error::AssetRender { ref figure_id, .. } if figure_id == "1-2"));
    }

    #[test]
    fn test_missing_program_is_render_error() {
        let out = tempfile::tempdir().unwrap();
        let renderer = CommandRenderer::new("mdhwpx-no-such-renderer");
        let task = DiagramTask::new("2-1", "graph TD");

        let err = renderer
            .render(&task, &out.path().join(task.output_file_name()))
            .unwrap_err();
        assert!(matches!(err, Error::AssetRender { .. }));
        // markup is written before the tool runs
        assert!(out.path().join("diagram_2_1.mmd").is_file());
    }

    #[test]
    fn test_command_renderer_builder() {
        let renderer = CommandRenderer::mermaid()
            .with_background("transparent")
            .with_args(["-s", "2"])
            .with_timeout(Duration::from_secs(30));
        assert_eq!(renderer.name(), "mmdc");
        assert_eq!(renderer.extra_args, vec!["-s", "2"]);
        assert_eq!(renderer.timeout, Some(Duration::from_secs(30)));
    }
}

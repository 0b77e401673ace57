use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use chrono::{DateTime, Local};
use tracing::{error, info, instrument, warn};

use crate::{configuration::GenerationConfig, processors::logo::backend::ImageBackend};

/// Where a generated logo goes: `{dir}/{prefix}_{YYYYMMDD_HHMMSS}.png`.
#[derive(Debug, Clone)]
pub struct LogoOutput<'a> {
    pub dir: &'a Path,
    pub prefix: &'a str,
}

impl LogoOutput<'_> {
    pub fn file_name(&self, now: DateTime<Local>) -> String {
        format!("{}_{}.png", self.prefix, now.format("%Y%m%d_%H%M%S"))
    }
}

fn attempt(
    backend: &dyn ImageBackend,
    prompt: &str,
    generation: &GenerationConfig,
    output: &LogoOutput,
) -> Result<PathBuf, Error> {
    let image = backend.generate(prompt, generation)?;

    let path = output.dir.join(output.file_name(Local::now()));
    persist_image(&path, &image)?;

    Ok(path)
}

/// Writes through a `.part` sibling so a failed write never leaves a
/// truncated logo behind.
fn persist_image(path: &Path, image: &[u8]) -> Result<(), Error> {
    let partial = path.with_extension("png.part");

    let result = fs::write(&partial, image).and_then(|_| fs::rename(&partial, path));
    if result.is_err() {
        fs::remove_file(&partial).ok();
    }

    result.with_context(|| format!("failed to write {}", path.display()))
}

/// Tries each backend in order and saves the first image produced.
///
/// Returns the written path, or `None` once every backend has failed. Progress
/// lines go to `out`; failures to write them are ignored.
#[instrument(skip_all, fields(candidates = backends.len()))]
pub fn generate_logo(
    backends: &[Box<dyn ImageBackend>],
    prompt: &str,
    generation: &GenerationConfig,
    output: &LogoOutput,
    out: &mut impl Write,
) -> Option<PathBuf> {
    for backend in backends {
        writeln!(out, "🔄 Trying model {}...", backend.id()).ok();

        match attempt(backend.as_ref(), prompt, generation, output) {
            Ok(path) => {
                info!(model = backend.id(), path = %path.display(), "logo generated");
                writeln!(out, "✅ Team logo generated: {}", path.display()).ok();
                writeln!(out, "📍 Model used: {}", backend.id()).ok();
                return Some(path);
            }
            Err(e) => {
                warn!(model = backend.id(), error = %format!("{e:#}"), "model attempt failed");
                writeln!(out, "❌ Model {} failed: {:#}", backend.id(), e).ok();
            }
        }
    }

    error!("every candidate model failed");
    writeln!(out, "❌ Image generation failed on every model.").ok();

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    use chrono::{NaiveDateTime, TimeZone};

    use crate::processors::logo::backend::BackendError;

    type CallLog = Rc<RefCell<Vec<String>>>;

    struct FakeBackend {
        id: String,
        result: Option<Vec<u8>>,
        calls: CallLog,
    }

    impl FakeBackend {
        fn boxed(id: &str, result: Option<&[u8]>, calls: &CallLog) -> Box<dyn ImageBackend> {
            Box::new(FakeBackend {
                id: id.to_string(),
                result: result.map(|bytes| bytes.to_vec()),
                calls: Rc::clone(calls),
            })
        }
    }

    impl ImageBackend for FakeBackend {
        fn id(&self) -> &str {
            &self.id
        }

        fn generate(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<Vec<u8>, BackendError> {
            assert_eq!(prompt, "ghosts");
            assert_eq!(config.seed, 42);
            self.calls.borrow_mut().push(self.id.clone());

            self.result
                .clone()
                .ok_or_else(|| BackendError::Request("access denied".to_string()))
        }
    }

    fn run(backends: &[Box<dyn ImageBackend>], dir: &Path) -> (Option<PathBuf>, String) {
        let output = LogoOutput {
            dir,
            prefix: "kitsch_team_logo",
        };
        let mut out = Vec::new();
        let result = generate_logo(
            backends,
            "ghosts",
            &GenerationConfig::default(),
            &output,
            &mut out,
        );
        (result, String::from_utf8(out).unwrap())
    }

    fn file_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn first_success_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let calls = CallLog::default();
        let backends = vec![
            FakeBackend::boxed("primary", Some(b"first"), &calls),
            FakeBackend::boxed("fallback", Some(b"second"), &calls),
        ];

        let (result, printed) = run(&backends, dir.path());

        let path = result.expect("primary succeeds");
        assert_eq!(fs::read(&path).unwrap(), b"first");
        assert_eq!(file_count(dir.path()), 1);
        assert_eq!(*calls.borrow(), vec!["primary".to_string()]);
        assert!(printed.contains("Model used: primary"));
        assert!(!printed.contains("fallback"));
    }

    #[test]
    fn falls_back_after_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let calls = CallLog::default();
        let backends = vec![
            FakeBackend::boxed("primary", None, &calls),
            FakeBackend::boxed("fallback", Some(b"second"), &calls),
        ];

        let (result, printed) = run(&backends, dir.path());

        let path = result.expect("fallback succeeds");
        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert_eq!(file_count(dir.path()), 1);
        assert_eq!(
            *calls.borrow(),
            vec!["primary".to_string(), "fallback".to_string()]
        );

        let failure = printed.find("Model primary failed").unwrap();
        let success = printed.find("Team logo generated").unwrap();
        assert!(failure < success);
        assert!(printed.contains("access denied"));
        assert!(printed.contains("Model used: fallback"));
    }

    #[test]
    fn exhausting_every_candidate_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let calls = CallLog::default();
        let backends = vec![
            FakeBackend::boxed("primary", None, &calls),
            FakeBackend::boxed("fallback", None, &calls),
        ];

        let (result, printed) = run(&backends, dir.path());

        assert!(result.is_none());
        assert_eq!(file_count(dir.path()), 0);
        assert_eq!(calls.borrow().len(), 2);
        assert!(
            printed
                .lines()
                .last()
                .unwrap()
                .contains("failed on every model")
        );
    }

    #[test]
    fn write_failure_moves_to_next_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing-subdir");
        let calls = CallLog::default();
        let backends = vec![
            FakeBackend::boxed("primary", Some(b"first"), &calls),
            FakeBackend::boxed("fallback", Some(b"second"), &calls),
        ];

        let (result, printed) = run(&backends, &missing);

        assert!(result.is_none());
        assert_eq!(calls.borrow().len(), 2);
        assert!(printed.contains("Model primary failed"));
        assert!(printed.contains("Model fallback failed"));
    }

    #[cfg(unix)]
    #[test]
    fn failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("kitsch_team_logo_20250905_231057.png");
        fs::create_dir(&target).unwrap();

        assert!(persist_image(&target, b"image bytes").is_err());

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["kitsch_team_logo_20250905_231057.png".to_string()]);
        assert!(target.is_dir());
    }

    #[test]
    fn persisted_image_has_final_name_only() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logo.png");

        persist_image(&target, b"image bytes").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"image bytes");
        assert_eq!(file_count(dir.path()), 1);
    }

    #[test]
    fn file_name_embeds_write_time() {
        let dir = tempfile::tempdir().unwrap();
        let calls = CallLog::default();
        let backends = vec![FakeBackend::boxed("primary", Some(b"img"), &calls)];

        let before = Local::now().naive_local().and_utc().timestamp();
        let (result, _) = run(&backends, dir.path());
        let after = Local::now().naive_local().and_utc().timestamp();

        let path = result.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();

        let stamp = name
            .strip_prefix("kitsch_team_logo_")
            .and_then(|rest| rest.strip_suffix(".png"))
            .unwrap();
        let (date, time) = stamp.split_once('_').unwrap();
        assert_eq!(date.len(), 8);
        assert_eq!(time.len(), 6);
        assert!(date.chars().chain(time.chars()).all(|c| c.is_ascii_digit()));

        let written = NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S")
            .unwrap()
            .and_utc()
            .timestamp();
        assert!(before <= written && written <= after);
    }

    #[test]
    fn file_name_formats_fixed_time() {
        let output = LogoOutput {
            dir: Path::new("."),
            prefix: "kitsch_team_logo",
        };
        let now = Local.with_ymd_and_hms(2025, 9, 5, 23, 10, 57).unwrap();

        assert_eq!(output.file_name(now), "kitsch_team_logo_20250905_231057.png");
    }
}

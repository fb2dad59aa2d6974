//! Document output: serialize rendered pages and write them atomically.
//!
//! All documents are serialized before anything touches the filesystem, then
//! each is written to a hidden temp file and renamed into place. Existing
//! targets are moved aside first. If any step fails, the targets renamed so
//! far are removed and the previous files restored, so a failed run leaves the
//! directory as it found it.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use pageforge_shared::{OutputConfig, PageType, PageforgeError, Result};

use crate::pipeline::PipelineOutput;
use crate::renderer::Document;

/// Metadata for a single written document.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WrittenDocument {
    pub page_type: PageType,
    pub filename: String,
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Serialize a document as JSON text, pretty-printed when `pretty`.
pub fn to_json(document: &Document, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(text)
}

/// Write every document of a run into `dir`, using the file names from
/// `config`.
pub fn write_outputs(
    output: &PipelineOutput,
    config: &OutputConfig,
    dir: &Path,
) -> Result<Vec<WrittenDocument>> {
    let named: Vec<(&str, &Document)> = output
        .documents()
        .into_iter()
        .map(|doc| (config.file_for(doc.page_type()), doc))
        .collect();
    write_documents(dir, &named, config.pretty)
}

/// Write `(filename, document)` pairs into `dir`.
#[instrument(skip_all, fields(dir = %dir.display(), count = documents.len()))]
pub fn write_documents(
    dir: &Path,
    documents: &[(&str, &Document)],
    pretty: bool,
) -> Result<Vec<WrittenDocument>> {
    let rendered = documents
        .iter()
        .map(|(filename, doc)| Ok((*filename, doc.page_type(), to_json(doc, pretty)?)))
        .collect::<Result<Vec<_>>>()?;

    std::fs::create_dir_all(dir).map_err(|e| PageforgeError::io(dir, e))?;

    // Stage everything first so a failure leaves targets untouched.
    let mut staged: Vec<PathBuf> = Vec::with_capacity(rendered.len());
    for (filename, _, content) in &rendered {
        let temp = dir.join(format!(".{filename}.tmp"));
        if let Err(e) = std::fs::write(&temp, content) {
            discard(&staged);
            let _ = std::fs::remove_file(&temp);
            return Err(PageforgeError::io(&temp, e));
        }
        staged.push(temp);
    }

    let mut commit = Commit::default();
    let mut written = Vec::with_capacity(rendered.len());
    for ((filename, page_type, content), temp) in rendered.iter().zip(&staged) {
        let target = dir.join(filename);
        if let Err(e) = commit.replace(temp, &target) {
            commit.rollback();
            discard(&staged);
            return Err(e);
        }

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        debug!(file = %filename, size = content.len(), "wrote document");

        written.push(WrittenDocument {
            page_type: *page_type,
            filename: (*filename).to_string(),
            path: target,
            sha256: hash,
            size_bytes: content.len(),
        });
    }
    commit.finish();

    info!(count = written.len(), "documents written");
    Ok(written)
}

/// Targets renamed into place so far, plus backups of the files they
/// replaced.
#[derive(Default)]
struct Commit {
    renamed: Vec<PathBuf>,
    backups: Vec<(PathBuf, PathBuf)>,
}

impl Commit {
    fn replace(&mut self, temp: &Path, target: &Path) -> Result<()> {
        if target.is_file() {
            let backup = backup_path(target);
            std::fs::rename(target, &backup).map_err(|e| PageforgeError::io(target, e))?;
            self.backups.push((backup, target.to_path_buf()));
        }
        std::fs::rename(temp, target).map_err(|e| PageforgeError::io(target, e))?;
        self.renamed.push(target.to_path_buf());
        Ok(())
    }

    fn rollback(self) {
        for target in &self.renamed {
            if let Err(e) = std::fs::remove_file(target) {
                warn!(path = %target.display(), error = %e, "failed to remove partial output");
            }
        }
        for (backup, target) in &self.backups {
            if let Err(e) = std::fs::rename(backup, target) {
                warn!(path = %target.display(), error = %e, "failed to restore previous output");
            }
        }
    }

    fn finish(self) {
        for (backup, _) in &self.backups {
            if let Err(e) = std::fs::remove_file(backup) {
                warn!(path = %backup.display(), error = %e, "failed to remove backup");
            }
        }
    }
}

fn backup_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.bak"))
}

/// Remove staged temp files that have not been renamed yet.
fn discard(staged: &[PathBuf]) {
    for temp in staged.iter().filter(|p| p.exists()) {
        if let Err(e) = std::fs::remove_file(temp) {
            warn!(path = %temp.display(), error = %e, "failed to remove temp file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_pipeline;
    use serde_json::{Value, json};

    fn output() -> PipelineOutput {
        run_pipeline(&json!({
            "name": "GlowBoost Vitamin C Serum",
            "concentration": "10% Vitamin C",
            "skin_types": ["Oily", "Combination"],
            "ingredients": ["Vitamin C", "Hyaluronic Acid"],
            "benefits": ["Brightening", "Fades dark spots"],
            "usage": "Apply 2–3 drops in the morning before sunscreen",
            "side_effects": "Mild tingling for sensitive skin",
            "price": 699
        }))
        .expect("pipeline run")
    }

    #[test]
    fn writes_all_three_documents() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let out_dir = tmp.path().join("output");
        let written =
            write_outputs(&output(), &OutputConfig::default(), &out_dir).expect("write");

        let names: Vec<_> = written.iter().map(|w| w.filename.as_str()).collect();
        assert_eq!(names, ["faq.json", "product_page.json", "comparison_page.json"]);

        for doc in &written {
            assert!(doc.path.exists());
            assert_eq!(doc.sha256.len(), 64);
            let text = std::fs::read_to_string(&doc.path).expect("read");
            assert_eq!(text.len(), doc.size_bytes);
            let value: Value = serde_json::from_str(&text).expect("valid json");
            assert_eq!(value["page_type"], json!(doc.page_type.as_str()));
        }
    }

    #[test]
    fn leaves_no_temp_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_outputs(&output(), &OutputConfig::default(), tmp.path()).expect("write");
        let leftovers = std::fs::read_dir(tmp.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn rewriting_identical_output_is_stable() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let run = output();
        let first = write_outputs(&run, &OutputConfig::default(), tmp.path()).expect("first");
        let second = write_outputs(&run, &OutputConfig::default(), tmp.path()).expect("second");
        let hashes = |w: &[WrittenDocument]| w.iter().map(|d| d.sha256.clone()).collect::<Vec<_>>();
        assert_eq!(hashes(&first), hashes(&second));
    }

    #[test]
    fn compact_output_is_single_line() {
        let run = output();
        let text = to_json(&run.product, false).expect("json");
        assert!(!text.contains('\n'));
        assert!(to_json(&run.product, true).expect("json").contains('\n'));
    }

    #[test]
    fn failed_write_leaves_no_targets() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let run = output();
        let docs = [
            ("faq.json", &run.faq),
            ("missing/product_page.json", &run.product),
        ];
        let err = write_documents(tmp.path(), &docs, true).expect_err("nested dir missing");
        assert!(matches!(err, PageforgeError::Io { .. }));
        assert!(!tmp.path().join("faq.json").exists());
        assert!(!tmp.path().join(".faq.json.tmp").exists());
    }

    #[test]
    fn blocked_later_target_rolls_back_earlier_ones() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let blocker = tmp.path().join("product_page.json");
        std::fs::create_dir(&blocker).expect("blocker dir");
        std::fs::write(blocker.join("keep"), "x").expect("blocker content");

        let err = write_outputs(&output(), &OutputConfig::default(), tmp.path())
            .expect_err("rename onto a non-empty directory");
        assert!(matches!(err, PageforgeError::Io { .. }));

        let mut names: Vec<_> = std::fs::read_dir(tmp.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["product_page.json"]);
    }

    #[test]
    fn failed_rewrite_restores_previous_documents() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let faq = tmp.path().join("faq.json");
        std::fs::write(&faq, "previous").expect("previous faq");
        let blocker = tmp.path().join("comparison_page.json");
        std::fs::create_dir(&blocker).expect("blocker dir");
        std::fs::write(blocker.join("keep"), "x").expect("blocker content");

        write_outputs(&output(), &OutputConfig::default(), tmp.path())
            .expect_err("rename onto a non-empty directory");

        assert_eq!(std::fs::read_to_string(&faq).expect("faq"), "previous");
        assert!(!tmp.path().join("product_page.json").exists());
        assert!(!tmp.path().join(".faq.json.bak").exists());
    }
}

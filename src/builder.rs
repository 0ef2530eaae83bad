//! Tree walk that materializes a template source into a destination directory.
//!
//! Directories are created before their children are processed and removed again
//! if nothing ended up inside them, so a branch whose every entry was suppressed
//! leaves no trace in the output.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use log::{debug, info, warn};

use crate::error::{BoxError, Error, FileOperation, Result};
use crate::fs::{Filesystem, LocalFilesystem};
use crate::merge::{write_artifact, MergeRegistry};
use crate::platform::Platform;
use crate::renderer::{CompiledTemplate, MiniJinjaRenderer, TemplateRenderer};
use crate::report::{Action, BuildReport};
use crate::rewrite::PathRewriter;
use crate::source::{join_source_path, TemplateSource};

/// Suffix marking template files; it is removed from output names.
pub const DEFAULT_TEMPLATE_SUFFIX: &str = ".tmpl";

/// Generates project trees from a [`TemplateSource`].
pub struct Builder {
    prefix: String,
    source: Box<dyn TemplateSource>,
    renderer: Box<dyn TemplateRenderer>,
    fs: Box<dyn Filesystem>,
    merge_mode: bool,
    registry: MergeRegistry,
    platform: Platform,
    template_suffix: String,
    ignore: GlobSet,
}

impl Builder {
    /// Creates a builder reading from `source`. `prefix` is stripped from source
    /// paths to obtain the relative paths that get rewritten into the destination.
    pub fn new<S>(prefix: impl Into<String>, source: S, merge_mode: bool) -> Self
    where
        S: TemplateSource + 'static,
    {
        Self {
            prefix: prefix.into(),
            source: Box::new(source),
            renderer: Box::new(MiniJinjaRenderer::new()),
            fs: Box::new(LocalFilesystem),
            merge_mode,
            registry: MergeRegistry::new(),
            platform: Platform::current(),
            template_suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
            ignore: GlobSet::empty(),
        }
    }

    pub fn with_renderer<R: TemplateRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_filesystem<F: Filesystem + 'static>(mut self, fs: F) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_template_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.template_suffix = suffix.into();
        self
    }

    /// Skips source entries whose relative path matches `ignore`.
    pub fn with_ignore(mut self, ignore: GlobSet) -> Self {
        self.ignore = ignore;
        self
    }

    /// Registers a merge function for destination paths ending with `suffix`.
    pub fn add_merge_fn<F>(&mut self, suffix: impl Into<String>, merge_fn: F)
    where
        F: Fn(&Path, &[u8], &[u8]) -> std::result::Result<Vec<u8>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.registry.register(suffix, merge_fn);
    }

    pub fn merge_mode(&self) -> bool {
        self.merge_mode
    }

    /// Runs one generation pass from `source_prefix` into `destination_root`.
    ///
    /// Stops at the first error. Whatever was written before that point stays on disk.
    pub fn build<P: AsRef<Path>>(
        &self,
        source_prefix: &str,
        destination_root: P,
        context: &serde_json::Value,
    ) -> Result<BuildReport> {
        let destination = destination_root.as_ref();
        debug!(
            "Building '{}' into '{}' (merge: {})",
            source_prefix,
            destination.display(),
            self.merge_mode
        );
        self.fs
            .create_dir_if_absent(destination)
            .map_err(|e| Error::destination(FileOperation::CreateDir, destination, e))?;

        let mut session = Session {
            builder: self,
            rewriter: PathRewriter::new(&*self.renderer, self.platform),
            destination,
            context,
            report: BuildReport::default(),
        };
        session.process(source_prefix)?;

        info!(
            "Generated {} file(s) in '{}'",
            session.report.entries.iter().filter(|e| e.action != Action::Pruned).count(),
            destination.display()
        );
        Ok(session.report)
    }

    fn relative<'p>(&self, source_path: &'p str) -> &'p str {
        source_path.strip_prefix(self.prefix.as_str()).unwrap_or(source_path)
    }

    fn is_ignored(&self, relative: &str) -> bool {
        self.ignore.is_match(relative.trim_start_matches('/'))
    }

    fn is_templated_name(&self, name: &str) -> bool {
        self.renderer.closing_markers().iter().any(|marker| name.ends_with(marker))
    }
}

enum Body {
    Template(CompiledTemplate),
    Raw(Vec<u8>),
}

/// State of a single [`Builder::build`] call.
struct Session<'a> {
    builder: &'a Builder,
    rewriter: PathRewriter<'a>,
    destination: &'a Path,
    context: &'a serde_json::Value,
    report: BuildReport,
}

impl Session<'_> {
    fn process(&mut self, dir: &str) -> Result<()> {
        let entries = self
            .builder
            .source
            .read_dir(dir)
            .map_err(|source| Error::SourceRead {
                path: dir.to_string(),
                source,
            })?;

        for entry in entries {
            let source_path = join_source_path(dir, &entry.name);
            let relative = self.builder.relative(&source_path);
            if self.builder.is_ignored(relative) {
                debug!("Skipping '{source_path}', matched ignore patterns");
                continue;
            }
            if entry.is_dir {
                self.process_dir(&source_path, relative)?;
            } else {
                self.process_file(&source_path, relative)?;
            }
        }
        Ok(())
    }

    fn process_dir(&mut self, source_path: &str, relative: &str) -> Result<()> {
        let Some(rewritten) = self.rewriter.rewrite(relative, self.context)? else {
            return Ok(());
        };
        if rewritten.ends_with(self.builder.platform.separator()) {
            debug!("Skipping directory '{source_path}', expanded to '{rewritten}'");
            return Ok(());
        }

        let target = self.destination_path(&rewritten);
        self.create_dir(&target)?;
        self.process(source_path)?;
        self.prune(&target)
    }

    fn process_file(&mut self, source_path: &str, relative: &str) -> Result<()> {
        let raw = self
            .builder
            .source
            .read_file(source_path)
            .map_err(|source| Error::SourceRead {
                path: source_path.to_string(),
                source,
            })?;
        let body = match String::from_utf8(raw) {
            Ok(text) => Body::Template(self.builder.renderer.compile(&text).map_err(|source| {
                Error::TemplateParse {
                    path: source_path.to_string(),
                    source,
                }
            })?),
            Err(e) => {
                debug!("'{source_path}' is not UTF-8, copying it verbatim");
                Body::Raw(e.into_bytes())
            }
        };

        let (parent, name) = match relative.rsplit_once('/') {
            Some((parent, name)) => (Some(parent), name),
            None => (None, relative),
        };
        let mut name = name.to_string();
        if self.builder.is_templated_name(&name) {
            match self.rewriter.rewrite(&name, self.context) {
                Ok(Some(rendered)) => name = rendered,
                Ok(None) => return Ok(()),
                Err(e) => {
                    warn!("Skipping '{source_path}': {e}");
                    return Ok(());
                }
            }
        }
        let name = name.strip_suffix(self.builder.template_suffix.as_str()).unwrap_or(&name);
        if name.is_empty() {
            debug!("Skipping '{source_path}', output name is empty");
            return Ok(());
        }
        let logical = match parent {
            Some(parent) => format!("{parent}/{name}"),
            None => name.to_string(),
        };

        let Some(rewritten) = self.rewriter.rewrite(&logical, self.context)? else {
            return Ok(());
        };
        let target = self.destination_path(&rewritten);
        if target == self.destination {
            debug!("Skipping '{source_path}', it expands to the destination root");
            return Ok(());
        }

        let artifact = match body {
            Body::Template(template) => self
                .builder
                .renderer
                .render(&template, self.context)
                .map_err(|source| Error::TemplateRender {
                    path: source_path.to_string(),
                    source,
                })?
                .into_bytes(),
            Body::Raw(bytes) => bytes,
        };

        if let Some(parent) = target.parent() {
            self.create_dir(parent)?;
        }
        let action = write_artifact(
            &*self.builder.fs,
            &target,
            &artifact,
            self.builder.merge_mode,
            &self.builder.registry,
        )?;
        debug!("{}: '{}'", action, target.display());
        self.report.record(action, &target);
        Ok(())
    }

    /// Joins an expanded relative path onto the destination, dropping empty segments.
    fn destination_path(&self, rewritten: &str) -> PathBuf {
        let separator = self.builder.platform.separator();
        let mut path = self.destination.to_path_buf();
        let segments = rewritten
            .split(|c: char| c == '/' || c == separator)
            .filter(|s| !s.is_empty());
        for segment in segments {
            path.push(segment);
        }
        path
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        self.builder
            .fs
            .create_dir_if_absent(path)
            .map_err(|e| Error::destination(FileOperation::CreateDir, path, e))
    }

    fn prune(&mut self, path: &Path) -> Result<()> {
        let entries = self
            .builder
            .fs
            .list_dir(path)
            .map_err(|e| Error::destination(FileOperation::ListDir, path, e))?;
        if entries.is_empty() {
            self.builder
                .fs
                .remove_dir(path)
                .map_err(|e| Error::destination(FileOperation::RemoveDir, path, e))?;
            debug!("Removed empty directory '{}'", path.display());
            self.report.record(Action::Pruned, path);
        }
        Ok(())
    }
}
